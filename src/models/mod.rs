mod equipment;
mod request;
mod team;
mod user;

pub use equipment::{
    CreateEquipmentRequest, Equipment, EquipmentCategory, EquipmentStatus, UpdateEquipmentRequest,
};
pub use request::{
    AssignRequestPayload, CreateRequestPayload, MaintenanceRequest, Priority, RequestQuery,
    RequestStatus, RequestType, UpdateRequestPayload,
};
pub use team::{CreateTeamRequest, Team, UpdateTeamRequest, DEFAULT_TEAM_ICON};
pub use user::{Role, UpdateUserRequest, User, UserProfile};
