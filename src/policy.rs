//! Role-based access rules.
//!
//! Every handler asks [`authorize`] once, up front, for the operation it is
//! about to perform. The answer is either a denial or the visibility scope
//! the actor's reads must be restricted to.

use crate::error::{AppError, AppResult};
use crate::models::{MaintenanceRequest, Role, User};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    ListRequests,
    ViewRequest,
    CreateRequest,
    UpdateRequest,
    AssignRequest,
    DeleteRequest,
    ViewEquipment,
    ManageEquipment,
    ViewTeams,
    ManageTeams,
    ListUsers,
    ViewUser,
    ManageUsers,
    ViewDashboard,
}

impl Operation {
    fn describe(&self) -> &'static str {
        match self {
            Operation::ListRequests => "list requests",
            Operation::ViewRequest => "view requests",
            Operation::CreateRequest => "create requests",
            Operation::UpdateRequest => "update requests",
            Operation::AssignRequest => "assign requests",
            Operation::DeleteRequest => "delete requests",
            Operation::ViewEquipment => "view equipment",
            Operation::ManageEquipment => "manage equipment",
            Operation::ViewTeams => "view teams",
            Operation::ManageTeams => "manage teams",
            Operation::ListUsers => "list users",
            Operation::ViewUser => "view users",
            Operation::ManageUsers => "manage users",
            Operation::ViewDashboard => "view the dashboard",
        }
    }
}

/// What the table says about a (role, operation) pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Grant {
    Denied,
    Unscoped,
    /// Only requests the actor opened.
    OwnRequests,
    /// Requests assigned to the actor plus the unclaimed backlog of their team.
    AssignedOrTeamBacklog,
}

/// Visibility restriction bound to a concrete actor.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Scope {
    All,
    CreatedBy(String),
    AssignedOrTeamBacklog {
        user_id: String,
        team_id: Option<String>,
    },
}

pub fn grant(role: Role, op: Operation) -> Grant {
    use Grant::*;
    use Operation::*;
    use Role::*;

    match (op, role) {
        (ListRequests, Admin | Manager) => Unscoped,
        (ListRequests, Technician) => AssignedOrTeamBacklog,
        (ListRequests, Employee) => OwnRequests,

        (ViewRequest | CreateRequest | UpdateRequest, _) => Unscoped,
        (AssignRequest, Manager | Technician) => Unscoped,
        (DeleteRequest, Admin | Manager) => Unscoped,

        (ViewEquipment | ViewTeams | ViewUser | ViewDashboard, _) => Unscoped,
        (ManageEquipment | ManageTeams | ListUsers | ManageUsers, Admin) => Unscoped,

        _ => Denied,
    }
}

/// Evaluate the table for `actor` and bind the resulting scope.
pub fn authorize(actor: &User, op: Operation) -> AppResult<Scope> {
    match grant(actor.role, op) {
        Grant::Denied => Err(AppError::Forbidden(format!(
            "Role {} is not authorized to {}",
            actor.role.as_str(),
            op.describe()
        ))),
        Grant::Unscoped => Ok(Scope::All),
        Grant::OwnRequests => Ok(Scope::CreatedBy(actor.id.clone())),
        Grant::AssignedOrTeamBacklog => Ok(Scope::AssignedOrTeamBacklog {
            user_id: actor.id.clone(),
            team_id: actor.team_id.clone(),
        }),
    }
}

/// Subject, description and the other non-workflow fields belong to the
/// creator, with managers and admins allowed to step in.
pub fn may_edit_details(actor: &User, request: &MaintenanceRequest) -> bool {
    request.created_by == actor.id || matches!(actor.role, Role::Manager | Role::Admin)
}

/// Status and assignee are moved by the people doing the work.
pub fn may_edit_workflow(actor: &User) -> bool {
    matches!(actor.role, Role::Manager | Role::Technician)
}
