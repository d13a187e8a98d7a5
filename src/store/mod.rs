//! Storage seams.
//!
//! Handlers only see these traits. `mongo` backs them with MongoDB
//! collections; `memory` keeps everything in process for tests and local
//! runs without a database.

use async_trait::async_trait;

use crate::error::AppResult;
use crate::lifecycle::RequestFilter;
use crate::models::{Equipment, EquipmentStatus, MaintenanceRequest, Team, User};

pub mod memory;
pub mod mongo;

#[async_trait]
pub trait RequestStore: Send + Sync {
    async fn insert(&self, request: &MaintenanceRequest) -> AppResult<()>;

    async fn get(&self, id: &str) -> AppResult<Option<MaintenanceRequest>>;

    /// Unordered; callers sort.
    async fn find(&self, filter: &RequestFilter) -> AppResult<Vec<MaintenanceRequest>>;

    /// Overwrite the stored document. Returns false when no document has
    /// that id. Last write wins.
    async fn replace(&self, request: &MaintenanceRequest) -> AppResult<bool>;

    async fn delete(&self, id: &str) -> AppResult<bool>;
}

#[async_trait]
pub trait EquipmentDirectory: Send + Sync {
    async fn resolve(&self, id: &str) -> AppResult<Option<Equipment>>;

    async fn set_status(&self, id: &str, status: EquipmentStatus) -> AppResult<bool>;

    async fn list_active(&self) -> AppResult<Vec<Equipment>>;

    async fn insert(&self, equipment: &Equipment) -> AppResult<()>;

    async fn replace(&self, equipment: &Equipment) -> AppResult<bool>;
}

#[async_trait]
pub trait TeamDirectory: Send + Sync {
    async fn get(&self, id: &str) -> AppResult<Option<Team>>;

    async fn list_active(&self) -> AppResult<Vec<Team>>;

    async fn insert(&self, team: &Team) -> AppResult<()>;

    async fn replace(&self, team: &Team) -> AppResult<bool>;
}

#[async_trait]
pub trait UserDirectory: Send + Sync {
    async fn get(&self, id: &str) -> AppResult<Option<User>>;

    async fn list_active(&self) -> AppResult<Vec<User>>;

    /// Active technicians whose team is `team_id`.
    async fn technicians_of(&self, team_id: &str) -> AppResult<Vec<User>>;

    async fn replace(&self, user: &User) -> AppResult<bool>;
}
