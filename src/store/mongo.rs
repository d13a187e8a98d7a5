use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use futures_util::TryStreamExt;
use mongodb::bson::{doc, to_bson};
use mongodb::Collection;

use crate::db::MongoDB;
use crate::error::AppResult;
use crate::lifecycle::RequestFilter;
use crate::models::{Equipment, EquipmentStatus, MaintenanceRequest, Role, Team, User};

use super::{EquipmentDirectory, RequestStore, TeamDirectory, UserDirectory};

pub const REQUESTS: &str = "requests";
pub const EQUIPMENT: &str = "equipment";
pub const TEAMS: &str = "teams";
pub const USERS: &str = "users";

/// All four stores over one database handle.
#[derive(Clone)]
pub struct MongoStore {
    mongodb: Arc<MongoDB>,
}

impl MongoStore {
    pub fn new(mongodb: Arc<MongoDB>) -> Self {
        MongoStore { mongodb }
    }

    fn requests(&self) -> Collection<MaintenanceRequest> {
        self.mongodb.db.collection(REQUESTS)
    }

    fn equipment(&self) -> Collection<Equipment> {
        self.mongodb.db.collection(EQUIPMENT)
    }

    fn teams(&self) -> Collection<Team> {
        self.mongodb.db.collection(TEAMS)
    }

    fn users(&self) -> Collection<User> {
        self.mongodb.db.collection(USERS)
    }
}

#[async_trait]
impl RequestStore for MongoStore {
    async fn insert(&self, request: &MaintenanceRequest) -> AppResult<()> {
        self.requests().insert_one(request).await?;
        Ok(())
    }

    async fn get(&self, id: &str) -> AppResult<Option<MaintenanceRequest>> {
        Ok(self.requests().find_one(doc! { "_id": id }).await?)
    }

    async fn find(&self, filter: &RequestFilter) -> AppResult<Vec<MaintenanceRequest>> {
        let cursor = self.requests().find(filter.to_document()).await?;
        Ok(cursor.try_collect().await?)
    }

    async fn replace(&self, request: &MaintenanceRequest) -> AppResult<bool> {
        let res = self
            .requests()
            .replace_one(doc! { "_id": &request.id }, request)
            .await?;
        Ok(res.matched_count > 0)
    }

    async fn delete(&self, id: &str) -> AppResult<bool> {
        let res = self.requests().delete_one(doc! { "_id": id }).await?;
        Ok(res.deleted_count > 0)
    }
}

#[async_trait]
impl EquipmentDirectory for MongoStore {
    async fn resolve(&self, id: &str) -> AppResult<Option<Equipment>> {
        Ok(self.equipment().find_one(doc! { "_id": id }).await?)
    }

    async fn set_status(&self, id: &str, status: EquipmentStatus) -> AppResult<bool> {
        let update = doc! {
            "$set": {
                "status": status.as_str(),
                "updatedAt": to_bson(&Utc::now())?,
            }
        };
        let res = self.equipment().update_one(doc! { "_id": id }, update).await?;
        Ok(res.matched_count > 0)
    }

    async fn list_active(&self) -> AppResult<Vec<Equipment>> {
        let cursor = self.equipment().find(doc! { "isActive": true }).await?;
        Ok(cursor.try_collect().await?)
    }

    async fn insert(&self, equipment: &Equipment) -> AppResult<()> {
        self.equipment().insert_one(equipment).await?;
        Ok(())
    }

    async fn replace(&self, equipment: &Equipment) -> AppResult<bool> {
        let res = self
            .equipment()
            .replace_one(doc! { "_id": &equipment.id }, equipment)
            .await?;
        Ok(res.matched_count > 0)
    }
}

#[async_trait]
impl TeamDirectory for MongoStore {
    async fn get(&self, id: &str) -> AppResult<Option<Team>> {
        Ok(self.teams().find_one(doc! { "_id": id }).await?)
    }

    async fn list_active(&self) -> AppResult<Vec<Team>> {
        let cursor = self.teams().find(doc! { "isActive": true }).await?;
        Ok(cursor.try_collect().await?)
    }

    async fn insert(&self, team: &Team) -> AppResult<()> {
        self.teams().insert_one(team).await?;
        Ok(())
    }

    async fn replace(&self, team: &Team) -> AppResult<bool> {
        let res = self
            .teams()
            .replace_one(doc! { "_id": &team.id }, team)
            .await?;
        Ok(res.matched_count > 0)
    }
}

#[async_trait]
impl UserDirectory for MongoStore {
    async fn get(&self, id: &str) -> AppResult<Option<User>> {
        Ok(self.users().find_one(doc! { "_id": id }).await?)
    }

    async fn list_active(&self) -> AppResult<Vec<User>> {
        let cursor = self.users().find(doc! { "isActive": true }).await?;
        Ok(cursor.try_collect().await?)
    }

    async fn technicians_of(&self, team_id: &str) -> AppResult<Vec<User>> {
        let filter = doc! {
            "role": Role::Technician.as_str(),
            "teamId": team_id,
            "isActive": true,
        };
        let cursor = self.users().find(filter).await?;
        Ok(cursor.try_collect().await?)
    }

    async fn replace(&self, user: &User) -> AppResult<bool> {
        let res = self
            .users()
            .replace_one(doc! { "_id": &user.id }, user)
            .await?;
        Ok(res.matched_count > 0)
    }
}
