use std::collections::HashMap;
use std::sync::{PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use async_trait::async_trait;
use chrono::Utc;

use crate::error::AppResult;
use crate::lifecycle::RequestFilter;
use crate::models::{Equipment, EquipmentStatus, MaintenanceRequest, Role, Team, User};

use super::{EquipmentDirectory, RequestStore, TeamDirectory, UserDirectory};

/// Process-local store keyed by document id.
///
/// Locks are never held across an await, so plain `std` locks are enough.
/// A lock poisoned by a panicking writer is taken over as is: every write
/// here replaces whole documents, so the maps never hold a half-applied
/// change.
#[derive(Default)]
pub struct MemoryStore {
    requests: RwLock<HashMap<String, MaintenanceRequest>>,
    equipment: RwLock<HashMap<String, Equipment>>,
    teams: RwLock<HashMap<String, Team>>,
    users: RwLock<HashMap<String, User>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Accounts are provisioned by the auth service, so the directory trait
    /// has no insert; this is how local data gets in.
    pub fn put_user(&self, user: User) {
        write(&self.users).insert(user.id.clone(), user);
    }

    pub fn put_equipment(&self, equipment: Equipment) {
        write(&self.equipment).insert(equipment.id.clone(), equipment);
    }

    pub fn put_team(&self, team: Team) {
        write(&self.teams).insert(team.id.clone(), team);
    }

    pub fn put_request(&self, request: MaintenanceRequest) {
        write(&self.requests).insert(request.id.clone(), request);
    }
}

fn read<T>(lock: &RwLock<T>) -> RwLockReadGuard<'_, T> {
    lock.read().unwrap_or_else(PoisonError::into_inner)
}

fn write<T>(lock: &RwLock<T>) -> RwLockWriteGuard<'_, T> {
    lock.write().unwrap_or_else(PoisonError::into_inner)
}

fn replace_in<T: Clone>(map: &RwLock<HashMap<String, T>>, id: &str, value: &T) -> bool {
    let mut map = write(map);
    match map.get_mut(id) {
        Some(slot) => {
            *slot = value.clone();
            true
        }
        None => false,
    }
}

#[async_trait]
impl RequestStore for MemoryStore {
    async fn insert(&self, request: &MaintenanceRequest) -> AppResult<()> {
        self.put_request(request.clone());
        Ok(())
    }

    async fn get(&self, id: &str) -> AppResult<Option<MaintenanceRequest>> {
        Ok(read(&self.requests).get(id).cloned())
    }

    async fn find(&self, filter: &RequestFilter) -> AppResult<Vec<MaintenanceRequest>> {
        Ok(read(&self.requests)
            .values()
            .filter(|r| filter.matches(r))
            .cloned()
            .collect())
    }

    async fn replace(&self, request: &MaintenanceRequest) -> AppResult<bool> {
        Ok(replace_in(&self.requests, &request.id, request))
    }

    async fn delete(&self, id: &str) -> AppResult<bool> {
        Ok(write(&self.requests).remove(id).is_some())
    }
}

#[async_trait]
impl EquipmentDirectory for MemoryStore {
    async fn resolve(&self, id: &str) -> AppResult<Option<Equipment>> {
        Ok(read(&self.equipment).get(id).cloned())
    }

    async fn set_status(&self, id: &str, status: EquipmentStatus) -> AppResult<bool> {
        let mut equipment = write(&self.equipment);
        Ok(match equipment.get_mut(id) {
            Some(item) => {
                item.status = status;
                item.updated_at = Utc::now();
                true
            }
            None => false,
        })
    }

    async fn list_active(&self) -> AppResult<Vec<Equipment>> {
        Ok(read(&self.equipment)
            .values()
            .filter(|e| e.is_active)
            .cloned()
            .collect())
    }

    async fn insert(&self, equipment: &Equipment) -> AppResult<()> {
        self.put_equipment(equipment.clone());
        Ok(())
    }

    async fn replace(&self, equipment: &Equipment) -> AppResult<bool> {
        Ok(replace_in(&self.equipment, &equipment.id, equipment))
    }
}

#[async_trait]
impl TeamDirectory for MemoryStore {
    async fn get(&self, id: &str) -> AppResult<Option<Team>> {
        Ok(read(&self.teams).get(id).cloned())
    }

    async fn list_active(&self) -> AppResult<Vec<Team>> {
        Ok(read(&self.teams)
            .values()
            .filter(|t| t.is_active)
            .cloned()
            .collect())
    }

    async fn insert(&self, team: &Team) -> AppResult<()> {
        self.put_team(team.clone());
        Ok(())
    }

    async fn replace(&self, team: &Team) -> AppResult<bool> {
        Ok(replace_in(&self.teams, &team.id, team))
    }
}

#[async_trait]
impl UserDirectory for MemoryStore {
    async fn get(&self, id: &str) -> AppResult<Option<User>> {
        Ok(read(&self.users).get(id).cloned())
    }

    async fn list_active(&self) -> AppResult<Vec<User>> {
        Ok(read(&self.users)
            .values()
            .filter(|u| u.is_active)
            .cloned()
            .collect())
    }

    async fn technicians_of(&self, team_id: &str) -> AppResult<Vec<User>> {
        Ok(read(&self.users)
            .values()
            .filter(|u| {
                u.is_active
                    && u.role == Role::Technician
                    && u.team_id.as_deref() == Some(team_id)
            })
            .cloned()
            .collect())
    }

    async fn replace(&self, user: &User) -> AppResult<bool> {
        Ok(replace_in(&self.users, &user.id, user))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::thread;

    fn team(id: &str) -> Team {
        Team {
            id: id.into(),
            name: format!("team {id}"),
            icon: "🔧".into(),
            description: String::new(),
            members: vec![],
            is_active: true,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[actix_web::test]
    async fn poisoned_lock_keeps_serving() {
        let store = Arc::new(MemoryStore::new());
        store.put_team(team("t1"));

        let writer = store.clone();
        let crashed = thread::spawn(move || {
            let _guard = writer.teams.write().unwrap();
            panic!("writer crashed while holding the lock");
        })
        .join();
        assert!(crashed.is_err());
        assert!(store.teams.is_poisoned());

        store.put_team(team("t2"));
        assert!(TeamDirectory::get(&*store, "t1").await.unwrap().is_some());
        assert_eq!(TeamDirectory::list_active(&*store).await.unwrap().len(), 2);
    }
}
