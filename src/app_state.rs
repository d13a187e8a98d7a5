use std::sync::Arc;

use crate::config::Config;
use crate::store::{EquipmentDirectory, RequestStore, TeamDirectory, UserDirectory};

#[derive(Clone)]
pub struct AppState {
    pub requests: Arc<dyn RequestStore>,
    pub equipment: Arc<dyn EquipmentDirectory>,
    pub teams: Arc<dyn TeamDirectory>,
    pub users: Arc<dyn UserDirectory>,
    pub config: Config,
}

impl AppState {
    /// Wire every seam to the same backing store.
    pub fn with_store<S>(store: Arc<S>, config: Config) -> Self
    where
        S: RequestStore + EquipmentDirectory + TeamDirectory + UserDirectory + 'static,
    {
        AppState {
            requests: store.clone(),
            equipment: store.clone(),
            teams: store.clone(),
            users: store,
            config,
        }
    }
}
