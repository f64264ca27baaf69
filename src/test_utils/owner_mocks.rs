//! In-memory mock for the owner directory.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Mutex;
use uuid::Uuid;

use crate::{
    app_error::AppResult, application::ports::owner_directory::OwnerDirectory,
    domain::entities::owner::Owner,
};

#[derive(Default)]
pub struct InMemoryOwnerDirectory {
    pub owners: Mutex<HashMap<Uuid, Owner>>,
}

impl InMemoryOwnerDirectory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_owners(owners: Vec<Owner>) -> Self {
        let map: HashMap<Uuid, Owner> = owners.into_iter().map(|o| (o.id, o)).collect();
        Self {
            owners: Mutex::new(map),
        }
    }
}

#[async_trait]
impl OwnerDirectory for InMemoryOwnerDirectory {
    async fn get_owner(&self, id: Uuid) -> AppResult<Option<Owner>> {
        Ok(self.owners.lock().unwrap().get(&id).cloned())
    }
}
