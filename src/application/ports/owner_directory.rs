use async_trait::async_trait;
use uuid::Uuid;

use crate::{app_error::AppResult, domain::entities::owner::Owner};

/// Lookup into the user store, which this service only reads.
#[async_trait]
pub trait OwnerDirectory: Send + Sync {
    async fn get_owner(&self, id: Uuid) -> AppResult<Option<Owner>>;
}
