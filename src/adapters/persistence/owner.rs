use async_trait::async_trait;
use sqlx::Row;
use uuid::Uuid;

use crate::{
    adapters::persistence::PostgresPersistence,
    app_error::{AppError, AppResult},
    application::ports::owner_directory::OwnerDirectory,
    domain::entities::owner::Owner,
};

#[async_trait]
impl OwnerDirectory for PostgresPersistence {
    async fn get_owner(&self, id: Uuid) -> AppResult<Option<Owner>> {
        let row = sqlx::query(
            "SELECT id, email, name, email_notifications FROM users WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(AppError::from)?;

        Ok(row.map(|row| Owner {
            id: row.get("id"),
            email: row.get("email"),
            name: row.get("name"),
            email_notifications: row.get("email_notifications"),
        }))
    }
}
