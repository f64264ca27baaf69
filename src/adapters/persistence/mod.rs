use sqlx::PgPool;

use crate::app_error::AppError;

pub mod ledger;
pub mod owner;

#[derive(Clone)]
pub struct PostgresPersistence {
    pool: PgPool,
}

impl PostgresPersistence {
    pub fn new(pool: PgPool) -> Self {
        PostgresPersistence { pool }
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }
}

impl From<sqlx::Error> for AppError {
    fn from(err: sqlx::Error) -> Self {
        match &err {
            sqlx::Error::RowNotFound => AppError::NotFound,
            sqlx::Error::Database(db_err) => {
                let msg = db_err.message();
                classify_constraint_message(msg).unwrap_or_else(|| {
                    // Log the actual error for debugging, but don't expose details
                    tracing::error!(error = ?err, "Database error");
                    AppError::Database("Database operation failed".into())
                })
            }
            _ => {
                tracing::error!(error = ?err, "Database error");
                AppError::Database("Database operation failed".into())
            }
        }
    }
}

/// Maps PostgreSQL constraint violations to client errors.
fn classify_constraint_message(msg: &str) -> Option<AppError> {
    if msg.contains("duplicate key") || msg.contains("unique constraint") {
        Some(AppError::InvalidInput(
            "A record with this value already exists".into(),
        ))
    } else if msg.contains("foreign key") || msg.contains("violates foreign key") {
        Some(AppError::InvalidInput("Referenced record not found".into()))
    } else if msg.contains("null value") && msg.contains("violates not-null") {
        Some(AppError::InvalidInput("Required field is missing".into()))
    } else {
        None
    }
}
