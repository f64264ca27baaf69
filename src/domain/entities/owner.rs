use serde::Serialize;
use uuid::Uuid;

/// Read-only projection of a registered user, as needed for notifications.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Owner {
    pub id: Uuid,
    pub email: String,
    pub name: String,
    pub email_notifications: bool,
}
