pub mod analytics;
pub mod reconciler;
pub mod reminders;
pub mod subscription;
