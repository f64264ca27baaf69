pub mod billing_event;
pub mod owner;
pub mod price_change;
pub mod subscription;
