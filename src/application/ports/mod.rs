pub mod ledger_store;
pub mod notifier;
pub mod owner_directory;
