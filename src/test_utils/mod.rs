//! Test utilities for integration testing.
//!
//! This module provides:
//! - Test data factories for creating valid test fixtures
//! - In-memory implementations of the ledger and owner ports
//! - A recording notifier for asserting on outbound notifications
//! - `TestAppStateBuilder` for HTTP-level tests

mod app_state_builder;
mod factories;
mod ledger_mocks;
mod notifier_mocks;
mod owner_mocks;

pub use app_state_builder::*;
pub use factories::*;
pub use ledger_mocks::*;
pub use notifier_mocks::*;
pub use owner_mocks::*;
