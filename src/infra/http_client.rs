//! HTTP client factory with consistent timeout configuration.
//!
//! Outbound clients (the Resend notifier) are built here rather than through
//! `reqwest::Client::new()`, so every request carries a connect and total timeout.

use reqwest::Client;
use std::time::Duration;

/// Default connect timeout (TCP handshake + TLS).
pub const DEFAULT_CONNECT_TIMEOUT: Duration = Duration::from_secs(5);

/// Build an HTTP client whose requests give up after `request_timeout`.
///
/// The connect timeout never exceeds the request timeout.
pub fn try_build_client(request_timeout: Duration) -> Result<Client, reqwest::Error> {
    Client::builder()
        .connect_timeout(DEFAULT_CONNECT_TIMEOUT.min(request_timeout))
        .timeout(request_timeout)
        .build()
}
