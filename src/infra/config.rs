use std::net::SocketAddr;

use axum::http::HeaderValue;
use env_helpers::{get_env, get_env_default};
use secrecy::SecretString;
use url::Url;

pub struct AppConfig {
    pub database_url: String,
    pub database_max_connections: u32,
    pub bind_addr: SocketAddr,
    pub cors_origin: HeaderValue,
    pub resend_api_key: SecretString,
    pub email_from: String,
    /// Base URL of the web app, used for links in notification emails.
    pub app_origin: Url,
    /// Hour of the day (UTC) at which the renewal reminder scan runs.
    pub reminder_hour_utc: u32,
    /// Upper bound for a single notification delivery.
    pub notify_timeout_secs: u64,
    /// JSON log file. Console-only logging when unset.
    pub log_file: Option<String>,
}

impl AppConfig {
    pub fn from_env() -> Self {
        let database_url: String = get_env("DATABASE_URL");
        let database_max_connections: u32 = get_env_default("DATABASE_MAX_CONNECTIONS", 5);
        let bind_addr: SocketAddr = get_env_default("BIND_ADDR", "127.0.0.1:3001".parse().unwrap());
        let cors_origin: HeaderValue =
            get_env_default("CORS_ORIGIN", String::from("http://localhost:3000"))
                .parse()
                .expect("CORS_ORIGIN must be a valid header value");

        let resend_api_key: SecretString =
            SecretString::new(get_env::<String>("RESEND_API_KEY").into());
        let email_from: String = get_env_default(
            "EMAIL_FROM",
            "noreply@subscriptiontracker.com".to_string(),
        );
        let app_origin: Url =
            get_env_default("APP_ORIGIN", Url::parse("http://localhost:3000").unwrap());

        let reminder_hour_utc: u32 = get_env_default("REMINDER_HOUR_UTC", 16);
        assert!(reminder_hour_utc < 24, "REMINDER_HOUR_UTC must be between 0 and 23");
        let notify_timeout_secs: u64 = get_env_default("NOTIFY_TIMEOUT_SECS", 10);
        let log_file: Option<String> = std::env::var("LOG_FILE").ok().filter(|s| !s.is_empty());

        Self {
            database_url,
            database_max_connections,
            bind_addr,
            cors_origin,
            resend_api_key,
            email_from,
            app_origin,
            reminder_hour_utc,
            notify_timeout_secs,
            log_file,
        }
    }
}
