use crate::{
    adapters::{
        email::resend::ResendNotifier, http::app_state::AppState,
        persistence::PostgresPersistence,
    },
    application::ports::{
        ledger_store::LedgerStore, notifier::Notifier, owner_directory::OwnerDirectory,
    },
    infra::{config::AppConfig, http_client::try_build_client, postgres_persistence},
    use_cases::{
        analytics::AnalyticsUseCases, reconciler::BillingReconciler,
        reminders::ReminderUseCases, subscription::SubscriptionUseCases,
    },
};
use std::fs::File;
use std::sync::Arc;
use std::time::Duration;
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

pub async fn init_app_state() -> anyhow::Result<AppState> {
    let config = AppConfig::from_env();

    let postgres_arc: Arc<PostgresPersistence> = Arc::new(
        postgres_persistence(&config.database_url, config.database_max_connections).await?,
    );
    let ledger_arc = postgres_arc.clone() as Arc<dyn LedgerStore>;
    let owners_arc = postgres_arc.clone() as Arc<dyn OwnerDirectory>;

    let http_client = try_build_client(Duration::from_secs(config.notify_timeout_secs))?;
    let notifier: Arc<dyn Notifier> = Arc::new(ResendNotifier::new(
        http_client,
        config.resend_api_key.clone(),
        config.email_from.clone(),
        config.app_origin.to_string(),
        owners_arc.clone(),
    ));

    let subscription_use_cases =
        SubscriptionUseCases::new(ledger_arc.clone(), owners_arc, notifier.clone());
    let reconciler = BillingReconciler::new(ledger_arc.clone(), notifier.clone());
    let analytics_use_cases = AnalyticsUseCases::new(ledger_arc.clone());
    let reminder_use_cases = ReminderUseCases::new(ledger_arc, notifier);

    Ok(AppState {
        config: Arc::new(config),
        subscription_use_cases: Arc::new(subscription_use_cases),
        reconciler: Arc::new(reconciler),
        analytics_use_cases: Arc::new(analytics_use_cases),
        reminder_use_cases: Arc::new(reminder_use_cases),
    })
}

pub fn init_tracing(log_file: Option<&str>) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "subtrack=debug,tower_http=debug".into());

    // Console (pretty logs)
    let console_layer = fmt::layer()
        .with_target(false) // don’t show target (module path)
        .with_level(true) // show log level
        .pretty(); // human-friendly, with colors

    // File (structured JSON logs)
    let json_layer = log_file
        .and_then(|path| match File::create(path) {
            Ok(file) => Some(file),
            Err(e) => {
                eprintln!("cannot create log file {path}: {e}");
                None
            }
        })
        .map(|file| {
            fmt::layer()
                .json()
                .with_writer(file)
                .with_current_span(true)
                .with_span_list(true)
        });

    tracing_subscriber::registry()
        .with(filter)
        .with(console_layer)
        .with(json_layer)
        .try_init()
        .ok();
}
