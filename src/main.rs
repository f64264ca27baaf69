use dotenvy::dotenv;
use tracing::info;

use std::net::SocketAddr;
use subtrack::infra::{
    app::create_app, reminder_scheduler::run_reminder_loop, setup::init_app_state,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv().ok();

    let app_state = init_app_state().await?;

    let bind_addr = app_state.config.bind_addr;
    let reminder_hour = app_state.config.reminder_hour_utc;

    let app = create_app(app_state.clone());

    // Spawn the daily reminder scan (after tracing is initialized)
    let reminder_use_cases = app_state.reminder_use_cases.clone();
    tokio::spawn(async move {
        run_reminder_loop(reminder_use_cases, reminder_hour).await;
    });

    let listener = tokio::net::TcpListener::bind(&bind_addr).await?;

    info!("Backend listening at {}", &listener.local_addr()?);

    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .await?;

    Ok(())
}
