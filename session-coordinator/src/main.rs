use std::sync::Arc;

use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

use session_coordinator::config::Config;
use session_coordinator::model::AppState;
use session_coordinator::{build_router, housekeeper};

#[tokio::main]
/// Loads configuration, starts the housekeeping sweep, and serves the
/// `/api/*` routes. The process owns every room and the matchmaking queue
/// for its entire lifetime; nothing here survives a restart.
async fn main() {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "session_coordinator=info".into()),
        )
        .with(
            tracing_subscriber::fmt::layer()
                .with_file(true)
                .with_line_number(true)
                .with_target(true)
                .with_thread_ids(true),
        )
        .init();

    let config = Config::load();
    let listen_addr = config.listen_addr.clone();
    let state = Arc::new(AppState::new(config));

    let housekeeper_state = state.clone();
    tokio::spawn(async move {
        housekeeper::run(housekeeper_state).await;
    });

    let app = build_router(state);

    let listener = tokio::net::TcpListener::bind(&listen_addr)
        .await
        .unwrap_or_else(|err| panic!("failed to bind {listen_addr}: {err}"));

    tracing::info!(%listen_addr, "Session coordinator listening.");
    axum::serve(listener, app).await.unwrap();
}
