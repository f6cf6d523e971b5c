use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

use sticky_router::config::Config;
use sticky_router::router;

#[tokio::main]
async fn main() {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "sticky_router=info".into()),
        )
        .with(
            tracing_subscriber::fmt::layer()
                .with_file(true)
                .with_line_number(true)
                .with_target(true),
        )
        .init();

    let config = Config::load();
    if let Err(err) = router::serve(config).await {
        tracing::error!(error = %err, "Sticky router exited.");
        std::process::exit(1);
    }
}
