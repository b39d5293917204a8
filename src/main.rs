use fiscal_insight::config::Config;
use fiscal_insight::server;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

#[tokio::main]
async fn main() {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "fiscal_insight=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = Config::from_env();
    tracing::info!("Starting Fiscal Insight on {}", config.address());

    let (host, port) = (config.host.clone(), config.port);
    let (_, app) = match server::build_app(config) {
        Ok(built) => built,
        Err(e) => {
            tracing::error!("Failed to load fiscal data: {}", e);
            std::process::exit(1);
        }
    };

    match server::serve(app, &host, port).await {
        Ok((actual_port, handle)) => {
            tracing::info!("Listening on http://{}:{}", host, actual_port);
            if let Err(e) = handle.await {
                tracing::error!("Server task failed: {}", e);
            }
        }
        Err(e) => {
            tracing::error!("Failed to bind {}:{}: {}", host, port, e);
            std::process::exit(1);
        }
    }
}
