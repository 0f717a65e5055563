use std::sync::Arc;
use tokio::net::TcpListener;

use ladder_server::config::{generate_config_template, Config};
use ladder_server::routes;
use ladder_server::state::AppState;
use ladder_server::store::redis::RedisScoreStore;
use ladder_server::ws::broadcast::Broadcaster;
use ladder_server::ws::registry::ClientRegistry;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Load config with layered precedence: defaults < TOML < env < CLI
    let config = Config::load()?;

    // Handle --generate-config: print template and exit
    if config.generate_config {
        print!("{}", generate_config_template());
        return Ok(());
    }

    // Initialize tracing/logging
    if config.json_logs {
        tracing_subscriber::fmt()
            .json()
            .with_env_filter(
                tracing_subscriber::EnvFilter::try_from_default_env()
                    .unwrap_or_else(|_| "ladder_server=info".parse().unwrap()),
            )
            .init();
    } else {
        tracing_subscriber::fmt()
            .pretty()
            .with_env_filter(
                tracing_subscriber::EnvFilter::try_from_default_env()
                    .unwrap_or_else(|_| "ladder_server=info".parse().unwrap()),
            )
            .init();
    }

    tracing::info!("ladder server v{} starting", env!("CARGO_PKG_VERSION"));

    // Connect to the ranked score store; fail fast when it is unreachable
    let store = RedisScoreStore::connect(&config.redis_url, &config.leaderboard_key).await?;
    tracing::info!(key = %config.leaderboard_key, "Connected to score store");

    // Build application state: the registry is shared between the
    // broadcast delivery task and every connection session.
    let registry = ClientRegistry::new();
    let broadcast = Broadcaster::spawn(registry.clone());

    let app_state = AppState {
        store: Arc::new(store),
        registry,
        broadcast,
        top_n: config.leaderboard_size,
    };

    // Build router
    let app = routes::build_router(app_state);

    // Bind and serve
    let addr = format!("{}:{}", config.bind_address, config.port);
    let listener = TcpListener::bind(&addr).await?;
    tracing::info!("Listening on {}", addr);

    axum::serve(listener, app).await?;

    Ok(())
}
