use std::sync::Arc;
use tokio::net::TcpListener;

use callrelay_server::config::{generate_config_template, Config};
use callrelay_server::push::FcmClient;
use callrelay_server::routes;
use callrelay_server::state::AppState;
use callrelay_server::wakeup::{self, Broadcaster};

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
                    .unwrap_or_else(|_| "callrelay_server=info".parse().unwrap()),
            )
            .init();
    } else {
        tracing_subscriber::fmt()
            .pretty()
            .with_env_filter(
                tracing_subscriber::EnvFilter::try_from_default_env()
                    .unwrap_or_else(|_| "callrelay_server=info".parse().unwrap()),
            )
            .init();
    }

    tracing::info!("callrelay server v{} starting", env!("CARGO_PKG_VERSION"));

    // Start the FCM keep-alive broadcaster. `keep_alive_disabled` is read
    // once here and never re-read; a disabled broadcaster still ticks but
    // sends no push traffic.
    let push_config = config.push.clone().unwrap_or_default();
    let transport = Arc::new(FcmClient::new(push_config.endpoint, push_config.server_key)?);
    wakeup::spawn_scheduler(Broadcaster::new(transport, config.keep_alive_disabled));
    tracing::info!(
        "FCM keep-alive broadcaster: {}",
        if config.keep_alive_disabled {
            "DISABLED"
        } else {
            "ENABLED"
        }
    );

    // Build application state and router
    let state = AppState::new(!config.keep_alive_disabled);
    let app = routes::build_router(state);

    // Bind and serve
    let addr = format!("{}:{}", config.bind_address, config.port);
    let listener = TcpListener::bind(&addr).await?;
    tracing::info!("Listening on {}", addr);

    axum::serve(listener, app).await?;

    Ok(())
}
