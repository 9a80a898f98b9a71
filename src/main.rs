use deploy_relay::api::create_router;
use deploy_relay::logging::{FileLogger, setup_logging};
use deploy_relay::notifier::SlackNotifier;
use deploy_relay::{AppState, RelayConfig, load_config};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{error, info};

const DEFAULT_BIND_ADDRESS: &str = "0.0.0.0:8080";
const DEFAULT_CONFIG_PATH: &str = "relay_config.toml";

#[tokio::main]
async fn main() {
    dotenv::dotenv().ok();

    let bind_address =
        std::env::var("BIND_ADDRESS").unwrap_or_else(|_| DEFAULT_BIND_ADDRESS.to_string());
    let config_path =
        std::env::var("RELAY_CONFIG").unwrap_or_else(|_| DEFAULT_CONFIG_PATH.to_string());
    let file_logger = std::env::var("LOG_DIR")
        .ok()
        .map(|dir| FileLogger::new(PathBuf::from(dir)));

    let _log_guard = match setup_logging(file_logger.as_ref()) {
        Ok(guard) => guard,
        Err(e) => {
            eprintln!("Logging error: {}", e);
            std::process::exit(1);
        }
    };

    let config: RelayConfig = match load_config(&config_path) {
        Ok(cfg) => cfg,
        Err(e) => {
            error!("Configuration error: {}", e);
            std::process::exit(1);
        }
    };

    let notifier = match SlackNotifier::new(&config.delivery) {
        Ok(notifier) => notifier,
        Err(e) => {
            error!("Failed to build HTTP client: {}", e);
            std::process::exit(1);
        }
    };

    info!("Using config at {:?}", config_path);
    info!(
        "Relaying to {} channel(s) in {} mode",
        config.channels.len(),
        config.delivery.mode.as_str()
    );

    let state = Arc::new(AppState::new(config, Arc::new(notifier)));
    let app = create_router(state);

    let listener = match tokio::net::TcpListener::bind(&bind_address).await {
        Ok(listener) => listener,
        Err(e) => {
            error!("Failed to bind {}: {}", bind_address, e);
            std::process::exit(1);
        }
    };
    info!("Listening on {}", bind_address);

    if let Err(e) = axum::serve(listener, app).await {
        error!("Server error: {}", e);
    }
}
