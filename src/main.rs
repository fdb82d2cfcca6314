use log::{error, info, warn};
use service::{config::Config, logging::Logger};

#[tokio::main]
async fn main() {
    let config = Config::new();
    if let Err(e) = Logger::init_logger(&config) {
        eprintln!("Failed to start logger: {e}");
    }

    info!("Starting up in {} mode", config.runtime_env());

    let app_state = match web::AppState::from_config(&config) {
        Ok(app_state) => app_state,
        Err(e) => {
            error!("Failed to build application state: {e}");
            std::process::exit(1);
        }
    };

    if app_state.enabled_providers().is_empty() {
        warn!("No OAuth provider is configured; every login request will be rejected");
    }

    if let Err(e) = web::init_server(&config, app_state).await {
        error!("Server stopped: {e}");
        std::process::exit(1);
    }
}
