//! auth-service entry point
//!
//! Run with:
//! ```bash
//! cargo run -p shop-api --bin auth-service
//! ```
//!
//! Configuration is loaded from environment variables (and `.env`).

use shop_common::{try_init_tracing_with_config, AuthServiceConfig, TracingConfig};
use tracing::{error, info};

#[tokio::main]
async fn main() {
    let config = match AuthServiceConfig::from_env() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Failed to load configuration: {e}");
            std::process::exit(1);
        }
    };

    // Initialize tracing
    if let Err(e) = try_init_tracing_with_config(TracingConfig::for_environment(config.app.env)) {
        eprintln!("Warning: Failed to initialize tracing: {e}");
    }

    info!(
        env = ?config.app.env,
        address = %config.server.address(),
        "Starting auth-service"
    );

    if let Err(e) = shop_api::server::run_auth_service(config).await {
        error!(error = %e, "auth-service failed");
        std::process::exit(1);
    }
}
