//! Gateway entry point
//!
//! Run with:
//! ```bash
//! cargo run -p shop-gateway
//! ```
//!
//! Configuration is loaded from environment variables (and `.env`).

use shop_common::{try_init_tracing_with_config, GatewayConfig, TracingConfig};
use tracing::{error, info};

#[tokio::main]
async fn main() {
    let config = match GatewayConfig::from_env() {
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
        "Starting gateway"
    );

    if let Err(e) = shop_gateway::run(config).await {
        error!(error = %e, "Gateway failed");
        std::process::exit(1);
    }
}
