//! HTTP server for the payroll journal-voucher engine.
//!
//! Usage: `payroll-jv [CONFIG_DIR]`. The configuration directory defaults to
//! `./config`; log verbosity follows `RUST_LOG` and defaults to `info`.

use tracing::info;
use tracing_subscriber::EnvFilter;

use payroll_jv::api::{AppState, create_router};
use payroll_jv::config::ConfigLoader;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let config_dir = std::env::args().nth(1).unwrap_or_else(|| "./config".to_string());
    let config = ConfigLoader::load(&config_dir)?;
    let bind = config.config().server.bind.clone();
    info!(
        config_dir = %config_dir,
        output_dir = %config.config().workspace.output_dir.display(),
        converter = config.converter().is_some(),
        "Configuration loaded"
    );

    let router = create_router(AppState::new(config));
    let listener = tokio::net::TcpListener::bind(&bind).await?;
    info!(bind = %bind, "Listening");
    axum::serve(listener, router).await?;

    Ok(())
}
