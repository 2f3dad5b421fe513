// Module declarations
pub mod api;
pub mod commands;
pub mod config;
pub mod console;
pub mod dashboard;
pub mod logging;
pub mod state;
pub mod utils;

pub use api::{ApiError, TunnelApi, TunnelServiceClient};
pub use commands::Command;
pub use config::DashboardConfig;
pub use dashboard::{Dashboard, DashboardError, DashboardResult};
pub use state::{AppState, DashboardSnapshot};

use anyhow::{Context, Result};
use state::SystemClock;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;

/// Entry point for the operator console binary. The optional first
/// argument is a config file path.
pub fn run() -> Result<()> {
    logging::init();

    let config_path = std::env::args_os().nth(1).map(PathBuf::from);
    let config = DashboardConfig::load(config_path.as_deref())?;

    // Every component shares one event loop
    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .context("Failed to start async runtime")?;

    let result = runtime.block_on(serve(config));
    runtime.shutdown_timeout(Duration::from_millis(250));
    result
}

async fn serve(config: DashboardConfig) -> Result<()> {
    log::info!("Tunnel service: {}", config.api_base);

    let client = TunnelServiceClient::new(&config.api_base, config.request_timeout())
        .context("Failed to build HTTP client")?;
    let password = config.password.clone();
    let dashboard = Dashboard::new(client, config, Arc::new(SystemClock));

    // Reuse an existing session cookie if the service still accepts it
    dashboard.check_session().await;
    if !dashboard.is_authenticated().await {
        if let Some(password) = password {
            if let Err(e) = dashboard.login(&password).await {
                log::warn!("Login with configured password failed: {}", e);
            }
        }
    }

    println!("{}", console::HELP);
    let (commands, receiver) = mpsc::unbounded_channel();
    let renderer = tokio::spawn(console::render_snapshots(dashboard.subscribe()));
    let reader = tokio::spawn(async move {
        if let Err(e) = console::read_commands(commands).await {
            log::error!("Console input failed: {}", e);
        }
    });

    dashboard.run(receiver).await;

    reader.abort();
    renderer.abort();
    Ok(())
}
