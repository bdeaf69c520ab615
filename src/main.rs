//! # DXL Bridge
//!
//! Connects to a LUCI bridge over TCP or USB serial and moves the configured servo fleet to its
//! neutral pose.
//!
//! # Usage
//!
//! ```bash
//! dxl-bridge config/default.toml
//! ```
//!
//! Without an argument the built-in defaults are used (bridge at
//! 192.168.1.100:7777, motors 1-12, AX-12, 57142 baud).

use anyhow::{Context, Result};
use tracing::info;

use dxl_bridge::config::Config;
use dxl_bridge::fleet::Fleet;
use dxl_bridge::luci::encoder::SyncWriteEncoder;
use dxl_bridge::transport::open_sender;

fn load_config() -> Result<Config> {
    match std::env::args().nth(1) {
        Some(path) => {
            Config::load(&path).with_context(|| format!("Failed to load configuration from {}", path))
        }
        None => {
            let config = Config::default();
            config.validate()?;
            Ok(config)
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into())
        )
        .init();

    info!("DXL Bridge v{} starting...", env!("CARGO_PKG_VERSION"));

    let config = load_config()?;
    let encoder = SyncWriteEncoder::from(&config.bus);
    let fleet = Fleet::from(&config.fleet);

    info!(
        "Transport: {:?}; bus: {} baud, module {}, {:?} layout; fleet: {} x {}",
        config.transport.kind,
        encoder.baud_rate,
        encoder.module_number,
        encoder.layout,
        fleet.len(),
        fleet.family()
    );

    let mut sender = tokio::select! {
        result = open_sender(&config.transport) => result?,
        _ = tokio::signal::ctrl_c() => {
            info!("Received Ctrl+C, shutting down...");
            return Ok(());
        }
    };

    // Each clamp is already logged by the converter
    let frame = fleet.move_to_neutral(sender.as_mut(), &encoder).await?;
    info!(
        "Sent neutral pose to {} motors ({} bytes, {} inputs clamped)",
        frame.motor_count,
        frame.bytes.len(),
        frame.clamped.len()
    );
    Ok(())
}
