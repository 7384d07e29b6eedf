//! CAN Counter Example CLI
//!
//! Packet tools for the counting peripheral and a simulated robot run.

use anyhow::Result;
use clap::Parser;
use tracing::info;

use can_counter::RobotConfig;

// CLI definitions
mod cli;
use cli::{Cli, Commands};

mod commands;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&cli.log_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .init();

    let config_path = cli.config.clone().unwrap_or_else(RobotConfig::default_path);

    // Create printer config if monitoring is enabled
    let printer_config =
        commands::create_printer_config(cli.monitor, cli.hex, cli.format, cli.filter.as_deref())?;

    match cli.command {
        Commands::ApiId { class, index } => {
            commands::codec::api_id(class, index)?;
        }
        Commands::Encode {
            enabled,
            button_a,
            button_b,
            speed,
        } => {
            commands::codec::encode(enabled, button_a, button_b, speed)?;
        }
        Commands::Decode { api, bytes } => {
            commands::codec::decode(api, &bytes, cli.format)?;
        }
        Commands::FrameId { device, api } => {
            let config = RobotConfig::load(&config_path)?;
            commands::codec::frame_id(&config, device, api)?;
        }
        Commands::Sim {
            cycles,
            button_a,
            button_b,
            potentiometer,
        } => {
            info!("Loading config from {:?}", config_path);
            let config = RobotConfig::load(&config_path)?;
            let opts = commands::sim::SimOptions {
                cycles,
                button_a,
                button_b,
                potentiometer,
            };
            commands::sim::run(&config, opts, printer_config).await?;
        }
        Commands::InitConfig { force } => {
            commands::init_config(&config_path, force)?;
        }
    }

    Ok(())
}
