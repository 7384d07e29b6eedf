//! Command handlers for the CLI application.
//!
//! - `codec`: offline packet tools (api-id, frame-id, encode, decode)
//! - `sim`: robot run against the simulated peripheral

pub mod codec;
pub mod sim;

use can_counter::RobotConfig;
use counter_transport::{OutputFormat, PacketFilter, PrinterConfig};
use std::path::PathBuf;

use crate::cli::MonitorFormat;

/// Result type for command handlers
pub type CommandResult = anyhow::Result<()>;

impl From<MonitorFormat> for OutputFormat {
    fn from(format: MonitorFormat) -> Self {
        match format {
            MonitorFormat::Text => OutputFormat::Text,
            MonitorFormat::Json => OutputFormat::Json,
        }
    }
}

/// Build the printer config when monitoring is enabled
pub fn create_printer_config(
    monitor: bool,
    hex: bool,
    format: MonitorFormat,
    filter: Option<&str>,
) -> anyhow::Result<Option<PrinterConfig>> {
    if !monitor {
        return Ok(None);
    }

    let filter = match filter {
        Some(f) => f.parse::<PacketFilter>().map_err(anyhow::Error::msg)?,
        None => PacketFilter::All,
    };

    Ok(Some(
        PrinterConfig::default()
            .with_hex(hex)
            .with_filter(filter)
            .with_format(format.into()),
    ))
}

/// Write the default config to `path`
pub fn init_config(path: &PathBuf, force: bool) -> CommandResult {
    if path.exists() && !force {
        anyhow::bail!(
            "{} already exists (use --force to overwrite)",
            path.display()
        );
    }
    RobotConfig::default().save(path)?;
    println!("Wrote default config to {}", path.display());
    Ok(())
}
