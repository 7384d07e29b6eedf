// CLI definitions using clap

use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "can_counter")]
#[command(author, version, about = "CAN bus example: robot controller driving a counting peripheral")]
#[command(propagate_version = true)]
pub struct Cli {
    /// Config file path (default: ~/.config/can_counter/robot.toml)
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Log level (error, warn, info, debug, trace)
    #[arg(long, global = true, default_value = "info")]
    pub log_level: String,

    /// Enable bus monitoring (prints all packets written and read)
    #[arg(long, global = true)]
    pub monitor: bool,

    /// Show raw hex dump alongside decoded output
    #[arg(long, global = true)]
    pub hex: bool,

    /// Monitor output format
    #[arg(long, global = true, value_enum, default_value_t = MonitorFormat::Text)]
    pub format: MonitorFormat,

    /// Filter monitor output (all, writes, reads, api=0xNNN)
    #[arg(long, global = true)]
    pub filter: Option<String>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Compute an API id from class and index
    #[command(visible_alias = "api")]
    ApiId {
        /// API class
        #[arg(value_parser = parse_u16)]
        class: u16,
        /// API index within the class
        #[arg(value_parser = parse_u16)]
        index: u16,
    },

    /// Print the full 29-bit CAN frame ids of the counter packets
    #[command(visible_alias = "frame")]
    FrameId {
        /// Device number (default: from config)
        #[arg(short, long, value_parser = clap::value_parser!(u8).range(0..64))]
        device: Option<u8>,
        /// Only this API id (hex, e.g. 0x002)
        #[arg(long, value_parser = parse_u16)]
        api: Option<u16>,
    },

    /// Encode a counter control packet
    #[command(visible_alias = "enc")]
    Encode {
        /// Counting enabled
        #[arg(short, long)]
        enabled: bool,
        /// Button A pressed
        #[arg(short = 'a', long)]
        button_a: bool,
        /// Button B pressed
        #[arg(short = 'b', long)]
        button_b: bool,
        /// Speed (0-255)
        speed: u8,
    },

    /// Decode a packet payload given as hex bytes
    #[command(visible_alias = "dec")]
    Decode {
        /// API id of the packet (default: counter count)
        #[arg(long, value_parser = parse_u16)]
        api: Option<u16>,
        /// Payload bytes in hex (e.g. 2b 1a, or 0x2b 0x1a)
        #[arg(required = true, value_parser = parse_byte)]
        bytes: Vec<u8>,
    },

    /// Run the robot against a simulated peripheral
    Sim {
        /// Autonomous cycles (default: from config)
        #[arg(long)]
        cycles: Option<u32>,
        /// Hold button A during autonomous
        #[arg(long)]
        button_a: bool,
        /// Hold button B during autonomous
        #[arg(long)]
        button_b: bool,
        /// Potentiometer voltage
        #[arg(long, default_value_t = 2.5)]
        potentiometer: f64,
    },

    /// Write the default config file
    InitConfig {
        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },
}

#[derive(Copy, Clone, PartialEq, Eq, ValueEnum, Default, Debug)]
pub enum MonitorFormat {
    /// Human-readable text output
    #[default]
    Text,
    /// JSON output (one object per line)
    Json,
}

fn strip_hex_prefix(s: &str) -> &str {
    s.strip_prefix("0x")
        .or_else(|| s.strip_prefix("0X"))
        .unwrap_or(s)
}

/// Parse a u16 given in decimal or `0x` hex
pub fn parse_u16(s: &str) -> Result<u16, String> {
    let parsed = if s.starts_with("0x") || s.starts_with("0X") {
        u16::from_str_radix(strip_hex_prefix(s), 16)
    } else {
        s.parse()
    };
    parsed.map_err(|e| format!("invalid number '{}': {}", s, e))
}

/// Parse a byte given in hex, with or without `0x`
pub fn parse_byte(s: &str) -> Result<u8, String> {
    u8::from_str_radix(strip_hex_prefix(s), 16).map_err(|e| format!("invalid byte '{}': {}", s, e))
}
