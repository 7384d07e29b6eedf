//! Robot configuration
//!
//! Stored as TOML. Missing fields take their defaults so a partial file is
//! valid.

use counter_transport::protocol::DEFAULT_DEVICE_NUMBER;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RobotConfig {
    /// Device number of the counting peripheral (0-63)
    #[serde(default)]
    pub device_number: u8,
    /// Robot loop period in milliseconds
    #[serde(default = "default_period_ms")]
    pub period_ms: u64,
    /// Potentiometer voltage that maps to full speed
    #[serde(default = "default_full_scale")]
    pub potentiometer_full_scale: f64,
    /// Battery voltage reported by the simulated power monitor
    #[serde(default = "default_battery_voltage")]
    pub battery_voltage: f64,
    /// Cycles spent disabled before the simulated autonomous period
    #[serde(default = "default_disabled_cycles")]
    pub disabled_cycles: u32,
    /// Cycles in the simulated autonomous period
    #[serde(default = "default_autonomous_cycles")]
    pub autonomous_cycles: u32,
}

fn default_period_ms() -> u64 {
    20
}

fn default_full_scale() -> f64 {
    5.0
}

fn default_battery_voltage() -> f64 {
    12.5
}

fn default_disabled_cycles() -> u32 {
    5
}

fn default_autonomous_cycles() -> u32 {
    50
}

impl Default for RobotConfig {
    fn default() -> Self {
        Self {
            device_number: DEFAULT_DEVICE_NUMBER,
            period_ms: default_period_ms(),
            potentiometer_full_scale: default_full_scale(),
            battery_voltage: default_battery_voltage(),
            disabled_cycles: default_disabled_cycles(),
            autonomous_cycles: default_autonomous_cycles(),
        }
    }
}

impl RobotConfig {
    /// Get the default config file path
    pub fn default_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("can_counter")
            .join("robot.toml")
    }

    /// Load config from a file, or return default if not found
    pub fn load(path: &PathBuf) -> anyhow::Result<Self> {
        if path.exists() {
            let content = std::fs::read_to_string(path)?;
            let config: RobotConfig = toml::from_str(&content)?;
            config.validate()?;
            Ok(config)
        } else {
            Ok(Self::default())
        }
    }

    /// Save config to a file
    pub fn save(&self, path: &PathBuf) -> anyhow::Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content = toml::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }

    /// Reject values the bus or the robot loop cannot use
    pub fn validate(&self) -> anyhow::Result<()> {
        if self.device_number > 63 {
            anyhow::bail!(
                "device_number {} out of range (0-63)",
                self.device_number
            );
        }
        if self.period_ms == 0 {
            anyhow::bail!("period_ms must be greater than 0");
        }
        if !(self.potentiometer_full_scale > 0.0) {
            anyhow::bail!(
                "potentiometer_full_scale must be positive, got {}",
                self.potentiometer_full_scale
            );
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn temp_path(name: &str) -> PathBuf {
        std::env::temp_dir()
            .join(format!("can_counter_test_{}", std::process::id()))
            .join(name)
    }

    #[test]
    fn test_default_config_serializes() {
        let config = RobotConfig::default();
        let toml_str = toml::to_string_pretty(&config).unwrap();
        assert!(toml_str.contains("period_ms = 20"));
        assert!(toml_str.contains("potentiometer_full_scale = 5.0"));
    }

    #[test]
    fn test_roundtrip() {
        let config = RobotConfig {
            device_number: 3,
            autonomous_cycles: 7,
            ..Default::default()
        };
        let toml_str = toml::to_string_pretty(&config).unwrap();
        let parsed: RobotConfig = toml::from_str(&toml_str).unwrap();
        assert_eq!(parsed, config);
    }

    #[test]
    fn test_partial_file_uses_defaults() {
        let parsed: RobotConfig = toml::from_str("device_number = 5\n").unwrap();
        assert_eq!(parsed.device_number, 5);
        assert_eq!(parsed.period_ms, 20);
        assert_eq!(parsed.battery_voltage, 12.5);
        assert_eq!(parsed.disabled_cycles, 5);
        assert_eq!(parsed.autonomous_cycles, 50);
    }

    #[test]
    fn test_load_missing_returns_default() {
        let path = temp_path("does_not_exist.toml");
        assert_eq!(RobotConfig::load(&path).unwrap(), RobotConfig::default());
    }

    #[test]
    fn test_save_then_load() {
        let path = temp_path("nested/robot.toml");
        let config = RobotConfig {
            battery_voltage: 11.75,
            ..Default::default()
        };
        config.save(&path).unwrap();
        assert_eq!(RobotConfig::load(&path).unwrap(), config);
        let _ = std::fs::remove_file(&path);
    }

    #[test]
    fn test_validate() {
        assert!(RobotConfig::default().validate().is_ok());
        let bad_device = RobotConfig {
            device_number: 64,
            ..Default::default()
        };
        assert!(bad_device.validate().is_err());
        let bad_scale = RobotConfig {
            potentiometer_full_scale: 0.0,
            ..Default::default()
        };
        assert!(bad_scale.validate().is_err());
    }
}
