//! # Configuration Module
//!
//! Handles loading and validating driver settings from a TOML file.
//!
//! The settings file is optional: every section and field has a default that
//! matches the reference wiring (MAX186 on `/dev/spidev0.0`, sysfs GPIO,
//! 1 ms sampling interval). Button assignments live in the separate
//! `gamepad.conf` file, see [`crate::bindings`].
//!
//! ## Example
//!
//! ```toml
//! [spi]
//! device = "/dev/spidev0.0"
//! speed_hz = 2000000
//!
//! [device]
//! name = "MAX186 Gamepad"
//!
//! [sampling]
//! interval_us = 1000
//! ```

use serde::de::Error;
use serde::Deserialize;
use std::fs;
use std::path::Path;

use crate::adc::SPI_SPEED_HZ;
use crate::error::{GamepadError, Result};

/// Default settings file, relative to the working directory
pub const DEFAULT_SETTINGS_PATH: &str = "gamepad.toml";

/// Longest device name uinput accepts (UINPUT_MAX_NAME_SIZE minus the NUL)
const MAX_DEVICE_NAME_LEN: usize = 79;

/// Main configuration structure
#[derive(Debug, Deserialize, Clone, Default)]
pub struct Config {
    #[serde(default)]
    pub spi: SpiConfig,
    #[serde(default)]
    pub gpio: GpioConfig,
    #[serde(default)]
    pub device: DeviceConfig,
    #[serde(default)]
    pub sampling: SamplingConfig,
    #[serde(default)]
    pub buttons: ButtonsConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// SPI bus configuration
#[derive(Debug, Deserialize, Clone)]
pub struct SpiConfig {
    #[serde(default = "default_spi_device")]
    pub device: String,

    #[serde(default = "default_spi_speed_hz")]
    pub speed_hz: u32,
}

/// GPIO configuration
#[derive(Debug, Deserialize, Clone)]
pub struct GpioConfig {
    #[serde(default = "default_sysfs_root")]
    pub sysfs_root: String,

    #[serde(default = "default_export_settle_ms")]
    pub export_settle_ms: u64,
}

/// Virtual device identity
#[derive(Debug, Deserialize, Clone)]
pub struct DeviceConfig {
    #[serde(default = "default_device_name")]
    pub name: String,

    #[serde(default = "default_vendor_id")]
    pub vendor_id: u16,

    #[serde(default = "default_product_id")]
    pub product_id: u16,

    #[serde(default)]
    pub version: u16,

    #[serde(default = "default_create_settle_ms")]
    pub create_settle_ms: u64,
}

/// Sampling loop configuration
#[derive(Debug, Deserialize, Clone)]
pub struct SamplingConfig {
    #[serde(default = "default_interval_us")]
    pub interval_us: u64,

    #[serde(default = "default_log_interval_cycles")]
    pub log_interval_cycles: u64,
}

/// Button file location
#[derive(Debug, Deserialize, Clone)]
pub struct ButtonsConfig {
    #[serde(default = "default_buttons_path")]
    pub path: String,
}

/// Log output configuration
#[derive(Debug, Deserialize, Clone, Default)]
pub struct LoggingConfig {
    /// Directory for a daily-rolling log file; stdout only when unset
    #[serde(default)]
    pub directory: Option<String>,
}

// Default value functions
fn default_spi_device() -> String { "/dev/spidev0.0".to_string() }
fn default_spi_speed_hz() -> u32 { SPI_SPEED_HZ }

fn default_sysfs_root() -> String { "/sys/class/gpio".to_string() }
fn default_export_settle_ms() -> u64 { 100 }

fn default_device_name() -> String { "MAX186 Gamepad".to_string() }
fn default_vendor_id() -> u16 { 0x6969 }
fn default_product_id() -> u16 { 0x9696 }
fn default_create_settle_ms() -> u64 { 100 }

fn default_interval_us() -> u64 { 1000 }
fn default_log_interval_cycles() -> u64 { 10_000 }

fn default_buttons_path() -> String { "gamepad.conf".to_string() }

impl Default for SpiConfig {
    fn default() -> Self {
        Self {
            device: default_spi_device(),
            speed_hz: default_spi_speed_hz(),
        }
    }
}

impl Default for GpioConfig {
    fn default() -> Self {
        Self {
            sysfs_root: default_sysfs_root(),
            export_settle_ms: default_export_settle_ms(),
        }
    }
}

impl Default for DeviceConfig {
    fn default() -> Self {
        Self {
            name: default_device_name(),
            vendor_id: default_vendor_id(),
            product_id: default_product_id(),
            version: 0,
            create_settle_ms: default_create_settle_ms(),
        }
    }
}

impl Default for SamplingConfig {
    fn default() -> Self {
        Self {
            interval_us: default_interval_us(),
            log_interval_cycles: default_log_interval_cycles(),
        }
    }
}

impl Default for ButtonsConfig {
    fn default() -> Self {
        Self {
            path: default_buttons_path(),
        }
    }
}

fn invalid(message: impl std::fmt::Display) -> GamepadError {
    GamepadError::Config(toml::de::Error::custom(message))
}

impl Config {
    /// Load configuration from a TOML file
    ///
    /// # Errors
    ///
    /// Returns error if:
    /// - File cannot be read
    /// - TOML parsing fails
    /// - Validation fails
    ///
    /// # Examples
    ///
    /// ```no_run
    /// use max186_gamepad::config::Config;
    ///
    /// let config = Config::load("gamepad.toml")?;
    /// # Ok::<(), Box<dyn std::error::Error>>(())
    /// ```
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let contents = fs::read_to_string(path)?;
        let config: Config = toml::from_str(&contents)?;
        config.validate()?;
        Ok(config)
    }

    /// Load configuration, falling back to defaults if the file does not exist
    ///
    /// Returns the configuration and whether it was read from `path`.
    ///
    /// # Errors
    ///
    /// Same as [`Config::load`] for a file that exists.
    pub fn load_or_default<P: AsRef<Path>>(path: P) -> Result<(Self, bool)> {
        if !path.as_ref().exists() {
            return Ok((Config::default(), false));
        }
        Ok((Self::load(path)?, true))
    }

    /// Validate configuration values
    ///
    /// # Errors
    ///
    /// Returns error if any configuration value is out of valid range
    pub fn validate(&self) -> Result<()> {
        if self.spi.device.is_empty() {
            return Err(invalid("spi device cannot be empty"));
        }

        if self.spi.speed_hz == 0 || self.spi.speed_hz > 10_000_000 {
            return Err(invalid("speed_hz must be between 1 and 10000000"));
        }

        if self.gpio.sysfs_root.is_empty() {
            return Err(invalid("gpio sysfs_root cannot be empty"));
        }

        if self.gpio.export_settle_ms > 5000 {
            return Err(invalid("export_settle_ms must be at most 5000"));
        }

        if self.device.name.is_empty() || self.device.name.len() > MAX_DEVICE_NAME_LEN {
            return Err(invalid(format!(
                "device name must be between 1 and {} bytes",
                MAX_DEVICE_NAME_LEN
            )));
        }

        if self.device.create_settle_ms > 5000 {
            return Err(invalid("create_settle_ms must be at most 5000"));
        }

        if self.sampling.interval_us == 0 || self.sampling.interval_us > 1_000_000 {
            return Err(invalid("interval_us must be between 1 and 1000000"));
        }

        if self.sampling.log_interval_cycles == 0 {
            return Err(invalid("log_interval_cycles must be greater than 0"));
        }

        if self.buttons.path.is_empty() {
            return Err(invalid("buttons path cannot be empty"));
        }

        if matches!(&self.logging.directory, Some(dir) if dir.is_empty()) {
            return Err(invalid("logging directory cannot be empty when set"));
        }

        Ok(())
    }
}
