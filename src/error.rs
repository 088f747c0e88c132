//! # Error Types
//!
//! Custom error types for the MAX186 gamepad driver using `thiserror`.

use thiserror::Error;

/// Main error type for the gamepad driver
#[derive(Debug, Error)]
pub enum GamepadError {
    /// Settings file errors (parse or validation)
    #[error("Configuration error: {0}")]
    Config(#[from] toml::de::Error),

    /// SPI bus errors (open, configure or transfer)
    #[error("SPI error: {0}")]
    Spi(String),

    /// GPIO sysfs errors
    #[error("GPIO error: {0}")]
    Gpio(String),

    /// Virtual input device errors
    #[error("Virtual device error: {0}")]
    Device(String),

    /// ADC channel selector outside the 4-bit range
    #[error("Invalid ADC channel {0} (must be 0-15)")]
    InvalidChannel(u8),

    /// I/O errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type alias for the gamepad driver
pub type Result<T> = std::result::Result<T, GamepadError>;
