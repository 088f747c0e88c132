//! Trait abstraction for the SPI bus the ADC sits on, to enable testing

use spidev::{SpiModeFlags, Spidev, SpidevOptions, SpidevTransfer};
use std::io;
use tracing::{debug, info};

use crate::config::SpiConfig;
use crate::error::{GamepadError, Result};

/// Length of one ADC command/response frame in bytes.
pub const FRAME_LEN: usize = 3;

/// Full-duplex SPI transfer of one ADC frame.
///
/// A transfer must be a single bus message: chip select stays asserted for
/// all three bytes.
#[cfg_attr(test, mockall::automock)]
pub trait AdcBus {
    /// Clock out `tx` and return the bytes clocked in at the same time.
    fn transfer(&mut self, tx: &[u8; FRAME_LEN]) -> io::Result<[u8; FRAME_LEN]>;
}

/// Linux spidev character device configured for the MAX186.
pub struct SpidevBus {
    spi: Spidev,
    device_path: String,
}

impl std::fmt::Debug for SpidevBus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SpidevBus")
            .field("device_path", &self.device_path)
            .finish_non_exhaustive()
    }
}

impl SpidevBus {
    /// Open and configure the SPI device named in the settings.
    ///
    /// The bus is set to mode 0, 8-bit words, and the configured clock.
    ///
    /// # Errors
    ///
    /// Returns `Spi` if the device cannot be opened or configured. This is a
    /// setup failure and the driver cannot run without it.
    ///
    /// # Examples
    ///
    /// ```no_run
    /// use max186_gamepad::adc::bus_trait::SpidevBus;
    /// use max186_gamepad::config::SpiConfig;
    ///
    /// let bus = SpidevBus::open(&SpiConfig::default())?;
    /// println!("ADC on {}", bus.device_path());
    /// # Ok::<(), Box<dyn std::error::Error>>(())
    /// ```
    pub fn open(config: &SpiConfig) -> Result<Self> {
        debug!("Opening SPI device {} at {} Hz", config.device, config.speed_hz);

        let mut spi = Spidev::open(&config.device)
            .map_err(|e| GamepadError::Spi(format!("Failed to open {}: {}", config.device, e)))?;

        let options = SpidevOptions::new()
            .bits_per_word(8)
            .max_speed_hz(config.speed_hz)
            .mode(SpiModeFlags::SPI_MODE_0)
            .build();
        spi.configure(&options)
            .map_err(|e| GamepadError::Spi(format!("Failed to configure {}: {}", config.device, e)))?;

        info!("Opened SPI device {} at {} Hz", config.device, config.speed_hz);
        Ok(Self {
            spi,
            device_path: config.device.clone(),
        })
    }

    /// Path of the opened spidev node (e.g. `/dev/spidev0.0`).
    pub fn device_path(&self) -> &str {
        &self.device_path
    }
}

impl AdcBus for SpidevBus {
    fn transfer(&mut self, tx: &[u8; FRAME_LEN]) -> io::Result<[u8; FRAME_LEN]> {
        let mut rx = [0u8; FRAME_LEN];
        {
            let mut transfer = SpidevTransfer::read_write(tx, &mut rx);
            self.spi.transfer(&mut transfer)?;
        }
        Ok(rx)
    }
}

#[cfg(test)]
pub mod mocks {
    use super::*;
    use std::collections::HashSet;

    /// Scripted ADC that answers each channel with a fixed 11-bit sample
    #[derive(Debug, Default)]
    pub struct ScriptedBus {
        /// Sample returned for channels 0-7
        pub samples: [u16; 8],
        /// Channels whose transfer fails
        pub failing: HashSet<u8>,
        /// Every frame clocked out, in order
        pub sent: Vec<[u8; FRAME_LEN]>,
    }

    impl ScriptedBus {
        pub fn new(samples: [u16; 8]) -> Self {
            Self {
                samples,
                ..Self::default()
            }
        }

        pub fn fail_channel(&mut self, channel: u8) {
            self.failing.insert(channel);
        }

        pub fn recover_channel(&mut self, channel: u8) {
            self.failing.remove(&channel);
        }

        /// Channels selected by the frames sent so far
        pub fn channels_read(&self) -> Vec<u8> {
            self.sent.iter().map(|tx| (tx[0] >> 4) & 0x07).collect()
        }

        /// Response bytes the MAX186 would clock out for `sample`
        pub fn response_for(sample: u16) -> [u8; FRAME_LEN] {
            [0x00, (sample >> 4) as u8, ((sample & 0x0F) << 4) as u8]
        }
    }

    impl AdcBus for ScriptedBus {
        fn transfer(&mut self, tx: &[u8; FRAME_LEN]) -> io::Result<[u8; FRAME_LEN]> {
            self.sent.push(*tx);
            let channel = (tx[0] >> 4) & 0x07;
            if self.failing.contains(&channel) {
                return Err(io::Error::new(io::ErrorKind::TimedOut, "Mock transfer error"));
            }
            Ok(Self::response_for(self.samples[channel as usize]))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_open_invalid_device_returns_error() {
        let config = SpiConfig {
            device: "/dev/nonexistent_spidev_12345".to_string(),
            ..SpiConfig::default()
        };

        match SpidevBus::open(&config) {
            Err(GamepadError::Spi(msg)) => {
                assert!(msg.contains("/dev/nonexistent_spidev_12345"));
                assert!(msg.contains("Failed to open"));
            }
            other => panic!("Expected Spi error, got: {:?}", other),
        }
    }

    #[test]
    fn test_scripted_bus_records_frames() {
        let mut bus = mocks::ScriptedBus::new([0, 100, 200, 300, 400, 500, 600, 700]);
        let rx = bus.transfer(&[0xCF, 0x00, 0x00]).unwrap();

        assert_eq!(rx, mocks::ScriptedBus::response_for(400));
        assert_eq!(bus.channels_read(), vec![4]);
    }

    // Integration test - only runs with a MAX186 wired to spidev0.0
    #[test]
    #[ignore]
    fn test_transfer_with_real_hardware() {
        let mut bus = SpidevBus::open(&SpiConfig::default()).expect("SPI device not found");
        let rx = bus.transfer(&[0x8F, 0x00, 0x00]);
        assert!(rx.is_ok(), "Transfer failed: {:?}", rx);
    }
}
