//! # MAX186 ADC Module
//!
//! Reads the multiplexed analog channels of a MAX186 over spidev.
//!
//! ## Frame Format
//!
//! Each conversion is one 3-byte full-duplex transfer at 2 MHz, 8-bit words:
//!
//! | Byte | TX | RX |
//! |------|----|----|
//! | 0 | Control byte | ignored |
//! | 1 | 0x00 (clock out) | high bits of the result |
//! | 2 | 0x00 (clock out) | low bits in the top nibble |
//!
//! The control byte is `0x8F | channel << 4`: start bit, channel selector,
//! unipolar, single-ended, external clock mode.
//!
//! The sample is rebuilt as `rx[1] << 4 | rx[2] >> 4`, which is the 12-bit
//! conversion result shifted down to the driver's `0..ADC_MAX` range.

pub mod bus_trait;

use crate::error::{GamepadError, Result};
pub use bus_trait::{AdcBus, SpidevBus, FRAME_LEN};

/// Exclusive upper bound of a well-formed sample.
pub const ADC_MAX: u16 = 2048;

/// SPI clock for ADC transfers.
pub const SPI_SPEED_HZ: u32 = 2_000_000;

/// Highest channel selector that fits in the control byte.
pub const MAX_CHANNEL: u8 = 15;

/// Start, unipolar, single-ended, external clock.
const CONTROL_BASE: u8 = 0x8F;

/// Build the command frame for one conversion on `channel`.
///
/// # Errors
///
/// Returns `InvalidChannel` for channels above [`MAX_CHANNEL`].
///
/// # Examples
///
/// ```
/// use max186_gamepad::adc::command_frame;
///
/// assert_eq!(command_frame(0)?, [0x8F, 0x00, 0x00]);
/// assert_eq!(command_frame(5)?, [0xDF, 0x00, 0x00]);
/// # Ok::<(), max186_gamepad::error::GamepadError>(())
/// ```
pub fn command_frame(channel: u8) -> Result<[u8; FRAME_LEN]> {
    if channel > MAX_CHANNEL {
        return Err(GamepadError::InvalidChannel(channel));
    }
    Ok([CONTROL_BASE | (channel << 4), 0x00, 0x00])
}

/// Rebuild the sample from the bytes clocked in during a transfer.
#[must_use]
pub fn decode_sample(rx: &[u8; FRAME_LEN]) -> u16 {
    (u16::from(rx[1]) << 4) | (u16::from(rx[2]) >> 4)
}

/// Read one sample from `channel`.
///
/// Performs exactly one bus transfer.
///
/// # Errors
///
/// - `InvalidChannel` if `channel` is above [`MAX_CHANNEL`] (no transfer is made)
/// - `Spi` if the transfer fails; callers treat this as a transient fault
///
/// # Examples
///
/// ```no_run
/// use max186_gamepad::adc::{read_channel, SpidevBus};
/// use max186_gamepad::config::SpiConfig;
///
/// let mut bus = SpidevBus::open(&SpiConfig::default())?;
/// let sample = read_channel(&mut bus, 0)?;
/// # Ok::<(), Box<dyn std::error::Error>>(())
/// ```
pub fn read_channel<B: AdcBus + ?Sized>(bus: &mut B, channel: u8) -> Result<u16> {
    let tx = command_frame(channel)?;
    let rx = bus
        .transfer(&tx)
        .map_err(|e| GamepadError::Spi(format!("Transfer on channel {} failed: {}", channel, e)))?;
    Ok(decode_sample(&rx))
}

#[cfg(test)]
mod tests {
    use super::bus_trait::MockAdcBus;
    use super::*;
    use std::io;

    #[test]
    fn test_command_frame_control_bytes() {
        let expected = [0x8F, 0x9F, 0xAF, 0xBF, 0xCF, 0xDF, 0xEF, 0xFF];
        for (channel, control) in expected.iter().enumerate() {
            assert_eq!(command_frame(channel as u8).unwrap(), [*control, 0x00, 0x00]);
        }
    }

    #[test]
    fn test_command_frame_rejects_wide_channel() {
        match command_frame(16) {
            Err(GamepadError::InvalidChannel(16)) => {}
            other => panic!("Expected InvalidChannel, got: {:?}", other),
        }
    }

    #[test]
    fn test_decode_sample() {
        assert_eq!(decode_sample(&[0x00, 0x00, 0x00]), 0);
        assert_eq!(decode_sample(&[0xFF, 0x7F, 0xF0]), 2047);
        assert_eq!(decode_sample(&[0x00, 0x40, 0x00]), 1024);
        // Low nibble of the last byte is padding
        assert_eq!(decode_sample(&[0x00, 0x12, 0x3F]), 0x123);
    }

    #[test]
    fn test_read_channel_sends_one_frame() {
        let mut bus = MockAdcBus::new();
        bus.expect_transfer()
            .withf(|tx| *tx == [0xCF, 0x00, 0x00])
            .times(1)
            .returning(|_| Ok([0x00, 0x64, 0x20]));

        assert_eq!(read_channel(&mut bus, 4).unwrap(), 0x642);
    }

    #[test]
    fn test_read_channel_reports_transfer_error() {
        let mut bus = MockAdcBus::new();
        bus.expect_transfer()
            .times(1)
            .returning(|_| Err(io::Error::new(io::ErrorKind::Other, "bus fault")));

        match read_channel(&mut bus, 1) {
            Err(GamepadError::Spi(msg)) => {
                assert!(msg.contains("channel 1"));
                assert!(msg.contains("bus fault"));
            }
            other => panic!("Expected Spi error, got: {:?}", other),
        }
    }

    #[test]
    fn test_read_channel_invalid_channel_skips_transfer() {
        let mut bus = MockAdcBus::new();
        bus.expect_transfer().never();

        assert!(matches!(
            read_channel(&mut bus, 200),
            Err(GamepadError::InvalidChannel(200))
        ));
    }

    #[test]
    fn test_read_channel_with_scripted_bus() {
        let mut bus = bus_trait::mocks::ScriptedBus::new([10, 20, 30, 40, 50, 60, 70, 2047]);

        assert_eq!(read_channel(&mut bus, 7).unwrap(), 2047);
        assert_eq!(read_channel(&mut bus, 2).unwrap(), 30);
        assert_eq!(bus.channels_read(), vec![7, 2]);
    }
}
