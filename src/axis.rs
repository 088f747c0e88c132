//! # Stick Axes
//!
//! Fixed assignment of ADC channels to the four stick axes, and the linear
//! scaler from raw ADC samples to the virtual device's axis range.
//!
//! ## Channel Assignments
//!
//! | Axis | ADC Channel | evdev Code | Inverted |
//! |------|-------------|------------|----------|
//! | Left X | 0 | ABS_X | no |
//! | Left Y | 4 | ABS_Y | no |
//! | Right X | 1 | ABS_RX | yes |
//! | Right Y | 5 | ABS_RY | yes |
//!
//! The right stick is wired the other way round on the board, hence the
//! inversion.
//!
//! ## Scaling
//!
//! ```
//! use max186_gamepad::axis::{scale, AXIS_MAX};
//!
//! assert_eq!(scale(0, false), 0);
//! assert_eq!(scale(2047, false), AXIS_MAX);
//! assert_eq!(scale(2047, true), 0);
//! ```

use evdev::AbsoluteAxisType;

use crate::adc::ADC_MAX;

/// Minimum reported axis value.
pub const AXIS_MIN: i32 = 0;
/// Maximum reported axis value.
pub const AXIS_MAX: i32 = 255;
/// Reported value before the first good sample of an axis.
pub const AXIS_CENTER: i32 = 128;

/// Largest sample the scaler maps to [`AXIS_MAX`].
const ADC_FULL_SCALE: i32 = ADC_MAX as i32 - 1;

/// One of the four logical stick axes, in report order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StickAxis {
    LeftX,
    LeftY,
    RightX,
    RightY,
}

impl StickAxis {
    /// All axes in the order they are sampled and emitted.
    pub const ALL: [StickAxis; 4] = [
        StickAxis::LeftX,
        StickAxis::LeftY,
        StickAxis::RightX,
        StickAxis::RightY,
    ];

    /// Position of this axis in [`StickAxis::ALL`].
    #[must_use]
    pub fn index(self) -> usize {
        self as usize
    }

    /// ADC multiplexer channel wired to this axis.
    #[must_use]
    pub fn channel(self) -> u8 {
        match self {
            StickAxis::LeftX => 0,
            StickAxis::LeftY => 4,
            StickAxis::RightX => 1,
            StickAxis::RightY => 5,
        }
    }

    /// Whether the sample is inverted before it is reported.
    #[must_use]
    pub fn inverted(self) -> bool {
        matches!(self, StickAxis::RightX | StickAxis::RightY)
    }

    /// evdev absolute axis this stick axis is reported as.
    #[must_use]
    pub fn abs_axis(self) -> AbsoluteAxisType {
        match self {
            StickAxis::LeftX => AbsoluteAxisType::ABS_X,
            StickAxis::LeftY => AbsoluteAxisType::ABS_Y,
            StickAxis::RightX => AbsoluteAxisType::ABS_RX,
            StickAxis::RightY => AbsoluteAxisType::ABS_RY,
        }
    }
}

/// Scale a raw ADC sample to `AXIS_MIN..=AXIS_MAX`, optionally inverted.
///
/// Samples at or above `ADC_MAX` are clamped to the full-scale value before
/// scaling. Integer division truncates.
///
/// # Arguments
///
/// * `raw` - Sample returned by [`crate::adc::read_channel`]
/// * `invert` - Report `AXIS_MAX - scaled` instead of `scaled`
#[must_use]
pub fn scale(raw: u16, invert: bool) -> i32 {
    let raw = i32::from(raw).min(ADC_FULL_SCALE);
    let scaled = (raw * AXIS_MAX / ADC_FULL_SCALE).clamp(AXIS_MIN, AXIS_MAX);

    if invert {
        AXIS_MAX - scaled
    } else {
        scaled
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_channel_assignment() {
        let channels: Vec<u8> = StickAxis::ALL.iter().map(|a| a.channel()).collect();
        assert_eq!(channels, vec![0, 4, 1, 5]);
    }

    #[test]
    fn test_only_right_stick_inverted() {
        let inverted: Vec<bool> = StickAxis::ALL.iter().map(|a| a.inverted()).collect();
        assert_eq!(inverted, vec![false, false, true, true]);
    }

    #[test]
    fn test_abs_codes_in_report_order() {
        let codes: Vec<AbsoluteAxisType> = StickAxis::ALL.iter().map(|a| a.abs_axis()).collect();
        assert_eq!(
            codes,
            vec![
                AbsoluteAxisType::ABS_X,
                AbsoluteAxisType::ABS_Y,
                AbsoluteAxisType::ABS_RX,
                AbsoluteAxisType::ABS_RY,
            ]
        );
    }

    #[test]
    fn test_index_matches_position() {
        for (i, axis) in StickAxis::ALL.iter().enumerate() {
            assert_eq!(axis.index(), i);
        }
    }

    #[test]
    fn test_scale_boundaries() {
        assert_eq!(scale(0, false), 0);
        assert_eq!(scale(2047, false), AXIS_MAX);
    }

    #[test]
    fn test_scale_inverted_boundaries() {
        assert_eq!(scale(0, true), AXIS_MAX);
        assert_eq!(scale(2047, true), 0);
    }

    #[test]
    fn test_scale_midpoint() {
        // 1024 * 255 / 2047 = 127.56 -> 127
        assert_eq!(scale(1024, false), 127);
        assert_eq!(scale(1024, true), 128);
    }

    #[test]
    fn test_inversion_is_complement_for_every_sample() {
        for raw in 0..ADC_MAX {
            assert_eq!(scale(raw, false) + scale(raw, true), AXIS_MAX, "raw = {}", raw);
        }
    }

    #[test]
    fn test_mirrored_samples_sum_within_rounding() {
        // scale(r) + scale(2047 - r) loses at most one count to truncation
        for raw in 0..ADC_MAX {
            let sum = scale(raw, false) + scale(2047 - raw, false);
            assert!((AXIS_MAX - sum).abs() <= 1, "raw = {}, sum = {}", raw, sum);
        }
    }

    #[test]
    fn test_scale_is_monotonic() {
        let mut previous = scale(0, false);
        for raw in 1..ADC_MAX {
            let current = scale(raw, false);
            assert!(current >= previous, "raw = {}", raw);
            previous = current;
        }
    }

    #[test]
    fn test_out_of_range_samples_clamped() {
        assert_eq!(scale(2048, false), AXIS_MAX);
        assert_eq!(scale(4095, false), AXIS_MAX);
        assert_eq!(scale(u16::MAX, true), 0);
    }
}
