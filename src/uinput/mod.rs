//! # Virtual Gamepad Module
//!
//! Turns one snapshot of stick and button state into an ordered batch of
//! input events and writes it to the virtual device.
//!
//! ## Report Layout
//!
//! Every batch has the same shape, in this order:
//!
//! 1. Four `EV_ABS` events: `ABS_X`, `ABS_Y`, `ABS_RX`, `ABS_RY`
//! 2. One `EV_KEY` event per binding, in binding order (1 = pressed)
//! 3. One `EV_SYN` / `SYN_REPORT`
//!
//! Consumers apply the batch when they see `SYN_REPORT`, so a batch must
//! never be written partially or without its terminator.
//!
//! ## Usage
//!
//! ```
//! use evdev::Key;
//! use max186_gamepad::uinput::Report;
//!
//! let report = Report::new([0, 128, 255, 128], vec![(Key::BTN_SOUTH, true)]);
//! let events = report.to_events();
//! assert_eq!(events.len(), 4 + 1 + 1);
//! ```

pub mod device;

use evdev::{EventType, InputEvent, InputEventKind, Key, Synchronization};

use crate::axis::StickAxis;
use crate::error::Result;
pub use device::UinputGamepad;

/// Number of axis events at the start of every batch.
pub const AXIS_EVENTS: usize = StickAxis::ALL.len();

/// Destination for event batches.
pub trait EventSink {
    /// Write one complete batch.
    ///
    /// `events` must end with a single `SYN_REPORT`, as produced by
    /// [`Report::encode_into`].
    ///
    /// # Errors
    ///
    /// Returns `Device` if the batch is malformed or the write fails.
    fn write_batch(&mut self, events: &[InputEvent]) -> Result<()>;
}

/// One consistent snapshot of all inputs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Report {
    /// Scaled axis values, indexed by [`StickAxis::index`].
    pub axes: [i32; AXIS_EVENTS],
    /// Key code and pressed state per binding, in binding order.
    pub buttons: Vec<(Key, bool)>,
}

impl Report {
    #[must_use]
    pub fn new(axes: [i32; AXIS_EVENTS], buttons: Vec<(Key, bool)>) -> Self {
        Self { axes, buttons }
    }

    /// Number of events in the encoded batch.
    #[must_use]
    pub fn event_count(&self) -> usize {
        AXIS_EVENTS + self.buttons.len() + 1
    }

    /// Encode the batch into `events`, replacing its contents.
    ///
    /// Lets the sampling loop reuse one buffer for every cycle.
    pub fn encode_into(&self, events: &mut Vec<InputEvent>) {
        events.clear();
        events.reserve(self.event_count());

        for axis in StickAxis::ALL {
            events.push(InputEvent::new(
                EventType::ABSOLUTE,
                axis.abs_axis().0,
                self.axes[axis.index()],
            ));
        }

        for (key, pressed) in &self.buttons {
            events.push(InputEvent::new(EventType::KEY, key.code(), i32::from(*pressed)));
        }

        events.push(InputEvent::new(
            EventType::SYNCHRONIZATION,
            Synchronization::SYN_REPORT.0,
            0,
        ));
    }

    /// Encode the batch into a new vector.
    #[must_use]
    pub fn to_events(&self) -> Vec<InputEvent> {
        let mut events = Vec::new();
        self.encode_into(&mut events);
        events
    }
}

/// Whether `event` is the `SYN_REPORT` that closes a batch.
#[must_use]
pub fn is_report_sync(event: &InputEvent) -> bool {
    matches!(
        event.kind(),
        InputEventKind::Synchronization(sync) if sync == Synchronization::SYN_REPORT
    )
}

#[cfg(test)]
pub mod mocks {
    use super::*;
    use crate::error::GamepadError;

    /// Event sink that records every batch it accepts
    #[derive(Debug, Default)]
    pub struct RecordingSink {
        pub batches: Vec<Vec<InputEvent>>,
        /// Number of upcoming writes to fail
        pub failures_pending: usize,
    }

    impl RecordingSink {
        pub fn new() -> Self {
            Self::default()
        }

        pub fn fail_next(&mut self, count: usize) {
            self.failures_pending = count;
        }
    }

    impl EventSink for RecordingSink {
        fn write_batch(&mut self, events: &[InputEvent]) -> Result<()> {
            if self.failures_pending > 0 {
                self.failures_pending -= 1;
                return Err(GamepadError::Device("Mock write error".to_string()));
            }
            self.batches.push(events.to_vec());
            Ok(())
        }
    }
}
