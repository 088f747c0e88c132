//! # uinput Gamepad Device
//!
//! Registers the virtual gamepad with the kernel through `/dev/uinput` and
//! writes event batches to it.
//!
//! ## Capabilities
//!
//! - `EV_KEY`: the key code of every configured binding
//! - `EV_ABS`: `ABS_X`, `ABS_Y`, `ABS_RX`, `ABS_RY`, range 0-255
//!
//! The capability set is fixed when the device is built. The kernel tears the
//! device down when the handle is dropped.

use evdev::uinput::{VirtualDevice, VirtualDeviceBuilder};
use evdev::{AbsInfo, AttributeSet, BusType, InputEvent, InputId, Key, UinputAbsSetup};
use tracing::{debug, info};

use super::{is_report_sync, EventSink};
use crate::axis::{StickAxis, AXIS_CENTER, AXIS_MAX, AXIS_MIN};
use crate::bindings::ButtonMap;
use crate::config::DeviceConfig;
use crate::error::{GamepadError, Result};

/// Virtual gamepad backed by a uinput device.
pub struct UinputGamepad {
    device: VirtualDevice,
    name: String,
}

impl std::fmt::Debug for UinputGamepad {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("UinputGamepad")
            .field("name", &self.name)
            .finish_non_exhaustive()
    }
}

impl UinputGamepad {
    /// Create the virtual device.
    ///
    /// Registers one key per binding and the four stick axes, then finalizes
    /// the device. Requires write access to `/dev/uinput`.
    ///
    /// # Errors
    ///
    /// Returns `Device` if uinput cannot be opened or the device cannot be
    /// created. This is a setup failure.
    ///
    /// # Examples
    ///
    /// ```no_run
    /// use max186_gamepad::bindings::ButtonMap;
    /// use max186_gamepad::config::DeviceConfig;
    /// use max186_gamepad::uinput::UinputGamepad;
    ///
    /// let bindings = ButtonMap::parse("A=17\n");
    /// let gamepad = UinputGamepad::create(&DeviceConfig::default(), &bindings)?;
    /// # Ok::<(), Box<dyn std::error::Error>>(())
    /// ```
    pub fn create(config: &DeviceConfig, bindings: &ButtonMap) -> Result<Self> {
        let device_error =
            |e: std::io::Error| GamepadError::Device(format!("Failed to create {}: {}", config.name, e));

        let (keys, axes) = capabilities(bindings);
        let id = InputId::new(BusType::BUS_USB, config.vendor_id, config.product_id, config.version);
        let mut builder = VirtualDeviceBuilder::new()
            .map_err(|e| GamepadError::Device(format!("Failed to open /dev/uinput: {}", e)))?
            .name(config.name.as_str())
            .input_id(id);

        if !bindings.is_empty() {
            builder = builder.with_keys(&keys).map_err(device_error)?;
        }

        for setup in &axes {
            builder = builder.with_absolute_axis(setup).map_err(device_error)?;
        }

        let mut device = builder.build().map_err(device_error)?;

        info!(
            "Created virtual device \"{}\" ({:04x}:{:04x}) with {} buttons",
            config.name,
            config.vendor_id,
            config.product_id,
            bindings.len()
        );
        match device.enumerate_dev_nodes_blocking() {
            Ok(nodes) => {
                for node in nodes.flatten() {
                    info!("Virtual device available as {}", node.display());
                }
            }
            Err(e) => debug!("Could not list device nodes: {}", e),
        }

        Ok(Self {
            device,
            name: config.name.clone(),
        })
    }

    /// Device name as registered with the kernel.
    pub fn name(&self) -> &str {
        &self.name
    }
}

/// Key and axis capabilities registered for `bindings`.
///
/// Covers every code a report can carry: one key per binding and the four
/// stick axes with range [`AXIS_MIN`, `AXIS_MAX`], resting at center.
#[must_use]
pub fn capabilities(bindings: &ButtonMap) -> (AttributeSet<Key>, [UinputAbsSetup; 4]) {
    let mut keys = AttributeSet::<Key>::new();
    for binding in bindings {
        keys.insert(binding.key());
    }

    let stick_range = AbsInfo::new(AXIS_CENTER, AXIS_MIN, AXIS_MAX, 0, 0, 0);
    let axes = StickAxis::ALL.map(|axis| UinputAbsSetup::new(axis.abs_axis(), stick_range));

    (keys, axes)
}

impl EventSink for UinputGamepad {
    fn write_batch(&mut self, events: &[InputEvent]) -> Result<()> {
        let body = match events.split_last() {
            Some((last, body)) if is_report_sync(last) => body,
            _ => {
                return Err(GamepadError::Device(
                    "Event batch must end with SYN_REPORT".to_string(),
                ))
            }
        };

        // emit() writes the body and terminates it with its own SYN_REPORT
        self.device
            .emit(body)
            .map_err(|e| GamepadError::Device(format!("Failed to write events: {}", e)))
    }
}

impl Drop for UinputGamepad {
    fn drop(&mut self) {
        info!("Destroying virtual device \"{}\"", self.name);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::uinput::Report;
    use evdev::{AbsoluteAxisType, InputEventKind};

    #[test]
    fn test_capabilities_cover_every_binding_key() {
        let bindings = ButtonMap::parse("A=17\nB=27\nSTRT=5\nRIGHT_TRIG2=6\n");
        let (keys, _) = capabilities(&bindings);

        for binding in &bindings {
            assert!(keys.contains(binding.key()), "{} not registered", binding.name);
        }
        assert_eq!(keys.iter().count(), bindings.len());
    }

    #[test]
    fn test_capabilities_without_bindings() {
        let (keys, axes) = capabilities(&ButtonMap::default());
        assert_eq!(keys.iter().count(), 0);
        assert_eq!(axes.len(), 4);
    }

    #[test]
    fn test_capabilities_cover_stick_axes() {
        let (_, axes) = capabilities(&ButtonMap::default());

        let codes: Vec<u16> = axes.iter().map(|setup| setup.code()).collect();
        assert_eq!(
            codes,
            vec![
                AbsoluteAxisType::ABS_X.0,
                AbsoluteAxisType::ABS_Y.0,
                AbsoluteAxisType::ABS_RX.0,
                AbsoluteAxisType::ABS_RY.0,
            ]
        );
        for setup in &axes {
            let info = setup.absinfo();
            assert_eq!((info.minimum(), info.maximum()), (0, 255));
            assert_eq!(info.value(), AXIS_CENTER);
        }
    }

    #[test]
    fn test_capabilities_cover_every_emitted_code() {
        let bindings = ButtonMap::parse("A=17\nSEL=25\nX=22\n");
        let (keys, axes) = capabilities(&bindings);

        let buttons = bindings.iter().map(|b| (b.key(), true)).collect();
        for event in Report::new([0, 128, 255, 64], buttons).to_events() {
            match event.kind() {
                InputEventKind::Key(key) => assert!(keys.contains(key)),
                InputEventKind::AbsAxis(axis) => {
                    assert!(axes.iter().any(|setup| setup.code() == axis.0));
                }
                InputEventKind::Synchronization(_) => {}
                other => panic!("unexpected event kind {:?}", other),
            }
        }
    }

    // Integration test - needs write access to /dev/uinput
    #[test]
    #[ignore]
    fn test_create_and_write_with_real_uinput() {
        let bindings = ButtonMap::parse("A=17\nB=27\n");
        let mut gamepad = UinputGamepad::create(&DeviceConfig::default(), &bindings)
            .expect("uinput not available");
        assert_eq!(gamepad.name(), "MAX186 Gamepad");

        let report = Report::new([0, 128, 255, 128], vec![(Key::BTN_SOUTH, true), (Key::BTN_EAST, false)]);
        assert!(gamepad.write_batch(&report.to_events()).is_ok());
    }

    // Integration test - needs write access to /dev/uinput
    #[test]
    #[ignore]
    fn test_rejects_unterminated_batch_with_real_uinput() {
        let mut gamepad = UinputGamepad::create(&DeviceConfig::default(), &ButtonMap::default())
            .expect("uinput not available");

        let mut events = Report::new([0; 4], vec![]).to_events();
        events.pop();
        assert!(matches!(gamepad.write_batch(&events), Err(GamepadError::Device(_))));
    }
}
