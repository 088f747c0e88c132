//! # MAX186 Gamepad Library
//!
//! Turn a MAX186 SPI ADC and a set of GPIO buttons into a virtual Linux gamepad.
//!
//! This library provides the pieces the driver is built from: the button
//! table loader, the ADC and GPIO readers, the axis scaler, the uinput event
//! emitter and the sampling loop that ties them together.

pub mod adc;
pub mod axis;
pub mod bindings;
pub mod config;
pub mod error;
pub mod gpio;
pub mod sampler;
pub mod uinput;
