//! # Button Bindings Module
//!
//! Loads the button table from the line-oriented `gamepad.conf` file.
//!
//! ## File Format
//!
//! ```text
//! # Face buttons
//! [buttons]
//! A=17
//! B=27
//! STRT=22
//! ```
//!
//! - One `NAME=GPIO` assignment per line
//! - Lines starting with `#` or `[`, and lines shorter than 3 characters, are ignored
//! - Names not in the [`ButtonName`] table are silently skipped
//! - Bytes that are not valid UTF-8 only spoil the line they are on
//! - GPIO numbers are parsed permissively: a value that is not a clean
//!   non-negative integer keeps its leading digits, or becomes 0
//! - At most [`MAX_BUTTONS`] assignments are read; later lines are dropped
//! - A repeated name replaces the GPIO line of the earlier binding, which keeps
//!   its position in the table
//!
//! ## Usage
//!
//! ```
//! use max186_gamepad::bindings::ButtonMap;
//!
//! let map = ButtonMap::parse("A=17\nB=27\nFOO=12\n");
//! assert_eq!(map.len(), 2);
//! assert_eq!(map.iter().next().unwrap().line, 17);
//! ```

pub mod names;

use evdev::Key;
use std::fs;
use std::path::Path;
use tracing::{debug, info, warn};

use crate::error::Result;
pub use names::ButtonName;

/// Maximum number of `NAME=GPIO` assignments read from the button file.
pub const MAX_BUTTONS: usize = 32;

/// Minimum length of a line that can hold an assignment (`A=1`).
const MIN_LINE_LEN: usize = 3;

/// One button bound to a digital input line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ButtonBinding {
    /// Button name from the table.
    pub name: ButtonName,
    /// Sysfs GPIO number polled for this button.
    pub line: u32,
}

impl ButtonBinding {
    /// The evdev key code this binding is registered and reported as.
    #[must_use]
    pub fn key(&self) -> Key {
        self.name.key()
    }
}

/// Ordered, immutable table of button bindings.
///
/// Built once at startup and shared by reference with the GPIO setup, the
/// virtual device registration and the sampling loop.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ButtonMap {
    bindings: Vec<ButtonBinding>,
}

impl ButtonMap {
    /// Load bindings from a button file.
    ///
    /// # Errors
    ///
    /// Returns `Io` if the file cannot be read. Malformed lines are never an
    /// error.
    ///
    /// # Examples
    ///
    /// ```no_run
    /// use max186_gamepad::bindings::ButtonMap;
    ///
    /// let map = ButtonMap::load("gamepad.conf")?;
    /// # Ok::<(), Box<dyn std::error::Error>>(())
    /// ```
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let contents = fs::read(path)?;
        Ok(Self::parse_bytes(&contents))
    }

    /// Parse bindings from the contents of a button file.
    #[must_use]
    pub fn parse(contents: &str) -> Self {
        Self::parse_bytes(contents.as_bytes())
    }

    /// Parse bindings from raw file contents.
    ///
    /// Lines are decoded one at a time, so a stray non-UTF-8 byte only
    /// affects the line it sits on.
    #[must_use]
    pub fn parse_bytes(contents: &[u8]) -> Self {
        let mut map = ButtonMap::default();
        let mut accepted = 0;

        for (index, raw) in split_lines(contents).enumerate() {
            if accepted == MAX_BUTTONS {
                debug!("Button limit of {} reached, ignoring line {} onwards", MAX_BUTTONS, index + 1);
                break;
            }

            let raw = String::from_utf8_lossy(raw);
            let Some((name, line)) = parse_assignment(&raw) else {
                continue;
            };
            accepted += 1;
            map.insert(ButtonBinding { name, line });
        }

        map
    }

    /// Last-one-wins insert keyed on the button name.
    fn insert(&mut self, binding: ButtonBinding) {
        if let Some(existing) = self.bindings.iter_mut().find(|b| b.name == binding.name) {
            warn!(
                "Button {} bound more than once, GPIO {} replaces GPIO {}",
                binding.name, binding.line, existing.line
            );
            existing.line = binding.line;
            return;
        }

        info!(
            "Button {} ({}) = GPIO {} (keycode {})",
            self.bindings.len(),
            binding.name,
            binding.line,
            binding.key().code()
        );
        self.bindings.push(binding);
    }

    /// Iterate over the bindings in file order.
    pub fn iter(&self) -> impl Iterator<Item = &ButtonBinding> + '_ {
        self.bindings.iter()
    }

    /// The bindings as a slice, in file order.
    #[must_use]
    pub fn as_slice(&self) -> &[ButtonBinding] {
        &self.bindings
    }

    /// Number of distinct bindings.
    #[must_use]
    pub fn len(&self) -> usize {
        self.bindings.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.bindings.is_empty()
    }
}

impl<'a> IntoIterator for &'a ButtonMap {
    type Item = &'a ButtonBinding;
    type IntoIter = std::slice::Iter<'a, ButtonBinding>;

    fn into_iter(self) -> Self::IntoIter {
        self.bindings.iter()
    }
}

/// Split on `\n`, dropping a trailing `\r` from each line.
fn split_lines<'a>(contents: &'a [u8]) -> impl Iterator<Item = &'a [u8]> + 'a {
    let contents = contents.strip_suffix(b"\n").unwrap_or(contents);
    contents
        .split(|&b| b == b'\n')
        .filter(move |_| !contents.is_empty())
        .map(|line| line.strip_suffix(b"\r").unwrap_or(line))
}

/// Parse one line into a recognized name and GPIO number.
///
/// Returns `None` for comments, section markers, short lines, lines without
/// exactly one `=` and unrecognized names.
fn parse_assignment(raw: &str) -> Option<(ButtonName, u32)> {
    if raw.len() < MIN_LINE_LEN || raw.starts_with('#') || raw.starts_with('[') {
        return None;
    }

    let (name, value) = raw.split_once('=')?;
    if value.contains('=') {
        return None;
    }

    let name = ButtonName::from_name(name.trim())?;
    Some((name, parse_gpio_number(name, value)))
}

/// `atoi`-style parse: leading digits are kept, anything unparsable is 0.
fn parse_gpio_number(name: ButtonName, value: &str) -> u32 {
    let value = value.trim();
    let digits_end = value
        .find(|c: char| !c.is_ascii_digit())
        .unwrap_or(value.len());

    match value[..digits_end].parse::<u32>() {
        Ok(number) if digits_end == value.len() => number,
        Ok(number) => {
            warn!("Button {}: GPIO value {:?} is not a clean integer, using {}", name, value, number);
            number
        }
        Err(_) => {
            warn!("Button {}: GPIO value {:?} is not a number, using 0", name, value);
            0
        }
    }
}
