//! # Button Name Table
//!
//! Fixed table of the 16 button names accepted in `gamepad.conf` and the
//! evdev key code each one is registered and reported as.
//!
//! | Name | evdev Code |
//! |------|------------|
//! | A | BTN_SOUTH (BTN_A) |
//! | B | BTN_EAST (BTN_B) |
//! | X | BTN_NORTH (BTN_X) |
//! | Y | BTN_WEST (BTN_Y) |
//! | DPAD_UP | BTN_DPAD_UP |
//! | DPAD_DOWN | BTN_DPAD_DOWN |
//! | DPAD_LEFT | BTN_DPAD_LEFT |
//! | DPAD_RIGHT | BTN_DPAD_RIGHT |
//! | LEFT_TRIG1 | BTN_TL |
//! | LEFT_TRIG2 | BTN_TL2 |
//! | RIGHT_TRIG1 | BTN_TR |
//! | RIGHT_TRIG2 | BTN_TR2 |
//! | THUMBL | BTN_THUMBL |
//! | THUMBR | BTN_THUMBR |
//! | STRT | BTN_START |
//! | SEL | BTN_SELECT |

use evdev::Key;
use std::fmt;

/// A recognized button name.
///
/// The mapping to key codes is one-to-one, so a duplicate name in the button
/// file is also a duplicate code.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ButtonName {
    A,
    B,
    X,
    Y,
    DpadUp,
    DpadDown,
    DpadLeft,
    DpadRight,
    LeftTrig1,
    LeftTrig2,
    RightTrig1,
    RightTrig2,
    ThumbL,
    ThumbR,
    Start,
    Select,
}

impl ButtonName {
    /// Every recognized name, in table order.
    pub const ALL: [ButtonName; 16] = [
        ButtonName::A,
        ButtonName::B,
        ButtonName::X,
        ButtonName::Y,
        ButtonName::DpadUp,
        ButtonName::DpadDown,
        ButtonName::DpadLeft,
        ButtonName::DpadRight,
        ButtonName::LeftTrig1,
        ButtonName::LeftTrig2,
        ButtonName::RightTrig1,
        ButtonName::RightTrig2,
        ButtonName::ThumbL,
        ButtonName::ThumbR,
        ButtonName::Start,
        ButtonName::Select,
    ];

    /// Looks up a name as written on the left side of a `NAME=GPIO` line.
    ///
    /// Matching is exact and case-sensitive. Returns `None` for anything not in
    /// the table.
    ///
    /// # Examples
    ///
    /// ```
    /// use max186_gamepad::bindings::names::ButtonName;
    ///
    /// assert_eq!(ButtonName::from_name("STRT"), Some(ButtonName::Start));
    /// assert_eq!(ButtonName::from_name("start"), None);
    /// ```
    #[must_use]
    pub fn from_name(name: &str) -> Option<Self> {
        let button = match name {
            "A" => ButtonName::A,
            "B" => ButtonName::B,
            "X" => ButtonName::X,
            "Y" => ButtonName::Y,
            "DPAD_UP" => ButtonName::DpadUp,
            "DPAD_DOWN" => ButtonName::DpadDown,
            "DPAD_LEFT" => ButtonName::DpadLeft,
            "DPAD_RIGHT" => ButtonName::DpadRight,
            "LEFT_TRIG1" => ButtonName::LeftTrig1,
            "LEFT_TRIG2" => ButtonName::LeftTrig2,
            "RIGHT_TRIG1" => ButtonName::RightTrig1,
            "RIGHT_TRIG2" => ButtonName::RightTrig2,
            "THUMBL" => ButtonName::ThumbL,
            "THUMBR" => ButtonName::ThumbR,
            "STRT" => ButtonName::Start,
            "SEL" => ButtonName::Select,
            _ => return None,
        };
        Some(button)
    }

    /// The name as it appears in the button file.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            ButtonName::A => "A",
            ButtonName::B => "B",
            ButtonName::X => "X",
            ButtonName::Y => "Y",
            ButtonName::DpadUp => "DPAD_UP",
            ButtonName::DpadDown => "DPAD_DOWN",
            ButtonName::DpadLeft => "DPAD_LEFT",
            ButtonName::DpadRight => "DPAD_RIGHT",
            ButtonName::LeftTrig1 => "LEFT_TRIG1",
            ButtonName::LeftTrig2 => "LEFT_TRIG2",
            ButtonName::RightTrig1 => "RIGHT_TRIG1",
            ButtonName::RightTrig2 => "RIGHT_TRIG2",
            ButtonName::ThumbL => "THUMBL",
            ButtonName::ThumbR => "THUMBR",
            ButtonName::Start => "STRT",
            ButtonName::Select => "SEL",
        }
    }

    /// The evdev key code reported for this button.
    ///
    /// evdev names the face buttons by compass position; `BTN_A`, `BTN_B`,
    /// `BTN_X` and `BTN_Y` share their values.
    #[must_use]
    pub fn key(self) -> Key {
        match self {
            ButtonName::A => Key::BTN_SOUTH,
            ButtonName::B => Key::BTN_EAST,
            ButtonName::X => Key::BTN_NORTH,
            ButtonName::Y => Key::BTN_WEST,
            ButtonName::DpadUp => Key::BTN_DPAD_UP,
            ButtonName::DpadDown => Key::BTN_DPAD_DOWN,
            ButtonName::DpadLeft => Key::BTN_DPAD_LEFT,
            ButtonName::DpadRight => Key::BTN_DPAD_RIGHT,
            ButtonName::LeftTrig1 => Key::BTN_TL,
            ButtonName::LeftTrig2 => Key::BTN_TL2,
            ButtonName::RightTrig1 => Key::BTN_TR,
            ButtonName::RightTrig2 => Key::BTN_TR2,
            ButtonName::ThumbL => Key::BTN_THUMBL,
            ButtonName::ThumbR => Key::BTN_THUMBR,
            ButtonName::Start => Key::BTN_START,
            ButtonName::Select => Key::BTN_SELECT,
        }
    }
}

impl fmt::Display for ButtonName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
