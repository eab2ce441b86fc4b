//! Normalized raw-input events.
//!
//! Every backend turns its native notification (HID element value, `WM_INPUT`
//! packet, XInput2 raw event) into a [`RawInput`]. Mouse notifications become a
//! [`MouseReport`]: a *partial* update that only names what changed. The
//! [`MouseAdapter`](crate::adapter::MouseAdapter) patches it over the previous
//! snapshot before it is queued.
//!
//! ## Button order
//! Button indices are canonical across backends:
//! `0` primary, `1` secondary, `2` middle, `3` back, `4` forward.
//! Backends whose native numbering differs (X11: left/middle/right = 1/2/3)
//! remap before building the report.

use crate::metadata::DeviceMeta;
use crate::snapshot::MAX_BUTTONS;
use serde::{Deserialize, Serialize};

/// Backend-local device identifier (X11 source id, hidapi slot, Raw Input handle bits).
pub type DeviceId = u32;

/// HID usage page for generic desktop controls.
pub const PAGE_GENERIC_DESKTOP: u16 = 0x01;
/// HID usage page for buttons.
pub const PAGE_BUTTON: u16 = 0x09;

/// Logical device class, using the generic-desktop usage values as tags.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
#[repr(u8)]
pub enum DeviceClass {
    #[default]
    Unknown = 0x00,
    Mouse = 0x02,
    Joystick = 0x04,
    Gamepad = 0x05,
    Keyboard = 0x06,
    Keypad = 0x07,
    MultiAxisController = 0x08,
}

impl DeviceClass {
    /// Usages subscribed to by default.
    pub const SUBSCRIBED: [DeviceClass; 6] = [
        DeviceClass::Mouse,
        DeviceClass::Joystick,
        DeviceClass::Gamepad,
        DeviceClass::Keyboard,
        DeviceClass::Keypad,
        DeviceClass::MultiAxisController,
    ];

    /// Class for a generic-desktop usage value.
    pub const fn from_usage(usage: u16) -> Self {
        match usage {
            0x02 => DeviceClass::Mouse,
            0x04 => DeviceClass::Joystick,
            0x05 => DeviceClass::Gamepad,
            0x06 => DeviceClass::Keyboard,
            0x07 => DeviceClass::Keypad,
            0x08 => DeviceClass::MultiAxisController,
            _ => DeviceClass::Unknown,
        }
    }

    #[inline]
    pub const fn usage(self) -> u16 {
        self as u16
    }
}

/// How a device reports position.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum MotionMode {
    /// Each report carries a delta since the previous one.
    #[default]
    Relative,
    /// Each report carries a screen-space position.
    Absolute,
}

/// Button part of a [`MouseReport`].
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum ButtonChange {
    #[default]
    None,
    /// Bits to set and bits to clear (Raw Input style).
    Masks { down: u8, up: u8 },
    /// One button changed (HID element / XInput2 detail style).
    Single { index: u8, pressed: bool },
}

impl ButtonChange {
    /// Apply this change to a carried-forward button mask.
    ///
    /// Out-of-range indices leave the mask untouched.
    #[inline]
    pub fn patch(self, mask: u8) -> u8 {
        match self {
            ButtonChange::None => mask,
            ButtonChange::Masks { down, up } => (mask & !up) | down,
            ButtonChange::Single { index, pressed } if (index as usize) < MAX_BUTTONS => {
                (mask & !(1 << index)) | ((pressed as u8) << index)
            }
            ButtonChange::Single { .. } => mask,
        }
    }
}

/// Partial mouse update. Axes that did not change are `None`.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct MouseReport {
    pub device: DeviceId,
    pub mode: MotionMode,
    pub x: Option<i32>,
    pub y: Option<i32>,
    pub buttons: ButtonChange,
}

impl MouseReport {
    /// Relative motion on both axes.
    pub fn moved(device: DeviceId, dx: i32, dy: i32) -> Self {
        Self {
            device,
            mode: MotionMode::Relative,
            x: Some(dx),
            y: Some(dy),
            buttons: ButtonChange::None,
        }
    }

    /// Absolute position on both axes.
    pub fn moved_to(device: DeviceId, x: i32, y: i32) -> Self {
        Self {
            device,
            mode: MotionMode::Absolute,
            x: Some(x),
            y: Some(y),
            buttons: ButtonChange::None,
        }
    }

    /// Single button transition, no motion.
    pub fn button(device: DeviceId, index: u8, pressed: bool) -> Self {
        Self {
            device,
            buttons: ButtonChange::Single { index, pressed },
            ..Self::default()
        }
    }

    /// `true` if the report carries no information.
    pub fn is_empty(&self) -> bool {
        self.x.is_none() && self.y.is_none() && self.buttons == ButtonChange::None
    }
}

/// Normalized notification produced by a [`RawInputSource`](crate::source::RawInputSource).
#[derive(Clone, Debug, PartialEq)]
pub enum RawInput {
    /// Mouse-class update, queued through the adapter.
    Mouse(MouseReport),
    /// A device matching the subscription appeared. Logged only.
    DeviceArrived(DeviceMeta),
    /// A device went away. Logged only.
    DeviceRemoved(DeviceMeta),
    /// A notification from a class that is subscribed but not dispatched yet.
    Ignored(DeviceClass),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mask_patch_clears_then_sets() {
        // Down wins when a packet reports both edges for the same button.
        let change = ButtonChange::Masks { down: 0b001, up: 0b001 };
        assert_eq!(change.patch(0b000), 0b001);
        let change = ButtonChange::Masks { down: 0b100, up: 0b010 };
        assert_eq!(change.patch(0b011), 0b101);
    }

    #[test]
    fn single_patch_sets_and_clears_one_bit() {
        let press = ButtonChange::Single { index: 2, pressed: true };
        let release = ButtonChange::Single { index: 0, pressed: false };
        assert_eq!(press.patch(0b001), 0b101);
        assert_eq!(release.patch(0b101), 0b100);
        let bogus = ButtonChange::Single { index: 7, pressed: true };
        assert_eq!(bogus.patch(0b001), 0b001);
    }

    #[test]
    fn usage_tags_round_trip() {
        for class in DeviceClass::SUBSCRIBED {
            assert_eq!(DeviceClass::from_usage(class.usage()), class);
        }
        assert_eq!(DeviceClass::from_usage(0x30), DeviceClass::Unknown);
    }
}
