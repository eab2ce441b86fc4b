//! `WM_INPUT` mouse packet decoding (platform independent).
//!
//! The Win32 backend copies the few `RAWMOUSE` fields it needs into a
//! [`RawMouse`] and decodes here, so the bit handling is testable on any host.
//!
//! ## Conventions
//! - `MOUSE_MOVE_ABSOLUTE` selects [`MotionMode::Absolute`]; otherwise `lLastX`/
//!   `lLastY` are deltas in raw counts.
//! - With `MOUSE_VIRTUAL_DESKTOP`, absolute coordinates are normalized to
//!   `0..=65535` over the whole virtual desktop and get scaled to pixels.
//! - `usButtonFlags` packs down/up edges for five buttons as alternating bits
//!   (`LEFT_DOWN = 0x1`, `LEFT_UP = 0x2`, `RIGHT_DOWN = 0x4`, ...). They are
//!   compressed into two 5-bit masks in canonical button order.

use crate::event::{ButtonChange, DeviceId, MotionMode, MouseReport};

pub const MOUSE_MOVE_ABSOLUTE: u16 = 0x0001;
pub const MOUSE_VIRTUAL_DESKTOP: u16 = 0x0002;

/// Every `RI_MOUSE_*_DOWN` / `RI_MOUSE_*_UP` bit for buttons 1-5.
pub const RI_MOUSE_BUTTON_EDGES: u16 = 0x03FF;

/// Fields of a `RAWMOUSE` packet that the decoder reads.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct RawMouse {
    pub device: DeviceId,
    /// `usFlags`
    pub flags: u16,
    /// `lLastX`
    pub last_x: i32,
    /// `lLastY`
    pub last_y: i32,
    /// `usButtonFlags`
    pub button_flags: u16,
}

/// Pixels per normalized unit for virtual-desktop absolute coordinates.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct VirtualDesktopScale {
    pub x: f32,
    pub y: f32,
}

impl Default for VirtualDesktopScale {
    fn default() -> Self {
        Self { x: 1.0, y: 1.0 }
    }
}

impl VirtualDesktopScale {
    /// Scale for a virtual desktop of `width` x `height` pixels.
    pub fn from_screen(width: i32, height: i32) -> Self {
        Self {
            x: width.max(0) as f32 / 65535.0,
            y: height.max(0) as f32 / 65535.0,
        }
    }
}

/// Buttons whose `*_DOWN` bit is set, as a canonical 5-bit mask.
#[inline]
pub const fn down_mask(flags: u16) -> u8 {
    ((flags & 0x001)
        | ((flags & 0x004) >> 1)
        | ((flags & 0x010) >> 2)
        | ((flags & 0x040) >> 3)
        | ((flags & 0x100) >> 4)) as u8
}

/// Buttons whose `*_UP` bit is set, as a canonical 5-bit mask.
#[inline]
pub const fn up_mask(flags: u16) -> u8 {
    (((flags & 0x002) >> 1)
        | ((flags & 0x008) >> 2)
        | ((flags & 0x020) >> 3)
        | ((flags & 0x080) >> 4)
        | ((flags & 0x200) >> 5)) as u8
}

#[inline]
fn scale_axis(v: i32, scale: f32) -> i32 {
    (v.clamp(0, 65535) as f32 * scale).round() as i32
}

/// Decode one mouse packet into a partial report.
pub fn decode_mouse(raw: &RawMouse, scale: VirtualDesktopScale) -> MouseReport {
    let absolute = raw.flags & MOUSE_MOVE_ABSOLUTE != 0;
    let (x, y) = if absolute && raw.flags & MOUSE_VIRTUAL_DESKTOP != 0 {
        (scale_axis(raw.last_x, scale.x), scale_axis(raw.last_y, scale.y))
    } else {
        (raw.last_x, raw.last_y)
    };

    let buttons = if raw.button_flags & RI_MOUSE_BUTTON_EDGES != 0 {
        ButtonChange::Masks {
            down: down_mask(raw.button_flags),
            up: up_mask(raw.button_flags),
        }
    } else {
        ButtonChange::None
    };

    MouseReport {
        device: raw.device,
        mode: if absolute {
            MotionMode::Absolute
        } else {
            MotionMode::Relative
        },
        x: Some(x),
        y: Some(y),
        buttons,
    }
}
