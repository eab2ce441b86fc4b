//! Point-in-time mouse state.
//!
//! A [`MouseSnapshot`] is always *complete*: position and every button. Backends
//! that only report one changed field per notification get completed by the
//! adapter, which seeds from the previous snapshot (carry-forward).

/// Number of buttons tracked in [`MouseSnapshot::button`].
pub const MAX_BUTTONS: usize = 5;

/// Bits of [`MouseSnapshot::button`] that can ever be set.
pub const BUTTON_MASK: u8 = (1 << MAX_BUTTONS) - 1;

/// Mask for button `i`.
#[inline]
pub const fn button_bit(i: u8) -> u8 {
    1 << i
}

/// Mouse state: position plus button mask (bit `i` set while button `i` is down).
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct MouseSnapshot {
    pub x: i16,
    pub y: i16,
    pub button: u8,
}

impl MouseSnapshot {
    #[inline]
    pub const fn new(x: i16, y: i16, button: u8) -> Self {
        Self { x, y, button }
    }

    #[inline]
    pub const fn is_down(&self, i: u8) -> bool {
        (i as usize) < MAX_BUTTONS && self.button & button_bit(i) != 0
    }

    /// Copy with x/y moved by a delta (wrapping in 16 bits).
    #[inline]
    pub const fn offset(self, dx: i16, dy: i16) -> Self {
        Self {
            x: self.x.wrapping_add(dx),
            y: self.y.wrapping_add(dy),
            button: self.button,
        }
    }
}
