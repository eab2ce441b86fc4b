//! XInput2 raw event decoding (platform independent).
//!
//! The X11 source copies each `XIRawEvent` into an [`XiRawRecord`] while the
//! cookie data is alive, then decodes it here.

use crate::event::{ButtonChange, DeviceId, MotionMode, MouseReport};
use std::collections::HashMap;

/// Which raw event a record came from.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum XiRawKind {
    ButtonPress,
    ButtonRelease,
    Motion,
}

/// Copied-out `XIRawEvent`.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct XiRawRecord {
    /// `sourceid`: the slave device that generated the event.
    pub device: DeviceId,
    pub kind: XiRawKind,
    /// Button number for press/release.
    pub detail: i32,
    /// Valuators 0 and 1, when present in the mask.
    pub values: [Option<f64>; 2],
    /// Valuator mode reported by `XIQueryDevice` for this device.
    pub mode: MotionMode,
}

/// Map an X11 button number to the canonical index.
///
/// X numbers buttons left, middle, right as 1, 2, 3; 4 to 7 are wheel
/// steps and 8/9 are back/forward.
#[inline]
pub const fn canonical_button(detail: i32) -> Option<u8> {
    match detail {
        1 => Some(0),
        2 => Some(2),
        3 => Some(1),
        8 => Some(3),
        9 => Some(4),
        _ => None,
    }
}

/// Pick valuators 0 and 1 out of a packed raw value array.
///
/// `values` holds one entry per set bit of `mask`, in bit order.
pub fn masked_axes(mask: &[u8], values: &[f64]) -> [Option<f64>; 2] {
    let mut axes = [None; 2];
    let mut idx = 0;
    for bit in 0..mask.len() * 8 {
        if mask[bit / 8] & (1 << (bit % 8)) == 0 {
            continue;
        }
        if bit < 2 {
            axes[bit] = values.get(idx).copied();
        } else {
            break;
        }
        idx += 1;
    }
    axes
}

/// Fractional remainder of relative valuators, kept per slave device so slow
/// sub-unit motion still adds up.
#[derive(Clone, Debug, Default)]
pub struct SubpixelCarry {
    rest: HashMap<DeviceId, [f64; 2]>,
}

impl SubpixelCarry {
    /// Fold the device's remainder into a relative motion record, leaving whole
    /// units in `rec.values` and keeping the new fraction.
    pub fn apply(&mut self, rec: &mut XiRawRecord) {
        if rec.kind != XiRawKind::Motion || rec.mode != MotionMode::Relative {
            return;
        }
        let rest = self.rest.entry(rec.device).or_default();
        for (value, rest) in rec.values.iter_mut().zip(rest.iter_mut()) {
            if let Some(v) = value {
                let total = *v + *rest;
                let whole = total.trunc();
                *rest = total - whole;
                *v = whole;
            }
        }
    }

    /// Drop the remainder of a removed device.
    pub fn forget(&mut self, device: DeviceId) {
        self.rest.remove(&device);
    }
}

/// Decode a record into a partial report. Wheel steps and unmapped buttons yield `None`.
pub fn decode_raw(rec: &XiRawRecord) -> Option<MouseReport> {
    let base = MouseReport {
        device: rec.device,
        mode: rec.mode,
        ..MouseReport::default()
    };
    match rec.kind {
        XiRawKind::ButtonPress | XiRawKind::ButtonRelease => {
            let index = canonical_button(rec.detail)?;
            Some(MouseReport {
                buttons: ButtonChange::Single {
                    index,
                    pressed: rec.kind == XiRawKind::ButtonPress,
                },
                ..base
            })
        }
        XiRawKind::Motion => {
            let report = MouseReport {
                x: rec.values[0].map(|v| v.round() as i32),
                y: rec.values[1].map(|v| v.round() as i32),
                ..base
            };
            (!report.is_empty()).then_some(report)
        }
    }
}
