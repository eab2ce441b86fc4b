//! HID element values to mouse reports.
//!
//! IOKit delivers one element value per callback; hidapi hands over whole
//! reports. Both paths end up here as a sequence of [`HidValue`]s, decoded one
//! at a time into partial [`MouseReport`]s. The adapter carries the rest of the
//! state forward.

use crate::event::{
    ButtonChange, DeviceClass, DeviceId, MotionMode, MouseReport, RawInput, PAGE_BUTTON,
    PAGE_GENERIC_DESKTOP,
};
use crate::snapshot::MAX_BUTTONS;

pub const USAGE_X: u16 = 0x30;
pub const USAGE_Y: u16 = 0x31;
pub const USAGE_WHEEL: u16 = 0x38;

/// One element value from a HID device.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct HidValue {
    pub device: DeviceId,
    /// Top-level usage of the device (generic desktop page).
    pub device_usage: u16,
    pub usage_page: u16,
    pub usage: u16,
    pub value: i32,
    /// Element reports deltas rather than positions.
    pub relative: bool,
}

/// Decode a single value.
///
/// Values from non-mouse devices are recognized and dropped. Mouse elements
/// other than X, Y and the first five buttons (wheel, pan, vendor pages) yield
/// `None`.
pub fn decode_value(v: &HidValue) -> Option<RawInput> {
    let class = DeviceClass::from_usage(v.device_usage);
    if class != DeviceClass::Mouse {
        return Some(RawInput::Ignored(class));
    }

    let mode = if v.relative {
        MotionMode::Relative
    } else {
        MotionMode::Absolute
    };
    let base = MouseReport {
        device: v.device,
        mode,
        ..MouseReport::default()
    };

    match (v.usage_page, v.usage) {
        (PAGE_GENERIC_DESKTOP, USAGE_X) => Some(RawInput::Mouse(MouseReport {
            x: Some(v.value),
            ..base
        })),
        (PAGE_GENERIC_DESKTOP, USAGE_Y) => Some(RawInput::Mouse(MouseReport {
            y: Some(v.value),
            ..base
        })),
        (PAGE_BUTTON, usage) if usage >= 1 && usage as usize <= MAX_BUTTONS => {
            // Button usages are 1-based; the button page already uses
            // primary, secondary, tertiary order.
            let index = (usage - 1) as u8;
            Some(RawInput::Mouse(MouseReport {
                buttons: ButtonChange::Single {
                    index,
                    pressed: v.value != 0,
                },
                ..base
            }))
        }
        _ => None,
    }
}

/// Splits boot-protocol mouse reports into element values.
///
/// Layout: `[report id]? [buttons] [dx: i8] [dy: i8] ...`. Only button
/// transitions and non-zero axes are emitted, mirroring IOKit's value-changed
/// callbacks.
#[derive(Clone, Debug, Default)]
pub struct BootMouseParser {
    report_id: Option<u8>,
    last_buttons: u8,
}

impl BootMouseParser {
    pub fn new(report_id: Option<u8>) -> Self {
        Self {
            report_id,
            last_buttons: 0,
        }
    }

    /// Append the values in `report` to `out`. Returns the number appended.
    pub fn parse(&mut self, device: DeviceId, report: &[u8], out: &mut Vec<HidValue>) -> usize {
        let body = match self.report_id {
            Some(id) => match report.split_first() {
                Some((&first, rest)) if first == id => rest,
                _ => return 0,
            },
            None => report,
        };
        if body.len() < 3 {
            return 0;
        }

        let start = out.len();
        let value = |usage_page, usage, value| HidValue {
            device,
            device_usage: DeviceClass::Mouse.usage(),
            usage_page,
            usage,
            value,
            relative: true,
        };

        let buttons = body[0];
        let changed = buttons ^ self.last_buttons;
        for bit in 0..MAX_BUTTONS as u16 {
            if changed & (1 << bit) != 0 {
                out.push(value(PAGE_BUTTON, bit + 1, i32::from(buttons >> bit & 1)));
            }
        }
        self.last_buttons = buttons;

        let dx = body[1] as i8;
        let dy = body[2] as i8;
        if dx != 0 {
            out.push(value(PAGE_GENERIC_DESKTOP, USAGE_X, i32::from(dx)));
        }
        if dy != 0 {
            out.push(value(PAGE_GENERIC_DESKTOP, USAGE_Y, i32::from(dy)));
        }
        out.len() - start
    }
}
