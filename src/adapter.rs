//! Carry-forward: turning partial reports into complete snapshots.
//!
//! Hardware rarely reports a whole mouse state at once. IOKit delivers one
//! element per callback, XInput2 separates motion from button events, and a
//! Raw Input packet may carry only a button edge. [`carry_forward`] seeds the new
//! snapshot with the previous one and patches only what the report names, so
//! a report that changes nothing yields an identical snapshot and the queue
//! coalesces it.

use crate::event::{DeviceClass, MotionMode, MouseReport};
use crate::queue::InputQueue;
use crate::snapshot::MouseSnapshot;
use crate::source::FocusPolicy;

#[inline]
fn saturate(v: i32) -> i16 {
    v.clamp(i32::from(i16::MIN), i32::from(i16::MAX)) as i16
}

#[inline]
fn patch_axis(prev: i16, value: Option<i32>, mode: MotionMode) -> i16 {
    match (value, mode) {
        (None, _) => prev,
        (Some(v), MotionMode::Absolute) => saturate(v),
        (Some(v), MotionMode::Relative) => prev.wrapping_add(saturate(v)),
    }
}

/// Patch `report` over `prev`.
///
/// Relative axes accumulate onto the previous position; absolute axes replace it.
#[inline]
pub fn carry_forward(prev: MouseSnapshot, report: &MouseReport) -> MouseSnapshot {
    MouseSnapshot {
        x: patch_axis(prev.x, report.x, report.mode),
        y: patch_axis(prev.y, report.y, report.mode),
        button: report.buttons.patch(prev.button),
    }
}

/// Per-window mouse adapter: focus gating plus carry-forward into the queue.
#[derive(Clone, Debug)]
pub struct MouseAdapter {
    policy: FocusPolicy,
    focused: bool,
    discarded: u64,
}

impl MouseAdapter {
    pub fn new(policy: FocusPolicy, focused: bool) -> Self {
        Self {
            policy,
            focused,
            discarded: 0,
        }
    }

    #[inline]
    pub fn set_focus(&mut self, focused: bool) {
        self.focused = focused;
    }

    /// Reports thrown away because the window was unfocused.
    #[inline]
    pub fn discarded(&self) -> u64 {
        self.discarded
    }

    #[inline]
    fn accepting(&self) -> bool {
        self.focused || self.policy == FocusPolicy::Consumer
    }

    /// Complete `report` against the queue's last snapshot and push it,
    /// tagged with the report's motion mode.
    ///
    /// Returns `true` if a new entry was queued.
    pub fn ingest(&mut self, queue: &mut InputQueue, report: &MouseReport) -> bool {
        if !self.accepting() {
            self.discarded += 1;
            return false;
        }
        let next = carry_forward(queue.last(), report);

        #[cfg(feature = "debug-log")]
        tracing::trace!(?report, ?next, "mouse report");

        queue.push(DeviceClass::Mouse, report.device, report.mode, next)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::event::ButtonChange;
    use pretty_assertions::assert_eq;

    #[test]
    fn single_axis_update_keeps_other_fields() {
        let prev = MouseSnapshot::new(10, 20, 0b001);
        let report = MouseReport {
            mode: MotionMode::Absolute,
            y: Some(25),
            ..MouseReport::default()
        };
        assert_eq!(carry_forward(prev, &report), MouseSnapshot::new(10, 25, 0b001));
    }

    #[test]
    fn relative_motion_accumulates() {
        let prev = MouseSnapshot::new(10, 20, 0);
        let next = carry_forward(prev, &MouseReport::moved(0, 3, -5));
        assert_eq!(next, MouseSnapshot::new(13, 15, 0));
        let same = carry_forward(next, &MouseReport::moved(0, 0, 0));
        assert_eq!(same, next);
    }

    #[test]
    fn absolute_values_saturate() {
        let next = carry_forward(MouseSnapshot::default(), &MouseReport::moved_to(0, 70_000, -70_000));
        assert_eq!(next, MouseSnapshot::new(i16::MAX, i16::MIN, 0));
    }

    #[test]
    fn button_only_report_keeps_position() {
        let prev = MouseSnapshot::new(-4, 9, 0b010);
        let report = MouseReport {
            buttons: ButtonChange::Masks { down: 0b001, up: 0b010 },
            ..MouseReport::default()
        };
        assert_eq!(carry_forward(prev, &report), MouseSnapshot::new(-4, 9, 0b001));
    }

    #[test]
    fn unfocused_adapter_discards_unless_consumer_filters() {
        let mut q = InputQueue::new();
        let mut gated = MouseAdapter::new(FocusPolicy::Adapter, false);
        assert!(!gated.ingest(&mut q, &MouseReport::moved(0, 1, 1)));
        assert_eq!(gated.discarded(), 1);
        assert!(q.is_empty());

        gated.set_focus(true);
        assert!(gated.ingest(&mut q, &MouseReport::moved(0, 1, 1)));

        let mut open = MouseAdapter::new(FocusPolicy::Consumer, false);
        assert!(open.ingest(&mut q, &MouseReport::moved(0, 1, 1)));
        assert_eq!(q.len(), 2);
    }

    #[test]
    fn each_entry_is_tagged_with_its_report_mode() {
        let mut q = InputQueue::new();
        let mut a = MouseAdapter::new(FocusPolicy::Adapter, true);
        a.ingest(&mut q, &MouseReport::moved_to(2, 5, 5));
        a.ingest(&mut q, &MouseReport::moved(1, 1, 0));
        let modes: Vec<_> = q.pop_all().map(|e| (e.device, e.mode)).collect();
        assert_eq!(modes, vec![(2, MotionMode::Absolute), (1, MotionMode::Relative)]);
    }
}
