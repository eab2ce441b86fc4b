//! Injectable raw-input source.
//!
//! [`VirtualSource`] stands in for a platform backend: whatever is fed to it is
//! handed out, in order, on the next poll. Useful for tests and for hosts that
//! already receive input from elsewhere (a remote session, a replay file) and
//! want the queue/dispatch semantics on top.

use crate::event::{ButtonChange, DeviceClass, DeviceId, MouseReport, RawInput};
use crate::metadata::DeviceMeta;
use crate::source::{FocusPolicy, RawInputSource};
use std::any::Any;
use std::collections::VecDeque;

#[derive(Debug, Default)]
pub struct VirtualSource {
    name: String,
    device: DeviceId,
    policy: FocusPolicy,
    focused: Option<bool>,
    pending: VecDeque<RawInput>,
}

impl VirtualSource {
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            ..Self::default()
        }
    }

    /// Use `policy` instead of the default adapter-side focus gating.
    pub fn with_policy(mut self, policy: FocusPolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Device id stamped on the convenience reports below.
    pub fn with_device(mut self, device: DeviceId) -> Self {
        self.device = device;
        self
    }

    /// Inject a raw notification.
    pub fn feed(&mut self, input: RawInput) {
        self.pending.push_back(input);
    }

    /// Relative motion.
    pub fn move_by(&mut self, dx: i32, dy: i32) {
        self.feed(RawInput::Mouse(MouseReport::moved(self.device, dx, dy)));
    }

    /// Absolute position.
    pub fn move_to(&mut self, x: i32, y: i32) {
        self.feed(RawInput::Mouse(MouseReport::moved_to(self.device, x, y)));
    }

    pub fn press(&mut self, button: u8) {
        self.feed(RawInput::Mouse(MouseReport::button(self.device, button, true)));
    }

    pub fn release(&mut self, button: u8) {
        self.feed(RawInput::Mouse(MouseReport::button(self.device, button, false)));
    }

    /// Raw Input style down/up masks.
    pub fn buttons(&mut self, down: u8, up: u8) {
        self.feed(RawInput::Mouse(MouseReport {
            device: self.device,
            buttons: ButtonChange::Masks { down, up },
            ..MouseReport::default()
        }));
    }

    /// Announce a device of `class`.
    pub fn arrive(&mut self, class: DeviceClass) {
        let meta = DeviceMeta::new(self.device, class, "virtual");
        self.feed(RawInput::DeviceArrived(meta));
    }

    /// Announce removal of a device of `class`.
    pub fn remove(&mut self, class: DeviceClass) {
        let meta = DeviceMeta::new(self.device, class, "virtual");
        self.feed(RawInput::DeviceRemoved(meta));
    }

    /// Notifications not yet polled.
    pub fn pending(&self) -> usize {
        self.pending.len()
    }

    /// Last focus state forwarded by the manager, if any.
    pub fn last_focus(&self) -> Option<bool> {
        self.focused
    }
}

impl RawInputSource for VirtualSource {
    fn name(&self) -> &str {
        &self.name
    }

    fn focus_policy(&self) -> FocusPolicy {
        self.policy
    }

    fn set_focus(&mut self, focused: bool) {
        self.focused = Some(focused);
    }

    fn poll(&mut self, out: &mut Vec<RawInput>) {
        out.extend(self.pending.drain(..));
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn poll_hands_out_in_feed_order_once() {
        let mut src = VirtualSource::new("v").with_device(4);
        src.move_by(1, 0);
        src.press(2);
        src.arrive(DeviceClass::Gamepad);
        assert_eq!(src.pending(), 3);

        let mut out = Vec::new();
        src.poll(&mut out);
        assert_eq!(out.len(), 3);
        assert_eq!(out[0], RawInput::Mouse(MouseReport::moved(4, 1, 0)));
        assert_eq!(out[1], RawInput::Mouse(MouseReport::button(4, 2, true)));
        assert!(matches!(&out[2], RawInput::DeviceArrived(m) if m.class == DeviceClass::Gamepad));

        out.clear();
        src.poll(&mut out);
        assert!(out.is_empty());
    }
}
