//! The seam between platform backends and the input pipeline.
//!
//! A [`RawInputSource`] wraps one platform delivery mechanism and hands back
//! normalized [`RawInput`] values. The [`InputManager`](crate::manager::InputManager)
//! only ever talks to this trait; nothing above it knows which backend is live.
//!
//! Delivery models differ per backend but all fit `poll`:
//! - **callback** style (HID values): notifications are staged internally and
//!   handed out on the next `poll`;
//! - **message pump** style (Win32 `WM_INPUT`): the host forwards messages to the
//!   source (see [`RawInputSource::as_any_mut`]), which stages them;
//! - **event polling** style (XInput2): `poll` drains the secondary connection.

use crate::event::RawInput;
use std::any::Any;

/// Who keeps input from an unfocused window out of the pipeline.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum FocusPolicy {
    /// The adapter discards mouse reports while the window is unfocused.
    #[default]
    Adapter,
    /// Input arrives on a global/background channel and is queued regardless;
    /// handlers check [`Window::is_focused`](crate::Window::is_focused).
    Consumer,
}

/// One platform raw-input subscription.
pub trait RawInputSource: Any {
    /// Short backend label for logs.
    fn name(&self) -> &str;

    fn focus_policy(&self) -> FocusPolicy {
        FocusPolicy::Adapter
    }

    /// Window focus changed. Sources that can pause delivery may do so here.
    fn set_focus(&mut self, _focused: bool) {}

    /// Move every pending notification into `out`, oldest first.
    ///
    /// Must not block beyond draining what the platform already has queued.
    fn poll(&mut self, out: &mut Vec<RawInput>);

    /// Typed access for hosts that feed native messages into a concrete source.
    fn as_any_mut(&mut self) -> &mut dyn Any;
}
