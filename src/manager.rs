//! Per-window input manager.
//!
//! [`InputManager`] owns exactly one [`RawInputSource`] and the window's
//! [`MouseAdapter`]. [`InputManager::pump`] moves whatever the platform has
//! delivered into the window's [`InputQueue`]; dispatch happens elsewhere
//! (see [`Window::poll_input_events`](crate::Window::poll_input_events)).

use crate::adapter::MouseAdapter;
use crate::event::RawInput;
use crate::queue::InputQueue;
use crate::source::RawInputSource;

pub struct InputManager {
    source: Box<dyn RawInputSource>,
    adapter: MouseAdapter,
    scratch: Vec<RawInput>,
}

impl std::fmt::Debug for InputManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("InputManager")
            .field("source", &self.source.name())
            .field("adapter", &self.adapter)
            .finish()
    }
}

impl InputManager {
    pub fn new(source: Box<dyn RawInputSource>, focused: bool) -> Self {
        let adapter = MouseAdapter::new(source.focus_policy(), focused);
        Self {
            source,
            adapter,
            scratch: Vec::new(),
        }
    }

    #[inline]
    pub fn source_name(&self) -> &str {
        self.source.name()
    }

    /// Reports discarded while the window was unfocused.
    #[inline]
    pub fn discarded(&self) -> u64 {
        self.adapter.discarded()
    }

    pub fn set_focus(&mut self, focused: bool) {
        self.adapter.set_focus(focused);
        self.source.set_focus(focused);
    }

    /// Concrete source, if it is a `T`.
    pub fn source_mut<T: RawInputSource>(&mut self) -> Option<&mut T> {
        self.source.as_any_mut().downcast_mut::<T>()
    }

    /// Drain the source into `queue`. Returns the number of snapshots queued.
    pub fn pump(&mut self, queue: &mut InputQueue) -> usize {
        self.source.poll(&mut self.scratch);

        let mut queued = 0;
        for input in self.scratch.drain(..) {
            match input {
                RawInput::Mouse(report) => {
                    if self.adapter.ingest(queue, &report) {
                        queued += 1;
                    }
                }
                RawInput::DeviceArrived(meta) => {
                    tracing::info!(
                        source = self.source.name(),
                        device = %meta.to_json(),
                        "input device arrived"
                    );
                }
                RawInput::DeviceRemoved(meta) => {
                    tracing::info!(
                        source = self.source.name(),
                        device = %meta.to_json(),
                        "input device removed"
                    );
                }
                RawInput::Ignored(_class) => {
                    #[cfg(feature = "debug-log")]
                    tracing::trace!(source = self.source.name(), class = ?_class, "input not dispatched");
                }
            }
        }
        queued
    }
}
