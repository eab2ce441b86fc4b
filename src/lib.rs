//! Per-window raw input with a fixed-size mouse snapshot queue.
//!
//! Platform raw-input streams (HID element values, Win32 `WM_INPUT`, XInput2 raw
//! events) are normalized into [`RawInput`], completed against the previous
//! snapshot, de-duplicated, and queued per window. The application drains the
//! queue once per frame with [`Window::poll_input_events`], which calls the
//! mouse handler once per queued snapshot in arrival order.
//!
//! ```no_run
//! use htwin::{Context, EventKind, Window, WindowAttribute};
//!
//! let ctx = Context::new();
//! let mut window = Window::new(&ctx, 0, 0, 640, 480)?;
//! window.create_input_manager()?;
//! window.set_event_handler(EventKind::Mouse, |w| {
//!     let x = w.get_integer(WindowAttribute::MouseX).unwrap_or(0);
//!     let y = w.get_integer(WindowAttribute::MouseY).unwrap_or(0);
//!     println!("mouse at {x},{y}");
//! })?;
//! loop {
//!     window.poll_window_events()?;
//!     window.poll_input_events()?;
//! }
//! # Ok::<(), htwin::HtError>(())
//! ```

#![cfg_attr(docsrs, feature(doc_cfg))]

pub mod adapter;
pub mod attribute;
pub mod backends;
pub mod config;
pub mod context;
pub mod error;
pub mod event;
pub mod manager;
pub mod metadata;
pub mod queue;
pub mod snapshot;
pub mod source;
pub mod window;

pub use attribute::*;
pub use config::{Config, GlConfig, InputConfig, WindowConfig};
pub use context::{Context, StreamClaim, StreamKind};
pub use error::*;
pub use event::*;
pub use manager::*;
pub use metadata::DeviceMeta;
pub use queue::{InputQueue, QueuedInput, QUEUE_SIZE};
pub use snapshot::*;
pub use source::*;
pub use window::*;
