//! Raw-input backends.
//!
//! Implementations of [`RawInputSource`](crate::source::RawInputSource) for
//! platform-specific input streams, plus the pure decoders they feed.
//!
//! # Feature flags
//! - **`hid`**: hidapi source (default). Used where no native raw-input stream is wired up.
//! - **`x11`**: XInput2 raw events on Linux.
//!
//! The decoders (`raw_input`, `hid_values`, `xinput2`) compile everywhere so their
//! bit handling is tested on every host.

use crate::context::Context;
use crate::error::Result;
use crate::source::RawInputSource;
use std::rc::Rc;

pub mod hid_values;
pub mod raw_input;
pub mod virtual_input;
pub mod xinput2;

#[cfg(feature = "hid")]
#[cfg_attr(docsrs, doc(cfg(feature = "hid")))]
pub mod hid;

#[cfg(all(feature = "x11", target_os = "linux"))]
#[cfg_attr(docsrs, doc(cfg(all(feature = "x11", target_os = "linux"))))]
pub mod x11;

#[cfg(target_os = "windows")]
#[cfg_attr(docsrs, doc(cfg(target_os = "windows")))]
pub mod windows;

/// The native source for this platform.
///
/// Windows: Raw Input. Linux with `x11`: XInput2. Otherwise hidapi when the
/// `hid` feature is on.
#[cfg(target_os = "windows")]
pub fn default_source(ctx: &Rc<Context>) -> Result<Box<dyn RawInputSource>> {
    let source = windows::Win32RawInput::register(ctx, std::ptr::null_mut())?;
    Ok(Box::new(source))
}

#[cfg(all(not(target_os = "windows"), feature = "x11", target_os = "linux"))]
pub fn default_source(ctx: &Rc<Context>) -> Result<Box<dyn RawInputSource>> {
    Ok(Box::new(x11::XiSource::open(ctx)?))
}

#[cfg(all(
    not(target_os = "windows"),
    not(all(feature = "x11", target_os = "linux")),
    feature = "hid"
))]
pub fn default_source(ctx: &Rc<Context>) -> Result<Box<dyn RawInputSource>> {
    Ok(Box::new(hid::HidSource::open(ctx)?))
}

#[cfg(all(
    not(target_os = "windows"),
    not(all(feature = "x11", target_os = "linux")),
    not(feature = "hid")
))]
pub fn default_source(_ctx: &Rc<Context>) -> Result<Box<dyn RawInputSource>> {
    tracing::warn!("no raw-input backend compiled in");
    Err(crate::error::HtError::InputManagerCreation)
}
