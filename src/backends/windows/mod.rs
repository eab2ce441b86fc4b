#![cfg(target_os = "windows")]

//! Windows input backend.
//!
//! - **Raw Input** registration and `WM_INPUT` forwarding ([`Win32RawInput`])
//!
//! Decoding of the mouse packet itself lives in
//! [`backends::raw_input`](crate::backends::raw_input) so it can be tested on any
//! platform. Most users should not touch this module directly beyond forwarding
//! messages; [`Window::create_input_manager`](crate::Window::create_input_manager)
//! registers it on Windows.

pub mod raw_input;

pub use raw_input::Win32RawInput;
