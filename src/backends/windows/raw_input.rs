//! Win32 Raw Input source (`WM_INPUT`).
//!
//! Registration covers the configured generic-desktop usages. Windows delivers
//! `WM_INPUT` through the host's message pump, so the host forwards each one:
//!
//! ```ignore
//! WM_INPUT => {
//!     if let Some(src) = window.input_source_mut::<Win32RawInput>() {
//!         src.handle_wm_input(lparam);
//!     }
//! }
//! WM_INPUT_DEVICE_CHANGE => {
//!     if let Some(src) = window.input_source_mut::<Win32RawInput>() {
//!         src.handle_device_change(wparam, lparam);
//!     }
//! }
//! ```
//!
//! Packets are copied out during the message and decoded immediately; the
//! window's next poll moves them into the queue. Keyboard and HID packets are
//! recognized but not dispatched yet. Packets that fail to read are skipped.

use crate::backends::raw_input::{decode_mouse, RawMouse, VirtualDesktopScale};
use crate::context::{Context, StreamClaim, StreamKind};
use crate::error::{HtError, Result};
use crate::event::{DeviceClass, DeviceId, RawInput};
use crate::metadata::DeviceMeta;
use crate::source::{FocusPolicy, RawInputSource};
use core::ffi::c_void;
use std::any::Any;
use std::rc::Rc;
use windows_sys::Win32::Foundation::{HANDLE, HWND};
use windows_sys::Win32::UI::Input::*;
use windows_sys::Win32::UI::WindowsAndMessaging::{
    GetSystemMetrics, SM_CXVIRTUALSCREEN, SM_CYVIRTUALSCREEN,
};

// Local constants (avoid relying on module exports that vary by windows-sys version)
const RIDEV_REMOVE: u32 = 0x0000_0001;
const RIDEV_NOLEGACY: u32 = 0x0000_0030;
const RIDEV_INPUTSINK: u32 = 0x0000_0100;
const RIDEV_DEVNOTIFY: u32 = 0x0000_2000;

const GIDC_ARRIVAL: usize = 1;
const GIDC_REMOVAL: usize = 2;

const PAGE_GENERIC_DESKTOP: u16 = crate::event::PAGE_GENERIC_DESKTOP;

#[inline]
fn device_id(hdev: HANDLE) -> DeviceId {
    hdev as usize as DeviceId
}

fn register(usages: &[DeviceClass], flags: impl Fn(DeviceClass) -> u32, target: HWND) -> bool {
    let rid: Vec<RAWINPUTDEVICE> = usages
        .iter()
        .map(|&class| RAWINPUTDEVICE {
            usUsagePage: PAGE_GENERIC_DESKTOP,
            usUsage: class.usage(),
            dwFlags: flags(class),
            hwndTarget: target,
        })
        .collect();
    unsafe {
        RegisterRawInputDevices(
            rid.as_ptr(),
            rid.len() as u32,
            core::mem::size_of::<RAWINPUTDEVICE>() as u32,
        ) != 0
    }
}

/// Raw Input registration for one window.
pub struct Win32RawInput {
    usages: Vec<DeviceClass>,
    policy: FocusPolicy,
    scale: VirtualDesktopScale,
    pending: Vec<RawInput>,
    // Dropped last so the registration is removed before the claim is released.
    _claim: StreamClaim,
}

impl Win32RawInput {
    /// Register the configured usages.
    ///
    /// `target` is the window receiving `WM_INPUT`; null follows keyboard focus.
    /// Background delivery (`input.background`) needs a non-null target.
    pub fn register(ctx: &Rc<Context>, target: HWND) -> Result<Self> {
        let claim = ctx.claim(StreamKind::Win32RawInput)?;
        let cfg = &ctx.config().input;

        let sink = cfg.background && !target.is_null();
        if cfg.background && !sink {
            tracing::warn!("background raw input requested without a target window; ignoring");
        }

        let ok = register(
            &cfg.usages,
            |class| {
                let mut flags = RIDEV_DEVNOTIFY;
                if class == DeviceClass::Keyboard {
                    flags |= RIDEV_NOLEGACY;
                }
                if sink {
                    flags |= RIDEV_INPUTSINK;
                }
                flags
            },
            target,
        );
        if !ok {
            tracing::warn!("RegisterRawInputDevices failed");
            return Err(HtError::InputManagerCreation);
        }

        let scale = unsafe {
            VirtualDesktopScale::from_screen(
                GetSystemMetrics(SM_CXVIRTUALSCREEN),
                GetSystemMetrics(SM_CYVIRTUALSCREEN),
            )
        };

        tracing::info!(usages = ?cfg.usages, background = sink, "raw input registered");

        Ok(Self {
            usages: cfg.usages.clone(),
            policy: if sink {
                FocusPolicy::Consumer
            } else {
                FocusPolicy::Adapter
            },
            scale,
            pending: Vec::new(),
            _claim: claim,
        })
    }

    /// Forward a `WM_INPUT` message. Returns `true` if a packet was staged.
    pub fn handle_wm_input(&mut self, lparam: isize) -> bool {
        match read_wm_input(lparam, self.scale) {
            Some(input) => {
                self.pending.push(input);
                true
            }
            None => false,
        }
    }

    /// Forward a `WM_INPUT_DEVICE_CHANGE` message.
    pub fn handle_device_change(&mut self, wparam: usize, lparam: isize) {
        let hdev = lparam as HANDLE;
        match wparam {
            GIDC_ARRIVAL => self.pending.push(RawInput::DeviceArrived(device_meta(hdev))),
            GIDC_REMOVAL => self.pending.push(RawInput::DeviceRemoved(DeviceMeta::new(
                device_id(hdev),
                DeviceClass::Unknown,
                "rawinput",
            ))),
            _ => {}
        }
    }
}

impl Drop for Win32RawInput {
    fn drop(&mut self) {
        if !register(&self.usages, |_| RIDEV_REMOVE, core::ptr::null_mut()) {
            tracing::warn!("raw input unregistration failed");
        }
    }
}

impl RawInputSource for Win32RawInput {
    fn name(&self) -> &str {
        "rawinput"
    }

    fn focus_policy(&self) -> FocusPolicy {
        self.policy
    }

    fn poll(&mut self, out: &mut Vec<RawInput>) {
        out.append(&mut self.pending);
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}

/// Read a `WM_INPUT` lparam and decode it.
fn read_wm_input(lparam: isize, scale: VirtualDesktopScale) -> Option<RawInput> {
    unsafe {
        // Query size
        let mut size: u32 = 0;
        let r0 = GetRawInputData(
            lparam as _,
            RID_INPUT,
            core::ptr::null_mut(),
            &mut size,
            core::mem::size_of::<RAWINPUTHEADER>() as u32,
        );
        if r0 == u32::MAX || size == 0 {
            return None;
        }

        // Read buffer
        let mut buf = vec![0u8; size as usize];
        let r1 = GetRawInputData(
            lparam as _,
            RID_INPUT,
            buf.as_mut_ptr() as *mut c_void,
            &mut size,
            core::mem::size_of::<RAWINPUTHEADER>() as u32,
        );
        if r1 == u32::MAX {
            return None;
        }

        read_raw_input_bytes(&buf, scale)
    }
}

/// Decode a `RID_INPUT` payload copied during `WM_INPUT`.
fn read_raw_input_bytes(buf: &[u8], scale: VirtualDesktopScale) -> Option<RawInput> {
    let hdr_sz = core::mem::size_of::<RAWINPUTHEADER>();
    if buf.len() < hdr_sz {
        return None;
    }

    unsafe {
        // Payload is variable-sized; read the header first.
        let hdr: RAWINPUTHEADER = core::ptr::read_unaligned(buf.as_ptr() as *const RAWINPUTHEADER);
        let data_ptr = buf.as_ptr().add(hdr_sz);

        match hdr.dwType {
            RIM_TYPEMOUSE => {
                let need = hdr_sz + core::mem::size_of::<RAWMOUSE>();
                if buf.len() < need {
                    return None;
                }
                let m: RAWMOUSE = core::ptr::read_unaligned(data_ptr as *const RAWMOUSE);
                let raw = RawMouse {
                    device: device_id(hdr.hDevice),
                    flags: m.usFlags as u16,
                    last_x: m.lLastX,
                    last_y: m.lLastY,
                    button_flags: m.Anonymous.Anonymous.usButtonFlags,
                };
                Some(RawInput::Mouse(decode_mouse(&raw, scale)))
            }
            RIM_TYPEKEYBOARD => Some(RawInput::Ignored(DeviceClass::Keyboard)),
            RIM_TYPEHID => Some(RawInput::Ignored(DeviceClass::Unknown)),
            _ => None,
        }
    }
}

/// RawInput device interface path for a given `hDevice` (RIDI_DEVICENAME).
fn device_name(hdev: HANDLE) -> Option<String> {
    unsafe {
        // Query required size (in WCHARs, including NUL).
        let mut size: u32 = 0;
        let r0 = GetRawInputDeviceInfoW(hdev, RIDI_DEVICENAME, core::ptr::null_mut(), &mut size);
        if r0 == u32::MAX || size == 0 {
            return None;
        }

        let mut wide: Vec<u16> = vec![0u16; size as usize];
        let r1 = GetRawInputDeviceInfoW(
            hdev,
            RIDI_DEVICENAME,
            wide.as_mut_ptr() as *mut c_void,
            &mut size,
        );
        if r1 == u32::MAX {
            return None;
        }

        while wide.last() == Some(&0) {
            wide.pop();
        }
        Some(String::from_utf16_lossy(&wide))
    }
}

/// Class and identity of a newly attached device (RIDI_DEVICEINFO).
fn device_meta(hdev: HANDLE) -> DeviceMeta {
    let mut meta = DeviceMeta::new(device_id(hdev), DeviceClass::Unknown, "rawinput");
    meta.path = device_name(hdev);

    unsafe {
        let mut info: RID_DEVICE_INFO = core::mem::zeroed();
        info.cbSize = core::mem::size_of::<RID_DEVICE_INFO>() as u32;
        let mut size = info.cbSize;
        let r = GetRawInputDeviceInfoW(
            hdev,
            RIDI_DEVICEINFO,
            &mut info as *mut RID_DEVICE_INFO as *mut c_void,
            &mut size,
        );
        if r == u32::MAX || r == 0 {
            return meta;
        }
        meta.class = match info.dwType {
            RIM_TYPEMOUSE => DeviceClass::Mouse,
            RIM_TYPEKEYBOARD => DeviceClass::Keyboard,
            RIM_TYPEHID => {
                let hid = info.Anonymous.hid;
                meta.vid = Some(hid.dwVendorId as u16);
                meta.pid = Some(hid.dwProductId as u16);
                if hid.usUsagePage == PAGE_GENERIC_DESKTOP {
                    DeviceClass::from_usage(hid.usUsage)
                } else {
                    DeviceClass::Unknown
                }
            }
            _ => DeviceClass::Unknown,
        };
    }
    meta
}
