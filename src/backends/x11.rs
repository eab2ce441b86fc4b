//! XInput2 raw-event source on a secondary X display connection.
//!
//! Raw events bypass pointer acceleration and are delivered regardless of which
//! client window has focus, so the connection selects them on the root window.
//! The adapter gates them by the owning window's focus.
//!
//! Hierarchy changes (slave pointers added or removed) become hot-plug notices.

use crate::backends::xinput2::{decode_raw, masked_axes, SubpixelCarry, XiRawKind, XiRawRecord};
use crate::context::{Context, StreamClaim, StreamKind};
use crate::error::{HtError, Result};
use crate::event::{DeviceClass, DeviceId, MotionMode, RawInput};
use crate::metadata::DeviceMeta;
use crate::source::RawInputSource;
use std::any::Any;
use std::collections::HashMap;
use std::ffi::{CStr, CString};
use std::os::raw::c_int;
use std::rc::Rc;
use x11::xinput2 as xi2;
use x11::xlib;

/// Secondary display connection selecting XInput2 raw events.
pub struct XiSource {
    display: *mut xlib::Display,
    opcode: c_int,
    modes: HashMap<DeviceId, MotionMode>,
    carry: SubpixelCarry,
    _claim: StreamClaim,
}

impl XiSource {
    /// Open the display named by `input.x11_display` (or `$DISPLAY`).
    pub fn open(ctx: &Rc<Context>) -> Result<Self> {
        let claim = ctx.claim(StreamKind::XInput2Display)?;

        let name = match &ctx.config().input.x11_display {
            Some(name) => Some(CString::new(name.as_str()).map_err(|_| HtError::InvalidArgument)?),
            None => None,
        };

        unsafe {
            let display = xlib::XOpenDisplay(name.as_ref().map_or(std::ptr::null(), |n| n.as_ptr()));
            if display.is_null() {
                tracing::warn!("cannot open X display for raw input");
                return Err(HtError::WindowServer);
            }

            match Self::select(display) {
                Ok(opcode) => {
                    tracing::info!(opcode, "xinput2 raw events selected");
                    Ok(Self {
                        display,
                        opcode,
                        modes: HashMap::new(),
                        carry: SubpixelCarry::default(),
                        _claim: claim,
                    })
                }
                Err(e) => {
                    xlib::XCloseDisplay(display);
                    Err(e)
                }
            }
        }
    }

    unsafe fn select(display: *mut xlib::Display) -> Result<c_int> {
        let mut opcode = 0;
        let mut event = 0;
        let mut error = 0;
        let ext = c"XInputExtension";
        if xlib::XQueryExtension(display, ext.as_ptr(), &mut opcode, &mut event, &mut error) == 0 {
            tracing::warn!("XInput extension not available");
            return Err(HtError::InputManagerCreation);
        }

        let mut major = 2;
        let mut minor = 0;
        if xi2::XIQueryVersion(display, &mut major, &mut minor) != xlib::Success as c_int {
            tracing::warn!(major, minor, "XInput2 2.0 not supported");
            return Err(HtError::InputManagerCreation);
        }

        let root = xlib::XDefaultRootWindow(display);

        // Raw events on masters carry the slave in `sourceid`; selecting on
        // every device would deliver each event twice.
        let mut raw_mask = [0u8; 4];
        xi2::XISetMask(&mut raw_mask, xi2::XI_RawMotion);
        xi2::XISetMask(&mut raw_mask, xi2::XI_RawButtonPress);
        xi2::XISetMask(&mut raw_mask, xi2::XI_RawButtonRelease);
        let mut hier_mask = [0u8; 4];
        xi2::XISetMask(&mut hier_mask, xi2::XI_HierarchyChanged);

        let mut masks = [
            xi2::XIEventMask {
                deviceid: xi2::XIAllMasterDevices,
                mask_len: raw_mask.len() as c_int,
                mask: raw_mask.as_mut_ptr(),
            },
            xi2::XIEventMask {
                deviceid: xi2::XIAllDevices,
                mask_len: hier_mask.len() as c_int,
                mask: hier_mask.as_mut_ptr(),
            },
        ];
        if xi2::XISelectEvents(display, root, masks.as_mut_ptr(), masks.len() as c_int)
            != xlib::Success as c_int
        {
            tracing::warn!("XISelectEvents failed");
            return Err(HtError::InputManagerCreation);
        }
        xlib::XFlush(display);
        Ok(opcode)
    }

    /// Valuator mode of `device`, cached after the first query.
    fn mode(&mut self, device: DeviceId) -> MotionMode {
        let display = self.display;
        *self
            .modes
            .entry(device)
            .or_insert_with(|| unsafe { query_mode(display, device as c_int) })
    }

    unsafe fn raw_record(&mut self, cookie: &xlib::XGenericEventCookie) -> Option<XiRawRecord> {
        let kind = match cookie.evtype {
            xi2::XI_RawMotion => XiRawKind::Motion,
            xi2::XI_RawButtonPress => XiRawKind::ButtonPress,
            xi2::XI_RawButtonRelease => XiRawKind::ButtonRelease,
            _ => return None,
        };
        let raw = &*(cookie.data as *const xi2::XIRawEvent);

        let values = if kind == XiRawKind::Motion && !raw.valuators.mask.is_null() {
            let mask = std::slice::from_raw_parts(raw.valuators.mask, raw.valuators.mask_len.max(0) as usize);
            let set = mask.iter().map(|b| b.count_ones() as usize).sum::<usize>();
            let packed = if raw.raw_values.is_null() {
                &[][..]
            } else {
                std::slice::from_raw_parts(raw.raw_values, set)
            };
            masked_axes(mask, packed)
        } else {
            [None; 2]
        };

        let device = raw.sourceid as DeviceId;
        Some(XiRawRecord {
            device,
            kind,
            detail: raw.detail,
            values,
            mode: self.mode(device),
        })
    }

    unsafe fn hierarchy(&mut self, cookie: &xlib::XGenericEventCookie, out: &mut Vec<RawInput>) {
        let ev = &*(cookie.data as *const xi2::XIHierarchyEvent);
        if ev.info.is_null() {
            return;
        }
        let infos = std::slice::from_raw_parts(ev.info, ev.num_info.max(0) as usize);
        for info in infos {
            if info._use != xi2::XISlavePointer {
                continue;
            }
            let id = info.deviceid as DeviceId;
            if info.flags & xi2::XISlaveAdded != 0 {
                let mut meta = DeviceMeta::new(id, DeviceClass::Mouse, "xinput2");
                meta.product_string = device_name(self.display, info.deviceid);
                out.push(RawInput::DeviceArrived(meta));
            } else if info.flags & xi2::XISlaveRemoved != 0 {
                self.modes.remove(&id);
                self.carry.forget(id);
                out.push(RawInput::DeviceRemoved(DeviceMeta::new(id, DeviceClass::Mouse, "xinput2")));
            }
        }
    }
}

impl Drop for XiSource {
    fn drop(&mut self) {
        unsafe {
            xlib::XCloseDisplay(self.display);
        }
    }
}

impl RawInputSource for XiSource {
    fn name(&self) -> &str {
        "xinput2"
    }

    fn poll(&mut self, out: &mut Vec<RawInput>) {
        unsafe {
            while xlib::XPending(self.display) > 0 {
                let mut event: xlib::XEvent = std::mem::zeroed();
                xlib::XNextEvent(self.display, &mut event);
                if event.get_type() != xlib::GenericEvent {
                    continue;
                }
                let mut cookie = event.generic_event_cookie;
                if cookie.extension != self.opcode
                    || xlib::XGetEventData(self.display, &mut cookie) == 0
                {
                    continue;
                }

                if cookie.evtype == xi2::XI_HierarchyChanged {
                    self.hierarchy(&cookie, out);
                } else if let Some(mut rec) = self.raw_record(&cookie) {
                    self.carry.apply(&mut rec);
                    if let Some(report) = decode_raw(&rec) {
                        out.push(RawInput::Mouse(report));
                    }
                }

                xlib::XFreeEventData(self.display, &mut cookie);
            }
        }
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}

/// Mode of the first two valuators, relative unless the device says otherwise.
unsafe fn query_mode(display: *mut xlib::Display, device: c_int) -> MotionMode {
    let mut count = 0;
    let info = xi2::XIQueryDevice(display, device, &mut count);
    if info.is_null() {
        return MotionMode::Relative;
    }
    let mut mode = MotionMode::Relative;
    if count > 0 && !(*info).classes.is_null() {
        let classes = std::slice::from_raw_parts((*info).classes, (*info).num_classes.max(0) as usize);
        for &class in classes {
            if class.is_null() || (*class)._type != xi2::XIValuatorClass {
                continue;
            }
            let v = &*(class as *const xi2::XIValuatorClassInfo);
            if v.number == 0 {
                if v.mode == xi2::XIModeAbsolute {
                    mode = MotionMode::Absolute;
                }
                break;
            }
        }
    }
    xi2::XIFreeDeviceInfo(info);
    mode
}

unsafe fn device_name(display: *mut xlib::Display, device: c_int) -> Option<String> {
    let mut count = 0;
    let info = xi2::XIQueryDevice(display, device, &mut count);
    if info.is_null() {
        return None;
    }
    let name = if count > 0 && !(*info).name.is_null() {
        Some(CStr::from_ptr((*info).name).to_string_lossy().into_owned())
    } else {
        None
    };
    xi2::XIFreeDeviceInfo(info);
    name
}
