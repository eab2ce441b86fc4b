//! hidapi-backed raw-input source.
//!
//! Portable stand-in for an IOKit HID manager: enumerate generic-desktop
//! devices matching the configured usages, open the mouse-class ones in
//! non-blocking mode, and split their reports into element values for
//! [`decode_value`]. Hot-plug is noticed by re-enumerating every
//! `hid_rescan_interval` polls.
//!
//! Mice are read as boot-protocol reports (`[buttons][dx][dy]`). Devices whose
//! report descriptor uses a different layout produce garbage motion; a
//! descriptor-driven parser is out of scope here.

use crate::backends::hid_values::{decode_value, BootMouseParser, HidValue};
use crate::context::{Context, StreamClaim, StreamKind};
use crate::error::{HtError, Result};
use crate::event::{DeviceClass, DeviceId, RawInput, PAGE_GENERIC_DESKTOP};
use crate::metadata::DeviceMeta;
use crate::source::RawInputSource;
use hidapi::{DeviceInfo, HidApi, HidDevice};
use std::any::Any;
use std::rc::Rc;

const REPORT_BUF_LEN: usize = 64;

/// Reads never wait for a device; an empty read ends the drain.
const READ_TIMEOUT_MS: i32 = 0;

/// Timed report reads. `HidDevice` is the only production reader.
trait ReportReader {
    type Error: std::fmt::Display;

    fn read_within(&self, buf: &mut [u8], timeout_ms: i32) -> std::result::Result<usize, Self::Error>;
}

impl ReportReader for HidDevice {
    type Error = hidapi::HidError;

    fn read_within(&self, buf: &mut [u8], timeout_ms: i32) -> std::result::Result<usize, Self::Error> {
        self.read_timeout(buf, timeout_ms)
    }
}

/// Read up to `limit` reports from `reader`, handing each to `each`.
/// Returns how many were read.
fn drain_reports<R: ReportReader>(
    reader: &R,
    buf: &mut [u8],
    limit: usize,
    mut each: impl FnMut(&[u8]),
) -> std::result::Result<usize, R::Error> {
    let mut read = 0;
    while read < limit {
        let n = reader.read_within(buf, READ_TIMEOUT_MS)?;
        if n == 0 {
            break;
        }
        each(&buf[..n]);
        read += 1;
    }
    Ok(read)
}

struct OpenDevice {
    meta: DeviceMeta,
    path: String,
    handle: Option<HidDevice>,
    parser: BootMouseParser,
}

/// hidapi manager plus the devices it currently tracks.
pub struct HidSource {
    api: HidApi,
    usages: Vec<DeviceClass>,
    reports_per_poll: usize,
    rescan_interval: u32,
    polls: u32,
    next_id: DeviceId,
    devices: Vec<OpenDevice>,
    values: Vec<HidValue>,
    pending: Vec<RawInput>,
    buf: [u8; REPORT_BUF_LEN],
    _claim: StreamClaim,
}

impl HidSource {
    /// Create the hidapi manager and enumerate matching devices.
    ///
    /// Devices present at startup are announced on the first poll.
    pub fn open(ctx: &Rc<Context>) -> Result<Self> {
        let claim = ctx.claim(StreamKind::HidManager)?;
        let api = HidApi::new().map_err(|e| {
            tracing::warn!(error = %e, "hidapi init failed");
            HtError::InputManagerCreation
        })?;
        let cfg = &ctx.config().input;

        let mut source = Self {
            api,
            usages: cfg.usages.clone(),
            reports_per_poll: cfg.hid_reports_per_poll.max(1),
            rescan_interval: cfg.hid_rescan_interval,
            polls: 0,
            next_id: 1,
            devices: Vec::new(),
            values: Vec::new(),
            pending: Vec::new(),
            buf: [0u8; REPORT_BUF_LEN],
            _claim: claim,
        };
        let mut arrived = Vec::new();
        source.scan(&mut arrived);
        source.pending = arrived;
        Ok(source)
    }

    /// Number of devices currently tracked.
    pub fn device_count(&self) -> usize {
        self.devices.len()
    }

    fn matches(&self, info: &DeviceInfo) -> Option<DeviceClass> {
        if info.usage_page() != PAGE_GENERIC_DESKTOP {
            return None;
        }
        let class = DeviceClass::from_usage(info.usage());
        self.usages.contains(&class).then_some(class)
    }

    /// Re-enumerate and diff against the tracked set by path.
    fn scan(&mut self, out: &mut Vec<RawInput>) {
        if let Err(e) = self.api.refresh_devices() {
            tracing::warn!(error = %e, "hid device refresh failed");
            return;
        }

        let mut present: Vec<String> = Vec::new();
        let mut found: Vec<OpenDevice> = Vec::new();
        for info in self.api.device_list() {
            let Some(class) = self.matches(info) else {
                continue;
            };
            let path = info.path().to_string_lossy().into_owned();
            if present.contains(&path) {
                continue;
            }
            present.push(path.clone());
            if self.devices.iter().any(|d| d.path == path) {
                continue;
            }

            let id = self.next_id;
            self.next_id = self.next_id.wrapping_add(1);
            let mut meta = DeviceMeta::new(id, class, "hid");
            meta.vid = Some(info.vendor_id());
            meta.pid = Some(info.product_id());
            meta.product_string = info.product_string().map(str::to_string);
            meta.serial_number = info.serial_number().map(str::to_string);
            meta.path = Some(path.clone());

            // Only mice are read; other classes are tracked for hot-plug notices.
            let handle = if class == DeviceClass::Mouse {
                match info.open_device(&self.api) {
                    Ok(dev) => {
                        // Reads carry their own zero timeout; this only saves a syscall.
                        if let Err(e) = dev.set_blocking_mode(false) {
                            tracing::debug!(path = %path, error = %e, "hid non-blocking mode unavailable");
                        }
                        Some(dev)
                    }
                    Err(e) => {
                        tracing::debug!(path = %path, error = %e, "hid open failed");
                        None
                    }
                }
            } else {
                None
            };

            found.push(OpenDevice {
                meta,
                path,
                handle,
                parser: BootMouseParser::new(None),
            });
        }

        let mut kept = Vec::with_capacity(self.devices.len());
        for dev in self.devices.drain(..) {
            if present.contains(&dev.path) {
                kept.push(dev);
            } else {
                out.push(RawInput::DeviceRemoved(dev.meta));
            }
        }
        for dev in &found {
            out.push(RawInput::DeviceArrived(dev.meta.clone()));
        }
        kept.extend(found);
        self.devices = kept;
    }

    /// Drain open devices into `self.values`. Devices that fail to read are dropped.
    fn read_reports(&mut self, out: &mut Vec<RawInput>) {
        let mut lost = Vec::new();
        for (slot, dev) in self.devices.iter_mut().enumerate() {
            let Some(handle) = dev.handle.as_ref() else {
                continue;
            };
            let id = dev.meta.id;
            let parser = &mut dev.parser;
            let values = &mut self.values;
            let drained = drain_reports(handle, &mut self.buf, self.reports_per_poll, |report| {
                parser.parse(id, report, values);
            });
            if let Err(e) = drained {
                tracing::warn!(path = %dev.path, error = %e, "hid read failed; dropping device");
                lost.push(slot);
            }
        }
        for slot in lost.into_iter().rev() {
            let dev = self.devices.remove(slot);
            out.push(RawInput::DeviceRemoved(dev.meta));
        }
    }
}

impl RawInputSource for HidSource {
    fn name(&self) -> &str {
        "hid"
    }

    fn poll(&mut self, out: &mut Vec<RawInput>) {
        out.append(&mut self.pending);

        self.polls = self.polls.wrapping_add(1);
        if self.rescan_interval > 0 && self.polls % self.rescan_interval == 0 {
            self.scan(out);
        }

        self.read_reports(out);
        out.extend(self.values.drain(..).filter_map(|v| decode_value(&v)));
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}
