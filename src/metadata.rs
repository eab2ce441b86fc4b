//! Device metadata attached to hot-plug notices.
//!
//! [`DeviceMeta`] is a cloneable description of a device. Backends fill in what
//! they know; unknown fields stay `None`. The input manager only logs these
//! (serialized as JSON so log pipelines can parse them); no re-subscription
//! happens on arrival or removal.

use crate::event::{DeviceClass, DeviceId};
use serde::{Deserialize, Serialize};

/// Description of a single raw-input device.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeviceMeta {
    /// Backend-local id, matching [`MouseReport::device`](crate::event::MouseReport::device).
    pub id: DeviceId,
    /// Generic-desktop class from the device's primary usage.
    pub class: DeviceClass,
    /// Short bus hint: `"hid"`, `"rawinput"`, `"xinput2"`, `"virtual"`.
    pub bus: Option<String>,
    pub vid: Option<u16>,
    pub pid: Option<u16>,
    /// Human-readable product name, when the platform has one.
    pub product_string: Option<String>,
    pub serial_number: Option<String>,
    /// OS path; opaque and only stable for the lifetime of one connection.
    pub path: Option<String>,
    /// Number of input elements the device exposes, when known.
    pub elements: Option<usize>,
}

impl DeviceMeta {
    pub fn new(id: DeviceId, class: DeviceClass, bus: &str) -> Self {
        Self {
            id,
            class,
            bus: Some(bus.to_string()),
            ..Self::default()
        }
    }

    /// Compact JSON form used in log lines.
    pub fn to_json(&self) -> String {
        serde_json::to_string(self).unwrap_or_else(|_| format!("{self:?}"))
    }
}
