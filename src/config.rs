//! Configuration loaded from TOML (or JSON).
//!
//! Every field has a default, so an empty document is a valid config:
//!
//! ```toml
//! [gl]
//! major_version = 3
//! minor_version = 3
//! samples = 4
//! sample_buffers = 1
//!
//! [window]
//! title = "demo"
//! style = "TITLED | CLOSABLE"
//!
//! [input]
//! usages = ["mouse", "gamepad"]
//! hid_reports_per_poll = 16
//! ```

use crate::attribute::WindowStyle;
use crate::error::ConfigError;
use crate::event::DeviceClass;
use serde::{Deserialize, Serialize};
use std::path::Path;

pub const DEFAULT_GL_ACCELERATED: bool = true;
pub const DEFAULT_GL_ACCUM_BUFFER: i32 = 0;
pub const DEFAULT_GL_AUX_BUFFERS: i32 = 0;
pub const DEFAULT_GL_BACKING_STORE: bool = false;
pub const DEFAULT_GL_COLOR_BUFFER: i32 = 32;
pub const DEFAULT_GL_DEPTH_BUFFER: i32 = 24;
pub const DEFAULT_GL_DOUBLE_BUFFERING: bool = true;
pub const DEFAULT_GL_MAJOR_VERSION: i32 = 1;
pub const DEFAULT_GL_MINOR_VERSION: i32 = 0;
pub const DEFAULT_GL_RGBA_CHANNEL: i32 = 8;
pub const DEFAULT_GL_SAMPLE_BUFFERS: i32 = 0;
pub const DEFAULT_GL_SAMPLES: i32 = 0;
pub const DEFAULT_GL_STENCIL_BUFFER: i32 = 8;
pub const DEFAULT_GL_STEREO: bool = false;
pub const DEFAULT_GL_SWAP_INTERVAL: i32 = 1;

pub const MAX_GL_ACCUM_BUFFER: i32 = 128;
pub const MAX_GL_AUX_BUFFERS: i32 = 4;
pub const MAX_GL_DEPTH_BUFFER: i32 = 32;
pub const MAX_GL_MAJOR_VERSION: i32 = 9;
pub const MAX_GL_MINOR_VERSION: i32 = 9;
pub const MAX_GL_RGBA_CHANNEL: i32 = 8;
pub const MAX_GL_SAMPLE_BUFFERS: i32 = 1;
pub const MAX_GL_SAMPLES: i32 = 16;
pub const MAX_GL_STENCIL_BUFFER: i32 = 8;
pub const MAX_GL_SWAP_INTERVAL: i32 = 1;

/// Top-level configuration shared by every window created from a
/// [`Context`](crate::context::Context).
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub gl: GlConfig,
    pub window: WindowConfig,
    pub input: InputConfig,
}

impl Config {
    /// Parse a TOML document.
    pub fn from_toml_str(text: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(text)?)
    }

    /// Parse a JSON document.
    pub fn from_json_str(text: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(text)?)
    }

    /// Load a config file. `.json` files are parsed as JSON, everything else as TOML.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path)?;
        match path.extension().and_then(|e| e.to_str()) {
            Some("json") => Self::from_json_str(&text),
            _ => Self::from_toml_str(&text),
        }
    }
}

/// OpenGL context-creation parameters.
///
/// These are requests, not guarantees: a context backend overwrites them with
/// whatever the driver actually granted. Setters clamp to `[0, MAX_*]`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GlConfig {
    pub accelerated: bool,
    pub accum_buffer: i32,
    pub aux_buffers: i32,
    pub backing_store: bool,
    pub red: i32,
    pub green: i32,
    pub blue: i32,
    pub alpha: i32,
    pub depth_buffer: i32,
    pub double_buffering: bool,
    pub major_version: i32,
    pub minor_version: i32,
    pub sample_buffers: i32,
    pub samples: i32,
    pub stencil_buffer: i32,
    pub stereo: bool,
    pub swap_interval: i32,
}

impl Default for GlConfig {
    fn default() -> Self {
        Self {
            accelerated: DEFAULT_GL_ACCELERATED,
            accum_buffer: DEFAULT_GL_ACCUM_BUFFER,
            aux_buffers: DEFAULT_GL_AUX_BUFFERS,
            backing_store: DEFAULT_GL_BACKING_STORE,
            red: DEFAULT_GL_RGBA_CHANNEL,
            green: DEFAULT_GL_RGBA_CHANNEL,
            blue: DEFAULT_GL_RGBA_CHANNEL,
            alpha: DEFAULT_GL_RGBA_CHANNEL,
            depth_buffer: DEFAULT_GL_DEPTH_BUFFER,
            double_buffering: DEFAULT_GL_DOUBLE_BUFFERING,
            major_version: DEFAULT_GL_MAJOR_VERSION,
            minor_version: DEFAULT_GL_MINOR_VERSION,
            sample_buffers: DEFAULT_GL_SAMPLE_BUFFERS,
            samples: DEFAULT_GL_SAMPLES,
            stencil_buffer: DEFAULT_GL_STENCIL_BUFFER,
            stereo: DEFAULT_GL_STEREO,
            swap_interval: DEFAULT_GL_SWAP_INTERVAL,
        }
    }
}

#[inline]
fn clamp(value: i32, max: i32) -> i32 {
    value.clamp(0, max)
}

impl GlConfig {
    /// Total color buffer bits (sum of the four channels).
    pub fn color_buffer(&self) -> i32 {
        self.red + self.green + self.blue + self.alpha
    }

    /// Core profile is requested for anything newer than GL 2.x.
    pub fn core_profile(&self) -> bool {
        self.major_version > 2
    }

    /// Pixel format is always true color.
    pub fn pixel_type(&self) -> i32 {
        1
    }

    pub fn set_red(&mut self, v: i32) {
        self.red = clamp(v, MAX_GL_RGBA_CHANNEL);
    }
    pub fn set_green(&mut self, v: i32) {
        self.green = clamp(v, MAX_GL_RGBA_CHANNEL);
    }
    pub fn set_blue(&mut self, v: i32) {
        self.blue = clamp(v, MAX_GL_RGBA_CHANNEL);
    }
    pub fn set_alpha(&mut self, v: i32) {
        self.alpha = clamp(v, MAX_GL_RGBA_CHANNEL);
    }
    pub fn set_accum_buffer(&mut self, v: i32) {
        self.accum_buffer = clamp(v, MAX_GL_ACCUM_BUFFER);
    }
    pub fn set_aux_buffers(&mut self, v: i32) {
        self.aux_buffers = clamp(v, MAX_GL_AUX_BUFFERS);
    }
    pub fn set_depth_buffer(&mut self, v: i32) {
        self.depth_buffer = clamp(v, MAX_GL_DEPTH_BUFFER);
    }
    pub fn set_stencil_buffer(&mut self, v: i32) {
        self.stencil_buffer = clamp(v, MAX_GL_STENCIL_BUFFER);
    }
    pub fn set_major_version(&mut self, v: i32) {
        self.major_version = clamp(v, MAX_GL_MAJOR_VERSION);
    }
    pub fn set_minor_version(&mut self, v: i32) {
        self.minor_version = clamp(v, MAX_GL_MINOR_VERSION);
    }
    pub fn set_sample_buffers(&mut self, v: i32) {
        self.sample_buffers = clamp(v, MAX_GL_SAMPLE_BUFFERS);
    }
    pub fn set_samples(&mut self, v: i32) {
        self.samples = clamp(v, MAX_GL_SAMPLES);
    }
    pub fn set_swap_interval(&mut self, v: i32) {
        self.swap_interval = clamp(v, MAX_GL_SWAP_INTERVAL);
    }

    /// Clamp every numeric field into its legal range (used after deserializing).
    pub fn sanitized(mut self) -> Self {
        self.set_red(self.red);
        self.set_green(self.green);
        self.set_blue(self.blue);
        self.set_alpha(self.alpha);
        self.set_accum_buffer(self.accum_buffer);
        self.set_aux_buffers(self.aux_buffers);
        self.set_depth_buffer(self.depth_buffer);
        self.set_stencil_buffer(self.stencil_buffer);
        self.set_major_version(self.major_version);
        self.set_minor_version(self.minor_version);
        self.set_sample_buffers(self.sample_buffers);
        self.set_samples(self.samples);
        self.set_swap_interval(self.swap_interval);
        self
    }
}

/// Defaults applied to newly created windows.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WindowConfig {
    pub title: String,
    pub style: WindowStyle,
}

impl Default for WindowConfig {
    fn default() -> Self {
        Self {
            title: String::new(),
            style: WindowStyle::DEFAULT,
        }
    }
}

/// Raw-input subsystem settings.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct InputConfig {
    /// Generic-desktop usages the platform subscription covers.
    pub usages: Vec<DeviceClass>,
    /// Win32 only: keep receiving raw input while the window is in the
    /// background (`RIDEV_INPUTSINK`). Handlers must then check focus themselves.
    pub background: bool,
    /// hidapi: maximum reports drained per device per poll.
    pub hid_reports_per_poll: usize,
    /// hidapi: re-enumerate devices every N polls to notice hot-plugs (0 = never).
    pub hid_rescan_interval: u32,
    /// X11: display name for the secondary raw-input connection (`None` = `$DISPLAY`).
    pub x11_display: Option<String>,
}

impl Default for InputConfig {
    fn default() -> Self {
        Self {
            usages: DeviceClass::SUBSCRIBED.to_vec(),
            background: false,
            hid_reports_per_poll: 32,
            hid_rescan_interval: 120,
            x11_display: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn empty_documents_use_defaults() {
        assert_eq!(Config::from_toml_str("").unwrap(), Config::default());
        assert_eq!(Config::from_json_str("{}").unwrap(), Config::default());
        let gl = GlConfig::default();
        assert_eq!(gl.color_buffer(), DEFAULT_GL_COLOR_BUFFER);
        assert!(!gl.core_profile());
    }

    #[test]
    fn toml_overrides_selected_fields() {
        let cfg = Config::from_toml_str(
            r#"
            [gl]
            major_version = 4
            samples = 8

            [window]
            title = "scene"
            style = "TITLED | CLOSABLE"

            [input]
            usages = ["mouse", "keyboard"]
            background = true
            "#,
        )
        .unwrap();
        assert_eq!(cfg.gl.major_version, 4);
        assert!(cfg.gl.core_profile());
        assert_eq!(cfg.gl.samples, 8);
        assert_eq!(cfg.gl.depth_buffer, DEFAULT_GL_DEPTH_BUFFER);
        assert_eq!(cfg.window.title, "scene");
        assert_eq!(cfg.window.style, WindowStyle::TITLED | WindowStyle::CLOSABLE);
        assert_eq!(cfg.input.usages, vec![DeviceClass::Mouse, DeviceClass::Keyboard]);
        assert!(cfg.input.background);
        assert_eq!(cfg.input.hid_reports_per_poll, 32);
    }

    #[test]
    fn setters_clamp_into_range() {
        let mut gl = GlConfig::default();
        gl.set_samples(64);
        gl.set_depth_buffer(-3);
        gl.set_red(5);
        assert_eq!(gl.samples, MAX_GL_SAMPLES);
        assert_eq!(gl.depth_buffer, 0);
        assert_eq!(gl.color_buffer(), 5 + 8 + 8 + 8);

        let wild = GlConfig {
            aux_buffers: 99,
            major_version: 12,
            ..GlConfig::default()
        }
        .sanitized();
        assert_eq!(wild.aux_buffers, MAX_GL_AUX_BUFFERS);
        assert_eq!(wild.major_version, MAX_GL_MAJOR_VERSION);
    }

    #[test]
    fn bad_toml_is_an_error() {
        assert!(matches!(
            Config::from_toml_str("[gl]\nsamples = \"many\""),
            Err(ConfigError::Toml(_))
        ));
    }
}
