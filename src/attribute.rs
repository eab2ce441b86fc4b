//! Window attribute, style, and event-kind identifiers.

use bitflags::bitflags;
use serde::{Deserialize, Serialize};

bitflags! {
    /// Window decoration flags. Backends pass these through nearly verbatim.
    #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
    #[serde(transparent)]
    pub struct WindowStyle: u8 {
        /// Window has a title bar.
        const TITLED = 0x01;
        /// Window has a close button.
        const CLOSABLE = 0x02;
        /// Window has a minimize button.
        const MINIATURIZABLE = 0x04;
        /// Window can be resized.
        const RESIZABLE = 0x08;
        /// All of the above.
        const DEFAULT = 0x0F;
    }
}

/// Readability of a [`WindowAttribute`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Access {
    ReadOnly,
    ReadWrite,
}

/// Integer-valued window attributes for [`Window::get_integer`](crate::Window::get_integer)
/// and [`Window::set_integer`](crate::Window::set_integer).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum WindowAttribute {
    GlAccelerated,
    GlAccumBuffer,
    GlAlpha,
    GlAuxBuffers,
    GlBackingStore,
    GlBlue,
    GlColorBuffer,
    GlDepthBuffer,
    GlDoubleBuffering,
    GlGreen,
    GlMajorVersion,
    GlMinorVersion,
    GlPixelType,
    GlProfile,
    GlRed,
    GlSampleBuffers,
    GlSamples,
    GlStencilBuffer,
    GlStereo,
    GlSwapInterval,
    /// Button mask of the oldest unconsumed mouse snapshot.
    MouseButton,
    /// `1` if the last mouse report used relative motion.
    MouseRelative,
    /// X of the oldest unconsumed snapshot (relative devices: accumulated
    /// position; absolute devices: delta against the preceding slot).
    MouseX,
    /// Y counterpart of [`WindowAttribute::MouseX`].
    MouseY,
    /// Snapshots lost to queue overflow since the input manager was created.
    InputDropped,
    /// `1` while the window holds input focus.
    WindowFocused,
    WindowHeight,
    WindowStyle,
    WindowWidth,
    WindowX,
    WindowY,
}

impl WindowAttribute {
    pub const fn access(self) -> Access {
        use WindowAttribute::*;
        match self {
            GlColorBuffer | GlPixelType | GlProfile | MouseButton | MouseRelative | MouseX
            | MouseY | InputDropped | WindowFocused => Access::ReadOnly,
            _ => Access::ReadWrite,
        }
    }
}

/// Event slots for [`Window::set_event_handler`](crate::Window::set_event_handler).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum EventKind {
    /// Window was asked to close.
    Close,
    /// Window needs a redraw.
    Draw,
    /// Window gained or lost focus.
    Focus,
    /// Window was repositioned.
    Move,
    /// Window was minimized or restored.
    Minimize,
    /// Window was resized.
    Resize,
    /// Reserved: keyboard entries are not dispatched from the input queue yet.
    Keyboard,
    /// One call per dispatched mouse snapshot.
    Mouse,
    /// Reserved: gamepad entries are not dispatched from the input queue yet.
    Gamepad,
}

impl EventKind {
    pub const COUNT: usize = 9;

    #[inline]
    pub(crate) const fn slot(self) -> usize {
        self as usize
    }
}

/// Window-manager notification, already translated by the host's native layer.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum WindowEvent {
    Close,
    Draw,
    Focus(bool),
    Move { x: i16, y: i16 },
    Minimize(bool),
    Resize { width: u16, height: u16 },
}

impl WindowEvent {
    pub const fn kind(&self) -> EventKind {
        match self {
            WindowEvent::Close => EventKind::Close,
            WindowEvent::Draw => EventKind::Draw,
            WindowEvent::Focus(_) => EventKind::Focus,
            WindowEvent::Move { .. } => EventKind::Move,
            WindowEvent::Minimize(_) => EventKind::Minimize,
            WindowEvent::Resize { .. } => EventKind::Resize,
        }
    }
}
