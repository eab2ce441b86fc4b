//! The window object: attributes, event handlers, and the input dispatch loop.
//!
//! A [`Window`] here is the platform-independent half of a native window. The
//! host owns the native handle and its message loop, translates window-manager
//! notifications into [`WindowEvent`]s, and calls [`Window::handle_window_event`].
//! Raw input flows the other way: the window's [`InputManager`] drains its
//! platform source into the window's [`InputQueue`], and
//! [`Window::poll_input_events`] dispatches the queue to the mouse handler.
//!
//! Every public entry point validates its preconditions and reports failures
//! through the shared [`Context`] before returning them.

use crate::attribute::{Access, EventKind, WindowAttribute, WindowEvent, WindowStyle};
use crate::backends::default_source;
use crate::config::GlConfig;
use crate::context::Context;
use crate::error::{HtError, Result};
use crate::event::{DeviceClass, MotionMode};
use crate::manager::InputManager;
use crate::queue::InputQueue;
use crate::snapshot::MouseSnapshot;
use crate::source::RawInputSource;
use std::any::Any;
use std::fmt;
use std::rc::Rc;

/// Event handler. Receives the window so it can query state (for mouse
/// events, the snapshot being dispatched is the one `MouseX`/`MouseY`/
/// `MouseButton` read).
pub type EventHandler = Box<dyn FnMut(&mut Window)>;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
struct Geometry {
    x: i16,
    y: i16,
    width: u16,
    height: u16,
}

pub struct Window {
    ctx: Rc<Context>,
    alive: bool,
    geometry: Geometry,
    style: WindowStyle,
    title: String,
    focused: bool,
    minimized: bool,
    gl: GlConfig,
    user: Option<Box<dyn Any>>,
    handlers: [Option<EventHandler>; EventKind::COUNT],
    handler_epochs: [u32; EventKind::COUNT],
    queue: InputQueue,
    queue_epoch: u32,
    input: Option<InputManager>,
    dispatching: bool,
}

impl fmt::Debug for Window {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Window")
            .field("alive", &self.alive)
            .field("geometry", &self.geometry)
            .field("style", &self.style)
            .field("title", &self.title)
            .field("focused", &self.focused)
            .field("minimized", &self.minimized)
            .field("queue", &self.queue.len())
            .field("input", &self.input)
            .finish_non_exhaustive()
    }
}

impl Window {
    /// Create a window record at `(x, y)` with the given size.
    ///
    /// Title, style and GL parameters come from the context's config. Windows
    /// start focused; the host reports changes through
    /// [`WindowEvent::Focus`].
    #[track_caller]
    pub fn new(ctx: &Rc<Context>, x: i16, y: i16, width: u16, height: u16) -> Result<Self> {
        ctx.check(width > 0 && height > 0, "Window::new", HtError::InvalidArgument)?;
        let cfg = ctx.config();
        Ok(Self {
            ctx: Rc::clone(ctx),
            alive: true,
            geometry: Geometry {
                x,
                y,
                width,
                height,
            },
            style: cfg.window.style,
            title: cfg.window.title.clone(),
            focused: true,
            minimized: false,
            gl: cfg.gl.clone(),
            user: None,
            handlers: Default::default(),
            handler_epochs: [0; EventKind::COUNT],
            queue: InputQueue::new(),
            queue_epoch: 0,
            input: None,
            dispatching: false,
        })
    }

    #[track_caller]
    fn check_alive(&self, function: &'static str) -> Result<()> {
        self.ctx.check(self.alive, function, HtError::UninitializedWindow)
    }

    /// Release the input manager and handlers. Every later call fails with
    /// [`HtError::UninitializedWindow`].
    pub fn destroy(&mut self) -> Result<()> {
        self.check_alive("Window::destroy")?;
        self.alive = false;
        self.input = None;
        self.handlers = Default::default();
        self.user = None;
        self.reset_queue();
        tracing::debug!(title = %self.title, "window destroyed");
        Ok(())
    }

    #[inline]
    pub fn is_alive(&self) -> bool {
        self.alive
    }

    #[inline]
    pub fn context(&self) -> &Rc<Context> {
        &self.ctx
    }

    fn reset_queue(&mut self) {
        self.queue.clear();
        self.queue_epoch = self.queue_epoch.wrapping_add(1);
    }

    // --- input manager ---

    /// Subscribe to raw input with the platform's default source.
    pub fn create_input_manager(&mut self) -> Result<()> {
        const FUNC: &str = "Window::create_input_manager";
        self.check_alive(FUNC)?;
        self.ctx.check(self.input.is_none(), FUNC, HtError::InputManagerCreation)?;
        let source = default_source(&self.ctx).map_err(|e| self.ctx.report(FUNC, e))?;
        self.install(source);
        Ok(())
    }

    /// Subscribe to raw input from `source`.
    pub fn create_input_manager_with(&mut self, source: impl RawInputSource) -> Result<()> {
        const FUNC: &str = "Window::create_input_manager_with";
        self.check_alive(FUNC)?;
        self.ctx.check(self.input.is_none(), FUNC, HtError::InputManagerCreation)?;
        self.install(Box::new(source));
        Ok(())
    }

    fn install(&mut self, source: Box<dyn RawInputSource>) {
        let manager = InputManager::new(source, self.focused);
        tracing::info!(source = manager.source_name(), "input manager created");
        self.reset_queue();
        self.input = Some(manager);
    }

    /// Drop the raw-input subscription and any undispatched snapshots.
    pub fn destroy_input_manager(&mut self) -> Result<()> {
        const FUNC: &str = "Window::destroy_input_manager";
        self.check_alive(FUNC)?;
        self.ctx.check(self.input.is_some(), FUNC, HtError::UninitializedInputManager)?;
        if let Some(manager) = self.input.take() {
            tracing::info!(source = manager.source_name(), "input manager destroyed");
        }
        self.reset_queue();
        Ok(())
    }

    #[inline]
    pub fn has_input_manager(&self) -> bool {
        self.input.is_some()
    }

    /// The live source, if it is a `T`. Hosts use this to forward native
    /// messages (`WM_INPUT`) to the source that registered for them.
    pub fn input_source_mut<T: RawInputSource>(&mut self) -> Option<&mut T> {
        self.input.as_mut()?.source_mut::<T>()
    }

    fn pump(&mut self) -> usize {
        // Nothing new is queued while a handler runs; the dispatch loop
        // advances past the slot it is on after the handler returns.
        if self.dispatching {
            return 0;
        }
        match self.input.as_mut() {
            Some(input) => input.pump(&mut self.queue),
            None => 0,
        }
    }

    // --- polling ---

    /// Service pending platform input without dispatching it.
    ///
    /// Window-manager events reach the window through
    /// [`Window::handle_window_event`]; this only moves raw input into the queue.
    pub fn poll_window_events(&mut self) -> Result<()> {
        self.check_alive("Window::poll_window_events")?;
        self.pump();
        Ok(())
    }

    /// Drain raw input and call the mouse handler once per queued snapshot,
    /// oldest first. Returns the number of mouse snapshots dispatched.
    ///
    /// Called from inside a handler, returns `Ok(0)` without touching the queue.
    pub fn poll_input_events(&mut self) -> Result<usize> {
        const FUNC: &str = "Window::poll_input_events";
        self.check_alive(FUNC)?;
        self.ctx.check(self.input.is_some(), FUNC, HtError::UninitializedInputManager)?;
        if self.dispatching {
            return Ok(0);
        }
        self.pump();

        self.dispatching = true;
        let mut dispatched = 0;
        while self.alive {
            let Some(entry) = self.queue.front() else {
                break;
            };
            let epoch = self.queue_epoch;
            // Keyboard and gamepad slots exist but nothing queues them yet.
            if entry.class == DeviceClass::Mouse {
                self.invoke(EventKind::Mouse);
                dispatched += 1;
            }
            if self.queue_epoch != epoch {
                // The handler recreated or dropped the input manager.
                continue;
            }
            self.queue.advance();
        }
        self.dispatching = false;
        Ok(dispatched)
    }

    fn invoke(&mut self, kind: EventKind) {
        let slot = kind.slot();
        let Some(mut handler) = self.handlers[slot].take() else {
            return;
        };
        let epoch = self.handler_epochs[slot];
        handler(self);
        // Keep a replacement or removal made from inside the handler.
        if self.alive && self.handler_epochs[slot] == epoch {
            self.handlers[slot] = Some(handler);
        }
    }

    // --- events ---

    /// Install the handler for `kind`, replacing any previous one.
    pub fn set_event_handler(
        &mut self,
        kind: EventKind,
        handler: impl FnMut(&mut Window) + 'static,
    ) -> Result<()> {
        self.check_alive("Window::set_event_handler")?;
        let slot = kind.slot();
        self.handlers[slot] = Some(Box::new(handler));
        self.handler_epochs[slot] = self.handler_epochs[slot].wrapping_add(1);
        Ok(())
    }

    pub fn remove_event_handler(&mut self, kind: EventKind) -> Result<()> {
        self.check_alive("Window::remove_event_handler")?;
        let slot = kind.slot();
        self.handlers[slot] = None;
        self.handler_epochs[slot] = self.handler_epochs[slot].wrapping_add(1);
        Ok(())
    }

    /// Apply a host-translated window-manager event and run its handler.
    pub fn handle_window_event(&mut self, event: WindowEvent) -> Result<()> {
        self.check_alive("Window::handle_window_event")?;
        match event {
            WindowEvent::Close | WindowEvent::Draw => {}
            WindowEvent::Focus(focused) => {
                self.focused = focused;
                if let Some(input) = self.input.as_mut() {
                    input.set_focus(focused);
                }
                tracing::debug!(focused, "focus changed");
            }
            WindowEvent::Move { x, y } => {
                self.geometry.x = x;
                self.geometry.y = y;
            }
            WindowEvent::Minimize(minimized) => self.minimized = minimized,
            WindowEvent::Resize { width, height } => {
                self.geometry.width = width;
                self.geometry.height = height;
            }
        }
        self.invoke(event.kind());
        Ok(())
    }

    #[inline]
    pub fn is_focused(&self) -> bool {
        self.focused
    }

    #[inline]
    pub fn is_minimized(&self) -> bool {
        self.minimized
    }

    // --- attributes ---

    /// Read an integer attribute.
    pub fn get_integer(&self, attr: WindowAttribute) -> Result<i32> {
        use WindowAttribute as A;
        self.check_alive("Window::get_integer")?;
        let gl = &self.gl;
        let v = match attr {
            A::GlAccelerated => gl.accelerated as i32,
            A::GlAccumBuffer => gl.accum_buffer,
            A::GlAlpha => gl.alpha,
            A::GlAuxBuffers => gl.aux_buffers,
            A::GlBackingStore => gl.backing_store as i32,
            A::GlBlue => gl.blue,
            A::GlColorBuffer => gl.color_buffer(),
            A::GlDepthBuffer => gl.depth_buffer,
            A::GlDoubleBuffering => gl.double_buffering as i32,
            A::GlGreen => gl.green,
            A::GlMajorVersion => gl.major_version,
            A::GlMinorVersion => gl.minor_version,
            A::GlPixelType => gl.pixel_type(),
            A::GlProfile => gl.core_profile() as i32,
            A::GlRed => gl.red,
            A::GlSampleBuffers => gl.sample_buffers,
            A::GlSamples => gl.samples,
            A::GlStencilBuffer => gl.stencil_buffer,
            A::GlStereo => gl.stereo as i32,
            A::GlSwapInterval => gl.swap_interval,
            A::MouseButton => i32::from(self.queue.current().button),
            A::MouseRelative => (self.queue.mode() == MotionMode::Relative) as i32,
            A::MouseX => self.queue.position().0,
            A::MouseY => self.queue.position().1,
            A::InputDropped => self.queue.dropped().min(i32::MAX as u32) as i32,
            A::WindowFocused => self.focused as i32,
            A::WindowHeight => i32::from(self.geometry.height),
            A::WindowStyle => i32::from(self.style.bits()),
            A::WindowWidth => i32::from(self.geometry.width),
            A::WindowX => i32::from(self.geometry.x),
            A::WindowY => i32::from(self.geometry.y),
        };
        Ok(v)
    }

    /// Write an integer attribute. GL values are clamped to their maxima;
    /// geometry and style values out of range fail with
    /// [`HtError::InvalidArgument`].
    pub fn set_integer(&mut self, attr: WindowAttribute, value: i32) -> Result<()> {
        use WindowAttribute as A;
        const FUNC: &str = "Window::set_integer";
        self.check_alive(FUNC)?;
        self.ctx.check(attr.access() == Access::ReadWrite, FUNC, HtError::InvalidArgument)?;

        let gl = &mut self.gl;
        match attr {
            A::GlAccelerated => gl.accelerated = value != 0,
            A::GlAccumBuffer => gl.set_accum_buffer(value),
            A::GlAlpha => gl.set_alpha(value),
            A::GlAuxBuffers => gl.set_aux_buffers(value),
            A::GlBackingStore => gl.backing_store = value != 0,
            A::GlBlue => gl.set_blue(value),
            A::GlDepthBuffer => gl.set_depth_buffer(value),
            A::GlDoubleBuffering => gl.double_buffering = value != 0,
            A::GlGreen => gl.set_green(value),
            A::GlMajorVersion => gl.set_major_version(value),
            A::GlMinorVersion => gl.set_minor_version(value),
            A::GlRed => gl.set_red(value),
            A::GlSampleBuffers => gl.set_sample_buffers(value),
            A::GlSamples => gl.set_samples(value),
            A::GlStencilBuffer => gl.set_stencil_buffer(value),
            A::GlStereo => gl.stereo = value != 0,
            A::GlSwapInterval => gl.set_swap_interval(value),
            A::WindowX | A::WindowY => {
                let v = i16::try_from(value).map_err(|_| self.ctx.report(FUNC, HtError::InvalidArgument))?;
                if attr == A::WindowX {
                    self.geometry.x = v;
                } else {
                    self.geometry.y = v;
                }
            }
            A::WindowWidth | A::WindowHeight => {
                let v = u16::try_from(value)
                    .ok()
                    .filter(|&v| v > 0)
                    .ok_or_else(|| self.ctx.report(FUNC, HtError::InvalidArgument))?;
                if attr == A::WindowWidth {
                    self.geometry.width = v;
                } else {
                    self.geometry.height = v;
                }
            }
            A::WindowStyle => {
                self.style = u8::try_from(value)
                    .ok()
                    .and_then(WindowStyle::from_bits)
                    .ok_or_else(|| self.ctx.report(FUNC, HtError::InvalidArgument))?;
            }
            A::GlColorBuffer
            | A::GlPixelType
            | A::GlProfile
            | A::MouseButton
            | A::MouseRelative
            | A::MouseX
            | A::MouseY
            | A::InputDropped
            | A::WindowFocused => {} // rejected above
        }
        Ok(())
    }

    pub fn set_title(&mut self, title: &str) -> Result<()> {
        self.check_alive("Window::set_title")?;
        self.title = title.to_string();
        Ok(())
    }

    #[inline]
    pub fn title(&self) -> &str {
        &self.title
    }

    /// Attach arbitrary host data, replacing any previous value.
    pub fn set_user_data<T: Any>(&mut self, data: T) -> Result<()> {
        self.check_alive("Window::set_user_data")?;
        self.user = Some(Box::new(data));
        Ok(())
    }

    /// Host data, if it is a `T`.
    pub fn user_data<T: Any>(&self) -> Option<&T> {
        self.user.as_ref()?.downcast_ref::<T>()
    }

    pub fn user_data_mut<T: Any>(&mut self) -> Option<&mut T> {
        self.user.as_mut()?.downcast_mut::<T>()
    }

    #[inline]
    pub fn gl_config(&self) -> &GlConfig {
        &self.gl
    }

    // --- mouse state ---

    #[inline]
    pub fn queue(&self) -> &InputQueue {
        &self.queue
    }

    /// The snapshot the mouse attributes read: the one being dispatched, or the
    /// most recent when nothing is pending.
    #[inline]
    pub fn mouse(&self) -> MouseSnapshot {
        self.queue.current()
    }

    /// Current snapshot minus the preceding slot, for either motion mode.
    #[inline]
    pub fn mouse_delta(&self) -> (i32, i32) {
        self.queue.delta()
    }
}
