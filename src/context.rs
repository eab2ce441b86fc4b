//! Process-wide state, made explicit.
//!
//! A [`Context`] carries what would otherwise be hidden globals: the single
//! error-callback slot, the shared [`Config`], and the registry of platform
//! input streams that may only be opened once per process (the Win32 raw-input
//! registration, the hidapi manager, the XInput2 display connection).
//!
//! Create it once, share it as `Rc<Context>` with every window, and drop it after
//! the last window. Stream claims hold an `Rc` back to the context, so it cannot
//! go away while a platform stream is still open.

use crate::config::Config;
use crate::error::{ErrorInfo, HtError, Result};
use std::cell::RefCell;
use std::collections::HashSet;
use std::fmt;
use std::panic::Location;
use std::rc::Rc;

/// Callback invoked for every failed precondition or runtime error.
pub type ErrorCallback = Rc<dyn Fn(&ErrorInfo)>;

/// Platform input streams that are process-wide singletons.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum StreamKind {
    /// `RegisterRawInputDevices` registration (one per usage per process).
    Win32RawInput,
    /// hidapi's global manager.
    HidManager,
    /// Secondary X display connection receiving XInput2 raw events.
    XInput2Display,
}

/// Shared library state. See the module docs.
pub struct Context {
    config: Config,
    error_callback: RefCell<Option<ErrorCallback>>,
    claimed: RefCell<HashSet<StreamKind>>,
}

impl fmt::Debug for Context {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Context")
            .field("config", &self.config)
            .field("error_callback", &self.error_callback.borrow().is_some())
            .field("claimed", &self.claimed.borrow())
            .finish()
    }
}

impl Context {
    /// Context with the default [`Config`].
    pub fn new() -> Rc<Self> {
        Self::with_config(Config::default())
    }

    pub fn with_config(config: Config) -> Rc<Self> {
        let config = Config {
            gl: config.gl.sanitized(),
            ..config
        };
        Rc::new(Self {
            config,
            error_callback: RefCell::new(None),
            claimed: RefCell::new(HashSet::new()),
        })
    }

    #[inline]
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Install the error callback, replacing any previous one.
    pub fn set_error_callback(&self, callback: impl Fn(&ErrorInfo) + 'static) {
        *self.error_callback.borrow_mut() = Some(Rc::new(callback));
    }

    /// Remove the error callback.
    pub fn clear_error_callback(&self) {
        self.error_callback.borrow_mut().take();
    }

    /// Report `err` on behalf of `function` and hand it back.
    ///
    /// File and line come from the caller. The callback runs after the slot is
    /// released, so it may replace itself.
    #[track_caller]
    pub fn report(&self, function: &'static str, err: HtError) -> HtError {
        let loc = Location::caller();
        let info = ErrorInfo {
            file: loc.file(),
            function,
            line: loc.line(),
            result: err.code(),
        };
        tracing::error!(
            file = info.file,
            line = info.line,
            function,
            code = info.result,
            "{err}"
        );
        let callback = self.error_callback.borrow().clone();
        if let Some(callback) = callback {
            callback(&info);
        }
        err
    }

    /// `Ok(())` if `ok`, otherwise report `err`.
    #[track_caller]
    pub(crate) fn check(&self, ok: bool, function: &'static str, err: HtError) -> Result<()> {
        if ok {
            Ok(())
        } else {
            Err(self.report(function, err))
        }
    }

    /// Claim exclusive use of a platform stream.
    ///
    /// Fails with [`HtError::InputManagerCreation`] while another claim for the
    /// same stream is alive.
    pub fn claim(self: &Rc<Self>, kind: StreamKind) -> Result<StreamClaim> {
        if !self.claimed.borrow_mut().insert(kind) {
            tracing::warn!(?kind, "platform input stream already claimed");
            return Err(HtError::InputManagerCreation);
        }
        tracing::debug!(?kind, "platform input stream claimed");
        Ok(StreamClaim {
            ctx: Rc::clone(self),
            kind,
        })
    }

    /// `true` while a claim for `kind` is alive.
    pub fn is_claimed(&self, kind: StreamKind) -> bool {
        self.claimed.borrow().contains(&kind)
    }
}

/// RAII guard for a claimed [`StreamKind`]. Released on drop.
#[derive(Debug)]
pub struct StreamClaim {
    ctx: Rc<Context>,
    kind: StreamKind,
}

impl StreamClaim {
    #[inline]
    pub fn kind(&self) -> StreamKind {
        self.kind
    }

    #[inline]
    pub fn context(&self) -> &Rc<Context> {
        &self.ctx
    }
}

impl Drop for StreamClaim {
    fn drop(&mut self) {
        self.ctx.claimed.borrow_mut().remove(&self.kind);
        tracing::debug!(kind = ?self.kind, "platform input stream released");
    }
}
