//! Result codes and error reporting types.
//!
//! Every public entry point returns [`Result`]. Failures carry a stable negative
//! code (see [`HtError::code`]) so hosts that bridge to a C ABI can hand the
//! number straight through.
//!
//! ## Code ranges
//! - **Validation** errors (incorrect API usage) start at `-64`.
//! - **Runtime** errors (platform trouble even with correct usage) start at `-128`.

use thiserror::Error;

/// Crate-wide result alias.
pub type Result<T> = std::result::Result<T, HtError>;

/// Failure reported by a window, context, or input-manager operation.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Error)]
pub enum HtError {
    // Validation errors: incorrect API usage.
    #[error("invalid argument")]
    InvalidArgument,
    #[error("GL context is not initialized")]
    UninitializedGlContext,
    #[error("input manager is not initialized")]
    UninitializedInputManager,
    #[error("window is not initialized or was destroyed")]
    UninitializedWindow,

    // Runtime errors: may happen with correct usage.
    #[error("GL context creation failed")]
    GlContextCreation,
    #[error("no matching GL pixel format")]
    GlPixelFormatNone,
    #[error("required GL extensions are missing")]
    GlExtensionsMissing,
    #[error("input manager creation failed")]
    InputManagerCreation,
    #[error("memory allocation failed")]
    MemoryAllocation,
    #[error("window server connection failed")]
    WindowServer,
}

impl HtError {
    /// Stable negative result code.
    pub const fn code(self) -> i32 {
        match self {
            HtError::InvalidArgument => -64,
            HtError::UninitializedGlContext => -63,
            HtError::UninitializedInputManager => -62,
            HtError::UninitializedWindow => -61,
            HtError::GlContextCreation => -128,
            HtError::GlPixelFormatNone => -127,
            HtError::GlExtensionsMissing => -126,
            HtError::InputManagerCreation => -125,
            HtError::MemoryAllocation => -124,
            HtError::WindowServer => -120,
        }
    }

    /// Inverse of [`HtError::code`]. `0` and unknown codes map to `None`.
    pub const fn from_code(code: i32) -> Option<Self> {
        Some(match code {
            -64 => HtError::InvalidArgument,
            -63 => HtError::UninitializedGlContext,
            -62 => HtError::UninitializedInputManager,
            -61 => HtError::UninitializedWindow,
            -128 => HtError::GlContextCreation,
            -127 => HtError::GlPixelFormatNone,
            -126 => HtError::GlExtensionsMissing,
            -125 => HtError::InputManagerCreation,
            -124 => HtError::MemoryAllocation,
            -120 => HtError::WindowServer,
            _ => return None,
        })
    }

    /// `true` for errors caused by incorrect API usage.
    pub const fn is_validation(self) -> bool {
        matches!(
            self,
            HtError::InvalidArgument
                | HtError::UninitializedGlContext
                | HtError::UninitializedInputManager
                | HtError::UninitializedWindow
        )
    }
}

/// Where and why an operation failed. Passed to the context's error callback.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ErrorInfo {
    /// Source file of the failing call site.
    pub file: &'static str,
    /// Public operation that failed (e.g. `"poll_input_events"`).
    pub function: &'static str,
    /// Line of the failing call site.
    pub line: u32,
    /// Negative result code (see [`HtError::code`]).
    pub result: i32,
}

impl ErrorInfo {
    /// Decoded error, if `result` is a known code.
    pub fn error(&self) -> Option<HtError> {
        HtError::from_code(self.result)
    }
}

/// Failure while loading a [`Config`](crate::config::Config).
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config: {0}")]
    Io(#[from] std::io::Error),
    #[error("invalid TOML config: {0}")]
    Toml(#[from] toml::de::Error),
    #[error("invalid JSON config: {0}")]
    Json(#[from] serde_json::Error),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn codes_round_trip_and_classify() {
        let all = [
            HtError::InvalidArgument,
            HtError::UninitializedGlContext,
            HtError::UninitializedInputManager,
            HtError::UninitializedWindow,
            HtError::GlContextCreation,
            HtError::GlPixelFormatNone,
            HtError::GlExtensionsMissing,
            HtError::InputManagerCreation,
            HtError::MemoryAllocation,
            HtError::WindowServer,
        ];
        for e in all {
            assert_eq!(HtError::from_code(e.code()), Some(e));
            assert!(e.code() < 0);
        }
        let validation: Vec<_> = all.iter().filter(|e| e.is_validation()).collect();
        assert_eq!(validation, all[..4].iter().collect::<Vec<_>>());
        assert!(validation.iter().all(|e| e.code() > -100));
        assert!(!HtError::InputManagerCreation.is_validation());
        assert!(!HtError::WindowServer.is_validation());
        assert_eq!(HtError::from_code(0), None);
    }
}
