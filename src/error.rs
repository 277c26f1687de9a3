// ── Central error type ────────────────────────────────────────────────────────
//
// All fallible operations return `error::Result<T>`.  Every variant is fatal
// to the process; `main` reports it once and exits.  Drawing failures inside the
// paint handler never reach this type: they are logged where they happen.

use thiserror::Error;

/// Every error that hello-window can produce.
#[derive(Debug, Error)]
pub enum HelloError {
    /// A Win32 API call returned a failure code.
    #[error("{function} failed (error {code:#010x})")]
    Win32 {
        /// The name of the failing function, for display purposes.
        function: &'static str,
        /// The raw Win32 error code (`GetLastError()` value) or HRESULT.
        code: u32,
    },

    /// This target has no native windowing API to drive.
    #[cfg_attr(windows, allow(dead_code))]
    #[error("no native windowing API on {0}")]
    UnsupportedTarget(&'static str),
}

impl HelloError {
    /// Shorthand for a failed platform call.
    pub(crate) fn win32(function: &'static str, code: u32) -> Self {
        Self::Win32 { function, code }
    }
}

/// Convenience alias used throughout the crate.
pub type Result<T> = std::result::Result<T, HelloError>;

// ── Tests ─────────────────────────────────────────────────────────────────────
