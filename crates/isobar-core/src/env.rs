//! Process-wide environment flags.
//!
//! Two flags gate diagnostic tracing and abort-on-error behaviour. They
//! are read once on first use and cached for the lifetime of the process.

use std::sync::OnceLock;

/// Enables verbose diagnostic tracing when set (to any value).
pub const TRACE_VAR: &str = "ISOBAR_TRACE";

/// Makes the legacy error handler abort the process when set.
pub const ABORT_ON_ERROR_VAR: &str = "ISOBAR_ABORT_ON_ERROR";

/// Cached environment flags.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Environment {
    /// `ISOBAR_TRACE` is set.
    pub trace: bool,
    /// `ISOBAR_ABORT_ON_ERROR` is set.
    pub abort_on_error: bool,
}

impl Environment {
    /// The process-wide flags, read from the environment on first call.
    pub fn get() -> &'static Environment {
        static ENV: OnceLock<Environment> = OnceLock::new();
        ENV.get_or_init(|| Self::from_lookup(|name| std::env::var_os(name).is_some()))
    }

    /// Build flags from an arbitrary presence check.
    pub fn from_lookup(is_set: impl Fn(&str) -> bool) -> Self {
        Self {
            trace: is_set(TRACE_VAR),
            abort_on_error: is_set(ABORT_ON_ERROR_VAR),
        }
    }
}
