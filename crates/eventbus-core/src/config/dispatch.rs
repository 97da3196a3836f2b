//! Dispatch reporting configuration.

use serde::{Deserialize, Serialize};

/// Controls which non-fatal conditions the dispatcher reports to its sink.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DispatchConfig {
    /// Warn when `emit`, `emit_await`, or `off` targets an event with no
    /// listeners.
    #[serde(default = "default_true")]
    pub warn_on_missing: bool,
    /// Report listener failures during `emit` and `emit_await`.
    #[serde(default = "default_true")]
    pub report_listener_errors: bool,
}

impl Default for DispatchConfig {
    fn default() -> Self {
        Self {
            warn_on_missing: true,
            report_listener_errors: true,
        }
    }
}

fn default_true() -> bool {
    true
}
