//! Reporting sink for non-fatal dispatcher conditions.
//!
//! The dispatcher reports two things: a warning when an operation targets an
//! event with no listeners, and an error when a listener fails. Neither is
//! surfaced to the caller of the operation.

use std::fmt;
use std::sync::Arc;

use tracing::{error, warn};

use crate::error::BusError;

/// Destination for dispatcher warnings and listener failures.
///
/// Implementations must not panic; reporting never fails the operation that
/// triggered it.
pub trait ReportSink: Send + Sync + fmt::Debug {
    /// Reports a non-fatal condition such as a missing event.
    fn warn(&self, message: &str);

    /// Reports a listener failure.
    fn error(&self, message: &str, error: &BusError);
}

/// Default sink forwarding to `tracing`.
///
/// With no subscriber installed, reports are discarded.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingSink;

impl ReportSink for TracingSink {
    fn warn(&self, message: &str) {
        warn!(target: "eventbus", "{}", message);
    }

    fn error(&self, message: &str, err: &BusError) {
        error!(
            target: "eventbus",
            kind = %err.kind,
            error = %err.message,
            "{}",
            message
        );
    }
}

type WarnFn = dyn Fn(&str) + Send + Sync;
type ErrorFn = dyn Fn(&str, &BusError) + Send + Sync;

/// Sink built from a pair of closures.
#[derive(Clone)]
pub struct FnSink {
    on_warning: Arc<WarnFn>,
    on_error: Arc<ErrorFn>,
}

impl FnSink {
    /// Creates a sink from warning and error callbacks.
    pub fn new(
        on_warning: impl Fn(&str) + Send + Sync + 'static,
        on_error: impl Fn(&str, &BusError) + Send + Sync + 'static,
    ) -> Self {
        Self {
            on_warning: Arc::new(on_warning),
            on_error: Arc::new(on_error),
        }
    }
}

impl fmt::Debug for FnSink {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FnSink").finish()
    }
}

impl ReportSink for FnSink {
    fn warn(&self, message: &str) {
        (self.on_warning)(message)
    }

    fn error(&self, message: &str, err: &BusError) {
        (self.on_error)(message, err)
    }
}
