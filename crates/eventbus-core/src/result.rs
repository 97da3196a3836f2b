//! Convenience result type alias for EventBus.

use crate::error::BusError;

/// A specialized `Result` type for EventBus operations.
///
/// Listener callbacks return this type as well; an `Err` marks the
/// invocation as failed without affecting any other listener.
pub type BusResult<T> = Result<T, BusError>;
