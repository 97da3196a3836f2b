//! Per-listener outcomes of `emit_await`.

use serde_json::Value;

use eventbus_core::{BusError, BusResult};

/// How one listener invocation settled.
#[derive(Debug, Clone, PartialEq)]
pub enum Settlement {
    /// The listener returned or resolved to a value.
    Fulfilled(Value),
    /// The listener failed, synchronously or asynchronously.
    Rejected(BusError),
}

impl Settlement {
    /// Returns `true` for a fulfilled outcome.
    pub fn is_fulfilled(&self) -> bool {
        matches!(self, Self::Fulfilled(_))
    }

    /// Returns `true` for a rejected outcome.
    pub fn is_rejected(&self) -> bool {
        matches!(self, Self::Rejected(_))
    }

    /// The fulfilled value, if any.
    pub fn value(&self) -> Option<&Value> {
        match self {
            Self::Fulfilled(value) => Some(value),
            Self::Rejected(_) => None,
        }
    }

    /// The rejection reason, if any.
    pub fn reason(&self) -> Option<&BusError> {
        match self {
            Self::Fulfilled(_) => None,
            Self::Rejected(reason) => Some(reason),
        }
    }

    /// Converts back into a `Result`.
    pub fn into_result(self) -> BusResult<Value> {
        match self {
            Self::Fulfilled(value) => Ok(value),
            Self::Rejected(reason) => Err(reason),
        }
    }
}

impl From<BusResult<Value>> for Settlement {
    fn from(result: BusResult<Value>) -> Self {
        match result {
            Ok(value) => Self::Fulfilled(value),
            Err(reason) => Self::Rejected(reason),
        }
    }
}
