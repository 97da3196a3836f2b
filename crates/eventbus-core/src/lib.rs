//! # eventbus-core
//!
//! Core crate for EventBus. Contains the unified error system, opaque
//! identifier tokens, configuration schemas, and the reporting-sink trait.
//!
//! This crate has **no** internal dependencies on other EventBus crates.

pub mod config;
pub mod error;
pub mod result;
pub mod traits;
pub mod types;

pub use error::{BusError, ErrorKind};
pub use result::BusResult;
pub use traits::sink::{FnSink, ReportSink, TracingSink};
pub use types::{EventToken, Sign};
