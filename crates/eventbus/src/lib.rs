//! # eventbus
//!
//! Typed publish/subscribe event dispatcher. Provides:
//!
//! - Registration of persistent and one-shot listeners under string or
//!   token event names, each identified by a [`Sign`]
//! - Fire-and-forget dispatch with per-listener failure isolation
//! - Settled dispatch that joins every listener and reports each outcome
//! - Removal by callback identity, by sign, per event, or in bulk
//! - Declarative construction with an init hook and a typed extensions table
//!
//! ```
//! use eventbus::{Callback, EventBus};
//! use serde_json::json;
//!
//! let bus = EventBus::new();
//! let sign = bus.on(
//!     "sum",
//!     Callback::new(|_, args| {
//!         let total: i64 = args.iter().filter_map(|v| v.as_i64()).sum();
//!         Ok(json!(total))
//!     }),
//! );
//! bus.emit("sum", &[json!(1), json!(2)]);
//! bus.off("sum", sign);
//! assert!(!bus.has("sum"));
//! ```

pub mod builder;
pub mod bus;
pub mod callback;
pub mod context;
pub mod extensions;
pub mod name;
pub mod registry;
pub mod settlement;

pub use builder::{EventBusBuilder, EventMapEntry, ListenerSpec};
pub use bus::EventBus;
pub use callback::{Callback, CallbackRef, ListenerFuture, OnOptions, Reply};
pub use context::InitContext;
pub use eventbus_core::{BusError, BusResult, ErrorKind, EventToken, Sign};
pub use extensions::Extensions;
pub use name::EventName;
pub use registry::ListenerInfo;
pub use settlement::Settlement;
