//! Core type definitions used across the EventBus workspace.

pub mod id;

pub use id::*;
