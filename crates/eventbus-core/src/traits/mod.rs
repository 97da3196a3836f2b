//! Trait definitions for collaborators of the dispatcher.

pub mod sink;

pub use sink::ReportSink;
