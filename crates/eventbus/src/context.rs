//! Init hook context: the only structural access to a dispatcher beyond
//! its public API, available while it is being built.

use std::any::Any;

use crate::bus::EventBus;
use crate::name::EventName;
use crate::registry::ListenerInfo;

/// Passed to the init hook set with [`crate::EventBusBuilder::init`].
///
/// Exposes the dispatcher under construction, read access to its registry,
/// event removal, and the extensions side-table.
#[derive(Debug)]
pub struct InitContext<'a> {
    bus: &'a mut EventBus,
}

impl<'a> InitContext<'a> {
    pub(crate) fn new(bus: &'a mut EventBus) -> Self {
        Self { bus }
    }

    /// The dispatcher being built.
    pub fn bus(&self) -> &EventBus {
        &*self.bus
    }

    /// Events that currently have listeners.
    pub fn events(&self) -> Vec<EventName> {
        self.bus.event_names()
    }

    /// Registrations of `event`, in invocation order.
    pub fn listeners(&self, event: impl Into<EventName>) -> Vec<ListenerInfo> {
        self.bus.listeners(event)
    }

    /// Returns whether `event` has any listener.
    pub fn contains(&self, event: impl Into<EventName>) -> bool {
        self.bus.has(event)
    }

    /// Removes every listener of `event`.
    pub fn clear(&mut self, event: impl Into<EventName>) -> &mut Self {
        self.bus.clear(event);
        self
    }

    /// Removes every listener of every event.
    pub fn clear_all(&mut self) -> &mut Self {
        self.bus.clear_all();
        self
    }

    /// Attaches host data to the dispatcher, readable later through
    /// [`EventBus::extension`].
    pub fn set_extension<T: Any + Send + Sync>(&mut self, key: impl Into<String>, value: T) -> &mut Self {
        self.bus.extensions_mut().insert(key, value);
        self
    }
}
