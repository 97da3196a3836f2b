//! Declarative construction.
//!
//! An event map entry is either a single callback or an ordered list of
//! listener specs. Entries are parsed into the registry in declaration order,
//! then the optional init hook runs, then the dispatcher is returned.

use std::sync::Arc;

use tracing::debug;

use eventbus_core::config::DispatchConfig;
use eventbus_core::traits::sink::{ReportSink, TracingSink};
use eventbus_core::types::Sign;
use eventbus_core::BusResult;

use crate::bus::EventBus;
use crate::callback::{Callback, OnOptions};
use crate::context::InitContext;
use crate::name::EventName;

/// One listener in a declarative list entry.
#[derive(Debug, Clone)]
pub struct ListenerSpec {
    /// The callback.
    pub callback: Callback,
    /// Remove after the first invocation.
    pub once: bool,
    /// Explicit sign; minted when absent.
    pub sign: Option<Sign>,
}

impl ListenerSpec {
    /// A persistent listener with a generated sign.
    pub fn new(callback: Callback) -> Self {
        Self {
            callback,
            once: false,
            sign: None,
        }
    }

    /// Marks the listener as one-shot.
    pub fn once(mut self) -> Self {
        self.once = true;
        self
    }

    /// Uses `sign` instead of a generated one.
    pub fn sign(mut self, sign: Sign) -> Self {
        self.sign = Some(sign);
        self
    }
}

impl From<Callback> for ListenerSpec {
    fn from(callback: Callback) -> Self {
        Self::new(callback)
    }
}

/// Value side of the declarative event map.
#[derive(Debug, Clone)]
pub enum EventMapEntry {
    /// A single persistent listener.
    Single(Callback),
    /// Listeners in invocation order.
    List(Vec<ListenerSpec>),
}

impl From<Callback> for EventMapEntry {
    fn from(callback: Callback) -> Self {
        Self::Single(callback)
    }
}

impl From<Vec<ListenerSpec>> for EventMapEntry {
    fn from(specs: Vec<ListenerSpec>) -> Self {
        Self::List(specs)
    }
}

impl From<Vec<Callback>> for EventMapEntry {
    fn from(callbacks: Vec<Callback>) -> Self {
        Self::List(callbacks.into_iter().map(ListenerSpec::from).collect())
    }
}

type InitHook = Box<dyn FnOnce(&mut InitContext<'_>) -> BusResult<()>>;

/// Builder for [`EventBus`].
pub struct EventBusBuilder {
    event_map: Vec<(EventName, EventMapEntry)>,
    init: Option<InitHook>,
    sink: Option<Arc<dyn ReportSink>>,
    config: DispatchConfig,
}

impl EventBusBuilder {
    /// Creates a builder with no listeners, the `tracing` sink, and default
    /// dispatch settings.
    pub fn new() -> Self {
        Self {
            event_map: Vec::new(),
            init: None,
            sink: None,
            config: DispatchConfig::default(),
        }
    }

    /// Declares listeners for one event. Declaring the same event twice
    /// appends to its sequence.
    pub fn event(mut self, event: impl Into<EventName>, entry: impl Into<EventMapEntry>) -> Self {
        self.event_map.push((event.into(), entry.into()));
        self
    }

    /// Declares listeners for several events, in iteration order.
    pub fn event_map<I, K, E>(mut self, entries: I) -> Self
    where
        I: IntoIterator<Item = (K, E)>,
        K: Into<EventName>,
        E: Into<EventMapEntry>,
    {
        self.event_map
            .extend(entries.into_iter().map(|(k, e)| (k.into(), e.into())));
        self
    }

    /// Sets the hook that runs once, after the event map is parsed and
    /// before `build` returns. An error from the hook fails `build`.
    pub fn init<F>(mut self, hook: F) -> Self
    where
        F: FnOnce(&mut InitContext<'_>) -> BusResult<()> + 'static,
    {
        self.init = Some(Box::new(hook));
        self
    }

    /// Replaces the reporting sink.
    pub fn sink(mut self, sink: Arc<dyn ReportSink>) -> Self {
        self.sink = Some(sink);
        self
    }

    /// Replaces the dispatch reporting settings.
    pub fn config(mut self, config: DispatchConfig) -> Self {
        self.config = config;
        self
    }

    /// Validates the event map and builds the dispatcher.
    pub fn build(self) -> BusResult<EventBus> {
        let sink = self.sink.unwrap_or_else(|| Arc::new(TracingSink));
        let mut bus = EventBus::with_parts(sink, self.config);

        for (event, entry) in self.event_map {
            let specs = match entry {
                EventMapEntry::Single(callback) => vec![ListenerSpec::new(callback)],
                EventMapEntry::List(specs) if specs.is_empty() => {
                    debug!(event = %event, "Declared event has no listeners; skipped");
                    continue;
                }
                EventMapEntry::List(specs) => specs,
            };

            debug!(event = %event, listeners = specs.len(), "Declared event parsed");
            for spec in specs {
                let options = OnOptions { sign: spec.sign };
                bus.register(event.clone(), spec.callback, spec.once, options);
            }
        }

        if let Some(hook) = self.init {
            let mut ctx = InitContext::new(&mut bus);
            hook(&mut ctx)?;
        }

        Ok(bus)
    }
}

impl Default for EventBusBuilder {
    fn default() -> Self {
        Self::new()
    }
}
