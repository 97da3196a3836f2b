//! The dispatcher: registration, removal, introspection, and both dispatch
//! modes.
//!
//! `emit` is fire-and-forget:
//! - Listeners run in registration order; each failure is reported to the
//!   sink and the pass continues.
//! - A listener returning a future is not awaited. With a Tokio runtime
//!   present the future is spawned on it. Without one, it runs on a
//!   dedicated `eventbus-detached` thread driving a current-thread runtime.
//!   Either way its failure is reported when it settles.
//!
//! `emit_await` collects outcomes:
//! - Every listener is invoked before the call returns.
//! - The returned future joins all invocations and yields one
//!   [`Settlement`] per listener, in registration order.
//!
//! Both modes walk a snapshot of the event's sequence. Listeners added during
//! a pass wait for the next pass; listeners removed during a pass are skipped
//! if they have not run yet. The registry lock is never held while a
//! listener runs, so listeners may call back into the dispatcher.

use std::fmt;
use std::panic::{AssertUnwindSafe, catch_unwind};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use futures::future::{self, BoxFuture, FutureExt};
use serde_json::Value;
use tracing::{debug, trace};

use eventbus_core::config::DispatchConfig;
use eventbus_core::traits::sink::{ReportSink, TracingSink};
use eventbus_core::types::Sign;
use eventbus_core::{BusError, BusResult};

use crate::builder::EventBusBuilder;
use crate::callback::{Callback, CallbackRef, ListenerFuture, OnOptions, Reply};
use crate::extensions::Extensions;
use crate::name::EventName;
use crate::registry::{ListenerInfo, Registry};
use crate::settlement::Settlement;

/// Publish/subscribe dispatcher.
pub struct EventBus {
    registry: Mutex<Registry>,
    extensions: Extensions,
    sink: Arc<dyn ReportSink>,
    config: DispatchConfig,
}

impl EventBus {
    /// Creates an empty dispatcher reporting through `tracing`.
    pub fn new() -> Self {
        Self::with_parts(Arc::new(TracingSink), DispatchConfig::default())
    }

    /// Starts a builder for declarative construction.
    pub fn builder() -> EventBusBuilder {
        EventBusBuilder::new()
    }

    pub(crate) fn with_parts(sink: Arc<dyn ReportSink>, config: DispatchConfig) -> Self {
        Self {
            registry: Mutex::new(Registry::default()),
            extensions: Extensions::new(),
            sink,
            config,
        }
    }

    // ── Registration ────────────────────────────────────────────────

    /// Registers `callback` under `event`. Returns the registration's sign.
    pub fn on(&self, event: impl Into<EventName>, callback: Callback) -> Sign {
        self.register(event.into(), callback, false, OnOptions::default())
    }

    /// Like [`EventBus::on`], with options.
    pub fn on_with(&self, event: impl Into<EventName>, callback: Callback, options: OnOptions) -> Sign {
        self.register(event.into(), callback, false, options)
    }

    /// Registers `callback` to run on the next dispatch of `event` only.
    pub fn once(&self, event: impl Into<EventName>, callback: Callback) -> Sign {
        self.register(event.into(), callback, true, OnOptions::default())
    }

    /// Like [`EventBus::once`], with options.
    pub fn once_with(
        &self,
        event: impl Into<EventName>,
        callback: Callback,
        options: OnOptions,
    ) -> Sign {
        self.register(event.into(), callback, true, options)
    }

    pub(crate) fn register(
        &self,
        event: EventName,
        callback: Callback,
        once: bool,
        options: OnOptions,
    ) -> Sign {
        let sign = options.sign.unwrap_or_default();
        debug!(event = %event, sign = %sign, once, "Listener registered");
        self.registry().push(event, callback, once, sign);
        sign
    }

    // ── Dispatch ────────────────────────────────────────────────────

    /// Invokes every listener of `event` with `args`, without waiting for
    /// asynchronous work. Returns `self` for chaining.
    pub fn emit(&self, event: impl Into<EventName>, args: &[Value]) -> &Self {
        let event = event.into();
        let Some(pass) = self.begin_pass(&event, "emit") else {
            return self;
        };

        for id in pass {
            let taken = self.registry().take_live(&event, id);
            let Some(callback) = taken else {
                continue;
            };
            match self.invoke(&callback, args) {
                Reply::Ready(Ok(_)) => {}
                Reply::Ready(Err(err)) => self.report_failure(&event, &err),
                Reply::Pending(fut) => self.detach(&event, fut),
            }
        }
        self
    }

    /// Invokes every listener of `event` with `args` and returns a future
    /// resolving to each listener's outcome, in registration order.
    ///
    /// All listeners have been invoked by the time this returns; the future
    /// only waits for them to settle.
    pub fn emit_await(
        &self,
        event: impl Into<EventName>,
        args: &[Value],
    ) -> BoxFuture<'static, Vec<Settlement>> {
        let event = event.into();
        let Some(pass) = self.begin_pass(&event, "emit_await") else {
            return future::ready(Vec::new()).boxed();
        };

        let mut units: Vec<BoxFuture<'static, Settlement>> = Vec::with_capacity(pass.len());
        for id in pass {
            let taken = self.registry().take_live(&event, id);
            let Some(callback) = taken else {
                continue;
            };
            let unit = match self.invoke(&callback, args) {
                Reply::Ready(result) => future::ready(Settlement::from(result)).boxed(),
                Reply::Pending(fut) => settle(fut).map(Settlement::from).boxed(),
            };
            units.push(unit);
        }

        let sink = Arc::clone(&self.sink);
        let report = self.config.report_listener_errors;
        async move {
            let settlements = future::join_all(units).await;
            if report {
                for reason in settlements.iter().filter_map(Settlement::reason) {
                    sink.error(&failure_message(&event), reason);
                }
            }
            settlements
        }
        .boxed()
    }

    // ── Removal ─────────────────────────────────────────────────────

    /// Removes every registration of `event` matching `target`.
    pub fn off(&self, event: impl Into<EventName>, target: impl Into<CallbackRef>) -> &Self {
        let event = event.into();
        let target = target.into();
        let removed = self.registry().remove_matching(&event, &target);
        match removed {
            Some(count) => debug!(event = %event, removed = count, "Listeners removed"),
            None => self.warn_missing(&event, "off"),
        }
        self
    }

    /// Removes every registration carrying `sign`, under any event.
    pub fn off_by_sign(&self, sign: Sign) -> &Self {
        let removed = self.registry().remove_sign(&sign);
        debug!(sign = %sign, removed, "Listeners removed by sign");
        self
    }

    /// Removes all listeners of `event`.
    pub fn clear(&self, event: impl Into<EventName>) -> &Self {
        let event = event.into();
        if self.registry().remove_event(&event) {
            debug!(event = %event, "Event cleared");
        }
        self
    }

    /// Removes all listeners of every event.
    pub fn clear_all(&self) -> &Self {
        self.registry().clear();
        debug!("All events cleared");
        self
    }

    // ── Introspection ───────────────────────────────────────────────

    /// Returns whether `event` has any listener.
    pub fn has(&self, event: impl Into<EventName>) -> bool {
        self.registry().contains(&event.into())
    }

    /// Returns whether `event` has a registration matching `target`.
    pub fn has_callback(&self, event: impl Into<EventName>, target: impl Into<CallbackRef>) -> bool {
        self.registry().contains_ref(&event.into(), &target.into())
    }

    /// Returns whether any event has a registration carrying `sign`.
    pub fn has_callback_by_sign(&self, sign: Sign) -> bool {
        self.registry().contains_sign(&sign)
    }

    /// Number of listeners registered under `event`.
    pub fn listener_count(&self, event: impl Into<EventName>) -> usize {
        self.registry().len(&event.into())
    }

    /// Names of all events that currently have listeners, in no particular
    /// order.
    pub fn event_names(&self) -> Vec<EventName> {
        self.registry().names()
    }

    /// Registrations of `event`, in invocation order.
    pub fn listeners(&self, event: impl Into<EventName>) -> Vec<ListenerInfo> {
        self.registry().listeners(&event.into())
    }

    // ── Extensions ──────────────────────────────────────────────────

    /// Host data attached during construction, if present with type `T`.
    pub fn extension<T: std::any::Any + Send + Sync>(&self, key: &str) -> Option<&T> {
        self.extensions.get(key)
    }

    /// The full extensions table.
    pub fn extensions(&self) -> &Extensions {
        &self.extensions
    }

    /// Mutable access to the extensions table.
    pub fn extensions_mut(&mut self) -> &mut Extensions {
        &mut self.extensions
    }

    // ── Internals ───────────────────────────────────────────────────

    fn registry(&self) -> MutexGuard<'_, Registry> {
        self.registry.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Snapshots the sequence for a dispatch pass, warning if there is none.
    fn begin_pass(&self, event: &EventName, op: &str) -> Option<Vec<u64>> {
        let snapshot = self.registry().snapshot(event);
        match snapshot {
            Some(ids) => {
                trace!(event = %event, listeners = ids.len(), op, "Dispatching event");
                Some(ids)
            }
            None => {
                self.warn_missing(event, op);
                None
            }
        }
    }

    /// Runs the synchronous part of a listener, turning a panic into a
    /// failed reply.
    fn invoke(&self, callback: &Callback, args: &[Value]) -> Reply {
        catch_unwind(AssertUnwindSafe(|| callback.invoke(self, args)))
            .unwrap_or_else(|payload| Reply::Ready(Err(BusError::from_panic(payload))))
    }

    /// Hands a pending listener future to the current Tokio runtime, or to
    /// a fallback thread when called outside one.
    fn detach(&self, event: &EventName, fut: ListenerFuture) {
        let sink = Arc::clone(&self.sink);
        let report = self.config.report_listener_errors;
        let task_event = event.clone();
        let task = async move {
            if let Err(err) = settle(fut).await {
                if report {
                    sink.error(&failure_message(&task_event), &err);
                }
            }
        };

        if let Ok(handle) = tokio::runtime::Handle::try_current() {
            handle.spawn(task);
            return;
        }

        debug!(event = %event, "No Tokio runtime; driving listener future on a fallback thread");
        let sink = Arc::clone(&self.sink);
        let thread_event = event.clone();
        let spawned = std::thread::Builder::new()
            .name("eventbus-detached".into())
            .spawn(move || {
                let runtime = tokio::runtime::Builder::new_current_thread()
                    .enable_all()
                    .build();
                match runtime {
                    Ok(runtime) => runtime.block_on(task),
                    Err(e) => sink.warn(&format!(
                        "emit: listener future for event '{thread_event}' dropped: {e}"
                    )),
                }
            });
        if let Err(e) = spawned {
            self.sink
                .warn(&format!("emit: listener future for event '{event}' dropped: {e}"));
        }
    }

    fn report_failure(&self, event: &EventName, err: &BusError) {
        if self.config.report_listener_errors {
            self.sink.error(&failure_message(event), err);
        }
    }

    fn warn_missing(&self, event: &EventName, op: &str) {
        if self.config.warn_on_missing {
            trace!(event = %event, op, "Event has no listeners");
            self.sink.warn(&missing_message(event));
        }
    }
}

/// Awaits a listener future, turning a panic during polling into an error.
async fn settle(fut: ListenerFuture) -> BusResult<Value> {
    AssertUnwindSafe(fut)
        .catch_unwind()
        .await
        .unwrap_or_else(|payload| Err(BusError::from_panic(payload)))
}

fn missing_message(event: &EventName) -> String {
    format!("EventBus(warn): eventName -> '{event}' is not exist")
}

fn failure_message(event: &EventName) -> String {
    format!("listener for event '{event}' failed")
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for EventBus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EventBus")
            .field("events", &self.registry().names())
            .field("extensions", &self.extensions)
            .field("config", &self.config)
            .finish()
    }
}
