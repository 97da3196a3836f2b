//! Listener callbacks and the handles used to refer to them.

use std::fmt;
use std::future::Future;
use std::sync::Arc;

use futures::future::BoxFuture;
use serde_json::Value;

use eventbus_core::BusResult;
use eventbus_core::types::Sign;

use crate::bus::EventBus;

/// Future returned by an asynchronous listener.
pub type ListenerFuture = BoxFuture<'static, BusResult<Value>>;

/// What a listener hands back when invoked.
pub enum Reply {
    /// The listener finished synchronously.
    Ready(BusResult<Value>),
    /// The listener started asynchronous work that settles later.
    Pending(ListenerFuture),
}

impl fmt::Debug for Reply {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Ready(result) => f.debug_tuple("Ready").field(result).finish(),
            Self::Pending(_) => f.write_str("Pending(..)"),
        }
    }
}

type CallbackFn = dyn Fn(&EventBus, &[Value]) -> Reply + Send + Sync;

/// A registered listener function.
///
/// Clones share identity: [`Callback::ptr_eq`] is true between a callback and
/// its clones, and removal by callback reference matches on that identity.
/// Every invocation receives the dispatcher as its first argument.
#[derive(Clone)]
pub struct Callback(Arc<CallbackFn>);

impl Callback {
    /// Creates a synchronous listener.
    pub fn new<F>(f: F) -> Self
    where
        F: Fn(&EventBus, &[Value]) -> BusResult<Value> + Send + Sync + 'static,
    {
        Self(Arc::new(move |bus: &EventBus, args: &[Value]| {
            Reply::Ready(f(bus, args))
        }))
    }

    /// Creates an asynchronous listener.
    ///
    /// The closure runs synchronously at dispatch time; the future it returns
    /// is what `emit_await` waits for.
    pub fn future<F, Fut>(f: F) -> Self
    where
        F: Fn(&EventBus, &[Value]) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = BusResult<Value>> + Send + 'static,
    {
        Self(Arc::new(move |bus: &EventBus, args: &[Value]| {
            Reply::Pending(Box::pin(f(bus, args)))
        }))
    }

    /// Creates a listener that decides per call whether to answer
    /// synchronously or asynchronously.
    pub fn from_reply<F>(f: F) -> Self
    where
        F: Fn(&EventBus, &[Value]) -> Reply + Send + Sync + 'static,
    {
        Self(Arc::new(f))
    }

    /// Returns `true` if both handles refer to the same listener.
    pub fn ptr_eq(&self, other: &Callback) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }

    pub(crate) fn invoke(&self, bus: &EventBus, args: &[Value]) -> Reply {
        (self.0)(bus, args)
    }
}

impl fmt::Debug for Callback {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Callback({:p})", Arc::as_ptr(&self.0) as *const ())
    }
}

/// Reference to registrations, used by `off` and `has_callback`.
#[derive(Debug, Clone)]
pub enum CallbackRef {
    /// Match registrations whose sign equals this one.
    Sign(Sign),
    /// Match registrations of this exact callback.
    Callback(Callback),
}

impl CallbackRef {
    pub(crate) fn matches(&self, sign: &Sign, callback: &Callback) -> bool {
        match self {
            Self::Sign(s) => s == sign,
            Self::Callback(c) => c.ptr_eq(callback),
        }
    }
}

impl From<Sign> for CallbackRef {
    fn from(sign: Sign) -> Self {
        Self::Sign(sign)
    }
}

impl From<Callback> for CallbackRef {
    fn from(callback: Callback) -> Self {
        Self::Callback(callback)
    }
}

impl From<&Callback> for CallbackRef {
    fn from(callback: &Callback) -> Self {
        Self::Callback(callback.clone())
    }
}

/// Options for `on_with` / `once_with`.
#[derive(Debug, Clone, Copy, Default)]
pub struct OnOptions {
    /// Caller-chosen sign. A fresh one is minted when absent.
    pub sign: Option<Sign>,
}

impl OnOptions {
    /// Options carrying an explicit sign.
    pub fn with_sign(sign: Sign) -> Self {
        Self { sign: Some(sign) }
    }
}
