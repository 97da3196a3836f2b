//! Listener registry: event name → ordered callback records.
//!
//! Invariant: no event maps to an empty sequence. Every operation that
//! removes records prunes the entry as soon as its sequence empties, so the
//! absence of a key is the only representation of "no listeners".

use std::collections::HashMap;

use eventbus_core::types::Sign;

use crate::callback::{Callback, CallbackRef};
use crate::name::EventName;

/// One registration.
#[derive(Debug, Clone)]
pub(crate) struct CallbackRecord {
    /// Registry-internal identity; signs may repeat, ids never do.
    id: u64,
    once: bool,
    callback: Callback,
    sign: Sign,
}

/// Read-only view of a registration.
#[derive(Debug, Clone)]
pub struct ListenerInfo {
    /// The registration's sign.
    pub sign: Sign,
    /// Whether the registration is removed on first invocation.
    pub once: bool,
    /// The registered callback.
    pub callback: Callback,
}

impl From<&CallbackRecord> for ListenerInfo {
    fn from(record: &CallbackRecord) -> Self {
        Self {
            sign: record.sign,
            once: record.once,
            callback: record.callback.clone(),
        }
    }
}

/// Registry of listeners organized by event name.
#[derive(Debug, Default)]
pub(crate) struct Registry {
    events: HashMap<EventName, Vec<CallbackRecord>>,
    next_id: u64,
}

impl Registry {
    /// Appends a registration to the end of the event's sequence.
    pub(crate) fn push(&mut self, event: EventName, callback: Callback, once: bool, sign: Sign) {
        let id = self.next_id;
        self.next_id += 1;
        self.events.entry(event).or_default().push(CallbackRecord {
            id,
            once,
            callback,
            sign,
        });
    }

    /// Record ids of the event's sequence, in invocation order.
    ///
    /// A dispatch pass walks this snapshot, so records appended during the
    /// pass are not part of it.
    pub(crate) fn snapshot(&self, event: &EventName) -> Option<Vec<u64>> {
        self.events
            .get(event)
            .map(|records| records.iter().map(|r| r.id).collect())
    }

    /// Looks up a record that is still registered and returns its callback.
    ///
    /// A `once` record is detached here, before its callback runs, so a
    /// reentrant dispatch from inside the callback cannot fire it again.
    ///
    /// Ids are handed out in increasing order and records are only ever
    /// appended or removed, so each sequence stays sorted by id.
    pub(crate) fn take_live(&mut self, event: &EventName, id: u64) -> Option<Callback> {
        let records = self.events.get_mut(event)?;
        let index = records.binary_search_by_key(&id, |r| r.id).ok()?;
        let callback = if records[index].once {
            records.remove(index).callback
        } else {
            records[index].callback.clone()
        };
        if records.is_empty() {
            self.events.remove(event);
        }
        Some(callback)
    }

    /// Removes every record of `event` matching `target`.
    ///
    /// Returns `None` if the event has no sequence, otherwise the number of
    /// records removed.
    pub(crate) fn remove_matching(&mut self, event: &EventName, target: &CallbackRef) -> Option<usize> {
        let records = self.events.get_mut(event)?;
        let before = records.len();
        records.retain(|r| !target.matches(&r.sign, &r.callback));
        let removed = before - records.len();
        if records.is_empty() {
            self.events.remove(event);
        }
        Some(removed)
    }

    /// Removes every record carrying `sign`, across all events.
    pub(crate) fn remove_sign(&mut self, sign: &Sign) -> usize {
        let mut removed = 0;
        for records in self.events.values_mut() {
            let before = records.len();
            records.retain(|r| &r.sign != sign);
            removed += before - records.len();
        }
        self.events.retain(|_, records| !records.is_empty());
        removed
    }

    /// Drops an event's entire sequence. Returns `true` if it existed.
    pub(crate) fn remove_event(&mut self, event: &EventName) -> bool {
        self.events.remove(event).is_some()
    }

    /// Drops every sequence.
    pub(crate) fn clear(&mut self) {
        self.events.clear();
    }

    pub(crate) fn contains(&self, event: &EventName) -> bool {
        self.events.contains_key(event)
    }

    pub(crate) fn contains_ref(&self, event: &EventName, target: &CallbackRef) -> bool {
        self.events
            .get(event)
            .is_some_and(|records| records.iter().any(|r| target.matches(&r.sign, &r.callback)))
    }

    pub(crate) fn contains_sign(&self, sign: &Sign) -> bool {
        self.events
            .values()
            .any(|records| records.iter().any(|r| &r.sign == sign))
    }

    pub(crate) fn len(&self, event: &EventName) -> usize {
        self.events.get(event).map_or(0, Vec::len)
    }

    pub(crate) fn names(&self) -> Vec<EventName> {
        self.events.keys().cloned().collect()
    }

    pub(crate) fn listeners(&self, event: &EventName) -> Vec<ListenerInfo> {
        self.events
            .get(event)
            .map(|records| records.iter().map(ListenerInfo::from).collect())
            .unwrap_or_default()
    }
}
