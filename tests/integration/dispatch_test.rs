//! Integration tests for registration, dispatch, and removal.

mod helpers;

use std::sync::atomic::{AtomicI64, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use serde_json::{Value, json};

use eventbus::{BusError, Callback, EventBus, EventToken, OnOptions, Settlement, Sign};
use helpers::{Calls, Report};

#[test]
fn test_on_and_emit() {
    let bus = EventBus::new();
    let calls = Calls::default();
    let cb = helpers::recording_sum(&calls);

    bus.on("sum", cb.clone());
    assert!(bus.has("sum"));
    assert!(bus.has_callback("sum", &cb));

    bus.emit("sum", &[json!(1), json!(2)]);

    assert_eq!(*calls.lock().expect("lock"), vec![vec![json!(1), json!(2)]]);
}

#[test]
fn test_off_by_callback() {
    let bus = EventBus::new();
    let calls = Calls::default();
    let cb = helpers::recording_sum(&calls);

    bus.on("sum", cb.clone());
    bus.emit("sum", &[json!(1), json!(2)]);
    bus.off("sum", &cb);
    bus.emit("sum", &[json!(2), json!(2)]);

    assert_eq!(calls.lock().expect("lock").len(), 1);
    assert!(!bus.has("sum"));
    assert!(!bus.has_callback("sum", &cb));
}

#[test]
fn test_off_by_returned_sign() {
    let bus = EventBus::new();
    let calls = Calls::default();

    let sign = bus.on("sum", helpers::recording_sum(&calls));
    bus.emit("sum", &[json!(1), json!(2)]);
    bus.off("sum", sign);
    bus.emit("sum", &[json!(2), json!(2)]);

    assert_eq!(calls.lock().expect("lock").len(), 1);
}

#[test]
fn test_once_fires_once_and_unregisters() {
    let bus = EventBus::new();
    let calls = Calls::default();

    bus.once("sum", helpers::recording_sum(&calls));
    bus.emit("sum", &[json!(1), json!(2)]);
    assert!(!bus.has("sum"));
    bus.emit("sum", &[json!(2), json!(2)]);

    assert_eq!(*calls.lock().expect("lock"), vec![vec![json!(1), json!(2)]]);
}

#[test]
fn test_once_leaves_other_listeners() {
    let bus = EventBus::new();
    let calls = Calls::default();

    bus.once("sum", helpers::recording_sum(&calls));
    bus.on("sum", helpers::recording_sum(&calls));
    bus.emit("sum", &[]);

    assert!(bus.has("sum"));
    assert_eq!(bus.listener_count("sum"), 1);
}

#[test]
fn test_has_callback_by_sign_follows_removal() {
    let bus = EventBus::new();
    let cb = Callback::new(|_, _| Ok(Value::Null));
    let sign = bus.on("sum", cb.clone());

    assert!(bus.has_callback_by_sign(sign));
    bus.off("sum", &cb);
    assert!(!bus.has_callback_by_sign(sign));
}

#[test]
fn test_shared_sign_removes_across_events() {
    let bus = EventBus::new();
    let group = Sign::new();
    let token = EventToken::new();
    bus.on_with("resize", Callback::new(|_, _| Ok(Value::Null)), OnOptions::with_sign(group));
    bus.once_with(token, Callback::new(|_, _| Ok(Value::Null)), OnOptions::with_sign(group));
    let other = bus.on("resize", Callback::new(|_, _| Ok(Value::Null)));

    bus.off_by_sign(group);

    assert!(!bus.has(token));
    assert!(bus.has_callback("resize", other));
    assert!(!bus.has_callback_by_sign(group));
}

#[test]
fn test_token_and_string_names_are_distinct() {
    let bus = EventBus::new();
    let token = EventToken::new();
    let calls = Calls::default();
    bus.on(token, helpers::recording_sum(&calls));

    bus.emit(token.to_string(), &[json!(1)]);
    assert!(calls.lock().expect("lock").is_empty());

    bus.emit(token, &[json!(1)]);
    assert_eq!(calls.lock().expect("lock").len(), 1);
}

#[test]
fn test_throwing_listener_does_not_block_later_ones() {
    let (bus, reports) = helpers::recording_bus();
    let calls = Calls::default();
    bus.on("save", Callback::new(|_, _| Err(BusError::listener("disk full"))));
    bus.on("save", helpers::recording_sum(&calls));

    bus.emit("save", &[json!(4)]);

    assert_eq!(calls.lock().expect("lock").len(), 1);
    assert_eq!(reports.errors(), vec!["disk full".to_string()]);
}

#[test]
fn test_missing_event_warns_without_failing() {
    let (bus, reports) = helpers::recording_bus();

    bus.emit("missing", &[]);

    assert_eq!(reports.warnings(), 1);
    match &reports.snapshot()[0] {
        Report::Warn(message) => assert!(message.contains("missing")),
        other => panic!("expected warning, got {other:?}"),
    }
}

#[tokio::test]
async fn test_emit_does_not_wait_but_emit_await_does() {
    let state = Arc::new(AtomicI64::new(0));

    let slow = {
        let state = Arc::clone(&state);
        Callback::future(move |_, _| {
            let state = Arc::clone(&state);
            async move {
                tokio::time::sleep(Duration::from_millis(100)).await;
                state.store(5, Ordering::SeqCst);
                Ok(json!(5))
            }
        })
    };
    let fast = {
        let state = Arc::clone(&state);
        Callback::new(move |_, _| {
            state.store(1, Ordering::SeqCst);
            Ok(json!(1))
        })
    };

    let bus = EventBus::new();
    bus.on("sum", slow);
    bus.on("sum", fast);

    bus.emit("sum", &[]);
    assert_eq!(state.load(Ordering::SeqCst), 1);

    let settlements = bus.emit_await("sum", &[]).await;
    assert_eq!(
        settlements,
        vec![Settlement::Fulfilled(json!(5)), Settlement::Fulfilled(json!(1))]
    );
    assert_eq!(state.load(Ordering::SeqCst), 5);
}

#[tokio::test(start_paused = true)]
async fn test_emit_await_runs_listeners_concurrently() {
    let bus = EventBus::new();
    for delay in [60_u64, 40, 20] {
        bus.on(
            "race",
            Callback::future(move |_, _| async move {
                tokio::time::sleep(Duration::from_millis(delay)).await;
                Ok(json!(delay))
            }),
        );
    }

    let started = tokio::time::Instant::now();
    let settlements = bus.emit_await("race", &[]).await;
    let elapsed = started.elapsed();

    let values: Vec<Value> = settlements
        .into_iter()
        .map(|s| s.into_result().expect("fulfilled"))
        .collect();
    assert_eq!(values, vec![json!(60), json!(40), json!(20)]);
    assert!(elapsed < Duration::from_millis(100), "took {elapsed:?}");
}

#[tokio::test]
async fn test_once_across_emit_and_emit_await() {
    let bus = EventBus::new();
    let calls = Calls::default();
    bus.once("sum", helpers::recording_sum(&calls));

    let first = bus.emit_await("sum", &[json!(1)]).await;
    bus.emit("sum", &[json!(2)]);
    let third = bus.emit_await("sum", &[json!(3)]).await;

    assert_eq!(first, vec![Settlement::Fulfilled(json!(1))]);
    assert!(third.is_empty());
    assert_eq!(calls.lock().expect("lock").len(), 1);
}

#[test]
fn test_failed_once_listeners_are_removed_by_emit() {
    let (bus, reports) = helpers::recording_bus();
    bus.once("fail", Callback::new(|_, _| Err(BusError::listener("refused"))));
    bus.once("panic", Callback::new(|_, _| panic!("blew up")));

    bus.emit("fail", &[]).emit("panic", &[]);

    assert!(!bus.has("fail"));
    assert!(!bus.has("panic"));
    assert_eq!(
        reports.errors(),
        vec!["refused".to_string(), "blew up".to_string()]
    );

    bus.emit("fail", &[]).emit("panic", &[]);
    assert_eq!(reports.errors().len(), 2);
}

#[tokio::test]
async fn test_failed_once_listeners_are_removed_by_emit_await() {
    let (bus, reports) = helpers::recording_bus();
    bus.once("fail", Callback::new(|_, _| Err(BusError::listener("refused"))));
    bus.once(
        "fail",
        Callback::future(|_, _| async { Err(BusError::listener("rejected later")) }),
    );
    bus.once("panic", Callback::new(|_, _| panic!("blew up")));

    let failed = bus.emit_await("fail", &[]).await;
    let panicked = bus.emit_await("panic", &[]).await;

    assert!(!bus.has("fail"));
    assert!(!bus.has("panic"));
    assert!(failed.iter().all(Settlement::is_rejected));
    assert_eq!(failed.len(), 2);
    assert_eq!(
        panicked[0].reason().map(|e| e.kind),
        Some(eventbus::ErrorKind::Panicked)
    );
    assert_eq!(reports.errors().len(), 3);

    assert!(bus.emit_await("fail", &[]).await.is_empty());
}

#[tokio::test]
async fn test_emit_await_tags_each_outcome() {
    let (bus, reports) = helpers::recording_bus();
    bus.on("mixed", Callback::new(|_, _| Ok(json!("a"))));
    bus.on(
        "mixed",
        Callback::future(|_, _| async { Err(BusError::listener("rejected")) }),
    );
    bus.on("mixed", Callback::new(|_, _| Ok(json!("c"))));

    let settlements = bus.emit_await("mixed", &[]).await;

    assert!(settlements[0].is_fulfilled());
    assert!(settlements[1].is_rejected());
    assert_eq!(settlements[1].reason().map(|e| e.message.as_str()), Some("rejected"));
    assert_eq!(settlements[2].value(), Some(&json!("c")));
    assert_eq!(reports.errors(), vec!["rejected".to_string()]);
}

#[test]
fn test_listener_can_register_during_dispatch() {
    let bus = EventBus::new();
    let seen = Arc::new(Mutex::new(Vec::new()));

    let seen_late = Arc::clone(&seen);
    let late = Callback::new(move |_, _| {
        seen_late.lock().expect("lock").push("late");
        Ok(Value::Null)
    });
    let seen_first = Arc::clone(&seen);
    bus.on(
        "grow",
        Callback::new(move |bus, _| {
            seen_first.lock().expect("lock").push("first");
            if !bus.has_callback("grow", &late) {
                bus.on("grow", late.clone());
            }
            Ok(Value::Null)
        }),
    );

    bus.emit("grow", &[]);
    assert_eq!(*seen.lock().expect("lock"), vec!["first"]);

    bus.emit("grow", &[]);
    assert_eq!(*seen.lock().expect("lock"), vec!["first", "first", "late"]);
}
