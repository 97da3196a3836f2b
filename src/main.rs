//! EventBus demo. Wires configuration and logging around a dispatcher and
//! runs a short scripted session.

use std::sync::Arc;
use std::sync::atomic::{AtomicI64, Ordering};
use std::time::Duration;

use serde_json::{Value, json};
use tracing_subscriber::{EnvFilter, fmt};

use eventbus::{Callback, EventBus, ListenerSpec, Settlement};
use eventbus_core::config::BusConfig;
use eventbus_core::error::BusError;

#[tokio::main]
async fn main() {
    let config = match load_configuration() {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Failed to load configuration: {}", e);
            std::process::exit(1);
        }
    };

    init_logging(&config);

    if let Err(e) = run(config).await {
        tracing::error!("Demo error: {}", e);
        std::process::exit(1);
    }
}

/// Load configuration from files and environment
fn load_configuration() -> Result<BusConfig, BusError> {
    let env = std::env::var("EVENTBUS_ENV").unwrap_or_else(|_| "development".to_string());
    BusConfig::load(&env)
}

/// Initialize tracing/logging
fn init_logging(config: &BusConfig) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.logging.level));

    match config.logging.format.as_str() {
        "json" => {
            fmt()
                .json()
                .with_env_filter(filter)
                .with_target(true)
                .with_thread_ids(true)
                .init();
        }
        _ => {
            fmt()
                .pretty()
                .with_env_filter(filter)
                .with_target(true)
                .init();
        }
    }
}

fn sum(args: &[Value]) -> Value {
    json!(args.iter().filter_map(Value::as_i64).sum::<i64>())
}

/// Logs a greeting for the first argument and echoes it back.
fn greeter() -> Callback {
    Callback::new(|_, args| {
        let who = args.first().cloned().unwrap_or_default();
        tracing::info!(who = %who, "hello");
        Ok(who)
    })
}

async fn run(config: BusConfig) -> Result<(), BusError> {
    tracing::info!("Starting EventBus demo v{}", env!("CARGO_PKG_VERSION"));

    let last_total = Arc::new(AtomicI64::new(0));
    let total_in = Arc::clone(&last_total);

    let bus = EventBus::builder()
        .config(config.dispatch)
        .event(
            "sum",
            Callback::new(move |_, args| {
                let total = sum(args);
                total_in.store(total.as_i64().unwrap_or_default(), Ordering::SeqCst);
                Ok(total)
            }),
        )
        .event(
            "greet",
            vec![ListenerSpec::new(greeter()).once()],
        )
        .init(|ctx| {
            ctx.set_extension("started_at", std::time::SystemTime::now());
            Ok(())
        })
        .build()?;

    bus.emit("sum", &[json!(1), json!(2)])
        .emit("greet", &[json!("world")])
        .emit("greet", &[json!("nobody")]);
    tracing::info!(total = last_total.load(Ordering::SeqCst), "sum after emit");

    bus.on(
        "sum",
        Callback::future(|_, args| {
            let args = args.to_vec();
            async move {
                tokio::time::sleep(Duration::from_millis(50)).await;
                Ok(json!(sum(&args).as_i64().unwrap_or_default() * 10))
            }
        }),
    );

    let settlements = bus.emit_await("sum", &[json!(2), json!(3)]).await;
    for (index, settlement) in settlements.iter().enumerate() {
        match settlement {
            Settlement::Fulfilled(value) => tracing::info!(index, %value, "fulfilled"),
            Settlement::Rejected(reason) => tracing::warn!(index, %reason, "rejected"),
        }
    }

    bus.emit("missing", &[]);

    tracing::info!(events = ?bus.event_names(), "Demo finished");
    Ok(())
}
