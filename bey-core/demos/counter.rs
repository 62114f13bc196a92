//! Counter demo.
//!
//! A headless host: each frame it checks its dirty flag and, if set,
//! "renders" the counter by logging it.
//!
//! Run with `RUST_LOG=trace cargo run --example counter` to see the cell
//! and subscription traces as well.

use std::sync::Arc;

use bey_core::store::{update, StateCell};
use bey_core::subscription::{DirtyFlag, SelectorSubscription};
use tracing_subscriber::EnvFilter;

#[derive(Debug, Clone, PartialEq)]
struct Counter {
    count: i64,
}

fn increment(counter: &StateCell<Counter>) {
    update(counter, |state| state.count += 1);
}

fn decrement(counter: &StateCell<Counter>) {
    update(counter, |state| state.count -= 1);
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let counter = StateCell::new(Counter { count: 0 });
    let host = Arc::new(DirtyFlag::new());
    let view = SelectorSubscription::new(counter.clone(), |state| state.count, host.clone());

    tracing::info!(count = view.render(), "initial render");
    view.mount()?;

    let clicks: [fn(&StateCell<Counter>); 5] = [increment, increment, decrement, increment, increment];
    for (frame, click) in clicks.iter().enumerate() {
        click(&counter);
        if host.take_dirty() {
            view.render_with(|count| tracing::info!(frame, count, "render"));
        }
    }

    // Writing the same value is not a change.
    update(&counter, |state| state.count = 3);
    if !host.take_dirty() {
        tracing::info!("no-op update skipped render");
    }

    view.unmount();
    tracing::info!(renders = host.request_count(), "done");
    Ok(())
}
