//! State Flow
//!
//! This example awaits lifecycle states from async code while a host
//! thread drives the lifecycle.
//!
//! Run with: RUST_LOG=lifecycle=debug cargo run --example state_flow

use lifecycle::{Lifecycle, LifecycleRegistry, State};
use std::sync::Arc;
use std::time::Duration;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    println!("=== State Flow ===\n");

    let registry = Arc::new(LifecycleRegistry::new());
    let mut flow = registry.current_state_flow();
    println!("Initial state: {}", flow.value());

    let host = Arc::clone(&registry);
    let driver = std::thread::spawn(move || {
        for target in [State::Created, State::Started, State::Resumed] {
            std::thread::sleep(Duration::from_millis(50));
            host.move_to(target);
        }
        std::thread::sleep(Duration::from_millis(50));
        host.destroy();
    });

    if let Some(state) = flow.wait_for_at_least(State::Started).await {
        println!("Visible: reached {state}");
    }

    while let Some(state) = flow.changed().await {
        println!("Changed: {state}");
        if state.is_final() {
            break;
        }
    }

    if driver.join().is_err() {
        eprintln!("host thread panicked");
    }

    println!("\n=== Example Complete ===");
}
