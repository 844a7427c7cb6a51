//! Screen Lifecycle
//!
//! This example drives a lifecycle the way a UI host would while a
//! resource owned by the screen reacts to each event.
//!
//! Key concepts:
//! - The host owns the registry, consumers get a read-only view
//! - Observers receive one event per adjacent step
//! - Cancelling a subscription stops delivery immediately
//!
//! Run with: RUST_LOG=lifecycle=debug cargo run --example screen_lifecycle

use lifecycle::{
    Cancellable, Event, Lifecycle, LifecycleRegistry, LifecycleView, State, Subscription,
};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

/// A camera preview that must only run while the screen is resumed.
struct CameraPreview {
    running: AtomicBool,
}

impl CameraPreview {
    fn attach(view: &LifecycleView) -> (Arc<Self>, Subscription) {
        let preview = Arc::new(Self {
            running: AtomicBool::new(false),
        });
        let observer = Arc::clone(&preview);
        let subscription = view.observe(move |event| match event {
            Event::OnResume => {
                observer.running.store(true, Ordering::SeqCst);
                println!("  camera: preview started");
            }
            Event::OnPause => {
                observer.running.store(false, Ordering::SeqCst);
                println!("  camera: preview stopped");
            }
            other => println!("  camera: ignoring {other}"),
        });
        (preview, subscription)
    }
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    println!("=== Screen Lifecycle ===\n");

    let registry = LifecycleRegistry::builder().name("camera-screen").build()?;
    let view = registry.view();
    let (preview, subscription) = CameraPreview::attach(&view);

    println!("Showing screen:");
    registry.move_to(State::Resumed);
    println!("  state: {}\n", view.current_state());

    println!("Screen goes to background:");
    registry.move_to(State::Created);
    println!("  state: {}\n", view.current_state());

    println!("Detaching preview, then closing screen:");
    subscription.cancel();
    registry.destroy();
    println!("  state: {}", view.current_state());
    println!("  preview running: {}\n", preview.running.load(Ordering::SeqCst));

    println!("Recorded path:");
    for record in registry.history().transitions() {
        let event = record.event.map_or("-", Event::name);
        println!("  {} -> {} ({event})", record.from, record.to);
    }

    println!("\n=== Example Complete ===");
    Ok(())
}
