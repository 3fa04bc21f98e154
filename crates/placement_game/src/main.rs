//! AI Placement - headless demo

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

fn main() {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer())
        .with(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    tracing::info!("Starting AI placement demo");

    if let Err(e) = placement_game::run() {
        tracing::error!("Demo error: {e}");
        std::process::exit(1);
    }
}
