use uuid::Uuid;

pub mod config;
pub mod context;
pub mod errors;
pub mod time_provider;

use tracing_subscriber::{prelude::__tracing_subscriber_SubscriberExt, Registry, util::SubscriberInitExt};

pub fn generate_id() -> String {
    Uuid::new_v4().to_hyphenated().to_string()
}

///
/// Initialise tracing with a console fmt layer filtered by RUST_LOG.
///
/// The hosting service (or a test harness) calls this once - repeat calls are
/// tolerated so test binaries can all attempt initialisation.
///
pub fn init_tracing() {
    config::default_env("RUST_LOG", "INFO");

    if let Err(err) = Registry::default()
        .with(tracing_subscriber::EnvFilter::from_default_env()) // Set the tracing level to match RUST_LOG env variable.
        .with(tracing_subscriber::fmt::layer().with_test_writer().with_ansi(true))
        .try_init() {
            tracing::info!("Tracing already initialised: {}", err.to_string()); // Allowed error here - tests call this fn repeatedly.
    }
}
