//! Tracing-subscriber initialization (spec §6.1 "never the core's job").
//!
//! `game-core` only ever emits [`tracing`] spans/events; wiring up a
//! subscriber belongs to whatever embeds it. Gated behind the `tracing-init`
//! feature so a headless training loop that installs its own subscriber isn't
//! forced to carry `tracing-subscriber` as a dependency.

use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

/// Installs a stderr-only subscriber honoring `RUST_LOG`, defaulting to
/// `info` when unset. Call once at process start before the first
/// [`crate::Environment::step`].
pub fn init_tracing() {
    let env_filter = tracing_subscriber::EnvFilter::from_default_env()
        .add_directive(tracing::Level::INFO.into());
    let fmt_layer = tracing_subscriber::fmt::layer().with_writer(std::io::stderr);
    tracing_subscriber::registry().with(env_filter).with(fmt_layer).init();
}
