//! Thin embedding layer around [`game_core::World`] (spec §6 "External
//! interfaces").
//!
//! `game-core` is a pure tick-synchronous state machine; this crate is the
//! only place that owns a `World` instance, seeds it from configuration, and
//! exposes the primary `new`/`reset`/`step` interface plus read-only
//! introspection to an external decision controller. It never makes
//! decisions on the core's behalf — scripted AI, map/biome generation,
//! replay recording, and scorecard/telemetry are all separate collaborators
//! (spec §1).

pub mod config;
pub mod environment;
pub mod error;
pub mod rng;

#[cfg(feature = "tracing-init")]
pub mod tracing_init;

pub use config::EnvironmentConfig;
pub use environment::Environment;
pub use error::{EnvironmentError, Result};
pub use rng::{seed_for_step, PcgRng};

#[cfg(feature = "tracing-init")]
pub use tracing_init::init_tracing;
