//! Embedding-layer error type.
//!
//! `game-core` never returns an error from [`crate::Environment::step`] — a
//! malformed action is absorbed per its [`game_core::CoreError::severity`]
//! and surfaced only as reward/termination state. Everything here instead
//! covers failures in the embedding boundary itself: a config that can't
//! produce a valid episode.

use thiserror::Error;

pub type Result<T> = std::result::Result<T, EnvironmentError>;

#[derive(Debug, Error)]
pub enum EnvironmentError {
    #[error("max_steps must be greater than zero")]
    ZeroMaxSteps,

    #[error("agent slot {0} is out of range")]
    AgentOutOfRange(u32),

    #[error("team {0} is out of range")]
    TeamOutOfRange(u8),
}
