//! Common error infrastructure for game-core.
//!
//! Domain-specific errors (e.g. [`crate::movement::MovementError`],
//! [`crate::combat::CombatError`]) are defined alongside the subsystem they
//! validate, but every one of them implements [`CoreError`] so the tick
//! orchestrator can classify and absorb them uniformly (see spec §4.12/§7:
//! nothing above the dispatch boundary ever sees a `Result`).

use crate::types::{EntityId, Position};

/// Severity level of an error, used for categorization and recovery strategies.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ErrorSeverity {
    /// Expected, "cannot be fulfilled" outcome (insufficient resources, blocked
    /// tile, full garrison, out of range). Resolves to a silent no-op.
    Recoverable,
    /// Malformed action encoding the controller should never emit. Absorbed,
    /// logged at `debug`.
    Validation,
    /// An entity mutation would violate a state invariant. Treated as a bug:
    /// `debug_assert!`s in debug builds, logged at `error` in release.
    Internal,
}

impl ErrorSeverity {
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Recoverable => "recoverable",
            Self::Validation => "validation",
            Self::Internal => "internal",
        }
    }

    pub const fn is_recoverable(&self) -> bool {
        matches!(self, Self::Recoverable)
    }

    pub const fn is_internal(&self) -> bool {
        matches!(self, Self::Internal)
    }
}

/// Contextual information attached to errors for diagnostics and tracing.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ErrorContext {
    pub actor: Option<EntityId>,
    pub position: Option<Position>,
    pub step: u64,
    pub message: Option<&'static str>,
}

impl ErrorContext {
    pub const fn new(step: u64) -> Self {
        Self {
            actor: None,
            position: None,
            step,
            message: None,
        }
    }

    #[must_use]
    pub const fn with_actor(mut self, actor: EntityId) -> Self {
        self.actor = Some(actor);
        self
    }

    #[must_use]
    pub const fn with_position(mut self, position: Position) -> Self {
        self.position = Some(position);
        self
    }

    #[must_use]
    pub const fn with_message(mut self, message: &'static str) -> Self {
        self.message = Some(message);
        self
    }
}

/// Common trait implemented by every typed error in game-core.
///
/// The tick orchestrator never propagates these to the caller (per spec §7);
/// it uses `severity()` to decide whether to silently no-op, log at `debug`,
/// or treat the failure as an internal bug.
pub trait CoreError: core::fmt::Display + core::fmt::Debug {
    fn severity(&self) -> ErrorSeverity;

    fn context(&self) -> Option<&ErrorContext> {
        None
    }

    fn error_code(&self) -> &'static str {
        core::any::type_name::<Self>()
    }
}

/// Error type for operations that never fail.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
#[error("this error should never be constructed")]
pub enum NeverError {}

impl CoreError for NeverError {
    fn severity(&self) -> ErrorSeverity {
        match *self {}
    }
}
