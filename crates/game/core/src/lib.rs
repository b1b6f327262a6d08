//! Deterministic tick-synchronous simulation core for a grid-based,
//! multi-agent real-time-strategy environment.
//!
//! `game-core` owns the world model, the fixed-phase tick orchestrator, the
//! movement/terrain rules, the combat and death pipelines, and the spatial
//! index that backs nearest/in-range queries. All state mutation flows
//! through [`engine::step`]; everything else in this crate is either read by
//! the tick orchestrator or exposed for an embedding `runtime` crate to drive
//! the environment and publish observations.

pub mod action;
pub mod combat;
pub mod death;
pub mod economy;
pub mod engine;
pub mod error;
pub mod movement;
pub mod observation;
pub mod spatial;
pub mod state;
pub mod types;
pub mod victory;

pub use action::{ActionError, ActionVerb, DecodedAction};
pub use combat::{CombatError, MonkError};
pub use death::RespawnError;
pub use economy::inventory::Inventory;
pub use economy::market::MarketPrices;
pub use economy::production::{BuildError, GarrisonError, ProductionEntry, ProductionError};
pub use economy::stockpile::Stockpile;
pub use economy::tech::{CivBonuses, TechSet};
pub use engine::{step, StepResult};
pub use error::{CoreError, ErrorContext, ErrorSeverity, NeverError};
pub use movement::{MoveOutcome, MovementError};
pub use observation::{Observation, ObservationLayer};
pub use spatial::SpatialIndex;
pub use state::{make_connected, BackgroundEntry, EntityStore, Grid, Projectile, Thing, World};
pub use types::{
    EntityId, ItemKind, Orientation, Position, Stance, StockpileResource, TeamId, TerrainKind,
    Tick, ThingKind, UnitClass,
};
pub use victory::{VictoryCondition, VictoryStates};
