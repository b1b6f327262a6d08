//! Enumerations and scalar constants shared across the core (spec §2 "Types &
//! Constants", §3 data model).

pub mod constants;
mod ids;
mod kinds;

pub use constants::*;
pub use ids::{EntityId, Position, TeamId, Tick};
pub use kinds::{
    ItemKind, Orientation, Stance, StockpileResource, TerrainKind, ThingKind, UnitClass,
};
