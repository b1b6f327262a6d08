//! Scalar constants: map dimensions, population limits, HP/damage/cost
//! tables, and the tunables named throughout spec §4.

/// Fixed map dimensions. The world is a dense array of this size; `Position`
/// validity is checked against it everywhere (spec §4.1).
pub const MAP_WIDTH: i32 = 120;
pub const MAP_HEIGHT: i32 = 120;

/// Maximum simultaneously controllable agents and per-team share (spec §3,
/// §6 action encoding `[u8; MapAgents]`).
pub const MAP_AGENTS: usize = 64;
pub const MAP_AGENTS_PER_TEAM: usize = 16;
pub const MAP_ROOM_OBJECTS_TEAMS: usize = 4;

/// Action byte decoding: `(verb, arg) = (a / ActionArgumentCount, a %
/// ActionArgumentCount)` (spec §6).
pub const ACTION_ARGUMENT_COUNT: u8 = 16;

/// Per-team house population contribution (spec §4.7).
pub const HOUSE_POP_CAP: u32 = 5;
/// Population allowance granted before any houses are built. Must be zero:
/// spec §8 "Pop-cap law" requires that with zero houses and >=1 alive agent,
/// a dead agent never respawns regardless of altar hearts — any positive
/// base would let a team respawn past its built capacity.
pub const POP_CAP_BASE: u32 = 0;

/// Initial inventory of a freshly-generated resource node (spec §8 scenario 1/2).
pub const RESOURCE_NODE_INITIAL: u32 = 10;

/// Respawn restores HP and clears unit class back to Villager (spec §4.7).
pub const RESPAWN_UNIT_CLASS: crate::types::UnitClass = crate::types::UnitClass::Villager;

/// Movement debt must stay within `[0, 1)` between ticks (spec §3 invariant 5).
pub const MOVEMENT_DEBT_THRESHOLD: f32 = 1.0;

/// Fixed cliff-fall damage dealt when descending an elevation step without a
/// matching ramp-down or road (spec §4.2, §4.4). Left to the implementer per
/// spec §9 open questions; chosen to be clearly observable but non-lethal
/// against starting-HP units.
pub const CLIFF_FALL_DAMAGE: i32 = 15;

/// Maximum elevation difference across a single cardinal step before
/// traversal is blocked outright (spec §4.2).
pub const MAX_ELEVATION_STEP: i32 = 1;

/// Melee/ranged base ranges (Chebyshev distance), spec §4.5 table.
pub const MELEE_RANGE: i32 = 1;
pub const SPEAR_MELEE_RANGE: i32 = 2;
pub const ARCHER_RANGE: i32 = 3;
pub const ARCHER_MIN_RANGE: i32 = 1;
pub const MANGONEL_RANGE: i32 = 4;
pub const MANGONEL_MIN_RANGE: i32 = 1;
pub const TREBUCHET_RANGE: i32 = 6;
pub const TREBUCHET_MIN_RANGE: i32 = 2;

/// Siege multiplier against building/wall targets (spec §4.5, glossary).
pub const SIEGE_DAMAGE_MULTIPLIER: i32 = 3;

/// Base attack damage per unit class (spec §3 `Thing.attackDamage` default
/// table; buildings/production may override per-instance).
pub const BASE_ATTACK_DAMAGE: i32 = 4;

/// Base structure auto-fire damage and range (spec §4.5 "Auto-fire").
pub const STRUCTURE_FIRE_DAMAGE: i32 = 5;
pub const STRUCTURE_FIRE_RANGE: i32 = 6;
pub const STRUCTURE_FIRE_MIN_RANGE: i32 = 1;
pub const MURDER_HOLES_MIN_RANGE: i32 = 0;
pub const ARROWSLITS_DAMAGE_BONUS: i32 = 1;
pub const BALLISTICS_DAMAGE_BONUS: i32 = 1;
/// Extra auto-fire damage per garrisoned unit, up to the structure's
/// garrison capacity (spec §4.5 "Garrison bonus arrows").
pub const GARRISON_ARROW_BONUS_PER_UNIT: i32 = 1;

/// Monk conversion/heal constants (spec §4.5).
pub const MONK_MAX_FAITH: i32 = 100;
pub const MONK_CONVERSION_FAITH_COST: i32 = 40;
pub const MONK_FAITH_RECHARGE_RATE: i32 = 1;
pub const MONK_HEAL_AMOUNT: i32 = 10;

/// Construction / repair tunables (spec §4.9).
pub const CONSTRUCTION_HP_PER_ACTION: i32 = 1;
pub const REPAIR_HP_PER_ACTION: i32 = 2;
pub const PRODUCTION_QUEUE_MAX: usize = 5;

/// Multi-builder construction bonus table (spec §4.9, §9 open question:
/// floor of k=1→1.0, k=2→1.5, k=3→1.83, monotonically non-decreasing, <=2.5).
/// Indexed by `(builder_count - 1).min(len-1)`.
pub const CONSTRUCTION_BONUS_TABLE: [f32; 6] = [1.0, 1.5, 1.83, 2.1, 2.3, 2.5];

/// Market tunables (spec §4.10).
pub const MARKET_BASE_PRICE: i32 = 100;
pub const MARKET_MIN_PRICE: i32 = 20;
pub const MARKET_MAX_PRICE: i32 = 300;
pub const MARKET_SELL_PRICE_DECREASE: i32 = 3;
pub const MARKET_BUY_PRICE_INCREASE: i32 = 3;
pub const MARKET_PRICE_DECAY_RATE: i32 = 1;
pub const MARKET_TRADE_COOLDOWN_TICKS: u32 = 5;

/// Monastery relic income interval (spec §4.9).
pub const MONASTERY_RELIC_GOLD_INTERVAL: u64 = 50;
pub const MONASTERY_RELIC_GOLD_PER_RELIC: i32 = 1;

/// Spatial index auto-tuning interval, in ticks (spec §4.3, §9).
pub const SPATIAL_INDEX_RETUNE_INTERVAL: u64 = 64;
pub const SPATIAL_INDEX_MIN_CELL_SIZE: i32 = 4;
pub const SPATIAL_INDEX_MAX_CELL_SIZE: i32 = 32;

/// Per-tick multiplicative decay applied to tracked threat levels, and the
/// floor below which a tracked entry is dropped (spec §4.3 "threat tracking
/// with temporal decay").
pub const THREAT_DECAY_RATE: f32 = 0.95;
pub const THREAT_EPSILON: f32 = 0.01;

/// Observation window dimensions (spec §6).
pub const OBSERVATION_WIDTH: usize = 11;
pub const OBSERVATION_HEIGHT: usize = 11;
pub const OBSERVATION_LAYERS: usize = 8;

/// Victory condition evaluation interval for hold-based conditions
/// (Wonder/Relic/Hill), in ticks (spec §4.11).
pub const VICTORY_HOLD_INTERVAL: u64 = 1000;
