//! Per-team tech set and civ bonus multipliers (spec §4.13 expansion,
//! grounded on `game-core::stats`'s stored-base/derived-effective layering —
//! without importing its six-attribute RPG stat model, which has no
//! counterpart here).

use bitflags::bitflags;

bitflags! {
    /// Researched technologies gating structure auto-fire modifiers (spec
    /// §4.5). Mutated only by the external research action named in spec
    /// §4.13 — this core only ever reads it.
    #[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
    #[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
    pub struct TechSet: u32 {
        /// Lowers structure auto-fire min range to 0.
        const MURDER_HOLES = 1 << 0;
        /// +1 structure auto-fire damage.
        const ARROWSLITS   = 1 << 1;
        /// +1 structure auto-fire damage against archer-class attackers only.
        const BALLISTICS    = 1 << 2;
    }
}

/// Static, data-only per-team multiplier table (spec §4.13). Populated at
/// `reset()` from `EnvironmentConfig` and never mutated mid-episode.
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct CivBonuses {
    pub gather_rate_multiplier: f32,
    pub wood_cost_multiplier: f32,
    pub food_cost_multiplier: f32,
    pub attack_multiplier: f32,
    pub building_hp_multiplier: f32,
    pub unit_hp_multiplier: f32,
}

impl Default for CivBonuses {
    fn default() -> Self {
        Self {
            gather_rate_multiplier: 1.0,
            wood_cost_multiplier: 1.0,
            food_cost_multiplier: 1.0,
            attack_multiplier: 1.0,
            building_hp_multiplier: 1.0,
            unit_hp_multiplier: 1.0,
        }
    }
}
