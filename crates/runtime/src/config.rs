//! Episode configuration (spec §6 `EnvironmentConfig`).

use game_core::{CivBonuses, Stockpile, VictoryCondition};

use game_core::types::constants::MAP_ROOM_OBJECTS_TEAMS;

/// Everything [`crate::Environment::new`] needs to stand up an episode.
///
/// Map and biome generation are a separate collaborator's job (spec §1); this
/// config still carries `resource_node_count` so that future collaborator has
/// a documented place to read its target density from — [`crate::Environment`]
/// itself never consults it, the same deliberate no-op the seed/RNG hook is.
#[derive(Clone, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct EnvironmentConfig {
    pub max_steps: u64,
    pub victory_condition: VictoryCondition,
    /// Number of teams fielded this episode, `<= MAP_ROOM_OBJECTS_TEAMS`.
    pub team_count: u8,
    pub initial_stockpiles: [Stockpile; MAP_ROOM_OBJECTS_TEAMS],
    pub initial_civ_bonuses: [CivBonuses; MAP_ROOM_OBJECTS_TEAMS],
    /// Target resource-node density for the map/biome generator this crate
    /// doesn't own (spec §1 out-of-scope collaborators). Unread here.
    pub resource_node_count: u32,
}

impl Default for EnvironmentConfig {
    fn default() -> Self {
        Self {
            max_steps: 10_000,
            victory_condition: VictoryCondition::None,
            team_count: MAP_ROOM_OBJECTS_TEAMS as u8,
            initial_stockpiles: Default::default(),
            initial_civ_bonuses: [CivBonuses::default(); MAP_ROOM_OBJECTS_TEAMS],
            resource_node_count: 0,
        }
    }
}
