//! The thin embedding layer wrapping [`game_core::World`] (spec §6).

use game_core::types::constants::{MAP_AGENTS, MAP_ROOM_OBJECTS_TEAMS, OBSERVATION_HEIGHT, OBSERVATION_WIDTH};
use game_core::{EntityId, Observation, Position, StepResult, StockpileResource, TeamId, Thing, ThingKind, World};

use crate::config::EnvironmentConfig;
use crate::error::{EnvironmentError, Result};

/// Owns the [`World`], the episode's [`EnvironmentConfig`], and the episode
/// seed. `new`, `reset`, and `step` are its only mutating entry points,
/// matching the primary interface (spec §6) one-to-one — no hidden state
/// machine behind them.
pub struct Environment {
    world: World,
    config: EnvironmentConfig,
    seed: u64,
}

impl Environment {
    /// Deterministic constructor (spec §6 `newEnvironment(config, seed)`).
    pub fn new(config: EnvironmentConfig, seed: u64) -> Result<Self> {
        if config.max_steps == 0 {
            return Err(EnvironmentError::ZeroMaxSteps);
        }
        let mut env = Self {
            world: World::new(config.max_steps, config.victory_condition),
            config,
            seed,
        };
        env.apply_config();
        Ok(env)
    }

    /// Restarts the episode (spec §6 `reset()`, seed-deterministic). Map and
    /// biome generation belong to an external collaborator (spec §1), so this
    /// preserves the current grid/terrain and only despawns entities and
    /// re-seeds per-team economy state from `config`; populating the reset
    /// map with starting agents/buildings is the caller's job via
    /// [`Environment::world_mut`].
    pub fn reset(&mut self) {
        let grid = std::mem::replace(&mut self.world.grid, game_core::Grid::blank());
        self.world = World::new(self.config.max_steps, self.config.victory_condition);
        self.world.grid = grid;
        self.apply_config();
    }

    fn apply_config(&mut self) {
        self.world.stockpiles = self.config.initial_stockpiles;
        self.world.civ_bonuses = self.config.initial_civ_bonuses;
    }

    /// Advances the world by exactly one tick (spec §6 `step(actions)`).
    pub fn step(&mut self, actions: &[u8; MAP_AGENTS]) -> StepResult {
        game_core::step(&mut self.world, actions)
    }

    pub fn seed(&self) -> u64 {
        self.seed
    }

    pub fn config(&self) -> &EnvironmentConfig {
        &self.config
    }

    /// Escape hatch for a caller that needs to populate a freshly reset map
    /// (spec §1: scenario/map setup is out of this crate's scope).
    pub fn world_mut(&mut self) -> &mut World {
        &mut self.world
    }

    pub fn world(&self) -> &World {
        &self.world
    }

    /// Foreground occupant at `pos` (spec §6 `getThing(pos)`).
    pub fn get_thing(&self, pos: Position) -> Option<&Thing> {
        self.world.get_thing(pos)
    }

    /// Agent slot `agent_id`'s thing, or `None` if currently dead (spec §6
    /// `agents[i]`).
    pub fn agent(&self, agent_id: u32) -> Option<&Thing> {
        self.world.entities.agent_slot_id(agent_id).and_then(|id| self.world.entities.thing(id))
    }

    /// Team `team`'s current count of `resource` (spec §6 `stockpileCount`).
    pub fn stockpile_count(&self, team: TeamId, resource: StockpileResource) -> u32 {
        self.world.stockpile(team).get(resource)
    }

    /// Whether `pos` is currently visible to `team` (spec §6 `isRevealed`):
    /// true if any of the team's living agents has `pos` within its
    /// observation window (Chebyshev distance within half the window
    /// extent). The spec leaves fog-of-war unspecified beyond "read-only
    /// introspection"; this is the natural reading given observations are
    /// already windowed per agent.
    pub fn is_revealed(&self, team: TeamId, pos: Position) -> bool {
        let half_extent = (OBSERVATION_WIDTH.max(OBSERVATION_HEIGHT) / 2) as i32;
        self.world
            .entities
            .iter()
            .any(|t| t.team == team && t.is_agent() && t.is_alive() && t.pos.chebyshev_distance(pos) <= half_extent)
    }

    /// Every living entity of `kind` (spec §6 `thingsByKind[k]`).
    pub fn things_by_kind(&self, kind: ThingKind) -> &[EntityId] {
        self.world.entities.things_of_kind(kind)
    }

    /// Agent `agent_id`'s most recent published observation window.
    pub fn observation(&self, agent_id: u32) -> Option<&Observation> {
        self.world.observation(agent_id)
    }

    /// Spec §6 `terminated[i]`.
    pub fn terminated(&self, agent_id: u32) -> f32 {
        self.world.terminated[agent_id as usize % MAP_AGENTS]
    }

    /// Spec §6 `truncated[i]`.
    pub fn truncated(&self, agent_id: u32) -> f32 {
        self.world.truncated[agent_id as usize % MAP_AGENTS]
    }

    /// Spec §6 `victoryWinner`.
    pub fn victory_winner(&self) -> Option<u8> {
        self.world.victory_winner
    }

    pub fn should_reset(&self) -> bool {
        self.world.should_reset
    }
}

const _: () = assert!(MAP_ROOM_OBJECTS_TEAMS <= u8::MAX as usize);

#[cfg(test)]
mod tests {
    use super::*;
    use game_core::types::ItemKind;

    fn test_config() -> EnvironmentConfig {
        EnvironmentConfig {
            max_steps: 100,
            ..EnvironmentConfig::default()
        }
    }

    #[test]
    fn new_rejects_zero_max_steps() {
        let config = EnvironmentConfig { max_steps: 0, ..EnvironmentConfig::default() };
        assert!(Environment::new(config, 1).is_err());
    }

    #[test]
    fn new_seeds_stockpiles_from_config() {
        let mut config = test_config();
        config.initial_stockpiles[0].wood = 200;
        let env = Environment::new(config, 1).unwrap();
        assert_eq!(env.stockpile_count(TeamId(0), StockpileResource::Wood), 200);
    }

    #[test]
    fn step_with_no_agents_just_advances_the_tick() {
        let mut env = Environment::new(test_config(), 7).unwrap();
        let actions = [0u8; MAP_AGENTS];
        let result = env.step(&actions);
        assert!(!result.should_reset);
        assert_eq!(env.world().current_step, 1);
    }

    #[test]
    fn reset_despawns_entities_but_keeps_the_grid() {
        let mut env = Environment::new(test_config(), 3).unwrap();
        env.world_mut().grid.set_terrain(Position::new(1, 1), game_core::TerrainKind::Water);
        let id = env.world_mut().entities.allocate_id();
        env.world_mut().spawn(Thing::new_agent(id, 0, TeamId(0), Position::new(1, 1), 25, 3));

        env.reset();

        assert!(env.agent(0).is_none());
        assert_eq!(env.world().grid.terrain_at(Position::new(1, 1)), Some(game_core::TerrainKind::Water));
    }

    #[test]
    fn is_revealed_is_true_near_a_living_teammate_and_false_elsewhere() {
        let mut env = Environment::new(test_config(), 1).unwrap();
        let id = env.world_mut().entities.allocate_id();
        env.world_mut().spawn(Thing::new_agent(id, 0, TeamId(0), Position::new(10, 10), 25, 3));

        assert!(env.is_revealed(TeamId(0), Position::new(11, 11)));
        assert!(!env.is_revealed(TeamId(0), Position::new(90, 90)));
        assert!(!env.is_revealed(TeamId(1), Position::new(10, 10)));
    }

    #[test]
    fn stockpile_count_ignores_unrelated_items() {
        let env = Environment::new(test_config(), 1).unwrap();
        let _ = ItemKind::Wood;
        assert_eq!(env.stockpile_count(TeamId(0), StockpileResource::Gold), 0);
    }
}
