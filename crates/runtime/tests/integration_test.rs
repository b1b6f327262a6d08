//! End-to-end multi-tick scenario tests driving [`Environment`] the way an
//! external decision controller would: construct, populate a scenario
//! directly on the world (map/scenario setup is out of this crate's scope),
//! then call `step` repeatedly and read back the published state.

use game_core::types::constants::MAP_AGENTS;
use game_core::{Position, StockpileResource, TeamId, Thing, ThingKind, UnitClass};
use runtime::{Environment, EnvironmentConfig};

fn noop_actions() -> [u8; MAP_AGENTS] {
    [0u8; MAP_AGENTS]
}

#[test]
fn an_agent_walks_toward_a_town_center_and_deposits_gathered_wood() {
    let config = EnvironmentConfig { max_steps: 50, ..EnvironmentConfig::default() };
    let mut env = Environment::new(config, 1).unwrap();

    let town_center_id = env.world_mut().entities.allocate_id();
    let mut town_center =
        Thing::new_building(town_center_id, ThingKind::TownCenter, TeamId(0), Position::new(10, 10), 1500);
    town_center.constructed = true;
    env.world_mut().spawn(town_center);

    let agent_id = env.world_mut().entities.allocate_id();
    let mut agent = Thing::new_agent(agent_id, 0, TeamId(0), Position::new(9, 10), 25, 3);
    agent.inventory.set(game_core::ItemKind::Wood, 15);
    env.world_mut().spawn(agent);

    // Use verb is index 5, arg 3 faces east toward the TownCenter.
    let mut actions = noop_actions();
    actions[0] = 5 * 16 + 3;

    env.step(&actions);

    assert_eq!(env.agent(0).unwrap().inventory.get(game_core::ItemKind::Wood), 0);
    assert_eq!(env.stockpile_count(TeamId(0), StockpileResource::Wood), 15);
}

#[test]
fn an_episode_truncates_once_max_steps_is_reached() {
    let config = EnvironmentConfig { max_steps: 3, ..EnvironmentConfig::default() };
    let mut env = Environment::new(config, 42).unwrap();
    let actions = noop_actions();

    for _ in 0..2 {
        let result = env.step(&actions);
        assert!(!result.should_reset);
    }
    let result = env.step(&actions);
    assert!(result.should_reset);
    assert!(result.truncated.iter().all(|&t| t > 0.0));
}

#[test]
fn regicide_ends_the_episode_once_only_one_teams_king_survives() {
    let config = EnvironmentConfig {
        max_steps: 1000,
        victory_condition: game_core::VictoryCondition::Regicide,
        ..EnvironmentConfig::default()
    };
    let mut env = Environment::new(config, 5).unwrap();

    let king_a = env.world_mut().entities.allocate_id();
    let mut a = Thing::new_agent(king_a, 0, TeamId(0), Position::new(1, 1), 50, 3);
    a.unit_class = Some(UnitClass::King);
    env.world_mut().spawn(a);

    let king_b = env.world_mut().entities.allocate_id();
    let mut b = Thing::new_agent(king_b, 16, TeamId(1), Position::new(90, 90), 50, 3);
    b.unit_class = Some(UnitClass::King);
    env.world_mut().spawn(b);
    env.world_mut().entities.thing_mut(king_b).unwrap().hp = 0;

    let actions = noop_actions();
    let result = env.step(&actions);

    assert!(result.should_reset);
    assert_eq!(env.victory_winner(), Some(0));
    assert_eq!(result.rewards[0], 1.0);
    assert_eq!(result.rewards[16], -1.0);
}

#[test]
fn reset_clears_terminated_entities_while_preserving_the_grid() {
    let config = EnvironmentConfig { max_steps: 10, ..EnvironmentConfig::default() };
    let mut env = Environment::new(config, 9).unwrap();
    env.world_mut().grid.set_terrain(Position::new(2, 2), game_core::TerrainKind::Water);

    let agent_id = env.world_mut().entities.allocate_id();
    env.world_mut().spawn(Thing::new_agent(agent_id, 0, TeamId(0), Position::new(2, 2), 25, 3));

    env.reset();

    assert!(env.agent(0).is_none());
    assert_eq!(env.world().grid.terrain_at(Position::new(2, 2)), Some(game_core::TerrainKind::Water));
    assert_eq!(env.world().current_step, 0);
}
