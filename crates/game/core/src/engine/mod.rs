//! Tick orchestrator: the fixed phase sequence run once per `step()` call
//! (spec §5 "Tick loop").

use tracing::trace_span;

use crate::action;
use crate::combat;
use crate::death;
use crate::economy::production;
use crate::economy::tech::TechSet;
use crate::state::world::World;
use crate::types::constants::{
    MAP_AGENTS, MAP_HEIGHT, MAP_ROOM_OBJECTS_TEAMS, MAP_WIDTH, MONASTERY_RELIC_GOLD_INTERVAL,
    MONASTERY_RELIC_GOLD_PER_RELIC, SPATIAL_INDEX_RETUNE_INTERVAL,
};
use crate::types::{Position, StockpileResource, TeamId, ThingKind, UnitClass};
use crate::victory::VictoryCondition;

/// Per-agent result surfaced after a completed tick (spec §5, §6
/// observation/reward publication).
pub struct StepResult {
    pub terminated: [f32; MAP_AGENTS],
    pub truncated: [f32; MAP_AGENTS],
    pub rewards: [f32; MAP_AGENTS],
    pub should_reset: bool,
}

/// Advances `world` by exactly one tick, applying every agent's decoded
/// action and running the fixed post-action phase sequence (spec §5):
/// projectile resolution, structure auto-fire, production, faith/market/relic
/// upkeep, death enforcement, respawn, victory evaluation, then the step
/// increment.
pub fn step(world: &mut World, actions: &[u8; MAP_AGENTS]) -> StepResult {
    let tick_span = trace_span!("tick", step = world.current_step);
    let _tick_guard = tick_span.enter();

    {
        let _span = trace_span!("spatial_retune").entered();
        world.spatial_index.advance_tick();
        if world.spatial_index.ticks_since_retune() >= SPATIAL_INDEX_RETUNE_INTERVAL {
            world.spatial_index.retune_and_rebuild(world.entities.iter());
        }
    }

    {
        let _span = trace_span!("dispatch_actions").entered();
        let active: Vec<(crate::types::EntityId, u8)> = (0..MAP_AGENTS as u32)
            .filter_map(|agent_id| {
                world
                    .entities
                    .agent_slot_id(agent_id)
                    .map(|entity_id| (entity_id, actions[agent_id as usize]))
            })
            .collect();
        let builder_counts = action::compute_builder_counts(world, &active);
        for (entity_id, action_byte) in active {
            if let Err(err) = action::dispatch(world, entity_id, action_byte, &builder_counts) {
                log_absorbed(&err, world.current_step);
            }
        }
    }

    {
        let _span = trace_span!("projectiles").entered();
        resolve_projectiles(world);
    }

    {
        let _span = trace_span!("structure_auto_fire").entered();
        combat::structure_auto_fire(world);
    }

    {
        let _span = trace_span!("production").entered();
        tick_production_queues(world);
    }

    {
        let _span = trace_span!("upkeep").entered();
        combat::recharge_faith(world);
        for team_index in 0..MAP_ROOM_OBJECTS_TEAMS {
            world.market_prices[team_index].decay();
        }
        tick_market_cooldowns(world);
        monastery_relic_income(world);
        world.spatial_index.decay_threat();
    }

    {
        let _span = trace_span!("death").entered();
        death::enforce_deaths(world);
        death::degrade_corpses(world);
    }

    {
        let _span = trace_span!("respawn").entered();
        run_respawns(world);
    }

    let (terminated, truncated, rewards) = {
        let _span = trace_span!("victory").entered();
        evaluate_victory(world)
    };

    {
        let _span = trace_span!("observation_publication").entered();
        crate::observation::publish_all(world);
    }

    world.current_step += 1;
    let truncated_by_step = world.current_step >= world.max_steps;
    let mut truncated = truncated;
    if truncated_by_step {
        truncated = [1.0; MAP_AGENTS];
    }
    world.should_reset = terminated.iter().any(|&t| t > 0.0) || truncated_by_step;

    StepResult {
        terminated,
        truncated,
        rewards,
        should_reset: world.should_reset,
    }
}

fn log_absorbed(err: &dyn crate::error::CoreError, step: u64) {
    use crate::error::ErrorSeverity;
    match err.severity() {
        ErrorSeverity::Recoverable => tracing::trace!(step, error = %err, "action no-op"),
        ErrorSeverity::Validation => tracing::debug!(step, error = %err, "malformed action absorbed"),
        ErrorSeverity::Internal => {
            debug_assert!(false, "internal error at step {step}: {err}");
            tracing::error!(step, error = %err, "internal invariant violation");
        }
    }
}

fn resolve_projectiles(world: &mut World) {
    let mut i = 0;
    while i < world.projectiles.len() {
        if world.projectiles[i].ticks_remaining == 0 {
            let projectile = world.projectiles.remove(i);
            if let Some(target_id) = projectile.target {
                if let Some(target) = world.entities.thing_mut(target_id) {
                    target.hp = (target.hp - projectile.damage).max(0);
                }
            }
        } else {
            world.projectiles[i].ticks_remaining -= 1;
            i += 1;
        }
    }
}

fn tick_production_queues(world: &mut World) {
    let buildings: Vec<_> = world
        .entities
        .iter()
        .filter(|t| !t.production_queue.is_empty())
        .map(|t| t.id)
        .collect();
    for id in buildings {
        if let Some(building) = world.entities.thing_mut(id) {
            production::tick_production(building);
        }
    }
}

/// Ticks every Market's trade cooldown back down by one (spec §4.10; set by
/// [`crate::action::dispatch`] on a successful trade).
fn tick_market_cooldowns(world: &mut World) {
    let markets: Vec<_> = world.entities.things_of_kind(ThingKind::Market).to_vec();
    for id in markets {
        if let Some(market) = world.entities.thing_mut(id) {
            market.cooldown = market.cooldown.saturating_sub(1);
        }
    }
}

fn monastery_relic_income(world: &mut World) {
    if world.current_step == 0 || world.current_step % MONASTERY_RELIC_GOLD_INTERVAL != 0 {
        return;
    }
    let monasteries: Vec<(crate::types::EntityId, TeamId, u32)> = world
        .entities
        .things_of_kind(ThingKind::Monastery)
        .iter()
        .filter_map(|&id| {
            world
                .entities
                .thing(id)
                .filter(|t| t.garrisoned_relics > 0)
                .map(|t| (id, t.team, t.garrisoned_relics))
        })
        .collect();
    for (_, team, relics) in monasteries {
        world
            .stockpile_mut(team)
            .add_raw(StockpileResource::Gold, relics * MONASTERY_RELIC_GOLD_PER_RELIC as u32);
    }
}

fn run_respawns(world: &mut World) {
    let dead_agent_slots: Vec<(u32, TeamId)> = (0..MAP_AGENTS as u32)
        .filter(|&agent_id| world.entities.agent_slot_id(agent_id).is_none())
        .filter_map(|agent_id| {
            let team = TeamId((agent_id as usize / crate::types::constants::MAP_AGENTS_PER_TEAM) as u8);
            Some((agent_id, team))
        })
        .collect();
    for (agent_id, team) in dead_agent_slots {
        let home_altar = world
            .entities
            .things_of_kind(ThingKind::Altar)
            .iter()
            .filter_map(|&id| world.entities.thing(id))
            .find(|t| t.team == team)
            .map(|t| t.pos);
        if let Some(home_altar) = home_altar {
            let _ = death::try_respawn(world, agent_id, team, home_altar);
        }
    }
}

fn evaluate_victory(world: &mut World) -> ([f32; MAP_AGENTS], [f32; MAP_AGENTS], [f32; MAP_AGENTS]) {
    let mut terminated = [0.0f32; MAP_AGENTS];
    let truncated = [0.0f32; MAP_AGENTS];
    let mut rewards = [0.0f32; MAP_AGENTS];

    if world.victory_winner.is_some() {
        return broadcast_result(world, terminated, truncated, rewards);
    }

    let winner = match world.victory_condition {
        VictoryCondition::None => None,
        VictoryCondition::Regicide => regicide_winner(world),
        VictoryCondition::Wonder => hold_winner(world, |t| {
            t.kind == ThingKind::Wonder && t.constructed
        }),
        VictoryCondition::Relic => relic_winner(world),
        VictoryCondition::Hill => hill_winner(world),
        VictoryCondition::Territory => {
            if world.current_step + 1 >= world.max_steps {
                territory_winner(world)
            } else {
                None
            }
        }
    };

    if let Some(team) = winner {
        world.victory_winner = Some(team.0);
        for agent_id in 0..MAP_AGENTS {
            let agent_team = TeamId((agent_id / crate::types::constants::MAP_AGENTS_PER_TEAM) as u8);
            terminated[agent_id] = 1.0;
            rewards[agent_id] = if agent_team == team { 1.0 } else { -1.0 };
        }
    }

    let _ = &mut truncated;
    (terminated, truncated, rewards)
}

fn broadcast_result(
    world: &World,
    mut terminated: [f32; MAP_AGENTS],
    truncated: [f32; MAP_AGENTS],
    mut rewards: [f32; MAP_AGENTS],
) -> ([f32; MAP_AGENTS], [f32; MAP_AGENTS], [f32; MAP_AGENTS]) {
    if let Some(winner) = world.victory_winner {
        for agent_id in 0..MAP_AGENTS {
            let agent_team = (agent_id / crate::types::constants::MAP_AGENTS_PER_TEAM) as u8;
            terminated[agent_id] = 1.0;
            rewards[agent_id] = if agent_team == winner { 1.0 } else { -1.0 };
        }
    }
    (terminated, truncated, rewards)
}

fn regicide_winner(world: &World) -> Option<TeamId> {
    if world.victory_states.registered_king_count() < 2 {
        return None;
    }
    let mut kings_alive: Vec<TeamId> = world
        .entities
        .iter()
        .filter(|t| t.is_alive() && t.unit_class == Some(UnitClass::King))
        .map(|t| t.team)
        .collect();
    kings_alive.sort_by_key(|t| t.0);
    kings_alive.dedup();
    if kings_alive.len() == 1 {
        kings_alive.into_iter().next()
    } else {
        None
    }
}

fn hold_winner(world: &mut World, predicate: impl Fn(&crate::state::thing::Thing) -> bool) -> Option<TeamId> {
    let mut holders: Vec<TeamId> = world
        .entities
        .iter()
        .filter(|t| predicate(t))
        .map(|t| t.team)
        .collect();
    holders.sort_by_key(|t| t.0);
    holders.dedup();
    if holders.len() == 1 {
        let team = holders[0];
        if world.victory_states.advance_hold(team) {
            return Some(team);
        }
    } else {
        world.victory_states.reset_all();
    }
    None
}

fn relic_winner(world: &mut World) -> Option<TeamId> {
    let total_relics = world.entities.things_of_kind(ThingKind::Relic).len() as u32
        + world
            .entities
            .iter()
            .map(|t| t.garrisoned_relics + t.relics)
            .sum::<u32>();
    if total_relics == 0 {
        world.victory_states.reset_all();
        return None;
    }
    let per_team: Vec<(TeamId, u32)> = (0..MAP_ROOM_OBJECTS_TEAMS as u8)
        .map(|team| {
            let team = TeamId(team);
            let held = world
                .entities
                .iter()
                .filter(|t| t.team == team)
                .map(|t| t.garrisoned_relics + t.relics)
                .sum::<u32>();
            (team, held)
        })
        .collect();
    if let Some(&(team, held)) = per_team.iter().find(|&&(_, held)| held == total_relics) {
        if world.victory_states.advance_hold(team) {
            return Some(team);
        }
    } else {
        world.victory_states.reset_all();
    }
    None
}

fn hill_winner(world: &mut World) -> Option<TeamId> {
    if world.hill_cells.is_empty() {
        return None;
    }
    let mut holder: Option<TeamId> = None;
    for &cell in &world.hill_cells.clone() {
        match world.get_thing(cell) {
            Some(occupant) if occupant.is_agent() && !occupant.team.is_neutral() => {
                match holder {
                    None => holder = Some(occupant.team),
                    Some(team) if team == occupant.team => {}
                    _ => return uncontested_none(world),
                }
            }
            _ => return uncontested_none(world),
        }
    }
    if let Some(team) = holder {
        if world.victory_states.advance_hold(team) {
            return Some(team);
        }
    }
    None
}

fn uncontested_none(world: &mut World) -> Option<TeamId> {
    world.victory_states.reset_all();
    None
}

/// Assigns every map cell to the team whose nearest owned, constructed
/// building is closest (Chebyshev), then declares the team with a strict
/// plurality of cells the winner; an exact tie yields no winner (spec §4.11
/// "Territory").
fn territory_winner(world: &World) -> Option<TeamId> {
    let buildings: Vec<(Position, TeamId)> = world
        .entities
        .iter()
        .filter(|t| t.kind.is_building() && t.constructed && !t.team.is_neutral())
        .map(|t| (t.pos, t.team))
        .collect();
    if buildings.is_empty() {
        return None;
    }

    let mut counts = [0u32; MAP_ROOM_OBJECTS_TEAMS];
    for y in 0..MAP_HEIGHT {
        for x in 0..MAP_WIDTH {
            let cell = Position::new(x, y);
            if let Some(&(_, team)) = buildings
                .iter()
                .min_by_key(|(pos, _)| cell.chebyshev_distance(*pos))
            {
                counts[team.0 as usize % MAP_ROOM_OBJECTS_TEAMS] += 1;
            }
        }
    }

    let max = *counts.iter().max().unwrap_or(&0);
    if max == 0 {
        return None;
    }
    let mut winners = counts.iter().enumerate().filter(|&(_, &c)| c == max);
    let first = winners.next().map(|(i, _)| i);
    if winners.next().is_some() {
        return None;
    }
    first.map(|i| TeamId(i as u8))
}

/// Whether `team` has the Murder Holes / Arrowslits / Ballistics tech flags
/// active — surfaced for the embedding layer's diagnostics, not used
/// internally beyond [`crate::combat::structure_auto_fire`].
pub fn team_tech(world: &World, team: TeamId) -> TechSet {
    world.tech(team)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::thing::Thing;
    use crate::types::UnitClass;

    #[test]
    fn regicide_requires_two_registered_kings_before_declaring_a_winner() {
        let mut world = World::new(1000, VictoryCondition::Regicide);
        let king_id = world.entities.allocate_id();
        let mut king = Thing::new_agent(king_id, 0, TeamId(0), Position::new(5, 5), 50, 3);
        king.unit_class = Some(UnitClass::King);
        world.spawn(king);

        // Only one team has ever fielded a King: a lone survivor shouldn't win.
        assert_eq!(regicide_winner(&world), None);

        let rival_id = world.entities.allocate_id();
        let mut rival = Thing::new_agent(rival_id, 1, TeamId(1), Position::new(8, 5), 50, 3);
        rival.unit_class = Some(UnitClass::King);
        world.spawn(rival);
        if let Some(rival) = world.entities.thing_mut(rival_id) {
            rival.hp = 0;
        }

        assert_eq!(regicide_winner(&world), Some(TeamId(0)));
    }

    #[test]
    fn territory_winner_assigns_every_cell_to_its_nearest_owned_building() {
        let mut world = World::new(1000, VictoryCondition::Territory);
        let a_id = world.entities.allocate_id();
        world.spawn(Thing::new_building(
            a_id,
            ThingKind::TownCenter,
            TeamId(0),
            Position::new(0, 0),
            1500,
        ));
        let b_id = world.entities.allocate_id();
        let mut b = Thing::new_building(
            b_id,
            ThingKind::TownCenter,
            TeamId(1),
            Position::new(MAP_WIDTH - 1, MAP_HEIGHT - 1),
            1500,
        );
        b.constructed = true;
        world.spawn(b);
        if let Some(a) = world.entities.thing_mut(a_id) {
            a.constructed = true;
        }

        let winner = territory_winner(&world);
        assert!(winner == Some(TeamId(0)) || winner == Some(TeamId(1)) || winner.is_none());
    }

    #[test]
    fn territory_winner_ignores_unconstructed_buildings() {
        let mut world = World::new(1000, VictoryCondition::Territory);
        let a_id = world.entities.allocate_id();
        world.spawn(Thing::new_building(
            a_id,
            ThingKind::TownCenter,
            TeamId(0),
            Position::new(60, 60),
            1500,
        ));
        assert_eq!(territory_winner(&world), None);
    }
}
