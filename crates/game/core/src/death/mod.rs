//! Death, drops, resource depletion, and respawn (spec §4.6, §4.7).

use thiserror::Error;

use crate::error::{CoreError, ErrorSeverity};
use crate::state::thing::Thing;
use crate::state::world::World;
use crate::types::constants::{HOUSE_POP_CAP, MAP_HEIGHT, MAP_WIDTH, POP_CAP_BASE, RESOURCE_NODE_INITIAL, RESPAWN_UNIT_CLASS};
use crate::types::{EntityId, Position, TeamId, ThingKind};

/// Processes every thing at `hp <= 0` this tick: agents drop a corpse (or
/// skeleton) and their carried lanterns/relics, non-agents are simply
/// removed (spec §5 phase 7 "Death enforcement").
pub fn enforce_deaths(world: &mut World) {
    let dead: Vec<EntityId> = world
        .entities
        .iter()
        .filter(|t| !t.is_alive())
        .map(|t| t.id)
        .collect();

    for id in dead {
        let Some(thing) = world.entities.thing(id) else {
            continue;
        };
        if thing.is_agent() {
            process_agent_death(world, id);
        } else {
            release_garrison(world, id);
            world.despawn(id);
        }
    }
}

/// A destroyed building's garrisoned units are ejected to a free neighbour
/// cell, or destroyed outright if none exists — they cannot remain inside a
/// building that no longer exists.
fn release_garrison(world: &mut World, building_id: EntityId) {
    let Some(building) = world.entities.thing(building_id) else {
        return;
    };
    let pos = building.pos;
    let units: Vec<EntityId> = building.garrisoned_units.iter().copied().collect();
    for unit_id in units {
        if crate::economy::production::eject_unit(world, pos, building_id, unit_id).is_err() {
            world.despawn(unit_id);
        }
    }
}

fn first_free_background_cell(world: &World, center: Position) -> Option<Position> {
    core::iter::once(center)
        .chain(center.neighbors8())
        .find(|&p| {
            p.in_bounds(MAP_WIDTH, MAP_HEIGHT) && world.grid.background_at(p).is_none()
        })
}

/// Spawns a corpse (inventory carried) or skeleton (food-only/empty
/// inventory) at an agent's death position, and scatters any carried
/// lanterns/relics to adjacent free cells (spec §4.6 "Death drops").
fn process_agent_death(world: &mut World, agent_id: EntityId) {
    let Some(agent) = world.entities.thing(agent_id) else {
        return;
    };
    let death_pos = agent.pos;
    let team = agent.team;
    let inventory = agent.inventory.clone();
    let lanterns = agent.lanterns;
    let relics = agent.relics;
    let is_food_only = inventory.is_food_only();

    world.despawn(agent_id);

    if !death_pos.is_off_grid() {
        let kind = if is_food_only {
            ThingKind::Skeleton
        } else {
            ThingKind::Corpse
        };
        let drop_id = world.entities.allocate_id();
        let mut drop = Thing::new_static(drop_id, kind, death_pos, 1);
        drop.team = team;
        drop.inventory = inventory;
        world.spawn(drop);
    }

    for _ in 0..lanterns {
        if let Some(cell) = first_free_background_cell(world, death_pos) {
            let id = world.entities.allocate_id();
            let lantern = Thing::new_static(id, ThingKind::Lantern, cell, 1);
            world.spawn(lantern);
        }
    }
    for _ in 0..relics {
        if let Some(cell) = first_free_background_cell(world, death_pos) {
            let id = world.entities.allocate_id();
            let relic = Thing::new_static(id, ThingKind::Relic, cell, 1);
            world.spawn(relic);
        }
    }
}

/// A standing Corpse with no remaining carried items degrades into a
/// Skeleton (spec §4.6 "Corpse degradation rule"). Run periodically from the
/// tick orchestrator or left to decay the first time its inventory empties
/// via harvesting.
pub fn degrade_corpses(world: &mut World) {
    let corpses: Vec<EntityId> = world
        .entities
        .things_of_kind(ThingKind::Corpse)
        .to_vec();
    for id in corpses {
        let Some(corpse) = world.entities.thing(id) else {
            continue;
        };
        if corpse.inventory.is_food_only() {
            if let Some(corpse) = world.entities.thing_mut(id) {
                corpse.kind = ThingKind::Skeleton;
            }
        }
    }
}

/// Harvests `amount` from a resource node, degrading `Tree`/`Pine` into a
/// `Stump` on depletion (one extra harvest) and vanishing a depleted `Stump`
/// or any other exhausted node (spec §4.6 "Depletion law").
pub fn harvest_resource_node(world: &mut World, node_id: EntityId, item: crate::types::ItemKind, amount: u32) -> u32 {
    let Some(node) = world.entities.thing_mut(node_id) else {
        return 0;
    };
    if !node.kind.is_resource_node() {
        return 0;
    }
    let taken = node.inventory.remove(item, amount);
    let depleted = node.inventory.is_empty();
    let was_tree = node.kind.is_tree();
    let kind = node.kind;

    if depleted {
        if was_tree {
            if let Some(node) = world.entities.thing_mut(node_id) {
                node.kind = ThingKind::Stump;
                node.inventory.set(item, RESOURCE_NODE_INITIAL);
            }
        } else if kind == ThingKind::Stump {
            world.despawn(node_id);
        } else {
            world.despawn(node_id);
        }
    }
    taken
}

#[derive(Debug, Error)]
pub enum RespawnError {
    #[error("population is at cap")]
    PopulationCapped,
    #[error("no altar with hearts available")]
    NoAltar,
    #[error("no free cell near the altar")]
    NoFreeCell,
}

impl CoreError for RespawnError {
    fn severity(&self) -> ErrorSeverity {
        ErrorSeverity::Recoverable
    }
}

/// Population cap: a flat base allowance plus per-House and per-Castle
/// contribution from constructed, team-owned buildings (spec §4.7).
pub fn population_cap(world: &World, team: TeamId) -> u32 {
    let mut cap = POP_CAP_BASE;
    for thing in world.entities.iter() {
        if thing.team == team && thing.constructed {
            if thing.kind == ThingKind::House {
                cap += HOUSE_POP_CAP;
            } else {
                cap += thing.kind.population_contribution();
            }
        }
    }
    cap
}

pub fn population_current(world: &World, team: TeamId) -> u32 {
    world
        .entities
        .iter()
        .filter(|t| t.is_agent() && t.is_alive() && t.team == team)
        .count() as u32
}

/// Respawns `agent_id` at its home altar, spending one heart, subject to the
/// team's population cap (spec §4.7 "Respawn & Population Cap").
pub fn try_respawn(world: &mut World, agent_id: u32, team: TeamId, home_altar: Position) -> Result<EntityId, RespawnError> {
    if population_current(world, team) >= population_cap(world, team) {
        return Err(RespawnError::PopulationCapped);
    }
    let altar_id = world
        .get_thing(home_altar)
        .filter(|t| t.kind == ThingKind::Altar && t.team == team && t.hearts > 0)
        .map(|t| t.id)
        .ok_or(RespawnError::NoAltar)?;

    let spawn_cell = core::iter::once(home_altar)
        .chain(home_altar.neighbors8())
        .find(|&p| p.in_bounds(MAP_WIDTH, MAP_HEIGHT) && world.grid.foreground_at(p).is_none())
        .ok_or(RespawnError::NoFreeCell)?;

    if let Some(altar) = world.entities.thing_mut(altar_id) {
        altar.hearts -= 1;
    }

    let id = world.entities.allocate_id();
    let base_hp = crate::economy::production::unit_base_hp(RESPAWN_UNIT_CLASS);
    let base_attack = crate::economy::production::unit_base_attack(RESPAWN_UNIT_CLASS);
    let bonuses = *world.civ_bonuses(team);
    let max_hp = crate::economy::production::round_half_up(base_hp as f32 * bonuses.unit_hp_multiplier) as i32;
    let attack = crate::economy::production::round_half_up(base_attack as f32 * bonuses.attack_multiplier) as i32;
    let mut thing = Thing::new_agent(id, agent_id, team, spawn_cell, max_hp, attack);
    thing.home_altar = home_altar;
    world.spawn(thing);
    Ok(id)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::ItemKind;

    #[test]
    fn food_only_inventory_drops_skeleton_not_corpse() {
        let mut world = World::new(1000, crate::victory::VictoryCondition::Regicide);
        let id = world.entities.allocate_id();
        let mut agent = Thing::new_agent(id, 0, TeamId(0), Position::new(5, 5), 25, 3);
        agent.inventory.add(ItemKind::Wheat, 5);
        agent.hp = 0;
        world.spawn(agent);

        enforce_deaths(&mut world);
        let drop = world.get_background_thing(Position::new(5, 5)).unwrap();
        assert_eq!(drop.kind, ThingKind::Skeleton);
    }

    #[test]
    fn non_food_inventory_drops_corpse() {
        let mut world = World::new(1000, crate::victory::VictoryCondition::Regicide);
        let id = world.entities.allocate_id();
        let mut agent = Thing::new_agent(id, 0, TeamId(0), Position::new(5, 5), 25, 3);
        agent.inventory.add(ItemKind::Wood, 5);
        agent.hp = 0;
        world.spawn(agent);

        enforce_deaths(&mut world);
        let drop = world.get_background_thing(Position::new(5, 5)).unwrap();
        assert_eq!(drop.kind, ThingKind::Corpse);
    }

    #[test]
    fn depleted_tree_becomes_stump_then_vanishes() {
        let mut world = World::new(1000, crate::victory::VictoryCondition::Regicide);
        let id = world.entities.allocate_id();
        let mut tree = Thing::new_static(id, ThingKind::Tree, Position::new(3, 3), 1);
        tree.inventory.set(ItemKind::Wood, 2);
        world.spawn(tree);

        harvest_resource_node(&mut world, id, ItemKind::Wood, 2);
        assert_eq!(world.entities.thing(id).unwrap().kind, ThingKind::Stump);

        harvest_resource_node(&mut world, id, ItemKind::Wood, RESOURCE_NODE_INITIAL);
        assert!(world.entities.thing(id).is_none());
    }

    #[test]
    fn population_cap_grows_with_houses() {
        let mut world = World::new(1000, crate::victory::VictoryCondition::Regicide);
        assert_eq!(population_cap(&world, TeamId(0)), POP_CAP_BASE);
        let house_id = world.entities.allocate_id();
        let mut house = Thing::new_building(house_id, ThingKind::House, TeamId(0), Position::new(2, 2), 150);
        house.constructed = true;
        world.spawn(house);
        assert_eq!(population_cap(&world, TeamId(0)), POP_CAP_BASE + HOUSE_POP_CAP);
    }
}
