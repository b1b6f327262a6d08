//! Per-agent windowed observation layers (spec §6 "Observation publication").
//!
//! Each agent's observation is an `OBSERVATION_WIDTH x OBSERVATION_HEIGHT`
//! window of named feature layers centered on its current position, recomputed
//! once per tick (spec §5 phase 10). The feature name→id mapping
//! ([`ObservationLayer`]'s declaration order) is fixed for the lifetime of the
//! crate, satisfying the "stable within an episode" requirement trivially.

use strum::{EnumCount, EnumIter};

use crate::state::world::World;
use crate::types::constants::{OBSERVATION_HEIGHT, OBSERVATION_LAYERS, OBSERVATION_WIDTH};
use crate::types::{EntityId, Position};

/// A named feature channel of an [`Observation`] window (spec §6 "feature
/// name -> id mapping").
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, EnumIter, EnumCount)]
pub enum ObservationLayer {
    /// `TerrainKind` discriminant of the cell.
    Terrain,
    /// Signed elevation of the cell.
    Elevation,
    /// `ThingKind` discriminant of the foreground occupant, or `0` if empty.
    ForegroundKind,
    /// Foreground occupant's `TeamId`, or `0` if empty/neutral.
    Team,
    /// Foreground occupant's current hp, or `0` if empty.
    Hp,
    /// Foreground occupant's `UnitClass` discriminant + 1, or `0` if not a
    /// unit.
    UnitClass,
    /// Remaining inventory total of a resource node occupying the cell.
    Resource,
    /// Decayed threat level tracked against the foreground occupant (spec
    /// §4.3 "threat tracking with temporal decay").
    Threat,
}

const _: () = assert!(ObservationLayer::COUNT == OBSERVATION_LAYERS);

/// One agent's windowed view: `OBSERVATION_WIDTH * OBSERVATION_HEIGHT` cells,
/// one `f32` per [`ObservationLayer`], centered on the agent's position at the
/// tick it was built. Cells outside map bounds read as `0.0` on every layer.
#[derive(Clone, Debug)]
pub struct Observation {
    cells: Vec<f32>,
}

impl Observation {
    fn blank() -> Self {
        Self {
            cells: vec![0.0; OBSERVATION_WIDTH * OBSERVATION_HEIGHT * OBSERVATION_LAYERS],
        }
    }

    fn index(layer: ObservationLayer, dx: usize, dy: usize) -> usize {
        (layer as usize * OBSERVATION_HEIGHT + dy) * OBSERVATION_WIDTH + dx
    }

    /// Reads the value of `layer` at window-local offset `(dx, dy)`, where
    /// `(OBSERVATION_WIDTH/2, OBSERVATION_HEIGHT/2)` is the agent's own cell.
    pub fn get(&self, layer: ObservationLayer, dx: usize, dy: usize) -> f32 {
        self.cells[Self::index(layer, dx, dy)]
    }

    fn set(&mut self, layer: ObservationLayer, dx: usize, dy: usize, value: f32) {
        let idx = Self::index(layer, dx, dy);
        self.cells[idx] = value;
    }

    pub fn width(&self) -> usize {
        OBSERVATION_WIDTH
    }

    pub fn height(&self) -> usize {
        OBSERVATION_HEIGHT
    }
}

const HALF_WIDTH: i32 = (OBSERVATION_WIDTH / 2) as i32;
const HALF_HEIGHT: i32 = (OBSERVATION_HEIGHT / 2) as i32;

/// Builds `agent_entity`'s windowed observation centered on its current
/// position. Returns `None` if the entity no longer exists (dead this tick,
/// before respawn).
pub fn build(world: &World, agent_entity: EntityId) -> Option<Observation> {
    let agent = world.entities.thing(agent_entity)?;
    let center = agent.pos;
    let mut obs = Observation::blank();

    for dy in 0..OBSERVATION_HEIGHT {
        for dx in 0..OBSERVATION_WIDTH {
            let world_pos = Position::new(
                center.x + dx as i32 - HALF_WIDTH,
                center.y + dy as i32 - HALF_HEIGHT,
            );
            if !world.grid.is_in_bounds(world_pos) {
                continue;
            }
            if let Some(terrain) = world.grid.terrain_at(world_pos) {
                obs.set(ObservationLayer::Terrain, dx, dy, terrain as usize as f32);
            }
            if let Some(elevation) = world.grid.elevation_at(world_pos) {
                obs.set(ObservationLayer::Elevation, dx, dy, elevation as f32);
            }
            if let Some(thing) = world.get_thing(world_pos) {
                obs.set(ObservationLayer::ForegroundKind, dx, dy, thing.kind as usize as f32);
                obs.set(ObservationLayer::Team, dx, dy, thing.team.0 as f32);
                obs.set(ObservationLayer::Hp, dx, dy, thing.hp as f32);
                if let Some(unit_class) = thing.unit_class {
                    obs.set(ObservationLayer::UnitClass, dx, dy, unit_class as usize as f32 + 1.0);
                }
                if thing.kind.is_resource_node() {
                    let total: u32 = thing.inventory.iter().map(|(_, amount)| amount).sum();
                    obs.set(ObservationLayer::Resource, dx, dy, total as f32);
                }
                obs.set(
                    ObservationLayer::Threat,
                    dx,
                    dy,
                    world.spatial_index.threat_level(thing.id),
                );
            }
        }
    }
    Some(obs)
}

/// Recomputes every fielded agent's observation window (spec §5 phase 10).
pub fn publish_all(world: &mut World) {
    for agent_id in 0..crate::types::constants::MAP_AGENTS as u32 {
        let observation = world
            .entities
            .agent_slot_id(agent_id)
            .and_then(|entity_id| build(world, entity_id));
        world.observations[agent_id as usize] = observation;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::thing::Thing;
    use crate::types::TeamId;

    #[test]
    fn centers_the_window_on_the_agent_and_reads_its_own_cell() {
        let mut world = World::new(1000, crate::victory::VictoryCondition::Regicide);
        let id = world.entities.allocate_id();
        let agent = Thing::new_agent(id, 0, TeamId(0), Position::new(20, 20), 25, 3);
        world.spawn(agent);

        let obs = build(&world, id).unwrap();
        let center = (OBSERVATION_WIDTH / 2, OBSERVATION_HEIGHT / 2);
        assert_eq!(
            obs.get(ObservationLayer::ForegroundKind, center.0, center.1),
            crate::types::ThingKind::Agent as usize as f32
        );
        assert_eq!(obs.get(ObservationLayer::Hp, center.0, center.1), 25.0);
    }

    #[test]
    fn cells_outside_map_bounds_stay_zero() {
        let mut world = World::new(1000, crate::victory::VictoryCondition::Regicide);
        let id = world.entities.allocate_id();
        let agent = Thing::new_agent(id, 0, TeamId(0), Position::new(0, 0), 25, 3);
        world.spawn(agent);

        let obs = build(&world, id).unwrap();
        assert_eq!(obs.get(ObservationLayer::Terrain, 0, 0), 0.0);
    }

    #[test]
    fn publish_all_fills_every_fielded_agent_slot() {
        let mut world = World::new(1000, crate::victory::VictoryCondition::Regicide);
        let id = world.entities.allocate_id();
        let agent = Thing::new_agent(id, 3, TeamId(0), Position::new(10, 10), 25, 3);
        world.spawn(agent);

        publish_all(&mut world);
        assert!(world.observations[3].is_some());
        assert!(world.observations[0].is_none());
    }
}
