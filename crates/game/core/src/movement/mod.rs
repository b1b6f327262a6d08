//! Orientation, target-cell resolution, terrain traversal, and movement debt
//! (spec §4.2, §4.4).

use thiserror::Error;

use crate::error::{CoreError, ErrorSeverity};
use crate::state::world::World;
use crate::types::constants::{
    CLIFF_FALL_DAMAGE, MAP_HEIGHT, MAP_WIDTH, MAX_ELEVATION_STEP,
};
use crate::types::{EntityId, Orientation, Position, TerrainKind};

#[derive(Debug, Error)]
pub enum MovementError {
    #[error("actor has no movable body")]
    NoBody,
    #[error("target cell is out of bounds")]
    OutOfBounds,
    #[error("target cell is occupied")]
    Occupied,
    #[error("terrain blocks this unit class")]
    TerrainBlocked,
    #[error("elevation step exceeds the maximum")]
    ElevationBlocked,
    #[error("not enough accumulated movement this tick")]
    InsufficientDebt,
}

impl CoreError for MovementError {
    fn severity(&self) -> ErrorSeverity {
        ErrorSeverity::Recoverable
    }
}

/// Result of a successful move, so callers can attribute cliff-fall damage.
pub struct MoveOutcome {
    pub new_pos: Position,
    pub fall_damage: i32,
    /// Whether the road double-step (spec §4.4 step 6) also fired.
    pub double_stepped: bool,
}

/// Attempts one cardinal hop from `actor_id`'s current position in
/// `direction`, without consulting or mutating `movementDebt` (used both for
/// the primary hop's debt-free paths and for the road double-step's second
/// hop, spec §4.4 steps 4-7).
fn try_hop(
    world: &mut World,
    actor_id: EntityId,
    direction: Orientation,
) -> Result<(Position, TerrainKind, TerrainKind, i32), MovementError> {
    let (pos, is_water_unit) = {
        let actor = world.entities.thing(actor_id).ok_or(MovementError::NoBody)?;
        (
            actor.pos,
            actor.unit_class.map(|c| c.is_water_unit()).unwrap_or(false),
        )
    };

    let (dx, dy) = direction.unit_vector();
    let target = pos + (dx, dy);
    if !target.in_bounds(MAP_WIDTH, MAP_HEIGHT) {
        return Err(MovementError::OutOfBounds);
    }
    if world.grid.foreground_at(target).is_some() {
        return Err(MovementError::Occupied);
    }

    let target_terrain = world.grid.terrain_at(target).ok_or(MovementError::OutOfBounds)?;
    if !is_water_unit && target_terrain.is_blocked_for_land() {
        return Err(MovementError::TerrainBlocked);
    }
    if is_water_unit && !target_terrain.is_water() {
        return Err(MovementError::TerrainBlocked);
    }

    let origin_terrain = world.grid.terrain_at(pos).unwrap_or(target_terrain);
    let from_elev = world.grid.elevation_at(pos).unwrap_or(0) as i32;
    let to_elev = world.grid.elevation_at(target).unwrap_or(0) as i32;
    let diff = to_elev - from_elev;
    if diff.abs() > MAX_ELEVATION_STEP {
        return Err(MovementError::ElevationBlocked);
    }
    if diff > 0 && !origin_terrain.is_ramp_up_toward(direction) && !origin_terrain.is_road() {
        return Err(MovementError::ElevationBlocked);
    }
    let mut fall_damage = 0;
    if diff < 0 && !origin_terrain.is_ramp_down_toward(direction) && !target_terrain.is_road() {
        fall_damage = CLIFF_FALL_DAMAGE;
    }

    world.move_foreground(actor_id, target);
    if fall_damage > 0 {
        if let Some(actor) = world.entities.thing_mut(actor_id) {
            actor.hp = (actor.hp - fall_damage).max(0);
        }
    }
    Ok((target, origin_terrain, target_terrain, fall_damage))
}

/// Attempts to move `actor_id` one cell in `direction`, paying movement debt,
/// checking terrain/elevation traversal rules, and updating orientation
/// unconditionally even when the move itself is blocked (spec §4.4 "facing
/// always updates").
pub fn attempt_move(
    world: &mut World,
    actor_id: EntityId,
    direction: Orientation,
) -> Result<MoveOutcome, MovementError> {
    if let Some(actor) = world.entities.thing_mut(actor_id) {
        actor.orientation = direction;
    }

    // Step 3: debt accumulated from prior ticks' slow terrain skips exactly
    // one move, independent of this hop's own terrain (spec §4.4).
    {
        let actor = world.entities.thing_mut(actor_id).ok_or(MovementError::NoBody)?;
        if actor.movement_debt >= 1.0 {
            actor.movement_debt -= 1.0;
            return Err(MovementError::InsufficientDebt);
        }
    }

    let is_water_unit = world
        .entities
        .thing(actor_id)
        .and_then(|a| a.unit_class)
        .map(|c| c.is_water_unit())
        .unwrap_or(false);

    let (new_pos, origin_terrain, target_terrain, fall_damage) =
        try_hop(world, actor_id, direction)?;

    // Step 5: debt accrues from the origin cell's speed, never the water-unit
    // override (water units are immune to terrain debt, spec §4.4).
    if !is_water_unit {
        let actor = world.entities.thing_mut(actor_id).ok_or(MovementError::NoBody)?;
        actor.movement_debt += 1.0 - origin_terrain.speed_modifier();
    }

    // Step 6: road double-step — each hop independently satisfies traversal
    // rules (spec §9 open question), and neither hop accrues debt (Road's
    // speed modifier is 1.0, so the formula above already contributes 0).
    let mut double_stepped = false;
    if origin_terrain.is_road() && target_terrain.is_road() {
        if try_hop(world, actor_id, direction).is_ok() {
            double_stepped = true;
        }
    }

    let final_pos = world.entities.thing(actor_id).map(|a| a.pos).unwrap_or(new_pos);
    Ok(MoveOutcome {
        new_pos: final_pos,
        fall_damage,
        double_stepped,
    })
}

/// Rotates `actor_id` in place without attempting a move (spec §4.4 "Rotate"
/// verb).
pub fn rotate(world: &mut World, actor_id: EntityId, direction: Orientation) {
    if let Some(actor) = world.entities.thing_mut(actor_id) {
        actor.orientation = direction;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::economy::tech::CivBonuses;
    use crate::state::thing::Thing;
    use crate::types::TeamId;

    fn fresh_world() -> World {
        World::new(1000, crate::victory::VictoryCondition::Regicide)
    }

    #[test]
    fn moves_onto_open_grass_immediately() {
        let mut world = fresh_world();
        let id = world.entities.allocate_id();
        let thing = Thing::new_agent(id, 0, TeamId(0), Position::new(5, 5), 25, 3);
        world.spawn(thing);

        let outcome = attempt_move(&mut world, id, Orientation::E).unwrap();
        assert_eq!(outcome.new_pos, Position::new(6, 5));
        assert_eq!(world.entities.thing(id).unwrap().movement_debt, 0.0);
    }

    #[test]
    fn land_unit_cannot_enter_water() {
        let mut world = fresh_world();
        world.grid.set_terrain(Position::new(6, 5), crate::types::TerrainKind::Water);
        let id = world.entities.allocate_id();
        let thing = Thing::new_agent(id, 0, TeamId(0), Position::new(5, 5), 25, 3);
        world.spawn(thing);

        let err = attempt_move(&mut world, id, Orientation::E).unwrap_err();
        assert!(matches!(err, MovementError::TerrainBlocked));
    }

    #[test]
    fn cliff_fall_without_ramp_damages_actor() {
        let mut world = fresh_world();
        world.grid.set_elevation(Position::new(6, 5), -1);
        let id = world.entities.allocate_id();
        let thing = Thing::new_agent(id, 0, TeamId(0), Position::new(5, 5), 25, 3);
        world.spawn(thing);

        let outcome = attempt_move(&mut world, id, Orientation::E).unwrap();
        assert_eq!(outcome.fall_damage, CLIFF_FALL_DAMAGE);
        assert_eq!(world.entities.thing(id).unwrap().hp, 25 - CLIFF_FALL_DAMAGE);
    }

    #[test]
    fn shallow_water_slows_water_units_not_at_all_but_land_blocked() {
        let mut world = fresh_world();
        let _ = CivBonuses::default();
        world
            .grid
            .set_terrain(Position::new(6, 5), crate::types::TerrainKind::ShallowWater);
        let id = world.entities.allocate_id();
        let thing = Thing::new_agent(id, 0, TeamId(0), Position::new(5, 5), 25, 3);
        world.spawn(thing);
        let err = attempt_move(&mut world, id, Orientation::E).unwrap_err();
        assert!(matches!(err, MovementError::TerrainBlocked));
    }
}
