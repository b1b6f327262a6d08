//! Melee/ranged/siege attacks, aura mitigation, structure auto-fire, and monk
//! abilities (spec §4.5).

use thiserror::Error;

use crate::error::{CoreError, ErrorSeverity};
use crate::state::thing::Thing;
use crate::state::world::World;
use crate::types::constants::{
    ARCHER_MIN_RANGE, ARCHER_RANGE, ARROWSLITS_DAMAGE_BONUS, BALLISTICS_DAMAGE_BONUS,
    GARRISON_ARROW_BONUS_PER_UNIT, MANGONEL_MIN_RANGE, MANGONEL_RANGE, MELEE_RANGE,
    MONK_CONVERSION_FAITH_COST, MONK_FAITH_RECHARGE_RATE, MONK_HEAL_AMOUNT, MONK_MAX_FAITH,
    MURDER_HOLES_MIN_RANGE, SIEGE_DAMAGE_MULTIPLIER, SPEAR_MELEE_RANGE, STRUCTURE_FIRE_DAMAGE,
    STRUCTURE_FIRE_MIN_RANGE, STRUCTURE_FIRE_RANGE,
};
use crate::types::{EntityId, ItemKind, Position, ThingKind, UnitClass};

#[derive(Debug, Error)]
pub enum CombatError {
    #[error("actor cannot attack")]
    NoBody,
    #[error("target does not exist")]
    NoTarget,
    #[error("target is out of range")]
    OutOfRange,
    #[error("target is not hostile")]
    NotHostile,
    #[error("trebuchet must unpack before firing")]
    Packed,
}

impl CoreError for CombatError {
    fn severity(&self) -> ErrorSeverity {
        ErrorSeverity::Recoverable
    }
}

struct Range {
    min: i32,
    max: i32,
}

/// Effective attack range for `actor`, accounting for a carried spear (spec
/// §4.5 "Spear range extension").
fn effective_range(actor: &Thing) -> Range {
    if actor.inventory.get(ItemKind::Spear) > 0 {
        return Range {
            min: 0,
            max: SPEAR_MELEE_RANGE,
        };
    }
    match actor.unit_class {
        Some(UnitClass::Archer) => Range {
            min: ARCHER_MIN_RANGE,
            max: ARCHER_RANGE,
        },
        Some(UnitClass::Mangonel) => Range {
            min: MANGONEL_MIN_RANGE,
            max: MANGONEL_RANGE,
        },
        Some(UnitClass::Trebuchet) => Range {
            min: crate::types::constants::TREBUCHET_MIN_RANGE,
            max: crate::types::constants::TREBUCHET_RANGE,
        },
        _ => Range {
            min: 0,
            max: MELEE_RANGE,
        },
    }
}

/// The best (largest) damage-halving aura any nearby ally projects onto
/// `target_pos` for `team`. Non-stacking: at most one halving applies (spec
/// §4.5 "Aura mitigation").
fn aura_mitigation_active(world: &World, team: crate::types::TeamId, target_pos: Position) -> bool {
    world.entities.iter().any(|t| {
        t.is_alive()
            && t.team == team
            && t.unit_class
                .and_then(UnitClass::aura_radius)
                .map(|r| target_pos.chebyshev_distance(t.pos) <= r)
                .unwrap_or(false)
    })
}

/// Applies one attack from `actor_id` against whatever occupies `target_pos`
/// (spec §4.5 "Attack" verb).
pub fn attempt_attack(
    world: &mut World,
    actor_id: EntityId,
    target_pos: Position,
) -> Result<i32, CombatError> {
    let actor = world.entities.thing(actor_id).ok_or(CombatError::NoBody)?;
    if actor.unit_class == Some(UnitClass::Trebuchet) && actor.packed {
        return Err(CombatError::Packed);
    }
    let range = effective_range(actor);
    let distance = actor.pos.chebyshev_distance(target_pos);
    if distance < range.min || distance > range.max {
        return Err(CombatError::OutOfRange);
    }

    let team = actor.team;
    let base_damage = actor.attack_damage;
    let is_siege_unit = actor.unit_class.map(UnitClass::is_siege).unwrap_or(false);
    let consume_spear = actor.inventory.get(ItemKind::Spear) > 0;
    let actor_is_agent = actor.is_agent();
    let has_aoe = matches!(actor.unit_class, Some(UnitClass::Mangonel) | Some(UnitClass::Trebuchet));

    let target_id = world.get_thing(target_pos).ok_or(CombatError::NoTarget)?.id;

    let mut damage_to = |world: &mut World, id: EntityId| -> Option<i32> {
        let target = world.entities.thing(id)?;
        if !target.is_hostile_to(team) {
            return None;
        }
        let is_building = target.kind.is_building() || target.kind.is_wall_or_door();
        let mut dmg = base_damage;
        if is_siege_unit && is_building {
            dmg *= SIEGE_DAMAGE_MULTIPLIER;
        }
        if !is_building && aura_mitigation_active(world, target.team, target.pos) {
            dmg = (dmg + 1) / 2;
        }
        let t = world.entities.thing_mut(id)?;
        t.hp = (t.hp - dmg).max(0);
        world.spatial_index.record_threat(id, dmg as f32);
        Some(dmg)
    };

    let primary_damage = damage_to(world, target_id).ok_or(CombatError::NotHostile)?;

    if has_aoe {
        let splash_radius = 1;
        let nearby: Vec<EntityId> = world
            .entities
            .iter()
            .filter(|t| t.id != target_id && t.is_alive() && t.pos.chebyshev_distance(target_pos) <= splash_radius)
            .map(|t| t.id)
            .collect();
        for id in nearby {
            damage_to(world, id);
        }
    }

    if consume_spear && actor_is_agent {
        if let Some(actor) = world.entities.thing_mut(actor_id) {
            actor.inventory.remove(ItemKind::Spear, 1);
        }
    }

    Ok(primary_damage)
}

/// Every auto-firing structure (spec §4.5 "Auto-fire") scans for the nearest
/// hostile agent in range and damages it once. Run once per tick (spec §5
/// phase 3).
pub fn structure_auto_fire(world: &mut World) {
    let structures: Vec<EntityId> = world
        .entities
        .iter()
        .filter(|t| t.kind.auto_fires() && t.is_alive() && t.constructed)
        .map(|t| t.id)
        .collect();

    for structure_id in structures {
        let Some(structure) = world.entities.thing(structure_id) else {
            continue;
        };
        let team = structure.team;
        let pos = structure.pos;
        let tech = world.tech(team);
        let garrisoned = structure.garrisoned_units.len() as i32;
        let min_range = if tech.contains(crate::economy::tech::TechSet::MURDER_HOLES) {
            MURDER_HOLES_MIN_RANGE
        } else {
            STRUCTURE_FIRE_MIN_RANGE
        };

        let target = world
            .entities
            .iter()
            .filter(|t| t.is_agent() && t.is_alive() && t.is_hostile_to(team))
            .filter(|t| {
                let d = pos.chebyshev_distance(t.pos);
                d >= min_range && d <= STRUCTURE_FIRE_RANGE
            })
            .min_by_key(|t| (pos.chebyshev_distance(t.pos), t.agent_id.unwrap_or(u32::MAX)))
            .map(|t| (t.id, t.unit_class));
        let Some((target_id, target_class)) = target else {
            continue;
        };

        let mut damage = STRUCTURE_FIRE_DAMAGE;
        if tech.contains(crate::economy::tech::TechSet::ARROWSLITS) {
            damage += ARROWSLITS_DAMAGE_BONUS;
        }
        if tech.contains(crate::economy::tech::TechSet::BALLISTICS)
            && target_class == Some(UnitClass::Archer)
        {
            damage += BALLISTICS_DAMAGE_BONUS;
        }
        damage += garrisoned.min(structure.kind.garrison_capacity().unwrap_or(0) as i32)
            * GARRISON_ARROW_BONUS_PER_UNIT;

        if let Some(target) = world.entities.thing_mut(target_id) {
            target.hp = (target.hp - damage).max(0);
        }
        world.spatial_index.record_threat(target_id, damage as f32);
    }
}

#[derive(Debug, Error)]
pub enum MonkError {
    #[error("actor is not a monk")]
    NotAMonk,
    #[error("insufficient faith")]
    InsufficientFaith,
    #[error("target is out of range")]
    OutOfRange,
    #[error("target is not a valid conversion target")]
    InvalidTarget,
}

impl CoreError for MonkError {
    fn severity(&self) -> ErrorSeverity {
        ErrorSeverity::Recoverable
    }
}

const MONK_RANGE: i32 = MELEE_RANGE;

/// Converts a hostile agent to the monk's team, spending faith (spec §4.5
/// "Monk conversion").
pub fn monk_convert(world: &mut World, monk_id: EntityId, target_id: EntityId) -> Result<(), MonkError> {
    let monk = world.entities.thing(monk_id).ok_or(MonkError::NotAMonk)?;
    if monk.unit_class != Some(UnitClass::Monk) {
        return Err(MonkError::NotAMonk);
    }
    if monk.faith < MONK_CONVERSION_FAITH_COST {
        return Err(MonkError::InsufficientFaith);
    }
    let monk_pos = monk.pos;
    let monk_team = monk.team;

    let target = world.entities.thing(target_id).ok_or(MonkError::InvalidTarget)?;
    if !target.is_agent() || !target.is_hostile_to(monk_team) {
        return Err(MonkError::InvalidTarget);
    }
    if monk_pos.chebyshev_distance(target.pos) > MONK_RANGE {
        return Err(MonkError::OutOfRange);
    }

    if let Some(monk) = world.entities.thing_mut(monk_id) {
        monk.faith -= MONK_CONVERSION_FAITH_COST;
    }
    if let Some(target) = world.entities.thing_mut(target_id) {
        target.team = monk_team;
    }
    Ok(())
}

/// Heals a friendly agent (spec §4.5 "Monk heal").
pub fn monk_heal(world: &mut World, monk_id: EntityId, target_id: EntityId) -> Result<(), MonkError> {
    let monk = world.entities.thing(monk_id).ok_or(MonkError::NotAMonk)?;
    if monk.unit_class != Some(UnitClass::Monk) {
        return Err(MonkError::NotAMonk);
    }
    let monk_pos = monk.pos;
    let monk_team = monk.team;
    let target = world.entities.thing(target_id).ok_or(MonkError::InvalidTarget)?;
    if target.team != monk_team || !target.is_alive() {
        return Err(MonkError::InvalidTarget);
    }
    if monk_pos.chebyshev_distance(target.pos) > MONK_RANGE {
        return Err(MonkError::OutOfRange);
    }
    if let Some(target) = world.entities.thing_mut(target_id) {
        target.hp = (target.hp + MONK_HEAL_AMOUNT).min(target.max_hp);
    }
    Ok(())
}

/// Recharges every monk's faith pool by one tick's worth (spec §5 phase 5).
pub fn recharge_faith(world: &mut World) {
    for thing in world.entities.iter_mut() {
        if thing.unit_class == Some(UnitClass::Monk) {
            thing.faith = (thing.faith + MONK_FAITH_RECHARGE_RATE).min(MONK_MAX_FAITH);
        }
    }
}

/// Toggles a trebuchet's packed state (spec §4.5 "Pack/Unpack" verb).
pub fn toggle_pack(world: &mut World, actor_id: EntityId) -> Result<bool, CombatError> {
    let actor = world.entities.thing_mut(actor_id).ok_or(CombatError::NoBody)?;
    if actor.unit_class != Some(UnitClass::Trebuchet) {
        return Err(CombatError::NoBody);
    }
    actor.packed = !actor.packed;
    Ok(actor.packed)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::thing::Thing;
    use crate::types::{Position, TeamId};

    #[test]
    fn archer_hits_target_in_range() {
        let mut world = World::new(1000, crate::victory::VictoryCondition::Regicide);
        let archer_id = world.entities.allocate_id();
        let mut archer = Thing::new_agent(archer_id, 0, TeamId(0), Position::new(5, 5), 30, 4);
        archer.unit_class = Some(UnitClass::Archer);
        world.spawn(archer);

        let target_id = world.entities.allocate_id();
        let target = Thing::new_agent(target_id, 1, TeamId(1), Position::new(7, 5), 25, 3);
        world.spawn(target);

        let dmg = attempt_attack(&mut world, archer_id, Position::new(7, 5)).unwrap();
        assert_eq!(dmg, 4);
        assert_eq!(world.entities.thing(target_id).unwrap().hp, 21);
    }

    #[test]
    fn aura_halves_incoming_damage_once() {
        let mut world = World::new(1000, crate::victory::VictoryCondition::Regicide);
        let attacker_id = world.entities.allocate_id();
        let attacker = Thing::new_agent(attacker_id, 0, TeamId(0), Position::new(5, 5), 30, 10);
        world.spawn(attacker);

        let knight_id = world.entities.allocate_id();
        let mut knight = Thing::new_agent(knight_id, 1, TeamId(1), Position::new(6, 6), 100, 10);
        knight.unit_class = Some(UnitClass::Knight);
        world.spawn(knight);

        let target_id = world.entities.allocate_id();
        let target = Thing::new_agent(target_id, 2, TeamId(1), Position::new(6, 5), 25, 3);
        world.spawn(target);

        let dmg = attempt_attack(&mut world, attacker_id, Position::new(6, 5)).unwrap();
        assert_eq!(dmg, 5);
    }

    #[test]
    fn siege_triples_damage_against_buildings() {
        let mut world = World::new(1000, crate::victory::VictoryCondition::Regicide);
        let ram_id = world.entities.allocate_id();
        let mut ram = Thing::new_agent(ram_id, 0, TeamId(0), Position::new(5, 5), 175, 2);
        ram.unit_class = Some(UnitClass::BatteringRam);
        world.spawn(ram);

        let wall_id = world.entities.allocate_id();
        let wall = Thing::new_building(wall_id, ThingKind::Wall, TeamId(1), Position::new(6, 5), 1800);
        world.spawn(wall);

        let dmg = attempt_attack(&mut world, ram_id, Position::new(6, 5)).unwrap();
        assert_eq!(dmg, 6);
    }

    #[test]
    fn auto_fire_breaks_equidistant_ties_by_lower_agent_id() {
        let mut world = World::new(1000, crate::victory::VictoryCondition::Regicide);
        let tower_id = world.entities.allocate_id();
        let mut tower = Thing::new_building(tower_id, ThingKind::GuardTower, TeamId(0), Position::new(5, 5), 420);
        tower.constructed = true;
        world.spawn(tower);

        let far_id = world.entities.allocate_id();
        let far = Thing::new_agent(far_id, 9, TeamId(1), Position::new(6, 4), 25, 3);
        world.spawn(far);

        let near_id = world.entities.allocate_id();
        let near = Thing::new_agent(near_id, 2, TeamId(1), Position::new(4, 6), 25, 3);
        world.spawn(near);

        structure_auto_fire(&mut world);
        assert!(world.entities.thing(near_id).unwrap().hp < 25);
        assert_eq!(world.entities.thing(far_id).unwrap().hp, 25);
    }
}
