//! Construction, production queues, garrison, and rally points (spec §4.9).

use thiserror::Error;

use crate::economy::tech::CivBonuses;
use crate::error::{CoreError, ErrorSeverity};
use crate::state::thing::Thing;
use crate::state::world::World;
use crate::types::constants::{
    CONSTRUCTION_BONUS_TABLE, CONSTRUCTION_HP_PER_ACTION, PRODUCTION_QUEUE_MAX,
    REPAIR_HP_PER_ACTION,
};
use crate::types::{EntityId, Position, ThingKind, UnitClass};

/// One queued unit order inside a building's production queue (spec §4.9).
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ProductionEntry {
    pub unit_class: UnitClass,
    pub remaining_steps: u32,
    pub cost_paid: bool,
}

/// Base training time, in ticks, per unit class (spec §4.9 `trainTime`).
pub fn train_time(unit_class: UnitClass) -> u32 {
    match unit_class {
        UnitClass::Villager => 25,
        UnitClass::Scout => 30,
        UnitClass::Archer => 35,
        UnitClass::ManAtArms => 20,
        UnitClass::Knight => 60,
        UnitClass::Monk => 50,
        UnitClass::BatteringRam => 50,
        UnitClass::Mangonel => 50,
        UnitClass::Trebuchet => 70,
        UnitClass::Boat => 45,
        UnitClass::TradeCog => 40,
        UnitClass::King => 0,
        UnitClass::Goblin => 20,
    }
}

/// Base resource cost of training/building, as `(wood, food, gold, stone)`.
pub fn unit_cost(unit_class: UnitClass) -> (u32, u32, u32, u32) {
    match unit_class {
        UnitClass::Villager => (0, 50, 0, 0),
        UnitClass::Scout => (0, 80, 0, 0),
        UnitClass::Archer => (25, 0, 45, 0),
        UnitClass::ManAtArms => (0, 60, 20, 0),
        UnitClass::Knight => (0, 60, 75, 0),
        UnitClass::Monk => (0, 100, 0, 0),
        UnitClass::BatteringRam => (160, 0, 0, 0),
        UnitClass::Mangonel => (160, 0, 0, 0),
        UnitClass::Trebuchet => (200, 0, 200, 0),
        UnitClass::Boat => (135, 0, 0, 0),
        UnitClass::TradeCog => (100, 0, 50, 0),
        UnitClass::King => (0, 0, 0, 0),
        UnitClass::Goblin => (0, 40, 0, 0),
    }
}

pub fn building_base_cost(kind: ThingKind) -> (u32, u32, u32, u32) {
    match kind {
        ThingKind::House => (30, 0, 0, 0),
        ThingKind::Barracks => (175, 0, 0, 0),
        ThingKind::ArcheryRange => (175, 0, 0, 0),
        ThingKind::Stable => (175, 0, 0, 0),
        ThingKind::Market => (175, 0, 0, 0),
        ThingKind::Monastery => (175, 0, 0, 0),
        ThingKind::Blacksmith => (150, 0, 0, 0),
        ThingKind::University => (200, 0, 0, 0),
        ThingKind::GuardTower => (25, 0, 0, 5),
        ThingKind::Castle => (0, 0, 0, 650),
        ThingKind::Wall => (0, 0, 0, 5),
        ThingKind::Door => (0, 0, 0, 5),
        ThingKind::SiegeWorkshop | ThingKind::MangonelWorkshop | ThingKind::TrebuchetWorkshop => {
            (200, 0, 0, 0)
        }
        ThingKind::Dock => (150, 0, 0, 0),
        ThingKind::Outpost => (25, 0, 0, 5),
        ThingKind::Mill | ThingKind::Granary | ThingKind::LumberCamp | ThingKind::Quarry
        | ThingKind::MiningCamp => (100, 0, 0, 0),
        ThingKind::WeavingLoom | ThingKind::ClayOven => (100, 0, 0, 0),
        ThingKind::Temple => (200, 0, 0, 100),
        ThingKind::Wonder => (0, 0, 1000, 1000),
        ThingKind::TownCenter => (275, 0, 0, 100),
        ThingKind::Altar => (100, 0, 0, 0),
        _ => (0, 0, 0, 0),
    }
}

pub fn building_base_max_hp(kind: ThingKind) -> i32 {
    match kind {
        ThingKind::House => 150,
        ThingKind::TownCenter => 2000,
        ThingKind::Castle => 4800,
        ThingKind::GuardTower => 1020,
        ThingKind::Outpost => 500,
        ThingKind::Wall => 1800,
        ThingKind::Door => 900,
        ThingKind::Wonder => 4800,
        ThingKind::Altar => 1000,
        _ => 600,
    }
}

#[derive(Debug, Error)]
pub enum BuildError {
    #[error("insufficient resources to build")]
    InsufficientResources,
    #[error("target cell is occupied or out of bounds")]
    BlockedTarget,
}

impl CoreError for BuildError {
    fn severity(&self) -> ErrorSeverity {
        ErrorSeverity::Recoverable
    }
}

/// Places a `hp=1, constructed=false` building at `pos`, after deducting the
/// civ-bonus-adjusted cost from the team stockpile (spec §4.9 "Construction").
pub fn try_build(
    world: &mut World,
    team: crate::types::TeamId,
    kind: ThingKind,
    pos: Position,
    bonuses: &CivBonuses,
) -> Result<EntityId, BuildError> {
    if !pos.in_bounds(
        crate::types::constants::MAP_WIDTH,
        crate::types::constants::MAP_HEIGHT,
    ) || world.grid.foreground_at(pos).is_some()
    {
        return Err(BuildError::BlockedTarget);
    }

    let (wood, food, gold, stone) = building_base_cost(kind);
    let wood = round_half_up(wood as f32 * bonuses.wood_cost_multiplier);
    let food = round_half_up(food as f32 * bonuses.food_cost_multiplier);

    let stockpile = world.stockpile_mut(team);
    if stockpile.food < food || stockpile.wood < wood || stockpile.gold < gold
        || stockpile.stone < stone
    {
        return Err(BuildError::InsufficientResources);
    }
    stockpile.food -= food;
    stockpile.wood -= wood;
    stockpile.gold -= gold;
    stockpile.stone -= stone;

    let max_hp = round_half_up(building_base_max_hp(kind) as f32 * bonuses.building_hp_multiplier);
    let id = world.entities.allocate_id();
    let building = Thing::new_building(id, kind, team, pos, max_hp);
    world.spawn(building);
    Ok(id)
}

pub fn round_half_up(value: f32) -> u32 {
    (value + 0.5).floor().max(0.0) as u32
}

#[derive(Debug, Error)]
pub enum RepairError {
    #[error("actor is not a villager")]
    NotVillager,
    #[error("target is not owned by the actor's team")]
    NotOwned,
    #[error("target is not a building")]
    NotABuilding,
    #[error("target is not adjacent")]
    NotAdjacent,
    #[error("target is already at full health")]
    AlreadyFull,
}

impl CoreError for RepairError {
    fn severity(&self) -> ErrorSeverity {
        ErrorSeverity::Recoverable
    }
}

/// Multi-builder bonus factor for `k` simultaneous builders this tick (spec
/// §4.9, floor table in §9).
pub fn construction_bonus(builder_count: usize) -> f32 {
    let idx = builder_count.saturating_sub(1).min(CONSTRUCTION_BONUS_TABLE.len() - 1);
    CONSTRUCTION_BONUS_TABLE[idx]
}

/// Applies one villager's worth of repair/construction progress. `builder_count`
/// is the number of builders acting on this same target this tick (spec §4.9).
pub fn apply_repair(building: &mut Thing, builder_count: usize) -> Result<(), RepairError> {
    if building.hp >= building.max_hp {
        return Err(RepairError::AlreadyFull);
    }
    let bonus = construction_bonus(builder_count);
    let per_action = if building.constructed {
        REPAIR_HP_PER_ACTION
    } else {
        CONSTRUCTION_HP_PER_ACTION
    };
    let gain = (per_action as f32 * bonus).round() as i32;
    building.hp = (building.hp + gain.max(1)).min(building.max_hp);
    if building.hp >= building.max_hp {
        building.constructed = true;
    }
    Ok(())
}

#[derive(Debug, Error)]
pub enum ProductionError {
    #[error("queue is full")]
    QueueFull,
    #[error("insufficient resources")]
    InsufficientResources,
    #[error("no ready entry")]
    NotReady,
}

impl CoreError for ProductionError {
    fn severity(&self) -> ErrorSeverity {
        ErrorSeverity::Recoverable
    }
}

/// Queues a unit, deducting cost immediately (spec §4.9 "Production queue").
pub fn enqueue_production(
    building: &mut Thing,
    unit_class: UnitClass,
    stockpile: &mut crate::economy::stockpile::Stockpile,
    bonuses: &CivBonuses,
) -> Result<(), ProductionError> {
    if building.production_queue.len() >= PRODUCTION_QUEUE_MAX {
        return Err(ProductionError::QueueFull);
    }
    let (wood, food, gold, stone) = unit_cost(unit_class);
    let wood = round_half_up(wood as f32 * bonuses.wood_cost_multiplier);
    let food = round_half_up(food as f32 * bonuses.food_cost_multiplier);
    if stockpile.food < food || stockpile.wood < wood || stockpile.gold < gold
        || stockpile.stone < stone
    {
        return Err(ProductionError::InsufficientResources);
    }
    stockpile.food -= food;
    stockpile.wood -= wood;
    stockpile.gold -= gold;
    stockpile.stone -= stone;

    building
        .production_queue
        .try_push(ProductionEntry {
            unit_class,
            remaining_steps: train_time(unit_class),
            cost_paid: true,
        })
        .map_err(|_| ProductionError::QueueFull)
}

/// Decrements the front queue entry by one tick (spec §5 phase 5).
pub fn tick_production(building: &mut Thing) {
    if let Some(front) = building.production_queue.first_mut() {
        if front.remaining_steps > 0 {
            front.remaining_steps -= 1;
        }
    }
}

/// Converts a villager using a ready front queue entry (spec §4.9).
pub fn consume_ready_entry(
    building: &mut Thing,
    villager: &mut Thing,
    bonuses: &CivBonuses,
) -> Result<(), ProductionError> {
    let ready = building
        .production_queue
        .first()
        .map(|e| e.remaining_steps == 0)
        .unwrap_or(false);
    if !ready {
        return Err(ProductionError::NotReady);
    }
    let entry = building.production_queue.remove(0);
    villager.unit_class = Some(entry.unit_class);
    villager.max_hp = round_half_up(
        unit_base_hp(entry.unit_class) as f32 * bonuses.unit_hp_multiplier,
    ) as i32;
    villager.hp = villager.max_hp;
    villager.attack_damage = round_half_up(
        unit_base_attack(entry.unit_class) as f32 * bonuses.attack_multiplier,
    ) as i32;
    if !building.rally_target.is_off_grid() {
        villager.rally_target = building.rally_target;
    }
    Ok(())
}

pub fn unit_base_hp(unit_class: UnitClass) -> i32 {
    match unit_class {
        UnitClass::Villager => 25,
        UnitClass::Scout => 45,
        UnitClass::Archer => 30,
        UnitClass::ManAtArms => 45,
        UnitClass::Knight => 100,
        UnitClass::Monk => 30,
        UnitClass::BatteringRam => 175,
        UnitClass::Mangonel => 60,
        UnitClass::Trebuchet => 200,
        UnitClass::Boat => 50,
        UnitClass::TradeCog => 80,
        UnitClass::King => 200,
        UnitClass::Goblin => 35,
    }
}

pub fn unit_base_attack(unit_class: UnitClass) -> i32 {
    match unit_class {
        UnitClass::Villager => 3,
        UnitClass::Scout => 3,
        UnitClass::Archer => 4,
        UnitClass::ManAtArms => 6,
        UnitClass::Knight => 10,
        UnitClass::Monk => 0,
        UnitClass::BatteringRam => 2,
        UnitClass::Mangonel => 40,
        UnitClass::Trebuchet => 200,
        UnitClass::Boat => 6,
        UnitClass::TradeCog => 0,
        UnitClass::King => 3,
        UnitClass::Goblin => 5,
    }
}

#[derive(Debug, Error)]
pub enum GarrisonError {
    #[error("garrison is full")]
    Full,
    #[error("target is not a container building")]
    NotContainer,
    #[error("no exit tile available")]
    NoExit,
}

impl CoreError for GarrisonError {
    fn severity(&self) -> ErrorSeverity {
        ErrorSeverity::Recoverable
    }
}

/// Moves `unit` off-grid into `building`'s garrison (spec §4.9 "Garrison").
pub fn garrison_unit(
    world: &mut World,
    building_id: EntityId,
    unit_id: EntityId,
) -> Result<(), GarrisonError> {
    let capacity = world
        .entities
        .thing(building_id)
        .ok_or(GarrisonError::NotContainer)?
        .kind
        .garrison_capacity()
        .ok_or(GarrisonError::NotContainer)?;
    let full = world
        .entities
        .thing(building_id)
        .map(|b| b.garrisoned_units.len() as u32 >= capacity)
        .unwrap_or(true);
    if full {
        return Err(GarrisonError::Full);
    }
    let building = world
        .entities
        .thing_mut(building_id)
        .ok_or(GarrisonError::NotContainer)?;
    building
        .garrisoned_units
        .try_push(unit_id)
        .map_err(|_| GarrisonError::Full)?;
    let old_pos = world
        .entities
        .thing(unit_id)
        .map(|u| u.pos)
        .unwrap_or(Position::OFF_GRID);
    if !old_pos.is_off_grid() && world.grid.foreground_at(old_pos) == Some(unit_id) {
        world.grid.clear_foreground(old_pos);
    }
    if let Some(unit) = world.entities.thing_mut(unit_id) {
        unit.pos = Position::OFF_GRID;
    }
    Ok(())
}

/// Ejects one garrisoned unit to a free 8-neighbour cell around `building`.
/// Surplus units stay inside if no exit tile is free (spec §4.9).
pub fn eject_unit(
    world: &mut World,
    building_pos: Position,
    building_id: EntityId,
    unit_id: EntityId,
) -> Result<Position, GarrisonError> {
    let free_cell = building_pos
        .neighbors8()
        .into_iter()
        .find(|&p| p.in_bounds(crate::types::constants::MAP_WIDTH, crate::types::constants::MAP_HEIGHT)
            && world.grid.foreground_at(p).is_none());
    let Some(cell) = free_cell else {
        return Err(GarrisonError::NoExit);
    };
    if let Some(building) = world.entities.thing_mut(building_id) {
        building.garrisoned_units.retain(|&id| id != unit_id);
    }
    if let Some(unit) = world.entities.thing_mut(unit_id) {
        unit.pos = cell;
    }
    world.grid.place_foreground(cell, unit_id);
    Ok(cell)
}
