//! Per-agent action byte decode and dispatch (spec §4.4-§4.10, §6 "Action
//! encoding").
//!
//! Mirrors the teacher's `ActionTransition` pipeline: every verb validates
//! its preconditions, mutates `World`, then validates the postcondition it
//! promised — but the tick orchestrator (spec §7) never lets these errors
//! escape; it only uses [`CoreError::severity`] to decide whether to log or
//! silently absorb the failure.

use std::collections::HashMap;

use thiserror::Error;

use crate::combat::{self, CombatError, MonkError};
use crate::economy::market;
use crate::economy::production::{self, BuildError, GarrisonError, ProductionError};
use crate::economy::stockpile::item_to_stockpile_resource;
use crate::error::{CoreError, ErrorSeverity};
use crate::movement::{self, MovementError};
use crate::state::thing::Thing;
use crate::state::world::World;
use crate::types::constants::ACTION_ARGUMENT_COUNT;
use crate::types::{EntityId, ItemKind, Orientation, Position, StockpileResource, TeamId, ThingKind, UnitClass};

/// The decoded verb half of an action byte (spec §6).
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ActionVerb {
    Noop,
    Move,
    Rotate,
    Attack,
    AttackMove,
    Use,
    PlaceLantern,
    TogglePack,
    Build,
    SetRally,
    ControlGroup,
}

impl ActionVerb {
    const TABLE: [ActionVerb; 11] = [
        ActionVerb::Noop,
        ActionVerb::Move,
        ActionVerb::Rotate,
        ActionVerb::Attack,
        ActionVerb::AttackMove,
        ActionVerb::Use,
        ActionVerb::PlaceLantern,
        ActionVerb::TogglePack,
        ActionVerb::Build,
        ActionVerb::SetRally,
        ActionVerb::ControlGroup,
    ];

    fn from_index(index: u8) -> ActionVerb {
        Self::TABLE.get(index as usize).copied().unwrap_or(ActionVerb::Noop)
    }
}

/// A decoded action byte (spec §6 `(verb, arg) = (a / ActionArgumentCount, a
/// % ActionArgumentCount)`).
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct DecodedAction {
    pub verb: ActionVerb,
    pub arg: u8,
}

pub fn decode(action_byte: u8) -> DecodedAction {
    DecodedAction {
        verb: ActionVerb::from_index(action_byte / ACTION_ARGUMENT_COUNT),
        arg: action_byte % ACTION_ARGUMENT_COUNT,
    }
}

#[derive(Debug, Error)]
pub enum ActionError {
    #[error("no agent occupies this action slot")]
    NoAgent,
    #[error(transparent)]
    Movement(#[from] MovementError),
    #[error(transparent)]
    Combat(#[from] CombatError),
    #[error(transparent)]
    Monk(#[from] MonkError),
    #[error(transparent)]
    Build(#[from] BuildError),
    #[error(transparent)]
    Production(#[from] ProductionError),
    #[error(transparent)]
    Garrison(#[from] GarrisonError),
    #[error("malformed action argument")]
    BadArgument,
}

impl CoreError for ActionError {
    fn severity(&self) -> ErrorSeverity {
        match self {
            ActionError::BadArgument => ErrorSeverity::Validation,
            ActionError::NoAgent => ErrorSeverity::Internal,
            _ => ErrorSeverity::Recoverable,
        }
    }
}

/// Defines how a decoded action mutates [`World`], mirroring the teacher's
/// pre/apply/post validation pipeline. Implementors assume `pre_validate`
/// has already run successfully by the time `apply` executes.
pub trait ActionTransition {
    fn pre_validate(&self, _world: &World, _agent_id: EntityId) -> Result<(), ActionError> {
        Ok(())
    }
    fn apply(&self, world: &mut World, agent_id: EntityId) -> Result<(), ActionError>;
    fn post_validate(&self, _world: &World, _agent_id: EntityId) -> Result<(), ActionError> {
        Ok(())
    }
}

struct MoveAction {
    direction: Orientation,
}
impl ActionTransition for MoveAction {
    fn apply(&self, world: &mut World, agent_id: EntityId) -> Result<(), ActionError> {
        movement::attempt_move(world, agent_id, self.direction)?;
        Ok(())
    }
}

struct RotateAction {
    direction: Orientation,
}
impl ActionTransition for RotateAction {
    fn apply(&self, world: &mut World, agent_id: EntityId) -> Result<(), ActionError> {
        movement::rotate(world, agent_id, self.direction);
        Ok(())
    }
}

struct AttackAction {
    direction: Orientation,
}
impl ActionTransition for AttackAction {
    fn apply(&self, world: &mut World, agent_id: EntityId) -> Result<(), ActionError> {
        let actor = world.entities.thing(agent_id).ok_or(ActionError::NoAgent)?;
        let target_pos = target_cell_in_direction(actor, self.direction);
        combat::attempt_attack(world, agent_id, target_pos)?;
        Ok(())
    }
}

/// Moves one step toward `direction`, then attacks whatever now occupies the
/// facing cell if anything hostile is in range (spec §4.5 "AttackMove").
struct AttackMoveAction {
    direction: Orientation,
}
impl ActionTransition for AttackMoveAction {
    fn apply(&self, world: &mut World, agent_id: EntityId) -> Result<(), ActionError> {
        let _ = movement::attempt_move(world, agent_id, self.direction);
        let actor = world.entities.thing(agent_id).ok_or(ActionError::NoAgent)?;
        let target_pos = target_cell_in_direction(actor, self.direction);
        let _ = combat::attempt_attack(world, agent_id, target_pos);
        Ok(())
    }
}

fn target_cell_in_direction(actor: &Thing, direction: Orientation) -> Position {
    let (dx, dy) = direction.unit_vector();
    actor.pos + (dx, dy)
}

/// Resource a `Use` action trades at a faced Market (spec §4.10). Direction
/// only consumes `arg % 4`, leaving `arg / 4` (also `0..4`) free to select
/// which of the four tradable resources this trade touches — the same
/// unused-bits trick [`BUILD_TABLE`] plays on the `Build` verb's `arg`.
const MARKET_TRADE_RESOURCE_TABLE: [StockpileResource; 4] = [
    StockpileResource::Food,
    StockpileResource::Wood,
    StockpileResource::Stone,
    StockpileResource::Water,
];

/// Context-sensitive "use" verb: deposit carried goods at an owned
/// TownCenter/Altar, trade at a Market, harvest an adjacent resource node,
/// repair/garrison at an owned building, or convert/heal with a monk,
/// depending on what occupies the faced cell (spec §4.5, §4.8, §4.9, §4.10).
struct UseAction {
    direction: Orientation,
    /// How many agents are using this same tick's faced building as a
    /// repair/construction target (spec §4.9 "multi-builder bonus"), looked
    /// up from [`compute_builder_counts`] before dispatch mutates anything.
    builder_count: u32,
    /// Resource a faced Market trade touches, decoded from the unused high
    /// bits of the action's `arg` (spec §4.10).
    trade_resource: StockpileResource,
}
impl ActionTransition for UseAction {
    fn apply(&self, world: &mut World, agent_id: EntityId) -> Result<(), ActionError> {
        let actor = world.entities.thing(agent_id).ok_or(ActionError::NoAgent)?;
        let team = actor.team;
        let target_pos = target_cell_in_direction(actor, self.direction);

        if let Some(target) = world.get_thing(target_pos) {
            let target_id = target.id;
            let target_kind = target.kind;
            let target_team = target.team;

            if target.is_agent() && target_team == team {
                if world.entities.thing(agent_id).unwrap().unit_class == Some(UnitClass::Monk) {
                    return Ok(combat::monk_heal(world, agent_id, target_id)?);
                }
            }
            if target.is_agent() && target_team != team {
                if world.entities.thing(agent_id).unwrap().unit_class == Some(UnitClass::Monk) {
                    return Ok(combat::monk_convert(world, agent_id, target_id)?);
                }
            }
            if (target_kind == ThingKind::TownCenter || target_kind == ThingKind::Altar)
                && target_team == team
                && world
                    .entities
                    .thing(agent_id)
                    .map(|a| !a.inventory.is_empty())
                    .unwrap_or(false)
            {
                return Ok(deposit_inventory(world, agent_id, team));
            }
            if target_kind == ThingKind::Market && target_team == team {
                trade_at_market(world, agent_id, target_id, team, self.trade_resource);
                return Ok(());
            }
            if (target_kind.is_building() || target_kind.is_wall_or_door()) && target_team == team {
                let is_villager = world.entities.thing(agent_id).map(|a| a.unit_class)
                    == Some(Some(UnitClass::Villager));
                let has_ready_entry = world
                    .entities
                    .thing(target_id)
                    .and_then(|b| b.production_queue.first())
                    .map(|e| e.remaining_steps == 0)
                    .unwrap_or(false);
                if is_villager && has_ready_entry {
                    let bonuses = *world.civ_bonuses(team);
                    let (building, villager) = world.entities.thing_pair_mut(target_id, agent_id);
                    if let (Some(building), Some(villager)) = (building, villager) {
                        let _ = production::consume_ready_entry(building, villager, &bonuses);
                    }
                    return Ok(());
                }

                let needs_repair = world
                    .entities
                    .thing(target_id)
                    .map(|b| b.hp < b.max_hp)
                    .unwrap_or(false);
                if needs_repair {
                    let building = world.entities.thing_mut(target_id).ok_or(ActionError::NoAgent)?;
                    production::apply_repair(building, self.builder_count.max(1) as usize).ok();
                    return Ok(());
                }

                if target_kind.garrison_capacity().is_some() {
                    let _ = production::garrison_unit(world, target_id, agent_id);
                    return Ok(());
                }
                return Ok(());
            }
            if target_kind.is_resource_node() {
                harvest_from_node(world, agent_id, target_id);
                return Ok(());
            }
        }
        Ok(())
    }
}

fn deposit_inventory(world: &mut World, agent_id: EntityId, team: crate::types::TeamId) {
    let Some(actor) = world.entities.thing(agent_id) else {
        return;
    };
    let items: Vec<(ItemKind, u32)> = actor.inventory.iter().filter(|&(_, n)| n > 0).collect();
    let bonuses = *world.civ_bonuses(team);
    for (item, amount) in items {
        if let Some(resource) = item_to_stockpile_resource(item) {
            world.stockpile_mut(team).add_gathered(resource, amount, &bonuses);
        }
    }
    if let Some(actor) = world.entities.thing_mut(agent_id) {
        actor.inventory.clear();
    }
}

/// Deposits carried goods at an owned Market, then trades the `Use` action's
/// selected resource (spec §4.10): an agent carrying gold ore buys it with
/// the team's full gold balance, otherwise the team sells its full balance of
/// that resource for gold. Gated by the Market's trade cooldown, which this
/// resets on a successful trade; [`crate::engine::step`]'s upkeep phase ticks
/// it back down.
fn trade_at_market(
    world: &mut World,
    agent_id: EntityId,
    market_id: EntityId,
    team: TeamId,
    resource: StockpileResource,
) {
    let on_cooldown = world
        .entities
        .thing(market_id)
        .map(|m| m.cooldown > 0)
        .unwrap_or(true);
    if on_cooldown {
        return;
    }

    let carries_gold_ore = world
        .entities
        .thing(agent_id)
        .map(|a| a.inventory.get(ItemKind::GoldOre) > 0)
        .unwrap_or(false);
    deposit_inventory(world, agent_id, team);

    let (prices, stockpile) = world.market_and_stockpile_mut(team);
    if carries_gold_ore {
        let gold = stockpile.gold;
        if gold > 0 {
            prices.buy(stockpile, resource, gold);
        }
    } else {
        let amount = stockpile.get(resource);
        if amount > 0 {
            prices.sell(stockpile, resource, amount);
        }
    }

    if let Some(market) = world.entities.thing_mut(market_id) {
        market.cooldown = market::trade_cooldown_ticks();
    }
}

fn harvest_from_node(world: &mut World, agent_id: EntityId, node_id: EntityId) {
    let Some(node) = world.entities.thing(node_id) else {
        return;
    };
    let Some((item, _)) = node.inventory.iter().find(|&(_, n)| n > 0) else {
        return;
    };
    let taken = crate::death::harvest_resource_node(world, node_id, item, 1);
    if taken > 0 {
        if let Some(actor) = world.entities.thing_mut(agent_id) {
            actor.inventory.add(item, taken);
        }
    }
}

struct PlaceLanternAction;
impl ActionTransition for PlaceLanternAction {
    fn apply(&self, world: &mut World, agent_id: EntityId) -> Result<(), ActionError> {
        let actor = world.entities.thing(agent_id).ok_or(ActionError::NoAgent)?;
        if actor.lanterns == 0 {
            return Ok(());
        }
        let pos = actor.pos;
        if world.grid.background_at(pos).is_some() {
            return Ok(());
        }
        let id = world.entities.allocate_id();
        let lantern = Thing::new_static(id, ThingKind::Lantern, pos, 1);
        world.spawn(lantern);
        if let Some(actor) = world.entities.thing_mut(agent_id) {
            actor.lanterns -= 1;
        }
        Ok(())
    }
}

struct TogglePackAction;
impl ActionTransition for TogglePackAction {
    fn apply(&self, world: &mut World, agent_id: EntityId) -> Result<(), ActionError> {
        combat::toggle_pack(world, agent_id)?;
        Ok(())
    }
}

/// Builds `kind` in the faced cell (spec §4.9 "Construction"). `arg` selects
/// the building kind from a fixed per-argument table (spec §6).
struct BuildAction {
    direction: Orientation,
    kind: ThingKind,
}
impl ActionTransition for BuildAction {
    fn apply(&self, world: &mut World, agent_id: EntityId) -> Result<(), ActionError> {
        let actor = world.entities.thing(agent_id).ok_or(ActionError::NoAgent)?;
        let team = actor.team;
        let target_pos = target_cell_in_direction(actor, self.direction);
        let bonuses = *world.civ_bonuses(team);
        production::try_build(world, team, self.kind, target_pos, &bonuses)?;
        Ok(())
    }
}

struct SetRallyAction {
    direction: Orientation,
}
impl ActionTransition for SetRallyAction {
    fn apply(&self, world: &mut World, agent_id: EntityId) -> Result<(), ActionError> {
        let actor = world.entities.thing(agent_id).ok_or(ActionError::NoAgent)?;
        let target_pos = target_cell_in_direction(actor, self.direction);
        let team = actor.team;
        let nearest_owned_building = world
            .entities
            .iter()
            .filter(|t| t.team == team && (t.kind.is_building()))
            .min_by_key(|t| actor.pos.chebyshev_distance(t.pos))
            .map(|t| t.id);
        if let Some(building_id) = nearest_owned_building {
            if let Some(building) = world.entities.thing_mut(building_id) {
                building.rally_target = target_pos;
            }
        }
        Ok(())
    }
}

struct ControlGroupAction {
    group: u8,
}
impl ActionTransition for ControlGroupAction {
    fn apply(&self, _world: &mut World, _agent_id: EntityId) -> Result<(), ActionError> {
        let _ = self.group;
        Ok(())
    }
}

const BUILD_TABLE: [ThingKind; 11] = [
    ThingKind::House,
    ThingKind::Barracks,
    ThingKind::ArcheryRange,
    ThingKind::Stable,
    ThingKind::Market,
    ThingKind::Monastery,
    ThingKind::GuardTower,
    ThingKind::Wall,
    ThingKind::Door,
    ThingKind::Dock,
    ThingKind::Mill,
];

/// Tallies, for every agent about to issue a `Use` action this tick, how many
/// of them face the same owned building/wall/door — the repair/construction
/// bonus (spec §4.9) is keyed on this count, not on a single actor's view.
/// Must run over the whole tick's action batch before any of them are
/// dispatched, since dispatch mutates positions and could otherwise change
/// later agents' faced cells mid-scan.
pub fn compute_builder_counts(
    world: &World,
    agents: &[(EntityId, u8)],
) -> HashMap<EntityId, u32> {
    let mut counts = HashMap::new();
    for &(agent_id, action_byte) in agents {
        let decoded = decode(action_byte);
        if decoded.verb != ActionVerb::Use {
            continue;
        }
        let direction = Orientation::from_arg(decoded.arg % 4).unwrap_or(Orientation::N);
        let Some(actor) = world.entities.thing(agent_id) else {
            continue;
        };
        let target_pos = target_cell_in_direction(actor, direction);
        let Some(target) = world.get_thing(target_pos) else {
            continue;
        };
        if (target.kind.is_building() || target.kind.is_wall_or_door()) && target.team == actor.team {
            *counts.entry(target.id).or_insert(0) += 1;
        }
    }
    counts
}

/// Dispatches one agent's decoded action byte through its
/// pre/apply/post-validate pipeline, swallowing the error per its severity
/// (spec §5 phase 2, §7 "Error boundary"). `builder_counts` is this tick's
/// output of [`compute_builder_counts`], consulted only by the `Use` verb.
pub fn dispatch(
    world: &mut World,
    agent_id: EntityId,
    action_byte: u8,
    builder_counts: &HashMap<EntityId, u32>,
) -> Result<(), ActionError> {
    let decoded = decode(action_byte);
    let direction = Orientation::from_arg(decoded.arg % 4).unwrap_or(Orientation::N);

    let transition: Box<dyn ActionTransition> = match decoded.verb {
        ActionVerb::Noop => return Ok(()),
        ActionVerb::Move => Box::new(MoveAction { direction }),
        ActionVerb::Rotate => Box::new(RotateAction { direction }),
        ActionVerb::Attack => Box::new(AttackAction { direction }),
        ActionVerb::AttackMove => Box::new(AttackMoveAction { direction }),
        ActionVerb::Use => {
            let builder_count = world
                .entities
                .thing(agent_id)
                .map(|actor| target_cell_in_direction(actor, direction))
                .and_then(|pos| world.get_thing(pos))
                .and_then(|target| builder_counts.get(&target.id).copied())
                .unwrap_or(1);
            let trade_resource = MARKET_TRADE_RESOURCE_TABLE
                [(decoded.arg as usize / 4) % MARKET_TRADE_RESOURCE_TABLE.len()];
            Box::new(UseAction { direction, builder_count, trade_resource })
        }
        ActionVerb::PlaceLantern => Box::new(PlaceLanternAction),
        ActionVerb::TogglePack => Box::new(TogglePackAction),
        ActionVerb::Build => Box::new(BuildAction {
            direction,
            kind: BUILD_TABLE[decoded.arg as usize % BUILD_TABLE.len()],
        }),
        ActionVerb::SetRally => Box::new(SetRallyAction { direction }),
        ActionVerb::ControlGroup => Box::new(ControlGroupAction { group: decoded.arg }),
    };

    transition.pre_validate(world, agent_id)?;
    transition.apply(world, agent_id)?;
    transition.post_validate(world, agent_id)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::victory::VictoryCondition;

    #[test]
    fn decodes_verb_and_argument() {
        let decoded = decode(16 + 3);
        assert_eq!(decoded.verb, ActionVerb::Move);
        assert_eq!(decoded.arg, 3);
    }

    #[test]
    fn out_of_range_verb_index_falls_back_to_noop() {
        let decoded = decode(255);
        assert_eq!(decoded.verb, ActionVerb::Noop);
    }

    #[test]
    fn using_a_market_while_carrying_wood_sells_it_for_gold() {
        let mut world = World::new(1000, VictoryCondition::None);
        let market_id = world.entities.allocate_id();
        let mut market = Thing::new_building(market_id, ThingKind::Market, TeamId(0), Position::new(5, 6), 100);
        market.constructed = true;
        world.spawn(market);

        let agent_id = world.entities.allocate_id();
        let mut agent = Thing::new_agent(agent_id, 0, TeamId(0), Position::new(5, 5), 25, 3);
        agent.inventory.set(ItemKind::Wood, 10);
        world.spawn(agent);

        // Use, facing south (arg 1), trade-resource index 1 (Wood): arg = 1 + 4.
        let action_byte = 5 * ACTION_ARGUMENT_COUNT + 5;
        let counts = HashMap::new();
        dispatch(&mut world, agent_id, action_byte, &counts).unwrap();

        assert_eq!(world.entities.thing(agent_id).unwrap().inventory.get(ItemKind::Wood), 0);
        assert_eq!(world.stockpile(TeamId(0)).wood, 0);
        assert!(world.stockpile(TeamId(0)).gold > 0);
        assert!(world.entities.thing(market_id).unwrap().cooldown > 0);
    }

    #[test]
    fn market_trade_is_blocked_until_its_cooldown_elapses() {
        let mut world = World::new(1000, VictoryCondition::None);
        let market_id = world.entities.allocate_id();
        let mut market = Thing::new_building(market_id, ThingKind::Market, TeamId(0), Position::new(5, 6), 100);
        market.constructed = true;
        world.spawn(market);

        let agent_id = world.entities.allocate_id();
        let mut agent = Thing::new_agent(agent_id, 0, TeamId(0), Position::new(5, 5), 25, 3);
        agent.inventory.set(ItemKind::Wood, 10);
        world.spawn(agent);

        let action_byte = 5 * ACTION_ARGUMENT_COUNT + 5;
        let counts = HashMap::new();
        dispatch(&mut world, agent_id, action_byte, &counts).unwrap();
        let gold_after_first_trade = world.stockpile(TeamId(0)).gold;

        if let Some(agent) = world.entities.thing_mut(agent_id) {
            agent.inventory.set(ItemKind::Wood, 10);
        }
        dispatch(&mut world, agent_id, action_byte, &counts).unwrap();
        assert_eq!(world.stockpile(TeamId(0)).gold, gold_after_first_trade);
    }

    #[test]
    fn builder_count_tallies_every_agent_facing_the_same_target() {
        let mut world = World::new(1000, VictoryCondition::None);
        let house_id = world.entities.allocate_id();
        let house = Thing::new_building(house_id, ThingKind::House, TeamId(0), Position::new(5, 6), 100);
        world.spawn(house);

        let a_id = world.entities.allocate_id();
        world.spawn(Thing::new_agent(a_id, 0, TeamId(0), Position::new(5, 5), 25, 3));
        let b_id = world.entities.allocate_id();
        world.spawn(Thing::new_agent(b_id, 1, TeamId(0), Position::new(4, 6), 25, 3));

        // `Use` is verb index 5; arg 1 = south, arg 3 = east (`Orientation::from_arg`).
        let use_facing_south = 5 * ACTION_ARGUMENT_COUNT + 1;
        let use_facing_east = 5 * ACTION_ARGUMENT_COUNT + 3;
        let counts =
            compute_builder_counts(&world, &[(a_id, use_facing_south), (b_id, use_facing_east)]);
        assert_eq!(counts.get(&house_id).copied().unwrap_or(0), 2);
    }
}
