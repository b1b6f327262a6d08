//! [`Thing`]: every positioned object in the world (spec §3 data model).
//!
//! Per spec §9 "Polymorphism over entities", `Thing` keeps one shared header
//! (id, pos, team, hp, inventory, ...) plus the handful of kind-specific
//! fields the source scatters across dozens of conditionals. Per-kind
//! behaviour (traversability, targetability, repairability, range/damage,
//! aura) is dispatched through small free functions keyed on `ThingKind` /
//! `UnitClass` rather than a payload enum — see [`crate::movement`],
//! [`crate::combat`], [`crate::economy`] for those tables.

use arrayvec::ArrayVec;

use crate::economy::inventory::Inventory;
use crate::economy::production::ProductionEntry;
use crate::types::{EntityId, Orientation, Position, Stance, TeamId, ThingKind, UnitClass};
use crate::types::constants::PRODUCTION_QUEUE_MAX;

/// Every positioned object the world can contain.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Thing {
    pub id: EntityId,
    pub kind: ThingKind,
    pub pos: Position,
    pub hp: i32,
    pub max_hp: i32,
    pub attack_damage: i32,
    pub inventory: Inventory,
    pub team: TeamId,
    pub orientation: Orientation,

    /// `0..MapAgents-1` for agents; team is `agentId / MapAgentsPerTeam`
    /// (spec §3).
    pub agent_id: Option<u32>,
    pub unit_class: Option<UnitClass>,
    pub stance: Stance,

    /// Respawn anchor (agents). `Position::OFF_GRID` means unset.
    pub home_altar: Position,
    /// Rally point set on a building, or a unit's rally target after
    /// production conversion. `Position::OFF_GRID` means unset.
    pub rally_target: Position,

    /// Fractional movement slowdown accumulator (spec §4.4). Always in
    /// `[0, 1)` between ticks.
    pub movement_debt: f32,

    // ---- kind-specific fields ----
    /// Altar hearts available to spend on respawn (spec §4.7).
    pub hearts: u32,
    /// Monk faith pool (spec §4.5).
    pub faith: i32,
    /// Generic per-entity action cooldown (market trade cooldown, projectile
    /// reload, ...).
    pub cooldown: u32,
    /// Trebuchet pack state (spec §4.5).
    pub packed: bool,
    /// Construction progress flag (spec §3 invariant 6, §4.9).
    pub constructed: bool,
    /// Units held off-grid inside a container building (spec §4.9).
    pub garrisoned_units: ArrayVec<EntityId, 20>,
    /// Relics held inside a Monastery (spec §4.9).
    pub garrisoned_relics: u32,
    /// Embedded production queue (spec §4.9).
    pub production_queue: ArrayVec<ProductionEntry, PRODUCTION_QUEUE_MAX>,
    /// Per-agent accumulated reward for the current episode (spec §3, §4.11).
    pub reward: f32,
    /// Carried lantern count (agents only; spec §3, §4.6).
    pub lanterns: u32,
    /// Carried relic count (agents only; spec §3, §4.6).
    pub relics: u32,
}

impl Thing {
    /// Constructs a bare-minimum resource/terrain-feature thing at `pos`.
    pub fn new_static(id: EntityId, kind: ThingKind, pos: Position, hp: i32) -> Self {
        Self {
            id,
            kind,
            pos,
            hp,
            max_hp: hp,
            attack_damage: 0,
            inventory: Inventory::default(),
            team: TeamId::NEUTRAL,
            orientation: Orientation::N,
            agent_id: None,
            unit_class: None,
            stance: Stance::NoAttack,
            home_altar: Position::OFF_GRID,
            rally_target: Position::OFF_GRID,
            movement_debt: 0.0,
            hearts: 0,
            faith: 0,
            cooldown: 0,
            packed: false,
            constructed: true,
            garrisoned_units: ArrayVec::new(),
            garrisoned_relics: 0,
            production_queue: ArrayVec::new(),
            reward: 0.0,
            lanterns: 0,
            relics: 0,
        }
    }

    pub fn new_agent(
        id: EntityId,
        agent_id: u32,
        team: TeamId,
        pos: Position,
        max_hp: i32,
        attack_damage: i32,
    ) -> Self {
        Self {
            team,
            agent_id: Some(agent_id),
            unit_class: Some(UnitClass::Villager),
            attack_damage,
            hp: max_hp,
            max_hp,
            ..Self::new_static(id, ThingKind::Agent, pos, max_hp)
        }
    }

    pub fn new_building(
        id: EntityId,
        kind: ThingKind,
        team: TeamId,
        pos: Position,
        max_hp: i32,
    ) -> Self {
        Self {
            team,
            hp: 1,
            max_hp,
            constructed: false,
            ..Self::new_static(id, kind, pos, 1)
        }
    }

    pub fn is_agent(&self) -> bool {
        self.agent_id.is_some()
    }

    pub fn is_alive(&self) -> bool {
        self.hp > 0
    }

    pub fn is_hostile_to(&self, other_team: TeamId) -> bool {
        if self.kind.is_wall_or_door() {
            return self.team != other_team;
        }
        !self.team.is_neutral() && self.team != other_team
    }
}
