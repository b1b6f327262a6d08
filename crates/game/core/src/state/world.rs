//! [`World`]: process-wide per-episode state (spec §3 data model).

use crate::economy::market::MarketPrices;
use crate::economy::stockpile::Stockpile;
use crate::economy::tech::{CivBonuses, TechSet};
use crate::observation::Observation;
use crate::spatial::SpatialIndex;
use crate::state::grid::Grid;
use crate::state::store::EntityStore;
use crate::state::thing::Thing;
use crate::types::constants::{MAP_AGENTS, MAP_ROOM_OBJECTS_TEAMS};
use crate::types::{EntityId, Position, TeamId, Tick};
use crate::victory::{VictoryCondition, VictoryStates};

/// A scheduled future effect (tower/mangonel/trebuchet projectile impact),
/// resolved during the tick's projectile-resolution phase (spec §5 phase 3).
#[derive(Clone, Copy, Debug)]
pub struct Projectile {
    pub source: EntityId,
    pub target_pos: Position,
    pub target: Option<EntityId>,
    pub damage: i32,
    pub is_siege: bool,
    pub aoe_radius: i32,
    pub ticks_remaining: u32,
}

/// Process-wide per-episode state (spec §3 data model "World").
pub struct World {
    pub grid: Grid,
    pub entities: EntityStore,
    pub spatial_index: SpatialIndex,

    pub stockpiles: [Stockpile; MAP_ROOM_OBJECTS_TEAMS],
    pub market_prices: [MarketPrices; MAP_ROOM_OBJECTS_TEAMS],
    pub civ_bonuses: [CivBonuses; MAP_ROOM_OBJECTS_TEAMS],
    pub tech_sets: [TechSet; MAP_ROOM_OBJECTS_TEAMS],
    pub tributes_sent: [[u32; MAP_ROOM_OBJECTS_TEAMS]; MAP_ROOM_OBJECTS_TEAMS],
    pub tributes_received: [[u32; MAP_ROOM_OBJECTS_TEAMS]; MAP_ROOM_OBJECTS_TEAMS],

    pub terminated: [f32; MAP_AGENTS],
    pub truncated: [f32; MAP_AGENTS],

    pub current_step: u64,
    pub max_steps: u64,
    pub should_reset: bool,
    pub victory_condition: VictoryCondition,
    pub victory_winner: Option<u8>,
    pub victory_states: VictoryStates,
    /// Map cells a Hill-condition episode scores hold-ticks against (spec
    /// §4.11 "Hill"). Empty for every other victory condition.
    pub hill_cells: Vec<Position>,

    pub projectiles: Vec<Projectile>,

    /// Most recently published per-agent observation window (spec §5 phase
    /// 10), `None` for a slot the episode never fielded or whose agent is
    /// currently dead.
    pub observations: Vec<Option<Observation>>,
}

impl World {
    pub fn new(max_steps: u64, victory_condition: VictoryCondition) -> Self {
        Self {
            grid: Grid::blank(),
            entities: EntityStore::new(),
            spatial_index: SpatialIndex::new(),
            stockpiles: Default::default(),
            market_prices: Default::default(),
            civ_bonuses: [CivBonuses::default(); MAP_ROOM_OBJECTS_TEAMS],
            tech_sets: Default::default(),
            tributes_sent: Default::default(),
            tributes_received: Default::default(),
            terminated: [0.0; MAP_AGENTS],
            truncated: [0.0; MAP_AGENTS],
            current_step: 0,
            max_steps,
            should_reset: false,
            victory_condition,
            victory_winner: None,
            victory_states: VictoryStates::default(),
            hill_cells: Vec::new(),
            projectiles: Vec::new(),
            observations: vec![None; MAP_AGENTS],
        }
    }

    /// Most recently published observation window for agent slot
    /// `agent_id`, or `None` if it's never been fielded or is currently dead.
    pub fn observation(&self, agent_id: u32) -> Option<&Observation> {
        self.observations.get(agent_id as usize)?.as_ref()
    }

    pub fn tick(&self) -> Tick {
        Tick(self.current_step)
    }

    pub fn stockpile(&self, team: TeamId) -> &Stockpile {
        &self.stockpiles[team.0 as usize % MAP_ROOM_OBJECTS_TEAMS]
    }

    pub fn stockpile_mut(&mut self, team: TeamId) -> &mut Stockpile {
        &mut self.stockpiles[team.0 as usize % MAP_ROOM_OBJECTS_TEAMS]
    }

    pub fn market_mut(&mut self, team: TeamId) -> &mut MarketPrices {
        &mut self.market_prices[team.0 as usize % MAP_ROOM_OBJECTS_TEAMS]
    }

    /// Borrows a team's market prices and stockpile together (spec §4.10
    /// trading needs both at once; they live in separate arrays so this
    /// never conflicts with the borrow checker).
    pub fn market_and_stockpile_mut(&mut self, team: TeamId) -> (&mut MarketPrices, &mut Stockpile) {
        let index = team.0 as usize % MAP_ROOM_OBJECTS_TEAMS;
        (&mut self.market_prices[index], &mut self.stockpiles[index])
    }

    pub fn civ_bonuses(&self, team: TeamId) -> &CivBonuses {
        &self.civ_bonuses[team.0 as usize % MAP_ROOM_OBJECTS_TEAMS]
    }

    pub fn tech(&self, team: TeamId) -> TechSet {
        self.tech_sets[team.0 as usize % MAP_ROOM_OBJECTS_TEAMS]
    }

    /// Places `thing` into owning storage, the per-kind index, and — if its
    /// position is valid and it isn't a background kind — the grid (spec
    /// §4.1 "Contract: `add(thing)`").
    pub fn spawn(&mut self, thing: Thing) -> EntityId {
        let id = thing.id;
        let pos = thing.pos;
        let is_background = thing.kind.is_background();
        if thing.unit_class == Some(crate::types::UnitClass::King) {
            self.victory_states.register_king(thing.team);
        }
        self.entities.insert(thing);
        if !pos.is_off_grid() {
            if is_background {
                self.grid.place_background(pos, id);
            } else {
                self.grid.place_foreground(pos, id);
            }
        }
        id
    }

    /// Removes `thing` from storage and the grid (spec §4.1 "Contract:
    /// `remove(thing)`").
    pub fn despawn(&mut self, id: EntityId) -> Option<Thing> {
        let thing = self.entities.destroy(id)?;
        if !thing.pos.is_off_grid() {
            if thing.kind.is_background() {
                if self.grid.background_at(thing.pos).map(|b| b.thing) == Some(id) {
                    self.grid.clear_background(thing.pos);
                }
            } else if self.grid.foreground_at(thing.pos) == Some(id) {
                self.grid.clear_foreground(thing.pos);
            }
        }
        Some(thing)
    }

    /// Moves a foreground thing's position, keeping the grid in sync.
    pub fn move_foreground(&mut self, id: EntityId, new_pos: Position) {
        let Some(thing) = self.entities.thing_mut(id) else {
            return;
        };
        let old_pos = thing.pos;
        thing.pos = new_pos;
        if !old_pos.is_off_grid() && self.grid.foreground_at(old_pos) == Some(id) {
            self.grid.clear_foreground(old_pos);
        }
        if !new_pos.is_off_grid() {
            self.grid.place_foreground(new_pos, id);
        }
    }

    /// Foreground occupant at `pos` (spec §6 `getThing`).
    pub fn get_thing(&self, pos: Position) -> Option<&Thing> {
        self.grid.foreground_at(pos).and_then(|id| self.entities.thing(id))
    }

    pub fn get_background_thing(&self, pos: Position) -> Option<&Thing> {
        self.grid
            .background_at(pos)
            .and_then(|b| self.entities.thing(b.thing))
    }
}
