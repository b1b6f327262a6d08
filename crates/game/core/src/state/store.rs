//! Owning arena of all [`Thing`]s with stable identities, a per-kind index,
//! and an agent-indexed array for O(1) agent lookup (spec §2 "Entity Store").

use std::collections::HashMap;

use crate::state::thing::Thing;
use crate::types::constants::MAP_AGENTS;
use crate::types::{EntityId, ThingKind};

/// One arena slot: either a live thing, or a tombstone (destroyed entities
/// are never reused, spec §3 "Lifecycles" — the slot's generation is bumped
/// so stale handles resolve to `None` rather than a new occupant).
#[derive(Clone, Debug)]
enum Slot {
    Occupied(Thing),
    Empty { generation: u32 },
}

/// Owning container of all world entities (spec §4.1 "Entity Store & Grid").
#[derive(Clone, Debug, Default)]
pub struct EntityStore {
    slots: Vec<Slot>,
    by_kind: HashMap<ThingKind, Vec<EntityId>>,
    /// Indexed by `agentId`; `None` for slots the episode never allocated.
    agents: Vec<Option<EntityId>>,
}

impl EntityStore {
    pub fn new() -> Self {
        Self {
            slots: Vec::new(),
            by_kind: HashMap::new(),
            agents: vec![None; MAP_AGENTS],
        }
    }

    /// Allocates a fresh `EntityId` for a not-yet-inserted thing.
    pub fn allocate_id(&mut self) -> EntityId {
        let index = self.slots.len() as u32;
        let generation = 0;
        self.slots.push(Slot::Empty { generation });
        EntityId::new(index, generation)
    }

    /// Inserts `thing` into its allocated slot (see [`Self::allocate_id`]),
    /// indexes it by kind, and — if it's an agent — into the agent array.
    pub fn insert(&mut self, thing: Thing) {
        let id = thing.id;
        let kind = thing.kind;
        let agent_id = thing.agent_id;
        if let Some(slot) = self.slots.get_mut(id.index as usize) {
            *slot = Slot::Occupied(thing);
        } else {
            debug_assert!(false, "insert without allocate_id");
            return;
        }
        self.by_kind.entry(kind).or_default().push(id);
        if let Some(agent_id) = agent_id {
            if let Some(slot) = self.agents.get_mut(agent_id as usize) {
                *slot = Some(id);
            }
        }
    }

    /// Destroys the thing at `id`. Its arena slot becomes a tombstone with a
    /// bumped generation; the id is never handed out again.
    pub fn destroy(&mut self, id: EntityId) -> Option<Thing> {
        let slot = self.slots.get_mut(id.index as usize)?;
        let Slot::Occupied(thing) = slot else {
            return None;
        };
        if thing.id.generation != id.generation {
            return None;
        }
        let removed = std::mem::replace(
            slot,
            Slot::Empty {
                generation: id.generation + 1,
            },
        );
        let Slot::Occupied(thing) = removed else {
            unreachable!()
        };
        if let Some(list) = self.by_kind.get_mut(&thing.kind) {
            list.retain(|&existing| existing != id);
        }
        Some(thing)
    }

    pub fn thing(&self, id: EntityId) -> Option<&Thing> {
        match self.slots.get(id.index as usize)? {
            Slot::Occupied(thing) if thing.id.generation == id.generation => Some(thing),
            _ => None,
        }
    }

    pub fn thing_mut(&mut self, id: EntityId) -> Option<&mut Thing> {
        match self.slots.get_mut(id.index as usize)? {
            Slot::Occupied(thing) if thing.id.generation == id.generation => Some(thing),
            _ => None,
        }
    }

    pub fn things_of_kind(&self, kind: ThingKind) -> &[EntityId] {
        self.by_kind.get(&kind).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn agent(&self, agent_id: u32) -> Option<&Thing> {
        let id = (*self.agents.get(agent_id as usize)?)?;
        self.thing(id)
    }

    pub fn agent_mut(&mut self, agent_id: u32) -> Option<&mut Thing> {
        let id = (*self.agents.get(agent_id as usize)?)?;
        self.thing_mut(id)
    }

    pub fn agent_slot_id(&self, agent_id: u32) -> Option<EntityId> {
        *self.agents.get(agent_id as usize)?
    }

    pub fn iter(&self) -> impl Iterator<Item = &Thing> {
        self.slots.iter().filter_map(|slot| match slot {
            Slot::Occupied(thing) => Some(thing),
            Slot::Empty { .. } => None,
        })
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut Thing> {
        self.slots.iter_mut().filter_map(|slot| match slot {
            Slot::Occupied(thing) => Some(thing),
            Slot::Empty { .. } => None,
        })
    }

    pub fn all_ids(&self) -> Vec<EntityId> {
        self.iter().map(|t| t.id).collect()
    }

    /// Mutably borrows two things at once (e.g. a building and the unit
    /// acting on it). Returns `None` for a side whose id is stale; if both
    /// ids name the same slot, only the first side resolves.
    pub fn thing_pair_mut(
        &mut self,
        a: EntityId,
        b: EntityId,
    ) -> (Option<&mut Thing>, Option<&mut Thing>) {
        if a.index == b.index {
            return (self.thing_mut(a), None);
        }
        let (lo, hi, swapped) = if a.index < b.index {
            (a, b, false)
        } else {
            (b, a, true)
        };
        let (left, right) = self.slots.split_at_mut(hi.index as usize);
        let lo_thing = left.get_mut(lo.index as usize).and_then(|slot| match slot {
            Slot::Occupied(thing) if thing.id.generation == lo.generation => Some(thing),
            _ => None,
        });
        let hi_thing = right.first_mut().and_then(|slot| match slot {
            Slot::Occupied(thing) if thing.id.generation == hi.generation => Some(thing),
            _ => None,
        });
        if swapped {
            (hi_thing, lo_thing)
        } else {
            (lo_thing, hi_thing)
        }
    }
}
