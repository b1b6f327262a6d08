//! Uniform-grid spatial index accelerating nearest/range queries over live
//! things (spec §4.3).
//!
//! Rebuilt wholesale every [`crate::types::constants::SPATIAL_INDEX_RETUNE_INTERVAL`]
//! ticks from scratch, re-tuning its cell size to the current entity density —
//! grounded on the teacher's lazily-initialized chunk grid, generalized from
//! fixed-size chunks to an auto-tuned bucket size per spec §9.

use std::collections::HashMap;

use crate::state::thing::Thing;
use crate::types::constants::{
    MAP_HEIGHT, MAP_WIDTH, SPATIAL_INDEX_MAX_CELL_SIZE, SPATIAL_INDEX_MIN_CELL_SIZE,
    THREAT_DECAY_RATE, THREAT_EPSILON,
};
use crate::types::{EntityId, Position, TeamId, ThingKind};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
struct CellKey(i32, i32);

/// Uniform bucket grid over entity positions, plus a decaying per-entity
/// threat ledger. Buckets are not persisted across resets — rebuilt from the
/// live entity set on demand; the threat ledger persists across rebuilds,
/// decaying every tick independently of retuning.
#[derive(Clone, Debug)]
pub struct SpatialIndex {
    cell_size: i32,
    buckets: HashMap<CellKey, Vec<EntityId>>,
    ticks_since_retune: u64,
    threat: HashMap<EntityId, f32>,
}

impl Default for SpatialIndex {
    fn default() -> Self {
        Self::new()
    }
}

impl SpatialIndex {
    pub fn new() -> Self {
        Self {
            cell_size: SPATIAL_INDEX_MIN_CELL_SIZE,
            buckets: HashMap::new(),
            ticks_since_retune: 0,
            threat: HashMap::new(),
        }
    }

    /// Records `amount` of fresh threat against `target` (e.g. damage just
    /// dealt to it), on top of whatever has not yet decayed away.
    pub fn record_threat(&mut self, target: EntityId, amount: f32) {
        *self.threat.entry(target).or_insert(0.0) += amount;
    }

    /// Current decayed threat level tracked against `id`, or `0.0` if none.
    pub fn threat_level(&self, id: EntityId) -> f32 {
        self.threat.get(&id).copied().unwrap_or(0.0)
    }

    /// Applies one tick of exponential decay to every tracked threat entry,
    /// dropping entries that have decayed below [`THREAT_EPSILON`].
    pub fn decay_threat(&mut self) {
        self.threat.retain(|_, level| {
            *level *= THREAT_DECAY_RATE;
            *level > THREAT_EPSILON
        });
    }

    fn cell_of(&self, pos: Position) -> CellKey {
        CellKey(pos.x.div_euclid(self.cell_size), pos.y.div_euclid(self.cell_size))
    }

    /// Re-tunes the bucket size to the current entity count (denser worlds get
    /// smaller buckets, so range queries stay cheap) and rebuilds every
    /// bucket from the live thing set. Entities off-grid or outside map
    /// bounds are skipped defensively (spec §4.3 "Defensive filtering").
    pub fn retune_and_rebuild<'a>(&mut self, things: impl Iterator<Item = &'a Thing>) {
        let things: Vec<&Thing> = things
            .filter(|t| t.is_alive() && !t.pos.is_off_grid() && t.pos.in_bounds(MAP_WIDTH, MAP_HEIGHT))
            .collect();
        let density = things.len().max(1) as f32 / (MAP_WIDTH as f32 * MAP_HEIGHT as f32);
        // Target roughly one entity per bucket on average.
        let target = (1.0 / density.max(1e-6)).sqrt() as i32;
        self.cell_size = target.clamp(SPATIAL_INDEX_MIN_CELL_SIZE, SPATIAL_INDEX_MAX_CELL_SIZE);

        self.buckets.clear();
        for thing in things {
            let key = self.cell_of(thing.pos);
            self.buckets.entry(key).or_default().push(thing.id);
        }
        self.ticks_since_retune = 0;
    }

    pub fn ticks_since_retune(&self) -> u64 {
        self.ticks_since_retune
    }

    pub fn advance_tick(&mut self) {
        self.ticks_since_retune += 1;
    }

    /// Candidate ids from every bucket overlapping a `radius`-cell box around
    /// `center` — a superset the caller filters exactly by real distance.
    fn candidates(&self, center: Position, radius: i32) -> Vec<EntityId> {
        let span = (radius / self.cell_size) + 1;
        let center_cell = self.cell_of(center);
        let mut out = Vec::new();
        for dy in -span..=span {
            for dx in -span..=span {
                let key = CellKey(center_cell.0 + dx, center_cell.1 + dy);
                if let Some(bucket) = self.buckets.get(&key) {
                    out.extend_from_slice(bucket);
                }
            }
        }
        out
    }

    /// Nearest live thing to `center` satisfying `filter`, by Chebyshev
    /// distance, excluding `center` itself via position equality being the
    /// caller's responsibility (spec §4.3 `findNearestThingSpatial`).
    pub fn find_nearest<'a>(
        &self,
        things: &'a dyn Fn(EntityId) -> Option<&'a Thing>,
        center: Position,
        max_radius: i32,
        filter: impl Fn(&Thing) -> bool,
    ) -> Option<EntityId> {
        let mut best: Option<(i32, EntityId)> = None;
        for id in self.candidates(center, max_radius) {
            let Some(thing) = things(id) else { continue };
            if !filter(thing) {
                continue;
            }
            let d = center.chebyshev_distance(thing.pos);
            if d > max_radius {
                continue;
            }
            if best.map(|(bd, _)| d < bd).unwrap_or(true) {
                best = Some((d, id));
            }
        }
        best.map(|(_, id)| id)
    }

    pub fn find_nearest_enemy_agent<'a>(
        &self,
        things: &'a dyn Fn(EntityId) -> Option<&'a Thing>,
        center: Position,
        team: TeamId,
        max_radius: i32,
    ) -> Option<EntityId> {
        self.find_nearest(things, center, max_radius, |t| {
            t.is_agent() && t.is_alive() && t.is_hostile_to(team)
        })
    }

    pub fn find_nearest_friendly<'a>(
        &self,
        things: &'a dyn Fn(EntityId) -> Option<&'a Thing>,
        center: Position,
        team: TeamId,
        kind: Option<ThingKind>,
        max_radius: i32,
    ) -> Option<EntityId> {
        self.find_nearest(things, center, max_radius, |t| {
            t.is_alive() && t.team == team && kind.map(|k| t.kind == k).unwrap_or(true)
        })
    }

    /// All live things matching `filter` within `radius` of `center` (spec
    /// §4.3 `collectEnemiesInRangeSpatial` / `collectAlliesInRangeSpatial`).
    pub fn collect_in_range<'a>(
        &self,
        things: &'a dyn Fn(EntityId) -> Option<&'a Thing>,
        center: Position,
        radius: i32,
        filter: impl Fn(&Thing) -> bool,
    ) -> Vec<EntityId> {
        self.candidates(center, radius)
            .into_iter()
            .filter(|&id| {
                things(id)
                    .map(|t| center.chebyshev_distance(t.pos) <= radius && filter(t))
                    .unwrap_or(false)
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::thing::Thing;
    use crate::types::TeamId;

    #[test]
    fn find_nearest_enemy_agent_picks_the_closest_hostile() {
        let near = Thing::new_agent(EntityId::new(0, 0), 0, TeamId(1), Position::new(6, 5), 25, 3);
        let far = Thing::new_agent(EntityId::new(1, 0), 1, TeamId(1), Position::new(9, 5), 25, 3);
        let things = [near, far];

        let mut index = SpatialIndex::new();
        index.retune_and_rebuild(things.iter());

        let lookup = |id: EntityId| things.iter().find(|t| t.id == id);
        let found = index.find_nearest_enemy_agent(&lookup, Position::new(5, 5), TeamId(0), 10);
        assert_eq!(found, Some(things[0].id));
    }

    #[test]
    fn threat_decays_below_epsilon_and_is_dropped() {
        let mut index = SpatialIndex::new();
        let id = EntityId::new(0, 0);
        index.record_threat(id, 10.0);
        assert!(index.threat_level(id) > 0.0);

        for _ in 0..500 {
            index.decay_threat();
        }
        assert_eq!(index.threat_level(id), 0.0);
    }

    #[test]
    fn fresh_threat_accumulates_on_top_of_undeccayed_level() {
        let mut index = SpatialIndex::new();
        let id = EntityId::new(0, 0);
        index.record_threat(id, 5.0);
        index.record_threat(id, 5.0);
        assert_eq!(index.threat_level(id), 10.0);
    }
}
