//! Two-layer occupancy grid plus terrain/elevation arrays (spec §4.1, §4.2).

use crate::types::constants::{MAP_HEIGHT, MAP_WIDTH};
use crate::types::{EntityId, Position, TerrainKind};

/// Background-layer occupant: a corpse, skeleton, relic, lantern, or dropped
/// item container (spec §4.1 "Background kinds").
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct BackgroundEntry {
    pub thing: EntityId,
}

/// Dense per-cell terrain kind, elevation, and two occupancy layers.
///
/// All accesses outside `[0, MAP_WIDTH) x [0, MAP_HEIGHT)` return `None`
/// (spec §4.1 "Contract").
#[derive(Clone, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Grid {
    width: i32,
    height: i32,
    terrain: Vec<TerrainKind>,
    elevation: Vec<i8>,
    foreground: Vec<Option<EntityId>>,
    background: Vec<Option<BackgroundEntry>>,
}

impl Grid {
    pub fn new(width: i32, height: i32) -> Self {
        let size = (width * height) as usize;
        Self {
            width,
            height,
            terrain: vec![TerrainKind::Grass; size],
            elevation: vec![0; size],
            foreground: vec![None; size],
            background: vec![None; size],
        }
    }

    pub fn blank() -> Self {
        Self::new(MAP_WIDTH, MAP_HEIGHT)
    }

    pub fn width(&self) -> i32 {
        self.width
    }

    pub fn height(&self) -> i32 {
        self.height
    }

    fn index(&self, pos: Position) -> Option<usize> {
        if pos.in_bounds(self.width, self.height) {
            Some((pos.y * self.width + pos.x) as usize)
        } else {
            None
        }
    }

    pub fn terrain_at(&self, pos: Position) -> Option<TerrainKind> {
        self.index(pos).map(|i| self.terrain[i])
    }

    pub fn set_terrain(&mut self, pos: Position, terrain: TerrainKind) {
        if let Some(i) = self.index(pos) {
            self.terrain[i] = terrain;
        }
    }

    pub fn elevation_at(&self, pos: Position) -> Option<i8> {
        self.index(pos).map(|i| self.elevation[i])
    }

    pub fn set_elevation(&mut self, pos: Position, elevation: i8) {
        if let Some(i) = self.index(pos) {
            self.elevation[i] = elevation;
        }
    }

    pub fn foreground_at(&self, pos: Position) -> Option<EntityId> {
        self.index(pos).and_then(|i| self.foreground[i])
    }

    pub fn background_at(&self, pos: Position) -> Option<BackgroundEntry> {
        self.index(pos).and_then(|i| self.background[i])
    }

    pub fn place_foreground(&mut self, pos: Position, thing: EntityId) {
        if let Some(i) = self.index(pos) {
            self.foreground[i] = Some(thing);
        }
    }

    pub fn clear_foreground(&mut self, pos: Position) {
        if let Some(i) = self.index(pos) {
            self.foreground[i] = None;
        }
    }

    pub fn place_background(&mut self, pos: Position, thing: EntityId) {
        if let Some(i) = self.index(pos) {
            self.background[i] = Some(BackgroundEntry { thing });
        }
    }

    pub fn clear_background(&mut self, pos: Position) {
        if let Some(i) = self.index(pos) {
            self.background[i] = None;
        }
    }

    pub fn is_in_bounds(&self, pos: Position) -> bool {
        pos.in_bounds(self.width, self.height)
    }
}
