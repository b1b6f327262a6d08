//! Per-team aggregated resources, separate from any unit's inventory (spec
//! §3, §4.8 glossary "Stockpile").

use crate::economy::tech::CivBonuses;
use crate::types::{ItemKind, StockpileResource};

/// Team-aggregated resource counts (spec §3 `teamStockpiles`).
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Stockpile {
    pub food: u32,
    pub wood: u32,
    pub gold: u32,
    pub stone: u32,
    pub water: u32,
}

impl Stockpile {
    pub fn get(&self, resource: StockpileResource) -> u32 {
        match resource {
            StockpileResource::Food => self.food,
            StockpileResource::Wood => self.wood,
            StockpileResource::Gold => self.gold,
            StockpileResource::Stone => self.stone,
            StockpileResource::Water => self.water,
        }
    }

    fn get_mut(&mut self, resource: StockpileResource) -> &mut u32 {
        match resource {
            StockpileResource::Food => &mut self.food,
            StockpileResource::Wood => &mut self.wood,
            StockpileResource::Gold => &mut self.gold,
            StockpileResource::Stone => &mut self.stone,
            StockpileResource::Water => &mut self.water,
        }
    }

    /// The sole entry point for gather gains (spec §4.8 `addToStockpile`):
    /// multiplies by the team's gather-rate multiplier and rounds half-up
    /// before adding.
    pub fn add_gathered(&mut self, resource: StockpileResource, amount: u32, bonuses: &CivBonuses) {
        let scaled = crate::economy::production::round_half_up(
            amount as f32 * bonuses.gather_rate_multiplier,
        );
        let slot = self.get_mut(resource);
        *slot = slot.saturating_add(scaled);
    }

    pub fn add_raw(&mut self, resource: StockpileResource, amount: u32) {
        let slot = self.get_mut(resource);
        *slot = slot.saturating_add(amount);
    }

    /// Debits `amount` of `resource`, clamping at zero rather than
    /// underflowing (a market conversion never oversells what's on hand since
    /// callers pass the current balance, but this stays safe regardless).
    pub fn remove_raw(&mut self, resource: StockpileResource, amount: u32) {
        let slot = self.get_mut(resource);
        *slot = slot.saturating_sub(amount);
    }
}

/// Fixed conversion of a carried item into stockpile units when deposited at
/// an owned TownCenter/Altar (spec §4.8 "Depositing").
pub fn item_to_stockpile_resource(item: ItemKind) -> Option<StockpileResource> {
    match item {
        ItemKind::Wood => Some(StockpileResource::Wood),
        ItemKind::Stone => Some(StockpileResource::Stone),
        ItemKind::GoldOre => Some(StockpileResource::Gold),
        ItemKind::Wheat | ItemKind::Berries | ItemKind::Fish | ItemKind::Meat => {
            Some(StockpileResource::Food)
        }
        ItemKind::Spear => None,
    }
}
