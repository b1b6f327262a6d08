//! Per-entity inventory and the sole stockpile entry point (spec §4.8).

use strum::EnumCount;

use crate::types::ItemKind;

/// Bounded mapping `ItemKind -> count`, capped per-item (spec §3 invariant 1,
/// §4.8). Backed by a dense array indexed by the item's discriminant so
/// lookups are branch-free and the representation stays `no_std`-friendly.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Inventory {
    counts: [u32; ItemKind::COUNT],
}

impl Inventory {
    pub fn get(&self, item: ItemKind) -> u32 {
        self.counts[item as usize]
    }

    pub fn set(&mut self, item: ItemKind, amount: u32) {
        self.counts[item as usize] = amount.min(item.cap());
    }

    /// Adds `amount` to `item`, clamped at the item's cap. Returns the amount
    /// actually added.
    pub fn add(&mut self, item: ItemKind, amount: u32) -> u32 {
        let current = self.get(item);
        let next = current.saturating_add(amount).min(item.cap());
        let added = next - current;
        self.counts[item as usize] = next;
        added
    }

    /// Removes up to `amount` from `item`. Returns the amount actually
    /// removed.
    pub fn remove(&mut self, item: ItemKind, amount: u32) -> u32 {
        let current = self.get(item);
        let removed = current.min(amount);
        self.counts[item as usize] = current - removed;
        removed
    }

    pub fn clear(&mut self) {
        self.counts = [0; ItemKind::COUNT];
    }

    pub fn is_empty(&self) -> bool {
        self.counts.iter().all(|&c| c == 0)
    }

    /// True if the inventory holds only food items (spec §4.6 Corpse
    /// degradation rule).
    pub fn is_food_only(&self) -> bool {
        strum::IntoEnumIterator::iter()
            .all(|item: ItemKind| item.is_food() || self.get(item) == 0)
    }

    pub fn iter(&self) -> impl Iterator<Item = (ItemKind, u32)> + '_ {
        strum::IntoEnumIterator::iter().map(move |item: ItemKind| (item, self.get(item)))
    }
}
