//! Per-team dynamic trading prices (spec §4.10).

use crate::economy::stockpile::Stockpile;
use crate::types::StockpileResource;
use crate::types::constants::{
    MARKET_BASE_PRICE, MARKET_BUY_PRICE_INCREASE, MARKET_MAX_PRICE, MARKET_MIN_PRICE,
    MARKET_PRICE_DECAY_RATE, MARKET_SELL_PRICE_DECREASE, MARKET_TRADE_COOLDOWN_TICKS,
};

/// Per-team, per-resource prices. Gold itself is never tradable against
/// itself; `prices` covers the other four stockpile resources.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct MarketPrices {
    pub food: i32,
    pub wood: i32,
    pub stone: i32,
    pub water: i32,
}

impl Default for MarketPrices {
    fn default() -> Self {
        Self {
            food: MARKET_BASE_PRICE,
            wood: MARKET_BASE_PRICE,
            stone: MARKET_BASE_PRICE,
            water: MARKET_BASE_PRICE,
        }
    }
}

impl MarketPrices {
    fn get_mut(&mut self, resource: StockpileResource) -> Option<&mut i32> {
        match resource {
            StockpileResource::Food => Some(&mut self.food),
            StockpileResource::Wood => Some(&mut self.wood),
            StockpileResource::Stone => Some(&mut self.stone),
            StockpileResource::Water => Some(&mut self.water),
            StockpileResource::Gold => None,
        }
    }

    pub fn get(&self, resource: StockpileResource) -> Option<i32> {
        match resource {
            StockpileResource::Food => Some(self.food),
            StockpileResource::Wood => Some(self.wood),
            StockpileResource::Stone => Some(self.stone),
            StockpileResource::Water => Some(self.water),
            StockpileResource::Gold => None,
        }
    }

    /// Sells `amount` of `resource` out of the stockpile; the price drops
    /// *first*, then the sale converts at the now-lower price (spec §4.10
    /// "Selling"). Applying the decrease before the conversion — rather than
    /// after — is what gives the market its buy/sell spread (spec §8 "Market
    /// law").
    pub fn sell(&mut self, stockpile: &mut Stockpile, resource: StockpileResource, amount: u32) {
        let Some(price) = self.get_mut(resource) else {
            return;
        };
        *price = (*price - MARKET_SELL_PRICE_DECREASE).max(MARKET_MIN_PRICE);
        let gold_gained = (amount as i64 * *price as i64) / 100;
        stockpile.remove_raw(resource, amount);
        stockpile.add_raw(StockpileResource::Gold, gold_gained as u32);
    }

    /// Buys `resource` with `gold_spent` out of the stockpile's gold; the
    /// price rises *first*, then the purchase converts at the now-higher
    /// price (spec §4.10 "Buying"), mirroring `sell`'s adjust-then-convert
    /// order.
    pub fn buy(&mut self, stockpile: &mut Stockpile, resource: StockpileResource, gold_spent: u32) {
        let Some(price) = self.get_mut(resource) else {
            return;
        };
        *price = (*price + MARKET_BUY_PRICE_INCREASE).min(MARKET_MAX_PRICE);
        let resource_gained = (gold_spent as i64 * 100) / (*price as i64).max(1);
        stockpile.remove_raw(StockpileResource::Gold, gold_spent);
        stockpile.add_raw(resource, resource_gained as u32);
    }

    /// Drifts every price one step toward the base price (spec §4.10, §5
    /// phase 6).
    pub fn decay(&mut self) {
        for price in [&mut self.food, &mut self.wood, &mut self.stone, &mut self.water] {
            if *price > MARKET_BASE_PRICE {
                *price = (*price - MARKET_PRICE_DECAY_RATE).max(MARKET_BASE_PRICE);
            } else if *price < MARKET_BASE_PRICE {
                *price = (*price + MARKET_PRICE_DECAY_RATE).min(MARKET_BASE_PRICE);
            }
        }
    }
}

pub fn trade_cooldown_ticks() -> u32 {
    MARKET_TRADE_COOLDOWN_TICKS
}
