//! Position and trade bookkeeping.
//!
//! The [`PositionLedger`] is the only mutable state in the engine. Mutation
//! goes through `&mut self` (trade submission and price refresh), so Rust's
//! borrow rules give the single-writer guarantee the weighted-average cost
//! update needs; [`PositionLedger::summarize`] takes `&self` and returns an
//! owned snapshot, so readers never observe a ledger mid-mutation.

use chrono::{DateTime, Utc};
use log::debug;
use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};

use crate::types::Commodity;

/// A position in a single commodity.
///
/// `quantity` is signed: positive = long, negative = short, zero = flat.
/// `avg_price` is the weighted-average cost across the existing position and
/// each incoming trade; it resets to 0 when the position is fully closed.
/// `market_value` is stale (0 until the first refresh) and only changes when
/// a price refresh covers this commodity.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Position {
    pub commodity: Commodity,
    pub quantity: f64,
    pub avg_price: f64,
    pub market_value: f64,
}

impl Position {
    fn new(commodity: Commodity) -> Self {
        Self {
            commodity,
            quantity: 0.0,
            avg_price: 0.0,
            market_value: 0.0,
        }
    }

    /// Returns true if the position is flat (zero quantity).
    #[inline]
    pub fn is_flat(&self) -> bool {
        self.quantity == 0.0
    }
}

/// An immutable trade record, appended on every submission.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Trade {
    pub timestamp: DateTime<Utc>,
    pub commodity: Commodity,
    pub quantity: f64,
    pub price: f64,
    pub trade_value: f64,
}

/// A point-in-time summary of the ledger, derived by [`PositionLedger::summarize`].
///
/// Weights are signed fractions of `total_value` in ledger insertion order;
/// they sum to ≈1 whenever `total_value != 0`, and are all 0 otherwise.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct PortfolioSnapshot {
    pub total_value: f64,
    pub weights: Vec<(Commodity, f64)>,
    pub num_active_positions: usize,
}

impl PortfolioSnapshot {
    /// Weight of one commodity, if the ledger has seen it.
    pub fn weight(&self, commodity: &Commodity) -> Option<f64> {
        self.weights
            .iter()
            .find(|(c, _)| c == commodity)
            .map(|(_, w)| *w)
    }
}

/// Owns all positions and the append-only trade history.
#[derive(Clone, Debug, Default)]
pub struct PositionLedger {
    positions: FxHashMap<Commodity, Position>,
    /// First-trade order, so snapshots and reports iterate deterministically.
    order: Vec<Commodity>,
    trades: Vec<Trade>,
}

impl PositionLedger {
    /// Create an empty ledger.
    pub fn new() -> Self {
        Self::default()
    }

    /// Apply a trade to the ledger.
    ///
    /// `quantity` is signed: positive = buy, negative = sell (short sales
    /// allowed). Quantity 0 and negative prices are accepted — sign
    /// conventions are the caller's responsibility. A [`Trade`] record is
    /// appended unconditionally, including for zero-quantity trades.
    ///
    /// The average price is the weighted average over the existing position
    /// and the incoming trade, whether the trade adds to or reduces the
    /// position. A fully closed position resets its average price to 0.
    pub fn add_trade(
        &mut self,
        commodity: Commodity,
        quantity: f64,
        price: f64,
        timestamp: Option<DateTime<Utc>>,
    ) {
        if !self.positions.contains_key(&commodity) {
            self.order.push(commodity);
        }
        let position = self
            .positions
            .entry(commodity)
            .or_insert_with(|| Position::new(commodity));

        let new_quantity = position.quantity + quantity;
        if new_quantity != 0.0 {
            position.avg_price =
                (position.quantity * position.avg_price + quantity * price) / new_quantity;
        } else {
            position.avg_price = 0.0;
        }
        position.quantity = new_quantity;

        debug!("recorded trade: {commodity} {quantity:+} @ {price}");
        self.trades.push(Trade {
            timestamp: timestamp.unwrap_or_else(Utc::now),
            commodity,
            quantity,
            price,
            trade_value: quantity * price,
        });
    }

    /// Recompute market values from current prices.
    ///
    /// Commodities absent from `prices` keep their previous (possibly stale)
    /// market value.
    pub fn refresh_prices(&mut self, prices: &[(Commodity, f64)]) {
        for &(commodity, price) in prices {
            if let Some(position) = self.positions.get_mut(&commodity) {
                position.market_value = position.quantity * price;
            }
        }
    }

    /// Derive a [`PortfolioSnapshot`] from the current ledger state.
    ///
    /// Pure: calling this twice without intervening mutation yields
    /// identical snapshots.
    pub fn summarize(&self) -> PortfolioSnapshot {
        let total_value: f64 = self.positions_in_order().map(|p| p.market_value).sum();
        let weights = self
            .positions_in_order()
            .map(|p| {
                let weight = if total_value != 0.0 {
                    p.market_value / total_value
                } else {
                    0.0
                };
                (p.commodity, weight)
            })
            .collect();
        let num_active_positions = self.positions.values().filter(|p| !p.is_flat()).count();

        PortfolioSnapshot {
            total_value,
            weights,
            num_active_positions,
        }
    }

    /// Get a position by commodity, if the ledger has seen it.
    pub fn position(&self, commodity: &Commodity) -> Option<&Position> {
        self.positions.get(commodity)
    }

    /// Iterator over all positions in first-trade order.
    pub fn positions(&self) -> impl Iterator<Item = &Position> {
        self.positions_in_order()
    }

    /// The full trade history, in submission order.
    pub fn trades(&self) -> &[Trade] {
        &self.trades
    }

    fn positions_in_order(&self) -> impl Iterator<Item = &Position> {
        self.order.iter().filter_map(|c| self.positions.get(c))
    }
}
