// Copyright (c) 2025 SOLARE S.R.O.
//
// This file is part of FluxION.
//
// Licensed under the Creative Commons Attribution-NonCommercial-NoDerivatives 4.0 International
// (CC BY-NC-ND 4.0). You may use and share this file for non-commercial purposes only and you may not
// create derivatives. See <https://creativecommons.org/licenses/by-nc-nd/4.0/>.
//
// This software is provided "AS IS", without warranty of any kind.
//
// For commercial licensing, please contact: info@solare.cz

//! Bid and order-book-item data types.

use crate::time::TimeStamp;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Which side of the market a bid stands on. Negative power is represented
/// by bidding on the opposite side rather than by a negative quantity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Side {
    Supply,
    Demand,
}

impl fmt::Display for Side {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Side::Supply => write!(f, "supply"),
            Side::Demand => write!(f, "demand"),
        }
    }
}

/// A trader identifier. Opaque beyond equality and display.
pub type TraderId = String;

/// A single bid submitted to the spot market for one `TimeStamp`.
///
/// `energy_mwh` is always non-negative; construction rejects negative
/// values rather than silently flipping the side.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Bid {
    pub energy_mwh: f64,
    pub price_eur_per_mwh: f64,
    pub marginal_cost_eur_per_mwh: f64,
    pub side: Side,
    pub trader_id: TraderId,
}

/// Negative bid energy, rejected before the book is closed.
#[derive(Debug, Clone, Copy, thiserror::Error)]
#[error("bid energy must be non-negative, got {energy_mwh}")]
pub struct NegativeBidEnergy {
    pub energy_mwh: f64,
}

impl Bid {
    /// Constructs a bid, rejecting negative energy per the system-wide
    /// invariant `energy_mwh >= 0`.
    pub fn new(
        energy_mwh: f64,
        price_eur_per_mwh: f64,
        marginal_cost_eur_per_mwh: f64,
        side: Side,
        trader_id: impl Into<TraderId>,
    ) -> Result<Self, NegativeBidEnergy> {
        if energy_mwh < 0.0 {
            return Err(NegativeBidEnergy { energy_mwh });
        }
        Ok(Self {
            energy_mwh,
            price_eur_per_mwh,
            marginal_cost_eur_per_mwh,
            side,
            trader_id: trader_id.into(),
        })
    }
}

/// A `Bid` bundled with the `TimeStamp` it is valid for, as exchanged over
/// the message bus.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BidAtTime {
    pub time: TimeStamp,
    pub bid: Bid,
}

/// A `Bid` plus the mutable bookkeeping the clearing algorithm attaches to
/// it once it has been placed in a book.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderBookItem {
    pub bid: Bid,
    pub cumulated_power_lower: f64,
    pub cumulated_power_upper: f64,
    pub awarded_power: f64,
}

impl OrderBookItem {
    #[must_use]
    pub fn new(bid: Bid) -> Self {
        Self {
            bid,
            cumulated_power_lower: 0.0,
            cumulated_power_upper: 0.0,
            awarded_power: 0.0,
        }
    }

    #[must_use]
    pub fn is_price_setting(&self, awarded_price: f64) -> bool {
        (self.bid.price_eur_per_mwh - awarded_price).abs() < f64::EPSILON
    }

    #[must_use]
    pub fn is_fully_awarded(&self) -> bool {
        (self.awarded_power - self.bid.energy_mwh).abs() < 1e-9
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_negative_energy() {
        let err = Bid::new(-1.0, 10.0, 10.0, Side::Supply, "trader-a").unwrap_err();
        assert!((err.energy_mwh + 1.0).abs() < f64::EPSILON);
    }

    #[test]
    fn accepts_zero_energy() {
        assert!(Bid::new(0.0, 10.0, 10.0, Side::Demand, "trader-b").is_ok());
    }
}
