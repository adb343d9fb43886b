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

//! Typed message-bus bundles. The transport itself is an external
//! collaborator; these are the payload shapes the core produces and
//! consumes.

use crate::bid::{Bid, TraderId};
use crate::time::TimeStamp;
use serde::{Deserialize, Serialize};

/// A bare timestamp, used as a message payload when no further data is
/// needed (e.g. "please submit your bids now").
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PointInTime(pub TimeStamp);

/// The set of times a clearing round will be run for.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClearingTimes {
    pub times: Vec<TimeStamp>,
}

/// A scalar quantity (energy or power) tied to a point in time — used for
/// forecast deliveries (solar yield, hydrogen price, etc).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AmountAtTime {
    pub time: TimeStamp,
    pub amount: f64,
}

/// All bids collected for a single clearing time, as handed to the market
/// agent before `OrderBook::sort()` is called.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BidsAtTime {
    pub time: TimeStamp,
    pub bids: Vec<Bid>,
}

/// The award a single trader receives after clearing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AwardData {
    pub time: TimeStamp,
    pub trader_id: TraderId,
    pub awarded_power_mwh: f64,
    pub awarded_price_eur_per_mwh: f64,
}

impl AwardData {
    /// `cost = awardedEnergy * awardedPrice`, signed so that buying is a
    /// cost and selling is revenue: positive `awarded_power_mwh` is a
    /// demand award (the trader pays), negative is a supply award (the
    /// trader is paid).
    #[must_use]
    pub fn settlement_eur(&self) -> f64 {
        self.awarded_power_mwh * self.awarded_price_eur_per_mwh
    }
}
