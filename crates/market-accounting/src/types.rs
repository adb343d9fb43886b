// Copyright (c) 2025 SOLARE S.R.O.
//
// This file is part of FluxION.

//! Output accounting records: energy, prices, costs, and revenues written
//! once per cleared time step.

use market_types::{AwardData, TimeStamp, TraderId};
use serde::{Deserialize, Serialize};

/// One persisted row: a single trader's award for a single cleared step,
/// plus the device energy level it left behind (if the trader owns a
/// storage device).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StepRecord {
    pub time: TimeStamp,
    pub trader_id: TraderId,
    pub awarded_power_mwh: f64,
    pub awarded_price_eur_per_mwh: f64,
    /// `awardedEnergy * awardedPrice`; positive is a cost to the trader,
    /// negative is revenue.
    pub settlement_eur: f64,
    pub device_energy_after_mwh: Option<f64>,
}

impl StepRecord {
    #[must_use]
    pub fn from_award(award: &AwardData, device_energy_after_mwh: Option<f64>) -> Self {
        Self {
            time: award.time,
            trader_id: award.trader_id.clone(),
            awarded_power_mwh: award.awarded_power_mwh,
            awarded_price_eur_per_mwh: award.awarded_price_eur_per_mwh,
            settlement_eur: award.settlement_eur(),
            device_energy_after_mwh,
        }
    }
}
