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

//! Sensitivity item data. Construction from a cleared order book lives in
//! `market-core::sensitivity`.

use serde::{Deserialize, Serialize};

/// Whether a sensitivity values items by price or by cost — the
/// `calcMonetaryValue` hook.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SensitivityKind {
    /// `calcMonetaryValue(item) = price * power`.
    Cost,
    /// `calcMonetaryValue(item) = price`.
    Price,
}

/// One step of a stepwise price/cost-vs-power curve.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SensitivityItem {
    pub power_mw: f64,
    pub price_eur_per_mwh: f64,
    pub marginal_cost_eur_per_mwh: f64,
    pub cumulated_lower_power: f64,
    pub cumulated_upper_power: f64,
    /// Running sum of `calcMonetaryValue` up to and including this item.
    pub monetary_offset: f64,
}

impl SensitivityItem {
    /// Linear interpolation of the monetary value within this item's power
    /// band (`calcValueAtPower`).
    #[must_use]
    pub fn value_at_power(&self, power_mw: f64, kind: SensitivityKind) -> f64 {
        let band = self.cumulated_upper_power - self.cumulated_lower_power;
        let per_unit = match kind {
            SensitivityKind::Cost => self.price_eur_per_mwh,
            SensitivityKind::Price => {
                if band > 0.0 {
                    self.price_eur_per_mwh / band
                } else {
                    self.price_eur_per_mwh
                }
            }
        };
        let offset_into_item = (power_mw - self.cumulated_lower_power).clamp(0.0, band.max(0.0));
        let value_before = self.monetary_offset - self.item_monetary_value(kind);
        match kind {
            SensitivityKind::Cost => value_before + offset_into_item * self.price_eur_per_mwh,
            SensitivityKind::Price => value_before + offset_into_item * per_unit,
        }
    }

    fn item_monetary_value(&self, kind: SensitivityKind) -> f64 {
        match kind {
            SensitivityKind::Cost => {
                self.price_eur_per_mwh * (self.cumulated_upper_power - self.cumulated_lower_power)
            }
            SensitivityKind::Price => self.price_eur_per_mwh,
        }
    }
}
