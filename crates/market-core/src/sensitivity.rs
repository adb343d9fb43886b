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

//! Merit-order sensitivity construction from a cleared order book (spec
//! §4.3). The item shape lives in `market_types::sensitivity`; this module
//! builds the two sorted sequences from `SortedBook` awards and answers the
//! `valuesInSteps` / `stepPower` queries strategists use.

use crate::orderbook::{DemandSide, SortedBook, SupplySide};
use market_types::{SensitivityItem, SensitivityKind};

/// A stepwise price/cost-vs-power curve derived from one cleared market
/// step, valid for a strategist whose external power never exceeds the
/// `max_charging_power_mw` / `max_discharging_power_mw` it was built with.
#[derive(Debug, Clone)]
pub struct MeritOrderSensitivity {
    kind: SensitivityKind,
    charging: Vec<SensitivityItem>,
    discharging: Vec<SensitivityItem>,
    max_charging_power_mw: f64,
    max_discharging_power_mw: f64,
}

type RawItem = (f64, f64, f64); // (power, price, marginal_cost)

fn sort_key(kind: SensitivityKind, price: f64, marginal_cost: f64) -> f64 {
    match kind {
        SensitivityKind::Price => price,
        SensitivityKind::Cost => marginal_cost,
    }
}

fn build_band(items: Vec<RawItem>, max_power: f64, kind: SensitivityKind) -> Vec<SensitivityItem> {
    let mut cumulated = 0.0;
    let mut monetary_offset = 0.0;
    let mut out = Vec::new();
    for (power, price, marginal_cost) in items {
        if cumulated >= max_power {
            break;
        }
        let lower = cumulated;
        let upper = cumulated + power;
        let value = match kind {
            SensitivityKind::Cost => price * power,
            SensitivityKind::Price => price,
        };
        monetary_offset += value;
        out.push(SensitivityItem {
            power_mw: power,
            price_eur_per_mwh: price,
            marginal_cost_eur_per_mwh: marginal_cost,
            cumulated_lower_power: lower,
            cumulated_upper_power: upper,
            monetary_offset,
        });
        cumulated = upper;
    }
    out
}

impl MeritOrderSensitivity {
    /// Builds a sensitivity from a single cleared supply/demand pair (spec
    /// §4.3 "Charging items" / "Discharging items").
    #[must_use]
    pub fn from_cleared_books(
        supply: &SortedBook<SupplySide>,
        demand: &SortedBook<DemandSide>,
        kind: SensitivityKind,
        max_charging_power_mw: f64,
        max_discharging_power_mw: f64,
    ) -> Self {
        let unawarded_supply = supply.real_items().iter().filter_map(|i| {
            let remaining = i.bid.energy_mwh - i.awarded_power;
            (remaining > 1e-9).then_some((
                remaining,
                i.bid.price_eur_per_mwh,
                i.bid.marginal_cost_eur_per_mwh,
            ))
        });
        let awarded_demand = demand.real_items().iter().filter_map(|i| {
            (i.awarded_power > 1e-9).then_some((
                i.awarded_power,
                i.bid.price_eur_per_mwh,
                i.bid.marginal_cost_eur_per_mwh,
            ))
        });
        let mut charging_src: Vec<RawItem> = unawarded_supply.chain(awarded_demand).collect();
        charging_src.sort_by(|a, b| {
            sort_key(kind, a.1, a.2)
                .partial_cmp(&sort_key(kind, b.1, b.2))
                .expect("prices are never NaN")
        });

        let awarded_supply = supply.real_items().iter().filter_map(|i| {
            (i.awarded_power > 1e-9).then_some((
                i.awarded_power,
                i.bid.price_eur_per_mwh,
                i.bid.marginal_cost_eur_per_mwh,
            ))
        });
        let unawarded_demand = demand.real_items().iter().filter_map(|i| {
            let remaining = i.bid.energy_mwh - i.awarded_power;
            (remaining > 1e-9).then_some((
                remaining,
                i.bid.price_eur_per_mwh,
                i.bid.marginal_cost_eur_per_mwh,
            ))
        });
        let mut discharging_src: Vec<RawItem> = awarded_supply.chain(unawarded_demand).collect();
        discharging_src.sort_by(|a, b| {
            sort_key(kind, b.1, b.2)
                .partial_cmp(&sort_key(kind, a.1, a.2))
                .expect("prices are never NaN")
        });

        Self {
            kind,
            charging: build_band(charging_src, max_charging_power_mw, kind),
            discharging: build_band(discharging_src, max_discharging_power_mw, kind),
            max_charging_power_mw,
            max_discharging_power_mw,
        }
    }

    /// Builds a one-sided (charging-only) sensitivity directly from a
    /// price-ordered supply curve, bypassing clearing entirely. Used by
    /// strategists that only need the charging band and by tests that
    /// exercise the query API directly (no market step involved).
    #[must_use]
    pub fn from_supply_curve(
        items: impl IntoIterator<Item = (f64, f64)>,
        kind: SensitivityKind,
        max_charging_power_mw: f64,
    ) -> Self {
        let mut src: Vec<RawItem> = items.into_iter().map(|(p, price)| (p, price, price)).collect();
        src.sort_by(|a, b| {
            sort_key(kind, a.1, a.2)
                .partial_cmp(&sort_key(kind, b.1, b.2))
                .expect("prices are never NaN")
        });
        Self {
            kind,
            charging: build_band(src, max_charging_power_mw, kind),
            discharging: Vec::new(),
            max_charging_power_mw,
            max_discharging_power_mw: 0.0,
        }
    }

    #[must_use]
    pub fn max_charging_power_mw(&self) -> f64 {
        self.max_charging_power_mw
    }

    #[must_use]
    pub fn max_discharging_power_mw(&self) -> f64 {
        self.max_discharging_power_mw
    }

    fn raw_value_at(items: &[SensitivityItem], power: f64, kind: SensitivityKind) -> f64 {
        if power <= 0.0 {
            return 0.0;
        }
        for item in items {
            if power <= item.cumulated_upper_power + 1e-9 {
                return item.value_at_power(power, kind);
            }
        }
        f64::NAN
    }

    /// Raw (not averaged) monetary value of a signed external power delta:
    /// positive for charging (buying), negative for discharging (selling).
    /// Used directly as the DP's `transitionValue` term.
    #[must_use]
    pub fn monetary_value_at_delta(&self, delta_external_mwh: f64) -> f64 {
        if delta_external_mwh > 0.0 {
            -Self::raw_value_at(&self.charging, delta_external_mwh, self.kind)
        } else if delta_external_mwh < 0.0 {
            Self::raw_value_at(&self.discharging, -delta_external_mwh, self.kind)
        } else {
            0.0
        }
    }

    fn average_value_at(items: &[SensitivityItem], power: f64, kind: SensitivityKind) -> f64 {
        if power <= 0.0 {
            return 0.0;
        }
        let raw = Self::raw_value_at(items, power, kind);
        raw / power
    }

    /// Local marginal price within a band, used to set a price-impacting
    /// bid at its award boundary.
    #[must_use]
    pub fn marginal_price_at(&self, delta_external_mwh: f64) -> f64 {
        let (items, power) = if delta_external_mwh >= 0.0 {
            (&self.charging, delta_external_mwh)
        } else {
            (&self.discharging, -delta_external_mwh)
        };
        for item in items {
            if power <= item.cumulated_upper_power + 1e-9 {
                return item.price_eur_per_mwh;
            }
        }
        items.last().map_or(0.0, |i| i.price_eur_per_mwh)
    }

    /// `valuesInSteps(N)`: length `2N+1`, center is the zero-power value,
    /// indices above center are charging-side average values, below are
    /// discharging-side.
    #[must_use]
    pub fn values_in_steps(&self, n: usize) -> Vec<f64> {
        let mut out = vec![f64::NAN; 2 * n + 1];
        out[n] = 0.0;
        for k in 1..=n {
            let p = k as f64 * self.max_charging_power_mw / n as f64;
            out[n + k] = Self::average_value_at(&self.charging, p, self.kind);
        }
        for k in 1..=n {
            let p = k as f64 * self.max_discharging_power_mw / n as f64;
            out[n - k] = Self::average_value_at(&self.discharging, p, self.kind);
        }
        out
    }

    /// `stepPower(N)`: the signed external power increments matching
    /// `values_in_steps`.
    #[must_use]
    pub fn step_power(&self, n: usize) -> Vec<f64> {
        let mut out = vec![0.0; 2 * n + 1];
        for k in 1..=n {
            out[n + k] = k as f64 * self.max_charging_power_mw / n as f64;
        }
        for k in 1..=n {
            out[n - k] = -(k as f64 * self.max_discharging_power_mw / n as f64);
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scenario_s6_sensitivity_monotonicity() {
        let sensitivity = MeritOrderSensitivity::from_supply_curve(
            vec![(5.0, 30.0), (5.0, 60.0)],
            SensitivityKind::Cost,
            10.0,
        );
        let values = sensitivity.values_in_steps(2);
        assert_eq!(values.len(), 5);
        assert_eq!(values[2], 0.0);
        assert!((values[3] - 30.0).abs() < 1e-9);
        assert!((values[4] - 45.0).abs() < 1e-9);
    }

    #[test]
    fn charging_side_is_monotone_nondecreasing() {
        let sensitivity = MeritOrderSensitivity::from_supply_curve(
            vec![(5.0, 30.0), (5.0, 60.0), (5.0, 90.0)],
            SensitivityKind::Cost,
            15.0,
        );
        let values = sensitivity.values_in_steps(3);
        for w in values[3..].windows(2) {
            assert!(w[1] >= w[0] - 1e-9);
        }
    }
}
