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

//! The PPA-capped electrolyzer strategist (spec §4.4.5, hourly case): no
//! dynamic programming, just a per-hour cap and a pair of bids. Every hour
//! the electrolyzer consumes `maxConsumption[t] = min(rating, yieldPotential[t])`
//! and offers whatever contracted yield is left over back to the market.

use super::{Strategist, ValueSource};
use crate::device::Device;
use crate::error::{DispatchError, DispatchResult};
use market_types::{DispatchSchedule, ScheduleEntry, TimePeriod};

/// Hourly green-hydrogen PPA coupling: the schedule produces exactly the
/// rating-and-yield-capped consumption as a demand bid priced at the
/// electrolyzer's opportunity cost of not producing hydrogen, plus a
/// second supply bid at zero for whatever contracted yield the cap left
/// unconsumed. Accepts no forecast of its own kind — the yield potential
/// and hydrogen price are delivered at construction, not per `plan` call,
/// since they come from a PPA contract rather than a market forecast.
#[derive(Debug, Clone)]
pub struct PpaElectrolyzerStrategist {
    /// Contracted renewable yield potential available to the electrolyzer
    /// each hour, in MWh.
    pub yield_potential_forecast_mwh: Vec<f64>,
    /// MWh of hydrogen-equivalent value produced per MWh consumed.
    pub conversion_factor: f64,
    pub hydrogen_price_forecast_eur_per_mwh: Vec<f64>,
    pub support_rate_eur_per_mwh: f64,
    pub schedule_duration_periods: usize,
}

impl PpaElectrolyzerStrategist {
    fn opportunity_cost(&self, t: usize) -> f64 {
        let hydrogen_price = self
            .hydrogen_price_forecast_eur_per_mwh
            .get(t)
            .copied()
            .unwrap_or(0.0);
        self.conversion_factor * (hydrogen_price + self.support_rate_eur_per_mwh)
    }
}

impl Strategist for PpaElectrolyzerStrategist {
    fn plan(
        &self,
        horizon_start: TimePeriod,
        device: &Device,
        operation_hours: f64,
        current_energy_mwh: f64,
        value_source: &ValueSource,
    ) -> DispatchResult<DispatchSchedule> {
        if !matches!(value_source, ValueSource::None) {
            return Err(DispatchError::ForecastRejected {
                strategist: "ppa-electrolyzer",
            });
        }

        let rating_cap_mwh = device.params.installed_power_mw * operation_hours;
        let mut entries = Vec::with_capacity(self.schedule_duration_periods);

        for t in 0..self.schedule_duration_periods {
            let yield_potential = self
                .yield_potential_forecast_mwh
                .get(t)
                .copied()
                .unwrap_or(0.0)
                .max(0.0);
            let max_consumption = yield_potential.min(rating_cap_mwh);
            let surplus = yield_potential - max_consumption;

            let mut entry = ScheduleEntry::single(
                max_consumption,
                if max_consumption > 1e-12 {
                    self.opportunity_cost(t)
                } else {
                    f64::NAN
                },
                current_energy_mwh,
            );
            if surplus > 1e-12 {
                entry.surplus_energy_mwh = Some(surplus);
                entry.surplus_bid_price_eur_per_mwh = Some(0.0);
            }
            entries.push(entry);
        }

        Ok(DispatchSchedule::new(horizon_start, entries))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use market_types::{DeviceParams, TimeStamp};

    fn electrolyzer(rating_mw: f64) -> Device {
        Device::new(
            DeviceParams {
                charge_eff: 1.0,
                discharge_eff: 1.0,
                e2p_hours: 0.0,
                self_discharge_per_hour: 0.0,
                installed_power_mw: rating_mw,
            },
            0.0,
        )
    }

    #[test]
    fn consumes_up_to_rating_and_offers_surplus() {
        let device = electrolyzer(5.0);
        let strategist = PpaElectrolyzerStrategist {
            yield_potential_forecast_mwh: vec![3.0, 8.0],
            conversion_factor: 0.7,
            hydrogen_price_forecast_eur_per_mwh: vec![50.0, 50.0],
            support_rate_eur_per_mwh: 10.0,
            schedule_duration_periods: 2,
        };
        let horizon = TimePeriod::new(TimeStamp::from_ticks(0), 3600);
        let schedule = strategist
            .plan(horizon, &device, 1.0, 0.0, &ValueSource::None)
            .unwrap();

        // Hour 0: yield below rating, consumed entirely, no surplus bid.
        assert_eq!(schedule.entries[0].requested_energy_mwh, 3.0);
        assert!((schedule.entries[0].bid_price_eur_per_mwh - 0.7 * 60.0).abs() < 1e-9);
        assert_eq!(schedule.entries[0].surplus_energy_mwh, None);

        // Hour 1: yield above rating, consumption capped, surplus offered at zero.
        assert_eq!(schedule.entries[1].requested_energy_mwh, 5.0);
        assert_eq!(schedule.entries[1].surplus_energy_mwh, Some(3.0));
        assert_eq!(schedule.entries[1].surplus_bid_price_eur_per_mwh, Some(0.0));
    }

    #[test]
    fn rejects_any_delivered_forecast() {
        let device = electrolyzer(5.0);
        let strategist = PpaElectrolyzerStrategist {
            yield_potential_forecast_mwh: vec![3.0],
            conversion_factor: 0.7,
            hydrogen_price_forecast_eur_per_mwh: vec![50.0],
            support_rate_eur_per_mwh: 10.0,
            schedule_duration_periods: 1,
        };
        let horizon = TimePeriod::new(TimeStamp::from_ticks(0), 3600);
        let err = strategist
            .plan(
                horizon,
                &device,
                1.0,
                0.0,
                &ValueSource::PriceForecast(vec![10.0]),
            )
            .unwrap_err();
        assert!(matches!(err, DispatchError::ForecastRejected { .. }));
    }
}
