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

//! Bid schedule & trader glue (spec §4.5): the component that coordinates
//! one `Strategist` and one `Device` across clearing events. Decides
//! whether to reuse the cached schedule or request a fresh one, turns the
//! scheduled entry for the target hour into one or two `Bid`s (a PPA-coupled
//! electrolyzer emits a second, surplus-sale bid alongside the primary one),
//! and applies an award back to the device's physical state plus running
//! settlement.
//!
//! The schedule is treated as immutable once built: a clearing time beyond
//! its validity window triggers a full rebuild, never an incremental
//! patch, matching the teacher's append-only planning-cache pattern in
//! `fluxion-core::scheduling`.

use crate::device::Device;
use crate::error::DispatchResult;
use crate::strategy::{Strategist, ValueSource};
use market_types::{Bid, DispatchSchedule, Side, TimePeriod, TimeStamp};

/// Coordinates a `Strategist` and a `Device` for one trader across
/// repeated clearing events.
#[derive(Debug)]
pub struct Trader<S> {
    trader_id: String,
    strategist: S,
    device: Device,
    schedule: Option<DispatchSchedule>,
    /// Tolerance for `DispatchSchedule::is_applicable_at`'s initial-energy
    /// check, deciding schedule reuse vs. rebuild.
    schedule_tolerance_mwh: f64,
    /// Tolerance for the award/settlement-inconsistency warning (spec §7):
    /// awarded power differing from the requested bid by more than this
    /// many MWh is logged, not fatal.
    award_tolerance_mwh: f64,
    total_settlement_eur: f64,
    total_hydrogen_mwh: f64,
}

impl<S: Strategist> Trader<S> {
    #[must_use]
    pub fn new(
        trader_id: impl Into<String>,
        strategist: S,
        device: Device,
        schedule_tolerance_mwh: f64,
        award_tolerance_mwh: f64,
    ) -> Self {
        Self {
            trader_id: trader_id.into(),
            strategist,
            device,
            schedule: None,
            schedule_tolerance_mwh,
            award_tolerance_mwh,
            total_settlement_eur: 0.0,
            total_hydrogen_mwh: 0.0,
        }
    }

    #[must_use]
    pub fn device(&self) -> &Device {
        &self.device
    }

    #[must_use]
    pub fn total_settlement_eur(&self) -> f64 {
        self.total_settlement_eur
    }

    /// Produces the bid to submit at `t`, rebuilding the schedule first if
    /// none exists or the cached one is no longer applicable (spec §4.5
    /// step 1). Returns zero, one, or two bids: most strategists schedule a
    /// single bid per hour, but a PPA-coupled electrolyzer also offers
    /// surplus contracted yield as a second, independent supply bid (spec
    /// §4.4.5).
    pub fn bid_for(
        &mut self,
        t: TimeStamp,
        horizon_start: TimePeriod,
        operation_hours: f64,
        value_source: &ValueSource,
    ) -> DispatchResult<Vec<Bid>> {
        let current_energy = self.device.state.energy_in_storage_mwh;
        let needs_rebuild = match &self.schedule {
            Some(schedule) => {
                !schedule.is_applicable_at(t, current_energy, self.schedule_tolerance_mwh)
            }
            None => true,
        };

        if needs_rebuild {
            tracing::debug!(trader_id = %self.trader_id, ?t, "rebuilding dispatch schedule");
            let schedule = self.strategist.plan(
                horizon_start,
                &self.device,
                operation_hours,
                current_energy,
                value_source,
            )?;
            self.schedule = Some(schedule);
        }

        let entry = self
            .schedule
            .as_ref()
            .and_then(|schedule| schedule.entry_at(t))
            .copied();

        let Some(entry) = entry else {
            return Ok(Vec::new());
        };

        let mut bids = Vec::with_capacity(2);

        if entry.requested_energy_mwh.abs() >= 1e-12 {
            let side = if entry.requested_energy_mwh > 0.0 {
                Side::Demand
            } else {
                Side::Supply
            };
            if let Ok(bid) = Bid::new(
                entry.requested_energy_mwh.abs(),
                entry.bid_price_eur_per_mwh,
                entry.bid_price_eur_per_mwh,
                side,
                self.trader_id.clone(),
            ) {
                bids.push(bid);
            }
        }

        if let (Some(surplus_mwh), Some(surplus_price)) =
            (entry.surplus_energy_mwh, entry.surplus_bid_price_eur_per_mwh)
        {
            if surplus_mwh.abs() >= 1e-12 {
                if let Ok(bid) = Bid::new(
                    surplus_mwh.abs(),
                    surplus_price,
                    surplus_price,
                    Side::Supply,
                    self.trader_id.clone(),
                ) {
                    bids.push(bid);
                }
            }
        }

        Ok(bids)
    }

    /// Applies a market award: updates the device's physical state via
    /// `charge`, records settlement (`cost = awardedEnergy * awardedPrice`,
    /// spec §4.5 step 3), and warns (not fails) when the award deviates
    /// from what was requested by more than `award_tolerance_mwh` (spec
    /// §7's "award/settlement inconsistency").
    pub fn apply_award(
        &mut self,
        t: TimeStamp,
        operation_hours: f64,
        requested_external_power_mw: f64,
        awarded_external_power_mw: f64,
        awarded_price_eur_per_mwh: f64,
    ) -> f64 {
        let deviation = (awarded_external_power_mw - requested_external_power_mw).abs();
        if deviation > self.award_tolerance_mwh {
            tracing::warn!(
                trader_id = %self.trader_id,
                ?t,
                requested_external_power_mw,
                awarded_external_power_mw,
                deviation,
                "award deviates from requested bid by more than tolerance"
            );
        }

        let realized_external = self.device.charge(awarded_external_power_mw, operation_hours, t);
        let settlement = realized_external * awarded_price_eur_per_mwh;
        self.total_settlement_eur += settlement;
        settlement
    }

    /// Adds to the trader's running hydrogen-production total (electrolyzer
    /// variants only); a no-op bookkeeping hook for non-electrolysis
    /// strategists.
    pub fn record_hydrogen_produced(&mut self, hydrogen_mwh: f64) {
        self.total_hydrogen_mwh += hydrogen_mwh;
    }

    #[must_use]
    pub fn total_hydrogen_mwh(&self) -> f64 {
        self.total_hydrogen_mwh
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::strategy::{Coupling, Discretization, DynamicProgrammingStrategist, Objective};
    use market_types::DeviceParams;

    fn device() -> Device {
        Device::new(
            DeviceParams {
                charge_eff: 1.0,
                discharge_eff: 1.0,
                e2p_hours: 1.0,
                self_discharge_per_hour: 0.0,
                installed_power_mw: 1.0,
            },
            0.0,
        )
    }

    fn price_taker(device: &Device) -> DynamicProgrammingStrategist {
        DynamicProgrammingStrategist {
            objective: Objective::MaxProfitPriceTaker,
            coupling: Coupling::None,
            discretization: Discretization::new(11, 10, device.capacity_mwh()),
            schedule_duration_periods: 4,
            scarcity_price_eur_per_mwh: 3000.0,
            minimal_price_eur_per_mwh: -500.0,
        }
    }

    #[test]
    fn builds_schedule_lazily_and_emits_bids() {
        let device = device();
        let strategist = price_taker(&device);
        let mut trader = Trader::new("storage-a", strategist, device, 0.1, 0.1);

        let horizon_start = TimePeriod::new(TimeStamp::from_ticks(0), 3600);
        let forecast = ValueSource::PriceForecast(vec![20.0, 80.0, 20.0, 80.0]);

        let bids0 = trader
            .bid_for(TimeStamp::from_ticks(0), horizon_start, 1.0, &forecast)
            .unwrap();
        assert_eq!(bids0.len(), 1);
        assert_eq!(bids0[0].side, Side::Demand, "charges cheaply at t=0");

        let bids1 = trader
            .bid_for(TimeStamp::from_ticks(3600), horizon_start, 1.0, &forecast)
            .unwrap();
        assert_eq!(bids1.len(), 1);
        assert_eq!(bids1[0].side, Side::Supply, "discharges expensively at t=1");
    }

    #[test]
    fn apply_award_updates_device_and_settlement() {
        let device = device();
        let strategist = price_taker(&device);
        let mut trader = Trader::new("storage-a", strategist, device, 0.1, 0.1);

        let settlement = trader.apply_award(TimeStamp::from_ticks(0), 1.0, 1.0, 1.0, 20.0);
        assert!((settlement - 20.0).abs() < 1e-9);
        assert!((trader.device().state.energy_in_storage_mwh - 1.0).abs() < 1e-9);
        assert!((trader.total_settlement_eur() - 20.0).abs() < 1e-9);
    }

    #[test]
    fn rebuilds_schedule_once_energy_drifts_past_tolerance() {
        let device = device();
        let strategist = price_taker(&device);
        let mut trader = Trader::new("storage-a", strategist, device, 0.01, 0.01);

        let horizon_start = TimePeriod::new(TimeStamp::from_ticks(0), 3600);
        let forecast = ValueSource::PriceForecast(vec![20.0, 80.0, 20.0, 80.0]);
        trader
            .bid_for(TimeStamp::from_ticks(0), horizon_start, 1.0, &forecast)
            .unwrap();

        // Award far less than requested: device energy now mismatches the
        // schedule's expectation at the next hour, forcing a rebuild.
        trader.apply_award(TimeStamp::from_ticks(0), 1.0, 1.0, 0.1, 20.0);
        let bids1 = trader
            .bid_for(TimeStamp::from_ticks(3600), horizon_start, 1.0, &forecast)
            .unwrap();
        assert!(!bids1.is_empty());
    }

    #[test]
    fn ppa_electrolyzer_emits_both_consumption_and_surplus_bids() {
        let device = Device::new(
            DeviceParams {
                charge_eff: 1.0,
                discharge_eff: 1.0,
                e2p_hours: 0.0,
                self_discharge_per_hour: 0.0,
                installed_power_mw: 5.0,
            },
            0.0,
        );
        let strategist = crate::strategy::PpaElectrolyzerStrategist {
            yield_potential_forecast_mwh: vec![8.0],
            conversion_factor: 0.7,
            hydrogen_price_forecast_eur_per_mwh: vec![50.0],
            support_rate_eur_per_mwh: 10.0,
            schedule_duration_periods: 1,
        };
        let mut trader = Trader::new("electrolyzer-a", strategist, device, 0.1, 0.1);

        let horizon_start = TimePeriod::new(TimeStamp::from_ticks(0), 3600);
        let bids = trader
            .bid_for(TimeStamp::from_ticks(0), horizon_start, 1.0, &ValueSource::None)
            .unwrap();

        assert_eq!(bids.len(), 2, "consumption bid plus surplus-sale bid");
        assert_eq!(bids[0].side, Side::Demand);
        assert_eq!(bids[0].energy_mwh, 5.0);
        assert_eq!(bids[1].side, Side::Supply);
        assert_eq!(bids[1].energy_mwh, 3.0);
        assert_eq!(bids[1].price_eur_per_mwh, 0.0);
    }
}
