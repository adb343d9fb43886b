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

//! Dispatch strategists — the heart of the core. A single `Strategist`
//! capability trait plus one generic dynamic-programming implementation
//! parameterised by an `Objective` (target) and a `Coupling` (hydrogen/PPA),
//! rather than a base class hierarchy; `market-plugins` is the registry
//! that builds one from configuration.

mod discretization;
mod dp;
mod file_dispatcher;
mod ppa_electrolyzer;

pub use discretization::Discretization;
pub use dp::{backward_induction, DpResult, Extremum};
pub use file_dispatcher::FileDispatchStrategist;
pub use ppa_electrolyzer::PpaElectrolyzerStrategist;

use crate::device::Device;
use crate::error::{DispatchError, DispatchResult};
use crate::sensitivity::MeritOrderSensitivity;
use market_types::{DispatchSchedule, ScheduleEntry, TimePeriod};

/// What a strategist is given to plan against: a forecast — either a
/// per-hour electricity price, or a per-hour `MeritOrderSensitivity`.
#[derive(Debug, Clone)]
pub enum ValueSource {
    PriceForecast(Vec<f64>),
    Sensitivity(Vec<MeritOrderSensitivity>),
    /// No forecast delivered: the file dispatcher and the PPA electrolyzer
    /// strategist always run against this, and a price-taker accepts it as
    /// a best-effort fallback (see `Objective::accepts`); every other
    /// objective treats it as fatal.
    None,
}

impl ValueSource {
    fn len(&self) -> usize {
        match self {
            ValueSource::PriceForecast(v) => v.len(),
            ValueSource::Sensitivity(v) => v.len(),
            ValueSource::None => 0,
        }
    }
}

/// Hydrogen/PPA coupling parameters. The monthly-correlation variant is
/// an open design question and is represented by
/// `Coupling::MonthlyElectrolysis`, which always fails to plan.
#[derive(Debug, Clone)]
pub enum Coupling {
    None,
    /// Hourly green-hydrogen equivalence: revenue `Δe * conversion_factor *
    /// (hydrogenPrice[t] + supportRate)` is added whenever `Δe > 0`.
    HourlyElectrolysis {
        conversion_factor: f64,
        hydrogen_price_forecast: Vec<f64>,
        support_rate_eur_per_mwh: f64,
    },
    /// Not implemented — `plan` fails fast rather than silently falling
    /// back to the hourly variant.
    MonthlyElectrolysis,
}

/// The DP's optimisation target: min or max, over a price or a
/// sensitivity value source.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Objective {
    MaxProfitPriceTaker,
    MaxProfitPriceImpact,
    MinSystemCost,
}

impl Objective {
    fn extremum(self) -> Extremum {
        match self {
            Objective::MaxProfitPriceTaker | Objective::MaxProfitPriceImpact => Extremum::Max,
            Objective::MinSystemCost => Extremum::Min,
        }
    }

    fn name(self) -> &'static str {
        match self {
            Objective::MaxProfitPriceTaker => "single-agent-max-profit-price-taker",
            Objective::MaxProfitPriceImpact => "single-agent-max-profit",
            Objective::MinSystemCost => "single-agent-min-system-cost",
        }
    }

    fn accepts(self, value_source: &ValueSource) -> bool {
        matches!(
            (self, value_source),
            (Objective::MaxProfitPriceTaker, ValueSource::PriceForecast(_))
                | (Objective::MaxProfitPriceImpact, ValueSource::Sensitivity(_))
                | (Objective::MinSystemCost, ValueSource::Sensitivity(_))
                // Forecast unavailability is not fatal for a price-taker (spec
                // "forecast unavailability" in the error-handling design): it
                // plans against an implicit zero forecast instead, see `plan`.
                | (Objective::MaxProfitPriceTaker, ValueSource::None)
        )
    }
}

/// A flexibility dispatch strategist: given a forecast and a `Device`,
/// produces a forward `DispatchSchedule`.
pub trait Strategist {
    fn plan(
        &self,
        horizon_start: TimePeriod,
        device: &Device,
        operation_hours: f64,
        current_energy_mwh: f64,
        value_source: &ValueSource,
    ) -> DispatchResult<DispatchSchedule>;
}

/// The generic backward-induction strategist: one implementation serving
/// every DP-based `StrategistType` variant except `DISPATCH_FILE` (see
/// [`FileDispatchStrategist`]).
#[derive(Debug, Clone)]
pub struct DynamicProgrammingStrategist {
    pub objective: Objective,
    pub coupling: Coupling,
    pub discretization: Discretization,
    pub schedule_duration_periods: usize,
    pub scarcity_price_eur_per_mwh: f64,
    pub minimal_price_eur_per_mwh: f64,
}

impl DynamicProgrammingStrategist {
    fn transition_value(
        &self,
        t: usize,
        delta_e: f64,
        value_source: &ValueSource,
    ) -> f64 {
        let mut value = match (self.objective, value_source) {
            (Objective::MaxProfitPriceTaker, ValueSource::PriceForecast(prices)) => {
                -delta_e * prices[t]
            }
            (Objective::MaxProfitPriceImpact, ValueSource::Sensitivity(sensitivities)) => {
                sensitivities[t].monetary_value_at_delta(delta_e)
            }
            (Objective::MinSystemCost, ValueSource::Sensitivity(sensitivities)) => {
                -sensitivities[t].monetary_value_at_delta(delta_e)
            }
            _ => unreachable!("value source compatibility checked by Objective::accepts"),
        };

        if let Coupling::HourlyElectrolysis {
            conversion_factor,
            hydrogen_price_forecast,
            support_rate_eur_per_mwh,
        } = &self.coupling
        {
            if delta_e > 0.0 {
                let hydrogen_price = hydrogen_price_forecast.get(t).copied().unwrap_or(0.0);
                value += delta_e * conversion_factor * (hydrogen_price + support_rate_eur_per_mwh);
            }
        }

        value
    }

    fn bid_price(&self, t: usize, delta_e: f64, value_source: &ValueSource) -> f64 {
        if delta_e.abs() < 1e-12 {
            return f64::NAN;
        }
        match value_source {
            ValueSource::PriceForecast(_) => {
                if delta_e > 0.0 {
                    self.minimal_price_eur_per_mwh
                } else {
                    self.scarcity_price_eur_per_mwh
                }
            }
            ValueSource::Sensitivity(sensitivities) => sensitivities[t].marginal_price_at(delta_e),
        }
    }
}

impl Strategist for DynamicProgrammingStrategist {
    fn plan(
        &self,
        horizon_start: TimePeriod,
        device: &Device,
        operation_hours: f64,
        current_energy_mwh: f64,
        value_source: &ValueSource,
    ) -> DispatchResult<DispatchSchedule> {
        if matches!(self.coupling, Coupling::MonthlyElectrolysis) {
            return Err(DispatchError::MonthlyCouplingNotImplemented);
        }
        if !self.objective.accepts(value_source) {
            return Err(DispatchError::ForecastRejected {
                strategist: self.objective.name(),
            });
        }

        // No forecast delivered: best-effort for a price-taker is a flat
        // zero forecast over the scheduling horizon rather than a fatal
        // error (spec "forecast unavailability" in the error-handling
        // design).
        let zero_forecast;
        let value_source = if matches!(value_source, ValueSource::None) {
            tracing::warn!(
                strategist = self.objective.name(),
                "no forecast delivered, planning against an implicit zero forecast"
            );
            zero_forecast = ValueSource::PriceForecast(vec![0.0; self.schedule_duration_periods]);
            &zero_forecast
        } else {
            value_source
        };

        let horizon_hours = value_source.len();
        tracing::debug!(
            strategist = self.objective.name(),
            horizon_hours,
            states = self.discretization.num_energy_states,
            "running backward induction"
        );
        let dp = backward_induction(
            horizon_hours,
            &self.discretization,
            device,
            operation_hours,
            self.objective.extremum(),
            |t, i, j| {
                let delta_e = self.discretization.external_energy_step(
                    |internal| device.internal_to_external(internal),
                    i,
                    j,
                );
                Some(self.transition_value(t, delta_e, value_source))
            },
        )?;

        let start_state = self.discretization.nearest_state(current_energy_mwh);
        let duration = self.schedule_duration_periods.min(horizon_hours);
        let mut state = start_state;
        let mut entries = Vec::with_capacity(duration);
        for t in 0..duration {
            let next_state = dp.best_next[t][state];
            let delta_e = self.discretization.external_energy_step(
                |internal| device.internal_to_external(internal),
                state,
                next_state,
            );
            tracing::trace!(hour = t, from_state = state, to_state = next_state, delta_e, "selected transition");
            entries.push(ScheduleEntry::single(
                delta_e,
                self.bid_price(t, delta_e, value_source),
                self.discretization.state_energy_mwh(state),
            ));
            state = next_state;
        }

        tracing::info!(
            strategist = self.objective.name(),
            hours = entries.len(),
            "dispatch schedule built"
        );
        Ok(DispatchSchedule::new(horizon_start, entries))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use market_types::{DeviceParams, TimeStamp};

    fn device_1mwh() -> Device {
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

    #[test]
    fn scenario_s4_price_taker_alternates_with_price_cycle() {
        let device = device_1mwh();
        let strategist = DynamicProgrammingStrategist {
            objective: Objective::MaxProfitPriceTaker,
            coupling: Coupling::None,
            discretization: Discretization::new(11, 10, device.capacity_mwh()),
            schedule_duration_periods: 4,
            scarcity_price_eur_per_mwh: 3000.0,
            minimal_price_eur_per_mwh: -500.0,
        };
        let forecast = ValueSource::PriceForecast(vec![20.0, 80.0, 20.0, 80.0]);
        let horizon = TimePeriod::new(TimeStamp::from_ticks(0), 3600);
        let schedule = strategist
            .plan(horizon, &device, 1.0, 0.0, &forecast)
            .unwrap();

        assert!(schedule.entries[0].requested_energy_mwh > 0.0, "charges at t=0");
        assert!(schedule.entries[1].requested_energy_mwh < 0.0, "discharges at t=1");
        assert!(schedule.entries[2].requested_energy_mwh > 0.0, "charges at t=2");
        assert!(schedule.entries[3].requested_energy_mwh < 0.0, "discharges at t=3");
    }

    #[test]
    fn rejects_mismatched_value_source() {
        let device = device_1mwh();
        let strategist = DynamicProgrammingStrategist {
            objective: Objective::MaxProfitPriceImpact,
            coupling: Coupling::None,
            discretization: Discretization::new(11, 10, device.capacity_mwh()),
            schedule_duration_periods: 2,
            scarcity_price_eur_per_mwh: 3000.0,
            minimal_price_eur_per_mwh: -500.0,
        };
        let forecast = ValueSource::PriceForecast(vec![20.0, 80.0]);
        let horizon = TimePeriod::new(TimeStamp::from_ticks(0), 3600);
        let err = strategist
            .plan(horizon, &device, 1.0, 0.0, &forecast)
            .unwrap_err();
        assert!(matches!(err, DispatchError::ForecastRejected { .. }));
    }

    #[test]
    fn price_taker_without_forecast_plans_against_implicit_zero() {
        let device = device_1mwh();
        let strategist = DynamicProgrammingStrategist {
            objective: Objective::MaxProfitPriceTaker,
            coupling: Coupling::None,
            discretization: Discretization::new(11, 10, device.capacity_mwh()),
            schedule_duration_periods: 3,
            scarcity_price_eur_per_mwh: 3000.0,
            minimal_price_eur_per_mwh: -500.0,
        };
        let horizon = TimePeriod::new(TimeStamp::from_ticks(0), 3600);
        let schedule = strategist
            .plan(horizon, &device, 1.0, 0.0, &ValueSource::None)
            .unwrap();

        // Against a flat zero price forecast every transition is equally
        // (non-)valuable, so the best-effort schedule just holds position.
        assert_eq!(schedule.entries.len(), 3);
        for entry in &schedule.entries {
            assert!(entry.requested_energy_mwh.abs() < 1e-9);
        }
    }

    #[test]
    fn price_impact_objective_still_rejects_missing_forecast() {
        let device = device_1mwh();
        let strategist = DynamicProgrammingStrategist {
            objective: Objective::MaxProfitPriceImpact,
            coupling: Coupling::None,
            discretization: Discretization::new(11, 10, device.capacity_mwh()),
            schedule_duration_periods: 2,
            scarcity_price_eur_per_mwh: 3000.0,
            minimal_price_eur_per_mwh: -500.0,
        };
        let horizon = TimePeriod::new(TimeStamp::from_ticks(0), 3600);
        let err = strategist
            .plan(horizon, &device, 1.0, 0.0, &ValueSource::None)
            .unwrap_err();
        assert!(matches!(err, DispatchError::ForecastRejected { .. }));
    }

    #[test]
    fn monthly_electrolysis_coupling_is_not_implemented() {
        let device = device_1mwh();
        let strategist = DynamicProgrammingStrategist {
            objective: Objective::MaxProfitPriceTaker,
            coupling: Coupling::MonthlyElectrolysis,
            discretization: Discretization::new(11, 10, device.capacity_mwh()),
            schedule_duration_periods: 2,
            scarcity_price_eur_per_mwh: 3000.0,
            minimal_price_eur_per_mwh: -500.0,
        };
        let forecast = ValueSource::PriceForecast(vec![20.0, 80.0]);
        let horizon = TimePeriod::new(TimeStamp::from_ticks(0), 3600);
        let err = strategist
            .plan(horizon, &device, 1.0, 0.0, &forecast)
            .unwrap_err();
        assert!(matches!(err, DispatchError::MonthlyCouplingNotImplemented));
    }
}
