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

//! Builds a concrete dispatch [`Strategist`] from an [`AgentConfig`] — the
//! registry that builds one from configuration, replacing a deep
//! strategist class hierarchy with a single lookup by `StrategistType`.

use market_core::{
    Coupling, CsvSeries, Device, Discretization, DynamicProgrammingStrategist,
    FileDispatchStrategist, Objective, PpaElectrolyzerStrategist, Strategist,
};
use market_types::{AgentConfig, ConfigError, StrategistType};

/// Builds every non-electrolysis strategist variant directly from
/// configuration. Electrolysis coupling needs a hydrogen-price forecast and
/// conversion factor the static config tree does not carry on its own; use
/// [`build_electrolysis_strategist`] for that variant.
pub fn build_strategist(
    config: &AgentConfig,
    device: &Device,
) -> Result<Box<dyn Strategist>, ConfigError> {
    let discretization = Discretization::new(
        config.strategist.number_of_energy_states,
        config.strategist.number_of_transition_states,
        device.capacity_mwh(),
    );
    let scarcity = config.market.scarcity_price_eur_per_mwh;
    let minimal = config.market.minimal_price_eur_per_mwh;
    let schedule_duration_periods = config.strategist.schedule_duration_hours as usize;

    match config.strategist.strategist_type {
        StrategistType::SingleAgentMaxProfitPriceTaker => {
            Ok(Box::new(DynamicProgrammingStrategist {
                objective: Objective::MaxProfitPriceTaker,
                coupling: Coupling::None,
                discretization,
                schedule_duration_periods,
                scarcity_price_eur_per_mwh: scarcity,
                minimal_price_eur_per_mwh: minimal,
            }))
        }
        StrategistType::SingleAgentMaxProfit => Ok(Box::new(DynamicProgrammingStrategist {
            objective: Objective::MaxProfitPriceImpact,
            coupling: Coupling::None,
            discretization,
            schedule_duration_periods,
            scarcity_price_eur_per_mwh: scarcity,
            minimal_price_eur_per_mwh: minimal,
        })),
        StrategistType::SingleAgentMinSystemCost => Ok(Box::new(DynamicProgrammingStrategist {
            objective: Objective::MinSystemCost,
            coupling: Coupling::None,
            discretization,
            schedule_duration_periods,
            scarcity_price_eur_per_mwh: scarcity,
            minimal_price_eur_per_mwh: minimal,
        })),
        StrategistType::SingleAgentMaxProfitElectrolysis => Err(ConfigError::Invalid(
            "SINGLE_AGENT_MAX_PROFIT_ELECTROLYSIS requires a hydrogen-price forecast; build it \
             via build_electrolysis_strategist instead of build_strategist"
                .to_owned(),
        )),
        StrategistType::DispatchFile => {
            let file_dispatcher = config.file_dispatcher.as_ref().ok_or_else(|| {
                ConfigError::Invalid(
                    "strategist_type = DISPATCH_FILE requires a [file_dispatcher] section"
                        .to_owned(),
                )
            })?;
            let series = CsvSeries::load(&file_dispatcher.schedule_path).map_err(|source| {
                ConfigError::Invalid(format!(
                    "failed to load dispatch file {}: {source}",
                    file_dispatcher.schedule_path
                ))
            })?;
            Ok(Box::new(FileDispatchStrategist::new(
                series,
                schedule_duration_periods,
                file_dispatcher.dispatch_tolerance_mwh,
                scarcity,
                minimal,
            )))
        }
    }
}

/// Builds the hourly green-hydrogen electrolysis variant, which needs a
/// hydrogen-price forecast and support rate beyond what `AgentConfig`
/// carries on its own.
#[must_use]
pub fn build_electrolysis_strategist(
    config: &AgentConfig,
    device: &Device,
    conversion_factor: f64,
    hydrogen_price_forecast: Vec<f64>,
    support_rate_eur_per_mwh: f64,
) -> DynamicProgrammingStrategist {
    let discretization = Discretization::new(
        config.strategist.number_of_energy_states,
        config.strategist.number_of_transition_states,
        device.capacity_mwh(),
    );
    DynamicProgrammingStrategist {
        objective: Objective::MaxProfitPriceTaker,
        coupling: Coupling::HourlyElectrolysis {
            conversion_factor,
            hydrogen_price_forecast,
            support_rate_eur_per_mwh,
        },
        discretization,
        schedule_duration_periods: config.strategist.schedule_duration_hours as usize,
        scarcity_price_eur_per_mwh: config.market.scarcity_price_eur_per_mwh,
        minimal_price_eur_per_mwh: config.market.minimal_price_eur_per_mwh,
    }
}

/// Builds the PPA-capped electrolyzer variant (spec §4.4.5, hourly case): a
/// per-hour rating-and-yield cap plus a surplus-sale bid, rather than a
/// dynamic program. Like [`build_electrolysis_strategist`], the PPA yield
/// potential and hydrogen price come from the contract and forecast feed
/// rather than the static config tree, so they are taken as arguments here
/// instead of a `StrategistType` match arm.
#[must_use]
pub fn build_ppa_electrolyzer_strategist(
    config: &AgentConfig,
    conversion_factor: f64,
    yield_potential_forecast_mwh: Vec<f64>,
    hydrogen_price_forecast_eur_per_mwh: Vec<f64>,
    support_rate_eur_per_mwh: f64,
) -> PpaElectrolyzerStrategist {
    PpaElectrolyzerStrategist {
        yield_potential_forecast_mwh,
        conversion_factor,
        hydrogen_price_forecast_eur_per_mwh,
        support_rate_eur_per_mwh,
        schedule_duration_periods: config.strategist.schedule_duration_hours as usize,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use market_types::{
        DeviceConfig, DistributionMethod, MarketConfig, StrategistConfig,
    };

    fn base_config(strategist_type: StrategistType) -> AgentConfig {
        AgentConfig {
            device: DeviceConfig {
                energy_to_power_ratio_hours: 4.0,
                self_discharge_rate_per_hour: 0.0,
                charging_efficiency: 0.95,
                discharging_efficiency: 0.95,
                initial_energy_level_mwh: 0.0,
                installed_power_mw: 2.0,
            },
            strategist: StrategistConfig {
                strategist_type,
                forecast_period_hours: 24,
                schedule_duration_hours: 24,
                bid_tolerance_eur_per_mwh: 0.01,
                number_of_energy_states: 11,
                number_of_transition_states: 10,
            },
            file_dispatcher: None,
            market: MarketConfig {
                scarcity_price_eur_per_mwh: 3000.0,
                minimal_price_eur_per_mwh: -500.0,
                distribution_method: DistributionMethod::FirstComeFirstServe,
                rng_seed: 0,
            },
        }
    }

    #[test]
    fn builds_price_taker_from_config() {
        let config = base_config(StrategistType::SingleAgentMaxProfitPriceTaker);
        let device = Device::new(config.device.into(), 0.0);
        assert!(build_strategist(&config, &device).is_ok());
    }

    #[test]
    fn dispatch_file_without_section_is_a_config_error() {
        let config = base_config(StrategistType::DispatchFile);
        let device = Device::new(config.device.into(), 0.0);
        let err = build_strategist(&config, &device).unwrap_err();
        assert!(matches!(err, ConfigError::Invalid(_)));
    }

    #[test]
    fn electrolysis_variant_is_rejected_by_plain_builder() {
        let config = base_config(StrategistType::SingleAgentMaxProfitElectrolysis);
        let device = Device::new(config.device.into(), 0.0);
        assert!(build_strategist(&config, &device).is_err());
    }

    #[test]
    fn builds_ppa_electrolyzer_from_config_and_contract_forecasts() {
        let config = base_config(StrategistType::SingleAgentMaxProfitPriceTaker);
        let strategist = build_ppa_electrolyzer_strategist(
            &config,
            0.7,
            vec![1.0; 24],
            vec![50.0; 24],
            10.0,
        );
        assert_eq!(strategist.schedule_duration_periods, 24);
        assert_eq!(strategist.yield_potential_forecast_mwh.len(), 24);
    }
}
