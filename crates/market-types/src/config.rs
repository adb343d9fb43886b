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

//! Typed configuration tree, loaded from TOML by `market-sim`.

use serde::{Deserialize, Serialize};

/// `Device` design parameters as they appear in a configuration file.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DeviceConfig {
    pub energy_to_power_ratio_hours: f64,
    #[serde(default)]
    pub self_discharge_rate_per_hour: f64,
    pub charging_efficiency: f64,
    pub discharging_efficiency: f64,
    #[serde(default)]
    pub initial_energy_level_mwh: f64,
    pub installed_power_mw: f64,
}

impl From<DeviceConfig> for crate::device::DeviceParams {
    fn from(c: DeviceConfig) -> Self {
        crate::device::DeviceParams {
            charge_eff: c.charging_efficiency,
            discharge_eff: c.discharging_efficiency,
            e2p_hours: c.energy_to_power_ratio_hours,
            self_discharge_per_hour: c.self_discharge_rate_per_hour,
            installed_power_mw: c.installed_power_mw,
        }
    }
}

/// Which dynamic-programming objective (or non-DP fallback) the strategist
/// implements.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum StrategistType {
    /// Reads a relative charging series from file.
    DispatchFile,
    /// Profit maximiser, price-taker (simple forecast price).
    SingleAgentMaxProfitPriceTaker,
    /// Profit maximiser with price impact (uses the full sensitivity).
    SingleAgentMaxProfit,
    /// System-cost minimiser.
    SingleAgentMinSystemCost,
    /// Electrolyzer with hourly green-hydrogen (PPA) coupling.
    SingleAgentMaxProfitElectrolysis,
}

/// Distribution policy for residual power among price-setting bids.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DistributionMethod {
    FirstComeFirstServe,
    SameShares,
    Randomize,
}

/// Strategist configuration.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct StrategistConfig {
    pub strategist_type: StrategistType,
    pub forecast_period_hours: u32,
    pub schedule_duration_hours: u32,
    #[serde(default = "default_bid_tolerance")]
    pub bid_tolerance_eur_per_mwh: f64,
    pub number_of_energy_states: usize,
    pub number_of_transition_states: usize,
}

fn default_bid_tolerance() -> f64 {
    0.01
}

/// Configuration for the file-dispatch strategist variant.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FileDispatcherConfig {
    /// Path to a CSV time series of relative charging values in `[-1, 1]`.
    pub schedule_path: String,
    #[serde(default = "default_dispatch_tolerance")]
    pub dispatch_tolerance_mwh: f64,
}

fn default_dispatch_tolerance() -> f64 {
    0.1
}

/// Legal price bounds and clearing policy, lifted into a configuration
/// struct carried by the market clearing component.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MarketConfig {
    pub scarcity_price_eur_per_mwh: f64,
    pub minimal_price_eur_per_mwh: f64,
    #[serde(default)]
    pub distribution_method: DistributionMethod,
    /// Seed for the distribution RNG, carried in configuration so runs are
    /// reproducible.
    #[serde(default)]
    pub rng_seed: u64,
}

impl Default for DistributionMethod {
    fn default() -> Self {
        DistributionMethod::FirstComeFirstServe
    }
}

impl Default for MarketConfig {
    fn default() -> Self {
        Self {
            scarcity_price_eur_per_mwh: 3000.0,
            minimal_price_eur_per_mwh: -500.0,
            distribution_method: DistributionMethod::FirstComeFirstServe,
            rng_seed: 0,
        }
    }
}

/// Root configuration tree for a single flexibility agent (device +
/// strategist + market bounds). `market-sim` loads one of these per agent
/// from a TOML scenario file.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AgentConfig {
    pub device: DeviceConfig,
    pub strategist: StrategistConfig,
    #[serde(default)]
    pub file_dispatcher: Option<FileDispatcherConfig>,
    #[serde(default)]
    pub market: MarketConfig,
}
