// Copyright (c) 2025 SOLARE S.R.O.
//
// This file is part of FluxION.

//! Drives one agent through a price scenario: build its `Strategist` from
//! configuration, plan a schedule, then walk the device through it hour by
//! hour exactly as `Strategist::plan`'s forward walk assumed, recording one
//! `StepRecord` per hour via an `OutputSink`.

use anyhow::{bail, Context, Result};
use market_accounting::{OutputSink, StepRecord};
use market_core::{Device, Strategist, ValueSource};
use market_types::{AgentConfig, AwardData, StrategistType, TimePeriod, TimeStamp};

/// Runs one agent across the given hourly price forecast, awarding every
/// hour at the forecast price (the price-taker assumption `ValueSource::
/// PriceForecast` already encodes) and persisting a `StepRecord` per hour.
///
/// Only strategist types that need nothing but a plain price forecast (or
/// no forecast at all) are supported here; sensitivity-driven objectives
/// need a full multi-agent clearing loop which is out of scope for this
/// CLI.
pub fn run_agent(
    config: &AgentConfig,
    trader_id: &str,
    prices: &[f64],
    sink: &dyn OutputSink,
) -> Result<Vec<StepRecord>> {
    let device_params: market_types::DeviceParams = config.device.into();
    let mut device = Device::new(device_params, config.device.initial_energy_level_mwh);

    let strategist = market_plugins::build_strategist(config, &device)
        .context("failed to build strategist from configuration")?;

    let value_source = match config.strategist.strategist_type {
        StrategistType::SingleAgentMaxProfitPriceTaker => {
            ValueSource::PriceForecast(prices.to_vec())
        }
        StrategistType::DispatchFile => ValueSource::None,
        other => bail!(
            "market-sim only drives SINGLE_AGENT_MAX_PROFIT_PRICE_TAKER and DISPATCH_FILE \
             strategists end-to-end; {other:?} needs a sensitivity forecast from a full \
             market-clearing loop"
        ),
    };

    let operation_hours = 1.0;
    let horizon_start = TimePeriod::new(TimeStamp::from_ticks(0), 3600);
    let schedule = strategist
        .plan(
            horizon_start,
            &device,
            operation_hours,
            device.state.energy_in_storage_mwh,
            &value_source,
        )
        .context("strategist failed to produce a dispatch schedule")?;

    let mut records = Vec::with_capacity(schedule.entries.len());
    for (offset, entry) in schedule.entries.iter().enumerate() {
        let period = schedule.period_at(offset);
        let external_power_mw = entry.requested_energy_mwh / operation_hours;
        let realized_external = device.charge(external_power_mw, operation_hours, period.start);

        let award = AwardData {
            time: period.start,
            trader_id: trader_id.to_owned(),
            awarded_power_mwh: realized_external,
            awarded_price_eur_per_mwh: prices
                .get(offset)
                .copied()
                .unwrap_or(entry.bid_price_eur_per_mwh),
        };
        let record = StepRecord::from_award(&award, Some(device.state.energy_in_storage_mwh));
        sink.record_step(&record)
            .context("failed to persist step record")?;
        records.push(record);
    }

    Ok(records)
}
