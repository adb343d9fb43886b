// Copyright (c) 2025 SOLARE S.R.O.
//
// This file is part of FluxION.

//! Output formatters for CLI simulation results.

use std::path::Path;

use anyhow::Result;
use comfy_table::{presets::UTF8_FULL, Attribute, Cell, Table};
use market_accounting::StepRecord;

/// Pretty-prints one agent's per-hour run as a table.
pub fn print_run_table(trader_id: &str, records: &[StepRecord]) {
    let mut table = Table::new();
    table.load_preset(UTF8_FULL);
    table.set_header(vec![
        Cell::new("Hour").add_attribute(Attribute::Bold),
        Cell::new("Awarded MWh").add_attribute(Attribute::Bold),
        Cell::new("Price EUR/MWh").add_attribute(Attribute::Bold),
        Cell::new("Settlement EUR").add_attribute(Attribute::Bold),
        Cell::new("Device MWh").add_attribute(Attribute::Bold),
    ]);

    for (hour, record) in records.iter().enumerate() {
        table.add_row(vec![
            Cell::new(hour),
            Cell::new(format!("{:.3}", record.awarded_power_mwh)),
            Cell::new(format!("{:.2}", record.awarded_price_eur_per_mwh)),
            Cell::new(format!("{:.2}", record.settlement_eur)),
            Cell::new(
                record
                    .device_energy_after_mwh
                    .map(|e| format!("{e:.3}"))
                    .unwrap_or_else(|| "-".to_owned()),
            ),
        ]);
    }

    let total_settlement: f64 = records.iter().map(|r| r.settlement_eur).sum();
    println!("{table}");
    println!("{trader_id}: total settlement {total_settlement:.2} EUR over {} hours", records.len());
}

/// Prints a one-row-per-agent comparison table, ranked by total
/// settlement (lower/more negative is better for the agent paying for
/// energy; the sign convention follows `AwardData::settlement_eur`).
pub fn print_compare_table(results: &[(String, Vec<StepRecord>)]) {
    let mut table = Table::new();
    table.load_preset(UTF8_FULL);
    table.set_header(vec![
        Cell::new("Agent").add_attribute(Attribute::Bold),
        Cell::new("Hours").add_attribute(Attribute::Bold),
        Cell::new("Total Settlement EUR").add_attribute(Attribute::Bold),
        Cell::new("Final Device MWh").add_attribute(Attribute::Bold),
    ]);

    let mut ranked: Vec<&(String, Vec<StepRecord>)> = results.iter().collect();
    ranked.sort_by(|a, b| {
        let total_a: f64 = a.1.iter().map(|r| r.settlement_eur).sum();
        let total_b: f64 = b.1.iter().map(|r| r.settlement_eur).sum();
        total_a.partial_cmp(&total_b).expect("settlements are never NaN")
    });

    for (label, records) in ranked {
        let total: f64 = records.iter().map(|r| r.settlement_eur).sum();
        let final_energy = records
            .last()
            .and_then(|r| r.device_energy_after_mwh)
            .map(|e| format!("{e:.3}"))
            .unwrap_or_else(|| "-".to_owned());
        table.add_row(vec![
            Cell::new(label),
            Cell::new(records.len()),
            Cell::new(format!("{total:.2}")),
            Cell::new(final_energy),
        ]);
    }

    println!("{table}");
}

/// Writes the per-hour records of a run to CSV.
pub fn write_csv(path: &Path, records: &[StepRecord]) -> Result<()> {
    let mut writer = csv::Writer::from_path(path)?;
    writer.write_record([
        "time_ticks",
        "trader_id",
        "awarded_power_mwh",
        "awarded_price_eur_per_mwh",
        "settlement_eur",
        "device_energy_after_mwh",
    ])?;
    for record in records {
        writer.write_record([
            record.time.ticks().to_string(),
            record.trader_id.clone(),
            record.awarded_power_mwh.to_string(),
            record.awarded_price_eur_per_mwh.to_string(),
            record.settlement_eur.to_string(),
            record
                .device_energy_after_mwh
                .map(|e| e.to_string())
                .unwrap_or_default(),
        ])?;
    }
    writer.flush()?;
    Ok(())
}
