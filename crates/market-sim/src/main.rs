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

mod cli;
mod runner;
mod scenarios;

use std::fs;

use anyhow::{Context, Result};
use clap::Parser;
use market_accounting::{InMemorySink, OutputSink, SqliteSink};
use market_types::AgentConfig;

use cli::{formatters, Cli, Commands, CompareArgs, RunArgs};

fn main() -> Result<()> {
    market_telemetry::init_tracing();
    let cli = Cli::parse();

    match cli.command {
        Commands::Run(args) => run(args),
        Commands::Compare(args) => compare(args),
    }
}

fn load_config(path: &std::path::Path) -> Result<AgentConfig> {
    let raw = fs::read_to_string(path)
        .with_context(|| format!("failed to read agent config at {}", path.display()))?;
    toml::from_str(&raw)
        .with_context(|| format!("failed to parse agent config at {}", path.display()))
}

fn run(args: RunArgs) -> Result<()> {
    let config = load_config(&args.config)?;
    let prices = args.scenario.generate(args.hours, args.seed);

    let sink: Box<dyn OutputSink> = match &args.db_path {
        Some(db_path) => Box::new(
            SqliteSink::open(db_path)
                .with_context(|| format!("failed to open {}", db_path.display()))?,
        ),
        None => Box::new(InMemorySink::new()),
    };

    let records = runner::run_agent(&config, &args.trader_id, &prices, sink.as_ref())?;
    formatters::print_run_table(&args.trader_id, &records);
    if let Some(csv_path) = &args.csv_path {
        formatters::write_csv(csv_path, &records)?;
        tracing::info!(path = %csv_path.display(), "wrote run results to csv");
    }

    Ok(())
}

fn compare(args: CompareArgs) -> Result<()> {
    let prices = args.scenario.generate(args.hours, args.seed);
    let sink = InMemorySink::new();

    let mut results = Vec::with_capacity(args.config.len());
    for config_path in &args.config {
        let config = load_config(config_path)?;
        let label = config_path
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_else(|| config_path.display().to_string());
        let records = runner::run_agent(&config, &label, &prices, &sink)?;
        results.push((label, records));
    }

    formatters::print_compare_table(&results);
    Ok(())
}
