// Copyright (c) 2025 SOLARE S.R.O.
//
// This file is part of FluxION.

//! CLI argument definitions using clap.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

use crate::scenarios::PriceScenario;

#[derive(Parser)]
#[command(name = "market-sim")]
#[command(author, version, about = "Market dispatch simulator CLI")]
#[command(
    long_about = "Exercises a dispatch strategist against a synthetic price forecast.\n\
    \nExamples:\n  \
    market-sim run --config agent.toml\n  \
    market-sim run --config agent.toml --scenario volatile --hours 48\n  \
    market-sim compare --config price-taker.toml --config min-cost.toml"
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Run a single agent against a synthetic price scenario
    Run(RunArgs),
    /// Compare settlement totals for several agent configurations
    Compare(CompareArgs),
}

#[derive(Parser)]
pub struct RunArgs {
    /// Path to a TOML agent configuration file
    #[arg(long)]
    pub config: PathBuf,

    /// Synthetic price scenario to simulate against
    #[arg(long, value_enum, default_value_t = PriceScenario::UsualDay)]
    pub scenario: PriceScenario,

    /// Number of hours to simulate
    #[arg(long, default_value_t = 24)]
    pub hours: u32,

    /// Seed for the synthetic price generator
    #[arg(long, default_value_t = 0)]
    pub seed: u64,

    /// Trader identifier attached to every recorded settlement
    #[arg(long, default_value = "agent-1")]
    pub trader_id: String,

    /// Optional CSV file to also write the per-hour results to
    #[arg(long)]
    pub csv_path: Option<PathBuf>,

    /// Optional SQLite database to persist results into (in addition to
    /// the table/CSV output)
    #[arg(long)]
    pub db_path: Option<PathBuf>,
}

#[derive(Parser)]
pub struct CompareArgs {
    /// Path to a TOML agent configuration file; pass more than once to
    /// compare several agents against the same price scenario
    #[arg(long, required = true, num_args = 1..)]
    pub config: Vec<PathBuf>,

    /// Synthetic price scenario to simulate against
    #[arg(long, value_enum, default_value_t = PriceScenario::UsualDay)]
    pub scenario: PriceScenario,

    /// Number of hours to simulate
    #[arg(long, default_value_t = 24)]
    pub hours: u32,

    /// Seed for the synthetic price generator
    #[arg(long, default_value_t = 0)]
    pub seed: u64,
}
