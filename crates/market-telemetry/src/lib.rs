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

//! One entry point, [`init_tracing`], wiring a `tracing-subscriber`
//! `EnvFilter` so every crate's `tracing::{debug,info,warn,error}` calls
//! reach the terminal with a consistent format.

use tracing_subscriber::EnvFilter;

/// Installs the global tracing subscriber. `RUST_LOG` selects verbosity
/// (e.g. `RUST_LOG=market_core=debug`); defaults to `info` when unset.
pub fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .try_init()
        .ok();
}
