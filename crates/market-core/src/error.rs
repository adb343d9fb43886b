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

//! Error taxonomy for the clearing and dispatch core (spec "Error handling
//! design"): configuration errors abort construction, constraint violations
//! are fatal to the offending agent's run, forecast unavailability is
//! handled per strategist subtype, and award/settlement mismatches are
//! logged as warnings rather than raised.

use market_types::{ConfigError, NegativeBidEnergy};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum DispatchError {
    #[error("bid rejected: {0}")]
    NegativeBidEnergy(#[from] NegativeBidEnergy),

    #[error("bid price {price} EUR/MWh outside legal band [{minimal}, {scarcity}]")]
    PriceOutOfBand {
        price: f64,
        minimal: f64,
        scarcity: f64,
    },

    #[error("bid placed on book for the wrong side: expected {expected}, got {actual}")]
    WrongSide { expected: String, actual: String },

    #[error("no feasible state transition from energy state {from} at step {step}")]
    NoFeasibleTransition { from: usize, step: usize },

    #[error("strategist {strategist} does not accept a forecast of this kind")]
    ForecastRejected { strategist: &'static str },

    #[error("dispatch file trajectory infeasible for device: requested {requested} MWh at hour {hour}, bounds [0, {capacity}]")]
    DispatchFileInfeasible {
        hour: usize,
        requested: f64,
        capacity: f64,
    },

    #[error("monthly hydrogen-correlation coupling is not implemented")]
    MonthlyCouplingNotImplemented,

    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("missing time series sample at or around {0}")]
    TimeSeriesGap(market_types::TimeStamp),
}

pub type DispatchResult<T> = std::result::Result<T, DispatchError>;
