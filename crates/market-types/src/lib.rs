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

//! Shared data model for the wholesale market clearing and dispatch core.
//!
//! This crate holds plain data types only — the `TimeStamp` a clock
//! produces, the `Bid` a trader submits, the `DeviceState` a storage device
//! carries between steps. Behaviour lives in `market-core`.

pub mod bid;
pub mod config;
pub mod device;
pub mod error;
pub mod messages;
pub mod schedule;
pub mod sensitivity;
pub mod time;

pub use bid::{Bid, BidAtTime, NegativeBidEnergy, OrderBookItem, Side, TraderId};
pub use config::{
    AgentConfig, DeviceConfig, DistributionMethod, FileDispatcherConfig, MarketConfig,
    StrategistConfig, StrategistType,
};
pub use device::{DeviceParams, DeviceState};
pub use error::{ConfigError, ConfigResult};
pub use messages::{AmountAtTime, AwardData, BidsAtTime, ClearingTimes, PointInTime};
pub use schedule::{DispatchSchedule, ScheduleEntry};
pub use sensitivity::{SensitivityItem, SensitivityKind};
pub use time::{TimePeriod, TimeStamp};
