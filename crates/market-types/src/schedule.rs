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

//! Bid schedule data. Construction (the dynamic-programming forward walk)
//! lives in `market-core::strategy`; this module defines the shape and the
//! applicability check the trader uses to decide whether to reuse a
//! schedule or request a new one.

use crate::time::{TimePeriod, TimeStamp};
use serde::{Deserialize, Serialize};

/// One hour's worth of a forward dispatch plan.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ScheduleEntry {
    /// Scheduled external energy delta for the hour; positive charges the
    /// device, negative discharges it.
    pub requested_energy_mwh: f64,
    /// The price the trader should bid at for this hour. `NaN` when the
    /// requested energy is zero (no bid needed).
    pub bid_price_eur_per_mwh: f64,
    /// Internal energy the device is expected to hold at the start of this
    /// hour, used to detect stale schedules.
    pub expected_initial_internal_energy_mwh: f64,
    /// A second, independent supply bid for the hour, alongside the primary
    /// one above. Used by PPA-coupled electrolyzer strategists to offer
    /// surplus contracted yield the rating cap left unconsumed; `None` for
    /// every other strategist, which only ever produces one bid per hour.
    pub surplus_energy_mwh: Option<f64>,
    pub surplus_bid_price_eur_per_mwh: Option<f64>,
}

impl ScheduleEntry {
    /// A single-bid entry, the common case for every strategist but the
    /// PPA-coupled electrolyzer.
    #[must_use]
    pub fn single(
        requested_energy_mwh: f64,
        bid_price_eur_per_mwh: f64,
        expected_initial_internal_energy_mwh: f64,
    ) -> Self {
        Self {
            requested_energy_mwh,
            bid_price_eur_per_mwh,
            expected_initial_internal_energy_mwh,
            surplus_energy_mwh: None,
            surplus_bid_price_eur_per_mwh: None,
        }
    }
}

/// A forward plan covering one scheduling horizon, produced once per
/// scheduling event by a `Strategist`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DispatchSchedule {
    /// The first hour this schedule covers.
    pub horizon_start: TimePeriod,
    pub entries: Vec<ScheduleEntry>,
}

impl DispatchSchedule {
    #[must_use]
    pub fn new(horizon_start: TimePeriod, entries: Vec<ScheduleEntry>) -> Self {
        Self {
            horizon_start,
            entries,
        }
    }

    /// The period this schedule covers for hour-offset `t` from the start.
    #[must_use]
    pub fn period_at(&self, offset: usize) -> TimePeriod {
        self.horizon_start.shift_by_duration(offset as i64)
    }

    fn offset_for(&self, t: TimeStamp) -> Option<usize> {
        if self.entries.is_empty() {
            return None;
        }
        let duration = self.horizon_start.duration_ticks;
        if duration <= 0 {
            return None;
        }
        let delta = t - self.horizon_start.start;
        if delta < 0 {
            return None;
        }
        let offset = (delta / duration) as usize;
        if offset < self.entries.len() {
            Some(offset)
        } else {
            None
        }
    }

    #[must_use]
    pub fn entry_at(&self, t: TimeStamp) -> Option<&ScheduleEntry> {
        self.offset_for(t).map(|i| &self.entries[i])
    }

    /// A schedule is applicable at `t` iff `t` falls inside its covered
    /// window *and* the device's actual initial energy matches the
    /// schedule's expectation within `tolerance_mwh`.
    #[must_use]
    pub fn is_applicable_at(
        &self,
        t: TimeStamp,
        actual_initial_energy_mwh: f64,
        tolerance_mwh: f64,
    ) -> bool {
        match self.entry_at(t) {
            Some(entry) => {
                (entry.expected_initial_internal_energy_mwh - actual_initial_energy_mwh).abs()
                    <= tolerance_mwh
            }
            None => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_schedule() -> DispatchSchedule {
        let start = TimePeriod::new(TimeStamp::from_ticks(0), 3600);
        DispatchSchedule::new(
            start,
            vec![
                ScheduleEntry::single(1.0, 10.0, 5.0),
                ScheduleEntry::single(-1.0, 90.0, 6.0),
            ],
        )
    }

    #[test]
    fn applicable_within_tolerance() {
        let sched = sample_schedule();
        assert!(sched.is_applicable_at(TimeStamp::from_ticks(3600), 6.02, 0.1));
        assert!(!sched.is_applicable_at(TimeStamp::from_ticks(3600), 6.5, 0.1));
    }

    #[test]
    fn not_applicable_outside_window() {
        let sched = sample_schedule();
        assert!(!sched.is_applicable_at(TimeStamp::from_ticks(7200), 7.0, 0.1));
    }
}
