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

//! Monotonic simulation time. The kernel that advances this clock is an
//! external collaborator; this module only defines the value types the
//! core computes with.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::{Add, Sub};

/// An opaque, monotonic step count at a fixed base resolution (by
/// convention, 1-second ticks — see `Clock::TICK_SECONDS` in `market-core`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct TimeStamp(i64);

impl TimeStamp {
    #[must_use]
    pub const fn from_ticks(ticks: i64) -> Self {
        Self(ticks)
    }

    #[must_use]
    pub const fn ticks(self) -> i64 {
        self.0
    }

    #[must_use]
    pub fn plus_ticks(self, ticks: i64) -> Self {
        Self(self.0 + ticks)
    }
}

impl fmt::Display for TimeStamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "t={}", self.0)
    }
}

impl Add<i64> for TimeStamp {
    type Output = TimeStamp;
    fn add(self, rhs: i64) -> TimeStamp {
        TimeStamp(self.0 + rhs)
    }
}

impl Sub for TimeStamp {
    type Output = i64;
    fn sub(self, rhs: TimeStamp) -> i64 {
        self.0 - rhs.0
    }
}

/// A half-open window `[start, start + duration)` measured in ticks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimePeriod {
    pub start: TimeStamp,
    pub duration_ticks: i64,
}

impl TimePeriod {
    #[must_use]
    pub const fn new(start: TimeStamp, duration_ticks: i64) -> Self {
        Self {
            start,
            duration_ticks,
        }
    }

    #[must_use]
    pub fn end(self) -> TimeStamp {
        self.start.plus_ticks(self.duration_ticks)
    }

    #[must_use]
    pub fn contains(self, t: TimeStamp) -> bool {
        t >= self.start && t < self.end()
    }

    /// Returns the period offset forward by `k` full durations.
    #[must_use]
    pub fn shift_by_duration(self, k: i64) -> Self {
        Self {
            start: self.start.plus_ticks(self.duration_ticks * k),
            duration_ticks: self.duration_ticks,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn shift_by_duration_offsets_start_only() {
        let p = TimePeriod::new(TimeStamp::from_ticks(3600), 3600);
        let shifted = p.shift_by_duration(2);
        assert_eq!(shifted.start.ticks(), 3600 + 2 * 3600);
        assert_eq!(shifted.duration_ticks, 3600);
    }

    #[test]
    fn contains_is_half_open() {
        let p = TimePeriod::new(TimeStamp::from_ticks(0), 100);
        assert!(p.contains(TimeStamp::from_ticks(0)));
        assert!(p.contains(TimeStamp::from_ticks(99)));
        assert!(!p.contains(TimeStamp::from_ticks(100)));
    }
}
