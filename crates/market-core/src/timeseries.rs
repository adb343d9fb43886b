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

//! Time-series interpolation as an abstract capability: one trait, two
//! backing implementations — in-memory and file-loaded (via `csv`).

use market_types::TimeStamp;
use std::path::Path;

/// A sampled function of simulated time. All three accessors operate on the
/// same underlying samples, differing only in how they bridge the gaps
/// between them.
pub trait TimeSeries {
    /// Linear interpolation between the two samples bracketing `t`.
    fn value_linear(&self, t: TimeStamp) -> Option<f64>;

    /// Step-hold: the most recent sample at or before `t`.
    fn value_earlier_equal(&self, t: TimeStamp) -> Option<f64>;

    /// The first sample at or after `t`.
    fn value_later_equal(&self, t: TimeStamp) -> Option<f64>;
}

/// An in-memory, chronologically sorted table of `(TimeStamp, value)`
/// samples.
#[derive(Debug, Clone, Default)]
pub struct InMemorySeries {
    samples: Vec<(TimeStamp, f64)>,
}

impl InMemorySeries {
    /// Builds a series from samples, sorting them by time.
    #[must_use]
    pub fn new(mut samples: Vec<(TimeStamp, f64)>) -> Self {
        samples.sort_by_key(|(t, _)| *t);
        Self { samples }
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.samples.len()
    }

    fn partition_point(&self, t: TimeStamp) -> usize {
        self.samples.partition_point(|(ts, _)| *ts <= t)
    }
}

impl TimeSeries for InMemorySeries {
    fn value_linear(&self, t: TimeStamp) -> Option<f64> {
        if self.samples.is_empty() {
            return None;
        }
        let idx = self.partition_point(t);
        if idx == 0 {
            return Some(self.samples[0].1);
        }
        if idx == self.samples.len() {
            return Some(self.samples[self.samples.len() - 1].1);
        }
        let (t0, v0) = self.samples[idx - 1];
        let (t1, v1) = self.samples[idx];
        if t0 == t1 {
            return Some(v1);
        }
        let span = (t1 - t0) as f64;
        let frac = (t - t0) as f64 / span;
        Some(v0 + (v1 - v0) * frac)
    }

    fn value_earlier_equal(&self, t: TimeStamp) -> Option<f64> {
        if self.samples.is_empty() {
            return None;
        }
        let idx = self.partition_point(t);
        if idx == 0 {
            None
        } else {
            Some(self.samples[idx - 1].1)
        }
    }

    fn value_later_equal(&self, t: TimeStamp) -> Option<f64> {
        self.samples
            .iter()
            .find(|(ts, _)| *ts >= t)
            .map(|(_, v)| *v)
    }
}

/// A file-backed series loaded once at construction from a two-column CSV
/// (`tick,value`), then held in memory like `InMemorySeries`.
#[derive(Debug, Clone)]
pub struct CsvSeries {
    inner: InMemorySeries,
}

impl CsvSeries {
    pub fn load(path: impl AsRef<Path>) -> Result<Self, csv::Error> {
        let mut reader = csv::ReaderBuilder::new()
            .has_headers(true)
            .from_path(path)?;
        let mut samples = Vec::new();
        for record in reader.records() {
            let record = record?;
            let ticks: i64 = record
                .get(0)
                .and_then(|s| s.parse().ok())
                .unwrap_or_default();
            let value: f64 = record
                .get(1)
                .and_then(|s| s.parse().ok())
                .unwrap_or_default();
            samples.push((TimeStamp::from_ticks(ticks), value));
        }
        Ok(Self {
            inner: InMemorySeries::new(samples),
        })
    }
}

impl TimeSeries for CsvSeries {
    fn value_linear(&self, t: TimeStamp) -> Option<f64> {
        self.inner.value_linear(t)
    }

    fn value_earlier_equal(&self, t: TimeStamp) -> Option<f64> {
        self.inner.value_earlier_equal(t)
    }

    fn value_later_equal(&self, t: TimeStamp) -> Option<f64> {
        self.inner.value_later_equal(t)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn series() -> InMemorySeries {
        InMemorySeries::new(vec![
            (TimeStamp::from_ticks(0), 10.0),
            (TimeStamp::from_ticks(100), 20.0),
            (TimeStamp::from_ticks(200), 0.0),
        ])
    }

    #[test]
    fn linear_interpolates_between_samples() {
        let s = series();
        assert_eq!(s.value_linear(TimeStamp::from_ticks(50)), Some(15.0));
        assert_eq!(s.value_linear(TimeStamp::from_ticks(150)), Some(10.0));
    }

    #[test]
    fn earlier_equal_steps_down() {
        let s = series();
        assert_eq!(s.value_earlier_equal(TimeStamp::from_ticks(150)), Some(20.0));
        assert_eq!(s.value_earlier_equal(TimeStamp::from_ticks(0)), Some(10.0));
    }

    #[test]
    fn later_equal_steps_up() {
        let s = series();
        assert_eq!(s.value_later_equal(TimeStamp::from_ticks(150)), Some(0.0));
        assert_eq!(s.value_later_equal(TimeStamp::from_ticks(250)), None);
    }
}
