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

//! Storage device behaviour. The data shape lives in
//! `market_types::device`; this module is the `charge` state machine and
//! the discharge-deviation bookkeeping the file dispatcher and accounting
//! consume, kept in a ring buffer keyed by clearing step.

use market_types::{DeviceParams, DeviceState, TimeStamp};
use ringbuffer::{AllocRingBuffer, RingBuffer};

const DEVIATION_HISTORY_LEN: usize = 256;

/// A storage device: immutable design parameters, mutable physical state,
/// and a bounded history of self-discharge loss per clearing step.
#[derive(Debug)]
pub struct Device {
    pub params: DeviceParams,
    pub state: DeviceState,
    discharge_deviations: AllocRingBuffer<(TimeStamp, f64)>,
}

impl Device {
    #[must_use]
    pub fn new(params: DeviceParams, initial_energy_mwh: f64) -> Self {
        Self {
            params,
            state: DeviceState::new(initial_energy_mwh),
            discharge_deviations: AllocRingBuffer::new(DEVIATION_HISTORY_LEN),
        }
    }

    #[must_use]
    pub fn capacity_mwh(&self) -> f64 {
        self.params.capacity_mwh()
    }

    /// Maps an external (grid-side) energy delta to the internal
    /// (inside-the-tank) delta it produces, branching on sign.
    #[must_use]
    pub fn external_to_internal(&self, external: f64) -> f64 {
        if external >= 0.0 {
            external * self.params.charge_eff
        } else {
            external / self.params.discharge_eff
        }
    }

    /// Inverse of [`Device::external_to_internal`].
    #[must_use]
    pub fn internal_to_external(&self, internal: f64) -> f64 {
        if internal >= 0.0 {
            internal / self.params.charge_eff
        } else {
            internal * self.params.discharge_eff
        }
    }

    /// Applies one operation period of external power, returning the power
    /// actually realised after clipping to device bounds and accounting for
    /// self-discharge.
    pub fn charge(&mut self, external_power_mw: f64, operation_hours: f64, t: TimeStamp) -> f64 {
        let mut internal_delta = self.external_to_internal(external_power_mw * operation_hours);

        let max_charge = self.params.installed_power_mw * operation_hours * self.params.charge_eff;
        let max_discharge =
            self.params.installed_power_mw * operation_hours / self.params.discharge_eff;
        internal_delta = internal_delta.clamp(-max_discharge, max_charge);

        let previous = self.state.energy_in_storage_mwh;
        let self_loss = previous * self.params.self_discharge_per_hour * operation_hours;
        let capacity = self.capacity_mwh();
        let next = (previous + internal_delta - self_loss).clamp(0.0, capacity);

        let net_internal_change = next - previous;
        self.state.energy_in_storage_mwh = next;
        self.state.flow_accum_mwh += net_internal_change.abs();
        self.state.cycle_count += net_internal_change.abs() / (2.0 * capacity.max(f64::EPSILON));

        self.discharge_deviations.push((t, self_loss));

        let external_caused_internal = net_internal_change + self_loss;
        self.internal_to_external(external_caused_internal)
    }

    /// The self-discharge loss recorded for the most recent `charge` call at
    /// or before `t`, if still within the retained history.
    #[must_use]
    pub fn self_discharge_at(&self, t: TimeStamp) -> Option<f64> {
        self.discharge_deviations
            .iter()
            .rev()
            .find(|(ts, _)| *ts <= t)
            .map(|(_, loss)| *loss)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use market_types::DeviceParams;

    fn ideal_device() -> Device {
        Device::new(
            DeviceParams {
                charge_eff: 1.0,
                discharge_eff: 1.0,
                e2p_hours: 5.0,
                self_discharge_per_hour: 0.0,
                installed_power_mw: 2.0,
            },
            0.0,
        )
    }

    #[test]
    fn storage_cycle_matches_scenario_s3() {
        let mut device = ideal_device();
        assert_eq!(device.capacity_mwh(), 10.0);

        let e0 = device.charge(2.0, 1.0, TimeStamp::from_ticks(0));
        assert_eq!(e0, 2.0);
        assert_eq!(device.state.energy_in_storage_mwh, 2.0);

        let e1 = device.charge(2.0, 1.0, TimeStamp::from_ticks(3600));
        assert_eq!(e1, 2.0);
        assert_eq!(device.state.energy_in_storage_mwh, 4.0);

        let e2 = device.charge(-5.0, 1.0, TimeStamp::from_ticks(7200));
        assert_eq!(e2, -2.0);
        assert_eq!(device.state.energy_in_storage_mwh, 2.0);
    }

    #[test]
    fn repeated_zero_charge_is_monotone_and_settles() {
        let mut device = Device::new(
            DeviceParams {
                charge_eff: 0.95,
                discharge_eff: 0.95,
                e2p_hours: 4.0,
                self_discharge_per_hour: 0.01,
                installed_power_mw: 1.0,
            },
            3.0,
        );
        let mut previous = device.state.energy_in_storage_mwh;
        for i in 0..10 {
            device.charge(0.0, 1.0, TimeStamp::from_ticks(i * 3600));
            let current = device.state.energy_in_storage_mwh;
            assert!(current <= previous + 1e-9);
            previous = current;
        }
        assert!(previous >= 0.0);
    }

    #[test]
    fn external_to_internal_round_trips_within_power_band() {
        let device = ideal_device();
        for x in [-1.5, -0.5, 0.0, 0.5, 1.5] {
            let roundtrip = device.external_to_internal(device.internal_to_external(x));
            assert!((roundtrip - x).abs() < 1e-9);
        }
    }

    #[test]
    fn energy_stays_within_bounds() {
        let mut device = ideal_device();
        for i in 0..20 {
            device.charge(5.0, 1.0, TimeStamp::from_ticks(i * 3600));
            assert!(device.state.energy_in_storage_mwh >= 0.0);
            assert!(device.state.energy_in_storage_mwh <= device.capacity_mwh());
        }
    }
}
