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

//! The generic backward-induction optimiser shared by every dynamic
//! programming strategist variant, parameterised by a transition-value
//! closure rather than duplicated per objective.

use super::discretization::Discretization;
use crate::device::Device;
use crate::error::{DispatchError, DispatchResult};

/// Whether the recurrence picks the best (`Max`, profit/value maximisers)
/// or worst (`Min`, cost minimisers) continuation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Extremum {
    Max,
    Min,
}

/// Backward-induction result: per-step value array and the argmax/argmin
/// transition recorded at each `(t, i)`.
#[derive(Debug, Clone)]
pub struct DpResult {
    pub value: Vec<Vec<f64>>,
    pub best_next: Vec<Vec<usize>>,
}

/// Runs the backward-induction recurrence over `horizon_hours` periods.
/// `transition_value(t, i, j)` returns the one-period value of moving from
/// state `i` to state `j` at step `t`, or `None` if the device's power
/// rating makes that transition infeasible regardless of state bounds.
///
/// Ties in the extremum are broken toward the lowest `j`.
pub fn backward_induction(
    horizon_hours: usize,
    discretization: &Discretization,
    device: &Device,
    operation_hours: f64,
    extremum: Extremum,
    mut transition_value: impl FnMut(usize, usize, usize) -> Option<f64>,
) -> DispatchResult<DpResult> {
    let states = discretization.num_energy_states;
    let mut value = vec![vec![0.0_f64; states]; horizon_hours + 1];
    let mut best_next = vec![vec![0usize; states]; horizon_hours];

    for t in (0..horizon_hours).rev() {
        for i in 0..states {
            let lower = discretization.lower_final_state(i);
            let upper = discretization.upper_final_state(i);
            let mut best_value: Option<f64> = None;
            let mut best_j = lower;

            for j in lower..=upper {
                let external_delta = discretization.external_energy_step(
                    |internal| device.internal_to_external(internal),
                    i,
                    j,
                );
                if external_delta.abs()
                    > device.params.installed_power_mw * operation_hours + 1e-9
                {
                    continue;
                }
                let Some(step_value) = transition_value(t, i, j) else {
                    continue;
                };
                let total = step_value + value[t + 1][j];
                let improves = match (extremum, best_value) {
                    (_, None) => true,
                    (Extremum::Max, Some(best)) => total > best + 1e-12,
                    (Extremum::Min, Some(best)) => total < best - 1e-12,
                };
                if improves {
                    best_value = Some(total);
                    best_j = j;
                }
            }

            match best_value {
                Some(v) => {
                    value[t][i] = v;
                    best_next[t][i] = best_j;
                }
                None => {
                    return Err(DispatchError::NoFeasibleTransition { from: i, step: t });
                }
            }
        }
    }

    Ok(DpResult { value, best_next })
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
                e2p_hours: 1.0,
                self_discharge_per_hour: 0.0,
                installed_power_mw: 1.0,
            },
            0.0,
        )
    }

    #[test]
    fn picks_highest_value_under_max_extremum() {
        let device = ideal_device();
        let discretization = Discretization::new(11, 10, device.capacity_mwh());
        let result = backward_induction(1, &discretization, &device, 1.0, Extremum::Max, |_, i, j| {
            Some(if j > i { 10.0 } else { 0.0 })
        })
        .unwrap();
        assert_eq!(result.best_next[0][0], 10);
    }

    #[test]
    fn picks_lowest_value_under_min_extremum() {
        let device = ideal_device();
        let discretization = Discretization::new(11, 10, device.capacity_mwh());
        let result = backward_induction(1, &discretization, &device, 1.0, Extremum::Min, |_, i, j| {
            Some(if j > i { 10.0 } else { 0.0 })
        })
        .unwrap();
        assert_eq!(result.best_next[0][0], 0);
    }
}
