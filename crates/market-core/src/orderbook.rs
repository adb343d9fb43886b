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

//! Order books and merit-order clearing. A runtime `sorted: bool` flag
//! becomes a type-level split here: `UnsortedBook<K>` only accepts new
//! bids, `SortedBook<K>` is closed and offers awards.

use crate::error::{DispatchError, DispatchResult};
use market_types::{Bid, DistributionMethod, OrderBookItem, Side};
use rand::seq::SliceRandom;
use rand::RngCore;
use std::marker::PhantomData;

/// A market side, fixed at the type level so a supply book and a demand
/// book can never be confused with one another.
pub trait BookKind: Copy + std::fmt::Debug {
    const SIDE: Side;

    /// Sort key such that ascending order yields the book's merit order
    /// (ascending price for supply, descending price for demand).
    fn sort_key(price: f64) -> f64;

    /// Price of the virtual zero-power tail bid appended by `sort()`.
    fn tail_price(scarcity_price: f64, minimal_price: f64) -> f64;
}

#[derive(Debug, Clone, Copy)]
pub struct SupplySide;

impl BookKind for SupplySide {
    const SIDE: Side = Side::Supply;

    fn sort_key(price: f64) -> f64 {
        price
    }

    fn tail_price(scarcity_price: f64, _minimal_price: f64) -> f64 {
        scarcity_price
    }
}

#[derive(Debug, Clone, Copy)]
pub struct DemandSide;

impl BookKind for DemandSide {
    const SIDE: Side = Side::Demand;

    fn sort_key(price: f64) -> f64 {
        -price
    }

    fn tail_price(_scarcity_price: f64, minimal_price: f64) -> f64 {
        minimal_price
    }
}

/// An append-only order book, not yet closed for clearing.
#[derive(Debug, Clone)]
pub struct UnsortedBook<K: BookKind> {
    items: Vec<OrderBookItem>,
    _kind: PhantomData<K>,
}

impl<K: BookKind> Default for UnsortedBook<K> {
    fn default() -> Self {
        Self::new()
    }
}

impl<K: BookKind> UnsortedBook<K> {
    #[must_use]
    pub fn new() -> Self {
        Self {
            items: Vec::new(),
            _kind: PhantomData,
        }
    }

    /// Places a bid, rejecting the wrong side or a price outside the legal
    /// band.
    pub fn push(&mut self, bid: Bid, scarcity_price: f64, minimal_price: f64) -> DispatchResult<()> {
        if bid.side != K::SIDE {
            return Err(DispatchError::WrongSide {
                expected: format!("{:?}", K::SIDE),
                actual: bid.side.to_string(),
            });
        }
        if bid.price_eur_per_mwh > scarcity_price || bid.price_eur_per_mwh < minimal_price {
            return Err(DispatchError::PriceOutOfBand {
                price: bid.price_eur_per_mwh,
                minimal: minimal_price,
                scarcity: scarcity_price,
            });
        }
        self.items.push(OrderBookItem::new(bid));
        Ok(())
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Closes the book: sorts items into merit order, appends a virtual
    /// zero-power tail at the extreme legal price, and assigns cumulative
    /// power bands.
    #[must_use]
    pub fn sort(mut self, scarcity_price: f64, minimal_price: f64) -> SortedBook<K> {
        let tail_price = K::tail_price(scarcity_price, minimal_price);
        let tail_bid = Bid::new(0.0, tail_price, tail_price, K::SIDE, "virtual-tail")
            .expect("tail bid energy is zero, never negative");
        self.items.push(OrderBookItem::new(tail_bid));

        self.items.sort_by(|a, b| {
            K::sort_key(a.bid.price_eur_per_mwh)
                .partial_cmp(&K::sort_key(b.bid.price_eur_per_mwh))
                .expect("bid prices are never NaN")
        });

        let mut cumulated = 0.0;
        for item in &mut self.items {
            item.cumulated_power_lower = cumulated;
            cumulated += item.bid.energy_mwh;
            item.cumulated_power_upper = cumulated;
        }

        SortedBook {
            items: self.items,
            awarded_price: f64::NAN,
            awarded_cumulative_power: 0.0,
            _kind: PhantomData,
        }
    }
}

/// A closed order book: sorted into merit order with cumulative power
/// assigned, awaiting or holding the result of a clearing round.
#[derive(Debug, Clone)]
pub struct SortedBook<K: BookKind> {
    items: Vec<OrderBookItem>,
    awarded_price: f64,
    awarded_cumulative_power: f64,
    _kind: PhantomData<K>,
}

impl<K: BookKind> SortedBook<K> {
    #[must_use]
    pub fn items(&self) -> &[OrderBookItem] {
        &self.items
    }

    /// Real (non-tail) bids, i.e. everything but the virtual zero-power
    /// closing entry `sort()` appended.
    #[must_use]
    pub fn real_items(&self) -> &[OrderBookItem] {
        &self.items[..self.items.len().saturating_sub(1)]
    }

    #[must_use]
    pub fn total_power(&self) -> f64 {
        self.real_items().iter().map(|i| i.bid.energy_mwh).sum()
    }

    #[must_use]
    pub fn awarded_price(&self) -> f64 {
        self.awarded_price
    }

    #[must_use]
    pub fn awarded_cumulative_power(&self) -> f64 {
        self.awarded_cumulative_power
    }

    /// Cumulative power at or below `price`, following this book's own sort
    /// direction.
    #[must_use]
    pub fn cumulative_power_at(&self, price: f64) -> f64 {
        self.items
            .iter()
            .filter(|i| K::sort_key(i.bid.price_eur_per_mwh) <= K::sort_key(price))
            .map(|i| i.bid.energy_mwh)
            .sum()
    }

    /// Fills in `awardedPower` for every item given the clearing outcome.
    /// `price == awarded_price` bids are the price-setting group and split
    /// the residual per `distribution`.
    pub fn update_awarded_power(
        &mut self,
        awarded_price: f64,
        awarded_cumulative_power: f64,
        distribution: DistributionMethod,
        rng: &mut dyn RngCore,
    ) {
        self.awarded_price = awarded_price;
        self.awarded_cumulative_power = awarded_cumulative_power;

        let mut fully_awarded_total = 0.0;
        let mut price_setting_indices = Vec::new();

        for (idx, item) in self.items.iter_mut().enumerate() {
            let is_price_setting = (item.bid.price_eur_per_mwh - awarded_price).abs() < 1e-9;
            if is_price_setting {
                if item.bid.energy_mwh <= 0.0 {
                    item.awarded_power = 0.0;
                } else {
                    price_setting_indices.push(idx);
                }
                continue;
            }
            if item.cumulated_power_upper <= awarded_cumulative_power + 1e-9 {
                item.awarded_power = item.bid.energy_mwh;
                fully_awarded_total += item.awarded_power;
            } else {
                item.awarded_power = 0.0;
            }
        }

        let mut residual = (awarded_cumulative_power - fully_awarded_total).max(0.0);

        match distribution {
            DistributionMethod::FirstComeFirstServe => {
                for &idx in &price_setting_indices {
                    if residual <= 1e-12 {
                        break;
                    }
                    let award = residual.min(self.items[idx].bid.energy_mwh);
                    self.items[idx].awarded_power = award;
                    residual -= award;
                }
            }
            DistributionMethod::Randomize => {
                let mut shuffled = price_setting_indices.clone();
                shuffled.shuffle(&mut RngWrapper(rng));
                for idx in shuffled {
                    if residual <= 1e-12 {
                        break;
                    }
                    let award = residual.min(self.items[idx].bid.energy_mwh);
                    self.items[idx].awarded_power = award;
                    residual -= award;
                }
            }
            DistributionMethod::SameShares => {
                let total: f64 = price_setting_indices
                    .iter()
                    .map(|&idx| self.items[idx].bid.energy_mwh)
                    .sum();
                if total > 0.0 {
                    for &idx in &price_setting_indices {
                        let share = self.items[idx].bid.energy_mwh / total * residual;
                        self.items[idx].awarded_power = share;
                    }
                }
            }
        }
    }

    /// Reopens the book for a fresh clearing round, discarding all items.
    #[must_use]
    pub fn clear(self) -> UnsortedBook<K> {
        UnsortedBook::new()
    }
}

/// Adapts `&mut dyn RngCore` to `rand::RngCore` for `shuffle`, which wants a
/// concrete-sized type.
struct RngWrapper<'a>(&'a mut dyn RngCore);

impl rand::RngCore for RngWrapper<'_> {
    fn next_u32(&mut self) -> u32 {
        self.0.next_u32()
    }

    fn next_u64(&mut self) -> u64 {
        self.0.next_u64()
    }

    fn fill_bytes(&mut self, dest: &mut [u8]) {
        self.0.fill_bytes(dest);
    }

    fn try_fill_bytes(&mut self, dest: &mut [u8]) -> Result<(), rand::Error> {
        self.0.try_fill_bytes(dest)
    }
}

/// Outcome of finding the clearing pair (p*, Q*), or one of the failure
/// modes of an unclearable book pair.
#[derive(Debug, Clone, Copy)]
pub struct ClearingOutcome {
    pub awarded_price: f64,
    pub awarded_cumulative_power: f64,
}

/// Clears a supply book against a demand book for a single `TimeStamp`.
/// Consumes both closed books and returns them with awards filled in,
/// plus the scalar clearing outcome.
pub fn clear_market(
    supply: SortedBook<SupplySide>,
    demand: SortedBook<DemandSide>,
    distribution: DistributionMethod,
    scarcity_price: f64,
    minimal_price: f64,
    rng: &mut dyn RngCore,
) -> (SortedBook<SupplySide>, SortedBook<DemandSide>, ClearingOutcome) {
    // Only real bid prices are considered as crossing candidates; the
    // virtual tails exist to bound the cumulative-power curves, not to
    // manufacture a phantom zero-power crossing between two empty sides.
    let mut candidates: Vec<f64> = supply
        .real_items()
        .iter()
        .map(|i| i.bid.price_eur_per_mwh)
        .chain(demand.real_items().iter().map(|i| i.bid.price_eur_per_mwh))
        .collect();
    candidates.sort_by(|a, b| a.partial_cmp(b).expect("prices are never NaN"));
    candidates.dedup_by(|a, b| (*a - *b).abs() < 1e-9);

    let mut crossing = None;
    for &p in &candidates {
        let s = supply.cumulative_power_at(p);
        let d = demand.cumulative_power_at(p);
        if s >= d {
            crossing = Some((p, s, d));
            break;
        }
    }

    let outcome = match crossing {
        Some((p, s, d)) => ClearingOutcome {
            awarded_price: p,
            awarded_cumulative_power: s.min(d),
        },
        None => {
            let total_supply = supply.total_power();
            let total_demand = demand.total_power();
            let outcome = if total_supply < total_demand {
                ClearingOutcome {
                    awarded_price: scarcity_price,
                    awarded_cumulative_power: 0.0,
                }
            } else {
                ClearingOutcome {
                    awarded_price: minimal_price,
                    awarded_cumulative_power: 0.0,
                }
            };
            tracing::warn!(
                total_supply,
                total_demand,
                awarded_price = outcome.awarded_price,
                "no crossing found between supply and demand curves"
            );
            outcome
        }
    };

    tracing::debug!(
        awarded_price = outcome.awarded_price,
        awarded_cumulative_power = outcome.awarded_cumulative_power,
        ?distribution,
        "clearing outcome determined"
    );

    let mut supply = supply;
    let mut demand = demand;
    supply.update_awarded_power(
        outcome.awarded_price,
        outcome.awarded_cumulative_power,
        distribution,
        rng,
    );
    demand.update_awarded_power(
        outcome.awarded_price,
        outcome.awarded_cumulative_power,
        distribution,
        rng,
    );

    (supply, demand, outcome)
}

#[cfg(test)]
mod tests {
    use super::*;
    use market_types::Bid;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    const SCARCITY: f64 = 3000.0;
    const MINIMAL: f64 = -500.0;

    fn rng() -> ChaCha8Rng {
        ChaCha8Rng::seed_from_u64(42)
    }

    #[test]
    fn scenario_s1_single_hour_clearing_no_ties() {
        let mut supply = UnsortedBook::<SupplySide>::new();
        supply
            .push(
                Bid::new(10.0, 20.0, 20.0, Side::Supply, "s1").unwrap(),
                SCARCITY,
                MINIMAL,
            )
            .unwrap();
        supply
            .push(
                Bid::new(5.0, 50.0, 50.0, Side::Supply, "s2").unwrap(),
                SCARCITY,
                MINIMAL,
            )
            .unwrap();

        let mut demand = UnsortedBook::<DemandSide>::new();
        demand
            .push(
                Bid::new(12.0, 100.0, 100.0, Side::Demand, "d1").unwrap(),
                SCARCITY,
                MINIMAL,
            )
            .unwrap();

        let supply = supply.sort(SCARCITY, MINIMAL);
        let demand = demand.sort(SCARCITY, MINIMAL);
        let mut r = rng();
        let (supply, demand, outcome) = clear_market(
            supply,
            demand,
            DistributionMethod::FirstComeFirstServe,
            SCARCITY,
            MINIMAL,
            &mut r,
        );

        assert!((outcome.awarded_price - 50.0).abs() < 1e-6);
        assert!((outcome.awarded_cumulative_power - 12.0).abs() < 1e-6);

        let s1 = supply.real_items().iter().find(|i| i.bid.trader_id == "s1").unwrap();
        let s2 = supply.real_items().iter().find(|i| i.bid.trader_id == "s2").unwrap();
        assert!((s1.awarded_power - 10.0).abs() < 1e-6);
        assert!((s2.awarded_power - 2.0).abs() < 1e-6);

        let d1 = demand.real_items().iter().find(|i| i.bid.trader_id == "d1").unwrap();
        assert!((d1.awarded_power - 12.0).abs() < 1e-6);

        assert!((supply.real_items().iter().map(|i| i.awarded_power).sum::<f64>()
            - demand.real_items().iter().map(|i| i.awarded_power).sum::<f64>())
        .abs()
            < 1e-6);
    }

    #[test]
    fn scenario_s2_price_setting_tie_same_shares() {
        let mut supply = UnsortedBook::<SupplySide>::new();
        supply
            .push(
                Bid::new(4.0, 30.0, 30.0, Side::Supply, "s1").unwrap(),
                SCARCITY,
                MINIMAL,
            )
            .unwrap();
        supply
            .push(
                Bid::new(4.0, 30.0, 30.0, Side::Supply, "s2").unwrap(),
                SCARCITY,
                MINIMAL,
            )
            .unwrap();

        let mut demand = UnsortedBook::<DemandSide>::new();
        demand
            .push(
                Bid::new(6.0, 100.0, 100.0, Side::Demand, "d1").unwrap(),
                SCARCITY,
                MINIMAL,
            )
            .unwrap();

        let supply = supply.sort(SCARCITY, MINIMAL);
        let demand = demand.sort(SCARCITY, MINIMAL);
        let mut r = rng();
        let (supply, _demand, outcome) = clear_market(
            supply,
            demand,
            DistributionMethod::SameShares,
            SCARCITY,
            MINIMAL,
            &mut r,
        );

        assert!((outcome.awarded_price - 30.0).abs() < 1e-6);
        assert!((outcome.awarded_cumulative_power - 6.0).abs() < 1e-6);
        for item in supply.real_items() {
            assert!((item.awarded_power - 3.0).abs() < 1e-6);
        }
    }

    #[test]
    fn empty_supply_yields_scarcity_price_and_zero_award() {
        let supply = UnsortedBook::<SupplySide>::new().sort(SCARCITY, MINIMAL);
        let mut demand = UnsortedBook::<DemandSide>::new();
        demand
            .push(
                Bid::new(5.0, 100.0, 100.0, Side::Demand, "d1").unwrap(),
                SCARCITY,
                MINIMAL,
            )
            .unwrap();
        let demand = demand.sort(SCARCITY, MINIMAL);
        let mut r = rng();
        let (_supply, _demand, outcome) = clear_market(
            supply,
            demand,
            DistributionMethod::FirstComeFirstServe,
            SCARCITY,
            MINIMAL,
            &mut r,
        );
        assert_eq!(outcome.awarded_cumulative_power, 0.0);
        assert!((outcome.awarded_price - SCARCITY).abs() < 1e-6);
    }
}
