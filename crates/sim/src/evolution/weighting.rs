//! Fitness-weighted sampling, ranking and culling.
//!
//! A [`FitnessTable`] holds one weight per member of a pool (the adults of
//! one sex in a patch, or a batch of offspring). It answers the queries the
//! mating topologies and the culling step need:
//!
//! - draw one member proportional to fitness (optionally excluding one),
//! - draw several distinct members proportional to fitness,
//! - rank members and pick the fittest or least fit, with random tie-breaks.
//!
//! When every weight is zero, weighted draws fall back to uniform draws so a
//! fully lethal pool still behaves like a neutral one.

use crate::base::FitnessValue;
use rand::seq::SliceRandom;
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;

/// How "most fit" or "least fit" individuals are chosen.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum FitnessSortMode {
    /// The k fittest; ties broken uniformly at random.
    #[default]
    Fittest,
    /// k drawn uniformly from a larger subset of the fittest.
    FittestSubset,
    /// The k least fit; ties broken uniformly at random.
    LeastFit,
    /// k drawn uniformly from a larger subset of the least fit.
    LeastFitSubset,
}

/// Fitness weights of one pool plus the cumulative sums used for sampling.
#[derive(Debug, Clone)]
pub struct FitnessTable {
    weights: Vec<FitnessValue>,
    cumulative: Vec<f64>,
    total: f64,
}

impl FitnessTable {
    pub fn new(weights: Vec<FitnessValue>) -> Self {
        let cumulative: Vec<f64> = weights
            .iter()
            .scan(0.0, |acc, w| {
                *acc += w.get();
                Some(*acc)
            })
            .collect();
        let total = cumulative.last().copied().unwrap_or(0.0);
        Self {
            weights,
            cumulative,
            total,
        }
    }

    /// A table where every member has neutral fitness.
    pub fn uniform(len: usize) -> Self {
        Self::new(vec![FitnessValue::NEUTRAL_FITNESS; len])
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.weights.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.weights.is_empty()
    }

    #[inline]
    pub fn weight(&self, index: usize) -> FitnessValue {
        self.weights[index]
    }

    pub fn weights(&self) -> &[FitnessValue] {
        &self.weights
    }

    pub fn total(&self) -> f64 {
        self.total
    }

    fn cumulative_before(&self, index: usize) -> f64 {
        if index == 0 {
            0.0
        } else {
            self.cumulative[index - 1]
        }
    }

    /// Index whose cumulative interval contains `r` (0 <= r < total).
    fn locate(&self, r: f64) -> usize {
        self.cumulative
            .partition_point(|&c| c <= r)
            .min(self.len() - 1)
    }

    /// Draw one member proportional to its weight.
    pub fn sample<R: Rng + ?Sized>(&self, rng: &mut R) -> Option<usize> {
        if self.is_empty() {
            return None;
        }
        if self.total <= 0.0 {
            return Some(rng.random_range(0..self.len()));
        }
        let r = rng.random::<f64>() * self.total;
        Some(self.locate(r))
    }

    /// Draw one member proportional to its weight, never returning `exclude`.
    ///
    /// Returns `None` if no other member exists.
    pub fn sample_excluding<R: Rng + ?Sized>(&self, exclude: usize, rng: &mut R) -> Option<usize> {
        let n = self.len();
        if n == 0 || (n == 1 && exclude == 0) {
            return None;
        }
        if exclude >= n {
            return self.sample(rng);
        }
        let rest = self.total - self.weights[exclude].get();
        if rest <= 0.0 {
            let pick = rng.random_range(0..n - 1);
            return Some(if pick >= exclude { pick + 1 } else { pick });
        }
        let mut r = rng.random::<f64>() * rest;
        if r >= self.cumulative_before(exclude) {
            r += self.weights[exclude].get();
        }
        let index = self.locate(r);
        if index == exclude {
            // rounding at the edge of the excluded interval
            return (0..n).rev().find(|&i| i != exclude && !self.weights[i].is_lethal());
        }
        Some(index)
    }

    /// Draw `k` distinct members, each draw proportional to weight among
    /// those not yet drawn. Members with zero weight are only drawn once all
    /// positive-weight members are taken, and then uniformly.
    pub fn sample_without_replacement<R: Rng + ?Sized>(&self, k: usize, rng: &mut R) -> Vec<usize> {
        let k = k.min(self.len());
        if k == 0 {
            return Vec::new();
        }
        if k == self.len() {
            return (0..k).collect();
        }

        // Efraimidis-Spirakis keys: ln(u) / w, largest keys win.
        let mut keyed: Vec<(f64, usize)> = Vec::with_capacity(self.len());
        let mut lethal: Vec<usize> = Vec::new();
        for (i, w) in self.weights.iter().enumerate() {
            if w.is_lethal() {
                lethal.push(i);
            } else {
                let u: f64 = rng.random();
                keyed.push((u.ln() / w.get(), i));
            }
        }
        keyed.sort_by(|a, b| b.0.partial_cmp(&a.0).unwrap_or(Ordering::Equal));

        let mut chosen: Vec<usize> = keyed.into_iter().take(k).map(|(_, i)| i).collect();
        if chosen.len() < k {
            lethal.shuffle(rng);
            chosen.extend(lethal.into_iter().take(k - chosen.len()));
        }
        chosen
    }

    /// Indices ordered from fittest to least fit, ties in random order.
    fn ranked<R: Rng + ?Sized>(&self, fittest_first: bool, rng: &mut R) -> Vec<usize> {
        let mut order: Vec<usize> = (0..self.len()).collect();
        order.shuffle(rng);
        // stable sort keeps the shuffled order among equal weights
        order.sort_by(|&a, &b| {
            let ord = self.weights[b]
                .partial_cmp(&self.weights[a])
                .unwrap_or(Ordering::Equal);
            if fittest_first {
                ord
            } else {
                ord.reverse()
            }
        });
        order
    }

    /// The `k` fittest members.
    pub fn k_fittest<R: Rng + ?Sized>(&self, k: usize, rng: &mut R) -> Vec<usize> {
        let mut order = self.ranked(true, rng);
        order.truncate(k);
        order
    }

    /// The `k` least fit members.
    pub fn k_least_fit<R: Rng + ?Sized>(&self, k: usize, rng: &mut R) -> Vec<usize> {
        let mut order = self.ranked(false, rng);
        order.truncate(k);
        order
    }

    /// Choose `k` members according to `mode`. `subset` is the size of the
    /// candidate set for the subset modes and is raised to at least `k`.
    pub fn select_by_mode<R: Rng + ?Sized>(
        &self,
        mode: FitnessSortMode,
        k: usize,
        subset: usize,
        rng: &mut R,
    ) -> Vec<usize> {
        let k = k.min(self.len());
        match mode {
            FitnessSortMode::Fittest => self.k_fittest(k, rng),
            FitnessSortMode::LeastFit => self.k_least_fit(k, rng),
            FitnessSortMode::FittestSubset | FitnessSortMode::LeastFitSubset => {
                let pool_size = subset.max(k);
                let mut pool = if mode == FitnessSortMode::FittestSubset {
                    self.k_fittest(pool_size, rng)
                } else {
                    self.k_least_fit(pool_size, rng)
                };
                pool.shuffle(rng);
                pool.truncate(k);
                pool
            }
        }
    }
}

/// Survivors of soft selection: `target` members drawn without replacement
/// proportional to fitness (everyone survives if `target >= len`).
pub fn soft_survivors<R: Rng + ?Sized>(table: &FitnessTable, target: usize, rng: &mut R) -> Vec<usize> {
    table.sample_without_replacement(target, rng)
}

/// Survivors of hard selection: each member survives independently with
/// probability equal to its (clamped) fitness; if more than `capacity`
/// survive, `capacity` of them are kept proportional to fitness.
pub fn hard_survivors<R: Rng + ?Sized>(table: &FitnessTable, capacity: usize, rng: &mut R) -> Vec<usize> {
    let survivors: Vec<usize> = (0..table.len())
        .filter(|&i| rng.random::<f64>() < table.weight(i).survival_probability())
        .collect();
    if survivors.len() <= capacity {
        return survivors;
    }
    let sub = FitnessTable::new(survivors.iter().map(|&i| table.weight(i)).collect());
    sub.sample_without_replacement(capacity, rng)
        .into_iter()
        .map(|j| survivors[j])
        .collect()
}

/// Number of survivors of a patch under metapopulation-level soft selection.
///
/// The patch keeps `min(n, capacity)` scaled by the ratio of its mean
/// fitness to the metapopulation mean, never more than `min(n, capacity)`.
pub fn metapop_target(n: usize, capacity: usize, patch_mean: f64, metapop_mean: f64) -> usize {
    let base = n.min(capacity);
    if metapop_mean <= 0.0 || !metapop_mean.is_finite() {
        return base;
    }
    let scaled = crate::base::random::round_count(base as f64 * patch_mean / metapop_mean);
    scaled.min(base)
}
