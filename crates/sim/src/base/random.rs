//! Random draws used by the breeding stage.
//!
//! The simulator never owns a global generator. Every function that needs
//! randomness takes `&mut R where R: Rng`, and the breeder derives one
//! independent `Xoshiro256PlusPlus` stream per patch from the master stream,
//! so results do not depend on how patches are scheduled across threads.

use rand::{Rng, SeedableRng};
use rand_distr::{Binomial, Distribution, Poisson};
use rand_xoshiro::Xoshiro256PlusPlus;

/// Draw from Poisson(`mean`). Non-positive or non-finite means yield 0.
pub fn poisson<R: Rng + ?Sized>(rng: &mut R, mean: f64) -> usize {
    if !mean.is_finite() || mean <= 0.0 {
        return 0;
    }
    match Poisson::new(mean) {
        Ok(dist) => dist.sample(rng) as usize,
        Err(_) => 0,
    }
}

/// Draw from Binomial(`n`, `p`). `p` is clamped to [0, 1].
pub fn binomial<R: Rng + ?Sized>(rng: &mut R, n: usize, p: f64) -> usize {
    let p = if p.is_nan() { 0.0 } else { p.clamp(0.0, 1.0) };
    if n == 0 || p == 0.0 {
        return 0;
    }
    if p == 1.0 {
        return n;
    }
    match Binomial::new(n as u64, p) {
        Ok(dist) => dist.sample(rng) as usize,
        Err(_) => 0,
    }
}

/// Round half away from zero and convert to a count (negative values give 0).
#[inline]
pub fn round_count(x: f64) -> usize {
    if x.is_nan() || x <= 0.0 {
        0
    } else {
        x.round() as usize
    }
}

/// Draw one seed per patch, in patch order, from the master stream.
pub fn patch_seeds<R: Rng + ?Sized>(rng: &mut R, n_patches: usize) -> Vec<u64> {
    (0..n_patches).map(|_| rng.random()).collect()
}

/// Create the generator for one patch from its seed.
#[inline]
pub fn patch_rng(seed: u64) -> Xoshiro256PlusPlus {
    Xoshiro256PlusPlus::seed_from_u64(seed)
}
