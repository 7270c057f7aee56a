//! Random number generator construction.
//!
//! Every sampling routine in this crate takes its generator as an explicit
//! `&mut R where R: Rng` argument; there is no process-wide generator.
//!
//! A fixed seed through [`create_rng`] replays an experiment exactly on the
//! same platform; [`entropy_rng`] seeds from the operating system for
//! one-off runs, and [`rng_from_seed`] picks between the two.

use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};

/// `SmallRng` seeded from `seed`; equal seeds give equal streams.
///
/// # Examples
/// ```
/// use simstats::random::{create_rng, uniform01};
/// let (mut a, mut b) = (create_rng(42), create_rng(42));
/// assert_eq!(uniform01(&mut a), uniform01(&mut b));
/// ```
pub fn create_rng(seed: u64) -> SmallRng {
    SmallRng::seed_from_u64(seed)
}

/// Creates a `SmallRng` seeded from operating-system entropy.
///
/// Each call yields an independent, non-reproducible stream.
pub fn entropy_rng() -> SmallRng {
    SmallRng::from_os_rng()
}

/// Seeded generator when `seed` is given, entropy-seeded otherwise.
pub fn rng_from_seed(seed: Option<u64>) -> SmallRng {
    match seed {
        Some(s) => create_rng(s),
        None => entropy_rng(),
    }
}

/// Draws a uniform variate on the half-open interval `[0, 1)`.
#[inline]
pub fn uniform01<R: Rng>(rng: &mut R) -> f64 {
    rng.random::<f64>()
}

/// Returns `true` with probability `p`.
///
/// Consumes exactly one uniform draw, compared with `< p`, so `p <= 0`
/// never fires and `p >= 1` always does.
#[inline]
pub fn bernoulli<R: Rng>(p: f64, rng: &mut R) -> bool {
    uniform01(rng) < p
}
