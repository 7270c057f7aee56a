//! Exponential sampling and the assembly-line production process.
//!
//! A unit of product traverses a fixed pipeline of identical workstations;
//! the time spent at each one is Exponential(mean). A production run with a
//! fixed time budget counts how many units complete, after an optional
//! breakdown that costs an Exponential(repair_mean) repair interval.
//!
//! All draws come from the caller's generator, so a seeded
//! [`create_rng`](crate::random::create_rng) reproduces a run exactly.

use rand::Rng;
use tracing::trace;

use crate::distributions::Exponential;
use crate::error::{Result, SimError};
use crate::random::bernoulli;

/// Number of workstations a unit passes through.
pub const DEFAULT_STATIONS: usize = 5;

/// Probability that a production run starts with a breakdown.
pub const BREAKDOWN_PROBABILITY: f64 = 0.1;

// ============================================================================
// Shaped draws
// ============================================================================

/// Extents of a block of draws: a plain count or an N-dimensional shape.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Shape(Vec<usize>);

impl Shape {
    pub fn new(dims: impl Into<Vec<usize>>) -> Self {
        Shape(dims.into())
    }

    pub fn dims(&self) -> &[usize] {
        &self.0
    }

    /// Total number of elements (product of the extents).
    pub fn len(&self) -> usize {
        self.0.iter().product()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl From<usize> for Shape {
    fn from(n: usize) -> Self {
        Shape(vec![n])
    }
}

impl From<(usize, usize)> for Shape {
    fn from((rows, cols): (usize, usize)) -> Self {
        Shape(vec![rows, cols])
    }
}

impl<const N: usize> From<[usize; N]> for Shape {
    fn from(dims: [usize; N]) -> Self {
        Shape(dims.to_vec())
    }
}

impl From<Vec<usize>> for Shape {
    fn from(dims: Vec<usize>) -> Self {
        Shape(dims)
    }
}

impl From<&[usize]> for Shape {
    fn from(dims: &[usize]) -> Self {
        Shape(dims.to_vec())
    }
}

/// A block of draws stored row-major together with its [`Shape`].
#[derive(Debug, Clone, PartialEq)]
pub struct Draws {
    shape: Shape,
    data: Vec<f64>,
}

impl Draws {
    pub fn shape(&self) -> &Shape {
        &self.shape
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    pub fn as_slice(&self) -> &[f64] {
        &self.data
    }

    pub fn into_vec(self) -> Vec<f64> {
        self.data
    }

    /// Element at a multi-dimensional index, `None` when the index has the
    /// wrong rank or is out of bounds.
    pub fn get(&self, index: &[usize]) -> Option<f64> {
        let dims = self.shape.dims();
        if index.len() != dims.len() {
            return None;
        }
        let mut flat = 0;
        for (&i, &d) in index.iter().zip(dims) {
            if i >= d {
                return None;
            }
            flat = flat * d + i;
        }
        self.data.get(flat).copied()
    }
}

impl AsRef<[f64]> for Draws {
    fn as_ref(&self) -> &[f64] {
        &self.data
    }
}

// ============================================================================
// Sampling operations
// ============================================================================

/// Independent Exponential(`mean`) draws with the requested shape.
///
/// Each draw is `−mean · ln(1 − u)` for `u` uniform on `[0, 1)`.
///
/// # Errors
/// Returns [`SimError::InvalidArgument`] if `mean` is not finite and `> 0`.
///
/// # Examples
/// ```
/// use simstats::random::create_rng;
/// use simstats::sampler::exponential_sample;
/// let mut rng = create_rng(42);
/// let draws = exponential_sample(180.0, (1000, 1), &mut rng).unwrap();
/// assert_eq!(draws.len(), 1000);
/// assert!(draws.as_slice().iter().all(|&x| x >= 0.0));
/// ```
pub fn exponential_sample<R: Rng>(
    mean: f64,
    shape: impl Into<Shape>,
    rng: &mut R,
) -> Result<Draws> {
    let dist = exponential(mean, "mean")?;
    let shape = shape.into();
    let mut data = vec![0.0; shape.len()];
    dist.fill(&mut data, rng);
    Ok(Draws { shape, data })
}

/// Total time for one unit to traverse `stations` identical workstations.
///
/// # Errors
/// Returns [`SimError::InvalidArgument`] if `mean` is not `> 0` or
/// `stations` is zero.
pub fn assembly_line_time<R: Rng>(mean: f64, stations: usize, rng: &mut R) -> Result<f64> {
    if stations == 0 {
        return Err(SimError::invalid("assembly line needs at least one station"));
    }
    let dist = exponential(mean, "mean")?;
    Ok(traverse(&dist, stations, rng))
}

/// Number of units completed by one production run of length `prod_time`.
///
/// With probability [`BREAKDOWN_PROBABILITY`] the run starts with a repair
/// interval drawn from Exponential(`repair_mean`), deducted from the
/// budget. A `repair_mean` of zero disables breakdowns. The remaining
/// budget is then spent on [`DEFAULT_STATIONS`]-station traversals until it
/// is no longer positive.
///
/// The result is the number of traversals minus one: the traversal that
/// exhausts the budget is an unfinished unit. A run whose budget is gone
/// before the first traversal (a non-positive `prod_time`, or a repair
/// longer than the whole budget) yields -1.
///
/// # Errors
/// Returns [`SimError::InvalidArgument`] if `mean` is not `> 0`,
/// `repair_mean` is negative or not finite, or `prod_time` is not finite.
///
/// # Examples
/// ```
/// use simstats::random::create_rng;
/// use simstats::sampler::produce;
/// let mut rng = create_rng(1);
/// let units = produce(480.0, 3.0, 0.0, &mut rng).unwrap();
/// assert!(units > 10 && units < 60);
/// ```
pub fn produce<R: Rng>(prod_time: f64, mean: f64, repair_mean: f64, rng: &mut R) -> Result<i64> {
    ProductionLine::new(mean, DEFAULT_STATIONS, repair_mean)?.produce(prod_time, rng)
}

/// `trials` independent [`produce`] results, as `f64` for the estimators.
///
/// # Errors
/// Same conditions as [`produce`].
pub fn production_sample<R: Rng>(
    trials: usize,
    prod_time: f64,
    mean: f64,
    repair_mean: f64,
    rng: &mut R,
) -> Result<Vec<f64>> {
    ProductionLine::new(mean, DEFAULT_STATIONS, repair_mean)?.sample(trials, prod_time, rng)
}

/// Renewal approximation of the units produced: `prod_time / (stations · mean)`.
pub fn expected_production(prod_time: f64, mean: f64, stations: usize) -> f64 {
    prod_time / (stations as f64 * mean)
}

/// Renewal approximation of the variance of the units produced, ignoring
/// breakdowns.
///
/// A traversal has mean `μ = stations · mean` and variance
/// `σ² = stations · mean²`, so `prod_time · σ² / μ³` reduces to
/// `prod_time / (stations² · mean)`.
pub fn expected_production_variance(prod_time: f64, mean: f64, stations: usize) -> f64 {
    let k = stations as f64;
    prod_time / (k * k * mean)
}

fn exponential(mean: f64, what: &str) -> Result<Exponential> {
    Exponential::new(mean)
        .map_err(|_| SimError::invalid(format!("{what} must be finite and > 0, got {mean}")))
}

#[inline]
fn traverse<R: Rng>(station: &Exponential, stations: usize, rng: &mut R) -> f64 {
    (0..stations).map(|_| station.sample(rng)).sum()
}

// ============================================================================
// Production line
// ============================================================================

/// A validated assembly line: station time distribution, station count and
/// optional repair distribution.
#[derive(Debug, Clone, PartialEq)]
pub struct ProductionLine {
    station: Exponential,
    stations: usize,
    repair: Option<Exponential>,
}

impl ProductionLine {
    /// Builds a line whose workstation times have mean `mean`.
    ///
    /// `repair_mean == 0` disables breakdowns.
    ///
    /// # Errors
    /// Returns [`SimError::InvalidArgument`] if `mean` is not `> 0`,
    /// `stations` is zero, or `repair_mean` is negative or not finite.
    pub fn new(mean: f64, stations: usize, repair_mean: f64) -> Result<Self> {
        let station = exponential(mean, "workstation mean")?;
        if stations == 0 {
            return Err(SimError::invalid("assembly line needs at least one station"));
        }
        let repair = if repair_mean == 0.0 {
            None
        } else {
            Some(exponential(repair_mean, "repair mean")?)
        };
        Ok(Self {
            station,
            stations,
            repair,
        })
    }

    pub fn station_mean(&self) -> f64 {
        self.station.mean()
    }

    pub fn stations(&self) -> usize {
        self.stations
    }

    /// Mean repair time, 0 when breakdowns are disabled.
    pub fn repair_mean(&self) -> f64 {
        self.repair.map_or(0.0, |r| r.mean())
    }

    /// Time for one unit to traverse every station.
    pub fn traversal_time<R: Rng>(&self, rng: &mut R) -> f64 {
        traverse(&self.station, self.stations, rng)
    }

    /// Units completed in one run of length `prod_time`. See [`produce`].
    ///
    /// # Errors
    /// Returns [`SimError::InvalidArgument`] if `prod_time` is not finite.
    pub fn produce<R: Rng>(&self, prod_time: f64, rng: &mut R) -> Result<i64> {
        if !prod_time.is_finite() {
            return Err(SimError::invalid(format!(
                "production time must be finite, got {prod_time}"
            )));
        }
        let mut remaining = prod_time;
        if let Some(repair) = &self.repair {
            if bernoulli(BREAKDOWN_PROBABILITY, rng) {
                let downtime = repair.sample(rng);
                trace!(downtime, "line breakdown");
                remaining -= downtime;
            }
        }
        // the traversal that drives the budget non-positive never completes
        let mut units: i64 = -1;
        while remaining > 0.0 {
            units += 1;
            remaining -= self.traversal_time(rng);
        }
        Ok(units)
    }

    /// `trials` independent runs as `f64`.
    ///
    /// # Errors
    /// Returns [`SimError::InvalidArgument`] if `prod_time` is not finite.
    pub fn sample<R: Rng>(&self, trials: usize, prod_time: f64, rng: &mut R) -> Result<Vec<f64>> {
        (0..trials)
            .map(|_| self.produce(prod_time, rng).map(|units| units as f64))
            .collect()
    }

    /// [`expected_production`] for this line.
    pub fn expected_production(&self, prod_time: f64) -> f64 {
        expected_production(prod_time, self.station.mean(), self.stations)
    }

    /// [`expected_production_variance`] for this line.
    pub fn expected_production_variance(&self, prod_time: f64) -> f64 {
        expected_production_variance(prod_time, self.station.mean(), self.stations)
    }
}

// ============================================================================
// Tests
// ============================================================================
