//! Continuous leaf distributions.
//!
//! A continuous variable may only be a leaf of the net. Its distribution is
//! one of three families, each answering interval-measure queries exactly,
//! infinite boundaries included:
//!
//! - **Gaussian** N(μ, σ²): `P(x ∈ [a, b]) = Φ((b−μ)/σ) − Φ((a−μ)/σ)`
//! - **Exponential** λ: `P(x ∈ [a, b]) = e^{−λ max(a,0)} − e^{−λ max(b,0)}`
//! - **Uniform** [a₀, b₀]: overlap length over support length
//!
//! Open and closed boundaries have the same measure.
//!
//! # Example
//!
//! ```rust
//! use bayesnet_core::Interval;
//! use bayesnet_prob::continuous::Gaussian;
//!
//! let n = Gaussian::standard();
//! let below_mean = n.interval_probability(&Interval::at_most(0.0));
//! assert!((below_mean - 0.5).abs() < 1e-10);
//! ```

use std::f64::consts::{LN_2, PI, SQRT_2};
use std::fmt;

use bayesnet_core::{ContinuousFamily, CoreError, Event, Interval, Kind, Predicate};
use serde::{Deserialize, Serialize};
use statrs::function::erf::erfc;
use statrs::statistics::Statistics;

use crate::error::ProbError;

/// A univariate Gaussian (Normal) distribution N(μ, σ²).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Gaussian {
    /// Mean (μ)
    pub mean: f64,
    /// Standard deviation (σ)
    pub std_dev: f64,
}

impl Gaussian {
    /// # Errors
    /// Returns error unless `std_dev` is positive and both parameters are finite.
    pub fn new(mean: f64, std_dev: f64) -> Result<Self, ProbError> {
        if !mean.is_finite() {
            return Err(ProbError::InvalidParameter {
                name: "mean".to_string(),
                reason: "mean must be finite".to_string(),
            });
        }
        if !(std_dev.is_finite() && std_dev > 0.0) {
            return Err(ProbError::InvalidParameter {
                name: "std_dev".to_string(),
                reason: "standard deviation must be positive".to_string(),
            });
        }
        Ok(Self { mean, std_dev })
    }

    /// The standard normal distribution N(0, 1).
    pub fn standard() -> Self {
        Self {
            mean: 0.0,
            std_dev: 1.0,
        }
    }

    /// Fit μ and σ to `samples` (σ is the n−1 sample deviation).
    pub fn fit(variable: &str, samples: &[f64]) -> Result<Self, ProbError> {
        if samples.is_empty() {
            return Err(ProbError::EmptySample {
                variable: variable.to_string(),
            });
        }
        let mean = samples.iter().copied().mean();
        let std_dev = samples.iter().copied().std_dev();
        Self::new(mean, std_dev)
    }

    pub fn variance(&self) -> f64 {
        self.std_dev * self.std_dev
    }

    /// pdf(x) = (1/√(2πσ²)) exp(-(x-μ)²/(2σ²))
    pub fn pdf(&self, x: f64) -> f64 {
        let z = (x - self.mean) / self.std_dev;
        (-0.5 * z * z).exp() / (self.std_dev * (2.0 * PI).sqrt())
    }

    /// Φ((x-μ)/σ), exact at ±∞.
    pub fn cdf(&self, x: f64) -> f64 {
        if x == f64::NEG_INFINITY {
            return 0.0;
        }
        if x == f64::INFINITY {
            return 1.0;
        }
        0.5 * erfc(-(x - self.mean) / (self.std_dev * SQRT_2))
    }

    pub fn interval_probability(&self, interval: &Interval<f64>) -> f64 {
        (self.cdf(interval.hi_f64()) - self.cdf(interval.lo_f64())).clamp(0.0, 1.0)
    }
}

/// An exponential distribution with rate λ on `[0, +∞)`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Exponential {
    pub rate: f64,
}

impl Exponential {
    pub fn new(rate: f64) -> Result<Self, ProbError> {
        if !(rate.is_finite() && rate > 0.0) {
            return Err(ProbError::InvalidParameter {
                name: "rate".to_string(),
                reason: "rate must be positive and finite".to_string(),
            });
        }
        Ok(Self { rate })
    }

    /// λ = 1 / mean. Negative samples are outside the support.
    pub fn fit(variable: &str, samples: &[f64]) -> Result<Self, ProbError> {
        if samples.is_empty() {
            return Err(ProbError::EmptySample {
                variable: variable.to_string(),
            });
        }
        if let Some(&bad) = samples.iter().find(|&&x| !(x >= 0.0)) {
            return Err(ProbError::OutOfSupport {
                variable: variable.to_string(),
                value: bad,
                support: ContinuousFamily::Exponential.support().to_string(),
            });
        }
        Self::new(1.0 / samples.iter().copied().mean())
    }

    /// `ln 2 / λ`
    pub fn median(&self) -> f64 {
        LN_2 / self.rate
    }

    pub fn pdf(&self, x: f64) -> f64 {
        if x < 0.0 {
            0.0
        } else {
            self.rate * (-self.rate * x).exp()
        }
    }

    /// P(X > x)
    fn survival(&self, x: f64) -> f64 {
        if x == f64::INFINITY {
            0.0
        } else {
            (-self.rate * x.max(0.0)).exp()
        }
    }

    pub fn interval_probability(&self, interval: &Interval<f64>) -> f64 {
        (self.survival(interval.lo_f64()) - self.survival(interval.hi_f64())).clamp(0.0, 1.0)
    }
}

/// A uniform distribution on `[lo, hi]`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Uniform {
    pub lo: f64,
    pub hi: f64,
}

impl Uniform {
    pub fn new(lo: f64, hi: f64) -> Result<Self, ProbError> {
        if !(lo.is_finite() && hi.is_finite() && lo < hi) {
            return Err(ProbError::InvalidParameter {
                name: "bounds".to_string(),
                reason: format!("need finite lo < hi, got [{}, {}]", lo, hi),
            });
        }
        Ok(Self { lo, hi })
    }

    /// Bounds from the sample minimum and maximum.
    pub fn fit(variable: &str, samples: &[f64]) -> Result<Self, ProbError> {
        if samples.is_empty() {
            return Err(ProbError::EmptySample {
                variable: variable.to_string(),
            });
        }
        let lo = samples.iter().copied().fold(f64::INFINITY, f64::min);
        let hi = samples.iter().copied().fold(f64::NEG_INFINITY, f64::max);
        Self::new(lo, hi)
    }

    pub fn pdf(&self, x: f64) -> f64 {
        if (self.lo..=self.hi).contains(&x) {
            1.0 / (self.hi - self.lo)
        } else {
            0.0
        }
    }

    pub fn interval_probability(&self, interval: &Interval<f64>) -> f64 {
        let overlap = interval.hi_f64().min(self.hi) - interval.lo_f64().max(self.lo);
        (overlap / (self.hi - self.lo)).clamp(0.0, 1.0)
    }
}

/// The distribution of a continuous leaf.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum ContinuousLeaf {
    Gaussian(Gaussian),
    Exponential(Exponential),
    Uniform(Uniform),
}

impl ContinuousLeaf {
    /// Fit a leaf of `family` to `samples`.
    pub fn fit(family: ContinuousFamily, variable: &str, samples: &[f64]) -> Result<Self, ProbError> {
        Ok(match family {
            ContinuousFamily::Gaussian => ContinuousLeaf::Gaussian(Gaussian::fit(variable, samples)?),
            ContinuousFamily::Exponential => {
                ContinuousLeaf::Exponential(Exponential::fit(variable, samples)?)
            }
            ContinuousFamily::Uniform => ContinuousLeaf::Uniform(Uniform::fit(variable, samples)?),
        })
    }

    pub fn family(&self) -> ContinuousFamily {
        match self {
            ContinuousLeaf::Gaussian(_) => ContinuousFamily::Gaussian,
            ContinuousLeaf::Exponential(_) => ContinuousFamily::Exponential,
            ContinuousLeaf::Uniform(_) => ContinuousFamily::Uniform,
        }
    }

    pub fn interval_probability(&self, interval: &Interval<f64>) -> f64 {
        match self {
            ContinuousLeaf::Gaussian(d) => d.interval_probability(interval),
            ContinuousLeaf::Exponential(d) => d.interval_probability(interval),
            ContinuousLeaf::Uniform(d) => d.interval_probability(interval),
        }
    }

    /// The measure of the set an event describes.
    ///
    /// `ElementOf` takes a numeric interval; ordering predicates map to the
    /// matching half-line; `Equals` is a single point and has measure 0.
    pub fn probability(&self, event: &Event) -> Result<f64, ProbError> {
        let scalar = || {
            event.value().as_f64().ok_or_else(|| {
                ProbError::Core(CoreError::KindMismatch {
                    value: event.value().to_string(),
                    expected: Kind::Float,
                    got: event.value().kind(),
                })
            })
        };
        let interval = match event.predicate() {
            Predicate::Placeholder => return Ok(1.0),
            Predicate::Equals => {
                scalar()?;
                return Ok(0.0);
            }
            Predicate::Less | Predicate::LessEqual => Interval::at_most(scalar()?),
            Predicate::Greater | Predicate::GreaterEqual => Interval::at_least(scalar()?),
            Predicate::ElementOf => event.value().as_f64_interval().ok_or_else(|| {
                ProbError::Core(CoreError::KindMismatch {
                    value: event.value().to_string(),
                    expected: Kind::FloatInterval,
                    got: event.value().kind(),
                })
            })?,
        };
        Ok(self.interval_probability(&interval))
    }
}

impl fmt::Display for ContinuousLeaf {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ContinuousLeaf::Gaussian(d) => write!(f, "N({}, {}²)", d.mean, d.std_dev),
            ContinuousLeaf::Exponential(d) => write!(f, "Exp({})", d.rate),
            ContinuousLeaf::Uniform(d) => write!(f, "U[{}, {}]", d.lo, d.hi),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bayesnet_core::{Interval, Value};

    const TOL: f64 = 1e-10;

    #[test]
    fn test_gaussian_identities() {
        let n = Gaussian::standard();
        assert!((n.interval_probability(&Interval::full()) - 1.0).abs() < TOL);
        assert!((n.interval_probability(&Interval::at_most(0.0)) - 0.5).abs() < TOL);
        let one_sigma = Interval::closed(-1.0, 1.0).unwrap();
        assert!((n.interval_probability(&one_sigma) - 0.6826894921).abs() < TOL);
        assert!(n.interval_probability(&Interval::point(0.0)).abs() < TOL);
    }

    #[test]
    fn test_gaussian_rejects_bad_sigma() {
        assert!(Gaussian::new(0.0, 0.0).is_err());
        assert!(Gaussian::new(0.0, -1.0).is_err());
        assert!(Gaussian::new(f64::NAN, 1.0).is_err());
    }

    #[test]
    fn test_gaussian_fit() {
        let g = Gaussian::fit("x", &[1.0, 2.0, 3.0, 4.0, 5.0]).unwrap();
        assert!((g.mean - 3.0).abs() < TOL);
        assert!((g.std_dev - 2.5f64.sqrt()).abs() < TOL);
        assert!(matches!(
            Gaussian::fit("x", &[]),
            Err(ProbError::EmptySample { .. })
        ));
        assert!(Gaussian::fit("x", &[2.0, 2.0]).is_err());
    }

    #[test]
    fn test_gaussian_pdf_peak() {
        let n = Gaussian::standard();
        assert!((n.pdf(0.0) - 1.0 / (2.0 * PI).sqrt()).abs() < TOL);
    }

    #[test]
    fn test_exponential_fit_and_median() {
        let samples = [1.0, 0.5, 0.1, 1.0, 0.2, 5.7, 7.0];
        let e = Exponential::fit("t", &samples).unwrap();
        assert!((e.rate - 7.0 / 15.5).abs() < TOL);
        let upper = e.interval_probability(&Interval::at_least(e.median()));
        assert!((upper - 0.5).abs() < TOL);
    }

    #[test]
    fn test_exponential_rejects_negative() {
        let err = Exponential::fit("t", &[1.0, -0.5]).unwrap_err();
        assert_eq!(err.class(), bayesnet_core::ErrorClass::Range);
    }

    #[test]
    fn test_exponential_negative_half_line() {
        let e = Exponential::new(2.0).unwrap();
        assert!(e.interval_probability(&Interval::at_most(0.0)).abs() < TOL);
        assert!((e.interval_probability(&Interval::full()) - 1.0).abs() < TOL);
    }

    #[test]
    fn test_uniform_identities() {
        let u = Uniform::new(0.0, 1.0).unwrap();
        for a in [0.0, 0.25, 0.5, 1.0] {
            assert!((u.interval_probability(&Interval::at_least(a)) - (1.0 - a)).abs() < TOL);
            assert!((u.interval_probability(&Interval::at_most(a)) - a).abs() < TOL);
        }
        let outside = Interval::closed(2.0, 3.0).unwrap();
        assert_eq!(u.interval_probability(&outside), 0.0);
    }

    #[test]
    fn test_leaf_event_probability() {
        let leaf = ContinuousLeaf::Uniform(Uniform::new(0.0, 4.0).unwrap());
        let inside = Event::element_of("x", Interval::closed(1.0, 2.0).unwrap());
        assert!((leaf.probability(&inside).unwrap() - 0.25).abs() < TOL);
        assert!((leaf.probability(&Event::less("x", 1.0)).unwrap() - 0.25).abs() < TOL);
        assert_eq!(leaf.probability(&Event::equals("x", 1.0)).unwrap(), 0.0);
        assert_eq!(leaf.probability(&Event::placeholder("x")).unwrap(), 1.0);
        assert!(leaf.probability(&Event::equals("x", Value::from("a"))).is_err());
    }
}
