//! Intervals over ordered scalar kinds.
//!
//! Each endpoint carries its own [`Boundary`] marker, so `[a, b)`,
//! `(-inf, b]` and `(a, +inf)` are all representable. The default
//! interval of a kind is the whole line `(-inf, +inf)`.

use std::cmp::Ordering;
use std::fmt;
use std::hash::{Hash, Hasher};

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use crate::error::CoreError;

/// A scalar that can sit at the end of an [`Interval`].
///
/// The order is total so that intervals can be used as map keys; for
/// floats it is `f64::total_cmp`.
pub trait Scalar: Clone + fmt::Debug + fmt::Display {
    /// Total order over the scalar.
    fn cmp_scalar(&self, other: &Self) -> Ordering;

    /// Hash consistent with [`Scalar::cmp_scalar`] equality.
    fn hash_scalar<H: Hasher>(&self, state: &mut H);
}

macro_rules! ord_scalar {
    ($($t:ty),*) => {
        $(
            impl Scalar for $t {
                fn cmp_scalar(&self, other: &Self) -> Ordering {
                    self.cmp(other)
                }

                fn hash_scalar<H: Hasher>(&self, state: &mut H) {
                    self.hash(state)
                }
            }
        )*
    };
}

ord_scalar!(bool, i64, u64, char, NaiveDateTime);

impl Scalar for f64 {
    fn cmp_scalar(&self, other: &Self) -> Ordering {
        self.total_cmp(other)
    }

    fn hash_scalar<H: Hasher>(&self, state: &mut H) {
        self.to_bits().hash(state)
    }
}

/// One end of an interval.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Boundary<T> {
    /// Finite endpoint included in the interval.
    Closed(T),
    /// Finite endpoint excluded from the interval.
    Open(T),
    /// Unbounded below.
    NegInfinity,
    /// Unbounded above.
    PosInfinity,
}

impl<T> Boundary<T> {
    /// The finite endpoint, if any.
    pub fn value(&self) -> Option<&T> {
        match self {
            Boundary::Closed(v) | Boundary::Open(v) => Some(v),
            Boundary::NegInfinity | Boundary::PosInfinity => None,
        }
    }

    pub fn is_infinite(&self) -> bool {
        matches!(self, Boundary::NegInfinity | Boundary::PosInfinity)
    }
}

impl<T: Scalar> Boundary<T> {
    /// Order two boundaries used as lower ends: `-inf < [a < (a`.
    fn cmp_as_lower(&self, other: &Self) -> Ordering {
        use Boundary::*;
        match (self, other) {
            (NegInfinity, NegInfinity) | (PosInfinity, PosInfinity) => Ordering::Equal,
            (NegInfinity, _) | (_, PosInfinity) => Ordering::Less,
            (_, NegInfinity) | (PosInfinity, _) => Ordering::Greater,
            (Closed(a), Closed(b)) | (Open(a), Open(b)) => a.cmp_scalar(b),
            (Closed(a), Open(b)) => a.cmp_scalar(b).then(Ordering::Less),
            (Open(a), Closed(b)) => a.cmp_scalar(b).then(Ordering::Greater),
        }
    }

    /// Order two boundaries used as upper ends: `a) < a] < +inf`.
    fn cmp_as_upper(&self, other: &Self) -> Ordering {
        use Boundary::*;
        match (self, other) {
            (NegInfinity, NegInfinity) | (PosInfinity, PosInfinity) => Ordering::Equal,
            (NegInfinity, _) | (_, PosInfinity) => Ordering::Less,
            (_, NegInfinity) | (PosInfinity, _) => Ordering::Greater,
            (Closed(a), Closed(b)) | (Open(a), Open(b)) => a.cmp_scalar(b),
            (Closed(a), Open(b)) => a.cmp_scalar(b).then(Ordering::Greater),
            (Open(a), Closed(b)) => a.cmp_scalar(b).then(Ordering::Less),
        }
    }

    fn hash_boundary<H: Hasher>(&self, state: &mut H) {
        match self {
            Boundary::Closed(v) => {
                0u8.hash(state);
                v.hash_scalar(state);
            }
            Boundary::Open(v) => {
                1u8.hash(state);
                v.hash_scalar(state);
            }
            Boundary::NegInfinity => 2u8.hash(state),
            Boundary::PosInfinity => 3u8.hash(state),
        }
    }
}

/// An interval `lo .. hi` whose ends are independently open, closed or infinite.
///
/// Invariant: `lo <= hi` (checked by [`Interval::new`]).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Interval<T> {
    lo: Boundary<T>,
    hi: Boundary<T>,
}

impl<T: Scalar> Interval<T> {
    /// Create an interval, rejecting `lo > hi` and misplaced infinities.
    pub fn new(lo: Boundary<T>, hi: Boundary<T>) -> Result<Self, CoreError> {
        let out_of_order = match (&lo, &hi) {
            (Boundary::PosInfinity, _) | (_, Boundary::NegInfinity) => true,
            (lo, hi) => match (lo.value(), hi.value()) {
                (Some(a), Some(b)) => a.cmp_scalar(b) == Ordering::Greater,
                _ => false,
            },
        };
        if out_of_order {
            return Err(CoreError::InvalidInterval {
                lo: render_lower(&lo),
                hi: render_upper(&hi),
            });
        }
        Ok(Self { lo, hi })
    }

    /// The whole line `(-inf, +inf)`.
    pub fn full() -> Self {
        Self {
            lo: Boundary::NegInfinity,
            hi: Boundary::PosInfinity,
        }
    }

    /// `[lo, hi]`
    pub fn closed(lo: T, hi: T) -> Result<Self, CoreError> {
        Self::new(Boundary::Closed(lo), Boundary::Closed(hi))
    }

    /// `(lo, hi)`
    pub fn open(lo: T, hi: T) -> Result<Self, CoreError> {
        Self::new(Boundary::Open(lo), Boundary::Open(hi))
    }

    /// `[lo, +inf)`
    pub fn at_least(lo: T) -> Self {
        Self {
            lo: Boundary::Closed(lo),
            hi: Boundary::PosInfinity,
        }
    }

    /// `(lo, +inf)`
    pub fn above(lo: T) -> Self {
        Self {
            lo: Boundary::Open(lo),
            hi: Boundary::PosInfinity,
        }
    }

    /// `(-inf, hi]`
    pub fn at_most(hi: T) -> Self {
        Self {
            lo: Boundary::NegInfinity,
            hi: Boundary::Closed(hi),
        }
    }

    /// `(-inf, hi)`
    pub fn below(hi: T) -> Self {
        Self {
            lo: Boundary::NegInfinity,
            hi: Boundary::Open(hi),
        }
    }

    /// The degenerate interval `[x, x]`.
    pub fn point(x: T) -> Self {
        Self {
            lo: Boundary::Closed(x.clone()),
            hi: Boundary::Closed(x),
        }
    }

    pub fn lo(&self) -> &Boundary<T> {
        &self.lo
    }

    pub fn hi(&self) -> &Boundary<T> {
        &self.hi
    }

    /// Membership test honouring the open/closed markers.
    pub fn contains(&self, x: &T) -> bool {
        let above_lo = match &self.lo {
            Boundary::NegInfinity => true,
            Boundary::Closed(a) => a.cmp_scalar(x) != Ordering::Greater,
            Boundary::Open(a) => a.cmp_scalar(x) == Ordering::Less,
            Boundary::PosInfinity => false,
        };
        let below_hi = match &self.hi {
            Boundary::PosInfinity => true,
            Boundary::Closed(b) => x.cmp_scalar(b) != Ordering::Greater,
            Boundary::Open(b) => x.cmp_scalar(b) == Ordering::Less,
            Boundary::NegInfinity => false,
        };
        above_lo && below_hi
    }

    /// True iff every point of `self` lies in `other`.
    pub fn is_sub_interval_of(&self, other: &Self) -> bool {
        other.lo.cmp_as_lower(&self.lo) != Ordering::Greater
            && self.hi.cmp_as_upper(&other.hi) != Ordering::Greater
    }

    /// Total order: by lower end, then by upper end.
    pub fn cmp_total(&self, other: &Self) -> Ordering {
        self.lo
            .cmp_as_lower(&other.lo)
            .then_with(|| self.hi.cmp_as_upper(&other.hi))
    }

    pub(crate) fn hash_interval<H: Hasher>(&self, state: &mut H) {
        self.lo.hash_boundary(state);
        self.hi.hash_boundary(state);
    }
}

impl Interval<f64> {
    /// Lower end as a float, `-inf` when unbounded.
    pub fn lo_f64(&self) -> f64 {
        self.lo.value().copied().unwrap_or(f64::NEG_INFINITY)
    }

    /// Upper end as a float, `+inf` when unbounded.
    pub fn hi_f64(&self) -> f64 {
        self.hi.value().copied().unwrap_or(f64::INFINITY)
    }
}

impl<T: Scalar> Default for Interval<T> {
    fn default() -> Self {
        Self::full()
    }
}

impl<T: Scalar> PartialEq for Interval<T> {
    fn eq(&self, other: &Self) -> bool {
        self.cmp_total(other) == Ordering::Equal
    }
}

impl<T: Scalar> Eq for Interval<T> {}

fn render_lower<T: fmt::Display>(b: &Boundary<T>) -> String {
    match b {
        Boundary::Closed(v) => format!("[{}", v),
        Boundary::Open(v) => format!("({}", v),
        Boundary::NegInfinity => "(-inf".to_string(),
        Boundary::PosInfinity => "(+inf".to_string(),
    }
}

fn render_upper<T: fmt::Display>(b: &Boundary<T>) -> String {
    match b {
        Boundary::Closed(v) => format!("{}]", v),
        Boundary::Open(v) => format!("{})", v),
        Boundary::NegInfinity => "-inf)".to_string(),
        Boundary::PosInfinity => "+inf)".to_string(),
    }
}

impl<T: fmt::Display> fmt::Display for Interval<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}, {}", render_lower(&self.lo), render_upper(&self.hi))
    }
}
