//! # Values - Tagged Scalars and Intervals
//!
//! A [`Value`] is one sealed sum type over the seven scalar kinds and the
//! six interval kinds. Every operation dispatches on the tag; there is no
//! runtime type identification.
//!
//! ## Ordering
//!
//! Values form a total order so they can key CPT cells:
//! - different kinds compare by [`Kind`] rank (declaration order)
//! - floats use `f64::total_cmp`
//! - strings compare lexicographically, dates by instant
//! - intervals compare by lower end, then upper end

use std::cmp::Ordering;
use std::fmt;
use std::hash::{Hash, Hasher};

use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};

use crate::error::CoreError;
use crate::interval::{Boundary, Interval, Scalar};

/// The kind tag of a [`Value`].
///
/// The declaration order is the canonical kind rank.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Kind {
    Bool,
    Int,
    UInt,
    Float,
    Char,
    Date,
    String,
    BoolInterval,
    IntInterval,
    UIntInterval,
    FloatInterval,
    CharInterval,
    DateInterval,
}

impl Kind {
    pub fn is_interval(&self) -> bool {
        self.scalar().is_some()
    }

    /// The scalar kind of an interval kind.
    pub fn scalar(&self) -> Option<Kind> {
        match self {
            Kind::BoolInterval => Some(Kind::Bool),
            Kind::IntInterval => Some(Kind::Int),
            Kind::UIntInterval => Some(Kind::UInt),
            Kind::FloatInterval => Some(Kind::Float),
            Kind::CharInterval => Some(Kind::Char),
            Kind::DateInterval => Some(Kind::Date),
            _ => None,
        }
    }

    /// The interval kind over a scalar kind (strings have none).
    pub fn interval(&self) -> Option<Kind> {
        match self {
            Kind::Bool => Some(Kind::BoolInterval),
            Kind::Int => Some(Kind::IntInterval),
            Kind::UInt => Some(Kind::UIntInterval),
            Kind::Float => Some(Kind::FloatInterval),
            Kind::Char => Some(Kind::CharInterval),
            Kind::Date => Some(Kind::DateInterval),
            _ => None,
        }
    }

    /// Kinds that can be read as a real number.
    pub fn is_numeric(&self) -> bool {
        matches!(self, Kind::Int | Kind::UInt | Kind::Float)
    }

    pub fn name(&self) -> &'static str {
        match self {
            Kind::Bool => "bool",
            Kind::Int => "int",
            Kind::UInt => "uint",
            Kind::Float => "float",
            Kind::Char => "char",
            Kind::Date => "date",
            Kind::String => "string",
            Kind::BoolInterval => "bool-interval",
            Kind::IntInterval => "int-interval",
            Kind::UIntInterval => "uint-interval",
            Kind::FloatInterval => "float-interval",
            Kind::CharInterval => "char-interval",
            Kind::DateInterval => "date-interval",
        }
    }
}

impl fmt::Display for Kind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A typed value. The kind is fixed at construction.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum Value {
    Bool(bool),
    Int(i64),
    UInt(u64),
    Float(f64),
    Char(char),
    Date(NaiveDateTime),
    String(String),
    BoolInterval(Interval<bool>),
    IntInterval(Interval<i64>),
    UIntInterval(Interval<u64>),
    FloatInterval(Interval<f64>),
    CharInterval(Interval<char>),
    DateInterval(Interval<NaiveDateTime>),
}

const DATE_FORMATS: [&str; 3] = ["%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M:%S", "%Y-%m-%d %H:%M"];

impl Value {
    pub fn kind(&self) -> Kind {
        match self {
            Value::Bool(_) => Kind::Bool,
            Value::Int(_) => Kind::Int,
            Value::UInt(_) => Kind::UInt,
            Value::Float(_) => Kind::Float,
            Value::Char(_) => Kind::Char,
            Value::Date(_) => Kind::Date,
            Value::String(_) => Kind::String,
            Value::BoolInterval(_) => Kind::BoolInterval,
            Value::IntInterval(_) => Kind::IntInterval,
            Value::UIntInterval(_) => Kind::UIntInterval,
            Value::FloatInterval(_) => Kind::FloatInterval,
            Value::CharInterval(_) => Kind::CharInterval,
            Value::DateInterval(_) => Kind::DateInterval,
        }
    }

    pub fn is_interval(&self) -> bool {
        self.kind().is_interval()
    }

    /// Parse `text` as a value of `kind`.
    ///
    /// Interval kinds accept `[a, b]`, `(a, b)`, mixed markers and
    /// `-inf` / `+inf` for unbounded ends.
    ///
    /// # Example
    ///
    /// ```rust
    /// use bayesnet_core::{Kind, Value};
    ///
    /// let v = Value::parse_as(Kind::UInt, "3").unwrap();
    /// assert_eq!(v, Value::UInt(3));
    ///
    /// let i = Value::parse_as(Kind::FloatInterval, "[0.5, +inf)").unwrap();
    /// assert!(i.contains(&Value::Float(2.0)));
    /// ```
    pub fn parse_as(kind: Kind, text: &str) -> Result<Value, CoreError> {
        let fail = |reason: &str| CoreError::Parse {
            kind,
            text: text.to_string(),
            reason: reason.to_string(),
        };
        if text.is_empty() {
            return Err(fail("empty text"));
        }
        let trimmed = text.trim();
        match kind {
            Kind::Bool => parse_bool(trimmed).map(Value::Bool).map_err(|r| fail(&r)),
            Kind::Int => parse_int(trimmed).map(Value::Int).map_err(|r| fail(&r)),
            Kind::UInt => parse_uint(trimmed).map(Value::UInt).map_err(|r| fail(&r)),
            Kind::Float => parse_float(trimmed).map(Value::Float).map_err(|r| fail(&r)),
            Kind::Char => parse_char(text).map(Value::Char).map_err(|r| fail(&r)),
            Kind::Date => parse_date(trimmed).map(Value::Date).map_err(|r| fail(&r)),
            Kind::String => Ok(Value::String(text.to_string())),
            Kind::BoolInterval => parse_interval(trimmed, parse_bool)
                .map(Value::BoolInterval)
                .map_err(|r| fail(&r)),
            Kind::IntInterval => parse_interval(trimmed, parse_int)
                .map(Value::IntInterval)
                .map_err(|r| fail(&r)),
            Kind::UIntInterval => parse_interval(trimmed, parse_uint)
                .map(Value::UIntInterval)
                .map_err(|r| fail(&r)),
            Kind::FloatInterval => parse_interval(trimmed, parse_float)
                .map(Value::FloatInterval)
                .map_err(|r| fail(&r)),
            Kind::CharInterval => parse_interval(trimmed, parse_char)
                .map(Value::CharInterval)
                .map_err(|r| fail(&r)),
            Kind::DateInterval => parse_interval(trimmed, parse_date)
                .map(Value::DateInterval)
                .map_err(|r| fail(&r)),
        }
    }

    /// Numeric view used by the continuous leaves.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Value::Int(v) => Some(*v as f64),
            Value::UInt(v) => Some(*v as f64),
            Value::Float(v) => Some(*v),
            _ => None,
        }
    }

    /// Numeric intervals widened to a float interval.
    pub fn as_f64_interval(&self) -> Option<Interval<f64>> {
        match self {
            Value::FloatInterval(i) => Some(i.clone()),
            Value::IntInterval(i) => {
                let lo = map_boundary(i.lo(), |v| *v as f64);
                let hi = map_boundary(i.hi(), |v| *v as f64);
                Interval::new(lo, hi).ok()
            }
            Value::UIntInterval(i) => {
                let lo = map_boundary(i.lo(), |v| *v as f64);
                let hi = map_boundary(i.hi(), |v| *v as f64);
                Interval::new(lo, hi).ok()
            }
            Value::BoolInterval(i) => {
                let lo = map_boundary(i.lo(), |v| f64::from(u8::from(*v)));
                let hi = map_boundary(i.hi(), |v| f64::from(u8::from(*v)));
                Interval::new(lo, hi).ok()
            }
            _ => None,
        }
    }

    /// Interval membership. `false` when `self` is not an interval or the
    /// kinds do not line up.
    pub fn contains(&self, x: &Value) -> bool {
        match (self, x) {
            (Value::BoolInterval(i), Value::Bool(v)) => i.contains(v),
            (Value::IntInterval(i), Value::Int(v)) => i.contains(v),
            (Value::UIntInterval(i), Value::UInt(v)) => i.contains(v),
            (Value::FloatInterval(i), Value::Float(v)) => i.contains(v),
            (Value::CharInterval(i), Value::Char(v)) => i.contains(v),
            (Value::DateInterval(i), Value::Date(v)) => i.contains(v),
            _ => false,
        }
    }

    /// Sub-interval test; `false` for non-intervals or mismatched kinds.
    pub fn is_sub(&self, other: &Value) -> bool {
        match (self, other) {
            (Value::BoolInterval(a), Value::BoolInterval(b)) => a.is_sub_interval_of(b),
            (Value::IntInterval(a), Value::IntInterval(b)) => a.is_sub_interval_of(b),
            (Value::UIntInterval(a), Value::UIntInterval(b)) => a.is_sub_interval_of(b),
            (Value::FloatInterval(a), Value::FloatInterval(b)) => a.is_sub_interval_of(b),
            (Value::CharInterval(a), Value::CharInterval(b)) => a.is_sub_interval_of(b),
            (Value::DateInterval(a), Value::DateInterval(b)) => a.is_sub_interval_of(b),
            _ => false,
        }
    }
}

fn map_boundary<T, U>(b: &Boundary<T>, f: impl Fn(&T) -> U) -> Boundary<U> {
    match b {
        Boundary::Closed(v) => Boundary::Closed(f(v)),
        Boundary::Open(v) => Boundary::Open(f(v)),
        Boundary::NegInfinity => Boundary::NegInfinity,
        Boundary::PosInfinity => Boundary::PosInfinity,
    }
}

fn parse_bool(s: &str) -> Result<bool, String> {
    match s.to_ascii_lowercase().as_str() {
        "true" | "t" | "yes" | "y" | "1" => Ok(true),
        "false" | "f" | "no" | "n" | "0" => Ok(false),
        _ => Err("expected true/false".to_string()),
    }
}

fn parse_int(s: &str) -> Result<i64, String> {
    s.parse::<i64>().map_err(|e| e.to_string())
}

fn parse_uint(s: &str) -> Result<u64, String> {
    s.parse::<u64>().map_err(|e| e.to_string())
}

fn parse_float(s: &str) -> Result<f64, String> {
    s.parse::<f64>().map_err(|e| e.to_string())
}

fn parse_char(s: &str) -> Result<char, String> {
    let unquoted = s
        .strip_prefix('\'')
        .and_then(|rest| rest.strip_suffix('\''))
        .filter(|inner| inner.chars().count() == 1)
        .unwrap_or(s);
    let mut chars = unquoted.chars();
    match (chars.next(), chars.next()) {
        (Some(c), None) => Ok(c),
        _ => {
            let trimmed = unquoted.trim();
            let mut chars = trimmed.chars();
            match (chars.next(), chars.next()) {
                (Some(c), None) => Ok(c),
                _ => Err("expected exactly one character".to_string()),
            }
        }
    }
}

fn parse_date(s: &str) -> Result<NaiveDateTime, String> {
    for format in DATE_FORMATS {
        if let Ok(dt) = NaiveDateTime::parse_from_str(s, format) {
            return Ok(dt);
        }
    }
    NaiveDate::parse_from_str(s, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .ok_or_else(|| "expected YYYY-MM-DD[ HH:MM[:SS]]".to_string())
}

fn parse_interval<T: Scalar>(
    s: &str,
    parse: impl Fn(&str) -> Result<T, String>,
) -> Result<Interval<T>, String> {
    let open_lo = match s.chars().next() {
        Some('[') => false,
        Some('(') => true,
        _ => return Err("interval must start with '[' or '('".to_string()),
    };
    let open_hi = match s.chars().last() {
        Some(']') => false,
        Some(')') => true,
        _ => return Err("interval must end with ']' or ')'".to_string()),
    };
    let inner = &s[1..s.len() - 1];
    let (lo_text, hi_text) = inner
        .split_once(',')
        .ok_or_else(|| "interval needs two comma-separated bounds".to_string())?;
    let (lo_text, hi_text) = (lo_text.trim(), hi_text.trim());

    let lo = match lo_text {
        "-inf" | "-∞" => Boundary::NegInfinity,
        text if open_lo => Boundary::Open(parse(text)?),
        text => Boundary::Closed(parse(text)?),
    };
    let hi = match hi_text {
        "+inf" | "inf" | "+∞" | "∞" => Boundary::PosInfinity,
        text if open_hi => Boundary::Open(parse(text)?),
        text => Boundary::Closed(parse(text)?),
    };
    Interval::new(lo, hi).map_err(|e| e.to_string())
}

impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for Value {}

impl PartialOrd for Value {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Value {
    fn cmp(&self, other: &Self) -> Ordering {
        use Value::*;
        match (self, other) {
            (Bool(a), Bool(b)) => a.cmp(b),
            (Int(a), Int(b)) => a.cmp(b),
            (UInt(a), UInt(b)) => a.cmp(b),
            (Float(a), Float(b)) => a.total_cmp(b),
            (Char(a), Char(b)) => a.cmp(b),
            (Date(a), Date(b)) => a.cmp(b),
            (String(a), String(b)) => a.cmp(b),
            (BoolInterval(a), BoolInterval(b)) => a.cmp_total(b),
            (IntInterval(a), IntInterval(b)) => a.cmp_total(b),
            (UIntInterval(a), UIntInterval(b)) => a.cmp_total(b),
            (FloatInterval(a), FloatInterval(b)) => a.cmp_total(b),
            (CharInterval(a), CharInterval(b)) => a.cmp_total(b),
            (DateInterval(a), DateInterval(b)) => a.cmp_total(b),
            _ => self.kind().cmp(&other.kind()),
        }
    }
}

impl Hash for Value {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.kind().hash(state);
        match self {
            Value::Bool(v) => v.hash(state),
            Value::Int(v) => v.hash(state),
            Value::UInt(v) => v.hash(state),
            Value::Float(v) => v.to_bits().hash(state),
            Value::Char(v) => v.hash(state),
            Value::Date(v) => v.hash(state),
            Value::String(v) => v.hash(state),
            Value::BoolInterval(i) => i.hash_interval(state),
            Value::IntInterval(i) => i.hash_interval(state),
            Value::UIntInterval(i) => i.hash_interval(state),
            Value::FloatInterval(i) => i.hash_interval(state),
            Value::CharInterval(i) => i.hash_interval(state),
            Value::DateInterval(i) => i.hash_interval(state),
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Bool(v) => write!(f, "{}", v),
            Value::Int(v) => write!(f, "{}", v),
            Value::UInt(v) => write!(f, "{}", v),
            Value::Float(v) => write!(f, "{}", v),
            Value::Char(v) => write!(f, "'{}'", v),
            Value::Date(v) => write!(f, "{}", v.format(DATE_FORMATS[0])),
            Value::String(v) => write!(f, "{}", v),
            Value::BoolInterval(i) => write!(f, "{}", i),
            Value::IntInterval(i) => write!(f, "{}", i),
            Value::UIntInterval(i) => write!(f, "{}", i),
            Value::FloatInterval(i) => write!(f, "{}", i),
            Value::CharInterval(i) => write!(f, "{}", i),
            Value::DateInterval(i) => write!(f, "{}", i),
        }
    }
}

macro_rules! value_from {
    ($($t:ty => $variant:ident),* $(,)?) => {
        $(
            impl From<$t> for Value {
                fn from(v: $t) -> Self {
                    Value::$variant(v)
                }
            }
        )*
    };
}

value_from!(
    bool => Bool,
    i64 => Int,
    u64 => UInt,
    f64 => Float,
    char => Char,
    NaiveDateTime => Date,
    String => String,
    Interval<bool> => BoolInterval,
    Interval<i64> => IntInterval,
    Interval<u64> => UIntInterval,
    Interval<f64> => FloatInterval,
    Interval<char> => CharInterval,
    Interval<NaiveDateTime> => DateInterval,
);

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Value::String(v.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_parse_scalars() {
        assert_eq!(Value::parse_as(Kind::Bool, "TRUE").unwrap(), Value::Bool(true));
        assert_eq!(Value::parse_as(Kind::Int, " -42 ").unwrap(), Value::Int(-42));
        assert_eq!(Value::parse_as(Kind::UInt, "7").unwrap(), Value::UInt(7));
        assert_eq!(Value::parse_as(Kind::Float, "2.5").unwrap(), Value::Float(2.5));
        assert_eq!(Value::parse_as(Kind::Char, "B").unwrap(), Value::Char('B'));
        assert_eq!(Value::parse_as(Kind::Char, "'B'").unwrap(), Value::Char('B'));
        assert_eq!(
            Value::parse_as(Kind::String, "heavy").unwrap(),
            Value::from("heavy")
        );
    }

    #[test]
    fn test_parse_errors() {
        assert!(matches!(
            Value::parse_as(Kind::UInt, "-1"),
            Err(CoreError::Parse { kind: Kind::UInt, .. })
        ));
        assert!(Value::parse_as(Kind::Int, "").is_err());
        assert!(Value::parse_as(Kind::Char, "ab").is_err());
        assert!(Value::parse_as(Kind::Date, "yesterday").is_err());
        assert!(Value::parse_as(Kind::IntInterval, "[3, 1]").is_err());
        assert!(Value::parse_as(Kind::IntInterval, "3, 1").is_err());
    }

    #[test]
    fn test_parse_dates() {
        let a = Value::parse_as(Kind::Date, "2024-03-01").unwrap();
        let b = Value::parse_as(Kind::Date, "2024-03-01 12:30:00").unwrap();
        let c = Value::parse_as(Kind::Date, "2024-03-01T12:30:00").unwrap();
        assert!(a < b);
        assert_eq!(b, c);
        assert_eq!(b.to_string(), "2024-03-01 12:30:00");
    }

    #[test]
    fn test_parse_intervals() {
        let i = Value::parse_as(Kind::IntInterval, "(-inf, 3]").unwrap();
        assert!(i.contains(&Value::Int(3)));
        assert!(i.contains(&Value::Int(i64::MIN)));
        assert!(!i.contains(&Value::Int(4)));

        let d = Value::parse_as(Kind::DateInterval, "[2024-01-01, 2024-02-01)").unwrap();
        assert!(d.contains(&Value::parse_as(Kind::Date, "2024-01-15").unwrap()));
        assert!(!d.contains(&Value::parse_as(Kind::Date, "2024-02-01").unwrap()));
    }

    #[test]
    fn test_contains_kind_mismatch_is_false() {
        let i = Value::from(Interval::closed(0.0, 1.0).unwrap());
        assert!(i.contains(&Value::Float(0.5)));
        assert!(!i.contains(&Value::Int(0)));
        assert!(!Value::Float(0.5).contains(&Value::Float(0.5)));
    }

    #[test]
    fn test_is_sub() {
        let a = Value::from(Interval::closed(1u64, 2).unwrap());
        let b = Value::from(Interval::at_least(0u64));
        assert!(a.is_sub(&b));
        assert!(!b.is_sub(&a));
        assert!(!a.is_sub(&Value::from(Interval::<i64>::full())));
    }

    #[test]
    fn test_cross_kind_order_is_by_rank() {
        assert!(Value::Bool(true) < Value::Int(-5));
        assert!(Value::Float(1e9) < Value::Char('a'));
        assert!(Value::from("a") < Value::from(Interval::<bool>::full()));
        assert_eq!(Value::Int(1).cmp(&Value::UInt(1)), Ordering::Less);
    }

    #[test]
    fn test_float_total_order_and_hash() {
        let mut set = HashSet::new();
        set.insert(Value::Float(0.5));
        set.insert(Value::Float(0.5));
        set.insert(Value::Float(f64::NAN));
        assert_eq!(set.len(), 2);
        assert!(Value::Float(f64::NEG_INFINITY) < Value::Float(-1.0));
    }

    #[test]
    fn test_numeric_interval_widening() {
        let i = Value::from(Interval::closed(1i64, 3).unwrap());
        let f = i.as_f64_interval().unwrap();
        assert_eq!(f.lo_f64(), 1.0);
        assert_eq!(f.hi_f64(), 3.0);
        assert!(Value::from("x").as_f64_interval().is_none());
    }
}
