//! Censored observation model
//!
//! Monitoring data frequently reports values only as a bound: `<0.5` for a
//! result below the detection limit, `>2400` for a count above the upper
//! reporting limit. A [`CensoredValue`] keeps the reported bound together
//! with a [`CensorType`] tag. String markers are interpreted once, at the
//! parsing boundary ([`parse_values`], [`CensoredValue::from_str`]), and never
//! travel further into the engine.

use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Censoring state of an observation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum CensorType {
    /// Exact measurement
    None,
    /// True value lies somewhere below the reported bound
    LessThan,
    /// True value lies somewhere above the reported bound
    GreaterThan,
}

impl CensorType {
    /// Marker used when formatting values of this type
    pub fn marker(&self) -> &'static str {
        match self {
            Self::None => "",
            Self::LessThan => "<",
            Self::GreaterThan => ">",
        }
    }

    /// Whether the observation is censored at all
    pub fn is_censored(&self) -> bool {
        !matches!(self, Self::None)
    }
}

impl fmt::Display for CensorType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::None => write!(f, "none"),
            Self::LessThan => write!(f, "less-than"),
            Self::GreaterThan => write!(f, "greater-than"),
        }
    }
}

/// A numeric observation, possibly censored
///
/// For censored values `value` is the reported bound (the detection limit
/// for [`CensorType::LessThan`]).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CensoredValue {
    value: f64,
    censor: CensorType,
}

impl CensoredValue {
    /// Create a value, rejecting NaN and infinities
    pub fn new(value: f64, censor: CensorType) -> Result<Self> {
        if !value.is_finite() {
            return Err(Error::non_finite("observation"));
        }
        Ok(Self { value, censor })
    }

    /// An exact measurement
    pub fn exact(value: f64) -> Result<Self> {
        Self::new(value, CensorType::None)
    }

    /// A left-censored value (`<bound`)
    pub fn less_than(bound: f64) -> Result<Self> {
        Self::new(bound, CensorType::LessThan)
    }

    /// A right-censored value (`>bound`)
    pub fn greater_than(bound: f64) -> Result<Self> {
        Self::new(bound, CensorType::GreaterThan)
    }

    /// Reported value or bound
    pub fn value(&self) -> f64 {
        self.value
    }

    /// Censoring state
    pub fn censor(&self) -> CensorType {
        self.censor
    }

    pub fn is_censored(&self) -> bool {
        self.censor.is_censored()
    }
}

impl fmt::Display for CensoredValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.censor.marker(), self.value)
    }
}

impl FromStr for CensoredValue {
    type Err = Error;

    /// Parse `"3.2"`, `"<0.5"` or `"> 100"`
    fn from_str(token: &str) -> Result<Self> {
        let trimmed = token.trim();
        let (censor, rest) = if let Some(rest) = trimmed.strip_prefix('<') {
            (CensorType::LessThan, rest)
        } else if let Some(rest) = trimmed.strip_prefix('>') {
            (CensorType::GreaterThan, rest)
        } else {
            (CensorType::None, trimmed)
        };

        let rest = rest.trim();
        if rest.is_empty() {
            return Err(Error::invalid_token(token, "missing numeric value"));
        }
        let value: f64 = rest
            .parse()
            .map_err(|_| Error::invalid_token(token, "not a number"))?;
        if !value.is_finite() {
            return Err(Error::invalid_token(token, "value must be finite"));
        }
        Ok(Self { value, censor })
    }
}

/// Raw input as received from a caller: either a plain number or a token
/// that may carry a censoring marker
#[derive(Debug, Clone, PartialEq)]
pub enum RawValue {
    Number(f64),
    Text(String),
}

impl From<f64> for RawValue {
    fn from(value: f64) -> Self {
        Self::Number(value)
    }
}

impl From<i32> for RawValue {
    fn from(value: i32) -> Self {
        Self::Number(f64::from(value))
    }
}

impl From<&str> for RawValue {
    fn from(value: &str) -> Self {
        Self::Text(value.to_string())
    }
}

impl From<String> for RawValue {
    fn from(value: String) -> Self {
        Self::Text(value)
    }
}

impl RawValue {
    /// Interpret this raw value as a censored observation
    pub fn parse(&self) -> Result<CensoredValue> {
        match self {
            Self::Number(v) => CensoredValue::exact(*v),
            Self::Text(s) => s.parse(),
        }
    }
}

/// Convert a mixed numeric/marker sequence into censored observations
///
/// Fails on the first unparseable token.
///
/// # Examples
///
/// ```rust
/// use trend_core::{parse_values, CensorType, RawValue};
///
/// let raw: Vec<RawValue> = vec![1.0.into(), "<0.5".into(), ">10".into()];
/// let parsed = parse_values(&raw).unwrap();
/// assert_eq!(parsed[1].censor(), CensorType::LessThan);
/// assert_eq!(parsed[2].value(), 10.0);
/// ```
pub fn parse_values(raw: &[RawValue]) -> Result<Vec<CensoredValue>> {
    raw.iter().map(RawValue::parse).collect()
}

/// Apply the "hi-censor" rule
///
/// Every observation, censored or not, whose value lies below the highest
/// left-censoring limit in the series is replaced by `<limit`. This removes
/// spurious trends caused by detection limits that improve over time.
/// Returns the input unchanged when there is no left-censored value.
pub fn apply_hicensor(values: &[CensoredValue]) -> Vec<CensoredValue> {
    let limit = values
        .iter()
        .filter(|v| v.censor == CensorType::LessThan)
        .map(|v| v.value)
        .fold(f64::NEG_INFINITY, f64::max);

    if !limit.is_finite() {
        return values.to_vec();
    }

    values
        .iter()
        .map(|v| {
            if v.value < limit && v.censor != CensorType::GreaterThan {
                CensoredValue {
                    value: limit,
                    censor: CensorType::LessThan,
                }
            } else {
                *v
            }
        })
        .collect()
}
