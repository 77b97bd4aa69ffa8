//! Route value constraints
//!
//! A [`RouteConstraint`] answers one question: does this raw path value
//! satisfy me? Constraints are built once (from inline template text through
//! the [`resolver`], or supplied directly to the
//! [`RouteBuilder`](crate::RouteBuilder)) and are immutable afterwards.

use std::fmt;
use std::sync::Arc;

use chrono::{DateTime, NaiveDate, NaiveDateTime};
use regex::{Regex, RegexBuilder};
use uuid::Uuid;

pub mod resolver;

pub use resolver::{resolve_constraint, ConstraintArgs, ConstraintResolver, ConstraintResolverBuilder};

/// Most significant digits a `decimal` value may carry
const DECIMAL_MAX_DIGITS: usize = 29;

/// Date and date-time layouts accepted by the `datetime` constraint
const DATE_FORMATS: &[&str] = &["%Y-%m-%d", "%m/%d/%Y"];
const DATE_TIME_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M",
    "%m/%d/%Y %H:%M:%S",
    "%m/%d/%Y %H:%M",
];

/// Constraint kinds registered outside the built-in set
///
/// Implementations are shared behind an `Arc` and must be thread-safe.
///
/// # Examples
///
/// ```
/// use std::sync::Arc;
/// use rhtmx_direct_routes::{CustomConstraint, RouteConstraint};
///
/// #[derive(Debug)]
/// struct Even;
///
/// impl CustomConstraint for Even {
///     fn matches(&self, value: &str) -> bool {
///         value.parse::<u64>().map(|n| n % 2 == 0).unwrap_or(false)
///     }
///
///     fn name(&self) -> &str {
///         "even"
///     }
/// }
///
/// let even = RouteConstraint::Custom(Arc::new(Even));
/// assert!(even.matches("42"));
/// assert!(!even.matches("7"));
/// ```
pub trait CustomConstraint: Send + Sync + fmt::Debug {
    fn matches(&self, value: &str) -> bool;

    /// Inline form used when the constraint is displayed
    fn name(&self) -> &str;
}

/// A compiled, case-insensitive regex compared by its pattern
#[derive(Debug, Clone)]
pub struct ConstraintRegex(Regex);

impl ConstraintRegex {
    /// Compiles `pattern` case-insensitively, without anchoring it
    pub fn new(pattern: &str) -> Result<Self, regex::Error> {
        RegexBuilder::new(pattern)
            .case_insensitive(true)
            .build()
            .map(Self)
    }

    /// Compiles `pattern` so that it must match the whole value
    pub fn anchored(pattern: &str) -> Result<Self, regex::Error> {
        Self::new(&format!("^(?:{pattern})$"))
    }

    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }

    pub fn is_match(&self, value: &str) -> bool {
        self.0.is_match(value)
    }
}

impl PartialEq for ConstraintRegex {
    fn eq(&self, other: &Self) -> bool {
        self.as_str() == other.as_str()
    }
}

/// A check applied to one route value
#[derive(Debug, Clone)]
pub enum RouteConstraint {
    /// Non-empty ASCII letters
    Alpha,
    /// `true` / `false`, any case
    Bool,
    DateTime,
    Decimal,
    Double,
    Float,
    Guid,
    /// 32-bit signed integer
    Int,
    /// 64-bit signed integer
    Long,
    /// Character count in `[min, max]`
    Length { min: usize, max: usize },
    /// Integer in `[min, max]`
    Range { min: i64, max: i64 },
    Regex(ConstraintRegex),
    Min(i64),
    Max(i64),
    MinLength(usize),
    MaxLength(usize),
    /// All inner constraints must match
    Compound(Vec<RouteConstraint>),
    Custom(Arc<dyn CustomConstraint>),
}

impl PartialEq for RouteConstraint {
    fn eq(&self, other: &Self) -> bool {
        use RouteConstraint::*;
        match (self, other) {
            (Alpha, Alpha)
            | (Bool, Bool)
            | (DateTime, DateTime)
            | (Decimal, Decimal)
            | (Double, Double)
            | (Float, Float)
            | (Guid, Guid)
            | (Int, Int)
            | (Long, Long) => true,
            (Length { min: a, max: b }, Length { min: c, max: d }) => a == c && b == d,
            (Range { min: a, max: b }, Range { min: c, max: d }) => a == c && b == d,
            (Regex(a), Regex(b)) => a == b,
            (Min(a), Min(b)) | (Max(a), Max(b)) => a == b,
            (MinLength(a), MinLength(b)) | (MaxLength(a), MaxLength(b)) => a == b,
            (Compound(a), Compound(b)) => a == b,
            (Custom(a), Custom(b)) => Arc::ptr_eq(a, b),
            _ => false,
        }
    }
}

impl RouteConstraint {
    /// Combines constraints; a single constraint is returned unwrapped
    pub fn compound(mut constraints: Vec<RouteConstraint>) -> Self {
        if constraints.len() == 1 {
            constraints.remove(0)
        } else {
            RouteConstraint::Compound(constraints)
        }
    }

    /// Whether the raw route value satisfies this constraint
    ///
    /// # Examples
    ///
    /// ```
    /// use rhtmx_direct_routes::RouteConstraint;
    ///
    /// let range = RouteConstraint::Range { min: 1, max: 10 };
    /// assert!(range.matches("1"));
    /// assert!(range.matches("10"));
    /// assert!(!range.matches("0"));
    /// assert!(!range.matches("11"));
    /// assert!(!range.matches("ten"));
    /// ```
    pub fn matches(&self, value: &str) -> bool {
        match self {
            RouteConstraint::Alpha => {
                !value.is_empty() && value.chars().all(|c| c.is_ascii_alphabetic())
            }
            RouteConstraint::Bool => {
                value.eq_ignore_ascii_case("true") || value.eq_ignore_ascii_case("false")
            }
            RouteConstraint::DateTime => is_date_time(value),
            RouteConstraint::Decimal => is_decimal(value),
            RouteConstraint::Double => value.parse::<f64>().is_ok_and(f64::is_finite),
            RouteConstraint::Float => value.parse::<f32>().is_ok_and(f32::is_finite),
            RouteConstraint::Guid => Uuid::parse_str(value).is_ok(),
            RouteConstraint::Int => value.parse::<i32>().is_ok(),
            RouteConstraint::Long => value.parse::<i64>().is_ok(),
            RouteConstraint::Length { min, max } => {
                let len = value.chars().count();
                (*min..=*max).contains(&len)
            }
            RouteConstraint::Range { min, max } => {
                parse_integer(value).is_some_and(|n| (*min..=*max).contains(&n))
            }
            RouteConstraint::Regex(regex) => regex.is_match(value),
            RouteConstraint::Min(min) => parse_integer(value).is_some_and(|n| n >= *min),
            RouteConstraint::Max(max) => parse_integer(value).is_some_and(|n| n <= *max),
            RouteConstraint::MinLength(min) => value.chars().count() >= *min,
            RouteConstraint::MaxLength(max) => value.chars().count() <= *max,
            RouteConstraint::Compound(inner) => inner.iter().all(|c| c.matches(value)),
            RouteConstraint::Custom(custom) => custom.matches(value),
        }
    }

    /// Checks the constraint is usable; returns the reason when it is not
    pub(crate) fn validate(&self) -> std::result::Result<(), String> {
        match self {
            RouteConstraint::Length { min, max } if min > max => Err(format!(
                "length bounds are reversed ({min} > {max})"
            )),
            RouteConstraint::Range { min, max } if min > max => {
                Err(format!("range bounds are reversed ({min} > {max})"))
            }
            RouteConstraint::Compound(inner) if inner.is_empty() => {
                Err("a compound constraint needs at least one inner constraint".to_string())
            }
            RouteConstraint::Compound(inner) => inner.iter().try_for_each(RouteConstraint::validate),
            _ => Ok(()),
        }
    }
}

impl fmt::Display for RouteConstraint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RouteConstraint::Alpha => f.write_str("alpha"),
            RouteConstraint::Bool => f.write_str("bool"),
            RouteConstraint::DateTime => f.write_str("datetime"),
            RouteConstraint::Decimal => f.write_str("decimal"),
            RouteConstraint::Double => f.write_str("double"),
            RouteConstraint::Float => f.write_str("float"),
            RouteConstraint::Guid => f.write_str("guid"),
            RouteConstraint::Int => f.write_str("int"),
            RouteConstraint::Long => f.write_str("long"),
            RouteConstraint::Length { min, max } if min == max => write!(f, "length({min})"),
            RouteConstraint::Length { min, max } => write!(f, "length({min},{max})"),
            RouteConstraint::Range { min, max } => write!(f, "range({min},{max})"),
            RouteConstraint::Regex(regex) => write!(f, "regex({})", regex.as_str()),
            RouteConstraint::Min(min) => write!(f, "min({min})"),
            RouteConstraint::Max(max) => write!(f, "max({max})"),
            RouteConstraint::MinLength(min) => write!(f, "minlength({min})"),
            RouteConstraint::MaxLength(max) => write!(f, "maxlength({max})"),
            RouteConstraint::Compound(inner) => {
                let parts: Vec<String> = inner.iter().map(ToString::to_string).collect();
                f.write_str(&parts.join(":"))
            }
            RouteConstraint::Custom(custom) => f.write_str(custom.name()),
        }
    }
}

fn parse_integer(value: &str) -> Option<i64> {
    value.parse::<i64>().ok()
}

fn is_date_time(value: &str) -> bool {
    DateTime::parse_from_rfc3339(value).is_ok()
        || DATE_FORMATS
            .iter()
            .any(|format| NaiveDate::parse_from_str(value, format).is_ok())
        || DATE_TIME_FORMATS
            .iter()
            .any(|format| NaiveDateTime::parse_from_str(value, format).is_ok())
}

/// Optional sign, digits, optional fraction
fn is_decimal(value: &str) -> bool {
    let unsigned = value.strip_prefix(['-', '+']).unwrap_or(value);
    let (whole, fraction) = match unsigned.split_once('.') {
        Some((whole, fraction)) => (whole, fraction),
        None => (unsigned, ""),
    };

    let all_digits = |s: &str| s.bytes().all(|b| b.is_ascii_digit());
    if whole.is_empty() && fraction.is_empty() {
        return false;
    }
    if !all_digits(whole) || !all_digits(fraction) {
        return false;
    }

    let significant = whole.trim_start_matches('0').len() + fraction.len();
    significant <= DECIMAL_MAX_DIGITS
}
