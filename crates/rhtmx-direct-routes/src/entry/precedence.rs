//! Route precedence
//!
//! Each template segment contributes one decimal digit: the first segment is
//! the units place, the second the first decimal place and so on. More
//! specific segments get smaller digits, so a lower precedence sorts first.
//!
//! | segment | digit |
//! |---------|-------|
//! | literal | 1 |
//! | complex (`{id}.{format}`) | 2 |
//! | constrained parameter | 2 |
//! | parameter | 3 |
//! | constrained catch-all | 4 |
//! | catch-all | 5 |

use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

use serde::de::{self, Deserializer, Visitor};
use serde::Deserialize;

use crate::constraint::RouteConstraint;
use crate::template::{PathSegment, RouteTemplate, TemplateParameter};

/// Fractional digits kept by [`Precedence`]
const SCALE: u32 = 28;
const ONE: i128 = 10_i128.pow(SCALE);

/// Fixed-point decimal specificity score
///
/// # Examples
///
/// ```
/// use std::collections::HashMap;
/// use rhtmx_direct_routes::{Precedence, RouteTemplate};
///
/// let literal = RouteTemplate::parse("orders/all").unwrap();
/// let typed = RouteTemplate::parse("orders/{id:int}").unwrap();
/// let open = RouteTemplate::parse("orders/{id}").unwrap();
///
/// let literal = Precedence::compute(&literal, &HashMap::new());
/// let typed = Precedence::compute(&typed, &HashMap::new());
/// let open = Precedence::compute(&open, &HashMap::new());
///
/// assert_eq!(typed.to_string(), "1.2");
/// assert!(literal < typed && typed < open);
/// ```
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Precedence(i128);

impl Precedence {
    pub const ZERO: Precedence = Precedence(0);

    /// Computes the precedence of a template
    ///
    /// A parameter counts as constrained when it has inline constraints or
    /// an entry in `constraints` (keys compared case-insensitively).
    pub fn compute(template: &RouteTemplate, constraints: &HashMap<String, RouteConstraint>) -> Self {
        let is_constrained = |p: &TemplateParameter| {
            !p.inline_constraints.is_empty()
                || constraints.keys().any(|key| key.eq_ignore_ascii_case(&p.name))
        };

        let (value, _) = template
            .segments()
            .iter()
            .take(SCALE as usize + 1)
            .fold((0_i128, ONE), |(value, place), segment| {
                let digit = match segment {
                    PathSegment::Literal(_) => 1,
                    PathSegment::Complex(_) => 2,
                    PathSegment::Parameter(p) if is_constrained(p) => 2,
                    PathSegment::Parameter(_) => 3,
                    PathSegment::CatchAll(p) if is_constrained(p) => 4,
                    PathSegment::CatchAll(_) => 5,
                };
                (value + digit * place, place / 10)
            });
        Precedence(value)
    }

    pub fn is_zero(&self) -> bool {
        self.0 == 0
    }
}

impl fmt::Display for Precedence {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sign = if self.0 < 0 { "-" } else { "" };
        let magnitude = self.0.unsigned_abs();
        let whole = magnitude / ONE as u128;
        let fraction = magnitude % ONE as u128;
        if fraction == 0 {
            return write!(f, "{sign}{whole}");
        }
        let digits = format!("{fraction:0width$}", width = SCALE as usize);
        write!(f, "{sign}{whole}.{}", digits.trim_end_matches('0'))
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("'{0}' is not a valid precedence; expected a decimal such as 1.23")]
pub struct ParsePrecedenceError(String);

impl FromStr for Precedence {
    type Err = ParsePrecedenceError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let error = || ParsePrecedenceError(s.to_string());
        let text = s.trim();
        let (negative, unsigned) = match text.strip_prefix('-') {
            Some(rest) => (true, rest),
            None => (false, text.strip_prefix('+').unwrap_or(text)),
        };
        let (whole, fraction) = unsigned.split_once('.').unwrap_or((unsigned, ""));

        let is_digits = |part: &str| part.bytes().all(|b| b.is_ascii_digit());
        if (whole.is_empty() && fraction.is_empty())
            || !is_digits(whole)
            || !is_digits(fraction)
            || fraction.len() > SCALE as usize
        {
            return Err(error());
        }

        let whole: i128 = if whole.is_empty() {
            0
        } else {
            whole.parse().map_err(|_| error())?
        };
        let fraction: i128 = if fraction.is_empty() {
            0
        } else {
            let padded = format!("{fraction:0<width$}", width = SCALE as usize);
            padded.parse().map_err(|_| error())?
        };

        let value = whole
            .checked_mul(ONE)
            .and_then(|w| w.checked_add(fraction))
            .ok_or_else(error)?;
        Ok(Precedence(if negative { -value } else { value }))
    }
}

impl<'de> Deserialize<'de> for Precedence {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        struct PrecedenceVisitor;

        impl Visitor<'_> for PrecedenceVisitor {
            type Value = Precedence;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("a decimal number or a decimal string")
            }

            fn visit_str<E: de::Error>(self, v: &str) -> Result<Precedence, E> {
                v.parse().map_err(E::custom)
            }

            fn visit_i64<E: de::Error>(self, v: i64) -> Result<Precedence, E> {
                self.visit_str(&v.to_string())
            }

            fn visit_u64<E: de::Error>(self, v: u64) -> Result<Precedence, E> {
                self.visit_str(&v.to_string())
            }

            fn visit_f64<E: de::Error>(self, v: f64) -> Result<Precedence, E> {
                self.visit_str(&v.to_string())
            }
        }

        deserializer.deserialize_any(PrecedenceVisitor)
    }
}
