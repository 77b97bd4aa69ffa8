//! Route templates
//!
//! A route template such as `orders/{id:int}/{*rest}` is parsed once, at
//! configuration time, into an immutable [`RouteTemplate`]: an ordered list of
//! [`PathSegment`]s. Parsing is split in two pure stages:
//!
//! - [`lexer`] splits the raw text into segments of literal and parameter tokens
//! - [`parser`] classifies the tokens and validates the template invariants
//!
//! [`cache`] memoizes parsed templates process-wide.

use std::fmt;

pub mod cache;
pub mod lexer;
pub mod parser;

pub use cache::TemplateCache;
pub use parser::parse_template;

use crate::error::Result;

/// A named parameter as written inside `{ }`
///
/// Inline constraints are kept as text here; they are resolved into
/// [`RouteConstraint`](crate::RouteConstraint)s when the route entry is built.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TemplateParameter {
    pub name: String,
    /// `{name?}`
    pub is_optional: bool,
    /// `{*name}`
    pub is_catch_all: bool,
    /// `{name=value}`
    pub default_value: Option<String>,
    /// `{name:int:range(1,10)}` → `["int", "range(1,10)"]`
    pub inline_constraints: Vec<String>,
}

impl TemplateParameter {
    /// A parameter that may be missing from the request path
    pub fn is_omittable(&self) -> bool {
        self.is_optional || self.is_catch_all || self.default_value.is_some()
    }
}

/// Part of a complex segment such as `{id}.{format?}`
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Subsegment {
    Literal(String),
    Parameter(TemplateParameter),
}

/// One `/`-separated segment of a template
///
/// # Examples
///
/// ```
/// use rhtmx_direct_routes::template::{parse_template, PathSegment};
///
/// let template = parse_template("files/{name}.{ext}/{*rest}").unwrap();
/// let segments = template.segments();
///
/// assert!(matches!(segments[0], PathSegment::Literal(_)));
/// assert!(matches!(segments[1], PathSegment::Complex(_)));
/// assert!(matches!(segments[2], PathSegment::CatchAll(_)));
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PathSegment {
    /// Static text, matched verbatim
    Literal(String),
    /// A segment made of a single parameter
    Parameter(TemplateParameter),
    /// Trailing wildcard consuming the rest of the path
    CatchAll(TemplateParameter),
    /// Literal and parameter parts sharing one segment (at least two parts)
    Complex(Vec<Subsegment>),
}

impl PathSegment {
    /// Parameters declared in this segment, in template order
    pub fn parameters(&self) -> Box<dyn Iterator<Item = &TemplateParameter> + '_> {
        match self {
            PathSegment::Literal(_) => Box::new(std::iter::empty()),
            PathSegment::Parameter(p) | PathSegment::CatchAll(p) => Box::new(std::iter::once(p)),
            PathSegment::Complex(parts) => Box::new(parts.iter().filter_map(|part| match part {
                Subsegment::Parameter(p) => Some(p),
                Subsegment::Literal(_) => None,
            })),
        }
    }

    /// Whether the request path may end before this segment
    pub fn is_omittable(&self) -> bool {
        match self {
            PathSegment::Parameter(p) | PathSegment::CatchAll(p) => p.is_omittable(),
            PathSegment::Literal(_) | PathSegment::Complex(_) => false,
        }
    }
}

/// A parsed route template
///
/// Two parses of the same text are always equal.
///
/// # Examples
///
/// ```
/// use rhtmx_direct_routes::RouteTemplate;
///
/// let template = RouteTemplate::parse("orders/{id:int}").unwrap();
/// assert_eq!(template.text(), "orders/{id:int}");
/// assert_eq!(template.segments().len(), 2);
/// assert_eq!(template.parameter("ID").unwrap().inline_constraints, vec!["int"]);
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RouteTemplate {
    text: String,
    segments: Vec<PathSegment>,
}

impl RouteTemplate {
    pub(crate) fn new(text: impl Into<String>, segments: Vec<PathSegment>) -> Self {
        Self {
            text: text.into(),
            segments,
        }
    }

    /// Parses a template; same as [`parse_template`]
    pub fn parse(text: &str) -> Result<Self> {
        parse_template(text)
    }

    /// The template text this was parsed from
    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn segments(&self) -> &[PathSegment] {
        &self.segments
    }

    /// All parameters in template order
    pub fn parameters(&self) -> impl Iterator<Item = &TemplateParameter> {
        self.segments.iter().flat_map(PathSegment::parameters)
    }

    /// Looks up a parameter by name (case-insensitive)
    pub fn parameter(&self, name: &str) -> Option<&TemplateParameter> {
        self.parameters().find(|p| p.name.eq_ignore_ascii_case(name))
    }

    pub fn has_catch_all(&self) -> bool {
        matches!(self.segments.last(), Some(PathSegment::CatchAll(_)))
    }

    /// True when the template contains no parameters at all
    pub fn is_literal(&self) -> bool {
        self.parameters().next().is_none()
    }
}

impl fmt::Display for RouteTemplate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.text)
    }
}
