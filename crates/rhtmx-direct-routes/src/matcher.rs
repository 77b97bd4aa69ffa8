//! Request path matching
//!
//! Matching is a pure read over built [`RouteEntry`]s. Routes are tried in
//! `(order, precedence)` order, declaration order breaking ties, and the
//! first route whose template and constraints accept the path wins. A path
//! that fits no route is `None`, never an error.

use std::borrow::Cow;
use std::collections::HashMap;

use serde::Deserialize;
use tracing::trace;

use crate::entry::{lookup, RouteEntry};
use crate::path::request_segments;
use crate::template::{PathSegment, Subsegment, TemplateParameter};

/// Values extracted from a path, plus the route's defaults
pub type RouteValues = HashMap<String, String>;

/// Matching behavior shared by every route in a table
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct MatchOptions {
    /// Compare literal segments exactly instead of ASCII case-insensitively
    pub case_sensitive: bool,
    /// Let a catch-all match when no path segments remain
    pub empty_catch_all: bool,
}

impl Default for MatchOptions {
    fn default() -> Self {
        Self {
            case_sensitive: false,
            empty_catch_all: true,
        }
    }
}

impl MatchOptions {
    pub fn with_case_sensitive(mut self, case_sensitive: bool) -> Self {
        self.case_sensitive = case_sensitive;
        self
    }

    pub fn with_empty_catch_all(mut self, empty_catch_all: bool) -> Self {
        self.empty_catch_all = empty_catch_all;
        self
    }
}

/// The winning route and the values it extracted
#[derive(Debug, Clone)]
pub struct RouteMatch<'a> {
    pub entry: &'a RouteEntry,
    pub values: RouteValues,
}

/// Finds the first route matching `path`, with default options
///
/// # Examples
///
/// ```
/// use rhtmx_direct_routes::{match_path, ActionRef, RouteBuilder};
///
/// let build = |template: &str| {
///     RouteBuilder::new(vec![ActionRef::new("Files", "Get")], true)
///         .unwrap()
///         .with_template(template)
///         .build()
///         .unwrap()
/// };
/// let entries = vec![build("files/{*path}"), build("files/{id:int}")];
///
/// let found = match_path("/files/42", &entries).unwrap();
/// assert_eq!(found.entry.template().text(), "files/{id:int}");
///
/// let found = match_path("/files/a/b/c", &entries).unwrap();
/// assert_eq!(found.values["path"], "a/b/c");
/// ```
pub fn match_path<'a>(path: &str, entries: &'a [RouteEntry]) -> Option<RouteMatch<'a>> {
    match_path_with(path, entries, &MatchOptions::default())
}

/// Finds the first route matching `path`
///
/// `entries` are stable-sorted by order, then precedence, before matching.
pub fn match_path_with<'a>(
    path: &str,
    entries: &'a [RouteEntry],
    options: &MatchOptions,
) -> Option<RouteMatch<'a>> {
    let mut ordered: Vec<&RouteEntry> = entries.iter().collect();
    ordered.sort_by_key(|entry| entry.sort_key());
    matches(ordered, path, options).next()
}

/// Lazily matches already-ordered entries against one path
pub(crate) fn matches<'a, 'p, I>(
    entries: I,
    path: &'p str,
    options: &'p MatchOptions,
) -> impl Iterator<Item = RouteMatch<'a>> + 'p
where
    I: IntoIterator<Item = &'a RouteEntry>,
    I::IntoIter: 'p,
    'a: 'p,
{
    let segments = request_segments(path);
    entries.into_iter().filter_map(move |entry| {
        match_segments_of(entry, &segments, path, options).map(|values| RouteMatch { entry, values })
    })
}

/// Matches one route against a request path
pub(crate) fn match_entry(entry: &RouteEntry, path: &str, options: &MatchOptions) -> Option<RouteValues> {
    match_segments_of(entry, &request_segments(path), path, options)
}

fn match_segments_of(
    entry: &RouteEntry,
    segments: &[Cow<'_, str>],
    path: &str,
    options: &MatchOptions,
) -> Option<RouteValues> {
    trace!(template = entry.template().text(), path, "attempting route match");

    let mut values = match_segments(
        entry.template().segments(),
        segments,
        HashMap::new(),
        entry.defaults(),
        options,
    )?;

    // Constraints only apply to values taken from the path
    let all_valid = values.iter().all(|(name, value)| {
        entry
            .constraint(name)
            .map(|constraint| constraint.matches(value))
            .unwrap_or(true)
    });
    if !all_valid {
        return None;
    }

    for (key, value) in entry.defaults() {
        if !values.keys().any(|k| k.eq_ignore_ascii_case(key)) {
            values.insert(key.clone(), value.clone());
        }
    }
    Some(values)
}

/// Tail-recursive walk over template and path segments
fn match_segments(
    template: &[PathSegment],
    path: &[Cow<'_, str>],
    mut values: RouteValues,
    defaults: &RouteValues,
    options: &MatchOptions,
) -> Option<RouteValues> {
    let Some((segment, template_rest)) = template.split_first() else {
        return path.is_empty().then_some(values);
    };

    let Some((value, path_rest)) = path.split_first() else {
        // Path ended: everything left in the template must be omittable
        let has_default = |p: &TemplateParameter| lookup(defaults, &p.name).is_some();
        let omittable = template.iter().all(|segment| match segment {
            PathSegment::CatchAll(p) => options.empty_catch_all || has_default(p),
            PathSegment::Parameter(p) => p.is_omittable() || has_default(p),
            other => other.is_omittable(),
        });
        return omittable.then_some(values);
    };

    match segment {
        PathSegment::CatchAll(parameter) => {
            values.insert(parameter.name.clone(), path.join("/"));
            return Some(values);
        }
        PathSegment::Literal(text) => {
            if !literal_eq(text, value, options) {
                return None;
            }
        }
        PathSegment::Parameter(parameter) => {
            if value.is_empty() {
                return None;
            }
            values.insert(parameter.name.clone(), value.to_string());
        }
        PathSegment::Complex(parts) => {
            values.extend(match_complex(parts, value, options)?);
        }
    }

    match_segments(template_rest, path_rest, values, defaults, options)
}

fn literal_eq(literal: &str, value: &str, options: &MatchOptions) -> bool {
    if options.case_sensitive {
        literal == value
    } else {
        literal.eq_ignore_ascii_case(value)
    }
}

/// Matches a segment such as `{id}.{format?}` against one path segment
///
/// A trailing optional parameter and the literal before it may be left out
/// of the path entirely, but a separator with nothing after it never matches.
fn match_complex(
    parts: &[Subsegment],
    segment: &str,
    options: &MatchOptions,
) -> Option<Vec<(String, String)>> {
    match_complex_parts(parts, segment, options).or_else(|| match parts {
        [head @ .., Subsegment::Literal(separator), Subsegment::Parameter(p)]
            if p.is_optional && !ends_with_literal(segment, separator, options) =>
        {
            match_complex_parts(head, segment, options)
        }
        _ => None,
    })
}

fn ends_with_literal(segment: &str, literal: &str, options: &MatchOptions) -> bool {
    segment.len() >= literal.len()
        && segment.is_char_boundary(segment.len() - literal.len())
        && literal_eq(literal, &segment[segment.len() - literal.len()..], options)
}

/// Right-to-left match: a literal with no parameter after it is anchored at
/// the end, the first literal is anchored at the start, and any other
/// literal binds to its last occurrence that leaves room for the parameter
/// after it.
fn match_complex_parts(
    parts: &[Subsegment],
    segment: &str,
    options: &MatchOptions,
) -> Option<Vec<(String, String)>> {
    let fold = |text: &str| -> String {
        if options.case_sensitive {
            text.to_string()
        } else {
            text.to_ascii_lowercase()
        }
    };
    let haystack = fold(segment);

    let mut captured = Vec::new();
    let mut pending: Option<&TemplateParameter> = None;
    let mut end = segment.len();

    for (index, part) in parts.iter().enumerate().rev() {
        let literal = match part {
            Subsegment::Parameter(parameter) => {
                pending = Some(parameter);
                continue;
            }
            Subsegment::Literal(literal) => fold(literal),
        };
        let remaining = &haystack[..end];

        let start = match pending {
            None => {
                if !remaining.ends_with(literal.as_str()) {
                    return None;
                }
                end - literal.len()
            }
            Some(_) if index == 0 => {
                if !remaining.starts_with(literal.as_str()) || literal.len() >= end {
                    return None;
                }
                0
            }
            Some(_) => remaining
                .rmatch_indices(literal.as_str())
                .map(|(start, _)| start)
                .find(|start| start + literal.len() < end)?,
        };

        if let Some(parameter) = pending.take() {
            captured.push((
                parameter.name.clone(),
                segment[start + literal.len()..end].to_string(),
            ));
        }
        end = start;
    }

    match pending {
        Some(parameter) if end > 0 => captured.push((parameter.name.clone(), segment[..end].to_string())),
        Some(_) => return None,
        None if end > 0 => return None,
        None => {}
    }
    Some(captured)
}
