//! Route template parser
//!
//! Pure functions turning tokenized segments into a [`RouteTemplate`].
//! Same input → same output, no side effects.

use std::collections::HashSet;

use super::lexer::{tokenize, Token};
use super::{PathSegment, RouteTemplate, Subsegment, TemplateParameter};
use crate::error::{Result, RouteError};

/// Characters that can never appear in a parameter name
const INVALID_NAME_CHARS: &[char] = &['{', '}', '/', '?', '*', '=', ':', '(', ')'];

/// Parses a route template
///
/// # Parameter syntax
///
/// `{` `*`? name (`:` constraint)* (`=` default | `?`)? `}`
///
/// - `{id}` required parameter
/// - `{id?}` optional parameter
/// - `{id=42}` parameter with a default value
/// - `{id:int:range(1,10)}` chained inline constraints
/// - `{*path}` catch-all, only as the whole last segment
///
/// # Examples
///
/// ```
/// use rhtmx_direct_routes::template::{parse_template, PathSegment};
///
/// let template = parse_template("orders/{id:int}").unwrap();
/// match &template.segments()[1] {
///     PathSegment::Parameter(p) => {
///         assert_eq!(p.name, "id");
///         assert_eq!(p.inline_constraints, vec!["int"]);
///     }
///     other => panic!("unexpected segment {other:?}"),
/// }
///
/// assert!(parse_template("files/{*path}/more").is_err());
/// ```
pub fn parse_template(text: &str) -> Result<RouteTemplate> {
    if text.starts_with('/') || text.starts_with('~') {
        return Err(RouteError::template(
            text,
            "a route template cannot start with '/' or '~'",
        ));
    }

    tokenize(text)?
        .into_iter()
        .try_fold(ParseState::new(text), ParseState::with_segment)
        .map(ParseState::finish)
}

/// Accumulator for the segment fold
struct ParseState<'t> {
    template: &'t str,
    segments: Vec<PathSegment>,
    names: HashSet<String>,
    has_catch_all: bool,
}

impl<'t> ParseState<'t> {
    fn new(template: &'t str) -> Self {
        Self {
            template,
            segments: Vec::new(),
            names: HashSet::new(),
            has_catch_all: false,
        }
    }

    fn with_segment(mut self, tokens: Vec<Token<'_>>) -> Result<Self> {
        if self.has_catch_all {
            return Err(self.error("a catch-all parameter can only appear as the last segment"));
        }
        if tokens.is_empty() {
            return Err(self.error(
                "the separator '/' cannot appear consecutively or at the end of the template",
            ));
        }

        let parts = tokens
            .into_iter()
            .try_fold(Vec::new(), |parts, token| self.with_token(parts, token))?;

        let segment = self.classify(parts)?;
        if let PathSegment::CatchAll(_) = segment {
            self.has_catch_all = true;
        }
        self.segments.push(segment);
        Ok(self)
    }

    /// Appends one token, merging adjacent literals
    fn with_token(&mut self, mut parts: Vec<Subsegment>, token: Token<'_>) -> Result<Vec<Subsegment>> {
        match token {
            Token::Literal(text) => {
                if text.contains('?') {
                    return Err(self.error(format!(
                        "the literal section '{text}' cannot contain the '?' character"
                    )));
                }
                match parts.last_mut() {
                    Some(Subsegment::Literal(previous)) => previous.push_str(&text),
                    _ => parts.push(Subsegment::Literal(text)),
                }
            }
            Token::Parameter(body) => {
                if let Some(Subsegment::Parameter(previous)) = parts.last() {
                    return Err(self.error(format!(
                        "the parameters '{}' and '{body}' must be separated by a literal",
                        previous.name
                    )));
                }
                let parameter = parse_parameter(self.template, body)?;
                if !self.names.insert(parameter.name.to_ascii_lowercase()) {
                    return Err(self.error(format!(
                        "the parameter name '{}' appears more than once",
                        parameter.name
                    )));
                }
                parts.push(Subsegment::Parameter(parameter));
            }
        }
        Ok(parts)
    }

    fn classify(&self, mut parts: Vec<Subsegment>) -> Result<PathSegment> {
        if parts.len() == 1 {
            return Ok(match parts.remove(0) {
                Subsegment::Literal(text) => PathSegment::Literal(text),
                Subsegment::Parameter(p) if p.is_catch_all => PathSegment::CatchAll(p),
                Subsegment::Parameter(p) => PathSegment::Parameter(p),
            });
        }

        let last = parts.len() - 1;
        for (index, part) in parts.iter().enumerate() {
            let Subsegment::Parameter(p) = part else {
                continue;
            };
            if p.is_catch_all {
                return Err(self.error(format!(
                    "the catch-all parameter '{}' must be the only content of its segment",
                    p.name
                )));
            }
            let follows_literal = index > 0 && matches!(parts[index - 1], Subsegment::Literal(_));
            if p.is_optional && (index != last || !follows_literal) {
                return Err(self.error(format!(
                    "the optional parameter '{}' must be the last part of its segment and follow a literal",
                    p.name
                )));
            }
        }
        Ok(PathSegment::Complex(parts))
    }

    fn finish(self) -> RouteTemplate {
        RouteTemplate::new(self.template, self.segments)
    }

    fn error(&self, reason: impl Into<String>) -> RouteError {
        RouteError::template(self.template, reason)
    }
}

/// Parses the body of a `{...}` parameter (pure function)
///
/// The default value is split off at the first `=` outside parentheses, so
/// constraint arguments may contain `=`, `:` or `?`.
fn parse_parameter(template: &str, body: &str) -> Result<TemplateParameter> {
    let error = |reason: String| RouteError::template(template, reason);

    let (body, is_catch_all) = match body.strip_prefix('*') {
        Some(rest) => (rest, true),
        None => (body, false),
    };

    let (head, default_value) = match find_top_level(body, '=') {
        Some(index) => (&body[..index], Some(body[index + 1..].to_string())),
        None => (body, None),
    };

    let (head, is_optional) = match head.strip_suffix('?') {
        Some(rest) => (rest, true),
        None => (head, false),
    };

    let mut pieces = split_top_level(head, ':').into_iter();
    let name = pieces.next().unwrap_or_default().trim();
    let inline_constraints: Vec<String> = pieces.map(str::to_string).collect();

    if name.is_empty() || name.contains(INVALID_NAME_CHARS) {
        return Err(error(format!(
            "the parameter name '{name}' is invalid; names must be non-empty and cannot contain {}",
            "'{', '}', '/', '?', '*', '=', ':', '(' or ')'"
        )));
    }
    if inline_constraints.iter().any(String::is_empty) {
        return Err(error(format!(
            "the parameter '{name}' has an empty inline constraint"
        )));
    }
    if is_optional && default_value.is_some() {
        return Err(error(format!(
            "the optional parameter '{name}' cannot have a default value"
        )));
    }
    if is_catch_all && is_optional {
        return Err(error(format!(
            "the catch-all parameter '{name}' cannot be marked optional"
        )));
    }

    Ok(TemplateParameter {
        name: name.to_string(),
        is_optional,
        is_catch_all,
        default_value,
        inline_constraints,
    })
}

/// Byte index of the first `needle` outside parentheses
fn find_top_level(text: &str, needle: char) -> Option<usize> {
    let mut depth = 0usize;
    text.char_indices().find_map(|(index, ch)| {
        match ch {
            '(' => depth += 1,
            ')' => depth = depth.saturating_sub(1),
            c if c == needle && depth == 0 => return Some(index),
            _ => {}
        }
        None
    })
}

/// Splits on `separator` outside parentheses
fn split_top_level(text: &str, separator: char) -> Vec<&str> {
    let mut pieces = Vec::new();
    let mut rest = text;
    while let Some(index) = find_top_level(rest, separator) {
        pieces.push(&rest[..index]);
        rest = &rest[index + separator.len_utf8()..];
    }
    pieces.push(rest);
    pieces
}
