//! URL generation
//!
//! The reverse of matching: binds route values to a template.

use crate::entry::{lookup, RouteEntry};
use crate::matcher::RouteValues;
use crate::template::{PathSegment, Subsegment, TemplateParameter};

/// One rendered segment and whether it can be dropped from the end of the URL
struct Rendered {
    text: String,
    trailing_omittable: bool,
}

/// Builds a `/`-prefixed path for `entry` from `values`
///
/// - Missing values fall back to the entry's defaults
/// - Trailing segments that are absent or equal to their default are dropped
/// - A missing required value, a gap before a present segment, or a value
///   failing its constraint yields `None`
pub(crate) fn generate(entry: &RouteEntry, values: &RouteValues) -> Option<String> {
    let template = entry.template();

    let constraints_hold = template.parameters().all(|parameter| {
        match (lookup(values, &parameter.name), entry.constraint(&parameter.name)) {
            (Some(value), Some(constraint)) => constraint.matches(value),
            _ => true,
        }
    });
    if !constraints_hold {
        return None;
    }

    let mut rendered = template
        .segments()
        .iter()
        .map(|segment| render_segment(entry, segment, values))
        .collect::<Option<Vec<_>>>()?;

    while rendered.last().is_some_and(|r| r.trailing_omittable) {
        rendered.pop();
    }
    // An omitted optional parameter cannot leave a hole in the middle
    if rendered.iter().any(|r| r.text.is_empty()) {
        return None;
    }

    let texts: Vec<String> = rendered.into_iter().map(|r| r.text).collect();
    Some(format!("/{}", texts.join("/")))
}

fn render_segment(entry: &RouteEntry, segment: &PathSegment, values: &RouteValues) -> Option<Rendered> {
    match segment {
        PathSegment::Literal(text) => Some(Rendered {
            text: text.clone(),
            trailing_omittable: false,
        }),
        PathSegment::Parameter(parameter) => {
            render_parameter(entry, parameter, values, |v| urlencoding::encode(v).into_owned())
        }
        PathSegment::CatchAll(parameter) => render_parameter(entry, parameter, values, |v| {
            v.split('/')
                .map(|piece| urlencoding::encode(piece).into_owned())
                .collect::<Vec<_>>()
                .join("/")
        }),
        PathSegment::Complex(parts) => render_complex(entry, parts, values).map(|text| Rendered {
            text,
            trailing_omittable: false,
        }),
    }
}

fn render_parameter(
    entry: &RouteEntry,
    parameter: &TemplateParameter,
    values: &RouteValues,
    encode: impl Fn(&str) -> String,
) -> Option<Rendered> {
    let supplied = lookup(values, &parameter.name).filter(|v| !v.is_empty());
    let default = entry.default_value(&parameter.name);

    match (supplied, default) {
        (Some(value), default) => Some(Rendered {
            text: encode(value),
            trailing_omittable: default == Some(value.as_str()),
        }),
        (None, Some(default)) => Some(Rendered {
            text: encode(default),
            trailing_omittable: true,
        }),
        (None, None) if parameter.is_omittable() => Some(Rendered {
            text: String::new(),
            trailing_omittable: true,
        }),
        (None, None) => None,
    }
}

fn render_complex(entry: &RouteEntry, parts: &[Subsegment], values: &RouteValues) -> Option<String> {
    let value_of = |parameter: &TemplateParameter| {
        lookup(values, &parameter.name)
            .map(String::as_str)
            .filter(|v| !v.is_empty())
            .or_else(|| entry.default_value(&parameter.name))
    };

    // A trailing optional parameter takes its separator with it
    let parts = match parts {
        [head @ .., Subsegment::Literal(_), Subsegment::Parameter(p)]
            if p.is_optional && value_of(p).is_none() =>
        {
            head
        }
        _ => parts,
    };

    parts.iter().try_fold(String::new(), |mut text, part| {
        match part {
            Subsegment::Literal(literal) => text.push_str(literal),
            Subsegment::Parameter(parameter) => {
                text.push_str(&urlencoding::encode(value_of(parameter)?));
            }
        }
        Some(text)
    })
}
