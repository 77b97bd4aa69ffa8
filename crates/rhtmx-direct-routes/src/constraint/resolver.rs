//! Inline constraint resolver
//!
//! Maps inline text such as `int`, `range(1,10)` or `regex(^\d+$)` to a
//! [`RouteConstraint`]. Every key is registered ahead of time with the
//! argument counts it accepts and a typed factory; the registry is immutable
//! once built.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use once_cell::sync::Lazy;

use super::{ConstraintRegex, RouteConstraint};
use crate::error::{Result, RouteError};

/// Factory turning converted arguments into a constraint
pub type ConstraintFactory = Arc<dyn Fn(&ConstraintArgs<'_>) -> Result<RouteConstraint> + Send + Sync>;

static DEFAULT_RESOLVER: Lazy<Arc<ConstraintResolver>> =
    Lazy::new(|| Arc::new(ConstraintResolver::default()));

/// Resolves inline constraint text with the default registry
///
/// # Examples
///
/// ```
/// use rhtmx_direct_routes::{resolve_constraint, RouteConstraint};
///
/// let range = resolve_constraint("range(1,10)").unwrap();
/// assert_eq!(range, RouteConstraint::Range { min: 1, max: 10 });
///
/// assert!(resolve_constraint("unknown").is_err());
/// ```
pub fn resolve_constraint(text: &str) -> Result<RouteConstraint> {
    DEFAULT_RESOLVER.resolve(text)
}

/// Raw arguments of one inline constraint, with typed accessors
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConstraintArgs<'a> {
    pub key: &'a str,
    pub args: Vec<&'a str>,
}

impl<'a> ConstraintArgs<'a> {
    pub fn len(&self) -> usize {
        self.args.len()
    }

    pub fn is_empty(&self) -> bool {
        self.args.is_empty()
    }

    pub fn str(&self, index: usize) -> &'a str {
        self.args.get(index).copied().unwrap_or_default()
    }

    pub fn i64(&self, index: usize) -> Result<i64> {
        let argument = self.str(index);
        argument
            .parse()
            .map_err(|_| RouteError::conversion(self.key, argument, "a 64-bit integer"))
    }

    pub fn usize(&self, index: usize) -> Result<usize> {
        let argument = self.str(index);
        argument
            .parse()
            .map_err(|_| RouteError::conversion(self.key, argument, "a non-negative integer"))
    }

    pub fn regex(&self, index: usize) -> Result<ConstraintRegex> {
        let argument = self.str(index);
        ConstraintRegex::new(argument)
            .map_err(|_| RouteError::conversion(self.key, argument, "a regular expression"))
    }
}

#[derive(Clone)]
struct Registration {
    arities: Vec<usize>,
    factory: ConstraintFactory,
}

/// Immutable registry of inline constraint kinds
///
/// # Examples
///
/// ```
/// use rhtmx_direct_routes::{ConstraintResolver, RouteConstraint};
///
/// let resolver = ConstraintResolver::builder()
///     .with_defaults()
///     .register("slug", &[0], |_| {
///         Ok(RouteConstraint::Regex(
///             rhtmx_direct_routes::ConstraintRegex::anchored("[a-z0-9-]+").unwrap(),
///         ))
///     })
///     .build();
///
/// assert!(resolver.resolve("SLUG").unwrap().matches("hello-world"));
/// assert!(resolver.resolve("int").is_ok());
/// ```
#[derive(Clone)]
pub struct ConstraintResolver {
    registry: HashMap<String, Registration>,
}

impl ConstraintResolver {
    /// The process-wide resolver holding the built-in constraint kinds
    pub fn shared() -> Arc<ConstraintResolver> {
        Arc::clone(&DEFAULT_RESOLVER)
    }

    /// Starts an empty registry; call `with_defaults` for the built-in kinds
    pub fn builder() -> ConstraintResolverBuilder {
        ConstraintResolverBuilder {
            registry: HashMap::new(),
        }
    }

    /// Resolves `key` or `key(arg, ...)` into a constraint
    pub fn resolve(&self, text: &str) -> Result<RouteConstraint> {
        let args = split_constraint(text)?;
        let registration = self
            .registry
            .get(&args.key.to_ascii_lowercase())
            .ok_or_else(|| RouteError::UnknownConstraint {
                key: args.key.to_string(),
            })?;

        if !registration.arities.contains(&args.len()) {
            return Err(RouteError::ConstraintArity {
                key: args.key.to_string(),
                count: args.len(),
            });
        }
        (registration.factory)(&args)
    }

    pub fn contains(&self, key: &str) -> bool {
        self.registry.contains_key(&key.to_ascii_lowercase())
    }

    /// Registered keys, sorted
    pub fn keys(&self) -> Vec<&str> {
        let mut keys: Vec<&str> = self.registry.keys().map(String::as_str).collect();
        keys.sort_unstable();
        keys
    }
}

impl Default for ConstraintResolver {
    fn default() -> Self {
        Self::builder().with_defaults().build()
    }
}

impl fmt::Debug for ConstraintResolver {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConstraintResolver")
            .field("keys", &self.keys())
            .finish()
    }
}

/// Assembles a [`ConstraintResolver`]
pub struct ConstraintResolverBuilder {
    registry: HashMap<String, Registration>,
}

impl ConstraintResolverBuilder {
    /// Registers a constraint kind; a later registration replaces an earlier one
    pub fn register<F>(mut self, key: &str, arities: &[usize], factory: F) -> Self
    where
        F: Fn(&ConstraintArgs<'_>) -> Result<RouteConstraint> + Send + Sync + 'static,
    {
        self.registry.insert(
            key.to_ascii_lowercase(),
            Registration {
                arities: arities.to_vec(),
                factory: Arc::new(factory),
            },
        );
        self
    }

    /// Adds the built-in constraint kinds
    pub fn with_defaults(self) -> Self {
        self.register("alpha", &[0], |_| Ok(RouteConstraint::Alpha))
            .register("bool", &[0], |_| Ok(RouteConstraint::Bool))
            .register("datetime", &[0], |_| Ok(RouteConstraint::DateTime))
            .register("decimal", &[0], |_| Ok(RouteConstraint::Decimal))
            .register("double", &[0], |_| Ok(RouteConstraint::Double))
            .register("float", &[0], |_| Ok(RouteConstraint::Float))
            .register("guid", &[0], |_| Ok(RouteConstraint::Guid))
            .register("int", &[0], |_| Ok(RouteConstraint::Int))
            .register("long", &[0], |_| Ok(RouteConstraint::Long))
            .register("length", &[1, 2], |a| {
                let min = a.usize(0)?;
                let max = if a.len() == 2 { a.usize(1)? } else { min };
                Ok(RouteConstraint::Length { min, max })
            })
            .register("range", &[2], |a| {
                Ok(RouteConstraint::Range {
                    min: a.i64(0)?,
                    max: a.i64(1)?,
                })
            })
            .register("min", &[1], |a| Ok(RouteConstraint::Min(a.i64(0)?)))
            .register("max", &[1], |a| Ok(RouteConstraint::Max(a.i64(0)?)))
            .register("minlength", &[1], |a| Ok(RouteConstraint::MinLength(a.usize(0)?)))
            .register("maxlength", &[1], |a| Ok(RouteConstraint::MaxLength(a.usize(0)?)))
            .register("regex", &[1], |a| Ok(RouteConstraint::Regex(a.regex(0)?)))
    }

    pub fn build(self) -> ConstraintResolver {
        ConstraintResolver {
            registry: self.registry,
        }
    }
}

/// Splits `key(a, b)` into key and trimmed arguments
///
/// `regex` keeps its whole argument text, commas included.
fn split_constraint(text: &str) -> Result<ConstraintArgs<'_>> {
    let Some(open) = text.find('(') else {
        return Ok(ConstraintArgs {
            key: text.trim(),
            args: Vec::new(),
        });
    };

    let inner = text[open + 1..].strip_suffix(')').ok_or_else(|| {
        RouteError::template(
            text,
            "an inline constraint with arguments must end with ')'",
        )
    })?;
    let key = text[..open].trim();

    let args = if key.eq_ignore_ascii_case("regex") {
        vec![inner]
    } else if inner.trim().is_empty() {
        Vec::new()
    } else {
        inner.split(',').map(str::trim).collect()
    };
    Ok(ConstraintArgs { key, args })
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use rstest::rstest;

    #[rstest]
    #[case("alpha", RouteConstraint::Alpha)]
    #[case("BOOL", RouteConstraint::Bool)]
    #[case("datetime", RouteConstraint::DateTime)]
    #[case("decimal", RouteConstraint::Decimal)]
    #[case("double", RouteConstraint::Double)]
    #[case("float", RouteConstraint::Float)]
    #[case("Guid", RouteConstraint::Guid)]
    #[case("int", RouteConstraint::Int)]
    #[case("long", RouteConstraint::Long)]
    #[case("length(5)", RouteConstraint::Length { min: 5, max: 5 })]
    #[case("length( 2 , 8 )", RouteConstraint::Length { min: 2, max: 8 })]
    #[case("range(1,10)", RouteConstraint::Range { min: 1, max: 10 })]
    #[case("min(-3)", RouteConstraint::Min(-3))]
    #[case("max(99)", RouteConstraint::Max(99))]
    #[case("minlength(2)", RouteConstraint::MinLength(2))]
    #[case("MaxLength(20)", RouteConstraint::MaxLength(20))]
    fn test_resolve_builtin(#[case] text: &str, #[case] expected: RouteConstraint) {
        assert_eq!(resolve_constraint(text).unwrap(), expected);
    }

    #[test]
    fn test_regex_argument_is_not_split() {
        let constraint = resolve_constraint(r"regex(^\d{1,3}$)").unwrap();
        assert_eq!(constraint.to_string(), r"regex(^\d{1,3}$)");
        assert!(constraint.matches("123"));
        assert!(!constraint.matches("1234"));
    }

    #[test]
    fn test_unknown_key() {
        let err = resolve_constraint("slug").unwrap_err();
        assert!(matches!(err, RouteError::UnknownConstraint { ref key } if key == "slug"));
    }

    #[rstest]
    #[case("int(5)", 1)]
    #[case("range(1)", 1)]
    #[case("length(1,2,3)", 3)]
    #[case("min()", 0)]
    fn test_arity_mismatch(#[case] text: &str, #[case] expected: usize) {
        let err = resolve_constraint(text).unwrap_err();
        assert!(
            matches!(err, RouteError::ConstraintArity { count, .. } if count == expected),
            "{text}: {err}"
        );
    }

    #[rstest]
    #[case("range(a,10)", "a")]
    #[case("minlength(-1)", "-1")]
    #[case("regex([)", "[")]
    fn test_argument_conversion_failure(#[case] text: &str, #[case] bad: &str) {
        let err = resolve_constraint(text).unwrap_err();
        assert!(
            matches!(err, RouteError::ArgumentConversion { ref argument, .. } if argument == bad),
            "{text}: {err}"
        );
    }

    #[test]
    fn test_missing_closing_paren() {
        assert!(matches!(
            resolve_constraint("range(1,10"),
            Err(RouteError::TemplateParse { .. })
        ));
    }

    #[test]
    fn test_every_builtin_key_is_registered() {
        let resolver = ConstraintResolver::default();
        assert_eq!(
            resolver.keys(),
            vec![
                "alpha", "bool", "datetime", "decimal", "double", "float", "guid", "int",
                "length", "long", "max", "maxlength", "min", "minlength", "range", "regex"
            ]
        );
    }

    #[test]
    fn test_custom_registry_is_isolated() {
        let resolver = ConstraintResolver::builder()
            .register("even", &[0], |_| {
                Ok(RouteConstraint::Regex(ConstraintRegex::anchored(r"\d*[02468]").unwrap()))
            })
            .build();

        assert!(resolver.resolve("even").unwrap().matches("14"));
        assert!(!resolver.contains("int"));
        assert!(!ConstraintResolver::shared().contains("even"));
    }
}
