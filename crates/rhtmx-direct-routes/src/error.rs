//! Errors raised while configuring direct routes
//!
//! Every variant is a configuration-time failure: a route is either built
//! completely or not at all. Matching a request path never produces an error,
//! a path that fits no route is simply `None`.

use thiserror::Error;

/// Result alias used throughout the crate
pub type Result<T> = std::result::Result<T, RouteError>;

#[derive(Debug, Error)]
pub enum RouteError {
    /// Malformed template syntax (unbalanced braces/parens, misplaced catch-all, ...)
    #[error("the route template '{template}' is invalid: {reason}")]
    TemplateParse { template: String, reason: String },

    /// The template uses `controller`, or `action` while targeting a single action
    #[error(
        "the route template '{template}' cannot contain a parameter named '{parameter}': {reason}"
    )]
    ReservedParameterName {
        template: String,
        parameter: String,
        reason: &'static str,
    },

    /// Inline constraint key missing from the resolver registry
    #[error("the inline constraint resolver has no constraint registered under the key '{key}'")]
    UnknownConstraint { key: String },

    /// Inline constraint argument that does not convert to the factory's type
    #[error("argument '{argument}' of inline constraint '{key}' cannot be converted to {target}")]
    ArgumentConversion {
        key: String,
        argument: String,
        target: &'static str,
    },

    /// Inline constraint given a number of arguments no factory accepts
    #[error("the inline constraint '{key}' does not accept {count} argument(s)")]
    ConstraintArity { key: String, count: usize },

    /// A constraint supplied for the route is not usable
    #[error("the constraint for parameter '{key}' on route template '{template}' is invalid: {reason}")]
    InvalidConstraint {
        template: String,
        key: String,
        reason: String,
    },

    /// Inline default clashes with an explicitly supplied one
    #[error("the route template '{template}' has an inline default for '{key}' that conflicts with the supplied defaults")]
    InvalidDefault { template: String, key: String },

    /// A route needs at least one action to target
    #[error("a direct route must target at least one action")]
    MissingActions,

    #[error("a route that targets a single action cannot be built for {count} actions")]
    InvalidActions { count: usize },

    #[error("a route named '{name}' is already in the route table")]
    DuplicateRouteName { name: String },

    /// Route configuration document could not be read
    #[error("invalid route configuration: {0}")]
    Config(#[from] toml::de::Error),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl RouteError {
    pub(crate) fn template(template: &str, reason: impl Into<String>) -> Self {
        RouteError::TemplateParse {
            template: template.to_string(),
            reason: reason.into(),
        }
    }

    pub(crate) fn conversion(key: &str, argument: &str, target: &'static str) -> Self {
        RouteError::ArgumentConversion {
            key: key.to_string(),
            argument: argument.to_string(),
            target,
        }
    }
}
