//! Immutable route entries
//!
//! A [`RouteEntry`] is produced once by [`RouteBuilder::build`] at
//! configuration time and only read afterwards.

use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;

use serde::Deserialize;

pub mod builder;
pub mod precedence;

pub use builder::{ConstraintSource, RouteBuilder};
pub use precedence::{ParsePrecedenceError, Precedence};

use crate::constraint::RouteConstraint;
use crate::matcher::{self, MatchOptions, RouteValues};
use crate::template::RouteTemplate;
use crate::url;

/// Opaque reference to the action a route dispatches to
#[derive(Debug, Clone, PartialEq, Eq, Hash, Deserialize)]
pub struct ActionRef {
    pub controller: String,
    pub action: String,
}

impl ActionRef {
    pub fn new(controller: impl Into<String>, action: impl Into<String>) -> Self {
        Self {
            controller: controller.into(),
            action: action.into(),
        }
    }
}

/// Values attached to a route that never affect URL matching
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DataTokens {
    /// Actions the route dispatches to, shared with other routes
    pub actions: Vec<Arc<ActionRef>>,
    /// Set when every action belongs to the same controller
    pub controller: Option<String>,
    /// Only set when the order is non-zero
    pub order: Option<i32>,
    /// Only set when the precedence is non-zero
    pub precedence: Option<Precedence>,
    pub target_is_action: bool,
    pub area: Option<String>,
    pub namespaces: Vec<String>,
    /// Host-specific extras
    pub extra: BTreeMap<String, String>,
}

/// A built route: template plus everything needed to match and dispatch
#[derive(Debug, Clone)]
pub struct RouteEntry {
    name: Option<String>,
    template: Arc<RouteTemplate>,
    defaults: HashMap<String, String>,
    constraints: HashMap<String, RouteConstraint>,
    data_tokens: DataTokens,
    order: i32,
    precedence: Precedence,
}

impl RouteEntry {
    pub(crate) fn new(
        name: Option<String>,
        template: Arc<RouteTemplate>,
        defaults: HashMap<String, String>,
        constraints: HashMap<String, RouteConstraint>,
        data_tokens: DataTokens,
        order: i32,
        precedence: Precedence,
    ) -> Self {
        Self {
            name,
            template,
            defaults,
            constraints,
            data_tokens,
            order,
            precedence,
        }
    }

    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    pub fn template(&self) -> &RouteTemplate {
        &self.template
    }

    pub fn defaults(&self) -> &HashMap<String, String> {
        &self.defaults
    }

    pub fn constraints(&self) -> &HashMap<String, RouteConstraint> {
        &self.constraints
    }

    pub fn data_tokens(&self) -> &DataTokens {
        &self.data_tokens
    }

    pub fn order(&self) -> i32 {
        self.order
    }

    pub fn precedence(&self) -> Precedence {
        self.precedence
    }

    /// Key routes are tried by: order, then precedence, both ascending
    pub fn sort_key(&self) -> (i32, Precedence) {
        (self.order, self.precedence)
    }

    /// Default value for a parameter (case-insensitive)
    pub fn default_value(&self, name: &str) -> Option<&str> {
        lookup(&self.defaults, name).map(String::as_str)
    }

    /// Constraint for a parameter (case-insensitive)
    pub fn constraint(&self, name: &str) -> Option<&RouteConstraint> {
        lookup(&self.constraints, name)
    }

    /// Matches a request path against this route alone
    ///
    /// # Examples
    ///
    /// ```
    /// use rhtmx_direct_routes::{ActionRef, MatchOptions, RouteBuilder};
    ///
    /// let entry = RouteBuilder::new(vec![ActionRef::new("Orders", "Get")], true)
    ///     .unwrap()
    ///     .with_template("orders/{id:int}")
    ///     .build()
    ///     .unwrap();
    ///
    /// let values = entry.match_path("/orders/42", &MatchOptions::default()).unwrap();
    /// assert_eq!(values["id"], "42");
    /// assert_eq!(values["action"], "Get");
    ///
    /// assert!(entry.match_path("/orders/abc", &MatchOptions::default()).is_none());
    /// ```
    pub fn match_path(&self, path: &str, options: &MatchOptions) -> Option<RouteValues> {
        matcher::match_entry(self, path, options)
    }

    /// Builds a path from route values, filling gaps with defaults
    ///
    /// Returns `None` when a required value is missing or fails its
    /// constraint.
    pub fn generate_url(&self, values: &RouteValues) -> Option<String> {
        url::generate(self, values)
    }
}

/// Exact key first, then an ASCII case-insensitive scan
pub(crate) fn lookup<'m, V>(map: &'m HashMap<String, V>, key: &str) -> Option<&'m V> {
    map.get(key).or_else(|| {
        map.iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(key))
            .map(|(_, v)| v)
    })
}
