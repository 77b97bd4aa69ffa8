//! Route configuration loaded from TOML
//!
//! ```toml
//! [matching]
//! case_sensitive = false
//! empty_catch_all = true
//!
//! [[routes]]
//! template = "orders/{id:int}"
//! name = "orders.get"
//! prefix = "api"
//! actions = [{ controller = "Orders", action = "Get" }]
//! defaults = { format = "json" }
//! constraints = { format = "json|xml" }
//! ```

use std::collections::{BTreeMap, HashMap};
use std::path::Path;
use std::sync::Arc;

use serde::Deserialize;
use tracing::debug;

use crate::constraint::ConstraintResolver;
use crate::entry::{ActionRef, Precedence, RouteBuilder};
use crate::error::Result;
use crate::matcher::MatchOptions;
use crate::table::RouteTable;

/// A routes file: matching options plus route declarations
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RoutesConfig {
    #[serde(default)]
    pub matching: MatchOptions,
    #[serde(default)]
    pub routes: Vec<RouteConfig>,
}

/// One `[[routes]]` declaration
#[derive(Debug, Clone, Deserialize)]
pub struct RouteConfig {
    pub template: String,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub prefix: Option<String>,
    #[serde(default)]
    pub order: i32,
    /// Overrides the computed precedence
    #[serde(default)]
    pub precedence: Option<Precedence>,
    #[serde(default = "default_target_is_action")]
    pub target_is_action: bool,
    #[serde(default)]
    pub area: Option<String>,
    #[serde(default)]
    pub namespaces: Vec<String>,
    pub actions: Vec<ActionRef>,
    #[serde(default)]
    pub defaults: HashMap<String, String>,
    /// Regex patterns, matched against the whole value
    #[serde(default)]
    pub constraints: HashMap<String, String>,
    #[serde(default)]
    pub data_tokens: BTreeMap<String, String>,
}

fn default_target_is_action() -> bool {
    true
}

impl RoutesConfig {
    /// Parses a TOML document
    ///
    /// # Examples
    ///
    /// ```
    /// use rhtmx_direct_routes::RoutesConfig;
    ///
    /// let config = RoutesConfig::from_toml_str(r#"
    ///     [[routes]]
    ///     template = "orders/{id:int}"
    ///     name = "orders.get"
    ///     actions = [{ controller = "Orders", action = "Get" }]
    /// "#).unwrap();
    ///
    /// let table = config.build_table().unwrap();
    /// let found = table.match_path("/orders/7").unwrap();
    /// assert_eq!(found.values["id"], "7");
    /// assert_eq!(found.values["controller"], "Orders");
    /// ```
    pub fn from_toml_str(contents: &str) -> Result<Self> {
        Ok(toml::from_str(contents)?)
    }

    /// Reads and parses a TOML file
    ///
    /// Unlike project settings, a missing or malformed routes file is an
    /// error: there is no sensible default route set.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let contents = std::fs::read_to_string(path)?;
        Self::from_toml_str(&contents)
    }

    pub fn match_options(&self) -> MatchOptions {
        self.matching
    }

    /// Builds every route with the shared resolver
    pub fn build_table(&self) -> Result<RouteTable> {
        self.build_table_with(ConstraintResolver::shared())
    }

    /// Builds every route with a custom resolver
    pub fn build_table_with(&self, resolver: Arc<ConstraintResolver>) -> Result<RouteTable> {
        let entries = self
            .routes
            .iter()
            .map(|route| route.builder(Arc::clone(&resolver))?.build())
            .collect::<Result<Vec<_>>>()?;

        let table = RouteTable::from_entries(entries)?.with_options(self.matching);
        debug!(
            routes = table.len(),
            case_sensitive = self.matching.case_sensitive,
            "route table built from configuration"
        );
        Ok(table)
    }
}

impl RouteConfig {
    /// A builder carrying everything this declaration specifies
    pub fn builder(&self, resolver: Arc<ConstraintResolver>) -> Result<RouteBuilder> {
        let mut builder = RouteBuilder::new(self.actions.iter().cloned(), self.target_is_action)?
            .with_resolver(resolver)
            .with_template(self.template.as_str())
            .with_order(self.order);

        if let Some(prefix) = &self.prefix {
            builder = builder.with_prefix(prefix.as_str());
        }
        if let Some(name) = &self.name {
            builder = builder.with_name(name.as_str());
        }
        if let Some(precedence) = self.precedence {
            builder = builder.with_precedence(precedence);
        }
        if let Some(area) = &self.area {
            builder = builder.with_area(area.as_str());
        }
        for namespace in &self.namespaces {
            builder = builder.with_namespace(namespace.as_str());
        }

        builder.defaults_mut().extend(self.defaults.clone());
        builder.constraints_mut().extend(
            self.constraints
                .iter()
                .map(|(key, pattern)| (key.clone(), pattern.clone().into())),
        );
        builder.data_tokens_mut().extend(self.data_tokens.clone());
        Ok(builder)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::RouteError;
    use pretty_assertions::assert_eq;

    const ROUTES: &str = r#"
        [matching]
        case_sensitive = true

        [[routes]]
        template = "orders/{id:int}.{format?}"
        name = "orders.get"
        prefix = "api"
        order = 1
        area = "sales"
        namespaces = ["Shop.Controllers"]
        actions = [{ controller = "Orders", action = "Get" }]
        defaults = { format = "json" }
        constraints = { format = "json|xml" }
        data_tokens = { owner = "team-a" }

        [[routes]]
        template = "orders/{*rest}"
        target_is_action = false
        precedence = "9.5"
        actions = [
            { controller = "Orders", action = "List" },
            { controller = "Orders", action = "Search" },
        ]
    "#;

    #[test]
    fn test_parse_config() {
        let config = RoutesConfig::from_toml_str(ROUTES).unwrap();
        assert!(config.matching.case_sensitive);
        assert!(config.matching.empty_catch_all);
        assert_eq!(config.routes.len(), 2);

        let first = &config.routes[0];
        assert_eq!(first.name.as_deref(), Some("orders.get"));
        assert!(first.target_is_action);
        assert_eq!(first.actions, vec![ActionRef::new("Orders", "Get")]);

        let second = &config.routes[1];
        assert_eq!(second.precedence, Some("9.5".parse().unwrap()));
        assert!(!second.target_is_action);
    }

    #[test]
    fn test_build_table_from_config() {
        let table = RoutesConfig::from_toml_str(ROUTES)
            .unwrap()
            .build_table()
            .unwrap();

        assert!(table.options().case_sensitive);
        let entry = table.get("orders.get").unwrap();
        assert_eq!(entry.template().text(), "api/orders/{id:int}.{format?}");
        assert_eq!(entry.data_tokens().area.as_deref(), Some("sales"));
        assert_eq!(
            entry.data_tokens().extra.get("owner").map(String::as_str),
            Some("team-a")
        );

        let found = table.match_path("/api/orders/5.xml").unwrap();
        assert_eq!(found.entry.name(), Some("orders.get"));
        assert_eq!(found.values["format"], "xml");

        assert!(table.match_path("/api/orders/5.csv").is_none());
        let found = table.match_path("/orders/a/b").unwrap();
        assert_eq!(found.values["rest"], "a/b");
    }

    #[test]
    fn test_empty_document() {
        let config = RoutesConfig::from_toml_str("").unwrap();
        assert!(config.routes.is_empty());
        assert_eq!(config.match_options(), MatchOptions::default());
    }

    #[test]
    fn test_invalid_documents() {
        assert!(matches!(
            RoutesConfig::from_toml_str("[[routes]]\nname = 'x'"),
            Err(RouteError::Config(_))
        ));
        assert!(matches!(
            RoutesConfig::from_file("/nonexistent/routes.toml"),
            Err(RouteError::Io(_))
        ));
    }

    #[test]
    fn test_build_errors_surface() {
        let config = RoutesConfig::from_toml_str(
            r#"
            [[routes]]
            template = "{controller}/x"
            actions = [{ controller = "A", action = "B" }]
            "#,
        )
        .unwrap();
        assert!(matches!(
            config.build_table(),
            Err(RouteError::ReservedParameterName { .. })
        ));
    }
}
