//! Route entry builder
//!
//! [`RouteBuilder`] is the mutable side of route configuration: it collects
//! the template, defaults, constraints and data tokens for a set of actions
//! and turns them into an immutable [`RouteEntry`]. The builder can be
//! changed and built again; entries already built are unaffected.

use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;

use tracing::{debug, warn};

use super::{lookup, ActionRef, DataTokens, Precedence, RouteEntry};
use crate::constraint::{ConstraintRegex, ConstraintResolver, RouteConstraint};
use crate::error::{Result, RouteError};
use crate::template::{RouteTemplate, TemplateCache};

/// Parameter names supplied by the dispatch target, never by the path
const CONTROLLER_KEY: &str = "controller";
const ACTION_KEY: &str = "action";

/// A constraint supplied alongside the template
#[derive(Debug, Clone, PartialEq)]
pub enum ConstraintSource {
    /// An already built constraint
    Constraint(RouteConstraint),
    /// A regex pattern that must match the whole value, case-insensitively
    Pattern(String),
}

impl From<RouteConstraint> for ConstraintSource {
    fn from(constraint: RouteConstraint) -> Self {
        ConstraintSource::Constraint(constraint)
    }
}

impl From<&str> for ConstraintSource {
    fn from(pattern: &str) -> Self {
        ConstraintSource::Pattern(pattern.to_string())
    }
}

impl From<String> for ConstraintSource {
    fn from(pattern: String) -> Self {
        ConstraintSource::Pattern(pattern)
    }
}

/// Parse state of the builder's template
#[derive(Debug, Clone)]
enum TemplateState {
    Unparsed,
    Parsed(Arc<RouteTemplate>),
}

/// Collects route configuration and builds [`RouteEntry`]s
///
/// # Examples
///
/// ```
/// use rhtmx_direct_routes::{ActionRef, RouteBuilder};
///
/// let mut builder = RouteBuilder::new(
///     vec![ActionRef::new("Orders", "List"), ActionRef::new("Orders", "Search")],
///     false,
/// )
/// .unwrap()
/// .with_prefix("api")
/// .with_template("orders/{page:int=1}")
/// .with_name("orders.list")
/// .with_order(1);
///
/// let entry = builder.build().unwrap();
/// assert_eq!(entry.template().text(), "api/orders/{page:int=1}");
/// assert_eq!(entry.default_value("controller"), Some("Orders"));
/// assert_eq!(entry.default_value("page"), Some("1"));
/// assert_eq!(entry.data_tokens().order, Some(1));
/// ```
#[derive(Debug, Clone)]
pub struct RouteBuilder {
    actions: Vec<Arc<ActionRef>>,
    target_is_action: bool,
    template: String,
    prefix: Option<String>,
    state: TemplateState,
    name: Option<String>,
    defaults: HashMap<String, String>,
    constraints: HashMap<String, ConstraintSource>,
    data_tokens: BTreeMap<String, String>,
    area: Option<String>,
    namespaces: Vec<String>,
    order: i32,
    precedence: Option<Precedence>,
    resolver: Arc<ConstraintResolver>,
}

impl RouteBuilder {
    /// Creates a builder for the given actions
    ///
    /// With `target_is_action` the route dispatches straight to its single
    /// action, so exactly one action is required.
    pub fn new<I, A>(actions: I, target_is_action: bool) -> Result<Self>
    where
        I: IntoIterator<Item = A>,
        A: Into<Arc<ActionRef>>,
    {
        let actions: Vec<Arc<ActionRef>> = actions.into_iter().map(Into::into).collect();
        if actions.is_empty() {
            return Err(RouteError::MissingActions);
        }
        if target_is_action && actions.len() > 1 {
            return Err(RouteError::InvalidActions {
                count: actions.len(),
            });
        }

        Ok(Self {
            actions,
            target_is_action,
            template: String::new(),
            prefix: None,
            state: TemplateState::Unparsed,
            name: None,
            defaults: HashMap::new(),
            constraints: HashMap::new(),
            data_tokens: BTreeMap::new(),
            area: None,
            namespaces: Vec::new(),
            order: 0,
            precedence: None,
            resolver: ConstraintResolver::shared(),
        })
    }

    // ========================================================================
    // Builder methods
    // ========================================================================

    pub fn with_template(mut self, template: impl Into<String>) -> Self {
        self.set_template(template);
        self
    }

    /// Replaces the template; it is parsed again on the next build
    pub fn set_template(&mut self, template: impl Into<String>) {
        self.template = template.into();
        self.state = TemplateState::Unparsed;
    }

    /// Prepends `prefix/` to the template, unless the template starts with `~/`
    pub fn with_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.prefix = Some(prefix.into());
        self.state = TemplateState::Unparsed;
        self
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn with_default(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.defaults.insert(key.into(), value.into());
        self
    }

    pub fn with_constraint(
        mut self,
        key: impl Into<String>,
        constraint: impl Into<ConstraintSource>,
    ) -> Self {
        self.constraints.insert(key.into(), constraint.into());
        self
    }

    pub fn with_data_token(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.data_tokens.insert(key.into(), value.into());
        self
    }

    pub fn with_area(mut self, area: impl Into<String>) -> Self {
        self.area = Some(area.into());
        self
    }

    pub fn with_namespace(mut self, namespace: impl Into<String>) -> Self {
        self.namespaces.push(namespace.into());
        self
    }

    pub fn with_order(mut self, order: i32) -> Self {
        self.order = order;
        self
    }

    /// Overrides the computed precedence
    pub fn with_precedence(mut self, precedence: Precedence) -> Self {
        self.precedence = Some(precedence);
        self
    }

    /// Resolver used for inline constraints (default: the shared built-in one)
    pub fn with_resolver(mut self, resolver: Arc<ConstraintResolver>) -> Self {
        self.resolver = resolver;
        self
    }

    pub fn defaults_mut(&mut self) -> &mut HashMap<String, String> {
        &mut self.defaults
    }

    pub fn constraints_mut(&mut self) -> &mut HashMap<String, ConstraintSource> {
        &mut self.constraints
    }

    pub fn data_tokens_mut(&mut self) -> &mut BTreeMap<String, String> {
        &mut self.data_tokens
    }

    // ========================================================================
    // Template state
    // ========================================================================

    /// Template text after the prefix is applied
    pub fn full_template(&self) -> String {
        if let Some(rooted) = self.template.strip_prefix("~/") {
            return rooted.to_string();
        }
        match self.prefix.as_deref().map(|p| p.trim_end_matches('/')) {
            Some(prefix) if !prefix.is_empty() && self.template.is_empty() => prefix.to_string(),
            Some(prefix) if !prefix.is_empty() => format!("{prefix}/{}", self.template),
            _ => self.template.clone(),
        }
    }

    pub fn is_parsed(&self) -> bool {
        matches!(self.state, TemplateState::Parsed(_))
    }

    /// Parses the template if needed and returns it
    pub fn parsed_template(&mut self) -> Result<Arc<RouteTemplate>> {
        if let TemplateState::Parsed(template) = &self.state {
            return Ok(Arc::clone(template));
        }
        let template = TemplateCache::global().get_or_parse(&self.full_template())?;
        self.state = TemplateState::Parsed(Arc::clone(&template));
        Ok(template)
    }

    // ========================================================================
    // Build
    // ========================================================================

    /// Builds an immutable route entry
    ///
    /// Fails without producing anything when the template is malformed,
    /// uses a reserved parameter name, or carries an unusable default or
    /// constraint.
    pub fn build(&mut self) -> Result<RouteEntry> {
        let template = self.parsed_template()?;
        self.check_reserved_names(&template)?;

        let mut defaults = self.defaults.clone();
        let mut constraints = self.supplied_constraints(&template)?;
        self.merge_inline(&template, &mut defaults, &mut constraints)?;

        let mut tokens = DataTokens {
            actions: self.actions.clone(),
            target_is_action: self.target_is_action,
            area: self.area.clone(),
            namespaces: self.namespaces.clone(),
            extra: self.data_tokens.clone(),
            ..DataTokens::default()
        };

        if let Some(controller) = self.shared_controller() {
            defaults.insert(CONTROLLER_KEY.to_string(), controller.to_string());
            tokens.controller = Some(controller.to_string());
        }
        if self.target_is_action {
            if let [action] = self.actions.as_slice() {
                defaults.insert(ACTION_KEY.to_string(), action.action.clone());
            }
        }

        for key in constraints.keys() {
            if template.parameter(key).is_none() {
                warn!(
                    template = template.text(),
                    key = key.as_str(),
                    "constraint does not name a parameter of the route template"
                );
            }
        }

        let precedence = self
            .precedence
            .unwrap_or_else(|| Precedence::compute(&template, &constraints));
        tokens.order = (self.order != 0).then_some(self.order);
        tokens.precedence = (!precedence.is_zero()).then_some(precedence);

        debug!(
            template = template.text(),
            name = ?self.name,
            order = self.order,
            precedence = %precedence,
            actions = self.actions.len(),
            "built direct route"
        );

        Ok(RouteEntry::new(
            self.name.clone(),
            template,
            defaults,
            constraints,
            tokens,
            self.order,
            precedence,
        ))
    }

    fn check_reserved_names(&self, template: &RouteTemplate) -> Result<()> {
        for parameter in template.parameters() {
            let reason = if parameter.name.eq_ignore_ascii_case(CONTROLLER_KEY) {
                "the controller is set by the actions the route targets"
            } else if self.target_is_action && parameter.name.eq_ignore_ascii_case(ACTION_KEY) {
                "the route targets a single action, which sets the action value"
            } else {
                continue;
            };
            return Err(RouteError::ReservedParameterName {
                template: template.text().to_string(),
                parameter: parameter.name.clone(),
                reason,
            });
        }
        Ok(())
    }

    /// Converts and validates the constraints supplied to the builder
    fn supplied_constraints(
        &self,
        template: &RouteTemplate,
    ) -> Result<HashMap<String, RouteConstraint>> {
        let invalid = |key: &str, reason: String| RouteError::InvalidConstraint {
            template: template.text().to_string(),
            key: key.to_string(),
            reason,
        };

        self.constraints
            .iter()
            .map(|(key, source)| {
                let constraint = match source {
                    ConstraintSource::Constraint(constraint) => constraint.clone(),
                    ConstraintSource::Pattern(pattern) if pattern.is_empty() => {
                        return Err(invalid(key, "the pattern is empty".to_string()))
                    }
                    ConstraintSource::Pattern(pattern) => RouteConstraint::Regex(
                        ConstraintRegex::anchored(pattern).map_err(|e| invalid(key, e.to_string()))?,
                    ),
                };
                constraint.validate().map_err(|reason| invalid(key, reason))?;
                Ok((key.clone(), constraint))
            })
            .collect()
    }

    /// Adds defaults and constraints written inline in the template
    fn merge_inline(
        &self,
        template: &RouteTemplate,
        defaults: &mut HashMap<String, String>,
        constraints: &mut HashMap<String, RouteConstraint>,
    ) -> Result<()> {
        for parameter in template.parameters() {
            if let Some(value) = &parameter.default_value {
                match lookup(defaults, &parameter.name) {
                    Some(existing) if existing != value => {
                        return Err(RouteError::InvalidDefault {
                            template: template.text().to_string(),
                            key: parameter.name.clone(),
                        })
                    }
                    Some(_) => {}
                    None => {
                        defaults.insert(parameter.name.clone(), value.clone());
                    }
                }
            }

            if parameter.inline_constraints.is_empty() {
                continue;
            }
            let inline = parameter
                .inline_constraints
                .iter()
                .map(|text| self.resolver.resolve(text))
                .collect::<Result<Vec<_>>>()?;
            let inline = RouteConstraint::compound(inline);
            inline
                .validate()
                .map_err(|reason| RouteError::InvalidConstraint {
                    template: template.text().to_string(),
                    key: parameter.name.clone(),
                    reason,
                })?;

            match lookup(constraints, &parameter.name) {
                Some(existing) if *existing != inline => {
                    return Err(RouteError::InvalidConstraint {
                        template: template.text().to_string(),
                        key: parameter.name.clone(),
                        reason: format!(
                            "the inline constraint '{inline}' conflicts with the supplied constraint '{existing}'"
                        ),
                    })
                }
                Some(_) => {}
                None => {
                    constraints.insert(parameter.name.clone(), inline);
                }
            }
        }
        Ok(())
    }

    /// The controller every action belongs to, if there is exactly one
    fn shared_controller(&self) -> Option<&str> {
        let (first, rest) = self.actions.split_first()?;
        rest.iter()
            .all(|a| a.controller == first.controller)
            .then_some(first.controller.as_str())
    }
}
