//! Route table
//!
//! An ordered, name-indexed collection of built routes. Entries are kept
//! sorted by `(order, precedence)`; entries with equal keys stay in the
//! order they were inserted.

use std::collections::HashMap;
use std::sync::Arc;

use tracing::debug;

use crate::entry::RouteEntry;
use crate::error::{Result, RouteError};
use crate::matcher::{self, MatchOptions, RouteMatch, RouteValues};

/// Sorted set of routes used for request-time lookup
///
/// # Examples
///
/// ```
/// use rhtmx_direct_routes::{ActionRef, RouteBuilder, RouteTable};
///
/// let build = |template: &str, name: &str| {
///     RouteBuilder::new(vec![ActionRef::new("Orders", name)], true)
///         .unwrap()
///         .with_template(template)
///         .with_name(name)
///         .build()
///         .unwrap()
/// };
///
/// let table = RouteTable::new()
///     .with_entry(build("orders/{id}", "by-key")).unwrap()
///     .with_entry(build("orders/{id:int}", "by-id")).unwrap();
///
/// // The int-constrained route is tried first
/// let found = table.match_path("/orders/42").unwrap();
/// assert_eq!(found.entry.name(), Some("by-id"));
///
/// let found = table.match_path("/orders/latest").unwrap();
/// assert_eq!(found.entry.name(), Some("by-key"));
/// ```
#[derive(Debug, Clone, Default)]
pub struct RouteTable {
    entries: Vec<Arc<RouteEntry>>,
    /// Lowercased route name → entry
    names: HashMap<String, Arc<RouteEntry>>,
    options: MatchOptions,
}

impl RouteTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a table from entries, keeping their relative order on ties
    pub fn from_entries<I>(entries: I) -> Result<Self>
    where
        I: IntoIterator<Item = RouteEntry>,
    {
        let table = entries
            .into_iter()
            .try_fold(Self::new(), |table, entry| table.with_entry(entry))?;
        debug!(routes = table.len(), "route table assembled");
        Ok(table)
    }

    // ========================================================================
    // Builder methods
    // ========================================================================

    pub fn with_options(mut self, options: MatchOptions) -> Self {
        self.options = options;
        self
    }

    pub fn with_entry(mut self, entry: RouteEntry) -> Result<Self> {
        self.insert(entry)?;
        Ok(self)
    }

    // ========================================================================
    // Mutation
    // ========================================================================

    /// Inserts an entry after every entry with an equal or lower sort key
    ///
    /// Fails when another entry already uses the same name (case-insensitive).
    pub fn insert(&mut self, entry: RouteEntry) -> Result<()> {
        let key = entry.name().map(str::to_ascii_lowercase);
        if let Some(name) = &key {
            if self.names.contains_key(name) {
                return Err(RouteError::DuplicateRouteName {
                    name: entry.name().unwrap_or_default().to_string(),
                });
            }
        }

        let entry = Arc::new(entry);
        let sort_key = entry.sort_key();
        let position = self
            .entries
            .partition_point(|existing| existing.sort_key() <= sort_key);
        self.entries.insert(position, Arc::clone(&entry));

        if let Some(name) = key {
            self.names.insert(name, entry);
        }
        Ok(())
    }

    pub fn set_options(&mut self, options: MatchOptions) {
        self.options = options;
    }

    // ========================================================================
    // Lookup
    // ========================================================================

    /// Entries in match order
    pub fn entries(&self) -> &[Arc<RouteEntry>] {
        &self.entries
    }

    /// Entry by route name (case-insensitive)
    pub fn get(&self, name: &str) -> Option<&RouteEntry> {
        self.names
            .get(&name.to_ascii_lowercase())
            .map(Arc::as_ref)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn options(&self) -> &MatchOptions {
        &self.options
    }

    /// First route matching `path`
    pub fn match_path(&self, path: &str) -> Option<RouteMatch<'_>> {
        self.match_iter(path).next()
    }

    /// Every route matching `path`, in match order
    pub fn match_all(&self, path: &str) -> Vec<RouteMatch<'_>> {
        self.match_iter(path).collect()
    }

    fn match_iter<'t, 'p>(&'t self, path: &'p str) -> impl Iterator<Item = RouteMatch<'t>> + 'p
    where
        't: 'p,
    {
        matcher::matches(self.entries.iter().map(Arc::as_ref), path, &self.options)
    }

    // ========================================================================
    // URL generation
    // ========================================================================

    /// Generates a path for the named route
    pub fn url_for(&self, name: &str, values: &RouteValues) -> Option<String> {
        self.get(name)?.generate_url(values)
    }

    /// Same as [`url_for`](Self::url_for), taking key/value pairs
    ///
    /// # Examples
    ///
    /// ```
    /// use rhtmx_direct_routes::{ActionRef, RouteBuilder, RouteTable};
    ///
    /// let entry = RouteBuilder::new(vec![ActionRef::new("Orders", "Get")], true)
    ///     .unwrap()
    ///     .with_template("orders/{id:int}")
    ///     .with_name("orders.get")
    ///     .build()
    ///     .unwrap();
    /// let table = RouteTable::from_entries([entry]).unwrap();
    ///
    /// assert_eq!(
    ///     table.url_for_params("orders.get", [("id", "42")]),
    ///     Some("/orders/42".to_string())
    /// );
    /// assert_eq!(table.url_for_params("orders.get", [("id", "x")]), None);
    /// ```
    pub fn url_for_params<I, K, V>(&self, name: &str, params: I) -> Option<String>
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        let values: RouteValues = params
            .into_iter()
            .map(|(k, v)| (k.into(), v.into()))
            .collect();
        self.url_for(name, &values)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entry::{ActionRef, Precedence, RouteBuilder};
    use pretty_assertions::assert_eq;

    fn route(template: &str) -> RouteBuilder {
        RouteBuilder::new(vec![ActionRef::new("Home", "Index")], true)
            .unwrap()
            .with_template(template)
    }

    fn templates(table: &RouteTable) -> Vec<&str> {
        table.entries().iter().map(|e| e.template().text()).collect()
    }

    #[test]
    fn test_insert_sorts_by_order_then_precedence() {
        let table = RouteTable::from_entries([
            route("{*all}").build().unwrap(),
            route("{id}").build().unwrap(),
            route("about").build().unwrap(),
            route("{id:int}").with_order(-1).build().unwrap(),
        ])
        .unwrap();

        assert_eq!(templates(&table), vec!["{id:int}", "about", "{id}", "{*all}"]);
    }

    #[test]
    fn test_insert_is_stable_on_ties() {
        let same: Precedence = "2".parse().unwrap();
        let table = RouteTable::from_entries([
            route("a").with_precedence(same).build().unwrap(),
            route("b").with_precedence(same).build().unwrap(),
            route("c").with_precedence(same).build().unwrap(),
        ])
        .unwrap();
        assert_eq!(templates(&table), vec!["a", "b", "c"]);
    }

    #[test]
    fn test_duplicate_names_rejected() {
        let mut table = RouteTable::new();
        table.insert(route("a").with_name("home").build().unwrap()).unwrap();

        let err = table
            .insert(route("b").with_name("HOME").build().unwrap())
            .unwrap_err();
        assert!(matches!(err, RouteError::DuplicateRouteName { ref name } if name == "HOME"));
        assert_eq!(table.len(), 1);
    }

    #[test]
    fn test_get_by_name() {
        let table = RouteTable::new()
            .with_entry(route("a").with_name("Alpha").build().unwrap())
            .unwrap()
            .with_entry(route("b").build().unwrap())
            .unwrap();

        assert_eq!(table.get("alpha").unwrap().template().text(), "a");
        assert!(table.get("b").is_none());
    }

    #[test]
    fn test_match_all_in_order() {
        let table = RouteTable::from_entries([
            route("files/{*path}").build().unwrap(),
            route("files/{name}").build().unwrap(),
            route("files/readme").build().unwrap(),
        ])
        .unwrap();

        let found: Vec<&str> = table
            .match_all("/files/readme")
            .iter()
            .map(|m| m.entry.template().text())
            .collect();
        assert_eq!(found, vec!["files/readme", "files/{name}", "files/{*path}"]);
        assert!(table.match_path("/other").is_none());
    }

    #[test]
    fn test_options_apply_to_matching() {
        let table = RouteTable::from_entries([route("About").build().unwrap()])
            .unwrap()
            .with_options(MatchOptions::default().with_case_sensitive(true));

        assert!(table.match_path("/About").is_some());
        assert!(table.match_path("/about").is_none());
    }

    #[test]
    fn test_url_for_unknown_name() {
        assert_eq!(RouteTable::new().url_for("missing", &RouteValues::new()), None);
    }
}
