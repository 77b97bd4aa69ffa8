//! Process-wide parsed template cache
//!
//! Identical template strings are parsed once. Parse failures are returned
//! to the caller and never cached.

use std::collections::HashMap;
use std::sync::Arc;

use once_cell::sync::Lazy;
use parking_lot::RwLock;
use tracing::trace;

use super::{parse_template, RouteTemplate};
use crate::error::Result;

static GLOBAL: Lazy<TemplateCache> = Lazy::new(TemplateCache::new);

/// Synchronized `template text → parsed template` map
///
/// # Examples
///
/// ```
/// use std::sync::Arc;
/// use rhtmx_direct_routes::TemplateCache;
///
/// let cache = TemplateCache::new();
/// let first = cache.get_or_parse("orders/{id}").unwrap();
/// let second = cache.get_or_parse("orders/{id}").unwrap();
///
/// assert!(Arc::ptr_eq(&first, &second));
/// assert_eq!(cache.len(), 1);
/// ```
#[derive(Debug, Default)]
pub struct TemplateCache {
    entries: RwLock<HashMap<String, Arc<RouteTemplate>>>,
}

impl TemplateCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// The cache shared by every [`RouteBuilder`](crate::RouteBuilder)
    pub fn global() -> &'static TemplateCache {
        &GLOBAL
    }

    /// Returns the cached template for `text`, parsing it on first use
    pub fn get_or_parse(&self, text: &str) -> Result<Arc<RouteTemplate>> {
        if let Some(template) = self.entries.read().get(text) {
            trace!(template = text, "template cache hit");
            return Ok(Arc::clone(template));
        }

        let parsed = Arc::new(parse_template(text)?);
        let mut entries = self.entries.write();
        // Another thread may have parsed the same text meanwhile
        let template = entries
            .entry(text.to_string())
            .or_insert_with(|| parsed);
        Ok(Arc::clone(template))
    }

    pub fn len(&self) -> usize {
        self.entries.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.read().is_empty()
    }

    pub fn clear(&self) {
        self.entries.write().clear();
    }
}
