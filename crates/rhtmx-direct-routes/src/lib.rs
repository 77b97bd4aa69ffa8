//! # RHTMX Direct Routes
//!
//! Attribute-style ("direct") route templates for Rust web frameworks:
//! - Literal segments (`orders`)
//! - Parameters (`{id}`), optional (`{id?}`) or defaulted (`{page=1}`)
//! - Inline constraints (`{id:int:range(1,100)}`)
//! - Complex segments (`{id}.{format?}`, `Customers({key})`)
//! - Catch-all parameters (`{*path}`)
//!
//! ## Pipeline
//!
//! Configuration time:
//! 1. [`template`] tokenizes and parses template text into a [`RouteTemplate`]
//! 2. [`constraint`] resolves inline constraint text into [`RouteConstraint`]s
//! 3. [`RouteBuilder`] validates everything and produces an immutable [`RouteEntry`]
//! 4. [`RouteTable`] keeps entries sorted by order, then [`Precedence`]
//!
//! Request time, [`match_path`] / [`RouteTable::match_path`] walk the entries
//! and return the first route whose template and constraints accept the path.
//! Matching never fails: no route found is `None`.
//!
//! ## Example
//!
//! ```
//! use rhtmx_direct_routes::{ActionRef, RouteBuilder, RouteTable};
//!
//! let mut orders = RouteBuilder::new(vec![ActionRef::new("Orders", "Get")], true)?
//!     .with_template("orders/{id:int}")
//!     .with_name("orders.get");
//! let mut files = RouteBuilder::new(vec![ActionRef::new("Files", "Get")], true)?
//!     .with_template("files/{*path}");
//!
//! let table = RouteTable::from_entries([orders.build()?, files.build()?])?;
//!
//! let found = table.match_path("/orders/42").unwrap();
//! assert_eq!(found.values["id"], "42");
//! assert_eq!(found.values["action"], "Get");
//!
//! assert!(table.match_path("/orders/abc").is_none());
//! assert_eq!(table.match_path("/files/a/b/c").unwrap().values["path"], "a/b/c");
//! assert_eq!(
//!     table.url_for_params("orders.get", [("id", "7")]),
//!     Some("/orders/7".to_string())
//! );
//! # Ok::<(), rhtmx_direct_routes::RouteError>(())
//! ```

// ============================================================================
// Module Declarations
// ============================================================================

pub mod config;
pub mod constraint;
pub mod entry;
pub mod error;
pub mod matcher;
pub mod path;
pub mod table;
pub mod template;
mod url;

pub use config::{RouteConfig, RoutesConfig};
pub use constraint::{
    resolve_constraint, ConstraintArgs, ConstraintRegex, ConstraintResolver,
    ConstraintResolverBuilder, CustomConstraint, RouteConstraint,
};
pub use entry::{
    ActionRef, ConstraintSource, DataTokens, ParsePrecedenceError, Precedence, RouteBuilder,
    RouteEntry,
};
pub use error::{Result, RouteError};
pub use matcher::{match_path, match_path_with, MatchOptions, RouteMatch, RouteValues};
pub use table::RouteTable;
pub use template::{
    parse_template, PathSegment, RouteTemplate, Subsegment, TemplateCache, TemplateParameter,
};
