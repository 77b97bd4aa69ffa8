//! Integration tests for rhtmx-direct-routes
//!
//! Tests are organized by feature area and cover:
//! - Template parsing
//! - Inline constraints
//! - Route building
//! - Matching and precedence
//! - Route tables and URL generation

use rhtmx_direct_routes::*;
use std::collections::HashMap;
use std::sync::Arc;

fn single(controller: &str, action: &str) -> RouteBuilder {
    RouteBuilder::new(vec![ActionRef::new(controller, action)], true).unwrap()
}

fn build(template: &str) -> RouteEntry {
    single("Home", "Index").with_template(template).build().unwrap()
}

// ========================================================================
// Template Parsing
// ========================================================================

#[test]
fn test_parse_segment_kinds() {
    let template = parse_template("api/{version:int}/files/{name}.{ext?}/{*rest}").unwrap();
    let kinds: Vec<&str> = template
        .segments()
        .iter()
        .map(|segment| match segment {
            PathSegment::Literal(_) => "literal",
            PathSegment::Parameter(_) => "parameter",
            PathSegment::CatchAll(_) => "catch-all",
            PathSegment::Complex(_) => "complex",
        })
        .collect();
    assert_eq!(
        kinds,
        vec!["literal", "parameter", "literal", "complex", "catch-all"]
    );

    let names: Vec<&str> = template.parameters().map(|p| p.name.as_str()).collect();
    assert_eq!(names, vec!["version", "name", "ext", "rest"]);
}

#[test]
fn test_parse_errors_name_the_template() {
    let err = parse_template("files/{*path}/edit").unwrap_err();
    let message = err.to_string();
    assert!(message.contains("files/{*path}/edit"), "{message}");
    assert!(message.contains("catch-all"), "{message}");
}

#[test]
fn test_template_cache_shares_parses() {
    let cache = TemplateCache::global();
    let a = cache.get_or_parse("shared/{id}").unwrap();
    let b = cache.get_or_parse("shared/{id}").unwrap();
    assert!(Arc::ptr_eq(&a, &b));
}

// ========================================================================
// Inline Constraints
// ========================================================================

#[test]
fn test_inline_constraints_filter_matches() {
    let entry = build("users/{name:alpha:minlength(3)}");
    let options = MatchOptions::default();

    assert!(entry.match_path("/users/alice", &options).is_some());
    assert!(entry.match_path("/users/al", &options).is_none());
    assert!(entry.match_path("/users/al1ce", &options).is_none());
}

#[test]
fn test_guid_and_datetime_constraints() {
    let entry = build("events/{id:guid}/{day:datetime}");
    let options = MatchOptions::default();

    let values = entry
        .match_path(
            "/events/67e55044-10b1-426f-9247-bb680e5fe0c8/2024-03-01",
            &options,
        )
        .unwrap();
    assert_eq!(values["day"], "2024-03-01");
    assert!(entry
        .match_path("/events/nope/2024-03-01", &options)
        .is_none());
}

#[test]
fn test_regex_inline_constraint_with_commas() {
    let entry = build(r"codes/{code:regex(^[A-Z]{2,3}$)}");
    let options = MatchOptions::default();

    assert!(entry.match_path("/codes/abc", &options).is_some());
    assert!(entry.match_path("/codes/abcd", &options).is_none());
}

#[test]
fn test_custom_constraint_kind() {
    #[derive(Debug)]
    struct Even;

    impl CustomConstraint for Even {
        fn matches(&self, value: &str) -> bool {
            value.parse::<u64>().map(|n| n % 2 == 0).unwrap_or(false)
        }

        fn name(&self) -> &str {
            "even"
        }
    }

    let even: Arc<dyn CustomConstraint> = Arc::new(Even);
    let resolver = ConstraintResolver::builder()
        .with_defaults()
        .register("even", &[0], move |_| Ok(RouteConstraint::Custom(Arc::clone(&even))))
        .build();

    let entry = single("Numbers", "Even")
        .with_resolver(Arc::new(resolver))
        .with_template("n/{value:even}")
        .build()
        .unwrap();

    let options = MatchOptions::default();
    assert!(entry.match_path("/n/4", &options).is_some());
    assert!(entry.match_path("/n/5", &options).is_none());
    assert_eq!(entry.constraint("value").unwrap().to_string(), "even");
}

// ========================================================================
// Route Building
// ========================================================================

#[test]
fn test_defaults_include_controller_and_action() {
    let entry = single("Orders", "Get").with_template("orders").build().unwrap();
    let values = entry.match_path("/orders", &MatchOptions::default()).unwrap();

    assert_eq!(
        values,
        HashMap::from([
            ("controller".to_string(), "Orders".to_string()),
            ("action".to_string(), "Get".to_string()),
        ])
    );
}

#[test]
fn test_builder_can_build_repeatedly() {
    let mut builder = single("Orders", "Get").with_template("orders/{id}");
    let first = builder.build().unwrap();

    builder
        .constraints_mut()
        .insert("id".to_string(), RouteConstraint::Int.into());
    let second = builder.build().unwrap();

    assert!(first.constraint("id").is_none());
    assert_eq!(second.constraint("id"), Some(&RouteConstraint::Int));
    assert!(second.precedence() < first.precedence());
}

#[test]
fn test_build_error_messages() {
    let err = single("Orders", "Get")
        .with_template("orders/{action}")
        .build()
        .unwrap_err();
    let message = err.to_string();
    assert!(message.contains("'action'"), "{message}");
    assert!(message.contains("orders/{action}"), "{message}");
}

// ========================================================================
// Matching and Precedence
// ========================================================================

#[test]
fn test_literal_beats_parameter_beats_catch_all() {
    let entries = vec![build("docs/{*path}"), build("docs/{page}"), build("docs/index")];

    assert_eq!(
        match_path("/docs/index", &entries).unwrap().entry.template().text(),
        "docs/index"
    );
    assert_eq!(
        match_path("/docs/intro", &entries).unwrap().entry.template().text(),
        "docs/{page}"
    );
    assert_eq!(
        match_path("/docs/a/b", &entries).unwrap().entry.template().text(),
        "docs/{*path}"
    );
}

#[test]
fn test_order_overrides_precedence() {
    let entries = vec![
        build("docs/index"),
        single("Home", "Index")
            .with_template("docs/{*path}")
            .with_order(-1)
            .build()
            .unwrap(),
    ];

    assert_eq!(
        match_path("/docs/index", &entries).unwrap().entry.template().text(),
        "docs/{*path}"
    );
}

#[test]
fn test_declaration_order_breaks_ties() {
    let entries = vec![
        single("A", "One").with_template("x/{a}").build().unwrap(),
        single("B", "Two").with_template("x/{b}").build().unwrap(),
    ];
    let found = match_path("/x/1", &entries).unwrap();
    assert_eq!(found.values["controller"], "A");
    assert_eq!(found.values["a"], "1");
}

#[test]
fn test_match_ignores_query_and_trailing_slash() {
    let entries = vec![build("search/{term}")];
    let found = match_path("/search/rust/?page=2#results", &entries).unwrap();
    assert_eq!(found.values["term"], "rust");
}

#[test]
fn test_match_with_options() {
    let entries = vec![build("Docs/{*path}")];
    let strict = MatchOptions::default()
        .with_case_sensitive(true)
        .with_empty_catch_all(false);

    assert!(match_path_with("/docs/a", &entries, &strict).is_none());
    assert!(match_path_with("/Docs", &entries, &strict).is_none());
    assert!(match_path_with("/Docs/a", &entries, &strict).is_some());
    assert!(match_path("/docs", &entries).is_some());
}

#[test]
fn test_defaults_fill_omitted_values() {
    let entries = vec![build("archive/{year=2024}/{month?}")];

    let found = match_path("/archive", &entries).unwrap();
    assert_eq!(found.values["year"], "2024");
    assert!(!found.values.contains_key("month"));

    let found = match_path("/archive/2020/05", &entries).unwrap();
    assert_eq!(found.values["year"], "2020");
    assert_eq!(found.values["month"], "05");
}

#[test]
fn test_supplied_default_lets_path_omit_parameter() {
    let entry = single("Orders", "List")
        .with_template("orders/{page}")
        .with_default("page", "1")
        .build()
        .unwrap();
    let options = MatchOptions::default();

    let values = entry.match_path("/orders", &options).unwrap();
    assert_eq!(values["page"], "1");
    assert_eq!(entry.match_path("/orders/4", &options).unwrap()["page"], "4");

    for params in [HashMap::new(), HashMap::from([("page".to_string(), "4".to_string())])] {
        let url = entry.generate_url(&params).unwrap();
        let found = entry.match_path(&url, &options).unwrap();
        let expected = params.get("page").map(String::as_str).unwrap_or("1");
        assert_eq!(found["page"], expected, "{url}");
    }
}

#[test]
fn test_dangling_complex_separator_does_not_match() {
    let entries = vec![build("orders/{id}.{format?}")];
    assert!(match_path("/orders/42.", &entries).is_none());
    assert_eq!(match_path("/orders/42", &entries).unwrap().values["id"], "42");
}

// ========================================================================
// Route Tables and URL Generation
// ========================================================================

#[test]
fn test_table_round_trip() {
    let mut table = RouteTable::new();
    table
        .insert(
            single("Orders", "Get")
                .with_template("orders/{id:int}/{format=json}")
                .with_name("orders.get")
                .build()
                .unwrap(),
        )
        .unwrap();

    let url = table.url_for_params("orders.get", [("id", "12")]).unwrap();
    assert_eq!(url, "/orders/12");

    let url = table
        .url_for_params("orders.get", [("id", "12"), ("format", "xml")])
        .unwrap();
    assert_eq!(url, "/orders/12/xml");

    let found = table.match_path(&url).unwrap();
    assert_eq!(found.entry.name(), Some("orders.get"));
    assert_eq!(found.values["id"], "12");
    assert_eq!(found.values["format"], "xml");
}

#[test]
fn test_table_entries_are_shared_and_sorted() {
    let table = RouteTable::from_entries([build("{id}"), build("about")]).unwrap();
    let entries: Vec<&str> = table.entries().iter().map(|e| e.template().text()).collect();
    assert_eq!(entries, vec!["about", "{id}"]);

    let clone = table.clone();
    assert!(Arc::ptr_eq(&table.entries()[0], &clone.entries()[0]));
}
