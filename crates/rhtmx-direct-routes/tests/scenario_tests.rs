//! End-to-end scenarios and properties of direct routing

use pretty_assertions::assert_eq;
use rhtmx_direct_routes::*;
use rstest::rstest;

fn entry(template: &str) -> RouteEntry {
    RouteBuilder::new(vec![ActionRef::new("Shop", "Handle")], true)
        .unwrap()
        .with_template(template)
        .build()
        .unwrap()
}

fn extracted(found: &RouteMatch<'_>, name: &str) -> Option<String> {
    found.values.get(name).cloned()
}

#[test]
fn test_int_route_matches_number() {
    let entries = vec![entry("orders/{id:int}")];
    let found = match_path("orders/42", &entries).unwrap();
    assert_eq!(extracted(&found, "id").as_deref(), Some("42"));
}

#[test]
fn test_int_route_rejects_text() {
    let entries = vec![entry("orders/{id:int}")];
    assert!(match_path("orders/abc", &entries).is_none());
}

#[test]
fn test_catch_all_takes_remaining_segments() {
    let entries = vec![entry("files/{*path}")];
    let found = match_path("files/a/b/c", &entries).unwrap();
    assert_eq!(extracted(&found, "path").as_deref(), Some("a/b/c"));
}

#[test]
fn test_inline_range_equals_resolved_range() {
    let built = entry("items/{id:range(1,10)}");
    let resolved = resolve_constraint("range(1,10)").unwrap();

    assert_eq!(built.constraint("id"), Some(&resolved));
    for (value, expected) in [("1", true), ("10", true), ("0", false), ("11", false)] {
        assert_eq!(resolved.matches(value), expected, "range on {value}");
        assert_eq!(built.constraint("id").unwrap().matches(value), expected);
    }
}

#[rstest]
#[case(vec![ActionRef::new("A", "x")], true)]
#[case(vec![ActionRef::new("A", "x"), ActionRef::new("B", "y")], false)]
fn test_controller_parameter_always_fails(
    #[case] actions: Vec<ActionRef>,
    #[case] target_is_action: bool,
) {
    let result = RouteBuilder::new(actions, target_is_action)
        .unwrap()
        .with_template("{controller}/x")
        .build();
    assert!(matches!(
        result,
        Err(RouteError::ReservedParameterName { .. })
    ));
}

#[rstest]
#[case("about")]
#[case("api/v1/orders")]
#[case("Customers(1)")]
fn test_literal_template_matches_only_itself(#[case] template: &str) {
    let entries = vec![entry(template)];
    assert!(match_path(template, &entries).is_some());
    assert!(match_path(&template.to_uppercase(), &entries).is_some());
    assert!(match_path(&format!("{template}x"), &entries).is_none());
    assert!(match_path(&format!("{template}/x"), &entries).is_none());
}

#[rstest]
#[case("orders/{id}.{format?}/items")]
#[case("{controller2=Home}/{action2=Index}/{id?}")]
#[case(r"codes/{code:regex(^\d{3}$):length(3)}")]
#[case("files/{*path:minlength(1)}")]
fn test_parsing_is_deterministic(#[case] template: &str) {
    assert_eq!(parse_template(template).unwrap(), parse_template(template).unwrap());
}

#[rstest]
#[case("alpha")]
#[case("bool")]
#[case("datetime")]
#[case("decimal")]
#[case("double")]
#[case("float")]
#[case("guid")]
#[case("int")]
#[case("long")]
#[case("length(4)")]
#[case("length(1,4)")]
#[case("max(4)")]
#[case("maxlength(4)")]
#[case("min(4)")]
#[case("minlength(4)")]
#[case("range(1,4)")]
#[case("regex(a,b)")]
fn test_registered_keys_resolve_with_matching_arity(#[case] text: &str) {
    assert!(resolve_constraint(text).is_ok(), "{text}");
    assert!(resolve_constraint(&text.to_uppercase()).is_ok(), "{text}");
}

#[rstest]
#[case("{*path}/x")]
#[case("a/{*path}/b")]
#[case("{*a}/{*b}")]
#[case("a/x{*path}")]
fn test_misplaced_catch_all_fails(#[case] template: &str) {
    assert!(matches!(
        parse_template(template),
        Err(RouteError::TemplateParse { .. })
    ));
}

#[rstest]
#[case("users/{id}", "users/{id:int}", "users/42")]
#[case("{id}", "{id:int}", "7")]
#[case("a/{id}/b", "a/{id:int}/b", "a/1/b")]
fn test_int_constrained_ranks_first(
    #[case] open: &str,
    #[case] typed: &str,
    #[case] path: &str,
) {
    let entries = vec![entry(open), entry(typed)];
    let found = match_path(path, &entries).unwrap();
    assert_eq!(found.entry.template().text(), typed);
}

#[test]
fn test_generated_urls_match_back() {
    let table = RoutesConfig::from_toml_str(
        r#"
        [[routes]]
        template = "shop/{category:alpha}/{id:int}/{slug?}"
        name = "product"
        actions = [{ controller = "Products", action = "Show" }]
        "#,
    )
    .unwrap()
    .build_table()
    .unwrap();

    for params in [
        vec![("category", "Books"), ("id", "3")],
        vec![("category", "Games"), ("id", "77"), ("slug", "space opera")],
    ] {
        let url = table.url_for_params("product", params.clone()).unwrap();
        let found = table.match_path(&url).unwrap();
        for (key, value) in params {
            assert_eq!(found.values[key], value, "{url}");
        }
    }
}
