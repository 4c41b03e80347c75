use super::*;
use crate::{
    bind::{PathSegment, SelectItem},
    edm::TypeRef,
    error::{ErrorClass, ErrorOrigin},
    syntax::SyntaxError,
    test_fixtures::{entity, fixture_model},
};

fn parse(uri: &str) -> Result<ParsedUri, QueryError> {
    let model = fixture_model();
    UriParser::new(&model, UriSettings::default()).parse_uri(uri)
}

//
// parse_uri
//

#[test]
fn system_and_custom_options_land_in_their_fields() {
    let parsed = parse(
        "People?$filter=Age%20gt%203&$orderby=Name%20desc&$top=5&$skip=1&$count=true\
         &$format=json&$skiptoken=abc&$search=blue&x-debug=1",
    )
    .expect("uri binds");

    assert!(parsed.filter.is_some());
    assert_eq!(parsed.orderby.map(|o| o.items.len()), Some(1));
    assert_eq!(parsed.top, Some(5));
    assert_eq!(parsed.skip, Some(1));
    assert_eq!(parsed.count, Some(true));
    assert_eq!(parsed.format.as_deref(), Some("json"));
    assert_eq!(parsed.skip_token.as_deref(), Some("abc"));
    assert_eq!(parsed.search.as_deref(), Some("blue"));
    assert_eq!(parsed.custom.len(), 1);
    assert_eq!(parsed.custom[0].name, "x-debug");
    assert!(parsed.select_expand.is_none());
    assert!(parsed.path.is_some());
}

#[test]
fn filter_ranges_over_the_cast_type() {
    let parsed =
        parse("People/Test.Employee?$filter=Department%20eq%20'x'").expect("cast path binds");

    let filter = parsed.filter.expect("filter present");
    assert_eq!(filter.range_variable.type_ref.full_name(), "Test.Employee");
    assert_eq!(
        filter
            .range_variable
            .navigation_source
            .as_ref()
            .map(NavigationSource::name),
        Some("People")
    );
}

#[test]
fn filter_after_navigation_uses_its_target() {
    let parsed = parse("People(1)/Pets?$filter=Species%20eq%20'cat'").expect("binds");

    let filter = parsed.filter.expect("filter present");
    assert_eq!(filter.range_variable.type_ref.full_name(), "Test.Pet");
}

#[test]
fn count_segment_keeps_the_filtered_entities() {
    let parsed = parse("People/$count?$filter=Age%20gt%203").expect("binds");

    assert!(matches!(
        parsed.path.as_ref().and_then(ODataPath::last),
        Some(PathSegment::Count)
    ));
    assert!(parsed.filter.is_some());
}

#[test]
fn expression_options_need_an_entity_target() {
    for uri in [
        "?$filter=Age%20gt%203",
        "GetRating(id=1)?$orderby=Name",
        "$metadata?$select=Name",
    ] {
        let err = parse(uri).unwrap_err();

        assert!(
            matches!(err, QueryError::Bind(BindError::InvalidPathSegment { .. })),
            "{uri}: {err:?}"
        );
    }
}

#[test]
fn select_and_expand_bind_together() {
    let parsed = parse("People?$select=Name&$expand=Friends($top=1)").expect("binds");

    let clause = parsed.select_expand.expect("clause present");
    assert!(!clause.all_selected);
    assert!(matches!(clause.items[0], SelectItem::Path(_)));
    assert_eq!(clause.expanded().count(), 1);
}

#[test]
fn stage_errors_keep_their_origin() {
    let err = parse("People?$top=abc").unwrap_err();
    assert!(matches!(
        err,
        QueryError::Syntax(SyntaxError::InvalidOptionValue { .. })
    ));
    assert_eq!(err.origin(), ErrorOrigin::Syntax);

    let err = parse("People?$filter=Nope%20eq%201").unwrap_err();
    assert_eq!(err.origin(), ErrorOrigin::Bind);
    assert_eq!(err.class(), ErrorClass::BadRequest);
}

#[test]
fn depth_limits_come_from_settings() {
    let model = fixture_model();
    let parser = UriParser::new(&model, UriSettings::default().with_max_filter_depth(2));

    let err = parser
        .parse_uri("People?$filter=Age%20add%201%20add%202%20gt%203")
        .unwrap_err();

    assert_eq!(err.class(), ErrorClass::TooDeep);
}

#[test]
fn case_insensitive_setting_reaches_the_binder() {
    let model = fixture_model();
    let strict = UriParser::new(&model, UriSettings::default());
    let relaxed = UriParser::new(&model, UriSettings::default().with_case_insensitive(true));

    assert!(strict.parse_uri("people?$top=1").is_err());
    assert!(relaxed.parse_uri("people?$top=1").is_ok());
}

//
// single options
//

#[test]
fn parse_filter_against_an_explicit_entity() {
    let model = fixture_model();
    let parser = UriParser::new(&model, UriSettings::default());
    let person = entity(&model, "Test.Person");

    let clause = parser
        .parse_filter("BestFriend/Age lt 30", &person, model.find_navigation_source("People"))
        .expect("filter binds");

    assert_eq!(
        clause.expression.type_ref().map(TypeRef::full_name),
        Some("Edm.Boolean".to_string())
    );
}

#[test]
fn parse_orderby_rejects_structured_keys() {
    let model = fixture_model();
    let parser = UriParser::new(&model, UriSettings::default());
    let person = entity(&model, "Test.Person");

    assert!(parser.parse_orderby("Name,Age desc", &person, None).is_ok());
    assert!(parser.parse_orderby("HomeAddress", &person, None).is_err());
}

#[test]
fn parse_select_expand_without_options_selects_everything() {
    let model = fixture_model();
    let parser = UriParser::new(&model, UriSettings::default());
    let person = entity(&model, "Test.Person");

    let clause = parser
        .parse_select_expand(None, None, &person, None)
        .expect("binds");

    assert!(clause.all_selected);
    assert!(clause.items.is_empty());
}

#[test]
fn parse_path_binds_keys() {
    let model = fixture_model();
    let parser = UriParser::new(&model, UriSettings::default());

    let path = parser.parse_path("People(1)/Friends").expect("binds");

    assert_eq!(path.len(), 3);
    assert_eq!(
        path.target_type().map(TypeRef::full_name),
        Some("Collection(Test.Person)".to_string())
    );
}
