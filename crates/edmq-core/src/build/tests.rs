use super::*;
use crate::{
    bind::{
        BindContext, ExpressionBinder, FilterClause, ResolverPolicy, bind_path, bind_select_expand,
    },
    error::ErrorClass,
    normalize::{normalize_expand, normalize_select},
    settings::UriSettings,
    syntax::{
        parser::{
            parse_expand, parse_filter, parse_literal, parse_query, parse_resource_path,
            parse_select,
        },
        token::{BinaryOperatorKind, QueryOptionClause, QueryToken, UnaryOperatorKind},
    },
    test_fixtures::{entity, fixture_model},
    value::{EnumValue, LiteralValue},
};
use rust_decimal::Decimal;

fn settings() -> UriSettings {
    UriSettings::default()
}

fn encoded(value: LiteralValue) -> String {
    encode_literal(&value).expect("literal should encode")
}

fn rendered_filter(text: &str) -> String {
    let token = parse_filter(text, &settings()).expect("filter should parse");
    write_filter(&token).expect("filter should render")
}

//
// literals
//

#[test]
fn whole_double_keeps_fraction_and_reads_back() {
    let text = encoded(LiteralValue::Double(100.0));
    assert_eq!(text, "100.0");

    let reparsed = parse_literal(&text).expect("rendered double should parse");
    assert_eq!(reparsed.value, LiteralValue::Double(100.0));
}

#[test]
fn numeric_suffixes() {
    assert_eq!(encoded(LiteralValue::Int32(42)), "42");
    assert_eq!(encoded(LiteralValue::Int64(42)), "42L");
    assert_eq!(encoded(LiteralValue::Single(2.5)), "2.5f");
    assert_eq!(encoded(LiteralValue::Decimal(Decimal::from(100))), "100.0M");
    assert_eq!(encoded(LiteralValue::Decimal(Decimal::new(1255, 2))), "12.55M");
}

#[test]
fn non_finite_doubles_use_keywords() {
    assert_eq!(encoded(LiteralValue::Double(f64::NAN)), "NaN");
    assert_eq!(encoded(LiteralValue::Double(f64::INFINITY)), "INF");
    assert_eq!(encoded(LiteralValue::Double(f64::NEG_INFINITY)), "-INF");
}

#[test]
fn strings_double_quotes_and_escape() {
    assert_eq!(
        encoded(LiteralValue::String("O'Neil & co".to_string())),
        "'O''Neil%20%26%20co'"
    );
    assert_eq!(encoded(LiteralValue::String(String::new())), "''");
}

#[test]
fn prefixed_literals() {
    assert_eq!(
        encoded(LiteralValue::Binary(vec![0xab, 0x01])),
        "binary'AB01'"
    );
    assert_eq!(encoded(LiteralValue::Null), "null");
    assert_eq!(encoded(LiteralValue::Boolean(true)), "true");
    assert_eq!(
        encoded(LiteralValue::Enum(EnumValue::new("Test.WeekDay", "Monday"))),
        "Test.WeekDay'Monday'"
    );

    for text in [
        "datetime'2024-01-02T03:04:05'",
        "guid'0f8fad5b-d9cb-469f-a165-70867728950e'",
        "time'PT1H30M'",
    ] {
        let literal = parse_literal(text).expect("prefixed literal should parse");
        assert_eq!(encoded(literal.value), text);
    }
}

#[test]
fn spatial_body_is_escaped() {
    let literal = parse_literal("geography'SRID=4326;POINT(1 2)'").expect("spatial parses");

    assert_eq!(encoded(literal.value), "geography'SRID=4326;POINT(1%202)'");
}

//
// expressions
//

#[test]
fn operators_use_escaped_spaces() {
    assert_eq!(
        rendered_filter("Age add 1 gt 3 and not (Name eq 'x')"),
        "Age%20add%201%20gt%203%20and%20not%20(Name%20eq%20'x')"
    );
}

#[test]
fn parentheses_follow_precedence() {
    let a = QueryToken::property("A");
    let b = QueryToken::property("B");
    let c = QueryToken::property("C");

    let sum_first = QueryToken::binary(
        BinaryOperatorKind::Multiply,
        QueryToken::binary(BinaryOperatorKind::Add, a.clone(), b.clone()),
        c.clone(),
    );
    assert_eq!(
        write_filter(&sum_first).expect("renders"),
        "(A%20add%20B)%20mul%20C"
    );

    let right_nested = QueryToken::binary(
        BinaryOperatorKind::Subtract,
        a,
        QueryToken::binary(BinaryOperatorKind::Subtract, b, c),
    );
    assert_eq!(
        write_filter(&right_nested).expect("renders"),
        "A%20sub%20(B%20sub%20C)"
    );
}

#[test]
fn negating_a_negative_literal_is_parenthesized() {
    let token = QueryToken::unary(
        UnaryOperatorKind::Negate,
        QueryToken::literal(LiteralValue::Int32(-5), "-5"),
    );

    assert_eq!(write_filter(&token).expect("renders"), "-(-5)");
}

#[test]
fn calls_and_member_paths() {
    assert_eq!(
        rendered_filter("startswith(BestFriend/Name,'A') eq true"),
        "startswith(BestFriend/Name,'A')%20eq%20true"
    );
}

#[test]
fn bare_star_is_not_a_value() {
    let token = QueryToken::binary(
        BinaryOperatorKind::Equal,
        QueryToken::Star { parent: None },
        QueryToken::literal(LiteralValue::Int32(1), "1"),
    );

    let err = write_filter(&token).unwrap_err();
    assert!(matches!(err, BuildError::UnrenderableToken { .. }));
    assert_eq!(err.class(), ErrorClass::Internal);
}

//
// query options
//

#[test]
fn separators_follow_visit_order() {
    let mut builder = UriBuilder::new();
    let path = parse_resource_path("People", &settings()).expect("path parses");
    builder
        .path(&path)
        .and_then(|b| b.option(&QueryOptionClause::Top(2)))
        .and_then(|b| b.option(&QueryOptionClause::Skip(4)))
        .expect("options render");
    builder.raw_option("x", "1");

    assert_eq!(builder.finish(), "People?$top=2&$skip=4&x=1");
}

#[test]
fn parsed_uri_renders_back_verbatim() {
    let uri = "People(1)/Friends?$filter=Age%20gt%203&$orderby=Name%20desc,Age\
               &$select=Name,Age&$expand=Pets($filter=Name%20eq%20'Rex';$top=1)&$top=5";

    let descriptor = parse_query(uri, &settings()).expect("uri parses");
    let rendered = UriBuilder::build(&descriptor).expect("uri renders");

    assert_eq!(rendered, uri);
}

//
// bound trees
//

#[test]
fn bound_enum_comparison_renders_canonical_member_names() {
    let model = fixture_model();
    let ctx = BindContext::new(&model, ResolverPolicy::from_settings(&settings()));
    let people = ctx.resolver.navigation_source("People").expect("fixture set");
    let token = parse_filter("Kind eq 26", &settings()).expect("filter parses");
    let mut binder = ExpressionBinder::for_source(ctx, &people, 800);
    let clause = FilterClause::bind(&mut binder, &token).expect("filter binds");

    let lowered = lower_filter(&clause).expect("filter lowers");

    assert_eq!(
        write_filter(&lowered).expect("renders"),
        "Kind%20eq%20Test.EmployeeType'FullTime,Contractor,Intern'"
    );
}

#[test]
fn bound_type_cast_renders_as_segment() {
    let model = fixture_model();
    let ctx = BindContext::new(&model, ResolverPolicy::from_settings(&settings()));
    let people = ctx.resolver.navigation_source("People").expect("fixture set");
    let token =
        parse_filter("Test.Employee/Department eq 'x' and Age gt 1.5", &settings()).expect("parses");
    let mut binder = ExpressionBinder::for_source(ctx, &people, 800);
    let clause = FilterClause::bind(&mut binder, &token).expect("filter binds");

    let lowered = lower_filter(&clause).expect("filter lowers");

    // the Int32 to Double promotion is implicit again
    assert_eq!(
        write_filter(&lowered).expect("renders"),
        "Test.Employee/Department%20eq%20'x'%20and%20Age%20gt%201.5"
    );
}

#[test]
fn bound_paths_render_back() {
    let model = fixture_model();
    let ctx = BindContext::new(&model, ResolverPolicy::from_settings(&settings()));

    for text in [
        "OrderLines(OrderId=1,LineNo=2)",
        "People(1)/Friends/$count",
        "People(1)/Test.GetAge()",
        "GetTopPeople(count=5)",
        "People(1)/$links/Friends",
    ] {
        let leaf = parse_resource_path(text, &settings()).expect("path parses");
        let bound = bind_path(ctx, leaf).expect("path binds");
        let lowered = lower_path(&bound).expect("path lowers");

        assert_eq!(write_path(&lowered).expect("path renders"), text);
    }
}

#[test]
fn bound_select_expand_renders_implicit_selection() {
    let model = fixture_model();
    let ctx = BindContext::new(&model, ResolverPolicy::from_settings(&settings()));
    let select = normalize_select(parse_select("Name", &settings()).expect("parses"));
    let expand = normalize_expand(
        parse_expand("Friends($select=Name;$top=2)", &settings()).expect("parses"),
        &settings(),
    )
    .expect("normalizes");
    let person = entity(&model, "Test.Person");

    let clause = bind_select_expand(
        ctx,
        &settings(),
        &person,
        model.find_navigation_source("People"),
        Some(&select),
        Some(&expand),
    )
    .expect("binds");
    let (select, expand) = lower_select_expand(&clause).expect("lowers");

    let select = select.expect("select present");
    let expand = expand.expect("expand present");
    assert_eq!(write_select(&select).expect("renders"), "Name,Friends");
    assert_eq!(
        write_expand(&expand).expect("renders"),
        "Friends($top=2;$select=Name)"
    );
}

#[test]
fn all_selected_clause_has_no_select() {
    let model = fixture_model();
    let ctx = BindContext::new(&model, ResolverPolicy::from_settings(&settings()));
    let person = entity(&model, "Test.Person");

    let clause = bind_select_expand(ctx, &settings(), &person, None, None, None).expect("binds");

    assert_eq!(lower_select_expand(&clause).expect("lowers"), (None, None));
}
