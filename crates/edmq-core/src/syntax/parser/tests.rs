use super::*;
use crate::{
    settings::UriSettings,
    syntax::token::{
        BinaryOperatorKind as Op, ExpandLevels, InlineCountKind, OrderDirection, PathSegmentToken,
        QueryOptionClause, QueryToken, SystemKeyword, UnaryOperatorKind,
    },
    value::LiteralValue,
};

fn settings() -> UriSettings {
    UriSettings::default()
}

fn filter(text: &str) -> QueryToken {
    parse_filter(text, &settings()).expect("filter should parse")
}

fn int(value: i32) -> QueryToken {
    QueryToken::literal(LiteralValue::Int32(value), value.to_string())
}

fn path_names(leaf: &PathSegmentToken) -> Vec<String> {
    let mut names: Vec<String> = std::iter::successors(Some(leaf), |s| s.parent())
        .map(PathSegmentToken::identifier)
        .collect();
    names.reverse();
    names
}

//
// expressions
//

#[test]
fn and_binds_tighter_than_or() {
    let parsed = filter("A eq 1 or B eq 2 and C eq 3");

    let expected = QueryToken::binary(
        Op::Or,
        QueryToken::binary(Op::Equal, QueryToken::property("A"), int(1)),
        QueryToken::binary(
            Op::And,
            QueryToken::binary(Op::Equal, QueryToken::property("B"), int(2)),
            QueryToken::binary(Op::Equal, QueryToken::property("C"), int(3)),
        ),
    );
    assert_eq!(parsed, expected);
}

#[test]
fn arithmetic_is_left_associative() {
    let parsed = filter("Age sub 1 sub 2");

    let expected = QueryToken::binary(
        Op::Subtract,
        QueryToken::binary(Op::Subtract, QueryToken::property("Age"), int(1)),
        int(2),
    );
    assert_eq!(parsed, expected);
}

#[test]
fn parentheses_override_precedence() {
    let parsed = filter("(Age add 1) mul 2");

    let expected = QueryToken::binary(
        Op::Multiply,
        QueryToken::binary(Op::Add, QueryToken::property("Age"), int(1)),
        int(2),
    );
    assert_eq!(parsed, expected);
}

#[test]
fn unary_operators_bind_tightest() {
    let parsed = filter("not Flag and -Age lt -3");

    let expected = QueryToken::binary(
        Op::And,
        QueryToken::unary(UnaryOperatorKind::Not, QueryToken::property("Flag")),
        QueryToken::binary(
            Op::LessThan,
            QueryToken::unary(UnaryOperatorKind::Negate, QueryToken::property("Age")),
            QueryToken::literal(LiteralValue::Int32(-3), "-3"),
        ),
    );
    assert_eq!(parsed, expected);
}

#[test]
fn member_paths_link_leaf_to_root() {
    let parsed = filter("HomeAddress/City eq 'Oslo'");

    let QueryToken::BinaryOperator { left, .. } = parsed else {
        panic!("expected comparison");
    };
    assert_eq!(
        *left,
        QueryToken::property_of(QueryToken::property("HomeAddress"), "City")
    );
}

#[test]
fn function_calls_keep_argument_order() {
    let parsed = filter("substringof('ab', Name)");

    assert_eq!(
        parsed,
        QueryToken::call(
            "substringof",
            vec![
                QueryToken::literal(LiteralValue::String("ab".to_string()), "'ab'"),
                QueryToken::property("Name"),
            ]
        )
    );
    assert_eq!(filter("now()"), QueryToken::call("now", Vec::new()));
}

#[test]
fn range_variable_starts_a_path() {
    assert_eq!(
        filter("$it/Name"),
        QueryToken::property_of(QueryToken::property("$it"), "Name")
    );
}

#[test]
fn trailing_tokens_are_rejected() {
    let err = parse_filter("Name eq 'a' 'b'", &settings()).unwrap_err();
    assert!(matches!(err, SyntaxError::UnexpectedToken { .. }));

    let err = parse_filter("Name eq", &settings()).unwrap_err();
    assert!(matches!(err, SyntaxError::UnexpectedEnd { .. }));
}

#[test]
fn nesting_beyond_the_limit_is_too_deep() {
    let limited = UriSettings::default().with_max_filter_depth(10);

    let nested = format!("{}1{}", "(".repeat(20), ")".repeat(20));
    let err = parse_filter(&nested, &limited).unwrap_err();
    assert!(matches!(err, SyntaxError::RecursionLimitExceeded { limit: 10 }));

    let chain = vec!["A eq 1"; 20].join(" and ");
    let err = parse_filter(&chain, &limited).unwrap_err();
    assert!(matches!(err, SyntaxError::RecursionLimitExceeded { .. }));

    let negations = format!("{}Age", "-".repeat(20));
    let err = parse_filter(&negations, &limited).unwrap_err();
    assert!(matches!(err, SyntaxError::RecursionLimitExceeded { .. }));

    assert!(parse_filter("(A eq 1) and B eq 2", &limited).is_ok());
}

#[test]
fn orderby_reads_directions() {
    let items = parse_orderby("Name desc, Age, Score asc", &settings()).unwrap();

    let directions: Vec<_> = items.iter().map(|item| item.direction).collect();
    assert_eq!(
        directions,
        vec![
            OrderDirection::Descending,
            OrderDirection::Ascending,
            OrderDirection::Ascending
        ]
    );
    assert_eq!(items[1].expression, QueryToken::property("Age"));
}

//
// paths
//

#[test]
fn resource_path_reads_keys_and_keywords() {
    let leaf = parse_resource_path("/OrderLines(OrderId=1,LineNo=2)/$count", &settings()).unwrap();

    assert!(matches!(
        leaf,
        PathSegmentToken::Keyword {
            keyword: SystemKeyword::Count,
            ..
        }
    ));
    let Some(PathSegmentToken::Segment(segment)) = leaf.parent() else {
        panic!("expected keyed segment");
    };
    let keys = segment.named_values.as_ref().unwrap();
    assert_eq!(keys.len(), 2);
    assert_eq!(keys[0].name.as_deref(), Some("OrderId"));
    assert_eq!(keys[1].value.value, LiteralValue::Int32(2));
}

#[test]
fn empty_parentheses_are_an_empty_list() {
    let leaf = parse_resource_path("People(1)/Test.GetAge()", &settings()).unwrap();

    let PathSegmentToken::Segment(segment) = &leaf else {
        panic!("expected segment");
    };
    assert_eq!(segment.named_values, Some(Vec::new()));
    assert_eq!(path_names(&leaf), vec!["People", "Test.GetAge"]);
}

#[test]
fn path_length_is_limited() {
    let limited = UriSettings::default().with_max_path_segments(3);
    let err = parse_resource_path("A/B/C/D", &limited).unwrap_err();

    assert!(matches!(err, SyntaxError::RecursionLimitExceeded { limit: 3 }));
}

//
// select / expand
//

#[test]
fn select_terms_cover_every_item_shape() {
    let select = parse_select("Name, *, Test.*, HomeAddress/City, Test.Employee/Department", &settings()).unwrap();

    let names: Vec<Vec<String>> = select.terms.iter().map(|t| path_names(&t.path)).collect();
    assert_eq!(
        names,
        vec![
            vec!["Name".to_string()],
            vec!["*".to_string()],
            vec!["Test.*".to_string()],
            vec!["HomeAddress".to_string(), "City".to_string()],
            vec!["Test.Employee".to_string(), "Department".to_string()],
        ]
    );
}

#[test]
fn expand_reads_nested_options() {
    let expand = parse_expand(
        "Friends($filter=Age gt 3;$orderby=Name desc;$top=2;$levels=max;$search=blue green;$expand=Pets($select=Name)),BestFriend/$ref",
        &settings(),
    )
    .unwrap();

    assert_eq!(expand.terms.len(), 2);
    let friends = &expand.terms[0];
    assert!(friends.options.filter.is_some());
    assert_eq!(friends.options.orderby.len(), 1);
    assert_eq!(friends.options.top, Some(2));
    assert_eq!(friends.options.levels, Some(ExpandLevels::Max));
    assert_eq!(friends.options.search.as_deref(), Some("blue green"));

    let nested = friends.expand.as_ref().unwrap();
    assert_eq!(path_names(&nested.terms[0].path), vec!["Pets"]);
    assert!(nested.terms[0].options.select.is_some());

    assert_eq!(path_names(&expand.terms[1].path), vec!["BestFriend", "$ref"]);
}

#[test]
fn expand_rejects_unknown_and_repeated_options() {
    let err = parse_expand("Friends($bogus=1)", &settings()).unwrap_err();
    assert!(matches!(err, SyntaxError::UnknownSystemOption { .. }));

    let err = parse_expand("Friends($top=1;$top=2)", &settings()).unwrap_err();
    assert!(matches!(err, SyntaxError::DuplicateSystemOption { .. }));

    let err = parse_expand("Friends($top=-1)", &settings()).unwrap_err();
    assert!(matches!(err, SyntaxError::InvalidOptionValue { .. }));
}

#[test]
fn expand_nesting_is_limited() {
    let limited = UriSettings::default().with_max_select_expand_depth(2);
    let err = parse_expand("A($expand=B($expand=C))", &limited).unwrap_err();

    assert!(matches!(err, SyntaxError::RecursionLimitExceeded { limit: 2 }));
    assert!(parse_expand("A($expand=B)", &limited).is_ok());
}

//
// query descriptor
//

#[test]
fn query_keeps_option_order_and_decodes_values() {
    let query = parse_query(
        "People?$top=2&custom=x%20y&$filter=Name%20eq%20'a%27%27b'&$inlinecount=allpages",
        &settings(),
    )
    .unwrap();

    assert!(query.path.is_some());
    assert!(matches!(query.options[0], QueryOptionClause::Top(2)));
    assert!(matches!(
        &query.options[1],
        QueryOptionClause::Custom(option) if option.value == "x y"
    ));
    assert!(matches!(query.options[2], QueryOptionClause::Filter(_)));
    assert!(matches!(
        query.options[3],
        QueryOptionClause::InlineCount(InlineCountKind::AllPages)
    ));
}

#[test]
fn query_rejects_unknown_and_duplicate_system_options() {
    let err = parse_query("People?$nope=1", &settings()).unwrap_err();
    assert!(matches!(err, SyntaxError::UnknownSystemOption { .. }));

    let err = parse_query("People?$top=1&$top=2", &settings()).unwrap_err();
    assert!(matches!(err, SyntaxError::DuplicateSystemOption { .. }));

    let err = parse_query("People?$filter=%FF", &settings()).unwrap_err();
    assert!(matches!(err, SyntaxError::InvalidPercentEncoding { .. }));
}

#[test]
fn literal_parses_alone() {
    let literal = parse_literal("100.0").unwrap();
    assert_eq!(literal.value, LiteralValue::Double(100.0));

    assert!(parse_literal("1 2").is_err());
    assert!(parse_literal("Name").is_err());
}
