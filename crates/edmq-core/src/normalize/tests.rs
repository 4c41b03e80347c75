use super::*;
use crate::syntax::{parser::parse_expand, token::PathSegmentToken};
use proptest::prelude::*;

fn settings() -> UriSettings {
    UriSettings::default()
}

fn normalized(text: &str) -> NormalizedExpand {
    let token = parse_expand(text, &settings()).expect("expand should parse");
    normalize_expand(token, &settings()).expect("expand should normalize")
}

fn chain(path: &str) -> SegmentChain {
    SegmentChain::new(path.split('/').map(PathStep::identifier).collect())
}

fn term(path: &str, nested: &[NormalizedExpandTerm]) -> NormalizedExpandTerm {
    let term = NormalizedExpandTerm::new(chain(path));
    if nested.is_empty() {
        term
    } else {
        term.with_expand(NormalizedExpand {
            terms: nested.to_vec(),
        })
    }
}

fn paths(expand: &NormalizedExpand) -> Vec<String> {
    expand.terms.iter().map(|t| t.path.to_string()).collect()
}

//
// path inversion
//

#[test]
fn leaf_to_root_chain_is_inverted() {
    let leaf = PathSegmentToken::segment(
        "City",
        Some(PathSegmentToken::segment(
            "HomeAddress",
            Some(PathSegmentToken::segment("Test.Employee", None)),
        )),
    );

    let chain = SegmentChain::from_leaf(leaf.clone());
    assert_eq!(chain.to_string(), "Test.Employee/HomeAddress/City");
    assert!(chain.first().unwrap().is_type_cast());
    assert_eq!(chain.to_leaf(), Some(leaf));
}

#[test]
fn long_chains_invert_without_recursion() {
    let leaf = (0..10_000).fold(None, |parent, i| {
        Some(PathSegmentToken::segment(format!("S{i}"), parent))
    });

    let chain = SegmentChain::from_leaf(leaf.unwrap());
    assert_eq!(chain.len(), 10_000);
    assert_eq!(chain.first(), Some(&PathStep::identifier("S0")));
}

#[test]
fn select_paths_are_root_first() {
    let select = crate::syntax::parser::parse_select("HomeAddress/City,*", &settings()).unwrap();
    let normalized = normalize_select(select);

    let items: Vec<String> = normalized.items.iter().map(ToString::to_string).collect();
    assert_eq!(items, vec!["HomeAddress/City", "*"]);
}

//
// hop splitting
//

#[test]
fn multi_hop_paths_become_nested_terms() {
    let expand = normalized("Friends/Pets($top=1)");

    assert_eq!(paths(&expand), vec!["Friends"]);
    let friends = &expand.terms[0];
    assert!(friends.options.is_empty());

    let nested = friends.expand.as_ref().unwrap();
    assert_eq!(paths(nested), vec!["Pets"]);
    assert_eq!(nested.terms[0].options.top, Some(1));
}

#[test]
fn type_casts_stay_with_the_following_hop() {
    let expand = normalized("Friends/Test.Employee/Reports");

    assert_eq!(paths(&expand), vec!["Friends"]);
    let nested = expand.terms[0].expand.as_ref().unwrap();
    assert_eq!(paths(nested), vec!["Test.Employee/Reports"]);
}

#[test]
fn trailing_cast_and_ref_join_the_last_hop() {
    let expand = normalized("Friends/Test.Employee/$ref,Test.Employee/Reports");

    assert_eq!(paths(&expand), vec!["Friends/Test.Employee/$ref", "Test.Employee/Reports"]);
    assert!(expand.terms[0].path.is_ref());
}

#[test]
fn nested_options_stay_on_the_innermost_term() {
    let expand = normalized("Friends/BestFriend($select=Name;$expand=Pets)");

    let best = &expand.terms[0].expand.as_ref().unwrap().terms[0];
    let select = best.options.select.as_ref().unwrap();
    assert_eq!(select.items[0].to_string(), "Name");
    assert_eq!(paths(best.expand.as_ref().unwrap()), vec!["Pets"]);
}

#[test]
fn depth_counts_split_hops() {
    let limited = UriSettings::default().with_max_expand_depth(2);

    let token = parse_expand("A/B/C", &settings()).unwrap();
    let err = normalize_expand(token, &limited).unwrap_err();
    assert_eq!(err, NormalizeError::RecursionLimitExceeded { limit: 2 });
    assert_eq!(err.class(), ErrorClass::TooDeep);

    let token = parse_expand("A($expand=B)", &settings()).unwrap();
    assert_eq!(normalize_expand(token, &limited).unwrap().depth(), 2);
}

//
// combining
//

#[test]
fn duplicate_terms_are_merged_recursively() {
    let expand = normalized("Friends($expand=Pets),Friends($expand=BestFriend),Friends/Pets/Owner");

    assert_eq!(paths(&expand), vec!["Friends"]);
    let nested = expand.terms[0].expand.as_ref().unwrap();
    assert_eq!(paths(nested), vec!["Pets", "BestFriend"]);

    let pets = nested.terms[0].expand.as_ref().unwrap();
    assert_eq!(paths(pets), vec!["Owner"]);
}

#[test]
fn populated_side_wins_over_empty_side() {
    let expand = normalized("Friends,Friends($expand=Pets)");

    assert_eq!(expand.terms.len(), 1);
    assert_eq!(paths(expand.terms[0].expand.as_ref().unwrap()), vec!["Pets"]);
}

#[test]
fn first_term_options_win() {
    let expand = normalized("Friends($top=1),Friends($top=5;$skip=2)");

    let options = &expand.terms[0].options;
    assert_eq!(options.top, Some(1));
    assert_eq!(options.skip, Some(2));
}

#[test]
fn different_paths_cannot_be_merged() {
    let err = merge_terms(term("Friends", &[]), term("Pets", &[])).unwrap_err();

    assert!(matches!(err, NormalizeError::IncompatibleTerms { .. }));
    assert_eq!(err.class(), ErrorClass::Internal);
}

#[test]
fn child_union_of_two_empty_terms_is_empty() {
    let union = combine_child_nodes(&term("Friends", &[]), &term("Friends", &[]));

    assert!(union.terms.is_empty());
}

#[test]
fn child_union_keeps_shared_terms_once() {
    let left = term("Friends", &[term("Pets", &[]), term("BestFriend", &[])]);
    let right = term("Friends", &[term("Pets", &[]), term("Reports", &[])]);

    let union = combine_child_nodes(&left, &right);
    assert_eq!(paths(&union), vec!["Pets", "BestFriend", "Reports"]);
}

//
// properties
//

const NAMES: [&str; 4] = ["A", "B", "C", "D"];

fn arb_term(depth: u32) -> BoxedStrategy<NormalizedExpandTerm> {
    let leaf = (0..NAMES.len()).prop_map(|i| term(NAMES[i], &[]));
    if depth == 0 {
        return leaf.boxed();
    }

    (0..NAMES.len(), prop::collection::vec(arb_term(depth - 1), 0..4))
        .prop_map(|(i, nested)| term(NAMES[i], &nested))
        .boxed()
}

fn arb_expand() -> impl Strategy<Value = NormalizedExpand> {
    prop::collection::vec(arb_term(2), 0..6).prop_map(|terms| NormalizedExpand { terms })
}

/// Every path reachable from `expand`, as root-first strings.
fn reachable(expand: &NormalizedExpand) -> Vec<String> {
    let mut out = Vec::new();
    let mut stack: Vec<(String, &NormalizedExpand)> = vec![(String::new(), expand)];

    while let Some((prefix, level)) = stack.pop() {
        for term in &level.terms {
            let path = format!("{prefix}/{}", term.path);
            if let Some(nested) = &term.expand {
                stack.push((path.clone(), nested));
            }
            out.push(path);
        }
    }
    out.sort();
    out.dedup();

    out
}

fn has_unique_paths(expand: &NormalizedExpand) -> bool {
    let mut seen = paths(expand);
    let total = seen.len();
    seen.sort();
    seen.dedup();

    seen.len() == total
        && expand
            .terms
            .iter()
            .filter_map(|t| t.expand.as_ref())
            .all(has_unique_paths)
}

proptest! {
    #[test]
    fn combine_keeps_every_path_exactly_once(expand in arb_expand()) {
        let combined = combine_terms(expand.clone()).unwrap();

        prop_assert!(has_unique_paths(&combined));
        prop_assert_eq!(reachable(&combined), reachable(&expand));
    }

    #[test]
    fn combine_is_stable(expand in arb_expand()) {
        let once = combine_terms(expand).unwrap();
        let twice = combine_terms(once.clone()).unwrap();

        prop_assert_eq!(once, twice);
    }
}
