use super::*;
use crate::{
    edm::{EdmErrorCode, EdmLocation, NarrowKind, StructuredType, TypeRef},
    test_fixtures::{entity, fixture_model},
};
use edmq_primitives::{ALL_PRIMITIVE_KINDS, PrimitiveKind};
use proptest::prelude::*;
use std::borrow::Cow;

fn structured(model: &crate::edm::EdmModel, name: &str) -> StructuredType {
    StructuredType::Entity(entity(model, name))
}

#[test]
fn narrowing_same_shape_is_identity() {
    let string = TypeRef::string(true);
    let narrowed = string.as_string();

    assert!(matches!(narrowed, Cow::Borrowed(_)));
    match (&string, narrowed) {
        (TypeRef::String(original), Cow::Borrowed(borrowed)) => {
            assert!(std::ptr::eq(original, borrowed));
        }
        _ => panic!("expected borrowed string reference"),
    }
}

#[test]
fn narrowing_generic_primitive_builds_facet_reference() {
    let generic = TypeRef::primitive(PrimitiveKind::Decimal, true);
    let decimal = generic.as_decimal();

    assert!(matches!(decimal, Cow::Owned(_)));
    assert!(!decimal.is_bad());
    assert!(decimal.is_nullable());
    assert_eq!(decimal.precision(), None);
}

#[test]
fn narrowing_mismatch_yields_bad_reference() {
    let model = fixture_model();
    let person = TypeRef::entity(&entity(&model, "Test.Person"), false);

    let bad = person.as_decimal();
    assert!(bad.is_bad());
    assert!(!bad.is_nullable());

    let info = bad.bad_type().expect("bad reference carries its definition");
    assert_eq!(info.requested, NarrowKind::Decimal);
    assert_eq!(info.full_name, "Test.Person");
    assert_eq!(bad.errors().len(), 1);
    assert_eq!(
        bad.errors()[0].code,
        EdmErrorCode::TypeSemanticsCouldNotConvertTypeReference
    );
    assert_eq!(bad.errors()[0].location, EdmLocation::element("Test.Person"));
}

#[test]
fn narrowing_anonymous_type_uses_unnamed_location() {
    let collection = TypeRef::collection(TypeRef::string(false));
    let bad = collection.as_entity();

    assert_eq!(bad.errors()[0].location, EdmLocation::unnamed_type());
    assert_eq!(bad.bad_type().map(|b| b.full_name.as_str()), Some("Collection(Edm.String)"));
}

#[test]
fn primitive_kind_of_non_primitive_is_none() {
    let model = fixture_model();
    let person = TypeRef::entity(&entity(&model, "Test.Person"), false);

    assert_eq!(person.primitive_kind(), PrimitiveKind::None);
    assert_eq!(TypeRef::string(true).primitive_kind(), PrimitiveKind::String);
    assert!(TypeRef::spatial(PrimitiveKind::GeographyPoint, true).is_spatial());
    assert!(TypeRef::temporal(PrimitiveKind::Time, true).is_temporal());
}

#[test]
fn inheritance_is_strict_and_transitive() {
    let model = fixture_model();
    let person = structured(&model, "Test.Person");
    let employee = structured(&model, "Test.Employee");
    let manager = structured(&model, "Test.Manager");
    let pet = structured(&model, "Test.Pet");

    assert!(inherits_from(&manager, &person));
    assert!(inherits_from(&employee, &person));
    assert!(!inherits_from(&person, &person));
    assert!(!inherits_from(&person, &manager));
    assert!(is_or_inherits_from(&person, &person));
    assert!(!are_related(&pet, &person));
    assert!(are_related(&person, &manager));
}

#[test]
fn common_kind_searches_the_ladder() {
    assert_eq!(
        common_primitive_kind(PrimitiveKind::Int32, PrimitiveKind::Int64),
        Some(PrimitiveKind::Int64)
    );
    assert_eq!(
        common_primitive_kind(PrimitiveKind::Byte, PrimitiveKind::SByte),
        Some(PrimitiveKind::Int16)
    );
    assert_eq!(
        common_primitive_kind(PrimitiveKind::Double, PrimitiveKind::Decimal),
        None
    );
    assert!(
        promotion_cost(PrimitiveKind::Int32, PrimitiveKind::Double)
            < promotion_cost(PrimitiveKind::Int32, PrimitiveKind::Decimal)
    );
}

#[test]
fn equivalence_ignores_facets_but_not_nullability() {
    let a = TypeRef::string(true);
    let b = TypeRef::primitive(PrimitiveKind::String, true);
    let c = TypeRef::primitive(PrimitiveKind::String, false);

    assert!(a.is_equivalent_to(&b));
    assert!(!a.is_equivalent_to(&c));
    assert!(a.is_definition_equivalent(&c));
}

///
/// PROPERTIES
///

fn arb_type_ref() -> impl Strategy<Value = TypeRef> {
    let kinds = ALL_PRIMITIVE_KINDS.to_vec();

    prop_oneof![
        (prop::sample::select(kinds), any::<bool>())
            .prop_map(|(kind, nullable)| TypeRef::primitive(kind, nullable)),
        any::<bool>().prop_map(TypeRef::string),
        any::<bool>().prop_map(TypeRef::decimal),
        any::<bool>().prop_map(TypeRef::binary),
        any::<bool>().prop_map(|n| TypeRef::temporal(PrimitiveKind::DateTime, n)),
        any::<bool>().prop_map(|n| TypeRef::spatial(PrimitiveKind::GeometryPolygon, n)),
        Just(TypeRef::collection(TypeRef::string(false))),
    ]
}

proptest! {
    #[test]
    fn every_narrowing_is_total(t in arb_type_ref()) {
        let nullable = t.is_nullable();

        let checks = [
            (t.as_primitive().is_bad(), t.as_primitive().errors().len(), t.as_primitive().is_nullable()),
            (t.as_binary().is_bad(), t.as_binary().errors().len(), t.as_binary().is_nullable()),
            (t.as_decimal().is_bad(), t.as_decimal().errors().len(), t.as_decimal().is_nullable()),
            (t.as_string().is_bad(), t.as_string().errors().len(), t.as_string().is_nullable()),
            (t.as_temporal().is_bad(), t.as_temporal().errors().len(), t.as_temporal().is_nullable()),
            (t.as_spatial().is_bad(), t.as_spatial().errors().len(), t.as_spatial().is_nullable()),
            (t.as_entity().is_bad(), t.as_entity().errors().len(), t.as_entity().is_nullable()),
            (t.as_complex().is_bad(), t.as_complex().errors().len(), t.as_complex().is_nullable()),
            (t.as_structured().is_bad(), t.as_structured().errors().len(), t.as_structured().is_nullable()),
            (t.as_enum().is_bad(), t.as_enum().errors().len(), t.as_enum().is_nullable()),
            (t.as_collection().is_bad(), t.as_collection().errors().len(), t.as_collection().is_nullable()),
            (t.as_entity_reference().is_bad(), t.as_entity_reference().errors().len(), t.as_entity_reference().is_nullable()),
        ];

        for (is_bad, errors, narrowed_nullable) in checks {
            prop_assert_eq!(narrowed_nullable, nullable);
            prop_assert_eq!(is_bad, errors > 0);
        }
    }

    #[test]
    fn promotion_never_narrows(
        from in prop::sample::select(ALL_PRIMITIVE_KINDS.to_vec()),
        to in prop::sample::select(ALL_PRIMITIVE_KINDS.to_vec()),
    ) {
        if from.promotes_to(to) {
            prop_assert!(!to.promotes_to(from));
        }
    }
}
