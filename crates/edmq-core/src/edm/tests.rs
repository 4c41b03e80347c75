use super::*;
use crate::{
    obs::sink::{QueryEvent, QuerySink, with_sink},
    test_fixtures::{entity, fixture_model},
};
use edmq_primitives::PrimitiveKind;
use std::cell::RefCell;

#[derive(Default)]
struct CaptureSink {
    events: RefCell<Vec<QueryEvent>>,
}

impl QuerySink for CaptureSink {
    fn record(&self, event: QueryEvent) {
        self.events.borrow_mut().push(event);
    }
}

//
// exact lookups
//

#[test]
fn exact_lookups_are_case_sensitive() {
    let model = fixture_model();

    assert!(model.find_entity_type("Test.Person").is_some());
    assert!(model.find_entity_type("test.person").is_none());
    assert!(model.find_entity_type("Test.Address").is_none());
    assert!(model.find_enum_type("Test.WeekDay").is_some());
    assert_eq!(model.find_operations("Test.GetAge").len(), 1);
    assert!(model.find_operations("Test.Missing").is_empty());
    assert!(model.find_term("Test.Description").is_some());
}

#[test]
fn navigation_sources_resolve_by_exact_name() {
    let model = fixture_model();

    let set = model.find_navigation_source("PencilSet").unwrap();
    assert!(set.is_collection());
    let singleton = model.find_navigation_source("PENCILSET").unwrap();
    assert!(!singleton.is_collection());
    assert_eq!(set.entity_type().full_name(), "Test.Pencil");
    assert_eq!(singleton.entity_type().full_name(), "Test.Pencil");

    let people = model.find_navigation_source("People").unwrap();
    assert_eq!(people.navigation_target("Pets"), Some("Pets"));
    assert_eq!(people.navigation_target("Nope"), None);

    let imports = model.find_operation_imports("GetTopPeople");
    assert_eq!(imports.len(), 1);
    assert_eq!(imports[0].entity_set(), Some("People"));
}

//
// inheritance
//

#[test]
fn keys_and_members_are_inherited() {
    let model = fixture_model();
    let manager = entity(&model, "Test.Manager");

    assert_eq!(manager.key(), ["Id".to_string()]);
    assert_eq!(manager.key_properties().len(), 1);
    assert!(matches!(
        manager.find_property("Reports"),
        Some(PropertyRef::Navigation(_))
    ));
    assert!(matches!(
        manager.find_property("Name"),
        Some(PropertyRef::Structural(_))
    ));

    let names: Vec<&str> = manager.properties().iter().map(|p| p.name()).collect();
    assert_eq!(names.first(), Some(&"Id"));
    assert_eq!(names.last(), Some(&"Budget"));
    assert_eq!(manager.ancestry().count(), 3);
}

#[test]
fn composite_keys_keep_declaration_order() {
    let model = fixture_model();
    let line = entity(&model, "Test.OrderLine");

    let names: Vec<&str> = line.key_properties().iter().map(|p| p.name()).collect();
    assert_eq!(names, vec!["OrderId", "LineNo"]);
}

#[test]
fn derived_types_include_indirect_descendants() {
    let model = fixture_model();
    let person = StructuredType::Entity(entity(&model, "Test.Person"));

    let mut names: Vec<String> = model
        .derived_types(&person)
        .iter()
        .map(|ty| ty.full_name().to_string())
        .collect();
    names.sort();
    assert_eq!(names, vec!["Test.Employee", "Test.Manager"]);
}

#[test]
fn open_flag_is_inherited() {
    let model = fixture_model();

    assert!(entity(&model, "Test.Bag").is_open());
    assert!(!entity(&model, "Test.Person").is_open());
}

//
// elements
//

#[test]
fn elements_list_schema_members_before_container_members() {
    let model = fixture_model();
    let elements = model.elements();

    let first_container = elements
        .iter()
        .position(|e| matches!(e, SchemaElement::EntitySet(_)))
        .unwrap();
    assert!(elements[..first_container].iter().all(|e| !matches!(
        e,
        SchemaElement::EntitySet(_)
            | SchemaElement::Singleton(_)
            | SchemaElement::ActionImport(_)
            | SchemaElement::FunctionImport(_)
    )));

    assert!(
        elements
            .iter()
            .any(|e| matches!(e, SchemaElement::Action(op) if op.name() == "Promote"))
    );
    assert_eq!(
        elements
            .iter()
            .filter(|e| matches!(e, SchemaElement::FunctionImport(_)))
            .count(),
        2
    );
}

//
// normalized index
//

#[test]
fn index_lookups_ignore_case() {
    let model = fixture_model();
    let index = model.index();

    let types = index.find_schema_types("TEST.PERSON").unwrap();
    assert_eq!(types.len(), 1);
    assert_eq!(types[0].full_name(), "Test.Person");

    assert_eq!(index.find_operations("test.getage").unwrap().len(), 1);
    assert_eq!(index.find_terms("test.DESCRIPTION").unwrap().len(), 1);
    assert_eq!(index.find_operation_imports("gettoppeople").unwrap().len(), 1);
    assert!(index.find_schema_types("Test.Nothing").is_none());
}

#[test]
fn index_keeps_every_case_variant() {
    let model = fixture_model();

    let sources = model.index().find_navigation_sources("pencilset").unwrap();
    let mut names: Vec<&str> = sources.iter().map(NavigationSource::name).collect();
    names.sort_unstable();
    assert_eq!(names, vec!["PENCILSET", "PencilSet"]);
}

#[test]
fn index_without_container_has_no_sources() {
    let mut builder = EdmModel::builder();
    builder.entity_type(
        EntityType::new("NS", "Thing")
            .with_key(["Id"])
            .with_property("Id", TypeRef::primitive(PrimitiveKind::Int32, false)),
    );
    let model = builder.build();

    assert!(model.container().is_none());
    assert!(model.index().find_navigation_sources("Things").is_none());
    assert!(model.index().find_operation_imports("Anything").is_none());
    assert!(model.index().find_schema_types("ns.thing").is_some());
}

#[test]
fn index_is_built_once() {
    let model = fixture_model();
    let capture = CaptureSink::default();

    with_sink(&capture, || {
        let _ = model.index();
        let _ = model.index().find_schema_types("test.pet");
    });

    let events = capture.events.borrow();
    assert_eq!(
        events.as_slice(),
        &[QueryEvent::IndexBuilt {
            schema_types: 10,
            operations: 4,
            navigation_sources: 6,
        }]
    );
}

#[test]
fn duplicate_container_names_keep_the_first_member() {
    let mut builder = EdmModel::builder();
    let thing = builder.entity_type(
        EntityType::new("NS", "Thing")
            .with_key(["Id"])
            .with_property("Id", TypeRef::primitive(PrimitiveKind::Int32, false)),
    );
    builder.container("NS", "Container");
    builder.entity_set(EntitySet::new("Things", &thing));
    builder.singleton(Singleton::new("Things", &thing));
    let model = builder.build();

    assert!(model.find_navigation_source("Things").unwrap().is_collection());
    assert_eq!(model.index().find_navigation_sources("things").unwrap().len(), 2);
}
