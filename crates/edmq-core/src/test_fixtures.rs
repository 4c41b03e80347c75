use crate::edm::{
    ComplexType, EdmModel, EntitySet, EntityType, EnumType, Multiplicity, Operation,
    OperationImport, Singleton, Term, TypeRef,
};
use edmq_primitives::PrimitiveKind;

///
/// fixture_model
///
/// People/pets/employees schema shared by unit tests.
///
/// - `Test.WeekDay` plain enum, `Test.EmployeeType` flags enum
///   (`None=0, FullTime=2, PartTime=4, Contractor=8, Intern=16`).
/// - `Test.Person` <- `Test.Employee` <- `Test.Manager`.
/// - `PencilSet` entity set and `PENCILSET` singleton differ only by case.
///

pub(crate) fn fixture_model() -> EdmModel {
    let mut b = EdmModel::builder();

    let week_day = b.enum_type(
        EnumType::new("Test", "WeekDay")
            .with_member("Monday", 0)
            .with_member("Tuesday", 1)
            .with_member("Wednesday", 2)
            .with_member("Thursday", 3)
            .with_member("Friday", 4)
            .with_member("Saturday", 5)
            .with_member("Sunday", 6),
    );
    let employee_type = b.enum_type(
        EnumType::new("Test", "EmployeeType")
            .flags()
            .with_member("None", 0)
            .with_member("FullTime", 2)
            .with_member("PartTime", 4)
            .with_member("Contractor", 8)
            .with_member("Intern", 16),
    );

    let address = b.complex_type(
        ComplexType::new("Test", "Address")
            .with_property("Street", TypeRef::string(true))
            .with_property("City", TypeRef::string(true))
            .with_property(
                "Location",
                TypeRef::spatial(PrimitiveKind::GeographyPoint, true),
            ),
    );

    let person = b.entity_type(
        EntityType::new("Test", "Person")
            .with_key(["Id"])
            .with_property("Id", TypeRef::primitive(PrimitiveKind::Int32, false))
            .with_property("Name", TypeRef::string(true))
            .with_property(
                "Birthdate",
                TypeRef::temporal(PrimitiveKind::DateTimeOffset, true),
            )
            .with_property("Age", TypeRef::primitive(PrimitiveKind::Int32, true))
            .with_property("Score", TypeRef::primitive(PrimitiveKind::Double, true))
            .with_property("Salary", TypeRef::decimal(true))
            .with_property("Photo", TypeRef::binary(true))
            .with_property("Kind", TypeRef::enumeration(&employee_type, true))
            .with_property("FavoriteDay", TypeRef::enumeration(&week_day, true))
            .with_property("HomeAddress", TypeRef::complex(&address, true))
            .with_property("Emails", TypeRef::collection(TypeRef::string(false)))
            .with_navigation("Friends", "Test.Person", Multiplicity::Many)
            .with_navigation("BestFriend", "Test.Person", Multiplicity::ZeroOrOne)
            .with_navigation("Pets", "Test.Pet", Multiplicity::Many),
    );
    let employee = b.entity_type(
        EntityType::new("Test", "Employee")
            .with_base(&person)
            .with_property("Department", TypeRef::string(true))
            .with_navigation("Reports", "Test.Employee", Multiplicity::Many),
    );
    let _manager = b.entity_type(
        EntityType::new("Test", "Manager")
            .with_base(&employee)
            .with_property("Budget", TypeRef::decimal(false)),
    );
    let pet = b.entity_type(
        EntityType::new("Test", "Pet")
            .with_key(["Id"])
            .with_property("Id", TypeRef::primitive(PrimitiveKind::Int64, false))
            .with_property("Name", TypeRef::string(true))
            .with_property("Species", TypeRef::string(true))
            .with_navigation("Owner", "Test.Person", Multiplicity::One),
    );
    let order_line = b.entity_type(
        EntityType::new("Test", "OrderLine")
            .with_key(["OrderId", "LineNo"])
            .with_property("OrderId", TypeRef::primitive(PrimitiveKind::Int32, false))
            .with_property("LineNo", TypeRef::primitive(PrimitiveKind::Int32, false))
            .with_property("Quantity", TypeRef::primitive(PrimitiveKind::Int16, false)),
    );
    let bag = b.entity_type(
        EntityType::new("Test", "Bag")
            .with_key(["Id"])
            .with_property("Id", TypeRef::primitive(PrimitiveKind::Guid, false))
            .open(),
    );
    let pencil = b.entity_type(
        EntityType::new("Test", "Pencil")
            .with_key(["Id"])
            .with_property("Id", TypeRef::primitive(PrimitiveKind::Int32, false)),
    );

    let top_people = b.operation(
        Operation::function("Test", "GetTopPeople")
            .with_parameter("count", TypeRef::primitive(PrimitiveKind::Int32, false))
            .returns(TypeRef::collection(TypeRef::entity(&person, false)))
            .composable(),
    );
    let rating = b.operation(
        Operation::function("Test", "GetRating")
            .with_parameter("id", TypeRef::primitive(PrimitiveKind::Int32, false))
            .returns(TypeRef::primitive(PrimitiveKind::Double, false)),
    );
    b.operation(
        Operation::function("Test", "GetAge")
            .bound()
            .with_parameter("person", TypeRef::entity(&person, false))
            .returns(TypeRef::primitive(PrimitiveKind::Int32, false)),
    );
    b.operation(
        Operation::action("Test", "Promote")
            .bound()
            .with_parameter("employee", TypeRef::entity(&employee, false)),
    );
    b.term(Term::new("Test", "Description", TypeRef::string(true)));

    b.container("Test", "Container");
    b.entity_set(
        EntitySet::new("People", &person)
            .with_navigation_target("Friends", "People")
            .with_navigation_target("BestFriend", "People")
            .with_navigation_target("Pets", "Pets")
            .with_navigation_target("Reports", "People"),
    );
    b.entity_set(EntitySet::new("Pets", &pet).with_navigation_target("Owner", "People"));
    b.entity_set(EntitySet::new("OrderLines", &order_line));
    b.entity_set(EntitySet::new("Bags", &bag));
    b.entity_set(EntitySet::new("PencilSet", &pencil));
    b.singleton(Singleton::new("PENCILSET", &pencil));
    b.singleton(
        Singleton::new("Me", &person)
            .with_navigation_target("Friends", "People")
            .with_navigation_target("Pets", "Pets"),
    );
    b.operation_import(OperationImport::new("GetTopPeople", &top_people).with_entity_set("People"));
    b.operation_import(OperationImport::new("GetRating", &rating));

    b.build()
}

/// Entity type by qualified name from the fixture model.
pub(crate) fn entity(model: &EdmModel, name: &str) -> std::sync::Arc<EntityType> {
    model
        .find_entity_type(name)
        .cloned()
        .unwrap_or_else(|| panic!("fixture type {name} missing"))
}
