use edmq::{
    Error, ErrorKind, ErrorOrigin, RequestErrorKind, canonicalize_uri, parse_uri, parse_uri_with,
    prelude::*,
};

fn library() -> EdmModel {
    let mut b = EdmModel::builder();

    let author = b.entity_type(
        EntityType::new("Lib", "Author")
            .with_key(["Id"])
            .with_property("Id", TypeRef::primitive(PrimitiveKind::Int32, false))
            .with_property("Name", TypeRef::string(true)),
    );
    let book = b.entity_type(
        EntityType::new("Lib", "Book")
            .with_key(["Isbn"])
            .with_property("Isbn", TypeRef::string(false))
            .with_property("Title", TypeRef::string(true))
            .with_property("Pages", TypeRef::primitive(PrimitiveKind::Int32, true))
            .with_navigation("Author", "Lib.Author", Multiplicity::One),
    );

    b.container("Lib", "Library");
    b.entity_set(EntitySet::new("Books", &book).with_navigation_target("Author", "Authors"));
    b.entity_set(EntitySet::new("Authors", &author));

    b.build()
}

fn failure(uri: &str) -> Error {
    parse_uri(&library(), uri).unwrap_err()
}

#[test]
fn bound_uri_through_the_facade() {
    let parsed = parse_uri(
        &library(),
        "Books('0-19-852663-6')/Author?$select=Name",
    )
    .expect("uri binds");

    assert!(parsed.path.is_some());
    assert!(parsed.select_expand.is_some());
}

#[test]
fn failures_map_to_request_kinds() {
    let cases = [
        (
            "Books?$top=many",
            ErrorKind::Request(RequestErrorKind::Syntax),
            ErrorOrigin::Syntax,
        ),
        (
            "Books?$filter=Price%20gt%201",
            ErrorKind::Request(RequestErrorKind::Unresolved),
            ErrorOrigin::Bind,
        ),
        (
            "Books?$filter=Title",
            ErrorKind::Request(RequestErrorKind::Type),
            ErrorOrigin::Bind,
        ),
        (
            "Books?$expand=Title",
            ErrorKind::Request(RequestErrorKind::Shape),
            ErrorOrigin::Bind,
        ),
    ];

    for (uri, kind, origin) in cases {
        let err = failure(uri);

        assert_eq!(err.kind, kind, "{uri}: {err}");
        assert_eq!(err.origin, origin, "{uri}");
        assert!(err.is_client_error());
    }
}

#[test]
fn limits_surface_as_too_deep() {
    let settings = UriSettings::default().with_max_filter_depth(2);

    let err = parse_uri_with(
        &library(),
        settings,
        "Books?$filter=Pages%20add%201%20add%202%20gt%203",
    )
    .unwrap_err();

    assert_eq!(err.kind, ErrorKind::TooDeep);
}

#[test]
fn error_serializes_with_kind_and_origin() {
    let err = failure("Books?$filter=Title");

    let json = serde_json::to_value(&err).expect("error serializes");
    assert_eq!(json["origin"], "Bind");
    assert_eq!(json["kind"]["Request"], "Type");

    let back: Error = serde_json::from_value(json).expect("error deserializes");
    assert_eq!(back, err);
}

#[test]
fn kind_display_names_the_request_class() {
    assert_eq!(
        ErrorKind::Request(RequestErrorKind::Shape).to_string(),
        "request(Shape)"
    );
    assert_eq!(ErrorKind::Internal.to_string(), "Internal");
}

#[test]
fn canonical_form_escapes_and_orders_options() {
    let uri = canonicalize_uri("Books?$filter=Title eq 'A B'&$top=1", &UriSettings::default())
        .expect("uri renders");

    assert_eq!(uri, "Books?$filter=Title%20eq%20'A%20B'&$top=1");
}

#[test]
fn version_is_exported() {
    assert!(!edmq::VERSION.is_empty());
}
