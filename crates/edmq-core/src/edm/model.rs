use crate::edm::{
    ComplexType, EntityContainer, EntitySet, EntityType, EnumType, NavigationSource, Operation,
    OperationImport, OperationKind, Singleton, StructuredType, Term, TypeKind,
    index::NormalizedModelIndex,
};
use std::{
    collections::BTreeMap,
    sync::{Arc, OnceLock},
};

///
/// SchemaType
///
/// Named type declared in a schema.
///

#[derive(Clone, Debug, PartialEq)]
pub enum SchemaType {
    Entity(Arc<EntityType>),
    Complex(Arc<ComplexType>),
    Enum(Arc<EnumType>),
}

impl SchemaType {
    #[must_use]
    pub fn full_name(&self) -> &str {
        match self {
            Self::Entity(ty) => ty.full_name(),
            Self::Complex(ty) => ty.full_name(),
            Self::Enum(ty) => ty.full_name(),
        }
    }

    #[must_use]
    pub const fn kind(&self) -> TypeKind {
        match self {
            Self::Entity(_) => TypeKind::Entity,
            Self::Complex(_) => TypeKind::Complex,
            Self::Enum(_) => TypeKind::Enum,
        }
    }

    #[must_use]
    pub fn as_structured(&self) -> Option<StructuredType> {
        match self {
            Self::Entity(ty) => Some(StructuredType::Entity(Arc::clone(ty))),
            Self::Complex(ty) => Some(StructuredType::Complex(Arc::clone(ty))),
            Self::Enum(_) => None,
        }
    }

    #[must_use]
    pub const fn as_enum(&self) -> Option<&Arc<EnumType>> {
        match self {
            Self::Enum(ty) => Some(ty),
            _ => None,
        }
    }
}

///
/// SchemaElement
///
/// Every kind of named element a model holds.
///

#[derive(Clone, Debug, PartialEq)]
pub enum SchemaElement {
    EntityType(Arc<EntityType>),
    ComplexType(Arc<ComplexType>),
    EnumType(Arc<EnumType>),
    Term(Arc<Term>),
    Action(Arc<Operation>),
    Function(Arc<Operation>),
    EntitySet(Arc<EntitySet>),
    Singleton(Arc<Singleton>),
    ActionImport(Arc<OperationImport>),
    FunctionImport(Arc<OperationImport>),
}

impl SchemaElement {
    /// Qualified name for schema members, simple name for container members.
    #[must_use]
    pub fn name(&self) -> &str {
        match self {
            Self::EntityType(ty) => ty.full_name(),
            Self::ComplexType(ty) => ty.full_name(),
            Self::EnumType(ty) => ty.full_name(),
            Self::Term(term) => term.full_name(),
            Self::Action(op) | Self::Function(op) => op.full_name(),
            Self::EntitySet(set) => set.name(),
            Self::Singleton(singleton) => singleton.name(),
            Self::ActionImport(import) | Self::FunctionImport(import) => import.name(),
        }
    }
}

///
/// EdmModel
///
/// Read-only schema consumed by the binder. Exact-name maps are built
/// eagerly; the case-insensitive index is built once, on first use.
///

#[derive(Debug)]
pub struct EdmModel {
    types: Vec<SchemaType>,
    operations: Vec<Arc<Operation>>,
    terms: Vec<Arc<Term>>,
    container: Option<EntityContainer>,
    types_by_name: BTreeMap<String, SchemaType>,
    operations_by_name: BTreeMap<String, Vec<Arc<Operation>>>,
    terms_by_name: BTreeMap<String, Arc<Term>>,
    index: OnceLock<NormalizedModelIndex>,
}

impl EdmModel {
    #[must_use]
    pub fn builder() -> EdmModelBuilder {
        EdmModelBuilder::default()
    }

    #[must_use]
    pub fn schema_types(&self) -> &[SchemaType] {
        &self.types
    }

    #[must_use]
    pub fn operations(&self) -> &[Arc<Operation>] {
        &self.operations
    }

    #[must_use]
    pub fn terms(&self) -> &[Arc<Term>] {
        &self.terms
    }

    #[must_use]
    pub const fn container(&self) -> Option<&EntityContainer> {
        self.container.as_ref()
    }

    /// Every element, schema members first, then container members.
    #[must_use]
    pub fn elements(&self) -> Vec<SchemaElement> {
        let mut elements: Vec<SchemaElement> = self
            .types
            .iter()
            .map(|ty| match ty {
                SchemaType::Entity(ty) => SchemaElement::EntityType(Arc::clone(ty)),
                SchemaType::Complex(ty) => SchemaElement::ComplexType(Arc::clone(ty)),
                SchemaType::Enum(ty) => SchemaElement::EnumType(Arc::clone(ty)),
            })
            .collect();

        elements.extend(self.terms.iter().cloned().map(SchemaElement::Term));
        elements.extend(self.operations.iter().map(|op| match op.kind() {
            OperationKind::Action => SchemaElement::Action(Arc::clone(op)),
            OperationKind::Function => SchemaElement::Function(Arc::clone(op)),
        }));

        if let Some(container) = &self.container {
            elements.extend(
                container
                    .entity_sets()
                    .iter()
                    .cloned()
                    .map(SchemaElement::EntitySet),
            );
            elements.extend(
                container
                    .singletons()
                    .iter()
                    .cloned()
                    .map(SchemaElement::Singleton),
            );
            elements.extend(
                container
                    .operation_imports()
                    .iter()
                    .map(|import| match import.kind() {
                        OperationKind::Action => SchemaElement::ActionImport(Arc::clone(import)),
                        OperationKind::Function => {
                            SchemaElement::FunctionImport(Arc::clone(import))
                        }
                    }),
            );
        }

        elements
    }

    //
    // Exact-name lookups
    //

    #[must_use]
    pub fn find_type(&self, qualified_name: &str) -> Option<&SchemaType> {
        self.types_by_name.get(qualified_name)
    }

    #[must_use]
    pub fn find_entity_type(&self, qualified_name: &str) -> Option<&Arc<EntityType>> {
        match self.find_type(qualified_name) {
            Some(SchemaType::Entity(ty)) => Some(ty),
            _ => None,
        }
    }

    #[must_use]
    pub fn find_enum_type(&self, qualified_name: &str) -> Option<&Arc<EnumType>> {
        self.find_type(qualified_name).and_then(SchemaType::as_enum)
    }

    #[must_use]
    pub fn find_operations(&self, qualified_name: &str) -> &[Arc<Operation>] {
        self.operations_by_name
            .get(qualified_name)
            .map_or(&[], Vec::as_slice)
    }

    #[must_use]
    pub fn find_term(&self, qualified_name: &str) -> Option<&Arc<Term>> {
        self.terms_by_name.get(qualified_name)
    }

    #[must_use]
    pub fn find_navigation_source(&self, name: &str) -> Option<&NavigationSource> {
        self.container
            .as_ref()
            .and_then(|container| container.find_navigation_source(name))
    }

    #[must_use]
    pub fn find_operation_imports(&self, name: &str) -> &[Arc<OperationImport>] {
        self.container
            .as_ref()
            .map_or(&[], |container| container.find_operation_imports(name))
    }

    /// Types deriving directly or indirectly from `base`.
    #[must_use]
    pub fn derived_types(&self, base: &StructuredType) -> Vec<StructuredType> {
        self.types
            .iter()
            .filter_map(SchemaType::as_structured)
            .filter(|candidate| crate::semantics::inherits_from(candidate, base))
            .collect()
    }

    /// Case-insensitive index, built on first call.
    pub fn index(&self) -> &NormalizedModelIndex {
        self.index.get_or_init(|| NormalizedModelIndex::build(self))
    }
}

///
/// EdmModelBuilder
///
/// Collects declarations in order. Base types must be added before the
/// types that derive from them, since derived types hold them by `Arc`.
///

#[derive(Debug, Default)]
pub struct EdmModelBuilder {
    types: Vec<SchemaType>,
    operations: Vec<Arc<Operation>>,
    terms: Vec<Arc<Term>>,
    container: Option<EntityContainer>,
}

impl EdmModelBuilder {
    pub fn entity_type(&mut self, ty: EntityType) -> Arc<EntityType> {
        let ty = Arc::new(ty);
        self.types.push(SchemaType::Entity(Arc::clone(&ty)));
        ty
    }

    pub fn complex_type(&mut self, ty: ComplexType) -> Arc<ComplexType> {
        let ty = Arc::new(ty);
        self.types.push(SchemaType::Complex(Arc::clone(&ty)));
        ty
    }

    pub fn enum_type(&mut self, ty: EnumType) -> Arc<EnumType> {
        let ty = Arc::new(ty);
        self.types.push(SchemaType::Enum(Arc::clone(&ty)));
        ty
    }

    pub fn operation(&mut self, operation: Operation) -> Arc<Operation> {
        let operation = Arc::new(operation);
        self.operations.push(Arc::clone(&operation));
        operation
    }

    pub fn term(&mut self, term: Term) -> Arc<Term> {
        let term = Arc::new(term);
        self.terms.push(Arc::clone(&term));
        term
    }

    /// Name the entity container; members added before this keep their place.
    pub fn container(&mut self, namespace: impl Into<String>, name: impl Into<String>) -> &mut Self {
        let (namespace, name) = (namespace.into(), name.into());
        match &mut self.container {
            Some(existing) => existing.rename(namespace, name),
            None => self.container = Some(EntityContainer::new(namespace, name)),
        }

        self
    }

    fn container_mut(&mut self) -> &mut EntityContainer {
        self.container
            .get_or_insert_with(|| EntityContainer::new("Default", "Container"))
    }

    pub fn entity_set(&mut self, set: EntitySet) -> Arc<EntitySet> {
        self.container_mut().add_entity_set(set)
    }

    pub fn singleton(&mut self, singleton: Singleton) -> Arc<Singleton> {
        self.container_mut().add_singleton(singleton)
    }

    pub fn operation_import(&mut self, import: OperationImport) -> Arc<OperationImport> {
        self.container_mut().add_operation_import(import)
    }

    #[must_use]
    pub fn build(self) -> EdmModel {
        let mut types_by_name = BTreeMap::new();
        for ty in &self.types {
            types_by_name
                .entry(ty.full_name().to_string())
                .or_insert_with(|| ty.clone());
        }

        let mut operations_by_name: BTreeMap<String, Vec<Arc<Operation>>> = BTreeMap::new();
        for op in &self.operations {
            operations_by_name
                .entry(op.full_name().to_string())
                .or_default()
                .push(Arc::clone(op));
        }

        let mut terms_by_name = BTreeMap::new();
        for term in &self.terms {
            terms_by_name
                .entry(term.full_name().to_string())
                .or_insert_with(|| Arc::clone(term));
        }

        EdmModel {
            types: self.types,
            operations: self.operations,
            terms: self.terms,
            container: self.container,
            types_by_name,
            operations_by_name,
            terms_by_name,
            index: OnceLock::new(),
        }
    }
}
