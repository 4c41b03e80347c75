use crate::edm::TypeRef;
use edmq_primitives::PrimitiveKind;
use std::sync::Arc;

fn qualify(namespace: &str, name: &str) -> String {
    if namespace.is_empty() {
        name.to_string()
    } else {
        format!("{namespace}.{name}")
    }
}

///
/// StructuralProperty
///

#[derive(Clone, Debug, PartialEq)]
pub struct StructuralProperty {
    name: String,
    type_ref: TypeRef,
}

impl StructuralProperty {
    #[must_use]
    pub fn new(name: impl Into<String>, type_ref: TypeRef) -> Self {
        Self {
            name: name.into(),
            type_ref,
        }
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[must_use]
    pub const fn type_ref(&self) -> &TypeRef {
        &self.type_ref
    }
}

///
/// Multiplicity
///

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Multiplicity {
    ZeroOrOne,
    One,
    Many,
}

///
/// NavigationProperty
///
/// The target entity type is held by qualified name and resolved through
/// the model, so cyclic entity graphs need no reference cycles.
///

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct NavigationProperty {
    name: String,
    target: String,
    multiplicity: Multiplicity,
}

impl NavigationProperty {
    #[must_use]
    pub fn new(name: impl Into<String>, target: impl Into<String>, multiplicity: Multiplicity) -> Self {
        Self {
            name: name.into(),
            target: target.into(),
            multiplicity,
        }
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Qualified name of the target entity type.
    #[must_use]
    pub fn target(&self) -> &str {
        &self.target
    }

    #[must_use]
    pub const fn multiplicity(&self) -> Multiplicity {
        self.multiplicity
    }

    #[must_use]
    pub const fn is_collection(&self) -> bool {
        matches!(self.multiplicity, Multiplicity::Many)
    }
}

///
/// PropertyRef
///
/// A resolved member of a structured type.
///

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum PropertyRef<'a> {
    Structural(&'a StructuralProperty),
    Navigation(&'a NavigationProperty),
}

impl PropertyRef<'_> {
    #[must_use]
    pub fn name(&self) -> &str {
        match self {
            Self::Structural(p) => p.name(),
            Self::Navigation(p) => p.name(),
        }
    }
}

///
/// EntityType
///

#[derive(Clone, Debug, PartialEq)]
pub struct EntityType {
    namespace: String,
    name: String,
    full_name: String,
    base: Option<Arc<EntityType>>,
    key: Vec<String>,
    properties: Vec<StructuralProperty>,
    navigation_properties: Vec<NavigationProperty>,
    is_open: bool,
    is_abstract: bool,
}

impl EntityType {
    #[must_use]
    pub fn new(namespace: impl Into<String>, name: impl Into<String>) -> Self {
        let namespace = namespace.into();
        let name = name.into();

        Self {
            full_name: qualify(&namespace, &name),
            namespace,
            name,
            base: None,
            key: Vec::new(),
            properties: Vec::new(),
            navigation_properties: Vec::new(),
            is_open: false,
            is_abstract: false,
        }
    }

    #[must_use]
    pub fn with_base(mut self, base: &Arc<Self>) -> Self {
        self.base = Some(Arc::clone(base));
        self
    }

    #[must_use]
    pub fn with_key<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.key = names.into_iter().map(Into::into).collect();
        self
    }

    #[must_use]
    pub fn with_property(mut self, name: impl Into<String>, type_ref: TypeRef) -> Self {
        self.properties.push(StructuralProperty::new(name, type_ref));
        self
    }

    #[must_use]
    pub fn with_navigation(
        mut self,
        name: impl Into<String>,
        target: impl Into<String>,
        multiplicity: Multiplicity,
    ) -> Self {
        self.navigation_properties
            .push(NavigationProperty::new(name, target, multiplicity));
        self
    }

    #[must_use]
    pub const fn open(mut self) -> Self {
        self.is_open = true;
        self
    }

    #[must_use]
    pub const fn abstract_type(mut self) -> Self {
        self.is_abstract = true;
        self
    }

    #[must_use]
    pub fn namespace(&self) -> &str {
        &self.namespace
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[must_use]
    pub fn full_name(&self) -> &str {
        &self.full_name
    }

    #[must_use]
    pub const fn base_type(&self) -> Option<&Arc<Self>> {
        self.base.as_ref()
    }

    #[must_use]
    pub const fn is_abstract(&self) -> bool {
        self.is_abstract
    }

    /// Open when this type or any base is declared open.
    #[must_use]
    pub fn is_open(&self) -> bool {
        self.ancestry().any(|ty| ty.is_open)
    }

    /// This type followed by its base chain, most derived first.
    pub fn ancestry(&self) -> impl Iterator<Item = &Self> {
        std::iter::successors(Some(self), |ty| ty.base.as_deref())
    }

    /// Key property names, inherited from the nearest base that declares one.
    #[must_use]
    pub fn key(&self) -> &[String] {
        self.ancestry()
            .find(|ty| !ty.key.is_empty())
            .map_or(&[], |ty| ty.key.as_slice())
    }

    #[must_use]
    pub fn key_properties(&self) -> Vec<&StructuralProperty> {
        self.key()
            .iter()
            .filter_map(|name| match self.find_property(name) {
                Some(PropertyRef::Structural(p)) => Some(p),
                _ => None,
            })
            .collect()
    }

    #[must_use]
    pub fn declared_properties(&self) -> &[StructuralProperty] {
        &self.properties
    }

    #[must_use]
    pub fn declared_navigation_properties(&self) -> &[NavigationProperty] {
        &self.navigation_properties
    }

    /// Structural properties, base-most first.
    #[must_use]
    pub fn properties(&self) -> Vec<&StructuralProperty> {
        let mut chain: Vec<&Self> = self.ancestry().collect();
        chain.reverse();
        chain.into_iter().flat_map(|ty| ty.properties.iter()).collect()
    }

    /// Navigation properties, base-most first.
    #[must_use]
    pub fn navigation_properties(&self) -> Vec<&NavigationProperty> {
        let mut chain: Vec<&Self> = self.ancestry().collect();
        chain.reverse();
        chain
            .into_iter()
            .flat_map(|ty| ty.navigation_properties.iter())
            .collect()
    }

    /// Exact-name member lookup across the inheritance chain.
    #[must_use]
    pub fn find_property(&self, name: &str) -> Option<PropertyRef<'_>> {
        self.ancestry().find_map(|ty| {
            ty.properties
                .iter()
                .find(|p| p.name == name)
                .map(PropertyRef::Structural)
                .or_else(|| {
                    ty.navigation_properties
                        .iter()
                        .find(|p| p.name == name)
                        .map(PropertyRef::Navigation)
                })
        })
    }
}

///
/// ComplexType
///

#[derive(Clone, Debug, PartialEq)]
pub struct ComplexType {
    namespace: String,
    name: String,
    full_name: String,
    base: Option<Arc<ComplexType>>,
    properties: Vec<StructuralProperty>,
    is_open: bool,
}

impl ComplexType {
    #[must_use]
    pub fn new(namespace: impl Into<String>, name: impl Into<String>) -> Self {
        let namespace = namespace.into();
        let name = name.into();

        Self {
            full_name: qualify(&namespace, &name),
            namespace,
            name,
            base: None,
            properties: Vec::new(),
            is_open: false,
        }
    }

    #[must_use]
    pub fn with_base(mut self, base: &Arc<Self>) -> Self {
        self.base = Some(Arc::clone(base));
        self
    }

    #[must_use]
    pub fn with_property(mut self, name: impl Into<String>, type_ref: TypeRef) -> Self {
        self.properties.push(StructuralProperty::new(name, type_ref));
        self
    }

    #[must_use]
    pub const fn open(mut self) -> Self {
        self.is_open = true;
        self
    }

    #[must_use]
    pub fn namespace(&self) -> &str {
        &self.namespace
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[must_use]
    pub fn full_name(&self) -> &str {
        &self.full_name
    }

    #[must_use]
    pub const fn base_type(&self) -> Option<&Arc<Self>> {
        self.base.as_ref()
    }

    pub fn ancestry(&self) -> impl Iterator<Item = &Self> {
        std::iter::successors(Some(self), |ty| ty.base.as_deref())
    }

    #[must_use]
    pub fn is_open(&self) -> bool {
        self.ancestry().any(|ty| ty.is_open)
    }

    #[must_use]
    pub fn declared_properties(&self) -> &[StructuralProperty] {
        &self.properties
    }

    #[must_use]
    pub fn properties(&self) -> Vec<&StructuralProperty> {
        let mut chain: Vec<&Self> = self.ancestry().collect();
        chain.reverse();
        chain.into_iter().flat_map(|ty| ty.properties.iter()).collect()
    }

    #[must_use]
    pub fn find_property(&self, name: &str) -> Option<&StructuralProperty> {
        self.ancestry()
            .find_map(|ty| ty.properties.iter().find(|p| p.name == name))
    }
}

///
/// StructuredType
///
/// Entity or complex type, the owners of properties.
///

#[derive(Clone, Debug, PartialEq)]
pub enum StructuredType {
    Entity(Arc<EntityType>),
    Complex(Arc<ComplexType>),
}

impl StructuredType {
    #[must_use]
    pub fn full_name(&self) -> &str {
        match self {
            Self::Entity(ty) => ty.full_name(),
            Self::Complex(ty) => ty.full_name(),
        }
    }

    #[must_use]
    pub fn name(&self) -> &str {
        match self {
            Self::Entity(ty) => ty.name(),
            Self::Complex(ty) => ty.name(),
        }
    }

    #[must_use]
    pub fn namespace(&self) -> &str {
        match self {
            Self::Entity(ty) => ty.namespace(),
            Self::Complex(ty) => ty.namespace(),
        }
    }

    #[must_use]
    pub fn base_type(&self) -> Option<Self> {
        match self {
            Self::Entity(ty) => ty.base_type().cloned().map(Self::Entity),
            Self::Complex(ty) => ty.base_type().cloned().map(Self::Complex),
        }
    }

    #[must_use]
    pub fn is_open(&self) -> bool {
        match self {
            Self::Entity(ty) => ty.is_open(),
            Self::Complex(ty) => ty.is_open(),
        }
    }

    #[must_use]
    pub const fn as_entity(&self) -> Option<&Arc<EntityType>> {
        match self {
            Self::Entity(ty) => Some(ty),
            Self::Complex(_) => None,
        }
    }

    #[must_use]
    pub fn find_property(&self, name: &str) -> Option<PropertyRef<'_>> {
        match self {
            Self::Entity(ty) => ty.find_property(name),
            Self::Complex(ty) => ty.find_property(name).map(PropertyRef::Structural),
        }
    }

    /// All members (structural then navigation), base-most first.
    #[must_use]
    pub fn members(&self) -> Vec<PropertyRef<'_>> {
        match self {
            Self::Entity(ty) => ty
                .properties()
                .into_iter()
                .map(PropertyRef::Structural)
                .chain(
                    ty.navigation_properties()
                        .into_iter()
                        .map(PropertyRef::Navigation),
                )
                .collect(),
            Self::Complex(ty) => ty
                .properties()
                .into_iter()
                .map(PropertyRef::Structural)
                .collect(),
        }
    }

    /// Non-nullable reference to this type.
    #[must_use]
    pub fn to_type_ref(&self, nullable: bool) -> TypeRef {
        match self {
            Self::Entity(ty) => TypeRef::entity(ty, nullable),
            Self::Complex(ty) => TypeRef::complex(ty, nullable),
        }
    }
}

///
/// EnumMember
///

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct EnumMember {
    name: String,
    value: i64,
}

impl EnumMember {
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[must_use]
    pub const fn value(&self) -> i64 {
        self.value
    }
}

///
/// EnumType
///
/// Members keep declaration order; flags decomposition depends on it.
///

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct EnumType {
    namespace: String,
    name: String,
    full_name: String,
    underlying: PrimitiveKind,
    is_flags: bool,
    members: Vec<EnumMember>,
}

impl EnumType {
    #[must_use]
    pub fn new(namespace: impl Into<String>, name: impl Into<String>) -> Self {
        let namespace = namespace.into();
        let name = name.into();

        Self {
            full_name: qualify(&namespace, &name),
            namespace,
            name,
            underlying: PrimitiveKind::Int32,
            is_flags: false,
            members: Vec::new(),
        }
    }

    #[must_use]
    pub const fn with_underlying(mut self, kind: PrimitiveKind) -> Self {
        self.underlying = kind;
        self
    }

    #[must_use]
    pub const fn flags(mut self) -> Self {
        self.is_flags = true;
        self
    }

    #[must_use]
    pub fn with_member(mut self, name: impl Into<String>, value: i64) -> Self {
        self.members.push(EnumMember {
            name: name.into(),
            value,
        });
        self
    }

    #[must_use]
    pub fn namespace(&self) -> &str {
        &self.namespace
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[must_use]
    pub fn full_name(&self) -> &str {
        &self.full_name
    }

    #[must_use]
    pub const fn underlying(&self) -> PrimitiveKind {
        self.underlying
    }

    #[must_use]
    pub const fn is_flags(&self) -> bool {
        self.is_flags
    }

    #[must_use]
    pub fn members(&self) -> &[EnumMember] {
        &self.members
    }

    #[must_use]
    pub fn find_member(&self, name: &str) -> Option<&EnumMember> {
        self.members.iter().find(|m| m.name == name)
    }

    #[must_use]
    pub fn find_member_by_value(&self, value: i64) -> Option<&EnumMember> {
        self.members.iter().find(|m| m.value == value)
    }
}
