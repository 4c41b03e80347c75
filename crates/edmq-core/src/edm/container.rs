use crate::edm::{EntityType, Operation, OperationKind};
use std::{collections::BTreeMap, sync::Arc};

///
/// EntitySet
///
/// Navigation targets map a navigation property name to the name of the
/// entity set or singleton its related entities live in.
///

#[derive(Clone, Debug, PartialEq)]
pub struct EntitySet {
    name: String,
    entity_type: Arc<EntityType>,
    navigation_targets: BTreeMap<String, String>,
}

impl EntitySet {
    #[must_use]
    pub fn new(name: impl Into<String>, entity_type: &Arc<EntityType>) -> Self {
        Self {
            name: name.into(),
            entity_type: Arc::clone(entity_type),
            navigation_targets: BTreeMap::new(),
        }
    }

    #[must_use]
    pub fn with_navigation_target(
        mut self,
        navigation: impl Into<String>,
        target: impl Into<String>,
    ) -> Self {
        self.navigation_targets
            .insert(navigation.into(), target.into());
        self
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[must_use]
    pub const fn entity_type(&self) -> &Arc<EntityType> {
        &self.entity_type
    }

    #[must_use]
    pub fn navigation_target(&self, navigation: &str) -> Option<&str> {
        self.navigation_targets.get(navigation).map(String::as_str)
    }
}

///
/// Singleton
///

#[derive(Clone, Debug, PartialEq)]
pub struct Singleton {
    name: String,
    entity_type: Arc<EntityType>,
    navigation_targets: BTreeMap<String, String>,
}

impl Singleton {
    #[must_use]
    pub fn new(name: impl Into<String>, entity_type: &Arc<EntityType>) -> Self {
        Self {
            name: name.into(),
            entity_type: Arc::clone(entity_type),
            navigation_targets: BTreeMap::new(),
        }
    }

    #[must_use]
    pub fn with_navigation_target(
        mut self,
        navigation: impl Into<String>,
        target: impl Into<String>,
    ) -> Self {
        self.navigation_targets
            .insert(navigation.into(), target.into());
        self
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[must_use]
    pub const fn entity_type(&self) -> &Arc<EntityType> {
        &self.entity_type
    }

    #[must_use]
    pub fn navigation_target(&self, navigation: &str) -> Option<&str> {
        self.navigation_targets.get(navigation).map(String::as_str)
    }
}

///
/// NavigationSource
///
/// Container member that entities are addressed through.
///

#[derive(Clone, Debug, PartialEq)]
pub enum NavigationSource {
    EntitySet(Arc<EntitySet>),
    Singleton(Arc<Singleton>),
}

impl NavigationSource {
    #[must_use]
    pub fn name(&self) -> &str {
        match self {
            Self::EntitySet(set) => set.name(),
            Self::Singleton(singleton) => singleton.name(),
        }
    }

    #[must_use]
    pub fn entity_type(&self) -> &Arc<EntityType> {
        match self {
            Self::EntitySet(set) => set.entity_type(),
            Self::Singleton(singleton) => singleton.entity_type(),
        }
    }

    #[must_use]
    pub fn navigation_target(&self, navigation: &str) -> Option<&str> {
        match self {
            Self::EntitySet(set) => set.navigation_target(navigation),
            Self::Singleton(singleton) => singleton.navigation_target(navigation),
        }
    }

    /// Entity sets address many entities, singletons exactly one.
    #[must_use]
    pub const fn is_collection(&self) -> bool {
        matches!(self, Self::EntitySet(_))
    }
}

///
/// OperationImport
///
/// Container-level entry point for an unbound action or function.
///

#[derive(Clone, Debug, PartialEq)]
pub struct OperationImport {
    name: String,
    operation: Arc<Operation>,
    entity_set: Option<String>,
}

impl OperationImport {
    #[must_use]
    pub fn new(name: impl Into<String>, operation: &Arc<Operation>) -> Self {
        Self {
            name: name.into(),
            operation: Arc::clone(operation),
            entity_set: None,
        }
    }

    /// Entity set that results of the import are drawn from.
    #[must_use]
    pub fn with_entity_set(mut self, entity_set: impl Into<String>) -> Self {
        self.entity_set = Some(entity_set.into());
        self
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[must_use]
    pub const fn operation(&self) -> &Arc<Operation> {
        &self.operation
    }

    #[must_use]
    pub fn kind(&self) -> OperationKind {
        self.operation.kind()
    }

    #[must_use]
    pub fn entity_set(&self) -> Option<&str> {
        self.entity_set.as_deref()
    }
}

///
/// EntityContainer
///
/// Members in declaration order plus exact-name lookup maps.
///

#[derive(Clone, Debug, Default)]
pub struct EntityContainer {
    namespace: String,
    name: String,
    entity_sets: Vec<Arc<EntitySet>>,
    singletons: Vec<Arc<Singleton>>,
    operation_imports: Vec<Arc<OperationImport>>,
    sources_by_name: BTreeMap<String, NavigationSource>,
    imports_by_name: BTreeMap<String, Vec<Arc<OperationImport>>>,
}

impl EntityContainer {
    #[must_use]
    pub fn new(namespace: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            namespace: namespace.into(),
            name: name.into(),
            ..Self::default()
        }
    }

    pub(crate) fn rename(&mut self, namespace: String, name: String) {
        self.namespace = namespace;
        self.name = name;
    }

    pub(crate) fn add_entity_set(&mut self, set: EntitySet) -> Arc<EntitySet> {
        let set = Arc::new(set);
        self.sources_by_name
            .entry(set.name().to_string())
            .or_insert_with(|| NavigationSource::EntitySet(Arc::clone(&set)));
        self.entity_sets.push(Arc::clone(&set));

        set
    }

    pub(crate) fn add_singleton(&mut self, singleton: Singleton) -> Arc<Singleton> {
        let singleton = Arc::new(singleton);
        self.sources_by_name
            .entry(singleton.name().to_string())
            .or_insert_with(|| NavigationSource::Singleton(Arc::clone(&singleton)));
        self.singletons.push(Arc::clone(&singleton));

        singleton
    }

    pub(crate) fn add_operation_import(&mut self, import: OperationImport) -> Arc<OperationImport> {
        let import = Arc::new(import);
        self.imports_by_name
            .entry(import.name().to_string())
            .or_default()
            .push(Arc::clone(&import));
        self.operation_imports.push(Arc::clone(&import));

        import
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
    pub fn entity_sets(&self) -> &[Arc<EntitySet>] {
        &self.entity_sets
    }

    #[must_use]
    pub fn singletons(&self) -> &[Arc<Singleton>] {
        &self.singletons
    }

    #[must_use]
    pub fn operation_imports(&self) -> &[Arc<OperationImport>] {
        &self.operation_imports
    }

    /// Entity sets then singletons, in declaration order.
    #[must_use]
    pub fn navigation_sources(&self) -> Vec<NavigationSource> {
        self.entity_sets
            .iter()
            .cloned()
            .map(NavigationSource::EntitySet)
            .chain(self.singletons.iter().cloned().map(NavigationSource::Singleton))
            .collect()
    }

    #[must_use]
    pub fn find_navigation_source(&self, name: &str) -> Option<&NavigationSource> {
        self.sources_by_name.get(name)
    }

    #[must_use]
    pub fn find_operation_imports(&self, name: &str) -> &[Arc<OperationImport>] {
        self.imports_by_name.get(name).map_or(&[], Vec::as_slice)
    }
}
