use crate::{
    edm::{EdmModel, NavigationSource, Operation, OperationImport, SchemaType, Term},
    obs::sink::{self, QueryEvent},
};
use std::{collections::BTreeMap, sync::Arc};

///
/// NormalizedModelIndex
///
/// Case-insensitive name index over one model. Keys are lower-cased
/// names; every stored list is non-empty. Several entries under one key
/// are a same-name ambiguity left for the caller to resolve.
///

#[derive(Debug, Default)]
pub struct NormalizedModelIndex {
    schema_types: BTreeMap<String, Vec<SchemaType>>,
    operations: BTreeMap<String, Vec<Arc<Operation>>>,
    terms: BTreeMap<String, Vec<Arc<Term>>>,
    navigation_sources: Option<BTreeMap<String, Vec<NavigationSource>>>,
    operation_imports: Option<BTreeMap<String, Vec<Arc<OperationImport>>>>,
}

impl NormalizedModelIndex {
    pub(crate) fn build(model: &EdmModel) -> Self {
        let mut index = Self::default();

        for ty in model.schema_types() {
            push(&mut index.schema_types, ty.full_name(), ty.clone());
        }
        for op in model.operations() {
            push(&mut index.operations, op.full_name(), Arc::clone(op));
        }
        for term in model.terms() {
            push(&mut index.terms, term.full_name(), Arc::clone(term));
        }

        if let Some(container) = model.container() {
            let mut sources = BTreeMap::new();
            for source in container.navigation_sources() {
                let name = source.name().to_string();
                push(&mut sources, &name, source);
            }

            let mut imports = BTreeMap::new();
            for import in container.operation_imports() {
                push(&mut imports, import.name(), Arc::clone(import));
            }

            index.navigation_sources = Some(sources);
            index.operation_imports = Some(imports);
        }

        let navigation_sources = index.navigation_sources.as_ref().map_or(0, BTreeMap::len);
        tracing::debug!(
            schema_types = index.schema_types.len(),
            operations = index.operations.len(),
            navigation_sources,
            "built normalized model index"
        );
        sink::record(QueryEvent::IndexBuilt {
            schema_types: index.schema_types.len(),
            operations: index.operations.len(),
            navigation_sources,
        });

        index
    }

    /// Types whose qualified name matches ignoring case.
    #[must_use]
    pub fn find_schema_types(&self, qualified_name: &str) -> Option<&[SchemaType]> {
        lookup(&self.schema_types, qualified_name)
    }

    #[must_use]
    pub fn find_operations(&self, qualified_name: &str) -> Option<&[Arc<Operation>]> {
        lookup(&self.operations, qualified_name)
    }

    #[must_use]
    pub fn find_terms(&self, qualified_name: &str) -> Option<&[Arc<Term>]> {
        lookup(&self.terms, qualified_name)
    }

    /// Entity sets and singletons by simple name; `None` without a container.
    #[must_use]
    pub fn find_navigation_sources(&self, name: &str) -> Option<&[NavigationSource]> {
        self.navigation_sources
            .as_ref()
            .and_then(|map| lookup(map, name))
    }

    #[must_use]
    pub fn find_operation_imports(&self, name: &str) -> Option<&[Arc<OperationImport>]> {
        self.operation_imports
            .as_ref()
            .and_then(|map| lookup(map, name))
    }
}

fn normalize_key(name: &str) -> String {
    name.to_lowercase()
}

/// Case-insensitive name equality under the same folding the index keys use.
#[must_use]
pub fn names_match_ignoring_case(left: &str, right: &str) -> bool {
    left == right || normalize_key(left) == normalize_key(right)
}

fn push<T>(map: &mut BTreeMap<String, Vec<T>>, name: &str, value: T) {
    map.entry(normalize_key(name)).or_default().push(value);
}

fn lookup<'a, T>(map: &'a BTreeMap<String, Vec<T>>, name: &str) -> Option<&'a [T]> {
    map.get(&normalize_key(name))
        .map(Vec::as_slice)
        .filter(|entries| !entries.is_empty())
}
