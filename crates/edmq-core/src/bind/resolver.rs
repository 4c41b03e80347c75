use crate::{
    bind::BindError,
    edm::{
        EdmModel, EnumMember, EnumType, NavigationSource, Operation, OperationImport, PropertyRef,
        SchemaType, StructuredType, index::names_match_ignoring_case,
    },
    obs::sink::{self, ElementClass, QueryEvent},
    settings::UriSettings,
};
use std::{collections::BTreeSet, sync::Arc};

///
/// ResolverPolicy
///
/// Name matching switches. An exact match always wins; the other
/// switches only widen what is tried when there is none.
///

#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub struct ResolverPolicy {
    pub case_insensitive: bool,
    pub unqualified_enum: bool,
}

impl ResolverPolicy {
    #[must_use]
    pub const fn strict() -> Self {
        Self {
            case_insensitive: false,
            unqualified_enum: false,
        }
    }

    #[must_use]
    pub const fn case_insensitive() -> Self {
        Self {
            case_insensitive: true,
            unqualified_enum: true,
        }
    }

    #[must_use]
    pub const fn from_settings(settings: &UriSettings) -> Self {
        Self {
            case_insensitive: settings.enable_case_insensitive,
            unqualified_enum: settings.enable_unqualified_enum,
        }
    }
}

///
/// Resolver
///
/// Exact lookups through the model's own maps first, then the model's
/// case-insensitive index when the policy allows it.
///

#[derive(Clone, Copy, Debug)]
pub struct Resolver<'m> {
    model: &'m EdmModel,
    policy: ResolverPolicy,
}

impl<'m> Resolver<'m> {
    #[must_use]
    pub const fn new(model: &'m EdmModel, policy: ResolverPolicy) -> Self {
        Self { model, policy }
    }

    #[must_use]
    pub const fn policy(&self) -> ResolverPolicy {
        self.policy
    }

    fn container_name(&self) -> String {
        self.model
            .container()
            .map_or_else(String::new, |c| format!("{}.{}", c.namespace(), c.name()))
    }

    pub fn navigation_source(&self, name: &str) -> Result<NavigationSource, BindError> {
        if let Some(source) = self.model.find_navigation_source(name) {
            return Ok(source.clone());
        }

        let candidates = self.fallback(|index| index.find_navigation_sources(name));
        single_candidate(
            name,
            &self.container_name(),
            candidates,
            NavigationSource::name,
            ElementClass::NavigationSource,
        )?
        .cloned()
        .ok_or_else(|| BindError::UnresolvedNavigationSource {
            name: name.to_string(),
        })
    }

    /// Import overloads sharing one name; empty when none match.
    pub fn operation_imports(&self, name: &str) -> Result<Vec<Arc<OperationImport>>, BindError> {
        let exact = self.model.find_operation_imports(name);
        if !exact.is_empty() {
            return Ok(exact.to_vec());
        }

        let candidates = self.fallback(|index| index.find_operation_imports(name));
        same_name_group(
            name,
            &self.container_name(),
            candidates,
            |import| import.name(),
            ElementClass::OperationImport,
        )
    }

    pub fn schema_type(&self, qualified_name: &str) -> Result<SchemaType, BindError> {
        if let Some(ty) = self.model.find_type(qualified_name) {
            return Ok(ty.clone());
        }

        let candidates = self.fallback(|index| index.find_schema_types(qualified_name));
        single_candidate(
            qualified_name,
            namespace_of(qualified_name),
            candidates,
            SchemaType::full_name,
            ElementClass::SchemaType,
        )?
        .cloned()
        .ok_or_else(|| BindError::UnresolvedType {
            name: qualified_name.to_string(),
        })
    }

    /// Structured type by qualified name; enums are an error here.
    pub fn structured_type(&self, qualified_name: &str) -> Result<StructuredType, BindError> {
        self.schema_type(qualified_name)?
            .as_structured()
            .ok_or_else(|| BindError::UnresolvedType {
                name: qualified_name.to_string(),
            })
    }

    /// Operation overloads sharing one qualified name; empty when none match.
    pub fn operations(&self, qualified_name: &str) -> Result<Vec<Arc<Operation>>, BindError> {
        let exact = self.model.find_operations(qualified_name);
        if !exact.is_empty() {
            return Ok(exact.to_vec());
        }

        let candidates = self.fallback(|index| index.find_operations(qualified_name));
        same_name_group(
            qualified_name,
            namespace_of(qualified_name),
            candidates,
            |op| op.full_name(),
            ElementClass::Operation,
        )
    }

    /// Declared or inherited member; `None` when nothing matches.
    pub fn property<'t>(
        &self,
        owner: &'t StructuredType,
        name: &str,
    ) -> Result<Option<PropertyRef<'t>>, BindError> {
        if let Some(found) = owner.find_property(name) {
            return Ok(Some(found));
        }
        if !self.policy.case_insensitive {
            return Ok(None);
        }

        let members: Vec<PropertyRef<'t>> = owner
            .members()
            .into_iter()
            .filter(|member| names_match_ignoring_case(member.name(), name))
            .collect();
        single_candidate(
            name,
            owner.full_name(),
            Some(members.as_slice()),
            PropertyRef::name,
            ElementClass::Property,
        )
        .map(Option::<&PropertyRef<'t>>::copied)
    }

    pub fn enum_member<'e>(
        &self,
        enum_type: &'e EnumType,
        name: &str,
    ) -> Result<Option<&'e EnumMember>, BindError> {
        if let Some(member) = enum_type.find_member(name) {
            return Ok(Some(member));
        }
        if !self.policy.case_insensitive {
            return Ok(None);
        }

        let members: Vec<&'e EnumMember> = enum_type
            .members()
            .iter()
            .filter(|member| names_match_ignoring_case(member.name(), name))
            .collect();
        single_candidate(
            name,
            enum_type.full_name(),
            Some(members.as_slice()),
            |member| member.name(),
            ElementClass::EnumMember,
        )
        .map(Option::<&&EnumMember>::copied)
    }

    fn fallback<T>(
        &self,
        lookup: impl FnOnce(&'m crate::edm::NormalizedModelIndex) -> Option<&'m [T]>,
    ) -> Option<&'m [T]> {
        if self.policy.case_insensitive {
            lookup(self.model.index())
        } else {
            None
        }
    }
}

/// Exactly one case-insensitive candidate, or an ambiguity error.
fn single_candidate<'a, T>(
    name: &str,
    owner: &str,
    candidates: Option<&'a [T]>,
    name_of: impl Fn(&T) -> &str,
    element: ElementClass,
) -> Result<Option<&'a T>, BindError> {
    match candidates {
        None | Some([]) => Ok(None),
        Some([only]) => {
            tracing::debug!(name, resolved = name_of(only), "case-insensitive match");
            sink::record(QueryEvent::CaseInsensitiveFallback { element });
            Ok(Some(only))
        }
        Some(many) => Err(BindError::AmbiguousMatch {
            name: name.to_string(),
            owner: owner.to_string(),
            candidates: many.iter().map(|c| name_of(c).to_string()).collect(),
        }),
    }
}

/// Overloads found case-insensitively must all share one exact name.
fn same_name_group<T: Clone>(
    name: &str,
    owner: &str,
    candidates: Option<&[T]>,
    name_of: impl Fn(&T) -> &str,
    element: ElementClass,
) -> Result<Vec<T>, BindError> {
    let Some(candidates) = candidates.filter(|c| !c.is_empty()) else {
        return Ok(Vec::new());
    };

    let names: Vec<&str> = candidates
        .iter()
        .map(&name_of)
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect();
    if names.len() > 1 {
        return Err(BindError::AmbiguousMatch {
            name: name.to_string(),
            owner: owner.to_string(),
            candidates: names.into_iter().map(str::to_string).collect(),
        });
    }

    sink::record(QueryEvent::CaseInsensitiveFallback { element });
    Ok(candidates.to_vec())
}

fn namespace_of(qualified_name: &str) -> &str {
    qualified_name
        .rsplit_once('.')
        .map_or("", |(namespace, _)| namespace)
}
