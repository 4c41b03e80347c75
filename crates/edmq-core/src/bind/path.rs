//! Resource path binding.

use crate::{
    bind::{
        BindContext, BindError,
        convert::{bind_literal, convert_to_type_if_needed},
        node::SingleValueNode,
    },
    edm::{
        EntityType, NavigationSource, Operation, OperationImport, OperationParameter,
        PropertyRef, StructuredType, TypeRef,
    },
    normalize::{PathStep, SegmentChain},
    obs::sink::{self, QueryEvent, QueryOption},
    semantics::are_related,
    syntax::token::{NamedValue, PathSegmentToken, SystemKeyword},
};
use std::{fmt, sync::Arc};

///
/// NamedArgument
///
/// A key value or operation parameter after conversion to its declared type.
///

#[derive(Clone, Debug, PartialEq)]
pub struct NamedArgument {
    pub name: String,
    pub value: SingleValueNode,
}

///
/// PathSegment
///

#[derive(Clone, Debug, PartialEq)]
pub enum PathSegment {
    EntitySet {
        source: NavigationSource,
        type_ref: TypeRef,
    },
    Singleton {
        source: NavigationSource,
        type_ref: TypeRef,
    },
    Key {
        values: Vec<NamedArgument>,
        type_ref: TypeRef,
    },
    NavigationProperty {
        name: String,
        navigation_source: Option<NavigationSource>,
        type_ref: TypeRef,
    },
    /// Declared property, or a dynamic one of an open type (`type_ref: None`).
    Property {
        name: String,
        type_ref: Option<TypeRef>,
    },
    TypeCast {
        type_ref: TypeRef,
    },
    OperationImport {
        import: Arc<OperationImport>,
        parameters: Vec<NamedArgument>,
        navigation_source: Option<NavigationSource>,
        type_ref: Option<TypeRef>,
    },
    Operation {
        operation: Arc<Operation>,
        parameters: Vec<NamedArgument>,
        type_ref: Option<TypeRef>,
    },
    Count,
    Value,
    Ref,
    Links,
    Metadata,
    Batch,
}

impl PathSegment {
    #[must_use]
    pub const fn type_ref(&self) -> Option<&TypeRef> {
        match self {
            Self::EntitySet { type_ref, .. }
            | Self::Singleton { type_ref, .. }
            | Self::Key { type_ref, .. }
            | Self::NavigationProperty { type_ref, .. }
            | Self::TypeCast { type_ref } => Some(type_ref),
            Self::Property { type_ref, .. }
            | Self::OperationImport { type_ref, .. }
            | Self::Operation { type_ref, .. } => type_ref.as_ref(),
            Self::Count | Self::Value | Self::Ref | Self::Links | Self::Metadata | Self::Batch => {
                None
            }
        }
    }

    /// Nothing may follow these.
    #[must_use]
    pub const fn is_terminal(&self) -> bool {
        matches!(
            self,
            Self::Count | Self::Value | Self::Ref | Self::Metadata | Self::Batch
        )
    }

    /// Equality that ignores which navigation source a navigation was
    /// resolved against; `$select` paths never track one.
    #[must_use]
    pub fn same_address(&self, other: &Self) -> bool {
        match (self, other) {
            (
                Self::NavigationProperty {
                    name: left,
                    type_ref: left_type,
                    ..
                },
                Self::NavigationProperty {
                    name: right,
                    type_ref: right_type,
                    ..
                },
            ) => left == right && left_type == right_type,
            _ => self == other,
        }
    }

    pub(crate) const fn keyword(&self) -> Option<SystemKeyword> {
        Some(match self {
            Self::Count => SystemKeyword::Count,
            Self::Value => SystemKeyword::Value,
            Self::Ref => SystemKeyword::Ref,
            Self::Links => SystemKeyword::Links,
            Self::Metadata => SystemKeyword::Metadata,
            Self::Batch => SystemKeyword::Batch,
            _ => return None,
        })
    }
}

impl fmt::Display for PathSegment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(keyword) = self.keyword() {
            return f.write_str(keyword.text());
        }

        match self {
            Self::EntitySet { source, .. } | Self::Singleton { source, .. } => {
                f.write_str(source.name())
            }
            Self::Key { values, .. } => write!(f, "({})", join_arguments(values)),
            Self::NavigationProperty { name, .. } | Self::Property { name, .. } => {
                f.write_str(name)
            }
            Self::TypeCast { type_ref } => f.write_str(&type_ref.full_name()),
            Self::OperationImport {
                import, parameters, ..
            } => write!(f, "{}({})", import.name(), join_arguments(parameters)),
            Self::Operation {
                operation,
                parameters,
                ..
            } => write!(f, "{}({})", operation.full_name(), join_arguments(parameters)),
            _ => Ok(()),
        }
    }
}

fn join_arguments(arguments: &[NamedArgument]) -> String {
    arguments
        .iter()
        .map(|argument| match &argument.value {
            SingleValueNode::Constant(constant) => format!("{}={}", argument.name, constant.text),
            SingleValueNode::Convert(convert) => match convert.source.as_ref() {
                SingleValueNode::Constant(constant) => {
                    format!("{}={}", argument.name, constant.text)
                }
                _ => argument.name.clone(),
            },
            _ => argument.name.clone(),
        })
        .collect::<Vec<_>>()
        .join(",")
}

///
/// ODataPath
///
/// Bound resource path, root first.
///

#[derive(Clone, Debug, Default, PartialEq)]
pub struct ODataPath {
    pub segments: Vec<PathSegment>,
}

impl ODataPath {
    #[must_use]
    pub const fn new(segments: Vec<PathSegment>) -> Self {
        Self { segments }
    }

    #[must_use]
    pub fn segments(&self) -> &[PathSegment] {
        &self.segments
    }

    #[must_use]
    pub fn last(&self) -> Option<&PathSegment> {
        self.segments.last()
    }

    #[must_use]
    pub const fn len(&self) -> usize {
        self.segments.len()
    }

    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }

    /// Type of the last typed segment.
    #[must_use]
    pub fn target_type(&self) -> Option<&TypeRef> {
        self.segments.iter().rev().find_map(PathSegment::type_ref)
    }

    /// Segment-wise [`PathSegment::same_address`].
    #[must_use]
    pub fn same_address(&self, other: &Self) -> bool {
        self.segments.len() == other.segments.len()
            && self
                .segments
                .iter()
                .zip(&other.segments)
                .all(|(left, right)| left.same_address(right))
    }

    /// Navigation source the addressed entities belong to, if tracked.
    #[must_use]
    pub fn navigation_source(&self) -> Option<&NavigationSource> {
        self.segments.iter().rev().find_map(|segment| match segment {
            PathSegment::EntitySet { source, .. } | PathSegment::Singleton { source, .. } => {
                Some(source)
            }
            PathSegment::NavigationProperty {
                navigation_source, ..
            }
            | PathSegment::OperationImport {
                navigation_source, ..
            } => navigation_source.as_ref(),
            _ => None,
        })
    }
}

impl fmt::Display for ODataPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, segment) in self.segments.iter().enumerate() {
            if i > 0 && !matches!(segment, PathSegment::Key { .. }) {
                f.write_str("/")?;
            }
            write!(f, "{segment}")?;
        }

        Ok(())
    }
}

/// Bind a parsed resource path (leaf segment) against the model.
pub fn bind_path(ctx: BindContext<'_>, leaf: PathSegmentToken) -> Result<ODataPath, BindError> {
    let mut binder = PathBinder {
        ctx,
        segments: Vec::new(),
        source: None,
    };

    for step in SegmentChain::from_leaf(leaf).into_steps() {
        binder.step(step)?;
    }
    sink::record(QueryEvent::Bound {
        option: QueryOption::Path,
    });

    let path = ODataPath::new(binder.segments);
    tracing::debug!(%path, "bound resource path");

    Ok(path)
}

struct PathBinder<'m> {
    ctx: BindContext<'m>,
    segments: Vec<PathSegment>,
    source: Option<NavigationSource>,
}

impl PathBinder<'_> {
    /// Type addressed so far; `$links` is transparent.
    fn current_type(&self) -> Option<&TypeRef> {
        self.segments
            .iter()
            .rev()
            .find(|segment| !matches!(segment, PathSegment::Links))
            .and_then(PathSegment::type_ref)
    }

    fn step(&mut self, step: PathStep) -> Result<(), BindError> {
        if let Some(last) = self.segments.last()
            && last.is_terminal()
        {
            return Err(BindError::invalid_segment(
                &step.to_string(),
                &format!("nothing may follow '{last}'"),
            ));
        }

        match step {
            PathStep::Keyword(keyword) => self.keyword(keyword),
            PathStep::Star { .. } => Err(BindError::invalid_segment(
                &step.to_string(),
                "a wildcard is not a resource path segment",
            )),
            PathStep::Identifier { name, named_values } => {
                let after_links = matches!(self.segments.last(), Some(PathSegment::Links));
                let consumed = if self.segments.is_empty() {
                    self.root(&name, named_values.as_deref())?
                } else {
                    self.member(&name, named_values.as_deref())?
                };

                if after_links && !matches!(self.segments.last(), Some(PathSegment::NavigationProperty { .. })) {
                    return Err(BindError::NotNavigation {
                        name,
                        owner: "$links".to_string(),
                    });
                }
                if !consumed && let Some(values) = named_values {
                    self.key(&name, &values)?;
                }

                Ok(())
            }
        }
    }

    fn keyword(&mut self, keyword: SystemKeyword) -> Result<(), BindError> {
        let fail = |reason: &str| Err(BindError::invalid_segment(keyword.text(), reason));

        let segment = match keyword {
            SystemKeyword::Metadata | SystemKeyword::Batch if !self.segments.is_empty() => {
                return fail("only valid as the whole path");
            }
            SystemKeyword::Metadata => PathSegment::Metadata,
            SystemKeyword::Batch => PathSegment::Batch,
            _ if self.segments.is_empty() => return fail("needs a preceding segment"),
            SystemKeyword::Count => {
                if !self.current_type().is_some_and(TypeRef::is_collection) {
                    return fail("only a collection can be counted");
                }
                PathSegment::Count
            }
            SystemKeyword::Value => {
                if self.current_type().is_some_and(TypeRef::is_collection) {
                    return fail("a collection has no raw value");
                }
                PathSegment::Value
            }
            SystemKeyword::Ref => {
                if !self.current_type().is_some_and(addresses_entities) {
                    return fail("only entities have references");
                }
                PathSegment::Ref
            }
            SystemKeyword::Links => {
                if !self
                    .current_type()
                    .is_some_and(|t| t.as_entity().definition().is_some())
                {
                    return fail("links start from a single entity");
                }
                PathSegment::Links
            }
        };
        self.segments.push(segment);

        Ok(())
    }

    /// First segment. Returns whether the parenthesised values were used
    /// as parameters.
    fn root(&mut self, name: &str, values: Option<&[NamedValue]>) -> Result<bool, BindError> {
        let resolver = self.ctx.resolver;

        match resolver.navigation_source(name) {
            Ok(source) => {
                let entity = TypeRef::entity(source.entity_type(), false);
                let segment = if source.is_collection() {
                    PathSegment::EntitySet {
                        source: source.clone(),
                        type_ref: TypeRef::collection(entity),
                    }
                } else {
                    PathSegment::Singleton {
                        source: source.clone(),
                        type_ref: entity,
                    }
                };
                self.source = Some(source);
                self.segments.push(segment);

                Ok(false)
            }
            Err(BindError::UnresolvedNavigationSource { .. }) => {
                let imports = resolver.operation_imports(name)?;
                if imports.is_empty() {
                    return Err(BindError::UnresolvedNavigationSource {
                        name: name.to_string(),
                    });
                }

                let values = values.unwrap_or_default();
                let import = choose_overload(name, imports, |i| i.operation().call_parameters(), values)?;
                let parameters = self.arguments(import.operation().call_parameters(), values)?;
                let navigation_source = import
                    .entity_set()
                    .and_then(|set| self.ctx.model.find_navigation_source(set))
                    .cloned();

                self.source.clone_from(&navigation_source);
                self.segments.push(PathSegment::OperationImport {
                    type_ref: import.operation().return_type().cloned(),
                    import,
                    parameters,
                    navigation_source,
                });

                Ok(true)
            }
            Err(err) => Err(err),
        }
    }

    /// Any later identifier: cast, bound operation, property or navigation.
    fn member(&mut self, name: &str, values: Option<&[NamedValue]>) -> Result<bool, BindError> {
        let model = self.ctx.model;
        let Some(current) = self.current_type().cloned() else {
            return Err(BindError::invalid_segment(name, "previous segment has no type"));
        };
        let is_collection = current.is_collection();
        let element = element_type(&current);
        let Some(owner) = element.structured_definition() else {
            return Err(BindError::invalid_segment(
                name,
                "only entity and complex values have members",
            ));
        };

        if name.contains('.') {
            return self.qualified_member(name, &owner, is_collection, values);
        }
        if is_collection && owner.as_entity().is_some() {
            return Err(BindError::invalid_segment(
                name,
                "a key is needed before addressing members of a collection",
            ));
        }

        let segment = match self.ctx.resolver.property(&owner, name)? {
            Some(PropertyRef::Structural(property)) => {
                self.source = None;
                PathSegment::Property {
                    name: property.name().to_string(),
                    type_ref: Some(property.type_ref().clone()),
                }
            }
            Some(PropertyRef::Navigation(navigation)) => {
                let target = model
                    .find_entity_type(navigation.target())
                    .ok_or_else(|| BindError::UnresolvedType {
                        name: navigation.target().to_string(),
                    })?;
                let navigation_source = self
                    .source
                    .as_ref()
                    .and_then(|source| source.navigation_target(navigation.name()))
                    .and_then(|set| model.find_navigation_source(set))
                    .cloned();
                let type_ref = if navigation.is_collection() {
                    TypeRef::collection(TypeRef::entity(target, false))
                } else {
                    TypeRef::entity(target, true)
                };

                self.source.clone_from(&navigation_source);
                PathSegment::NavigationProperty {
                    name: navigation.name().to_string(),
                    navigation_source,
                    type_ref,
                }
            }
            None if owner.is_open() => {
                self.source = None;
                PathSegment::Property {
                    name: name.to_string(),
                    type_ref: None,
                }
            }
            None => return Err(BindError::unresolved_property(name, owner.full_name())),
        };
        self.segments.push(segment);

        Ok(false)
    }

    fn qualified_member(
        &mut self,
        name: &str,
        owner: &StructuredType,
        is_collection: bool,
        values: Option<&[NamedValue]>,
    ) -> Result<bool, BindError> {
        match self.ctx.resolver.structured_type(name) {
            Ok(target) => {
                if !are_related(owner, &target) {
                    return Err(BindError::UnrelatedTypeCast {
                        from: owner.full_name().to_string(),
                        to: target.full_name().to_string(),
                    });
                }
                let type_ref = if is_collection {
                    TypeRef::collection(target.to_type_ref(false))
                } else {
                    target.to_type_ref(true)
                };
                self.segments.push(PathSegment::TypeCast { type_ref });

                Ok(false)
            }
            Err(BindError::UnresolvedType { .. }) => {
                self.bound_operation(name, owner, is_collection, values)?;
                Ok(true)
            }
            Err(err) => Err(err),
        }
    }

    fn bound_operation(
        &mut self,
        name: &str,
        owner: &StructuredType,
        is_collection: bool,
        values: Option<&[NamedValue]>,
    ) -> Result<(), BindError> {
        let candidates: Vec<Arc<Operation>> = self
            .ctx
            .resolver
            .operations(name)?
            .into_iter()
            .filter(|op| binds_to(op, owner, is_collection))
            .collect();
        if candidates.is_empty() {
            return Err(BindError::UnresolvedSegment {
                segment: name.to_string(),
            });
        }

        let values = values.unwrap_or_default();
        let operation = choose_overload(name, candidates, |op| op.call_parameters(), values)?;
        let parameters = self.arguments(operation.call_parameters(), values)?;

        self.source = None;
        self.segments.push(PathSegment::Operation {
            type_ref: operation.return_type().cloned(),
            operation,
            parameters,
        });

        Ok(())
    }

    fn key(&mut self, name: &str, values: &[NamedValue]) -> Result<(), BindError> {
        let entity = self
            .current_type()
            .filter(|t| t.is_collection())
            .map(element_type)
            .and_then(|element| element.as_entity().definition().cloned());
        let Some(entity) = entity else {
            return Err(BindError::invalid_segment(name, "only entity collections take a key"));
        };

        let values = self.key_values(&entity, values)?;
        self.segments.push(PathSegment::Key {
            values,
            type_ref: TypeRef::entity(&entity, false),
        });

        Ok(())
    }

    fn key_values(
        &self,
        entity: &EntityType,
        values: &[NamedValue],
    ) -> Result<Vec<NamedArgument>, BindError> {
        let keys = entity.key_properties();
        if keys.len() != values.len() {
            return Err(BindError::KeyCountMismatch {
                entity: entity.full_name().to_string(),
                expected: keys.len(),
                found: values.len(),
            });
        }

        let named = values.iter().filter(|v| v.name.is_some()).count();
        let ordered: Vec<&NamedValue> = if named == 0 {
            values.iter().collect()
        } else if named == values.len() {
            for value in values {
                let name = value.name.as_deref().unwrap_or_default();
                if !keys.iter().any(|key| key.name() == name) {
                    return Err(BindError::unresolved_property(name, entity.full_name()));
                }
            }
            let mut ordered = Vec::with_capacity(keys.len());
            for key in &keys {
                let value = values
                    .iter()
                    .find(|v| v.name.as_deref() == Some(key.name()))
                    .ok_or_else(|| BindError::invalid_segment(key.name(), "key property given twice"))?;
                ordered.push(value);
            }
            ordered
        } else {
            return Err(BindError::invalid_segment(
                entity.full_name(),
                "key values must be all named or all positional",
            ));
        };

        keys.iter()
            .zip(ordered)
            .map(|(key, value)| {
                Ok(NamedArgument {
                    name: key.name().to_string(),
                    value: self.converted(value, key.type_ref())?,
                })
            })
            .collect()
    }

    /// Parameter values in declaration order, converted to parameter types.
    fn arguments(
        &self,
        parameters: &[OperationParameter],
        values: &[NamedValue],
    ) -> Result<Vec<NamedArgument>, BindError> {
        parameters
            .iter()
            .enumerate()
            .map(|(i, parameter)| {
                let value = values
                    .iter()
                    .find(|v| v.name.as_deref() == Some(parameter.name()))
                    .or_else(|| values.get(i).filter(|v| v.name.is_none()))
                    .ok_or_else(|| BindError::NoMatchingOverload {
                        name: parameter.name().to_string(),
                        arguments: describe_values(values),
                    })?;

                Ok(NamedArgument {
                    name: parameter.name().to_string(),
                    value: self.converted(value, parameter.type_ref())?,
                })
            })
            .collect()
    }

    fn converted(&self, value: &NamedValue, target: &TypeRef) -> Result<SingleValueNode, BindError> {
        let constant = SingleValueNode::Constant(bind_literal(value.value.clone()));
        convert_to_type_if_needed(constant, Some(target), &self.ctx.resolver)
    }
}

/// Pick the single overload whose parameters match the given values by
/// count and, for named values, by name.
fn choose_overload<T>(
    name: &str,
    candidates: Vec<T>,
    parameters_of: impl Fn(&T) -> &[OperationParameter],
    values: &[NamedValue],
) -> Result<T, BindError> {
    let mut matching: Vec<T> = candidates
        .into_iter()
        .filter(|candidate| {
            let parameters = parameters_of(candidate);
            parameters.len() == values.len()
                && values.iter().all(|value| {
                    value
                        .name
                        .as_deref()
                        .is_none_or(|n| parameters.iter().any(|p| p.name() == n))
                })
        })
        .collect();

    match matching.len() {
        0 => Err(BindError::NoMatchingOverload {
            name: name.to_string(),
            arguments: describe_values(values),
        }),
        1 => Ok(matching.remove(0)),
        _ => Err(BindError::AmbiguousOverload {
            name: name.to_string(),
        }),
    }
}

fn binds_to(operation: &Operation, owner: &StructuredType, is_collection: bool) -> bool {
    let Some(binding) = operation.binding_parameter() else {
        return false;
    };
    let binding_type = binding.type_ref();
    if binding_type.is_collection() != is_collection {
        return false;
    }

    element_type(binding_type)
        .structured_definition()
        .is_some_and(|bound_to| are_related(owner, &bound_to))
}

fn element_type(type_ref: &TypeRef) -> TypeRef {
    if type_ref.is_collection() {
        type_ref
            .as_collection()
            .element_type()
            .cloned()
            .unwrap_or_else(|| type_ref.clone())
    } else {
        type_ref.clone()
    }
}

fn addresses_entities(type_ref: &TypeRef) -> bool {
    element_type(type_ref).as_entity().definition().is_some()
}

fn describe_values(values: &[NamedValue]) -> String {
    values
        .iter()
        .map(|value| match &value.name {
            Some(name) => format!("{name}={}", value.value.text),
            None => value.value.text.clone(),
        })
        .collect::<Vec<_>>()
        .join(", ")
}
