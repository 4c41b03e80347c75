//! `$select` / `$expand` binding.
//!
//! Works on the normalized tree: root-first paths, one navigation hop per
//! expand term, one term per distinct path.

use crate::{
    bind::{
        BindContext, BindError, ExpressionBinder, FilterClause, OrderByClause,
        expr::range_over,
        path::{ODataPath, PathSegment},
    },
    edm::{EntityType, NavigationSource, PropertyRef, StructuredType, TypeRef},
    normalize::{NormalizedExpand, NormalizedExpandTerm, NormalizedSelect, PathStep, SegmentChain},
    obs::sink::{self, QueryEvent, QueryOption},
    semantics::are_related,
    settings::UriSettings,
    syntax::token::{ExpandLevels, SystemKeyword},
};
use std::sync::Arc;

///
/// PathSelectItem
///

#[derive(Clone, Debug, PartialEq)]
pub struct PathSelectItem {
    pub path: ODataPath,
}

impl PathSelectItem {
    /// A single declared structural property.
    fn is_plain_property(&self) -> bool {
        matches!(
            self.path.segments(),
            [PathSegment::Property {
                type_ref: Some(_),
                ..
            }]
        )
    }
}

///
/// ExpandedNavigationSelectItem
///
/// One expanded navigation property with its own options and nested
/// clause. `path` holds any leading casts, the navigation property, and
/// a trailing cast when present.
///

#[derive(Clone, Debug, PartialEq)]
pub struct ExpandedNavigationSelectItem {
    pub path: ODataPath,
    pub navigation_source: Option<NavigationSource>,
    pub is_ref: bool,
    pub filter: Option<FilterClause>,
    pub orderby: Option<OrderByClause>,
    pub top: Option<i64>,
    pub skip: Option<i64>,
    pub count: Option<bool>,
    pub levels: Option<ExpandLevels>,
    pub search: Option<String>,
    pub select_expand: SelectExpandClause,
}

impl ExpandedNavigationSelectItem {
    /// Path up to and including the navigation property.
    #[must_use]
    pub fn navigation_path(&self) -> ODataPath {
        let end = self
            .path
            .segments()
            .iter()
            .position(|s| matches!(s, PathSegment::NavigationProperty { .. }))
            .map_or(self.path.len(), |i| i + 1);

        ODataPath::new(self.path.segments()[..end].to_vec())
    }
}

///
/// WildcardSelectItem
///
/// `*`, with the explicit structural selections it made redundant.
///

#[derive(Clone, Debug, Default, PartialEq)]
pub struct WildcardSelectItem {
    pub subsumed: Vec<PathSelectItem>,
}

///
/// SelectItem
///

#[derive(Clone, Debug, PartialEq)]
pub enum SelectItem {
    Path(PathSelectItem),
    ExpandedNavigation(ExpandedNavigationSelectItem),
    Wildcard(WildcardSelectItem),
    NamespaceWildcard { namespace: String },
}

///
/// SelectExpandClause
///
/// `all_selected` is set when there was no `$select` at this level.
///

#[derive(Clone, Debug, PartialEq)]
pub struct SelectExpandClause {
    pub items: Vec<SelectItem>,
    pub all_selected: bool,
}

impl SelectExpandClause {
    /// Everything selected, nothing expanded.
    #[must_use]
    pub const fn all() -> Self {
        Self {
            items: Vec::new(),
            all_selected: true,
        }
    }

    pub fn expanded(&self) -> impl Iterator<Item = &ExpandedNavigationSelectItem> {
        self.items.iter().filter_map(|item| match item {
            SelectItem::ExpandedNavigation(expanded) => Some(expanded),
            _ => None,
        })
    }

    pub fn paths(&self) -> impl Iterator<Item = &PathSelectItem> {
        self.items.iter().filter_map(|item| match item {
            SelectItem::Path(path) => Some(path),
            _ => None,
        })
    }

    #[must_use]
    pub fn wildcard(&self) -> Option<&WildcardSelectItem> {
        self.items.iter().find_map(|item| match item {
            SelectItem::Wildcard(wildcard) => Some(wildcard),
            _ => None,
        })
    }
}

///
/// SelectExpandBinder
///
/// Binds one select/expand tree. Counts expanded items across the whole
/// tree against `max_expand_count`.
///

pub struct SelectExpandBinder<'m> {
    ctx: BindContext<'m>,
    max_expand_depth: usize,
    max_expand_count: usize,
    max_filter_depth: usize,
    max_orderby_depth: usize,
    expanded: usize,
}

impl<'m> SelectExpandBinder<'m> {
    #[must_use]
    pub const fn new(ctx: BindContext<'m>, settings: &UriSettings) -> Self {
        Self {
            ctx,
            max_expand_depth: settings.max_expand_depth,
            max_expand_count: settings.max_expand_count,
            max_filter_depth: settings.max_filter_depth,
            max_orderby_depth: settings.max_orderby_depth,
            expanded: 0,
        }
    }

    pub fn bind(
        &mut self,
        entity: &Arc<EntityType>,
        source: Option<&NavigationSource>,
        select: Option<&NormalizedSelect>,
        expand: Option<&NormalizedExpand>,
    ) -> Result<SelectExpandClause, BindError> {
        let clause = self.bind_level(entity, source, select, expand, 0)?;

        if select.is_some() {
            sink::record(QueryEvent::Bound {
                option: QueryOption::Select,
            });
        }
        if expand.is_some() {
            sink::record(QueryEvent::Bound {
                option: QueryOption::Expand,
            });
        }
        tracing::debug!(
            items = clause.items.len(),
            expanded = self.expanded,
            "bound select/expand"
        );

        Ok(clause)
    }

    fn bind_level(
        &mut self,
        entity: &Arc<EntityType>,
        source: Option<&NavigationSource>,
        select: Option<&NormalizedSelect>,
        expand: Option<&NormalizedExpand>,
        depth: usize,
    ) -> Result<SelectExpandClause, BindError> {
        let owner = StructuredType::Entity(Arc::clone(entity));

        let mut explicit = match select {
            Some(select) => self.bind_select(&owner, select)?,
            None => Vec::new(),
        };

        let mut expanded = Vec::new();
        for term in expand.map_or(&[][..], |e| e.terms.as_slice()) {
            self.expanded += 1;
            if self.expanded > self.max_expand_count {
                return Err(BindError::ExpandCountExceeded {
                    limit: self.max_expand_count,
                });
            }
            if depth + 1 > self.max_expand_depth {
                return Err(BindError::RecursionLimitExceeded {
                    limit: self.max_expand_depth,
                });
            }

            expanded.push(self.bind_expand_term(&owner, source, term, depth + 1)?);
        }

        // expanded navigations stay visible once anything is selected
        let mut implicit = Vec::new();
        if select.is_some() {
            for item in &expanded {
                let path = item.navigation_path();
                let covered = explicit.iter().any(|selected| {
                    matches!(selected, SelectItem::Path(p) if p.path.same_address(&path))
                });
                if !covered {
                    implicit.push(SelectItem::Path(PathSelectItem { path }));
                }
            }
        }

        explicit.extend(expanded.into_iter().map(SelectItem::ExpandedNavigation));
        explicit.extend(implicit);

        Ok(SelectExpandClause {
            items: explicit,
            all_selected: select.is_none(),
        })
    }

    //
    // select
    //

    /// Explicit items in source order, the wildcard at its first position
    /// holding the single-property paths it subsumes.
    fn bind_select(
        &self,
        owner: &StructuredType,
        select: &NormalizedSelect,
    ) -> Result<Vec<SelectItem>, BindError> {
        let mut items = Vec::with_capacity(select.items.len());
        let mut wildcard_at = None;

        for chain in &select.items {
            match chain.steps() {
                [PathStep::Star { namespace: None }] => {
                    if wildcard_at.is_none() {
                        wildcard_at = Some(items.len());
                        items.push(SelectItem::Wildcard(WildcardSelectItem::default()));
                    }
                }
                [PathStep::Star {
                    namespace: Some(namespace),
                }] => items.push(SelectItem::NamespaceWildcard {
                    namespace: namespace.clone(),
                }),
                _ => items.push(SelectItem::Path(PathSelectItem {
                    path: self.bind_select_path(owner, chain)?,
                })),
            }
        }

        let Some(wildcard_at) = wildcard_at else {
            return Ok(items);
        };

        let mut subsumed = Vec::new();
        let mut kept = Vec::with_capacity(items.len());
        for (i, item) in items.into_iter().enumerate() {
            match item {
                SelectItem::Path(path) if path.is_plain_property() => subsumed.push(path),
                SelectItem::Wildcard(_) if i == wildcard_at => {
                    kept.push(SelectItem::Wildcard(WildcardSelectItem::default()));
                }
                other => kept.push(other),
            }
        }
        for item in &mut kept {
            if let SelectItem::Wildcard(wildcard) = item {
                wildcard.subsumed = std::mem::take(&mut subsumed);
            }
        }

        Ok(kept)
    }

    fn bind_select_path(
        &self,
        owner: &StructuredType,
        chain: &SegmentChain,
    ) -> Result<ODataPath, BindError> {
        let resolver = &self.ctx.resolver;
        let mut current = owner.clone();
        let mut segments = Vec::with_capacity(chain.len());
        let steps = chain.steps();

        for (i, step) in steps.iter().enumerate() {
            let is_last = i + 1 == steps.len();
            let PathStep::Identifier {
                name,
                named_values: None,
            } = step
            else {
                return Err(BindError::invalid_segment(
                    &step.to_string(),
                    "not valid inside a select path",
                ));
            };

            if name.contains('.') {
                match resolver.structured_type(name) {
                    Ok(target) => {
                        check_related(&current, &target)?;
                        segments.push(PathSegment::TypeCast {
                            type_ref: target.to_type_ref(true),
                        });
                        current = target;
                        continue;
                    }
                    Err(BindError::UnresolvedType { .. }) if is_last => {
                        segments.push(self.select_operation(&current, name)?);
                        continue;
                    }
                    Err(err) => return Err(err),
                }
            }

            let property = resolver.property(&current, name)?;
            let next = match property {
                Some(PropertyRef::Structural(property)) => {
                    let type_ref = property.type_ref().clone();
                    let next = element_structured(&type_ref);
                    segments.push(PathSegment::Property {
                        name: property.name().to_string(),
                        type_ref: Some(type_ref),
                    });
                    next
                }
                Some(PropertyRef::Navigation(navigation)) => {
                    let target = self.navigation_target(navigation.target())?;
                    let type_ref = if navigation.is_collection() {
                        TypeRef::collection(TypeRef::entity(&target, false))
                    } else {
                        TypeRef::entity(&target, true)
                    };
                    segments.push(PathSegment::NavigationProperty {
                        name: navigation.name().to_string(),
                        navigation_source: None,
                        type_ref,
                    });
                    if !is_last {
                        return Err(BindError::invalid_segment(
                            name,
                            "a select path ends at a navigation property",
                        ));
                    }
                    None
                }
                None if current.is_open() => {
                    segments.push(PathSegment::Property {
                        name: name.clone(),
                        type_ref: None,
                    });
                    None
                }
                None => return Err(BindError::unresolved_property(name, current.full_name())),
            };

            match next {
                Some(next) => current = next,
                None if !is_last => {
                    return Err(BindError::invalid_segment(
                        name,
                        "only complex properties can be traversed",
                    ));
                }
                None => {}
            }
        }

        Ok(ODataPath::new(segments))
    }

    /// Selecting a bound action or function by qualified name.
    fn select_operation(&self, owner: &StructuredType, name: &str) -> Result<PathSegment, BindError> {
        let operation = self
            .ctx
            .resolver
            .operations(name)?
            .into_iter()
            .find(|op| {
                op.binding_parameter()
                    .and_then(|p| p.type_ref().structured_definition())
                    .is_some_and(|bound_to| are_related(owner, &bound_to))
            })
            .ok_or_else(|| BindError::UnresolvedSegment {
                segment: name.to_string(),
            })?;

        Ok(PathSegment::Operation {
            type_ref: operation.return_type().cloned(),
            operation,
            parameters: Vec::new(),
        })
    }

    //
    // expand
    //

    fn bind_expand_term(
        &mut self,
        owner: &StructuredType,
        source: Option<&NavigationSource>,
        term: &NormalizedExpandTerm,
        depth: usize,
    ) -> Result<ExpandedNavigationSelectItem, BindError> {
        let resolver = self.ctx.resolver;
        let mut current = owner.clone();
        let mut segments = Vec::with_capacity(term.path.len());
        let mut navigation = None;
        let mut is_ref = false;

        for step in term.path.steps() {
            if is_ref {
                return Err(BindError::invalid_segment(
                    &step.to_string(),
                    "nothing may follow '$ref'",
                ));
            }

            match step {
                PathStep::Identifier {
                    name,
                    named_values: None,
                } if name.contains('.') => {
                    let target = resolver.structured_type(name)?;
                    check_related(&current, &target)?;
                    segments.push(PathSegment::TypeCast {
                        type_ref: target.to_type_ref(true),
                    });
                    current = target;
                }
                PathStep::Identifier {
                    name,
                    named_values: None,
                } if navigation.is_none() => {
                    let Some(property) = resolver.property(&current, name)? else {
                        return Err(BindError::unresolved_property(name, current.full_name()));
                    };
                    let PropertyRef::Navigation(nav) = property else {
                        return Err(BindError::NotNavigation {
                            name: name.clone(),
                            owner: current.full_name().to_string(),
                        });
                    };

                    let target = self.navigation_target(nav.target())?;
                    let type_ref = if nav.is_collection() {
                        TypeRef::collection(TypeRef::entity(&target, false))
                    } else {
                        TypeRef::entity(&target, true)
                    };
                    let navigation_source = source
                        .and_then(|s| s.navigation_target(nav.name()))
                        .and_then(|set| self.ctx.model.find_navigation_source(set))
                        .cloned();

                    segments.push(PathSegment::NavigationProperty {
                        name: nav.name().to_string(),
                        navigation_source: navigation_source.clone(),
                        type_ref,
                    });
                    navigation = Some(navigation_source);
                    current = StructuredType::Entity(target);
                }
                PathStep::Keyword(SystemKeyword::Ref) if navigation.is_some() => is_ref = true,
                _ => {
                    return Err(BindError::invalid_segment(
                        &step.to_string(),
                        "expected a navigation property, a type cast or '$ref'",
                    ));
                }
            }
        }

        let Some(navigation_source) = navigation else {
            return Err(BindError::invalid_segment(
                &term.path.to_string(),
                "an expand path needs a navigation property",
            ));
        };
        let Some(target) = current.as_entity().cloned() else {
            return Err(BindError::invalid_segment(
                &term.path.to_string(),
                "expanded type is not an entity type",
            ));
        };

        let options = &term.options;
        let filter = match &options.filter {
            Some(token) => {
                let mut binder = self.expression_binder(&target, navigation_source.clone(), self.max_filter_depth);
                Some(FilterClause::bind(&mut binder, token)?)
            }
            None => None,
        };
        let orderby = if options.orderby.is_empty() {
            None
        } else {
            let mut binder = self.expression_binder(&target, navigation_source.clone(), self.max_orderby_depth);
            Some(OrderByClause::bind(&mut binder, &options.orderby)?)
        };

        let select_expand = self.bind_level(
            &target,
            navigation_source.as_ref(),
            options.select.as_ref(),
            term.expand.as_ref(),
            depth,
        )?;

        Ok(ExpandedNavigationSelectItem {
            path: ODataPath::new(segments),
            navigation_source,
            is_ref,
            filter,
            orderby,
            top: options.top,
            skip: options.skip,
            count: options.count,
            levels: options.levels,
            search: options.search.clone(),
            select_expand,
        })
    }

    fn expression_binder(
        &self,
        target: &Arc<EntityType>,
        source: Option<NavigationSource>,
        limit: usize,
    ) -> ExpressionBinder<'m> {
        ExpressionBinder::new(self.ctx, range_over(target, source), limit)
    }

    fn navigation_target(&self, name: &str) -> Result<Arc<EntityType>, BindError> {
        self.ctx
            .model
            .find_entity_type(name)
            .cloned()
            .ok_or_else(|| BindError::UnresolvedType {
                name: name.to_string(),
            })
    }
}

/// Bind normalized select/expand trees for entities of `entity`.
pub fn bind_select_expand(
    ctx: BindContext<'_>,
    settings: &UriSettings,
    entity: &Arc<EntityType>,
    source: Option<&NavigationSource>,
    select: Option<&NormalizedSelect>,
    expand: Option<&NormalizedExpand>,
) -> Result<SelectExpandClause, BindError> {
    SelectExpandBinder::new(ctx, settings).bind(entity, source, select, expand)
}

fn check_related(from: &StructuredType, to: &StructuredType) -> Result<(), BindError> {
    if are_related(from, to) {
        Ok(())
    } else {
        Err(BindError::UnrelatedTypeCast {
            from: from.full_name().to_string(),
            to: to.full_name().to_string(),
        })
    }
}

/// Structured type a select path can continue into.
fn element_structured(type_ref: &TypeRef) -> Option<StructuredType> {
    if type_ref.is_collection() {
        type_ref
            .as_collection()
            .element_type()
            .and_then(TypeRef::structured_definition)
    } else {
        type_ref.structured_definition()
    }
}
