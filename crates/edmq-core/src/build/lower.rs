//! Bound trees back to lexical tokens.
//!
//! Implicit promotions are dropped and casts to structured types become
//! type-cast segments, so the tokens re-bind to an equivalent tree.

use crate::{
    bind::{
        ExpandedNavigationSelectItem, FilterClause, NamedArgument, ODataPath, OrderByClause,
        PathSegment, RangeVariableNode, SelectExpandClause, SelectItem, SingleValueNode,
    },
    build::BuildError,
    syntax::token::{
        ExpandOptionsToken, ExpandTermToken, ExpandToken, LiteralToken, NamedValue, OrderByToken,
        PathSegmentToken, QueryToken, SegmentToken, SelectTermToken, SelectToken, SystemKeyword,
    },
};

pub fn lower_filter(clause: &FilterClause) -> Result<QueryToken, BuildError> {
    lower_expression(&clause.expression)
}

pub fn lower_orderby(clause: &OrderByClause) -> Result<Vec<OrderByToken>, BuildError> {
    clause
        .items
        .iter()
        .map(|item| {
            Ok(OrderByToken {
                expression: lower_expression(&item.expression)?,
                direction: item.direction,
            })
        })
        .collect()
}

pub fn lower_expression(node: &SingleValueNode) -> Result<QueryToken, BuildError> {
    let token = match node {
        SingleValueNode::Constant(constant) => QueryToken::Literal(LiteralToken::new(
            constant.value.clone(),
            constant.text.clone(),
        )),
        SingleValueNode::Convert(convert) => {
            if convert.type_ref.structured_definition().is_none() {
                return lower_expression(&convert.source);
            }
            QueryToken::PropertyAccess {
                name: convert.type_ref.full_name(),
                parent: member_parent(&convert.source)?,
            }
        }
        SingleValueNode::BinaryOperator(binary) => QueryToken::binary(
            binary.op,
            lower_expression(&binary.left)?,
            lower_expression(&binary.right)?,
        ),
        SingleValueNode::UnaryOperator(unary) => {
            QueryToken::unary(unary.op, lower_expression(&unary.operand)?)
        }
        SingleValueNode::SingleValuePropertyAccess(access) => QueryToken::PropertyAccess {
            name: access.property.clone(),
            parent: member_parent(&access.source)?,
        },
        SingleValueNode::SingleValueOpenPropertyAccess(access) => QueryToken::PropertyAccess {
            name: access.name.clone(),
            parent: member_parent(&access.source)?,
        },
        SingleValueNode::SingleNavigation(navigation) => QueryToken::PropertyAccess {
            name: navigation.navigation.clone(),
            parent: member_parent(&navigation.source)?,
        },
        SingleValueNode::SingleValueFunctionCall(call) => {
            // bound operations carry their binding value first
            match call.arguments.split_first() {
                Some((binding, rest)) if call.name.contains('.') => QueryToken::FunctionCall {
                    name: call.name.clone(),
                    arguments: lower_all(rest)?,
                    parent: member_parent(binding)?,
                },
                _ => QueryToken::call(call.name.clone(), lower_all(&call.arguments)?),
            }
        }
        SingleValueNode::SingleValueServiceOperation(call) => {
            QueryToken::call(call.import.name(), lower_all(&call.arguments)?)
        }
        SingleValueNode::RangeVariableReference(range) => QueryToken::property(range.name.clone()),
    };

    Ok(token)
}

fn lower_all(nodes: &[SingleValueNode]) -> Result<Vec<QueryToken>, BuildError> {
    nodes.iter().map(lower_expression).collect()
}

/// `$it` is implicit as the head of a member path.
fn member_parent(source: &SingleValueNode) -> Result<Option<Box<QueryToken>>, BuildError> {
    match source {
        SingleValueNode::RangeVariableReference(range)
            if range.name == RangeVariableNode::IMPLICIT_NAME =>
        {
            Ok(None)
        }
        _ => lower_expression(source).map(|token| Some(Box::new(token))),
    }
}

//
// paths
//

/// Leaf token of a bound resource path.
pub fn lower_path(path: &ODataPath) -> Result<PathSegmentToken, BuildError> {
    let mut leaf: Option<PathSegmentToken> = None;

    for segment in path.segments() {
        let parent = leaf.take();
        leaf = Some(match segment {
            PathSegment::Key { values, .. } => attach_key(parent, values)?,
            PathSegment::EntitySet { source, .. } | PathSegment::Singleton { source, .. } => {
                named_segment(source.name(), None, parent)
            }
            PathSegment::NavigationProperty { name, .. } | PathSegment::Property { name, .. } => {
                named_segment(name, None, parent)
            }
            PathSegment::TypeCast { type_ref } => named_segment(&type_ref.full_name(), None, parent),
            PathSegment::OperationImport {
                import, parameters, ..
            } => named_segment(import.name(), Some(named_arguments(parameters)?), parent),
            PathSegment::Operation {
                operation,
                parameters,
                ..
            } => named_segment(
                operation.full_name(),
                Some(named_arguments(parameters)?),
                parent,
            ),
            other => {
                let keyword = other
                    .keyword()
                    .ok_or_else(|| BuildError::unrenderable(other.to_string()))?;
                keyword_segment(keyword, parent)
            }
        });
    }

    leaf.ok_or_else(|| BuildError::unrenderable("empty path"))
}

fn named_segment(
    identifier: &str,
    named_values: Option<Vec<NamedValue>>,
    parent: Option<PathSegmentToken>,
) -> PathSegmentToken {
    PathSegmentToken::Segment(SegmentToken {
        identifier: identifier.to_string(),
        named_values,
        parent: parent.map(Box::new),
    })
}

fn keyword_segment(keyword: SystemKeyword, parent: Option<PathSegmentToken>) -> PathSegmentToken {
    PathSegmentToken::Keyword {
        keyword,
        parent: parent.map(Box::new),
    }
}

/// Keys go inside the preceding segment's parentheses. A single key
/// value is written positionally.
fn attach_key(
    parent: Option<PathSegmentToken>,
    values: &[NamedArgument],
) -> Result<PathSegmentToken, BuildError> {
    let named_values = match values {
        [only] => vec![NamedValue::positional(argument_literal(only)?)],
        _ => named_arguments(values)?,
    };

    match parent {
        Some(PathSegmentToken::Segment(mut segment)) if segment.named_values.is_none() => {
            segment.named_values = Some(named_values);
            Ok(PathSegmentToken::Segment(segment))
        }
        Some(other) => Err(BuildError::unrenderable(format!(
            "key after '{}'",
            other.identifier()
        ))),
        None => Err(BuildError::unrenderable("key without a preceding segment")),
    }
}

fn named_arguments(arguments: &[NamedArgument]) -> Result<Vec<NamedValue>, BuildError> {
    arguments
        .iter()
        .map(|argument| Ok(NamedValue::named(argument.name.clone(), argument_literal(argument)?)))
        .collect()
}

/// Path arguments are literals, possibly behind an implicit promotion.
fn argument_literal(argument: &NamedArgument) -> Result<LiteralToken, BuildError> {
    let mut value = &argument.value;
    while let SingleValueNode::Convert(convert) = value {
        value = &convert.source;
    }

    match value {
        SingleValueNode::Constant(constant) => Ok(LiteralToken::new(
            constant.value.clone(),
            constant.text.clone(),
        )),
        _ => Err(BuildError::unrenderable(format!(
            "non-literal value for '{}'",
            argument.name
        ))),
    }
}

//
// select / expand
//

/// `$select` and `$expand` tokens for one clause level; `None` where the
/// option would be absent.
pub fn lower_select_expand(
    clause: &SelectExpandClause,
) -> Result<(Option<SelectToken>, Option<ExpandToken>), BuildError> {
    let mut select_terms = Vec::new();
    let mut expand_terms = Vec::new();

    for item in &clause.items {
        match item {
            SelectItem::Path(item) => select_terms.push(SelectTermToken {
                path: lower_path(&item.path)?,
            }),
            SelectItem::Wildcard(_) => select_terms.push(SelectTermToken {
                path: PathSegmentToken::Star {
                    namespace: None,
                    parent: None,
                },
            }),
            SelectItem::NamespaceWildcard { namespace } => select_terms.push(SelectTermToken {
                path: PathSegmentToken::Star {
                    namespace: Some(namespace.clone()),
                    parent: None,
                },
            }),
            SelectItem::ExpandedNavigation(item) => expand_terms.push(lower_expand_term(item)?),
        }
    }

    let select = (!clause.all_selected).then_some(SelectToken {
        terms: select_terms,
    });
    let expand = (!expand_terms.is_empty()).then_some(ExpandToken {
        terms: expand_terms,
    });

    Ok((select, expand))
}

fn lower_expand_term(item: &ExpandedNavigationSelectItem) -> Result<ExpandTermToken, BuildError> {
    let mut path = lower_path(&item.path)?;
    if item.is_ref {
        path = keyword_segment(SystemKeyword::Ref, Some(path));
    }

    let (select, expand) = lower_select_expand(&item.select_expand)?;
    let options = ExpandOptionsToken {
        filter: item.filter.as_ref().map(lower_filter).transpose()?,
        orderby: match &item.orderby {
            Some(orderby) => lower_orderby(orderby)?,
            None => Vec::new(),
        },
        top: item.top,
        skip: item.skip,
        count: item.count,
        levels: item.levels,
        search: item.search.clone(),
        select,
    };

    Ok(ExpandTermToken {
        path,
        options,
        expand,
    })
}
