use crate::{
    bind::{
        BindError, ExpressionBinder,
        node::{RangeVariableNode, SingleValueNode},
    },
    edm::TypeRef,
    obs::sink::{self, QueryEvent, QueryOption},
    syntax::token::{OrderByToken, OrderDirection, QueryToken},
};

///
/// FilterClause
///
/// A bound `$filter`: a Boolean (or untyped `null`) expression over `$it`.
///

#[derive(Clone, Debug, PartialEq)]
pub struct FilterClause {
    pub expression: SingleValueNode,
    pub range_variable: RangeVariableNode,
}

impl FilterClause {
    pub fn bind(binder: &mut ExpressionBinder<'_>, token: &QueryToken) -> Result<Self, BindError> {
        let expression = binder.bind_single(token)?;
        if let Some(type_ref) = expression.type_ref()
            && !type_ref.is_boolean()
        {
            return Err(BindError::NonBooleanOperand {
                context: "$filter".to_string(),
                found: type_ref.full_name(),
            });
        }
        sink::record(QueryEvent::Bound {
            option: QueryOption::Filter,
        });

        Ok(Self {
            expression,
            range_variable: binder.range_variable().clone(),
        })
    }
}

///
/// OrderByItem
///

#[derive(Clone, Debug, PartialEq)]
pub struct OrderByItem {
    pub expression: SingleValueNode,
    pub direction: OrderDirection,
}

///
/// OrderByClause
///
/// Bound `$orderby` items, most significant first.
///

#[derive(Clone, Debug, PartialEq)]
pub struct OrderByClause {
    pub items: Vec<OrderByItem>,
    pub range_variable: RangeVariableNode,
}

impl OrderByClause {
    pub fn bind(
        binder: &mut ExpressionBinder<'_>,
        tokens: &[OrderByToken],
    ) -> Result<Self, BindError> {
        let mut items = Vec::with_capacity(tokens.len());
        for token in tokens {
            let expression = binder.bind_single(&token.expression)?;
            if let Some(type_ref) = expression.type_ref()
                && !is_orderable(type_ref)
            {
                return Err(BindError::invalid_segment(
                    &type_ref.full_name(),
                    "$orderby needs a primitive or enum value",
                ));
            }

            items.push(OrderByItem {
                expression,
                direction: token.direction,
            });
        }
        sink::record(QueryEvent::Bound {
            option: QueryOption::OrderBy,
        });

        Ok(Self {
            items,
            range_variable: binder.range_variable().clone(),
        })
    }
}

fn is_orderable(type_ref: &TypeRef) -> bool {
    type_ref.is_primitive() || type_ref.is_enum()
}
