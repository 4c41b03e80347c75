//! Metadata binder.
//!
//! Resolves a normalized lexical tree against an [`EdmModel`]: names become
//! model elements, literals become typed constants, operands are promoted
//! to a common type, and select/expand terms become a clause tree.

mod clause;
mod convert;
mod expr;
mod functions;
mod path;
mod resolver;
mod select_expand;

pub mod node;


use crate::{edm::EdmModel, error::ErrorClass};
use thiserror::Error as ThisError;

pub use clause::{FilterClause, OrderByClause, OrderByItem};
pub use convert::{bind_literal, convert_to_type_if_needed};
pub use expr::ExpressionBinder;
pub use functions::{CANONICAL_FUNCTIONS, FunctionSignature};
pub use node::{
    BinaryOperatorNode, CollectionNavigationNode, CollectionNode, CollectionPropertyAccessNode,
    ConstantNode, ConvertNode, FunctionCallNode, OpenPropertyAccessNode, PropertyAccessNode,
    QueryNode, RangeVariableNode, ServiceOperationNode, SingleNavigationNode, SingleValueNode,
    UnaryOperatorNode,
};
pub use path::{NamedArgument, ODataPath, PathSegment, bind_path};
pub use resolver::{Resolver, ResolverPolicy};
pub use select_expand::{
    ExpandedNavigationSelectItem, PathSelectItem, SelectExpandBinder, SelectExpandClause,
    SelectItem, WildcardSelectItem, bind_select_expand,
};

///
/// BindError
///
/// Every way a query can fail to bind. All of them come from client
/// query text, so they are bad requests except the depth/count limits.
///

#[derive(Clone, Debug, Eq, PartialEq, ThisError)]
pub enum BindError {
    #[error("no entity set, singleton or operation import named '{name}'")]
    UnresolvedNavigationSource { name: String },

    #[error("type '{owner}' has no property '{name}'")]
    UnresolvedProperty { name: String, owner: String },

    #[error("unknown type '{name}'")]
    UnresolvedType { name: String },

    #[error("unknown function or operation '{name}'")]
    UnresolvedOperation { name: String },

    #[error("cannot resolve path segment '{segment}'")]
    UnresolvedSegment { segment: String },

    #[error("type '{to}' is not related to '{from}'")]
    UnrelatedTypeCast { from: String, to: String },

    #[error("entity type '{entity}' has {expected} key properties but {found} key values were given")]
    KeyCountMismatch {
        entity: String,
        expected: usize,
        found: usize,
    },

    #[error("no overload of '{name}' accepts ({arguments})")]
    NoMatchingOverload { name: String, arguments: String },

    #[error("call of '{name}' matches several overloads equally well")]
    AmbiguousOverload { name: String },

    #[error("'{name}' matches several elements of '{owner}' ignoring case: {}", candidates.join(", "))]
    AmbiguousMatch {
        name: String,
        owner: String,
        candidates: Vec<String>,
    },

    #[error("cannot convert from '{from}' to '{to}'")]
    CannotConvertToType { from: String, to: String },

    #[error("'{value}' is not a valid constant of enum '{enum_type}'")]
    InvalidEnumConstant { value: String, enum_type: String },

    #[error("operator '{op}' cannot combine '{left}' and '{right}'")]
    IncompatibleOperandTypes {
        op: String,
        left: String,
        right: String,
    },

    #[error("'{context}' requires a boolean operand, found '{found}'")]
    NonBooleanOperand { context: String, found: String },

    #[error("'{context}' requires a numeric operand, found '{found}'")]
    NonNumericOperand { context: String, found: String },

    #[error("segment '{segment}' is not valid here: {reason}")]
    InvalidPathSegment { segment: String, reason: String },

    #[error("'{name}' on '{owner}' is not a navigation property")]
    NotNavigation { name: String, owner: String },

    #[error("binding nests deeper than the limit of {limit}")]
    RecursionLimitExceeded { limit: usize },

    #[error("expand contains more than {limit} items")]
    ExpandCountExceeded { limit: usize },
}

impl BindError {
    #[must_use]
    pub const fn class(&self) -> ErrorClass {
        match self {
            Self::RecursionLimitExceeded { .. } => ErrorClass::TooDeep,
            _ => ErrorClass::BadRequest,
        }
    }

    pub(crate) fn unresolved_property(name: &str, owner: &str) -> Self {
        Self::UnresolvedProperty {
            name: name.to_string(),
            owner: owner.to_string(),
        }
    }

    pub(crate) fn invalid_segment(segment: &str, reason: &str) -> Self {
        Self::InvalidPathSegment {
            segment: segment.to_string(),
            reason: reason.to_string(),
        }
    }
}

///
/// BindContext
///
/// What every binder needs: the model and how names are matched.
///

#[derive(Clone, Copy, Debug)]
pub struct BindContext<'m> {
    pub model: &'m EdmModel,
    pub resolver: Resolver<'m>,
}

impl<'m> BindContext<'m> {
    #[must_use]
    pub const fn new(model: &'m EdmModel, policy: ResolverPolicy) -> Self {
        Self {
            model,
            resolver: Resolver::new(model, policy),
        }
    }
}
