//! Bound expression tree.
//!
//! Every node knows its resolved type. `None` is reserved for an untyped
//! `null` constant and for dynamic properties of open types.

use crate::{
    edm::{EntityType, NavigationSource, OperationImport, TypeRef},
    syntax::token::{BinaryOperatorKind, UnaryOperatorKind},
    value::LiteralValue,
};
use std::sync::Arc;

///
/// ConstantNode
///
/// A bound literal. `text` is the literal as written in the query, kept
/// for diagnostics; it may differ from the canonical rendering.
///

#[derive(Clone, Debug, PartialEq)]
pub struct ConstantNode {
    pub value: LiteralValue,
    pub text: String,
    pub type_ref: Option<TypeRef>,
}

impl ConstantNode {
    #[must_use]
    pub fn new(value: LiteralValue, text: impl Into<String>) -> Self {
        let type_ref = value.type_ref();
        Self {
            value,
            text: text.into(),
            type_ref,
        }
    }

    #[must_use]
    pub fn typed(value: LiteralValue, text: impl Into<String>, type_ref: TypeRef) -> Self {
        Self {
            value,
            text: text.into(),
            type_ref: Some(type_ref),
        }
    }
}

///
/// ConvertNode
///

#[derive(Clone, Debug, PartialEq)]
pub struct ConvertNode {
    pub source: Box<SingleValueNode>,
    pub type_ref: TypeRef,
}

///
/// BinaryOperatorNode
///

#[derive(Clone, Debug, PartialEq)]
pub struct BinaryOperatorNode {
    pub op: BinaryOperatorKind,
    pub left: Box<SingleValueNode>,
    pub right: Box<SingleValueNode>,
    pub type_ref: Option<TypeRef>,
}

///
/// UnaryOperatorNode
///

#[derive(Clone, Debug, PartialEq)]
pub struct UnaryOperatorNode {
    pub op: UnaryOperatorKind,
    pub operand: Box<SingleValueNode>,
    pub type_ref: Option<TypeRef>,
}

///
/// PropertyAccessNode
///

#[derive(Clone, Debug, PartialEq)]
pub struct PropertyAccessNode {
    pub source: Box<SingleValueNode>,
    pub property: String,
    pub type_ref: TypeRef,
}

///
/// OpenPropertyAccessNode
///
/// Dynamic property of an open type; its type is unknown until runtime.
///

#[derive(Clone, Debug, PartialEq)]
pub struct OpenPropertyAccessNode {
    pub source: Box<SingleValueNode>,
    pub name: String,
}

///
/// SingleNavigationNode
///

#[derive(Clone, Debug, PartialEq)]
pub struct SingleNavigationNode {
    pub source: Box<SingleValueNode>,
    pub navigation: String,
    pub target: Arc<EntityType>,
    pub navigation_source: Option<NavigationSource>,
    pub type_ref: TypeRef,
}

///
/// FunctionCallNode
///
/// Canonical function (`startswith`, `year`, `cast`, ...) after overload
/// resolution; arguments are already converted to the chosen signature.
///

#[derive(Clone, Debug, PartialEq)]
pub struct FunctionCallNode {
    pub name: String,
    pub arguments: Vec<SingleValueNode>,
    pub type_ref: Option<TypeRef>,
}

///
/// ServiceOperationNode
///
/// Call of a function import from inside an expression.
///

#[derive(Clone, Debug, PartialEq)]
pub struct ServiceOperationNode {
    pub import: Arc<OperationImport>,
    pub arguments: Vec<SingleValueNode>,
    pub type_ref: Option<TypeRef>,
}

///
/// RangeVariableNode
///
/// The implicit `$it` of a filter or orderby: the current entity or
/// complex instance.
///

#[derive(Clone, Debug, PartialEq)]
pub struct RangeVariableNode {
    pub name: String,
    pub type_ref: TypeRef,
    pub navigation_source: Option<NavigationSource>,
}

impl RangeVariableNode {
    pub const IMPLICIT_NAME: &'static str = "$it";
}

///
/// SingleValueNode
///

#[derive(Clone, Debug, PartialEq)]
pub enum SingleValueNode {
    Constant(ConstantNode),
    Convert(ConvertNode),
    BinaryOperator(BinaryOperatorNode),
    UnaryOperator(UnaryOperatorNode),
    SingleValuePropertyAccess(PropertyAccessNode),
    SingleValueOpenPropertyAccess(OpenPropertyAccessNode),
    SingleNavigation(SingleNavigationNode),
    SingleValueFunctionCall(FunctionCallNode),
    SingleValueServiceOperation(ServiceOperationNode),
    RangeVariableReference(RangeVariableNode),
}

impl SingleValueNode {
    #[must_use]
    pub const fn type_ref(&self) -> Option<&TypeRef> {
        match self {
            Self::Constant(node) => node.type_ref.as_ref(),
            Self::Convert(node) => Some(&node.type_ref),
            Self::BinaryOperator(node) => node.type_ref.as_ref(),
            Self::UnaryOperator(node) => node.type_ref.as_ref(),
            Self::SingleValuePropertyAccess(node) => Some(&node.type_ref),
            Self::SingleValueOpenPropertyAccess(_) => None,
            Self::SingleNavigation(node) => Some(&node.type_ref),
            Self::SingleValueFunctionCall(node) => node.type_ref.as_ref(),
            Self::SingleValueServiceOperation(node) => node.type_ref.as_ref(),
            Self::RangeVariableReference(node) => Some(&node.type_ref),
        }
    }

    #[must_use]
    pub const fn is_null_constant(&self) -> bool {
        matches!(self, Self::Constant(ConstantNode { value: LiteralValue::Null, .. }))
    }

    /// Navigation source the node's entities come from, if tracked.
    #[must_use]
    pub const fn navigation_source(&self) -> Option<&NavigationSource> {
        match self {
            Self::SingleNavigation(node) => node.navigation_source.as_ref(),
            Self::RangeVariableReference(node) => node.navigation_source.as_ref(),
            _ => None,
        }
    }
}

///
/// CollectionNavigationNode
///

#[derive(Clone, Debug, PartialEq)]
pub struct CollectionNavigationNode {
    pub source: Box<SingleValueNode>,
    pub navigation: String,
    pub target: Arc<EntityType>,
    pub navigation_source: Option<NavigationSource>,
    pub type_ref: TypeRef,
}

///
/// CollectionPropertyAccessNode
///

#[derive(Clone, Debug, PartialEq)]
pub struct CollectionPropertyAccessNode {
    pub source: Box<SingleValueNode>,
    pub property: String,
    pub type_ref: TypeRef,
}

///
/// CollectionNode
///

#[derive(Clone, Debug, PartialEq)]
pub enum CollectionNode {
    EntitySet {
        source: NavigationSource,
        type_ref: TypeRef,
    },
    CollectionNavigation(CollectionNavigationNode),
    CollectionPropertyAccess(CollectionPropertyAccessNode),
}

impl CollectionNode {
    #[must_use]
    pub const fn type_ref(&self) -> Option<&TypeRef> {
        match self {
            Self::EntitySet { type_ref, .. } => Some(type_ref),
            Self::CollectionNavigation(node) => Some(&node.type_ref),
            Self::CollectionPropertyAccess(node) => Some(&node.type_ref),
        }
    }
}

///
/// QueryNode
///
/// Any bound expression: a single value or a collection.
///

#[derive(Clone, Debug, PartialEq)]
pub enum QueryNode {
    Single(SingleValueNode),
    Collection(CollectionNode),
}

impl QueryNode {
    #[must_use]
    pub const fn type_ref(&self) -> Option<&TypeRef> {
        match self {
            Self::Single(node) => node.type_ref(),
            Self::Collection(node) => node.type_ref(),
        }
    }
}
