//! Lexical query tree.
//!
//! Untyped tokens for one query option. Path-shaped tokens link to their
//! parent, so `A/B` is token `B` whose parent is `A`. Consumers that walk
//! paths forward go through `normalize` first.

use crate::value::LiteralValue;
use std::fmt;

///
/// LiteralToken
///
/// A parsed literal plus the exact source text it was read from.
///

#[derive(Clone, Debug, PartialEq)]
pub struct LiteralToken {
    pub value: LiteralValue,
    pub text: String,
}

impl LiteralToken {
    #[must_use]
    pub fn new(value: LiteralValue, text: impl Into<String>) -> Self {
        Self {
            value,
            text: text.into(),
        }
    }

    #[must_use]
    pub fn null() -> Self {
        Self::new(LiteralValue::Null, "null")
    }
}

///
/// BinaryOperatorKind
///

#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum BinaryOperatorKind {
    Or,
    And,
    Equal,
    NotEqual,
    GreaterThan,
    GreaterThanOrEqual,
    LessThan,
    LessThanOrEqual,
    Has,
    Add,
    Subtract,
    Multiply,
    Divide,
    Modulo,
}

impl BinaryOperatorKind {
    pub const ALL: [Self; 14] = [
        Self::Or,
        Self::And,
        Self::Equal,
        Self::NotEqual,
        Self::GreaterThan,
        Self::GreaterThanOrEqual,
        Self::LessThan,
        Self::LessThanOrEqual,
        Self::Has,
        Self::Add,
        Self::Subtract,
        Self::Multiply,
        Self::Divide,
        Self::Modulo,
    ];

    #[must_use]
    pub const fn keyword(self) -> &'static str {
        match self {
            Self::Or => "or",
            Self::And => "and",
            Self::Equal => "eq",
            Self::NotEqual => "ne",
            Self::GreaterThan => "gt",
            Self::GreaterThanOrEqual => "ge",
            Self::LessThan => "lt",
            Self::LessThanOrEqual => "le",
            Self::Has => "has",
            Self::Add => "add",
            Self::Subtract => "sub",
            Self::Multiply => "mul",
            Self::Divide => "div",
            Self::Modulo => "mod",
        }
    }

    #[must_use]
    pub fn from_keyword(keyword: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|op| op.keyword() == keyword)
    }

    /// Binding strength; higher binds tighter.
    #[must_use]
    pub const fn precedence(self) -> u8 {
        match self {
            Self::Or => 1,
            Self::And => 2,
            Self::Equal
            | Self::NotEqual
            | Self::GreaterThan
            | Self::GreaterThanOrEqual
            | Self::LessThan
            | Self::LessThanOrEqual
            | Self::Has => 3,
            Self::Add | Self::Subtract => 4,
            Self::Multiply | Self::Divide | Self::Modulo => 5,
        }
    }

    #[must_use]
    pub const fn is_logical(self) -> bool {
        matches!(self, Self::Or | Self::And)
    }

    #[must_use]
    pub const fn is_comparison(self) -> bool {
        matches!(
            self,
            Self::Equal
                | Self::NotEqual
                | Self::GreaterThan
                | Self::GreaterThanOrEqual
                | Self::LessThan
                | Self::LessThanOrEqual
        )
    }

    #[must_use]
    pub const fn is_arithmetic(self) -> bool {
        matches!(
            self,
            Self::Add | Self::Subtract | Self::Multiply | Self::Divide | Self::Modulo
        )
    }
}

impl fmt::Display for BinaryOperatorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.keyword())
    }
}

///
/// UnaryOperatorKind
///

#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum UnaryOperatorKind {
    Negate,
    Not,
}

impl UnaryOperatorKind {
    /// Precedence of a unary operator; above every binary operator.
    pub const PRECEDENCE: u8 = 6;
}

impl fmt::Display for UnaryOperatorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Negate => "-",
            Self::Not => "not",
        })
    }
}

///
/// QueryToken
///
/// Expression token. Enum literals are `Literal` tokens carrying
/// `LiteralValue::Enum`.
///

#[derive(Clone, Debug, PartialEq)]
pub enum QueryToken {
    Literal(LiteralToken),
    PropertyAccess {
        name: String,
        parent: Option<Box<QueryToken>>,
    },
    FunctionCall {
        name: String,
        arguments: Vec<QueryToken>,
        parent: Option<Box<QueryToken>>,
    },
    BinaryOperator {
        op: BinaryOperatorKind,
        left: Box<QueryToken>,
        right: Box<QueryToken>,
    },
    UnaryOperator {
        op: UnaryOperatorKind,
        operand: Box<QueryToken>,
    },
    Star {
        parent: Option<Box<QueryToken>>,
    },
}

impl QueryToken {
    #[must_use]
    pub fn literal(value: LiteralValue, text: impl Into<String>) -> Self {
        Self::Literal(LiteralToken::new(value, text))
    }

    #[must_use]
    pub fn property(name: impl Into<String>) -> Self {
        Self::PropertyAccess {
            name: name.into(),
            parent: None,
        }
    }

    /// `parent/name`.
    #[must_use]
    pub fn property_of(parent: Self, name: impl Into<String>) -> Self {
        Self::PropertyAccess {
            name: name.into(),
            parent: Some(Box::new(parent)),
        }
    }

    #[must_use]
    pub fn call(name: impl Into<String>, arguments: Vec<Self>) -> Self {
        Self::FunctionCall {
            name: name.into(),
            arguments,
            parent: None,
        }
    }

    #[must_use]
    pub fn binary(op: BinaryOperatorKind, left: Self, right: Self) -> Self {
        Self::BinaryOperator {
            op,
            left: Box::new(left),
            right: Box::new(right),
        }
    }

    #[must_use]
    pub fn unary(op: UnaryOperatorKind, operand: Self) -> Self {
        Self::UnaryOperator {
            op,
            operand: Box::new(operand),
        }
    }

    /// Parent link of a path-shaped token.
    #[must_use]
    pub fn parent(&self) -> Option<&Self> {
        match self {
            Self::PropertyAccess { parent, .. }
            | Self::FunctionCall { parent, .. }
            | Self::Star { parent } => parent.as_deref(),
            _ => None,
        }
    }
}

///
/// SystemKeyword
///
/// `$`-prefixed path segments.
///

#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum SystemKeyword {
    Count,
    Value,
    Ref,
    Links,
    Metadata,
    Batch,
}

impl SystemKeyword {
    #[must_use]
    pub const fn text(self) -> &'static str {
        match self {
            Self::Count => "$count",
            Self::Value => "$value",
            Self::Ref => "$ref",
            Self::Links => "$links",
            Self::Metadata => "$metadata",
            Self::Batch => "$batch",
        }
    }

    #[must_use]
    pub fn from_text(text: &str) -> Option<Self> {
        [
            Self::Count,
            Self::Value,
            Self::Ref,
            Self::Links,
            Self::Metadata,
            Self::Batch,
        ]
        .into_iter()
        .find(|keyword| keyword.text() == text)
    }
}

///
/// NamedValue
///
/// One key or parameter value inside a segment's parentheses.
/// Positional values have no name.
///

#[derive(Clone, Debug, PartialEq)]
pub struct NamedValue {
    pub name: Option<String>,
    pub value: LiteralToken,
}

impl NamedValue {
    #[must_use]
    pub const fn positional(value: LiteralToken) -> Self {
        Self { name: None, value }
    }

    #[must_use]
    pub fn named(name: impl Into<String>, value: LiteralToken) -> Self {
        Self {
            name: Some(name.into()),
            value,
        }
    }
}

///
/// SegmentToken
///
/// `identifier` or `identifier(values)`. `named_values` is `None` when the
/// segment had no parentheses and `Some(vec![])` for `identifier()`.
///

#[derive(Clone, Debug, PartialEq)]
pub struct SegmentToken {
    pub identifier: String,
    pub named_values: Option<Vec<NamedValue>>,
    pub parent: Option<Box<PathSegmentToken>>,
}

///
/// PathSegmentToken
///

#[derive(Clone, Debug, PartialEq)]
pub enum PathSegmentToken {
    Segment(SegmentToken),
    Keyword {
        keyword: SystemKeyword,
        parent: Option<Box<PathSegmentToken>>,
    },
    Star {
        namespace: Option<String>,
        parent: Option<Box<PathSegmentToken>>,
    },
}

impl PathSegmentToken {
    #[must_use]
    pub fn segment(identifier: impl Into<String>, parent: Option<Self>) -> Self {
        Self::Segment(SegmentToken {
            identifier: identifier.into(),
            named_values: None,
            parent: parent.map(Box::new),
        })
    }

    #[must_use]
    pub fn parent(&self) -> Option<&Self> {
        match self {
            Self::Segment(segment) => segment.parent.as_deref(),
            Self::Keyword { parent, .. } | Self::Star { parent, .. } => parent.as_deref(),
        }
    }

    /// Detach the parent link, returning the leaf and its former parent.
    #[must_use]
    pub fn split_parent(self) -> (Self, Option<Self>) {
        match self {
            Self::Segment(mut segment) => {
                let parent = segment.parent.take().map(|p| *p);
                (Self::Segment(segment), parent)
            }
            Self::Keyword { keyword, parent } => {
                (Self::Keyword { keyword, parent: None }, parent.map(|p| *p))
            }
            Self::Star { namespace, parent } => (
                Self::Star {
                    namespace,
                    parent: None,
                },
                parent.map(|p| *p),
            ),
        }
    }

    /// Source form of this segment without its parent.
    #[must_use]
    pub fn identifier(&self) -> String {
        match self {
            Self::Segment(segment) => segment.identifier.clone(),
            Self::Keyword { keyword, .. } => keyword.text().to_string(),
            Self::Star {
                namespace: Some(ns),
                ..
            } => format!("{ns}.*"),
            Self::Star { namespace: None, .. } => "*".to_string(),
        }
    }

    /// Qualified (dotted) segment names are type casts.
    #[must_use]
    pub fn is_type_cast(&self) -> bool {
        matches!(self, Self::Segment(segment) if segment.identifier.contains('.'))
    }

    /// Number of segments from the root to this one.
    #[must_use]
    pub fn depth(&self) -> usize {
        std::iter::successors(Some(self), |segment| segment.parent()).count()
    }
}

///
/// OrderDirection
///

#[derive(Clone, Copy, Debug, Default, Eq, Hash, PartialEq)]
pub enum OrderDirection {
    #[default]
    Ascending,
    Descending,
}

///
/// OrderByToken
///

#[derive(Clone, Debug, PartialEq)]
pub struct OrderByToken {
    pub expression: QueryToken,
    pub direction: OrderDirection,
}

///
/// SelectToken
///

#[derive(Clone, Debug, Default, PartialEq)]
pub struct SelectToken {
    pub terms: Vec<SelectTermToken>,
}

///
/// SelectTermToken
///

#[derive(Clone, Debug, PartialEq)]
pub struct SelectTermToken {
    pub path: PathSegmentToken,
}

///
/// ExpandLevels
///

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum ExpandLevels {
    Max,
    Depth(u32),
}

///
/// ExpandOptionsToken
///
/// Nested options of one expand term, except the nested `$expand`.
///

#[derive(Clone, Debug, Default, PartialEq)]
pub struct ExpandOptionsToken {
    pub filter: Option<QueryToken>,
    pub orderby: Vec<OrderByToken>,
    pub top: Option<i64>,
    pub skip: Option<i64>,
    pub count: Option<bool>,
    pub levels: Option<ExpandLevels>,
    pub search: Option<String>,
    pub select: Option<SelectToken>,
}

impl ExpandOptionsToken {
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self == &Self::default()
    }
}

///
/// ExpandToken
///

#[derive(Clone, Debug, Default, PartialEq)]
pub struct ExpandToken {
    pub terms: Vec<ExpandTermToken>,
}

///
/// ExpandTermToken
///

#[derive(Clone, Debug, PartialEq)]
pub struct ExpandTermToken {
    pub path: PathSegmentToken,
    pub options: ExpandOptionsToken,
    pub expand: Option<ExpandToken>,
}

impl ExpandTermToken {
    #[must_use]
    pub fn new(path: PathSegmentToken) -> Self {
        Self {
            path,
            options: ExpandOptionsToken::default(),
            expand: None,
        }
    }
}

///
/// InlineCountKind
///

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum InlineCountKind {
    AllPages,
    None,
}

///
/// QueryOptionToken
///
/// A raw `name=value` pair for options the parser does not interpret.
///

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct QueryOptionToken {
    pub name: String,
    pub value: String,
}

///
/// QueryOptionClause
///

#[derive(Clone, Debug, PartialEq)]
pub enum QueryOptionClause {
    Filter(QueryToken),
    OrderBy(Vec<OrderByToken>),
    Select(SelectToken),
    Expand(ExpandToken),
    Top(i64),
    Skip(i64),
    Count(bool),
    InlineCount(InlineCountKind),
    Format(String),
    SkipToken(String),
    Search(String),
    Custom(QueryOptionToken),
}

///
/// QueryDescriptorToken
///
/// A whole request URI: resource path plus options in source order.
///

#[derive(Clone, Debug, Default, PartialEq)]
pub struct QueryDescriptorToken {
    pub path: Option<PathSegmentToken>,
    pub options: Vec<QueryOptionClause>,
}

impl QueryDescriptorToken {
    #[must_use]
    pub fn filter(&self) -> Option<&QueryToken> {
        self.options.iter().find_map(|option| match option {
            QueryOptionClause::Filter(token) => Some(token),
            _ => None,
        })
    }

    #[must_use]
    pub fn select(&self) -> Option<&SelectToken> {
        self.options.iter().find_map(|option| match option {
            QueryOptionClause::Select(token) => Some(token),
            _ => None,
        })
    }

    #[must_use]
    pub fn expand(&self) -> Option<&ExpandToken> {
        self.options.iter().find_map(|option| match option {
            QueryOptionClause::Expand(token) => Some(token),
            _ => None,
        })
    }

    #[must_use]
    pub fn orderby(&self) -> Option<&[OrderByToken]> {
        self.options.iter().find_map(|option| match option {
            QueryOptionClause::OrderBy(items) => Some(items.as_slice()),
            _ => None,
        })
    }
}
