use crate::syntax::token::{NamedValue, PathSegmentToken, SystemKeyword};
use std::fmt;

///
/// PathStep
///
/// One segment of a root → leaf chain, detached from its parent link.
///

#[derive(Clone, Debug, PartialEq)]
pub enum PathStep {
    Identifier {
        name: String,
        named_values: Option<Vec<NamedValue>>,
    },
    Keyword(SystemKeyword),
    Star {
        namespace: Option<String>,
    },
}

impl PathStep {
    #[must_use]
    pub fn identifier(name: impl Into<String>) -> Self {
        Self::Identifier {
            name: name.into(),
            named_values: None,
        }
    }

    /// Qualified (dotted) identifiers are type casts.
    #[must_use]
    pub fn is_type_cast(&self) -> bool {
        matches!(self, Self::Identifier { name, .. } if name.contains('.'))
    }

    /// Plain member name: an identifier that is not a type cast.
    #[must_use]
    pub fn member_name(&self) -> Option<&str> {
        match self {
            Self::Identifier { name, .. } if !name.contains('.') => Some(name),
            _ => None,
        }
    }

    fn from_detached(token: PathSegmentToken) -> Self {
        match token {
            PathSegmentToken::Segment(segment) => Self::Identifier {
                name: segment.identifier,
                named_values: segment.named_values,
            },
            PathSegmentToken::Keyword { keyword, .. } => Self::Keyword(keyword),
            PathSegmentToken::Star { namespace, .. } => Self::Star { namespace },
        }
    }
}

impl fmt::Display for PathStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Identifier { name, .. } => f.write_str(name),
            Self::Keyword(keyword) => f.write_str(keyword.text()),
            Self::Star {
                namespace: Some(ns),
            } => write!(f, "{ns}.*"),
            Self::Star { namespace: None } => f.write_str("*"),
        }
    }
}

///
/// SegmentChain
///
/// Root → leaf path produced from a leaf → root token chain.
/// Inversion is a flatten-then-reverse loop, so path length never
/// turns into call depth.
///

#[derive(Clone, Debug, Default, PartialEq)]
pub struct SegmentChain {
    steps: Vec<PathStep>,
}

impl SegmentChain {
    #[must_use]
    pub const fn new(steps: Vec<PathStep>) -> Self {
        Self { steps }
    }

    /// Invert a parser-produced leaf into root → leaf order.
    #[must_use]
    pub fn from_leaf(leaf: PathSegmentToken) -> Self {
        let mut steps = Vec::with_capacity(leaf.depth());
        let mut next = Some(leaf);

        while let Some(token) = next {
            let (detached, parent) = token.split_parent();
            steps.push(PathStep::from_detached(detached));
            next = parent;
        }
        steps.reverse();

        Self { steps }
    }

    #[must_use]
    pub fn steps(&self) -> &[PathStep] {
        &self.steps
    }

    #[must_use]
    pub fn into_steps(self) -> Vec<PathStep> {
        self.steps
    }

    #[must_use]
    pub fn first(&self) -> Option<&PathStep> {
        self.steps.first()
    }

    #[must_use]
    pub fn last(&self) -> Option<&PathStep> {
        self.steps.last()
    }

    #[must_use]
    pub const fn len(&self) -> usize {
        self.steps.len()
    }

    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    /// Ends in `$ref`.
    #[must_use]
    pub fn is_ref(&self) -> bool {
        matches!(self.last(), Some(PathStep::Keyword(SystemKeyword::Ref)))
    }

    /// Rebuild the parser's leaf → root form.
    #[must_use]
    pub fn to_leaf(&self) -> Option<PathSegmentToken> {
        self.steps.iter().fold(None, |parent, step| {
            let parent = parent.map(Box::new);
            Some(match step {
                PathStep::Identifier { name, named_values } => {
                    PathSegmentToken::Segment(crate::syntax::token::SegmentToken {
                        identifier: name.clone(),
                        named_values: named_values.clone(),
                        parent,
                    })
                }
                PathStep::Keyword(keyword) => PathSegmentToken::Keyword {
                    keyword: *keyword,
                    parent,
                },
                PathStep::Star { namespace } => PathSegmentToken::Star {
                    namespace: namespace.clone(),
                    parent,
                },
            })
        })
    }
}

impl fmt::Display for SegmentChain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, step) in self.steps.iter().enumerate() {
            if i > 0 {
                f.write_str("/")?;
            }
            write!(f, "{step}")?;
        }

        Ok(())
    }
}

impl From<PathSegmentToken> for SegmentChain {
    fn from(leaf: PathSegmentToken) -> Self {
        Self::from_leaf(leaf)
    }
}
