//! Expand/select normalization.
//!
//! Turns parser output (leaf → root path links, multi-hop expand paths,
//! repeated terms) into the shape the binder walks: root → leaf chains,
//! one navigation hop per expand term, one term per distinct path.

mod chain;
mod combine;

#[cfg(test)]
mod tests;

use crate::{
    error::ErrorClass,
    settings::UriSettings,
    syntax::token::{
        ExpandLevels, ExpandOptionsToken, ExpandTermToken, ExpandToken, OrderByToken, QueryToken,
        SelectToken,
    },
};
use thiserror::Error as ThisError;

pub use chain::{PathStep, SegmentChain};
pub use combine::{combine_child_nodes, combine_terms, merge_terms};

///
/// NormalizeError
///

#[derive(Clone, Debug, Eq, PartialEq, ThisError)]
pub enum NormalizeError {
    #[error("cannot combine expand terms with different paths '{left}' and '{right}'")]
    IncompatibleTerms { left: String, right: String },

    #[error("expand nesting exceeds the limit of {limit}")]
    RecursionLimitExceeded { limit: usize },
}

impl NormalizeError {
    #[must_use]
    pub const fn class(&self) -> ErrorClass {
        match self {
            Self::IncompatibleTerms { .. } => ErrorClass::Internal,
            Self::RecursionLimitExceeded { .. } => ErrorClass::TooDeep,
        }
    }
}

///
/// NormalizedSelect
///

#[derive(Clone, Debug, Default, PartialEq)]
pub struct NormalizedSelect {
    pub items: Vec<SegmentChain>,
}

///
/// NormalizedExpandOptions
///
/// Non-path options of one expand term. They travel with the term that
/// owns the last navigation hop.
///

#[derive(Clone, Debug, Default, PartialEq)]
pub struct NormalizedExpandOptions {
    pub filter: Option<QueryToken>,
    pub orderby: Vec<OrderByToken>,
    pub top: Option<i64>,
    pub skip: Option<i64>,
    pub count: Option<bool>,
    pub levels: Option<ExpandLevels>,
    pub search: Option<String>,
    pub select: Option<NormalizedSelect>,
}

impl NormalizedExpandOptions {
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self == &Self::default()
    }

    /// Keep every option already set here; take the rest from `other`.
    #[must_use]
    pub fn or(self, other: Self) -> Self {
        Self {
            filter: self.filter.or(other.filter),
            orderby: if self.orderby.is_empty() {
                other.orderby
            } else {
                self.orderby
            },
            top: self.top.or(other.top),
            skip: self.skip.or(other.skip),
            count: self.count.or(other.count),
            levels: self.levels.or(other.levels),
            search: self.search.or(other.search),
            select: self.select.or(other.select),
        }
    }
}

impl From<ExpandOptionsToken> for NormalizedExpandOptions {
    fn from(token: ExpandOptionsToken) -> Self {
        Self {
            filter: token.filter,
            orderby: token.orderby,
            top: token.top,
            skip: token.skip,
            count: token.count,
            levels: token.levels,
            search: token.search,
            select: token.select.map(normalize_select),
        }
    }
}

///
/// NormalizedExpandTerm
///
/// `path` holds one navigation hop, optionally preceded by type casts
/// and followed by trailing casts or `$ref`.
///

#[derive(Clone, Debug, PartialEq)]
pub struct NormalizedExpandTerm {
    pub path: SegmentChain,
    pub options: NormalizedExpandOptions,
    pub expand: Option<NormalizedExpand>,
}

impl NormalizedExpandTerm {
    #[must_use]
    pub fn new(path: SegmentChain) -> Self {
        Self {
            path,
            options: NormalizedExpandOptions::default(),
            expand: None,
        }
    }

    #[must_use]
    pub fn with_expand(mut self, expand: NormalizedExpand) -> Self {
        self.expand = Some(expand);
        self
    }
}

///
/// NormalizedExpand
///

#[derive(Clone, Debug, Default, PartialEq)]
pub struct NormalizedExpand {
    pub terms: Vec<NormalizedExpandTerm>,
}

impl NormalizedExpand {
    /// Deepest term nesting; an empty expand has depth 0.
    #[must_use]
    pub fn depth(&self) -> usize {
        let mut deepest = 0;
        let mut stack: Vec<(&Self, usize)> = vec![(self, 1)];

        while let Some((expand, level)) = stack.pop() {
            for term in &expand.terms {
                deepest = deepest.max(level);
                if let Some(nested) = &term.expand {
                    stack.push((nested, level + 1));
                }
            }
        }

        deepest
    }
}

/// Invert every select path into root → leaf order.
#[must_use]
pub fn normalize_select(select: SelectToken) -> NormalizedSelect {
    NormalizedSelect {
        items: select
            .terms
            .into_iter()
            .map(|term| SegmentChain::from_leaf(term.path))
            .collect(),
    }
}

/// Invert expand paths and split multi-hop paths into nested terms.
/// Terms are not combined; see [`normalize_expand`] for the full pass.
pub fn normalize_paths(
    expand: ExpandToken,
    settings: &UriSettings,
) -> Result<NormalizedExpand, NormalizeError> {
    normalize_level(expand, 0, settings.max_expand_depth)
}

/// Full normalization: invert and split paths, then combine terms that
/// share a path at every level.
pub fn normalize_expand(
    expand: ExpandToken,
    settings: &UriSettings,
) -> Result<NormalizedExpand, NormalizeError> {
    let normalized = combine_terms(normalize_paths(expand, settings)?)?;

    tracing::debug!(
        terms = normalized.terms.len(),
        depth = normalized.depth(),
        "normalized expand tree"
    );

    Ok(normalized)
}

fn normalize_level(
    expand: ExpandToken,
    depth: usize,
    limit: usize,
) -> Result<NormalizedExpand, NormalizeError> {
    let mut terms = Vec::with_capacity(expand.terms.len());
    for term in expand.terms {
        terms.push(normalize_term(term, depth, limit)?);
    }

    Ok(NormalizedExpand { terms })
}

fn normalize_term(
    term: ExpandTermToken,
    depth: usize,
    limit: usize,
) -> Result<NormalizedExpandTerm, NormalizeError> {
    let ExpandTermToken {
        path,
        options,
        expand,
    } = term;

    let mut hops = split_hops(SegmentChain::from_leaf(path));
    let term_depth = depth + hops.len();
    if term_depth > limit {
        return Err(NormalizeError::RecursionLimitExceeded { limit });
    }

    let nested = expand
        .map(|nested| normalize_level(nested, term_depth, limit))
        .transpose()?;

    // innermost hop owns the options and the nested expand
    let innermost = hops.pop().unwrap_or_default();
    let mut current = NormalizedExpandTerm {
        path: innermost,
        options: options.into(),
        expand: nested,
    };
    while let Some(outer) = hops.pop() {
        current = NormalizedExpandTerm::new(outer).with_expand(NormalizedExpand {
            terms: vec![current],
        });
    }

    Ok(current)
}

/// Split a chain into navigation hops. Type casts open the hop of the
/// member that follows them; trailing casts and keywords join the last hop.
fn split_hops(chain: SegmentChain) -> Vec<SegmentChain> {
    let mut hops: Vec<Vec<PathStep>> = Vec::new();
    let mut current: Vec<PathStep> = Vec::new();
    let mut has_member = false;

    for step in chain.into_steps() {
        let is_member = matches!(step, PathStep::Star { .. }) || step.member_name().is_some();
        if has_member && (is_member || step.is_type_cast()) {
            hops.push(std::mem::take(&mut current));
            has_member = false;
        }

        has_member |= is_member;
        current.push(step);
    }

    if !has_member && let Some(previous) = hops.last_mut() {
        previous.append(&mut current);
    } else if !current.is_empty() {
        hops.push(current);
    }

    hops.into_iter().map(SegmentChain::new).collect()
}
