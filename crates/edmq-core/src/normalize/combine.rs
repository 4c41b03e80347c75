use crate::normalize::{NormalizeError, NormalizedExpand, NormalizedExpandTerm};

/// Merge terms that share a path, at this level and every nested one.
///
/// The result keeps the order in which each distinct path first appears.
pub fn combine_terms(expand: NormalizedExpand) -> Result<NormalizedExpand, NormalizeError> {
    let mut combined: Vec<NormalizedExpandTerm> = Vec::with_capacity(expand.terms.len());

    for term in expand.terms {
        match combined.iter().position(|existing| existing.path == term.path) {
            Some(i) => {
                let existing = combined.remove(i);
                combined.insert(i, merge_terms(existing, term)?);
            }
            None => {
                let expand = term.expand.map(combine_terms).transpose()?;
                combined.push(NormalizedExpandTerm { expand, ..term });
            }
        }
    }

    Ok(NormalizedExpand { terms: combined })
}

/// Union of the immediate nested terms of two expand terms.
/// Terms present on both sides appear once.
#[must_use]
pub fn combine_child_nodes(
    left: &NormalizedExpandTerm,
    right: &NormalizedExpandTerm,
) -> NormalizedExpand {
    let mut terms: Vec<NormalizedExpandTerm> = left
        .expand
        .as_ref()
        .map(|expand| expand.terms.clone())
        .unwrap_or_default();

    for term in right.expand.iter().flat_map(|expand| &expand.terms) {
        if !terms.contains(term) {
            terms.push(term.clone());
        }
    }

    NormalizedExpand { terms }
}

/// Merge two terms for the same path. `left` options win; options it
/// leaves unset are taken from `right`.
pub fn merge_terms(
    left: NormalizedExpandTerm,
    right: NormalizedExpandTerm,
) -> Result<NormalizedExpandTerm, NormalizeError> {
    if left.path != right.path {
        return Err(NormalizeError::IncompatibleTerms {
            left: left.path.to_string(),
            right: right.path.to_string(),
        });
    }

    let expand = match (&left.expand, &right.expand) {
        (None, None) => None,
        (Some(_), None) => left.expand.clone(),
        (None, Some(_)) => right.expand.clone(),
        (Some(_), Some(_)) => Some(combine_child_nodes(&left, &right)),
    };
    let expand = expand.map(combine_terms).transpose()?;

    Ok(NormalizedExpandTerm {
        path: left.path,
        options: left.options.or(right.options),
        expand,
    })
}
