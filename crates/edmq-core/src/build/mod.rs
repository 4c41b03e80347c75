//! URI builder.
//!
//! Renders lexical trees back into query text that the parser accepts.
//! Bound trees are lowered to lexical tokens first (see [`lower`]).

mod literal;
mod lower;
mod writer;

#[cfg(test)]
mod tests;

use crate::error::ErrorClass;
use thiserror::Error as ThisError;

pub use literal::encode_literal;
pub use lower::{lower_expression, lower_filter, lower_orderby, lower_path, lower_select_expand};
pub use writer::{UriBuilder, write_expand, write_filter, write_orderby, write_path, write_select};

///
/// BuildError
///
/// Trees this crate binds always render; these indicate a hand-built
/// tree the text grammar cannot express.
///

#[derive(Clone, Debug, Eq, PartialEq, ThisError)]
pub enum BuildError {
    #[error("cannot encode {kind} literal: {reason}")]
    UnsupportedLiteral { kind: String, reason: String },

    #[error("token cannot be rendered as query text: {token}")]
    UnrenderableToken { token: String },
}

impl BuildError {
    #[must_use]
    pub const fn class(&self) -> ErrorClass {
        ErrorClass::Internal
    }

    pub(crate) fn unrenderable(token: impl Into<String>) -> Self {
        Self::UnrenderableToken {
            token: token.into(),
        }
    }
}
