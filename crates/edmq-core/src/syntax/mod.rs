//! Query-option text to lexical token trees.
//!
//! `lexer` scans, `parser` builds the untyped tree defined in `token`.
//! Nothing here looks at the model.

pub mod lexer;
pub mod parser;
pub mod token;

use crate::{error::ErrorClass, value::LiteralError};
use thiserror::Error as ThisError;

pub use lexer::{Lexer, Token, TokenKind};
pub use parser::{
    ExpressionParser, parse_expand, parse_filter, parse_literal, parse_orderby, parse_query,
    parse_resource_path, parse_select,
};
pub use token::*;

///
/// SyntaxError
///
/// Positions are byte offsets into the decoded option text.
///

#[derive(Debug, ThisError)]
pub enum SyntaxError {
    #[error("unexpected character '{found}' at {position}")]
    UnexpectedCharacter { position: usize, found: char },

    #[error("unterminated string starting at {position}")]
    UnterminatedString { position: usize },

    #[error("invalid literal at {position}: {source}")]
    InvalidLiteral {
        position: usize,
        #[source]
        source: LiteralError,
    },

    #[error("unknown literal prefix '{prefix}' at {position}")]
    UnknownLiteralPrefix { position: usize, prefix: String },

    #[error("expected {expected} at {position}, found {found}")]
    UnexpectedToken {
        position: usize,
        expected: String,
        found: String,
    },

    #[error("expected {expected}, found end of input")]
    UnexpectedEnd { expected: String },

    #[error("nesting exceeds the limit of {limit}")]
    RecursionLimitExceeded { limit: usize },

    #[error("unknown system query option '{name}'")]
    UnknownSystemOption { name: String },

    #[error("system query option '{name}' given more than once")]
    DuplicateSystemOption { name: String },

    #[error("invalid value '{value}' for query option '{name}'")]
    InvalidOptionValue { name: String, value: String },

    #[error("invalid percent-encoding in '{text}'")]
    InvalidPercentEncoding { text: String },
}

impl SyntaxError {
    #[must_use]
    pub const fn class(&self) -> ErrorClass {
        match self {
            Self::RecursionLimitExceeded { .. } => ErrorClass::TooDeep,
            _ => ErrorClass::BadRequest,
        }
    }
}
