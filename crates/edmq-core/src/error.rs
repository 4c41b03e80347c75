use crate::{bind::BindError, build::BuildError, normalize::NormalizeError, syntax::SyntaxError};
use std::fmt;
use thiserror::Error as ThisError;

///
/// QueryError
///
/// Any failure of the parse, normalize, bind or build stages.
/// Classification is derived from the wrapped stage error.
///

#[derive(Debug, ThisError)]
pub enum QueryError {
    #[error("{0}")]
    Syntax(#[from] SyntaxError),

    #[error("{0}")]
    Normalize(#[from] NormalizeError),

    #[error("{0}")]
    Bind(#[from] BindError),

    #[error("{0}")]
    Build(#[from] BuildError),
}

impl QueryError {
    #[must_use]
    pub const fn class(&self) -> ErrorClass {
        match self {
            Self::Syntax(err) => err.class(),
            Self::Normalize(err) => err.class(),
            Self::Bind(err) => err.class(),
            Self::Build(err) => err.class(),
        }
    }

    #[must_use]
    pub const fn origin(&self) -> ErrorOrigin {
        match self {
            Self::Syntax(_) => ErrorOrigin::Syntax,
            Self::Normalize(_) => ErrorOrigin::Normalize,
            Self::Bind(_) => ErrorOrigin::Bind,
            Self::Build(_) => ErrorOrigin::Build,
        }
    }

    #[must_use]
    pub fn display_with_class(&self) -> String {
        format!("{}:{}: {}", self.origin(), self.class(), self)
    }
}

///
/// ErrorClass
/// Who is at fault and how the failure should surface.
///
/// `BadRequest` and `TooDeep` come from client-supplied query text;
/// `Internal` means the tree being rendered was malformed.
///

#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum ErrorClass {
    BadRequest,
    TooDeep,
    Internal,
}

impl fmt::Display for ErrorClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::BadRequest => "bad_request",
            Self::TooDeep => "too_deep",
            Self::Internal => "internal",
        };
        write!(f, "{label}")
    }
}

///
/// ErrorOrigin
/// Pipeline stage that produced the error.
///

#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum ErrorOrigin {
    Syntax,
    Normalize,
    Bind,
    Build,
}

impl fmt::Display for ErrorOrigin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::Syntax => "syntax",
            Self::Normalize => "normalize",
            Self::Bind => "bind",
            Self::Build => "build",
        };
        write!(f, "{label}")
    }
}

///
/// TESTS
///

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stage_errors_keep_their_origin_and_class() {
        let err = QueryError::from(SyntaxError::RecursionLimitExceeded { limit: 3 });
        assert_eq!(err.origin(), ErrorOrigin::Syntax);
        assert_eq!(err.class(), ErrorClass::TooDeep);

        let err = QueryError::from(BindError::UnresolvedNavigationSource {
            name: "Nope".to_string(),
        });
        assert_eq!(err.class(), ErrorClass::BadRequest);
        assert!(err.display_with_class().starts_with("bind:bad_request: "));

        let err = QueryError::from(BuildError::UnrenderableToken {
            token: "$it".to_string(),
        });
        assert_eq!(err.class(), ErrorClass::Internal);
    }
}
