use derive_more::Display;
use edmq_core::{
    bind::BindError,
    error::{ErrorClass, ErrorOrigin as CoreErrorOrigin, QueryError},
};
use serde::{Deserialize, Serialize};
use thiserror::Error as ThisError;

///
/// Error
/// Public error type with a stable kind + origin taxonomy.
///

#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize, ThisError)]
#[error("{message}")]
pub struct Error {
    pub kind: ErrorKind,
    pub origin: ErrorOrigin,
    pub message: String,
}

impl Error {
    pub fn new(kind: ErrorKind, origin: ErrorOrigin, message: impl Into<String>) -> Self {
        Self {
            kind,
            origin,
            message: message.into(),
        }
    }

    /// Whether the caller sent something it can fix.
    #[must_use]
    pub const fn is_client_error(&self) -> bool {
        !matches!(self.kind, ErrorKind::Internal)
    }
}

impl From<QueryError> for Error {
    fn from(err: QueryError) -> Self {
        let origin = err.origin().into();
        let kind = match (&err, err.class()) {
            (_, ErrorClass::TooDeep) => ErrorKind::TooDeep,
            (_, ErrorClass::Internal) => ErrorKind::Internal,
            (QueryError::Syntax(_), ErrorClass::BadRequest) => {
                ErrorKind::Request(RequestErrorKind::Syntax)
            }
            (QueryError::Bind(bind), ErrorClass::BadRequest) => {
                ErrorKind::Request(RequestErrorKind::from(bind))
            }
            (QueryError::Normalize(_) | QueryError::Build(_), ErrorClass::BadRequest) => {
                ErrorKind::Request(RequestErrorKind::Shape)
            }
        };

        Self::new(kind, origin, err.to_string())
    }
}

///
/// ErrorKind
/// Public error taxonomy for callers.
///

#[derive(Clone, Copy, Debug, Deserialize, Display, Eq, PartialEq, Serialize)]
pub enum ErrorKind {
    #[display("request({_0})")]
    Request(RequestErrorKind),

    /// Nesting or item counts went past a configured limit.
    TooDeep,

    /// The caller cannot remediate this.
    Internal,
}

///
/// RequestErrorKind
///

#[derive(Clone, Copy, Debug, Deserialize, Display, Eq, PartialEq, Serialize)]
pub enum RequestErrorKind {
    /// Text does not lex or parse.
    Syntax,

    /// A name matches nothing in the model, or more than one thing.
    Unresolved,

    /// Operand, argument or literal types do not fit.
    Type,

    /// Path or expand structure is not allowed where it appears.
    Shape,
}

impl From<&BindError> for RequestErrorKind {
    fn from(err: &BindError) -> Self {
        match err {
            BindError::UnresolvedNavigationSource { .. }
            | BindError::UnresolvedProperty { .. }
            | BindError::UnresolvedType { .. }
            | BindError::UnresolvedOperation { .. }
            | BindError::UnresolvedSegment { .. }
            | BindError::AmbiguousMatch { .. } => Self::Unresolved,

            BindError::UnrelatedTypeCast { .. }
            | BindError::NoMatchingOverload { .. }
            | BindError::AmbiguousOverload { .. }
            | BindError::CannotConvertToType { .. }
            | BindError::InvalidEnumConstant { .. }
            | BindError::IncompatibleOperandTypes { .. }
            | BindError::NonBooleanOperand { .. }
            | BindError::NonNumericOperand { .. } => Self::Type,

            BindError::KeyCountMismatch { .. }
            | BindError::InvalidPathSegment { .. }
            | BindError::NotNavigation { .. }
            | BindError::RecursionLimitExceeded { .. }
            | BindError::ExpandCountExceeded { .. } => Self::Shape,
        }
    }
}

///
/// ErrorOrigin
/// Pipeline stage, mirrored for callers.
///

#[derive(Clone, Copy, Debug, Deserialize, Display, Eq, PartialEq, Serialize)]
pub enum ErrorOrigin {
    Syntax,
    Normalize,
    Bind,
    Build,
}

impl From<CoreErrorOrigin> for ErrorOrigin {
    fn from(origin: CoreErrorOrigin) -> Self {
        match origin {
            CoreErrorOrigin::Syntax => Self::Syntax,
            CoreErrorOrigin::Normalize => Self::Normalize,
            CoreErrorOrigin::Bind => Self::Bind,
            CoreErrorOrigin::Build => Self::Build,
        }
    }
}
