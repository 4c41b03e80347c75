use derive_more::Display;
use std::fmt;

///
/// EdmErrorCode
///
/// Stable code carried by deferred model diagnostics.
///

#[derive(Clone, Copy, Debug, Display, Eq, Hash, PartialEq)]
pub enum EdmErrorCode {
    TypeSemanticsCouldNotConvertTypeReference,
}

///
/// EdmLocation
///
/// Where a diagnostic points. In-memory models have no source text,
/// so the best location is the name of the offending element.
///

#[derive(Clone, Debug, Eq, PartialEq)]
pub enum EdmLocation {
    Element { name: String },
    UnnamedType,
}

impl EdmLocation {
    #[must_use]
    pub fn element(name: impl Into<String>) -> Self {
        Self::Element { name: name.into() }
    }

    /// Synthesized location for anonymous types (collections, bad refs).
    #[must_use]
    pub const fn unnamed_type() -> Self {
        Self::UnnamedType
    }
}

impl fmt::Display for EdmLocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Element { name } => write!(f, "{name}"),
            Self::UnnamedType => f.write_str("(unnamed type)"),
        }
    }
}

///
/// EdmError
///
/// Deferred diagnostic attached to a bad type reference.
/// Values of this type are data, never returned as `Err`.
///

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct EdmError {
    pub code: EdmErrorCode,
    pub location: EdmLocation,
    pub message: String,
}

impl EdmError {
    #[must_use]
    pub fn new(code: EdmErrorCode, location: EdmLocation, message: impl Into<String>) -> Self {
        Self {
            code,
            location,
            message: message.into(),
        }
    }
}

impl fmt::Display for EdmError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} at {}: {}", self.code, self.location, self.message)
    }
}
