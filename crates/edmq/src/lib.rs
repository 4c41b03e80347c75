//! ## Crate layout
//! - `core`: EDM model, query parser, normalizer, binder and URI builder.
//! - `primitives`: the closed set of EDM primitive kinds.
//! - `error`: the public error taxonomy.
//!
//! The `prelude` module carries the types needed to describe a model and
//! parse request URIs against it.

pub use edmq_core as core;
pub use edmq_primitives as primitives;

pub mod error;

pub use error::{Error, ErrorKind, ErrorOrigin, RequestErrorKind};

use edmq_core::{
    build::UriBuilder,
    edm::EdmModel,
    error::QueryError,
    settings::UriSettings,
    syntax::parse_query,
    uri::{ParsedUri, UriParser},
};

//
// Consts
//

/// Workspace version re-export for downstream tooling/tests.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

//
// Entry points
//

/// Parse and bind `uri` against `model` with default settings.
pub fn parse_uri(model: &EdmModel, uri: &str) -> Result<ParsedUri, Error> {
    parse_uri_with(model, UriSettings::default(), uri)
}

pub fn parse_uri_with(
    model: &EdmModel,
    settings: UriSettings,
    uri: &str,
) -> Result<ParsedUri, Error> {
    Ok(UriParser::new(model, settings).parse_uri(uri)?)
}

/// Reparse `uri` and render it in canonical form. No model is consulted,
/// so names are kept as written.
pub fn canonicalize_uri(uri: &str, settings: &UriSettings) -> Result<String, Error> {
    let render = || -> Result<String, QueryError> {
        let descriptor = parse_query(uri, settings)?;
        Ok(UriBuilder::build(&descriptor)?)
    };

    Ok(render()?)
}

///
/// Prelude
///

pub mod prelude {
    pub use crate::{
        Error,
        core::{
            edm::{
                ComplexType, EdmModel, EntitySet, EntityType, EnumType, Multiplicity,
                NavigationSource, Operation, OperationImport, Singleton, TypeRef,
            },
            settings::UriSettings,
            uri::{ParsedUri, UriParser},
            value::LiteralValue,
        },
        primitives::PrimitiveKind,
    };
}
