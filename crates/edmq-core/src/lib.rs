//! Core of edmq: the EDM model, the query-option lexer and parser, token
//! normalization, semantic binding, and URI building.
//!
//! Stages run in that order and each owns its error type; `error::QueryError`
//! wraps all of them. `uri::UriParser` drives the whole pipeline.
#![warn(unreachable_pub)]

// public exports are one module level down
pub mod bind;
pub mod build;
pub mod edm;
pub mod error;
pub mod normalize;
pub mod obs;
pub mod semantics;
pub mod settings;
pub mod syntax;
pub mod uri;
pub mod value;

// test
#[cfg(test)]
pub(crate) mod test_fixtures;

///
/// Prelude
///
/// Model vocabulary and the pipeline entry point.
/// Stage errors and tree node types stay in their modules.
///

pub mod prelude {
    pub use crate::{
        edm::{EdmModel, EntitySet, EntityType, NavigationSource, TypeRef},
        settings::UriSettings,
        uri::{ParsedUri, UriParser},
        value::LiteralValue,
    };
}
