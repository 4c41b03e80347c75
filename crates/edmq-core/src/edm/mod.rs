//! In-memory Entity Data Model consumed by the binder.
//!
//! The model is built once through [`EdmModelBuilder`] and is read-only
//! afterwards. Types are shared through `Arc`; navigation targets are held
//! by qualified name so cyclic entity graphs need no reference cycles.

mod container;
mod diagnostic;
pub mod index;
mod model;
mod operation;
mod type_ref;
mod types;

#[cfg(test)]
mod tests;

pub use container::{EntityContainer, EntitySet, NavigationSource, OperationImport, Singleton};
pub use diagnostic::{EdmError, EdmErrorCode, EdmLocation};
pub use index::NormalizedModelIndex;
pub use model::{EdmModel, EdmModelBuilder, SchemaElement, SchemaType};
pub use operation::{Operation, OperationKind, OperationParameter, Term};
pub use type_ref::{
    BadType, BinaryTypeRef, CollectionTypeRef, ComplexTypeRef, DecimalTypeRef, EntityReferenceTypeRef,
    EntityTypeRef, EnumTypeRef, NarrowKind, PrimitiveTypeRef, SpatialTypeRef, StringTypeRef,
    StructuredTypeRef, TemporalTypeRef, TypeKind, TypeRef,
};
pub use types::{
    ComplexType, EntityType, EnumMember, EnumType, Multiplicity, NavigationProperty, PropertyRef,
    StructuralProperty, StructuredType,
};
