//! aasmodel core - in-memory object model for Asset Administration Shells
//!
//! This crate provides:
//! - Immutable identity values (`Key`, `Identifier`, `Reference`)
//! - An element arena (`Model`) with non-owning parent links
//! - Uniqueness-indexed child containers (`NamespaceSet`, `OrderedNamespaceSet`)
//!   with cross-set uniqueness and transactional bulk operations
//! - Typed reference resolution (`AasReference`)
//! - Synchronization with external sources through pluggable backends
//! - Structural integrity validation

pub mod backend;
pub mod errors;
pub mod logging_facility;
pub mod model;
pub mod namespace;
pub mod ops;
pub mod resolution;
pub mod rules;
pub mod sync;

// Re-export commonly used types
pub use backend::{get_backend, register_backend, Backend, BackendError, BackendRegistry};
pub use errors::{AasError, ExError, ExErrorKind, Result};
pub use model::{Element, ElementId, ElementKind, Identifier, Key, KeyElements, KeyType, Reference};
pub use namespace::{
    AttributeSpec, AttributeValue, IndexedAttribute, NamespaceSet, OrderedNamespaceSet, SetHandle,
};
pub use ops::Model;
pub use resolution::{AasReference, DictObjectProvider, ObjectProvider};
pub use sync::{commit, commit_with, update, update_with};
