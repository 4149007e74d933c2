//! Typed references and their resolution through the namespace hierarchy

pub mod aas_reference;
pub mod provider;

pub use aas_reference::AasReference;
pub use provider::{DictObjectProvider, ObjectProvider};
