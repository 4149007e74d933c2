pub mod administration;
pub mod element;
pub mod key;
pub mod payload;
pub mod reference;

pub use administration::{AdministrativeInformation, IdentifierKeyValuePair};
pub use element::{validate_id_short, Element, ElementId, ElementKind, LangStringSet};
pub use key::{
    AssetKind, EntityType, Identifier, IdentifierType, Key, KeyElements, KeyType, ModelingKind,
};
pub use payload::Payload;
pub use reference::Reference;
