//! Uniqueness-indexed containers
//!
//! A [`NamespaceSet`] indexes the children of one owner element by one or
//! more attributes. Every indexed value must be unique across *all* sets of
//! the same owner, not only within one set. [`OrderedNamespaceSet`] adds a
//! position-addressed sequence on top.
//!
//! The index structures themselves only know element ids. Everything that
//! touches more than one element (sibling checks, parent links, renames)
//! goes through the [`Model`](crate::ops::Model) via [`NamespaceSetMut`] and
//! [`OrderedNamespaceSetMut`].

pub mod composition;
pub mod ordered;
pub mod reconcile;
pub mod set;

use serde::{Deserialize, Serialize};

use crate::model::{ElementId, Reference};

pub use ordered::{OrderedNamespaceSet, OrderedNamespaceSetMut};
pub use set::{NamespaceSet, NamespaceSetMut};

/// Attributes a set can index its members by
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum IndexedAttribute {
    IdShort,
    SemanticId,
    QualifierType,
    ExtensionName,
}

impl IndexedAttribute {
    pub fn name(self) -> &'static str {
        match self {
            IndexedAttribute::IdShort => "id_short",
            IndexedAttribute::SemanticId => "semantic_id",
            IndexedAttribute::QualifierType => "type",
            IndexedAttribute::ExtensionName => "name",
        }
    }
}

impl std::fmt::Display for IndexedAttribute {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// One entry of a set's descriptor table
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct AttributeSpec {
    pub attribute: IndexedAttribute,
    pub case_sensitive: bool,
}

impl AttributeSpec {
    pub const fn case_sensitive(attribute: IndexedAttribute) -> Self {
        Self {
            attribute,
            case_sensitive: true,
        }
    }

    pub const fn case_insensitive(attribute: IndexedAttribute) -> Self {
        Self {
            attribute,
            case_sensitive: false,
        }
    }
}

/// Value of an indexed attribute
///
/// Text values are case-folded for case-insensitive indexes; references are
/// always compared exactly.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum AttributeValue {
    Text(String),
    Reference(Reference),
}

impl AttributeValue {
    /// The key this value is stored under in an index
    pub fn folded(&self, case_sensitive: bool) -> AttributeValue {
        match self {
            AttributeValue::Text(text) if !case_sensitive => {
                AttributeValue::Text(text.to_uppercase())
            }
            other => other.clone(),
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            AttributeValue::Text(text) => Some(text),
            AttributeValue::Reference(_) => None,
        }
    }
}

impl std::fmt::Display for AttributeValue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AttributeValue::Text(text) => f.write_str(text),
            AttributeValue::Reference(reference) => write!(f, "{}", reference),
        }
    }
}

impl From<&str> for AttributeValue {
    fn from(value: &str) -> Self {
        AttributeValue::Text(value.to_string())
    }
}

impl From<String> for AttributeValue {
    fn from(value: String) -> Self {
        AttributeValue::Text(value)
    }
}

impl From<Reference> for AttributeValue {
    fn from(value: Reference) -> Self {
        AttributeValue::Reference(value)
    }
}

impl From<&Reference> for AttributeValue {
    fn from(value: &Reference) -> Self {
        AttributeValue::Reference(value.clone())
    }
}

/// Static description of a set an element kind declares at construction
#[derive(Debug, Clone, Copy)]
pub struct SetLayout {
    pub name: &'static str,
    pub attributes: &'static [AttributeSpec],
    pub ordered: bool,
}

/// Address of a set: its owner and its position in the owner's set list
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SetHandle {
    owner: ElementId,
    index: usize,
}

impl SetHandle {
    pub(crate) fn new(owner: ElementId, index: usize) -> Self {
        Self { owner, index }
    }

    pub fn owner(&self) -> ElementId {
        self.owner
    }

    pub fn index(&self) -> usize {
        self.index
    }
}

/// A set registered on its owner, plain or ordered
#[derive(Debug, Clone)]
pub enum SetSlot {
    Plain(NamespaceSet),
    Ordered(OrderedNamespaceSet),
}

impl SetSlot {
    pub fn base(&self) -> &NamespaceSet {
        match self {
            SetSlot::Plain(set) => set,
            SetSlot::Ordered(ordered) => ordered.as_set(),
        }
    }

    pub(crate) fn base_mut(&mut self) -> &mut NamespaceSet {
        match self {
            SetSlot::Plain(set) => set,
            SetSlot::Ordered(ordered) => ordered.as_set_mut(),
        }
    }

    pub fn ordered(&self) -> Option<&OrderedNamespaceSet> {
        match self {
            SetSlot::Plain(_) => None,
            SetSlot::Ordered(ordered) => Some(ordered),
        }
    }

    pub(crate) fn ordered_mut(&mut self) -> Option<&mut OrderedNamespaceSet> {
        match self {
            SetSlot::Plain(_) => None,
            SetSlot::Ordered(ordered) => Some(ordered),
        }
    }

    /// Members in iteration order (sequence order for ordered sets)
    pub fn members(&self) -> Vec<ElementId> {
        match self {
            SetSlot::Plain(set) => set.iter().collect(),
            SetSlot::Ordered(ordered) => ordered.iter().collect(),
        }
    }

    /// Drop a member from the order sequence, if any
    pub(crate) fn forget_position(&mut self, id: ElementId) {
        if let SetSlot::Ordered(ordered) = self {
            ordered.remove_from_order(id);
        }
    }
}
