use chrono::{DateTime, Utc};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::sync::OnceLock;
use uuid::Uuid;

use super::administration::AdministrativeInformation;
use super::key::{Identifier, KeyElements, ModelingKind};
use super::payload::Payload;
use super::reference::Reference;
use crate::errors::{AasError, Result};
use crate::namespace::{
    AttributeSpec, AttributeValue, IndexedAttribute, SetLayout, SetSlot,
};

/// Handle of an element inside a [`Model`](crate::ops::Model) (UUID v7)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ElementId(Uuid);

impl ElementId {
    pub fn new() -> Self {
        Self(Uuid::now_v7())
    }

    pub fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl Default for ElementId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for ElementId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.0.fmt(f)
    }
}

/// Concrete kind of a model element
///
/// The kind decides which capabilities an element has (referable,
/// identifiable, semantic id, qualifiers, extensions) and which namespace
/// sets it is created with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ElementKind {
    AssetAdministrationShell,
    ConceptDescription,
    Submodel,
    SubmodelElementCollection,
    Property,
    MultiLanguageProperty,
    Range,
    Blob,
    File,
    ReferenceElement,
    RelationshipElement,
    AnnotatedRelationshipElement,
    Entity,
    Operation,
    Capability,
    BasicEventElement,
    Qualifier,
    Extension,
}

const EXTENSIONS: SetLayout = SetLayout {
    name: "extension",
    attributes: &[AttributeSpec::case_sensitive(IndexedAttribute::ExtensionName)],
    ordered: false,
};

const QUALIFIERS: SetLayout = SetLayout {
    name: "qualifier",
    attributes: &[AttributeSpec::case_sensitive(IndexedAttribute::QualifierType)],
    ordered: false,
};

const ID_SHORT: &[AttributeSpec] = &[AttributeSpec::case_insensitive(IndexedAttribute::IdShort)];

const IDENTIFIABLE_LAYOUT: &[SetLayout] = &[EXTENSIONS];
const SUBMODEL_ELEMENT_LAYOUT: &[SetLayout] = &[EXTENSIONS, QUALIFIERS];
const SUBMODEL_LAYOUT: &[SetLayout] = &[
    EXTENSIONS,
    QUALIFIERS,
    SetLayout {
        name: "submodel_element",
        attributes: ID_SHORT,
        ordered: true,
    },
];
const COLLECTION_LAYOUT: &[SetLayout] = &[
    EXTENSIONS,
    QUALIFIERS,
    SetLayout {
        name: "value",
        attributes: ID_SHORT,
        ordered: true,
    },
];
const ENTITY_LAYOUT: &[SetLayout] = &[
    EXTENSIONS,
    QUALIFIERS,
    SetLayout {
        name: "statement",
        attributes: ID_SHORT,
        ordered: false,
    },
];
const ANNOTATED_RELATIONSHIP_LAYOUT: &[SetLayout] = &[
    EXTENSIONS,
    QUALIFIERS,
    SetLayout {
        name: "annotation",
        attributes: ID_SHORT,
        ordered: false,
    },
];

impl ElementKind {
    /// Key element tag used in references; `None` for non-referables
    pub fn key_element(self) -> Option<KeyElements> {
        let key = match self {
            ElementKind::AssetAdministrationShell => KeyElements::AssetAdministrationShell,
            ElementKind::ConceptDescription => KeyElements::ConceptDescription,
            ElementKind::Submodel => KeyElements::Submodel,
            ElementKind::SubmodelElementCollection => KeyElements::SubmodelElementCollection,
            ElementKind::Property => KeyElements::Property,
            ElementKind::MultiLanguageProperty => KeyElements::MultiLanguageProperty,
            ElementKind::Range => KeyElements::Range,
            ElementKind::Blob => KeyElements::Blob,
            ElementKind::File => KeyElements::File,
            ElementKind::ReferenceElement => KeyElements::ReferenceElement,
            ElementKind::RelationshipElement => KeyElements::RelationshipElement,
            ElementKind::AnnotatedRelationshipElement => KeyElements::AnnotatedRelationshipElement,
            ElementKind::Entity => KeyElements::Entity,
            ElementKind::Operation => KeyElements::Operation,
            ElementKind::Capability => KeyElements::Capability,
            ElementKind::BasicEventElement => KeyElements::BasicEventElement,
            ElementKind::Qualifier | ElementKind::Extension => return None,
        };
        Some(key)
    }

    pub fn is_referable(self) -> bool {
        self.key_element().is_some()
    }

    pub fn is_identifiable(self) -> bool {
        self.key_element().is_some_and(KeyElements::is_identifiable)
    }

    /// Whether elements of this kind carry the given indexed attribute
    pub fn supports(self, attribute: IndexedAttribute) -> bool {
        match attribute {
            IndexedAttribute::IdShort => self.is_referable(),
            IndexedAttribute::SemanticId => !matches!(
                self,
                ElementKind::AssetAdministrationShell | ElementKind::ConceptDescription
            ),
            IndexedAttribute::QualifierType => self == ElementKind::Qualifier,
            IndexedAttribute::ExtensionName => self == ElementKind::Extension,
        }
    }

    /// Namespace sets an element of this kind is created with
    pub fn layout(self) -> &'static [SetLayout] {
        match self {
            ElementKind::AssetAdministrationShell | ElementKind::ConceptDescription => {
                IDENTIFIABLE_LAYOUT
            }
            ElementKind::Submodel => SUBMODEL_LAYOUT,
            ElementKind::SubmodelElementCollection => COLLECTION_LAYOUT,
            ElementKind::Entity => ENTITY_LAYOUT,
            ElementKind::AnnotatedRelationshipElement => ANNOTATED_RELATIONSHIP_LAYOUT,
            ElementKind::Qualifier | ElementKind::Extension => &[],
            _ => SUBMODEL_ELEMENT_LAYOUT,
        }
    }
}

impl std::fmt::Display for ElementKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:?}", self)
    }
}

/// Language-tagged strings, one text per language
pub type LangStringSet = BTreeMap<String, String>;

fn id_short_pattern() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^[a-zA-Z][a-zA-Z0-9_]*$").expect("valid id_short pattern"))
}

/// Check an id_short against AASd-100 (non-empty) and AASd-002 (pattern)
pub fn validate_id_short(id_short: &str) -> Result<()> {
    if id_short.is_empty() {
        return Err(AasError::constraint(
            100,
            "id_short is not allowed to be an empty string",
        ));
    }
    if !id_short_pattern().is_match(id_short) {
        return Err(AasError::constraint(
            2,
            format!(
                "The id_short must start with a letter, followed by letters, digits or underscores; got '{}'",
                id_short
            ),
        ));
    }
    Ok(())
}

/// A node of the object graph
///
/// Elements live in a [`Model`](crate::ops::Model) and refer to each other
/// by [`ElementId`]. Indexed attributes (`id_short`, `semantic_id`,
/// qualifier type, extension name) and the parent link have no public
/// setters here; they change only through the model so that every set
/// indexing the element stays consistent.
#[derive(Debug, Clone)]
pub struct Element {
    pub(crate) id: ElementId,
    pub(crate) kind: ElementKind,
    pub(crate) id_short: Option<String>,
    pub(crate) identification: Option<Identifier>,
    pub(crate) administration: Option<AdministrativeInformation>,
    pub(crate) category: Option<String>,
    pub(crate) description: LangStringSet,
    pub(crate) display_name: LangStringSet,
    pub(crate) semantic_id: Option<Reference>,
    pub(crate) qualifier_type: Option<String>,
    pub(crate) extension_name: Option<String>,
    pub(crate) kind_of_modeling: ModelingKind,
    pub(crate) source: String,
    pub(crate) parent: Option<ElementId>,
    pub(crate) sets: Vec<SetSlot>,
    pub(crate) payload: Payload,
    pub(crate) last_updated: Option<DateTime<Utc>>,
}

impl Element {
    pub(crate) fn new(kind: ElementKind) -> Self {
        Self {
            id: ElementId::new(),
            kind,
            id_short: None,
            identification: None,
            administration: None,
            category: None,
            description: LangStringSet::new(),
            display_name: LangStringSet::new(),
            semantic_id: None,
            qualifier_type: None,
            extension_name: None,
            kind_of_modeling: ModelingKind::default(),
            source: String::new(),
            parent: None,
            sets: Vec::new(),
            payload: Payload::new(),
            last_updated: None,
        }
    }

    pub fn id(&self) -> ElementId {
        self.id
    }

    pub fn kind(&self) -> ElementKind {
        self.kind
    }

    pub fn id_short(&self) -> Option<&str> {
        self.id_short.as_deref()
    }

    pub fn identification(&self) -> Option<&Identifier> {
        self.identification.as_ref()
    }

    pub fn administration(&self) -> Option<&AdministrativeInformation> {
        self.administration.as_ref()
    }

    pub fn category(&self) -> Option<&str> {
        self.category.as_deref()
    }

    pub fn description(&self) -> &LangStringSet {
        &self.description
    }

    pub fn display_name(&self) -> &LangStringSet {
        &self.display_name
    }

    pub fn semantic_id(&self) -> Option<&Reference> {
        self.semantic_id.as_ref()
    }

    pub fn qualifier_type(&self) -> Option<&str> {
        self.qualifier_type.as_deref()
    }

    pub fn extension_name(&self) -> Option<&str> {
        self.extension_name.as_deref()
    }

    pub fn kind_of_modeling(&self) -> ModelingKind {
        self.kind_of_modeling
    }

    /// Locator of the external source; empty means inherited from the parent
    pub fn source(&self) -> &str {
        &self.source
    }

    pub fn parent(&self) -> Option<ElementId> {
        self.parent
    }

    pub fn payload(&self) -> &Payload {
        &self.payload
    }

    /// When the element was last refreshed from its source
    pub fn last_updated(&self) -> Option<DateTime<Utc>> {
        self.last_updated
    }

    /// Number of namespace sets registered on this element
    pub fn set_count(&self) -> usize {
        self.sets.len()
    }

    pub fn is_referable(&self) -> bool {
        self.kind.is_referable()
    }

    pub fn is_identifiable(&self) -> bool {
        self.kind.is_identifiable()
    }

    /// Current value of an indexed attribute, if the element has one
    pub fn attribute_value(&self, attribute: IndexedAttribute) -> Option<AttributeValue> {
        match attribute {
            IndexedAttribute::IdShort => self.id_short.as_deref().map(AttributeValue::from),
            IndexedAttribute::SemanticId => self.semantic_id.as_ref().map(AttributeValue::from),
            IndexedAttribute::QualifierType => {
                self.qualifier_type.as_deref().map(AttributeValue::from)
            }
            IndexedAttribute::ExtensionName => {
                self.extension_name.as_deref().map(AttributeValue::from)
            }
        }
    }

    /// All indexed attribute values the element currently carries
    pub fn attribute_values(&self) -> Vec<(IndexedAttribute, AttributeValue)> {
        [
            IndexedAttribute::IdShort,
            IndexedAttribute::SemanticId,
            IndexedAttribute::QualifierType,
            IndexedAttribute::ExtensionName,
        ]
        .into_iter()
        .filter_map(|attr| self.attribute_value(attr).map(|value| (attr, value)))
        .collect()
    }

    pub(crate) fn assign_attribute(
        &mut self,
        attribute: IndexedAttribute,
        value: Option<AttributeValue>,
    ) {
        match attribute {
            IndexedAttribute::IdShort => {
                self.id_short = value.and_then(|v| v.as_text().map(str::to_string))
            }
            IndexedAttribute::SemanticId => {
                self.semantic_id = match value {
                    Some(AttributeValue::Reference(reference)) => Some(reference),
                    _ => None,
                }
            }
            IndexedAttribute::QualifierType => {
                self.qualifier_type = value.and_then(|v| v.as_text().map(str::to_string))
            }
            IndexedAttribute::ExtensionName => {
                self.extension_name = value.and_then(|v| v.as_text().map(str::to_string))
            }
        }
    }

    /// # Errors
    /// * `ConstraintViolation` (100) - If the category is an empty string
    pub fn set_category(&mut self, category: Option<String>) -> Result<()> {
        if category.as_deref() == Some("") {
            return Err(AasError::constraint(
                100,
                "category is not allowed to be an empty string",
            ));
        }
        self.category = category;
        Ok(())
    }

    pub fn description_mut(&mut self) -> &mut LangStringSet {
        &mut self.description
    }

    pub fn display_name_mut(&mut self) -> &mut LangStringSet {
        &mut self.display_name
    }

    /// # Errors
    /// * `InvalidElementKind` - If the element is not Identifiable
    pub fn set_administration(
        &mut self,
        administration: Option<AdministrativeInformation>,
    ) -> Result<()> {
        if !self.is_identifiable() {
            return Err(AasError::InvalidElementKind {
                kind: self.kind.to_string(),
                reason: "only Identifiables carry administrative information".to_string(),
            });
        }
        self.administration = administration;
        Ok(())
    }

    pub fn set_kind_of_modeling(&mut self, kind: ModelingKind) {
        self.kind_of_modeling = kind;
    }

    pub fn set_source(&mut self, source: impl Into<String>) {
        self.source = source.into();
    }

    pub fn payload_mut(&mut self) -> &mut Payload {
        &mut self.payload
    }
}
