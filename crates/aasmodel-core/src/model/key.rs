use serde::{Deserialize, Serialize};

use crate::errors::{AasError, Result};

/// Type of a global [`Identifier`]
///
/// * `Irdi` - International Registration Data Identifier (ISO 29002-5)
/// * `Iri` - IRI according to RFC 3987; every URI is an IRI
/// * `Custom` - custom identifiers like GUIDs
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum IdentifierType {
    Irdi,
    Iri,
    Custom,
}

impl IdentifierType {
    pub fn name(self) -> &'static str {
        match self {
            IdentifierType::Irdi => "IRDI",
            IdentifierType::Iri => "IRI",
            IdentifierType::Custom => "CUSTOM",
        }
    }
}

/// Kind of entity a [`Key`] points at
///
/// Identifiable elements, referable elements, and two kinds that point
/// outside of the model. `DataElement`, `SubmodelElement` and `EventElement`
/// are abstract: a key of that kind may point at any concrete element of the
/// group.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum KeyElements {
    // Identifiable elements
    AssetAdministrationShell,
    ConceptDescription,
    Submodel,

    // Referable elements
    AccessPermissionRule,
    AnnotatedRelationshipElement,
    BasicEventElement,
    Blob,
    Capability,
    ConceptDictionary,
    DataElement,
    Entity,
    EventElement,
    File,
    MultiLanguageProperty,
    Operation,
    Property,
    Range,
    ReferenceElement,
    RelationshipElement,
    SubmodelElement,
    SubmodelElementCollection,

    // Other
    GlobalReference,
    FragmentReference,
}

impl KeyElements {
    /// Stable numeric code (identifiables from 0, referables from 1000, others from 2000)
    pub fn code(self) -> u16 {
        match self {
            KeyElements::AssetAdministrationShell => 1,
            KeyElements::ConceptDescription => 2,
            KeyElements::Submodel => 3,
            KeyElements::AccessPermissionRule => 1000,
            KeyElements::AnnotatedRelationshipElement => 1001,
            KeyElements::BasicEventElement => 1002,
            KeyElements::Blob => 1003,
            KeyElements::Capability => 1004,
            KeyElements::ConceptDictionary => 1005,
            KeyElements::DataElement => 1006,
            KeyElements::Entity => 1007,
            KeyElements::EventElement => 1008,
            KeyElements::File => 1009,
            KeyElements::MultiLanguageProperty => 1010,
            KeyElements::Operation => 1011,
            KeyElements::Property => 1012,
            KeyElements::Range => 1013,
            KeyElements::ReferenceElement => 1014,
            KeyElements::RelationshipElement => 1015,
            KeyElements::SubmodelElement => 1016,
            KeyElements::SubmodelElementCollection => 1017,
            KeyElements::GlobalReference => 2000,
            KeyElements::FragmentReference => 2001,
        }
    }

    pub fn is_identifiable(self) -> bool {
        self.code() < 1000
    }

    /// Whether an element tagged `actual` satisfies a reference targeting `self`
    pub fn accepts(self, actual: KeyElements) -> bool {
        if self == actual {
            return true;
        }
        match self {
            KeyElements::DataElement => matches!(
                actual,
                KeyElements::Blob
                    | KeyElements::File
                    | KeyElements::MultiLanguageProperty
                    | KeyElements::Property
                    | KeyElements::Range
                    | KeyElements::ReferenceElement
            ),
            KeyElements::EventElement => actual == KeyElements::BasicEventElement,
            KeyElements::RelationshipElement => {
                actual == KeyElements::AnnotatedRelationshipElement
            }
            KeyElements::SubmodelElement => {
                (1000..2000).contains(&actual.code())
                    && !matches!(
                        actual,
                        KeyElements::AccessPermissionRule | KeyElements::ConceptDictionary
                    )
            }
            _ => false,
        }
    }
}

impl std::fmt::Display for KeyElements {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:?}", self)
    }
}

/// Type of a key value
///
/// The first three mirror [`IdentifierType`]; `IdShort` and `FragmentId` are
/// local key types.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum KeyType {
    Irdi,
    Iri,
    Custom,
    IdShort,
    FragmentId,
}

impl KeyType {
    pub fn is_local(self) -> bool {
        matches!(self, KeyType::IdShort | KeyType::FragmentId)
    }

    /// The identifier type of a global key type
    pub fn identifier_type(self) -> Option<IdentifierType> {
        match self {
            KeyType::Irdi => Some(IdentifierType::Irdi),
            KeyType::Iri => Some(IdentifierType::Iri),
            KeyType::Custom => Some(IdentifierType::Custom),
            KeyType::IdShort | KeyType::FragmentId => None,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            KeyType::Irdi => "IRDI",
            KeyType::Iri => "IRI",
            KeyType::Custom => "CUSTOM",
            KeyType::IdShort => "IDSHORT",
            KeyType::FragmentId => "FRAGMENT_ID",
        }
    }
}

impl From<IdentifierType> for KeyType {
    fn from(value: IdentifierType) -> Self {
        match value {
            IdentifierType::Irdi => KeyType::Irdi,
            IdentifierType::Iri => KeyType::Iri,
            IdentifierType::Custom => KeyType::Custom,
        }
    }
}

/// Whether an element is a template or an instance
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum ModelingKind {
    Template,
    #[default]
    Instance,
}

/// Whether an asset is a type or an instance
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AssetKind {
    Type,
    Instance,
}

/// Whether an entity is co-managed or self-managed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EntityType {
    CoManagedEntity,
    SelfManagedEntity,
}

/// Global identification of an Identifiable element
///
/// Immutable once constructed; the id is never empty.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "IdentifierRepr", into = "IdentifierRepr")]
pub struct Identifier {
    id: String,
    id_type: IdentifierType,
}

impl Identifier {
    /// # Errors
    /// * `EmptyValue` - If `id` is empty
    pub fn new(id: impl Into<String>, id_type: IdentifierType) -> Result<Self> {
        let id = id.into();
        if id.is_empty() {
            return Err(AasError::EmptyValue {
                field: "id".to_string(),
            });
        }
        Ok(Self { id, id_type })
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn id_type(&self) -> IdentifierType {
        self.id_type
    }
}

impl std::fmt::Display for Identifier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}={}", self.id_type.name(), self.id)
    }
}

#[derive(Serialize, Deserialize)]
struct IdentifierRepr {
    id: String,
    id_type: IdentifierType,
}

impl TryFrom<IdentifierRepr> for Identifier {
    type Error = AasError;

    fn try_from(repr: IdentifierRepr) -> Result<Self> {
        Identifier::new(repr.id, repr.id_type)
    }
}

impl From<Identifier> for IdentifierRepr {
    fn from(identifier: Identifier) -> Self {
        Self {
            id: identifier.id,
            id_type: identifier.id_type,
        }
    }
}

/// One hop of a [`Reference`](super::Reference)
///
/// Keys are immutable values; there is no way to change a field after
/// construction:
///
/// ```compile_fail
/// use aasmodel_core::model::{Key, KeyElements, KeyType};
///
/// let key = Key::new(KeyElements::Property, "Temp", KeyType::IdShort).unwrap();
/// key.value = "Other".to_string();
/// ```
///
/// *Constraint AASd-080:* a `GlobalReference` key must not have a local key type.
/// *Constraint AASd-081:* an `AssetAdministrationShell` key must not have a local key type.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "KeyRepr", into = "KeyRepr")]
pub struct Key {
    type_: KeyElements,
    value: String,
    id_type: KeyType,
}

impl Key {
    /// # Errors
    /// * `EmptyValue` - If `value` is empty
    /// * `ConstraintViolation` (80, 81) - If a global reference or shell key uses a local key type
    pub fn new(type_: KeyElements, value: impl Into<String>, id_type: KeyType) -> Result<Self> {
        let value = value.into();
        if value.is_empty() {
            return Err(AasError::EmptyValue {
                field: "value".to_string(),
            });
        }
        if type_ == KeyElements::GlobalReference && id_type.is_local() {
            return Err(AasError::constraint(
                80,
                "A Key with Key.type==GLOBAL_REFERENCE must not have an id_type of LocalKeyType: (IDSHORT, FRAGMENT_ID)",
            ));
        }
        if type_ == KeyElements::AssetAdministrationShell && id_type.is_local() {
            return Err(AasError::constraint(
                81,
                "A Key with Key.type==ASSET_ADMINISTRATION_SHELL must not have an id_type of LocalKeyType: IDSHORT, FRAGMENT_ID",
            ));
        }
        Ok(Self {
            type_,
            value,
            id_type,
        })
    }

    /// Key pointing at an Identifiable through its global identifier
    pub fn from_identifier(type_: KeyElements, identifier: &Identifier) -> Result<Self> {
        Key::new(type_, identifier.id(), identifier.id_type().into())
    }

    pub fn type_(&self) -> KeyElements {
        self.type_
    }

    pub fn value(&self) -> &str {
        &self.value
    }

    pub fn id_type(&self) -> KeyType {
        self.id_type
    }

    /// The identifier of a global key, `None` for local keys
    pub fn get_identifier(&self) -> Option<Identifier> {
        let id_type = self.id_type.identifier_type()?;
        Some(Identifier {
            id: self.value.clone(),
            id_type,
        })
    }
}

impl std::fmt::Display for Key {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}={}", self.id_type.name(), self.value)
    }
}

#[derive(Serialize, Deserialize)]
struct KeyRepr {
    #[serde(rename = "type")]
    type_: KeyElements,
    value: String,
    id_type: KeyType,
}

impl TryFrom<KeyRepr> for Key {
    type Error = AasError;

    fn try_from(repr: KeyRepr) -> Result<Self> {
        Key::new(repr.type_, repr.value, repr.id_type)
    }
}

impl From<Key> for KeyRepr {
    fn from(key: Key) -> Self {
        Self {
            type_: key.type_,
            value: key.value,
            id_type: key.id_type,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_key_rejects_empty_value() {
        let result = Key::new(KeyElements::Property, "", KeyType::IdShort);
        assert!(matches!(result, Err(AasError::EmptyValue { .. })));
    }

    #[test]
    fn test_global_reference_with_local_type_violates_080() {
        let result = Key::new(KeyElements::GlobalReference, "x", KeyType::IdShort);
        assert!(matches!(
            result,
            Err(AasError::ConstraintViolation {
                constraint_id: 80,
                ..
            })
        ));
    }

    #[test]
    fn test_shell_with_local_type_violates_081() {
        let result = Key::new(
            KeyElements::AssetAdministrationShell,
            "x",
            KeyType::FragmentId,
        );
        assert!(matches!(
            result,
            Err(AasError::ConstraintViolation {
                constraint_id: 81,
                ..
            })
        ));
    }

    #[test]
    fn test_get_identifier_only_for_global_keys() {
        let global = Key::new(KeyElements::Submodel, "urn:x", KeyType::Iri).unwrap();
        let identifier = global.get_identifier().unwrap();
        assert_eq!(identifier.id(), "urn:x");
        assert_eq!(identifier.id_type(), IdentifierType::Iri);

        let local = Key::new(KeyElements::Property, "Temp", KeyType::IdShort).unwrap();
        assert!(local.get_identifier().is_none());
    }

    #[test]
    fn test_key_equality_uses_all_fields() {
        let a = Key::new(KeyElements::Property, "Temp", KeyType::IdShort).unwrap();
        let b = Key::new(KeyElements::Property, "Temp", KeyType::IdShort).unwrap();
        let c = Key::new(KeyElements::Range, "Temp", KeyType::IdShort).unwrap();
        assert_eq!(a, b);
        assert_ne!(a, c);
    }

    #[test]
    fn test_key_deserialization_revalidates() {
        let json = r#"{"type":"GlobalReference","value":"x","id_type":"IdShort"}"#;
        let result: std::result::Result<Key, _> = serde_json::from_str(json);
        assert!(result.is_err());

        let json = r#"{"type":"Property","value":"Temp","id_type":"IdShort"}"#;
        let key: Key = serde_json::from_str(json).unwrap();
        assert_eq!(key.value(), "Temp");
    }

    #[test]
    fn test_abstract_kinds_accept_members() {
        assert!(KeyElements::DataElement.accepts(KeyElements::Property));
        assert!(KeyElements::SubmodelElement.accepts(KeyElements::SubmodelElementCollection));
        assert!(!KeyElements::SubmodelElement.accepts(KeyElements::Submodel));
        assert!(!KeyElements::Property.accepts(KeyElements::Range));
    }

    #[test]
    fn test_identifier_rejects_empty_id() {
        assert!(Identifier::new("", IdentifierType::Iri).is_err());
        let id = Identifier::new("urn:a", IdentifierType::Iri).unwrap();
        assert_eq!(id.to_string(), "IRI=urn:a");
    }
}
