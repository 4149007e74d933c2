use serde::{Deserialize, Serialize};

use super::provider::ObjectProvider;
use crate::errors::{AasError, Result};
use crate::model::{ElementId, Identifier, Key, KeyElements, KeyType, Reference};
use crate::namespace::IndexedAttribute;
use crate::ops::Model;

/// A [`Reference`] to a model element of a known kind
///
/// Resolution starts at the last global key of the reference and walks the
/// following id_short keys down the namespace hierarchy.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct AasReference {
    reference: Reference,
    target: KeyElements,
}

impl AasReference {
    pub fn new(keys: Vec<Key>, target: KeyElements) -> Self {
        Self {
            reference: Reference::new(keys),
            target,
        }
    }

    pub fn from_reference(reference: Reference, target: KeyElements) -> Self {
        Self { reference, target }
    }

    pub fn reference(&self) -> &Reference {
        &self.reference
    }

    pub fn keys(&self) -> &[Key] {
        self.reference.keys()
    }

    /// Kind of element the reference is expected to point at
    pub fn target(&self) -> KeyElements {
        self.target
    }

    fn last_global_key(&self) -> Option<(usize, Identifier)> {
        self.keys()
            .iter()
            .enumerate()
            .rev()
            .find_map(|(index, key)| key.get_identifier().map(|id| (index, id)))
    }

    /// Identifier of the last global key
    ///
    /// # Errors
    /// * `NoGlobalKey` - If every key is local
    pub fn get_identifier(&self) -> Result<Identifier> {
        self.last_global_key()
            .map(|(_, identifier)| identifier)
            .ok_or(AasError::NoGlobalKey)
    }

    /// Follow the reference to the element it points at
    ///
    /// # Errors
    /// * `EmptyReference` - If there are no keys
    /// * `LocalReferenceUnsupported` - If no key is global
    /// * `UnresolvedIdentifier` - If the provider doesn't know the global key
    /// * `NotANamespace` - If a key points below an element without id_short children
    /// * `UnresolvedIdShort` - If an id_short key matches no child
    /// * `UnexpectedType` - If the element found is not of the target kind
    pub fn resolve(&self, model: &Model, provider: &dyn ObjectProvider) -> Result<ElementId> {
        crate::log_op_start!("resolve", key_count = self.keys().len());
        let start = std::time::Instant::now();

        let result = self.walk(model, provider);

        let duration = start.elapsed().as_millis() as u64;
        match &result {
            Ok(_) => crate::log_op_end!("resolve", duration_ms = duration),
            Err(err) => crate::log_op_error!("resolve", err.clone(), duration_ms = duration),
        }
        result
    }

    fn walk(&self, model: &Model, provider: &dyn ObjectProvider) -> Result<ElementId> {
        let keys = self.keys();
        if keys.is_empty() {
            return Err(AasError::EmptyReference);
        }
        let (start, identifier) = self
            .last_global_key()
            .ok_or(AasError::LocalReferenceUnsupported)?;

        let mut current = provider
            .get_identifiable(model, &identifier)
            .map_err(|err| match err {
                AasError::IdentifiableNotFound { .. } => AasError::UnresolvedIdentifier {
                    identifier: identifier.to_string(),
                },
                other => other,
            })?;

        for (offset, key) in keys[start + 1..].iter().enumerate() {
            let path = key_path(&keys[..=start + offset]);
            if !model.is_namespace_for(current, IndexedAttribute::IdShort) {
                return Err(AasError::NotANamespace { path });
            }
            current = model
                .get_referable(current, key.value())
                .map_err(|_| AasError::UnresolvedIdShort {
                    id_short: key.value().to_string(),
                    path,
                })?;
        }

        let element = model.get(current)?;
        let accepted = element
            .kind()
            .key_element()
            .is_some_and(|actual| self.target.accepts(actual));
        if !accepted {
            return Err(AasError::UnexpectedType {
                element: current,
                expected: self.target.to_string(),
                actual: element.kind().to_string(),
            });
        }
        Ok(current)
    }

    /// Reference to `element` built from its parent chain
    ///
    /// # Errors
    /// * `NotReferable` - If the element or a parent has no id_short
    /// * `NotEmbeddedInIdentifiable` - If the chain ends without an Identifiable
    pub fn from_referable(model: &Model, element: ElementId) -> Result<Self> {
        let mut keys = Vec::new();
        let mut current = element;
        loop {
            keys.push(Key::from_referable(model, current)?);
            let el = model.get(current)?;
            if el.is_identifiable() && el.identification().is_some() {
                break;
            }
            current = el
                .parent()
                .ok_or_else(|| AasError::NotEmbeddedInIdentifiable {
                    element_id: element.to_string(),
                })?;
        }
        keys.reverse();

        let el = model.get(element)?;
        let target = el.kind().key_element().ok_or_else(|| AasError::NotReferable {
            element_id: element.to_string(),
            kind: el.kind().to_string(),
        })?;
        Ok(Self::new(keys, target))
    }
}

impl std::fmt::Display for AasReference {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "AasReference<{}>({})", self.target, key_path(self.keys()))
    }
}

fn key_path(keys: &[Key]) -> String {
    keys.iter()
        .map(|key| key.to_string())
        .collect::<Vec<_>>()
        .join(" / ")
}

impl Key {
    /// Key addressing a single element: by identifier if it is Identifiable,
    /// by id_short otherwise
    ///
    /// # Errors
    /// * `NotReferable` - If the element has no id_short and no identifier
    pub fn from_referable(model: &Model, element: ElementId) -> Result<Key> {
        let el = model.get(element)?;
        let not_referable = || AasError::NotReferable {
            element_id: element.to_string(),
            kind: el.kind().to_string(),
        };
        let key_element = el.kind().key_element().ok_or_else(not_referable)?;
        if let Some(identification) = el.identification() {
            return Key::from_identifier(key_element, identification);
        }
        let id_short = el.id_short().ok_or_else(not_referable)?;
        Key::new(key_element, id_short, KeyType::IdShort)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{ElementKind, IdentifierType};
    use crate::resolution::DictObjectProvider;

    fn setup() -> (Model, DictObjectProvider, ElementId, ElementId, ElementId) {
        let mut model = Model::new();
        let identifier = Identifier::new("urn:sm", IdentifierType::Iri).unwrap();
        let sm = model
            .create_identifiable(ElementKind::Submodel, identifier, Some("sm"))
            .unwrap();
        let coll = model
            .create_referable(ElementKind::SubmodelElementCollection, "coll")
            .unwrap();
        let prop = model.create_referable(ElementKind::Property, "temp").unwrap();
        model.add_referable(sm, coll).unwrap();
        model.add_referable(coll, prop).unwrap();

        let mut provider = DictObjectProvider::new();
        provider.add(&model, sm).unwrap();
        (model, provider, sm, coll, prop)
    }

    #[test]
    fn test_resolve_nested_property() {
        let (model, provider, _, _, prop) = setup();
        let reference = AasReference::new(
            vec![
                Key::new(KeyElements::Submodel, "urn:sm", KeyType::Iri).unwrap(),
                Key::new(KeyElements::SubmodelElementCollection, "coll", KeyType::IdShort).unwrap(),
                Key::new(KeyElements::Property, "TEMP", KeyType::IdShort).unwrap(),
            ],
            KeyElements::Property,
        );
        assert_eq!(reference.resolve(&model, &provider).unwrap(), prop);
    }

    #[test]
    fn test_abstract_target_accepts_concrete_kind() {
        let (model, provider, _, _, prop) = setup();
        let reference = AasReference::from_referable(&model, prop).unwrap();
        let generic = AasReference::from_reference(
            reference.reference().clone(),
            KeyElements::DataElement,
        );
        assert_eq!(generic.resolve(&model, &provider).unwrap(), prop);
    }

    #[test]
    fn test_unexpected_type_carries_element() {
        let (model, provider, _, coll, _) = setup();
        let reference = AasReference::new(
            vec![
                Key::new(KeyElements::Submodel, "urn:sm", KeyType::Iri).unwrap(),
                Key::new(KeyElements::Property, "coll", KeyType::IdShort).unwrap(),
            ],
            KeyElements::Property,
        );
        let err = reference.resolve(&model, &provider).unwrap_err();
        assert_eq!(err.unexpected_element(), Some(coll));
    }

    #[test]
    fn test_local_only_reference_unsupported() {
        let (model, provider, _, _, _) = setup();
        let reference = AasReference::new(
            vec![Key::new(KeyElements::Property, "temp", KeyType::IdShort).unwrap()],
            KeyElements::Property,
        );
        assert!(matches!(
            reference.resolve(&model, &provider),
            Err(AasError::LocalReferenceUnsupported)
        ));
        assert!(matches!(reference.get_identifier(), Err(AasError::NoGlobalKey)));
    }

    #[test]
    fn test_from_referable_requires_identifiable_root() {
        let mut model = Model::new();
        let coll = model
            .create_referable(ElementKind::SubmodelElementCollection, "coll")
            .unwrap();
        let prop = model.create_referable(ElementKind::Property, "p").unwrap();
        model.add_referable(coll, prop).unwrap();

        assert!(matches!(
            AasReference::from_referable(&model, prop),
            Err(AasError::NotEmbeddedInIdentifiable { .. })
        ));
    }

    #[test]
    fn test_key_from_referable() {
        let (model, _, sm, _, prop) = setup();
        let key = Key::from_referable(&model, sm).unwrap();
        assert_eq!(key.id_type(), KeyType::Iri);
        assert_eq!(key.value(), "urn:sm");

        let key = Key::from_referable(&model, prop).unwrap();
        assert_eq!(key.id_type(), KeyType::IdShort);
        assert_eq!(key.type_(), KeyElements::Property);
    }
}
