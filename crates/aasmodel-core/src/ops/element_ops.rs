use crate::errors::{AasError, Result};
use crate::model::{validate_id_short, Element, ElementId, ElementKind, Identifier};
use crate::namespace::{NamespaceSet, OrderedNamespaceSet, SetSlot};

use super::store::Model;

impl Model {
    /// Create an Identifiable element (shell, submodel, concept description)
    ///
    /// The element gets the namespace sets its kind declares.
    ///
    /// # Errors
    /// * `InvalidElementKind` - If `kind` is not identifiable
    /// * `ConstraintViolation` (2, 100) - If `id_short` is given but invalid
    pub fn create_identifiable(
        &mut self,
        kind: ElementKind,
        identification: Identifier,
        id_short: Option<&str>,
    ) -> Result<ElementId> {
        if !kind.is_identifiable() {
            return Err(AasError::InvalidElementKind {
                kind: kind.to_string(),
                reason: "not an Identifiable kind".to_string(),
            });
        }
        if let Some(id_short) = id_short {
            validate_id_short(id_short)?;
        }

        let mut element = Element::new(kind);
        element.identification = Some(identification);
        element.id_short = id_short.map(str::to_string);
        self.create_element(element)
    }

    /// Create a Referable, non-identifiable element (a submodel element)
    ///
    /// # Errors
    /// * `InvalidElementKind` - If `kind` is not referable or is identifiable
    /// * `ConstraintViolation` (2, 100) - If `id_short` is invalid
    pub fn create_referable(&mut self, kind: ElementKind, id_short: &str) -> Result<ElementId> {
        if !kind.is_referable() || kind.is_identifiable() {
            return Err(AasError::InvalidElementKind {
                kind: kind.to_string(),
                reason: "not a submodel element kind".to_string(),
            });
        }
        validate_id_short(id_short)?;

        let mut element = Element::new(kind);
        element.id_short = Some(id_short.to_string());
        self.create_element(element)
    }

    /// # Errors
    /// * `EmptyValue` - If `qualifier_type` is empty
    pub fn create_qualifier(&mut self, qualifier_type: &str) -> Result<ElementId> {
        if qualifier_type.is_empty() {
            return Err(AasError::EmptyValue {
                field: "type".to_string(),
            });
        }
        let mut element = Element::new(ElementKind::Qualifier);
        element.qualifier_type = Some(qualifier_type.to_string());
        self.create_element(element)
    }

    /// # Errors
    /// * `EmptyValue` - If `name` is empty
    pub fn create_extension(&mut self, name: &str) -> Result<ElementId> {
        if name.is_empty() {
            return Err(AasError::EmptyValue {
                field: "name".to_string(),
            });
        }
        let mut element = Element::new(ElementKind::Extension);
        element.extension_name = Some(name.to_string());
        self.create_element(element)
    }

    fn create_element(&mut self, element: Element) -> Result<ElementId> {
        let kind = element.kind;
        let id = self.insert(element);
        for layout in kind.layout() {
            let slot = if layout.ordered {
                SetSlot::Ordered(OrderedNamespaceSet::new(layout.name, layout.attributes)?)
            } else {
                SetSlot::Plain(NamespaceSet::new(layout.name, layout.attributes)?)
            };
            self.register_set(id, slot)?;
        }
        tracing::debug!(element_id = %id, kind = %kind, "element created");
        Ok(id)
    }
}
