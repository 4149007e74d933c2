//! Namespace capabilities of an element
//!
//! An element that owns sets acts as a namespace: lookups search every set
//! tracking the attribute, additions go to the first such set. The
//! capability wrappers (`*_referable`, `*_qualifier`, `*_extension`,
//! `*_by_semantic_id`) just fix the attribute.

use super::{AttributeValue, IndexedAttribute, SetHandle};
use crate::errors::{AasError, Result};
use crate::model::{validate_id_short, ElementId, Reference};
use crate::ops::Model;

impl Model {
    fn sets_tracking(&self, owner: ElementId, attribute: IndexedAttribute) -> Result<Vec<SetHandle>> {
        Ok(self
            .namespace_sets(owner)?
            .into_iter()
            .filter(|handle| {
                self.namespace_set(*handle)
                    .is_ok_and(|set| set.tracks(attribute))
            })
            .collect())
    }

    /// Whether `owner` has any set indexing by `attribute`
    pub fn is_namespace_for(&self, owner: ElementId, attribute: IndexedAttribute) -> bool {
        self.sets_tracking(owner, attribute)
            .is_ok_and(|handles| !handles.is_empty())
    }

    /// Find a child of `owner` by an indexed attribute, across all its sets
    ///
    /// # Errors
    /// * `AttributeNotFound` - If no set holds a member under `value`
    pub fn get_object(
        &self,
        owner: ElementId,
        attribute: IndexedAttribute,
        value: &AttributeValue,
    ) -> Result<ElementId> {
        for handle in self.sets_tracking(owner, attribute)? {
            if let Some(found) = self.namespace_set(handle)?.get(attribute, value) {
                return Ok(found);
            }
        }
        Err(AasError::AttributeNotFound {
            attribute: attribute.name().to_string(),
            value: value.to_string(),
        })
    }

    /// Add `item` to the first set of `owner` that indexes by `attribute`
    ///
    /// # Errors
    /// * `NoMatchingSet` - If no set of `owner` indexes by `attribute`
    /// * Any error of [`NamespaceSetMut::add`](super::NamespaceSetMut::add)
    pub fn add_object(
        &mut self,
        owner: ElementId,
        attribute: IndexedAttribute,
        item: ElementId,
    ) -> Result<SetHandle> {
        let handle = self
            .sets_tracking(owner, attribute)?
            .into_iter()
            .next()
            .ok_or_else(|| AasError::NoMatchingSet {
                element_id: item.to_string(),
                owner_id: owner.to_string(),
                attribute: attribute.name().to_string(),
            })?;
        self.add_member(handle, item)?;
        Ok(handle)
    }

    /// Remove the child of `owner` indexed under `value`
    ///
    /// # Errors
    /// * `AttributeNotFound` - If no set holds a member under `value`
    pub fn remove_object(
        &mut self,
        owner: ElementId,
        attribute: IndexedAttribute,
        value: &AttributeValue,
    ) -> Result<ElementId> {
        for handle in self.sets_tracking(owner, attribute)? {
            if let Some(found) = self.namespace_set(handle)?.get(attribute, value) {
                self.detach(handle, found)?;
                return Ok(found);
            }
        }
        Err(AasError::AttributeNotFound {
            attribute: attribute.name().to_string(),
            value: value.to_string(),
        })
    }

    /// Members of every id_short-indexed set of `owner`
    ///
    /// # Errors
    /// * `ElementNotFound` - If the owner doesn't exist
    pub fn referables(&self, owner: ElementId) -> Result<Vec<ElementId>> {
        let mut members = Vec::new();
        for handle in self.sets_tracking(owner, IndexedAttribute::IdShort)? {
            members.extend(self.set_members(handle)?);
        }
        Ok(members)
    }

    /// # Errors
    /// * `AttributeNotFound` - If there is no child with this id_short
    pub fn get_referable(&self, owner: ElementId, id_short: &str) -> Result<ElementId> {
        self.get_object(owner, IndexedAttribute::IdShort, &id_short.into())
    }

    /// # Errors
    /// Same as [`Model::add_object`]
    pub fn add_referable(&mut self, owner: ElementId, item: ElementId) -> Result<SetHandle> {
        self.add_object(owner, IndexedAttribute::IdShort, item)
    }

    /// # Errors
    /// * `AttributeNotFound` - If there is no child with this id_short
    pub fn remove_referable(&mut self, owner: ElementId, id_short: &str) -> Result<ElementId> {
        self.remove_object(owner, IndexedAttribute::IdShort, &id_short.into())
    }

    /// # Errors
    /// * `AttributeNotFound` - If no child has this semantic id
    pub fn get_object_by_semantic_id(
        &self,
        owner: ElementId,
        semantic_id: &Reference,
    ) -> Result<ElementId> {
        self.get_object(owner, IndexedAttribute::SemanticId, &semantic_id.into())
    }

    /// # Errors
    /// * `AttributeNotFound` - If no child has this semantic id
    pub fn remove_object_by_semantic_id(
        &mut self,
        owner: ElementId,
        semantic_id: &Reference,
    ) -> Result<ElementId> {
        self.remove_object(owner, IndexedAttribute::SemanticId, &semantic_id.into())
    }

    /// # Errors
    /// * `AttributeNotFound` - If there is no qualifier of this type
    pub fn get_qualifier_by_type(&self, owner: ElementId, qualifier_type: &str) -> Result<ElementId> {
        self.get_object(owner, IndexedAttribute::QualifierType, &qualifier_type.into())
    }

    /// # Errors
    /// Same as [`Model::add_object`]
    pub fn add_qualifier(&mut self, owner: ElementId, qualifier: ElementId) -> Result<SetHandle> {
        self.add_object(owner, IndexedAttribute::QualifierType, qualifier)
    }

    /// # Errors
    /// * `AttributeNotFound` - If there is no qualifier of this type
    pub fn remove_qualifier_by_type(
        &mut self,
        owner: ElementId,
        qualifier_type: &str,
    ) -> Result<ElementId> {
        self.remove_object(owner, IndexedAttribute::QualifierType, &qualifier_type.into())
    }

    /// # Errors
    /// * `AttributeNotFound` - If there is no extension of this name
    pub fn get_extension_by_name(&self, owner: ElementId, name: &str) -> Result<ElementId> {
        self.get_object(owner, IndexedAttribute::ExtensionName, &name.into())
    }

    /// # Errors
    /// Same as [`Model::add_object`]
    pub fn add_extension(&mut self, owner: ElementId, extension: ElementId) -> Result<SetHandle> {
        self.add_object(owner, IndexedAttribute::ExtensionName, extension)
    }

    /// # Errors
    /// * `AttributeNotFound` - If there is no extension of this name
    pub fn remove_extension_by_name(&mut self, owner: ElementId, name: &str) -> Result<ElementId> {
        self.remove_object(owner, IndexedAttribute::ExtensionName, &name.into())
    }

    /// Change an indexed attribute of an element
    ///
    /// The new value is checked against every set of the parent first; on
    /// success the element is unindexed from the sets holding it, updated,
    /// and indexed again. Order positions are kept. Setting the current value
    /// again is a no-op; a change of case only is allowed.
    ///
    /// # Errors
    /// * `InvalidElementKind` - If the kind has no such attribute or the value type doesn't fit
    /// * `ConstraintViolation` (2, 100) - If a new id_short is invalid
    /// * `EmptyValue` - If a qualifier type or extension name is empty
    /// * `MissingAttribute` - If the value is removed while a set still indexes it
    /// * `Collision` - If the value is taken by another element of the namespace
    pub fn rename(
        &mut self,
        member: ElementId,
        attribute: IndexedAttribute,
        value: Option<AttributeValue>,
    ) -> Result<()> {
        let element = self.get(member)?;
        validate_attribute_value(element.kind(), element.is_identifiable(), attribute, &value)?;
        if element.attribute_value(attribute) == value {
            return Ok(());
        }

        let Some(owner) = element.parent else {
            self.get_mut(member)?.assign_attribute(attribute, value);
            return Ok(());
        };

        let old_values = element.attribute_values();
        let containing: Vec<SetHandle> = self
            .namespace_sets(owner)?
            .into_iter()
            .filter(|handle| {
                self.namespace_set(*handle)
                    .is_ok_and(|set| set.contains_member(member, &old_values))
            })
            .collect();

        match &value {
            Some(new_value) => {
                self.check_value_free(owner, attribute, new_value, &[member], |index| {
                    containing.iter().any(|handle| handle.index() == index)
                })?;
            }
            None => {
                for handle in &containing {
                    if self.namespace_set(*handle)?.tracks(attribute) {
                        return Err(AasError::MissingAttribute {
                            element_id: member.to_string(),
                            attribute: attribute.name().to_string(),
                        });
                    }
                }
            }
        }

        for handle in &containing {
            self.slot_mut(*handle)?
                .base_mut()
                .remove_entries(member, &old_values);
        }
        let element = self.get_mut(member)?;
        element.assign_attribute(attribute, value);
        let new_values = element.attribute_values();
        for handle in &containing {
            self.slot_mut(*handle)?
                .base_mut()
                .insert_entries(member, &new_values);
        }
        Ok(())
    }

    /// # Errors
    /// Same as [`Model::rename`]
    pub fn set_id_short(&mut self, member: ElementId, id_short: &str) -> Result<()> {
        self.rename(member, IndexedAttribute::IdShort, Some(id_short.into()))
    }

    /// # Errors
    /// Same as [`Model::rename`]
    pub fn set_semantic_id(&mut self, member: ElementId, semantic_id: Option<Reference>) -> Result<()> {
        self.rename(
            member,
            IndexedAttribute::SemanticId,
            semantic_id.map(AttributeValue::Reference),
        )
    }

    /// # Errors
    /// Same as [`Model::rename`]
    pub fn set_qualifier_type(&mut self, member: ElementId, qualifier_type: &str) -> Result<()> {
        self.rename(
            member,
            IndexedAttribute::QualifierType,
            Some(qualifier_type.into()),
        )
    }

    /// # Errors
    /// Same as [`Model::rename`]
    pub fn set_extension_name(&mut self, member: ElementId, name: &str) -> Result<()> {
        self.rename(member, IndexedAttribute::ExtensionName, Some(name.into()))
    }
}

fn validate_attribute_value(
    kind: crate::model::ElementKind,
    identifiable: bool,
    attribute: IndexedAttribute,
    value: &Option<AttributeValue>,
) -> Result<()> {
    if !kind.supports(attribute) {
        return Err(AasError::InvalidElementKind {
            kind: kind.to_string(),
            reason: format!("no attribute '{}'", attribute),
        });
    }
    let wrong_type = || AasError::InvalidElementKind {
        kind: kind.to_string(),
        reason: format!("value type does not fit attribute '{}'", attribute),
    };
    match (attribute, value) {
        (IndexedAttribute::SemanticId, None | Some(AttributeValue::Reference(_))) => Ok(()),
        (IndexedAttribute::SemanticId, Some(_)) => Err(wrong_type()),
        (_, Some(AttributeValue::Reference(_))) => Err(wrong_type()),
        (IndexedAttribute::IdShort, Some(AttributeValue::Text(text))) => validate_id_short(text),
        (IndexedAttribute::IdShort, None) if identifiable => Ok(()),
        (IndexedAttribute::IdShort, None) => Err(AasError::constraint(
            100,
            "id_short is not allowed to be an empty string",
        )),
        (_, Some(AttributeValue::Text(text))) if !text.is_empty() => Ok(()),
        (_, _) => Err(AasError::EmptyValue {
            field: attribute.name().to_string(),
        }),
    }
}
