use indexmap::IndexMap;

use super::{AttributeSpec, AttributeValue, IndexedAttribute, SetHandle, SetSlot};
use crate::errors::{AasError, Result};
use crate::model::ElementId;
use crate::ops::Model;

type AttributeValues = [(IndexedAttribute, AttributeValue)];

#[derive(Debug, Clone)]
struct AttributeIndex {
    spec: AttributeSpec,
    entries: IndexMap<AttributeValue, ElementId>,
}

/// Index of one owner's children by one or more attributes
///
/// The first attribute of the descriptor list defines iteration order
/// (insertion order). Values of case-insensitive attributes are stored
/// upper-cased.
#[derive(Debug, Clone)]
pub struct NamespaceSet {
    name: String,
    indexes: Vec<AttributeIndex>,
}

impl NamespaceSet {
    pub(crate) fn new(name: impl Into<String>, attributes: &[AttributeSpec]) -> Result<Self> {
        if attributes.is_empty() {
            return Err(AasError::EmptyValue {
                field: "attribute_names".to_string(),
            });
        }
        Ok(Self {
            name: name.into(),
            indexes: attributes
                .iter()
                .map(|spec| AttributeIndex {
                    spec: *spec,
                    entries: IndexMap::new(),
                })
                .collect(),
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn attributes(&self) -> impl Iterator<Item = AttributeSpec> + '_ {
        self.indexes.iter().map(|index| index.spec)
    }

    pub fn spec(&self, attribute: IndexedAttribute) -> Option<AttributeSpec> {
        self.index(attribute).map(|index| index.spec)
    }

    pub fn tracks(&self, attribute: IndexedAttribute) -> bool {
        self.index(attribute).is_some()
    }

    fn index(&self, attribute: IndexedAttribute) -> Option<&AttributeIndex> {
        self.indexes.iter().find(|index| index.spec.attribute == attribute)
    }

    pub fn len(&self) -> usize {
        self.indexes.first().map_or(0, |index| index.entries.len())
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Members in insertion order of the first indexed attribute
    pub fn iter(&self) -> impl Iterator<Item = ElementId> + '_ {
        self.indexes
            .first()
            .into_iter()
            .flat_map(|index| index.entries.values().copied())
    }

    /// Member indexed under `value`, if any
    pub fn get(&self, attribute: IndexedAttribute, value: &AttributeValue) -> Option<ElementId> {
        let index = self.index(attribute)?;
        index
            .entries
            .get(&value.folded(index.spec.case_sensitive))
            .copied()
    }

    /// # Errors
    /// * `AttributeNotFound` - If no member is indexed under `value`
    pub fn get_object_by_attribute(
        &self,
        attribute: IndexedAttribute,
        value: &AttributeValue,
    ) -> Result<ElementId> {
        self.get(attribute, value)
            .ok_or_else(|| AasError::AttributeNotFound {
                attribute: attribute.name().to_string(),
                value: value.to_string(),
            })
    }

    pub fn contains_id(&self, attribute: IndexedAttribute, value: &AttributeValue) -> bool {
        self.get(attribute, value).is_some()
    }

    /// Whether `id` is indexed under any of its current values
    pub(crate) fn contains_member(&self, id: ElementId, values: &AttributeValues) -> bool {
        values.iter().any(|(attribute, value)| self.get(*attribute, value) == Some(id))
    }

    /// First tracked attribute `values` has nothing for
    pub(crate) fn missing_attribute(&self, values: &AttributeValues) -> Option<IndexedAttribute> {
        self.attributes()
            .map(|spec| spec.attribute)
            .find(|attribute| !values.iter().any(|(a, _)| a == attribute))
    }

    pub(crate) fn insert_entries(&mut self, id: ElementId, values: &AttributeValues) {
        for index in &mut self.indexes {
            if let Some((_, value)) = values.iter().find(|(a, _)| *a == index.spec.attribute) {
                index
                    .entries
                    .insert(value.folded(index.spec.case_sensitive), id);
            }
        }
    }

    pub(crate) fn remove_entries(&mut self, id: ElementId, values: &AttributeValues) {
        for index in &mut self.indexes {
            if let Some((_, value)) = values.iter().find(|(a, _)| *a == index.spec.attribute) {
                let key = value.folded(index.spec.case_sensitive);
                if index.entries.get(&key) == Some(&id) {
                    index.entries.shift_remove(&key);
                }
            }
        }
    }

    /// Raw index entries of one attribute (stored keys are case-folded)
    pub(crate) fn entries(
        &self,
        attribute: IndexedAttribute,
    ) -> impl Iterator<Item = (&AttributeValue, ElementId)> + '_ {
        self.index(attribute)
            .into_iter()
            .flat_map(|index| index.entries.iter().map(|(value, id)| (value, *id)))
    }

    /// Most recently indexed member
    pub(crate) fn last(&self) -> Option<ElementId> {
        self.indexes
            .first()
            .and_then(|index| index.entries.last())
            .map(|(_, id)| *id)
    }
}

/// Mutating view of a namespace set inside a [`Model`]
///
/// Obtained from [`Model::namespace_set_mut`]. All operations check the
/// sibling sets of the owner and keep parent links consistent.
pub struct NamespaceSetMut<'a> {
    pub(crate) model: &'a mut Model,
    pub(crate) handle: SetHandle,
}

impl NamespaceSetMut<'_> {
    pub fn handle(&self) -> SetHandle {
        self.handle
    }

    /// Read-only access to the set
    ///
    /// # Errors
    /// * `ElementNotFound`, `SetNotFound` - If the owner or the set is gone
    pub fn view(&self) -> Result<&NamespaceSet> {
        self.model.namespace_set(self.handle)
    }

    /// Add an element; it must carry every attribute the set tracks
    ///
    /// # Errors
    /// * `MissingAttribute` - If the element lacks a tracked attribute
    /// * `Collision` - If one of its values is taken in this or a sibling set
    /// * `AlreadyHasParent` - If the element belongs to another namespace
    /// * `CycleDetected` - If the element is the owner or one of its ancestors
    pub fn add(&mut self, item: ElementId) -> Result<()> {
        self.model.add_member(self.handle, item)
    }

    /// Remove an element and clear its parent
    ///
    /// # Errors
    /// * `NotInSet` - If the element is not a member
    pub fn remove(&mut self, item: ElementId) -> Result<()> {
        self.model.detach(self.handle, item)
    }

    /// Remove an element if it is a member; returns whether it was
    ///
    /// # Errors
    /// * `ElementNotFound` - If the element doesn't exist
    pub fn discard(&mut self, item: ElementId) -> Result<bool> {
        if !self.model.set_contains(self.handle, item)? {
            return Ok(false);
        }
        self.model.detach(self.handle, item)?;
        Ok(true)
    }

    /// Remove the member indexed under `value`
    ///
    /// # Errors
    /// * `AttributeNotFound` - If no member is indexed under `value`
    pub fn remove_by_id(
        &mut self,
        attribute: IndexedAttribute,
        value: &AttributeValue,
    ) -> Result<ElementId> {
        let item = self
            .model
            .namespace_set(self.handle)?
            .get_object_by_attribute(attribute, value)?;
        self.model.detach(self.handle, item)?;
        Ok(item)
    }

    /// Remove and return the most recently indexed member
    ///
    /// # Errors
    /// * `ElementNotFound`, `SetNotFound` - If the owner or the set is gone
    pub fn pop(&mut self) -> Result<Option<ElementId>> {
        let Some(item) = self.model.namespace_set(self.handle)?.last() else {
            return Ok(None);
        };
        self.model.detach(self.handle, item)?;
        Ok(Some(item))
    }

    /// Detach every member
    ///
    /// # Errors
    /// * `ElementNotFound`, `SetNotFound` - If the owner or the set is gone
    pub fn clear(&mut self) -> Result<()> {
        while self.pop()?.is_some() {}
        Ok(())
    }

    /// # Errors
    /// * `ElementNotFound`, `SetNotFound` - If the owner, set or item is gone
    pub fn contains(&self, item: ElementId) -> Result<bool> {
        self.model.set_contains(self.handle, item)
    }
}

impl Model {
    pub(crate) fn slot(&self, handle: SetHandle) -> Result<&SetSlot> {
        self.get(handle.owner())?
            .sets
            .get(handle.index())
            .ok_or_else(|| AasError::SetNotFound {
                owner_id: handle.owner().to_string(),
                set: handle.index().to_string(),
            })
    }

    pub(crate) fn slot_mut(&mut self, handle: SetHandle) -> Result<&mut SetSlot> {
        self.get_mut(handle.owner())?
            .sets
            .get_mut(handle.index())
            .ok_or_else(|| AasError::SetNotFound {
                owner_id: handle.owner().to_string(),
                set: handle.index().to_string(),
            })
    }

    /// # Errors
    /// * `ElementNotFound`, `SetNotFound` - If the owner or the set doesn't exist
    pub fn namespace_set(&self, handle: SetHandle) -> Result<&NamespaceSet> {
        Ok(self.slot(handle)?.base())
    }

    /// # Errors
    /// * `ElementNotFound`, `SetNotFound` - If the owner or the set doesn't exist
    pub fn namespace_set_mut(&mut self, handle: SetHandle) -> Result<NamespaceSetMut<'_>> {
        self.slot(handle)?;
        Ok(NamespaceSetMut {
            model: self,
            handle,
        })
    }

    /// Members of a set in iteration order
    ///
    /// # Errors
    /// * `ElementNotFound`, `SetNotFound` - If the owner or the set doesn't exist
    pub fn set_members(&self, handle: SetHandle) -> Result<Vec<ElementId>> {
        Ok(self.slot(handle)?.members())
    }

    /// Handles of every set registered on `owner`
    ///
    /// # Errors
    /// * `ElementNotFound` - If the owner doesn't exist
    pub fn namespace_sets(&self, owner: ElementId) -> Result<Vec<SetHandle>> {
        Ok((0..self.get(owner)?.sets.len())
            .map(|index| SetHandle::new(owner, index))
            .collect())
    }

    /// Set of `owner` registered under `name`
    ///
    /// # Errors
    /// * `SetNotFound` - If the owner has no set of that name
    pub fn set_by_name(&self, owner: ElementId, name: &str) -> Result<SetHandle> {
        self.get(owner)?
            .sets
            .iter()
            .position(|slot| slot.base().name() == name)
            .map(|index| SetHandle::new(owner, index))
            .ok_or_else(|| AasError::SetNotFound {
                owner_id: owner.to_string(),
                set: name.to_string(),
            })
    }

    /// Create a plain set on `owner` and fill it with `items`
    ///
    /// The set is registered in the owner's set list before the items are
    /// added, so they are checked against all siblings. If any item fails,
    /// the items added so far are detached and the set is unregistered.
    ///
    /// # Errors
    /// * `EmptyValue` - If `attributes` is empty
    /// * Any error of [`NamespaceSetMut::add`]
    pub fn create_namespace_set(
        &mut self,
        owner: ElementId,
        name: &str,
        attributes: &[AttributeSpec],
        items: &[ElementId],
    ) -> Result<SetHandle> {
        let set = NamespaceSet::new(name, attributes)?;
        let handle = self.register_set(owner, SetSlot::Plain(set))?;
        self.fill_new_set(handle, items)?;
        Ok(handle)
    }

    pub(crate) fn register_set(&mut self, owner: ElementId, slot: SetSlot) -> Result<SetHandle> {
        let element = self.get_mut(owner)?;
        element.sets.push(slot);
        Ok(SetHandle::new(owner, element.sets.len() - 1))
    }

    pub(crate) fn fill_new_set(&mut self, handle: SetHandle, items: &[ElementId]) -> Result<()> {
        crate::log_op_start!("create_namespace_set", item_count = items.len());
        let start = std::time::Instant::now();

        if let Err(err) = self.add_all(handle, items) {
            if let Ok(owner) = self.get_mut(handle.owner()) {
                owner.sets.truncate(handle.index());
            }
            let duration = start.elapsed().as_millis() as u64;
            crate::log_op_error!("create_namespace_set", err.clone(), duration_ms = duration);
            return Err(err);
        }

        let duration = start.elapsed().as_millis() as u64;
        crate::log_op_end!("create_namespace_set", duration_ms = duration);
        Ok(())
    }

    /// Add every item or none of them
    pub(crate) fn add_all(&mut self, handle: SetHandle, items: &[ElementId]) -> Result<()> {
        for (added, item) in items.iter().enumerate() {
            if let Err(err) = self.add_member(handle, *item) {
                tracing::debug!(
                    set_name = self.slot(handle).map(|s| s.base().name().to_string()).unwrap_or_default(),
                    rolled_back = added,
                    "bulk insert failed, rolling back"
                );
                for previous in items[..added].iter().rev() {
                    if let Err(rollback_err) = self.detach(handle, *previous) {
                        tracing::warn!(element_id = %previous, error = %rollback_err, "rollback detach failed");
                    }
                }
                return Err(err);
            }
        }
        Ok(())
    }

    pub(crate) fn set_contains(&self, handle: SetHandle, item: ElementId) -> Result<bool> {
        let values = self.get(item)?.attribute_values();
        Ok(self.slot(handle)?.base().contains_member(item, &values))
    }

    /// Fail if `value` is already taken in any set of `owner` tracking `attribute`
    ///
    /// Holders in `ignore` don't count (a member being renamed, members about
    /// to be removed); `same_set` tells which set indexes count as "this set"
    /// in the error.
    pub(crate) fn check_value_free(
        &self,
        owner: ElementId,
        attribute: IndexedAttribute,
        value: &AttributeValue,
        ignore: &[ElementId],
        same_set: impl Fn(usize) -> bool,
    ) -> Result<()> {
        for (index, slot) in self.get(owner)?.sets.iter().enumerate() {
            let set = slot.base();
            if let Some(holder) = set.get(attribute, value) {
                if !ignore.contains(&holder) {
                    tracing::debug!(
                        set_name = set.name(),
                        attribute = attribute.name(),
                        value = %value,
                        "indexed value collision"
                    );
                    return Err(AasError::Collision {
                        attribute: attribute.name().to_string(),
                        value: value.to_string(),
                        in_same_set: same_set(index),
                    });
                }
            }
        }
        Ok(())
    }

    /// Validate and link `item` into the set, appending to the order if any
    pub(crate) fn add_member(&mut self, handle: SetHandle, item: ElementId) -> Result<()> {
        self.attach(handle, item)?;
        if let Some(ordered) = self.slot_mut(handle)?.ordered_mut() {
            ordered.push_order(item);
        }
        Ok(())
    }

    /// Validate and index `item` without touching any order sequence
    pub(crate) fn attach(&mut self, handle: SetHandle, item: ElementId) -> Result<()> {
        let owner = handle.owner();
        let element = self.get(item)?;
        let values = element.attribute_values();
        let current_parent = element.parent;

        if let Some(attribute) = self.slot(handle)?.base().missing_attribute(&values) {
            return Err(AasError::MissingAttribute {
                element_id: item.to_string(),
                attribute: attribute.name().to_string(),
            });
        }
        if let Some(parent) = current_parent {
            if parent != owner {
                return Err(AasError::AlreadyHasParent {
                    element_id: item.to_string(),
                    parent_id: parent.to_string(),
                });
            }
        }
        if self.is_ancestor_or_self(item, owner) {
            return Err(AasError::CycleDetected {
                element_id: item.to_string(),
            });
        }
        for (attribute, value) in &values {
            self.check_value_free(owner, *attribute, value, &[], |index| {
                index == handle.index()
            })?;
        }

        self.slot_mut(handle)?.base_mut().insert_entries(item, &values);
        self.get_mut(item)?.parent = Some(owner);
        Ok(())
    }

    /// Unindex `item`, drop it from the order and clear its parent
    pub(crate) fn detach(&mut self, handle: SetHandle, item: ElementId) -> Result<()> {
        let values = self.get(item)?.attribute_values();
        let slot = self.slot_mut(handle)?;
        if !slot.base().contains_member(item, &values) {
            return Err(AasError::NotInSet {
                element_id: item.to_string(),
                set_name: slot.base().name().to_string(),
            });
        }
        slot.base_mut().remove_entries(item, &values);
        slot.forget_position(item);
        self.get_mut(item)?.parent = None;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn id_short_set() -> NamespaceSet {
        NamespaceSet::new(
            "value",
            &[AttributeSpec::case_insensitive(IndexedAttribute::IdShort)],
        )
        .unwrap()
    }

    #[test]
    fn test_requires_attributes() {
        assert!(matches!(
            NamespaceSet::new("empty", &[]),
            Err(AasError::EmptyValue { .. })
        ));
    }

    #[test]
    fn test_lookup_is_case_folded() {
        let mut set = id_short_set();
        let id = ElementId::new();
        let values = [(IndexedAttribute::IdShort, AttributeValue::from("MaxTemp"))];
        set.insert_entries(id, &values);

        assert_eq!(set.get(IndexedAttribute::IdShort, &"maxtemp".into()), Some(id));
        assert!(set.contains_id(IndexedAttribute::IdShort, &"MAXTEMP".into()));
        assert!(set.contains_member(id, &values));
        assert_eq!(set.len(), 1);

        set.remove_entries(id, &values);
        assert!(set.is_empty());
    }

    #[test]
    fn test_get_object_by_attribute_miss() {
        let set = id_short_set();
        let err = set
            .get_object_by_attribute(IndexedAttribute::IdShort, &"nope".into())
            .unwrap_err();
        assert!(matches!(err, AasError::AttributeNotFound { .. }));
    }

    #[test]
    fn test_missing_attribute() {
        let set = id_short_set();
        let values = [(IndexedAttribute::QualifierType, AttributeValue::from("unit"))];
        assert_eq!(set.missing_attribute(&values), Some(IndexedAttribute::IdShort));
    }

    #[test]
    fn test_last_follows_insertion_order() {
        let mut set = id_short_set();
        let a = ElementId::new();
        let b = ElementId::new();
        set.insert_entries(a, &[(IndexedAttribute::IdShort, "a".into())]);
        set.insert_entries(b, &[(IndexedAttribute::IdShort, "b".into())]);
        assert_eq!(set.last(), Some(b));
        assert_eq!(set.iter().collect::<Vec<_>>(), vec![a, b]);
    }
}
