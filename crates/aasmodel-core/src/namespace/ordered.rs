use std::ops::Range;

use super::set::NamespaceSet;
use super::{AttributeSpec, AttributeValue, IndexedAttribute, SetHandle, SetSlot};
use crate::errors::{AasError, Result};
use crate::model::ElementId;
use crate::ops::Model;

/// A [`NamespaceSet`] whose members also have a position
///
/// The order sequence and the indexes always hold the same members.
#[derive(Debug, Clone)]
pub struct OrderedNamespaceSet {
    set: NamespaceSet,
    order: Vec<ElementId>,
}

impl OrderedNamespaceSet {
    pub(crate) fn new(name: impl Into<String>, attributes: &[AttributeSpec]) -> Result<Self> {
        Ok(Self {
            set: NamespaceSet::new(name, attributes)?,
            order: Vec::new(),
        })
    }

    pub fn as_set(&self) -> &NamespaceSet {
        &self.set
    }

    pub(crate) fn as_set_mut(&mut self) -> &mut NamespaceSet {
        &mut self.set
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    /// Members in sequence order
    pub fn iter(&self) -> impl Iterator<Item = ElementId> + '_ {
        self.order.iter().copied()
    }

    pub fn get(&self, index: usize) -> Option<ElementId> {
        self.order.get(index).copied()
    }

    /// # Errors
    /// * `IndexOutOfRange` - If the range exceeds the sequence
    pub fn slice(&self, range: Range<usize>) -> Result<&[ElementId]> {
        self.check_range(&range)?;
        Ok(&self.order[range])
    }

    pub fn position(&self, item: ElementId) -> Option<usize> {
        self.order.iter().position(|id| *id == item)
    }

    pub fn get_object_by_attribute(
        &self,
        attribute: IndexedAttribute,
        value: &AttributeValue,
    ) -> Result<ElementId> {
        self.set.get_object_by_attribute(attribute, value)
    }

    fn check_index(&self, index: usize) -> Result<()> {
        if index >= self.order.len() {
            return Err(AasError::IndexOutOfRange {
                index,
                len: self.order.len(),
            });
        }
        Ok(())
    }

    fn check_range(&self, range: &Range<usize>) -> Result<()> {
        if range.start > range.end || range.end > self.order.len() {
            return Err(AasError::IndexOutOfRange {
                index: range.end,
                len: self.order.len(),
            });
        }
        Ok(())
    }

    pub(crate) fn push_order(&mut self, item: ElementId) {
        self.order.push(item);
    }

    pub(crate) fn remove_from_order(&mut self, item: ElementId) {
        self.order.retain(|id| *id != item);
    }
}

/// Mutating view of an ordered set inside a [`Model`]
pub struct OrderedNamespaceSetMut<'a> {
    model: &'a mut Model,
    handle: SetHandle,
}

impl OrderedNamespaceSetMut<'_> {
    pub fn handle(&self) -> SetHandle {
        self.handle
    }

    /// # Errors
    /// * `ElementNotFound`, `SetNotFound`, `NotOrdered` - If the set is gone or not ordered
    pub fn view(&self) -> Result<&OrderedNamespaceSet> {
        self.model.ordered_set(self.handle)
    }

    fn ordered_mut(&mut self) -> Result<&mut OrderedNamespaceSet> {
        let slot = self.model.slot_mut(self.handle)?;
        let name = slot.base().name().to_string();
        slot.ordered_mut()
            .ok_or(AasError::NotOrdered { set_name: name })
    }

    /// Append an element
    ///
    /// # Errors
    /// Same as [`NamespaceSetMut::add`](super::NamespaceSetMut::add)
    pub fn add(&mut self, item: ElementId) -> Result<()> {
        self.model.add_member(self.handle, item)
    }

    /// Validate like `add`, then place the element at `index`
    ///
    /// An index past the end appends.
    ///
    /// # Errors
    /// Same as [`NamespaceSetMut::add`](super::NamespaceSetMut::add)
    pub fn insert(&mut self, index: usize, item: ElementId) -> Result<()> {
        let index = index.min(self.view()?.len());
        self.model.attach(self.handle, item)?;
        self.ordered_mut()?.order.insert(index, item);
        Ok(())
    }

    /// Replace the element at `index`; the old one is detached
    ///
    /// # Errors
    /// * `IndexOutOfRange` - If `index` is past the end
    /// * Any error of `add` for the new element (nothing changes then)
    pub fn set(&mut self, index: usize, item: ElementId) -> Result<ElementId> {
        let view = self.view()?;
        view.check_index(index)?;
        let old = view.order[index];

        self.model.attach(self.handle, item)?;
        self.ordered_mut()?.order[index] = item;
        self.model.detach(self.handle, old)?;
        Ok(old)
    }

    /// Replace a contiguous range with `items`, any length
    ///
    /// All replacements are validated and indexed before the replaced
    /// elements are detached. If one replacement fails, the ones already
    /// indexed are detached again and the set is unchanged.
    ///
    /// # Errors
    /// * `IndexOutOfRange` - If the range exceeds the sequence
    /// * Any error of `add` for a replacement
    pub fn replace_range(
        &mut self,
        range: Range<usize>,
        items: &[ElementId],
    ) -> Result<Vec<ElementId>> {
        let view = self.view()?;
        view.check_range(&range)?;
        let replaced: Vec<ElementId> = view.order[range.clone()].to_vec();

        for (added, item) in items.iter().enumerate() {
            if let Err(err) = self.model.attach(self.handle, *item) {
                tracing::debug!(rolled_back = added, "slice replacement failed, rolling back");
                for previous in items[..added].iter().rev() {
                    if let Err(rollback_err) = self.model.detach(self.handle, *previous) {
                        tracing::warn!(element_id = %previous, error = %rollback_err, "rollback detach failed");
                    }
                }
                return Err(err);
            }
        }

        self.ordered_mut()?
            .order
            .splice(range, items.iter().copied());
        for old in &replaced {
            self.model.detach(self.handle, *old)?;
        }
        Ok(replaced)
    }

    /// Detach the element at `index`
    ///
    /// # Errors
    /// * `IndexOutOfRange` - If `index` is past the end
    pub fn delete(&mut self, index: usize) -> Result<()> {
        self.pop_at(index).map(|_| ())
    }

    /// Detach every element of a contiguous range
    ///
    /// # Errors
    /// * `IndexOutOfRange` - If the range exceeds the sequence
    pub fn delete_range(&mut self, range: Range<usize>) -> Result<Vec<ElementId>> {
        let removed = self.view()?.slice(range)?.to_vec();
        for item in &removed {
            self.model.detach(self.handle, *item)?;
        }
        Ok(removed)
    }

    /// Detach and return the element at `index`
    ///
    /// # Errors
    /// * `IndexOutOfRange` - If `index` is past the end
    pub fn pop_at(&mut self, index: usize) -> Result<ElementId> {
        let view = self.view()?;
        view.check_index(index)?;
        let item = view.order[index];
        self.model.detach(self.handle, item)?;
        Ok(item)
    }

    /// # Errors
    /// * `NotInSet` - If the element is not a member
    pub fn remove(&mut self, item: ElementId) -> Result<()> {
        self.model.detach(self.handle, item)
    }

    /// # Errors
    /// * `ElementNotFound` - If the element doesn't exist
    pub fn discard(&mut self, item: ElementId) -> Result<bool> {
        if !self.model.set_contains(self.handle, item)? {
            return Ok(false);
        }
        self.model.detach(self.handle, item)?;
        Ok(true)
    }

    /// Detach every member
    ///
    /// # Errors
    /// * `ElementNotFound`, `SetNotFound` - If the owner or the set is gone
    pub fn clear(&mut self) -> Result<()> {
        for item in self.view()?.order.clone() {
            self.model.detach(self.handle, item)?;
        }
        Ok(())
    }
}

impl Model {
    /// # Errors
    /// * `ElementNotFound`, `SetNotFound` - If the owner or the set doesn't exist
    /// * `NotOrdered` - If the set has no order
    pub fn ordered_set(&self, handle: SetHandle) -> Result<&OrderedNamespaceSet> {
        let slot = self.slot(handle)?;
        slot.ordered().ok_or_else(|| AasError::NotOrdered {
            set_name: slot.base().name().to_string(),
        })
    }

    /// # Errors
    /// * `ElementNotFound`, `SetNotFound` - If the owner or the set doesn't exist
    /// * `NotOrdered` - If the set has no order
    pub fn ordered_set_mut(&mut self, handle: SetHandle) -> Result<OrderedNamespaceSetMut<'_>> {
        self.ordered_set(handle)?;
        Ok(OrderedNamespaceSetMut {
            model: self,
            handle,
        })
    }

    /// Create an ordered set on `owner` and fill it with `items` in order
    ///
    /// # Errors
    /// Same as [`Model::create_namespace_set`]
    pub fn create_ordered_namespace_set(
        &mut self,
        owner: ElementId,
        name: &str,
        attributes: &[AttributeSpec],
        items: &[ElementId],
    ) -> Result<SetHandle> {
        let set = OrderedNamespaceSet::new(name, attributes)?;
        let handle = self.register_set(owner, SetSlot::Ordered(set))?;
        self.fill_new_set(handle, items)?;
        Ok(handle)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ordered() -> OrderedNamespaceSet {
        OrderedNamespaceSet::new(
            "value",
            &[AttributeSpec::case_insensitive(IndexedAttribute::IdShort)],
        )
        .unwrap()
    }

    #[test]
    fn test_slice_bounds() {
        let mut set = ordered();
        let a = ElementId::new();
        set.push_order(a);
        assert_eq!(set.slice(0..1).unwrap(), &[a]);
        assert!(matches!(
            set.slice(0..2),
            Err(AasError::IndexOutOfRange { index: 2, len: 1 })
        ));
    }

    #[test]
    fn test_remove_from_order() {
        let mut set = ordered();
        let a = ElementId::new();
        let b = ElementId::new();
        set.push_order(a);
        set.push_order(b);
        set.remove_from_order(a);
        assert_eq!(set.position(b), Some(0));
        assert_eq!(set.get(1), None);
    }
}
