//! Reconciliation of local elements with freshly fetched copies
//!
//! Backends build a detached copy of what the source holds and merge it in
//! with [`Model::update_from`]. Matched members keep their identity and
//! parent; unmatched fetched members are moved over; local members the
//! source no longer has are removed.

use super::set::NamespaceSetMut;
use super::{IndexedAttribute, SetHandle};
use crate::errors::{AasError, Result};
use crate::model::ElementId;
use crate::ops::Model;

impl NamespaceSetMut<'_> {
    /// Reconcile this set against `other`; see [`Model::update_nss_from`]
    ///
    /// # Errors
    /// Same as [`Model::update_nss_from`]
    pub fn update_nss_from(&mut self, other: SetHandle) -> Result<()> {
        self.model.update_nss_from(self.handle, other)
    }
}

impl Model {
    /// Make the set at `target` hold exactly the members of `other`
    ///
    /// Members are matched by the target set's first attribute. For a match,
    /// a referable member takes over the fetched fields and reconciles its
    /// own sets recursively; qualifiers and extensions are matched by
    /// presence only. Unmatched members of `other` move into `target`,
    /// members of `target` without a counterpart are detached. `other` ends
    /// empty; fetched copies that matched are disposed.
    ///
    /// Additions and matched kinds are validated before anything changes. A
    /// failure further down (a nested set, a rename) rolls the whole model
    /// back to its state before the call.
    ///
    /// # Errors
    /// * `MissingAttribute`, `Collision` - If a fetched member can't be added
    /// * `InvalidElementKind` - If a matched pair differs in kind
    /// * Any error of [`Model::rename`] while merging fields
    pub fn update_nss_from(&mut self, target: SetHandle, other: SetHandle) -> Result<()> {
        crate::log_op_start!("update_nss_from", element_id = %target.owner());
        let start = std::time::Instant::now();

        let snapshot = self.elements.clone();
        let result = self.reconcile_sets(target, other);
        if result.is_err() {
            self.elements = snapshot;
        }

        let duration = start.elapsed().as_millis() as u64;
        match &result {
            Ok(()) => crate::log_op_end!("update_nss_from", duration_ms = duration),
            Err(err) => crate::log_op_error!("update_nss_from", err.clone(), duration_ms = duration),
        }
        result
    }

    fn reconcile_sets(&mut self, target: SetHandle, other: SetHandle) -> Result<()> {
        let target_set = self.namespace_set(target)?;
        let other_set = self.namespace_set(other)?;
        let primary = target_set
            .attributes()
            .next()
            .map(|spec| spec.attribute)
            .ok_or_else(|| AasError::Internal {
                message: format!("namespace set '{}' indexes nothing", target_set.name()),
            })?;
        let shared: Vec<IndexedAttribute> = target_set
            .attributes()
            .map(|spec| spec.attribute)
            .filter(|attribute| other_set.tracks(*attribute))
            .collect();

        let mut matched: Vec<(ElementId, ElementId)> = Vec::new();
        let mut to_add: Vec<ElementId> = Vec::new();
        for fetched in self.set_members(other)? {
            let existing = self
                .get(fetched)?
                .attribute_value(primary)
                .and_then(|value| target_set.get(primary, &value));
            match existing {
                Some(mine) => matched.push((mine, fetched)),
                None => to_add.push(fetched),
            }
        }

        let mut to_remove: Vec<ElementId> = Vec::new();
        for mine in self.set_members(target)? {
            if matched.iter().any(|(m, _)| *m == mine) {
                continue;
            }
            let element = self.get(mine)?;
            let gone = shared.iter().any(|attribute| {
                element
                    .attribute_value(*attribute)
                    .is_some_and(|value| !other_set.contains_id(*attribute, &value))
            });
            if gone {
                to_remove.push(mine);
            }
        }

        self.validate_additions(target, &to_add, &to_remove)?;
        for (mine, fetched) in &matched {
            self.check_same_kind(*mine, *fetched)?;
        }

        for (mine, fetched) in &matched {
            if self.get(*mine)?.kind().is_referable() {
                self.merge_element(*mine, *fetched, true)?;
            }
        }

        for mine in &to_remove {
            self.detach(target, *mine)?;
        }
        for fetched in &to_add {
            self.detach(other, *fetched)?;
            self.add_member(target, *fetched)?;
        }
        for (_, fetched) in &matched {
            self.detach(other, *fetched)?;
            self.dispose_subtree(*fetched);
        }

        tracing::debug!(
            merged = matched.len(),
            added = to_add.len(),
            removed = to_remove.len(),
            "namespace set reconciled"
        );
        Ok(())
    }

    /// Matched pairs must agree in kind, all the way down their sets
    fn check_same_kind(&self, mine: ElementId, fetched: ElementId) -> Result<()> {
        let (mine_kind, fetched_kind) = (self.get(mine)?.kind(), self.get(fetched)?.kind());
        if mine_kind != fetched_kind {
            return Err(AasError::InvalidElementKind {
                kind: fetched_kind.to_string(),
                reason: format!("fetched element does not match local {}", mine_kind),
            });
        }
        if !mine_kind.is_referable() {
            return Ok(());
        }
        for index in 0..self.get(fetched)?.sets.len() {
            let (target, other) = (SetHandle::new(mine, index), SetHandle::new(fetched, index));
            let target_set = self.namespace_set(target)?;
            let Some(primary) = target_set.attributes().next().map(|spec| spec.attribute) else {
                continue;
            };
            for member in self.set_members(other)? {
                let counterpart = self
                    .get(member)?
                    .attribute_value(primary)
                    .and_then(|value| target_set.get(primary, &value));
                if let Some(local) = counterpart {
                    self.check_same_kind(local, member)?;
                }
            }
        }
        Ok(())
    }

    fn validate_additions(
        &self,
        target: SetHandle,
        to_add: &[ElementId],
        to_remove: &[ElementId],
    ) -> Result<()> {
        let target_set = self.namespace_set(target)?;
        for item in to_add {
            let values = self.get(*item)?.attribute_values();
            if let Some(attribute) = target_set.missing_attribute(&values) {
                return Err(AasError::MissingAttribute {
                    element_id: item.to_string(),
                    attribute: attribute.name().to_string(),
                });
            }
            for (attribute, value) in &values {
                self.check_value_free(target.owner(), *attribute, value, to_remove, |index| {
                    index == target.index()
                })?;
            }
        }
        Ok(())
    }

    /// Take over the state of `other` into `target`
    ///
    /// Copies the descriptive fields, the payload and, if `update_source`,
    /// the source locator. Indexed attributes change through
    /// [`Model::rename`]. Sets are reconciled pairwise; both elements must be
    /// of the same kind.
    ///
    /// # Errors
    /// * `InvalidElementKind` - If the kinds differ
    /// * Any error of [`Model::rename`] or [`Model::update_nss_from`]
    ///
    /// On error the model is left as it was before the call.
    pub fn update_from(
        &mut self,
        target: ElementId,
        other: ElementId,
        update_source: bool,
    ) -> Result<()> {
        let snapshot = self.elements.clone();
        let result = self
            .check_same_kind(target, other)
            .and_then(|()| self.merge_element(target, other, update_source));
        if let Err(err) = &result {
            tracing::debug!(element_id = %target, error = %err, "update_from rolled back");
            self.elements = snapshot;
        }
        result
    }

    fn merge_element(
        &mut self,
        target: ElementId,
        other: ElementId,
        update_source: bool,
    ) -> Result<()> {
        let fetched = self.get(other)?;
        let kind = self.get(target)?.kind();
        if fetched.kind() != kind {
            return Err(AasError::InvalidElementKind {
                kind: fetched.kind().to_string(),
                reason: format!("cannot update a {} from it", kind),
            });
        }

        let id_short = fetched.id_short.clone();
        let semantic_id = fetched.semantic_id.clone();
        let identification = fetched.identification.clone();
        let administration = fetched.administration.clone();
        let category = fetched.category.clone();
        let description = fetched.description.clone();
        let display_name = fetched.display_name.clone();
        let kind_of_modeling = fetched.kind_of_modeling;
        let source = fetched.source.clone();
        let payload = fetched.payload.clone();
        let set_count = fetched.sets.len();

        if kind.supports(IndexedAttribute::IdShort) {
            self.rename(
                target,
                IndexedAttribute::IdShort,
                id_short.map(Into::into),
            )?;
        }
        if kind.supports(IndexedAttribute::SemanticId) {
            self.set_semantic_id(target, semantic_id)?;
        }

        let element = self.get_mut(target)?;
        if identification.is_some() {
            element.identification = identification;
        }
        element.administration = administration;
        element.category = category;
        element.description = description;
        element.display_name = display_name;
        element.kind_of_modeling = kind_of_modeling;
        element.payload = payload;
        if update_source {
            element.source = source;
        }

        for index in 0..set_count {
            self.reconcile_sets(SetHandle::new(target, index), SetHandle::new(other, index))?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{ElementKind, Identifier, IdentifierType};

    fn submodel(model: &mut Model, id: &str) -> ElementId {
        let identifier = Identifier::new(id, IdentifierType::Iri).unwrap();
        model
            .create_identifiable(ElementKind::Submodel, identifier, Some("sm"))
            .unwrap()
    }

    #[test]
    fn test_removes_members_missing_from_other() {
        let mut model = Model::new();
        let local = submodel(&mut model, "urn:local");
        let fetched = submodel(&mut model, "urn:fetched");
        let stale = model.create_referable(ElementKind::Property, "stale").unwrap();
        model.add_referable(local, stale).unwrap();

        let target = model.set_by_name(local, "submodel_element").unwrap();
        let other = model.set_by_name(fetched, "submodel_element").unwrap();
        model.update_nss_from(target, other).unwrap();

        assert!(model.set_members(target).unwrap().is_empty());
        assert_eq!(model.get(stale).unwrap().parent(), None);
    }

    #[test]
    fn test_qualifiers_match_by_presence() {
        let mut model = Model::new();
        let local = submodel(&mut model, "urn:local");
        let fetched = submodel(&mut model, "urn:fetched");
        let mine = model.create_qualifier("unit").unwrap();
        let theirs = model.create_qualifier("unit").unwrap();
        model.add_qualifier(local, mine).unwrap();
        model.add_qualifier(fetched, theirs).unwrap();

        let target = model.set_by_name(local, "qualifier").unwrap();
        let other = model.set_by_name(fetched, "qualifier").unwrap();
        model.update_nss_from(target, other).unwrap();

        assert_eq!(model.set_members(target).unwrap(), vec![mine]);
        assert!(model.set_members(other).unwrap().is_empty());
        assert!(!model.contains(theirs));
    }

    #[test]
    fn test_update_from_rejects_other_kind() {
        let mut model = Model::new();
        let a = model.create_referable(ElementKind::Property, "a").unwrap();
        let b = model.create_referable(ElementKind::Range, "a").unwrap();
        assert!(matches!(
            model.update_from(a, b, false),
            Err(AasError::InvalidElementKind { .. })
        ));
    }

    #[test]
    fn test_update_from_keeps_source_unless_asked() {
        let mut model = Model::new();
        let a = model.create_referable(ElementKind::Property, "a").unwrap();
        let b = model.create_referable(ElementKind::Property, "a").unwrap();
        model.get_mut(a).unwrap().set_source("file:a.json");
        model.get_mut(b).unwrap().set_source("file:b.json");

        model.update_from(a, b, false).unwrap();
        assert_eq!(model.get(a).unwrap().source(), "file:a.json");

        model.update_from(a, b, true).unwrap();
        assert_eq!(model.get(a).unwrap().source(), "file:b.json");
    }
}
