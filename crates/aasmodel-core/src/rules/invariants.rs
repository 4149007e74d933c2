use std::collections::HashSet;

use crate::model::ElementId;
use crate::ops::Model;

/// Check if an element is part of a cycle
///
/// Walks the parent chain and reports a revisit.
pub fn has_cycle(model: &Model, element: ElementId) -> bool {
    let mut visited = HashSet::new();
    let mut current = Some(element);

    while let Some(id) = current {
        if !visited.insert(id) {
            return true;
        }
        current = match model.get(id) {
            Ok(el) => el.parent(),
            Err(_) => break,
        };
    }

    false
}

/// Find elements whose parent doesn't exist
///
/// Returns list of (child, parent) tuples
pub fn find_orphans(model: &Model) -> Vec<(ElementId, ElementId)> {
    let mut orphans = Vec::new();

    for element in model.list_elements() {
        if let Some(parent) = element.parent() {
            if !model.contains(parent) {
                orphans.push((element.id(), parent));
            }
        }
    }

    orphans
}

/// Find elements with a parent that none of the parent's sets indexes
///
/// Returns list of (child, parent) tuples
pub fn find_unindexed_children(model: &Model) -> Vec<(ElementId, ElementId)> {
    let mut unindexed = Vec::new();

    for element in model.list_elements() {
        let Some(parent) = element.parent() else {
            continue;
        };
        let Ok(owner) = model.get(parent) else {
            continue;
        };
        let values = element.attribute_values();
        let indexed = owner
            .sets
            .iter()
            .any(|slot| slot.base().contains_member(element.id(), &values));
        if !indexed {
            unindexed.push((element.id(), parent));
        }
    }

    unindexed
}

/// Find set members that are missing or point at another parent
///
/// Returns list of (owner, member) tuples
pub fn find_foreign_members(model: &Model) -> Vec<(ElementId, ElementId)> {
    let mut foreign = Vec::new();

    for owner in model.list_elements() {
        for slot in &owner.sets {
            for member in slot.members() {
                let belongs = model
                    .get(member)
                    .is_ok_and(|el| el.parent() == Some(owner.id()));
                if !belongs {
                    foreign.push((owner.id(), member));
                }
            }
        }
    }

    foreign
}

/// Find index entries whose key no longer matches the member's value
///
/// Returns list of (member, attribute name) tuples
pub fn find_stale_entries(model: &Model) -> Vec<(ElementId, String)> {
    let mut stale = Vec::new();

    for owner in model.list_elements() {
        for slot in &owner.sets {
            let set = slot.base();
            for spec in set.attributes() {
                for (key, member) in set.entries(spec.attribute) {
                    let current = model
                        .get(member)
                        .ok()
                        .and_then(|el| el.attribute_value(spec.attribute))
                        .map(|value| value.folded(spec.case_sensitive));
                    if current.as_ref() != Some(key) {
                        stale.push((member, spec.attribute.name().to_string()));
                    }
                }
            }
        }
    }

    stale
}

/// Find values held by two different members across sibling sets
///
/// Returns list of (owner, attribute name, value) tuples
pub fn find_cross_set_duplicates(model: &Model) -> Vec<(ElementId, String, String)> {
    let mut duplicates = Vec::new();

    for owner in model.list_elements() {
        for (i, slot) in owner.sets.iter().enumerate() {
            for member in slot.members() {
                let Ok(element) = model.get(member) else {
                    continue;
                };
                for (attribute, value) in element.attribute_values() {
                    let clash = owner.sets.iter().enumerate().any(|(j, other)| {
                        j != i
                            && other
                                .base()
                                .get(attribute, &value)
                                .is_some_and(|holder| holder != member)
                    });
                    if clash {
                        duplicates.push((owner.id(), attribute.name().to_string(), value.to_string()));
                    }
                }
            }
        }
    }

    duplicates
}

/// Find ordered sets whose order sequence disagrees with their index
///
/// Returns list of (owner, set name) tuples
pub fn find_order_mismatches(model: &Model) -> Vec<(ElementId, String)> {
    let mut mismatches = Vec::new();

    for owner in model.list_elements() {
        for slot in &owner.sets {
            let Some(ordered) = slot.ordered() else {
                continue;
            };
            let in_order: HashSet<ElementId> = ordered.iter().collect();
            let indexed: HashSet<ElementId> = ordered.as_set().iter().collect();
            if in_order.len() != ordered.len() || in_order != indexed {
                mismatches.push((owner.id(), ordered.as_set().name().to_string()));
            }
        }
    }

    mismatches
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::ElementKind;

    #[test]
    fn test_has_cycle_false_for_detached() {
        let mut model = Model::new();
        let prop = model.create_referable(ElementKind::Property, "p").unwrap();
        assert!(!has_cycle(&model, prop));
    }

    #[test]
    fn test_forced_parent_link_is_unindexed() {
        let mut model = Model::new();
        let coll = model
            .create_referable(ElementKind::SubmodelElementCollection, "c")
            .unwrap();
        let prop = model.create_referable(ElementKind::Property, "p").unwrap();
        model.elements.get_mut(&prop).unwrap().parent = Some(coll);

        assert_eq!(find_unindexed_children(&model), vec![(prop, coll)]);
        assert!(find_orphans(&model).is_empty());
    }

    #[test]
    fn test_stale_entry_after_bypassing_rename() {
        let mut model = Model::new();
        let coll = model
            .create_referable(ElementKind::SubmodelElementCollection, "c")
            .unwrap();
        let prop = model.create_referable(ElementKind::Property, "p").unwrap();
        model.add_referable(coll, prop).unwrap();
        model.elements.get_mut(&prop).unwrap().id_short = Some("q".to_string());

        assert_eq!(find_stale_entries(&model), vec![(prop, "id_short".to_string())]);
    }
}
