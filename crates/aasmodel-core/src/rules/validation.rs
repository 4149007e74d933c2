use crate::errors::{AasError, Result};
use crate::ops::Model;

use super::invariants;

/// Validate the structural integrity of the whole model
///
/// Runs all invariant checks and returns an error for the first violation:
///
/// 1. Parent links point at existing elements, without cycles
/// 2. Every element with a parent is indexed by one of the parent's sets
/// 3. Every set member points back at the set's owner
/// 4. Index keys match the members' current (case-folded) values
/// 5. No value is held by two members across sibling sets
/// 6. Ordered sets hold the same members in their order and their index
///
/// # Errors
/// Returns the first violation found. For exhaustive reporting, call the
/// individual invariant functions directly.
pub fn validate_model(model: &Model) -> Result<()> {
    if let Some((element, parent)) = invariants::find_orphans(model).first() {
        return Err(AasError::OrphanedElement {
            element_id: element.to_string(),
            parent_id: parent.to_string(),
        });
    }

    for element in model.list_elements() {
        if invariants::has_cycle(model, element.id()) {
            return Err(AasError::CycleDetected {
                element_id: element.id().to_string(),
            });
        }
    }

    if let Some((child, parent)) = invariants::find_unindexed_children(model).first() {
        return Err(AasError::InconsistentIndex {
            element_id: child.to_string(),
            reason: format!("parent {} does not index it", parent),
        });
    }

    if let Some((owner, member)) = invariants::find_foreign_members(model).first() {
        return Err(AasError::InconsistentIndex {
            element_id: member.to_string(),
            reason: format!("indexed by {} but not its child", owner),
        });
    }

    if let Some((member, attribute)) = invariants::find_stale_entries(model).first() {
        return Err(AasError::InconsistentIndex {
            element_id: member.to_string(),
            reason: format!("stale '{}' entry", attribute),
        });
    }

    if let Some((owner, attribute, value)) = invariants::find_cross_set_duplicates(model).first() {
        return Err(AasError::InconsistentIndex {
            element_id: owner.to_string(),
            reason: format!("'{}' value '{}' held twice across sets", attribute, value),
        });
    }

    if let Some((owner, set_name)) = invariants::find_order_mismatches(model).first() {
        return Err(AasError::InconsistentIndex {
            element_id: owner.to_string(),
            reason: format!("order of set '{}' disagrees with its index", set_name),
        });
    }

    Ok(())
}
