//! Three-way reconciliation of a farmer's project set.
//!
//! An update request carries the complete desired list of projects. The
//! planner diffs it against the persisted rows and decides, for every
//! entry, whether it is an update (id matches a persisted project), a
//! create (no id, or an id the farmer does not own — the stale id is
//! discarded and the entry becomes a fresh row), or, for persisted rows
//! the request never references, a delete. An empty request therefore
//! deletes every project the farmer has.
//!
//! The planner is pure set logic; it assumes the caller has already run
//! [`crate::area::check_requested_total`] so an oversized batch never
//! produces a plan, and the repository layer applies the plan inside a
//! single transaction holding the farmer row lock.

use std::collections::HashSet;

use chrono::NaiveDate;

use crate::status::ProjectStatus;
use crate::types::DbId;

/// One project entry from an update request.
#[derive(Debug, Clone, PartialEq)]
pub struct RequestedProject {
    /// `None` means "new project"; a value is matched against the
    /// farmer's persisted projects.
    pub id: Option<DbId>,
    pub crop_name: String,
    pub area_ha: f64,
    pub status: ProjectStatus,
    pub planting_date: Option<NaiveDate>,
    pub expected_harvest_date: Option<NaiveDate>,
    pub notes: Option<String>,
}

/// The reconciliation outcome: which rows to insert, rewrite, and remove.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ReconcilePlan {
    /// Entries to insert as new rows, in request order.
    pub creates: Vec<RequestedProject>,
    /// `(persisted_id, new_field_values)` pairs, in request order.
    pub updates: Vec<(DbId, RequestedProject)>,
    /// Persisted ids the request no longer references.
    pub delete_ids: Vec<DbId>,
}

impl ReconcilePlan {
    /// True when the plan would change nothing structurally (no inserts,
    /// no deletes). Field-level no-op updates may still be present.
    pub fn is_structurally_empty(&self) -> bool {
        self.creates.is_empty() && self.delete_ids.is_empty()
    }
}

/// Diff the requested project list against the farmer's persisted ids.
///
/// `existing_ids` is the set of project ids currently persisted for the
/// farmer; ordering of `delete_ids` follows it, so the plan is
/// deterministic regardless of request order.
pub fn plan(existing_ids: &[DbId], requested: Vec<RequestedProject>) -> ReconcilePlan {
    let existing: HashSet<DbId> = existing_ids.iter().copied().collect();
    let mut kept: HashSet<DbId> = HashSet::new();

    let mut result = ReconcilePlan::default();

    for entry in requested {
        match entry.id {
            Some(id) if existing.contains(&id) => {
                kept.insert(id);
                result.updates.push((id, entry));
            }
            // No id, or an id this farmer does not own: insert fresh.
            _ => result.creates.push(entry),
        }
    }

    result.delete_ids = existing_ids
        .iter()
        .copied()
        .filter(|id| !kept.contains(id))
        .collect();

    result
}

#[cfg(test)]
mod tests {
    use super::*;

    fn req(id: Option<DbId>, crop: &str, area: f64) -> RequestedProject {
        RequestedProject {
            id,
            crop_name: crop.to_string(),
            area_ha: area,
            status: ProjectStatus::Active,
            planting_date: None,
            expected_harvest_date: None,
            notes: None,
        }
    }

    #[test]
    fn matched_id_is_update_unmatched_rows_are_deleted() {
        let p = plan(&[1, 2, 3], vec![req(Some(2), "Cocoa", 2.0), req(None, "Maize", 1.0)]);

        assert_eq!(p.updates.len(), 1);
        assert_eq!(p.updates[0].0, 2);
        assert_eq!(p.creates.len(), 1);
        assert_eq!(p.creates[0].crop_name, "Maize");
        assert_eq!(p.delete_ids, vec![1, 3]);
    }

    #[test]
    fn same_list_is_structurally_idempotent() {
        let p = plan(
            &[1, 2],
            vec![req(Some(1), "Cocoa", 2.0), req(Some(2), "Maize", 1.0)],
        );

        assert!(p.is_structurally_empty());
        assert_eq!(p.updates.len(), 2);
        assert_eq!(p.delete_ids, Vec::<DbId>::new());
    }

    #[test]
    fn empty_request_deletes_everything() {
        let p = plan(&[4, 5, 6], vec![]);

        assert!(p.creates.is_empty());
        assert!(p.updates.is_empty());
        assert_eq!(p.delete_ids, vec![4, 5, 6]);
    }

    #[test]
    fn stale_id_becomes_a_create() {
        // Id 99 is not among the farmer's projects: the entry is inserted
        // as a new row and the unknown id is discarded.
        let p = plan(&[1], vec![req(Some(99), "Cassava", 1.5)]);

        assert_eq!(p.creates.len(), 1);
        assert_eq!(p.creates[0].id, Some(99));
        assert!(p.updates.is_empty());
        assert_eq!(p.delete_ids, vec![1]);
    }

    #[test]
    fn deletes_are_deterministic_regardless_of_request_order() {
        let forward = plan(
            &[1, 2, 3, 4],
            vec![req(Some(3), "Cocoa", 1.0), req(Some(1), "Maize", 1.0)],
        );
        let reversed = plan(
            &[1, 2, 3, 4],
            vec![req(Some(1), "Maize", 1.0), req(Some(3), "Cocoa", 1.0)],
        );

        assert_eq!(forward.delete_ids, vec![2, 4]);
        assert_eq!(reversed.delete_ids, vec![2, 4]);
    }

    #[test]
    fn duplicate_id_in_request_updates_twice_but_keeps_the_row() {
        let p = plan(
            &[7],
            vec![req(Some(7), "Cocoa", 1.0), req(Some(7), "Cocoa", 2.0)],
        );

        assert_eq!(p.updates.len(), 2);
        assert!(p.delete_ids.is_empty());
    }

    #[test]
    fn all_new_entries_against_empty_state() {
        let p = plan(&[], vec![req(None, "Cocoa", 1.0), req(None, "Maize", 2.0)]);

        assert_eq!(p.creates.len(), 2);
        assert!(p.updates.is_empty());
        assert!(p.delete_ids.is_empty());
    }
}
