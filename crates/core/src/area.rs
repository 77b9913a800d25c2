//! Farm-area allocation ledger.
//!
//! A farmer declares a total land area in hectares; every crop project
//! consumes part of it. The sum of a farmer's project areas must never
//! exceed the declared total. The checks here are the single source of
//! truth for that invariant; callers run them before committing any
//! project create, update, or reconciliation batch.

use crate::error::{CoreError, CoreResult};

/// Sum of the given project areas. Zero for an empty set.
pub fn allocated_area(project_areas: &[f64]) -> f64 {
    project_areas.iter().sum()
}

/// Area still available to new projects, floored at zero.
///
/// The floor only applies at farmer level; cooperative-wide aggregates
/// deliberately report negative remainders so over-committed data stays
/// visible (see `DESIGN.md`).
pub fn remaining_area(total_area_ha: f64, allocated: f64) -> f64 {
    (total_area_ha - allocated).max(0.0)
}

/// Would adding `candidate_area_ha` on top of the other projects push the
/// allocation past the farmer's declared total?
///
/// `allocated_excluding_target` excludes the project being updated (or is
/// the full allocation when creating a new one).
pub fn exceeds_capacity(
    total_area_ha: f64,
    allocated_excluding_target: f64,
    candidate_area_ha: f64,
) -> bool {
    candidate_area_ha > total_area_ha - allocated_excluding_target
}

/// Guard a single project create/update against the farmer's capacity.
///
/// The error message carries the requested, remaining, total, and
/// already-allocated figures so the caller can see exactly why the
/// request was refused.
pub fn check_candidate(
    total_area_ha: f64,
    allocated_excluding_target: f64,
    candidate_area_ha: f64,
) -> CoreResult<()> {
    if exceeds_capacity(total_area_ha, allocated_excluding_target, candidate_area_ha) {
        let remaining = total_area_ha - allocated_excluding_target;
        return Err(CoreError::Validation(format!(
            "Project area ({candidate_area_ha:.2} ha) exceeds remaining available area \
             ({remaining:.2} ha). Total farm area: {total_area_ha:.2} ha, \
             Already allocated: {allocated_excluding_target:.2} ha"
        )));
    }
    Ok(())
}

/// Guard a full requested project list against the farmer's declared total.
///
/// Used before any reconciliation or nested create so an oversized batch
/// fails atomically, before a single row is written.
pub fn check_requested_total(total_area_ha: f64, requested_areas: &[f64]) -> CoreResult<()> {
    let requested_total = allocated_area(requested_areas);
    if requested_total > total_area_ha {
        return Err(CoreError::Validation(format!(
            "Total project area ({requested_total:.2} ha) exceeds farmer's total area \
             ({total_area_ha:.2} ha)"
        )));
    }
    Ok(())
}
