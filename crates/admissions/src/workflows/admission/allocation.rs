//! The allocation pass: partition a course's applications by reservation
//! category, rank each group by merit, and drain one shared seat counter in
//! the fixed order GENERAL, OBC, SC, ST.
//!
//! The group order is load-bearing: an earlier group can exhaust seats that a
//! later group's eligible applicants would otherwise receive. Within each
//! group ties on merit are broken by ascending application id so that a pass
//! over the same snapshot is fully reproducible.

use serde::{Deserialize, Serialize};

use super::domain::{ApplicationId, ApplicationStatus, Category, CategoryCutoffs, CourseId};

pub(crate) const APPROVED_REMARKS: &str = "approved based on merit and cutoff";
pub(crate) const WAITLISTED_REMARKS: &str = "waitlisted - no seats available";

pub(crate) fn rejected_remarks(cutoff: f64) -> String {
    format!("below cutoff ({cutoff}%)")
}

/// Immutable view of the course taken at the start of a pass.
///
/// A full pass re-decides every application from scratch, so the caller must
/// seed `available_seats` with the course's original capacity rather than a
/// counter already drained by an earlier pass.
#[derive(Debug, Clone, PartialEq)]
pub struct CourseSnapshot {
    pub course_id: CourseId,
    pub available_seats: u32,
    pub cutoffs: CategoryCutoffs,
}

/// One application as the engine sees it: the frozen merit score plus the
/// applicant's category resolved by the caller.
#[derive(Debug, Clone, PartialEq)]
pub struct AllocationInput {
    pub application_id: ApplicationId,
    pub category: Category,
    pub merit_score: f64,
}

/// Terminal decision for one application within a pass.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Decision {
    pub application_id: ApplicationId,
    pub status: ApplicationStatus,
    pub remarks: String,
}

/// An application excluded from the seat loop because its category is not
/// one of the four known values. Reported, never silently dropped.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SkippedApplication {
    pub application_id: ApplicationId,
    pub category: String,
}

/// Result of one allocation pass over a course.
#[derive(Debug, Clone, PartialEq)]
pub struct AllocationOutcome {
    /// One decision per classified application, grouped GENERAL, OBC, SC, ST
    /// and merit-descending within each group.
    pub decisions: Vec<Decision>,
    pub seats_remaining: u32,
    pub skipped: Vec<SkippedApplication>,
}

fn group_slot(category: &Category) -> Option<usize> {
    match category {
        Category::General => Some(0),
        Category::Obc => Some(1),
        Category::Sc => Some(2),
        Category::St => Some(3),
        Category::Unclassified(_) => None,
    }
}

/// Run one deterministic allocation pass.
///
/// Seat consumption is sequential: each approval decrements the counter
/// immediately, so every later applicant in this and subsequent groups sees
/// the updated count.
pub fn allocate(snapshot: &CourseSnapshot, applications: &[AllocationInput]) -> AllocationOutcome {
    let mut groups: [Vec<&AllocationInput>; 4] = [Vec::new(), Vec::new(), Vec::new(), Vec::new()];
    let mut skipped = Vec::new();

    for application in applications {
        match group_slot(&application.category) {
            Some(slot) => groups[slot].push(application),
            None => skipped.push(SkippedApplication {
                application_id: application.application_id,
                category: application.category.label().to_string(),
            }),
        }
    }

    for group in &mut groups {
        group.sort_by(|a, b| {
            b.merit_score
                .total_cmp(&a.merit_score)
                .then_with(|| a.application_id.cmp(&b.application_id))
        });
    }

    let mut seats_remaining = snapshot.available_seats;
    let mut decisions = Vec::with_capacity(applications.len());

    for (slot, (_, cutoff)) in snapshot.cutoffs.ordered().into_iter().enumerate() {
        for application in &groups[slot] {
            let decision = if application.merit_score < cutoff {
                Decision {
                    application_id: application.application_id,
                    status: ApplicationStatus::Rejected,
                    remarks: rejected_remarks(cutoff),
                }
            } else if seats_remaining > 0 {
                seats_remaining -= 1;
                Decision {
                    application_id: application.application_id,
                    status: ApplicationStatus::Approved,
                    remarks: APPROVED_REMARKS.to_string(),
                }
            } else {
                Decision {
                    application_id: application.application_id,
                    status: ApplicationStatus::Waitlisted,
                    remarks: WAITLISTED_REMARKS.to_string(),
                }
            };
            decisions.push(decision);
        }
    }

    AllocationOutcome {
        decisions,
        seats_remaining,
        skipped,
    }
}
