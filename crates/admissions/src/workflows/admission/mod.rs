//! Course admission workflow: submission intake with frozen merit scores,
//! the category-cutoff allocation pass, and reporting over the decisions.

pub mod allocation;
pub mod domain;
pub mod merit;
pub mod report;
pub mod router;
pub mod service;
pub mod store;

#[cfg(test)]
mod tests;

pub use allocation::{
    allocate, AllocationInput, AllocationOutcome, CourseSnapshot, Decision, SkippedApplication,
};
pub use domain::{
    Application, ApplicationId, ApplicationStatus, Category, CategoryCutoffs, Course, CourseId,
    StudentId, StudentRecord,
};
pub use merit::{category_bonus, merit_score, MeritError, MAX_MERIT_SCORE};
pub use report::{
    write_admission_list_csv, write_merit_list_csv, AdmissionCycleReport, AdmissionListEntry,
    AllocationReport, ApplicationStatusView, CycleFailure, ExportError, MeritListEntry,
    SkippedEntry,
};
pub use router::admission_router;
pub use service::{AdmissionService, AdmissionServiceError, NewCourse, NewStudent};
pub use store::{AdmissionStore, ApplicationStore, CourseStore, StoreError, StudentStore};
