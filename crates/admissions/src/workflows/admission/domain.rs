use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Identifier wrapper for registered students.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
pub struct StudentId(pub u32);

/// Identifier wrapper for courses.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
pub struct CourseId(pub u32);

/// Identifier wrapper for submitted applications.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
pub struct ApplicationId(pub u32);

impl fmt::Display for StudentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl fmt::Display for CourseId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl fmt::Display for ApplicationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Reservation category. The four known values compete for a shared seat
/// pool under per-category cutoffs; anything else is carried verbatim as
/// `Unclassified` so allocation can report it instead of dropping it.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Category {
    General,
    Obc,
    Sc,
    St,
    Unclassified(String),
}

impl Category {
    /// Fixed order in which allocation drains the shared seat counter.
    pub const PROCESSING_ORDER: [Category; 4] =
        [Category::General, Category::Obc, Category::Sc, Category::St];

    /// Case-insensitive parse; unknown values are preserved as `Unclassified`.
    pub fn parse(raw: &str) -> Self {
        match raw.trim().to_ascii_uppercase().as_str() {
            "GENERAL" => Category::General,
            "OBC" => Category::Obc,
            "SC" => Category::Sc,
            "ST" => Category::St,
            _ => Category::Unclassified(raw.trim().to_string()),
        }
    }

    pub fn label(&self) -> &str {
        match self {
            Category::General => "GENERAL",
            Category::Obc => "OBC",
            Category::Sc => "SC",
            Category::St => "ST",
            Category::Unclassified(raw) => raw,
        }
    }
}

/// Academic record captured at registration; the percentage and category
/// feed the merit scorer exactly once, at submission time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StudentRecord {
    pub id: StudentId,
    pub full_name: String,
    pub email: String,
    pub percentage: f64,
    pub category: Category,
    pub registered_at: DateTime<Utc>,
}

/// Minimum merit score per known category. Unclassified applicants have no
/// cutoff; they never reach the seat loop.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CategoryCutoffs {
    pub general: f64,
    pub obc: f64,
    pub sc: f64,
    pub st: f64,
}

impl CategoryCutoffs {
    pub fn cutoff_for(&self, category: &Category) -> Option<f64> {
        match category {
            Category::General => Some(self.general),
            Category::Obc => Some(self.obc),
            Category::Sc => Some(self.sc),
            Category::St => Some(self.st),
            Category::Unclassified(_) => None,
        }
    }

    /// Cutoffs paired with their categories in processing order.
    pub fn ordered(&self) -> [(Category, f64); 4] {
        [
            (Category::General, self.general),
            (Category::Obc, self.obc),
            (Category::Sc, self.sc),
            (Category::St, self.st),
        ]
    }
}

/// A course with a fixed seat budget and per-category cutoffs.
///
/// Invariant: `available_seats <= total_seats`. The available counter is
/// mutated only when an allocation pass commits its decisions.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Course {
    pub id: CourseId,
    pub name: String,
    pub code: String,
    pub total_seats: u32,
    pub available_seats: u32,
    pub cutoffs: CategoryCutoffs,
}

/// Allocation state of an application.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ApplicationStatus {
    Pending,
    Approved,
    Rejected,
    Waitlisted,
}

impl ApplicationStatus {
    pub const fn label(self) -> &'static str {
        match self {
            ApplicationStatus::Pending => "PENDING",
            ApplicationStatus::Approved => "APPROVED",
            ApplicationStatus::Rejected => "REJECTED",
            ApplicationStatus::Waitlisted => "WAITLISTED",
        }
    }
}

/// One (student, course, preference) submission. The merit score is frozen
/// here at submission time and is never recomputed during allocation, so a
/// later change to the student's record cannot shift an already-filed
/// application's ranking.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Application {
    pub id: ApplicationId,
    pub student_id: StudentId,
    pub course_id: CourseId,
    pub merit_score: f64,
    pub status: ApplicationStatus,
    pub remarks: String,
    pub preference: u32,
    pub submitted_at: DateTime<Utc>,
    pub last_updated: DateTime<Utc>,
}
