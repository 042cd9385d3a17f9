//! Reporting views over decided applications: per-course merit lists, the
//! cross-course admission list, allocation pass summaries, and CSV export.

use std::io;

use chrono::{DateTime, Utc};
use serde::Serialize;

use super::domain::{
    Application, ApplicationId, Course, CourseId, StudentId,
};

/// Sanitized representation of an application's exposed state.
#[derive(Debug, Clone, Serialize)]
pub struct ApplicationStatusView {
    pub application_id: ApplicationId,
    pub student_id: StudentId,
    pub course_id: CourseId,
    pub merit_score: f64,
    pub status: &'static str,
    pub remarks: String,
    pub preference: u32,
    pub last_updated: DateTime<Utc>,
}

impl Application {
    pub fn status_view(&self) -> ApplicationStatusView {
        ApplicationStatusView {
            application_id: self.id,
            student_id: self.student_id,
            course_id: self.course_id,
            merit_score: self.merit_score,
            status: self.status.label(),
            remarks: self.remarks.clone(),
            preference: self.preference,
            last_updated: self.last_updated,
        }
    }
}

/// One row of a per-course merit list: every application for the course,
/// merit-descending, regardless of status.
#[derive(Debug, Clone, Serialize)]
pub struct MeritListEntry {
    pub rank: usize,
    pub application_id: ApplicationId,
    pub student_id: StudentId,
    pub student_name: String,
    pub category: String,
    pub merit_score: f64,
    pub status: &'static str,
}

/// One row of the admission list: approved applications across all courses,
/// merit-descending.
#[derive(Debug, Clone, Serialize)]
pub struct AdmissionListEntry {
    pub application_id: ApplicationId,
    pub student_id: StudentId,
    pub student_name: String,
    pub course_id: CourseId,
    pub course_name: String,
    pub merit_score: f64,
    pub status: &'static str,
    pub submitted_at: DateTime<Utc>,
}

/// An application the pass could not classify or resolve; surfaced in the
/// report instead of being silently excluded.
#[derive(Debug, Clone, Serialize)]
pub struct SkippedEntry {
    pub application_id: ApplicationId,
    pub reason: String,
}

/// Summary of one allocation pass over one course.
#[derive(Debug, Clone, Serialize)]
pub struct AllocationReport {
    pub course_id: CourseId,
    pub approved: usize,
    pub waitlisted: usize,
    pub rejected: usize,
    pub seats_remaining: u32,
    pub skipped: Vec<SkippedEntry>,
}

/// A course whose pass failed; the rest of the cycle continues around it.
#[derive(Debug, Clone, Serialize)]
pub struct CycleFailure {
    pub course_id: CourseId,
    pub error: String,
}

/// Summary of a full admissions cycle across every course.
#[derive(Debug, Clone, Serialize)]
pub struct AdmissionCycleReport {
    pub passes: Vec<AllocationReport>,
    pub failures: Vec<CycleFailure>,
}

#[derive(Debug, thiserror::Error)]
pub enum ExportError {
    #[error("csv write failed: {0}")]
    Csv(#[from] csv::Error),
    #[error("io error: {0}")]
    Io(#[from] io::Error),
}

/// Write a per-course merit list as CSV, with a title row naming the course.
pub fn write_merit_list_csv<W: io::Write>(
    writer: W,
    course: &Course,
    entries: &[MeritListEntry],
) -> Result<(), ExportError> {
    // Title row has a single column, so the writer must be flexible.
    let mut csv = csv::WriterBuilder::new().flexible(true).from_writer(writer);
    csv.write_record([format!(
        "Merit List for Course: {} ({})",
        course.name, course.code
    )])?;
    csv.write_record(["Rank", "Student ID", "Student Name", "Category", "Merit Score", "Status"])?;
    for entry in entries {
        csv.write_record([
            entry.rank.to_string(),
            entry.student_id.to_string(),
            entry.student_name.clone(),
            entry.category.clone(),
            entry.merit_score.to_string(),
            entry.status.to_string(),
        ])?;
    }
    csv.flush()?;
    Ok(())
}

/// Write the cross-course admission list as CSV.
pub fn write_admission_list_csv<W: io::Write>(
    writer: W,
    entries: &[AdmissionListEntry],
) -> Result<(), ExportError> {
    let mut csv = csv::Writer::from_writer(writer);
    csv.write_record([
        "Application ID",
        "Student ID",
        "Student Name",
        "Course ID",
        "Course Name",
        "Merit Score",
        "Status",
        "Submitted At",
    ])?;
    for entry in entries {
        csv.write_record([
            entry.application_id.to_string(),
            entry.student_id.to_string(),
            entry.student_name.clone(),
            entry.course_id.to_string(),
            entry.course_name.clone(),
            entry.merit_score.to_string(),
            entry.status.to_string(),
            entry.submitted_at.to_rfc3339(),
        ])?;
    }
    csv.flush()?;
    Ok(())
}
