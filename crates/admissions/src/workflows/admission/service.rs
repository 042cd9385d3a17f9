use std::collections::HashMap;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::{Arc, Mutex};

use chrono::Utc;
use tracing::{info, warn};

use super::allocation::{allocate, AllocationInput, CourseSnapshot};
use super::domain::{
    Application, ApplicationId, ApplicationStatus, Category, CategoryCutoffs, Course, CourseId,
    StudentId, StudentRecord,
};
use super::merit::{merit_score, validate_percentage, MeritError};
use super::report::{
    AdmissionCycleReport, AdmissionListEntry, AllocationReport, CycleFailure, MeritListEntry,
    SkippedEntry,
};
use super::store::{AdmissionStore, StoreError};

/// Registration payload for a student.
#[derive(Debug, Clone)]
pub struct NewStudent {
    pub full_name: String,
    pub email: String,
    pub percentage: f64,
    pub category: Category,
}

/// Creation payload for a course.
#[derive(Debug, Clone)]
pub struct NewCourse {
    pub name: String,
    pub code: String,
    pub total_seats: u32,
    pub cutoffs: CategoryCutoffs,
}

/// Error raised by the admission service.
#[derive(Debug, thiserror::Error)]
pub enum AdmissionServiceError {
    #[error(transparent)]
    Merit(#[from] MeritError),
    #[error("email already registered: {0}")]
    EmailTaken(String),
    #[error("total seats must be greater than zero")]
    InvalidSeatCount,
    #[error("preference rank must be a positive integer")]
    InvalidPreference,
    #[error("student has already applied to this course")]
    DuplicateApplication,
    #[error("student {0} not found")]
    StudentNotFound(StudentId),
    #[error("course {0} not found")]
    CourseNotFound(CourseId),
    #[error("application {0} not found")]
    ApplicationNotFound(ApplicationId),
    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Facade composing the store boundary, the merit scorer, and the
/// allocation engine.
pub struct AdmissionService<S> {
    store: Arc<S>,
    student_seq: AtomicU32,
    course_seq: AtomicU32,
    application_seq: AtomicU32,
    // One writer per course during a pass; a concurrent submission or second
    // pass must not race the seat counter.
    course_locks: Mutex<HashMap<CourseId, Arc<Mutex<()>>>>,
}

impl<S> AdmissionService<S>
where
    S: AdmissionStore + 'static,
{
    pub fn new(store: Arc<S>) -> Self {
        Self {
            store,
            student_seq: AtomicU32::new(1),
            course_seq: AtomicU32::new(1),
            application_seq: AtomicU32::new(1),
            course_locks: Mutex::new(HashMap::new()),
        }
    }

    fn course_lock(&self, course_id: CourseId) -> Arc<Mutex<()>> {
        let mut locks = self.course_locks.lock().expect("course lock map poisoned");
        locks.entry(course_id).or_default().clone()
    }

    /// Register a student, validating the academic percentage and email
    /// uniqueness before anything touches the store.
    pub fn register_student(
        &self,
        new_student: NewStudent,
    ) -> Result<StudentRecord, AdmissionServiceError> {
        validate_percentage(new_student.percentage)?;
        if self.store.email_registered(&new_student.email)? {
            return Err(AdmissionServiceError::EmailTaken(new_student.email));
        }

        let record = StudentRecord {
            id: StudentId(self.student_seq.fetch_add(1, Ordering::Relaxed)),
            full_name: new_student.full_name,
            email: new_student.email,
            percentage: new_student.percentage,
            category: new_student.category,
            registered_at: Utc::now(),
        };
        Ok(self.store.insert_student(record)?)
    }

    pub fn add_course(&self, new_course: NewCourse) -> Result<Course, AdmissionServiceError> {
        if new_course.total_seats == 0 {
            return Err(AdmissionServiceError::InvalidSeatCount);
        }

        let course = Course {
            id: CourseId(self.course_seq.fetch_add(1, Ordering::Relaxed)),
            name: new_course.name,
            code: new_course.code,
            total_seats: new_course.total_seats,
            available_seats: new_course.total_seats,
            cutoffs: new_course.cutoffs,
        };
        Ok(self.store.insert_course(course)?)
    }

    /// Submit an application. The merit score is computed here, once, from
    /// the student's record; allocation later consumes the frozen value.
    pub fn submit_application(
        &self,
        student_id: StudentId,
        course_id: CourseId,
        preference: u32,
    ) -> Result<Application, AdmissionServiceError> {
        if preference == 0 {
            return Err(AdmissionServiceError::InvalidPreference);
        }

        let student = self
            .store
            .fetch_student(student_id)?
            .ok_or(AdmissionServiceError::StudentNotFound(student_id))?;
        self.store
            .fetch_course(course_id)?
            .ok_or(AdmissionServiceError::CourseNotFound(course_id))?;

        if self.store.has_applied(student_id, course_id)? {
            return Err(AdmissionServiceError::DuplicateApplication);
        }

        let score = merit_score(student.percentage, &student.category)?;
        let now = Utc::now();
        let application = Application {
            id: ApplicationId(self.application_seq.fetch_add(1, Ordering::Relaxed)),
            student_id,
            course_id,
            merit_score: score,
            status: ApplicationStatus::Pending,
            remarks: "pending allocation".to_string(),
            preference,
            submitted_at: now,
            last_updated: now,
        };
        Ok(self.store.insert_application(application)?)
    }

    pub fn get_application(
        &self,
        id: ApplicationId,
    ) -> Result<Application, AdmissionServiceError> {
        self.store
            .fetch_application(id)?
            .ok_or(AdmissionServiceError::ApplicationNotFound(id))
    }

    pub fn get_course(&self, id: CourseId) -> Result<Course, AdmissionServiceError> {
        self.store
            .fetch_course(id)?
            .ok_or(AdmissionServiceError::CourseNotFound(id))
    }

    /// Run one full allocation pass over a course and commit the decision
    /// batch atomically.
    ///
    /// A pass re-decides every application from scratch, so the engine is
    /// seeded with the course's original capacity rather than the counter a
    /// previous pass left behind; re-running over the same submissions
    /// yields the same decisions.
    pub fn run_allocation(
        &self,
        course_id: CourseId,
    ) -> Result<AllocationReport, AdmissionServiceError> {
        let lock = self.course_lock(course_id);
        let _guard = lock.lock().expect("course lock poisoned");

        let course = self
            .store
            .fetch_course(course_id)?
            .ok_or(AdmissionServiceError::CourseNotFound(course_id))?;
        let applications = self.store.applications_by_course(course_id)?;

        let mut inputs = Vec::with_capacity(applications.len());
        let mut skipped = Vec::new();
        for application in &applications {
            match self.store.fetch_student(application.student_id)? {
                Some(student) => inputs.push(AllocationInput {
                    application_id: application.id,
                    category: student.category.clone(),
                    merit_score: application.merit_score,
                }),
                None => skipped.push(SkippedEntry {
                    application_id: application.id,
                    reason: format!("student {} missing from store", application.student_id),
                }),
            }
        }

        let snapshot = CourseSnapshot {
            course_id,
            available_seats: course.total_seats,
            cutoffs: course.cutoffs,
        };
        let outcome = allocate(&snapshot, &inputs);

        self.store
            .apply_decisions(course_id, &outcome.decisions, outcome.seats_remaining)?;

        for entry in outcome.skipped {
            skipped.push(SkippedEntry {
                application_id: entry.application_id,
                reason: format!("unclassified category '{}'", entry.category),
            });
        }

        let mut approved = 0;
        let mut waitlisted = 0;
        let mut rejected = 0;
        for decision in &outcome.decisions {
            match decision.status {
                ApplicationStatus::Approved => approved += 1,
                ApplicationStatus::Waitlisted => waitlisted += 1,
                ApplicationStatus::Rejected => rejected += 1,
                ApplicationStatus::Pending => {}
            }
        }

        info!(
            course_id = course_id.0,
            approved,
            waitlisted,
            rejected,
            seats_remaining = outcome.seats_remaining,
            "allocation pass complete"
        );

        Ok(AllocationReport {
            course_id,
            approved,
            waitlisted,
            rejected,
            seats_remaining: outcome.seats_remaining,
            skipped,
        })
    }

    /// Run allocation for every course. One course's failure is recorded
    /// and does not abort the rest of the cycle.
    pub fn run_admission_cycle(&self) -> Result<AdmissionCycleReport, AdmissionServiceError> {
        let courses = self.store.list_courses()?;
        let mut passes = Vec::with_capacity(courses.len());
        let mut failures = Vec::new();

        for course in courses {
            match self.run_allocation(course.id) {
                Ok(report) => passes.push(report),
                Err(err) => {
                    warn!(course_id = course.id.0, error = %err, "allocation pass failed");
                    failures.push(CycleFailure {
                        course_id: course.id,
                        error: err.to_string(),
                    });
                }
            }
        }

        Ok(AdmissionCycleReport { passes, failures })
    }

    /// Every application for the course, merit-descending (ties by ascending
    /// application id), with no status filter.
    pub fn merit_list(
        &self,
        course_id: CourseId,
    ) -> Result<Vec<MeritListEntry>, AdmissionServiceError> {
        self.store
            .fetch_course(course_id)?
            .ok_or(AdmissionServiceError::CourseNotFound(course_id))?;

        let mut applications = self.store.applications_by_course(course_id)?;
        sort_by_merit(&mut applications);

        let mut entries = Vec::with_capacity(applications.len());
        for (index, application) in applications.iter().enumerate() {
            let student = self
                .store
                .fetch_student(application.student_id)?
                .ok_or(AdmissionServiceError::StudentNotFound(application.student_id))?;
            entries.push(MeritListEntry {
                rank: index + 1,
                application_id: application.id,
                student_id: student.id,
                student_name: student.full_name,
                category: student.category.label().to_string(),
                merit_score: application.merit_score,
                status: application.status.label(),
            });
        }
        Ok(entries)
    }

    /// All approved applications across every course, merit-descending.
    pub fn admission_list(&self) -> Result<Vec<AdmissionListEntry>, AdmissionServiceError> {
        let mut applications: Vec<Application> = self
            .store
            .all_applications()?
            .into_iter()
            .filter(|application| application.status == ApplicationStatus::Approved)
            .collect();
        sort_by_merit(&mut applications);

        let mut entries = Vec::with_capacity(applications.len());
        for application in applications {
            let student = self
                .store
                .fetch_student(application.student_id)?
                .ok_or(AdmissionServiceError::StudentNotFound(application.student_id))?;
            let course = self
                .store
                .fetch_course(application.course_id)?
                .ok_or(AdmissionServiceError::CourseNotFound(application.course_id))?;
            entries.push(AdmissionListEntry {
                application_id: application.id,
                student_id: student.id,
                student_name: student.full_name,
                course_id: course.id,
                course_name: course.name,
                merit_score: application.merit_score,
                status: application.status.label(),
                submitted_at: application.submitted_at,
            });
        }
        Ok(entries)
    }
}

fn sort_by_merit(applications: &mut [Application]) {
    applications.sort_by(|a, b| {
        b.merit_score
            .total_cmp(&a.merit_score)
            .then_with(|| a.id.cmp(&b.id))
    });
}
