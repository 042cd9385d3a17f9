use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use axum::response::Response;
use chrono::Utc;
use serde_json::Value;

use crate::workflows::admission::allocation::{AllocationInput, CourseSnapshot, Decision};
use crate::workflows::admission::domain::{
    Application, ApplicationId, Category, CategoryCutoffs, Course, CourseId, StudentId,
    StudentRecord,
};
use crate::workflows::admission::service::{AdmissionService, NewCourse, NewStudent};
use crate::workflows::admission::store::{
    ApplicationStore, CourseStore, StoreError, StudentStore,
};

pub(super) fn cutoffs(general: f64, obc: f64, sc: f64, st: f64) -> CategoryCutoffs {
    CategoryCutoffs {
        general,
        obc,
        sc,
        st,
    }
}

pub(super) fn snapshot(seats: u32, cutoffs: CategoryCutoffs) -> CourseSnapshot {
    CourseSnapshot {
        course_id: CourseId(1),
        available_seats: seats,
        cutoffs,
    }
}

pub(super) fn input(id: u32, category: Category, merit_score: f64) -> AllocationInput {
    AllocationInput {
        application_id: ApplicationId(id),
        category,
        merit_score,
    }
}

pub(super) fn new_student(name: &str, percentage: f64, category: Category) -> NewStudent {
    NewStudent {
        full_name: name.to_string(),
        email: format!("{}@example.edu", name.to_ascii_lowercase().replace(' ', ".")),
        percentage,
        category,
    }
}

pub(super) fn new_course(name: &str, seats: u32, cutoffs: CategoryCutoffs) -> NewCourse {
    NewCourse {
        name: name.to_string(),
        code: name.to_ascii_uppercase().replace(' ', "-"),
        total_seats: seats,
        cutoffs,
    }
}

pub(super) fn build_service() -> (AdmissionService<MemoryStore>, Arc<MemoryStore>) {
    let store = Arc::new(MemoryStore::default());
    let service = AdmissionService::new(store.clone());
    (service, store)
}

pub(super) async fn read_json_body(response: Response) -> Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("body reads");
    serde_json::from_slice(&bytes).expect("body is json")
}

#[derive(Default)]
struct MemoryInner {
    students: HashMap<StudentId, StudentRecord>,
    courses: HashMap<CourseId, Course>,
    applications: HashMap<ApplicationId, Application>,
}

/// In-memory store with a single mutex so decision batches commit atomically.
#[derive(Default)]
pub(super) struct MemoryStore {
    inner: Mutex<MemoryInner>,
}

impl MemoryStore {
    pub(super) fn application(&self, id: ApplicationId) -> Option<Application> {
        let guard = self.inner.lock().expect("store mutex poisoned");
        guard.applications.get(&id).cloned()
    }

    pub(super) fn course(&self, id: CourseId) -> Option<Course> {
        let guard = self.inner.lock().expect("store mutex poisoned");
        guard.courses.get(&id).cloned()
    }

    pub(super) fn remove_student(&self, id: StudentId) {
        let mut guard = self.inner.lock().expect("store mutex poisoned");
        guard.students.remove(&id);
    }
}

impl StudentStore for MemoryStore {
    fn insert_student(&self, student: StudentRecord) -> Result<StudentRecord, StoreError> {
        let mut guard = self.inner.lock().expect("store mutex poisoned");
        if guard.students.contains_key(&student.id) {
            return Err(StoreError::Conflict);
        }
        guard.students.insert(student.id, student.clone());
        Ok(student)
    }

    fn fetch_student(&self, id: StudentId) -> Result<Option<StudentRecord>, StoreError> {
        let guard = self.inner.lock().expect("store mutex poisoned");
        Ok(guard.students.get(&id).cloned())
    }

    fn email_registered(&self, email: &str) -> Result<bool, StoreError> {
        let guard = self.inner.lock().expect("store mutex poisoned");
        Ok(guard
            .students
            .values()
            .any(|student| student.email.eq_ignore_ascii_case(email)))
    }
}

impl CourseStore for MemoryStore {
    fn insert_course(&self, course: Course) -> Result<Course, StoreError> {
        let mut guard = self.inner.lock().expect("store mutex poisoned");
        if guard.courses.contains_key(&course.id) {
            return Err(StoreError::Conflict);
        }
        guard.courses.insert(course.id, course.clone());
        Ok(course)
    }

    fn fetch_course(&self, id: CourseId) -> Result<Option<Course>, StoreError> {
        let guard = self.inner.lock().expect("store mutex poisoned");
        Ok(guard.courses.get(&id).cloned())
    }

    fn list_courses(&self) -> Result<Vec<Course>, StoreError> {
        let guard = self.inner.lock().expect("store mutex poisoned");
        let mut courses: Vec<Course> = guard.courses.values().cloned().collect();
        courses.sort_by_key(|course| course.id);
        Ok(courses)
    }
}

impl ApplicationStore for MemoryStore {
    fn insert_application(&self, application: Application) -> Result<Application, StoreError> {
        let mut guard = self.inner.lock().expect("store mutex poisoned");
        if guard.applications.contains_key(&application.id) {
            return Err(StoreError::Conflict);
        }
        guard.applications.insert(application.id, application.clone());
        Ok(application)
    }

    fn fetch_application(&self, id: ApplicationId) -> Result<Option<Application>, StoreError> {
        let guard = self.inner.lock().expect("store mutex poisoned");
        Ok(guard.applications.get(&id).cloned())
    }

    fn applications_by_course(&self, course_id: CourseId) -> Result<Vec<Application>, StoreError> {
        let guard = self.inner.lock().expect("store mutex poisoned");
        let mut applications: Vec<Application> = guard
            .applications
            .values()
            .filter(|application| application.course_id == course_id)
            .cloned()
            .collect();
        applications.sort_by_key(|application| application.id);
        Ok(applications)
    }

    fn all_applications(&self) -> Result<Vec<Application>, StoreError> {
        let guard = self.inner.lock().expect("store mutex poisoned");
        let mut applications: Vec<Application> = guard.applications.values().cloned().collect();
        applications.sort_by_key(|application| application.id);
        Ok(applications)
    }

    fn has_applied(&self, student_id: StudentId, course_id: CourseId) -> Result<bool, StoreError> {
        let guard = self.inner.lock().expect("store mutex poisoned");
        Ok(guard.applications.values().any(|application| {
            application.student_id == student_id && application.course_id == course_id
        }))
    }

    fn apply_decisions(
        &self,
        course_id: CourseId,
        decisions: &[Decision],
        seats_remaining: u32,
    ) -> Result<(), StoreError> {
        let mut guard = self.inner.lock().expect("store mutex poisoned");
        if !guard.courses.contains_key(&course_id) {
            return Err(StoreError::NotFound);
        }
        // Validate the whole batch before touching anything.
        for decision in decisions {
            if !guard.applications.contains_key(&decision.application_id) {
                return Err(StoreError::NotFound);
            }
        }
        let now = Utc::now();
        for decision in decisions {
            if let Some(application) = guard.applications.get_mut(&decision.application_id) {
                application.status = decision.status;
                application.remarks = decision.remarks.clone();
                application.last_updated = now;
            }
        }
        if let Some(course) = guard.courses.get_mut(&course_id) {
            course.available_seats = seats_remaining;
        }
        Ok(())
    }
}

/// Store wrapper that fails application listing for one course, so cycle
/// tests can show a single failure does not abort the batch.
pub(super) struct FlakyStore {
    pub(super) inner: MemoryStore,
    pub(super) fail_course: CourseId,
}

impl StudentStore for FlakyStore {
    fn insert_student(&self, student: StudentRecord) -> Result<StudentRecord, StoreError> {
        self.inner.insert_student(student)
    }

    fn fetch_student(&self, id: StudentId) -> Result<Option<StudentRecord>, StoreError> {
        self.inner.fetch_student(id)
    }

    fn email_registered(&self, email: &str) -> Result<bool, StoreError> {
        self.inner.email_registered(email)
    }
}

impl CourseStore for FlakyStore {
    fn insert_course(&self, course: Course) -> Result<Course, StoreError> {
        self.inner.insert_course(course)
    }

    fn fetch_course(&self, id: CourseId) -> Result<Option<Course>, StoreError> {
        self.inner.fetch_course(id)
    }

    fn list_courses(&self) -> Result<Vec<Course>, StoreError> {
        self.inner.list_courses()
    }
}

impl ApplicationStore for FlakyStore {
    fn insert_application(&self, application: Application) -> Result<Application, StoreError> {
        self.inner.insert_application(application)
    }

    fn fetch_application(&self, id: ApplicationId) -> Result<Option<Application>, StoreError> {
        self.inner.fetch_application(id)
    }

    fn applications_by_course(&self, course_id: CourseId) -> Result<Vec<Application>, StoreError> {
        if course_id == self.fail_course {
            return Err(StoreError::Unavailable("course store offline".to_string()));
        }
        self.inner.applications_by_course(course_id)
    }

    fn all_applications(&self) -> Result<Vec<Application>, StoreError> {
        self.inner.all_applications()
    }

    fn has_applied(&self, student_id: StudentId, course_id: CourseId) -> Result<bool, StoreError> {
        self.inner.has_applied(student_id, course_id)
    }

    fn apply_decisions(
        &self,
        course_id: CourseId,
        decisions: &[Decision],
        seats_remaining: u32,
    ) -> Result<(), StoreError> {
        self.inner.apply_decisions(course_id, decisions, seats_remaining)
    }
}
