use std::collections::HashMap;
use std::sync::atomic::AtomicBool;
use std::sync::{Arc, Mutex};

use admissions::workflows::admission::{
    Application, ApplicationId, ApplicationStore, Category, CategoryCutoffs, Course, CourseId,
    CourseStore, Decision, NewCourse, NewStudent, StoreError, StudentId, StudentRecord,
    StudentStore,
};
use chrono::Utc;
use metrics_exporter_prometheus::PrometheusHandle;

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) readiness: Arc<AtomicBool>,
    pub(crate) metrics: Arc<PrometheusHandle>,
}

#[derive(Default)]
struct StoreInner {
    students: HashMap<StudentId, StudentRecord>,
    courses: HashMap<CourseId, Course>,
    applications: HashMap<ApplicationId, Application>,
}

/// In-memory admission store. A single mutex over all three maps makes
/// `apply_decisions` naturally transactional: a pass's statuses and the seat
/// counter become visible together or not at all.
#[derive(Default)]
pub(crate) struct InMemoryAdmissionStore {
    inner: Mutex<StoreInner>,
}

impl StudentStore for InMemoryAdmissionStore {
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

impl CourseStore for InMemoryAdmissionStore {
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

impl ApplicationStore for InMemoryAdmissionStore {
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
        // Validate the whole batch before mutating anything.
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

pub(crate) fn sample_students() -> Vec<NewStudent> {
    let roster = [
        ("Asha Rao", "asha.rao@example.edu", 92.0, "GENERAL"),
        ("Ravi Shankar", "ravi.shankar@example.edu", 81.0, "OBC"),
        ("Meena Kumari", "meena.kumari@example.edu", 96.0, "SC"),
        ("Dev Patel", "dev.patel@example.edu", 74.0, "ST"),
        ("Vikram Nair", "vikram.nair@example.edu", 43.0, "GENERAL"),
        ("Niva Joseph", "niva.joseph@example.edu", 89.0, "NRI"),
    ];
    roster
        .into_iter()
        .map(|(name, email, percentage, category)| NewStudent {
            full_name: name.to_string(),
            email: email.to_string(),
            percentage,
            category: Category::parse(category),
        })
        .collect()
}

pub(crate) fn sample_courses() -> Vec<NewCourse> {
    vec![
        NewCourse {
            name: "Computer Science".to_string(),
            code: "CS101".to_string(),
            total_seats: 3,
            cutoffs: CategoryCutoffs {
                general: 75.0,
                obc: 70.0,
                sc: 65.0,
                st: 65.0,
            },
        },
        NewCourse {
            name: "Mechanical Engineering".to_string(),
            code: "ME102".to_string(),
            total_seats: 2,
            cutoffs: CategoryCutoffs {
                general: 60.0,
                obc: 55.0,
                sc: 50.0,
                st: 50.0,
            },
        },
    ]
}
