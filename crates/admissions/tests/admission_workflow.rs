//! Integration scenarios for the admission workflow, driven end to end
//! through the public service facade: submission intake, the allocation
//! pass, and the reporting/export surface.

mod common {
    use std::collections::HashMap;
    use std::sync::{Arc, Mutex};

    use chrono::Utc;

    use admissions::workflows::admission::allocation::Decision;
    use admissions::workflows::admission::domain::{
        Application, ApplicationId, Category, CategoryCutoffs, Course, CourseId, StudentId,
        StudentRecord,
    };
    use admissions::workflows::admission::service::{AdmissionService, NewCourse, NewStudent};
    use admissions::workflows::admission::store::{
        ApplicationStore, CourseStore, StoreError, StudentStore,
    };

    #[derive(Default)]
    struct Inner {
        students: HashMap<StudentId, StudentRecord>,
        courses: HashMap<CourseId, Course>,
        applications: HashMap<ApplicationId, Application>,
    }

    #[derive(Default)]
    pub struct MemoryStore {
        inner: Mutex<Inner>,
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
        fn insert_application(
            &self,
            application: Application,
        ) -> Result<Application, StoreError> {
            let mut guard = self.inner.lock().expect("store mutex poisoned");
            if guard.applications.contains_key(&application.id) {
                return Err(StoreError::Conflict);
            }
            guard
                .applications
                .insert(application.id, application.clone());
            Ok(application)
        }

        fn fetch_application(
            &self,
            id: ApplicationId,
        ) -> Result<Option<Application>, StoreError> {
            let guard = self.inner.lock().expect("store mutex poisoned");
            Ok(guard.applications.get(&id).cloned())
        }

        fn applications_by_course(
            &self,
            course_id: CourseId,
        ) -> Result<Vec<Application>, StoreError> {
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
            let mut applications: Vec<Application> =
                guard.applications.values().cloned().collect();
            applications.sort_by_key(|application| application.id);
            Ok(applications)
        }

        fn has_applied(
            &self,
            student_id: StudentId,
            course_id: CourseId,
        ) -> Result<bool, StoreError> {
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

    pub fn build_service() -> AdmissionService<MemoryStore> {
        AdmissionService::new(Arc::new(MemoryStore::default()))
    }

    pub fn student(name: &str, percentage: f64, category: &str) -> NewStudent {
        NewStudent {
            full_name: name.to_string(),
            email: format!(
                "{}@example.edu",
                name.to_ascii_lowercase().replace(' ', ".")
            ),
            percentage,
            category: Category::parse(category),
        }
    }

    pub fn course(name: &str, seats: u32, cutoffs: CategoryCutoffs) -> NewCourse {
        NewCourse {
            name: name.to_string(),
            code: name.to_ascii_uppercase().replace(' ', "-"),
            total_seats: seats,
            cutoffs,
        }
    }

    pub fn cutoffs(general: f64, obc: f64, sc: f64, st: f64) -> CategoryCutoffs {
        CategoryCutoffs {
            general,
            obc,
            sc,
            st,
        }
    }
}

use admissions::workflows::admission::report::{
    write_admission_list_csv, write_merit_list_csv,
};

#[test]
fn general_group_can_starve_a_later_reserved_group() {
    let service = common::build_service();
    let course = service
        .add_course(common::course("Physics", 1, common::cutoffs(60.0, 55.0, 50.0, 50.0)))
        .expect("course created");

    let general = service
        .register_student(common::student("Asha Rao", 95.0, "GENERAL"))
        .expect("registration succeeds");
    let obc = service
        .register_student(common::student("Ravi Shankar", 67.5, "OBC"))
        .expect("registration succeeds");

    service
        .submit_application(general.id, course.id, 1)
        .expect("submission succeeds");
    let obc_application = service
        .submit_application(obc.id, course.id, 1)
        .expect("submission succeeds");

    // 67.5 + 2.5 = 70, above the OBC cutoff, yet the GENERAL applicant drains
    // the single shared seat first.
    assert_eq!(obc_application.merit_score, 70.0);

    let report = service.run_allocation(course.id).expect("pass runs");
    assert_eq!(report.approved, 1);
    assert_eq!(report.waitlisted, 1);
    assert_eq!(report.seats_remaining, 0);

    let waitlisted = service
        .get_application(obc_application.id)
        .expect("application still stored");
    assert_eq!(waitlisted.remarks, "waitlisted - no seats available");
}

#[test]
fn full_cycle_produces_exportable_lists() {
    let service = common::build_service();
    let physics = service
        .add_course(common::course("Physics", 2, common::cutoffs(50.0, 45.0, 40.0, 40.0)))
        .expect("course created");
    let chemistry = service
        .add_course(common::course("Chemistry", 1, common::cutoffs(55.0, 50.0, 45.0, 45.0)))
        .expect("course created");

    let entries = [
        ("Asha Rao", 92.0, "GENERAL"),
        ("Ravi Shankar", 81.0, "OBC"),
        ("Meena Kumari", 96.0, "SC"),
        ("Vikram Nair", 35.0, "GENERAL"),
    ];
    let mut students = Vec::new();
    for (name, percentage, category) in entries {
        students.push(
            service
                .register_student(common::student(name, percentage, category))
                .expect("registration succeeds"),
        );
    }

    for student in &students {
        service
            .submit_application(student.id, physics.id, 1)
            .expect("submission succeeds");
    }
    service
        .submit_application(students[0].id, chemistry.id, 2)
        .expect("submission succeeds");

    let cycle = service.run_admission_cycle().expect("cycle runs");
    assert!(cycle.failures.is_empty());
    assert_eq!(cycle.passes.len(), 2);

    let merit = service.merit_list(physics.id).expect("merit list builds");
    assert_eq!(merit.len(), 4);
    // Frozen scores: SC bonus clamps 96 + 5 to 100.
    assert_eq!(merit[0].merit_score, 100.0);
    assert_eq!(merit[0].student_name, "Meena Kumari");

    let physics_course = service.get_course(physics.id).expect("course loads");
    let mut merit_csv = Vec::new();
    write_merit_list_csv(&mut merit_csv, &physics_course, &merit).expect("csv renders");
    let merit_text = String::from_utf8(merit_csv).expect("csv is utf-8");
    assert!(merit_text.starts_with("Merit List for Course: Physics (PHYSICS)"));
    assert!(merit_text.contains("Meena Kumari"));

    let admissions_list = service.admission_list().expect("admission list builds");
    // Physics admits two, Chemistry admits one.
    assert_eq!(admissions_list.len(), 3);
    assert!(admissions_list
        .windows(2)
        .all(|pair| pair[0].merit_score >= pair[1].merit_score));

    let mut admission_csv = Vec::new();
    write_admission_list_csv(&mut admission_csv, &admissions_list).expect("csv renders");
    let admission_text = String::from_utf8(admission_csv).expect("csv is utf-8");
    assert!(admission_text.starts_with("Application ID,Student ID,Student Name"));
}
