use super::allocation::Decision;
use super::domain::{Application, ApplicationId, Course, CourseId, StudentId, StudentRecord};

/// Error enumeration for store failures.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("record already exists")]
    Conflict,
    #[error("record not found")]
    NotFound,
    #[error("store unavailable: {0}")]
    Unavailable(String),
}

/// Storage abstraction for student records.
pub trait StudentStore: Send + Sync {
    fn insert_student(&self, student: StudentRecord) -> Result<StudentRecord, StoreError>;
    fn fetch_student(&self, id: StudentId) -> Result<Option<StudentRecord>, StoreError>;
    fn email_registered(&self, email: &str) -> Result<bool, StoreError>;
}

/// Storage abstraction for courses.
pub trait CourseStore: Send + Sync {
    fn insert_course(&self, course: Course) -> Result<Course, StoreError>;
    fn fetch_course(&self, id: CourseId) -> Result<Option<Course>, StoreError>;
    fn list_courses(&self) -> Result<Vec<Course>, StoreError>;
}

/// Storage abstraction for applications, including the transactional commit
/// of a full allocation pass.
pub trait ApplicationStore: Send + Sync {
    fn insert_application(&self, application: Application) -> Result<Application, StoreError>;
    fn fetch_application(&self, id: ApplicationId) -> Result<Option<Application>, StoreError>;
    fn applications_by_course(&self, course_id: CourseId) -> Result<Vec<Application>, StoreError>;
    fn all_applications(&self) -> Result<Vec<Application>, StoreError>;
    fn has_applied(
        &self,
        student_id: StudentId,
        course_id: CourseId,
    ) -> Result<bool, StoreError>;

    /// Commit a pass's full decision batch plus the course's new seat count
    /// as one unit. Either every status, remark, and the counter land, or
    /// nothing does; a partially-applied pass must not be observable.
    fn apply_decisions(
        &self,
        course_id: CourseId,
        decisions: &[Decision],
        seats_remaining: u32,
    ) -> Result<(), StoreError>;
}

/// Combined bound so the service can take a single handle.
pub trait AdmissionStore: StudentStore + CourseStore + ApplicationStore {}

impl<T: StudentStore + CourseStore + ApplicationStore> AdmissionStore for T {}
