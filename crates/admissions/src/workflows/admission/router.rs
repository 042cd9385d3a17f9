use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
    Router,
};
use serde::Deserialize;
use serde_json::json;

use super::domain::{ApplicationId, Category, CategoryCutoffs, CourseId, StudentId};
use super::report::{write_admission_list_csv, write_merit_list_csv};
use super::service::{AdmissionService, AdmissionServiceError, NewCourse, NewStudent};
use super::store::AdmissionStore;

/// Router builder exposing the admission endpoints.
pub fn admission_router<S>(service: Arc<AdmissionService<S>>) -> Router
where
    S: AdmissionStore + 'static,
{
    Router::new()
        .route(
            "/api/v1/admissions/students",
            post(register_student_handler::<S>),
        )
        .route("/api/v1/admissions/courses", post(add_course_handler::<S>))
        .route(
            "/api/v1/admissions/applications",
            post(submit_handler::<S>),
        )
        .route(
            "/api/v1/admissions/applications/:application_id",
            get(status_handler::<S>),
        )
        .route(
            "/api/v1/admissions/courses/:course_id/allocate",
            post(allocate_course_handler::<S>),
        )
        .route(
            "/api/v1/admissions/allocate",
            post(allocate_all_handler::<S>),
        )
        .route(
            "/api/v1/admissions/courses/:course_id/merit-list",
            get(merit_list_handler::<S>),
        )
        .route(
            "/api/v1/admissions/admission-list",
            get(admission_list_handler::<S>),
        )
        .with_state(service)
}

#[derive(Debug, Deserialize)]
pub struct RegisterStudentRequest {
    pub full_name: String,
    pub email: String,
    pub percentage: f64,
    /// Raw category string; unknown values are carried as unclassified and
    /// reported at allocation time.
    pub category: String,
}

#[derive(Debug, Deserialize)]
pub struct AddCourseRequest {
    pub name: String,
    pub code: String,
    pub total_seats: u32,
    pub cutoffs: CategoryCutoffs,
}

#[derive(Debug, Deserialize)]
pub struct SubmitApplicationRequest {
    pub student_id: u32,
    pub course_id: u32,
    pub preference: u32,
}

#[derive(Debug, Deserialize)]
pub struct ListFormat {
    #[serde(default)]
    pub format: Option<String>,
}

fn error_response(error: AdmissionServiceError) -> Response {
    let status = match &error {
        AdmissionServiceError::DuplicateApplication | AdmissionServiceError::EmailTaken(_) => {
            StatusCode::CONFLICT
        }
        AdmissionServiceError::Merit(_)
        | AdmissionServiceError::InvalidSeatCount
        | AdmissionServiceError::InvalidPreference => StatusCode::UNPROCESSABLE_ENTITY,
        AdmissionServiceError::StudentNotFound(_)
        | AdmissionServiceError::CourseNotFound(_)
        | AdmissionServiceError::ApplicationNotFound(_) => StatusCode::NOT_FOUND,
        AdmissionServiceError::Store(_) => StatusCode::INTERNAL_SERVER_ERROR,
    };
    let payload = json!({ "error": error.to_string() });
    (status, axum::Json(payload)).into_response()
}

pub(crate) async fn register_student_handler<S>(
    State(service): State<Arc<AdmissionService<S>>>,
    axum::Json(request): axum::Json<RegisterStudentRequest>,
) -> Response
where
    S: AdmissionStore + 'static,
{
    let new_student = NewStudent {
        full_name: request.full_name,
        email: request.email,
        percentage: request.percentage,
        category: Category::parse(&request.category),
    };
    match service.register_student(new_student) {
        Ok(record) => (StatusCode::CREATED, axum::Json(record)).into_response(),
        Err(error) => error_response(error),
    }
}

pub(crate) async fn add_course_handler<S>(
    State(service): State<Arc<AdmissionService<S>>>,
    axum::Json(request): axum::Json<AddCourseRequest>,
) -> Response
where
    S: AdmissionStore + 'static,
{
    let new_course = NewCourse {
        name: request.name,
        code: request.code,
        total_seats: request.total_seats,
        cutoffs: request.cutoffs,
    };
    match service.add_course(new_course) {
        Ok(course) => (StatusCode::CREATED, axum::Json(course)).into_response(),
        Err(error) => error_response(error),
    }
}

pub(crate) async fn submit_handler<S>(
    State(service): State<Arc<AdmissionService<S>>>,
    axum::Json(request): axum::Json<SubmitApplicationRequest>,
) -> Response
where
    S: AdmissionStore + 'static,
{
    match service.submit_application(
        StudentId(request.student_id),
        CourseId(request.course_id),
        request.preference,
    ) {
        Ok(application) => {
            (StatusCode::ACCEPTED, axum::Json(application.status_view())).into_response()
        }
        Err(error) => error_response(error),
    }
}

pub(crate) async fn status_handler<S>(
    State(service): State<Arc<AdmissionService<S>>>,
    Path(application_id): Path<u32>,
) -> Response
where
    S: AdmissionStore + 'static,
{
    match service.get_application(ApplicationId(application_id)) {
        Ok(application) => {
            (StatusCode::OK, axum::Json(application.status_view())).into_response()
        }
        Err(error) => error_response(error),
    }
}

pub(crate) async fn allocate_course_handler<S>(
    State(service): State<Arc<AdmissionService<S>>>,
    Path(course_id): Path<u32>,
) -> Response
where
    S: AdmissionStore + 'static,
{
    match service.run_allocation(CourseId(course_id)) {
        Ok(report) => (StatusCode::OK, axum::Json(report)).into_response(),
        Err(error) => error_response(error),
    }
}

pub(crate) async fn allocate_all_handler<S>(
    State(service): State<Arc<AdmissionService<S>>>,
) -> Response
where
    S: AdmissionStore + 'static,
{
    match service.run_admission_cycle() {
        Ok(report) => (StatusCode::OK, axum::Json(report)).into_response(),
        Err(error) => error_response(error),
    }
}

pub(crate) async fn merit_list_handler<S>(
    State(service): State<Arc<AdmissionService<S>>>,
    Path(course_id): Path<u32>,
    Query(query): Query<ListFormat>,
) -> Response
where
    S: AdmissionStore + 'static,
{
    let course_id = CourseId(course_id);
    let entries = match service.merit_list(course_id) {
        Ok(entries) => entries,
        Err(error) => return error_response(error),
    };

    if query.format.as_deref() == Some("csv") {
        let course = match service.get_course(course_id) {
            Ok(course) => course,
            Err(error) => return error_response(error),
        };
        let mut buffer = Vec::new();
        if let Err(error) = write_merit_list_csv(&mut buffer, &course, &entries) {
            let payload = json!({ "error": error.to_string() });
            return (StatusCode::INTERNAL_SERVER_ERROR, axum::Json(payload)).into_response();
        }
        return (
            StatusCode::OK,
            [(header::CONTENT_TYPE, "text/csv")],
            buffer,
        )
            .into_response();
    }

    (StatusCode::OK, axum::Json(entries)).into_response()
}

pub(crate) async fn admission_list_handler<S>(
    State(service): State<Arc<AdmissionService<S>>>,
    Query(query): Query<ListFormat>,
) -> Response
where
    S: AdmissionStore + 'static,
{
    let entries = match service.admission_list() {
        Ok(entries) => entries,
        Err(error) => return error_response(error),
    };

    if query.format.as_deref() == Some("csv") {
        let mut buffer = Vec::new();
        if let Err(error) = write_admission_list_csv(&mut buffer, &entries) {
            let payload = json!({ "error": error.to_string() });
            return (StatusCode::INTERNAL_SERVER_ERROR, axum::Json(payload)).into_response();
        }
        return (
            StatusCode::OK,
            [(header::CONTENT_TYPE, "text/csv")],
            buffer,
        )
            .into_response();
    }

    (StatusCode::OK, axum::Json(entries)).into_response()
}
