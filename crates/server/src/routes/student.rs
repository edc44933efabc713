use crate::dtos::common::DeleteResponse;
use crate::dtos::student::{CreateStudentRequest, StudentResponse, UpdateStudentRequest};
use crate::error::ApiError;
use crate::state::AppState;
use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};
use chrono::Utc;
use database::error::ServiceError;
use database::services::catalog::StudentStatusService;
use database::services::student::StudentService;

/// List all students with their lookup references resolved
#[utoipa::path(
    get,
    path = "/students",
    responses(
        (status = 200, description = "List of students", body = Vec<StudentResponse>),
        (status = 500, description = "Internal server error")
    ),
    tag = "Students"
)]
pub async fn list_students(
    State(state): State<AppState>,
) -> Result<Json<Vec<StudentResponse>>, ApiError> {
    let details = StudentService::list_students(&state.db).await?;
    Ok(Json(details.into_iter().map(Into::into).collect()))
}

/// Get a student by student number
#[utoipa::path(
    get,
    path = "/students/{number}",
    params(
        ("number" = String, Path, description = "Student number")
    ),
    responses(
        (status = 200, description = "Student found", body = StudentResponse),
        (status = 404, description = "Student not found")
    ),
    tag = "Students"
)]
pub async fn get_student(
    State(state): State<AppState>,
    Path(number): Path<String>,
) -> Result<Json<StudentResponse>, ApiError> {
    let details = StudentService::get_student(&state.db, &number).await?;
    Ok(Json(details.into()))
}

/// Create a student. The email address must belong to one of the configured
/// domains when that policy is set.
#[utoipa::path(
    post,
    path = "/students",
    request_body = CreateStudentRequest,
    responses(
        (status = 201, description = "Student created", body = StudentResponse),
        (status = 400, description = "Validation failed"),
        (status = 409, description = "Student number already taken")
    ),
    tag = "Students"
)]
pub async fn create_student(
    State(state): State<AppState>,
    Json(body): Json<CreateStudentRequest>,
) -> Result<(StatusCode, Json<StudentResponse>), ApiError> {
    check_email_domain(&state, &body.email).await?;

    let now = Utc::now().naive_utc();
    let student = StudentService::create_student(&state.db, body.into(), now).await?;
    let details = StudentService::get_student(&state.db, &student.student_number).await?;
    Ok((StatusCode::CREATED, Json(details.into())))
}

/// Update a student. Email changes go through the domain policy and status
/// changes through the configured transition rules.
#[utoipa::path(
    patch,
    path = "/students/{number}",
    params(
        ("number" = String, Path, description = "Student number")
    ),
    request_body = UpdateStudentRequest,
    responses(
        (status = 200, description = "Student updated", body = StudentResponse),
        (status = 400, description = "Validation failed"),
        (status = 404, description = "Student not found")
    ),
    tag = "Students"
)]
pub async fn update_student(
    State(state): State<AppState>,
    Path(number): Path<String>,
    Json(body): Json<UpdateStudentRequest>,
) -> Result<Json<StudentResponse>, ApiError> {
    if let Some(ref email) = body.email {
        check_email_domain(&state, email).await?;
    }

    if let Some(status_id) = body.status_id {
        let current = StudentService::get_student(&state.db, &number).await?;
        if current.student.status_id != status_id {
            let rules = state
                .settings
                .load_status_rules()
                .await
                .map_err(|e| ApiError::Internal(format!("status transition policy: {e}")))?;
            let from = current.status.map(|s| s.name).unwrap_or_default();
            let to = StudentStatusService::get(&state.db, status_id).await?.name;
            if !rules.allows(&from, &to) {
                return Err(ServiceError::validation(
                    "statusId",
                    format!("status cannot change from \"{from}\" to \"{to}\""),
                )
                .into());
            }
        }
    }

    let now = Utc::now().naive_utc();
    let updated = StudentService::update_student(&state.db, &number, body.into(), now).await?;
    let details = StudentService::get_student(&state.db, &updated.student_number).await?;
    Ok(Json(details.into()))
}

/// Delete a student. Removal is refused while enrollments still reference
/// the record.
#[utoipa::path(
    delete,
    path = "/students/{number}",
    params(
        ("number" = String, Path, description = "Student number")
    ),
    responses(
        (status = 200, description = "Student deleted", body = DeleteResponse),
        (status = 404, description = "Student not found"),
        (status = 409, description = "Student still has enrollments")
    ),
    tag = "Students"
)]
pub async fn delete_student(
    State(state): State<AppState>,
    Path(number): Path<String>,
) -> Result<Json<DeleteResponse>, ApiError> {
    StudentService::delete_student(&state.db, &number).await?;
    Ok(Json(DeleteResponse::removed("Student", &number)))
}

async fn check_email_domain(state: &AppState, email: &str) -> Result<(), ApiError> {
    let domains = state
        .settings
        .load_email_domains()
        .await
        .map_err(|e| ApiError::Internal(format!("email domain policy: {e}")))?;

    if !domains.permits(email) {
        return Err(ServiceError::validation(
            "email",
            format!("email domain of \"{email}\" is not allowed"),
        )
        .into());
    }
    Ok(())
}
