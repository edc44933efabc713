use crate::dtos::enrollment::{
    CreateEnrollmentRequest, EnrollmentQueryParams, EnrollmentResponse, UpdateEnrollmentRequest,
};
use crate::error::ApiError;
use crate::state::AppState;
use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
};
use chrono::Utc;
use database::services::enrollment::EnrollmentService;
use uuid::Uuid;

/// List enrollments, optionally filtered by student or class
#[utoipa::path(
    get,
    path = "/enrollments",
    params(EnrollmentQueryParams),
    responses(
        (status = 200, description = "List of enrollments", body = Vec<EnrollmentResponse>),
        (status = 404, description = "Filter references an unknown student or class")
    ),
    tag = "Enrollments"
)]
pub async fn list_enrollments(
    State(state): State<AppState>,
    Query(params): Query<EnrollmentQueryParams>,
) -> Result<Json<Vec<EnrollmentResponse>>, ApiError> {
    let details = EnrollmentService::list_enrollments(
        &state.db,
        params.student_number.as_deref(),
        params.class_code.as_deref(),
    )
    .await?;
    Ok(Json(details.into_iter().map(Into::into).collect()))
}

/// Get an enrollment by id
#[utoipa::path(
    get,
    path = "/enrollments/{id}",
    params(
        ("id" = Uuid, Path, description = "Enrollment ID")
    ),
    responses(
        (status = 200, description = "Enrollment found", body = EnrollmentResponse),
        (status = 404, description = "Enrollment not found")
    ),
    tag = "Enrollments"
)]
pub async fn get_enrollment(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<EnrollmentResponse>, ApiError> {
    let details = EnrollmentService::get_enrollment(&state.db, id).await?;
    Ok(Json(details.into()))
}

/// Enroll a student in a class. The request is rejected when the class is
/// deactivated or full, when the student is already actively enrolled, or
/// when prerequisites of the class's course are not met.
#[utoipa::path(
    post,
    path = "/enrollments",
    request_body = CreateEnrollmentRequest,
    responses(
        (status = 201, description = "Enrollment created", body = EnrollmentResponse),
        (status = 400, description = "Validation failed"),
        (status = 404, description = "Student or class not found"),
        (status = 409, description = "Student already enrolled"),
        (status = 422, description = "Class full or prerequisites not met")
    ),
    tag = "Enrollments"
)]
pub async fn create_enrollment(
    State(state): State<AppState>,
    Json(body): Json<CreateEnrollmentRequest>,
) -> Result<(StatusCode, Json<EnrollmentResponse>), ApiError> {
    let now = Utc::now().naive_utc();
    let enrollment = EnrollmentService::create_enrollment(&state.db, body.into(), now).await?;
    let details = EnrollmentService::get_enrollment(&state.db, enrollment.id).await?;
    Ok((StatusCode::CREATED, Json(details.into())))
}

/// Update an enrollment. Identity fields can never change; cancellation is
/// only accepted before the semester deadline unless a score is recorded in
/// the same request; a canceled enrollment cannot be reactivated.
#[utoipa::path(
    patch,
    path = "/enrollments/{id}",
    params(
        ("id" = Uuid, Path, description = "Enrollment ID")
    ),
    request_body = UpdateEnrollmentRequest,
    responses(
        (status = 200, description = "Enrollment updated", body = EnrollmentResponse),
        (status = 404, description = "Enrollment not found"),
        (status = 422, description = "Update forbidden or deadline exceeded")
    ),
    tag = "Enrollments"
)]
pub async fn update_enrollment(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(body): Json<UpdateEnrollmentRequest>,
) -> Result<Json<EnrollmentResponse>, ApiError> {
    let now = Utc::now().naive_utc();
    let updated = EnrollmentService::update_enrollment(&state.db, id, body.into(), now).await?;
    let details = EnrollmentService::get_enrollment(&state.db, updated.id).await?;
    Ok(Json(details.into()))
}
