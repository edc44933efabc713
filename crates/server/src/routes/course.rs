use crate::dtos::common::DeleteResponse;
use crate::dtos::course::{CourseResponse, CreateCourseRequest, UpdateCourseRequest};
use crate::error::ApiError;
use crate::state::AppState;
use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};
use chrono::Utc;
use database::services::course::CourseService;

/// List all courses with their faculty and prerequisites resolved
#[utoipa::path(
    get,
    path = "/courses",
    responses(
        (status = 200, description = "List of courses", body = Vec<CourseResponse>),
        (status = 500, description = "Internal server error")
    ),
    tag = "Courses"
)]
pub async fn list_courses(
    State(state): State<AppState>,
) -> Result<Json<Vec<CourseResponse>>, ApiError> {
    let details = CourseService::list_courses(&state.db).await?;
    Ok(Json(details.into_iter().map(Into::into).collect()))
}

/// Get a course by its code
#[utoipa::path(
    get,
    path = "/courses/{code}",
    params(
        ("code" = String, Path, description = "Course code")
    ),
    responses(
        (status = 200, description = "Course found", body = CourseResponse),
        (status = 404, description = "Course not found")
    ),
    tag = "Courses"
)]
pub async fn get_course(
    State(state): State<AppState>,
    Path(code): Path<String>,
) -> Result<Json<CourseResponse>, ApiError> {
    let details = CourseService::get_course(&state.db, &code).await?;
    Ok(Json(details.into()))
}

/// Create a course
#[utoipa::path(
    post,
    path = "/courses",
    request_body = CreateCourseRequest,
    responses(
        (status = 201, description = "Course created", body = CourseResponse),
        (status = 400, description = "Validation failed"),
        (status = 409, description = "Course code already taken")
    ),
    tag = "Courses"
)]
pub async fn create_course(
    State(state): State<AppState>,
    Json(body): Json<CreateCourseRequest>,
) -> Result<(StatusCode, Json<CourseResponse>), ApiError> {
    let now = Utc::now().naive_utc();
    let course = CourseService::create_course(&state.db, body.into(), now).await?;
    let details = CourseService::get_course(&state.db, &course.code).await?;
    Ok((StatusCode::CREATED, Json(details.into())))
}

/// Update a course. The course code is immutable and credits are frozen once
/// enrollments reference the course.
#[utoipa::path(
    patch,
    path = "/courses/{code}",
    params(
        ("code" = String, Path, description = "Course code")
    ),
    request_body = UpdateCourseRequest,
    responses(
        (status = 200, description = "Course updated", body = CourseResponse),
        (status = 404, description = "Course not found"),
        (status = 422, description = "Update forbidden")
    ),
    tag = "Courses"
)]
pub async fn update_course(
    State(state): State<AppState>,
    Path(code): Path<String>,
    Json(body): Json<UpdateCourseRequest>,
) -> Result<Json<CourseResponse>, ApiError> {
    let now = Utc::now().naive_utc();
    let updated = CourseService::update_course(&state.db, &code, body.into(), now).await?;
    let details = CourseService::get_course(&state.db, &updated.code).await?;
    Ok(Json(details.into()))
}

/// Delete a course. Deletion is only possible shortly after creation; a
/// course that classes still reference is deactivated instead.
#[utoipa::path(
    delete,
    path = "/courses/{code}",
    params(
        ("code" = String, Path, description = "Course code")
    ),
    responses(
        (status = 200, description = "Course deleted or deactivated", body = DeleteResponse),
        (status = 404, description = "Course not found"),
        (status = 422, description = "Delete window expired or course already deactivated")
    ),
    tag = "Courses"
)]
pub async fn delete_course(
    State(state): State<AppState>,
    Path(code): Path<String>,
) -> Result<Json<DeleteResponse>, ApiError> {
    let now = Utc::now().naive_utc();
    let outcome = CourseService::delete_course(&state.db, &code, &state.lifecycle, now).await?;
    Ok(Json(DeleteResponse::from_outcome("Course", &code, outcome)))
}
