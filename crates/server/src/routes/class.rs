use crate::dtos::class::{ClassResponse, CreateClassRequest, UpdateClassRequest};
use crate::dtos::common::DeleteResponse;
use crate::error::ApiError;
use crate::state::AppState;
use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};
use chrono::Utc;
use database::services::class::ClassService;

/// List all classes with their course resolved
#[utoipa::path(
    get,
    path = "/classes",
    responses(
        (status = 200, description = "List of classes", body = Vec<ClassResponse>),
        (status = 500, description = "Internal server error")
    ),
    tag = "Classes"
)]
pub async fn list_classes(
    State(state): State<AppState>,
) -> Result<Json<Vec<ClassResponse>>, ApiError> {
    let details = ClassService::list_classes(&state.db).await?;
    Ok(Json(details.into_iter().map(Into::into).collect()))
}

/// Get a class by its code
#[utoipa::path(
    get,
    path = "/classes/{code}",
    params(
        ("code" = String, Path, description = "Class code")
    ),
    responses(
        (status = 200, description = "Class found", body = ClassResponse),
        (status = 404, description = "Class not found")
    ),
    tag = "Classes"
)]
pub async fn get_class(
    State(state): State<AppState>,
    Path(code): Path<String>,
) -> Result<Json<ClassResponse>, ApiError> {
    let details = ClassService::get_class(&state.db, &code).await?;
    Ok(Json(details.into()))
}

/// Create a class bound to a live course
#[utoipa::path(
    post,
    path = "/classes",
    request_body = CreateClassRequest,
    responses(
        (status = 201, description = "Class created", body = ClassResponse),
        (status = 400, description = "Validation failed"),
        (status = 409, description = "Class code already taken")
    ),
    tag = "Classes"
)]
pub async fn create_class(
    State(state): State<AppState>,
    Json(body): Json<CreateClassRequest>,
) -> Result<(StatusCode, Json<ClassResponse>), ApiError> {
    let now = Utc::now().naive_utc();
    let class = ClassService::create_class(&state.db, body.into(), now).await?;
    let details = ClassService::get_class(&state.db, &class.code).await?;
    Ok((StatusCode::CREATED, Json(details.into())))
}

/// Update a class. Rebinding to another course revalidates that the course
/// exists and is not deactivated.
#[utoipa::path(
    patch,
    path = "/classes/{code}",
    params(
        ("code" = String, Path, description = "Class code")
    ),
    request_body = UpdateClassRequest,
    responses(
        (status = 200, description = "Class updated", body = ClassResponse),
        (status = 400, description = "Validation failed"),
        (status = 404, description = "Class not found")
    ),
    tag = "Classes"
)]
pub async fn update_class(
    State(state): State<AppState>,
    Path(code): Path<String>,
    Json(body): Json<UpdateClassRequest>,
) -> Result<Json<ClassResponse>, ApiError> {
    let now = Utc::now().naive_utc();
    let updated = ClassService::update_class(&state.db, &code, body.into(), now).await?;
    let details = ClassService::get_class(&state.db, &updated.code).await?;
    Ok(Json(details.into()))
}

/// Delete a class, or deactivate it when enrollments still reference it
#[utoipa::path(
    delete,
    path = "/classes/{code}",
    params(
        ("code" = String, Path, description = "Class code")
    ),
    responses(
        (status = 200, description = "Class deleted or deactivated", body = DeleteResponse),
        (status = 404, description = "Class not found"),
        (status = 422, description = "Class already deactivated")
    ),
    tag = "Classes"
)]
pub async fn delete_class(
    State(state): State<AppState>,
    Path(code): Path<String>,
) -> Result<Json<DeleteResponse>, ApiError> {
    let now = Utc::now().naive_utc();
    let outcome = ClassService::delete_class(&state.db, &code, now).await?;
    Ok(Json(DeleteResponse::from_outcome("Class", &code, outcome)))
}
