//! Endpoints for the three lookup collections: faculties, programs and
//! student statuses. They all expose the same create/rename/list/delete
//! surface.

use crate::dtos::catalog::{CatalogResponse, NameRequest};
use crate::dtos::common::DeleteResponse;
use crate::error::ApiError;
use crate::state::AppState;
use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};
use chrono::Utc;
use database::services::catalog::{FacultyService, ProgramService, StudentStatusService};
use uuid::Uuid;

/// List all faculties
#[utoipa::path(
    get,
    path = "/faculties",
    responses(
        (status = 200, description = "List of faculties", body = Vec<CatalogResponse>)
    ),
    tag = "Catalog"
)]
pub async fn list_faculties(
    State(state): State<AppState>,
) -> Result<Json<Vec<CatalogResponse>>, ApiError> {
    let records = FacultyService::list(&state.db).await?;
    Ok(Json(records.into_iter().map(Into::into).collect()))
}

/// Create a faculty
#[utoipa::path(
    post,
    path = "/faculties",
    request_body = NameRequest,
    responses(
        (status = 201, description = "Faculty created", body = CatalogResponse),
        (status = 409, description = "Name already taken")
    ),
    tag = "Catalog"
)]
pub async fn create_faculty(
    State(state): State<AppState>,
    Json(body): Json<NameRequest>,
) -> Result<(StatusCode, Json<CatalogResponse>), ApiError> {
    let now = Utc::now().naive_utc();
    let record = FacultyService::create(&state.db, body.name, now).await?;
    Ok((StatusCode::CREATED, Json(record.into())))
}

/// Rename a faculty
#[utoipa::path(
    put,
    path = "/faculties/{id}",
    params(("id" = Uuid, Path, description = "Faculty ID")),
    request_body = NameRequest,
    responses(
        (status = 200, description = "Faculty renamed", body = CatalogResponse),
        (status = 404, description = "Faculty not found"),
        (status = 409, description = "Name already taken")
    ),
    tag = "Catalog"
)]
pub async fn rename_faculty(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(body): Json<NameRequest>,
) -> Result<Json<CatalogResponse>, ApiError> {
    let now = Utc::now().naive_utc();
    let record = FacultyService::rename(&state.db, id, body.name, now).await?;
    Ok(Json(record.into()))
}

/// Delete a faculty. Refused while students or courses still reference it.
#[utoipa::path(
    delete,
    path = "/faculties/{id}",
    params(("id" = Uuid, Path, description = "Faculty ID")),
    responses(
        (status = 200, description = "Faculty deleted", body = DeleteResponse),
        (status = 404, description = "Faculty not found"),
        (status = 409, description = "Faculty still referenced")
    ),
    tag = "Catalog"
)]
pub async fn delete_faculty(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<DeleteResponse>, ApiError> {
    FacultyService::delete(&state.db, id).await?;
    Ok(Json(DeleteResponse::removed("Faculty", &id.to_string())))
}

/// List all programs
#[utoipa::path(
    get,
    path = "/programs",
    responses(
        (status = 200, description = "List of programs", body = Vec<CatalogResponse>)
    ),
    tag = "Catalog"
)]
pub async fn list_programs(
    State(state): State<AppState>,
) -> Result<Json<Vec<CatalogResponse>>, ApiError> {
    let records = ProgramService::list(&state.db).await?;
    Ok(Json(records.into_iter().map(Into::into).collect()))
}

/// Create a program
#[utoipa::path(
    post,
    path = "/programs",
    request_body = NameRequest,
    responses(
        (status = 201, description = "Program created", body = CatalogResponse),
        (status = 409, description = "Name already taken")
    ),
    tag = "Catalog"
)]
pub async fn create_program(
    State(state): State<AppState>,
    Json(body): Json<NameRequest>,
) -> Result<(StatusCode, Json<CatalogResponse>), ApiError> {
    let now = Utc::now().naive_utc();
    let record = ProgramService::create(&state.db, body.name, now).await?;
    Ok((StatusCode::CREATED, Json(record.into())))
}

/// Rename a program
#[utoipa::path(
    put,
    path = "/programs/{id}",
    params(("id" = Uuid, Path, description = "Program ID")),
    request_body = NameRequest,
    responses(
        (status = 200, description = "Program renamed", body = CatalogResponse),
        (status = 404, description = "Program not found"),
        (status = 409, description = "Name already taken")
    ),
    tag = "Catalog"
)]
pub async fn rename_program(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(body): Json<NameRequest>,
) -> Result<Json<CatalogResponse>, ApiError> {
    let now = Utc::now().naive_utc();
    let record = ProgramService::rename(&state.db, id, body.name, now).await?;
    Ok(Json(record.into()))
}

/// Delete a program. Refused while students still reference it.
#[utoipa::path(
    delete,
    path = "/programs/{id}",
    params(("id" = Uuid, Path, description = "Program ID")),
    responses(
        (status = 200, description = "Program deleted", body = DeleteResponse),
        (status = 404, description = "Program not found"),
        (status = 409, description = "Program still referenced")
    ),
    tag = "Catalog"
)]
pub async fn delete_program(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<DeleteResponse>, ApiError> {
    ProgramService::delete(&state.db, id).await?;
    Ok(Json(DeleteResponse::removed("Program", &id.to_string())))
}

/// List all student statuses
#[utoipa::path(
    get,
    path = "/student-statuses",
    responses(
        (status = 200, description = "List of student statuses", body = Vec<CatalogResponse>)
    ),
    tag = "Catalog"
)]
pub async fn list_statuses(
    State(state): State<AppState>,
) -> Result<Json<Vec<CatalogResponse>>, ApiError> {
    let records = StudentStatusService::list(&state.db).await?;
    Ok(Json(records.into_iter().map(Into::into).collect()))
}

/// Create a student status
#[utoipa::path(
    post,
    path = "/student-statuses",
    request_body = NameRequest,
    responses(
        (status = 201, description = "Status created", body = CatalogResponse),
        (status = 409, description = "Name already taken")
    ),
    tag = "Catalog"
)]
pub async fn create_status(
    State(state): State<AppState>,
    Json(body): Json<NameRequest>,
) -> Result<(StatusCode, Json<CatalogResponse>), ApiError> {
    let now = Utc::now().naive_utc();
    let record = StudentStatusService::create(&state.db, body.name, now).await?;
    Ok((StatusCode::CREATED, Json(record.into())))
}

/// Rename a student status
#[utoipa::path(
    put,
    path = "/student-statuses/{id}",
    params(("id" = Uuid, Path, description = "Status ID")),
    request_body = NameRequest,
    responses(
        (status = 200, description = "Status renamed", body = CatalogResponse),
        (status = 404, description = "Status not found"),
        (status = 409, description = "Name already taken")
    ),
    tag = "Catalog"
)]
pub async fn rename_status(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(body): Json<NameRequest>,
) -> Result<Json<CatalogResponse>, ApiError> {
    let now = Utc::now().naive_utc();
    let record = StudentStatusService::rename(&state.db, id, body.name, now).await?;
    Ok(Json(record.into()))
}

/// Delete a student status. Refused while students still reference it.
#[utoipa::path(
    delete,
    path = "/student-statuses/{id}",
    params(("id" = Uuid, Path, description = "Status ID")),
    responses(
        (status = 200, description = "Status deleted", body = DeleteResponse),
        (status = 404, description = "Status not found"),
        (status = 409, description = "Status still referenced")
    ),
    tag = "Catalog"
)]
pub async fn delete_status(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<DeleteResponse>, ApiError> {
    StudentStatusService::delete(&state.db, id).await?;
    Ok(Json(DeleteResponse::removed(
        "StudentStatus",
        &id.to_string(),
    )))
}
