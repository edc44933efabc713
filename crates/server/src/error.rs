use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use database::error::ServiceError;
use serde_json::json;

/// Wraps guard rejections (and the rare infrastructure failure) into JSON
/// error responses
pub enum ApiError {
    Service(ServiceError),
    Internal(String),
}

impl From<ServiceError> for ApiError {
    fn from(err: ServiceError) -> Self {
        Self::Service(err)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, body) = match self {
            Self::Service(err) => {
                let status = match &err {
                    ServiceError::Validation(_) => StatusCode::BAD_REQUEST,
                    ServiceError::NotFound { .. } => StatusCode::NOT_FOUND,
                    ServiceError::DuplicateKey { .. } | ServiceError::Conflict(_) => {
                        StatusCode::CONFLICT
                    }
                    ServiceError::UpdateForbidden(_)
                    | ServiceError::CapacityExceeded { .. }
                    | ServiceError::PrerequisiteNotMet { .. }
                    | ServiceError::DeadlineExceeded { .. }
                    | ServiceError::AlreadyDeactivated { .. }
                    | ServiceError::DeleteWindowExpired { .. } => StatusCode::UNPROCESSABLE_ENTITY,
                    ServiceError::Db(_) => StatusCode::INTERNAL_SERVER_ERROR,
                };

                let body = match &err {
                    ServiceError::Validation(fields) => {
                        let field_map: serde_json::Map<String, serde_json::Value> = fields
                            .iter()
                            .map(|f| (f.field.clone(), f.message.clone().into()))
                            .collect();
                        json!({
                            "error": err.kind(),
                            "message": err.to_string(),
                            "fields": field_map,
                        })
                    }
                    ServiceError::Db(db_err) => {
                        log::error!("database error: {db_err}");
                        json!({
                            "error": err.kind(),
                            "message": "internal database error",
                        })
                    }
                    _ => json!({
                        "error": err.kind(),
                        "message": err.to_string(),
                    }),
                };

                (status, body)
            }
            Self::Internal(message) => {
                log::error!("internal error: {message}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    json!({ "error": "internal_error", "message": "internal server error" }),
                )
            }
        };

        (status, Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_mapping() {
        let cases = [
            (
                ApiError::from(ServiceError::validation("credits", "too low")),
                StatusCode::BAD_REQUEST,
            ),
            (
                ApiError::from(ServiceError::NotFound {
                    entity: "Course",
                    key: "CS101".to_string(),
                }),
                StatusCode::NOT_FOUND,
            ),
            (
                ApiError::from(ServiceError::Conflict("already enrolled".to_string())),
                StatusCode::CONFLICT,
            ),
            (
                ApiError::from(ServiceError::CapacityExceeded {
                    class_code: "CS101-01".to_string(),
                    max_students: 1,
                }),
                StatusCode::UNPROCESSABLE_ENTITY,
            ),
        ];

        for (err, expected) in cases {
            assert_eq!(err.into_response().status(), expected);
        }
    }
}
