use axum::http::StatusCode;

/// Liveness probe; answers as soon as the router is up
#[utoipa::path(
    get,
    path = "/health",
    responses(
        (status = 200, description = "Service is healthy", content_type = "text/plain", body = String)
    ),
    tag = "Health"
)]
pub async fn health() -> (StatusCode, &'static str) {
    (StatusCode::OK, "registrar-api: OK")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_health_reports_ok() {
        let (status, body) = health().await;
        assert_eq!(status, StatusCode::OK);
        assert!(body.ends_with("OK"));
    }
}
