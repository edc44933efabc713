use axum::http::StatusCode;

/// Service banner naming the API and its version
#[utoipa::path(
    get,
    path = "/",
    responses(
        (status = 200, description = "Service banner", content_type = "text/plain", body = String)
    ),
    tag = ""
)]
pub async fn root() -> (StatusCode, &'static str) {
    (
        StatusCode::OK,
        concat!("registrar-api ", env!("CARGO_PKG_VERSION")),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_root_names_the_service() {
        let (status, body) = root().await;
        assert_eq!(status, StatusCode::OK);
        assert!(body.starts_with("registrar-api "));
    }
}
