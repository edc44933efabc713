use crate::dtos::settings::{EmailDomainsDto, StatusRulesDto};
use crate::error::ApiError;
use crate::state::AppState;
use axum::{Json, extract::State};
use models::policy::{AllowedEmailDomains, StatusTransitionRules};
use std::io;

fn policy_io(err: io::Error) -> ApiError {
    ApiError::Internal(format!("settings store: {err}"))
}

/// Get the email domain policy for student addresses
#[utoipa::path(
    get,
    path = "/settings/email-domains",
    responses(
        (status = 200, description = "Current email domain policy", body = EmailDomainsDto)
    ),
    tag = "Settings"
)]
pub async fn get_email_domains(
    State(state): State<AppState>,
) -> Result<Json<EmailDomainsDto>, ApiError> {
    let value = state
        .settings
        .load_email_domains()
        .await
        .map_err(policy_io)?;
    Ok(Json(value.into()))
}

/// Replace the email domain policy. An empty list removes the restriction.
#[utoipa::path(
    put,
    path = "/settings/email-domains",
    request_body = EmailDomainsDto,
    responses(
        (status = 200, description = "Policy saved", body = EmailDomainsDto)
    ),
    tag = "Settings"
)]
pub async fn put_email_domains(
    State(state): State<AppState>,
    Json(body): Json<EmailDomainsDto>,
) -> Result<Json<EmailDomainsDto>, ApiError> {
    let value: AllowedEmailDomains = body.into();
    state
        .settings
        .save_email_domains(&value)
        .await
        .map_err(policy_io)?;
    Ok(Json(value.into()))
}

/// Get the student status transition rules
#[utoipa::path(
    get,
    path = "/settings/status-transitions",
    responses(
        (status = 200, description = "Current transition rules", body = StatusRulesDto)
    ),
    tag = "Settings"
)]
pub async fn get_status_rules(
    State(state): State<AppState>,
) -> Result<Json<StatusRulesDto>, ApiError> {
    let value = state.settings.load_status_rules().await.map_err(policy_io)?;
    Ok(Json(value.into()))
}

/// Replace the student status transition rules. An empty rule set allows any
/// change.
#[utoipa::path(
    put,
    path = "/settings/status-transitions",
    request_body = StatusRulesDto,
    responses(
        (status = 200, description = "Rules saved", body = StatusRulesDto)
    ),
    tag = "Settings"
)]
pub async fn put_status_rules(
    State(state): State<AppState>,
    Json(body): Json<StatusRulesDto>,
) -> Result<Json<StatusRulesDto>, ApiError> {
    let value: StatusTransitionRules = body.into();
    state
        .settings
        .save_status_rules(&value)
        .await
        .map_err(policy_io)?;
    Ok(Json(value.into()))
}
