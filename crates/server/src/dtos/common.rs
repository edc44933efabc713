use database::error::DeleteOutcome;
use serde::Serialize;
use utoipa::ToSchema;

/// Tells the caller whether the record was actually removed or only
/// deactivated because dependent records still reference it
#[derive(Debug, Serialize, ToSchema)]
pub struct DeleteResponse {
    pub deleted: bool,
    pub deactivated: bool,
    pub message: String,
}

impl DeleteResponse {
    pub fn removed(entity: &str, key: &str) -> Self {
        Self {
            deleted: true,
            deactivated: false,
            message: format!("{entity} \"{key}\" deleted"),
        }
    }

    pub fn from_outcome(entity: &str, key: &str, outcome: DeleteOutcome) -> Self {
        match outcome {
            DeleteOutcome::Removed => Self::removed(entity, key),
            DeleteOutcome::Deactivated { code } => Self {
                deleted: false,
                deactivated: true,
                message: format!(
                    "{entity} \"{code}\" has dependent records and was deactivated instead"
                ),
            },
        }
    }
}
