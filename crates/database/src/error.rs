use chrono::NaiveDate;
use sea_orm::{DbErr, SqlErr};
use serde::Serialize;
use thiserror::Error;

/// A constraint violation scoped to a single request field, so several
/// violations on one request can be reported together
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FieldError {
    pub field: String,
    pub message: String,
}

impl FieldError {
    pub fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
        }
    }
}

/// Everything a lifecycle guard can reject a request with.
///
/// These are business-rule rejections, not transient faults: none of them is
/// ever retried, and a failed guard leaves no partial write behind.
#[derive(Debug, Error)]
pub enum ServiceError {
    #[error("validation failed")]
    Validation(Vec<FieldError>),

    #[error("a record with {field} \"{value}\" already exists")]
    DuplicateKey { field: &'static str, value: String },

    #[error("{0}")]
    UpdateForbidden(String),

    #[error("{entity} \"{key}\" does not exist")]
    NotFound { entity: &'static str, key: String },

    #[error("{0}")]
    Conflict(String),

    #[error("class \"{class_code}\" is already at its limit of {max_students} students")]
    CapacityExceeded {
        class_code: String,
        max_students: i32,
    },

    #[error("missing prerequisite course(s): {missing}")]
    PrerequisiteNotMet { missing: String },

    #[error("the cancellation deadline ({deadline}) has passed")]
    DeadlineExceeded { deadline: NaiveDate },

    #[error("{entity} \"{key}\" is already deactivated")]
    AlreadyDeactivated { entity: &'static str, key: String },

    #[error(
        "course \"{code}\" was created more than {window_minutes} minute(s) ago and can no longer be deleted"
    )]
    DeleteWindowExpired { code: String, window_minutes: i64 },

    #[error(transparent)]
    Db(#[from] DbErr),
}

impl ServiceError {
    /// Shorthand for a single field-scoped violation
    pub fn validation(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Validation(vec![FieldError::new(field, message)])
    }

    /// Converts a unique-key rejection raised by the store into the domain
    /// duplicate error. Guards pre-check business keys inside their
    /// transaction, but a concurrent insert can still land first; the
    /// constraint is the final arbiter.
    pub fn from_write_err(err: DbErr, field: &'static str, value: impl Into<String>) -> Self {
        if is_unique_violation(err.sql_err()) {
            Self::DuplicateKey {
                field,
                value: value.into(),
            }
        } else {
            Self::Db(err)
        }
    }

    /// Stable machine-readable name for the error class
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Validation(_) => "validation_error",
            Self::DuplicateKey { .. } => "duplicate_key",
            Self::UpdateForbidden(_) => "update_forbidden",
            Self::NotFound { .. } => "not_found",
            Self::Conflict(_) => "conflict",
            Self::CapacityExceeded { .. } => "capacity_exceeded",
            Self::PrerequisiteNotMet { .. } => "prerequisite_not_met",
            Self::DeadlineExceeded { .. } => "deadline_exceeded",
            Self::AlreadyDeactivated { .. } => "already_deactivated",
            Self::DeleteWindowExpired { .. } => "delete_window_expired",
            Self::Db(_) => "database_error",
        }
    }
}

/// True when the database rejected a write because a unique key was taken
pub(crate) fn is_unique_violation(err: Option<SqlErr>) -> bool {
    matches!(err, Some(SqlErr::UniqueConstraintViolation(_)))
}

pub type ServiceResult<T> = Result<T, ServiceError>;

/// What actually happened to a record on a delete request. A delete blocked
/// by dependent records is substituted with deactivation and still succeeds;
/// callers must report it differently from a plain removal.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum DeleteOutcome {
    Removed,
    Deactivated { code: String },
}

impl DeleteOutcome {
    /// Substitution rule for deletes: a record that dependent records still
    /// reference is deactivated instead of removed
    pub fn for_dependents(code: &str, dependents: u64) -> Self {
        if dependents > 0 {
            Self::Deactivated {
                code: code.to_string(),
            }
        } else {
            Self::Removed
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_delete_without_dependents_removes() {
        assert_eq!(
            DeleteOutcome::for_dependents("CS101", 0),
            DeleteOutcome::Removed
        );
    }

    #[test]
    fn test_delete_with_dependents_deactivates_and_names_the_code() {
        assert_eq!(
            DeleteOutcome::for_dependents("CS101", 3),
            DeleteOutcome::Deactivated {
                code: "CS101".to_string()
            }
        );
    }

    #[test]
    fn test_unique_violation_detection() {
        assert!(is_unique_violation(Some(SqlErr::UniqueConstraintViolation(
            "duplicate key value violates unique constraint".to_string()
        ))));
        assert!(!is_unique_violation(Some(
            SqlErr::ForeignKeyConstraintViolation("fk".to_string())
        )));
        assert!(!is_unique_violation(None));
    }

    #[test]
    fn test_other_write_errors_stay_database_errors() {
        let err =
            ServiceError::from_write_err(DbErr::Custom("boom".to_string()), "courseCode", "CS101");
        assert!(matches!(err, ServiceError::Db(_)));
    }
}
