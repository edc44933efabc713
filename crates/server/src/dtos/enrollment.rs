use chrono::NaiveDateTime;
use database::services::enrollment::{EnrollmentChanges, EnrollmentDetails, NewEnrollment};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;

#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateEnrollmentRequest {
    pub student_number: String,
    pub class_code: String,
    /// Accepted by the parser so the service can reject records created in
    /// the canceled state
    #[serde(default)]
    pub is_canceled: bool,
}

impl From<CreateEnrollmentRequest> for NewEnrollment {
    fn from(req: CreateEnrollmentRequest) -> Self {
        Self {
            student_number: req.student_number,
            class_code: req.class_code,
            is_canceled: req.is_canceled,
        }
    }
}

#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateEnrollmentRequest {
    pub student_id: Option<Uuid>,
    pub student_number: Option<String>,
    pub class_id: Option<Uuid>,
    pub class_code: Option<String>,
    pub is_canceled: Option<bool>,
    pub cancellation_reason: Option<String>,
    pub score: Option<f32>,
}

impl From<UpdateEnrollmentRequest> for EnrollmentChanges {
    fn from(req: UpdateEnrollmentRequest) -> Self {
        Self {
            student_id: req.student_id,
            student_number: req.student_number,
            class_id: req.class_id,
            class_code: req.class_code,
            is_canceled: req.is_canceled,
            cancellation_reason: req.cancellation_reason,
            score: req.score,
        }
    }
}

#[derive(Debug, Deserialize, ToSchema, IntoParams)]
#[serde(rename_all = "camelCase")]
pub struct EnrollmentQueryParams {
    pub student_number: Option<String>,
    pub class_code: Option<String>,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct StudentRef {
    pub id: Uuid,
    pub student_number: String,
    pub full_name: String,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ClassRef {
    pub id: Uuid,
    pub class_code: String,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct EnrollmentResponse {
    pub id: Uuid,
    pub student: Option<StudentRef>,
    pub class: Option<ClassRef>,
    pub is_canceled: bool,
    pub cancellation_reason: Option<String>,
    pub score: f32,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

impl From<EnrollmentDetails> for EnrollmentResponse {
    fn from(details: EnrollmentDetails) -> Self {
        Self {
            id: details.enrollment.id,
            student: details.student.map(|s| StudentRef {
                id: s.id,
                student_number: s.student_number,
                full_name: s.full_name,
            }),
            class: details.class.map(|c| ClassRef {
                id: c.id,
                class_code: c.code,
            }),
            is_canceled: details.enrollment.is_canceled,
            cancellation_reason: details.enrollment.cancellation_reason,
            score: details.enrollment.score,
            created_at: details.enrollment.created_at,
            updated_at: details.enrollment.updated_at,
        }
    }
}
