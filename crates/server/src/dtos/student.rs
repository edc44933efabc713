use crate::dtos::catalog::LookupRef;
use chrono::NaiveDateTime;
use database::services::student::{NewStudent, StudentChanges, StudentDetails};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateStudentRequest {
    pub student_number: String,
    pub full_name: String,
    pub email: String,
    pub phone: Option<String>,
    pub faculty_id: Uuid,
    pub program_id: Uuid,
    pub status_id: Uuid,
}

impl From<CreateStudentRequest> for NewStudent {
    fn from(req: CreateStudentRequest) -> Self {
        Self {
            student_number: req.student_number,
            full_name: req.full_name,
            email: req.email,
            phone: req.phone,
            faculty_id: req.faculty_id,
            program_id: req.program_id,
            status_id: req.status_id,
        }
    }
}

#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateStudentRequest {
    pub full_name: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub faculty_id: Option<Uuid>,
    pub program_id: Option<Uuid>,
    pub status_id: Option<Uuid>,
}

impl From<UpdateStudentRequest> for StudentChanges {
    fn from(req: UpdateStudentRequest) -> Self {
        Self {
            full_name: req.full_name,
            email: req.email,
            phone: req.phone,
            faculty_id: req.faculty_id,
            program_id: req.program_id,
            status_id: req.status_id,
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct StudentResponse {
    pub id: Uuid,
    pub student_number: String,
    pub full_name: String,
    pub email: String,
    pub phone: Option<String>,
    pub faculty: Option<LookupRef>,
    pub program: Option<LookupRef>,
    pub status: Option<LookupRef>,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

impl From<StudentDetails> for StudentResponse {
    fn from(details: StudentDetails) -> Self {
        Self {
            id: details.student.id,
            student_number: details.student.student_number,
            full_name: details.student.full_name,
            email: details.student.email,
            phone: details.student.phone,
            faculty: details.faculty.map(Into::into),
            program: details.program.map(Into::into),
            status: details.status.map(Into::into),
            created_at: details.student.created_at,
            updated_at: details.student.updated_at,
        }
    }
}
