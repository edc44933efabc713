use chrono::NaiveDateTime;
use database::services::class::{ClassChanges, ClassDetails, NewClass};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateClassRequest {
    pub class_code: String,
    pub course_code: String,
    pub academic_year: i16,
    pub semester: String,
    #[serde(default)]
    pub lecturers: Vec<String>,
    pub max_students: i32,
    pub schedule: Option<String>,
    pub classroom: Option<String>,
}

impl From<CreateClassRequest> for NewClass {
    fn from(req: CreateClassRequest) -> Self {
        Self {
            code: req.class_code,
            course_code: req.course_code,
            academic_year: req.academic_year,
            semester: req.semester,
            lecturers: req.lecturers,
            max_students: req.max_students,
            schedule: req.schedule,
            classroom: req.classroom,
        }
    }
}

#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateClassRequest {
    pub course_code: Option<String>,
    pub academic_year: Option<i16>,
    pub semester: Option<String>,
    pub lecturers: Option<Vec<String>>,
    pub max_students: Option<i32>,
    pub schedule: Option<String>,
    pub classroom: Option<String>,
}

impl From<UpdateClassRequest> for ClassChanges {
    fn from(req: UpdateClassRequest) -> Self {
        Self {
            course_code: req.course_code,
            academic_year: req.academic_year,
            semester: req.semester,
            lecturers: req.lecturers,
            max_students: req.max_students,
            schedule: req.schedule,
            classroom: req.classroom,
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CourseRef {
    pub id: Uuid,
    pub course_code: String,
    pub name: String,
    pub deactivated: bool,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ClassResponse {
    pub id: Uuid,
    pub class_code: String,
    pub course: Option<CourseRef>,
    pub academic_year: i16,
    pub semester: String,
    pub lecturers: Vec<String>,
    pub max_students: i32,
    pub schedule: Option<String>,
    pub classroom: Option<String>,
    pub deactivated: bool,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

impl From<ClassDetails> for ClassResponse {
    fn from(details: ClassDetails) -> Self {
        let lecturers = serde_json::from_value(details.class.lecturers).unwrap_or_default();

        Self {
            id: details.class.id,
            class_code: details.class.code,
            course: details.course.map(|c| CourseRef {
                id: c.id,
                course_code: c.code,
                name: c.name,
                deactivated: c.deactivated,
            }),
            academic_year: details.class.academic_year,
            semester: details.class.semester,
            lecturers,
            max_students: details.class.max_students,
            schedule: details.class.schedule,
            classroom: details.class.classroom,
            deactivated: details.class.deactivated,
            created_at: details.class.created_at,
            updated_at: details.class.updated_at,
        }
    }
}
