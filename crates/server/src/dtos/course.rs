use chrono::NaiveDateTime;
use database::services::course::{CourseChanges, CourseDetails, NewCourse};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateCourseRequest {
    pub course_code: String,
    pub name: String,
    pub credits: i32,
    pub faculty_id: Uuid,
    pub description: Option<String>,
    #[serde(default)]
    pub prerequisite_ids: Vec<Uuid>,
}

impl From<CreateCourseRequest> for NewCourse {
    fn from(req: CreateCourseRequest) -> Self {
        Self {
            code: req.course_code,
            name: req.name,
            credits: req.credits,
            faculty_id: req.faculty_id,
            description: req.description,
            prerequisite_ids: req.prerequisite_ids,
        }
    }
}

/// Patch body for a course. `courseCode` is accepted by the parser so the
/// service can reject the attempt explicitly instead of silently ignoring it.
#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateCourseRequest {
    pub course_code: Option<String>,
    pub name: Option<String>,
    pub credits: Option<i32>,
    pub faculty_id: Option<Uuid>,
    pub description: Option<String>,
    pub prerequisite_ids: Option<Vec<Uuid>>,
}

impl From<UpdateCourseRequest> for CourseChanges {
    fn from(req: UpdateCourseRequest) -> Self {
        Self {
            code: req.course_code,
            name: req.name,
            credits: req.credits,
            faculty_id: req.faculty_id,
            description: req.description,
            prerequisite_ids: req.prerequisite_ids,
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct FacultyRef {
    pub id: Uuid,
    pub name: String,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PrerequisiteRef {
    pub id: Uuid,
    pub course_code: String,
    pub name: String,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CourseResponse {
    pub id: Uuid,
    pub course_code: String,
    pub name: String,
    pub credits: i32,
    pub faculty: Option<FacultyRef>,
    pub description: Option<String>,
    pub prerequisites: Vec<PrerequisiteRef>,
    pub deactivated: bool,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

impl From<CourseDetails> for CourseResponse {
    fn from(details: CourseDetails) -> Self {
        Self {
            id: details.course.id,
            course_code: details.course.code,
            name: details.course.name,
            credits: details.course.credits,
            faculty: details.faculty.map(|f| FacultyRef {
                id: f.id,
                name: f.name,
            }),
            description: details.course.description,
            prerequisites: details
                .prerequisites
                .into_iter()
                .map(|c| PrerequisiteRef {
                    id: c.id,
                    course_code: c.code,
                    name: c.name,
                })
                .collect(),
            deactivated: details.course.deactivated,
            created_at: details.course.created_at,
            updated_at: details.course.updated_at,
        }
    }
}
