//! Existence checks for foreign references, run before any write that
//! declares one. Each failure is scoped to the request field that carried
//! the invalid reference.

use crate::entities::{classes, courses, faculties, programs, student_statuses, students};
use crate::error::{ServiceError, ServiceResult};
use sea_orm::{ColumnTrait, ConnectionTrait, EntityTrait, QueryFilter};
use std::collections::HashSet;
use uuid::Uuid;

pub async fn require_faculty<C: ConnectionTrait>(
    conn: &C,
    id: Uuid,
    field: &str,
) -> ServiceResult<faculties::Model> {
    faculties::Entity::find_by_id(id).one(conn).await?.ok_or_else(|| {
        ServiceError::validation(field, format!("Faculty with id \"{id}\" does not exist"))
    })
}

pub async fn require_program<C: ConnectionTrait>(
    conn: &C,
    id: Uuid,
    field: &str,
) -> ServiceResult<programs::Model> {
    programs::Entity::find_by_id(id).one(conn).await?.ok_or_else(|| {
        ServiceError::validation(field, format!("Program with id \"{id}\" does not exist"))
    })
}

pub async fn require_status<C: ConnectionTrait>(
    conn: &C,
    id: Uuid,
    field: &str,
) -> ServiceResult<student_statuses::Model> {
    student_statuses::Entity::find_by_id(id)
        .one(conn)
        .await?
        .ok_or_else(|| {
            ServiceError::validation(
                field,
                format!("StudentStatus with id \"{id}\" does not exist"),
            )
        })
}

/// Resolves a course business key; callers decide whether a deactivated
/// course is acceptable
pub async fn require_course_by_code<C: ConnectionTrait>(
    conn: &C,
    code: &str,
) -> ServiceResult<courses::Model> {
    courses::Entity::find()
        .filter(courses::Column::Code.eq(code))
        .one(conn)
        .await?
        .ok_or_else(|| {
            ServiceError::validation(
                "courseCode",
                format!("Course with code \"{code}\" does not exist"),
            )
        })
}

pub async fn require_class_by_code<C: ConnectionTrait>(
    conn: &C,
    code: &str,
) -> ServiceResult<classes::Model> {
    classes::Entity::find()
        .filter(classes::Column::Code.eq(code))
        .one(conn)
        .await?
        .ok_or(ServiceError::NotFound {
            entity: "Class",
            key: code.to_string(),
        })
}

pub async fn require_student_by_number<C: ConnectionTrait>(
    conn: &C,
    student_number: &str,
) -> ServiceResult<students::Model> {
    students::Entity::find()
        .filter(students::Column::StudentNumber.eq(student_number))
        .one(conn)
        .await?
        .ok_or(ServiceError::NotFound {
            entity: "Student",
            key: student_number.to_string(),
        })
}

/// Returns the subset of `ids` that do not resolve to a course
pub async fn missing_courses<C: ConnectionTrait>(
    conn: &C,
    ids: &[Uuid],
) -> ServiceResult<Vec<Uuid>> {
    if ids.is_empty() {
        return Ok(Vec::new());
    }

    let found: HashSet<Uuid> = courses::Entity::find()
        .filter(courses::Column::Id.is_in(ids.iter().copied()))
        .all(conn)
        .await?
        .into_iter()
        .map(|c| c.id)
        .collect();

    Ok(ids.iter().copied().filter(|id| !found.contains(id)).collect())
}
