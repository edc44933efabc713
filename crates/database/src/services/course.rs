use crate::config::LifecycleConfig;
use crate::entities::{classes, course_prerequisites, courses, enrollments, faculties};
use crate::error::{DeleteOutcome, FieldError, ServiceError, ServiceResult};
use crate::services::validators;
use chrono::{Duration, NaiveDateTime};
use futures::try_join;
use sea_orm::{
    ActiveModelTrait, ActiveValue::Set, ColumnTrait, Condition, ConnectionTrait,
    DatabaseConnection, EntityTrait, PaginatorTrait, QueryFilter, TransactionTrait,
};
use std::collections::HashMap;
use uuid::Uuid;

/// A course as callers see it, with its references resolved
#[derive(Debug, Clone)]
pub struct CourseDetails {
    pub course: courses::Model,
    pub faculty: Option<faculties::Model>,
    pub prerequisites: Vec<courses::Model>,
}

#[derive(Debug, Clone)]
pub struct NewCourse {
    pub code: String,
    pub name: String,
    pub credits: i32,
    pub faculty_id: Uuid,
    pub description: Option<String>,
    pub prerequisite_ids: Vec<Uuid>,
}

/// Field-level patch for a course. `code` is carried only so the guard can
/// reject any attempt to change it.
#[derive(Debug, Clone, Default)]
pub struct CourseChanges {
    pub code: Option<String>,
    pub name: Option<String>,
    pub credits: Option<i32>,
    pub faculty_id: Option<Uuid>,
    pub description: Option<String>,
    pub prerequisite_ids: Option<Vec<Uuid>>,
}

pub struct CourseService;

impl CourseService {
    pub async fn create_course(
        db: &DatabaseConnection,
        input: NewCourse,
        now: NaiveDateTime,
    ) -> ServiceResult<courses::Model> {
        let txn = db.begin().await?;

        let mut errors = check_new_course(&input);

        if faculties::Entity::find_by_id(input.faculty_id)
            .one(&txn)
            .await?
            .is_none()
        {
            errors.push(FieldError::new(
                "facultyId",
                format!("Faculty with id \"{}\" does not exist", input.faculty_id),
            ));
        }

        for id in validators::missing_courses(&txn, &input.prerequisite_ids).await? {
            errors.push(FieldError::new(
                "prerequisiteIds",
                format!("Course with id \"{id}\" does not exist"),
            ));
        }

        if !errors.is_empty() {
            return Err(ServiceError::Validation(errors));
        }

        let taken = courses::Entity::find()
            .filter(courses::Column::Code.eq(&input.code))
            .count(&txn)
            .await?;
        if taken > 0 {
            return Err(ServiceError::DuplicateKey {
                field: "courseCode",
                value: input.code,
            });
        }

        let NewCourse {
            code,
            name,
            credits,
            faculty_id,
            description,
            prerequisite_ids,
        } = input;

        let course_id = Uuid::new_v4();
        let course = courses::ActiveModel {
            id: Set(course_id),
            code: Set(code.clone()),
            name: Set(name),
            credits: Set(credits),
            faculty_id: Set(faculty_id),
            description: Set(description),
            deactivated: Set(false),
            created_at: Set(now),
            updated_at: Set(now),
        }
        .insert(&txn)
        .await
        .map_err(|err| ServiceError::from_write_err(err, "courseCode", code))?;

        if !prerequisite_ids.is_empty() {
            let links: Vec<course_prerequisites::ActiveModel> = prerequisite_ids
                .into_iter()
                .map(|prerequisite_id| course_prerequisites::ActiveModel {
                    id: Set(Uuid::new_v4()),
                    course_id: Set(course_id),
                    prerequisite_id: Set(prerequisite_id),
                })
                .collect();
            course_prerequisites::Entity::insert_many(links)
                .exec(&txn)
                .await?;
        }

        txn.commit().await?;
        Ok(course)
    }

    pub async fn update_course(
        db: &DatabaseConnection,
        code: &str,
        changes: CourseChanges,
        now: NaiveDateTime,
    ) -> ServiceResult<courses::Model> {
        let txn = db.begin().await?;

        let course = courses::Entity::find()
            .filter(courses::Column::Code.eq(code))
            .one(&txn)
            .await?
            .ok_or(ServiceError::NotFound {
                entity: "Course",
                key: code.to_string(),
            })?;

        let enrollment_count = Self::enrollment_count(&txn, course.id).await?;
        check_course_changes(&course, &changes, enrollment_count)?;

        if let Some(faculty_id) = changes.faculty_id {
            validators::require_faculty(&txn, faculty_id, "facultyId").await?;
        }

        if let Some(ref prerequisite_ids) = changes.prerequisite_ids {
            let mut errors = Vec::new();
            if prerequisite_ids.contains(&course.id) {
                errors.push(FieldError::new(
                    "prerequisiteIds",
                    "a course cannot be its own prerequisite",
                ));
            }
            for id in validators::missing_courses(&txn, prerequisite_ids).await? {
                errors.push(FieldError::new(
                    "prerequisiteIds",
                    format!("Course with id \"{id}\" does not exist"),
                ));
            }
            if !errors.is_empty() {
                return Err(ServiceError::Validation(errors));
            }
        }

        let mut active: courses::ActiveModel = course.clone().into();
        if let Some(name) = changes.name {
            active.name = Set(name);
        }
        if let Some(credits) = changes.credits {
            active.credits = Set(credits);
        }
        if let Some(faculty_id) = changes.faculty_id {
            active.faculty_id = Set(faculty_id);
        }
        if let Some(description) = changes.description {
            active.description = Set(Some(description));
        }
        active.updated_at = Set(now);
        let updated = active.update(&txn).await?;

        if let Some(prerequisite_ids) = changes.prerequisite_ids {
            course_prerequisites::Entity::delete_many()
                .filter(course_prerequisites::Column::CourseId.eq(course.id))
                .exec(&txn)
                .await?;

            if !prerequisite_ids.is_empty() {
                let links: Vec<course_prerequisites::ActiveModel> = prerequisite_ids
                    .into_iter()
                    .map(|prerequisite_id| course_prerequisites::ActiveModel {
                        id: Set(Uuid::new_v4()),
                        course_id: Set(course.id),
                        prerequisite_id: Set(prerequisite_id),
                    })
                    .collect();
                course_prerequisites::Entity::insert_many(links)
                    .exec(&txn)
                    .await?;
            }
        }

        txn.commit().await?;
        Ok(updated)
    }

    /// Deletes a course, or deactivates it instead when classes still
    /// reference it. The outcome tells the caller which of the two happened.
    pub async fn delete_course(
        db: &DatabaseConnection,
        code: &str,
        config: &LifecycleConfig,
        now: NaiveDateTime,
    ) -> ServiceResult<DeleteOutcome> {
        let txn = db.begin().await?;

        let course = courses::Entity::find()
            .filter(courses::Column::Code.eq(code))
            .one(&txn)
            .await?
            .ok_or(ServiceError::NotFound {
                entity: "Course",
                key: code.to_string(),
            })?;

        check_course_delete(&course, now, config.course_delete_window)?;

        let dependent_classes = classes::Entity::find()
            .filter(classes::Column::CourseId.eq(course.id))
            .count(&txn)
            .await?;

        let outcome = DeleteOutcome::for_dependents(&course.code, dependent_classes);
        match outcome {
            DeleteOutcome::Deactivated { .. } => {
                let mut active: courses::ActiveModel = course.into();
                active.deactivated = Set(true);
                active.updated_at = Set(now);
                active.update(&txn).await?;
            }
            DeleteOutcome::Removed => {
                course_prerequisites::Entity::delete_many()
                    .filter(
                        Condition::any()
                            .add(course_prerequisites::Column::CourseId.eq(course.id))
                            .add(course_prerequisites::Column::PrerequisiteId.eq(course.id)),
                    )
                    .exec(&txn)
                    .await?;
                courses::Entity::delete_by_id(course.id).exec(&txn).await?;
            }
        }

        txn.commit().await?;
        Ok(outcome)
    }

    pub async fn get_course(db: &DatabaseConnection, code: &str) -> ServiceResult<CourseDetails> {
        let course = courses::Entity::find()
            .filter(courses::Column::Code.eq(code))
            .one(db)
            .await?
            .ok_or(ServiceError::NotFound {
                entity: "Course",
                key: code.to_string(),
            })?;

        let (faculty, links) = try_join!(
            faculties::Entity::find_by_id(course.faculty_id).one(db),
            course_prerequisites::Entity::find()
                .filter(course_prerequisites::Column::CourseId.eq(course.id))
                .all(db)
        )?;

        let prerequisite_ids: Vec<Uuid> = links.iter().map(|l| l.prerequisite_id).collect();
        let prerequisites = if prerequisite_ids.is_empty() {
            Vec::new()
        } else {
            courses::Entity::find()
                .filter(courses::Column::Id.is_in(prerequisite_ids))
                .all(db)
                .await?
        };

        Ok(CourseDetails {
            course,
            faculty,
            prerequisites,
        })
    }

    pub async fn list_courses(db: &DatabaseConnection) -> ServiceResult<Vec<CourseDetails>> {
        let course_list = courses::Entity::find().all(db).await?;
        if course_list.is_empty() {
            return Ok(Vec::new());
        }

        let course_ids: Vec<Uuid> = course_list.iter().map(|c| c.id).collect();
        let faculty_ids: Vec<Uuid> = course_list.iter().map(|c| c.faculty_id).collect();

        let (faculty_list, links) = try_join!(
            faculties::Entity::find()
                .filter(faculties::Column::Id.is_in(faculty_ids))
                .all(db),
            course_prerequisites::Entity::find()
                .filter(course_prerequisites::Column::CourseId.is_in(course_ids))
                .all(db)
        )?;

        let prerequisite_ids: Vec<Uuid> = links.iter().map(|l| l.prerequisite_id).collect();
        let prerequisite_list = if prerequisite_ids.is_empty() {
            Vec::new()
        } else {
            courses::Entity::find()
                .filter(courses::Column::Id.is_in(prerequisite_ids))
                .all(db)
                .await?
        };

        // Build lookup maps
        let faculties_by_id: HashMap<Uuid, faculties::Model> =
            faculty_list.into_iter().map(|f| (f.id, f)).collect();
        let courses_by_id: HashMap<Uuid, courses::Model> = prerequisite_list
            .into_iter()
            .map(|c| (c.id, c))
            .collect();

        let mut links_by_course: HashMap<Uuid, Vec<Uuid>> = HashMap::new();
        for link in links {
            links_by_course
                .entry(link.course_id)
                .or_default()
                .push(link.prerequisite_id);
        }

        let details = course_list
            .into_iter()
            .map(|course| {
                let prerequisites = links_by_course
                    .remove(&course.id)
                    .unwrap_or_default()
                    .into_iter()
                    .filter_map(|id| courses_by_id.get(&id).cloned())
                    .collect();

                CourseDetails {
                    faculty: faculties_by_id.get(&course.faculty_id).cloned(),
                    prerequisites,
                    course,
                }
            })
            .collect();

        Ok(details)
    }

    /// Number of enrollments that reference the course through its classes
    async fn enrollment_count<C: ConnectionTrait>(
        conn: &C,
        course_id: Uuid,
    ) -> ServiceResult<u64> {
        let class_ids: Vec<Uuid> = classes::Entity::find()
            .filter(classes::Column::CourseId.eq(course_id))
            .all(conn)
            .await?
            .into_iter()
            .map(|c| c.id)
            .collect();

        if class_ids.is_empty() {
            return Ok(0);
        }

        let count = enrollments::Entity::find()
            .filter(enrollments::Column::ClassId.is_in(class_ids))
            .count(conn)
            .await?;
        Ok(count)
    }
}

pub(crate) fn check_new_course(input: &NewCourse) -> Vec<FieldError> {
    let mut errors = Vec::new();

    if input.code.trim().is_empty() {
        errors.push(FieldError::new("courseCode", "courseCode must not be empty"));
    }
    if input.name.trim().is_empty() {
        errors.push(FieldError::new("name", "name must not be empty"));
    }
    if input.credits < 2 {
        errors.push(FieldError::new("credits", "credits must be at least 2"));
    }

    errors
}

/// Immutability rules for an existing course: the code never changes, and
/// credits are frozen once any enrollment references the course.
pub(crate) fn check_course_changes(
    existing: &courses::Model,
    changes: &CourseChanges,
    enrollment_count: u64,
) -> ServiceResult<()> {
    if changes.code.is_some() {
        return Err(ServiceError::UpdateForbidden(
            "courseCode cannot be changed after creation".to_string(),
        ));
    }

    if let Some(credits) = changes.credits {
        if credits < 2 {
            return Err(ServiceError::validation(
                "credits",
                "credits must be at least 2",
            ));
        }
        if credits != existing.credits && enrollment_count > 0 {
            return Err(ServiceError::UpdateForbidden(format!(
                "credits of course \"{}\" cannot be changed because enrollments exist",
                existing.code
            )));
        }
    }

    Ok(())
}

pub(crate) fn check_course_delete(
    course: &courses::Model,
    now: NaiveDateTime,
    window: Duration,
) -> ServiceResult<()> {
    if course.deactivated {
        return Err(ServiceError::AlreadyDeactivated {
            entity: "Course",
            key: course.code.clone(),
        });
    }

    if now - course.created_at > window {
        return Err(ServiceError::DeleteWindowExpired {
            code: course.code.clone(),
            window_minutes: window.num_minutes(),
        });
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn at(year: i32, month: u32, day: u32, hour: u32, min: u32, sec: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(year, month, day)
            .unwrap()
            .and_hms_opt(hour, min, sec)
            .unwrap()
    }

    fn course(code: &str, credits: i32, deactivated: bool, created_at: NaiveDateTime) -> courses::Model {
        courses::Model {
            id: Uuid::new_v4(),
            code: code.to_string(),
            name: "Intro to Programming".to_string(),
            credits,
            faculty_id: Uuid::new_v4(),
            description: None,
            deactivated,
            created_at,
            updated_at: created_at,
        }
    }

    #[test]
    fn test_new_course_field_checks() {
        let input = NewCourse {
            code: "CS101".to_string(),
            name: "Intro to Programming".to_string(),
            credits: 3,
            faculty_id: Uuid::new_v4(),
            description: None,
            prerequisite_ids: vec![],
        };
        assert!(check_new_course(&input).is_empty());

        let too_few_credits = NewCourse {
            credits: 1,
            ..input.clone()
        };
        let errors = check_new_course(&too_few_credits);
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].field, "credits");

        let blank = NewCourse {
            code: "  ".to_string(),
            name: String::new(),
            ..input
        };
        let fields: Vec<_> = check_new_course(&blank)
            .into_iter()
            .map(|e| e.field)
            .collect();
        assert_eq!(fields, vec!["courseCode", "name"]);
    }

    #[test]
    fn test_course_code_is_immutable() {
        let existing = course("CS101", 3, false, at(2025, 9, 1, 8, 0, 0));
        let changes = CourseChanges {
            code: Some("CS999".to_string()),
            ..Default::default()
        };

        let result = check_course_changes(&existing, &changes, 0);
        assert!(matches!(result, Err(ServiceError::UpdateForbidden(_))));

        // The same code counts as an attempted change too
        let same_code = CourseChanges {
            code: Some("CS101".to_string()),
            ..Default::default()
        };
        assert!(matches!(
            check_course_changes(&existing, &same_code, 0),
            Err(ServiceError::UpdateForbidden(_))
        ));
    }

    #[test]
    fn test_credits_frozen_once_enrollments_exist() {
        let existing = course("CS101", 3, false, at(2025, 9, 1, 8, 0, 0));
        let changes = CourseChanges {
            credits: Some(4),
            ..Default::default()
        };

        // No enrollments: the change is allowed
        assert!(check_course_changes(&existing, &changes, 0).is_ok());

        // With enrollments the change is rejected
        let result = check_course_changes(&existing, &changes, 1);
        assert!(matches!(result, Err(ServiceError::UpdateForbidden(_))));

        // Re-sending the current value is not a change
        let unchanged = CourseChanges {
            credits: Some(3),
            ..Default::default()
        };
        assert!(check_course_changes(&existing, &unchanged, 12).is_ok());
    }

    #[test]
    fn test_credits_lower_bound_on_update() {
        let existing = course("CS101", 3, false, at(2025, 9, 1, 8, 0, 0));
        let changes = CourseChanges {
            credits: Some(1),
            ..Default::default()
        };

        assert!(matches!(
            check_course_changes(&existing, &changes, 0),
            Err(ServiceError::Validation(_))
        ));
    }

    #[test]
    fn test_name_change_is_always_allowed() {
        let existing = course("CS101", 3, false, at(2025, 9, 1, 8, 0, 0));
        let changes = CourseChanges {
            name: Some("Programming Fundamentals".to_string()),
            ..Default::default()
        };

        assert!(check_course_changes(&existing, &changes, 42).is_ok());
    }

    #[test]
    fn test_delete_rejected_when_already_deactivated() {
        let created = at(2025, 9, 1, 8, 0, 0);
        let existing = course("CS101", 3, true, created);

        let result = check_course_delete(&existing, created, Duration::minutes(60));
        assert!(matches!(
            result,
            Err(ServiceError::AlreadyDeactivated { entity: "Course", .. })
        ));
    }

    #[test]
    fn test_delete_window() {
        let created = at(2025, 9, 1, 8, 0, 0);
        let existing = course("CS101", 3, false, created);

        // Two minutes after creation with a one-minute window
        let result = check_course_delete(
            &existing,
            created + Duration::minutes(2),
            Duration::minutes(1),
        );
        assert!(matches!(
            result,
            Err(ServiceError::DeleteWindowExpired { .. })
        ));

        // Ten seconds after creation with a one-hour window
        let result = check_course_delete(
            &existing,
            created + Duration::seconds(10),
            Duration::minutes(60),
        );
        assert!(result.is_ok());
    }
}
