use crate::entities::{classes, courses, enrollments};
use crate::error::{DeleteOutcome, FieldError, ServiceError, ServiceResult};
use crate::services::validators;
use chrono::NaiveDateTime;
use models::semester::Semester;
use sea_orm::{
    ActiveModelTrait, ActiveValue::Set, ColumnTrait, DatabaseConnection, EntityTrait,
    PaginatorTrait, QueryFilter, TransactionTrait,
};
use std::collections::HashMap;
use std::str::FromStr;
use uuid::Uuid;

/// A class with its course resolved at read time
#[derive(Debug, Clone)]
pub struct ClassDetails {
    pub class: classes::Model,
    pub course: Option<courses::Model>,
}

#[derive(Debug, Clone)]
pub struct NewClass {
    pub code: String,
    pub course_code: String,
    pub academic_year: i16,
    pub semester: String,
    pub lecturers: Vec<String>,
    pub max_students: i32,
    pub schedule: Option<String>,
    pub classroom: Option<String>,
}

#[derive(Debug, Clone, Default)]
pub struct ClassChanges {
    pub course_code: Option<String>,
    pub academic_year: Option<i16>,
    pub semester: Option<String>,
    pub lecturers: Option<Vec<String>>,
    pub max_students: Option<i32>,
    pub schedule: Option<String>,
    pub classroom: Option<String>,
}

pub struct ClassService;

impl ClassService {
    pub async fn create_class(
        db: &DatabaseConnection,
        input: NewClass,
        now: NaiveDateTime,
    ) -> ServiceResult<classes::Model> {
        let txn = db.begin().await?;

        let errors = check_new_class(&input);
        if !errors.is_empty() {
            return Err(ServiceError::Validation(errors));
        }

        // The binding to a course is only established against a live course
        let course = validators::require_course_by_code(&txn, &input.course_code).await?;
        check_course_binding(&course)?;

        let taken = classes::Entity::find()
            .filter(classes::Column::Code.eq(&input.code))
            .count(&txn)
            .await?;
        if taken > 0 {
            return Err(ServiceError::DuplicateKey {
                field: "classCode",
                value: input.code,
            });
        }

        let class = classes::ActiveModel {
            id: Set(Uuid::new_v4()),
            code: Set(input.code.clone()),
            course_id: Set(course.id),
            academic_year: Set(input.academic_year),
            semester: Set(input.semester),
            lecturers: Set(input.lecturers.into()),
            max_students: Set(input.max_students),
            schedule: Set(input.schedule),
            classroom: Set(input.classroom),
            deactivated: Set(false),
            created_at: Set(now),
            updated_at: Set(now),
        }
        .insert(&txn)
        .await
        .map_err(|err| ServiceError::from_write_err(err, "classCode", input.code))?;

        txn.commit().await?;
        Ok(class)
    }

    pub async fn update_class(
        db: &DatabaseConnection,
        code: &str,
        changes: ClassChanges,
        now: NaiveDateTime,
    ) -> ServiceResult<classes::Model> {
        let txn = db.begin().await?;

        let class = classes::Entity::find()
            .filter(classes::Column::Code.eq(code))
            .one(&txn)
            .await?
            .ok_or(ServiceError::NotFound {
                entity: "Class",
                key: code.to_string(),
            })?;

        let errors = check_class_changes(&changes);
        if !errors.is_empty() {
            return Err(ServiceError::Validation(errors));
        }

        // Rebinding to another course revalidates existence and active state
        let new_course_id = match changes.course_code {
            Some(ref course_code) => {
                let course = validators::require_course_by_code(&txn, course_code).await?;
                check_course_binding(&course)?;
                Some(course.id)
            }
            None => None,
        };

        let mut active: classes::ActiveModel = class.into();
        if let Some(course_id) = new_course_id {
            active.course_id = Set(course_id);
        }
        if let Some(academic_year) = changes.academic_year {
            active.academic_year = Set(academic_year);
        }
        if let Some(semester) = changes.semester {
            active.semester = Set(semester);
        }
        if let Some(lecturers) = changes.lecturers {
            active.lecturers = Set(lecturers.into());
        }
        if let Some(max_students) = changes.max_students {
            active.max_students = Set(max_students);
        }
        if let Some(schedule) = changes.schedule {
            active.schedule = Set(Some(schedule));
        }
        if let Some(classroom) = changes.classroom {
            active.classroom = Set(Some(classroom));
        }
        active.updated_at = Set(now);
        let updated = active.update(&txn).await?;

        txn.commit().await?;
        Ok(updated)
    }

    /// Deletes a class, or deactivates it instead when enrollments still
    /// reference it
    pub async fn delete_class(
        db: &DatabaseConnection,
        code: &str,
        now: NaiveDateTime,
    ) -> ServiceResult<DeleteOutcome> {
        let txn = db.begin().await?;

        let class = classes::Entity::find()
            .filter(classes::Column::Code.eq(code))
            .one(&txn)
            .await?
            .ok_or(ServiceError::NotFound {
                entity: "Class",
                key: code.to_string(),
            })?;

        if class.deactivated {
            return Err(ServiceError::AlreadyDeactivated {
                entity: "Class",
                key: class.code,
            });
        }

        let dependent_enrollments = enrollments::Entity::find()
            .filter(enrollments::Column::ClassId.eq(class.id))
            .count(&txn)
            .await?;

        let outcome = DeleteOutcome::for_dependents(&class.code, dependent_enrollments);
        match outcome {
            DeleteOutcome::Deactivated { .. } => {
                let mut active: classes::ActiveModel = class.into();
                active.deactivated = Set(true);
                active.updated_at = Set(now);
                active.update(&txn).await?;
            }
            DeleteOutcome::Removed => {
                classes::Entity::delete_by_id(class.id).exec(&txn).await?;
            }
        }

        txn.commit().await?;
        Ok(outcome)
    }

    pub async fn get_class(db: &DatabaseConnection, code: &str) -> ServiceResult<ClassDetails> {
        let class = classes::Entity::find()
            .filter(classes::Column::Code.eq(code))
            .one(db)
            .await?
            .ok_or(ServiceError::NotFound {
                entity: "Class",
                key: code.to_string(),
            })?;

        let course = courses::Entity::find_by_id(class.course_id).one(db).await?;
        Ok(ClassDetails { class, course })
    }

    pub async fn list_classes(db: &DatabaseConnection) -> ServiceResult<Vec<ClassDetails>> {
        let class_list = classes::Entity::find().all(db).await?;
        if class_list.is_empty() {
            return Ok(Vec::new());
        }

        let course_ids: Vec<Uuid> = class_list.iter().map(|c| c.course_id).collect();
        let course_list = courses::Entity::find()
            .filter(courses::Column::Id.is_in(course_ids))
            .all(db)
            .await?;

        let courses_by_id: HashMap<Uuid, courses::Model> =
            course_list.into_iter().map(|c| (c.id, c)).collect();

        let details = class_list
            .into_iter()
            .map(|class| ClassDetails {
                course: courses_by_id.get(&class.course_id).cloned(),
                class,
            })
            .collect();

        Ok(details)
    }
}

pub(crate) fn check_new_class(input: &NewClass) -> Vec<FieldError> {
    let mut errors = Vec::new();

    if input.code.trim().is_empty() {
        errors.push(FieldError::new("classCode", "classCode must not be empty"));
    }
    if Semester::from_str(&input.semester).is_err() {
        errors.push(FieldError::new(
            "semester",
            "semester must be one of I, II, III",
        ));
    }
    if input.max_students < 1 {
        errors.push(FieldError::new(
            "maxStudents",
            "maxStudents must be at least 1",
        ));
    }

    errors
}

pub(crate) fn check_class_changes(changes: &ClassChanges) -> Vec<FieldError> {
    let mut errors = Vec::new();

    if let Some(ref semester) = changes.semester {
        if Semester::from_str(semester).is_err() {
            errors.push(FieldError::new(
                "semester",
                "semester must be one of I, II, III",
            ));
        }
    }
    if let Some(max_students) = changes.max_students {
        if max_students < 1 {
            errors.push(FieldError::new(
                "maxStudents",
                "maxStudents must be at least 1",
            ));
        }
    }

    errors
}

/// A class may only bind to a course that has not been deactivated
pub(crate) fn check_course_binding(course: &courses::Model) -> ServiceResult<()> {
    if course.deactivated {
        return Err(ServiceError::validation(
            "courseCode",
            format!(
                "Course \"{}\" is deactivated and cannot be assigned to a class",
                course.code
            ),
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn new_class() -> NewClass {
        NewClass {
            code: "CS101-01".to_string(),
            course_code: "CS101".to_string(),
            academic_year: 2025,
            semester: "I".to_string(),
            lecturers: vec![],
            max_students: 30,
            schedule: None,
            classroom: None,
        }
    }

    #[test]
    fn test_new_class_field_checks() {
        assert!(check_new_class(&new_class()).is_empty());

        let invalid = NewClass {
            code: String::new(),
            semester: "IV".to_string(),
            max_students: 0,
            ..new_class()
        };
        let fields: Vec<_> = check_new_class(&invalid)
            .into_iter()
            .map(|e| e.field)
            .collect();
        assert_eq!(fields, vec!["classCode", "semester", "maxStudents"]);
    }

    #[test]
    fn test_class_change_field_checks() {
        assert!(check_class_changes(&ClassChanges::default()).is_empty());

        let changes = ClassChanges {
            semester: Some("winter".to_string()),
            max_students: Some(-3),
            ..Default::default()
        };
        let fields: Vec<_> = check_class_changes(&changes)
            .into_iter()
            .map(|e| e.field)
            .collect();
        assert_eq!(fields, vec!["semester", "maxStudents"]);
    }

    #[test]
    fn test_binding_rejects_deactivated_course() {
        let created = NaiveDate::from_ymd_opt(2025, 9, 1)
            .unwrap()
            .and_hms_opt(8, 0, 0)
            .unwrap();
        let mut course = courses::Model {
            id: Uuid::new_v4(),
            code: "CS101".to_string(),
            name: "Intro to Programming".to_string(),
            credits: 3,
            faculty_id: Uuid::new_v4(),
            description: None,
            deactivated: false,
            created_at: created,
            updated_at: created,
        };

        assert!(check_course_binding(&course).is_ok());

        course.deactivated = true;
        assert!(matches!(
            check_course_binding(&course),
            Err(ServiceError::Validation(_))
        ));
    }
}
