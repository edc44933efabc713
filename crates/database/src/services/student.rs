use crate::entities::{enrollments, faculties, programs, student_statuses, students};
use crate::error::{FieldError, ServiceError, ServiceResult};
use crate::services::validators;
use chrono::NaiveDateTime;
use futures::try_join;
use sea_orm::{
    ActiveModelTrait, ActiveValue::Set, ColumnTrait, DatabaseConnection, EntityTrait,
    PaginatorTrait, QueryFilter, TransactionTrait,
};
use std::collections::HashMap;
use uuid::Uuid;

/// A student with all three lookup references resolved
#[derive(Debug, Clone)]
pub struct StudentDetails {
    pub student: students::Model,
    pub faculty: Option<faculties::Model>,
    pub program: Option<programs::Model>,
    pub status: Option<student_statuses::Model>,
}

#[derive(Debug, Clone)]
pub struct NewStudent {
    pub student_number: String,
    pub full_name: String,
    pub email: String,
    pub phone: Option<String>,
    pub faculty_id: Uuid,
    pub program_id: Uuid,
    pub status_id: Uuid,
}

#[derive(Debug, Clone, Default)]
pub struct StudentChanges {
    pub full_name: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub faculty_id: Option<Uuid>,
    pub program_id: Option<Uuid>,
    pub status_id: Option<Uuid>,
}

pub struct StudentService;

impl StudentService {
    pub async fn create_student(
        db: &DatabaseConnection,
        input: NewStudent,
        now: NaiveDateTime,
    ) -> ServiceResult<students::Model> {
        let txn = db.begin().await?;

        let mut errors = check_new_student(&input);
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
        if programs::Entity::find_by_id(input.program_id)
            .one(&txn)
            .await?
            .is_none()
        {
            errors.push(FieldError::new(
                "programId",
                format!("Program with id \"{}\" does not exist", input.program_id),
            ));
        }
        if student_statuses::Entity::find_by_id(input.status_id)
            .one(&txn)
            .await?
            .is_none()
        {
            errors.push(FieldError::new(
                "statusId",
                format!("StudentStatus with id \"{}\" does not exist", input.status_id),
            ));
        }
        if !errors.is_empty() {
            return Err(ServiceError::Validation(errors));
        }

        let taken = students::Entity::find()
            .filter(students::Column::StudentNumber.eq(&input.student_number))
            .count(&txn)
            .await?;
        if taken > 0 {
            return Err(ServiceError::DuplicateKey {
                field: "studentNumber",
                value: input.student_number,
            });
        }

        let student = students::ActiveModel {
            id: Set(Uuid::new_v4()),
            student_number: Set(input.student_number.clone()),
            full_name: Set(input.full_name),
            email: Set(input.email),
            phone: Set(input.phone),
            faculty_id: Set(input.faculty_id),
            program_id: Set(input.program_id),
            status_id: Set(input.status_id),
            created_at: Set(now),
            updated_at: Set(now),
        }
        .insert(&txn)
        .await
        .map_err(|err| ServiceError::from_write_err(err, "studentNumber", input.student_number))?;

        txn.commit().await?;
        Ok(student)
    }

    pub async fn update_student(
        db: &DatabaseConnection,
        student_number: &str,
        changes: StudentChanges,
        now: NaiveDateTime,
    ) -> ServiceResult<students::Model> {
        let txn = db.begin().await?;

        let student = validators::require_student_by_number(&txn, student_number).await?;

        if let Some(faculty_id) = changes.faculty_id {
            validators::require_faculty(&txn, faculty_id, "facultyId").await?;
        }
        if let Some(program_id) = changes.program_id {
            validators::require_program(&txn, program_id, "programId").await?;
        }
        if let Some(status_id) = changes.status_id {
            validators::require_status(&txn, status_id, "statusId").await?;
        }

        let mut active: students::ActiveModel = student.into();
        if let Some(full_name) = changes.full_name {
            active.full_name = Set(full_name);
        }
        if let Some(email) = changes.email {
            active.email = Set(email);
        }
        if let Some(phone) = changes.phone {
            active.phone = Set(Some(phone));
        }
        if let Some(faculty_id) = changes.faculty_id {
            active.faculty_id = Set(faculty_id);
        }
        if let Some(program_id) = changes.program_id {
            active.program_id = Set(program_id);
        }
        if let Some(status_id) = changes.status_id {
            active.status_id = Set(status_id);
        }
        active.updated_at = Set(now);
        let updated = active.update(&txn).await?;

        txn.commit().await?;
        Ok(updated)
    }

    /// Students are never soft-deleted, but removal is refused while any
    /// enrollment still references the record
    pub async fn delete_student(db: &DatabaseConnection, student_number: &str) -> ServiceResult<()> {
        let txn = db.begin().await?;

        let student = validators::require_student_by_number(&txn, student_number).await?;

        let enrollment_refs = enrollments::Entity::find()
            .filter(enrollments::Column::StudentId.eq(student.id))
            .count(&txn)
            .await?;
        if enrollment_refs > 0 {
            return Err(ServiceError::Conflict(format!(
                "student \"{}\" has enrollments and cannot be deleted",
                student.student_number
            )));
        }

        students::Entity::delete_by_id(student.id).exec(&txn).await?;
        txn.commit().await?;
        Ok(())
    }

    pub async fn get_student(
        db: &DatabaseConnection,
        student_number: &str,
    ) -> ServiceResult<StudentDetails> {
        let student = validators::require_student_by_number(db, student_number).await?;

        let (faculty, program, status) = try_join!(
            faculties::Entity::find_by_id(student.faculty_id).one(db),
            programs::Entity::find_by_id(student.program_id).one(db),
            student_statuses::Entity::find_by_id(student.status_id).one(db)
        )?;

        Ok(StudentDetails {
            student,
            faculty,
            program,
            status,
        })
    }

    pub async fn list_students(db: &DatabaseConnection) -> ServiceResult<Vec<StudentDetails>> {
        let student_list = students::Entity::find().all(db).await?;
        if student_list.is_empty() {
            return Ok(Vec::new());
        }

        let (faculty_list, program_list, status_list) = try_join!(
            faculties::Entity::find().all(db),
            programs::Entity::find().all(db),
            student_statuses::Entity::find().all(db)
        )?;

        let faculties_by_id: HashMap<Uuid, faculties::Model> =
            faculty_list.into_iter().map(|f| (f.id, f)).collect();
        let programs_by_id: HashMap<Uuid, programs::Model> =
            program_list.into_iter().map(|p| (p.id, p)).collect();
        let statuses_by_id: HashMap<Uuid, student_statuses::Model> =
            status_list.into_iter().map(|s| (s.id, s)).collect();

        let details = student_list
            .into_iter()
            .map(|student| StudentDetails {
                faculty: faculties_by_id.get(&student.faculty_id).cloned(),
                program: programs_by_id.get(&student.program_id).cloned(),
                status: statuses_by_id.get(&student.status_id).cloned(),
                student,
            })
            .collect();

        Ok(details)
    }
}

pub(crate) fn check_new_student(input: &NewStudent) -> Vec<FieldError> {
    let mut errors = Vec::new();

    if input.student_number.trim().is_empty() {
        errors.push(FieldError::new(
            "studentNumber",
            "studentNumber must not be empty",
        ));
    }
    if input.full_name.trim().is_empty() {
        errors.push(FieldError::new("fullName", "fullName must not be empty"));
    }
    if !input.email.contains('@') {
        errors.push(FieldError::new("email", "email must be a valid address"));
    }

    errors
}

#[cfg(test)]
mod tests {
    use super::*;

    fn new_student() -> NewStudent {
        NewStudent {
            student_number: "S1".to_string(),
            full_name: "Ada Lovelace".to_string(),
            email: "ada@student.university.edu".to_string(),
            phone: None,
            faculty_id: Uuid::new_v4(),
            program_id: Uuid::new_v4(),
            status_id: Uuid::new_v4(),
        }
    }

    #[test]
    fn test_new_student_field_checks() {
        assert!(check_new_student(&new_student()).is_empty());

        let invalid = NewStudent {
            student_number: " ".to_string(),
            full_name: String::new(),
            email: "not-an-email".to_string(),
            ..new_student()
        };
        let fields: Vec<_> = check_new_student(&invalid)
            .into_iter()
            .map(|e| e.field)
            .collect();
        assert_eq!(fields, vec!["studentNumber", "fullName", "email"]);
    }
}
