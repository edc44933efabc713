use crate::entities::{classes, course_prerequisites, courses, enrollments, students};
use crate::error::{ServiceError, ServiceResult, is_unique_violation};
use crate::services::validators;
use chrono::NaiveDateTime;
use models::semester::Semester;
use sea_orm::{
    ActiveModelTrait, ActiveValue::Set, ColumnTrait, Condition, ConnectionTrait,
    DatabaseConnection, EntityTrait, PaginatorTrait, QueryFilter, QuerySelect, Select,
    TransactionTrait,
};
use std::collections::{HashMap, HashSet};
use std::str::FromStr;
use uuid::Uuid;

/// An enrollment with both of its references resolved at read time
#[derive(Debug, Clone)]
pub struct EnrollmentDetails {
    pub enrollment: enrollments::Model,
    pub student: Option<students::Model>,
    pub class: Option<classes::Model>,
}

#[derive(Debug, Clone)]
pub struct NewEnrollment {
    pub student_number: String,
    pub class_code: String,
    /// Carried only so the guard can reject records created as canceled
    pub is_canceled: bool,
}

/// Field-level patch for an enrollment. The four identity-bearing fields are
/// carried only so the guard can reject any attempt to change them.
#[derive(Debug, Clone, Default)]
pub struct EnrollmentChanges {
    pub student_id: Option<Uuid>,
    pub student_number: Option<String>,
    pub class_id: Option<Uuid>,
    pub class_code: Option<String>,
    pub is_canceled: Option<bool>,
    pub cancellation_reason: Option<String>,
    pub score: Option<f32>,
}

/// Outcome of the update guard: re-cancelling an already-canceled record is
/// accepted without touching it
#[derive(Debug, PartialEq)]
pub(crate) enum EnrollmentDecision {
    Apply,
    Noop,
}

pub struct EnrollmentService;

impl EnrollmentService {
    /// Runs the full admission pipeline and persists the enrollment. All
    /// reads and the insert share one transaction, and the class row is read
    /// under an exclusive lock, so two requests racing for the last seat
    /// serialize and the second one sees the first one's committed write.
    pub async fn create_enrollment(
        db: &DatabaseConnection,
        input: NewEnrollment,
        now: NaiveDateTime,
    ) -> ServiceResult<enrollments::Model> {
        let txn = db.begin().await?;

        let class = Self::class_for_admission(&input.class_code)
            .one(&txn)
            .await?
            .ok_or_else(|| ServiceError::NotFound {
                entity: "Class",
                key: input.class_code.clone(),
            })?;
        let student = validators::require_student_by_number(&txn, &input.student_number).await?;

        let already_enrolled = enrollments::Entity::find()
            .filter(enrollments::Column::StudentId.eq(student.id))
            .filter(enrollments::Column::ClassId.eq(class.id))
            .filter(enrollments::Column::IsCanceled.eq(false))
            .count(&txn)
            .await?
            > 0;

        let missing = Self::missing_prerequisites(&txn, &class, student.id).await?;

        let active_in_class = enrollments::Entity::find()
            .filter(enrollments::Column::ClassId.eq(class.id))
            .filter(enrollments::Column::IsCanceled.eq(false))
            .count(&txn)
            .await?;

        check_new_enrollment(
            &class,
            &student,
            input.is_canceled,
            already_enrolled,
            &missing,
            active_in_class,
        )?;

        // The partial unique index on active (student, class) pairs backs up
        // the duplicate check; a concurrent insert that lands first surfaces
        // here as a unique violation.
        let enrollment = enrollments::ActiveModel {
            id: Set(Uuid::new_v4()),
            student_id: Set(student.id),
            class_id: Set(class.id),
            is_canceled: Set(false),
            cancellation_reason: Set(None),
            score: Set(0.0),
            created_at: Set(now),
            updated_at: Set(now),
        }
        .insert(&txn)
        .await
        .map_err(|err| {
            if is_unique_violation(err.sql_err()) {
                ServiceError::Conflict(format!(
                    "student \"{}\" is already enrolled in class \"{}\"",
                    student.student_number, class.code
                ))
            } else {
                ServiceError::Db(err)
            }
        })?;

        txn.commit().await?;
        Ok(enrollment)
    }

    pub async fn update_enrollment(
        db: &DatabaseConnection,
        id: Uuid,
        changes: EnrollmentChanges,
        now: NaiveDateTime,
    ) -> ServiceResult<enrollments::Model> {
        let txn = db.begin().await?;

        let enrollment =
            enrollments::Entity::find_by_id(id)
                .one(&txn)
                .await?
                .ok_or(ServiceError::NotFound {
                    entity: "Enrollment",
                    key: id.to_string(),
                })?;

        let class = classes::Entity::find_by_id(enrollment.class_id)
            .one(&txn)
            .await?
            .ok_or(ServiceError::NotFound {
                entity: "Class",
                key: enrollment.class_id.to_string(),
            })?;

        match check_enrollment_changes(&enrollment, &class, &changes, now)? {
            EnrollmentDecision::Noop => {
                txn.commit().await?;
                Ok(enrollment)
            }
            EnrollmentDecision::Apply => {
                let mut active: enrollments::ActiveModel = enrollment.into();
                if let Some(score) = changes.score {
                    active.score = Set(score);
                }
                if let Some(is_canceled) = changes.is_canceled {
                    active.is_canceled = Set(is_canceled);
                }
                if let Some(reason) = changes.cancellation_reason {
                    active.cancellation_reason = Set(Some(reason));
                }
                active.updated_at = Set(now);
                let updated = active.update(&txn).await?;

                txn.commit().await?;
                Ok(updated)
            }
        }
    }

    pub async fn get_enrollment(
        db: &DatabaseConnection,
        id: Uuid,
    ) -> ServiceResult<EnrollmentDetails> {
        let enrollment =
            enrollments::Entity::find_by_id(id)
                .one(db)
                .await?
                .ok_or(ServiceError::NotFound {
                    entity: "Enrollment",
                    key: id.to_string(),
                })?;

        let (student, class) = futures::try_join!(
            students::Entity::find_by_id(enrollment.student_id).one(db),
            classes::Entity::find_by_id(enrollment.class_id).one(db)
        )?;

        Ok(EnrollmentDetails {
            enrollment,
            student,
            class,
        })
    }

    pub async fn list_enrollments(
        db: &DatabaseConnection,
        student_number: Option<&str>,
        class_code: Option<&str>,
    ) -> ServiceResult<Vec<EnrollmentDetails>> {
        let mut condition = Condition::all();

        if let Some(student_number) = student_number {
            let student = validators::require_student_by_number(db, student_number).await?;
            condition = condition.add(enrollments::Column::StudentId.eq(student.id));
        }
        if let Some(class_code) = class_code {
            let class = validators::require_class_by_code(db, class_code).await?;
            condition = condition.add(enrollments::Column::ClassId.eq(class.id));
        }

        let enrollment_list = enrollments::Entity::find()
            .filter(condition)
            .all(db)
            .await?;
        if enrollment_list.is_empty() {
            return Ok(Vec::new());
        }

        let student_ids: Vec<Uuid> = enrollment_list.iter().map(|e| e.student_id).collect();
        let class_ids: Vec<Uuid> = enrollment_list.iter().map(|e| e.class_id).collect();

        let (student_list, class_list) = futures::try_join!(
            students::Entity::find()
                .filter(students::Column::Id.is_in(student_ids))
                .all(db),
            classes::Entity::find()
                .filter(classes::Column::Id.is_in(class_ids))
                .all(db)
        )?;

        let students_by_id: HashMap<Uuid, students::Model> =
            student_list.into_iter().map(|s| (s.id, s)).collect();
        let classes_by_id: HashMap<Uuid, classes::Model> =
            class_list.into_iter().map(|c| (c.id, c)).collect();

        let details = enrollment_list
            .into_iter()
            .map(|enrollment| EnrollmentDetails {
                student: students_by_id.get(&enrollment.student_id).cloned(),
                class: classes_by_id.get(&enrollment.class_id).cloned(),
                enrollment,
            })
            .collect();

        Ok(details)
    }

    /// Resolves the class business key under `SELECT ... FOR UPDATE`.
    /// Concurrent admissions to the same class queue on this lock, which is
    /// what keeps the capacity count honest.
    fn class_for_admission(code: &str) -> Select<classes::Entity> {
        classes::Entity::find()
            .filter(classes::Column::Code.eq(code))
            .lock_exclusive()
    }

    /// Codes of the prerequisite courses of the class's course that the
    /// student holds no active enrollment for
    async fn missing_prerequisites<C: ConnectionTrait>(
        conn: &C,
        class: &classes::Model,
        student_id: Uuid,
    ) -> ServiceResult<Vec<String>> {
        let required: Vec<Uuid> = course_prerequisites::Entity::find()
            .filter(course_prerequisites::Column::CourseId.eq(class.course_id))
            .all(conn)
            .await?
            .into_iter()
            .map(|link| link.prerequisite_id)
            .collect();

        if required.is_empty() {
            return Ok(Vec::new());
        }

        let completed = Self::actively_enrolled_course_ids(conn, student_id).await?;
        let missing_ids: Vec<Uuid> = required
            .into_iter()
            .filter(|id| !completed.contains(id))
            .collect();

        if missing_ids.is_empty() {
            return Ok(Vec::new());
        }

        let mut codes: Vec<String> = courses::Entity::find()
            .filter(courses::Column::Id.is_in(missing_ids))
            .all(conn)
            .await?
            .into_iter()
            .map(|c| c.code)
            .collect();
        codes.sort();
        Ok(codes)
    }

    /// Course ids the student holds at least one active enrollment in
    async fn actively_enrolled_course_ids<C: ConnectionTrait>(
        conn: &C,
        student_id: Uuid,
    ) -> ServiceResult<HashSet<Uuid>> {
        let active = enrollments::Entity::find()
            .filter(enrollments::Column::StudentId.eq(student_id))
            .filter(enrollments::Column::IsCanceled.eq(false))
            .all(conn)
            .await?;

        if active.is_empty() {
            return Ok(HashSet::new());
        }

        let class_ids: Vec<Uuid> = active.into_iter().map(|e| e.class_id).collect();
        let class_list = classes::Entity::find()
            .filter(classes::Column::Id.is_in(class_ids))
            .all(conn)
            .await?;

        Ok(class_list.into_iter().map(|c| c.course_id).collect())
    }
}

/// Admission checks, in order: no creation in the canceled state, class must
/// be live, no duplicate active enrollment, prerequisites satisfied, seat
/// available. The first failing check decides the error.
pub(crate) fn check_new_enrollment(
    class: &classes::Model,
    student: &students::Model,
    wants_canceled: bool,
    already_enrolled: bool,
    missing_prerequisites: &[String],
    active_in_class: u64,
) -> ServiceResult<()> {
    if wants_canceled {
        return Err(ServiceError::validation(
            "isCanceled",
            "a new enrollment cannot be created in the canceled state",
        ));
    }

    if class.deactivated {
        return Err(ServiceError::validation(
            "classCode",
            format!("Class \"{}\" is deactivated", class.code),
        ));
    }

    if already_enrolled {
        return Err(ServiceError::Conflict(format!(
            "student \"{}\" is already enrolled in class \"{}\"",
            student.student_number, class.code
        )));
    }

    if !missing_prerequisites.is_empty() {
        return Err(ServiceError::PrerequisiteNotMet {
            missing: missing_prerequisites.join(", "),
        });
    }

    if active_in_class >= class.max_students as u64 {
        return Err(ServiceError::CapacityExceeded {
            class_code: class.code.clone(),
            max_students: class.max_students,
        });
    }

    Ok(())
}

/// Update rules for an enrollment: identity is immutable, cancellation is
/// one-way, score updates bypass the deadline, everything else is gated by
/// the per-semester cancellation deadline.
pub(crate) fn check_enrollment_changes(
    existing: &enrollments::Model,
    class: &classes::Model,
    changes: &EnrollmentChanges,
    now: NaiveDateTime,
) -> ServiceResult<EnrollmentDecision> {
    if changes.student_id.is_some()
        || changes.student_number.is_some()
        || changes.class_id.is_some()
        || changes.class_code.is_some()
    {
        return Err(ServiceError::UpdateForbidden(
            "the student and class of an enrollment cannot be changed".to_string(),
        ));
    }

    if existing.is_canceled && changes.is_canceled == Some(false) {
        return Err(ServiceError::UpdateForbidden(
            "a canceled enrollment cannot be reactivated".to_string(),
        ));
    }

    if let Some(score) = changes.score {
        if !(0.0..=10.0).contains(&score) {
            return Err(ServiceError::validation(
                "score",
                "score must be between 0 and 10",
            ));
        }
        // Score updates apply regardless of the cancellation deadline
        return Ok(EnrollmentDecision::Apply);
    }

    // Re-cancelling an already-canceled enrollment changes nothing
    if existing.is_canceled && changes.is_canceled == Some(true) {
        return Ok(EnrollmentDecision::Noop);
    }

    let semester = Semester::from_str(&class.semester).map_err(|_| {
        ServiceError::validation(
            "semester",
            format!("class \"{}\" has an invalid semester", class.code),
        )
    })?;

    let deadline = semester.cancellation_deadline(class.academic_year as i32);
    if now > deadline {
        return Err(ServiceError::DeadlineExceeded {
            deadline: deadline.date(),
        });
    }

    Ok(EnrollmentDecision::Apply)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn at(year: i32, month: u32, day: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(year, month, day)
            .unwrap()
            .and_hms_opt(12, 0, 0)
            .unwrap()
    }

    fn class(code: &str, max_students: i32, semester: &str, academic_year: i16) -> classes::Model {
        classes::Model {
            id: Uuid::new_v4(),
            code: code.to_string(),
            course_id: Uuid::new_v4(),
            academic_year,
            semester: semester.to_string(),
            lecturers: serde_json::json!([]),
            max_students,
            schedule: None,
            classroom: None,
            deactivated: false,
            created_at: at(2025, 8, 1),
            updated_at: at(2025, 8, 1),
        }
    }

    fn student(student_number: &str) -> students::Model {
        students::Model {
            id: Uuid::new_v4(),
            student_number: student_number.to_string(),
            full_name: "Ada Lovelace".to_string(),
            email: "ada@student.university.edu".to_string(),
            phone: None,
            faculty_id: Uuid::new_v4(),
            program_id: Uuid::new_v4(),
            status_id: Uuid::new_v4(),
            created_at: at(2025, 8, 1),
            updated_at: at(2025, 8, 1),
        }
    }

    fn enrollment(class: &classes::Model, canceled: bool) -> enrollments::Model {
        enrollments::Model {
            id: Uuid::new_v4(),
            student_id: Uuid::new_v4(),
            class_id: class.id,
            is_canceled: canceled,
            cancellation_reason: None,
            score: 0.0,
            created_at: at(2025, 9, 2),
            updated_at: at(2025, 9, 2),
        }
    }

    #[test]
    fn test_admission_reads_the_class_row_locked() {
        use sea_orm::{DbBackend, QueryTrait};

        let sql = EnrollmentService::class_for_admission("CS101-01")
            .build(DbBackend::Postgres)
            .to_string();
        assert!(sql.ends_with("FOR UPDATE"), "expected a locking read: {sql}");
    }

    #[test]
    fn test_admission_succeeds_with_open_seat() {
        let class = class("CS101-01", 1, "I", 2025);
        let result = check_new_enrollment(&class, &student("S1"), false, false, &[], 0);
        assert!(result.is_ok());
    }

    #[test]
    fn test_admission_rejects_full_class() {
        let class = class("CS101-01", 1, "I", 2025);
        let result = check_new_enrollment(&class, &student("S2"), false, false, &[], 1);
        assert!(matches!(
            result,
            Err(ServiceError::CapacityExceeded { max_students: 1, .. })
        ));
    }

    #[test]
    fn test_admission_rejects_duplicate_enrollment() {
        let class = class("CS101-01", 30, "I", 2025);
        let result = check_new_enrollment(&class, &student("S1"), false, true, &[], 3);
        assert!(matches!(result, Err(ServiceError::Conflict(_))));
    }

    #[test]
    fn test_admission_rejects_missing_prerequisites() {
        let class = class("CS102-01", 30, "I", 2025);
        let missing = vec!["CS101".to_string()];
        let result = check_new_enrollment(&class, &student("S1"), false, false, &missing, 0);
        assert!(matches!(
            result,
            Err(ServiceError::PrerequisiteNotMet { .. })
        ));

        // Once the prerequisite is held, the same admission goes through
        let result = check_new_enrollment(&class, &student("S1"), false, false, &[], 0);
        assert!(result.is_ok());
    }

    #[test]
    fn test_admission_rejects_deactivated_class() {
        let mut class = class("CS101-01", 30, "I", 2025);
        class.deactivated = true;
        let result = check_new_enrollment(&class, &student("S1"), false, false, &[], 0);
        assert!(matches!(result, Err(ServiceError::Validation(_))));
    }

    #[test]
    fn test_admission_rejects_creation_as_canceled() {
        let class = class("CS101-01", 30, "I", 2025);
        let result = check_new_enrollment(&class, &student("S1"), true, false, &[], 0);
        assert!(matches!(result, Err(ServiceError::Validation(_))));
    }

    #[test]
    fn test_update_rejects_identity_change() {
        let class = class("CS101-01", 30, "I", 2025);
        let existing = enrollment(&class, false);

        for changes in [
            EnrollmentChanges {
                student_id: Some(Uuid::new_v4()),
                ..Default::default()
            },
            EnrollmentChanges {
                student_number: Some("S2".to_string()),
                ..Default::default()
            },
            EnrollmentChanges {
                class_id: Some(Uuid::new_v4()),
                ..Default::default()
            },
            EnrollmentChanges {
                class_code: Some("CS102-01".to_string()),
                ..Default::default()
            },
        ] {
            let result = check_enrollment_changes(&existing, &class, &changes, at(2025, 9, 10));
            assert!(matches!(result, Err(ServiceError::UpdateForbidden(_))));
        }
    }

    #[test]
    fn test_update_rejects_reactivation() {
        let class = class("CS101-01", 30, "I", 2025);
        let existing = enrollment(&class, true);
        let changes = EnrollmentChanges {
            is_canceled: Some(false),
            ..Default::default()
        };

        let result = check_enrollment_changes(&existing, &class, &changes, at(2025, 9, 10));
        assert!(matches!(result, Err(ServiceError::UpdateForbidden(_))));
    }

    #[test]
    fn test_recancellation_is_a_noop() {
        let class = class("CS101-01", 30, "I", 2025);
        let existing = enrollment(&class, true);
        let changes = EnrollmentChanges {
            is_canceled: Some(true),
            ..Default::default()
        };

        // Even long past the deadline
        let result = check_enrollment_changes(&existing, &class, &changes, at(2026, 6, 1));
        assert!(matches!(result, Ok(EnrollmentDecision::Noop)));
    }

    #[test]
    fn test_score_update_bypasses_deadline() {
        let class = class("CS101-01", 30, "I", 2025);
        let existing = enrollment(&class, false);
        let changes = EnrollmentChanges {
            score: Some(7.0),
            ..Default::default()
        };

        // Semester I of 2025 has its deadline on 2025-10-01; June 2026 is
        // far past it and the score still goes through
        let result = check_enrollment_changes(&existing, &class, &changes, at(2026, 6, 1));
        assert!(matches!(result, Ok(EnrollmentDecision::Apply)));
    }

    #[test]
    fn test_score_out_of_range() {
        let class = class("CS101-01", 30, "I", 2025);
        let existing = enrollment(&class, false);

        for score in [11.0, -1.0, 10.5] {
            let changes = EnrollmentChanges {
                score: Some(score),
                ..Default::default()
            };
            let result = check_enrollment_changes(&existing, &class, &changes, at(2025, 9, 10));
            assert!(matches!(result, Err(ServiceError::Validation(_))));
        }

        for score in [0.0, 7.0, 10.0] {
            let changes = EnrollmentChanges {
                score: Some(score),
                ..Default::default()
            };
            let result = check_enrollment_changes(&existing, &class, &changes, at(2025, 9, 10));
            assert!(result.is_ok());
        }
    }

    #[test]
    fn test_cancellation_before_deadline() {
        let class = class("CS101-01", 30, "I", 2025);
        let existing = enrollment(&class, false);
        let changes = EnrollmentChanges {
            is_canceled: Some(true),
            cancellation_reason: Some("schedule conflict".to_string()),
            ..Default::default()
        };

        // Deadline for semester I of 2025 is 2025-10-01
        let result = check_enrollment_changes(&existing, &class, &changes, at(2025, 9, 20));
        assert!(matches!(result, Ok(EnrollmentDecision::Apply)));
    }

    #[test]
    fn test_cancellation_after_deadline() {
        let class = class("CS101-01", 30, "I", 2025);
        let existing = enrollment(&class, false);
        let changes = EnrollmentChanges {
            is_canceled: Some(true),
            cancellation_reason: Some("too late".to_string()),
            ..Default::default()
        };

        let result = check_enrollment_changes(&existing, &class, &changes, at(2025, 10, 2));
        match result {
            Err(ServiceError::DeadlineExceeded { deadline }) => {
                assert_eq!(deadline, NaiveDate::from_ymd_opt(2025, 10, 1).unwrap());
            }
            other => panic!("expected DeadlineExceeded, got {other:?}"),
        }
    }

    #[test]
    fn test_deadline_tracks_semester() {
        // Semester II of 2025 starts in February 2026, deadline 2026-03-01
        let class = class("CS101-02", 30, "II", 2025);
        let existing = enrollment(&class, false);
        let changes = EnrollmentChanges {
            is_canceled: Some(true),
            ..Default::default()
        };

        let before = check_enrollment_changes(&existing, &class, &changes, at(2026, 2, 15));
        assert!(matches!(before, Ok(EnrollmentDecision::Apply)));

        let after = check_enrollment_changes(&existing, &class, &changes, at(2026, 3, 2));
        assert!(matches!(after, Err(ServiceError::DeadlineExceeded { .. })));
    }
}
