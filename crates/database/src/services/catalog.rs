//! CRUD over the three lookup collections (faculties, programs, student
//! statuses). All three share the same shape: a unique, non-empty name and a
//! delete guard that refuses removal while students still reference the
//! record.

use crate::entities::{courses, faculties, programs, student_statuses, students};
use crate::error::{ServiceError, ServiceResult};
use chrono::NaiveDateTime;
use sea_orm::{
    ActiveModelTrait, ActiveValue::Set, ColumnTrait, DatabaseConnection, EntityTrait,
    PaginatorTrait, QueryFilter, TransactionTrait,
};
use uuid::Uuid;

fn check_name(name: &str) -> ServiceResult<()> {
    if name.trim().is_empty() {
        return Err(ServiceError::validation("name", "name must not be empty"));
    }
    Ok(())
}

macro_rules! catalog_service {
    ($service:ident, $entity:ident, $entity_name:literal, $key_field:literal) => {
        pub struct $service;

        impl $service {
            pub async fn create(
                db: &DatabaseConnection,
                name: String,
                now: NaiveDateTime,
            ) -> ServiceResult<$entity::Model> {
                check_name(&name)?;

                let txn = db.begin().await?;

                let taken = $entity::Entity::find()
                    .filter($entity::Column::Name.eq(&name))
                    .count(&txn)
                    .await?;
                if taken > 0 {
                    return Err(ServiceError::DuplicateKey {
                        field: $key_field,
                        value: name,
                    });
                }

                let record = $entity::ActiveModel {
                    id: Set(Uuid::new_v4()),
                    name: Set(name.clone()),
                    created_at: Set(now),
                    updated_at: Set(now),
                }
                .insert(&txn)
                .await
                .map_err(|err| ServiceError::from_write_err(err, $key_field, name))?;

                txn.commit().await?;
                Ok(record)
            }

            pub async fn rename(
                db: &DatabaseConnection,
                id: Uuid,
                name: String,
                now: NaiveDateTime,
            ) -> ServiceResult<$entity::Model> {
                check_name(&name)?;

                let txn = db.begin().await?;

                let record = $entity::Entity::find_by_id(id).one(&txn).await?.ok_or(
                    ServiceError::NotFound {
                        entity: $entity_name,
                        key: id.to_string(),
                    },
                )?;

                let taken = $entity::Entity::find()
                    .filter($entity::Column::Name.eq(&name))
                    .filter($entity::Column::Id.ne(id))
                    .count(&txn)
                    .await?;
                if taken > 0 {
                    return Err(ServiceError::DuplicateKey {
                        field: $key_field,
                        value: name,
                    });
                }

                let mut active: $entity::ActiveModel = record.into();
                active.name = Set(name.clone());
                active.updated_at = Set(now);
                let updated = active
                    .update(&txn)
                    .await
                    .map_err(|err| ServiceError::from_write_err(err, $key_field, name))?;

                txn.commit().await?;
                Ok(updated)
            }

            pub async fn list(db: &DatabaseConnection) -> ServiceResult<Vec<$entity::Model>> {
                Ok($entity::Entity::find().all(db).await?)
            }

            pub async fn get(db: &DatabaseConnection, id: Uuid) -> ServiceResult<$entity::Model> {
                $entity::Entity::find_by_id(id)
                    .one(db)
                    .await?
                    .ok_or(ServiceError::NotFound {
                        entity: $entity_name,
                        key: id.to_string(),
                    })
            }
        }
    };
}

catalog_service!(FacultyService, faculties, "Faculty", "facultyName");
catalog_service!(ProgramService, programs, "Program", "programName");
catalog_service!(StudentStatusService, student_statuses, "StudentStatus", "statusName");

impl FacultyService {
    pub async fn delete(db: &DatabaseConnection, id: Uuid) -> ServiceResult<()> {
        let txn = db.begin().await?;

        let faculty = faculties::Entity::find_by_id(id).one(&txn).await?.ok_or(
            ServiceError::NotFound {
                entity: "Faculty",
                key: id.to_string(),
            },
        )?;

        let student_refs = students::Entity::find()
            .filter(students::Column::FacultyId.eq(id))
            .count(&txn)
            .await?;
        let course_refs = courses::Entity::find()
            .filter(courses::Column::FacultyId.eq(id))
            .count(&txn)
            .await?;
        if student_refs > 0 || course_refs > 0 {
            return Err(ServiceError::Conflict(format!(
                "Faculty \"{}\" is still referenced and cannot be deleted",
                faculty.name
            )));
        }

        faculties::Entity::delete_by_id(id).exec(&txn).await?;
        txn.commit().await?;
        Ok(())
    }
}

impl ProgramService {
    pub async fn delete(db: &DatabaseConnection, id: Uuid) -> ServiceResult<()> {
        let txn = db.begin().await?;

        let program = programs::Entity::find_by_id(id).one(&txn).await?.ok_or(
            ServiceError::NotFound {
                entity: "Program",
                key: id.to_string(),
            },
        )?;

        let student_refs = students::Entity::find()
            .filter(students::Column::ProgramId.eq(id))
            .count(&txn)
            .await?;
        if student_refs > 0 {
            return Err(ServiceError::Conflict(format!(
                "Program \"{}\" is still referenced and cannot be deleted",
                program.name
            )));
        }

        programs::Entity::delete_by_id(id).exec(&txn).await?;
        txn.commit().await?;
        Ok(())
    }
}

impl StudentStatusService {
    pub async fn delete(db: &DatabaseConnection, id: Uuid) -> ServiceResult<()> {
        let txn = db.begin().await?;

        let status = student_statuses::Entity::find_by_id(id)
            .one(&txn)
            .await?
            .ok_or(ServiceError::NotFound {
                entity: "StudentStatus",
                key: id.to_string(),
            })?;

        let student_refs = students::Entity::find()
            .filter(students::Column::StatusId.eq(id))
            .count(&txn)
            .await?;
        if student_refs > 0 {
            return Err(ServiceError::Conflict(format!(
                "StudentStatus \"{}\" is still referenced and cannot be deleted",
                status.name
            )));
        }

        student_statuses::Entity::delete_by_id(id).exec(&txn).await?;
        txn.commit().await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_name_check() {
        assert!(check_name("Computer Science").is_ok());
        assert!(matches!(
            check_name(""),
            Err(ServiceError::Validation(_))
        ));
        assert!(matches!(
            check_name("   "),
            Err(ServiceError::Validation(_))
        ));
    }
}
