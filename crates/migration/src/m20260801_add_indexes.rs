use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        // At most one active enrollment per (student, class); canceled rows
        // stay behind as history, so the uniqueness is partial
        manager
            .get_connection()
            .execute_unprepared(
                r#"CREATE UNIQUE INDEX IF NOT EXISTS "idx-enrollments-active-student-class"
                   ON "enrollments" ("student_id", "class_id") WHERE NOT "is_canceled""#,
            )
            .await?;

        // Duplicate-enrollment and capacity checks filter on these
        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx-enrollments-class_id-is_canceled")
                    .table(Enrollments::Table)
                    .col(Enrollments::ClassId)
                    .col(Enrollments::IsCanceled)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx-enrollments-student_id-is_canceled")
                    .table(Enrollments::Table)
                    .col(Enrollments::StudentId)
                    .col(Enrollments::IsCanceled)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx-classes-course_id")
                    .table(Classes::Table)
                    .col(Classes::CourseId)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx-course_prerequisites-course_id")
                    .table(CoursePrerequisites::Table)
                    .col(CoursePrerequisites::CourseId)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .get_connection()
            .execute_unprepared(r#"DROP INDEX IF EXISTS "idx-enrollments-active-student-class""#)
            .await?;
        manager
            .drop_index(
                Index::drop()
                    .name("idx-enrollments-class_id-is_canceled")
                    .table(Enrollments::Table)
                    .to_owned(),
            )
            .await?;
        manager
            .drop_index(
                Index::drop()
                    .name("idx-enrollments-student_id-is_canceled")
                    .table(Enrollments::Table)
                    .to_owned(),
            )
            .await?;
        manager
            .drop_index(
                Index::drop()
                    .name("idx-classes-course_id")
                    .table(Classes::Table)
                    .to_owned(),
            )
            .await?;
        manager
            .drop_index(
                Index::drop()
                    .name("idx-course_prerequisites-course_id")
                    .table(CoursePrerequisites::Table)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }
}

#[derive(DeriveIden)]
enum Enrollments {
    Table,
    StudentId,
    ClassId,
    IsCanceled,
}

#[derive(DeriveIden)]
enum Classes {
    Table,
    CourseId,
}

#[derive(DeriveIden)]
enum CoursePrerequisites {
    Table,
    CourseId,
}
