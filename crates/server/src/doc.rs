use crate::routes::{catalog, class, course, enrollment, health, root, settings, student};
use utoipa::OpenApi;

/// API Documentation
#[derive(OpenApi)]
#[openapi(
    paths(
        root::root,
        health::health,
        catalog::list_faculties,
        catalog::create_faculty,
        catalog::rename_faculty,
        catalog::delete_faculty,
        catalog::list_programs,
        catalog::create_program,
        catalog::rename_program,
        catalog::delete_program,
        catalog::list_statuses,
        catalog::create_status,
        catalog::rename_status,
        catalog::delete_status,
        course::list_courses,
        course::get_course,
        course::create_course,
        course::update_course,
        course::delete_course,
        class::list_classes,
        class::get_class,
        class::create_class,
        class::update_class,
        class::delete_class,
        student::list_students,
        student::get_student,
        student::create_student,
        student::update_student,
        student::delete_student,
        enrollment::list_enrollments,
        enrollment::get_enrollment,
        enrollment::create_enrollment,
        enrollment::update_enrollment,
        settings::get_email_domains,
        settings::put_email_domains,
        settings::get_status_rules,
        settings::put_status_rules
    ),
    tags(
        (name = "Health", description = "Service health endpoints"),
        (name = "Catalog", description = "Faculty, program and student status lookups"),
        (name = "Courses", description = "Course lifecycle endpoints"),
        (name = "Classes", description = "Class lifecycle endpoints"),
        (name = "Students", description = "Student record endpoints"),
        (name = "Enrollments", description = "Enrollment lifecycle endpoints"),
        (name = "Settings", description = "Runtime policy configuration"),
    ),
    info(
        title = "Registrar API",
        version = "1.0.0",
        description = "Student, course and enrollment record keeping API",
        license(
            name = "MIT OR Apache-2.0",
        )
    )
)]
pub struct ApiDoc;
