pub mod classes;
pub mod course_prerequisites;
pub mod courses;
pub mod enrollments;
pub mod faculties;
pub mod programs;
pub mod student_statuses;
pub mod students;
