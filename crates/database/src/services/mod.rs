pub mod catalog;
pub mod class;
pub mod course;
pub mod enrollment;
pub mod student;
pub mod validators;
