pub mod catalog;
pub mod class;
pub mod common;
pub mod course;
pub mod enrollment;
pub mod settings;
pub mod student;
