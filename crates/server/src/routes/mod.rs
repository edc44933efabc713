pub mod catalog;
pub mod class;
pub mod course;
pub mod enrollment;
pub mod health;
pub mod root;
pub mod settings;
pub mod student;
