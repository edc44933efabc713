pub mod policy;
pub mod semester;
