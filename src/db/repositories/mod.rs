pub mod holiday;
pub mod user;
pub mod visitor;
