pub mod page;
pub mod registration;
pub mod schedule;
