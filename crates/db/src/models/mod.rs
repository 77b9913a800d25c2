//! Row structs and input DTOs, one module per table.

pub mod cooperative;
pub mod farmer;
pub mod project;
pub mod user;
