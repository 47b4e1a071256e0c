pub mod admissions;
pub mod catalog;
pub mod cohort;
pub mod curriculum;
pub mod error;
pub mod students;

pub use error::{JsonBody, WorkflowError};
