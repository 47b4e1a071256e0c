//! Core services for the academy portal: admissions review, catalog, cohort calendar,
//! curriculum documents, and student progress, all over one pluggable row store.

pub mod access;
pub mod config;
pub mod error;
pub mod store;
pub mod telemetry;
pub mod workflows;
