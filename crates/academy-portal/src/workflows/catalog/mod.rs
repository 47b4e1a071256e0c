//! Program and course catalog, program timelines, and derived catalog statistics.

pub mod domain;
pub mod insights;
pub mod router;
pub mod service;

pub use domain::{
    Course, CourseCategory, CourseDraft, Placement, Program, ProgramCourse, ProgramDraft,
    ProgramLevel, StudyMode, TimelineEntry,
};
pub use insights::{CatalogOverview, CategorySplit};
pub use router::catalog_router;
pub use service::CatalogService;
