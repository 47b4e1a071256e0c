//! Student roster, course progress, study tasks, and the student dashboard.

pub mod dashboard;
pub mod domain;
pub mod router;
pub mod service;

pub use dashboard::{DashboardCourse, StudentDashboard, TaskCompletion};
pub use domain::{
    CourseProgress, Enrollment, RosterFilter, RosterStats, Student, StudentStatus, StudyTask,
    TaskDraft, TaskPriority,
};
pub use router::student_router;
pub use service::StudentService;
