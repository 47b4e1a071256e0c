use serde::Serialize;

use super::domain::{rounded_mean, Student, StudyTask};
use crate::store::RecordId;
use crate::workflows::catalog::Program;
use crate::workflows::cohort::Milestone;

/// A course placed in the dashboard term, with the student's progress in it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DashboardCourse {
    pub course_id: RecordId,
    pub course_code: String,
    pub title: String,
    pub description: Option<String>,
    pub credits: Option<u8>,
    pub instructor: Option<String>,
    pub semester: u8,
    pub year: u8,
    pub progress: u8,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct TaskCompletion {
    pub completed: usize,
    pub total: usize,
    pub percent: u8,
}

impl TaskCompletion {
    pub fn from_tasks(tasks: &[StudyTask]) -> Self {
        let completed = tasks.iter().filter(|task| task.completed).count();
        let total = tasks.len();
        let percent = if total == 0 {
            0
        } else {
            ((completed as f64 / total as f64) * 100.0).round() as u8
        };
        Self {
            completed,
            total,
            percent,
        }
    }
}

/// Everything the student landing page shows for one term.
#[derive(Debug, Clone, Serialize)]
pub struct StudentDashboard {
    pub student: Student,
    pub program: Option<Program>,
    pub semester: u8,
    pub year: u8,
    pub courses: Vec<DashboardCourse>,
    pub overall_progress: u8,
    pub milestones: Vec<Milestone>,
    pub unread_announcements: usize,
    pub tasks: TaskCompletion,
}

impl StudentDashboard {
    pub(crate) fn overall(courses: &[DashboardCourse]) -> u8 {
        rounded_mean(courses.iter().map(|course| course.progress))
    }
}
