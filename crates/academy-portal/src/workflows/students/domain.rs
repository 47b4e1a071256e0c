use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::store::{Record, RecordId};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StudentStatus {
    #[default]
    Active,
    Inactive,
    Graduated,
}

impl StudentStatus {
    pub const fn label(self) -> &'static str {
        match self {
            StudentStatus::Active => "active",
            StudentStatus::Inactive => "inactive",
            StudentStatus::Graduated => "graduated",
        }
    }
}

/// Enrolled student, linked to the identity provider through `user_id`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Student {
    pub id: RecordId,
    pub user_id: String,
    pub full_name: String,
    pub email: String,
    pub phone: Option<String>,
    pub program_id: Option<RecordId>,
    pub enrollment_date: NaiveDate,
    pub status: StudentStatus,
    pub created_at: DateTime<Utc>,
}

impl Record for Student {
    const TABLE: &'static str = "students";

    fn id(&self) -> &RecordId {
        &self.id
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Enrollment {
    pub user_id: String,
    pub full_name: String,
    pub email: String,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub program_id: Option<String>,
    /// Defaults to the day the enrollment is recorded.
    #[serde(default)]
    pub enrollment_date: Option<NaiveDate>,
}

/// Percent complete for one student in one course. At most one row per pair.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CourseProgress {
    pub id: RecordId,
    pub student_id: RecordId,
    pub course_id: RecordId,
    pub progress: u8,
    pub updated_at: DateTime<Utc>,
}

impl Record for CourseProgress {
    const TABLE: &'static str = "course_progress";

    fn id(&self) -> &RecordId {
        &self.id
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TaskPriority {
    Low,
    #[default]
    Medium,
    High,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StudyTask {
    pub id: RecordId,
    pub student_id: RecordId,
    pub title: String,
    pub description: Option<String>,
    pub due_date: Option<NaiveDate>,
    pub completed: bool,
    pub priority: TaskPriority,
    pub course_id: Option<RecordId>,
    pub milestone_id: Option<RecordId>,
    pub created_at: DateTime<Utc>,
}

impl Record for StudyTask {
    const TABLE: &'static str = "study_tasks";

    fn id(&self) -> &RecordId {
        &self.id
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskDraft {
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub due_date: Option<NaiveDate>,
    #[serde(default)]
    pub priority: TaskPriority,
    #[serde(default)]
    pub course_id: Option<String>,
    #[serde(default)]
    pub milestone_id: Option<String>,
}

impl TaskDraft {
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            description: None,
            due_date: None,
            priority: TaskPriority::default(),
            course_id: None,
            milestone_id: None,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct RosterFilter {
    #[serde(default)]
    pub search: Option<String>,
    #[serde(default)]
    pub status: Option<StudentStatus>,
    #[serde(default)]
    pub program_id: Option<String>,
}

impl RosterFilter {
    /// Case-insensitive match on name or email.
    pub fn matches(&self, student: &Student) -> bool {
        let Some(term) = self
            .search
            .as_deref()
            .map(str::trim)
            .filter(|term| !term.is_empty())
        else {
            return true;
        };
        let term = term.to_lowercase();
        student.full_name.to_lowercase().contains(&term)
            || student.email.to_lowercase().contains(&term)
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct RosterStats {
    pub total: usize,
    pub active: usize,
    pub average_progress: u8,
}

/// Rounded mean of `values`, 0 for an empty input.
pub fn rounded_mean<I>(values: I) -> u8
where
    I: IntoIterator<Item = u8>,
{
    let (sum, count) = values
        .into_iter()
        .fold((0u64, 0u64), |(sum, count), value| (sum + u64::from(value), count + 1));
    if count == 0 {
        return 0;
    }
    (sum as f64 / count as f64).round().clamp(0.0, 100.0) as u8
}
