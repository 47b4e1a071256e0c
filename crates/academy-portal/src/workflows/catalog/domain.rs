use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::store::{Record, RecordId};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ProgramLevel {
    Certificate,
    Diploma,
    Degree,
}

impl ProgramLevel {
    pub const fn label(self) -> &'static str {
        match self {
            ProgramLevel::Certificate => "Certificate",
            ProgramLevel::Diploma => "Diploma",
            ProgramLevel::Degree => "Degree",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum StudyMode {
    #[serde(rename = "Full-time")]
    FullTime,
    #[serde(rename = "Part-time")]
    PartTime,
    Online,
    Hybrid,
}

impl StudyMode {
    pub const fn label(self) -> &'static str {
        match self {
            StudyMode::FullTime => "Full-time",
            StudyMode::PartTime => "Part-time",
            StudyMode::Online => "Online",
            StudyMode::Hybrid => "Hybrid",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CourseCategory {
    Core,
    Elective,
}

/// Academic program offered by the academy.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Program {
    pub id: RecordId,
    pub title: String,
    pub duration_years: u8,
    pub level: Option<ProgramLevel>,
    pub mode: Option<StudyMode>,
    pub description: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl Record for Program {
    const TABLE: &'static str = "programs";

    fn id(&self) -> &RecordId {
        &self.id
    }
}

/// Create/update payload for a program.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProgramDraft {
    pub title: String,
    pub duration_years: u8,
    #[serde(default)]
    pub level: Option<ProgramLevel>,
    #[serde(default)]
    pub mode: Option<StudyMode>,
    #[serde(default)]
    pub description: Option<String>,
}

impl ProgramDraft {
    pub fn new(title: impl Into<String>, duration_years: u8) -> Self {
        Self {
            title: title.into(),
            duration_years,
            level: None,
            mode: None,
            description: None,
        }
    }

    pub fn with_level(mut self, level: ProgramLevel) -> Self {
        self.level = Some(level);
        self
    }

    pub fn with_mode(mut self, mode: StudyMode) -> Self {
        self.mode = Some(mode);
        self
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Course {
    pub id: RecordId,
    pub course_code: String,
    pub title: String,
    pub description: Option<String>,
    pub credits: Option<u8>,
    pub category: Option<CourseCategory>,
    pub instructor: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl Record for Course {
    const TABLE: &'static str = "courses";

    fn id(&self) -> &RecordId {
        &self.id
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CourseDraft {
    pub course_code: String,
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub credits: Option<u8>,
    #[serde(default)]
    pub category: Option<CourseCategory>,
    #[serde(default)]
    pub instructor: Option<String>,
}

impl CourseDraft {
    pub fn new(course_code: impl Into<String>, title: impl Into<String>) -> Self {
        Self {
            course_code: course_code.into(),
            title: title.into(),
            description: None,
            credits: None,
            category: None,
            instructor: None,
        }
    }

    pub fn with_category(mut self, category: CourseCategory) -> Self {
        self.category = Some(category);
        self
    }
}

/// Places a course in a program's semester/year timeline.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProgramCourse {
    pub id: RecordId,
    pub program_id: RecordId,
    pub course_id: RecordId,
    pub semester: u8,
    pub year: u8,
    pub created_at: DateTime<Utc>,
}

impl Record for ProgramCourse {
    const TABLE: &'static str = "program_courses";

    fn id(&self) -> &RecordId {
        &self.id
    }
}

/// Wire form of a timeline placement; `course_id` is still untrusted text.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Placement {
    pub course_id: String,
    pub semester: u8,
    pub year: u8,
}

/// One row of a program timeline, joined with the placed course.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TimelineEntry {
    pub link_id: RecordId,
    pub course_id: RecordId,
    pub course_code: String,
    pub course_title: String,
    pub semester: u8,
    pub year: u8,
}
