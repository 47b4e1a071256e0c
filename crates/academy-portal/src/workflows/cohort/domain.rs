use chrono::{DateTime, Datelike, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::store::{Record, RecordId};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MilestoneKind {
    Assignment,
    Exam,
    Retreat,
    Practicum,
    Checkpoint,
}

/// Dated checkpoint in a program's calendar.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Milestone {
    pub id: RecordId,
    pub program_id: RecordId,
    pub course_id: Option<RecordId>,
    pub title: String,
    pub description: String,
    #[serde(rename = "type")]
    pub kind: MilestoneKind,
    pub due_date: NaiveDate,
    pub semester: u8,
    pub year: u8,
    pub completed: bool,
    pub created_at: DateTime<Utc>,
}

impl Record for Milestone {
    const TABLE: &'static str = "milestones";

    fn id(&self) -> &RecordId {
        &self.id
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MilestoneDraft {
    pub program_id: String,
    #[serde(default)]
    pub course_id: Option<String>,
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(rename = "type")]
    pub kind: MilestoneKind,
    pub due_date: NaiveDate,
    pub semester: u8,
    pub year: u8,
}

/// Milestone list filter; every field narrows the result when present.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct MilestoneFilter {
    #[serde(default)]
    pub program_id: Option<String>,
    #[serde(default)]
    pub semester: Option<u8>,
    #[serde(default)]
    pub year: Option<u8>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AnnouncementKind {
    Info,
    Warning,
    Success,
    Urgent,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Audience {
    #[default]
    All,
    Program,
    Course,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Announcement {
    pub id: RecordId,
    pub title: String,
    pub message: String,
    #[serde(rename = "type")]
    pub kind: AnnouncementKind,
    pub author: String,
    pub read: bool,
    pub target_audience: Audience,
    pub target_id: Option<RecordId>,
    pub created_at: DateTime<Utc>,
}

impl Record for Announcement {
    const TABLE: &'static str = "announcements";

    fn id(&self) -> &RecordId {
        &self.id
    }
}

impl Announcement {
    /// Whether a reader enrolled in `program_id` and taking `course_ids` should see this.
    pub fn visible_to(&self, program_id: Option<&RecordId>, course_ids: &[RecordId]) -> bool {
        match (self.target_audience, self.target_id.as_ref()) {
            (Audience::All, _) => true,
            (Audience::Program, Some(target)) => program_id == Some(target),
            (Audience::Course, Some(target)) => course_ids.contains(target),
            (_, None) => false,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnnouncementDraft {
    pub title: String,
    pub message: String,
    #[serde(rename = "type")]
    pub kind: AnnouncementKind,
    pub author: String,
    #[serde(default)]
    pub target_audience: Audience,
    #[serde(default)]
    pub target_id: Option<String>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct MilestoneStats {
    pub total: usize,
    pub upcoming: usize,
    pub completed: usize,
}

impl MilestoneStats {
    /// Upcoming means due strictly after `today`.
    pub fn from_milestones(milestones: &[Milestone], today: NaiveDate) -> Self {
        Self {
            total: milestones.len(),
            upcoming: milestones
                .iter()
                .filter(|milestone| milestone.due_date > today)
                .count(),
            completed: milestones
                .iter()
                .filter(|milestone| milestone.completed)
                .count(),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct AnnouncementStats {
    pub total: usize,
    pub unread: usize,
    pub this_month: usize,
}

impl AnnouncementStats {
    pub fn from_announcements(announcements: &[Announcement], now: DateTime<Utc>) -> Self {
        Self {
            total: announcements.len(),
            unread: announcements
                .iter()
                .filter(|announcement| !announcement.read)
                .count(),
            this_month: announcements
                .iter()
                .filter(|announcement| {
                    announcement.created_at.year() == now.year()
                        && announcement.created_at.month() == now.month()
                })
                .count(),
        }
    }
}
