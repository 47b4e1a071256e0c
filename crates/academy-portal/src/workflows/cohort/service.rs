use std::sync::Arc;

use chrono::{DateTime, NaiveDate, Utc};
use tracing::{debug, info};

use super::domain::{
    Announcement, AnnouncementDraft, AnnouncementKind, AnnouncementStats, Audience, Milestone,
    MilestoneDraft, MilestoneFilter, MilestoneKind, MilestoneStats,
};
use crate::store::{Direction, Query, RecordId, Store};
use crate::workflows::catalog::Program;
use crate::workflows::error::{degrade, require_id, required_text, StoreResultExt, WorkflowError};

/// Program calendar milestones and the announcement board.
pub struct CohortService<S> {
    store: Arc<S>,
}

impl<S: Store + 'static> CohortService<S> {
    pub fn new(store: Arc<S>) -> Self {
        Self { store }
    }

    pub fn create_milestone(&self, draft: MilestoneDraft) -> Result<Milestone, WorkflowError> {
        let draft = self.validate_milestone(draft)?;
        let milestone = self.store.insert(Milestone {
            id: RecordId::generate(),
            program_id: draft.program_id,
            course_id: draft.course_id,
            title: draft.title,
            description: draft.description,
            kind: draft.kind,
            due_date: draft.due_date,
            semester: draft.semester,
            year: draft.year,
            completed: false,
            created_at: Utc::now(),
        })?;
        info!(milestone_id = %milestone.id, due = %milestone.due_date, "milestone created");
        Ok(milestone)
    }

    /// Milestones matching `filter`, earliest due date first. A malformed program id matches
    /// nothing.
    pub fn list_milestones(&self, filter: &MilestoneFilter) -> Vec<Milestone> {
        let program_id = match filter.program_id.as_deref() {
            Some(raw) => match RecordId::parse(raw) {
                Some(id) => Some(id),
                None => return Vec::new(),
            },
            None => None,
        };

        let query = Query::new()
            .eq_opt("program_id", program_id.as_ref().map(RecordId::as_str))
            .eq_opt("semester", filter.semester)
            .eq_opt("year", filter.year)
            .order_by("due_date", Direction::Ascending);
        degrade(self.store.select(&query), "list milestones")
    }

    pub fn update_milestone(
        &self,
        milestone_id: &str,
        draft: MilestoneDraft,
    ) -> Result<Milestone, WorkflowError> {
        let id = require_id("milestone", milestone_id)?;
        let draft = self.validate_milestone(draft)?;
        let milestone = self
            .store
            .update(&id, |milestone: &mut Milestone| {
                milestone.program_id = draft.program_id;
                milestone.course_id = draft.course_id;
                milestone.title = draft.title;
                milestone.description = draft.description;
                milestone.kind = draft.kind;
                milestone.due_date = draft.due_date;
                milestone.semester = draft.semester;
                milestone.year = draft.year;
            })
            .or_missing("milestone", &id)?;
        info!(milestone_id = %milestone.id, "milestone updated");
        Ok(milestone)
    }

    /// Flips the completion flag and returns the updated milestone.
    pub fn toggle_milestone(&self, milestone_id: &str) -> Result<Milestone, WorkflowError> {
        let id = require_id("milestone", milestone_id)?;
        let milestone = self
            .store
            .update(&id, |milestone: &mut Milestone| {
                milestone.completed = !milestone.completed
            })
            .or_missing("milestone", &id)?;
        info!(
            milestone_id = %milestone.id,
            completed = milestone.completed,
            "milestone completion toggled"
        );
        Ok(milestone)
    }

    pub fn delete_milestone(&self, milestone_id: &str) -> Result<(), WorkflowError> {
        let id = require_id("milestone", milestone_id)?;
        self.store
            .delete::<Milestone>(&id)
            .or_missing("milestone", &id)?;
        info!(milestone_id = %id, "milestone deleted");
        Ok(())
    }

    pub fn milestone_stats(&self, today: NaiveDate) -> MilestoneStats {
        let milestones = self.list_milestones(&MilestoneFilter::default());
        MilestoneStats::from_milestones(&milestones, today)
    }

    fn validate_milestone(&self, draft: MilestoneDraft) -> Result<ValidMilestone, WorkflowError> {
        let program_id = RecordId::parse(&draft.program_id)
            .ok_or_else(|| WorkflowError::invalid("program_id", "must be a valid identifier"))?;
        if self.store.fetch::<Program>(&program_id)?.is_none() {
            return Err(WorkflowError::missing("program", &program_id));
        }
        if draft.semester == 0 {
            return Err(WorkflowError::invalid("semester", "must be at least 1"));
        }
        if draft.year == 0 {
            return Err(WorkflowError::invalid("year", "must be at least 1"));
        }

        let course_id = RecordId::parse_optional(draft.course_id.as_deref());
        if course_id.is_none() && draft.course_id.is_some() {
            debug!(course_id = ?draft.course_id, "dropping malformed course reference");
        }

        Ok(ValidMilestone {
            program_id,
            course_id,
            title: required_text("title", &draft.title)?,
            description: draft.description.trim().to_string(),
            kind: draft.kind,
            due_date: draft.due_date,
            semester: draft.semester,
            year: draft.year,
        })
    }

    pub fn create_announcement(
        &self,
        draft: AnnouncementDraft,
    ) -> Result<Announcement, WorkflowError> {
        self.create_announcement_at(draft, Utc::now())
    }

    pub fn create_announcement_at(
        &self,
        draft: AnnouncementDraft,
        now: DateTime<Utc>,
    ) -> Result<Announcement, WorkflowError> {
        let draft = validate_announcement(draft)?;
        let announcement = self.store.insert(Announcement {
            id: RecordId::generate(),
            title: draft.title,
            message: draft.message,
            kind: draft.kind,
            author: draft.author,
            read: false,
            target_audience: draft.target_audience,
            target_id: draft.target_id,
            created_at: now,
        })?;
        info!(
            announcement_id = %announcement.id,
            audience = ?announcement.target_audience,
            "announcement published"
        );
        Ok(announcement)
    }

    /// Every announcement, newest first.
    pub fn list_announcements(&self) -> Vec<Announcement> {
        degrade(
            self.store
                .select(&Query::new().order_by("created_at", Direction::Descending)),
            "list announcements",
        )
    }

    /// Announcements a reader in `program_id` taking `course_ids` can see, newest first.
    pub fn announcements_for(
        &self,
        program_id: Option<&RecordId>,
        course_ids: &[RecordId],
    ) -> Vec<Announcement> {
        self.list_announcements()
            .into_iter()
            .filter(|announcement| announcement.visible_to(program_id, course_ids))
            .collect()
    }

    pub fn update_announcement(
        &self,
        announcement_id: &str,
        draft: AnnouncementDraft,
    ) -> Result<Announcement, WorkflowError> {
        let id = require_id("announcement", announcement_id)?;
        let draft = validate_announcement(draft)?;
        let announcement = self
            .store
            .update(&id, |announcement: &mut Announcement| {
                announcement.title = draft.title;
                announcement.message = draft.message;
                announcement.kind = draft.kind;
                announcement.author = draft.author;
                announcement.target_audience = draft.target_audience;
                announcement.target_id = draft.target_id;
            })
            .or_missing("announcement", &id)?;
        info!(announcement_id = %announcement.id, "announcement updated");
        Ok(announcement)
    }

    pub fn mark_read(&self, announcement_id: &str) -> Result<Announcement, WorkflowError> {
        let id = require_id("announcement", announcement_id)?;
        self.store
            .update(&id, |announcement: &mut Announcement| announcement.read = true)
            .or_missing("announcement", &id)
    }

    pub fn delete_announcement(&self, announcement_id: &str) -> Result<(), WorkflowError> {
        let id = require_id("announcement", announcement_id)?;
        self.store
            .delete::<Announcement>(&id)
            .or_missing("announcement", &id)?;
        info!(announcement_id = %id, "announcement deleted");
        Ok(())
    }

    pub fn announcement_stats(&self, now: DateTime<Utc>) -> AnnouncementStats {
        AnnouncementStats::from_announcements(&self.list_announcements(), now)
    }
}

struct ValidMilestone {
    program_id: RecordId,
    course_id: Option<RecordId>,
    title: String,
    description: String,
    kind: MilestoneKind,
    due_date: NaiveDate,
    semester: u8,
    year: u8,
}

struct ValidAnnouncement {
    title: String,
    message: String,
    kind: AnnouncementKind,
    author: String,
    target_audience: Audience,
    target_id: Option<RecordId>,
}

/// Scoped audiences need a target; `all` ignores any target that was sent.
fn validate_announcement(draft: AnnouncementDraft) -> Result<ValidAnnouncement, WorkflowError> {
    let target_id = match draft.target_audience {
        Audience::All => None,
        Audience::Program | Audience::Course => Some(
            RecordId::parse_optional(draft.target_id.as_deref()).ok_or_else(|| {
                WorkflowError::invalid("target_id", "scoped announcements need a valid target")
            })?,
        ),
    };

    Ok(ValidAnnouncement {
        title: required_text("title", &draft.title)?,
        message: required_text("message", &draft.message)?,
        kind: draft.kind,
        author: required_text("author", &draft.author)?,
        target_audience: draft.target_audience,
        target_id,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::{InMemoryStore, UnconfiguredStore};
    use crate::workflows::catalog::{CatalogService, ProgramDraft};
    use chrono::TimeZone;

    fn setup() -> (CohortService<InMemoryStore>, Program) {
        let store = Arc::new(InMemoryStore::new());
        let program = CatalogService::new(store.clone())
            .create_program(ProgramDraft::new("Diploma in Theology", 2))
            .expect("program");
        (CohortService::new(store), program)
    }

    fn date(month: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, month, day).expect("valid date")
    }

    fn milestone(
        program: &Program,
        title: &str,
        due_date: NaiveDate,
        semester: u8,
    ) -> MilestoneDraft {
        MilestoneDraft {
            program_id: program.id.to_string(),
            course_id: None,
            title: title.to_string(),
            description: String::new(),
            kind: MilestoneKind::Assignment,
            due_date,
            semester,
            year: 1,
        }
    }

    fn announcement(
        title: &str,
        audience: Audience,
        target: Option<&RecordId>,
    ) -> AnnouncementDraft {
        AnnouncementDraft {
            title: title.to_string(),
            message: "Chapel moves to the main hall.".to_string(),
            kind: AnnouncementKind::Info,
            author: "Registrar".to_string(),
            target_audience: audience,
            target_id: target.map(RecordId::to_string),
        }
    }

    #[test]
    fn milestones_are_filtered_and_ordered_by_due_date() {
        let (service, program) = setup();
        service
            .create_milestone(milestone(&program, "Exegesis paper", date(4, 10), 1))
            .expect("milestone");
        service
            .create_milestone(milestone(&program, "Retreat", date(2, 1), 1))
            .expect("milestone");
        service
            .create_milestone(milestone(&program, "Final exam", date(6, 1), 2))
            .expect("milestone");

        let titles: Vec<String> = service
            .list_milestones(&MilestoneFilter {
                program_id: Some(program.id.to_string()),
                semester: Some(1),
                year: None,
            })
            .into_iter()
            .map(|milestone| milestone.title)
            .collect();
        assert_eq!(titles, vec!["Retreat", "Exegesis paper"]);

        let malformed = MilestoneFilter {
            program_id: Some("program-1".to_string()),
            ..MilestoneFilter::default()
        };
        assert!(service.list_milestones(&malformed).is_empty());
    }

    #[test]
    fn milestone_requires_existing_program() {
        let (service, program) = setup();
        let mut draft = milestone(&program, "Practicum", date(5, 5), 1);
        draft.program_id = RecordId::generate().to_string();
        assert!(matches!(
            service.create_milestone(draft),
            Err(WorkflowError::NotFound {
                entity: "program",
                ..
            })
        ));

        let mut draft = milestone(&program, "Practicum", date(5, 5), 1);
        draft.course_id = Some("OT101".to_string());
        let created = service.create_milestone(draft).expect("milestone");
        assert!(created.course_id.is_none());
    }

    #[test]
    fn toggling_and_stats() {
        let (service, program) = setup();
        let past = service
            .create_milestone(milestone(&program, "Orientation", date(1, 15), 1))
            .expect("milestone");
        service
            .create_milestone(milestone(&program, "Midterm", date(3, 20), 1))
            .expect("milestone");
        service
            .create_milestone(milestone(&program, "Due today", date(3, 1), 1))
            .expect("milestone");

        let toggled = service.toggle_milestone(past.id.as_str()).expect("toggle");
        assert!(toggled.completed);

        assert_eq!(
            service.milestone_stats(date(3, 1)),
            MilestoneStats {
                total: 3,
                upcoming: 1,
                completed: 1,
            }
        );

        let toggled = service.toggle_milestone(past.id.as_str()).expect("toggle");
        assert!(!toggled.completed);
        service
            .delete_milestone(past.id.as_str())
            .expect("delete");
        assert!(matches!(
            service.toggle_milestone(past.id.as_str()),
            Err(WorkflowError::NotFound { .. })
        ));
    }

    #[test]
    fn scoped_announcements_need_targets() {
        let (service, program) = setup();
        assert!(matches!(
            service.create_announcement(announcement("Exam week", Audience::Program, None)),
            Err(WorkflowError::Validation {
                field: "target_id",
                ..
            })
        ));

        let everyone = service
            .create_announcement(announcement("Welcome", Audience::All, Some(&program.id)))
            .expect("announcement");
        assert!(everyone.target_id.is_none());
    }

    #[test]
    fn audience_scoping_and_stats() {
        let (service, program) = setup();
        let course = RecordId::generate();
        let other_program = RecordId::generate();
        let march = Utc.with_ymd_and_hms(2026, 3, 2, 9, 0, 0).single().expect("time");
        let february = Utc.with_ymd_and_hms(2026, 2, 20, 9, 0, 0).single().expect("time");

        service
            .create_announcement_at(announcement("Everyone", Audience::All, None), february)
            .expect("announcement");
        let scoped = service
            .create_announcement_at(
                announcement("Theology cohort", Audience::Program, Some(&program.id)),
                march,
            )
            .expect("announcement");
        service
            .create_announcement_at(
                announcement("Other cohort", Audience::Program, Some(&other_program)),
                march,
            )
            .expect("announcement");
        service
            .create_announcement_at(announcement("OT101", Audience::Course, Some(&course)), march)
            .expect("announcement");

        let visible: Vec<String> = service
            .announcements_for(Some(&program.id), std::slice::from_ref(&course))
            .into_iter()
            .map(|announcement| announcement.title)
            .collect();
        assert_eq!(visible.len(), 3);
        assert_eq!(visible[2], "Everyone");
        assert!(!visible.contains(&"Other cohort".to_string()));

        service.mark_read(scoped.id.as_str()).expect("mark read");
        assert_eq!(
            service.announcement_stats(march),
            AnnouncementStats {
                total: 4,
                unread: 3,
                this_month: 3,
            }
        );
    }

    #[test]
    fn unconfigured_store_degrades() {
        let service = CohortService::new(Arc::new(UnconfiguredStore));
        assert!(service
            .list_milestones(&MilestoneFilter::default())
            .is_empty());
        assert_eq!(service.announcement_stats(Utc::now()), AnnouncementStats::default());
        assert!(matches!(
            service.create_announcement(announcement("Hello", Audience::All, None)),
            Err(WorkflowError::PersistenceUnavailable(_))
        ));
    }
}
