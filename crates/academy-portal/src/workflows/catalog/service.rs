use std::sync::Arc;

use chrono::Utc;
use tracing::info;

use super::domain::{
    Course, CourseDraft, Placement, Program, ProgramCourse, ProgramDraft, TimelineEntry,
};
use super::insights::CatalogOverview;
use crate::store::{Direction, Query, RecordId, Store};
use crate::workflows::error::{
    degrade, optional_text, require_id, required_text, StoreResultExt, WorkflowError,
};

/// Programs, courses, and the timeline links between them.
pub struct CatalogService<S> {
    store: Arc<S>,
}

impl<S: Store + 'static> CatalogService<S> {
    pub fn new(store: Arc<S>) -> Self {
        Self { store }
    }

    pub fn create_program(&self, draft: ProgramDraft) -> Result<Program, WorkflowError> {
        let draft = validate_program(draft)?;
        let program = Program {
            id: RecordId::generate(),
            title: draft.title,
            duration_years: draft.duration_years,
            level: draft.level,
            mode: draft.mode,
            description: draft.description,
            created_at: Utc::now(),
        };
        let program = self.store.insert(program)?;
        info!(program_id = %program.id, title = %program.title, "program created");
        Ok(program)
    }

    /// Newest first.
    pub fn list_programs(&self) -> Vec<Program> {
        degrade(
            self.store
                .select(&Query::new().order_by("created_at", Direction::Descending)),
            "list programs",
        )
    }

    pub fn program(&self, program_id: &str) -> Option<Program> {
        let id = RecordId::parse(program_id)?;
        degrade(self.store.fetch(&id), "fetch program")
    }

    pub fn update_program(
        &self,
        program_id: &str,
        draft: ProgramDraft,
    ) -> Result<Program, WorkflowError> {
        let id = require_id("program", program_id)?;
        let draft = validate_program(draft)?;
        let program = self
            .store
            .update(&id, |program: &mut Program| {
                program.title = draft.title;
                program.duration_years = draft.duration_years;
                program.level = draft.level;
                program.mode = draft.mode;
                program.description = draft.description;
            })
            .or_missing("program", &id)?;
        info!(program_id = %program.id, "program updated");
        Ok(program)
    }

    /// Removes the program together with its timeline links.
    pub fn delete_program(&self, program_id: &str) -> Result<(), WorkflowError> {
        let id = require_id("program", program_id)?;
        if self.store.fetch::<Program>(&id)?.is_none() {
            return Err(WorkflowError::missing("program", &id));
        }

        let links: Vec<ProgramCourse> = self
            .store
            .select(&Query::new().eq("program_id", id.as_str()))?;
        for link in &links {
            self.store.delete::<ProgramCourse>(&link.id)?;
        }
        self.store.delete::<Program>(&id).or_missing("program", &id)?;
        info!(program_id = %id, links = links.len(), "program deleted");
        Ok(())
    }

    pub fn create_course(&self, draft: CourseDraft) -> Result<Course, WorkflowError> {
        let draft = validate_course(draft)?;
        let course = Course {
            id: RecordId::generate(),
            course_code: draft.course_code,
            title: draft.title,
            description: draft.description,
            credits: draft.credits,
            category: draft.category,
            instructor: draft.instructor,
            created_at: Utc::now(),
        };
        let course = self.store.insert(course)?;
        info!(course_id = %course.id, code = %course.course_code, "course created");
        Ok(course)
    }

    /// Ordered by course code.
    pub fn list_courses(&self) -> Vec<Course> {
        degrade(
            self.store
                .select(&Query::new().order_by("course_code", Direction::Ascending)),
            "list courses",
        )
    }

    pub fn course(&self, course_id: &str) -> Option<Course> {
        let id = RecordId::parse(course_id)?;
        degrade(self.store.fetch(&id), "fetch course")
    }

    pub fn update_course(
        &self,
        course_id: &str,
        draft: CourseDraft,
    ) -> Result<Course, WorkflowError> {
        let id = require_id("course", course_id)?;
        let draft = validate_course(draft)?;
        let course = self
            .store
            .update(&id, |course: &mut Course| {
                course.course_code = draft.course_code;
                course.title = draft.title;
                course.description = draft.description;
                course.credits = draft.credits;
                course.category = draft.category;
                course.instructor = draft.instructor;
            })
            .or_missing("course", &id)?;
        info!(course_id = %course.id, "course updated");
        Ok(course)
    }

    /// Removes the course and every placement of it in program timelines.
    pub fn delete_course(&self, course_id: &str) -> Result<(), WorkflowError> {
        let id = require_id("course", course_id)?;
        if self.store.fetch::<Course>(&id)?.is_none() {
            return Err(WorkflowError::missing("course", &id));
        }

        let links: Vec<ProgramCourse> = self
            .store
            .select(&Query::new().eq("course_id", id.as_str()))?;
        for link in &links {
            self.store.delete::<ProgramCourse>(&link.id)?;
        }
        self.store.delete::<Course>(&id).or_missing("course", &id)?;
        info!(course_id = %id, links = links.len(), "course deleted");
        Ok(())
    }

    pub fn link_course(
        &self,
        program_id: &str,
        placement: Placement,
    ) -> Result<ProgramCourse, WorkflowError> {
        let program_id = require_id("program", program_id)?;
        let course_id = require_id("course", &placement.course_id)?;

        let program = self
            .store
            .fetch::<Program>(&program_id)?
            .ok_or_else(|| WorkflowError::missing("program", &program_id))?;
        if self.store.fetch::<Course>(&course_id)?.is_none() {
            return Err(WorkflowError::missing("course", &course_id));
        }

        if placement.semester == 0 {
            return Err(WorkflowError::invalid("semester", "must be at least 1"));
        }
        if placement.year == 0 || placement.year > program.duration_years {
            return Err(WorkflowError::invalid(
                "year",
                format!("must be between 1 and {}", program.duration_years),
            ));
        }

        let duplicates: Vec<ProgramCourse> = self.store.select(
            &Query::new()
                .eq("program_id", program_id.as_str())
                .eq("course_id", course_id.as_str())
                .eq("semester", placement.semester)
                .eq("year", placement.year),
        )?;
        if !duplicates.is_empty() {
            return Err(WorkflowError::Conflict(format!(
                "course is already placed in year {} semester {}",
                placement.year, placement.semester
            )));
        }

        let link = self.store.insert(ProgramCourse {
            id: RecordId::generate(),
            program_id,
            course_id,
            semester: placement.semester,
            year: placement.year,
            created_at: Utc::now(),
        })?;
        info!(
            program_id = %link.program_id,
            course_id = %link.course_id,
            year = link.year,
            semester = link.semester,
            "course linked to program"
        );
        Ok(link)
    }

    /// A program's placements ordered by year then semester, joined with course details.
    /// Links whose course has disappeared are skipped.
    pub fn timeline(&self, program_id: &str) -> Vec<TimelineEntry> {
        let Some(id) = RecordId::parse(program_id) else {
            return Vec::new();
        };
        let links: Vec<ProgramCourse> = degrade(
            self.store.select(
                &Query::new()
                    .eq("program_id", id.as_str())
                    .order_by("year", Direction::Ascending)
                    .order_by("semester", Direction::Ascending),
            ),
            "program timeline",
        );

        links
            .into_iter()
            .filter_map(|link| {
                let course: Course =
                    degrade(self.store.fetch(&link.course_id), "timeline course")?;
                Some(TimelineEntry {
                    link_id: link.id,
                    course_id: course.id,
                    course_code: course.course_code,
                    course_title: course.title,
                    semester: link.semester,
                    year: link.year,
                })
            })
            .collect()
    }

    pub fn unlink_course(&self, link_id: &str) -> Result<(), WorkflowError> {
        let id = require_id("program course", link_id)?;
        self.store
            .delete::<ProgramCourse>(&id)
            .or_missing("program course", &id)?;
        info!(link_id = %id, "course unlinked from program");
        Ok(())
    }

    pub fn overview(&self) -> CatalogOverview {
        let programs = self.list_programs();
        let courses = self.list_courses();
        let links: Vec<ProgramCourse> =
            degrade(self.store.select(&Query::new()), "catalog links");
        CatalogOverview::build(&programs, &courses, &links)
    }
}

fn validate_program(draft: ProgramDraft) -> Result<ProgramDraft, WorkflowError> {
    if draft.duration_years == 0 {
        return Err(WorkflowError::invalid(
            "duration_years",
            "must be at least 1",
        ));
    }
    Ok(ProgramDraft {
        title: required_text("title", &draft.title)?,
        description: optional_text(draft.description),
        ..draft
    })
}

fn validate_course(draft: CourseDraft) -> Result<CourseDraft, WorkflowError> {
    Ok(CourseDraft {
        course_code: required_text("course_code", &draft.course_code)?,
        title: required_text("title", &draft.title)?,
        description: optional_text(draft.description),
        instructor: optional_text(draft.instructor),
        ..draft
    })
}
