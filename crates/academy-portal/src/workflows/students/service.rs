use std::collections::HashMap;
use std::sync::Arc;

use chrono::Utc;
use tracing::info;

use super::dashboard::{DashboardCourse, StudentDashboard, TaskCompletion};
use super::domain::{
    rounded_mean, CourseProgress, Enrollment, RosterFilter, RosterStats, Student, StudentStatus,
    StudyTask, TaskDraft,
};
use crate::access::Actor;
use crate::store::{Direction, Query, RecordId, Store};
use crate::workflows::catalog::{Course, Program, ProgramCourse};
use crate::workflows::cohort::{Announcement, Milestone};
use crate::workflows::error::{
    degrade, optional_text, require_id, required_text, StoreResultExt, WorkflowError,
};

/// Roster, course progress, study tasks, and the per-term dashboard.
pub struct StudentService<S> {
    store: Arc<S>,
}

impl<S: Store + 'static> StudentService<S> {
    pub fn new(store: Arc<S>) -> Self {
        Self { store }
    }

    pub fn enroll(&self, enrollment: Enrollment) -> Result<Student, WorkflowError> {
        let user_id = required_text("user_id", &enrollment.user_id)?;
        if self.student_for_user(&user_id).is_some() {
            return Err(WorkflowError::Conflict(format!(
                "user '{user_id}' is already enrolled"
            )));
        }

        let program_id = RecordId::parse_optional(enrollment.program_id.as_deref());
        if let Some(program_id) = program_id.as_ref() {
            if self.store.fetch::<Program>(program_id)?.is_none() {
                return Err(WorkflowError::missing("program", program_id));
            }
        }

        let now = Utc::now();
        let student = self.store.insert(Student {
            id: RecordId::generate(),
            user_id,
            full_name: required_text("full_name", &enrollment.full_name)?,
            email: required_text("email", &enrollment.email)?,
            phone: optional_text(enrollment.phone),
            program_id,
            enrollment_date: enrollment.enrollment_date.unwrap_or(now.date_naive()),
            status: StudentStatus::Active,
            created_at: now,
        })?;
        info!(student_id = %student.id, "student enrolled");
        Ok(student)
    }

    /// Students matching `filter`, ordered by name.
    pub fn roster(&self, filter: &RosterFilter) -> Vec<Student> {
        let program_id = match filter.program_id.as_deref() {
            Some(raw) => match RecordId::parse(raw) {
                Some(id) => Some(id),
                None => return Vec::new(),
            },
            None => None,
        };
        let query = Query::new()
            .eq_opt("program_id", program_id.as_ref().map(RecordId::as_str))
            .eq_opt("status", filter.status.map(StudentStatus::label))
            .order_by("full_name", Direction::Ascending);

        let students: Vec<Student> = degrade(self.store.select(&query), "student roster");
        students
            .into_iter()
            .filter(|student| filter.matches(student))
            .collect()
    }

    pub fn student(&self, student_id: &str) -> Option<Student> {
        let id = RecordId::parse(student_id)?;
        degrade(self.store.fetch(&id), "fetch student")
    }

    /// The student record belonging to an identity-provider user id.
    pub fn student_for_user(&self, user_id: &str) -> Option<Student> {
        let students: Vec<Student> = degrade(
            self.store
                .select(&Query::new().eq("user_id", user_id.trim())),
            "student by user",
        );
        students.into_iter().next()
    }

    pub fn student_for_actor(&self, actor: &Actor) -> Option<Student> {
        self.student_for_user(actor.user_id())
    }

    pub fn set_status(
        &self,
        student_id: &str,
        status: StudentStatus,
    ) -> Result<Student, WorkflowError> {
        let id = require_id("student", student_id)?;
        let student = self
            .store
            .update(&id, |student: &mut Student| student.status = status)
            .or_missing("student", &id)?;
        info!(student_id = %student.id, status = status.label(), "student status changed");
        Ok(student)
    }

    /// Upserts the progress row for the (student, course) pair.
    pub fn record_progress(
        &self,
        student_id: &str,
        course_id: &str,
        progress: u8,
    ) -> Result<CourseProgress, WorkflowError> {
        if progress > 100 {
            return Err(WorkflowError::invalid("progress", "must be between 0 and 100"));
        }
        let student_id = require_id("student", student_id)?;
        let course_id = require_id("course", course_id)?;
        if self.store.fetch::<Student>(&student_id)?.is_none() {
            return Err(WorkflowError::missing("student", &student_id));
        }
        if self.store.fetch::<Course>(&course_id)?.is_none() {
            return Err(WorkflowError::missing("course", &course_id));
        }

        let now = Utc::now();
        let existing: Vec<CourseProgress> = self.store.select(
            &Query::new()
                .eq("student_id", student_id.as_str())
                .eq("course_id", course_id.as_str()),
        )?;

        let row = match existing.into_iter().next() {
            Some(row) => self
                .store
                .update(&row.id, |row: &mut CourseProgress| {
                    row.progress = progress;
                    row.updated_at = now;
                })
                .or_missing("course progress", &row.id)?,
            None => self.store.insert(CourseProgress {
                id: RecordId::generate(),
                student_id,
                course_id,
                progress,
                updated_at: now,
            })?,
        };
        info!(
            student_id = %row.student_id,
            course_id = %row.course_id,
            progress = row.progress,
            "course progress recorded"
        );
        Ok(row)
    }

    pub fn progress_for(&self, student_id: &RecordId) -> Vec<CourseProgress> {
        degrade(
            self.store
                .select(&Query::new().eq("student_id", student_id.as_str())),
            "course progress",
        )
    }

    /// Rounded mean over the student's progress rows; 0 without rows.
    pub fn overall_progress(&self, student_id: &RecordId) -> u8 {
        rounded_mean(
            self.progress_for(student_id)
                .into_iter()
                .map(|row| row.progress),
        )
    }

    pub fn roster_stats(&self) -> RosterStats {
        let students = self.roster(&RosterFilter::default());
        let progress: Vec<CourseProgress> =
            degrade(self.store.select(&Query::new()), "roster progress");

        let mut per_student: HashMap<&RecordId, Vec<u8>> = HashMap::new();
        for row in &progress {
            per_student.entry(&row.student_id).or_default().push(row.progress);
        }

        RosterStats {
            total: students.len(),
            active: students
                .iter()
                .filter(|student| student.status == StudentStatus::Active)
                .count(),
            average_progress: rounded_mean(students.iter().map(|student| {
                per_student
                    .get(&student.id)
                    .map(|values| rounded_mean(values.iter().copied()))
                    .unwrap_or_default()
            })),
        }
    }

    pub fn add_task(
        &self,
        student_id: &str,
        draft: TaskDraft,
    ) -> Result<StudyTask, WorkflowError> {
        let student_id = require_id("student", student_id)?;
        if self.store.fetch::<Student>(&student_id)?.is_none() {
            return Err(WorkflowError::missing("student", &student_id));
        }

        let task = self.store.insert(StudyTask {
            id: RecordId::generate(),
            student_id,
            title: required_text("title", &draft.title)?,
            description: optional_text(draft.description),
            due_date: draft.due_date,
            completed: false,
            priority: draft.priority,
            course_id: RecordId::parse_optional(draft.course_id.as_deref()),
            milestone_id: RecordId::parse_optional(draft.milestone_id.as_deref()),
            created_at: Utc::now(),
        })?;
        info!(task_id = %task.id, student_id = %task.student_id, "study task added");
        Ok(task)
    }

    pub fn set_task_completed(
        &self,
        task_id: &str,
        completed: bool,
    ) -> Result<StudyTask, WorkflowError> {
        let id = require_id("task", task_id)?;
        self.store
            .update(&id, |task: &mut StudyTask| task.completed = completed)
            .or_missing("task", &id)
    }

    /// Oldest first.
    pub fn tasks_for(&self, student_id: &RecordId) -> Vec<StudyTask> {
        degrade(
            self.store.select(
                &Query::new()
                    .eq("student_id", student_id.as_str())
                    .order_by("created_at", Direction::Ascending),
            ),
            "study tasks",
        )
    }

    /// Term view for a student. Only a missing student is an error; every other read
    /// degrades to empty sections.
    pub fn dashboard(
        &self,
        student_id: &str,
        semester: u8,
        year: u8,
    ) -> Result<StudentDashboard, WorkflowError> {
        let id = require_id("student", student_id)?;
        let student = self
            .store
            .fetch::<Student>(&id)?
            .ok_or_else(|| WorkflowError::missing("student", &id))?;

        let program: Option<Program> = match student.program_id.as_ref() {
            Some(program_id) => degrade(self.store.fetch(program_id), "dashboard program"),
            None => None,
        };

        let courses = match program.as_ref() {
            Some(program) => self.term_courses(&student.id, &program.id, semester, year),
            None => Vec::new(),
        };

        let milestones: Vec<Milestone> = match program.as_ref() {
            Some(program) => degrade(
                self.store.select(
                    &Query::new()
                        .eq("program_id", program.id.as_str())
                        .eq("semester", semester)
                        .eq("year", year)
                        .order_by("due_date", Direction::Ascending),
                ),
                "dashboard milestones",
            ),
            None => Vec::new(),
        };

        let course_ids: Vec<RecordId> = courses
            .iter()
            .map(|course| course.course_id.clone())
            .collect();
        let announcements: Vec<Announcement> =
            degrade(self.store.select(&Query::new()), "dashboard announcements");
        let unread_announcements = announcements
            .iter()
            .filter(|announcement| !announcement.read)
            .filter(|announcement| {
                announcement.visible_to(student.program_id.as_ref(), &course_ids)
            })
            .count();

        let tasks = TaskCompletion::from_tasks(&self.tasks_for(&student.id));

        Ok(StudentDashboard {
            overall_progress: StudentDashboard::overall(&courses),
            student,
            program,
            semester,
            year,
            courses,
            milestones,
            unread_announcements,
            tasks,
        })
    }

    fn term_courses(
        &self,
        student_id: &RecordId,
        program_id: &RecordId,
        semester: u8,
        year: u8,
    ) -> Vec<DashboardCourse> {
        let links: Vec<ProgramCourse> = degrade(
            self.store.select(
                &Query::new()
                    .eq("program_id", program_id.as_str())
                    .eq("semester", semester)
                    .eq("year", year),
            ),
            "dashboard courses",
        );
        let progress: HashMap<RecordId, u8> = self
            .progress_for(student_id)
            .into_iter()
            .map(|row| (row.course_id, row.progress))
            .collect();

        let mut courses: Vec<DashboardCourse> = links
            .into_iter()
            .filter_map(|link| {
                let course: Course =
                    degrade(self.store.fetch(&link.course_id), "dashboard course")?;
                Some(DashboardCourse {
                    progress: progress.get(&course.id).copied().unwrap_or_default(),
                    course_id: course.id,
                    course_code: course.course_code,
                    title: course.title,
                    description: course.description,
                    credits: course.credits,
                    instructor: course.instructor,
                    semester: link.semester,
                    year: link.year,
                })
            })
            .collect();
        courses.sort_by(|left, right| left.course_code.cmp(&right.course_code));
        courses
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::InMemoryStore;
    use crate::workflows::catalog::{CatalogService, CourseDraft, Placement, ProgramDraft};
    use crate::workflows::cohort::{
        AnnouncementDraft, AnnouncementKind, Audience, CohortService, MilestoneDraft,
        MilestoneKind,
    };
    use chrono::NaiveDate;

    struct Campus {
        students: StudentService<InMemoryStore>,
        catalog: CatalogService<InMemoryStore>,
        cohort: CohortService<InMemoryStore>,
    }

    fn campus() -> Campus {
        let store = Arc::new(InMemoryStore::new());
        Campus {
            students: StudentService::new(store.clone()),
            catalog: CatalogService::new(store.clone()),
            cohort: CohortService::new(store),
        }
    }

    fn enrollment(user_id: &str, name: &str, program: Option<&Program>) -> Enrollment {
        Enrollment {
            user_id: user_id.to_string(),
            full_name: name.to_string(),
            email: format!("{}@example.org", name.to_lowercase()),
            phone: None,
            program_id: program.map(|program| program.id.to_string()),
            enrollment_date: NaiveDate::from_ymd_opt(2026, 1, 12),
        }
    }

    #[test]
    fn enroll_rejects_duplicate_users() {
        let campus = campus();
        campus
            .students
            .enroll(enrollment("user-1", "Silas", None))
            .expect("enroll");
        assert!(matches!(
            campus.students.enroll(enrollment(" user-1 ", "Silas", None)),
            Err(WorkflowError::Conflict(_))
        ));

        let actor = Actor::new("user-1").expect("actor");
        let student = campus.students.student_for_actor(&actor).expect("student");
        assert_eq!(student.full_name, "Silas");
        assert!(campus.students.student_for_user("user-2").is_none());
    }

    #[test]
    fn roster_filters_and_stats() {
        let campus = campus();
        let program = campus
            .catalog
            .create_program(ProgramDraft::new("Diploma in Theology", 2))
            .expect("program");
        let course = campus
            .catalog
            .create_course(CourseDraft::new("OT101", "Old Testament Survey"))
            .expect("course");
        let other = campus
            .catalog
            .create_course(CourseDraft::new("NT101", "New Testament Survey"))
            .expect("course");

        let silas = campus
            .students
            .enroll(enrollment("user-1", "Silas", Some(&program)))
            .expect("enroll");
        let tabitha = campus
            .students
            .enroll(enrollment("user-2", "Tabitha", None))
            .expect("enroll");
        campus
            .students
            .set_status(tabitha.id.as_str(), StudentStatus::Graduated)
            .expect("graduate");

        campus
            .students
            .record_progress(silas.id.as_str(), course.id.as_str(), 40)
            .expect("progress");
        campus
            .students
            .record_progress(silas.id.as_str(), other.id.as_str(), 61)
            .expect("progress");
        campus
            .students
            .record_progress(silas.id.as_str(), course.id.as_str(), 80)
            .expect("progress upsert");

        assert_eq!(campus.students.progress_for(&silas.id).len(), 2);
        assert_eq!(campus.students.overall_progress(&silas.id), 71);
        assert_eq!(
            campus.students.roster_stats(),
            RosterStats {
                total: 2,
                active: 1,
                average_progress: 36,
            }
        );

        let by_program = campus.students.roster(&RosterFilter {
            program_id: Some(program.id.to_string()),
            ..RosterFilter::default()
        });
        assert_eq!(by_program, vec![silas.clone()]);

        let searched = campus.students.roster(&RosterFilter {
            search: Some("TABITHA@".to_string()),
            ..RosterFilter::default()
        });
        assert_eq!(searched.len(), 1);

        assert!(matches!(
            campus
                .students
                .record_progress(silas.id.as_str(), course.id.as_str(), 101),
            Err(WorkflowError::Validation {
                field: "progress",
                ..
            })
        ));
    }

    #[test]
    fn dashboard_collects_the_term() {
        let campus = campus();
        let program = campus
            .catalog
            .create_program(ProgramDraft::new("Diploma in Theology", 2))
            .expect("program");
        let survey = campus
            .catalog
            .create_course(CourseDraft::new("OT101", "Old Testament Survey"))
            .expect("course");
        let doctrine = campus
            .catalog
            .create_course(CourseDraft::new("TH102", "Christian Doctrine"))
            .expect("course");
        let later = campus
            .catalog
            .create_course(CourseDraft::new("BS201", "Hermeneutics"))
            .expect("course");
        for (course, semester, year) in [(&survey, 1, 1), (&doctrine, 1, 1), (&later, 1, 2)] {
            campus
                .catalog
                .link_course(
                    program.id.as_str(),
                    Placement {
                        course_id: course.id.to_string(),
                        semester,
                        year,
                    },
                )
                .expect("link");
        }

        let student = campus
            .students
            .enroll(enrollment("user-1", "Silas", Some(&program)))
            .expect("enroll");
        campus
            .students
            .record_progress(student.id.as_str(), survey.id.as_str(), 45)
            .expect("progress");

        campus
            .cohort
            .create_milestone(MilestoneDraft {
                program_id: program.id.to_string(),
                course_id: None,
                title: "Exegesis paper".to_string(),
                description: String::new(),
                kind: MilestoneKind::Assignment,
                due_date: NaiveDate::from_ymd_opt(2026, 3, 1).expect("date"),
                semester: 1,
                year: 1,
            })
            .expect("milestone");
        for (title, audience, target) in [
            ("Everyone", Audience::All, None),
            ("Cohort", Audience::Program, Some(program.id.to_string())),
            ("Hermeneutics", Audience::Course, Some(later.id.to_string())),
        ] {
            campus
                .cohort
                .create_announcement(AnnouncementDraft {
                    title: title.to_string(),
                    message: "Details inside.".to_string(),
                    kind: AnnouncementKind::Info,
                    author: "Dean".to_string(),
                    target_audience: audience,
                    target_id: target,
                })
                .expect("announcement");
        }

        let task = campus
            .students
            .add_task(student.id.as_str(), TaskDraft::new("Read Genesis 1-11"))
            .expect("task");
        campus
            .students
            .add_task(student.id.as_str(), TaskDraft::new("Memory verse"))
            .expect("task");
        campus
            .students
            .add_task(student.id.as_str(), TaskDraft::new("Journal"))
            .expect("task");
        campus
            .students
            .set_task_completed(task.id.as_str(), true)
            .expect("complete");

        let dashboard = campus
            .students
            .dashboard(student.id.as_str(), 1, 1)
            .expect("dashboard");

        assert_eq!(
            dashboard.program.as_ref().map(|program| program.title.as_str()),
            Some("Diploma in Theology")
        );
        let codes: Vec<&str> = dashboard
            .courses
            .iter()
            .map(|course| course.course_code.as_str())
            .collect();
        assert_eq!(codes, vec!["OT101", "TH102"]);
        assert_eq!(dashboard.courses[0].progress, 45);
        assert_eq!(dashboard.overall_progress, 23);
        assert_eq!(dashboard.milestones.len(), 1);
        assert_eq!(dashboard.unread_announcements, 2);
        assert_eq!(
            dashboard.tasks,
            TaskCompletion {
                completed: 1,
                total: 3,
                percent: 33,
            }
        );
    }

    #[test]
    fn dashboard_without_program_is_empty_but_present() {
        let campus = campus();
        let student = campus
            .students
            .enroll(enrollment("user-5", "Phoebe", None))
            .expect("enroll");

        let dashboard = campus
            .students
            .dashboard(student.id.as_str(), 1, 1)
            .expect("dashboard");
        assert!(dashboard.program.is_none());
        assert!(dashboard.courses.is_empty());
        assert_eq!(dashboard.overall_progress, 0);
        assert_eq!(dashboard.tasks, TaskCompletion::default());

        assert!(matches!(
            campus
                .students
                .dashboard(RecordId::generate().as_str(), 1, 1),
            Err(WorkflowError::NotFound {
                entity: "student",
                ..
            })
        ));
    }
}
