use crate::infra::PortalServices;
use crate::reports::render_catalog_overview;
use academy_portal::access::Actor;
use academy_portal::error::AppError;
use academy_portal::store::{InMemoryStore, PortalStore};
use academy_portal::workflows::admissions::{
    ApplicationFilter, ApplicationStatus, ApplicationSubmission, ReviewPolicy, StatusUpdate,
};
use academy_portal::workflows::catalog::{
    CourseCategory, CourseDraft, Placement, ProgramDraft, ProgramLevel, StudyMode,
};
use academy_portal::workflows::cohort::{
    AnnouncementDraft, AnnouncementKind, Audience, MilestoneDraft, MilestoneKind,
};
use academy_portal::workflows::students::{Enrollment, TaskDraft, TaskPriority};
use chrono::{Duration, Local, NaiveDate};
use clap::Args;
use std::sync::Arc;

#[derive(Args, Debug, Default)]
pub(crate) struct DemoArgs {
    /// Reporting date for milestones (YYYY-MM-DD). Defaults to today.
    #[arg(long, value_parser = crate::infra::parse_date)]
    pub(crate) today: Option<NaiveDate>,
    /// Stop after the admissions portion of the demo.
    #[arg(long)]
    pub(crate) skip_campus: bool,
}

pub(crate) fn run_demo(args: DemoArgs) -> Result<(), AppError> {
    let DemoArgs { today, skip_campus } = args;
    let today = today.unwrap_or_else(|| Local::now().date_naive());

    let store = Arc::new(PortalStore::Memory(InMemoryStore::new()));
    let services = PortalServices::new(store, ReviewPolicy::default());
    let registrar = Actor::new("registrar-1");

    println!("Academy portal demo");

    let program = services.catalog.create_program(
        ProgramDraft::new("Diploma in Biblical Studies", 2)
            .with_level(ProgramLevel::Diploma)
            .with_mode(StudyMode::Hybrid),
    )?;
    let survey = services.catalog.create_course(
        CourseDraft::new("BIB101", "Old Testament Survey").with_category(CourseCategory::Core),
    )?;
    let missions = services.catalog.create_course(
        CourseDraft::new("MIS210", "Urban Missions").with_category(CourseCategory::Elective),
    )?;
    for (course, semester, year) in [(&survey, 1, 1), (&missions, 2, 1)] {
        services.catalog.link_course(
            program.id.as_str(),
            Placement {
                course_id: course.id.to_string(),
                semester,
                year,
            },
        )?;
    }
    render_catalog_overview(&services.catalog.overview());

    println!("\nAdmissions review");
    let applicants = [
        ("Ruth Moabite", "ruth@example.org", ApplicationStatus::Approved),
        ("Boaz Ephrath", "boaz@example.org", ApplicationStatus::Waitlisted),
        ("Lydia Thyatira", "lydia@example.org", ApplicationStatus::Reviewing),
    ];
    for (name, email, decision) in applicants {
        let application = services
            .applications
            .submit(demo_submission(name, email, program.id.as_str()))?;
        println!(
            "- Received {} for {} -> {}",
            application.full_name,
            application.program_title.as_deref().unwrap_or("no program"),
            application.status
        );

        let reviewed = services.applications.update_status(
            application.id.as_str(),
            StatusUpdate::new(decision).with_notes("Reviewed during intake demo"),
            registrar.as_ref(),
        )?;
        println!(
            "  Decision {} by {}",
            reviewed.status,
            reviewed.reviewed_by.as_deref().unwrap_or("unknown reviewer")
        );
    }

    let stats = services.applications.stats();
    println!(
        "Totals: {} applications | {} pending | {} reviewing | {} approved | {} rejected | {} waitlisted",
        stats.total,
        stats.pending,
        stats.reviewing,
        stats.approved,
        stats.rejected,
        stats.waitlisted
    );

    let mut csv = Vec::new();
    let rows = services
        .applications
        .export_csv(&ApplicationFilter::with_status(ApplicationStatus::Approved), &mut csv)?;
    println!("Approved export ({rows} rows):");
    print!("{}", String::from_utf8_lossy(&csv));

    if skip_campus {
        return Ok(());
    }

    println!("\nCampus snapshot");
    let student = services.students.enroll(Enrollment {
        user_id: "ruth-user".to_string(),
        full_name: "Ruth Moabite".to_string(),
        email: "ruth@example.org".to_string(),
        phone: None,
        program_id: Some(program.id.to_string()),
        enrollment_date: Some(today),
    })?;
    services
        .students
        .record_progress(student.id.as_str(), survey.id.as_str(), 65)?;

    services.cohort.create_milestone(MilestoneDraft {
        program_id: program.id.to_string(),
        course_id: Some(survey.id.to_string()),
        title: "Pentateuch reading reflection".to_string(),
        description: "Two-page reflection on Genesis 12".to_string(),
        kind: MilestoneKind::Assignment,
        due_date: today + Duration::days(10),
        semester: 1,
        year: 1,
    })?;
    services.cohort.create_announcement(AnnouncementDraft {
        title: "Orientation week".to_string(),
        message: "Chapel starts at 8am on Monday.".to_string(),
        kind: AnnouncementKind::Info,
        author: "Registrar".to_string(),
        target_audience: Audience::Program,
        target_id: Some(program.id.to_string()),
    })?;

    let mut task = TaskDraft::new("Read Genesis 1-11");
    task.priority = TaskPriority::High;
    task.course_id = Some(survey.id.to_string());
    services.students.add_task(student.id.as_str(), task)?;

    let dashboard = services.students.dashboard(student.id.as_str(), 1, 1)?;
    println!(
        "- {} | year {} semester {} | overall progress {}%",
        dashboard.student.full_name, dashboard.year, dashboard.semester, dashboard.overall_progress
    );
    for course in &dashboard.courses {
        println!(
            "  - {} {}: {}%",
            course.course_code, course.title, course.progress
        );
    }
    println!(
        "  {} milestones this term | {} unread announcements | {}/{} tasks done",
        dashboard.milestones.len(),
        dashboard.unread_announcements,
        dashboard.tasks.completed,
        dashboard.tasks.total
    );

    let milestones = services.cohort.milestone_stats(today);
    println!(
        "  Calendar: {} upcoming of {} milestones",
        milestones.upcoming, milestones.total
    );

    Ok(())
}

fn demo_submission(full_name: &str, email: &str, program_id: &str) -> ApplicationSubmission {
    ApplicationSubmission {
        full_name: full_name.to_string(),
        email: email.to_string(),
        phone: "+1 555 0100".to_string(),
        country: "Kenya".to_string(),
        program_id: Some(program_id.to_string()),
        program_title: None,
        preferred_schedule: "Evenings".to_string(),
        desired_start_term: Some("Fall 2026".to_string()),
        payment_plan: Some("Monthly".to_string()),
        testimony: "Called to serve the local church through teaching.".to_string(),
        ministry_context: Some("Youth ministry".to_string()),
        reference_name: "Naomi".to_string(),
        reference_relationship: "Pastor".to_string(),
        reference_email: "naomi@example.org".to_string(),
        reference_phone: None,
        reference_notes: None,
    }
}
