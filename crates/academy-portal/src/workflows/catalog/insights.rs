use std::collections::HashMap;

use serde::Serialize;

use super::domain::{Course, CourseCategory, Program, ProgramCourse};
use crate::store::RecordId;

/// Percentage of the course catalog mapped into program timelines, relative to a full
/// every-course-in-every-program mapping. Always within `0..=100`.
pub fn coverage_percent(programs: usize, links: usize, courses: usize) -> u8 {
    if programs == 0 || courses == 0 {
        return 0;
    }
    let possible = courses as f64 * programs as f64;
    ((links as f64 / possible) * 100.0).round().clamp(0.0, 100.0) as u8
}

pub fn average_duration(programs: &[Program]) -> f64 {
    if programs.is_empty() {
        return 0.0;
    }
    let total: u32 = programs
        .iter()
        .map(|program| u32::from(program.duration_years))
        .sum();
    f64::from(total) / programs.len() as f64
}

/// Number of timeline placements per program id.
pub fn course_counts(links: &[ProgramCourse]) -> HashMap<RecordId, usize> {
    links.iter().fold(HashMap::new(), |mut counts, link| {
        *counts.entry(link.program_id.clone()).or_default() += 1;
        counts
    })
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct CategorySplit {
    pub core: usize,
    pub elective: usize,
    pub uncategorized: usize,
}

impl CategorySplit {
    pub fn from_courses(courses: &[Course]) -> Self {
        courses
            .iter()
            .fold(Self::default(), |mut split, course| {
                match course.category {
                    Some(CourseCategory::Core) => split.core += 1,
                    Some(CourseCategory::Elective) => split.elective += 1,
                    None => split.uncategorized += 1,
                }
                split
            })
    }
}

/// Case-insensitive match on title or level label. A blank term matches everything.
pub fn search_programs<'a>(programs: &'a [Program], term: &str) -> Vec<&'a Program> {
    let term = term.trim().to_lowercase();
    programs
        .iter()
        .filter(|program| {
            term.is_empty()
                || program.title.to_lowercase().contains(&term)
                || program
                    .level
                    .is_some_and(|level| level.label().to_lowercase().contains(&term))
        })
        .collect()
}

/// Case-insensitive match on title or course code, optionally narrowed to one category.
pub fn search_courses<'a>(
    courses: &'a [Course],
    term: &str,
    category: Option<CourseCategory>,
) -> Vec<&'a Course> {
    let term = term.trim().to_lowercase();
    courses
        .iter()
        .filter(|course| category.map_or(true, |wanted| course.category == Some(wanted)))
        .filter(|course| {
            term.is_empty()
                || course.title.to_lowercase().contains(&term)
                || course.course_code.to_lowercase().contains(&term)
        })
        .collect()
}

#[derive(Debug, Clone, Serialize)]
pub struct ProgramCourseCount {
    pub program_id: RecordId,
    pub title: String,
    pub courses: usize,
}

/// Catalog summary shown on the admin landing page.
#[derive(Debug, Clone, Serialize)]
pub struct CatalogOverview {
    pub programs: usize,
    pub courses: usize,
    pub links: usize,
    pub average_duration: f64,
    pub coverage_percent: u8,
    pub categories: CategorySplit,
    pub per_program: Vec<ProgramCourseCount>,
}

impl CatalogOverview {
    pub fn build(programs: &[Program], courses: &[Course], links: &[ProgramCourse]) -> Self {
        let counts = course_counts(links);
        let per_program = programs
            .iter()
            .map(|program| ProgramCourseCount {
                program_id: program.id.clone(),
                title: program.title.clone(),
                courses: counts.get(&program.id).copied().unwrap_or_default(),
            })
            .collect();

        Self {
            programs: programs.len(),
            courses: courses.len(),
            links: links.len(),
            average_duration: average_duration(programs),
            coverage_percent: coverage_percent(programs.len(), links.len(), courses.len()),
            categories: CategorySplit::from_courses(courses),
            per_program,
        }
    }
}
