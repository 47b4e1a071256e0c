use std::io::Write;

use super::domain::Application;

const HEADER: [&str; 13] = [
    "id",
    "created_at",
    "status",
    "full_name",
    "email",
    "phone",
    "country",
    "program_title",
    "preferred_schedule",
    "desired_start_term",
    "reviewed_by",
    "reviewed_at",
    "admin_notes",
];

/// Writes applications as CSV for the admissions office, returning the number of data rows.
pub fn write_applications_csv<W: Write>(
    applications: &[Application],
    writer: W,
) -> Result<usize, csv::Error> {
    let mut csv_writer = csv::Writer::from_writer(writer);
    csv_writer.write_record(HEADER)?;

    for application in applications {
        let created_at = application.created_at.to_rfc3339();
        let reviewed_at = application
            .reviewed_at
            .map(|at| at.to_rfc3339())
            .unwrap_or_default();
        csv_writer.write_record([
            application.id.as_str(),
            created_at.as_str(),
            application.status.label(),
            application.full_name.as_str(),
            application.email.as_str(),
            application.phone.as_str(),
            application.country.as_str(),
            application.program_title.as_deref().unwrap_or_default(),
            application.preferred_schedule.as_str(),
            application.desired_start_term.as_deref().unwrap_or_default(),
            application.reviewed_by.as_deref().unwrap_or_default(),
            reviewed_at.as_str(),
            application.admin_notes.as_deref().unwrap_or_default(),
        ])?;
    }

    csv_writer.flush()?;
    Ok(applications.len())
}
