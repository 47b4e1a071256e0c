use crate::infra::PortalServices;
use academy_portal::config::AppConfig;
use academy_portal::error::AppError;
use academy_portal::store::PortalStore;
use academy_portal::workflows::admissions::{AdmissionsError, ApplicationFilter, ReviewPolicy};
use academy_portal::workflows::catalog::CatalogOverview;
use clap::Args;
use std::fs::File;
use std::io::{self, BufWriter};
use std::path::PathBuf;
use std::sync::Arc;

#[derive(Args, Debug, Default)]
pub(crate) struct ExportArgs {
    /// Only export applications with this status (pending, reviewing, approved, rejected, waitlisted)
    #[arg(long)]
    pub(crate) status: Option<String>,
    /// Case-insensitive match on applicant name, email, or program title
    #[arg(long)]
    pub(crate) search: Option<String>,
    /// Write the CSV to this file instead of stdout
    #[arg(long)]
    pub(crate) output: Option<PathBuf>,
}

#[derive(Args, Debug, Default)]
pub(crate) struct CatalogReportArgs {
    /// Print the overview as JSON instead of a text summary
    #[arg(long)]
    pub(crate) json: bool,
}

fn open_services() -> Result<PortalServices, AppError> {
    let config = AppConfig::load()?;
    let store = PortalStore::from_config(&config.store)?;
    Ok(PortalServices::new(
        Arc::new(store),
        ReviewPolicy::from(&config.review),
    ))
}

pub(crate) fn export_filter(args: &ExportArgs) -> Result<ApplicationFilter, AppError> {
    ApplicationFilter::from_params(args.status.as_deref(), args.search.clone())
        .map_err(|error| AppError::from(AdmissionsError::from(error)))
}

pub(crate) fn export_applications(args: ExportArgs) -> Result<(), AppError> {
    let filter = export_filter(&args)?;
    let services = open_services()?;

    let rows = match &args.output {
        Some(path) => {
            let file = BufWriter::new(File::create(path)?);
            services.applications.export_csv(&filter, file)?
        }
        None => services.applications.export_csv(&filter, io::stdout().lock())?,
    };

    match &args.output {
        Some(path) => eprintln!("Exported {rows} applications to {}", path.display()),
        None => eprintln!("Exported {rows} applications"),
    }
    Ok(())
}

pub(crate) fn report_catalog(args: CatalogReportArgs) -> Result<(), AppError> {
    let services = open_services()?;
    let overview = services.catalog.overview();

    if args.json {
        match serde_json::to_string_pretty(&overview) {
            Ok(json) => println!("{json}"),
            Err(err) => eprintln!("Catalog overview unavailable: {err}"),
        }
        return Ok(());
    }

    render_catalog_overview(&overview);
    Ok(())
}

pub(crate) fn render_catalog_overview(overview: &CatalogOverview) {
    println!("Catalog overview");
    println!(
        "- {} programs | {} courses | {} timeline placements",
        overview.programs, overview.courses, overview.links
    );
    println!(
        "- Average program length {:.1} years | {}% catalog coverage",
        overview.average_duration, overview.coverage_percent
    );
    println!(
        "- Courses by category: {} core | {} elective | {} uncategorized",
        overview.categories.core, overview.categories.elective, overview.categories.uncategorized
    );
    if overview.per_program.is_empty() {
        println!("No programs defined yet.");
        return;
    }
    println!("Courses per program:");
    for entry in &overview.per_program {
        println!("  - {}: {} courses", entry.title, entry.courses);
    }
}
