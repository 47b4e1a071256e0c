use crate::demo::{run_demo, DemoArgs};
use crate::reports::{export_applications, report_catalog, CatalogReportArgs, ExportArgs};
use crate::server;
use academy_portal::error::AppError;
use clap::{Args, Parser, Subcommand};

#[derive(Parser, Debug)]
#[command(
    name = "Academy Portal",
    about = "Run the academy portal API and its admissions tooling from the command line",
    version
)]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Start the HTTP service (default command)
    Serve(ServeArgs),
    /// Work with submitted applications in the configured store
    Applications {
        #[command(subcommand)]
        command: ApplicationsCommand,
    },
    /// Summarise the program and course catalog
    Catalog {
        #[command(subcommand)]
        command: CatalogCommand,
    },
    /// Walk through intake, review, enrollment and the student dashboard in memory
    Demo(DemoArgs),
}

#[derive(Subcommand, Debug)]
enum ApplicationsCommand {
    /// Export applications as CSV
    Export(ExportArgs),
}

#[derive(Subcommand, Debug)]
enum CatalogCommand {
    /// Print catalog coverage and per-program course counts
    Report(CatalogReportArgs),
}

#[derive(Args, Debug, Default)]
pub(crate) struct ServeArgs {
    /// Override the configured host for the HTTP server
    #[arg(long)]
    pub(crate) host: Option<String>,
    /// Override the configured port for the HTTP server
    #[arg(long)]
    pub(crate) port: Option<u16>,
}

pub(crate) async fn run() -> Result<(), AppError> {
    let cli = Cli::parse();
    let command = cli
        .command
        .unwrap_or_else(|| Command::Serve(ServeArgs::default()));

    match command {
        Command::Serve(args) => server::run(args).await,
        Command::Applications {
            command: ApplicationsCommand::Export(args),
        } => export_applications(args),
        Command::Catalog {
            command: CatalogCommand::Report(args),
        } => report_catalog(args),
        Command::Demo(args) => run_demo(args),
    }
}
