mod cli;
mod demo;
mod infra;
mod reports;
mod routes;
mod server;

use academy_portal::error::AppError;

pub async fn run() -> Result<(), AppError> {
    cli::run().await
}
