mod cli;
mod commands;
mod console;

use renter_ratings::error::AppError;

pub async fn run() -> Result<(), AppError> {
    cli::run().await
}
