use crate::commands::{
    run_cars, run_check_comment, run_delete, run_rate, run_renters, run_reputation,
    run_reservations, run_reviews, CarsArgs, CheckCommentArgs, DeleteArgs, RateArgs, RentersArgs,
    ReputationArgs, ReservationsArgs, ReviewsArgs,
};
use crate::console::{parse_date, Context};
use chrono::NaiveDate;
use clap::{Args, Parser, Subcommand};
use renter_ratings::config::AppConfig;
use renter_ratings::error::AppError;
use renter_ratings::telemetry;

#[derive(Parser, Debug)]
#[command(
    name = "renter-ratings",
    about = "Review, rate and audit renters from the host dashboard",
    version
)]
struct Cli {
    #[command(flatten)]
    global: GlobalArgs,
    #[command(subcommand)]
    command: Command,
}

#[derive(Args, Debug, Default)]
pub(crate) struct GlobalArgs {
    /// Override the configured backend URL
    #[arg(long, global = true)]
    pub(crate) api_url: Option<String>,
    /// Evaluate the rating window as of this date (YYYY-MM-DD). Defaults to now.
    #[arg(long, global = true, value_parser = parse_date)]
    pub(crate) today: Option<NaiveDate>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// List the host's completed rentals with their rating status
    Renters(RentersArgs),
    /// Rate a renter for one completed rental
    Rate(RateArgs),
    /// Delete the host's rating for a rental
    Delete(DeleteArgs),
    /// Check a comment against the length and language rules
    CheckComment(CheckCommentArgs),
    /// Show the aggregated reputation of a renter
    Reputation(ReputationArgs),
    /// Browse the host's reservation history
    Reservations(ReservationsArgs),
    /// Browse, search and sort the comments renters left about the host's cars
    Reviews(ReviewsArgs),
    /// List the host's cars or show one of them
    Cars(CarsArgs),
}

pub(crate) async fn run() -> Result<(), AppError> {
    let cli = Cli::parse();

    let mut config = AppConfig::load()?;
    if let Some(api_url) = cli.global.api_url.clone() {
        config.override_api_url(api_url)?;
    }
    telemetry::init(&config.telemetry, config.environment)?;

    tracing::debug!(environment = ?config.environment, api = %config.api.base_url, "dashboard starting");

    let context = Context::new(config, cli.global.today)?;
    match cli.command {
        Command::Renters(args) => run_renters(&context, args).await,
        Command::Rate(args) => run_rate(&context, args).await,
        Command::Delete(args) => run_delete(&context, args).await,
        Command::CheckComment(args) => run_check_comment(&context, args),
        Command::Reputation(args) => run_reputation(&context, args).await,
        Command::Reservations(args) => run_reservations(&context, args).await,
        Command::Reviews(args) => run_reviews(&context, args).await,
        Command::Cars(args) => run_cars(&context, args).await,
    }
}
