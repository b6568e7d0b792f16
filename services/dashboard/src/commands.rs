use crate::console::{parse_date, ConsoleNotifications, Context, PromptConfirmation};
use chrono::NaiveDate;
use clap::Args;
use renter_ratings::api::BackendClient;
use renter_ratings::error::AppError;
use renter_ratings::workflows::ratings::{
    check_comment, Clock, HostId, RatingWorkflow, RentalId, RenterId, RenterReputation, ScoreCategory,
};
use renter_ratings::workflows::reservations::{
    sort_reservations, ReservationQuery, ReservationsGateway, SortDirection, SortKey, SortOrder,
    DEFAULT_PAGE_SIZE,
};
use renter_ratings::workflows::reviews::{
    fetch_history, paginate, select_reviews, ReviewFilter, ReviewOrder, ReviewSortKey,
    REVIEWS_PER_PAGE,
};
use renter_ratings::workflows::vehicles::{Availability, HostCarsGateway};
use std::sync::Arc;

#[derive(Args, Debug)]
pub(crate) struct RentersArgs {
    /// Host whose completed rentals are listed
    #[arg(long)]
    pub(crate) host: String,
}

#[derive(Args, Debug)]
pub(crate) struct RateArgs {
    #[arg(long)]
    pub(crate) host: String,
    /// Rental (reservation) being rated
    #[arg(long)]
    pub(crate) rental: String,
    #[arg(long, value_parser = clap::value_parser!(u8).range(1..=5))]
    pub(crate) behavior: u8,
    #[arg(long, value_parser = clap::value_parser!(u8).range(1..=5))]
    pub(crate) car_care: u8,
    #[arg(long, value_parser = clap::value_parser!(u8).range(1..=5))]
    pub(crate) punctuality: u8,
    /// Optional comment, 10 to 500 characters
    #[arg(long)]
    pub(crate) comment: Option<String>,
}

#[derive(Args, Debug)]
pub(crate) struct DeleteArgs {
    #[arg(long)]
    pub(crate) host: String,
    #[arg(long)]
    pub(crate) rental: String,
    /// Skip the confirmation prompt
    #[arg(long)]
    pub(crate) yes: bool,
}

#[derive(Args, Debug)]
pub(crate) struct CheckCommentArgs {
    /// Comment text to validate
    pub(crate) text: String,
}

#[derive(Args, Debug)]
pub(crate) struct ReputationArgs {
    #[arg(long)]
    pub(crate) renter: String,
}

#[derive(Args, Debug)]
pub(crate) struct ReservationsArgs {
    #[arg(long)]
    pub(crate) host: String,
    #[arg(long, default_value_t = 1)]
    pub(crate) page: u32,
    #[arg(long, default_value_t = DEFAULT_PAGE_SIZE)]
    pub(crate) limit: u32,
    /// vehicle, start, end, renter or status
    #[arg(long, value_parser = parse_sort_key)]
    pub(crate) sort: Option<SortKey>,
    #[arg(long, requires = "sort")]
    pub(crate) descending: bool,
}

#[derive(Args, Debug)]
pub(crate) struct ReviewsArgs {
    #[arg(long)]
    pub(crate) host: String,
    /// Only reviews whose car brand or model contains this text
    #[arg(long)]
    pub(crate) search: Option<String>,
    /// First creation day to include (YYYY-MM-DD), needs --to
    #[arg(long, value_parser = parse_date, requires = "to")]
    pub(crate) from: Option<NaiveDate>,
    #[arg(long, value_parser = parse_date, requires = "from")]
    pub(crate) to: Option<NaiveDate>,
    #[arg(long)]
    pub(crate) min_rating: Option<f64>,
    /// date, rating or vehicle
    #[arg(long, value_parser = parse_review_sort, default_value = "date")]
    pub(crate) sort: ReviewSortKey,
    /// Oldest / lowest / A-Z first
    #[arg(long)]
    pub(crate) ascending: bool,
    #[arg(long, default_value_t = 1)]
    pub(crate) page: usize,
}

#[derive(Args, Debug)]
pub(crate) struct CarsArgs {
    #[arg(long)]
    pub(crate) host: String,
    /// Show the full record of one car
    #[arg(long)]
    pub(crate) car: Option<u64>,
}

fn parse_review_sort(raw: &str) -> Result<ReviewSortKey, String> {
    ReviewSortKey::parse(raw).ok_or_else(|| format!("unknown review order '{raw}'"))
}

fn parse_sort_key(raw: &str) -> Result<SortKey, String> {
    SortKey::parse(raw).ok_or_else(|| format!("unknown sort column '{raw}'"))
}

fn workflow(
    context: &Context,
) -> Result<RatingWorkflow<BackendClient, ConsoleNotifications>, AppError> {
    Ok(RatingWorkflow::new(
        context.client()?,
        Arc::new(ConsoleNotifications),
        context.session(),
    ))
}

fn stars(value: u8) -> String {
    let filled = usize::from(value.min(5));
    format!("{}{}", "★".repeat(filled), "☆".repeat(5 - filled))
}

pub(crate) async fn run_renters(context: &Context, args: RentersArgs) -> Result<(), AppError> {
    let host = HostId(args.host);
    let mut workflow = workflow(context)?;
    workflow.load_host(&host).await?;
    let Some(roster) = workflow.roster() else {
        return Ok(());
    };

    if roster.is_empty() {
        println!("No completed rentals for host {host}");
        return Ok(());
    }

    let window = context.config.ratings.window();
    let now = context.clock.now();
    println!("Renters for host {host} ({} rentals)", roster.len());
    for entry in roster.entries() {
        let status = if let Some(rating) = roster.rating_for(&entry.rental_id) {
            format!("rated {} {:.1}", stars(rating.scores().stars()), rating.average())
        } else if window.is_open(entry.rental_end, now) {
            let left = window.days() - window.days_since_end(entry.rental_end, now);
            format!("open, {} day(s) left", left.min(window.days()))
        } else {
            "closed".to_string()
        };
        println!(
            "- {} [{}] ended {} | {}",
            entry.renter.full_name(),
            entry.rental_id,
            entry.rental_end.format("%Y-%m-%d"),
            status
        );
    }
    Ok(())
}

pub(crate) async fn run_rate(context: &Context, args: RateArgs) -> Result<(), AppError> {
    let host = HostId(args.host);
    let rental = RentalId(args.rental);
    let mut workflow = workflow(context)?;
    workflow.load_host(&host).await?;

    workflow.select(&rental)?;
    for (category, value) in [
        (ScoreCategory::Behavior, args.behavior),
        (ScoreCategory::CarCare, args.car_care),
        (ScoreCategory::Punctuality, args.punctuality),
    ] {
        workflow.update_score(category, value)?;
    }
    if let Some(comment) = args.comment {
        if workflow.update_comment(comment.as_str())? {
            eprintln!(
                "Comment flagged as offensive: {}",
                context.sanitizer.clean(&comment)
            );
        }
    }

    let rating = workflow.save().await?;
    println!(
        "{} {:.1} ({} behavior / {} car care / {} punctuality)",
        stars(rating.scores().stars()),
        rating.average(),
        rating.behavior_score.get(),
        rating.car_care_score.get(),
        rating.punctuality_score.get()
    );
    Ok(())
}

pub(crate) async fn run_delete(context: &Context, args: DeleteArgs) -> Result<(), AppError> {
    let host = HostId(args.host);
    let rental = RentalId(args.rental);
    let mut workflow = workflow(context)?;
    workflow.load_host(&host).await?;

    let confirmation = PromptConfirmation::new(args.yes);
    workflow.delete(&rental, &confirmation).await?;
    Ok(())
}

pub(crate) fn run_check_comment(context: &Context, args: CheckCommentArgs) -> Result<(), AppError> {
    let cleaned = context.sanitizer.clean(&args.text);
    match check_comment(&args.text, &context.sanitizer) {
        Ok(()) => {
            println!("Comment accepted: {cleaned}");
            Ok(())
        }
        Err(blocker) => {
            println!("Comment rejected: {cleaned}");
            Err(AppError::Input(blocker.to_string()))
        }
    }
}

pub(crate) async fn run_reputation(context: &Context, args: ReputationArgs) -> Result<(), AppError> {
    let client = context.client()?;
    let reputation = RenterReputation::fetch(client.as_ref(), &RenterId(args.renter)).await?;

    match reputation.average {
        Some(average) => println!(
            "Renter {}: {} {:.1} from {} rating(s)",
            reputation.renter_id,
            stars(reputation.stars()),
            average,
            reputation.total
        ),
        None => {
            println!("Renter {} has no ratings yet", reputation.renter_id);
            return Ok(());
        }
    }

    for rating in &reputation.ratings {
        let rater = rating
            .rater
            .as_ref()
            .and_then(|rater| rater.name.clone())
            .unwrap_or_else(|| rating.rater_id.to_string());
        let date = rating
            .created_at
            .map(|at| at.format("%Y-%m-%d").to_string())
            .unwrap_or_else(|| "-".to_string());
        println!(
            "- {} by {}: {:.1} {}",
            date,
            rater,
            rating.average(),
            rating.comment_text()
        );
    }
    Ok(())
}

pub(crate) async fn run_reservations(
    context: &Context,
    args: ReservationsArgs,
) -> Result<(), AppError> {
    let order = args.sort.map(|key| SortOrder {
        key,
        direction: if args.descending {
            SortDirection::Descending
        } else {
            SortDirection::Ascending
        },
    });
    let query = ReservationQuery {
        host: HostId(args.host),
        page: args.page.max(1),
        limit: args.limit.max(1),
        sort: order,
    };

    let client = context.client()?;
    let mut page = client.reservations(&query).await?;
    if let Some(order) = order {
        sort_reservations(&mut page.data, order);
    }

    println!(
        "Reservations for host {} (page {} of {}, {} total)",
        query.host,
        query.page,
        page.total_pages(query.limit).max(1),
        page.pagination.total
    );
    for reservation in &page.data {
        println!(
            "- {} | {} | {} -> {} | {}",
            reservation.vehicle(),
            reservation.renter_name,
            reservation.start_date.format("%Y-%m-%d"),
            reservation.end_date.format("%Y-%m-%d"),
            reservation.status
        );
    }
    Ok(())
}

pub(crate) async fn run_reviews(context: &Context, args: ReviewsArgs) -> Result<(), AppError> {
    let host = HostId(args.host);
    let client = context.client()?;
    let reviews = fetch_history(client.as_ref(), &host).await?;

    let filter = ReviewFilter {
        search: args.search,
        from: args.from,
        to: args.to,
        min_rating: args.min_rating,
    };
    let order = ReviewOrder {
        key: args.sort,
        direction: if args.ascending {
            SortDirection::Ascending
        } else {
            SortDirection::Descending
        },
    };
    let selected = select_reviews(&reviews, &filter, order);
    if selected.is_empty() {
        println!("No reviews found for host {host}");
        return Ok(());
    }

    let page = paginate(&selected, args.page, REVIEWS_PER_PAGE);
    println!(
        "Reviews for host {host} (page {} of {}, {} matching)",
        page.page, page.total_pages, page.total
    );
    for review in page.items {
        let vehicle = review
            .car
            .as_ref()
            .map(|car| match car.year {
                Some(year) => format!("{} {} ({year})", car.brand, car.model),
                None => format!("{} {}", car.brand, car.model),
            })
            .unwrap_or_else(|| "Unknown vehicle".to_string());
        println!(
            "- {} | {} | {} {:.1} | {}",
            review.created_at.format("%Y-%m-%d"),
            vehicle,
            stars(review.rating.round().clamp(0.0, 5.0) as u8),
            review.rating,
            review.renter_name
        );
        if !review.comment_text().is_empty() {
            println!("    {}", review.comment_text());
        }
    }
    Ok(())
}

pub(crate) async fn run_cars(context: &Context, args: CarsArgs) -> Result<(), AppError> {
    let host = HostId(args.host);
    let client = context.client()?;
    let fleet = client.host_cars(&host).await?;

    if fleet.is_empty() {
        println!("Host {host} has no registered cars");
        return Ok(());
    }

    if let Some(id) = args.car {
        let car = fleet
            .find(id)
            .ok_or_else(|| AppError::Input(format!("car {id} is not listed by host {host}")))?;
        println!("{} ({})", car.name(), car.year.map_or_else(|| "-".to_string(), |y| y.to_string()));
        println!("  VIN: {}  plate: {}  SOAT: {}", car.vin, car.plate, if car.soat { "yes" } else { "no" });
        println!("  {} seats, {} doors, {} transmission", car.seats, car.doors, car.transmission);
        println!("  fuel: {}  maintenances: {}", car.fuel(), car.maintenance_count);
        println!(
            "  address: {} {}, {}",
            car.address,
            car.house_number.as_deref().unwrap_or(""),
            car.city_name()
        );
        if !car.features.is_empty() {
            let features: Vec<&str> = car.features.iter().map(|f| f.name.as_str()).collect();
            println!("  features: {}", features.join(", "));
        }
        println!("  {} image(s)", car.images.len());
        return Ok(());
    }

    println!(
        "Cars for host {host} ({} total, {} with plate)",
        fleet.total, fleet.with_plate
    );
    for car in &fleet.cars {
        println!(
            "- [{}] {} {} | {} | {} | {:.2}/day | {} | {}",
            car.id,
            car.name(),
            car.year.map(|y| y.to_string()).unwrap_or_default(),
            availability_label(car.availability(), &car.status),
            car.transmission,
            car.daily_price,
            car.fuel(),
            car.city_name()
        );
    }
    Ok(())
}

fn availability_label(availability: Availability, raw: &str) -> String {
    match availability {
        Availability::Available => "available".to_string(),
        Availability::Reserved => "reserved".to_string(),
        Availability::Unavailable if raw.trim().is_empty() => "unavailable".to_string(),
        Availability::Unavailable => format!("unavailable ({})", raw.trim()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stars_are_capped_at_five() {
        assert_eq!(stars(0), "☆☆☆☆☆");
        assert_eq!(stars(4), "★★★★☆");
        assert_eq!(stars(9), "★★★★★");
    }

    #[test]
    fn review_orders_accept_dashboard_names() {
        assert_eq!(parse_review_sort("fecha"), Ok(ReviewSortKey::Date));
        assert_eq!(parse_review_sort("Rating"), Ok(ReviewSortKey::Rating));
        assert!(parse_review_sort("price").is_err());
    }

    #[test]
    fn unavailable_cars_show_the_backend_status() {
        assert_eq!(availability_label(Availability::Reserved, "Reservado"), "reserved");
        assert_eq!(
            availability_label(Availability::Unavailable, "Mantenimiento"),
            "unavailable (Mantenimiento)"
        );
        assert_eq!(availability_label(Availability::Unavailable, " "), "unavailable");
    }

    #[test]
    fn sort_keys_accept_friendly_names() {
        assert_eq!(parse_sort_key("Vehicle"), Ok(SortKey::Vehicle));
        assert_eq!(parse_sort_key("renter"), Ok(SortKey::RenterName));
        assert!(parse_sort_key("color").is_err());
    }
}
