use renter_ratings_dashboard::run;

#[tokio::main]
async fn main() {
    if let Err(err) = run().await {
        eprintln!("application error: {err}");
        std::process::exit(i32::from(err.exit_code()));
    }
}
