use chrono::{DateTime, Local, NaiveDate, TimeZone, Utc};
use renter_ratings::api::BackendClient;
use renter_ratings::config::AppConfig;
use renter_ratings::error::AppError;
use renter_ratings::workflows::ratings::{
    Clock, CommentSanitizer, Confirmation, DayBoundary, FixedClock, Notification,
    NotificationLevel, NotificationSink, RatingSession, SystemClock,
};
use std::io::{self, BufRead, Write};
use std::sync::Arc;

/// Shared pieces every command builds its workflow from.
pub(crate) struct Context {
    pub(crate) config: AppConfig,
    pub(crate) clock: Arc<dyn Clock>,
    pub(crate) sanitizer: Arc<CommentSanitizer>,
}

impl Context {
    pub(crate) fn new(config: AppConfig, today: Option<NaiveDate>) -> Result<Self, AppError> {
        let clock: Arc<dyn Clock> = match today {
            Some(day) => Arc::new(FixedClock(midday(day, config.ratings.day_boundary)?)),
            None => Arc::new(SystemClock),
        };
        let sanitizer = Arc::new(CommentSanitizer::from_config(&config.sanitizer));
        Ok(Self {
            config,
            clock,
            sanitizer,
        })
    }

    pub(crate) fn client(&self) -> Result<Arc<BackendClient>, AppError> {
        Ok(Arc::new(BackendClient::new(&self.config.api)?))
    }

    pub(crate) fn session(&self) -> RatingSession {
        RatingSession::new(
            self.config.ratings.window(),
            Arc::clone(&self.clock),
            Arc::clone(&self.sanitizer),
        )
    }
}

/// Noon of `day` in the calendar the window counts in.
fn midday(day: NaiveDate, boundary: DayBoundary) -> Result<DateTime<Utc>, AppError> {
    let naive = day
        .and_hms_opt(12, 0, 0)
        .ok_or_else(|| AppError::Input(format!("{day} has no noon")))?;
    match boundary {
        DayBoundary::Utc => Ok(Utc.from_utc_datetime(&naive)),
        DayBoundary::Local => Local
            .from_local_datetime(&naive)
            .single()
            .map(|local| local.with_timezone(&Utc))
            .ok_or_else(|| AppError::Input(format!("{day} has no unambiguous local noon"))),
    }
}

pub(crate) fn parse_date(raw: &str) -> Result<NaiveDate, String> {
    NaiveDate::parse_from_str(raw.trim(), "%Y-%m-%d")
        .map_err(|err| format!("failed to parse '{raw}' as YYYY-MM-DD ({err})"))
}

/// Prints workflow notifications to stdout, failures to stderr.
#[derive(Debug, Default)]
pub(crate) struct ConsoleNotifications;

impl NotificationSink for ConsoleNotifications {
    fn notify(&self, notification: Notification) {
        match notification.level {
            NotificationLevel::Success => println!("✔ {}", notification.message),
            NotificationLevel::Error => eprintln!("✘ {}", notification.message),
        }
    }
}

/// Asks on the terminal unless `--yes` was passed.
#[derive(Debug)]
pub(crate) struct PromptConfirmation {
    assume_yes: bool,
}

impl PromptConfirmation {
    pub(crate) fn new(assume_yes: bool) -> Self {
        Self { assume_yes }
    }
}

impl Confirmation for PromptConfirmation {
    fn confirm(&self, prompt: &str) -> bool {
        if self.assume_yes {
            return true;
        }

        let mut stderr = io::stderr();
        if write!(stderr, "{prompt} [y/N] ").and_then(|_| stderr.flush()).is_err() {
            return false;
        }
        let mut answer = String::new();
        if io::stdin().lock().read_line(&mut answer).is_err() {
            return false;
        }
        is_affirmative(&answer)
    }
}

fn is_affirmative(answer: &str) -> bool {
    matches!(
        answer.trim().to_ascii_lowercase().as_str(),
        "y" | "yes" | "s" | "si" | "sí"
    )
}
