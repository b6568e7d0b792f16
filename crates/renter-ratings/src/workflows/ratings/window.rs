use chrono::{DateTime, Local, NaiveDate, Utc};

/// Days after a rental ends during which its rating may be created, edited or deleted.
pub const DEFAULT_WINDOW_DAYS: i64 = 2;

/// Which calendar the rating window counts days in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DayBoundary {
    Local,
    Utc,
}

impl DayBoundary {
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "local" => Some(Self::Local),
            "utc" => Some(Self::Utc),
            _ => None,
        }
    }

    /// Truncates an instant to its calendar day.
    pub fn calendar_day(self, instant: DateTime<Utc>) -> NaiveDate {
        match self {
            DayBoundary::Local => instant.with_timezone(&Local).date_naive(),
            DayBoundary::Utc => instant.date_naive(),
        }
    }
}

/// Whole days elapsed from `end_day` to `today`; negative when the rental ends in the future.
pub fn days_since_end(end_day: NaiveDate, today: NaiveDate) -> i64 {
    (today - end_day).num_days()
}

pub fn is_within_window(end_day: NaiveDate, today: NaiveDate, window_days: i64) -> bool {
    days_since_end(end_day, today) <= window_days
}

/// Eligibility policy gating every rating mutation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RatingWindow {
    days: i64,
    boundary: DayBoundary,
}

impl Default for RatingWindow {
    fn default() -> Self {
        Self::new(DEFAULT_WINDOW_DAYS, DayBoundary::Local)
    }
}

impl RatingWindow {
    pub const fn new(days: i64, boundary: DayBoundary) -> Self {
        Self { days, boundary }
    }

    pub const fn days(&self) -> i64 {
        self.days
    }

    pub const fn boundary(&self) -> DayBoundary {
        self.boundary
    }

    pub fn days_since_end(&self, rental_end: DateTime<Utc>, now: DateTime<Utc>) -> i64 {
        days_since_end(
            self.boundary.calendar_day(rental_end),
            self.boundary.calendar_day(now),
        )
    }

    pub fn is_open(&self, rental_end: DateTime<Utc>, now: DateTime<Utc>) -> bool {
        self.days_since_end(rental_end, now) <= self.days
    }
}
