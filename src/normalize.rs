//! Resolves listing date fragments (`"JUN 10"`, `"8:00 PM"`) into instants.
//!
//! Listing pages never print the year, so a reference year is supplied by the
//! caller, usually from [`DateNormalizer::reference_year_for`]. Anything that
//! cannot be turned into a real local date-time degrades to the fallback
//! instant `now + fallback_days` and is reported as [`DateSource::Fallback`].

use chrono::{DateTime, Datelike, Duration, Month, NaiveDate, NaiveDateTime, NaiveTime, TimeZone, Utc};
use chrono_tz::Tz;
use serde::Deserialize;
use std::sync::Arc;
use tracing::debug;

use crate::common::constants::{DATE_FALLBACK_DAYS, DEFAULT_SHOWING_TIME, YEAR_ROLLOVER_GRACE_DAYS};
use crate::common::types::{DateSource, DraftEvent};

/// Source of "now" for fallback dates and year inference
pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;
}

#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

#[derive(Debug, Clone, Copy)]
pub struct FixedClock(pub DateTime<Utc>);

impl Clock for FixedClock {
    fn now(&self) -> DateTime<Utc> {
        self.0
    }
}

/// How the missing year of a listing date is chosen
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum YearPolicy {
    /// Always the venue's current calendar year
    CurrentYear,
    /// Current year, unless the month/day already passed by more than the
    /// rollover grace, in which case next year
    RollForward,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedDate {
    pub at: DateTime<Utc>,
    pub source: DateSource,
}

pub struct DateNormalizer {
    clock: Arc<dyn Clock>,
    timezone: Tz,
    year_policy: YearPolicy,
    fallback_days: i64,
}

impl DateNormalizer {
    pub fn new(clock: Arc<dyn Clock>, timezone: Tz) -> Self {
        Self {
            clock,
            timezone,
            year_policy: YearPolicy::RollForward,
            fallback_days: DATE_FALLBACK_DAYS,
        }
    }

    pub fn with_year_policy(mut self, year_policy: YearPolicy) -> Self {
        self.year_policy = year_policy;
        self
    }

    pub fn with_fallback_days(mut self, fallback_days: i64) -> Self {
        self.fallback_days = fallback_days;
        self
    }

    /// Parses `"<Month> <day>"` plus an optional clock time in the venue's
    /// timezone. Never fails: unparseable input takes the fallback branch.
    pub fn normalize(
        &self,
        raw_date_fragment: &str,
        raw_time_fragment: Option<&str>,
        reference_year: i32,
    ) -> ResolvedDate {
        match self.parse(raw_date_fragment, raw_time_fragment, reference_year) {
            Ok(at) => ResolvedDate {
                at,
                source: DateSource::Parsed,
            },
            Err(reason) => self.fallback(reason),
        }
    }

    pub fn normalize_draft(&self, draft: &DraftEvent) -> ResolvedDate {
        let reference_year = self.reference_year_for(&draft.raw_date_fragment);
        self.normalize(
            &draft.raw_date_fragment,
            draft.raw_time_fragment.as_deref(),
            reference_year,
        )
    }

    /// The fallback instant: exactly `fallback_days` after the clock's now
    pub fn fallback(&self, reason: String) -> ResolvedDate {
        debug!("Date parsing fell back to now + {} days: {}", self.fallback_days, reason);
        ResolvedDate {
            at: self.clock.now() + Duration::days(self.fallback_days),
            source: DateSource::Fallback { reason },
        }
    }

    pub fn reference_year_for(&self, raw_date_fragment: &str) -> i32 {
        let today = self.clock.now().with_timezone(&self.timezone).date_naive();
        let current = today.year();
        if self.year_policy == YearPolicy::CurrentYear {
            return current;
        }

        let candidate = parse_month_day(raw_date_fragment)
            .ok()
            .and_then(|(month, day)| NaiveDate::from_ymd_opt(current, month, day));
        match candidate {
            Some(date) if date < today - Duration::days(YEAR_ROLLOVER_GRACE_DAYS) => current + 1,
            _ => current,
        }
    }

    fn parse(
        &self,
        raw_date_fragment: &str,
        raw_time_fragment: Option<&str>,
        reference_year: i32,
    ) -> Result<DateTime<Utc>, String> {
        let (month, day) = parse_month_day(raw_date_fragment)?;
        let date = NaiveDate::from_ymd_opt(reference_year, month, day).ok_or_else(|| {
            format!("{}-{:02}-{:02} is not a calendar date", reference_year, month, day)
        })?;
        let time = parse_clock_time(raw_time_fragment.unwrap_or(DEFAULT_SHOWING_TIME))?;

        let local = NaiveDateTime::new(date, time);
        self.timezone
            .from_local_datetime(&local)
            .earliest()
            .map(|dt| dt.with_timezone(&Utc))
            .ok_or_else(|| format!("{} does not exist in {}", local, self.timezone))
    }
}

fn parse_month_day(fragment: &str) -> Result<(u32, u32), String> {
    let mut parts = fragment.split_whitespace();
    let (month, day) = match (parts.next(), parts.next(), parts.next()) {
        (Some(month), Some(day), None) => (month, day),
        _ => return Err(format!("expected \"<Month> <day>\", got {:?}", fragment)),
    };

    let month = month
        .trim_end_matches('.')
        .parse::<Month>()
        .map_err(|_| format!("unknown month {:?}", month))?;
    let day = day
        .parse::<u32>()
        .map_err(|_| format!("invalid day {:?}", day))?;
    Ok((month.number_from_month(), day))
}

fn parse_clock_time(fragment: &str) -> Result<NaiveTime, String> {
    let compact: String = fragment.split_whitespace().collect();
    NaiveTime::parse_from_str(&compact, "%I:%M%p")
        .map_err(|e| format!("invalid time {:?}: {}", fragment, e))
}
