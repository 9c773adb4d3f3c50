// 📅 Recurrence & Aggregation Engine
// Next due dates, day counts, spend projections and the upcoming list.
//
// Everything here is pure: no storage, no errors. Bad anchor dates degrade
// to "today" so the caller always gets a displayable date.

use crate::expense::{Cadence, RecurringExpense};
use chrono::{DateTime, Duration, Months, NaiveDate, Utc};
use serde::Serialize;
use tracing::warn;

/// Upper bound on period steps when walking an anchor forward
pub const MAX_ADVANCE_STEPS: u32 = 300;

/// Length of the overview's upcoming list
pub const DEFAULT_UPCOMING_LIMIT: usize = 10;

/// Days ahead that still count as "soon"
const SOON_WINDOW_DAYS: i64 = 7;

// ============================================================================
// DATES
// ============================================================================

/// Current calendar date in UTC
pub fn today() -> NaiveDate {
    Utc::now().date_naive()
}

/// Parse an anchor date. Accepts `YYYY-MM-DD` and full RFC 3339 timestamps.
pub fn parse_anchor(starts_on: &str) -> Option<NaiveDate> {
    let trimmed = starts_on.trim();
    NaiveDate::parse_from_str(trimmed, "%Y-%m-%d").ok().or_else(|| {
        DateTime::parse_from_rfc3339(trimmed)
            .ok()
            .map(|dt| dt.with_timezone(&Utc).date_naive())
    })
}

/// Whole days from `a` to `b` (negative when `b` is earlier)
pub fn days_between(a: NaiveDate, b: NaiveDate) -> i64 {
    b.signed_duration_since(a).num_days()
}

/// `anchor` moved forward by `steps` whole periods.
///
/// Month-based cadences clamp to the last day of short months, and each
/// step is measured from the anchor so clamping never accumulates.
fn shift(anchor: NaiveDate, cadence: Cadence, steps: u32) -> Option<NaiveDate> {
    match cadence {
        Cadence::Weekly => anchor.checked_add_signed(Duration::weeks(i64::from(steps))),
        Cadence::Biweekly => anchor.checked_add_signed(Duration::weeks(2 * i64::from(steps))),
        Cadence::Monthly => anchor.checked_add_months(Months::new(steps)),
        Cadence::Quarterly => anchor.checked_add_months(Months::new(steps.checked_mul(3)?)),
        Cadence::Yearly => anchor.checked_add_months(Months::new(steps.checked_mul(12)?)),
    }
}

/// Earliest `anchor + k·period` (k ≥ 0) strictly after `as_of`.
///
/// Gives up after [`MAX_ADVANCE_STEPS`] and returns the last candidate.
pub fn next_occurrence_from(anchor: NaiveDate, cadence: Cadence, as_of: NaiveDate) -> NaiveDate {
    if anchor > as_of {
        return anchor;
    }

    let mut candidate = anchor;
    for step in 1..=MAX_ADVANCE_STEPS {
        match shift(anchor, cadence, step) {
            Some(next) => candidate = next,
            None => break, // ran off the representable calendar
        }
        if candidate > as_of {
            return candidate;
        }
    }
    candidate
}

/// Next billing date for a stored anchor string.
///
/// A malformed anchor is replaced by `as_of`, so the result is one period
/// after `as_of`.
pub fn compute_next_occurrence(starts_on: &str, cadence: Cadence, as_of: NaiveDate) -> NaiveDate {
    let anchor = match parse_anchor(starts_on) {
        Some(date) => date,
        None => {
            warn!(starts_on, "unparseable anchor date, projecting from today");
            as_of
        }
    };
    next_occurrence_from(anchor, cadence, as_of)
}

/// [`compute_next_occurrence`] against the current UTC date
pub fn next_occurrence_today(starts_on: &str, cadence: Cadence) -> NaiveDate {
    compute_next_occurrence(starts_on, cadence, today())
}

// ============================================================================
// TOTALS
// ============================================================================

/// Projected spend per week / month / year
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct Totals {
    pub weekly: f64,
    pub monthly: f64,
    pub yearly: f64,
}

/// Annualize and sum every item. Paused items are counted too; filter the
/// iterator first for active-only figures.
pub fn compute_totals<'a, I>(items: I) -> Totals
where
    I: IntoIterator<Item = &'a RecurringExpense>,
{
    let yearly: f64 = items.into_iter().map(RecurringExpense::annualized).sum();

    Totals {
        weekly: yearly / 52.0,
        monthly: yearly / 12.0,
        yearly,
    }
}

// ============================================================================
// UPCOMING
// ============================================================================

/// How close a charge is, as shown on the due pill
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum DueStatus {
    Overdue,
    Today,
    Tomorrow,
    Soon,
    Later,
}

impl DueStatus {
    pub fn from_days(days: i64) -> Self {
        match days {
            d if d < 0 => DueStatus::Overdue,
            0 => DueStatus::Today,
            1 => DueStatus::Tomorrow,
            d if d <= SOON_WINDOW_DAYS => DueStatus::Soon,
            _ => DueStatus::Later,
        }
    }
}

/// "1 day", "3 days"
pub fn pluralize(value: i64, unit: &str) -> String {
    if value == 1 {
        format!("{} {}", value, unit)
    } else {
        format!("{} {}s", value, unit)
    }
}

/// Pill text for a day count
pub fn due_label(days: i64) -> String {
    match DueStatus::from_days(days) {
        DueStatus::Overdue => format!("{} overdue", pluralize(days.abs(), "day")),
        DueStatus::Today => "Due today".to_string(),
        DueStatus::Tomorrow => "Due tomorrow".to_string(),
        DueStatus::Soon | DueStatus::Later => format!("In {}", pluralize(days, "day")),
    }
}

/// An expense with its computed next charge
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UpcomingExpense {
    #[serde(flatten)]
    pub expense: RecurringExpense,
    pub next_at: NaiveDate,
    pub days: i64,
}

impl UpcomingExpense {
    pub fn due_status(&self) -> DueStatus {
        DueStatus::from_days(self.days)
    }

    pub fn due_label(&self) -> String {
        due_label(self.days)
    }
}

/// Items ordered by next charge date, at most `limit` of them.
///
/// The sort is stable, so same-day charges keep their input order.
pub fn rank_upcoming<'a, I>(items: I, as_of: NaiveDate, limit: usize) -> Vec<UpcomingExpense>
where
    I: IntoIterator<Item = &'a RecurringExpense>,
{
    let mut ranked: Vec<UpcomingExpense> = items
        .into_iter()
        .map(|expense| {
            let next_at = compute_next_occurrence(&expense.starts_on, expense.cadence, as_of);
            UpcomingExpense {
                expense: expense.clone(),
                next_at,
                days: days_between(as_of, next_at),
            }
        })
        .collect();

    ranked.sort_by_key(|item| item.next_at);
    ranked.truncate(limit);
    ranked
}
