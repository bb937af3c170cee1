use chrono::{DateTime, Datelike, Months, NaiveDate, NaiveDateTime};

/// Rendered in place of a date whenever the plan's end cannot be computed.
pub const NOT_AVAILABLE: &str = "N/A";

/// Projected last date of a plan, or the "not available" sentinel.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EndDate {
    Date(NaiveDate),
    NotAvailable,
}

impl EndDate {
    pub fn date(&self) -> Option<NaiveDate> {
        match self {
            Self::Date(d) => Some(*d),
            Self::NotAvailable => None,
        }
    }
}

impl std::fmt::Display for EndDate {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Date(d) => write!(f, "{}", d.format("%Y-%m-%d")),
            Self::NotAvailable => write!(f, "{NOT_AVAILABLE}"),
        }
    }
}

/// Parse a stored plan date down to its calendar day.
///
/// Accepts `YYYY-MM-DD`, a naive `YYYY-MM-DDTHH:MM:SS` timestamp, or RFC 3339.
/// Any time-of-day component is dropped.
pub fn parse_plan_date(raw: &str) -> Option<NaiveDate> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return None;
    }
    if let Ok(d) = NaiveDate::parse_from_str(trimmed, "%Y-%m-%d") {
        return Some(d);
    }
    if let Ok(dt) = NaiveDateTime::parse_from_str(trimmed, "%Y-%m-%dT%H:%M:%S") {
        return Some(dt.date());
    }
    DateTime::parse_from_rfc3339(trimmed)
        .ok()
        .map(|dt| dt.date_naive())
}

/// Calendar-month arithmetic. The day is clamped to the target month's last day.
pub fn add_months(start: NaiveDate, months: i64) -> Option<NaiveDate> {
    let span = Months::new(u32::try_from(months.unsigned_abs()).ok()?);
    if months >= 0 {
        start.checked_add_months(span)
    } else {
        start.checked_sub_months(span)
    }
}

/// Whole calendar months from `start` to `today`: the largest `n` with
/// `add_months(start, n) <= today`. Negative when `today` precedes `start`.
pub fn months_elapsed(start: NaiveDate, today: NaiveDate) -> i64 {
    let mut n = i64::from(today.year() - start.year()) * 12 + i64::from(today.month())
        - i64::from(start.month());
    // Lands in today's month, so at most one step back is needed.
    if add_months(start, n).is_some_and(|d| d > today) {
        n -= 1;
    }
    n
}

/// Project the end date of a plan running `months` months from `start_date`.
///
/// Never fails: a missing or unparseable start date, a non-finite month count,
/// or a result outside the calendar range all produce [`EndDate::NotAvailable`].
/// Fractional month counts are truncated toward zero.
pub fn project_end_date(start_date: &str, months: f64) -> EndDate {
    if !months.is_finite() {
        return EndDate::NotAvailable;
    }
    let Some(start) = parse_plan_date(start_date) else {
        return EndDate::NotAvailable;
    };
    let whole = months.trunc();
    if whole.abs() > f64::from(u32::MAX) {
        return EndDate::NotAvailable;
    }
    // |whole| <= u32::MAX and integral, so the cast to i64 is exact.
    add_months(start, whole as i64).map_or(EndDate::NotAvailable, EndDate::Date)
}
