use chrono::{
    DateTime, Datelike, Duration, Local, Months, NaiveDate, NaiveDateTime, NaiveTime,
    SecondsFormat, TimeZone, Utc, Weekday,
};
use chrono_tz::Tz;
use std::fmt;

/// Zone used to turn instants into calendar dates
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CalendarZone {
    /// The system's local time
    #[default]
    Local,
    /// A named IANA zone such as `Europe/Helsinki`
    Named(Tz),
}

impl CalendarZone {
    /// Parse a zone name; empty or `local` selects the system zone
    pub fn parse(name: &str) -> Option<Self> {
        let name = name.trim();
        if name.is_empty() || name.eq_ignore_ascii_case("local") {
            return Some(CalendarZone::Local);
        }
        name.parse::<Tz>().ok().map(CalendarZone::Named)
    }

    /// Calendar date of an instant in this zone
    pub fn date_of(&self, instant: &DateTime<Utc>) -> NaiveDate {
        match self {
            CalendarZone::Local => instant.with_timezone(&Local).date_naive(),
            CalendarZone::Named(tz) => instant.with_timezone(tz).date_naive(),
        }
    }

    /// Wall-clock time of an instant in this zone
    pub fn time_of(&self, instant: &DateTime<Utc>) -> NaiveTime {
        match self {
            CalendarZone::Local => instant.with_timezone(&Local).time(),
            CalendarZone::Named(tz) => instant.with_timezone(tz).time(),
        }
    }

    /// Today's date in this zone
    pub fn today(&self) -> NaiveDate {
        self.date_of(&Utc::now())
    }

    /// Resolve a wall-clock time in this zone to an instant.
    ///
    /// Times skipped by a DST gap resolve to `None`; ambiguous times pick the earliest.
    pub fn resolve(&self, naive: &NaiveDateTime) -> Option<DateTime<Utc>> {
        match self {
            CalendarZone::Local => Local
                .from_local_datetime(naive)
                .earliest()
                .map(|dt| dt.with_timezone(&Utc)),
            CalendarZone::Named(tz) => tz
                .from_local_datetime(naive)
                .earliest()
                .map(|dt| dt.with_timezone(&Utc)),
        }
    }

    /// Instant at the given wall-clock time on `date`
    pub fn instant_at(&self, date: NaiveDate, hour: u32, minute: u32) -> Option<DateTime<Utc>> {
        self.resolve(&date.and_hms_opt(hour, minute, 0)?)
    }

    /// First instant of `date` in this zone
    pub fn start_of_day(&self, date: NaiveDate) -> DateTime<Utc> {
        let midnight = date.and_time(NaiveTime::MIN);
        // A DST gap at midnight moves the start of the day forward by an hour
        self.resolve(&midnight)
            .or_else(|| self.resolve(&(midnight + Duration::hours(1))))
            .unwrap_or_else(|| midnight.and_utc())
    }

    /// Last millisecond of `date` in this zone
    pub fn end_of_day(&self, date: NaiveDate) -> DateTime<Utc> {
        self.start_of_day(add_days(date, 1)) - Duration::milliseconds(1)
    }
}

impl fmt::Display for CalendarZone {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CalendarZone::Local => write!(f, "local"),
            CalendarZone::Named(tz) => write!(f, "{}", tz.name()),
        }
    }
}

/// Parse a weekday name such as `sunday` or `mon`
pub fn parse_weekday(name: &str) -> Option<Weekday> {
    name.trim().parse::<Weekday>().ok()
}

/// Parse an instant from its wire form.
///
/// Accepts RFC 3339, a naive `YYYY-MM-DDTHH:MM[:SS]` read as UTC, or a bare
/// `YYYY-MM-DD` meaning UTC midnight.
///
/// Naive times are never read in the server's local zone, so the stored
/// instant does not depend on where the server runs. Clients send `Z` instants.
pub fn parse_instant(input: &str) -> Option<DateTime<Utc>> {
    let input = input.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(input) {
        return Some(dt.with_timezone(&Utc));
    }
    for format in ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%dT%H:%M"] {
        if let Ok(naive) = NaiveDateTime::parse_from_str(input, format) {
            return Some(naive.and_utc());
        }
    }
    NaiveDate::parse_from_str(input, "%Y-%m-%d")
        .ok()
        .map(|date| date.and_time(NaiveTime::MIN).and_utc())
}

/// Format an instant for the wire, e.g. `2024-01-01T09:00:00.000Z`
pub fn format_instant(instant: &DateTime<Utc>) -> String {
    instant.to_rfc3339_opts(SecondsFormat::Millis, true)
}

/// Shift a date by a number of days; past chrono's range the date is unchanged
pub fn add_days(date: NaiveDate, days: i64) -> NaiveDate {
    Duration::try_days(days)
        .and_then(|delta| date.checked_add_signed(delta))
        .unwrap_or(date)
}

/// Shift a date by whole weeks
pub fn add_weeks(date: NaiveDate, weeks: i64) -> NaiveDate {
    weeks
        .checked_mul(7)
        .map_or(date, |days| add_days(date, days))
}

/// Shift a date by whole months, clamping the day to the target month's length
pub fn add_months(date: NaiveDate, months: i32) -> NaiveDate {
    let shifted = if months >= 0 {
        date.checked_add_months(Months::new(months.unsigned_abs()))
    } else {
        date.checked_sub_months(Months::new(months.unsigned_abs()))
    };
    shifted.unwrap_or(date)
}

/// First day of the week containing `date`
pub fn start_of_week(date: NaiveDate, week_start: Weekday) -> NaiveDate {
    let offset = (date.weekday().num_days_from_monday() + 7
        - week_start.num_days_from_monday())
        % 7;
    add_days(date, -(offset as i64))
}

/// Last day of the week containing `date`
pub fn end_of_week(date: NaiveDate, week_start: Weekday) -> NaiveDate {
    add_days(start_of_week(date, week_start), 6)
}

/// First day of the month containing `date`
pub fn start_of_month(date: NaiveDate) -> NaiveDate {
    date.with_day(1).unwrap_or(date)
}

/// Last day of the month containing `date`
pub fn end_of_month(date: NaiveDate) -> NaiveDate {
    add_days(add_months(start_of_month(date), 1), -1)
}

/// Every day from `start` through `end`, inclusive
pub fn days_between(start: NaiveDate, end: NaiveDate) -> Vec<NaiveDate> {
    start.iter_days().take_while(|day| *day <= end).collect()
}

/// The seven days of the week containing `date`
pub fn week_days(date: NaiveDate, week_start: Weekday) -> Vec<NaiveDate> {
    let start = start_of_week(date, week_start);
    days_between(start, add_days(start, 6))
}

/// The cells of a month grid: whole weeks covering the month of `date`
pub fn month_days(date: NaiveDate, week_start: Weekday) -> Vec<NaiveDate> {
    let start = start_of_week(start_of_month(date), week_start);
    let end = end_of_week(end_of_month(date), week_start);
    days_between(start, end)
}

/// First and last instant of `date` in `zone`
pub fn day_range(date: NaiveDate, zone: &CalendarZone) -> (DateTime<Utc>, DateTime<Utc>) {
    (zone.start_of_day(date), zone.end_of_day(date))
}

pub fn is_same_day(a: NaiveDate, b: NaiveDate) -> bool {
    a == b
}

pub fn is_same_week(a: NaiveDate, b: NaiveDate, week_start: Weekday) -> bool {
    start_of_week(a, week_start) == start_of_week(b, week_start)
}

pub fn is_same_month(a: NaiveDate, b: NaiveDate) -> bool {
    a.year() == b.year() && a.month() == b.month()
}

/// Whether `date` is today in `zone`
pub fn is_today(date: NaiveDate, zone: &CalendarZone) -> bool {
    is_same_day(date, zone.today())
}

/// Format a date, `%Y-%m-%d` being the usual choice
pub fn format_date(date: NaiveDate, format: &str) -> String {
    date.format(format).to_string()
}

/// Full month name, e.g. `March`
pub fn month_name(date: NaiveDate) -> String {
    format_date(date, "%B")
}

/// Four-digit year
pub fn year(date: NaiveDate) -> String {
    format_date(date, "%Y")
}
