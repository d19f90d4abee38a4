use std::fmt;
use std::str::FromStr;

use chrono::{Datelike, Days, Months, NaiveDate};
use serde::{Deserialize, Serialize};
use ulid::Ulid;

// ── Calendar values ──────────────────────────────────────────────

/// A calendar day. No time-of-day, no timezone.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CalendarDate(NaiveDate);

impl CalendarDate {
    pub fn from_ymd(year: i32, month: u32, day: u32) -> Option<Self> {
        NaiveDate::from_ymd_opt(year, month, day).map(Self)
    }

    /// Parse `YYYY-MM-DD`. A trailing time component (`T…` or ` …`) is dropped.
    pub fn parse(s: &str) -> Option<Self> {
        let s = s.trim();
        let head = s.get(..10)?;
        if let Some(next) = s[10..].chars().next()
            && next != 'T'
            && next != ' ' {
                return None;
            }
        NaiveDate::parse_from_str(head, "%Y-%m-%d").ok().map(Self)
    }

    pub fn year(&self) -> i32 {
        self.0.year()
    }

    pub fn month(&self) -> u32 {
        self.0.month()
    }

    pub fn day(&self) -> u32 {
        self.0.day()
    }

    pub fn add_days(&self, n: u64) -> Option<Self> {
        self.0.checked_add_days(Days::new(n)).map(Self)
    }

    pub fn sub_days(&self, n: u64) -> Option<Self> {
        self.0.checked_sub_days(Days::new(n)).map(Self)
    }

    pub fn succ(&self) -> Option<Self> {
        self.add_days(1)
    }

    pub fn pred(&self) -> Option<Self> {
        self.sub_days(1)
    }

    /// 0 = Sunday … 6 = Saturday.
    pub fn weekday_from_sunday(&self) -> u32 {
        self.0.weekday().num_days_from_sunday()
    }

    pub fn year_month(&self) -> YearMonth {
        YearMonth {
            first: self.0.with_day(1).unwrap_or(self.0),
        }
    }
}

impl fmt::Display for CalendarDate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.format("%Y-%m-%d"))
    }
}

impl From<NaiveDate> for CalendarDate {
    fn from(date: NaiveDate) -> Self {
        Self(date)
    }
}

impl FromStr for CalendarDate {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s).ok_or_else(|| format!("invalid date: {s:?}"))
    }
}

/// A calendar month. Navigation is unbounded in both directions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct YearMonth {
    first: NaiveDate,
}

impl YearMonth {
    pub fn new(year: i32, month: u32) -> Option<Self> {
        NaiveDate::from_ymd_opt(year, month, 1).map(|first| Self { first })
    }

    /// Parse `YYYY-MM`.
    pub fn parse(s: &str) -> Option<Self> {
        let (y, m) = s.trim().split_once('-')?;
        Self::new(y.parse().ok()?, m.parse().ok()?)
    }

    pub fn year(&self) -> i32 {
        self.first.year()
    }

    pub fn month(&self) -> u32 {
        self.first.month()
    }

    pub fn first_day(&self) -> CalendarDate {
        CalendarDate(self.first)
    }

    pub fn last_day(&self) -> CalendarDate {
        let last = self
            .first
            .checked_add_months(Months::new(1))
            .and_then(|next| next.pred_opt())
            .unwrap_or(self.first);
        CalendarDate(last)
    }

    pub fn days(&self) -> u32 {
        self.last_day().day()
    }

    pub fn next(&self) -> Option<Self> {
        self.first
            .checked_add_months(Months::new(1))
            .map(|first| Self { first })
    }

    pub fn prev(&self) -> Option<Self> {
        self.first
            .checked_sub_months(Months::new(1))
            .map(|first| Self { first })
    }

    pub fn contains(&self, date: CalendarDate) -> bool {
        date.year() == self.year() && date.month() == self.month()
    }
}

impl fmt::Display for YearMonth {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:04}-{:02}", self.year(), self.month())
    }
}

impl FromStr for YearMonth {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s).ok_or_else(|| format!("invalid month: {s:?}"))
    }
}

/// Minute-precision wall-clock time, `HH:MM`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct ClockTime {
    hour: u8,
    minute: u8,
}

impl ClockTime {
    /// Unchecked; for constants only. Use `from_hm` for anything else.
    pub(crate) const fn new(hour: u8, minute: u8) -> Self {
        Self { hour, minute }
    }

    pub fn from_hm(hour: u8, minute: u8) -> Option<Self> {
        (hour < 24 && minute < 60).then_some(Self { hour, minute })
    }

    /// Parse `HH:MM`, truncating seconds and fractions (`09:00:00.000` → `09:00`).
    pub fn parse(s: &str) -> Option<Self> {
        let mut parts = s.trim().split(':');
        let hour = parts.next()?.parse().ok()?;
        let minute = parts.next()?.get(..2)?.parse().ok()?;
        Self::from_hm(hour, minute)
    }

    pub fn hour(&self) -> u8 {
        self.hour
    }

    pub fn minute(&self) -> u8 {
        self.minute
    }

    pub fn minutes_since_midnight(&self) -> u16 {
        self.hour as u16 * 60 + self.minute as u16
    }
}

impl fmt::Display for ClockTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:02}:{:02}", self.hour, self.minute)
    }
}

impl TryFrom<String> for ClockTime {
    type Error = String;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        Self::parse(&s).ok_or_else(|| format!("invalid time: {s:?}"))
    }
}

impl From<ClockTime> for String {
    fn from(t: ClockTime) -> Self {
        t.to_string()
    }
}

// ── Statuses ─────────────────────────────────────────────────────

/// Authoritative status of one availability window.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RawStatus {
    Available,
    Tentative,
    Booked,
    /// Anything upstream sent that we could not recognise. Never bookable.
    Unavailable,
}

impl RawStatus {
    /// A window a client may request: available or tentative.
    pub fn is_bookable(self) -> bool {
        matches!(self, RawStatus::Available | RawStatus::Tentative)
    }
}

/// Reconciled status of a whole date. Never persisted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DateStatus {
    Available,
    Tentative,
    Booked,
    Unavailable,
}

impl DateStatus {
    pub fn is_selectable(self) -> bool {
        matches!(self, DateStatus::Available | DateStatus::Tentative)
    }

    pub fn label(self) -> &'static str {
        match self {
            DateStatus::Available => "available",
            DateStatus::Tentative => "tentative",
            DateStatus::Booked => "booked",
            DateStatus::Unavailable => "unavailable",
        }
    }
}

impl From<RawStatus> for DateStatus {
    fn from(raw: RawStatus) -> Self {
        match raw {
            RawStatus::Available => DateStatus::Available,
            RawStatus::Tentative => DateStatus::Tentative,
            RawStatus::Booked => DateStatus::Booked,
            RawStatus::Unavailable => DateStatus::Unavailable,
        }
    }
}

// ── Trainers, courses, records ───────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SchedulingType {
    /// Two half-day windows per date.
    SlotBased,
    /// One 09:00–18:00 window per date.
    FullDay,
}

impl FromStr for SchedulingType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().replace('-', "_").as_str() {
            "SLOT_BASED" => Ok(SchedulingType::SlotBased),
            "FULL_DAY" => Ok(SchedulingType::FullDay),
            other => Err(format!("unknown scheduling type: {other}")),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DurationUnit {
    Hours,
    Days,
    HalfDay,
}

impl FromStr for DurationUnit {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "hours" | "hour" => Ok(DurationUnit::Hours),
            "days" | "day" => Ok(DurationUnit::Days),
            "half_day" | "half-day" => Ok(DurationUnit::HalfDay),
            other => Err(format!("unknown duration unit: {other}")),
        }
    }
}

/// Fixed time windows on a trainer's calendar.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Slot {
    Morning,
    Afternoon,
    FullDay,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrainerProfile {
    pub id: Ulid,
    pub scheduling: SchedulingType,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CourseRequirement {
    pub course_id: Ulid,
    /// `None` when the course has no duration on file.
    pub duration: Option<f64>,
    pub unit: DurationUnit,
}

/// One trainer-date-window tuple, as read from the calendar collaborator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AvailabilityRecord {
    pub id: Ulid,
    pub trainer_id: Ulid,
    pub date: CalendarDate,
    pub start: ClockTime,
    pub end: ClockTime,
    pub status: RawStatus,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SelectedSlot {
    pub date: CalendarDate,
    pub slot: Slot,
    pub availability_id: Option<Ulid>,
}

// ── Booking requests ─────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RequestType {
    #[serde(rename = "PUBLIC")]
    Public,
    #[serde(rename = "INHOUSE")]
    InHouse,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum BookingStatus {
    Pending,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ContactDetails {
    pub name: String,
    pub email: String,
    pub phone: Option<String>,
    pub company: Option<String>,
}

/// What the client fills in alongside their slot selection.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BookingDetails {
    pub client_id: Ulid,
    pub request_type: RequestType,
    pub location: String,
    pub contact: ContactDetails,
    pub notes: Option<String>,
}

/// A finalized request, ready for the booking collaborator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BookingRequest {
    pub course_id: Ulid,
    pub trainer_id: Ulid,
    pub client_id: Ulid,
    pub request_type: RequestType,
    pub requested_date: CalendarDate,
    pub end_date: Option<CalendarDate>,
    pub trainer_availability_id: Option<Ulid>,
    pub location: String,
    pub status: BookingStatus,
    pub contact: ContactDetails,
    pub notes: Option<String>,
    pub slots: Vec<SelectedSlot>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BookingReceipt {
    pub request_id: Ulid,
}
