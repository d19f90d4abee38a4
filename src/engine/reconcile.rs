use std::collections::BTreeMap;
use std::fmt;

use crate::model::*;

use super::slots::classify_window;

// ── Per-date record set ───────────────────────────────────────────

/// All availability records for one date, kept sorted by window start.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DayRecords {
    records: Vec<AvailabilityRecord>,
}

impl DayRecords {
    /// Insert record maintaining sort order by start time.
    pub fn insert(&mut self, record: AvailabilityRecord) {
        let pos = self
            .records
            .partition_point(|r| r.start <= record.start);
        self.records.insert(pos, record);
    }

    pub fn records(&self) -> &[AvailabilityRecord] {
        &self.records
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// The record covering `slot`. A full-day record covers both halves.
    pub fn window(&self, slot: Slot) -> Option<&AvailabilityRecord> {
        let exact = self
            .records
            .iter()
            .find(|r| classify_window(r.start, r.end) == slot);
        match slot {
            Slot::FullDay => exact.or_else(|| self.records.first()),
            Slot::Morning | Slot::Afternoon => exact.or_else(|| {
                self.records
                    .iter()
                    .find(|r| classify_window(r.start, r.end) == Slot::FullDay)
            }),
        }
    }

    pub fn window_status(&self, slot: Slot) -> Option<RawStatus> {
        self.window(slot).map(|r| r.status)
    }

    /// First record a client could request (available or tentative).
    pub fn first_bookable(&self) -> Option<&AvailabilityRecord> {
        self.records.iter().find(|r| r.status.is_bookable())
    }

    pub fn has_bookable_window(&self) -> bool {
        self.first_bookable().is_some()
    }
}

/// Per-date availability for the range that was last fetched.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AvailabilityIndex {
    days: BTreeMap<CalendarDate, DayRecords>,
}

impl AvailabilityIndex {
    pub fn from_records(records: impl IntoIterator<Item = AvailabilityRecord>) -> Self {
        let mut days: BTreeMap<CalendarDate, DayRecords> = BTreeMap::new();
        for record in records {
            days.entry(record.date).or_default().insert(record);
        }
        Self { days }
    }

    pub fn day(&self, date: CalendarDate) -> Option<&DayRecords> {
        self.days.get(&date)
    }

    pub fn status(&self, date: CalendarDate, scheduling: SchedulingType) -> DateStatus {
        reconcile(self.day(date), scheduling)
    }

    pub fn date_count(&self) -> usize {
        self.days.len()
    }

    pub fn record_count(&self) -> usize {
        self.days.values().map(|d| d.records.len()).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.days.is_empty()
    }
}

// ── Reconciliation ────────────────────────────────────────────────

/// Derive one status for a date from its raw records.
pub fn reconcile(day: Option<&DayRecords>, scheduling: SchedulingType) -> DateStatus {
    let Some(day) = day.filter(|d| !d.is_empty()) else {
        return DateStatus::Unavailable;
    };
    match scheduling {
        SchedulingType::FullDay => day
            .window(Slot::FullDay)
            .map_or(DateStatus::Unavailable, |r| r.status.into()),
        SchedulingType::SlotBased => reconcile_halves(
            day.window_status(Slot::Morning),
            day.window_status(Slot::Afternoon),
        ),
    }
}

/// Precedence: available > tentative > booked. An absent half counts as
/// booked, but a date with neither half on file is unavailable.
pub fn reconcile_halves(morning: Option<RawStatus>, afternoon: Option<RawStatus>) -> DateStatus {
    use RawStatus::*;
    match (morning, afternoon) {
        (None, None) => DateStatus::Unavailable,
        (Some(Available), _) | (_, Some(Available)) => DateStatus::Available,
        (Some(Tentative), _) | (_, Some(Tentative)) => DateStatus::Tentative,
        (Some(Booked) | None, Some(Booked) | None) => DateStatus::Booked,
        (Some(Unavailable), _) | (_, Some(Unavailable)) => DateStatus::Unavailable,
    }
}

// ── Half-day indicator ────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Glyph {
    Open,
    Warning,
    Closed,
}

impl Glyph {
    pub fn from_status(status: Option<RawStatus>) -> Self {
        match status {
            Some(RawStatus::Available) => Glyph::Open,
            Some(RawStatus::Tentative) => Glyph::Warning,
            Some(RawStatus::Booked | RawStatus::Unavailable) | None => Glyph::Closed,
        }
    }

    pub fn as_char(self) -> char {
        match self {
            Glyph::Open => '✓',
            Glyph::Warning => '~',
            Glyph::Closed => '✗',
        }
    }
}

/// Two-glyph summary for slot-based trainers: morning then afternoon.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SlotIndicator {
    pub morning: Glyph,
    pub afternoon: Glyph,
}

impl fmt::Display for SlotIndicator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.morning.as_char(), self.afternoon.as_char())
    }
}

pub fn indicator(day: Option<&DayRecords>) -> SlotIndicator {
    let status = |slot| day.and_then(|d| d.window_status(slot));
    SlotIndicator {
        morning: Glyph::from_status(status(Slot::Morning)),
        afternoon: Glyph::from_status(status(Slot::Afternoon)),
    }
}
