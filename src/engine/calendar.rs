use crate::model::*;

use super::contention::{Contention, ContentionCounts};
use super::reconcile::{indicator, AvailabilityIndex, SlotIndicator};

// ── Month grid ────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DayCell {
    pub date: CalendarDate,
    /// Padding days from the previous month are rendered but never interactive.
    pub in_month: bool,
    pub status: DateStatus,
    pub contention: Contention,
    /// Half-day summary; slot-based trainers only.
    pub indicator: Option<SlotIndicator>,
}

impl DayCell {
    pub fn is_selectable(&self) -> bool {
        self.in_month && self.status.is_selectable()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MonthGrid {
    pub month: YearMonth,
    pub cells: Vec<DayCell>,
}

impl MonthGrid {
    /// Rows of seven, Sunday first. The last row may be short.
    pub fn weeks(&self) -> impl Iterator<Item = &[DayCell]> {
        self.cells.chunks(7)
    }

    pub fn cell(&self, date: CalendarDate) -> Option<&DayCell> {
        self.cells.iter().find(|c| c.date == date)
    }

    pub fn leading_padding(&self) -> usize {
        self.cells.iter().take_while(|c| !c.in_month).count()
    }
}

/// First cell of the grid: the Sunday on or before the 1st.
pub fn grid_start(month: YearMonth) -> CalendarDate {
    let first = month.first_day();
    first
        .sub_days(first.weekday_from_sunday() as u64)
        .unwrap_or(first)
}

/// Build the visible grid for `month`, one cell per date from the leading
/// Sunday through the last day of the month.
pub fn project(
    month: YearMonth,
    scheduling: SchedulingType,
    index: &AvailabilityIndex,
    contention: &ContentionCounts,
) -> MonthGrid {
    let last = month.last_day();
    let mut cells = Vec::with_capacity(42);
    let mut cursor = Some(grid_start(month));

    while let Some(date) = cursor.filter(|d| *d <= last) {
        let cell = if month.contains(date) {
            DayCell {
                date,
                in_month: true,
                status: index.status(date, scheduling),
                contention: contention.for_date(date),
                indicator: match scheduling {
                    SchedulingType::SlotBased => Some(indicator(index.day(date))),
                    SchedulingType::FullDay => None,
                },
            }
        } else {
            DayCell {
                date,
                in_month: false,
                status: DateStatus::Unavailable,
                contention: Contention::default(),
                indicator: None,
            }
        };
        cells.push(cell);
        cursor = date.succ();
    }

    MonthGrid { month, cells }
}

// ── Month view ────────────────────────────────────────────────────

/// Everything fetched and derived for one visible month. Replaced wholesale
/// on every applied fetch.
#[derive(Debug, Clone)]
pub struct MonthView {
    pub generation: u64,
    pub month: YearMonth,
    pub trainer: TrainerProfile,
    pub index: AvailabilityIndex,
    pub contention: ContentionCounts,
    pub grid: MonthGrid,
}

impl MonthView {
    pub fn build(
        generation: u64,
        month: YearMonth,
        trainer: TrainerProfile,
        index: AvailabilityIndex,
        contention: ContentionCounts,
    ) -> Self {
        let grid = project(month, trainer.scheduling, &index, &contention);
        Self {
            generation,
            month,
            trainer,
            index,
            contention,
            grid,
        }
    }

    pub fn status(&self, date: CalendarDate) -> DateStatus {
        self.index.status(date, self.trainer.scheduling)
    }
}
