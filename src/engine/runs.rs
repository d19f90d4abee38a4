use tracing::debug;
use ulid::Ulid;

use crate::limits::MAX_COURSE_DAYS;
use crate::model::*;

use super::reconcile::AvailabilityIndex;
use super::Rejection;

// ── Multi-day runs ────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RunDay {
    pub date: CalendarDate,
    /// First available/tentative record on that date.
    pub availability_id: Ulid,
}

/// `N` consecutive calendar days, each with a bookable window.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DateRun {
    days: Vec<RunDay>,
}

impl DateRun {
    pub fn days(&self) -> &[RunDay] {
        &self.days
    }

    pub fn len(&self) -> usize {
        self.days.len()
    }

    pub fn is_empty(&self) -> bool {
        self.days.is_empty()
    }

    pub fn start(&self) -> Option<CalendarDate> {
        self.days.first().map(|d| d.date)
    }

    pub fn end(&self) -> Option<CalendarDate> {
        self.days.last().map(|d| d.date)
    }

    /// One full-day slot per claimed date.
    pub fn to_selected_slots(&self) -> Vec<SelectedSlot> {
        self.days
            .iter()
            .map(|d| SelectedSlot {
                date: d.date,
                slot: Slot::FullDay,
                availability_id: Some(d.availability_id),
            })
            .collect()
    }
}

/// Check that `days` consecutive dates from `start` each have at least one
/// available or tentative window.
///
/// All-or-nothing: if any date fails, the whole run is rejected and the
/// failing dates are listed. The index must cover the lookahead past the end
/// of the visible month.
pub fn resolve_run(
    index: &AvailabilityIndex,
    start: CalendarDate,
    days: u32,
) -> Result<DateRun, Rejection> {
    if days == 0 {
        return Err(Rejection::RequirementUnknown);
    }
    if days > MAX_COURSE_DAYS {
        return Err(Rejection::LimitExceeded("course spans too many days"));
    }

    let mut run = Vec::with_capacity(days as usize);
    let mut missing = Vec::new();
    let mut cursor = Some(start);

    for _ in 0..days {
        let Some(date) = cursor else {
            // Ran off the end of the calendar; nothing further is bookable.
            break;
        };
        match index.day(date).and_then(|d| d.first_bookable()) {
            Some(record) => run.push(RunDay {
                date,
                availability_id: record.id,
            }),
            None => missing.push(date),
        }
        cursor = date.succ();
    }

    if !missing.is_empty() || run.len() != days as usize {
        debug!(%start, days, missing = missing.len(), "date run rejected");
        return Err(Rejection::InsufficientDays {
            required: days,
            missing,
        });
    }
    Ok(DateRun { days: run })
}
