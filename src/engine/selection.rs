use tracing::debug;

use crate::limits::{MAX_FIELD_LEN, MAX_SELECTED_SLOTS};
use crate::model::*;
use crate::observability;

use super::calendar::MonthView;
use super::runs::{resolve_run, DateRun};
use super::slots::{classify_window, course_days, half_days, required_slots, slots_overlap};
use super::Rejection;

// ── Mode ──────────────────────────────────────────────────────────

/// How a course is picked on the calendar.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SelectionMode {
    /// Individual half-day (or full-day) slots until `required` are held.
    Slots { required: u32 },
    /// One contiguous run of `days` calendar days, chosen by start date.
    DateRun { days: u32 },
    /// The requirement could not be computed. Nothing is selectable.
    Blocked,
}

impl SelectionMode {
    pub fn for_course(trainer: &TrainerProfile, course: &CourseRequirement) -> Self {
        let slots = required_slots(course.duration, course.unit);
        let days = course_days(course.duration, course.unit);
        if slots == 0 || days == 0 {
            return SelectionMode::Blocked;
        }
        if trainer.scheduling == SchedulingType::FullDay || days > 1 {
            SelectionMode::DateRun { days }
        } else {
            SelectionMode::Slots { required: slots }
        }
    }

    /// Slots (or days) needed for completion; 0 when blocked.
    pub fn required(&self) -> u32 {
        match self {
            SelectionMode::Slots { required } => *required,
            SelectionMode::DateRun { days } => *days,
            SelectionMode::Blocked => 0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SelectionState {
    Blocked,
    Empty,
    PartiallySelected,
    Complete,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RunOutcome {
    Selected {
        run: DateRun,
        /// Contention on the start date, if anyone is queued.
        notice: Option<String>,
    },
    /// The start date was clicked again; the whole run was cleared.
    Deselected,
}

/// `min(100, round(100 * selected / required))`. A zero requirement is
/// trivially met.
pub fn calculate_progress(selected: u32, required: u32) -> u8 {
    if required == 0 {
        return 100;
    }
    let (s, r) = (selected as u64, required as u64);
    let pct = (200 * s + r) / (2 * r);
    pct.min(100) as u8
}

// ── Selection state machine ───────────────────────────────────────

/// A client's in-progress pick. Completion is always derived, never stored.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Selection {
    mode: SelectionMode,
    slots: Vec<SelectedSlot>,
    run_start: Option<CalendarDate>,
    /// Generation of the month view the current picks were made against.
    generation: Option<u64>,
}

impl Selection {
    pub fn new(mode: SelectionMode) -> Self {
        Self {
            mode,
            slots: Vec::new(),
            run_start: None,
            generation: None,
        }
    }

    pub fn mode(&self) -> SelectionMode {
        self.mode
    }

    pub fn slots(&self) -> &[SelectedSlot] {
        &self.slots
    }

    pub fn run_start(&self) -> Option<CalendarDate> {
        self.run_start
    }

    /// Progress units held: half-day slots in slot mode (a full day counts
    /// twice), dates in date-run mode.
    pub fn selected_count(&self) -> u32 {
        match self.mode {
            SelectionMode::Slots { .. } => self.slots.iter().map(|s| half_days(s.slot)).sum(),
            SelectionMode::DateRun { .. } | SelectionMode::Blocked => self.slots.len() as u32,
        }
    }

    pub fn progress(&self) -> u8 {
        match self.mode {
            SelectionMode::Blocked => 0,
            mode => calculate_progress(self.selected_count(), mode.required()),
        }
    }

    pub fn is_complete(&self) -> bool {
        match self.mode {
            SelectionMode::Blocked => false,
            SelectionMode::Slots { required } => self.selected_count() >= required,
            SelectionMode::DateRun { days } => {
                self.run_start.is_some() && self.selected_count() >= days
            }
        }
    }

    pub fn state(&self) -> SelectionState {
        if self.mode == SelectionMode::Blocked {
            SelectionState::Blocked
        } else if self.is_complete() {
            SelectionState::Complete
        } else if self.slots.is_empty() {
            SelectionState::Empty
        } else {
            SelectionState::PartiallySelected
        }
    }

    pub fn reset(&mut self) {
        self.slots.clear();
        self.run_start = None;
        self.generation = None;
    }

    /// Add one slot. Returns the contention notice for the date, if any.
    pub fn select_slot(
        &mut self,
        view: &MonthView,
        date: CalendarDate,
        slot: Slot,
    ) -> Result<Option<String>, Rejection> {
        match self.mode {
            SelectionMode::Blocked => return Err(rejected(Rejection::RequirementUnknown)),
            SelectionMode::DateRun { .. } => return Err(rejected(Rejection::WrongMode)),
            SelectionMode::Slots { .. } => {}
        }
        self.check_view(view)?;
        if !view.month.contains(date) {
            return Err(rejected(Rejection::OutsideMonth(date)));
        }
        if let Some(held) = self
            .slots
            .iter()
            .find(|s| s.date == date && slots_overlap(s.slot, slot))
        {
            return Err(rejected(if held.slot == slot {
                Rejection::AlreadySelected { date, slot }
            } else {
                Rejection::SlotOverlaps { date, slot }
            }));
        }
        if self.slots.len() >= MAX_SELECTED_SLOTS {
            return Err(rejected(Rejection::LimitExceeded("too many selected slots")));
        }

        let record = view
            .index
            .day(date)
            .and_then(|day| day.window(slot))
            .filter(|r| slot != Slot::FullDay || classify_window(r.start, r.end) == Slot::FullDay)
            .filter(|r| r.status.is_bookable())
            .ok_or_else(|| rejected(Rejection::SlotUnavailable { date, slot }))?;

        self.slots.push(SelectedSlot {
            date,
            slot,
            availability_id: Some(record.id),
        });
        self.generation = Some(view.generation);
        debug!(%date, ?slot, selected = self.slots.len(), "slot selected");
        Ok(view.contention.for_date(date).message())
    }

    /// Pick a contiguous run starting at `date`, replacing any current run.
    ///
    /// Clicking the current start date again clears the run. On rejection the
    /// selection is left exactly as it was.
    pub fn select_date_run(
        &mut self,
        view: &MonthView,
        date: CalendarDate,
    ) -> Result<RunOutcome, Rejection> {
        let days = match self.mode {
            SelectionMode::Blocked => return Err(rejected(Rejection::RequirementUnknown)),
            SelectionMode::Slots { .. } => return Err(rejected(Rejection::WrongMode)),
            SelectionMode::DateRun { days } => days,
        };
        if self.run_start == Some(date) {
            self.reset();
            debug!(%date, "date run deselected");
            return Ok(RunOutcome::Deselected);
        }
        self.check_view(view)?;
        if !view.month.contains(date) {
            return Err(rejected(Rejection::OutsideMonth(date)));
        }

        let run = resolve_run(&view.index, date, days).map_err(rejected)?;
        self.slots = run.to_selected_slots();
        self.run_start = Some(date);
        self.generation = Some(view.generation);
        debug!(%date, days, "date run selected");
        Ok(RunOutcome::Selected {
            run,
            notice: view.contention.for_date(date).message(),
        })
    }

    /// Drop one picked slot. In date-run mode this breaks the run, so the
    /// course is incomplete until a start date is picked again.
    pub fn remove_slot(&mut self, index: usize) -> Result<SelectedSlot, Rejection> {
        if index >= self.slots.len() {
            return Err(Rejection::NoSuchSlot(index));
        }
        let removed = self.slots.remove(index);
        if matches!(self.mode, SelectionMode::DateRun { .. }) {
            self.run_start = None;
        }
        if self.slots.is_empty() {
            self.reset();
        }
        Ok(removed)
    }

    /// Assemble the request for the booking collaborator. Only a complete
    /// selection with the required contact fields gets through.
    pub fn build_request(
        &self,
        trainer: &TrainerProfile,
        course: &CourseRequirement,
        details: BookingDetails,
    ) -> Result<BookingRequest, Rejection> {
        if self.mode == SelectionMode::Blocked {
            return Err(rejected(Rejection::RequirementUnknown));
        }
        if !self.is_complete() {
            return Err(rejected(Rejection::Incomplete {
                selected: self.selected_count(),
                required: self.mode.required(),
            }));
        }
        validate_details(&details).map_err(rejected)?;

        let mut slots = self.slots.clone();
        slots.sort_by_key(|s| (s.date, s.slot));
        let (Some(first), Some(last)) = (slots.first(), slots.last()) else {
            return Err(rejected(Rejection::Incomplete {
                selected: 0,
                required: self.mode.required(),
            }));
        };
        let requested_date = first.date;
        let end_date = (last.date != first.date).then_some(last.date);
        let trainer_availability_id = first.availability_id;

        Ok(BookingRequest {
            course_id: course.course_id,
            trainer_id: trainer.id,
            client_id: details.client_id,
            request_type: details.request_type,
            requested_date,
            end_date,
            trainer_availability_id,
            location: details.location.trim().to_string(),
            status: BookingStatus::Pending,
            contact: details.contact,
            notes: details.notes,
            slots,
        })
    }

    fn check_view(&self, view: &MonthView) -> Result<(), Rejection> {
        match self.generation {
            Some(g) if g != view.generation && !self.slots.is_empty() => {
                Err(rejected(Rejection::StaleView))
            }
            _ => Ok(()),
        }
    }
}

fn validate_details(details: &BookingDetails) -> Result<(), Rejection> {
    let required = [
        ("location", details.location.as_str()),
        ("contact name", details.contact.name.as_str()),
        ("contact email", details.contact.email.as_str()),
    ];
    for (field, value) in required {
        if value.trim().is_empty() {
            return Err(Rejection::MissingField(field));
        }
    }
    if !details.contact.email.contains('@') {
        return Err(Rejection::MissingField("contact email"));
    }
    let optional = [
        details.contact.phone.as_deref(),
        details.contact.company.as_deref(),
        details.notes.as_deref(),
    ];
    let too_long = required
        .iter()
        .map(|(_, v)| *v)
        .chain(optional.into_iter().flatten())
        .any(|v| v.len() > MAX_FIELD_LEN);
    if too_long {
        return Err(Rejection::LimitExceeded("field too long"));
    }
    Ok(())
}

fn rejected(r: Rejection) -> Rejection {
    metrics::counter!(observability::REJECTIONS_TOTAL, "reason" => observability::rejection_label(&r))
        .increment(1);
    debug!("selection rejected: {r}");
    r
}
