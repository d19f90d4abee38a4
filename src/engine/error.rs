use crate::model::{CalendarDate, Slot};
use crate::ports::PortError;

/// A user-facing validation failure. Selection state is left untouched.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Rejection {
    /// Course duration is missing or zero; nothing can be booked.
    RequirementUnknown,
    InsufficientDays {
        required: u32,
        missing: Vec<CalendarDate>,
    },
    SlotUnavailable {
        date: CalendarDate,
        slot: Slot,
    },
    OutsideMonth(CalendarDate),
    AlreadySelected {
        date: CalendarDate,
        slot: Slot,
    },
    /// A full-day pick and a half-day pick on the same date.
    SlotOverlaps {
        date: CalendarDate,
        slot: Slot,
    },
    /// Slot pick on a date-run course, or the reverse.
    WrongMode,
    /// The visible month was replaced since this selection started.
    StaleView,
    NoSuchSlot(usize),
    Incomplete {
        selected: u32,
        required: u32,
    },
    MissingField(&'static str),
    LimitExceeded(&'static str),
}

impl std::fmt::Display for Rejection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Rejection::RequirementUnknown => {
                write!(f, "This course has no duration on file, so it cannot be requested.")
            }
            Rejection::InsufficientDays { required, .. } => write!(
                f,
                "This course requires {required} day(s), and some dates are not available."
            ),
            Rejection::SlotUnavailable { date, slot } => {
                write!(f, "The {} slot on {date} is not available.", slot_label(*slot))
            }
            Rejection::OutsideMonth(date) => {
                write!(f, "{date} is outside the month being shown.")
            }
            Rejection::AlreadySelected { date, slot } => {
                write!(f, "The {} slot on {date} is already selected.", slot_label(*slot))
            }
            Rejection::SlotOverlaps { date, slot } => write!(
                f,
                "The {} slot on {date} overlaps a slot you already selected.",
                slot_label(*slot)
            ),
            Rejection::WrongMode => write!(f, "This course is booked by start date, not by slot."),
            Rejection::StaleView => {
                write!(f, "Availability was refreshed; please make your selection again.")
            }
            Rejection::NoSuchSlot(i) => write!(f, "no selected slot at position {i}"),
            Rejection::Incomplete { selected, required } => write!(
                f,
                "Please select {required} slot(s) before submitting ({selected} selected)."
            ),
            Rejection::MissingField(field) => write!(f, "Please fill in the {field} field."),
            Rejection::LimitExceeded(msg) => write!(f, "limit exceeded: {msg}"),
        }
    }
}

impl std::error::Error for Rejection {}

fn slot_label(slot: Slot) -> &'static str {
    match slot {
        Slot::Morning => "morning",
        Slot::Afternoon => "afternoon",
        Slot::FullDay => "full-day",
    }
}

#[derive(Debug)]
pub enum EngineError {
    /// Fetch or submit failed at the collaborator boundary. Never retried here.
    Transport(PortError),
    /// Submission refused before reaching the collaborator.
    Blocked(Rejection),
    LimitExceeded(&'static str),
}

impl std::fmt::Display for EngineError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            EngineError::Transport(e) => write!(f, "transport error: {e}"),
            EngineError::Blocked(r) => write!(f, "submission blocked: {r}"),
            EngineError::LimitExceeded(msg) => write!(f, "limit exceeded: {msg}"),
        }
    }
}

impl std::error::Error for EngineError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            EngineError::Transport(e) => Some(e),
            EngineError::Blocked(r) => Some(r),
            EngineError::LimitExceeded(_) => None,
        }
    }
}

impl From<PortError> for EngineError {
    fn from(e: PortError) -> Self {
        EngineError::Transport(e)
    }
}
