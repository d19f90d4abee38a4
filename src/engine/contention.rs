use std::collections::BTreeMap;

use serde::Serialize;

use crate::model::CalendarDate;

/// Queue ahead of a prospective client on one date. Advisory only.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct Contention {
    pub pending: u32,
    pub tentative: u32,
}

impl Contention {
    pub fn is_empty(&self) -> bool {
        self.pending == 0 && self.tentative == 0
    }

    /// Informational text for a client picking this date, or `None` when
    /// nobody is queued.
    pub fn message(&self) -> Option<String> {
        let mut parts = Vec::with_capacity(2);
        if self.pending > 0 {
            parts.push(format!(
                "{} pending request(s) before you for this date.",
                self.pending
            ));
        }
        if self.tentative > 0 {
            parts.push(format!(
                "{} tentative booking(s) already held on this date.",
                self.tentative
            ));
        }
        (!parts.is_empty()).then(|| parts.join(" "))
    }
}

/// Pending and tentative request tallies, keyed by date.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ContentionCounts {
    pending: BTreeMap<CalendarDate, u32>,
    tentative: BTreeMap<CalendarDate, u32>,
}

impl ContentionCounts {
    pub fn new(
        pending: BTreeMap<CalendarDate, u32>,
        tentative: BTreeMap<CalendarDate, u32>,
    ) -> Self {
        Self { pending, tentative }
    }

    pub fn set_pending(&mut self, date: CalendarDate, count: u32) {
        self.pending.insert(date, count);
    }

    pub fn set_tentative(&mut self, date: CalendarDate, count: u32) {
        self.tentative.insert(date, count);
    }

    pub fn for_date(&self, date: CalendarDate) -> Contention {
        Contention {
            pending: self.pending.get(&date).copied().unwrap_or(0),
            tentative: self.tentative.get(&date).copied().unwrap_or(0),
        }
    }

    /// Dates with any queued request, ascending.
    pub fn contended_dates(&self) -> Vec<CalendarDate> {
        let mut dates: Vec<CalendarDate> = self
            .pending
            .iter()
            .chain(self.tentative.iter())
            .filter(|(_, n)| **n > 0)
            .map(|(d, _)| *d)
            .collect();
        dates.sort();
        dates.dedup();
        dates
    }
}
