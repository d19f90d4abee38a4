mod calendar;
mod contention;
mod error;
mod reconcile;
mod runs;
mod selection;
mod slots;
#[cfg(test)]
mod tests;

pub use calendar::{grid_start, project, DayCell, MonthGrid, MonthView};
pub use contention::{Contention, ContentionCounts};
pub use error::{EngineError, Rejection};
pub use reconcile::{
    indicator, reconcile, reconcile_halves, AvailabilityIndex, DayRecords, Glyph, SlotIndicator,
};
pub use runs::{resolve_run, DateRun, RunDay};
pub use selection::{calculate_progress, RunOutcome, Selection, SelectionMode, SelectionState};
pub use slots::{
    classify_window, course_days, half_days, parse_duration, required_slots, slot_window,
    slots_overlap, SlotWindow, HOURS_PER_DAY, HOURS_PER_SLOT,
};

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use tokio::sync::RwLock;
use tracing::{debug, info, warn};

use crate::limits::*;
use crate::model::*;
use crate::notify::{ViewEvent, ViewHub};
use crate::observability;
use crate::ports::{AvailabilitySource, BookingSink};

/// Result of a month fetch.
#[derive(Debug, Clone)]
pub enum Load {
    Applied(Arc<MonthView>),
    /// A later request started before this one finished; its data was dropped.
    Superseded,
}

/// One trainer's calendar as seen by one prospective client for one course.
///
/// Pure apart from the two injected ports. The visible month is replaced
/// wholesale on every applied fetch, last request wins.
pub struct Engine {
    trainer: TrainerProfile,
    course: CourseRequirement,
    source: Arc<dyn AvailabilitySource>,
    sink: Arc<dyn BookingSink>,
    pub notify: Arc<ViewHub>,
    view: RwLock<Option<Arc<MonthView>>>,
    generation: AtomicU64,
}

impl Engine {
    pub fn new(
        trainer: TrainerProfile,
        course: CourseRequirement,
        source: Arc<dyn AvailabilitySource>,
        sink: Arc<dyn BookingSink>,
        notify: Arc<ViewHub>,
    ) -> Self {
        Self {
            trainer,
            course,
            source,
            sink,
            notify,
            view: RwLock::new(None),
            generation: AtomicU64::new(0),
        }
    }

    pub fn trainer(&self) -> &TrainerProfile {
        &self.trainer
    }

    pub fn course(&self) -> &CourseRequirement {
        &self.course
    }

    pub fn selection_mode(&self) -> SelectionMode {
        SelectionMode::for_course(&self.trainer, &self.course)
    }

    pub fn new_selection(&self) -> Selection {
        Selection::new(self.selection_mode())
    }

    /// Date range to fetch for `month`: the first padding day through the
    /// month's last day, plus enough lookahead for a run starting on the 31st.
    pub fn fetch_window(&self, month: YearMonth) -> Result<(CalendarDate, CalendarDate), EngineError> {
        let lookahead = course_days(self.course.duration, self.course.unit)
            .saturating_sub(1)
            .min(MAX_COURSE_DAYS);
        let start = grid_start(month);
        let end = month
            .last_day()
            .add_days(lookahead as u64)
            .ok_or(EngineError::LimitExceeded("date out of range"))?;
        Ok((start, end))
    }

    /// Fetch and project `month`, replacing the current view.
    ///
    /// Once a later call has started, this one resolves to `Load::Superseded`
    /// whatever its own fetch returned, errors included.
    pub async fn load_month(&self, month: YearMonth) -> Result<Load, EngineError> {
        let generation = self.generation.fetch_add(1, Ordering::SeqCst) + 1;
        let (start, end) = self.fetch_window(month)?;
        metrics::counter!(observability::FETCHES_TOTAL).increment(1);
        debug!(%month, %start, %end, generation, "fetching availability");

        let fetched = tokio::try_join!(
            self.source.get_availability(self.trainer.id, start, end),
            self.source.get_contention_counts(self.trainer.id, start, end),
        );
        let (records, contention) = match fetched {
            Ok(pair) => pair,
            Err(e) => {
                metrics::counter!(observability::FETCH_FAILURES_TOTAL).increment(1);
                if self.is_superseded(generation) {
                    warn!(%month, generation, "superseded availability fetch failed: {e}");
                    return Ok(Load::Superseded);
                }
                warn!(%month, "availability fetch failed: {e}");
                return Err(EngineError::Transport(e));
            }
        };
        metrics::histogram!(observability::FETCH_RECORDS).record(records.len() as f64);
        if records.len() > MAX_RECORDS_PER_FETCH {
            if self.is_superseded(generation) {
                return Ok(Load::Superseded);
            }
            return Err(EngineError::LimitExceeded("too many availability records"));
        }

        let projection_start = std::time::Instant::now();
        let trainer_id = self.trainer.id;
        let index = AvailabilityIndex::from_records(
            records
                .into_iter()
                .filter(|r| r.trainer_id == trainer_id && r.date >= start && r.date <= end),
        );
        let view = Arc::new(MonthView::build(
            generation,
            month,
            self.trainer,
            index,
            contention,
        ));
        metrics::histogram!(observability::PROJECTION_DURATION_SECONDS)
            .record(projection_start.elapsed().as_secs_f64());

        let mut current = self.view.write().await;
        if self.is_superseded(generation) {
            warn!(%month, generation, "discarding superseded availability fetch");
            return Ok(Load::Superseded);
        }
        *current = Some(view.clone());
        drop(current);

        info!(
            %month,
            generation,
            records = view.index.record_count(),
            "month view applied"
        );
        self.notify
            .send(self.trainer.id, ViewEvent::MonthReplaced { month, generation });
        Ok(Load::Applied(view))
    }

    /// A later `load_month` has started since `generation` was issued.
    /// Counted, since every caller discards its result.
    fn is_superseded(&self, generation: u64) -> bool {
        let stale = self.generation.load(Ordering::SeqCst) != generation;
        if stale {
            metrics::counter!(observability::FETCHES_SUPERSEDED_TOTAL).increment(1);
        }
        stale
    }

    pub async fn current_view(&self) -> Option<Arc<MonthView>> {
        self.view.read().await.clone()
    }

    /// Hand a complete selection to the booking collaborator.
    ///
    /// Called once per client action; no retry, no dedup. On failure the
    /// caller still holds the selection and may resubmit.
    pub async fn submit(
        &self,
        selection: &Selection,
        details: BookingDetails,
    ) -> Result<BookingReceipt, EngineError> {
        let request = selection
            .build_request(&self.trainer, &self.course, details)
            .map_err(EngineError::Blocked)?;

        match self.sink.create_booking_request(&request).await {
            Ok(receipt) => {
                metrics::counter!(observability::SUBMISSIONS_TOTAL, "status" => "ok").increment(1);
                info!(
                    request_id = %receipt.request_id,
                    requested_date = %request.requested_date,
                    "booking request submitted"
                );
                self.notify.send(
                    self.trainer.id,
                    ViewEvent::Submitted {
                        request_id: receipt.request_id,
                    },
                );
                Ok(receipt)
            }
            Err(e) => {
                metrics::counter!(observability::SUBMISSIONS_TOTAL, "status" => "error")
                    .increment(1);
                warn!("booking request failed: {e}");
                Err(EngineError::Transport(e))
            }
        }
    }
}
