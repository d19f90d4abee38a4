use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use dashmap::DashMap;
use tracing::info;
use ulid::Ulid;

use crate::adapter::{self, AvailabilityFixture, BookingRequestPayload};
use crate::engine::ContentionCounts;
use crate::model::*;
use crate::ports::{AvailabilitySource, BookingSink, PortError};

/// In-process stand-in for both collaborators. Backs the CLI and tests.
pub struct InMemoryPorts {
    availability: DashMap<Ulid, Vec<AvailabilityRecord>>,
    pending: DashMap<(Ulid, CalendarDate), u32>,
    tentative: DashMap<(Ulid, CalendarDate), u32>,
    /// Accepted requests, as they would have gone over the wire.
    submitted: DashMap<Ulid, BookingRequestPayload>,
    /// Artificial latency keyed by the first date of the requested range.
    delays: DashMap<CalendarDate, Duration>,
    fail_next_fetch: AtomicBool,
    fail_next_submit: AtomicBool,
}

impl Default for InMemoryPorts {
    fn default() -> Self {
        Self::new()
    }
}

impl InMemoryPorts {
    pub fn new() -> Self {
        Self {
            availability: DashMap::new(),
            pending: DashMap::new(),
            tentative: DashMap::new(),
            submitted: DashMap::new(),
            delays: DashMap::new(),
            fail_next_fetch: AtomicBool::new(false),
            fail_next_submit: AtomicBool::new(false),
        }
    }

    /// Load a JSON fixture through the boundary adapter. Returns its trainer id.
    pub fn load_fixture_json(&self, json: &str) -> Result<Ulid, PortError> {
        let fixture: AvailabilityFixture =
            serde_json::from_str(json).map_err(|e| PortError::Malformed(e.to_string()))?;
        let trainer_id = Ulid::from_string(fixture.trainer_id.trim())
            .map_err(|e| PortError::Malformed(format!("trainer id: {e}")))?;

        let records = adapter::normalize_availability(&fixture.availability, trainer_id);
        let counts = adapter::normalize_contention(&fixture.contention());
        info!(
            "loaded fixture for trainer {trainer_id}: {} records, {} contended dates",
            records.len(),
            counts.contended_dates().len()
        );
        for record in records {
            self.add_record(record);
        }
        for date in counts.contended_dates() {
            let c = counts.for_date(date);
            self.set_contention(trainer_id, date, c.pending, c.tentative);
        }
        Ok(trainer_id)
    }

    pub fn add_record(&self, record: AvailabilityRecord) {
        self.availability
            .entry(record.trainer_id)
            .or_default()
            .push(record);
    }

    /// Overwrite the status of every record with this id.
    pub fn set_status(&self, record_id: Ulid, status: RawStatus) {
        for mut entry in self.availability.iter_mut() {
            for record in entry.value_mut().iter_mut().filter(|r| r.id == record_id) {
                record.status = status;
            }
        }
    }

    pub fn set_contention(&self, trainer_id: Ulid, date: CalendarDate, pending: u32, tentative: u32) {
        self.pending.insert((trainer_id, date), pending);
        self.tentative.insert((trainer_id, date), tentative);
    }

    pub fn delay_range_starting(&self, start: CalendarDate, delay: Duration) {
        self.delays.insert(start, delay);
    }

    pub fn fail_next_fetch(&self) {
        self.fail_next_fetch.store(true, Ordering::SeqCst);
    }

    pub fn fail_next_submit(&self) {
        self.fail_next_submit.store(true, Ordering::SeqCst);
    }

    pub fn submitted(&self) -> Vec<BookingRequestPayload> {
        self.submitted.iter().map(|e| e.value().clone()).collect()
    }

    async fn simulate_latency(&self, start: CalendarDate) {
        let delay = self.delays.get(&start).map(|d| *d.value());
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }
    }
}

#[async_trait]
impl AvailabilitySource for InMemoryPorts {
    async fn get_availability(
        &self,
        trainer_id: Ulid,
        start: CalendarDate,
        end: CalendarDate,
    ) -> Result<Vec<AvailabilityRecord>, PortError> {
        self.simulate_latency(start).await;
        if self.fail_next_fetch.swap(false, Ordering::SeqCst) {
            return Err(PortError::Unavailable("availability store offline".into()));
        }
        Ok(self
            .availability
            .get(&trainer_id)
            .map(|records| {
                records
                    .iter()
                    .filter(|r| r.date >= start && r.date <= end)
                    .cloned()
                    .collect()
            })
            .unwrap_or_default())
    }

    async fn get_contention_counts(
        &self,
        trainer_id: Ulid,
        start: CalendarDate,
        end: CalendarDate,
    ) -> Result<ContentionCounts, PortError> {
        let mut counts = ContentionCounts::default();
        let in_range = |tid: Ulid, date: CalendarDate| tid == trainer_id && date >= start && date <= end;
        for entry in self.pending.iter() {
            let (tid, date) = *entry.key();
            if in_range(tid, date) {
                counts.set_pending(date, *entry.value());
            }
        }
        for entry in self.tentative.iter() {
            let (tid, date) = *entry.key();
            if in_range(tid, date) {
                counts.set_tentative(date, *entry.value());
            }
        }
        Ok(counts)
    }
}

#[async_trait]
impl BookingSink for InMemoryPorts {
    async fn create_booking_request(
        &self,
        request: &BookingRequest,
    ) -> Result<BookingReceipt, PortError> {
        if self.fail_next_submit.swap(false, Ordering::SeqCst) {
            return Err(PortError::Rejected {
                status: 503,
                message: "booking service unavailable".into(),
            });
        }
        let request_id = Ulid::new();
        self.submitted
            .insert(request_id, BookingRequestPayload::from(request));
        Ok(BookingReceipt { request_id })
    }
}
