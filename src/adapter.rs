//! Mapping between the upstream REST shapes and the canonical model.
//!
//! Upstream mixes snake_case and camelCase and sends timestamps with more
//! precision than we use. All of that stops here.

use std::collections::{BTreeMap, HashMap};

use serde::{Deserialize, Serialize};
use tracing::warn;
use ulid::Ulid;

use crate::engine::ContentionCounts;
use crate::model::*;

// ── Inbound ───────────────────────────────────────────────────────

#[derive(Debug, Clone, Deserialize)]
pub struct RawAvailability {
    #[serde(alias = "availabilityId", alias = "availability_id")]
    pub id: String,
    #[serde(default, alias = "trainerId")]
    pub trainer_id: Option<String>,
    pub date: String,
    #[serde(alias = "startTime")]
    pub start_time: String,
    #[serde(alias = "endTime")]
    pub end_time: String,
    #[serde(default)]
    pub status: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawContention {
    #[serde(default, alias = "pendingCounts")]
    pub pending_counts: HashMap<String, i64>,
    #[serde(default, alias = "tentativeCounts")]
    pub tentative_counts: HashMap<String, i64>,
}

/// Upper-case and match; anything unknown fails closed.
pub fn parse_status(raw: &str) -> RawStatus {
    match raw.trim().to_ascii_uppercase().as_str() {
        "AVAILABLE" => RawStatus::Available,
        "TENTATIVE" => RawStatus::Tentative,
        "BOOKED" => RawStatus::Booked,
        _ => RawStatus::Unavailable,
    }
}

/// Normalize one upstream row. `None` when the id, date or times are unusable.
pub fn normalize_record(raw: &RawAvailability, fallback_trainer: Ulid) -> Option<AvailabilityRecord> {
    let id = Ulid::from_string(raw.id.trim()).ok()?;
    let trainer_id = match raw.trainer_id.as_deref() {
        Some(t) => Ulid::from_string(t.trim()).ok()?,
        None => fallback_trainer,
    };
    let date = CalendarDate::parse(&raw.date)?;
    let start = ClockTime::parse(&raw.start_time)?;
    let end = ClockTime::parse(&raw.end_time)?;
    if end <= start {
        return None;
    }
    Some(AvailabilityRecord {
        id,
        trainer_id,
        date,
        start,
        end,
        status: parse_status(&raw.status),
    })
}

pub fn normalize_availability(
    raw: &[RawAvailability],
    fallback_trainer: Ulid,
) -> Vec<AvailabilityRecord> {
    raw.iter()
        .filter_map(|r| {
            let record = normalize_record(r, fallback_trainer);
            if record.is_none() {
                warn!(id = %r.id, date = %r.date, "dropping unusable availability record");
            }
            record
        })
        .collect()
}

pub fn normalize_contention(raw: &RawContention) -> ContentionCounts {
    ContentionCounts::new(
        normalize_counts(&raw.pending_counts),
        normalize_counts(&raw.tentative_counts),
    )
}

fn normalize_counts(raw: &HashMap<String, i64>) -> BTreeMap<CalendarDate, u32> {
    raw.iter()
        .filter_map(|(date, count)| {
            let Some(date) = CalendarDate::parse(date) else {
                warn!(%date, "dropping contention count with bad date");
                return None;
            };
            Some((date, u32::try_from((*count).max(0)).unwrap_or(u32::MAX)))
        })
        .collect()
}

/// A canned calendar: one trainer's records and queue counts.
#[derive(Debug, Clone, Deserialize)]
pub struct AvailabilityFixture {
    #[serde(alias = "trainerId")]
    pub trainer_id: String,
    #[serde(default)]
    pub availability: Vec<RawAvailability>,
    #[serde(default, alias = "pendingCounts")]
    pub pending_counts: HashMap<String, i64>,
    #[serde(default, alias = "tentativeCounts")]
    pub tentative_counts: HashMap<String, i64>,
}

impl AvailabilityFixture {
    pub fn contention(&self) -> RawContention {
        RawContention {
            pending_counts: self.pending_counts.clone(),
            tentative_counts: self.tentative_counts.clone(),
        }
    }
}

// ── Outbound ──────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PayloadSlot {
    pub date: String,
    pub slot: Slot,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub availability_id: Option<String>,
}

/// Body of `createBookingRequest`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BookingRequestPayload {
    pub course_id: String,
    pub trainer_id: String,
    pub client_id: String,
    pub request_type: RequestType,
    pub requested_date: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub end_date: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub trainer_availability_id: Option<String>,
    pub location: String,
    pub status: BookingStatus,
    pub contact_name: String,
    pub contact_email: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub contact_phone: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub company: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    pub selected_slots: Vec<PayloadSlot>,
}

impl From<&BookingRequest> for BookingRequestPayload {
    fn from(req: &BookingRequest) -> Self {
        Self {
            course_id: req.course_id.to_string(),
            trainer_id: req.trainer_id.to_string(),
            client_id: req.client_id.to_string(),
            request_type: req.request_type,
            requested_date: req.requested_date.to_string(),
            end_date: req.end_date.map(|d| d.to_string()),
            trainer_availability_id: req.trainer_availability_id.map(|id| id.to_string()),
            location: req.location.clone(),
            status: req.status,
            contact_name: req.contact.name.clone(),
            contact_email: req.contact.email.clone(),
            contact_phone: req.contact.phone.clone(),
            company: req.contact.company.clone(),
            notes: req.notes.clone(),
            selected_slots: req
                .slots
                .iter()
                .map(|s| PayloadSlot {
                    date: s.date.to_string(),
                    slot: s.slot,
                    availability_id: s.availability_id.map(|id| id.to_string()),
                })
                .collect(),
        }
    }
}
