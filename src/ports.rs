//! The two I/O boundaries of the engine: reading a trainer's calendar and
//! handing off a finished booking request. Everything else is pure.

use async_trait::async_trait;
use ulid::Ulid;

use crate::engine::ContentionCounts;
use crate::model::*;

/// Read side: the trainer-calendar and booking-request stores.
#[async_trait]
pub trait AvailabilitySource: Send + Sync {
    /// Records for `trainer_id` dated within `[start, end]`, already normalized.
    async fn get_availability(
        &self,
        trainer_id: Ulid,
        start: CalendarDate,
        end: CalendarDate,
    ) -> Result<Vec<AvailabilityRecord>, PortError>;

    /// Pending and tentative request tallies per date within `[start, end]`.
    async fn get_contention_counts(
        &self,
        trainer_id: Ulid,
        start: CalendarDate,
        end: CalendarDate,
    ) -> Result<ContentionCounts, PortError>;
}

/// Write side: the booking-request collaborator.
#[async_trait]
pub trait BookingSink: Send + Sync {
    async fn create_booking_request(
        &self,
        request: &BookingRequest,
    ) -> Result<BookingReceipt, PortError>;
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PortError {
    Unavailable(String),
    Rejected { status: u16, message: String },
    Malformed(String),
}

impl std::fmt::Display for PortError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PortError::Unavailable(msg) => write!(f, "collaborator unavailable: {msg}"),
            PortError::Rejected { status, message } => {
                write!(f, "collaborator rejected request ({status}): {message}")
            }
            PortError::Malformed(msg) => write!(f, "malformed response: {msg}"),
        }
    }
}

impl std::error::Error for PortError {}
