use std::net::SocketAddr;

use crate::engine::Rejection;

// ── Fetch path ──────────────────────────────────────────────────

/// Counter: availability fetches issued.
pub const FETCHES_TOTAL: &str = "slotcal_fetches_total";

/// Counter: fetches that failed at the collaborator.
pub const FETCH_FAILURES_TOTAL: &str = "slotcal_fetch_failures_total";

/// Counter: fetches discarded because a newer month was requested.
pub const FETCHES_SUPERSEDED_TOTAL: &str = "slotcal_fetches_superseded_total";

/// Histogram: time to index and project one month, in seconds.
pub const PROJECTION_DURATION_SECONDS: &str = "slotcal_projection_duration_seconds";

/// Histogram: records received per fetch.
pub const FETCH_RECORDS: &str = "slotcal_fetch_records";

// ── Selection / submission ──────────────────────────────────────

/// Counter: rejected selection or submission attempts. Labels: reason.
pub const REJECTIONS_TOTAL: &str = "slotcal_rejections_total";

/// Counter: booking requests handed to the collaborator. Labels: status.
pub const SUBMISSIONS_TOTAL: &str = "slotcal_submissions_total";

/// Install Prometheus metrics exporter on the given port. No-op if port is None.
pub fn init(port: Option<u16>) {
    let Some(port) = port else { return };
    let addr: SocketAddr = ([0, 0, 0, 0], port).into();
    match metrics_exporter_prometheus::PrometheusBuilder::new()
        .with_http_listener(addr)
        .install()
    {
        Ok(()) => tracing::info!("metrics endpoint: http://0.0.0.0:{port}/metrics"),
        Err(e) => tracing::error!("failed to install Prometheus exporter: {e}"),
    }
}

/// Map a Rejection variant to a short label for metrics.
pub fn rejection_label(r: &Rejection) -> &'static str {
    match r {
        Rejection::RequirementUnknown => "requirement_unknown",
        Rejection::InsufficientDays { .. } => "insufficient_days",
        Rejection::SlotUnavailable { .. } => "slot_unavailable",
        Rejection::OutsideMonth(_) => "outside_month",
        Rejection::AlreadySelected { .. } => "already_selected",
        Rejection::SlotOverlaps { .. } => "slot_overlaps",
        Rejection::WrongMode => "wrong_mode",
        Rejection::StaleView => "stale_view",
        Rejection::NoSuchSlot(_) => "no_such_slot",
        Rejection::Incomplete { .. } => "incomplete",
        Rejection::MissingField(_) => "missing_field",
        Rejection::LimitExceeded(_) => "limit_exceeded",
    }
}
