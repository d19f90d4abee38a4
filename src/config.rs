use std::path::PathBuf;
use std::str::FromStr;

use tracing::warn;

use crate::model::{CalendarDate, DurationUnit, SchedulingType, YearMonth};

/// Startup settings for the `slotcal` binary, all from `SLOTCAL_*` env vars.
#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    pub fixture: Option<PathBuf>,
    pub month: Option<YearMonth>,
    pub scheduling: SchedulingType,
    pub duration: Option<f64>,
    pub unit: DurationUnit,
    pub select: Option<CalendarDate>,
    pub metrics_port: Option<u16>,
}

impl Config {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from any key lookup. Unparseable values are logged and treated
    /// as unset.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        Self {
            fixture: lookup("SLOTCAL_FIXTURE")
                .filter(|s| !s.trim().is_empty())
                .map(PathBuf::from),
            month: parsed(&lookup, "SLOTCAL_MONTH"),
            scheduling: parsed(&lookup, "SLOTCAL_SCHEDULING").unwrap_or(SchedulingType::SlotBased),
            duration: parsed(&lookup, "SLOTCAL_DURATION"),
            unit: parsed(&lookup, "SLOTCAL_UNIT").unwrap_or(DurationUnit::Hours),
            select: parsed(&lookup, "SLOTCAL_SELECT"),
            metrics_port: parsed(&lookup, "SLOTCAL_METRICS_PORT"),
        }
    }
}

fn parsed<T>(lookup: &impl Fn(&str) -> Option<String>, key: &str) -> Option<T>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    let raw = lookup(key)?;
    match raw.trim().parse() {
        Ok(v) => Some(v),
        Err(e) => {
            warn!("ignoring {key}={raw:?}: {e}");
            None
        }
    }
}
