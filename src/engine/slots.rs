use crate::model::{ClockTime, DurationUnit, Slot};

// ── Slot vocabulary ───────────────────────────────────────────────

/// Working hours in one training day.
pub const HOURS_PER_DAY: f64 = 9.0;

/// Working hours covered by one half-day slot.
pub const HOURS_PER_SLOT: f64 = 4.0;

pub const MORNING_START: ClockTime = ClockTime::new(9, 0);
pub const MORNING_END: ClockTime = ClockTime::new(13, 0);
pub const AFTERNOON_START: ClockTime = ClockTime::new(14, 0);
pub const AFTERNOON_END: ClockTime = ClockTime::new(18, 0);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SlotWindow {
    pub start: ClockTime,
    pub end: ClockTime,
}

pub fn slot_window(slot: Slot) -> SlotWindow {
    match slot {
        Slot::Morning => SlotWindow {
            start: MORNING_START,
            end: MORNING_END,
        },
        Slot::Afternoon => SlotWindow {
            start: AFTERNOON_START,
            end: AFTERNOON_END,
        },
        Slot::FullDay => SlotWindow {
            start: MORNING_START,
            end: AFTERNOON_END,
        },
    }
}

/// Half-day slots a pick accounts for toward `required_slots`.
pub fn half_days(slot: Slot) -> u32 {
    match slot {
        Slot::Morning | Slot::Afternoon => 1,
        Slot::FullDay => 2,
    }
}

/// Two picks on the same date claim some of the same hours.
pub fn slots_overlap(a: Slot, b: Slot) -> bool {
    a == b || a == Slot::FullDay || b == Slot::FullDay
}

/// Which slot a record's window belongs to.
///
/// Exact 09:00–18:00 is a full day; anything else is a half day, split on
/// whether it starts before the midday break.
pub fn classify_window(start: ClockTime, end: ClockTime) -> Slot {
    if start == MORNING_START && end == AFTERNOON_END {
        Slot::FullDay
    } else if start < MORNING_END {
        Slot::Morning
    } else {
        Slot::Afternoon
    }
}

/// Course duration in hours. Missing, negative, or non-finite values yield 0.
///
/// `HalfDay` counts each unit as one half-day slot.
pub fn parse_duration(value: Option<f64>, unit: DurationUnit) -> f64 {
    let value = match value {
        Some(v) if v.is_finite() && v > 0.0 => v,
        _ => return 0.0,
    };
    match unit {
        DurationUnit::Hours => value,
        DurationUnit::Days => value * HOURS_PER_DAY,
        DurationUnit::HalfDay => value * HOURS_PER_SLOT,
    }
}

/// Half-day slots a course needs: `ceil(hours / 4)`.
pub fn required_slots(value: Option<f64>, unit: DurationUnit) -> u32 {
    let hours = parse_duration(value, unit);
    (hours / HOURS_PER_SLOT).ceil() as u32
}

/// Calendar days a course needs.
///
/// For `Days` the value is already a day count; `Hours` converts at nine hours
/// per day; two half-day units fit in one day.
pub fn course_days(value: Option<f64>, unit: DurationUnit) -> u32 {
    let value = match value {
        Some(v) if v.is_finite() && v > 0.0 => v,
        _ => return 0,
    };
    let days = match unit {
        DurationUnit::Days => value,
        DurationUnit::Hours => value / HOURS_PER_DAY,
        DurationUnit::HalfDay => value / 2.0,
    };
    days.ceil() as u32
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn full_day_counts_and_overlaps_as_both_halves() {
        assert_eq!(half_days(Slot::Morning), 1);
        assert_eq!(half_days(Slot::Afternoon), 1);
        assert_eq!(half_days(Slot::FullDay), 2);
        assert!(slots_overlap(Slot::FullDay, Slot::Morning));
        assert!(slots_overlap(Slot::Afternoon, Slot::FullDay));
        assert!(slots_overlap(Slot::Morning, Slot::Morning));
        assert!(!slots_overlap(Slot::Morning, Slot::Afternoon));
    }

    #[test]
    fn windows_are_fixed() {
        assert_eq!(
            slot_window(Slot::Morning),
            SlotWindow {
                start: ClockTime::new(9, 0),
                end: ClockTime::new(13, 0)
            }
        );
        assert_eq!(
            slot_window(Slot::Afternoon),
            SlotWindow {
                start: ClockTime::new(14, 0),
                end: ClockTime::new(18, 0)
            }
        );
        assert_eq!(
            slot_window(Slot::FullDay),
            SlotWindow {
                start: ClockTime::new(9, 0),
                end: ClockTime::new(18, 0)
            }
        );
    }

    #[test]
    fn classify_round_trips_fixed_windows() {
        for slot in [Slot::Morning, Slot::Afternoon, Slot::FullDay] {
            let w = slot_window(slot);
            assert_eq!(classify_window(w.start, w.end), slot);
        }
        // Off-grid windows fall to the nearest half
        assert_eq!(
            classify_window(ClockTime::new(8, 30), ClockTime::new(12, 0)),
            Slot::Morning
        );
        assert_eq!(
            classify_window(ClockTime::new(13, 30), ClockTime::new(17, 0)),
            Slot::Afternoon
        );
    }

    #[test]
    fn days_convert_at_nine_hours() {
        for d in [0.0, 0.5, 1.0, 2.0, 3.0, 10.0] {
            assert_eq!(parse_duration(Some(d), DurationUnit::Days), 9.0 * d);
            assert_eq!(parse_duration(Some(d), DurationUnit::Hours), d);
        }
    }

    #[test]
    fn missing_or_bad_duration_is_zero() {
        assert_eq!(parse_duration(None, DurationUnit::Hours), 0.0);
        assert_eq!(parse_duration(Some(-3.0), DurationUnit::Days), 0.0);
        assert_eq!(parse_duration(Some(f64::NAN), DurationUnit::Hours), 0.0);
        assert_eq!(required_slots(None, DurationUnit::Days), 0);
        assert_eq!(course_days(None, DurationUnit::Days), 0);
    }

    #[test]
    fn required_slots_examples() {
        assert_eq!(required_slots(Some(4.0), DurationUnit::Hours), 1);
        assert_eq!(required_slots(Some(4.5), DurationUnit::Hours), 2);
        assert_eq!(required_slots(Some(8.0), DurationUnit::Hours), 2);
        assert_eq!(required_slots(Some(1.0), DurationUnit::Days), 3);
        assert_eq!(required_slots(Some(2.0), DurationUnit::Days), 5);
        assert_eq!(required_slots(Some(1.0), DurationUnit::HalfDay), 1);
    }

    #[test]
    fn required_slots_zero_and_monotone() {
        for unit in [DurationUnit::Hours, DurationUnit::Days, DurationUnit::HalfDay] {
            assert_eq!(required_slots(Some(0.0), unit), 0);
            let mut prev = 0;
            for tenth in 0..400 {
                let slots = required_slots(Some(tenth as f64 / 10.0), unit);
                assert!(slots >= prev, "{unit:?} not monotone at {tenth}");
                prev = slots;
            }
        }
    }

    #[test]
    fn required_slots_at_least_one_for_positive() {
        assert_eq!(required_slots(Some(0.1), DurationUnit::Hours), 1);
    }

    #[test]
    fn course_days_examples() {
        assert_eq!(course_days(Some(2.0), DurationUnit::Days), 2);
        assert_eq!(course_days(Some(4.0), DurationUnit::Hours), 1);
        assert_eq!(course_days(Some(9.0), DurationUnit::Hours), 1);
        assert_eq!(course_days(Some(10.0), DurationUnit::Hours), 2);
        assert_eq!(course_days(Some(1.0), DurationUnit::HalfDay), 1);
        assert_eq!(course_days(Some(3.0), DurationUnit::HalfDay), 2);
    }
}
