use std::time::Duration;

use tokio_test::{assert_err, assert_ok};
use ulid::Ulid;

use super::*;
use crate::memory::InMemoryPorts;
use crate::ports::PortError;

fn d(y: i32, m: u32, day: u32) -> CalendarDate {
    CalendarDate::from_ymd(y, m, day).unwrap()
}

fn dec(day: u32) -> CalendarDate {
    d(2025, 12, day)
}

fn ym(y: i32, m: u32) -> YearMonth {
    YearMonth::new(y, m).unwrap()
}

fn window(trainer_id: Ulid, date: CalendarDate, slot: Slot, status: RawStatus) -> AvailabilityRecord {
    let w = slot_window(slot);
    AvailabilityRecord {
        id: Ulid::new(),
        trainer_id,
        date,
        start: w.start,
        end: w.end,
        status,
    }
}

fn details() -> BookingDetails {
    BookingDetails {
        client_id: Ulid::new(),
        request_type: RequestType::Public,
        location: "Manchester training centre".into(),
        contact: ContactDetails {
            name: "Alex Kim".into(),
            email: "alex@example.com".into(),
            phone: Some("0161 000 0000".into()),
            company: None,
        },
        notes: None,
    }
}

struct Harness {
    ports: Arc<InMemoryPorts>,
    engine: Engine,
    trainer_id: Ulid,
}

fn harness(scheduling: SchedulingType, duration: Option<f64>, unit: DurationUnit) -> Harness {
    let ports = Arc::new(InMemoryPorts::new());
    let trainer_id = Ulid::new();
    let engine = Engine::new(
        TrainerProfile {
            id: trainer_id,
            scheduling,
        },
        CourseRequirement {
            course_id: Ulid::new(),
            duration,
            unit,
        },
        ports.clone(),
        ports.clone(),
        Arc::new(ViewHub::new()),
    );
    Harness {
        ports,
        engine,
        trainer_id,
    }
}

async fn applied(engine: &Engine, month: YearMonth) -> Arc<MonthView> {
    match engine.load_month(month).await.unwrap() {
        Load::Applied(view) => view,
        Load::Superseded => panic!("fetch for {month} was superseded"),
    }
}

// ── Fetch window ─────────────────────────────────────────

#[test]
fn fetch_window_covers_padding_and_lookahead() {
    let h = harness(SchedulingType::FullDay, Some(3.0), DurationUnit::Days);
    let (start, end) = h.engine.fetch_window(ym(2025, 12)).unwrap();
    assert_eq!(start, d(2025, 11, 30));
    assert_eq!(end, d(2026, 1, 2));
}

#[test]
fn fetch_window_without_lookahead_for_single_day() {
    let h = harness(SchedulingType::SlotBased, Some(4.0), DurationUnit::Hours);
    let (_, end) = h.engine.fetch_window(ym(2025, 12)).unwrap();
    assert_eq!(end, dec(31));
}

// ── Scenarios ────────────────────────────────────────────

#[tokio::test]
async fn slot_based_four_hour_course() {
    let h = harness(SchedulingType::SlotBased, Some(4.0), DurationUnit::Hours);
    h.ports
        .add_record(window(h.trainer_id, dec(3), Slot::Morning, RawStatus::Available));
    h.ports
        .add_record(window(h.trainer_id, dec(3), Slot::Afternoon, RawStatus::Available));

    let view = applied(&h.engine, ym(2025, 12)).await;
    assert_eq!(view.status(dec(3)), DateStatus::Available);

    let mut sel = h.engine.new_selection();
    assert_eq!(sel.mode(), SelectionMode::Slots { required: 1 });
    assert_ok!(sel.select_slot(&view, dec(3), Slot::Morning));
    assert!(sel.is_complete());
    assert_eq!(sel.progress(), 100);
}

#[tokio::test]
async fn two_day_course_rejected_when_second_day_booked() {
    let h = harness(SchedulingType::SlotBased, Some(2.0), DurationUnit::Days);
    h.ports
        .add_record(window(h.trainer_id, dec(10), Slot::FullDay, RawStatus::Available));
    h.ports
        .add_record(window(h.trainer_id, dec(11), Slot::FullDay, RawStatus::Booked));

    let view = applied(&h.engine, ym(2025, 12)).await;
    let mut sel = h.engine.new_selection();
    assert_eq!(sel.mode(), SelectionMode::DateRun { days: 2 });

    let err = assert_err!(sel.select_date_run(&view, dec(10)));
    assert_eq!(
        err,
        Rejection::InsufficientDays {
            required: 2,
            missing: vec![dec(11)]
        }
    );
    assert!(sel.slots().is_empty());
}

#[tokio::test]
async fn three_day_course_never_selects_partially() {
    let h = harness(SchedulingType::FullDay, Some(3.0), DurationUnit::Days);
    for (day, status) in [
        (1, RawStatus::Available),
        (2, RawStatus::Available),
        (3, RawStatus::Booked),
    ] {
        h.ports
            .add_record(window(h.trainer_id, dec(day), Slot::FullDay, status));
    }
    let view = applied(&h.engine, ym(2025, 12)).await;
    let mut sel = h.engine.new_selection();
    assert_err!(sel.select_date_run(&view, dec(1)));
    assert_eq!(sel.selected_count(), 0);
    assert_eq!(sel.progress(), 0);
}

#[tokio::test]
async fn contention_message_on_selection() {
    let h = harness(SchedulingType::SlotBased, Some(4.0), DurationUnit::Hours);
    h.ports
        .add_record(window(h.trainer_id, dec(5), Slot::Morning, RawStatus::Available));
    h.ports.set_contention(h.trainer_id, dec(5), 2, 1);

    let view = applied(&h.engine, ym(2025, 12)).await;
    let cell = view.grid.cell(dec(5)).unwrap();
    assert_eq!(cell.contention.pending, 2);
    assert_eq!(cell.contention.tentative, 1);

    let mut sel = h.engine.new_selection();
    let notice = sel.select_slot(&view, dec(5), Slot::Morning).unwrap().unwrap();
    assert!(notice.contains('2'));
    assert!(notice.contains('1'));
    assert!(sel.is_complete());
}

#[tokio::test]
async fn toggle_run_three_times() {
    let h = harness(SchedulingType::FullDay, Some(2.0), DurationUnit::Days);
    h.ports
        .add_record(window(h.trainer_id, dec(15), Slot::FullDay, RawStatus::Available));
    h.ports
        .add_record(window(h.trainer_id, dec(16), Slot::FullDay, RawStatus::Tentative));
    let view = applied(&h.engine, ym(2025, 12)).await;

    let mut sel = h.engine.new_selection();
    sel.select_date_run(&view, dec(15)).unwrap();
    let first = sel.slots().to_vec();
    assert_eq!(sel.select_date_run(&view, dec(15)), Ok(RunOutcome::Deselected));
    assert!(sel.slots().is_empty());
    sel.select_date_run(&view, dec(15)).unwrap();
    assert_eq!(sel.slots(), first.as_slice());
}

#[tokio::test]
async fn run_reaches_into_next_month() {
    let h = harness(SchedulingType::FullDay, Some(3.0), DurationUnit::Days);
    for date in [dec(30), dec(31), d(2026, 1, 1)] {
        h.ports
            .add_record(window(h.trainer_id, date, Slot::FullDay, RawStatus::Available));
    }
    let view = applied(&h.engine, ym(2025, 12)).await;
    let mut sel = h.engine.new_selection();
    match sel.select_date_run(&view, dec(30)).unwrap() {
        RunOutcome::Selected { run, .. } => assert_eq!(run.end(), Some(d(2026, 1, 1))),
        RunOutcome::Deselected => panic!("expected a run"),
    }
    // Next-month dates are never start candidates from this view
    assert_eq!(
        sel.select_date_run(&view, d(2026, 1, 1)),
        Err(Rejection::OutsideMonth(d(2026, 1, 1)))
    );
}

#[tokio::test]
async fn missing_duration_blocks_everything() {
    let h = harness(SchedulingType::SlotBased, None, DurationUnit::Hours);
    h.ports
        .add_record(window(h.trainer_id, dec(3), Slot::Morning, RawStatus::Available));
    let view = applied(&h.engine, ym(2025, 12)).await;
    let mut sel = h.engine.new_selection();
    assert_eq!(sel.state(), SelectionState::Blocked);
    assert_eq!(
        sel.select_slot(&view, dec(3), Slot::Morning),
        Err(Rejection::RequirementUnknown)
    );
    let err = h.engine.submit(&sel, details()).await.unwrap_err();
    assert!(matches!(err, EngineError::Blocked(Rejection::RequirementUnknown)));
    assert!(h.ports.submitted().is_empty());
}

// ── Fetch lifecycle ──────────────────────────────────────

#[tokio::test]
async fn later_request_wins() {
    let h = harness(SchedulingType::SlotBased, Some(4.0), DurationUnit::Hours);
    h.ports
        .add_record(window(h.trainer_id, dec(3), Slot::Morning, RawStatus::Available));
    // November's fetch is slow; December's answers immediately
    h.ports
        .delay_range_starting(grid_start(ym(2025, 11)), Duration::from_millis(100));

    let (nov, dec_load) = tokio::join!(
        h.engine.load_month(ym(2025, 11)),
        async {
            tokio::time::sleep(Duration::from_millis(10)).await;
            h.engine.load_month(ym(2025, 12)).await
        }
    );
    assert!(matches!(nov.unwrap(), Load::Superseded));
    assert!(matches!(dec_load.unwrap(), Load::Applied(_)));

    let current = h.engine.current_view().await.unwrap();
    assert_eq!(current.month, ym(2025, 12));
}

#[tokio::test]
async fn failed_older_request_is_superseded_not_an_error() {
    let h = harness(SchedulingType::SlotBased, Some(4.0), DurationUnit::Hours);
    h.ports
        .delay_range_starting(grid_start(ym(2025, 11)), Duration::from_millis(100));

    let (nov, dec_load) = tokio::join!(
        h.engine.load_month(ym(2025, 11)),
        async {
            tokio::time::sleep(Duration::from_millis(10)).await;
            let applied = h.engine.load_month(ym(2025, 12)).await;
            // November is still asleep; its fetch will now fail
            h.ports.fail_next_fetch();
            applied
        }
    );
    assert!(matches!(dec_load.unwrap(), Load::Applied(_)));
    assert!(matches!(assert_ok!(nov), Load::Superseded));

    let current = h.engine.current_view().await.unwrap();
    assert_eq!(current.month, ym(2025, 12));
}

#[tokio::test]
async fn each_load_replaces_the_whole_view() {
    let h = harness(SchedulingType::SlotBased, Some(4.0), DurationUnit::Hours);
    let rec = window(h.trainer_id, dec(3), Slot::Morning, RawStatus::Available);
    let rec_id = rec.id;
    h.ports.add_record(rec);

    let first = applied(&h.engine, ym(2025, 12)).await;
    assert_eq!(first.status(dec(3)), DateStatus::Available);

    h.ports.set_status(rec_id, RawStatus::Booked);
    let second = applied(&h.engine, ym(2025, 12)).await;
    assert!(second.generation > first.generation);
    assert_eq!(second.status(dec(3)), DateStatus::Booked);
    // the old Arc is untouched
    assert_eq!(first.status(dec(3)), DateStatus::Available);
}

#[tokio::test]
async fn month_change_is_broadcast() {
    let h = harness(SchedulingType::SlotBased, Some(4.0), DurationUnit::Hours);
    let mut rx = h.engine.notify.subscribe(h.trainer_id);
    let view = applied(&h.engine, ym(2026, 1)).await;
    assert_eq!(
        rx.recv().await.unwrap(),
        ViewEvent::MonthReplaced {
            month: ym(2026, 1),
            generation: view.generation
        }
    );
}

#[tokio::test]
async fn stale_selection_must_be_reset_after_navigation() {
    let h = harness(SchedulingType::SlotBased, Some(8.0), DurationUnit::Hours);
    h.ports
        .add_record(window(h.trainer_id, dec(3), Slot::Morning, RawStatus::Available));
    h.ports
        .add_record(window(h.trainer_id, dec(3), Slot::Afternoon, RawStatus::Available));
    let old = applied(&h.engine, ym(2025, 12)).await;
    let mut sel = h.engine.new_selection();
    sel.select_slot(&old, dec(3), Slot::Morning).unwrap();

    let new = applied(&h.engine, ym(2025, 12)).await;
    assert_eq!(
        sel.select_slot(&new, dec(3), Slot::Afternoon),
        Err(Rejection::StaleView)
    );
    sel.reset();
    sel.select_slot(&new, dec(3), Slot::Morning).unwrap();
    sel.select_slot(&new, dec(3), Slot::Afternoon).unwrap();
    assert!(sel.is_complete());
}

#[tokio::test]
async fn fetch_failure_is_propagated_and_keeps_old_view() {
    let h = harness(SchedulingType::SlotBased, Some(4.0), DurationUnit::Hours);
    let before = applied(&h.engine, ym(2025, 12)).await;
    h.ports.fail_next_fetch();
    let err = h.engine.load_month(ym(2026, 1)).await.unwrap_err();
    assert!(matches!(err, EngineError::Transport(PortError::Unavailable(_))));
    let current = h.engine.current_view().await.unwrap();
    assert_eq!(current.generation, before.generation);
}

#[tokio::test]
async fn foreign_and_out_of_range_records_are_ignored() {
    let h = harness(SchedulingType::SlotBased, Some(4.0), DurationUnit::Hours);
    // Wrong trainer sneaking into a shared store
    let mut foreign = window(h.trainer_id, dec(3), Slot::Morning, RawStatus::Available);
    foreign.trainer_id = Ulid::new();
    h.ports.add_record(foreign);
    let view = applied(&h.engine, ym(2025, 12)).await;
    assert_eq!(view.status(dec(3)), DateStatus::Unavailable);
    assert!(view.index.is_empty());
}

// ── Submission ───────────────────────────────────────────

#[tokio::test]
async fn submit_hands_off_payload() {
    let h = harness(SchedulingType::FullDay, Some(2.0), DurationUnit::Days);
    let first = window(h.trainer_id, dec(8), Slot::FullDay, RawStatus::Available);
    let first_id = first.id;
    h.ports.add_record(first);
    h.ports
        .add_record(window(h.trainer_id, dec(9), Slot::FullDay, RawStatus::Available));
    let view = applied(&h.engine, ym(2025, 12)).await;

    let mut sel = h.engine.new_selection();
    sel.select_date_run(&view, dec(8)).unwrap();
    let mut rx = h.engine.notify.subscribe(h.trainer_id);
    let receipt = h.engine.submit(&sel, details()).await.unwrap();

    let sent = h.ports.submitted();
    assert_eq!(sent.len(), 1);
    assert_eq!(sent[0].requested_date, "2025-12-08");
    assert_eq!(sent[0].end_date.as_deref(), Some("2025-12-09"));
    assert_eq!(
        sent[0].trainer_availability_id.as_deref(),
        Some(first_id.to_string().as_str())
    );
    assert_eq!(sent[0].status, BookingStatus::Pending);
    assert_eq!(
        rx.recv().await.unwrap(),
        ViewEvent::Submitted {
            request_id: receipt.request_id
        }
    );
}

#[tokio::test]
async fn submit_failure_keeps_selection_for_retry() {
    let h = harness(SchedulingType::SlotBased, Some(4.0), DurationUnit::Hours);
    h.ports
        .add_record(window(h.trainer_id, dec(3), Slot::Afternoon, RawStatus::Tentative));
    let view = applied(&h.engine, ym(2025, 12)).await;
    let mut sel = h.engine.new_selection();
    sel.select_slot(&view, dec(3), Slot::Afternoon).unwrap();

    h.ports.fail_next_submit();
    let err = h.engine.submit(&sel, details()).await.unwrap_err();
    assert!(matches!(err, EngineError::Transport(PortError::Rejected { status: 503, .. })));
    assert!(sel.is_complete());
    assert!(h.ports.submitted().is_empty());

    assert_ok!(h.engine.submit(&sel, details()).await);
    assert_eq!(h.ports.submitted().len(), 1);
}

#[tokio::test]
async fn incomplete_selection_is_not_submitted() {
    let h = harness(SchedulingType::SlotBased, Some(8.0), DurationUnit::Hours);
    h.ports
        .add_record(window(h.trainer_id, dec(3), Slot::Morning, RawStatus::Available));
    let view = applied(&h.engine, ym(2025, 12)).await;
    let mut sel = h.engine.new_selection();
    sel.select_slot(&view, dec(3), Slot::Morning).unwrap();
    assert_eq!(sel.state(), SelectionState::PartiallySelected);

    let err = h.engine.submit(&sel, details()).await.unwrap_err();
    assert!(matches!(
        err,
        EngineError::Blocked(Rejection::Incomplete {
            selected: 1,
            required: 2
        })
    ));
    assert!(h.ports.submitted().is_empty());
}
