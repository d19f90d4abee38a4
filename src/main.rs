use std::sync::Arc;

use tracing::info;
use ulid::Ulid;

use slotcal::config::Config;
use slotcal::engine::{Engine, Load, MonthView, RunOutcome, SelectionMode};
use slotcal::memory::InMemoryPorts;
use slotcal::model::*;
use slotcal::notify::ViewHub;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt::init();

    let config = Config::from_env();
    slotcal::observability::init(config.metrics_port);

    let Some(fixture) = config.fixture.as_ref() else {
        return Err("SLOTCAL_FIXTURE is not set".into());
    };
    let json = std::fs::read_to_string(fixture)?;
    let ports = Arc::new(InMemoryPorts::new());
    let trainer_id = ports.load_fixture_json(&json)?;

    let month = config
        .month
        .unwrap_or_else(|| CalendarDate::from(chrono::Utc::now().date_naive()).year_month());

    let engine = Engine::new(
        TrainerProfile {
            id: trainer_id,
            scheduling: config.scheduling,
        },
        CourseRequirement {
            course_id: Ulid::new(),
            duration: config.duration,
            unit: config.unit,
        },
        ports.clone(),
        ports.clone(),
        Arc::new(ViewHub::new()),
    );
    info!("slotcal: trainer {trainer_id}, month {month}");
    info!("  scheduling: {:?}", config.scheduling);
    info!("  mode: {:?}", engine.selection_mode());

    let view = match engine.load_month(month).await? {
        Load::Applied(view) => view,
        Load::Superseded => return Err("month load was superseded".into()),
    };
    print_grid(&view);

    if let Some(date) = config.select {
        try_select(&engine, &view, date);
    }
    Ok(())
}

fn status_mark(status: DateStatus) -> char {
    match status {
        DateStatus::Available => '+',
        DateStatus::Tentative => '?',
        DateStatus::Booked => 'x',
        DateStatus::Unavailable => '.',
    }
}

fn print_grid(view: &MonthView) {
    println!("{}", view.month);
    println!(" Su    Mo    Tu    We    Th    Fr    Sa");
    for week in view.grid.weeks() {
        let row: Vec<String> = week
            .iter()
            .map(|cell| {
                if !cell.in_month {
                    return "     ".to_string();
                }
                let extra = cell
                    .indicator
                    .map(|i| i.to_string())
                    .unwrap_or_else(|| "  ".to_string());
                format!("{:>2}{}{}", cell.date.day(), status_mark(cell.status), extra)
            })
            .collect();
        println!(" {}", row.join(" "));
    }

    let contended: Vec<_> = view
        .grid
        .cells
        .iter()
        .filter(|c| c.in_month && !c.contention.is_empty())
        .collect();
    for cell in contended {
        if let Some(message) = cell.contention.message() {
            println!("{}: {message}", cell.date);
        }
    }
}

fn try_select(engine: &Engine, view: &MonthView, date: CalendarDate) {
    let mut selection = engine.new_selection();
    let result = match selection.mode() {
        SelectionMode::DateRun { .. } => {
            selection.select_date_run(view, date).map(|outcome| match outcome {
                RunOutcome::Selected { notice, .. } => notice,
                RunOutcome::Deselected => None,
            })
        }
        _ => selection
            .select_slot(view, date, Slot::Morning)
            .or_else(|_| selection.select_slot(view, date, Slot::Afternoon)),
    };
    match result {
        Ok(notice) => {
            println!(
                "selected {} slot(s) from {date}: {}% ({:?})",
                selection.selected_count(),
                selection.progress(),
                selection.state()
            );
            if let Some(notice) = notice {
                println!("note: {notice}");
            }
        }
        Err(rejection) => println!("cannot select {date}: {rejection}"),
    }
}
