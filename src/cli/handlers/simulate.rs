use std::sync::Arc;
use std::time::Duration;

use chrono::{Local, NaiveTime};
use parking_lot::Mutex;

use crate::cli::commands::SimulateArgs;
use crate::cli::output::{SaveJson, SimulateJson};
use crate::engine::Engine;
use crate::host::{Host, SimHost};
use crate::model::{Config, Timings};

/// Extra wait after the last expected host step before reporting
const QUIET_MARGIN: Duration = Duration::from_millis(250);

/// Longest a toggle can take to be saved and reconciled
fn quiet_period(t: &Timings) -> Duration {
    Duration::from_millis(
        t.debounce_ms
            + t.affordance_reenable_ms
            + t.popover_settle_ms
            + t.editor_settle_ms
            + t.input_settle_ms
            + t.save_settle_ms
            + t.rescan_cooldown_ms,
    ) + QUIET_MARGIN
}

/// Put one event on a simulated calendar, click its checkbox `args.toggles`
/// times and wait for the engine to settle.
pub async fn simulate(
    config: Config,
    args: &SimulateArgs,
) -> Result<SimulateJson, Box<dyn std::error::Error>> {
    let mut host = SimHost::new(config.selectors.clone());
    host.quirks = args.quirks.into();
    let start = if args.timed {
        NaiveTime::from_hms_opt(9, 0, 0)
    } else {
        None
    };
    let event = host.add_event(&args.title, Local::now().date_naive(), start);
    host.render_calendar();
    let events = host.subscribe();

    let host = Arc::new(Mutex::new(host));
    let engine = Engine::new(Arc::clone(&host), config.clone());
    engine.scan();

    let affordance = {
        let h = host.lock();
        h.entry_for(event)
            .and_then(|entry| h.query(Some(entry), &config.selectors.affordance()))
    };
    let Some(affordance) = affordance else {
        return Err(format!("{:?} has no task marker", args.title).into());
    };

    let runner = tokio::spawn(engine.clone().run(events));
    for i in 0..args.toggles {
        if i > 0 {
            tokio::time::sleep(Duration::from_millis(args.gap_ms)).await;
        }
        host.lock().user_click(affordance);
    }
    tokio::time::sleep(quiet_period(&config.timings)).await;
    runner.abort();

    let host = host.lock();
    let final_title = host
        .event(event)
        .map(|e| e.title.clone())
        .unwrap_or_default();
    let saves = host
        .saves()
        .into_iter()
        .filter(|(id, _)| *id == event)
        .map(|(_, title)| SaveJson { title })
        .collect();

    Ok(SimulateJson {
        initial_title: args.title.clone(),
        final_title,
        toggles: args.toggles,
        saves,
        stats: engine.stats(),
    })
}
