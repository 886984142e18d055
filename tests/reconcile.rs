//! End-to-end reconciliation against the simulated calendar: the engine's
//! event loop runs on a paused clock and the tests act as the user.

use std::sync::Arc;
use std::time::Duration;

use calcheck::engine::Engine;
use calcheck::host::sim::{EventId, Quirks};
use calcheck::host::{Host, SimHost};
use calcheck::model::{Config, Glyph, NodeId};
use chrono::{NaiveDate, NaiveTime};
use parking_lot::Mutex;
use pretty_assertions::assert_eq;

struct Harness {
    host: Arc<Mutex<SimHost>>,
    engine: Engine<SimHost>,
    event: EventId,
}

impl Harness {
    /// One event on the calendar with the engine loop running
    async fn start(title: &str, start: Option<NaiveTime>, quirks: Quirks) -> Self {
        let config = Config::default();
        let mut host = SimHost::new(config.selectors.clone());
        host.quirks = quirks;
        let day = NaiveDate::from_ymd_opt(2026, 10, 19).unwrap();
        let event = host.add_event(title, day, start);
        host.render_calendar();
        let events = host.subscribe();

        let host = Arc::new(Mutex::new(host));
        let engine = Engine::new(Arc::clone(&host), config);
        tokio::spawn(engine.clone().run(events));
        // Let the initial scan run
        tokio::time::sleep(Duration::from_millis(1)).await;
        Harness {
            host,
            engine,
            event,
        }
    }

    fn entry(&self) -> NodeId {
        self.host.lock().entry_for(self.event).unwrap()
    }

    fn click_checkbox(&self) {
        let mut host = self.host.lock();
        let entry = host.entry_for(self.event).unwrap();
        let aff = host.query(Some(entry), ".task-checkbox").unwrap();
        host.user_click(aff);
    }

    fn stored_title(&self) -> String {
        self.host.lock().event(self.event).unwrap().title.clone()
    }

    fn saves(&self) -> Vec<String> {
        self.host
            .lock()
            .saves()
            .into_iter()
            .map(|(_, title)| title)
            .collect()
    }

    fn view(&self) -> calcheck::host::sim::EntryView {
        self.host.lock().entry_views()[0].clone()
    }
}

async fn advance(ms: u64) {
    tokio::time::sleep(Duration::from_millis(ms)).await;
}

#[tokio::test(start_paused = true)]
async fn test_initial_scan_renders_affordance() {
    let h = Harness::start("[ ] Buy milk", None, Quirks::default()).await;
    let view = h.view();
    assert_eq!(view.title, "Buy milk");
    assert_eq!(view.glyph, Some(Glyph::Unchecked));
    assert!(!view.struck);
}

#[tokio::test(start_paused = true)]
async fn test_toggle_saves_once_after_debounce() {
    let h = Harness::start("[ ] Buy milk", None, Quirks::default()).await;
    h.click_checkbox();
    advance(1).await;

    // Visual change is immediate, nothing is saved yet
    assert!(h.view().struck);
    assert_eq!(h.view().entry_opacity.as_deref(), Some("0.8"));
    advance(200).await;
    assert!(h.saves().is_empty());
    assert!(!h.host.lock().popover_open());

    advance(4000).await;
    assert_eq!(h.saves(), vec!["[x] Buy milk".to_string()]);
    assert_eq!(h.stored_title(), "[x] Buy milk");

    // The host re-rendered; the new entry carries a checked affordance again
    let view = h.view();
    assert_eq!(view.glyph, Some(Glyph::Checked));
    assert!(view.struck);
    assert_eq!(view.entry_opacity, None);
    assert!(!h.host.lock().overlays_hidden());
    assert_eq!(h.engine.stats().saves_completed, 1);
}

#[tokio::test(start_paused = true)]
async fn test_timed_entry_saves_too() {
    let nine = NaiveTime::from_hms_opt(9, 0, 0);
    let h = Harness::start("[x] Standup", nine, Quirks::default()).await;
    h.click_checkbox();
    advance(5000).await;
    assert_eq!(h.saves(), vec!["[ ] Standup".to_string()]);
    assert_eq!(h.view().glyph, Some(Glyph::Unchecked));
}

#[tokio::test(start_paused = true)]
async fn test_toggle_back_within_window_saves_nothing() {
    let h = Harness::start("[ ] Buy milk", None, Quirks::default()).await;
    h.click_checkbox();
    advance(100).await;
    h.click_checkbox();
    advance(1).await;

    let view = h.view();
    assert!(!view.struck);
    assert_eq!(view.entry_opacity, None);
    assert_eq!(h.engine.pending_title(h.entry()), None);

    advance(5000).await;
    assert!(h.saves().is_empty());
    assert_eq!(h.engine.stats().saves_started, 0);
}

#[tokio::test(start_paused = true)]
async fn test_three_rapid_toggles_save_once() {
    let h = Harness::start("[ ] Buy milk", None, Quirks::default()).await;
    for _ in 0..3 {
        h.click_checkbox();
        advance(50).await;
    }
    advance(5000).await;
    assert_eq!(h.saves(), vec!["[x] Buy milk".to_string()]);
    assert_eq!(h.engine.stats().auto_save_clicks, 1);
}

#[tokio::test(start_paused = true)]
async fn test_missing_edit_trigger_restores_and_rescans() {
    let quirks = Quirks {
        omit_edit_trigger: true,
        ..Quirks::default()
    };
    let h = Harness::start("[ ] Buy milk", None, quirks).await;
    h.click_checkbox();
    // debounce + popover settle: the save has just given up
    advance(700).await;

    assert!(h.saves().is_empty());
    assert!(!h.host.lock().overlays_hidden());
    assert_eq!(h.view().entry_opacity, None);
    let stats = h.engine.stats();
    assert_eq!(stats.saves_aborted, 1);
    assert_eq!(stats.last_failure.as_deref(), Some("edit trigger not found"));

    let scans = stats.scans;
    advance(1600).await;
    assert!(h.engine.stats().scans > scans);
    assert_eq!(h.stored_title(), "[ ] Buy milk");
}

#[tokio::test(start_paused = true)]
async fn test_host_rerender_is_reconciled() {
    let h = Harness::start("[ ] Buy milk", None, Quirks::default()).await;
    let before = h.entry();
    h.host.lock().render_calendar();
    advance(1).await;

    let after = h.entry();
    assert_ne!(before, after);
    let view = h.view();
    assert_eq!(view.title, "Buy milk");
    assert_eq!(view.glyph, Some(Glyph::Unchecked));
    assert_eq!(h.host.lock().query_all(".task-checkbox").len(), 1);
}

#[tokio::test(start_paused = true)]
async fn test_user_click_on_entry_saves_immediately() {
    let h = Harness::start("[ ] Buy milk", None, Quirks::default()).await;
    h.click_checkbox();
    advance(10).await;

    // The user opens the event before the debounce window closes
    let entry = h.entry();
    h.host.lock().user_click(entry);
    advance(5000).await;

    assert_eq!(h.saves(), vec!["[x] Buy milk".to_string()]);
    assert_eq!(h.engine.stats().auto_save_clicks, 0);
}

#[tokio::test(start_paused = true)]
async fn test_sweep_catches_silent_changes() {
    let h = Harness::start("[ ] Buy milk", None, Quirks::default()).await;
    let scans = h.engine.stats().scans;
    advance(4100).await;
    assert!(h.engine.stats().scans >= scans + 2);
}

#[tokio::test(start_paused = true)]
async fn test_queued_mutations_coalesce_into_one_scan() {
    let h = Harness::start("[ ] Buy milk", None, Quirks::default()).await;
    {
        let mut host = h.host.lock();
        let day = NaiveDate::from_ymd_opt(2026, 10, 19).unwrap();
        host.add_event("[x] Call mom", day, NaiveTime::from_hms_opt(9, 0, 0));
        for _ in 0..5 {
            host.render_calendar();
        }
    }
    let scans = h.engine.stats().scans;
    advance(1).await;

    // One scan for the whole batch, plus one for the records the scan's own
    // writes produce
    let delta = h.engine.stats().scans - scans;
    assert!((1..=2).contains(&delta), "scans ran {delta} times");
    let host = h.host.lock();
    assert_eq!(host.query_all(".task-checkbox").len(), 2);
    for view in host.entry_views() {
        assert!(view.glyph.is_some());
    }
}
