//! The reconciliation engine: owns the shared host handle, the pending-edit
//! store, the live configuration and counters, and runs the event loop that
//! ties scanning, toggling, debouncing and saving together.

use std::sync::Arc;
use std::time::Duration;

use parking_lot::{Mutex, RwLock};
use serde::Serialize;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio::time::{Instant, Interval, MissedTickBehavior};

use crate::host::{Host, HostEvent, PointerEvent};
use crate::model::{Config, EntryKind, NodeId};
use crate::ops::pending::{PendingEdits, ToggleOutcome};
use crate::ops::render::{self, ScanReport};
use crate::ops::save::{self, SaveOutcome};

/// Running totals, shown by the demo and reported by `simulate`
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct EngineStats {
    pub scans: u64,
    pub inserted: u64,
    pub toggles: u64,
    pub cancelled_bursts: u64,
    pub auto_save_clicks: u64,
    pub saves_started: u64,
    pub saves_completed: u64,
    pub saves_aborted: u64,
    pub evicted: u64,
    pub last_failure: Option<String>,
}

/// Cheap to clone; every clone shares the same state.
///
/// Locks are never held across an await. When both are needed, the host lock
/// is taken before the pending-edit lock.
pub struct Engine<H: Host> {
    host: Arc<Mutex<H>>,
    config: Arc<RwLock<Config>>,
    pending: Arc<Mutex<PendingEdits>>,
    stats: Arc<Mutex<EngineStats>>,
}

impl<H: Host> Clone for Engine<H> {
    fn clone(&self) -> Self {
        Engine {
            host: Arc::clone(&self.host),
            config: Arc::clone(&self.config),
            pending: Arc::clone(&self.pending),
            stats: Arc::clone(&self.stats),
        }
    }
}

impl<H: Host> Engine<H> {
    pub fn new(host: Arc<Mutex<H>>, config: Config) -> Self {
        Engine {
            host,
            config: Arc::new(RwLock::new(config)),
            pending: Arc::new(Mutex::new(PendingEdits::new())),
            stats: Arc::new(Mutex::new(EngineStats::default())),
        }
    }

    pub fn host(&self) -> &Arc<Mutex<H>> {
        &self.host
    }

    /// Snapshot of the live configuration
    pub fn config(&self) -> Config {
        self.config.read().clone()
    }

    /// Swap in a new configuration. Saves already running keep the snapshot
    /// they started with.
    pub fn set_config(&self, config: Config) {
        *self.config.write() = config;
        tracing::info!("configuration reloaded");
    }

    pub fn stats(&self) -> EngineStats {
        self.stats.lock().clone()
    }

    pub fn pending_title(&self, entry: NodeId) -> Option<String> {
        self.pending.lock().pending_title(entry).map(str::to_string)
    }

    /// Render every entry, then forget pending edits for entries the host
    /// has since replaced
    pub fn scan(&self) -> ScanReport {
        let config = self.config();
        let report = {
            let mut host = self.host.lock();
            render::scan(&mut *host, &config)
        };
        let evicted = self
            .pending
            .lock()
            .evict_missing(|id| report.entries.contains(&id));

        let mut stats = self.stats.lock();
        stats.scans += 1;
        stats.inserted += report.inserted as u64;
        stats.evicted += evicted as u64;
        tracing::debug!(
            "scan: {} entries, {} tasks ({} new, {} refreshed), {} evicted",
            report.entries.len(),
            report.tasks(),
            report.inserted,
            report.refreshed,
            evicted
        );
        report
    }

    /// Flip the checkbox `affordance` and record the toggle. Returns `None`
    /// when the affordance no longer sits in a task entry.
    pub fn toggle(&self, affordance: NodeId) -> Option<ToggleOutcome> {
        let config = self.config();
        let sel = &config.selectors;

        let (entry, outcome) = {
            let mut host = self.host.lock();
            let entry = render::entry_containing(&*host, sel, affordance)?;
            let title = render::locate_title(&*host, sel, entry.node)?;
            let was_checked = render::is_checked(&*host, affordance);
            let text = host.text(title).unwrap_or_default().trim().to_string();

            render::show_checked(&mut *host, &config.appearance, title, affordance, !was_checked);
            let outcome = self
                .pending
                .lock()
                .record_toggle(entry.node, was_checked, &text);
            match outcome {
                ToggleOutcome::Revert => render::clear_dim(&mut *host, entry.node),
                ToggleOutcome::Commit { .. } => {
                    render::dim_entry(&mut *host, &config.appearance, entry.node)
                }
            }
            (entry.node, outcome)
        };

        {
            let mut stats = self.stats.lock();
            stats.toggles += 1;
            if outcome == ToggleOutcome::Revert {
                stats.cancelled_bursts += 1;
            }
        }

        match &outcome {
            ToggleOutcome::Revert => {
                tracing::debug!("toggle of {} returned to its saved state", entry);
            }
            ToggleOutcome::Commit { new_title, token } => {
                tracing::debug!("toggle of {} pending as {:?}", entry, new_title);
                let engine = self.clone();
                let token = *token;
                let delay = config.timings.debounce();
                let timer = tokio::spawn(async move {
                    tokio::time::sleep(delay).await;
                    engine.debounce_elapsed(entry, token);
                });
                self.pending
                    .lock()
                    .attach_timer(entry, token, timer.abort_handle());
            }
        }
        Some(outcome)
    }

    fn debounce_elapsed(&self, entry: NodeId, token: u64) {
        let Some(title) = self.pending.lock().fire(entry, token) else {
            return;
        };
        tracing::debug!("debounce elapsed for {}, saving {:?}", entry, title);
        self.trigger_auto_save(entry);
    }

    /// Open the host's event popover for `entry` by clicking it the way a
    /// user would. The click interceptor picks it up and starts the save.
    pub fn trigger_auto_save(&self, entry: NodeId) {
        let config = self.config();
        let sel = &config.selectors;
        if self.pending.lock().pending_title(entry).is_none() {
            return;
        }

        let affordance = {
            let mut host = self.host.lock();
            let Some(found) = render::entry_containing(&*host, sel, entry) else {
                tracing::debug!("{} left the document before its save", entry);
                return;
            };
            let target = match found.kind {
                EntryKind::AllDay => render::locate_title(&*host, sel, entry).unwrap_or(entry),
                EntryKind::Timed => entry,
            };
            let affordance = host.query(Some(entry), &sel.affordance());
            if let Some(aff) = affordance {
                host.set_style(aff, "pointer-events", "none", false);
            }

            let (x, y) = host.bounding_rect(target).unwrap_or_default().click_point();
            for event in PointerEvent::press_sequence(x, y) {
                host.dispatch_pointer(target, event);
            }
            affordance
        };
        self.stats.lock().auto_save_clicks += 1;

        if let Some(aff) = affordance {
            let host = Arc::clone(&self.host);
            let delay = config.timings.affordance_reenable();
            tokio::spawn(async move {
                tokio::time::sleep(delay).await;
                host.lock().remove_style(aff, "pointer-events");
            });
        }
    }

    /// A document click landed on `target`. If it is inside an entry with a
    /// pending title, that title is consumed and saved.
    pub fn intercept_click(&self, target: NodeId) -> bool {
        let config = self.config();
        let entry = {
            let host = self.host.lock();
            render::entry_containing(&*host, &config.selectors, target)
        };
        let Some(entry) = entry else {
            return false;
        };
        let Some(title) = self.pending.lock().take_pending_title(entry.node) else {
            return false;
        };
        self.start_save(entry.node, title);
        true
    }

    /// Run a save in the background, then schedule a reconciliation scan
    pub fn start_save(&self, entry: NodeId, title: String) -> JoinHandle<SaveOutcome> {
        self.stats.lock().saves_started += 1;
        tracing::info!("saving {} as {:?}", entry, title);

        let engine = self.clone();
        tokio::spawn(async move {
            let config = engine.config();
            let outcome = save::save(Arc::clone(&engine.host), &config, entry, title).await;
            engine.record_outcome(entry, outcome);
            engine.schedule_rescan(config.timings.rescan_cooldown());
            outcome
        })
    }

    fn record_outcome(&self, entry: NodeId, outcome: SaveOutcome) {
        let mut stats = self.stats.lock();
        match outcome {
            SaveOutcome::Saved => {
                stats.saves_completed += 1;
                tracing::info!("save of {} completed", entry);
            }
            SaveOutcome::Aborted(failure) => {
                stats.saves_aborted += 1;
                stats.last_failure = Some(failure.to_string());
                tracing::warn!("save of {} aborted: {}", entry, failure);
            }
        }
    }

    pub fn schedule_rescan(&self, delay: Duration) {
        let engine = self.clone();
        tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            engine.scan();
        });
    }

    /// React to one host notification. Returns whether a re-scan is due.
    pub fn handle_event(&self, event: HostEvent) -> bool {
        match event {
            HostEvent::Mutated(record) => record.requires_rescan(),
            HostEvent::Click { target } => {
                self.intercept_click(target);
                false
            }
            HostEvent::AffordanceClick { affordance } => {
                if self.toggle(affordance).is_none() {
                    tracing::debug!("click on detached affordance {}", affordance);
                }
                false
            }
        }
    }

    /// Scan once, then keep reconciling until the host goes away.
    ///
    /// Notifications that are already queued are handled together and
    /// followed by at most one scan. A periodic sweep runs alongside.
    pub async fn run(self, mut events: mpsc::UnboundedReceiver<HostEvent>) {
        self.scan();
        let mut period = self.config.read().timings.sweep_interval();
        let mut sweep = sweep_timer(period);

        loop {
            tokio::select! {
                received = events.recv() => {
                    let Some(first) = received else {
                        break;
                    };
                    let mut rescan = self.handle_event(first);
                    while let Ok(event) = events.try_recv() {
                        rescan |= self.handle_event(event);
                    }
                    if rescan {
                        self.scan();
                    }
                }
                _ = sweep.tick() => {
                    self.scan();
                    let current = self.config.read().timings.sweep_interval();
                    if current != period {
                        period = current;
                        sweep = sweep_timer(period);
                    }
                }
            }
        }
        tracing::debug!("host event stream closed");
    }
}

fn sweep_timer(period: Duration) -> Interval {
    let mut sweep = tokio::time::interval_at(Instant::now() + period, period);
    sweep.set_missed_tick_behavior(MissedTickBehavior::Delay);
    sweep
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::host::SimHost;
    use crate::host::sim::HostAction;
    use crate::host::PointerKind;
    use crate::model::Selectors;
    use chrono::{NaiveDate, NaiveTime};
    use pretty_assertions::assert_eq;

    fn engine_with(title: &str, start: Option<NaiveTime>) -> (Engine<SimHost>, NodeId) {
        let mut host = SimHost::new(Selectors::default());
        let day = NaiveDate::from_ymd_opt(2026, 10, 19).unwrap();
        let event = host.add_event(title, day, start);
        host.render_calendar();
        let entry = host.entry_for(event).unwrap();
        let engine = Engine::new(Arc::new(Mutex::new(host)), Config::default());
        engine.scan();
        (engine, entry)
    }

    fn affordance(engine: &Engine<SimHost>) -> NodeId {
        engine.host().lock().query_all(".task-checkbox")[0]
    }

    fn pointer_targets(engine: &Engine<SimHost>) -> Vec<(NodeId, PointerKind)> {
        engine
            .host()
            .lock()
            .journal()
            .iter()
            .filter_map(|a| match a {
                HostAction::Pointer { node, kind } => Some((*node, *kind)),
                _ => None,
            })
            .collect()
    }

    #[tokio::test(start_paused = true)]
    async fn test_toggle_updates_visual_before_debounce() {
        let (engine, entry) = engine_with("[ ] Buy milk", None);
        let aff = affordance(&engine);

        engine.toggle(aff);

        let view = engine.host().lock().entry_views()[0].clone();
        assert!(view.struck);
        assert_eq!(view.entry_opacity.as_deref(), Some("0.8"));
        assert_eq!(engine.pending_title(entry).as_deref(), Some("[x] Buy milk"));
        assert!(pointer_targets(&engine).is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn test_debounce_clicks_title_of_all_day_entry() {
        let (engine, entry) = engine_with("[ ] Buy milk", None);
        let aff = affordance(&engine);
        let title = engine.host().lock().query(Some(entry), ".calendar-dayeventcell-title").unwrap();

        engine.toggle(aff);
        tokio::time::sleep(Duration::from_millis(260)).await;

        assert_eq!(
            pointer_targets(&engine),
            vec![
                (title, PointerKind::Down),
                (title, PointerKind::Up),
                (title, PointerKind::Click),
            ]
        );
        assert_eq!(engine.host().lock().style(aff, "pointer-events").as_deref(), Some("none"));
        tokio::time::sleep(Duration::from_millis(100)).await;
        assert_eq!(engine.host().lock().style(aff, "pointer-events"), None);
        assert_eq!(engine.stats().auto_save_clicks, 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_debounce_clicks_timed_entry_itself() {
        let (engine, entry) = engine_with("[ ] Standup", NaiveTime::from_hms_opt(9, 0, 0));
        engine.toggle(affordance(&engine));
        tokio::time::sleep(Duration::from_millis(260)).await;
        let targets: Vec<NodeId> = pointer_targets(&engine).iter().map(|(n, _)| *n).collect();
        assert_eq!(targets, vec![entry, entry, entry]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_toggle_back_cancels_timer() {
        let (engine, entry) = engine_with("[ ] Buy milk", None);
        let aff = affordance(&engine);
        engine.toggle(aff);
        assert_eq!(engine.toggle(aff), Some(ToggleOutcome::Revert));
        tokio::time::sleep(Duration::from_secs(1)).await;

        assert!(pointer_targets(&engine).is_empty());
        assert_eq!(engine.pending_title(entry), None);
        let view = engine.host().lock().entry_views()[0].clone();
        assert!(!view.struck);
        assert_eq!(view.entry_opacity, None);
        assert_eq!(engine.stats().cancelled_bursts, 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_toggle_trims_padded_title_text() {
        let (engine, entry) = engine_with("[ ] Buy milk", None);
        let aff = affordance(&engine);
        {
            let mut host = engine.host().lock();
            let title = host.query(Some(entry), ".calendar-dayeventcell-title").unwrap();
            host.set_text(title, "  Buy milk \n");
        }

        let outcome = engine.toggle(aff);

        assert!(matches!(
            outcome,
            Some(ToggleOutcome::Commit { ref new_title, .. }) if new_title == "[x] Buy milk"
        ));
        assert_eq!(engine.pending_title(entry).as_deref(), Some("[x] Buy milk"));
        assert_eq!(engine.toggle(aff), Some(ToggleOutcome::Revert));
    }

    #[tokio::test(start_paused = true)]
    async fn test_intercept_ignores_entries_without_pending_title() {
        let (engine, entry) = engine_with("[ ] Buy milk", None);
        assert!(!engine.intercept_click(entry));
        assert_eq!(engine.stats().saves_started, 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_scan_evicts_replaced_entries() {
        let (engine, entry) = engine_with("[ ] Buy milk", None);
        engine.toggle(affordance(&engine));
        engine.host().lock().render_calendar();

        engine.scan();

        assert_eq!(engine.pending_title(entry), None);
        assert_eq!(engine.stats().evicted, 1);
        tokio::time::sleep(Duration::from_secs(1)).await;
        assert!(pointer_targets(&engine).is_empty());
    }

    #[test]
    fn test_toggle_outside_entry_is_ignored() {
        let (engine, _) = engine_with("[ ] Buy milk", None);
        let stray = engine.host().lock().create_element("span", "task-checkbox");
        assert_eq!(engine.toggle(stray), None);
        assert_eq!(engine.stats().toggles, 0);
    }
}
