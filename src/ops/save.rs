//! Persisting a toggle by driving the host's own edit workflow.
//!
//! The host exposes no write API, so a save opens the event editor, rewrites
//! the title field and presses save, exactly as a user would. The sequence is
//! a small state machine; each phase waits for its settle delay before acting
//! so the timing assumptions live in one place ([`SaveMachine::gate`]).

use std::sync::Arc;
use std::time::Duration;

use parking_lot::Mutex;

use super::render::restore_entry_instantly;
use crate::host::{FieldEvent, Host};
use crate::model::{Config, NodeId, Timings};

/// A host element the save sequence expected but did not find
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum AddressingFailure {
    #[error("edit trigger not found")]
    EditTrigger,
    #[error("title input not found")]
    TitleInput,
    #[error("save control not found")]
    SaveControl,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SavePhase {
    Idle,
    AwaitingEditor,
    AwaitingInputReady,
    AwaitingSaveReady,
    Settling,
    Done,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SaveOutcome {
    Saved,
    Aborted(AddressingFailure),
}

/// One save in progress
#[derive(Debug, Clone)]
pub struct SaveMachine {
    new_title: String,
    phase: SavePhase,
}

impl SaveMachine {
    pub fn new(new_title: impl Into<String>) -> Self {
        SaveMachine {
            new_title: new_title.into(),
            phase: SavePhase::Idle,
        }
    }

    pub fn phase(&self) -> SavePhase {
        self.phase
    }

    /// How long to let the host settle before running the current phase
    pub fn gate(&self, timings: &Timings) -> Duration {
        let ms = match self.phase {
            SavePhase::Idle | SavePhase::Done => 0,
            SavePhase::AwaitingEditor => timings.popover_settle_ms,
            SavePhase::AwaitingInputReady => timings.editor_settle_ms,
            SavePhase::AwaitingSaveReady => timings.input_settle_ms,
            SavePhase::Settling => timings.save_settle_ms,
        };
        Duration::from_millis(ms)
    }

    /// Run the current phase against the host and advance
    pub fn step(
        &mut self,
        host: &mut dyn Host,
        config: &Config,
    ) -> Result<SavePhase, AddressingFailure> {
        let sel = &config.selectors;
        self.phase = match self.phase {
            SavePhase::Idle => {
                host.add_stylesheet(&config.appearance.suppression_id, &sel.suppression_css());
                SavePhase::AwaitingEditor
            }
            SavePhase::AwaitingEditor => {
                let edit = host
                    .query(None, &sel.edit_trigger)
                    .ok_or(AddressingFailure::EditTrigger)?;
                host.activate(edit);
                SavePhase::AwaitingInputReady
            }
            SavePhase::AwaitingInputReady => {
                let input = host
                    .query(None, &sel.title_input)
                    .ok_or(AddressingFailure::TitleInput)?;
                host.set_value_native(input, &self.new_title);
                host.dispatch_field_event(input, FieldEvent::Input);
                host.dispatch_field_event(input, FieldEvent::Change);
                SavePhase::AwaitingSaveReady
            }
            SavePhase::AwaitingSaveReady => {
                let save = host
                    .query(None, &sel.save_control)
                    .ok_or(AddressingFailure::SaveControl)?;
                host.activate(save);
                SavePhase::Settling
            }
            SavePhase::Settling | SavePhase::Done => SavePhase::Done,
        };
        Ok(self.phase)
    }
}

/// Undoes the visible side effects of a save when dropped: the overlay
/// suppression goes away and the entry snaps back to full opacity.
struct SaveScope<H: Host> {
    host: Arc<Mutex<H>>,
    entry: NodeId,
    suppression_id: String,
}

impl<H: Host> Drop for SaveScope<H> {
    fn drop(&mut self) {
        let mut host = self.host.lock();
        host.remove_stylesheet(&self.suppression_id);
        restore_entry_instantly(&mut *host, self.entry);
    }
}

/// Write `new_title` into the host through its edit workflow.
///
/// Never retries. A missing host element ends the save early; cleanup runs
/// on every path.
pub async fn save<H: Host>(
    host: Arc<Mutex<H>>,
    config: &Config,
    entry: NodeId,
    new_title: String,
) -> SaveOutcome {
    let _scope = SaveScope {
        host: Arc::clone(&host),
        entry,
        suppression_id: config.appearance.suppression_id.clone(),
    };
    let mut machine = SaveMachine::new(new_title);

    loop {
        let wait = machine.gate(&config.timings);
        if !wait.is_zero() {
            tokio::time::sleep(wait).await;
        }
        let stepped = {
            let mut host = host.lock();
            machine.step(&mut *host, config)
        };
        match stepped {
            Ok(SavePhase::Done) => return SaveOutcome::Saved,
            Ok(phase) => tracing::trace!("save of {} entered {:?}", entry, phase),
            Err(failure) => return SaveOutcome::Aborted(failure),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::host::SimHost;
    use crate::host::sim::EventId;
    use crate::model::Selectors;
    use chrono::NaiveDate;
    use pretty_assertions::assert_eq;

    fn host_with_popover(title: &str) -> (Arc<Mutex<SimHost>>, EventId, NodeId) {
        let mut host = SimHost::new(Selectors::default());
        let day = NaiveDate::from_ymd_opt(2026, 10, 19).unwrap();
        let event = host.add_event(title, day, None);
        host.render_calendar();
        let entry = host.entry_for(event).unwrap();
        host.user_click(entry);
        (Arc::new(Mutex::new(host)), event, entry)
    }

    #[test]
    fn test_gates_follow_timings() {
        let timings = Timings::default();
        let mut machine = SaveMachine::new("[x] a");
        assert_eq!(machine.gate(&timings), Duration::ZERO);
        machine.phase = SavePhase::AwaitingEditor;
        assert_eq!(machine.gate(&timings), Duration::from_millis(400));
        machine.phase = SavePhase::AwaitingInputReady;
        assert_eq!(machine.gate(&timings), Duration::from_millis(500));
        machine.phase = SavePhase::AwaitingSaveReady;
        assert_eq!(machine.gate(&timings), Duration::from_millis(150));
        machine.phase = SavePhase::Settling;
        assert_eq!(machine.gate(&timings), Duration::from_millis(800));
    }

    #[test]
    fn test_step_walks_every_phase() {
        let (host, event, _) = host_with_popover("[ ] Buy milk");
        let config = Config::default();
        let mut machine = SaveMachine::new("[x] Buy milk");
        let mut host = host.lock();

        let mut phases = Vec::new();
        while machine.phase() != SavePhase::Done {
            phases.push(machine.step(&mut *host, &config).unwrap());
        }
        assert_eq!(
            phases,
            vec![
                SavePhase::AwaitingEditor,
                SavePhase::AwaitingInputReady,
                SavePhase::AwaitingSaveReady,
                SavePhase::Settling,
                SavePhase::Done,
            ]
        );
        assert_eq!(host.saves(), vec![(event, "[x] Buy milk".to_string())]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_save_writes_title_and_cleans_up() {
        let (host, event, entry) = host_with_popover("[ ] Buy milk");
        let config = Config::default();
        host.lock().set_style(entry, "opacity", "0.8", false);

        let started = tokio::time::Instant::now();
        let outcome = save(host.clone(), &config, entry, "[x] Buy milk".into()).await;

        assert_eq!(outcome, SaveOutcome::Saved);
        assert_eq!(started.elapsed(), Duration::from_millis(400 + 500 + 150 + 800));
        let host = host.lock();
        assert_eq!(host.event(event).unwrap().title, "[x] Buy milk");
        assert!(!host.has_stylesheet(&config.appearance.suppression_id));
        assert!(!host.modal_open());
    }

    #[tokio::test(start_paused = true)]
    async fn test_overlays_hidden_while_saving() {
        let (host, _, entry) = host_with_popover("[ ] Buy milk");
        let config = Config::default();
        let task = tokio::spawn({
            let host = host.clone();
            let config = config.clone();
            async move { save(host, &config, entry, "[x] Buy milk".into()).await }
        });

        tokio::time::sleep(Duration::from_millis(10)).await;
        assert!(host.lock().overlays_hidden());
        assert_eq!(task.await.unwrap(), SaveOutcome::Saved);
        assert!(!host.lock().overlays_hidden());
    }

    #[tokio::test(start_paused = true)]
    async fn test_missing_edit_trigger_aborts_with_cleanup() {
        let mut host = SimHost::new(Selectors::default());
        host.quirks.omit_edit_trigger = true;
        let day = NaiveDate::from_ymd_opt(2026, 10, 19).unwrap();
        let event = host.add_event("[ ] Buy milk", day, None);
        host.render_calendar();
        let entry = host.entry_for(event).unwrap();
        host.user_click(entry);
        host.set_style(entry, "transition", "opacity 0.08s ease-out", false);
        host.set_style(entry, "opacity", "0.8", false);
        let host = Arc::new(Mutex::new(host));
        let config = Config::default();

        let outcome = save(host.clone(), &config, entry, "[x] Buy milk".into()).await;

        assert_eq!(outcome, SaveOutcome::Aborted(AddressingFailure::EditTrigger));
        let host = host.lock();
        assert!(!host.has_stylesheet(&config.appearance.suppression_id));
        assert_eq!(host.style(entry, "opacity"), None);
        assert_eq!(host.style(entry, "transition"), None);
        assert!(host.saves().is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn test_missing_save_control_leaves_title_alone() {
        let (host, event, entry) = host_with_popover("[ ] Buy milk");
        host.lock().quirks.omit_save_control = true;
        // The modal is built when the edit trigger is pressed, so the quirk
        // applies even though the popover is already open
        let outcome = save(host.clone(), &Config::default(), entry, "[x] Buy milk".into()).await;
        assert_eq!(outcome, SaveOutcome::Aborted(AddressingFailure::SaveControl));
        assert_eq!(host.lock().event(event).unwrap().title, "[ ] Buy milk");
    }
}
