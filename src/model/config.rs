use std::time::Duration;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use super::entry::EntryKind;

/// Configuration from calcheck.toml
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub timings: Timings,
    #[serde(default)]
    pub selectors: Selectors,
    #[serde(default)]
    pub appearance: Appearance,
    #[serde(default)]
    pub ui: UiConfig,
}

/// Delays that pace the engine. All values are milliseconds.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Timings {
    /// Quiet period after the last toggle before a save is attempted
    pub debounce_ms: u64,
    /// Wait for the host's event popover before looking for the edit trigger
    pub popover_settle_ms: u64,
    /// Wait for the edit modal before looking for the title input
    pub editor_settle_ms: u64,
    /// Wait after writing the title before looking for the save control
    pub input_settle_ms: u64,
    /// Wait for the host to persist and re-render after save
    pub save_settle_ms: u64,
    /// Delay between the end of a save and the reconciliation re-scan
    pub rescan_cooldown_ms: u64,
    /// Period of the safety-net sweep
    pub sweep_interval_ms: u64,
    /// How long the affordance ignores clicks while an auto-save click is in flight
    pub affordance_reenable_ms: u64,
}

impl Default for Timings {
    fn default() -> Self {
        Timings {
            debounce_ms: 250,
            popover_settle_ms: 400,
            editor_settle_ms: 500,
            input_settle_ms: 150,
            save_settle_ms: 800,
            rescan_cooldown_ms: 1500,
            sweep_interval_ms: 2000,
            affordance_reenable_ms: 100,
        }
    }
}

impl Timings {
    pub fn debounce(&self) -> Duration {
        Duration::from_millis(self.debounce_ms)
    }

    pub fn rescan_cooldown(&self) -> Duration {
        Duration::from_millis(self.rescan_cooldown_ms)
    }

    /// Never zero: a zero-period interval would spin
    pub fn sweep_interval(&self) -> Duration {
        Duration::from_millis(self.sweep_interval_ms.max(1))
    }

    pub fn affordance_reenable(&self) -> Duration {
        Duration::from_millis(self.affordance_reenable_ms)
    }
}

/// The addressing contract: selectors for the host elements the engine reads
/// and drives. Only the host interprets these strings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Selectors {
    pub all_day_entry: String,
    pub timed_entry: String,
    pub all_day_title: String,
    pub timed_title: String,
    pub edit_trigger: String,
    pub title_input: String,
    pub save_control: String,
    /// Popovers and modals hidden while a save runs
    pub overlays: Vec<String>,
    /// Class given to the checkbox affordances this crate inserts
    pub affordance_class: String,
}

impl Default for Selectors {
    fn default() -> Self {
        Selectors {
            all_day_entry: ".calendar-dayeventcell".into(),
            timed_entry: ".calendar-eventcell".into(),
            all_day_title: ".calendar-dayeventcell-title".into(),
            timed_title: ".calendar-eventcell-title".into(),
            edit_trigger: r#"button[data-testid="event-popover:edit"]"#.into(),
            title_input: "#event-title-input".into(),
            save_control: r#"button[data-testid="create-event-modal:save"]"#.into(),
            overlays: vec![
                ".modal-two".into(),
                r#"[role="dialog"]"#.into(),
                ".eventpopover".into(),
            ],
            affordance_class: "task-checkbox".into(),
        }
    }
}

impl Selectors {
    /// Selector for the affordance class
    pub fn affordance(&self) -> String {
        format!(".{}", self.affordance_class)
    }

    pub fn entry(&self, kind: EntryKind) -> &str {
        match kind {
            EntryKind::AllDay => &self.all_day_entry,
            EntryKind::Timed => &self.timed_entry,
        }
    }

    /// Title selectors in lookup order (all-day first, then timed)
    pub fn titles(&self) -> [&str; 2] {
        [&self.all_day_title, &self.timed_title]
    }

    /// CSS rule hiding every overlay from view and from the pointer
    pub fn suppression_css(&self) -> String {
        format!(
            "{} {{ opacity: 0 !important; pointer-events: none !important; }}",
            self.overlays.join(", ")
        )
    }
}

/// Visual treatment of task entries
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Appearance {
    /// Title opacity once a task is checked
    pub checked_opacity: String,
    /// Entry opacity while a toggle waits to be saved
    pub pending_opacity: String,
    /// Transition applied when dimming a pending entry
    pub pending_transition: String,
    /// Id of the stylesheet installed while a save runs
    pub suppression_id: String,
}

impl Default for Appearance {
    fn default() -> Self {
        Appearance {
            checked_opacity: "0.6".into(),
            pending_opacity: "0.8".into(),
            pending_transition: "opacity 0.08s ease-out".into(),
            suppression_id: "task-checkbox-suppress".into(),
        }
    }
}

/// Terminal demo settings
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct UiConfig {
    /// Palette overrides, e.g. `highlight = "#FB4196"`
    pub colors: IndexMap<String, String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_empty_config_takes_defaults() {
        let config: Config = toml::from_str("").unwrap();
        assert_eq!(config, Config::default());
    }

    #[test]
    fn test_partial_timings_keep_other_defaults() {
        let config: Config = toml::from_str("[timings]\ndebounce_ms = 50\n").unwrap();
        assert_eq!(config.timings.debounce_ms, 50);
        assert_eq!(config.timings.save_settle_ms, 800);
        assert_eq!(config.selectors, Selectors::default());
    }

    #[test]
    fn test_suppression_css_lists_all_overlays() {
        let css = Selectors::default().suppression_css();
        assert_eq!(
            css,
            r#".modal-two, [role="dialog"], .eventpopover { opacity: 0 !important; pointer-events: none !important; }"#
        );
    }

    #[test]
    fn test_ui_colors_keep_file_order() {
        let config: Config =
            toml::from_str("[ui.colors]\ndim = \"#222222\"\ntext = \"#EEEEEE\"\n").unwrap();
        let keys: Vec<&str> = config.ui.colors.keys().map(String::as_str).collect();
        assert_eq!(keys, vec!["dim", "text"]);
    }

    #[test]
    fn test_zero_sweep_interval_is_clamped() {
        let timings = Timings {
            sweep_interval_ms: 0,
            ..Timings::default()
        };
        assert_eq!(timings.sweep_interval(), Duration::from_millis(1));
    }
}
