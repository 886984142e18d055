use serde::Serialize;

use crate::engine::EngineStats;
use crate::model::TaskMarker;
use crate::parse::format_marker;

// ---------------------------------------------------------------------------
// JSON output structs
// ---------------------------------------------------------------------------

#[derive(Serialize)]
pub struct MarkerJson {
    pub is_task: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub checked: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub canonical: Option<String>,
}

impl MarkerJson {
    pub fn from_marker(marker: Option<&TaskMarker>) -> Self {
        match marker {
            Some(m) => MarkerJson {
                is_task: true,
                checked: Some(m.checked),
                text: Some(m.text.clone()),
                canonical: Some(format_marker(m.checked, &m.text)),
            },
            None => MarkerJson {
                is_task: false,
                checked: None,
                text: None,
                canonical: None,
            },
        }
    }
}

#[derive(Debug, Serialize)]
pub struct SaveJson {
    pub title: String,
}

#[derive(Debug, Serialize)]
pub struct SimulateJson {
    pub initial_title: String,
    pub final_title: String,
    pub toggles: u32,
    pub saves: Vec<SaveJson>,
    pub stats: EngineStats,
}

// ---------------------------------------------------------------------------
// Text formatting
// ---------------------------------------------------------------------------

pub fn format_marker_text(title: &str, marker: Option<&TaskMarker>) -> String {
    match marker {
        Some(m) => format!(
            "task      yes\nchecked   {}\ntext      {}\ncanonical {}",
            if m.checked { "yes" } else { "no" },
            m.text,
            format_marker(m.checked, &m.text)
        ),
        None => format!("task      no\ntitle     {}", title),
    }
}

pub fn format_simulate_text(report: &SimulateJson) -> String {
    let mut lines = vec![
        format!("before    {}", report.initial_title),
        format!("after     {}", report.final_title),
        format!("toggles   {}", report.toggles),
    ];
    if report.saves.is_empty() {
        lines.push("saves     none".to_string());
    }
    for save in &report.saves {
        lines.push(format!("saved     {}", save.title));
    }
    let stats = &report.stats;
    lines.push(format!(
        "engine    {} started, {} completed, {} aborted",
        stats.saves_started, stats.saves_completed, stats.saves_aborted
    ));
    if let Some(failure) = &stats.last_failure {
        lines.push(format!("failure   {}", failure));
    }
    lines.join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parse::parse_marker;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_marker_json_for_task() {
        let marker = parse_marker("[X]  Buy milk");
        let json = serde_json::to_value(MarkerJson::from_marker(marker.as_ref())).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "is_task": true,
                "checked": true,
                "text": "Buy milk",
                "canonical": "[x] Buy milk",
            })
        );
    }

    #[test]
    fn test_marker_json_for_plain_title() {
        let json = serde_json::to_value(MarkerJson::from_marker(None)).unwrap();
        assert_eq!(json, serde_json::json!({ "is_task": false }));
    }

    #[test]
    fn test_simulate_text_lists_saves_and_failure() {
        let report = SimulateJson {
            initial_title: "[ ] Buy milk".into(),
            final_title: "[ ] Buy milk".into(),
            toggles: 1,
            saves: vec![],
            stats: EngineStats {
                saves_started: 1,
                saves_aborted: 1,
                last_failure: Some("edit trigger not found".into()),
                ..EngineStats::default()
            },
        };
        let text = format_simulate_text(&report);
        assert!(text.contains("saves     none"));
        assert!(text.contains("1 started, 0 completed, 1 aborted"));
        assert!(text.ends_with("failure   edit trigger not found"));
    }
}
