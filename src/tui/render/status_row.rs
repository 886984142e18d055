use ratatui::Frame;
use ratatui::layout::Rect;
use ratatui::style::Style;
use ratatui::text::{Line, Span};
use ratatui::widgets::Paragraph;

use crate::tui::app::App;
use crate::util::unicode::display_width;

const KEY_HINT: &str = "space toggle  enter open  esc close  r re-render  q quit";

/// Render the status row (bottom of screen): engine counters on the left,
/// a notice or the key hints on the right
pub fn render_status_row(frame: &mut Frame, app: &App, area: Rect) {
    let bg = app.theme.background;
    let width = area.width as usize;
    let stats = app.engine.stats();

    let mut spans = vec![Span::styled(
        format!(
            " scans {}  toggles {}  saves {}/{}",
            stats.scans, stats.toggles, stats.saves_completed, stats.saves_started
        ),
        Style::default().fg(app.theme.text).bg(bg),
    )];
    if stats.saves_aborted > 0 {
        spans.push(Span::styled(
            format!("  aborted {}", stats.saves_aborted),
            Style::default().fg(app.theme.red).bg(bg),
        ));
    }

    let (hint, color) = match &app.message {
        Some(msg) => (msg.as_str(), app.theme.yellow),
        None => (KEY_HINT, app.theme.dim),
    };
    let content_width: usize = spans.iter().map(|s| display_width(&s.content)).sum();
    let hint_width = display_width(hint);
    if content_width + hint_width < width {
        let padding = width - content_width - hint_width;
        spans.push(Span::styled(" ".repeat(padding), Style::default().bg(bg)));
        spans.push(Span::styled(hint.to_string(), Style::default().fg(color).bg(bg)));
    }

    let paragraph = Paragraph::new(Line::from(spans)).style(Style::default().bg(bg));
    frame.render_widget(paragraph, area);
}
