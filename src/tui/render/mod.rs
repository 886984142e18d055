pub mod calendar_view;
pub mod host_panel;
pub mod status_row;
#[cfg(test)]
pub mod test_helpers;

use ratatui::Frame;
use ratatui::layout::{Constraint, Direction, Layout};
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Paragraph};

use super::app::App;

/// Main render function: header, calendar and host panels, status row
pub fn render(frame: &mut Frame, app: &App) {
    let area = frame.area();

    let bg_style = Style::default().bg(app.theme.background);
    frame.render_widget(Block::default().style(bg_style), area);

    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1), // header
            Constraint::Min(1),    // panels
            Constraint::Length(1), // status row
        ])
        .split(area);

    let header = Line::from(Span::styled(
        " calcheck \u{00B7} simulated calendar",
        Style::default()
            .fg(app.theme.highlight)
            .bg(app.theme.background)
            .add_modifier(Modifier::BOLD),
    ));
    frame.render_widget(Paragraph::new(header), rows[0]);

    let panels = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(60), Constraint::Percentage(40)])
        .split(rows[1]);

    calendar_view::render_calendar_view(frame, app, panels[0]);
    host_panel::render_host_panel(frame, app, panels[1]);
    status_row::render_status_row(frame, app, rows[2]);
}
