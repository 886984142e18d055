use ratatui::Frame;
use ratatui::layout::Rect;
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Paragraph};

use crate::host::sim::EntryView;
use crate::tui::app::App;
use crate::util::unicode::{fit_to_width, truncate_to_width};

/// Width of the time column ("all-day" / "09:30")
const TIME_COL: usize = 8;

/// Render the host's entries as the engine left them
pub fn render_calendar_view(frame: &mut Frame, app: &App, area: Rect) {
    let block = Block::default()
        .borders(Borders::ALL)
        .title(" calendar ")
        .style(Style::default().fg(app.theme.dim).bg(app.theme.background));
    let inner = block.inner(area);
    frame.render_widget(block, area);

    let views = app.views();
    let cursor = app.cursor.min(views.len().saturating_sub(1));
    let lines: Vec<Line> = views
        .iter()
        .enumerate()
        .map(|(i, view)| entry_line(app, view, i == cursor, inner.width as usize))
        .collect();

    frame.render_widget(Paragraph::new(lines), inner);
}

fn entry_line<'a>(app: &App, view: &EntryView, is_cursor: bool, width: usize) -> Line<'a> {
    let theme = &app.theme;
    let bg = if is_cursor {
        theme.selection_bg
    } else {
        theme.background
    };
    let base = Style::default().fg(theme.text).bg(bg);

    let pointer = if is_cursor { "\u{25B8} " } else { "  " };
    let time = match view.start {
        Some(t) => t.format("%H:%M").to_string(),
        None => "all-day".to_string(),
    };
    let mut spans = vec![
        Span::styled(pointer, base.fg(theme.highlight)),
        Span::styled(fit_to_width(&time, TIME_COL), base.fg(theme.dim)),
    ];

    match view.glyph {
        Some(glyph) => spans.push(Span::styled(
            format!("{} ", glyph.symbol()),
            base.fg(theme.glyph_color(glyph)),
        )),
        None => spans.push(Span::styled("  ", base)),
    }

    let mut title_style = base;
    if view.struck {
        title_style = title_style.add_modifier(Modifier::CROSSED_OUT);
    }
    if view.title_opacity.as_deref().is_some_and(|o| o != "1") {
        title_style = title_style.add_modifier(Modifier::DIM);
    }
    // Pending entries are dimmed as a whole until their save lands
    if view.entry_opacity.is_some() {
        title_style = title_style.fg(theme.dim).add_modifier(Modifier::ITALIC);
    }
    let used = 2 + TIME_COL + 2;
    spans.push(Span::styled(
        truncate_to_width(&view.title, width.saturating_sub(used)),
        title_style,
    ));

    Line::from(spans)
}
