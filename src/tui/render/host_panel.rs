use ratatui::Frame;
use ratatui::layout::Rect;
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Paragraph};

use crate::host::sim::HostAction;
use crate::tui::app::App;
use crate::util::unicode::truncate_to_width;

/// Journal entries shown under the stored titles
const RECENT_ACTIONS: usize = 6;

/// Render what the host has actually stored, its overlay state and the
/// tail of its action journal
pub fn render_host_panel(frame: &mut Frame, app: &App, area: Rect) {
    let theme = &app.theme;
    let block = Block::default()
        .borders(Borders::ALL)
        .title(" host ")
        .style(Style::default().fg(theme.dim).bg(theme.background));
    let inner = block.inner(area);
    frame.render_widget(block, area);
    let width = inner.width as usize;

    let heading = Style::default()
        .fg(theme.text)
        .bg(theme.background)
        .add_modifier(Modifier::BOLD);
    let plain = Style::default().fg(theme.text).bg(theme.background);
    let dim = Style::default().fg(theme.dim).bg(theme.background);

    let host = app.host().lock();
    let mut lines = vec![Line::from(Span::styled("stored titles", heading))];
    for (_, event) in host.events() {
        lines.push(Line::from(Span::styled(
            truncate_to_width(&format!(" {}", event.title), width),
            plain,
        )));
    }

    lines.push(Line::from(""));
    let flag = |label: &str, on: bool, on_text: &str, off_text: &str| {
        let (text, color) = if on {
            (on_text, theme.yellow)
        } else {
            (off_text, theme.dim)
        };
        Line::from(vec![
            Span::styled(format!(" {:<9}", label), dim),
            Span::styled(text.to_string(), Style::default().fg(color).bg(theme.background)),
        ])
    };
    lines.push(flag("popover", host.popover_open(), "open", "closed"));
    lines.push(flag("editor", host.modal_open(), "open", "closed"));
    lines.push(flag("overlays", host.overlays_hidden(), "hidden", "visible"));

    lines.push(Line::from(""));
    lines.push(Line::from(Span::styled("recent", heading)));
    let journal = host.journal();
    for action in &journal[journal.len().saturating_sub(RECENT_ACTIONS)..] {
        lines.push(Line::from(Span::styled(
            truncate_to_width(&format!(" {}", describe(action)), width),
            dim,
        )));
    }

    frame.render_widget(Paragraph::new(lines), inner);
}

fn describe(action: &HostAction) -> String {
    match action {
        HostAction::Pointer { node, kind } => format!("pointer {:?} on {}", kind, node).to_lowercase(),
        HostAction::Activated { node } => format!("activated {}", node),
        HostAction::PopoverOpened { event } => format!("popover for {}", event),
        HostAction::ModalOpened { event } => format!("editor for {}", event),
        HostAction::Saved { event, title } => format!("saved {} {:?}", event, title),
        HostAction::Rendered { entries } => format!("rendered {} entries", entries),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::host::PointerKind;
    use crate::host::sim::EventId;
    use crate::model::NodeId;
    use crate::tui::render::test_helpers::*;

    #[test]
    fn test_panel_lists_stored_titles_with_markers() {
        let app = sample_app();
        let output = render_to_string(40, 24, |frame, area| {
            render_host_panel(frame, &app, area);
        });
        assert!(output.contains(" [ ] Pay rent"));
        assert!(output.contains(" [X]   Send invoice"));
        assert!(output.contains("popover  closed"));
        assert!(output.contains("overlays visible"));
        assert!(output.contains("rendered 7 entries"));
    }

    #[test]
    fn test_panel_shows_open_popover() {
        let app = sample_app();
        let entry = app.views()[0].node;
        app.host().lock().user_click(entry);
        let output = render_to_string(40, 24, |frame, area| {
            render_host_panel(frame, &app, area);
        });
        assert!(output.contains("popover  open"));
        assert!(output.contains("popover for event-0"));
    }

    #[test]
    fn test_describe_actions() {
        assert_eq!(
            describe(&HostAction::Pointer {
                node: NodeId(4),
                kind: PointerKind::Click
            }),
            "pointer click on #4"
        );
        assert_eq!(
            describe(&HostAction::Saved {
                event: EventId(2),
                title: "[x] Book flights".into()
            }),
            "saved event-2 \"[x] Book flights\""
        );
    }
}
