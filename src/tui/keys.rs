use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

use super::app::App;

/// Key bindings of the demo
pub fn handle_key(app: &mut App, key: KeyEvent) {
    app.message = None;
    match (key.modifiers, key.code) {
        (m, KeyCode::Char('c')) if m.contains(KeyModifiers::CONTROL) => app.should_quit = true,
        (_, KeyCode::Char('q')) => app.should_quit = true,
        (_, KeyCode::Up | KeyCode::Char('k')) => app.move_cursor(-1),
        (_, KeyCode::Down | KeyCode::Char('j')) => app.move_cursor(1),
        (_, KeyCode::Char(' ') | KeyCode::Char('x')) => app.toggle_selected(),
        (_, KeyCode::Enter) => app.open_selected(),
        (_, KeyCode::Esc) => app.dismiss(),
        (_, KeyCode::Char('r')) => app.rerender_host(),
        _ => {}
    }
}
