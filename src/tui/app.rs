use std::io;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use crossterm::event::{self, Event, KeyEventKind};
use crossterm::execute;
use crossterm::terminal::{
    EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode,
};
use parking_lot::Mutex;
use ratatui::Terminal;
use ratatui::backend::CrosstermBackend;
use tokio::sync::mpsc;

use crate::engine::Engine;
use crate::host::sim::{EntryView, Quirks};
use crate::host::{Host, HostEvent, SimHost};
use crate::io::config_io::read_config;
use crate::io::watcher::{ConfigEvent, ConfigWatcher};
use crate::model::Config;
use crate::ops::render::locate_title;

use super::keys;
use super::render;
use super::theme::Theme;

/// Redraw period of the demo loop
const FRAME_INTERVAL: Duration = Duration::from_millis(33);

/// Demo state: the engine (which owns the simulated host) plus the cursor
pub struct App {
    pub engine: Engine<SimHost>,
    pub theme: Theme,
    /// Index into the host's rendered entries
    pub cursor: usize,
    pub should_quit: bool,
    /// One-line notice shown in the status row until the next key press
    pub message: Option<String>,
}

impl App {
    pub fn new(engine: Engine<SimHost>, theme: Theme) -> Self {
        App {
            engine,
            theme,
            cursor: 0,
            should_quit: false,
            message: None,
        }
    }

    pub fn host(&self) -> &Arc<Mutex<SimHost>> {
        self.engine.host()
    }

    pub fn views(&self) -> Vec<EntryView> {
        self.host().lock().entry_views()
    }

    pub fn move_cursor(&mut self, delta: isize) {
        let len = self.views().len();
        if len == 0 {
            self.cursor = 0;
            return;
        }
        let next = self.cursor as isize + delta;
        self.cursor = next.clamp(0, len as isize - 1) as usize;
    }

    fn selected(&self) -> Option<EntryView> {
        let views = self.views();
        views.get(self.cursor.min(views.len().saturating_sub(1))).cloned()
    }

    /// Click the checkbox of the selected entry
    pub fn toggle_selected(&mut self) {
        let Some(view) = self.selected() else {
            return;
        };
        let affordance = self.engine.config().selectors.affordance();
        let found = self.host().lock().query(Some(view.node), &affordance);
        match found {
            Some(aff) => self.host().lock().user_click(aff),
            None => self.message = Some(format!("{} is not a task", view.title)),
        }
    }

    /// Click the selected entry itself, opening the host's popover
    pub fn open_selected(&mut self) {
        let Some(view) = self.selected() else {
            return;
        };
        let selectors = self.engine.config().selectors;
        let mut host = self.host().lock();
        let target = locate_title(&*host, &selectors, view.node).unwrap_or(view.node);
        host.user_click(target);
    }

    pub fn dismiss(&mut self) {
        self.host().lock().click_background();
    }

    /// Make the host re-render every entry with fresh nodes
    pub fn rerender_host(&mut self) {
        self.host().lock().render_calendar();
        self.message = Some("host re-rendered".into());
    }

    pub fn apply_config_event(&mut self, event: ConfigEvent) {
        match event {
            ConfigEvent::Changed(path) => match read_config(&path) {
                Ok(config) => {
                    self.theme = Theme::from_config(&config.ui);
                    self.engine.set_config(config);
                    self.message = Some(format!("reloaded {}", path.display()));
                }
                Err(e) => {
                    tracing::warn!("keeping previous config: {}", e);
                    self.message = Some(format!("config error: {}", e));
                }
            },
            ConfigEvent::Removed(path) => {
                self.message = Some(format!("{} removed; keeping settings", path.display()));
            }
        }
    }
}

/// Run the interactive demo over a sample calendar
pub fn run(
    config: Config,
    quirks: Quirks,
    config_path: Option<PathBuf>,
) -> Result<(), Box<dyn std::error::Error>> {
    let mut host = SimHost::sample(config.selectors.clone());
    host.quirks = quirks;
    let events = host.subscribe();
    let theme = Theme::from_config(&config.ui);
    let mut app = App::new(Engine::new(Arc::new(Mutex::new(host)), config), theme);

    let watcher = match config_path.as_deref().map(ConfigWatcher::start) {
        Some(Ok(w)) => Some(w),
        Some(Err(e)) => {
            tracing::warn!("config hot-reload disabled: {}", e);
            None
        }
        None => None,
    };

    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_time()
        .build()?;

    // Setup terminal
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;
    terminal.clear()?;

    // Install panic hook to restore terminal on panic
    let original_hook = std::panic::take_hook();
    std::panic::set_hook(Box::new(move |panic_info| {
        let _ = disable_raw_mode();
        let _ = execute!(io::stdout(), LeaveAlternateScreen);
        original_hook(panic_info);
    }));

    let result = runtime.block_on(run_event_loop(
        &mut terminal,
        &mut app,
        events,
        watcher.as_ref(),
    ));

    // Restore terminal
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    result
}

async fn run_event_loop(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    app: &mut App,
    events: mpsc::UnboundedReceiver<HostEvent>,
    watcher: Option<&ConfigWatcher>,
) -> Result<(), Box<dyn std::error::Error>> {
    let engine_task = tokio::spawn(app.engine.clone().run(events));

    loop {
        terminal.draw(|frame| render::render(frame, app))?;

        // Zero timeout: the engine's timers only advance while we sleep below
        if event::poll(Duration::ZERO)?
            && let Event::Key(key) = event::read()?
            && key.kind == KeyEventKind::Press
        {
            keys::handle_key(app, key);
        }

        if let Some(change) = watcher.and_then(ConfigWatcher::poll) {
            app.apply_config_event(change);
        }

        if app.should_quit {
            break;
        }
        tokio::time::sleep(FRAME_INTERVAL).await;
    }

    engine_task.abort();
    Ok(())
}
