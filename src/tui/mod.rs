//! Terminal User Interface Module
//!
//! Interactive client for uploading a dataset and chatting about it.
//! Built with Ratatui; dropped files arrive as bracketed pastes.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────┐
//! │  DataChat Conversational Analysis   ● AI engine connected [Live] │
//! ├──────────────────────────┬──────────────────────────────────────┤
//! │ ┌─ Dataset ────────────┐ │ ┌─ Messages ───────────────────────┐ │
//! │ │ sales.csv  1.2 KB    │ │ │ Assistant:                       │ │
//! │ │ notice               │ │ │   Welcome! Upload a CSV...       │ │
//! │ │ [first 5 rows table] │ │ │ You:                             │ │
//! │ └──────────────────────┘ │ └──────────────────────────────────┘ │
//! ├──────────────────────────┴──────────────────────────────────────┤
//! │ ┌─ Ask ───────────────────────────────────────────────────────┐ │
//! │ └─────────────────────────────────────────────────────────────┘ │
//! │ Ready │ [Enter] Send [Ctrl+O] Open file [Ctrl+Q] Quit [F1] Help  │
//! └─────────────────────────────────────────────────────────────────┘
//! ```

pub mod app;
pub mod event;
pub mod theme;
pub mod ui;
pub mod widgets;

pub use app::{App, View};
pub use event::{AppAction, EventHandler};

use crate::config::Config;
use crate::dispatch;
use crate::ingest::IngestionGate;
use crate::session::ConversationSession;
use crossterm::{
    event::{DisableBracketedPaste, EnableBracketedPaste},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::backend::CrosstermBackend;
use ratatui::Terminal;
use std::io::{self, Stdout};
use std::path::PathBuf;
use tracing::{error, info};

/// Type alias for our terminal backend
pub type Tui = Terminal<CrosstermBackend<Stdout>>;

/// Initialize the terminal for TUI mode
pub fn init_terminal() -> anyhow::Result<Tui> {
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableBracketedPaste)?;
    let backend = CrosstermBackend::new(stdout);
    let terminal = Terminal::new(backend)?;
    Ok(terminal)
}

/// Restore the terminal to its original state
pub fn restore_terminal(terminal: &mut Tui) -> anyhow::Result<()> {
    disable_raw_mode()?;
    execute!(
        terminal.backend_mut(),
        LeaveAlternateScreen,
        DisableBracketedPaste
    )?;
    terminal.show_cursor()?;
    Ok(())
}

/// Run the TUI application
pub async fn run(config: Config, initial_file: Option<PathBuf>) -> anyhow::Result<()> {
    info!("Starting TUI mode");

    // Probe before taking over the terminal
    let backend_available = dispatch::resolve_availability(&config.backend).await;
    let dispatcher = dispatch::build_dispatcher(&config.backend, backend_available);
    let backend_live = dispatcher.is_live();

    let gate = IngestionGate::new(config.preview.options());
    let session = ConversationSession::with_welcome(
        dispatcher,
        gate.subscribe(),
        config.backend.timeout(),
    );

    let mut app = App::new(gate, session, backend_available, backend_live);
    if let Some(path) = initial_file {
        app.open_file(&path.to_string_lossy()).await;
    }

    let mut terminal = init_terminal()?;
    let mut events = EventHandler::new(std::time::Duration::from_millis(100));

    let result = run_app(&mut terminal, &mut app, &mut events).await;

    if let Err(e) = restore_terminal(&mut terminal) {
        error!("Failed to restore terminal: {}", e);
    }

    result
}

/// Main application loop
async fn run_app(
    terminal: &mut Tui,
    app: &mut App,
    events: &mut EventHandler,
) -> anyhow::Result<()> {
    loop {
        // Pick up dataset and transcript changes published by background tasks
        app.poll_events();

        terminal.draw(|frame| ui::render(frame, app))?;

        match events.next().await {
            Some(action) => app.handle_action(action).await,
            None => break,
        }

        if app.should_quit {
            break;
        }
    }

    info!("TUI exited normally");
    Ok(())
}
