//! Application State
//!
//! Holds the terminal client's view state. The dataset and the transcript are
//! owned by the ingestion gate and the conversation session; the app only
//! keeps the latest snapshots they published.

use crate::ingest::{is_accepted, normalize_dropped_path, IngestionGate, LocalFile};
use crate::models::{DatasetView, SessionState};
use crate::session::ConversationSession;
use crate::tui::event::AppAction;
use tokio::sync::watch;
use tracing::{info, warn};
use tui_textarea::TextArea;

const PLACEHOLDER_NO_DATA: &str = "Upload a dataset to ask data-aware questions (e.g., 'Total sales by region').";
const PLACEHOLDER_WITH_DATA: &str = "Ask a question, e.g., 'Show revenue trend by month' or 'Forecast next quarter'.";

/// Current view/screen
#[derive(Debug, Clone, PartialEq, Default)]
pub enum View {
    #[default]
    Chat,
    OpenFile,
    Help,
}

/// Main application state
pub struct App {
    // UI State
    pub view: View,
    pub should_quit: bool,
    pub spinner_frame: usize,
    /// Problems that happen before a file reaches the ingestion gate
    pub status_message: Option<String>,

    // Backend
    pub backend_connected: bool,
    pub backend_live: bool,

    // Chat State
    pub session: ConversationSession,
    pub conversation: SessionState,
    pub input: TextArea<'static>,
    pub scroll_offset: u16,
    pub max_scroll: u16,

    // Dataset State
    pub gate: IngestionGate,
    pub dataset: DatasetView,
    pub path_input: String,

    session_rx: watch::Receiver<SessionState>,
    dataset_rx: watch::Receiver<DatasetView>,
}

impl App {
    pub fn new(
        gate: IngestionGate,
        session: ConversationSession,
        backend_connected: bool,
        backend_live: bool,
    ) -> Self {
        let session_rx = session.subscribe();
        let dataset_rx = gate.subscribe();
        let conversation = session.state();
        let dataset = gate.current();

        let mut app = Self {
            view: View::Chat,
            should_quit: false,
            spinner_frame: 0,
            status_message: None,
            backend_connected,
            backend_live,
            session,
            conversation,
            input: TextArea::default(),
            scroll_offset: 0,
            max_scroll: 0,
            gate,
            dataset,
            path_input: String::new(),
            session_rx,
            dataset_rx,
        };
        app.reset_input();
        app
    }

    fn reset_input(&mut self) {
        let mut input = TextArea::default();
        input.set_cursor_line_style(ratatui::style::Style::default());
        input.set_placeholder_text(if self.dataset.has_data() {
            PLACEHOLDER_WITH_DATA
        } else {
            PLACEHOLDER_NO_DATA
        });
        self.input = input;
    }

    /// Pull the latest published dataset and conversation snapshots
    pub fn poll_events(&mut self) {
        if self.session_rx.has_changed().unwrap_or(false) {
            self.conversation = self.session_rx.borrow_and_update().clone();
            self.scroll_to_bottom();
        }

        if self.dataset_rx.has_changed().unwrap_or(false) {
            let had_data = self.dataset.has_data();
            self.dataset = self.dataset_rx.borrow_and_update().clone();
            if had_data != self.dataset.has_data() && self.input.is_empty() {
                self.reset_input();
            }
        }
    }

    /// Handle a user action
    pub async fn handle_action(&mut self, action: AppAction) {
        match action {
            AppAction::Quit | AppAction::ForceQuit => {
                self.should_quit = true;
            }
            AppAction::Submit => match self.view {
                View::OpenFile => {
                    let raw = std::mem::take(&mut self.path_input);
                    self.view = View::Chat;
                    self.open_file(&raw).await;
                }
                View::Chat => self.submit_message(),
                View::Help => self.view = View::Chat,
            },
            AppAction::ToggleOpenFile => {
                self.view = if self.view == View::OpenFile {
                    View::Chat
                } else {
                    View::OpenFile
                };
                self.path_input.clear();
            }
            AppAction::ToggleHelp => {
                self.view = if self.view == View::Help {
                    View::Chat
                } else {
                    View::Help
                };
            }
            AppAction::Escape => {
                if self.view != View::Chat {
                    self.view = View::Chat;
                    self.path_input.clear();
                } else {
                    self.status_message = None;
                }
            }
            AppAction::ScrollUp => {
                self.scroll_offset = self.scroll_offset.saturating_sub(1);
            }
            AppAction::ScrollDown => {
                if self.scroll_offset < self.max_scroll {
                    self.scroll_offset += 1;
                }
            }
            AppAction::ScrollPageUp => {
                self.scroll_offset = self.scroll_offset.saturating_sub(10);
            }
            AppAction::ScrollPageDown => {
                self.scroll_offset = (self.scroll_offset + 10).min(self.max_scroll);
            }
            AppAction::DeleteKey => match self.view {
                View::OpenFile => {
                    self.path_input.pop();
                }
                View::Chat => {
                    self.input.delete_char();
                }
                View::Help => {}
            },
            AppAction::Paste(text) => self.handle_paste(text).await,
            AppAction::Input(key) => self.handle_input(key),
            AppAction::Tick => {
                self.spinner_frame = self.spinner_frame.wrapping_add(1);
            }
        }
    }

    fn handle_input(&mut self, key: crossterm::event::KeyEvent) {
        use crossterm::event::KeyCode;

        match self.view {
            View::OpenFile => {
                if let KeyCode::Char(c) = key.code {
                    self.path_input.push(c);
                }
            }
            View::Chat => {
                self.input.input(key);
            }
            View::Help => {
                // Any key closes help
                self.view = View::Chat;
            }
        }
    }

    /// A drop lands here as pasted text. Paths of accepted files are opened,
    /// anything else is typed into the focused input.
    async fn handle_paste(&mut self, text: String) {
        if self.view == View::OpenFile {
            self.path_input.push_str(text.trim());
            return;
        }

        let dropped = normalize_dropped_path(&text).filter(|path| {
            path.is_file()
                && path
                    .file_name()
                    .map(|n| is_accepted(&n.to_string_lossy()))
                    .unwrap_or(false)
        });

        match dropped {
            Some(path) => self.open_file(&path.to_string_lossy()).await,
            None => {
                self.input.insert_str(text);
            }
        }
    }

    /// Open a file by path and hand it to the ingestion gate in the background
    pub async fn open_file(&mut self, raw: &str) {
        let path = match normalize_dropped_path(raw) {
            Some(path) => path,
            None => return,
        };

        match LocalFile::open(&path).await {
            Ok(file) => {
                info!(path = %path.display(), "Opening dataset");
                self.status_message = None;
                let gate = self.gate.clone();
                tokio::spawn(async move {
                    gate.ingest(&file).await;
                });
            }
            Err(e) => {
                warn!(path = %path.display(), "Failed to open dataset: {}", e);
                self.status_message = Some(format!("Could not open {}: {}", path.display(), e));
            }
        }
    }

    /// Queue the typed message on the session
    fn submit_message(&mut self) {
        let content = self.input.lines().join("\n");
        if content.trim().is_empty() {
            return;
        }

        // The reply shows up through the session's published state
        if self.session.submit(&content).is_some() {
            self.reset_input();
            self.scroll_to_bottom();
        }
    }

    fn scroll_to_bottom(&mut self) {
        self.scroll_offset = self.max_scroll;
    }

    /// Update max scroll based on content
    pub fn update_scroll_bounds(&mut self, content_height: u16, viewport_height: u16) {
        let was_at_bottom = self.scroll_offset >= self.max_scroll;
        self.max_scroll = content_height.saturating_sub(viewport_height);
        if was_at_bottom || self.scroll_offset > self.max_scroll {
            self.scroll_offset = self.max_scroll;
        }
    }
}
