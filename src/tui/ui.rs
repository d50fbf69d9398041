//! UI Rendering
//!
//! Main UI layout and rendering logic for the TUI.

use crate::models::Role;
use crate::tui::app::{App, View};
use crate::tui::theme::{Icons, Theme};
use crate::tui::widgets;
use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph},
    Frame,
};

/// Render the main UI
pub fn render(frame: &mut Frame, app: &mut App) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3), // Header
            Constraint::Min(10),   // Dataset + messages
            Constraint::Length(4), // Input
            Constraint::Length(1), // Status bar
        ])
        .split(frame.area());

    let body = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(40), Constraint::Percentage(60)])
        .split(chunks[1]);

    render_header(frame, chunks[0], app);
    widgets::render_dataset(frame, body[0], &app.dataset, app.spinner_frame);
    render_messages(frame, body[1], app);
    render_input(frame, chunks[2], app);
    render_status_bar(frame, chunks[3], app);

    match app.view {
        View::OpenFile => widgets::render_file_prompt(frame, app),
        View::Help => render_help(frame),
        View::Chat => {}
    }
}

/// Render the header with the backend status
fn render_header(frame: &mut Frame, area: Rect, app: &App) {
    let (status, badge) = if app.backend_connected {
        (
            Span::styled(
                format!("{} AI engine connected", Icons::CONNECTED),
                Theme::text_secondary(),
            ),
            Span::styled(
                if app.backend_live { " Live " } else { " Connected " },
                Theme::badge_success(),
            ),
        )
    } else {
        (
            Span::styled(
                format!("{} Waiting for backend connection", Icons::CONNECTED),
                Theme::text_dim(),
            ),
            Span::styled(" Demo mode ", Theme::badge_warning()),
        )
    };

    let title = Paragraph::new(Line::from(vec![
        Span::styled("DataChat", Theme::title()),
        Span::styled(" Conversational Analysis", Theme::text_secondary()),
        Span::raw("   "),
        status,
        Span::raw("  "),
        badge,
    ]))
    .alignment(Alignment::Center)
    .block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(Theme::border()),
    );

    frame.render_widget(title, area);
}

/// Render the message history
fn render_messages(frame: &mut Frame, area: Rect, app: &mut App) {
    let block = Block::default()
        .title(" Messages ")
        .borders(Borders::ALL)
        .border_style(if app.view == View::Chat {
            Theme::border_focused()
        } else {
            Theme::border()
        });

    let inner_area = block.inner(area);
    frame.render_widget(block, area);

    let indent = "  ";
    let max_line_width = (inner_area.width as usize).saturating_sub(indent.len()).max(1);
    let mut lines: Vec<Line> = Vec::new();

    for msg in &app.conversation.transcript {
        let (prefix, style) = match msg.role {
            Role::User => ("You", Theme::user_message()),
            Role::Assistant => ("Assistant", Theme::assistant_message()),
        };
        lines.push(Line::from(Span::styled(format!("{}: ", prefix), style)));

        for line in msg.content.lines() {
            if line.is_empty() {
                lines.push(Line::from(indent));
                continue;
            }
            for chunk in wrap_line(line, max_line_width) {
                lines.push(Line::from(vec![
                    Span::raw(indent),
                    Span::styled(chunk, Theme::text()),
                ]));
            }
        }

        lines.push(Line::from(""));
    }

    if app.conversation.pending {
        lines.push(Line::from(vec![
            Span::styled(format!("{} ", Icons::spinner(app.spinner_frame)), Theme::active()),
            Span::styled("Thinking...", Theme::text_secondary()),
        ]));
    }

    app.update_scroll_bounds(content_height(lines.len()), inner_area.height);

    let paragraph = Paragraph::new(lines).scroll((app.scroll_offset, 0));
    frame.render_widget(paragraph, inner_area);
}

/// Rendered line count, saturating at the widest scroll offset ratatui accepts
fn content_height(line_count: usize) -> u16 {
    u16::try_from(line_count).unwrap_or(u16::MAX)
}

/// Split a line into chunks of at most `max_width` characters, preferring
/// to break after whitespace or punctuation.
pub fn wrap_line(line: &str, max_width: usize) -> Vec<String> {
    let max_width = max_width.max(1);
    let mut chunks = Vec::new();
    let mut remaining = line;

    while !remaining.is_empty() {
        if remaining.chars().count() <= max_width {
            chunks.push(remaining.to_string());
            break;
        }

        // Byte index just past the last break character within the limit
        let mut break_at = None;
        let mut limit = remaining.len();
        for (seen, (idx, ch)) in remaining.char_indices().enumerate() {
            if seen >= max_width {
                limit = idx;
                if ch.is_whitespace() {
                    break_at = Some(idx);
                }
                break;
            }
            if ch.is_whitespace() || ch == ',' || ch == '.' || ch == ';' {
                break_at = Some(idx + ch.len_utf8());
            }
        }

        let split_at = break_at.unwrap_or(limit);
        let (chunk, rest) = remaining.split_at(split_at);
        chunks.push(chunk.trim_end().to_string());
        remaining = rest.trim_start();
    }

    chunks
}

/// Render the input area
fn render_input(frame: &mut Frame, area: Rect, app: &App) {
    let block = Block::default()
        .title(" Ask ")
        .borders(Borders::ALL)
        .border_style(if app.view == View::Chat {
            Theme::border_focused()
        } else {
            Theme::border()
        });

    let inner = block.inner(area);
    frame.render_widget(block, area);
    frame.render_widget(&app.input, inner);
}

/// Render the status bar
fn render_status_bar(frame: &mut Frame, area: Rect, app: &App) {
    let status = if let Some(message) = &app.status_message {
        Span::styled(message.clone(), Theme::error())
    } else if app.conversation.pending {
        Span::styled("Thinking...", Theme::active())
    } else if app.dataset.busy {
        Span::styled("Reading file...", Theme::active())
    } else {
        Span::styled("Ready", Theme::text_secondary())
    };

    let shortcuts = vec![
        Span::styled(" [Enter]", Theme::shortcut_key()),
        Span::styled(" Send ", Theme::shortcut_desc()),
        Span::styled("[Ctrl+O]", Theme::shortcut_key()),
        Span::styled(" Open file ", Theme::shortcut_desc()),
        Span::styled("[Ctrl+Q]", Theme::shortcut_key()),
        Span::styled(" Quit ", Theme::shortcut_desc()),
        Span::styled("[F1]", Theme::shortcut_key()),
        Span::styled(" Help", Theme::shortcut_desc()),
    ];

    let line = Line::from(
        std::iter::once(status)
            .chain(std::iter::once(Span::raw(" │ ")))
            .chain(shortcuts)
            .collect::<Vec<_>>(),
    );

    frame.render_widget(Paragraph::new(line), area);
}

/// Render the help modal
fn render_help(frame: &mut Frame) {
    let area = centered_rect(60, 60, frame.area());
    frame.render_widget(Clear, area);

    let shortcut = |key: &'static str, desc: &'static str| {
        Line::from(vec![
            Span::styled(key, Theme::shortcut_key()),
            Span::styled(desc, Theme::text()),
        ])
    };

    let help_lines = vec![
        Line::from(Span::styled("Keyboard Shortcuts", Theme::heading())),
        Line::from(""),
        shortcut("Enter        ", "Send message / Confirm"),
        shortcut("Shift+Enter  ", "New line"),
        shortcut("Ctrl+O       ", "Open a dataset"),
        shortcut("Ctrl+Q       ", "Quit application"),
        shortcut("Ctrl+C       ", "Force quit"),
        shortcut("↑/↓          ", "Scroll messages"),
        shortcut("PageUp/Down  ", "Scroll page"),
        shortcut("Esc          ", "Close modal / Dismiss status"),
        shortcut("F1           ", "Show this help"),
        Line::from(""),
        Line::from(Span::styled(
            "Drop a .csv, .xlsx, .xls or .parquet file onto the terminal to upload it.",
            Theme::text_secondary(),
        )),
        Line::from(Span::styled(
            "Ask for charts or summaries, e.g. \"Predict revenue for next month\".",
            Theme::text_secondary(),
        )),
        Line::from(""),
        Line::from(Span::styled("Press any key to close", Theme::text_dim())),
    ];

    let paragraph = Paragraph::new(help_lines).block(
        Block::default()
            .title(" Help ")
            .borders(Borders::ALL)
            .border_style(Theme::border_focused()),
    );

    frame.render_widget(paragraph, area);
}

/// Helper to create a centered rect
pub fn centered_rect(percent_x: u16, percent_y: u16, area: Rect) -> Rect {
    let popup_layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage((100 - percent_y) / 2),
            Constraint::Percentage(percent_y),
            Constraint::Percentage((100 - percent_y) / 2),
        ])
        .split(area);

    Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage((100 - percent_x) / 2),
            Constraint::Percentage(percent_x),
            Constraint::Percentage((100 - percent_x) / 2),
        ])
        .split(popup_layout[1])[1]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_wrap_short_line() {
        assert_eq!(wrap_line("hello", 10), vec!["hello"]);
    }

    #[test]
    fn test_wrap_prefers_spaces() {
        assert_eq!(
            wrap_line("show sales by region", 10),
            vec!["show sales", "by region"]
        );
    }

    #[test]
    fn test_wrap_long_word() {
        assert_eq!(wrap_line("abcdefghij", 4), vec!["abcd", "efgh", "ij"]);
    }

    #[test]
    fn test_wrap_multibyte() {
        let chunks = wrap_line("ééééé", 2);
        assert_eq!(chunks, vec!["éé", "éé", "é"]);
    }

    #[test]
    fn test_content_height_saturates() {
        assert_eq!(content_height(42), 42);
        assert_eq!(content_height(65_535), u16::MAX);
        assert_eq!(content_height(70_000), u16::MAX);
    }

    #[test]
    fn test_centered_rect_inside_area() {
        let area = Rect::new(0, 0, 100, 50);
        let rect = centered_rect(60, 60, area);
        assert_eq!(rect.width, 60);
        assert_eq!(rect.height, 30);
        assert_eq!(rect.x, 20);
    }
}
