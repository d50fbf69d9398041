//! Open File Widget
//!
//! Modal prompt for the path of a dataset to load.

use crate::ingest::ACCEPTED_EXTENSIONS;
use crate::tui::app::App;
use crate::tui::theme::{Icons, Theme};
use crate::tui::ui::centered_rect;
use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph},
    Frame,
};

/// Render the open-file modal
pub fn render_file_prompt(frame: &mut Frame, app: &App) {
    let area = centered_rect(60, 30, frame.area());
    frame.render_widget(Clear, area);

    let block = Block::default()
        .title(" Open Dataset ")
        .borders(Borders::ALL)
        .border_style(Theme::border_focused());

    let inner = block.inner(area);
    frame.render_widget(block, area);

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .margin(1)
        .constraints([
            Constraint::Length(2), // Instructions
            Constraint::Length(1), // Path input
            Constraint::Min(0),
            Constraint::Length(1), // Footer
        ])
        .split(inner);

    render_instructions(frame, chunks[0]);
    render_path_input(frame, chunks[1], app);
    render_footer(frame, chunks[3]);
}

fn render_instructions(frame: &mut Frame, area: Rect) {
    let accepted = ACCEPTED_EXTENSIONS
        .iter()
        .map(|ext| format!(".{}", ext))
        .collect::<Vec<_>>()
        .join(", ");

    let lines = vec![
        Line::from(Span::styled("Path of the file to upload:", Theme::text())),
        Line::from(Span::styled(
            format!("Accepted: {} (only CSV is previewed locally)", accepted),
            Theme::text_dim(),
        )),
    ];
    frame.render_widget(Paragraph::new(lines), area);
}

fn render_path_input(frame: &mut Frame, area: Rect, app: &App) {
    let line = Line::from(vec![
        Span::styled("> ", Theme::shortcut_key()),
        Span::styled(app.path_input.clone(), Theme::text()),
        Span::styled(Icons::CURSOR, Theme::active()),
    ]);
    frame.render_widget(Paragraph::new(line), area);
}

fn render_footer(frame: &mut Frame, area: Rect) {
    let line = Line::from(vec![
        Span::styled("[Enter]", Theme::shortcut_key()),
        Span::styled(" Open ", Theme::shortcut_desc()),
        Span::styled("[Esc]", Theme::shortcut_key()),
        Span::styled(" Cancel", Theme::shortcut_desc()),
    ]);
    frame.render_widget(Paragraph::new(line), area);
}
