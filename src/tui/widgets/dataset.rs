//! Dataset Widget
//!
//! File metadata, the ingestion notice, and the preview table.

use crate::models::{DatasetView, NoticeLevel};
use crate::tui::theme::{Icons, Theme};
use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    text::{Line, Span},
    widgets::{Block, Borders, Cell, Paragraph, Row, Table, Wrap},
    Frame,
};

/// Render the dataset panel
pub fn render_dataset(frame: &mut Frame, area: Rect, dataset: &DatasetView, spinner_frame: usize) {
    let block = Block::default()
        .title(" Dataset ")
        .borders(Borders::ALL)
        .border_style(Theme::border());

    let inner = block.inner(area);
    frame.render_widget(block, area);

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3), // File info / upload hint
            Constraint::Length(2), // Notice
            Constraint::Min(3),    // Preview
        ])
        .split(inner);

    render_file_info(frame, chunks[0], dataset, spinner_frame);
    render_notice(frame, chunks[1], dataset);
    render_preview(frame, chunks[2], dataset);
}

fn render_file_info(frame: &mut Frame, area: Rect, dataset: &DatasetView, spinner_frame: usize) {
    let lines = match &dataset.file {
        Some(file) => {
            let mut title = vec![Span::styled(file.name.clone(), Theme::heading())];
            if dataset.busy {
                title.push(Span::raw("  "));
                title.push(Span::styled(Icons::spinner(spinner_frame), Theme::active()));
            }
            vec![
                Line::from(title),
                Line::from(vec![
                    Span::styled(format_size(file.size_bytes), Theme::text_secondary()),
                    Span::raw("  "),
                    Span::styled(format!(" {} ", file.mime_type), Theme::badge_primary()),
                ]),
            ]
        }
        None => vec![
            Line::from(vec![
                Span::styled(format!("{} ", Icons::UPLOAD), Theme::title()),
                Span::styled("Upload your dataset", Theme::heading()),
            ]),
            Line::from(Span::styled(
                "CSV, Excel (.xlsx, .xls) or Parquet. Drop a file here or press Ctrl+O.",
                Theme::text_secondary(),
            )),
        ],
    };

    let paragraph = Paragraph::new(lines).wrap(Wrap { trim: true });
    frame.render_widget(paragraph, area);
}

fn render_notice(frame: &mut Frame, area: Rect, dataset: &DatasetView) {
    if let Some(notice) = &dataset.notice {
        let style = match notice.level {
            NoticeLevel::Info => Theme::warning(),
            NoticeLevel::Error => Theme::error(),
        };
        let paragraph =
            Paragraph::new(Span::styled(notice.text.clone(), style)).wrap(Wrap { trim: true });
        frame.render_widget(paragraph, area);
    }
}

fn render_preview(frame: &mut Frame, area: Rect, dataset: &DatasetView) {
    if dataset.file.is_none() {
        return;
    }

    let preview = &dataset.preview;
    if preview.rows.is_empty() {
        let text = if dataset.busy {
            "Reading file..."
        } else {
            "A quick profile and summary will appear here once the backend processes your file."
        };
        let paragraph =
            Paragraph::new(Span::styled(text, Theme::text_dim())).wrap(Wrap { trim: true });
        frame.render_widget(paragraph, area);
        return;
    }

    let header = Row::new(
        preview
            .columns
            .iter()
            .map(|c| Cell::from(c.clone()).style(Theme::table_header())),
    );

    let rows = (0..preview.rows.len()).map(|i| {
        Row::new(
            preview
                .columns
                .iter()
                .map(|c| Cell::from(preview.cell(i, c).to_string()).style(Theme::text())),
        )
    });

    let widths = vec![Constraint::Min(6); preview.columns.len().max(1)];
    let table = Table::new(rows, widths)
        .header(header)
        .column_spacing(2)
        .block(
            Block::default()
                .title(format!(" Data preview (first {} rows) ", preview.rows.len()))
                .title_style(Theme::text_secondary()),
        );

    frame.render_widget(table, area);
}

/// Size in KB with one decimal, as shown next to the file name
pub fn format_size(size_bytes: u64) -> String {
    format!("{:.1} KB", size_bytes as f64 / 1024.0)
}
