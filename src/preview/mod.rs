//! Tabular Preview Parser
//!
//! Turns raw delimited text into a bounded [`PreviewResult`]: the header line
//! plus at most [`MAX_PREVIEW_ROWS`] data lines. Parsing is total; degenerate
//! input yields an empty preview, never an error.
//!
//! Two split modes exist. [`SplitMode::Naive`] splits on every `,` and does not
//! honor quoted fields, so `"Smith, J",42` becomes three cells. That is the
//! default and what existing previews are built with. [`SplitMode::Quoted`]
//! splits each line with the `csv` crate instead; blanks before an opening
//! quote are ignored. In both modes a quoted field cannot span lines, since
//! lines are separated before cells.

use csv::ReaderBuilder;
use serde::{Deserialize, Serialize};

use crate::models::{PreviewResult, Record, MAX_PREVIEW_ROWS};

/// How a single line is cut into cells
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SplitMode {
    #[default]
    Naive,
    Quoted,
}

#[derive(Debug, Clone, Copy, Default)]
pub struct PreviewOptions {
    pub split: SplitMode,
}

impl PreviewOptions {
    pub fn quote_aware(enabled: bool) -> Self {
        Self {
            split: if enabled { SplitMode::Quoted } else { SplitMode::Naive },
        }
    }
}

/// Parse with the default (naive) split mode
pub fn parse(raw_text: &str) -> PreviewResult {
    parse_with(raw_text, &PreviewOptions::default())
}

pub fn parse_with(raw_text: &str, options: &PreviewOptions) -> PreviewResult {
    // "\r\n" leaves an empty piece between the two separators; it is dropped
    // with the other empty lines.
    let mut lines = raw_text
        .split(|c| c == '\n' || c == '\r')
        .filter(|line| !line.is_empty());

    let header = match lines.next() {
        Some(line) => line,
        None => return PreviewResult::empty(),
    };

    let columns = split_line(header, options.split);
    let rows = lines
        .take(MAX_PREVIEW_ROWS)
        .map(|line| build_record(&columns, split_line(line, options.split)))
        .collect();

    PreviewResult { columns, rows }
}

/// Pair cells with columns by position. Missing cells become "", extra cells
/// are dropped. A duplicated column name keeps the cell of its last occurrence.
fn build_record(columns: &[String], cells: Vec<String>) -> Record {
    let mut cells = cells.into_iter();
    let mut record = Record::with_capacity(columns.len());
    for column in columns {
        let cell = cells.next().unwrap_or_default();
        record.insert(column.clone(), cell);
    }
    record
}

fn split_line(line: &str, mode: SplitMode) -> Vec<String> {
    match mode {
        SplitMode::Naive => split_naive(line),
        SplitMode::Quoted => split_quoted(line),
    }
}

fn split_naive(line: &str) -> Vec<String> {
    line.split(',').map(|cell| cell.trim().to_string()).collect()
}

fn split_quoted(line: &str) -> Vec<String> {
    let line = strip_space_before_quotes(line);
    let mut reader = ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_reader(line.as_bytes());

    match reader.records().next() {
        Some(Ok(record)) => record.iter().map(|cell| cell.trim().to_string()).collect(),
        // Unbalanced quotes and the like: fall back rather than lose the line
        _ => split_naive(&line),
    }
}

/// Drop blanks between a separator and an opening quote, so `1, "a,b"` reads
/// the second field as quoted. `csv` only honors a quote as the first byte.
fn strip_space_before_quotes(line: &str) -> String {
    let mut out = String::with_capacity(line.len());
    let mut leading = String::new();
    let mut at_field_start = true;
    let mut in_quotes = false;
    let mut just_closed = false;

    for ch in line.chars() {
        if at_field_start {
            if ch == ' ' || ch == '\t' {
                leading.push(ch);
                continue;
            }
            at_field_start = false;
            if ch == '"' {
                leading.clear();
                in_quotes = true;
                out.push(ch);
                continue;
            }
            out.push_str(&leading);
            leading.clear();
        }

        if in_quotes {
            if ch == '"' {
                in_quotes = false;
                just_closed = true;
            }
        } else if ch == '"' && just_closed {
            // Doubled quote inside a quoted field
            in_quotes = true;
            just_closed = false;
        } else {
            just_closed = false;
            if ch == ',' {
                at_field_start = true;
            }
        }
        out.push(ch);
    }

    out.push_str(&leading);
    out
}
