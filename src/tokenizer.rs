//! CSV tokenization
//!
//! Splits raw CSV exports into rows of named fields. The first record is the
//! header; header names are lower-cased and every cell is trimmed. Ragged rows
//! are tolerated and missing trailing cells read as empty strings.

use csv::{ReaderBuilder, Trim};
use tracing::warn;

/// One data row keyed by lower-cased header name, in header order
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CsvRow {
    fields: Vec<(String, String)>,
}

impl CsvRow {
    /// Build a row from header names and cells
    pub fn new(headers: &[String], cells: &[&str]) -> Self {
        let mut row = CsvRow::default();
        for (i, header) in headers.iter().enumerate() {
            let value = cells.get(i).map(|c| c.trim()).unwrap_or_default();
            row.insert(header, value);
        }
        row
    }

    fn insert(&mut self, key: &str, value: &str) {
        // A repeated header keeps its first position; the later cell wins
        match self.fields.iter_mut().find(|(k, _)| k == key) {
            Some((_, existing)) => *existing = value.to_string(),
            None => self.fields.push((key.to_string(), value.to_string())),
        }
    }

    /// Cell value for `key`
    pub fn get(&self, key: &str) -> Option<&str> {
        self.fields
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    /// Header names in order
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.fields.iter().map(|(k, _)| k.as_str())
    }

    /// `(header, value)` pairs in order
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.fields.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

/// Parse CSV text into rows. Never fails; unreadable records are skipped.
pub fn parse_csv(text: &str) -> Vec<CsvRow> {
    let mut headers: Option<Vec<String>> = None;
    let mut rows = Vec::new();

    for cells in records(text) {
        match &headers {
            None => {
                headers = Some(cells.iter().map(|h| h.trim().to_lowercase()).collect());
            }
            Some(names) => {
                let cells: Vec<&str> = cells.iter().map(String::as_str).collect();
                rows.push(CsvRow::new(names, &cells));
            }
        }
    }

    rows
}

/// Group lines into records. A quote left open at a line break continues the
/// record on the next line; if it is still open at end of input, each of the
/// affected lines is split on its own instead.
fn records(text: &str) -> Vec<Vec<String>> {
    let mut out = Vec::new();
    let mut pending: Vec<&str> = Vec::new();
    let mut open = false;

    for line in text.lines() {
        if pending.is_empty() && line.trim().is_empty() {
            continue;
        }
        pending.push(line);
        if line.matches('"').count() % 2 == 1 {
            open = !open;
        }
        if !open {
            out.extend(read_records(&pending.join("\n")));
            pending.clear();
        }
    }

    if !pending.is_empty() {
        warn!(
            lines = pending.len(),
            "unterminated quote, splitting remaining lines individually"
        );
        out.extend(
            pending
                .into_iter()
                .filter(|line| !line.trim().is_empty())
                .map(split_line),
        );
    }

    out
}

fn read_records(text: &str) -> Vec<Vec<String>> {
    let mut reader = ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .trim(Trim::All)
        .from_reader(text.as_bytes());

    let mut out = Vec::new();
    for record in reader.records() {
        match record {
            Ok(record) => out.push(record.iter().map(str::to_string).collect()),
            Err(e) => warn!(error = %e, "skipping unreadable CSV record"),
        }
    }
    out
}

/// Split one line, toggling quote state on every unescaped `"`
fn split_line(line: &str) -> Vec<String> {
    let mut fields = Vec::new();
    let mut current = String::new();
    let mut in_quotes = false;
    let mut chars = line.chars().peekable();

    while let Some(ch) = chars.next() {
        match ch {
            '"' if in_quotes && chars.peek() == Some(&'"') => {
                current.push('"');
                chars.next();
            }
            '"' => in_quotes = !in_quotes,
            ',' if !in_quotes => fields.push(std::mem::take(&mut current).trim().to_string()),
            _ => current.push(ch),
        }
    }
    fields.push(current.trim().to_string());
    fields
}
