//! Best-effort HTML table → CSV conversion for table downloads.
//!
//! The engine renders each recognised table as a small, regular HTML
//! fragment (`<table><tr><td colspan=2>…</td></tr>…</table>`), so a handful
//! of regexes is enough to recover the grid. Spanned cells are repeated into
//! every grid position they cover, so the CSV stays rectangular.
//!
//! Any failure here is contained: the caller drops the download link for
//! that one table and keeps rendering.

use crate::error::ConversionError;
use once_cell::sync::Lazy;
use regex::Regex;

/// Largest span honoured; larger values are clamped.
const MAX_SPAN: usize = 1000;

static RE_TABLE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?is)<table\b[^>]*>(.*?)</table\s*>").unwrap());

static RE_TABLE_ELEMENT: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?is)<table\b.*?</table\s*>").unwrap());

static RE_ROW: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?is)<tr\b[^>]*>(.*?)</tr\s*>").unwrap());

static RE_CELL: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?is)<t[dh]\b([^>]*)>(.*?)</t[dh]\s*>").unwrap());

static RE_COLSPAN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#"(?i)\bcolspan\s*=\s*["']?\s*(\d+)"#).unwrap());

static RE_ROWSPAN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#"(?i)\browspan\s*=\s*["']?\s*(\d+)"#).unwrap());

static RE_BREAK: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?i)<br\s*/?>").unwrap());

static RE_TAG: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?s)<[^>]*>").unwrap());

static RE_SPACE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s+").unwrap());

/// A rectangular grid of cell texts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Table {
    rows: Vec<Vec<String>>,
}

impl Table {
    pub fn rows(&self) -> &[Vec<String>] {
        &self.rows
    }

    pub fn width(&self) -> usize {
        self.rows.first().map_or(0, Vec::len)
    }

    /// Render as RFC 4180 CSV with `\n` line endings.
    pub fn to_csv(&self) -> String {
        let mut out = String::new();
        for row in &self.rows {
            let line: Vec<String> = row.iter().map(|c| csv_field(c)).collect();
            out.push_str(&line.join(","));
            out.push('\n');
        }
        out
    }
}

/// Parse the first `<table>` in `html` into a grid.
pub fn parse_html_table(html: &str) -> Result<Table, ConversionError> {
    let body = RE_TABLE
        .captures(html)
        .and_then(|c| c.get(1))
        .ok_or(ConversionError::NoTable)?
        .as_str();

    // Per column: (rows still covered, text) for cells spanning downwards.
    let mut carried: Vec<Option<(usize, String)>> = Vec::new();
    let mut rows: Vec<Vec<String>> = Vec::new();

    for row_caps in RE_ROW.captures_iter(body) {
        let row_html = row_caps.get(1).map_or("", |m| m.as_str());
        let mut row: Vec<String> = Vec::new();
        let mut saw_cell = false;

        for cell in RE_CELL.captures_iter(row_html) {
            saw_cell = true;
            let attrs = cell.get(1).map_or("", |m| m.as_str());
            let text = cell_text(cell.get(2).map_or("", |m| m.as_str()));
            let colspan = span(&RE_COLSPAN, attrs);
            let rowspan = span(&RE_ROWSPAN, attrs);

            fill_carried(&mut row, &mut carried);

            for _ in 0..colspan {
                let col = row.len();
                if rowspan > 1 {
                    if carried.len() <= col {
                        carried.resize(col + 1, None);
                    }
                    carried[col] = Some((rowspan - 1, text.clone()));
                }
                row.push(text.clone());
            }
        }

        // Spans reaching past the last explicit cell of this row.
        while row.len() < carried.len() {
            if !take_carried(&mut row, &mut carried) {
                row.push(String::new());
            }
        }

        if saw_cell || !row.is_empty() {
            rows.push(row);
        }
    }

    let width = rows.iter().map(Vec::len).max().unwrap_or(0);
    for row in &mut rows {
        row.resize(width, String::new());
    }
    // Trailing all-blank rows add nothing to the download.
    while rows.last().is_some_and(|r| r.iter().all(String::is_empty)) {
        rows.pop();
    }

    if rows.is_empty() {
        return Err(ConversionError::NoRows);
    }
    Ok(Table { rows })
}

/// The `<table>…</table>` element inside an engine fragment, or the whole
/// fragment when there is none.
pub fn table_markup(html: &str) -> &str {
    RE_TABLE_ELEMENT
        .find(html)
        .map_or(html, |m| m.as_str())
}

/// Convert a table's HTML to CSV.
pub fn html_table_to_csv(html: &str) -> Result<String, ConversionError> {
    Ok(parse_html_table(html)?.to_csv())
}

/// Push carried-down cells for every covered column at the current position.
fn fill_carried(row: &mut Vec<String>, carried: &mut [Option<(usize, String)>]) {
    while take_carried(row, carried) {}
}

/// If the column at `row.len()` is covered by a span from above, push its
/// text and return true.
fn take_carried(row: &mut Vec<String>, carried: &mut [Option<(usize, String)>]) -> bool {
    let col = row.len();
    let Some(slot) = carried.get_mut(col) else {
        return false;
    };
    match slot.take() {
        Some((remaining, text)) => {
            row.push(text.clone());
            if remaining > 1 {
                *slot = Some((remaining - 1, text));
            }
            true
        }
        None => false,
    }
}

fn span(re: &Regex, attrs: &str) -> usize {
    re.captures(attrs)
        .and_then(|c| c.get(1))
        .and_then(|m| m.as_str().parse::<usize>().ok())
        .unwrap_or(1)
        .clamp(1, MAX_SPAN)
}

fn cell_text(inner: &str) -> String {
    let s = RE_BREAK.replace_all(inner, " ");
    let s = RE_TAG.replace_all(&s, "");
    let s = html_escape::decode_html_entities(&s);
    RE_SPACE.replace_all(s.trim(), " ").into_owned()
}

fn csv_field(s: &str) -> String {
    if s.contains([',', '"', '\n', '\r']) {
        format!("\"{}\"", s.replace('"', "\"\""))
    } else {
        s.to_string()
    }
}
