// src/process/clean.rs
//
// Statement sheets come straight from a portal export and carry its UI
// residue: accounting-standard qualifiers glued to headers, "펼치기"
// expanders and stray "(수익)" markers in the label column, non-breaking
// spaces everywhere. Cleaning scrubs all of that and coerces the value
// grid to numbers before anything downstream reads it.

use once_cell::sync::Lazy;
use regex::Regex;
use tracing::debug;

use crate::ingest::{RawCell, RawTable};
use crate::table::MetricTable;

/// Export boilerplate stripped from column headers.
static HEADER_NOISE_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\s*\(\s*IFRS\s*연결\s*\)|연간컨센서스보기").unwrap());

/// Accounting-standard qualifier stripped from row labels.
static IFRS_TAG_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s*\(\s*IFRS\s*연결\s*\)").unwrap());

/// Render a cell the way it reads in the sheet. Integral numbers drop the
/// trailing ".0" so a year header stays "2020".
fn cell_to_text(cell: &RawCell) -> String {
    match cell {
        RawCell::Empty => String::new(),
        RawCell::Text(s) => s.clone(),
        RawCell::Number(n) if n.is_finite() && n.fract() == 0.0 => format!("{}", *n as i64),
        RawCell::Number(n) => n.to_string(),
        RawCell::Bool(b) => b.to_string(),
    }
}

fn clean_header(cell: &RawCell) -> String {
    let text = cell_to_text(cell);
    HEADER_NOISE_RE.replace_all(&text, "").trim().to_string()
}

/// Scrub one label cell; `None` when nothing meaningful remains.
fn clean_label(cell: &RawCell) -> Option<String> {
    let text = cell_to_text(cell).replace('\u{a0}', " ");
    let text = text.trim().replace("펼치기", "");
    let text = text.trim().replace("(수익)", "");
    let label = IFRS_TAG_RE.replace_all(&text, "").trim().to_string();
    (!label.is_empty()).then_some(label)
}

/// Numeric coercion for value cells; anything unparseable becomes missing.
/// A literal "NaN" counts as missing, not as a value.
fn coerce_numeric(cell: &RawCell) -> Option<f64> {
    match cell {
        RawCell::Number(n) => Some(*n),
        RawCell::Bool(b) => Some(if *b { 1.0 } else { 0.0 }),
        RawCell::Text(s) => s.trim().parse::<f64>().ok().filter(|v| !v.is_nan()),
        RawCell::Empty => None,
    }
}

/// Scrub one raw statement sheet into a metric table.
///
/// The first grid row becomes the header, every later row a metric row.
/// Rows whose label cleans away to nothing, and rows where every value
/// cell is missing, are dropped; partially filled rows are kept.
pub fn clean_table(raw: &RawTable) -> MetricTable {
    let mut rows = raw.rows.iter();
    let header = match rows.next() {
        Some(h) => h,
        None => return MetricTable::new(String::new(), Vec::new()),
    };

    let label_header = clean_header(header.first().unwrap_or(&RawCell::Empty));
    let columns: Vec<String> = header.iter().skip(1).map(clean_header).collect();
    let width = columns.len();

    let mut table = MetricTable::new(label_header, columns);
    let mut dropped = 0usize;
    for row in rows {
        let label = match clean_label(row.first().unwrap_or(&RawCell::Empty)) {
            Some(l) => l,
            None => {
                dropped += 1;
                continue;
            }
        };
        let values: Vec<Option<f64>> = (1..=width)
            .map(|i| row.get(i).and_then(coerce_numeric))
            .collect();
        if values.iter().all(Option::is_none) {
            dropped += 1;
            continue;
        }
        table.push_row(label, values);
    }

    debug!(kept = table.rows.len(), dropped, "cleaned statement table");
    table
}
