// src/ingest/mod.rs
pub mod cpi;

use anyhow::{Context, Result};
use calamine::{open_workbook, Data, Reader, Xlsx};
use std::collections::BTreeMap;
use std::path::Path;
use tracing::info;

use crate::labels::COMPANY_SHEETS;

/// One cell of a statement sheet before any cleaning.
///
/// Dates, formula errors and anything else the statement export never
/// legitimately contains collapse to `Empty` at load time.
#[derive(Debug, Clone, PartialEq)]
pub enum RawCell {
    Empty,
    Text(String),
    Number(f64),
    Bool(bool),
}

/// A statement sheet exactly as it sits in the workbook: a dense grid of
/// typed cells anchored at the top-left of the used range. The first grid
/// row is the header row; the first column holds the metric labels.
#[derive(Debug, Default)]
pub struct RawTable {
    pub rows: Vec<Vec<RawCell>>,
}

fn to_raw_cell(cell: &Data) -> RawCell {
    match cell {
        Data::Empty => RawCell::Empty,
        Data::String(s) => RawCell::Text(s.clone()),
        Data::Float(f) => RawCell::Number(*f),
        Data::Int(i) => RawCell::Number(*i as f64),
        Data::Bool(b) => RawCell::Bool(*b),
        // DateTime / DurationIso / Error carry nothing a statement row uses.
        _ => RawCell::Empty,
    }
}

/// Open `path` and pull every company statement sheet into a raw grid.
///
/// All sheets named in [`COMPANY_SHEETS`] must be present; a missing sheet
/// is a hard error. An empty sheet loads as an empty grid and is dealt with
/// downstream.
#[tracing::instrument(level = "info", skip(path), fields(path = %path.as_ref().display()))]
pub fn load_statement_workbook<P: AsRef<Path>>(path: P) -> Result<BTreeMap<String, RawTable>> {
    // 1) Open the workbook once
    let mut workbook: Xlsx<_> = open_workbook(&path)
        .with_context(|| format!("Failed to open workbook: {:?}", path.as_ref()))?;

    // 2) Pull each company sheet into a dense grid
    let mut tables = BTreeMap::new();
    for &company in COMPANY_SHEETS {
        let range = workbook.worksheet_range(company).with_context(|| {
            format!(
                "Sheet '{}' not found in workbook {:?}",
                company,
                path.as_ref()
            )
        })?;

        let rows: Vec<Vec<RawCell>> = range
            .rows()
            .map(|row| row.iter().map(to_raw_cell).collect())
            .collect();

        info!(company, rows = rows.len(), "loaded statement sheet");
        tables.insert(company.to_string(), RawTable { rows });
    }

    Ok(tables)
}
