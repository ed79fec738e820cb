// src/table.rs

use crate::labels::VS_PRIOR_YEAR;

/// A cleaned metric table: named metric rows against period columns.
///
/// The label column is held apart from the value columns, so every cell in
/// `MetricRow::values` lines up with `columns` by index. Lookup is by label,
/// never by position.
#[derive(Debug, Clone)]
pub struct MetricTable {
    /// Header of the label column (left-most in the sheet).
    pub label_header: String,
    /// Period column labels in sheet order: years interleaved with their
    /// "전년대비" comparison columns.
    pub columns: Vec<String>,
    pub rows: Vec<MetricRow>,
}

/// One metric row: a label plus one optional value per period column.
#[derive(Debug, Clone)]
pub struct MetricRow {
    pub label: String,
    /// Aligned with `MetricTable::columns`; `None` where the source cell was
    /// empty or failed numeric coercion.
    pub values: Vec<Option<f64>>,
}

impl MetricRow {
    /// Value at a column index, `None` when absent or out of range.
    pub fn value(&self, idx: usize) -> Option<f64> {
        self.values.get(idx).copied().flatten()
    }
}

impl MetricTable {
    pub fn new(label_header: impl Into<String>, columns: Vec<String>) -> Self {
        Self {
            label_header: label_header.into(),
            columns,
            rows: Vec::new(),
        }
    }

    /// Look up a metric row by exact trimmed-label match, scanning top to
    /// bottom; the first match wins. Absence is a valid state, not an error.
    pub fn row(&self, label: &str) -> Option<&MetricRow> {
        let wanted = label.trim();
        self.rows.iter().find(|r| r.label.trim() == wanted)
    }

    pub fn has_row(&self, label: &str) -> bool {
        self.row(label).is_some()
    }

    /// Append a derived row; `values` must be aligned with `columns`.
    pub fn push_row(&mut self, label: impl Into<String>, values: Vec<Option<f64>>) {
        self.rows.push(MetricRow {
            label: label.into(),
            values,
        });
    }

    /// Index of a period column by exact label match.
    pub fn column_index(&self, label: &str) -> Option<usize> {
        self.columns.iter().position(|c| c == label)
    }

    /// Indices and labels of the year columns, in sheet order — every period
    /// column that is not a "전년대비" comparison column.
    pub fn year_columns(&self) -> Vec<(usize, &str)> {
        self.columns
            .iter()
            .enumerate()
            .filter(|(_, c)| !c.contains(VS_PRIOR_YEAR))
            .map(|(i, c)| (i, c.as_str()))
            .collect()
    }
}
