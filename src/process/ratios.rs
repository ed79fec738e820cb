// src/process/ratios.rs
//
// Derived profitability rows for the subject company. Each computation is
// column-wise over the full period axis: missing operands propagate as NaN
// through the arithmetic, and every non-finite outcome settles to 0 in the
// appended row.

use tracing::{debug, warn};

use crate::labels::{
    BREAK_EVEN, COST_OF_GOODS, GROSS_MARGIN, GROSS_PROFIT, NET_INCOME, NET_MARGIN, REVENUE,
    SGA_EXPENSES,
};
use crate::table::MetricTable;

fn settle(v: f64) -> f64 {
    if v.is_finite() {
        v
    } else {
        0.0
    }
}

fn operand(table: &MetricTable, label: &str, idx: usize) -> f64 {
    table
        .row(label)
        .and_then(|r| r.value(idx))
        .unwrap_or(f64::NAN)
}

/// `(numerator / denominator) * 100` per column, or `None` when either row
/// is absent from the table.
fn margin_values(table: &MetricTable, numerator: &str, denominator: &str) -> Option<Vec<Option<f64>>> {
    if !table.has_row(numerator) || !table.has_row(denominator) {
        return None;
    }
    let values = (0..table.columns.len())
        .map(|i| {
            let n = operand(table, numerator, i);
            let d = operand(table, denominator, i);
            Some(settle(n / d * 100.0))
        })
        .collect();
    Some(values)
}

/// Break-even revenue per column: `SG&A / (1 - cost / revenue)`, or `None`
/// when any of the three source rows is absent.
fn break_even_values(table: &MetricTable) -> Option<Vec<Option<f64>>> {
    let required = [SGA_EXPENSES, COST_OF_GOODS, REVENUE];
    if !required.iter().all(|label| table.has_row(label)) {
        return None;
    }
    let values = (0..table.columns.len())
        .map(|i| {
            let sga = operand(table, SGA_EXPENSES, i);
            let cost = operand(table, COST_OF_GOODS, i);
            let revenue = operand(table, REVENUE, i);
            let contribution_margin = 1.0 - cost / revenue;
            Some(settle(sga / contribution_margin))
        })
        .collect();
    Some(values)
}

fn append(table: &mut MetricTable, name: &str, values: Option<Vec<Option<f64>>>) {
    match values {
        Some(values) => {
            table.push_row(name, values);
            debug!(metric = name, "appended derived row");
        }
        None => warn!(metric = name, "source rows missing, skipping derived row"),
    }
}

/// Append the three derived rows to the subject company's table, in order:
/// net margin, gross margin, break-even. A derived row whose source rows
/// are absent is skipped and the table left untouched for that metric.
pub fn add_financial_ratios(table: &mut MetricTable) {
    let net_margin = margin_values(table, NET_INCOME, REVENUE);
    append(table, NET_MARGIN, net_margin);

    let gross_margin = margin_values(table, GROSS_PROFIT, REVENUE);
    append(table, GROSS_MARGIN, gross_margin);

    let break_even = break_even_values(table);
    append(table, BREAK_EVEN, break_even);
}
