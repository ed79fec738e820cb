// src/process/average.rs

use std::collections::BTreeSet;

use tracing::{info, warn};

use crate::labels::{
    AVERAGE_LABEL_HEADER, AVG_OPERATING_PROFIT, AVG_REVENUE, OPERATING_PROFIT, REVENUE,
};
use crate::table::{MetricRow, MetricTable};

/// Mean of the values the contributing companies report under `year`.
/// Companies without that column, or without a value in it, stay out of
/// the mean; nobody contributing means no value at all.
fn mean_for_year(contributors: &[(&MetricTable, &MetricRow)], year: &str) -> Option<f64> {
    let values: Vec<f64> = contributors
        .iter()
        .filter_map(|(table, row)| table.column_index(year).and_then(|i| row.value(i)))
        .collect();
    (!values.is_empty()).then(|| values.iter().sum::<f64>() / values.len() as f64)
}

fn contributors<'a>(
    tables: &'a [MetricTable],
    label: &str,
) -> Vec<(&'a MetricTable, &'a MetricRow)> {
    tables
        .iter()
        .filter_map(|t| t.row(label).map(|r| (t, r)))
        .collect()
}

/// Build the cross-company average table: one revenue row and one operating
/// profit row over the sorted union of year columns seen in any contributing
/// table.
///
/// Returns `None` (with a warning) when either metric has no contributing
/// company at all; callers must branch on that rather than assume a table.
pub fn company_average(tables: &[MetricTable]) -> Option<MetricTable> {
    let revenue = contributors(tables, REVENUE);
    let op_profit = contributors(tables, OPERATING_PROFIT);

    if revenue.is_empty() || op_profit.is_empty() {
        warn!(
            revenue_sources = revenue.len(),
            op_profit_sources = op_profit.len(),
            "not enough revenue or operating profit data to average across companies"
        );
        return None;
    }

    let mut years: BTreeSet<&str> = BTreeSet::new();
    for (table, _) in revenue.iter().chain(op_profit.iter()) {
        for (_, label) in table.year_columns() {
            years.insert(label);
        }
    }

    let columns: Vec<String> = years.iter().map(|y| y.to_string()).collect();
    let mut avg = MetricTable::new(AVERAGE_LABEL_HEADER, columns);
    avg.push_row(
        AVG_REVENUE,
        years.iter().map(|y| mean_for_year(&revenue, y)).collect(),
    );
    avg.push_row(
        AVG_OPERATING_PROFIT,
        years.iter().map(|y| mean_for_year(&op_profit, y)).collect(),
    );

    info!(years = avg.columns.len(), "built cross-company average table");
    Some(avg)
}
