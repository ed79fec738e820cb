// src/report/charts.rs
//
// Every chart draws from cells in the output workbook itself, so each
// builder first writes a small backing table to its own worksheet (hidden
// for chart-only data, visible for the comparison tables) and then wires
// chart series to those cells. Builders return `None` when the rows they
// need are absent; a missing metric is a valid nothing-to-chart condition.

use anyhow::Result;
use rust_xlsxwriter::{
    Chart, ChartDataLabel, ChartDataLabelPosition, ChartLine, ChartMarker, ChartMarkerType,
    ChartSolidFill, ChartType, Color, Workbook, Worksheet,
};
use tracing::debug;

use crate::labels::{GROSS_MARGIN, NET_MARGIN, RESULTS_SHEET};
use crate::table::{MetricRow, MetricTable};

// 20cm x 10cm frames at 96 dpi, like every chart in the report
const CHART_WIDTH: u32 = 756;
const CHART_HEIGHT: u32 = 378;

pub const REVENUE_BAR: Color = Color::RGB(0x4F81BD);
pub const OP_PROFIT_BAR: Color = Color::RGB(0x9BBB59);
pub const NET_MARGIN_BAR: Color = Color::RGB(0xFFC000);
pub const GROSS_MARGIN_BAR: Color = Color::RGB(0x7030A0);
const CPI_LINE: Color = Color::RGB(0xC0504D);

/// Cell block on the results sheet where the CPI summary lives: a header
/// row followed by one data row per year through `last_row`.
#[derive(Debug, Clone, Copy)]
pub struct CpiBlock {
    pub header_row: u32,
    pub last_row: u32,
}

/// Write the standard two-column backing block: a "Year"/metric header row,
/// then one row per year column. Returns the last written row index.
fn write_metric_backing(
    sheet: &mut Worksheet,
    metric: &str,
    row: &MetricRow,
    years: &[(usize, &str)],
) -> Result<u32> {
    sheet.write_string(0, 0, "Year")?;
    sheet.write_string(0, 1, metric)?;
    for (r, (idx, year)) in years.iter().enumerate() {
        let out_row = 1 + r as u32;
        sheet.write_string(out_row, 0, *year)?;
        if let Some(v) = row.value(*idx) {
            sheet.write_number(out_row, 1, v)?;
        }
    }
    Ok(years.len() as u32)
}

/// Year-by-year CPI trend, reading straight off the results sheet.
pub fn cpi_chart(cpi: &CpiBlock) -> Chart {
    let mut chart = Chart::new(ChartType::Line);
    chart.title().set_name("연도별 소비자물가지수");
    chart
        .add_series()
        .set_name((RESULTS_SHEET, cpi.header_row, 1))
        .set_categories((RESULTS_SHEET, cpi.header_row + 1, 0, cpi.last_row, 0))
        .set_values((RESULTS_SHEET, cpi.header_row + 1, 1, cpi.last_row, 1));
    chart.set_width(CHART_WIDTH).set_height(CHART_HEIGHT);
    chart
}

/// Grouped bars of the margin rows, one series per margin present in the
/// table, with value labels pushed outside each bar's end.
pub fn profitability_chart(
    workbook: &mut Workbook,
    company: &str,
    table: &MetricTable,
) -> Result<Option<Chart>> {
    let margins: Vec<&MetricRow> = table
        .rows
        .iter()
        .filter(|r| r.label == NET_MARGIN || r.label == GROSS_MARGIN)
        .collect();
    if margins.is_empty() {
        debug!(company, "no margin rows, skipping profitability chart");
        return Ok(None);
    }
    let years = table.year_columns();
    if years.is_empty() {
        debug!(company, "no year columns, skipping profitability chart");
        return Ok(None);
    }

    // hidden backing table, transposed: years down, margins across
    let sheet_name = format!("_{}_profit_chart_data", company);
    let sheet = workbook.add_worksheet();
    sheet.set_name(&sheet_name)?;
    sheet.set_hidden(true);
    for (c, margin) in margins.iter().enumerate() {
        sheet.write_string(0, 1 + c as u16, &margin.label)?;
    }
    for (r, (idx, year)) in years.iter().enumerate() {
        let out_row = 1 + r as u32;
        sheet.write_string(out_row, 0, *year)?;
        for (c, margin) in margins.iter().enumerate() {
            if let Some(v) = margin.value(*idx) {
                sheet.write_number(out_row, 1 + c as u16, v)?;
            }
        }
    }
    let last_row = years.len() as u32;

    let mut chart = Chart::new(ChartType::Column);
    let title = format!("{} 수익성 비율(%)", company);
    chart.title().set_name(title.as_str());
    chart.x_axis().set_name("연도");
    chart.y_axis().set_name("비율 (%)");
    for c in 0..margins.len() {
        let col = 1 + c as u16;
        chart
            .add_series()
            .set_name((sheet_name.as_str(), 0, col))
            .set_categories((sheet_name.as_str(), 1, 0, last_row, 0))
            .set_values((sheet_name.as_str(), 1, col, last_row, col))
            .set_data_label(
                ChartDataLabel::new()
                    .show_value()
                    .set_position(ChartDataLabelPosition::OutsideEnd),
            );
    }
    chart.set_width(CHART_WIDTH).set_height(CHART_HEIGHT);

    debug!(company, series = margins.len(), "profitability chart built");
    Ok(Some(chart))
}

/// Dual-axis combo: the metric as bars against the left axis, the CPI
/// series as a red circle-marked line against a bare right axis.
pub fn comparison_chart(
    workbook: &mut Workbook,
    company: &str,
    metric: &str,
    table: &MetricTable,
    cpi: &CpiBlock,
    bar_color: Color,
) -> Result<Option<Chart>> {
    let Some(row) = table.row(metric) else {
        debug!(company, metric, "metric row absent, skipping comparison chart");
        return Ok(None);
    };
    let years = table.year_columns();
    if years.is_empty() {
        debug!(company, metric, "no year columns, skipping comparison chart");
        return Ok(None);
    }

    let sheet_name = format!("_{}_{}_comp_data", company, metric);
    let sheet = workbook.add_worksheet();
    sheet.set_name(&sheet_name)?;
    sheet.set_hidden(true);
    let last_row = write_metric_backing(sheet, metric, row, &years)?;

    let mut chart = Chart::new(ChartType::Column);
    let title = format!("{} {}과 소비자물가지수", company, metric);
    chart.title().set_name(title.as_str());
    chart.x_axis().set_name("연도");
    chart.y_axis().set_name(metric);
    chart
        .add_series()
        .set_name((sheet_name.as_str(), 0, 1))
        .set_categories((sheet_name.as_str(), 1, 0, last_row, 0))
        .set_values((sheet_name.as_str(), 1, 1, last_row, 1))
        .set_format(ChartSolidFill::new().set_color(bar_color))
        .set_data_label(ChartDataLabel::new().show_value());

    let mut cpi_line = Chart::new(ChartType::Line);
    cpi_line
        .add_series()
        .set_name((RESULTS_SHEET, cpi.header_row, 1))
        .set_categories((sheet_name.as_str(), 1, 0, last_row, 0))
        .set_values((RESULTS_SHEET, cpi.header_row + 1, 1, cpi.last_row, 1))
        .set_format(ChartLine::new().set_color(CPI_LINE))
        .set_marker(ChartMarker::new().set_type(ChartMarkerType::Circle))
        .set_data_label(ChartDataLabel::new().show_value())
        .set_secondary_axis(true);
    chart.combine(&cpi_line);
    // right-hand axis: no title, no gridlines
    chart.y2_axis().set_major_gridlines(false);

    chart.set_width(CHART_WIDTH).set_height(CHART_HEIGHT);
    Ok(Some(chart))
}

/// Side-by-side bars of the cross-company average against the subject
/// company, backed by a visible comparison-data sheet spanning the
/// average's year axis.
pub fn average_comparison_chart(
    workbook: &mut Workbook,
    sheet_name: &str,
    company: &str,
    metric: &str,
    average_label: &str,
    table: &MetricTable,
    average: &MetricTable,
) -> Result<Option<Chart>> {
    let Some(subject_row) = table.row(metric) else {
        debug!(company, metric, "metric row absent, skipping average comparison");
        return Ok(None);
    };
    let Some(avg_row) = average.row(average_label) else {
        debug!(metric, "average row absent, skipping average comparison");
        return Ok(None);
    };
    let years = average.year_columns();
    if years.is_empty() {
        debug!(metric, "average table has no years, skipping comparison");
        return Ok(None);
    }

    let subject_series = format!("{} {}", company, metric);
    let sheet = workbook.add_worksheet();
    sheet.set_name(sheet_name)?;
    sheet.write_string(0, 1, average_label)?;
    sheet.write_string(0, 2, &subject_series)?;
    for (r, (idx, year)) in years.iter().enumerate() {
        let out_row = 1 + r as u32;
        sheet.write_string(out_row, 0, *year)?;
        if let Some(v) = avg_row.value(*idx) {
            sheet.write_number(out_row, 1, v)?;
        }
        // subject values reindexed onto the average's year axis
        if let Some(v) = table.column_index(year).and_then(|i| subject_row.value(i)) {
            sheet.write_number(out_row, 2, v)?;
        }
    }
    let last_row = years.len() as u32;

    let mut chart = Chart::new(ChartType::Column);
    let title = format!("{} 비교 ({} vs 3사 평균)", metric, company);
    chart.title().set_name(title.as_str());
    for col in 1..=2u16 {
        chart
            .add_series()
            .set_name((sheet_name, 0, col))
            .set_categories((sheet_name, 1, 0, last_row, 0))
            .set_values((sheet_name, 1, col, last_row, col));
    }
    chart.set_width(CHART_WIDTH).set_height(CHART_HEIGHT);
    Ok(Some(chart))
}

/// One metric as plain bars: the comparison chart's bar half, standalone,
/// with the legend off.
pub fn single_metric_chart(
    workbook: &mut Workbook,
    company: &str,
    metric: &str,
    table: &MetricTable,
    bar_color: Color,
) -> Result<Option<Chart>> {
    let Some(row) = table.row(metric) else {
        debug!(company, metric, "metric row absent, skipping single-metric chart");
        return Ok(None);
    };
    let years = table.year_columns();
    if years.is_empty() {
        debug!(company, metric, "no year columns, skipping single-metric chart");
        return Ok(None);
    }

    let sheet_name = format!("_{}_{}_data", company, metric);
    let sheet = workbook.add_worksheet();
    sheet.set_name(&sheet_name)?;
    sheet.set_hidden(true);
    let last_row = write_metric_backing(sheet, metric, row, &years)?;

    let mut chart = Chart::new(ChartType::Column);
    let title = format!("{} {}", company, metric);
    chart.title().set_name(title.as_str());
    chart.x_axis().set_name("연도");
    let y_title = format!("{} (%)", metric);
    chart.y_axis().set_name(y_title.as_str());
    chart
        .add_series()
        .set_name((sheet_name.as_str(), 0, 1))
        .set_categories((sheet_name.as_str(), 1, 0, last_row, 0))
        .set_values((sheet_name.as_str(), 1, 1, last_row, 1))
        .set_format(ChartSolidFill::new().set_color(bar_color))
        .set_data_label(ChartDataLabel::new().show_value());
    chart.legend().set_hidden();
    chart.set_width(CHART_WIDTH).set_height(CHART_HEIGHT);
    Ok(Some(chart))
}
