// src/report/summary.rs
//
// The headline table of the results sheet: one row per year of the subject
// company, with revenue, operating profit, both margins, the break-even
// estimate and a verdict on whether revenue cleared it.

use anyhow::Result;
use rust_xlsxwriter::{Color, Format, Worksheet};
use tracing::{debug, info};

use crate::labels::{BREAK_EVEN, GROSS_MARGIN, NET_MARGIN, OPERATING_PROFIT, REVENUE};
use crate::table::MetricTable;

static SUMMARY_HEADERS: &[&str] = &[
    "연도",
    "매출액",
    "영업이익",
    "매출총이익률(%)",
    "매출순수익률(%)",
    "손익분기점 추정",
    "달성여부",
];

/// Rows the subject table must carry before a summary is worth writing.
static REQUIRED_ROWS: &[&str] = &[REVENUE, OPERATING_PROFIT, GROSS_MARGIN, NET_MARGIN, BREAK_EVEN];

/// Verdict on one year's break-even estimate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BreakEvenStatus {
    Achieved,
    Missed,
    /// Break-even is missing or zero, so the comparison is meaningless.
    NotApplicable,
}

impl BreakEvenStatus {
    pub fn evaluate(revenue: Option<f64>, break_even: Option<f64>) -> Self {
        match break_even {
            None => Self::NotApplicable,
            // covers -0.0, which the break-even arithmetic produces for
            // zero-revenue years
            Some(b) if b == 0.0 => Self::NotApplicable,
            Some(b) => match revenue {
                Some(r) if r >= b => Self::Achieved,
                _ => Self::Missed,
            },
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::Achieved => "달성",
            Self::Missed => "미달",
            Self::NotApplicable => "해당없음",
        }
    }
}

/// Write the key-metric summary for `company` onto `sheet`, anchored at the
/// top-left: title in row 0, header in row 2, one data row per year.
///
/// Returns the index of the last written row, or `None` (writing nothing)
/// when any required metric row is absent from the table.
pub fn write_summary(
    sheet: &mut Worksheet,
    company: &str,
    table: &MetricTable,
) -> Result<Option<u32>> {
    if let Some(missing) = REQUIRED_ROWS.iter().find(|label| !table.has_row(label)) {
        debug!(company, missing, "summary table skipped, required row absent");
        return Ok(None);
    }

    let title_format = Format::new().set_bold().set_font_size(14);
    let header_format = Format::new()
        .set_bold()
        .set_background_color(Color::RGB(0xD9D9D9));

    sheet.write_string_with_format(0, 0, format!("{} 주요 지표 요약", company), &title_format)?;
    for (col, header) in SUMMARY_HEADERS.iter().enumerate() {
        sheet.write_string_with_format(2, col as u16, *header, &header_format)?;
    }

    // lookups after the presence check above cannot miss
    let value_of = |label: &str, idx: usize| -> Option<f64> {
        table.row(label).and_then(|r| r.value(idx))
    };

    let years = table.year_columns();
    for (offset, (idx, year)) in years.iter().enumerate() {
        let row = 3 + offset as u32;
        let revenue = value_of(REVENUE, *idx);
        let break_even = value_of(BREAK_EVEN, *idx);
        let status = BreakEvenStatus::evaluate(revenue, break_even);

        sheet.write_string(row, 0, *year)?;
        sheet.write_number(row, 1, revenue.unwrap_or(0.0))?;
        sheet.write_number(row, 2, value_of(OPERATING_PROFIT, *idx).unwrap_or(0.0))?;
        sheet.write_number(row, 3, value_of(GROSS_MARGIN, *idx).unwrap_or(0.0))?;
        sheet.write_number(row, 4, value_of(NET_MARGIN, *idx).unwrap_or(0.0))?;
        sheet.write_number(row, 5, break_even.unwrap_or(0.0))?;
        sheet.write_string(row, 6, status.label())?;
    }

    let last_row = 2 + years.len() as u32;
    info!(company, years = years.len(), "summary table written");
    Ok(Some(last_row))
}
