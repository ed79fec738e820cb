// src/report/mod.rs
pub mod charts;
pub mod summary;

use anyhow::{Context, Result};
use rust_xlsxwriter::{Chart, Workbook};
use std::path::Path;
use tracing::info;

use crate::ingest::cpi::CpiYear;
use crate::labels::{
    AVG_OPERATING_PROFIT, AVG_REVENUE, COMPANY_SHEETS, GROSS_MARGIN, NET_MARGIN,
    OPERATING_PROFIT, OP_PROFIT_COMPARISON_SHEET, RESULTS_SHEET, REVENUE,
    REVENUE_COMPARISON_SHEET,
};
use crate::table::MetricTable;
use charts::CpiBlock;

// chart grid anchors on the results sheet: columns A and M, rows stepped
// in blocks of 20
const CHART_COL_LEFT: u16 = 0;
const CHART_COL_RIGHT: u16 = 12;
const CHART_ROW_STEP: u32 = 20;

/// Owns the output workbook for the duration of a run. Everything the
/// report contains goes through here; nothing else holds the workbook.
pub struct ReportBuilder {
    workbook: Workbook,
}

impl ReportBuilder {
    pub fn new() -> Self {
        Self {
            workbook: Workbook::new(),
        }
    }

    /// Lay out the whole report: the subject company's summary table, one
    /// sheet per cleaned company table, the CPI table below the summary,
    /// then the chart grid. `companies` pairs positionally with
    /// [`COMPANY_SHEETS`]; the first is the subject.
    pub fn assemble(
        &mut self,
        companies: &[MetricTable],
        average: Option<&MetricTable>,
        cpi: &[CpiYear],
    ) -> Result<()> {
        // 1) results sheet, headed by the subject company's summary
        let results = self.workbook.add_worksheet();
        results.set_name(RESULTS_SHEET)?;
        let table_end = match (companies.first(), COMPANY_SHEETS.first()) {
            (Some(table), Some(&name)) => summary::write_summary(results, name, table)?,
            _ => None,
        };

        // 2) one visible sheet per company with its cleaned table
        for (table, &name) in companies.iter().zip(COMPANY_SHEETS.iter()) {
            self.write_company_sheet(name, table)?;
        }

        // 3) CPI summary under the table (or at the top when there is none)
        let cpi_block = self.write_cpi_table(table_end, cpi)?;

        // 4) chart grid
        self.place_charts(companies.first(), average, &cpi_block)?;
        Ok(())
    }

    /// Persist the workbook, overwriting whatever is at `path`.
    pub fn save<P: AsRef<Path>>(&mut self, path: P) -> Result<()> {
        self.workbook
            .save(path.as_ref())
            .with_context(|| format!("Failed to save report to {:?}", path.as_ref()))?;
        info!(path = %path.as_ref().display(), "report saved");
        Ok(())
    }

    fn write_company_sheet(&mut self, name: &str, table: &MetricTable) -> Result<()> {
        let sheet = self.workbook.add_worksheet();
        sheet.set_name(name)?;
        sheet.write_string(0, 0, &table.label_header)?;
        for (c, column) in table.columns.iter().enumerate() {
            sheet.write_string(0, 1 + c as u16, column)?;
        }
        for (r, row) in table.rows.iter().enumerate() {
            let out_row = 1 + r as u32;
            sheet.write_string(out_row, 0, &row.label)?;
            for (c, value) in row.values.iter().enumerate() {
                if let Some(v) = value {
                    sheet.write_number(out_row, 1 + c as u16, *v)?;
                }
            }
        }
        Ok(())
    }

    /// Write the CPI header and yearly means; rows with no mean leave the
    /// value cell empty. Returns the block the charts reference.
    fn write_cpi_table(&mut self, table_end: Option<u32>, cpi: &[CpiYear]) -> Result<CpiBlock> {
        let header_row = match table_end {
            Some(end) => end + 2,
            None => 0,
        };
        let sheet = self.workbook.worksheet_from_name(RESULTS_SHEET)?;
        sheet.write_string(header_row, 0, "연도")?;
        sheet.write_string(header_row, 1, "소비자물가지수")?;
        for (i, year) in cpi.iter().enumerate() {
            let row = header_row + 1 + i as u32;
            sheet.write_string(row, 0, &year.year)?;
            if let Some(mean) = year.mean {
                sheet.write_number(row, 1, mean)?;
            }
        }
        Ok(CpiBlock {
            header_row,
            last_row: header_row + cpi.len() as u32,
        })
    }

    fn insert_chart(&mut self, row: u32, col: u16, chart: &Chart) -> Result<()> {
        self.workbook
            .worksheet_from_name(RESULTS_SHEET)?
            .insert_chart(row, col, chart)?;
        Ok(())
    }

    /// Place up to eight charts in a two-column grid starting two rows
    /// below the CPI table. Each chart is independently skippable.
    fn place_charts(
        &mut self,
        subject: Option<&MetricTable>,
        average: Option<&MetricTable>,
        cpi: &CpiBlock,
    ) -> Result<()> {
        let start = cpi.last_row + 2;

        let chart = charts::cpi_chart(cpi);
        self.insert_chart(start, CHART_COL_LEFT, &chart)?;

        let (Some(subject), Some(&company)) = (subject, COMPANY_SHEETS.first()) else {
            return Ok(());
        };

        if let Some(chart) = charts::profitability_chart(&mut self.workbook, company, subject)? {
            self.insert_chart(start, CHART_COL_RIGHT, &chart)?;
        }

        if let Some(chart) = charts::comparison_chart(
            &mut self.workbook,
            company,
            REVENUE,
            subject,
            cpi,
            charts::REVENUE_BAR,
        )? {
            self.insert_chart(start + CHART_ROW_STEP, CHART_COL_LEFT, &chart)?;
        }
        if let Some(chart) = charts::comparison_chart(
            &mut self.workbook,
            company,
            OPERATING_PROFIT,
            subject,
            cpi,
            charts::OP_PROFIT_BAR,
        )? {
            self.insert_chart(start + CHART_ROW_STEP, CHART_COL_RIGHT, &chart)?;
        }

        if let Some(average) = average {
            if let Some(chart) = charts::average_comparison_chart(
                &mut self.workbook,
                REVENUE_COMPARISON_SHEET,
                company,
                REVENUE,
                AVG_REVENUE,
                subject,
                average,
            )? {
                self.insert_chart(start + 2 * CHART_ROW_STEP, CHART_COL_LEFT, &chart)?;
            }
            if let Some(chart) = charts::average_comparison_chart(
                &mut self.workbook,
                OP_PROFIT_COMPARISON_SHEET,
                company,
                OPERATING_PROFIT,
                AVG_OPERATING_PROFIT,
                subject,
                average,
            )? {
                self.insert_chart(start + 2 * CHART_ROW_STEP, CHART_COL_RIGHT, &chart)?;
            }
        }

        if let Some(chart) = charts::single_metric_chart(
            &mut self.workbook,
            company,
            NET_MARGIN,
            subject,
            charts::NET_MARGIN_BAR,
        )? {
            self.insert_chart(start + 3 * CHART_ROW_STEP, CHART_COL_LEFT, &chart)?;
        }
        if let Some(chart) = charts::single_metric_chart(
            &mut self.workbook,
            company,
            GROSS_MARGIN,
            subject,
            charts::GROSS_MARGIN_BAR,
        )? {
            self.insert_chart(start + 3 * CHART_ROW_STEP, CHART_COL_RIGHT, &chart)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::Result;
    use calamine::{open_workbook, Data, Reader, Xlsx};
    use std::path::Path;

    use crate::labels::{COST_OF_GOODS, GROSS_PROFIT, NET_INCOME, SGA_EXPENSES};
    use crate::process;

    fn subject() -> MetricTable {
        let mut t = MetricTable::new(
            "IFRS(연결)",
            vec!["2022/12".into(), "전년대비".into(), "2023/12".into()],
        );
        t.push_row(REVENUE, vec![Some(100.0), Some(5.0), Some(50.0)]);
        t.push_row(OPERATING_PROFIT, vec![Some(10.0), Some(1.0), Some(5.0)]);
        t.push_row(NET_INCOME, vec![Some(8.0), Some(1.0), Some(4.0)]);
        t.push_row(GROSS_PROFIT, vec![Some(40.0), Some(2.0), Some(20.0)]);
        t.push_row(SGA_EXPENSES, vec![Some(30.0), Some(1.0), Some(30.0)]);
        t.push_row(COST_OF_GOODS, vec![Some(50.0), Some(2.0), Some(25.0)]);
        t
    }

    fn peer(revenue: f64, op_profit: f64) -> MetricTable {
        let mut t = MetricTable::new(
            "IFRS(연결)",
            vec!["2022/12".into(), "전년대비".into(), "2023/12".into()],
        );
        t.push_row(REVENUE, vec![Some(revenue), Some(1.0), Some(revenue)]);
        t.push_row(OPERATING_PROFIT, vec![Some(op_profit), Some(1.0), Some(op_profit)]);
        t
    }

    fn cpi_series() -> Vec<CpiYear> {
        ["2020", "2021", "2022", "2023", "2024"]
            .iter()
            .enumerate()
            .map(|(i, year)| CpiYear {
                year: year.to_string(),
                mean: Some(100.0 + i as f64),
            })
            .collect()
    }

    fn cell(path: &Path, sheet: &str, row: usize, col: usize) -> Option<Data> {
        let mut wb: Xlsx<_> = open_workbook(path).ok()?;
        let range = wb.worksheet_range(sheet).ok()?;
        range.get((row, col)).cloned()
    }

    #[test]
    fn assembled_report_round_trips() -> Result<()> {
        let dir = tempfile::tempdir()?;
        let path = dir.path().join("analysis.xlsx");

        let mut tables = vec![subject(), peer(200.0, 20.0), peer(300.0, 30.0)];
        process::add_financial_ratios(&mut tables[0]);
        let average = process::company_average(&tables);
        assert!(average.is_some());

        let mut builder = ReportBuilder::new();
        builder.assemble(&tables, average.as_ref(), &cpi_series())?;
        builder.save(&path)?;

        // the results sheet leads with the title and summary header
        assert_eq!(
            cell(&path, RESULTS_SHEET, 0, 0),
            Some(Data::String("LG전자 주요 지표 요약".into()))
        );
        assert_eq!(
            cell(&path, RESULTS_SHEET, 2, 0),
            Some(Data::String("연도".into()))
        );
        assert_eq!(
            cell(&path, RESULTS_SHEET, 2, 6),
            Some(Data::String("달성여부".into()))
        );

        // 2022/12: revenue 100 vs break-even 60 -> achieved
        assert_eq!(
            cell(&path, RESULTS_SHEET, 3, 0),
            Some(Data::String("2022/12".into()))
        );
        assert_eq!(cell(&path, RESULTS_SHEET, 3, 1), Some(Data::Float(100.0)));
        assert_eq!(
            cell(&path, RESULTS_SHEET, 3, 6),
            Some(Data::String("달성".into()))
        );
        // 2023/12: revenue 50 vs break-even 30/(1-0.5)=60 -> missed
        assert_eq!(
            cell(&path, RESULTS_SHEET, 4, 6),
            Some(Data::String("미달".into()))
        );

        // CPI table lands two rows under the summary (2 data rows -> row 6)
        assert_eq!(
            cell(&path, RESULTS_SHEET, 6, 0),
            Some(Data::String("연도".into()))
        );
        assert_eq!(
            cell(&path, RESULTS_SHEET, 6, 1),
            Some(Data::String("소비자물가지수".into()))
        );
        assert_eq!(
            cell(&path, RESULTS_SHEET, 7, 0),
            Some(Data::String("2020".into()))
        );
        assert_eq!(cell(&path, RESULTS_SHEET, 11, 1), Some(Data::Float(104.0)));

        // company sheets carry the cleaned tables, subject one augmented
        assert_eq!(
            cell(&path, "LG전자", 1, 0),
            Some(Data::String(REVENUE.into()))
        );
        assert_eq!(
            cell(&path, "LG전자", 7, 0),
            Some(Data::String(NET_MARGIN.into()))
        );
        assert_eq!(
            cell(&path, "삼성전자", 1, 1),
            Some(Data::Float(200.0))
        );

        // results sheet first, one sheet per company, then the backing and
        // comparison sheets in creation order
        let wb: Xlsx<_> = open_workbook(&path)?;
        assert_eq!(
            wb.sheet_names(),
            vec![
                RESULTS_SHEET,
                "LG전자",
                "삼성전자",
                "SK하이닉스",
                "_LG전자_profit_chart_data",
                "_LG전자_매출액_comp_data",
                "_LG전자_영업이익_comp_data",
                REVENUE_COMPARISON_SHEET,
                OP_PROFIT_COMPARISON_SHEET,
                "_LG전자_매출순수익률_data",
                "_LG전자_매출총이익률_data",
            ]
        );

        // average table spans the two year columns
        assert_eq!(
            cell(&path, REVENUE_COMPARISON_SHEET, 1, 0),
            Some(Data::String("2022/12".into()))
        );
        assert_eq!(
            cell(&path, REVENUE_COMPARISON_SHEET, 1, 1),
            Some(Data::Float(200.0))
        );
        Ok(())
    }

    #[test]
    fn company_sheet_round_trips_table_values() -> Result<()> {
        let dir = tempfile::tempdir()?;
        let path = dir.path().join("analysis.xlsx");

        let tables = vec![peer(123.5, 4.25)];
        let mut builder = ReportBuilder::new();
        builder.assemble(&tables, None, &cpi_series())?;
        builder.save(&path)?;

        let mut wb: Xlsx<_> = open_workbook(&path)?;
        let range = wb.worksheet_range("LG전자")?;
        assert_eq!(range.get((0, 0)), Some(&Data::String("IFRS(연결)".into())));
        assert_eq!(range.get((0, 1)), Some(&Data::String("2022/12".into())));
        assert_eq!(range.get((0, 2)), Some(&Data::String("전년대비".into())));
        assert_eq!(range.get((1, 0)), Some(&Data::String(REVENUE.into())));
        assert_eq!(range.get((1, 1)), Some(&Data::Float(123.5)));
        assert_eq!(
            range.get((2, 0)),
            Some(&Data::String(OPERATING_PROFIT.into()))
        );
        assert_eq!(range.get((2, 3)), Some(&Data::Float(4.25)));
        Ok(())
    }

    #[test]
    fn missing_summary_moves_cpi_table_to_the_top() -> Result<()> {
        let dir = tempfile::tempdir()?;
        let path = dir.path().join("analysis.xlsx");

        // no derived rows anywhere: summary gate fails, average still works
        let tables = vec![peer(100.0, 10.0), peer(200.0, 20.0), peer(300.0, 30.0)];
        let average = process::company_average(&tables);

        let mut builder = ReportBuilder::new();
        builder.assemble(&tables, average.as_ref(), &cpi_series())?;
        builder.save(&path)?;

        assert_eq!(
            cell(&path, RESULTS_SHEET, 0, 0),
            Some(Data::String("연도".into()))
        );
        assert_eq!(cell(&path, RESULTS_SHEET, 1, 1), Some(Data::Float(100.0)));

        // profitability and margin charts are skipped, so their backing
        // sheets never appear
        let mut wb: Xlsx<_> = open_workbook(&path)?;
        assert!(wb.worksheet_range("_LG전자_profit_chart_data").is_err());
        assert!(wb.worksheet_range(REVENUE_COMPARISON_SHEET).is_ok());
        Ok(())
    }

    #[test]
    fn report_without_average_skips_comparison_sheets() -> Result<()> {
        let dir = tempfile::tempdir()?;
        let path = dir.path().join("analysis.xlsx");

        let mut tables = vec![subject()];
        process::add_financial_ratios(&mut tables[0]);

        let mut builder = ReportBuilder::new();
        builder.assemble(&tables, None, &cpi_series())?;
        builder.save(&path)?;

        let mut wb: Xlsx<_> = open_workbook(&path)?;
        assert!(wb.worksheet_range(REVENUE_COMPARISON_SHEET).is_err());
        assert!(wb.worksheet_range(OP_PROFIT_COMPARISON_SHEET).is_err());
        assert!(wb.worksheet_range("_LG전자_profit_chart_data").is_ok());
        Ok(())
    }
}
