use anyhow::{Context, Result};
use profitscope::{
    ingest::{self, cpi},
    labels::COMPANY_SHEETS,
    process::{add_financial_ratios, clean_table, company_average},
    report::ReportBuilder,
};
use std::path::Path;
use tracing::info;
use tracing_subscriber::{fmt, EnvFilter};

fn main() -> Result<()> {
    // ─── 1) init logging ─────────────────────────────────────────────
    let env = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    fmt::Subscriber::builder()
        .with_env_filter(env)
        .with_span_events(fmt::format::FmtSpan::CLOSE)
        .init();
    info!("startup");

    std::panic::set_hook(Box::new(|info| {
        eprintln!("panic: {:?}", info);
    }));

    // ─── 2) configure paths ──────────────────────────────────────────
    let statements_path = Path::new("excels/수익성자동분석.xlsx");
    let cpi_path = Path::new("excels/품목별_소비자물가지수_품목성질별_2020100__20250818162040.csv");
    let report_path = Path::new("excels/수익성_분석결과.xlsx");

    // ─── 3) ingest statements + CPI ──────────────────────────────────
    let raw_sheets = ingest::load_statement_workbook(statements_path)?;
    let cpi_years = cpi::load_cpi_csv(cpi_path)?;

    // ─── 4) clean one table per company ──────────────────────────────
    let mut tables = Vec::with_capacity(COMPANY_SHEETS.len());
    for &company in COMPANY_SHEETS.iter() {
        let raw = raw_sheets
            .get(company)
            .with_context(|| format!("no sheet loaded for {company}"))?;
        tables.push(clean_table(raw));
    }

    // ─── 5) derive ratios for the designated company ─────────────────
    if let Some(subject) = tables.first_mut() {
        add_financial_ratios(subject);
    }

    // ─── 6) cross-company averages ───────────────────────────────────
    let average = company_average(&tables);

    // ─── 7) assemble + save the report ───────────────────────────────
    let mut report = ReportBuilder::new();
    report.assemble(&tables, average.as_ref(), &cpi_years)?;
    report.save(report_path)?;

    info!("all done");
    Ok(())
}
