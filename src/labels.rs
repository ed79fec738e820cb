// src/labels.rs
//
// Fixed sheet names and metric row labels as they appear in the source
// workbook (Naver Finance quarterly statement export, Korean labels).

/// Input sheet per company, in pipeline order. The first entry is the
/// designated company that receives ratio rows and the summary table.
pub static COMPANY_SHEETS: &[&str] = &["LG전자", "삼성전자", "SK하이닉스"];

/// Name of the results sheet in the output workbook.
pub const RESULTS_SHEET: &str = "분석결과";

/// Substring marking a "vs prior year" comparison column. Columns carrying it
/// are paired with a year column and are excluded from charts and averaging.
pub const VS_PRIOR_YEAR: &str = "전년대비";

// ── Source metric rows ─────────────────────────────────────────────────
pub const REVENUE: &str = "매출액";
pub const OPERATING_PROFIT: &str = "영업이익";
pub const NET_INCOME: &str = "당기순이익";
pub const GROSS_PROFIT: &str = "매출총이익";
pub const SGA_EXPENSES: &str = "판매비와관리비";
pub const COST_OF_GOODS: &str = "매출원가";

// ── Derived metric rows ────────────────────────────────────────────────
pub const NET_MARGIN: &str = "매출순수익률";
pub const GROSS_MARGIN: &str = "매출총이익률";
pub const BREAK_EVEN: &str = "손익분기점추정";

// ── Cross-company average table ────────────────────────────────────────
pub const AVERAGE_LABEL_HEADER: &str = "구분";
pub const AVG_REVENUE: &str = "3사 평균 매출액";
pub const AVG_OPERATING_PROFIT: &str = "3사 평균 영업이익";

// ── Visible comparison-data sheets backing the average charts ──────────
pub const REVENUE_COMPARISON_SHEET: &str = "매출액_비교_데이터";
pub const OP_PROFIT_COMPARISON_SHEET: &str = "영업이익_비교_데이터";

/// Year columns expected in the consumer price index CSV.
pub static CPI_YEARS: &[&str] = &["2020", "2021", "2022", "2023", "2024"];
