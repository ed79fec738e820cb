//! Single-pass profitability pipeline: quarterly statement workbook and a
//! consumer-price-index csv in, formatted xlsx analysis report out.

pub mod ingest;
pub mod labels;
pub mod process;
pub mod report;
pub mod table;
