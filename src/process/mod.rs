// src/process/mod.rs
pub mod average;
pub mod clean;
pub mod ratios;

pub use average::company_average;
pub use clean::clean_table;
pub use ratios::add_financial_ratios;
