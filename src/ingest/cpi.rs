// src/ingest/cpi.rs
//
// The consumer-price-index series arrives as a KOSIS CSV export encoded in
// CP949, with one column per calendar year holding the monthly readings.

use anyhow::{bail, ensure, Context, Result};
use csv::ReaderBuilder;
use encoding_rs::EUC_KR;
use std::fs;
use std::path::Path;
use tracing::{debug, info};

use crate::labels::CPI_YEARS;

/// One yearly row of the consumer-price-index summary.
#[derive(Debug, Clone, PartialEq)]
pub struct CpiYear {
    pub year: String,
    /// Mean of the year's numeric readings; `None` when the column held no
    /// numeric entries at all.
    pub mean: Option<f64>,
}

/// Load the CPI export at `path` and reduce each year column to its mean.
///
/// Every year named in [`CPI_YEARS`] must exist as a column, and the file
/// must decode as CP949; either failing is a hard error. Blank and
/// non-numeric entries inside a column are skipped, so a partially filled
/// year still averages over what it has.
#[tracing::instrument(level = "info", skip(path), fields(path = %path.as_ref().display()))]
pub fn load_cpi_csv<P: AsRef<Path>>(path: P) -> Result<Vec<CpiYear>> {
    // 1) Read the raw bytes and decode from CP949
    let bytes = fs::read(&path)
        .with_context(|| format!("Failed to read CPI file: {:?}", path.as_ref()))?;
    let (decoded, _, had_errors) = EUC_KR.decode(&bytes);
    ensure!(
        !had_errors,
        "CPI file {:?} is not valid CP949",
        path.as_ref()
    );

    // 2) Parse the CSV and locate each year column
    let mut rdr = ReaderBuilder::new()
        .flexible(true)
        .from_reader(decoded.as_bytes());

    let headers = rdr
        .headers()
        .with_context(|| format!("Failed to read CPI headers from {:?}", path.as_ref()))?
        .clone();

    let mut col_for_year: Vec<usize> = Vec::with_capacity(CPI_YEARS.len());
    for &year in CPI_YEARS {
        match headers.iter().position(|h| h.trim() == year) {
            Some(idx) => col_for_year.push(idx),
            None => bail!("CPI column '{}' not found in {:?}", year, path.as_ref()),
        }
    }

    // 3) Accumulate sums and counts per year, skipping non-numeric entries
    let mut sums = vec![0.0f64; CPI_YEARS.len()];
    let mut counts = vec![0usize; CPI_YEARS.len()];
    for (row_idx, result) in rdr.records().enumerate() {
        let record = result.with_context(|| {
            format!("CSV parse error in {:?} at record {}", path.as_ref(), row_idx)
        })?;
        for (i, &col) in col_for_year.iter().enumerate() {
            if let Some(field) = record.get(col) {
                if let Ok(v) = field.trim().parse::<f64>() {
                    sums[i] += v;
                    counts[i] += 1;
                }
            }
        }
    }

    let series: Vec<CpiYear> = CPI_YEARS
        .iter()
        .enumerate()
        .map(|(i, &year)| {
            let mean = (counts[i] > 0).then(|| sums[i] / counts[i] as f64);
            debug!(year, entries = counts[i], ?mean, "CPI column reduced");
            CpiYear {
                year: year.to_string(),
                mean,
            }
        })
        .collect();

    info!(years = series.len(), "CPI yearly means computed");
    Ok(series)
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::Result;

    fn write_cp949(path: &Path, content: &str) -> Result<()> {
        let (encoded, _, _) = EUC_KR.encode(content);
        fs::write(path, encoded)?;
        Ok(())
    }

    #[test]
    fn year_columns_reduce_to_means() -> Result<()> {
        let dir = tempfile::tempdir()?;
        let path = dir.path().join("cpi.csv");
        write_cp949(
            &path,
            "품목별,2020,2021,2022,2023,2024\n\
             총지수,100.0,102.5,107.5,111.0,114.5\n\
             농축수산물,102.0,105.5,108.5,112.0,115.5\n",
        )?;

        let series = load_cpi_csv(&path)?;
        assert_eq!(series.len(), 5);
        assert_eq!(series[0].year, "2020");
        assert_eq!(series[0].mean, Some(101.0));
        assert_eq!(series[1].mean, Some(104.0));
        assert_eq!(series[4].mean, Some(115.0));
        Ok(())
    }

    #[test]
    fn non_numeric_entries_are_skipped() -> Result<()> {
        let dir = tempfile::tempdir()?;
        let path = dir.path().join("cpi.csv");
        write_cp949(
            &path,
            "품목별,2020,2021,2022,2023,2024\n\
             총지수,100.0,-,103.0,104.0,105.0\n\
             기타,200.0,,105.0,106.0,107.0\n",
        )?;

        let series = load_cpi_csv(&path)?;
        assert_eq!(series[0].mean, Some(150.0));
        // the whole 2021 column is blank or non-numeric
        assert_eq!(series[1].mean, None);
        assert_eq!(series[2].mean, Some(104.0));
        Ok(())
    }

    #[test]
    fn missing_year_column_is_fatal() -> Result<()> {
        let dir = tempfile::tempdir()?;
        let path = dir.path().join("cpi.csv");
        write_cp949(
            &path,
            "품목별,2020,2021,2022,2023\n총지수,100.0,101.0,102.0,103.0\n",
        )?;

        let err = load_cpi_csv(&path).unwrap_err();
        assert!(err.to_string().contains("2024"));
        Ok(())
    }

    #[test]
    fn undecodable_bytes_are_fatal() -> Result<()> {
        let dir = tempfile::tempdir()?;
        let path = dir.path().join("cpi.csv");

        // 0xFF never starts a valid CP949 sequence
        let mut bytes = b"item,2020,2021,2022,2023,2024\n".to_vec();
        bytes.extend_from_slice(&[0xFF, 0xFF]);
        bytes.extend_from_slice(b",100.0,101.0,102.0,103.0,104.0\n");
        fs::write(&path, &bytes)?;

        let err = load_cpi_csv(&path).unwrap_err();
        assert!(err.to_string().contains("CP949"));
        Ok(())
    }

    #[test]
    fn korean_labels_survive_cp949_round_trip() -> Result<()> {
        let dir = tempfile::tempdir()?;
        let path = dir.path().join("cpi.csv");
        write_cp949(
            &path,
            "품목별,시점,2020,2021,2022,2023,2024\n\
             소비자물가지수,전국,100.0,101.0,102.0,103.0,104.0\n",
        )?;

        // the year columns sit after Korean-labelled ones; decode must not
        // shift the byte offsets
        let series = load_cpi_csv(&path)?;
        assert_eq!(series[2].mean, Some(102.0));
        Ok(())
    }
}
