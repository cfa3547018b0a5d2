use std::path::Path;

use anyhow::{Context, Result};

/// Columns the merge workflow reads from the sample sheet
pub const EXPECTED_COLUMNS: [&str; 3] = ["project", "sample", "barcode"];

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SampleSheetReport {
    pub num_samples: usize,
    pub missing_columns: Vec<&'static str>,
}

/// Reads the header and counts the non-empty rows of a sample sheet.
pub fn inspect(path: &Path) -> Result<SampleSheetReport> {
    let mut reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .flexible(true)
        .from_path(path)
        .with_context(|| format!("Could not open sample sheet {}", path.display()))?;

    let headers = reader.headers()?.clone();
    let missing_columns = EXPECTED_COLUMNS
        .iter()
        .filter(|&&column| !headers.iter().any(|h| h.eq_ignore_ascii_case(column)))
        .copied()
        .collect();

    let mut num_samples = 0;
    for record in reader.records() {
        let record = record?;
        if record.iter().any(|field| !field.is_empty()) {
            num_samples += 1;
        }
    }

    Ok(SampleSheetReport {
        num_samples,
        missing_columns,
    })
}
