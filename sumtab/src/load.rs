//! CSV loading with per-column type inference.
//!
//! A column is numeric when every non-missing cell parses as a number,
//! boolean when every non-missing cell is one of `TRUE/FALSE/T/F/true/false`,
//! and categorical otherwise. Empty cells and `NA` are missing.

use std::io::Read;
use std::path::Path;

use anyhow::{Context, Result};
use sumtablib::{Column, Dataset};
use tracing::{debug, trace};

/// Cell values read as missing.
const MISSING: &[&str] = &["", "NA"];

/// Read a CSV file with a header row into a dataset.
pub fn load_csv(path: &Path) -> Result<Dataset> {
    let file = std::fs::File::open(path)
        .with_context(|| format!("cannot open '{}'", path.display()))?;
    let dataset = read_csv(file).with_context(|| format!("cannot read '{}'", path.display()))?;
    debug!(
        path = %path.display(),
        rows = dataset.n_rows(),
        columns = dataset.n_columns(),
        "loaded dataset"
    );
    Ok(dataset)
}

/// Read CSV data with a header row from any reader.
pub fn read_csv<R: Read>(input: R) -> Result<Dataset> {
    let mut reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_reader(input);

    let headers: Vec<String> = reader.headers()?.iter().map(str::to_string).collect();
    let mut cells: Vec<Vec<Option<String>>> = vec![Vec::new(); headers.len()];
    for (idx, record) in reader.records().enumerate() {
        // Header is line 1
        let record = record.with_context(|| format!("bad record on line {}", idx + 2))?;
        for (column, field) in cells.iter_mut().zip(record.iter()) {
            column.push(if MISSING.contains(&field) {
                None
            } else {
                Some(field.to_string())
            });
        }
    }

    let mut dataset = Dataset::new();
    for (name, values) in headers.into_iter().zip(cells) {
        let column = infer_column(values);
        trace!(column = %name, kind = %column.kind(), "inferred column type");
        dataset.add_column(name, column)?;
    }
    Ok(dataset)
}

fn parse_bool(value: &str) -> Option<bool> {
    match value {
        "TRUE" | "T" | "true" => Some(true),
        "FALSE" | "F" | "false" => Some(false),
        _ => None,
    }
}

/// Pick the narrowest column type that holds every present value.
pub fn infer_column(values: Vec<Option<String>>) -> Column {
    let present = || values.iter().flatten();

    if present().all(|v| v.parse::<f64>().is_ok()) {
        return Column::Numeric(
            values
                .iter()
                .map(|v| v.as_ref().and_then(|s| s.parse().ok()))
                .collect(),
        );
    }
    if present().all(|v| parse_bool(v).is_some()) {
        return Column::Boolean(
            values
                .iter()
                .map(|v| v.as_deref().and_then(parse_bool))
                .collect(),
        );
    }
    Column::categorical(values)
}
