use std::fs;
use std::path::Path;

use anyhow::{bail, Context, Result};
use ndarray::Array2;

/// Loads a whitespace-delimited numeric table, one row per line.
/// Blank lines and lines starting with `#` are skipped; every remaining row
/// must have the same number of columns.
pub fn load_table(path: &Path) -> Result<Array2<f64>> {
    let text =
        fs::read_to_string(path).with_context(|| format!("reading table {}", path.display()))?;

    let mut rows: Vec<Vec<f64>> = Vec::new();
    for (lineno, line) in text.lines().enumerate() {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        let row = line
            .split_whitespace()
            .map(|field| {
                field.parse::<f64>().with_context(|| {
                    format!("{}:{}: bad numeric field {field:?}", path.display(), lineno + 1)
                })
            })
            .collect::<Result<Vec<f64>>>()?;
        rows.push(row);
    }

    if rows.is_empty() {
        bail!("{}: table holds no data rows", path.display());
    }
    let width = rows[0].len();
    if rows.iter().any(|row| row.len() != width) {
        bail!("{}: rows have inconsistent column counts", path.display());
    }

    let flat: Vec<f64> = rows.iter().flatten().copied().collect();
    let table = Array2::from_shape_vec((rows.len(), width), flat)
        .with_context(|| format!("{}: shaping table", path.display()))?;
    Ok(table)
}
