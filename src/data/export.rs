use std::io::Write;

use anyhow::{Context, Result};

use super::model::Catalog;

/// Write the given rows of `catalog` as CSV: one header row with every
/// column name, then one record per selected source.
pub fn write_csv<W: Write>(catalog: &Catalog, rows: &[usize], out: W) -> Result<()> {
    let mut writer = csv::Writer::from_writer(out);
    writer
        .write_record(catalog.column_names())
        .context("writing CSV header")?;

    let columns: Vec<&[f64]> = catalog
        .column_names()
        .iter()
        .filter_map(|name| catalog.column(name))
        .collect();
    for &row in rows {
        writer
            .write_record(columns.iter().map(|c| c[row].to_string()))
            .with_context(|| format!("writing CSV row {row}"))?;
    }
    writer.flush().context("flushing CSV")?;
    Ok(())
}
