// src/process/aggregate.rs

use crate::process::normalize::{normalize, CANON};
use crate::process::table::{Dataset, RawTable};
use anyhow::{Context, Result};
use rust_xlsxwriter::Workbook;
use std::fs;
use std::path::Path;
use tracing::{debug, info};

/// Sheet name in the persisted workbook.
pub const SHEET_NAME: &str = "AllData";

/// Normalize every raw table, concatenate the survivors into one dataset,
/// and persist it as a single-sheet workbook at `out_dir/file_name`.
///
/// Returns `Ok(None)` without touching the filesystem when the input is
/// empty or every table was rejected. I/O failures propagate unrecovered.
pub fn aggregate(
    tables: &[RawTable],
    out_dir: impl AsRef<Path>,
    file_name: &str,
) -> Result<Option<Dataset>> {
    if tables.is_empty() {
        return Ok(None);
    }

    let mut accepted = Vec::new();
    let mut rejected = 0usize;
    for table in tables {
        match normalize(table) {
            Some(stock) => accepted.push(stock),
            None => rejected += 1,
        }
    }
    debug!(accepted = accepted.len(), rejected, "normalized raw tables");

    if accepted.is_empty() {
        return Ok(None);
    }

    // union of accepted columns, in canonical order
    let columns: Vec<&'static str> = CANON
        .iter()
        .copied()
        .filter(|c| accepted.iter().any(|t| t.columns.contains(c)))
        .collect();

    let mut rows: Vec<Vec<String>> = Vec::new();
    for table in &accepted {
        // where each combined column lives in this table, if anywhere
        let slots: Vec<Option<usize>> = columns
            .iter()
            .map(|c| table.columns.iter().position(|tc| tc == c))
            .collect();
        for row in &table.rows {
            rows.push(
                slots
                    .iter()
                    .map(|slot| slot.map(|i| row[i].clone()).unwrap_or_default())
                    .collect(),
            );
        }
    }

    let dataset = Dataset { columns, rows };

    let out_dir = out_dir.as_ref();
    fs::create_dir_all(out_dir)
        .with_context(|| format!("creating output directory {}", out_dir.display()))?;
    let path = out_dir.join(file_name);
    write_workbook(&dataset, &path)?;
    info!(
        path = %path.display(),
        rows = dataset.rows.len(),
        cols = dataset.columns.len(),
        "wrote aggregated workbook"
    );

    Ok(Some(dataset))
}

/// Write the dataset as one sheet: header row first, no index column.
/// Overwrites any previous workbook at `path`.
fn write_workbook(dataset: &Dataset, path: &Path) -> Result<()> {
    let mut workbook = Workbook::new();
    let sheet = workbook.add_worksheet();
    sheet.set_name(SHEET_NAME)?;

    for (col, name) in dataset.columns.iter().enumerate() {
        sheet.write_string(0, col as u16, *name)?;
    }
    for (r, row) in dataset.rows.iter().enumerate() {
        for (c, cell) in row.iter().enumerate() {
            sheet.write_string(r as u32 + 1, c as u16, cell)?;
        }
    }

    workbook
        .save(path)
        .with_context(|| format!("writing workbook to {}", path.display()))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::process::table::RawTable;
    use tempfile::tempdir;

    const OUT_FILE: &str = "psx_stocks_single_sheet.xlsx";

    fn strs(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    fn eight_column_table() -> RawTable {
        RawTable::flat(
            strs(&[
                "SCRIP", "LDCP", "OPEN", "HIGH", "LOW", "CURRENT", "CHANGE", "VOLUME",
            ]),
            vec![
                strs(&["AAA", "10", "10", "11", "9", "10.5", "+0.5", "1000"]),
                strs(&["BBB", "20", "20", "22", "19", "21", "+1", "500"]),
            ],
        )
    }

    fn six_column_table() -> RawTable {
        RawTable::flat(
            strs(&["SCRIP", "LDCP", "LOW", "CURRENT", "CHANGE", "VOLUME"]),
            vec![strs(&["CCC", "5", "4", "4.5", "-0.5", "200"])],
        )
    }

    fn noise_table() -> RawTable {
        RawTable::flat(
            strs(&["Unnamed: 0", "Sector", "Count"]),
            vec![strs(&["", "Banks", "5"])],
        )
    }

    #[test]
    fn empty_input_returns_none_and_writes_nothing() {
        let dir = tempdir().unwrap();
        let out_dir = dir.path().join("psx_output");
        let result = aggregate(&[], &out_dir, OUT_FILE).unwrap();
        assert!(result.is_none());
        assert!(!out_dir.exists());
    }

    #[test]
    fn all_rejected_returns_none_and_writes_nothing() {
        let dir = tempdir().unwrap();
        let out_dir = dir.path().join("psx_output");
        let result = aggregate(&[noise_table(), noise_table()], &out_dir, OUT_FILE).unwrap();
        assert!(result.is_none());
        assert!(!out_dir.exists());
    }

    #[test]
    fn mixed_input_concatenates_accepted_tables_only() {
        let dir = tempdir().unwrap();
        let tables = vec![eight_column_table(), noise_table(), six_column_table()];
        let dataset = aggregate(&tables, dir.path(), OUT_FILE)
            .unwrap()
            .expect("two tables should survive");

        // rows from both accepted tables, nothing from the noise table
        assert_eq!(dataset.rows.len(), 3);
        // column set is the union, which here is the full canonical schema
        assert_eq!(dataset.columns, CANON.to_vec());

        // the six-column table's missing fields are filled as empty
        let ccc = &dataset.rows[2];
        assert_eq!(ccc[0], "CCC");
        assert_eq!(ccc[2], ""); // OPEN
        assert_eq!(ccc[3], ""); // HIGH
        assert_eq!(ccc[7], "200");
    }

    #[test]
    fn persists_a_workbook_next_to_the_returned_dataset() {
        let dir = tempdir().unwrap();
        let out_dir = dir.path().join("nested").join("psx_output");
        let dataset = aggregate(&[eight_column_table()], &out_dir, OUT_FILE)
            .unwrap()
            .expect("table should survive");
        assert_eq!(dataset.rows.len(), 2);

        let path = out_dir.join(OUT_FILE);
        let meta = std::fs::metadata(&path).expect("workbook should exist");
        assert!(meta.len() > 0);
    }

    #[test]
    fn rerun_overwrites_the_previous_workbook() {
        let dir = tempdir().unwrap();
        aggregate(&[eight_column_table()], dir.path(), OUT_FILE)
            .unwrap()
            .unwrap();
        let first = std::fs::metadata(dir.path().join(OUT_FILE)).unwrap().len();

        aggregate(&[six_column_table()], dir.path(), OUT_FILE)
            .unwrap()
            .unwrap();
        let second = std::fs::metadata(dir.path().join(OUT_FILE)).unwrap().len();
        assert!(first > 0 && second > 0);
    }

    #[test]
    fn stock_table_plus_noise_table_keeps_only_stock_rows() {
        let dir = tempdir().unwrap();
        let tables = vec![eight_column_table(), noise_table()];
        let dataset = aggregate(&tables, dir.path(), OUT_FILE)
            .unwrap()
            .expect("stock table should survive");
        assert_eq!(dataset.columns.len(), 8);
        assert_eq!(dataset.rows.len(), 2);
        assert_eq!(dataset.rows[0][0], "AAA");
    }
}
