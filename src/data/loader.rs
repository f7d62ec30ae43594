use std::path::Path;

use crate::data::parser::{self, ColumnMap};
use crate::data::sweep::{Sample, SweepKind, SweepRecord};
use crate::error::{IvError, Result};

/// Load the sweep records stored in a CSV or Excel file.
///
/// Rows are grouped into records by the `sweep` column (first appearance
/// order); without one the whole file is a single record. The record kind
/// comes from the first row's `type` column, `mixed` when absent.
pub fn load_sweeps(path: &Path) -> Result<Vec<SweepRecord>> {
    let rows = load_rows(path)?;
    if rows.is_empty() {
        return Err(IvError::NoData(path.to_path_buf()));
    }
    let header = parser::detect_header(&rows, parser::HEADER_SCAN_ROWS);
    let columns: Vec<String> = rows[header].iter().map(|s| s.trim().to_string()).collect();
    let map = parser::resolve_columns(&columns)?;
    let records = sweeps_from_rows(&rows[header + 1..], &map, header + 1)?;
    tracing::info!(
        "Loaded {} sweeps ({} samples) from {:?}",
        records.len(),
        records.iter().map(SweepRecord::len).sum::<usize>(),
        path
    );
    Ok(records)
}

/// Raw rows of a table file as strings.
pub fn load_rows(path: &Path) -> Result<Vec<Vec<String>>> {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_lowercase())
        .unwrap_or_default();

    match ext.as_str() {
        "csv" => load_csv(path),
        "xls" | "xlsx" => load_excel(path),
        _ => Err(IvError::UnsupportedFormat(ext)),
    }
}

fn load_csv(path: &Path) -> Result<Vec<Vec<String>>> {
    let content = std::fs::read(path).map_err(|e| IvError::io(path, e))?;
    // Fall back to latin1 when the file is not UTF-8.
    let text = String::from_utf8(content)
        .unwrap_or_else(|e| e.into_bytes().iter().map(|&b| b as char).collect());

    let mut reader = csv::ReaderBuilder::new()
        .delimiter(b',')
        .has_headers(false)
        .flexible(true)
        .from_reader(text.as_bytes());

    let mut rows = Vec::new();
    for record in reader.records() {
        let record = record?;
        if record.iter().all(|cell| cell.trim().is_empty()) {
            continue;
        }
        rows.push(record.iter().map(str::to_string).collect());
    }
    Ok(rows)
}

fn load_excel(path: &Path) -> Result<Vec<Vec<String>>> {
    use calamine::{open_workbook_auto, Data, Reader};

    let mut workbook =
        open_workbook_auto(path).map_err(|e| IvError::Workbook(format!("{path:?}: {e}")))?;
    let sheet_name = workbook
        .sheet_names()
        .first()
        .cloned()
        .ok_or_else(|| IvError::Workbook(format!("{path:?}: no sheets found")))?;
    let range = workbook
        .worksheet_range(&sheet_name)
        .map_err(|e| IvError::Workbook(format!("{path:?}: {e}")))?;

    let rows = range
        .rows()
        .map(|row| {
            row.iter()
                .map(|cell| match cell {
                    Data::Empty => String::new(),
                    Data::String(s) => s.clone(),
                    Data::Float(f) => f.to_string(),
                    Data::Int(i) => i.to_string(),
                    Data::Bool(b) => b.to_string(),
                    Data::DateTime(dt) => dt.to_string(),
                    Data::DateTimeIso(s) => s.clone(),
                    Data::DurationIso(s) => s.clone(),
                    Data::Error(e) => format!("{e:?}"),
                })
                .collect::<Vec<String>>()
        })
        .filter(|row| row.iter().any(|cell| !cell.trim().is_empty()))
        .collect();
    Ok(rows)
}

fn parse_cell(row: &[String], col: usize, field: &'static str, line: usize) -> Result<f64> {
    let raw = row.get(col).map(|s| s.trim()).unwrap_or("");
    raw.parse::<f64>().map_err(|_| IvError::InvalidValue {
        field,
        row: line,
        value: raw.to_string(),
    })
}

/// Group data rows into sweep records. `first_line` is the 0-based row index
/// of `rows[0]` in the file, used in error messages.
pub fn sweeps_from_rows(
    rows: &[Vec<String>],
    map: &ColumnMap,
    first_line: usize,
) -> Result<Vec<SweepRecord>> {
    let mut keys: Vec<String> = Vec::new();
    let mut records: Vec<SweepRecord> = Vec::new();

    for (offset, row) in rows.iter().enumerate() {
        let line = first_line + offset;
        let sample = Sample {
            vgs: parse_cell(row, map.vgs, "vgs", line)?,
            vds: parse_cell(row, map.vds, "vds", line)?,
            ids: parse_cell(row, map.ids, "ids", line)?,
        };
        let key = map
            .sweep
            .and_then(|c| row.get(c))
            .map(|s| s.trim().to_string())
            .unwrap_or_default();

        let index = match keys.iter().position(|k| *k == key) {
            Some(index) => index,
            None => {
                let kind = map
                    .kind
                    .and_then(|c| row.get(c))
                    .map(|tag| SweepKind::from_tag(tag))
                    .unwrap_or_default();
                keys.push(key);
                records.push(SweepRecord::new(Vec::new(), kind));
                records.len() - 1
            }
        };
        records[index].data.push(sample);
    }
    Ok(records)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rows(lines: &[&[&str]]) -> Vec<Vec<String>> {
        lines
            .iter()
            .map(|r| r.iter().map(|s| s.to_string()).collect())
            .collect()
    }

    #[test]
    fn groups_rows_by_sweep_column() {
        let map = ColumnMap {
            vgs: 1,
            vds: 2,
            ids: 3,
            sweep: Some(0),
            kind: Some(4),
        };
        let data = rows(&[
            &["a", "0", "0.1", "1e-9", "g"],
            &["b", "0", "0.5", "2e-9", "d"],
            &["a", "1", "0.1", "1e-6", "d"],
        ]);
        let records = sweeps_from_rows(&data, &map, 1).unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].kind, SweepKind::Gate);
        assert_eq!(records[0].len(), 2);
        assert_eq!(records[1].kind, SweepKind::Drain);
    }

    #[test]
    fn bad_cell_names_field_and_row() {
        let map = ColumnMap {
            vgs: 0,
            vds: 1,
            ids: 2,
            sweep: None,
            kind: None,
        };
        let data = rows(&[&["0", "0.1", "1e-9"], &["1", "", "1e-6"]]);
        let err = sweeps_from_rows(&data, &map, 1).unwrap_err();
        assert!(matches!(
            err,
            IvError::InvalidValue {
                field: "vds",
                row: 2,
                ..
            }
        ));
    }

    #[test]
    fn unsupported_extension() {
        let err = load_rows(Path::new("sweeps.parquet")).unwrap_err();
        assert!(matches!(err, IvError::UnsupportedFormat(ext) if ext == "parquet"));
    }
}
