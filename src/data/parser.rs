use std::collections::HashMap;

use crate::error::{IvError, Result};

/// Rows scanned when looking for the header.
pub const HEADER_SCAN_ROWS: usize = 50;

/// Detect the header row among the first `max_rows` rows.
///
/// Scans bottom-up for the last row of the dominant width whose cells are
/// all non-empty text (neither numbers nor dates). Falls back to row 0.
pub fn detect_header(rows: &[Vec<String>], max_rows: usize) -> usize {
    let rows = &rows[..rows.len().min(max_rows)];

    let mut counts: HashMap<usize, usize> = HashMap::new();
    for row in rows.iter().filter(|r| !r.is_empty()) {
        *counts.entry(row.len()).or_insert(0) += 1;
    }
    // Ties go to the wider row so a short preamble cannot win.
    let Some(most_common) = counts
        .into_iter()
        .max_by_key(|&(len, c)| (c, len))
        .map(|(len, _)| len)
    else {
        return 0;
    };

    rows.iter()
        .enumerate()
        .rev()
        .filter(|(_, row)| row.len() == most_common)
        .find(|(_, row)| {
            row.iter().all(|cell| {
                let trimmed = cell.trim();
                !trimmed.is_empty() && trimmed.parse::<f64>().is_err() && !is_date_like(trimmed)
            })
        })
        .map(|(i, _)| i)
        .unwrap_or(0)
}

pub fn is_date_like(s: &str) -> bool {
    let has_separators = s.contains('/') || s.contains(':');
    let lower = s.to_lowercase();
    let has_date_words = lower.contains("am") || lower.contains("pm");

    if !has_separators && !has_date_words {
        return false;
    }

    use chrono::{NaiveDate, NaiveDateTime};
    let formats = [
        "%Y-%m-%d %H:%M:%S",
        "%m/%d/%Y %H:%M:%S",
        "%d/%m/%Y %H:%M:%S",
        "%Y-%m-%d",
        "%m/%d/%Y",
    ];
    formats.iter().any(|fmt| {
        NaiveDateTime::parse_from_str(s, fmt).is_ok() || NaiveDate::parse_from_str(s, fmt).is_ok()
    })
}

/// Lowercased column name with any unit suffix and separators removed:
/// `"Vgs (V)"` and `"V_GS [V]"` both become `"vgs"`.
pub fn normalize_name(name: &str) -> String {
    let base = name
        .split(&['(', '['][..])
        .next()
        .unwrap_or(name);
    base.chars()
        .filter(|c| c.is_alphanumeric())
        .flat_map(char::to_lowercase)
        .collect()
}

/// Positions of the recognised columns in a header.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ColumnMap {
    pub vgs: usize,
    pub vds: usize,
    pub ids: usize,
    pub sweep: Option<usize>,
    pub kind: Option<usize>,
}

const VGS_ALIASES: &[&str] = &["vgs", "vg", "gate", "gatevoltage"];
const VDS_ALIASES: &[&str] = &["vds", "vd", "drain", "drainvoltage"];
const IDS_ALIASES: &[&str] = &["ids", "id", "current", "draincurrent"];
const SWEEP_ALIASES: &[&str] = &["sweep", "sweepid", "run"];
const KIND_ALIASES: &[&str] = &["type", "kind", "sweeptype"];

/// Match header names to the measurement schema. Missing voltage or current
/// columns are reported by their canonical field name.
pub fn resolve_columns(columns: &[String]) -> Result<ColumnMap> {
    let normalized: Vec<String> = columns.iter().map(|c| normalize_name(c)).collect();
    let find = |aliases: &[&str]| {
        normalized
            .iter()
            .position(|name| aliases.contains(&name.as_str()))
    };
    Ok(ColumnMap {
        vgs: find(VGS_ALIASES).ok_or(IvError::MissingField("vgs"))?,
        vds: find(VDS_ALIASES).ok_or(IvError::MissingField("vds"))?,
        ids: find(IDS_ALIASES).ok_or(IvError::MissingField("ids"))?,
        sweep: find(SWEEP_ALIASES),
        kind: find(KIND_ALIASES),
    })
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
    fn header_after_preamble() {
        let table = rows(&[
            &["Instrument: B1500"],
            &["Date", "2024-01-01 10:00:00", "x"],
            &["Vgs (V)", "Vds (V)", "Ids (A)"],
            &["0", "0.1", "1e-12"],
            &["0.5", "0.1", "1e-9"],
        ]);
        assert_eq!(detect_header(&table, HEADER_SCAN_ROWS), 2);
    }

    #[test]
    fn numeric_only_table_defaults_to_first_row() {
        let table = rows(&[&["0", "1"], &["2", "3"]]);
        assert_eq!(detect_header(&table, HEADER_SCAN_ROWS), 0);
    }

    #[test]
    fn names_are_normalized() {
        assert_eq!(normalize_name("Vgs (V)"), "vgs");
        assert_eq!(normalize_name(" V_DS [V]"), "vds");
        assert_eq!(normalize_name("Drain Current"), "draincurrent");
    }

    #[test]
    fn resolves_aliases_and_reports_missing() {
        let cols: Vec<String> = ["Sweep", "Vg", "Vd", "Id (A)"]
            .iter()
            .map(|s| s.to_string())
            .collect();
        let map = resolve_columns(&cols).unwrap();
        assert_eq!((map.vgs, map.vds, map.ids, map.sweep, map.kind), (1, 2, 3, Some(0), None));

        let cols: Vec<String> = ["vgs", "vds"].iter().map(|s| s.to_string()).collect();
        assert!(matches!(
            resolve_columns(&cols),
            Err(IvError::MissingField("ids"))
        ));
    }

    #[test]
    fn date_like_cells() {
        assert!(is_date_like("2024-01-01 10:00:00"));
        assert!(!is_date_like("Vgs"));
    }
}
