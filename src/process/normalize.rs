// src/process/normalize.rs

use crate::process::table::{RawTable, StockTable};
use once_cell::sync::Lazy;
use std::collections::{HashMap, HashSet};

/// The canonical stock-quote schema, in output column order.
pub const CANON: [&str; 8] = [
    "SCRIP", "LDCP", "OPEN", "HIGH", "LOW", "CURRENT", "CHANGE", "VOLUME",
];

static CANON_SET: Lazy<HashSet<&'static str>> = Lazy::new(|| CANON.iter().copied().collect());

/// A row 0 with at least this many canonical hits is a misparsed header.
pub const HEADER_ROW_MIN_HITS: usize = 4;

/// Tables carrying fewer canonical fields than this are noise.
pub const MIN_CANONICAL_FIELDS: usize = 6;

/// The one normalization applied everywhere a label or cell is compared
/// against the canonical field names: NBSP to space, trim, uppercase.
pub fn norm(value: &str) -> String {
    value.replace('\u{a0}', " ").trim().to_uppercase()
}

/// Reshape one raw table to the canonical stock schema, or reject it.
///
/// Pure over its input; the steps run on a working copy in fixed order:
/// flatten multi-level headers to the innermost label, normalize labels,
/// drop `UNNAMED` placeholder columns, promote a misparsed header out of
/// row 0, drop duplicate labels keeping the leftmost, project onto the
/// canonical fields (rejecting below [`MIN_CANONICAL_FIELDS`]), and scrub
/// residual header rows out of the SCRIP column.
pub fn normalize(raw: &RawTable) -> Option<StockTable> {
    // innermost header level only, then label normalization
    let mut labels: Vec<String> = raw
        .headers
        .iter()
        .map(|levels| norm(levels.last().map(String::as_str).unwrap_or("")))
        .collect();

    // rectangularize: scraped rows may be ragged against the header width
    let width = labels.len();
    let mut rows: Vec<Vec<String>> = raw
        .rows
        .iter()
        .map(|row| {
            (0..width)
                .map(|i| row.get(i).cloned().unwrap_or_default())
                .collect()
        })
        .collect();

    // placeholder columns left where the source had no header text
    let keep: Vec<usize> = (0..width)
        .filter(|&i| !labels[i].starts_with("UNNAMED"))
        .collect();
    if keep.len() != labels.len() {
        labels = keep.iter().map(|&i| labels[i].clone()).collect();
        rows = project_rows(&rows, &keep);
    }

    // the real header sometimes lands in row 0 (merged header cells upstream)
    if let Some(first) = rows.first() {
        let row0: Vec<String> = first.iter().map(|v| norm(v)).collect();
        let hits = row0
            .iter()
            .filter(|v| CANON_SET.contains(v.as_str()))
            .count();
        if hits >= HEADER_ROW_MIN_HITS {
            labels = row0;
            rows.remove(0);
        }
    }

    // idempotent second pass; row 0 may have introduced raw labels
    for label in &mut labels {
        *label = norm(label);
    }

    // duplicate labels keep only the leftmost column
    let mut seen: HashSet<&str> = HashSet::new();
    let keep: Vec<usize> = labels
        .iter()
        .enumerate()
        .filter(|(_, l)| seen.insert(l.as_str()))
        .map(|(i, _)| i)
        .collect();
    if keep.len() != labels.len() {
        labels = keep.iter().map(|&i| labels[i].clone()).collect();
        rows = project_rows(&rows, &keep);
    }

    // canonical-order intersection; this is the primary noise filter
    let mut col_index: HashMap<&str, usize> = HashMap::new();
    for (i, label) in labels.iter().enumerate() {
        col_index.entry(label.as_str()).or_insert(i);
    }
    let present: Vec<(&'static str, usize)> = CANON
        .iter()
        .filter_map(|&c| col_index.get(c).map(|&i| (c, i)))
        .collect();
    if present.len() < MIN_CANONICAL_FIELDS {
        return None;
    }

    let columns: Vec<&'static str> = present.iter().map(|&(c, _)| c).collect();
    let mut out_rows: Vec<Vec<String>> = rows
        .iter()
        .map(|row| present.iter().map(|&(_, i)| row[i].clone()).collect())
        .collect();

    // a residual "SCRIP" header row can survive below row 0
    if let Some(scrip) = columns.iter().position(|&c| c == "SCRIP") {
        for row in &mut out_rows {
            row[scrip] = row[scrip].trim().to_string();
        }
        out_rows.retain(|row| !row[scrip].eq_ignore_ascii_case("SCRIP"));
    }

    Some(StockTable {
        columns,
        rows: out_rows,
    })
}

fn project_rows(rows: &[Vec<String>], keep: &[usize]) -> Vec<Vec<String>> {
    rows.iter()
        .map(|row| keep.iter().map(|&i| row[i].clone()).collect())
        .collect()
}
