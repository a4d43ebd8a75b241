// src/fetch/html_tables.rs

use crate::process::table::RawTable;
use once_cell::sync::Lazy;
use scraper::{ElementRef, Html, Selector};
use tracing::debug;

static TABLE_SELECTOR: Lazy<Selector> =
    Lazy::new(|| Selector::parse("table").expect("selector should parse"));
static ROW_SELECTOR: Lazy<Selector> =
    Lazy::new(|| Selector::parse("tr").expect("selector should parse"));
static CELL_SELECTOR: Lazy<Selector> =
    Lazy::new(|| Selector::parse("th, td").expect("selector should parse"));

/// Extract every `<table>` in the document as an untyped grid.
///
/// `<thead>` rows (or leading rows made entirely of `<th>`) become header
/// levels, with `colspan` text repeated across the spanned columns — that
/// repetition is exactly how multi-level headers arise downstream. Header
/// cells with no text get an `Unnamed: <idx>` placeholder marker so the
/// normalizer can drop them. A document with no tables yields an empty
/// list, never an error.
pub fn extract_tables(html: &str) -> Vec<RawTable> {
    let document = Html::parse_document(html);
    let tables: Vec<RawTable> = document
        .select(&TABLE_SELECTOR)
        .filter_map(extract_table)
        .collect();
    debug!(tables = tables.len(), "extracted raw tables from document");
    tables
}

fn extract_table(table: ElementRef) -> Option<RawTable> {
    let mut header_rows: Vec<Vec<String>> = Vec::new();
    let mut body: Vec<Vec<String>> = Vec::new();
    let mut in_body = false;

    for tr in table.select(&ROW_SELECTOR) {
        let cells = row_cells(tr);
        if cells.is_empty() {
            continue;
        }
        if !in_body && (in_thead(&tr) || all_th(&tr)) {
            header_rows.push(cells);
        } else {
            in_body = true;
            body.push(cells);
        }
    }

    let ncols = header_rows
        .iter()
        .chain(body.iter())
        .map(Vec::len)
        .max()
        .unwrap_or(0);
    if ncols == 0 {
        return None;
    }

    // No header at all: label columns by position, like a read of a bare
    // grid would. The real header often sits in row 0 then, and the
    // normalizer's header-promotion step recovers it.
    let headers: Vec<Vec<String>> = if header_rows.is_empty() {
        (0..ncols).map(|i| vec![i.to_string()]).collect()
    } else {
        (0..ncols)
            .map(|i| {
                header_rows
                    .iter()
                    .map(|level| match level.get(i).map(|s| s.trim()) {
                        Some(text) if !text.is_empty() => text.to_string(),
                        _ => format!("Unnamed: {}", i),
                    })
                    .collect()
            })
            .collect()
    };

    Some(RawTable { headers, rows: body })
}

/// Cell texts for one row, with `colspan` text repeated per spanned column.
fn row_cells(tr: ElementRef) -> Vec<String> {
    let mut cells = Vec::new();
    for cell in tr.select(&CELL_SELECTOR) {
        let text = cell_text(cell);
        let span = cell
            .value()
            .attr("colspan")
            .and_then(|v| v.trim().parse::<usize>().ok())
            .unwrap_or(1)
            .max(1);
        for _ in 0..span {
            cells.push(text.clone());
        }
    }
    cells
}

fn cell_text(cell: ElementRef) -> String {
    let joined = cell.text().collect::<Vec<_>>().join(" ");
    joined.split_whitespace().collect::<Vec<_>>().join(" ")
}

fn in_thead(tr: &ElementRef) -> bool {
    tr.ancestors()
        .filter_map(ElementRef::wrap)
        .any(|el| el.value().name() == "thead")
}

fn all_th(tr: &ElementRef) -> bool {
    let mut cells = tr.select(&CELL_SELECTOR).peekable();
    if cells.peek().is_none() {
        return false;
    }
    cells.all(|c| c.value().name() == "th")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn no_tables_yields_an_empty_list() {
        assert!(extract_tables("<html><body><p>nothing here</p></body></html>").is_empty());
    }

    #[test]
    fn thead_and_tbody_split_into_headers_and_rows() {
        let html = r#"
            <table>
              <thead><tr><th>SCRIP</th><th>VOLUME</th></tr></thead>
              <tbody>
                <tr><td>AAA</td><td>1000</td></tr>
                <tr><td>BBB</td><td>500</td></tr>
              </tbody>
            </table>
        "#;
        let tables = extract_tables(html);
        assert_eq!(tables.len(), 1);
        let table = &tables[0];
        assert_eq!(table.headers, vec![vec!["SCRIP".to_string()], vec!["VOLUME".to_string()]]);
        assert_eq!(table.rows.len(), 2);
        assert_eq!(table.rows[0], vec!["AAA".to_string(), "1000".to_string()]);
    }

    #[test]
    fn colspan_header_produces_multi_level_labels() {
        let html = r#"
            <table>
              <thead>
                <tr><th colspan="2">Prices</th></tr>
                <tr><th>OPEN</th><th>HIGH</th></tr>
              </thead>
              <tr><td>10</td><td>11</td></tr>
            </table>
        "#;
        let tables = extract_tables(html);
        let table = &tables[0];
        assert_eq!(
            table.headers,
            vec![
                vec!["Prices".to_string(), "OPEN".to_string()],
                vec!["Prices".to_string(), "HIGH".to_string()],
            ]
        );
        assert_eq!(table.rows, vec![vec!["10".to_string(), "11".to_string()]]);
    }

    #[test]
    fn empty_header_cells_get_the_unnamed_marker() {
        let html = r#"
            <table>
              <thead><tr><th></th><th>SCRIP</th></tr></thead>
              <tr><td>1</td><td>AAA</td></tr>
            </table>
        "#;
        let tables = extract_tables(html);
        assert_eq!(tables[0].headers[0], vec!["Unnamed: 0".to_string()]);
        assert_eq!(tables[0].headers[1], vec!["SCRIP".to_string()]);
    }

    #[test]
    fn leading_th_rows_act_as_the_header_without_a_thead() {
        let html = r#"
            <table>
              <tr><th>SCRIP</th><th>VOLUME</th></tr>
              <tr><td>AAA</td><td>1000</td></tr>
            </table>
        "#;
        let tables = extract_tables(html);
        assert_eq!(tables[0].headers, vec![vec!["SCRIP".to_string()], vec!["VOLUME".to_string()]]);
        assert_eq!(tables[0].rows.len(), 1);
    }

    #[test]
    fn headerless_tables_are_labeled_by_position() {
        let html = r#"
            <table>
              <tr><td>SCRIP</td><td>VOLUME</td></tr>
              <tr><td>AAA</td><td>1000</td></tr>
            </table>
        "#;
        let tables = extract_tables(html);
        assert_eq!(tables[0].headers, vec![vec!["0".to_string()], vec!["1".to_string()]]);
        assert_eq!(tables[0].rows.len(), 2);
    }

    #[test]
    fn cell_text_is_whitespace_collapsed() {
        let html = r#"
            <table>
              <thead><tr><th>SCRIP</th></tr></thead>
              <tr><td>  AAA
                  Ltd </td></tr>
            </table>
        "#;
        let tables = extract_tables(html);
        assert_eq!(tables[0].rows[0][0], "AAA Ltd");
    }
}
