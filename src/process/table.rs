// src/process/table.rs

/// One table as scraped off the page, before any cleaning.
#[derive(Debug, Clone)]
pub struct RawTable {
    /// One label path per column. Multi-row headers keep every level,
    /// outermost first, so the innermost component is the last element.
    pub headers: Vec<Vec<String>>,
    /// Data rows, one `Vec<String>` per row. May be ragged.
    pub rows: Vec<Vec<String>>,
}

impl RawTable {
    /// Convenience constructor for flat (single-level) headers.
    pub fn flat(headers: Vec<String>, rows: Vec<Vec<String>>) -> Self {
        Self {
            headers: headers.into_iter().map(|h| vec![h]).collect(),
            rows,
        }
    }
}

/// A table accepted by the normalizer: its columns are the canonical-field
/// subset that was present in the source, in canonical order.
#[derive(Debug, Clone, PartialEq)]
pub struct StockTable {
    pub columns: Vec<&'static str>,
    pub rows: Vec<Vec<String>>,
}

/// The row-wise union of all accepted stock tables from one invocation.
/// Built once, never mutated afterwards.
#[derive(Debug, Clone, PartialEq)]
pub struct Dataset {
    pub columns: Vec<&'static str>,
    pub rows: Vec<Vec<String>>,
}

impl Dataset {
    /// Render every row as fixed-width text: right-aligned cells, two-space
    /// gutter, header line first, no index column. This is the exact text
    /// handed to the model alongside the user question.
    pub fn to_fixed_width_string(&self) -> String {
        self.render(self.rows.len())
    }

    /// Fixed-width rendering of the first `limit` rows, for terminal preview.
    pub fn preview(&self, limit: usize) -> String {
        self.render(limit.min(self.rows.len()))
    }

    fn render(&self, row_count: usize) -> String {
        let mut widths: Vec<usize> = self.columns.iter().map(|c| c.len()).collect();
        for row in self.rows.iter().take(row_count) {
            for (i, cell) in row.iter().enumerate() {
                if i < widths.len() && cell.len() > widths[i] {
                    widths[i] = cell.len();
                }
            }
        }

        let mut out = String::new();
        render_line(&mut out, self.columns.iter().map(|c| *c), &widths);
        for row in self.rows.iter().take(row_count) {
            out.push('\n');
            render_line(&mut out, row.iter().map(|c| c.as_str()), &widths);
        }
        out
    }
}

fn render_line<'a>(out: &mut String, cells: impl Iterator<Item = &'a str>, widths: &[usize]) {
    for (i, cell) in cells.enumerate() {
        if i > 0 {
            out.push_str("  ");
        }
        let width = widths.get(i).copied().unwrap_or(0);
        for _ in cell.len()..width {
            out.push(' ');
        }
        out.push_str(cell);
    }
}
