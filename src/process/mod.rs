// src/process/mod.rs

pub mod aggregate;
pub mod normalize;
pub mod table;

pub use aggregate::{aggregate, SHEET_NAME};
pub use normalize::{normalize, CANON, HEADER_ROW_MIN_HITS, MIN_CANONICAL_FIELDS};
pub use table::{Dataset, RawTable, StockTable};
