// src/fetch/mod.rs

pub mod html_tables;
pub mod page;

pub use html_tables::extract_tables;
pub use page::{HttpRenderer, PageRenderer, RenderOptions};
