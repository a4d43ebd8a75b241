pub mod answer;
pub mod config;
pub mod fetch;
pub mod process;
