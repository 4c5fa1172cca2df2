//! # bibdedup
//!
//! Duplicate report and removal for bibliographic CSV exports.
//!
//! ## Modules
//!
//! - [`table`] - CSV loader and writer
//! - [`dedup`] - Duplicate partitions by DOI and normalized title
//! - [`report`] - Duplicate report pipeline
//! - [`remove`] - Duplicate removal pipeline
//! - [`output`] - Console + file transcript writer
//! - [`display`] - Truncation and text tables
//! - [`config`] - Input/output locations
//! - [`error`] - Custom error types
//!
//! ## Usage
//!
//! ```rust,no_run
//! use bibdedup::{config::RunConfig, remove};
//!
//! fn main() -> anyhow::Result<()> {
//!     let summary = remove::run(&RunConfig::new("export.csv"))?;
//!     println!("Removed {} records", summary.removed);
//!     Ok(())
//! }
//! ```

pub mod config;
pub mod dedup;
pub mod display;
pub mod error;
pub mod output;
pub mod remove;
pub mod report;
pub mod table;

pub use error::{DedupError, Result};
