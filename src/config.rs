//! Run configuration shared by both pipelines.
//!
//! Paths come from the command line; output files default to a timestamped
//! name inside the output directory.

use crate::error::{DedupError, Result};
use chrono::{DateTime, Local, TimeZone};
use std::path::{Path, PathBuf};

/// Prefix of the report transcript file name
pub const REPORT_PREFIX: &str = "analise_duplicatas_resultado";

/// Prefix of the cleaned CSV file name
pub const CLEANED_PREFIX: &str = "export_scopus_sem_duplicatas";

/// Timestamp format used in output file names
pub const TIMESTAMP_FORMAT: &str = "%Y%m%d_%H%M%S";

/// Input and output locations for one run.
#[derive(Debug, Clone)]
pub struct RunConfig {
    /// CSV export to read
    pub input: PathBuf,
    /// Directory for timestamped outputs
    pub output_dir: PathBuf,
    /// Explicit output file, overrides the timestamped name
    pub output_file: Option<PathBuf>,
}

impl RunConfig {
    pub fn new(input: impl Into<PathBuf>) -> Self {
        Self {
            input: input.into(),
            output_dir: PathBuf::from("."),
            output_file: None,
        }
    }

    /// Where this run writes its output.
    pub fn output_path(&self, prefix: &str, extension: &str) -> PathBuf {
        match &self.output_file {
            Some(path) => path.clone(),
            None => self
                .output_dir
                .join(timestamped_name(prefix, extension, &Local::now())),
        }
    }

    /// Like [`RunConfig::output_path`], but refuses a path that names the
    /// input file.
    pub fn checked_output_path(&self, prefix: &str, extension: &str) -> Result<PathBuf> {
        let output = self.output_path(prefix, extension);
        if is_same_file(&self.input, &output)? {
            return Err(DedupError::OutputOverwritesInput(output));
        }
        Ok(output)
    }

    pub fn input(&self) -> &Path {
        &self.input
    }
}

/// True when both paths name the same file. Paths that do not exist yet are
/// compared as written.
fn is_same_file(a: &Path, b: &Path) -> Result<bool> {
    if a == b {
        return Ok(true);
    }
    if !a.exists() || !b.exists() {
        return Ok(false);
    }
    Ok(a.canonicalize()? == b.canonicalize()?)
}

/// Create the parent directory of an output file if needed.
pub fn ensure_parent_dir(path: &Path) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)?;
    }
    Ok(())
}

/// `<prefix>_<YYYYMMDD_HHMMSS>.<extension>`
pub fn timestamped_name<Tz: TimeZone>(prefix: &str, extension: &str, at: &DateTime<Tz>) -> String
where
    Tz::Offset: std::fmt::Display,
{
    format!("{}_{}.{}", prefix, at.format(TIMESTAMP_FORMAT), extension)
}
