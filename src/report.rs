//! Duplicate report.
//!
//! Finds duplicates by DOI and by normalized title, prints both listings and
//! a final summary. [`run`] sends everything through a [`Transcript`] so the
//! console output is saved to a timestamped text file as it is printed.

use crate::config::{ensure_parent_dir, RunConfig, REPORT_PREFIX};
use crate::dedup::{identifier_keys, title_keys, DuplicatePartition, KeyCount};
use crate::display::{
    banner, cell_text, heading, percentage, plain_table, truncate, truncate_cell, write_table,
    ABSENT,
};
use crate::error::{DedupError, Result};
use crate::output::Transcript;
use crate::table::{Column, Table};
use std::io::Write;
use std::path::Path;
use tracing::{info, warn};

pub const DOI_COLUMN: &str = "DOI";
pub const TITLE_COLUMN: &str = "Title";
pub const AUTHORS_COLUMN: &str = "Authors";
pub const YEAR_COLUMN: &str = "Year";

/// Title limit in the duplicate tables
const TABLE_TITLE_LIMIT: usize = 80;
/// Authors limit in the duplicate tables
const TABLE_AUTHORS_LIMIT: usize = 50;
/// Title limit in the per-title counts
const DETAIL_TITLE_LIMIT: usize = 100;

/// Counts for one duplicate key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct KeyStats {
    /// Rows where the key is present
    pub valid: usize,
    /// Rows in the duplicate partition
    pub duplicates: usize,
    /// Distinct duplicated keys
    pub distinct: usize,
}

impl KeyStats {
    fn new(valid: usize, partition: &DuplicatePartition) -> Self {
        Self {
            valid,
            duplicates: partition.len(),
            distinct: partition.distinct_keys(),
        }
    }

    /// Duplicated rows as a percentage of rows with the key.
    pub fn rate(&self) -> f64 {
        percentage(self.duplicates, self.valid)
    }
}

/// Everything printed in the final summary.
#[derive(Debug, Clone, PartialEq)]
pub struct ReportSummary {
    pub total: usize,
    pub doi: KeyStats,
    pub title: KeyStats,
    /// Rows duplicated under both keys; only computed when both partitions
    /// are non-empty
    pub common: Option<usize>,
}

/// Columns the report reads.
struct ReportColumns {
    doi: Column,
    title: Column,
    authors: Column,
    year: Column,
}

impl ReportColumns {
    fn resolve(table: &Table) -> Result<Self> {
        Ok(Self {
            doi: table.column(DOI_COLUMN)?,
            title: table.column(TITLE_COLUMN)?,
            authors: table.column(AUTHORS_COLUMN)?,
            year: table.column(YEAR_COLUMN)?,
        })
    }
}

/// Run the report, mirroring the output into a transcript file.
///
/// Nothing is created when the transcript path names the input file.
pub fn run(config: &RunConfig) -> Result<ReportSummary> {
    let path = config.checked_output_path(REPORT_PREFIX, "txt")?;
    ensure_parent_dir(&path)?;
    let mut transcript = Transcript::create(&path)?;

    let summary = analyze(config.input(), &mut transcript)?;

    writeln!(transcript)?;
    writeln!(transcript, "Result saved to: {}", path.display())?;
    transcript.finish()?;
    Ok(summary)
}

/// Load `input`, print the full duplicate analysis to `out`.
pub fn analyze<W: Write>(input: &Path, out: &mut W) -> Result<ReportSummary> {
    banner(out, "DUPLICATE ANALYSIS - SCOPUS EXPORT")?;
    writeln!(out)?;

    let table = load_input(input, out)?;
    writeln!(out, "File loaded successfully!")?;
    writeln!(out, "   Total records: {}", table.len())?;
    writeln!(out, "   Columns found: {:?}", table.column_names())?;
    writeln!(out)?;

    let columns = ReportColumns::resolve(&table)?;

    // DOI
    banner(out, "ANALYSIS 1: DUPLICATES BY DOI")?;
    writeln!(out)?;
    let doi_valid = table.count_present(&columns.doi);
    writeln!(out, "Records with valid DOI: {}", doi_valid)?;
    writeln!(out, "Records without DOI: {}", table.len() - doi_valid)?;
    writeln!(out)?;

    let doi_partition = DuplicatePartition::from_keys(&identifier_keys(&table, &columns.doi));
    info!(
        duplicates = doi_partition.len(),
        keys = doi_partition.distinct_keys(),
        "DOI duplicates"
    );
    write_partition(out, &table, &columns, &doi_partition, "DOI", "DOIs", |count| {
        format!("DOI: {}", count.key)
    })?;

    // Title
    banner(out, "ANALYSIS 2: DUPLICATES BY TITLE")?;
    writeln!(out)?;
    let title_valid = table.count_present(&columns.title);
    writeln!(out, "Records with valid Title: {}", title_valid)?;
    writeln!(out, "Records without Title: {}", table.len() - title_valid)?;
    writeln!(out)?;

    let title_partition = DuplicatePartition::from_keys(&title_keys(&table, &columns.title));
    info!(
        duplicates = title_partition.len(),
        keys = title_partition.distinct_keys(),
        "Title duplicates"
    );
    write_partition(out, &table, &columns, &title_partition, "Title", "Titles", |count| {
        let original = table.cell(count.first_row, &columns.title).unwrap_or(ABSENT);
        format!("Title: {}", truncate(original, DETAIL_TITLE_LIMIT))
    })?;

    let common = (!doi_partition.is_empty() && !title_partition.is_empty())
        .then(|| doi_partition.intersection_len(&title_partition));

    let summary = ReportSummary {
        total: table.len(),
        doi: KeyStats::new(doi_valid, &doi_partition),
        title: KeyStats::new(title_valid, &title_partition),
        common,
    };
    write_summary(out, &summary)?;
    Ok(summary)
}

/// Announce and load the input table. A missing file is reported on `out`
/// before the error is returned.
pub(crate) fn load_input<W: Write>(input: &Path, out: &mut W) -> Result<Table> {
    writeln!(out, "Reading file: {}", input.display())?;
    match Table::load(input) {
        Err(DedupError::InputNotFound(path)) => {
            warn!(path = %path.display(), "Input file not found");
            writeln!(out, "ERROR: input file '{}' not found", path.display())?;
            Err(DedupError::InputNotFound(path))
        }
        other => other,
    }
}

/// Print the duplicate table and per-key counts, or a "no duplicates" line.
fn write_partition<W, F>(
    out: &mut W,
    table: &Table,
    columns: &ReportColumns,
    partition: &DuplicatePartition,
    key_name: &str,
    key_plural: &str,
    key_label: F,
) -> Result<()>
where
    W: Write,
    F: Fn(&KeyCount) -> String,
{
    if partition.is_empty() {
        writeln!(out, "No duplicates found by {}!", key_name)?;
        writeln!(out)?;
        return Ok(());
    }

    writeln!(out, "DUPLICATES FOUND: {} duplicated records", partition.len())?;
    writeln!(
        out,
        "   Distinct duplicated {}: {}",
        key_plural,
        partition.distinct_keys()
    )?;
    writeln!(out)?;

    heading(out, &format!("Duplicates by {}:", key_name))?;
    let mut listing = plain_table(&[DOI_COLUMN, TITLE_COLUMN, AUTHORS_COLUMN, YEAR_COLUMN]);
    for &row in partition.rows() {
        listing.add_row(vec![
            cell_text(table.cell(row, &columns.doi)),
            truncate_cell(table.cell(row, &columns.title), TABLE_TITLE_LIMIT),
            truncate_cell(table.cell(row, &columns.authors), TABLE_AUTHORS_LIMIT),
            cell_text(table.cell(row, &columns.year)),
        ]);
    }
    write_table(out, &listing)?;
    writeln!(out)?;

    heading(out, &format!("{} duplicate details:", key_name))?;
    for count in partition.counts() {
        writeln!(out, "   {}", key_label(count))?;
        writeln!(out, "   Appears {} times", count.count)?;
        writeln!(out)?;
    }
    Ok(())
}

fn write_summary<W: Write>(out: &mut W, summary: &ReportSummary) -> Result<()> {
    banner(out, "FINAL SUMMARY")?;
    writeln!(out)?;

    writeln!(out, "GENERAL STATISTICS:")?;
    writeln!(out, "   Total records in file: {}", summary.total)?;
    writeln!(out, "   Records with valid DOI: {}", summary.doi.valid)?;
    writeln!(out, "   Records with valid Title: {}", summary.title.valid)?;
    writeln!(out)?;

    for (name, plural, stats) in [
        ("DOI", "DOIs", &summary.doi),
        ("TITLE", "Titles", &summary.title),
    ] {
        writeln!(out, "DUPLICATES BY {}:", name)?;
        if stats.duplicates > 0 {
            writeln!(out, "   {} duplicated records found", stats.duplicates)?;
            writeln!(out, "   {} distinct {} with duplicates", stats.distinct, plural)?;
            writeln!(out, "   Duplication rate: {:.2}%", stats.rate())?;
        } else {
            writeln!(out, "   No duplicates found")?;
        }
        writeln!(out)?;
    }

    if let Some(common) = summary.common {
        writeln!(out, "COMMON DUPLICATES (DOI AND TITLE):")?;
        writeln!(
            out,
            "   {} records are duplicated by both DOI and Title",
            common
        )?;
        writeln!(out)?;
    }

    banner(out, "END OF ANALYSIS")?;
    Ok(())
}
