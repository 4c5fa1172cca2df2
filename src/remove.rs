//! Duplicate removal.
//!
//! Keeps the first row of every normalized title, lists the rows that are
//! dropped and writes the cleaned table to a new CSV file.

use crate::config::{ensure_parent_dir, RunConfig, CLEANED_PREFIX};
use crate::dedup::{normalize_title, remove_title_duplicates};
use crate::display::{banner, cell_text, heading, percentage, truncate_cell};
use crate::error::Result;
use crate::report::{load_input, DOI_COLUMN, TITLE_COLUMN, YEAR_COLUMN};
use std::collections::HashSet;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use tracing::info;

/// Title limit in the removal listing
const LISTING_TITLE_LIMIT: usize = 80;

/// Before/after numbers of one removal run.
#[derive(Debug, Clone, PartialEq)]
pub struct RemovalSummary {
    pub original: usize,
    pub removed: usize,
    pub kept: usize,
    /// Distinct normalized titles among the removed rows
    pub distinct_titles: usize,
    pub output: PathBuf,
}

impl RemovalSummary {
    /// Removed rows as a percentage of the original rows.
    pub fn rate(&self) -> f64 {
        percentage(self.removed, self.original)
    }
}

/// Remove duplicates from the configured input, printing to stdout.
pub fn run(config: &RunConfig) -> Result<RemovalSummary> {
    let output = config.checked_output_path(CLEANED_PREFIX, "csv")?;
    let mut stdout = io::stdout().lock();
    clean(config.input(), &output, &mut stdout)
}

/// Load `input`, drop repeated titles, write the rest to `output`.
pub fn clean<W: Write>(input: &Path, output: &Path, out: &mut W) -> Result<RemovalSummary> {
    banner(out, "DUPLICATE REMOVAL - SCOPUS EXPORT")?;
    writeln!(out)?;

    let table = load_input(input, out)?;
    let original = table.len();
    writeln!(out, "File loaded!")?;
    writeln!(out, "   Total original records: {}", original)?;
    writeln!(out)?;

    let title = table.column(TITLE_COLUMN)?;
    let doi = table.column(DOI_COLUMN)?;
    let year = table.column(YEAR_COLUMN)?;

    writeln!(out, "Identifying duplicates by title...")?;
    writeln!(out)?;

    let dedup = remove_title_duplicates(&table, &title);
    let distinct_titles = dedup
        .removed
        .iter()
        .filter_map(|&row| table.cell(row, &title).map(normalize_title))
        .collect::<HashSet<_>>()
        .len();

    writeln!(out, "Duplicates identified:")?;
    writeln!(out, "   Duplicate records found: {}", dedup.removed.len())?;
    writeln!(out, "   Distinct duplicated titles: {}", distinct_titles)?;
    writeln!(out)?;

    if !dedup.removed.is_empty() {
        heading(out, "Records that will be REMOVED:")?;
        for &row in &dedup.removed {
            writeln!(
                out,
                "   - [{}] {}",
                row,
                truncate_cell(table.cell(row, &title), LISTING_TITLE_LIMIT)
            )?;
            writeln!(
                out,
                "     DOI: {}, Year: {}",
                cell_text(table.cell(row, &doi)),
                cell_text(table.cell(row, &year))
            )?;
        }
        writeln!(out)?;
    }

    writeln!(out, "Removing duplicates...")?;
    let kept = dedup.cleaned.len();
    let removed = original - kept;
    writeln!(out, "Duplicates removed!")?;
    writeln!(out, "   Original records: {}", original)?;
    writeln!(out, "   Removed records: {}", removed)?;
    writeln!(out, "   Records in cleaned file: {}", kept)?;
    writeln!(out)?;

    writeln!(out, "Saving cleaned file...")?;
    ensure_parent_dir(output)?;
    dedup.cleaned.write_csv(output)?;
    writeln!(out, "File saved: {}", output.display())?;
    writeln!(out)?;

    let summary = RemovalSummary {
        original,
        removed,
        kept,
        distinct_titles,
        output: output.to_path_buf(),
    };
    info!(
        original,
        removed,
        kept,
        output = %output.display(),
        "Duplicate removal complete"
    );

    banner(out, "CLEANUP SUMMARY")?;
    writeln!(out)?;
    writeln!(out, "BEFORE:")?;
    writeln!(out, "   Total records: {}", original)?;
    writeln!(out)?;
    writeln!(out, "AFTER:")?;
    writeln!(out, "   Total records: {}", kept)?;
    writeln!(out, "   Removed records: {}", removed)?;
    writeln!(out, "   Removal rate: {:.2}%", summary.rate())?;
    writeln!(out)?;
    writeln!(out, "FILES:")?;
    writeln!(out, "   Original: {}", input.display())?;
    writeln!(out, "   Cleaned: {}", output.display())?;
    writeln!(out)?;
    banner(out, "CLEANUP COMPLETED SUCCESSFULLY!")?;

    Ok(summary)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::DedupError;
    use pretty_assertions::assert_eq;
    use tempfile::{tempdir, TempDir};

    const SCENARIO: &str = "Authors,Title,Year,DOI,Link\n\
        Smith J.,Foo,2020,10.1/a,https://example.org/1\n\
        Doe A.,Bar,2021,10.1/a,https://example.org/2\n\
        Roe B.,foo ,2022,10.2/b,https://example.org/3\n";

    struct Fixture {
        _dir: TempDir,
        input: PathBuf,
        output: PathBuf,
    }

    fn fixture(content: &str) -> Fixture {
        let dir = tempdir().expect("temp dir");
        let input = dir.path().join("export.csv");
        let output = dir.path().join("clean.csv");
        std::fs::write(&input, content).expect("write input");
        Fixture {
            _dir: dir,
            input,
            output,
        }
    }

    fn clean_fixture(fx: &Fixture) -> (Result<RemovalSummary>, String) {
        let mut out = Vec::new();
        let result = clean(&fx.input, &fx.output, &mut out);
        (result, String::from_utf8_lossy(&out).into_owned())
    }

    #[test]
    fn test_scenario() -> Result<()> {
        let fx = fixture(SCENARIO);
        let (result, text) = clean_fixture(&fx);
        let summary = result?;

        assert_eq!(summary.original, 3);
        assert_eq!(summary.removed, 1);
        assert_eq!(summary.kept, 2);
        assert_eq!(summary.distinct_titles, 1);
        assert_eq!(format!("{:.2}", summary.rate()), "33.33");

        assert!(text.contains("   - [2] foo \n     DOI: 10.2/b, Year: 2022\n"));
        assert!(text.contains("Removal rate: 33.33%"));

        let written = std::fs::read_to_string(&fx.output)?;
        assert_eq!(
            written,
            "Authors,Title,Year,DOI,Link\n\
             Smith J.,Foo,2020,10.1/a,https://example.org/1\n\
             Doe A.,Bar,2021,10.1/a,https://example.org/2\n"
        );
        Ok(())
    }

    #[test]
    fn test_no_duplicates_copies_input() -> Result<()> {
        let input = "DOI,Title,Year\n10.1/a,Foo,2020\n,,\n10.2/b,Bar,\n";
        let fx = fixture(input);
        let (result, text) = clean_fixture(&fx);
        let summary = result?;

        assert_eq!(summary.removed, 0);
        assert_eq!(summary.kept, 3);
        assert!(!text.contains("REMOVED:"));
        assert!(text.contains("Removal rate: 0.00%"));
        assert_eq!(std::fs::read_to_string(&fx.output)?, input);
        Ok(())
    }

    #[test]
    fn test_absent_titles_kept() -> Result<()> {
        let fx = fixture("DOI,Title,Year\n1,,2020\n2,,2021\n3,NaN,2022\n");
        let (result, _) = clean_fixture(&fx);
        assert_eq!(result?.removed, 0);
        Ok(())
    }

    #[test]
    fn test_listing_truncates_title() -> Result<()> {
        let long = "L".repeat(90);
        let fx = fixture(&format!(
            "DOI,Title,Year\n1,{t},2020\n2,{t},\n",
            t = long
        ));
        let (result, text) = clean_fixture(&fx);
        result?;
        assert!(text.contains(&format!("   - [1] {}...\n", "L".repeat(80))));
        assert!(text.contains("     DOI: 2, Year: -\n"));
        Ok(())
    }

    #[test]
    fn test_empty_table() -> Result<()> {
        let fx = fixture("DOI,Title,Year\n");
        let (result, text) = clean_fixture(&fx);
        let summary = result?;
        assert_eq!(summary.original, 0);
        assert!(text.contains("Removal rate: 0.00%"));
        assert_eq!(std::fs::read_to_string(&fx.output)?, "DOI,Title,Year\n");
        Ok(())
    }

    #[test]
    fn test_missing_input_writes_nothing() {
        let dir = tempdir().expect("temp dir");
        let output = dir.path().join("clean.csv");
        let mut out = Vec::new();

        let result = clean(&dir.path().join("missing.csv"), &output, &mut out);
        assert!(matches!(result, Err(DedupError::InputNotFound(_))));
        assert!(String::from_utf8_lossy(&out).contains("ERROR: input file"));
        assert!(!output.exists());
    }

    #[test]
    fn test_missing_title_column() {
        let fx = fixture("DOI,Year\n10.1/a,2020\n");
        let (result, _) = clean_fixture(&fx);
        assert!(matches!(
            result,
            Err(DedupError::MissingColumn(ref c)) if c == "Title"
        ));
        assert!(!fx.output.exists());
    }

    #[test]
    fn test_run_refuses_to_overwrite_input() -> Result<()> {
        let fx = fixture(SCENARIO);
        let mut config = RunConfig::new(&fx.input);
        config.output_file = Some(fx.input.clone());

        assert!(matches!(
            run(&config),
            Err(DedupError::OutputOverwritesInput(_))
        ));
        assert_eq!(std::fs::read_to_string(&fx.input)?, SCENARIO);
        Ok(())
    }

    #[test]
    fn test_output_dir_created_only_on_write() -> Result<()> {
        let dir = tempdir()?;
        let out_dir = dir.path().join("cleaned");

        let mut config = RunConfig::new(dir.path().join("typo.csv"));
        config.output_dir = out_dir.clone();
        assert!(matches!(run(&config), Err(DedupError::InputNotFound(_))));
        assert!(!out_dir.exists());

        let input = dir.path().join("export.csv");
        std::fs::write(&input, SCENARIO)?;
        config.input = input;
        let summary = run(&config)?;
        assert!(out_dir.is_dir());
        assert_eq!(summary.output.parent(), Some(out_dir.as_path()));
        assert!(summary.output.exists());
        Ok(())
    }

    #[test]
    fn test_short_row_written_padded() -> Result<()> {
        let fx = fixture("DOI,Title,Year\n10.1/a,Foo,2020\n10.2/b\n");
        let (result, _) = clean_fixture(&fx);
        assert_eq!(result?.removed, 0);
        assert_eq!(
            std::fs::read_to_string(&fx.output)?,
            "DOI,Title,Year\n10.1/a,Foo,2020\n10.2/b,,\n"
        );
        Ok(())
    }
}
