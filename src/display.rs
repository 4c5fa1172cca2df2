//! Console formatting helpers shared by both pipelines.

use comfy_table::{presets::NOTHING, CellAlignment, Table};
use std::io::{self, Write};

/// Width of section rules and banners.
pub const RULE_WIDTH: usize = 80;

/// Placeholder printed for absent cells.
pub const ABSENT: &str = "-";

/// Cut `value` to `limit` characters and append `...` when it is longer.
pub fn truncate(value: &str, limit: usize) -> String {
    match value.char_indices().nth(limit) {
        Some((end, _)) => format!("{}...", &value[..end]),
        None => value.to_string(),
    }
}

/// Present value as-is, absent as [`ABSENT`].
pub fn cell_text(value: Option<&str>) -> String {
    value.unwrap_or(ABSENT).to_string()
}

/// Truncate a present value; absent values are shown as [`ABSENT`] untouched.
pub fn truncate_cell(value: Option<&str>, limit: usize) -> String {
    value.map_or_else(|| ABSENT.to_string(), |v| truncate(v, limit))
}

/// `part / whole * 100`, or 0 for an empty whole.
pub fn percentage(part: usize, whole: usize) -> f64 {
    if whole == 0 {
        return 0.0;
    }
    part as f64 / whole as f64 * 100.0
}

/// Print a banner: rule, title, rule.
pub fn banner<W: Write>(out: &mut W, title: &str) -> io::Result<()> {
    writeln!(out, "{}", "=".repeat(RULE_WIDTH))?;
    writeln!(out, "{}", title)?;
    writeln!(out, "{}", "=".repeat(RULE_WIDTH))
}

/// Print a thin rule under a heading.
pub fn heading<W: Write>(out: &mut W, title: &str) -> io::Result<()> {
    writeln!(out, "{}", title)?;
    writeln!(out, "{}", "-".repeat(RULE_WIDTH))
}

/// Borderless table with right-aligned columns and no index column.
///
/// Columns are created from `headers`; rows added later share the alignment.
pub fn plain_table(headers: &[&str]) -> Table {
    let mut table = Table::new();
    table.load_preset(NOTHING).set_header(headers.to_vec());
    for column in table.column_iter_mut() {
        column.set_cell_alignment(CellAlignment::Right);
        column.set_padding((0, 1));
    }
    table
}

/// Print a table line by line, without trailing blanks.
pub fn write_table<W: Write>(out: &mut W, table: &Table) -> io::Result<()> {
    for line in table.lines() {
        writeln!(out, "{}", line.trim_end())?;
    }
    Ok(())
}
