//! Duplicate detection by key.
//!
//! Two kinds of grouping live here:
//!
//! - [`DuplicatePartition`]: every row whose key occurs at least twice,
//!   used by the report.
//! - [`find_repeats`] / [`remove_title_duplicates`]: every row whose key was
//!   already seen on an earlier row, used by the remover.
//!
//! Rows with an absent key never take part in either.

use crate::table::{Column, Table};
use std::collections::{HashMap, HashSet};
use tracing::debug;

/// Trim surrounding whitespace and lowercase.
pub fn normalize_title(title: &str) -> String {
    title.trim().to_lowercase()
}

/// Key values of a column, one per row, `None` where the cell is absent.
pub fn identifier_keys(table: &Table, column: &Column) -> Vec<Option<String>> {
    table.values(column).map(|v| v.map(str::to_string)).collect()
}

/// Normalized titles, one per row, `None` where the title is absent.
pub fn title_keys(table: &Table, column: &Column) -> Vec<Option<String>> {
    table.values(column).map(|v| v.map(normalize_title)).collect()
}

/// Occurrences of one duplicated key.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyCount {
    /// The grouping key (identifier, or normalized title)
    pub key: String,
    /// Row index of the first member in sorted partition order
    pub first_row: usize,
    pub count: usize,
}

/// Rows sharing a key with at least one other row.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DuplicatePartition {
    rows: Vec<usize>,
    counts: Vec<KeyCount>,
}

impl DuplicatePartition {
    /// Build the partition from per-row keys (`keys[i]` belongs to row `i`).
    ///
    /// Members are sorted ascending by key; ties keep file order. Counts are
    /// sorted by descending occurrence, ties in first-seen order within the
    /// sorted members.
    pub fn from_keys(keys: &[Option<String>]) -> Self {
        let mut frequency: HashMap<&str, usize> = HashMap::new();
        for key in keys.iter().flatten() {
            *frequency.entry(key.as_str()).or_default() += 1;
        }

        let mut members: Vec<(usize, &str)> = keys
            .iter()
            .enumerate()
            .filter_map(|(row, key)| key.as_deref().map(|k| (row, k)))
            .filter(|(_, key)| frequency.get(key).copied().unwrap_or_default() >= 2)
            .collect();
        // sort_by is stable
        members.sort_by(|a, b| a.1.cmp(b.1));

        let mut counts: Vec<KeyCount> = Vec::new();
        let mut slot: HashMap<&str, usize> = HashMap::new();
        for &(row, key) in &members {
            match slot.get(key) {
                Some(&i) => counts[i].count += 1,
                None => {
                    slot.insert(key, counts.len());
                    counts.push(KeyCount {
                        key: key.to_string(),
                        first_row: row,
                        count: 1,
                    });
                }
            }
        }
        counts.sort_by(|a, b| b.count.cmp(&a.count));

        let rows: Vec<usize> = members.iter().map(|(row, _)| *row).collect();
        debug!(rows = rows.len(), keys = counts.len(), "Built duplicate partition");
        Self { rows, counts }
    }

    /// Member row indices, sorted by key.
    pub fn rows(&self) -> &[usize] {
        &self.rows
    }

    /// Per-key occurrence counts, most frequent first.
    pub fn counts(&self) -> &[KeyCount] {
        &self.counts
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Number of distinct duplicated keys.
    pub fn distinct_keys(&self) -> usize {
        self.counts.len()
    }

    /// Number of rows that are members of both partitions.
    pub fn intersection_len(&self, other: &DuplicatePartition) -> usize {
        let theirs: HashSet<usize> = other.rows.iter().copied().collect();
        self.rows.iter().filter(|row| theirs.contains(row)).count()
    }
}

/// Rows whose key already appeared on an earlier row, in file order.
/// The first occurrence of every key is not included.
pub fn find_repeats(keys: &[Option<String>]) -> Vec<usize> {
    let mut seen: HashSet<&str> = HashSet::new();
    keys.iter()
        .enumerate()
        .filter_map(|(row, key)| {
            let key = key.as_deref()?;
            (!seen.insert(key)).then_some(row)
        })
        .collect()
}

/// Result of removing repeated titles from a table.
#[derive(Debug, Clone, PartialEq)]
pub struct Deduplication {
    /// The table without the removed rows
    pub cleaned: Table,
    /// Original indices of removed rows, in file order
    pub removed: Vec<usize>,
}

/// Drop every row whose normalized title matches an earlier row's.
///
/// The input table is left untouched; rows without a title are always kept.
pub fn remove_title_duplicates(table: &Table, title: &Column) -> Deduplication {
    let removed = find_repeats(&title_keys(table, title));
    let cleaned = table.without_rows(&removed);
    Deduplication { cleaned, removed }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Result;
    use pretty_assertions::assert_eq;
    use rstest::*;

    fn keys(values: &[Option<&str>]) -> Vec<Option<String>> {
        values.iter().map(|v| v.map(str::to_string)).collect()
    }

    fn scenario() -> Table {
        Table::from_reader(
            "DOI,Title,Authors,Year\n10.1/a,Foo,A,2020\n10.1/a,Bar,B,2021\n10.2/b,foo ,C,2022\n"
                .as_bytes(),
        )
        .expect("scenario parses")
    }

    #[rstest]
    #[case("Foo", "foo")]
    #[case("  Deep Learning \t", "deep learning")]
    #[case("ÉTUDE Générale", "étude générale")]
    #[case("   ", "")]
    fn test_normalize_title(#[case] input: &str, #[case] expected: &str) {
        assert_eq!(normalize_title(input), expected);
    }

    #[test]
    fn test_scenario_partitions() -> Result<()> {
        let table = scenario();
        let doi = DuplicatePartition::from_keys(&identifier_keys(&table, &table.column("DOI")?));
        let title = DuplicatePartition::from_keys(&title_keys(&table, &table.column("Title")?));

        assert_eq!(doi.rows(), &[0, 1]);
        assert_eq!(doi.distinct_keys(), 1);
        assert_eq!(doi.counts()[0].key, "10.1/a");
        assert_eq!(doi.counts()[0].count, 2);

        assert_eq!(title.rows(), &[0, 2]);
        assert_eq!(title.counts()[0].key, "foo");
        assert_eq!(title.counts()[0].first_row, 0);

        assert_eq!(doi.intersection_len(&title), 1);
        Ok(())
    }

    #[test]
    fn test_partition_sorted_by_key_stable() {
        let partition = DuplicatePartition::from_keys(&keys(&[
            Some("b"),
            Some("a"),
            Some("c"),
            Some("b"),
            Some("a"),
        ]));
        assert_eq!(partition.rows(), &[1, 4, 0, 3]);
    }

    #[test]
    fn test_counts_by_frequency_then_first_seen() {
        let partition = DuplicatePartition::from_keys(&keys(&[
            Some("z"),
            Some("y"),
            Some("x"),
            Some("z"),
            Some("y"),
            Some("x"),
            Some("x"),
        ]));
        let order: Vec<(&str, usize)> = partition
            .counts()
            .iter()
            .map(|c| (c.key.as_str(), c.count))
            .collect();
        assert_eq!(order, vec![("x", 3), ("y", 2), ("z", 2)]);
    }

    #[test]
    fn test_absent_keys_never_partitioned() {
        let partition = DuplicatePartition::from_keys(&keys(&[None, None, Some("a"), None]));
        assert!(partition.is_empty());
        assert_eq!(partition.distinct_keys(), 0);
    }

    #[test]
    fn test_unique_keys_give_empty_partition() {
        let partition = DuplicatePartition::from_keys(&keys(&[Some("a"), Some("b")]));
        assert!(partition.is_empty());
        assert_eq!(partition.intersection_len(&DuplicatePartition::default()), 0);
    }

    #[test]
    fn test_find_repeats_keeps_first() {
        let repeats = find_repeats(&keys(&[
            Some("a"),
            None,
            Some("b"),
            Some("a"),
            None,
            Some("a"),
            Some("b"),
        ]));
        assert_eq!(repeats, vec![3, 5, 6]);
    }

    #[test]
    fn test_remove_scenario() -> Result<()> {
        let table = scenario();
        let title = table.column("Title")?;
        let result = remove_title_duplicates(&table, &title);

        assert_eq!(result.removed, vec![2]);
        assert_eq!(result.cleaned.len(), 2);
        assert_eq!(result.cleaned.cell(0, &title), Some("Foo"));
        assert_eq!(result.cleaned.cell(1, &title), Some("Bar"));
        Ok(())
    }

    #[test]
    fn test_remove_properties() -> Result<()> {
        let table = Table::from_reader(
            "Title,Id\nA,0\n,1\n a,2\nB,3\nNA,4\nb ,5\nC,6\nA,7\n,8\n".as_bytes(),
        )?;
        let title = table.column("Title")?;
        let id = table.column("Id")?;

        let first = remove_title_duplicates(&table, &title);
        assert_eq!(first.cleaned.len() + first.removed.len(), table.len());

        // survivors keep file order and absent titles survive
        let ids: Vec<_> = first.cleaned.values(&id).flatten().collect();
        assert_eq!(ids, vec!["0", "1", "3", "4", "6", "8"]);

        let second = remove_title_duplicates(&first.cleaned, &title);
        assert!(second.removed.is_empty());
        assert_eq!(second.cleaned, first.cleaned);
        Ok(())
    }

    #[test]
    fn test_all_titles_absent() -> Result<()> {
        let table = Table::from_reader("Title,DOI\n,1\n,2\n,3\n".as_bytes())?;
        let title = table.column("Title")?;

        assert!(DuplicatePartition::from_keys(&title_keys(&table, &title)).is_empty());
        let result = remove_title_duplicates(&table, &title);
        assert!(result.removed.is_empty());
        assert_eq!(result.cleaned, table);
        Ok(())
    }
}
