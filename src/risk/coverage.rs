//! Coverage correlation: line sets in, per-span ratios out.
//!
//! The dataset arrives from an external coverage collector and is treated as
//! an opaque per-file lookup, so tests can feed synthetic in-memory data
//! without ever invoking a real coverage tool.

use serde::{Deserialize, Serialize};
use std::collections::{BTreeSet, HashMap};
use std::path::{Path, PathBuf};

/// Line-level coverage for one file: which executable lines ran and which
/// did not. Lines in neither set (blanks, comments, uninstrumented) are not
/// executable and never enter a ratio.
#[derive(Clone, Debug, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct FileCoverage {
    pub executed: BTreeSet<usize>,
    pub missed: BTreeSet<usize>,
}

impl FileCoverage {
    pub fn new(
        executed: impl IntoIterator<Item = usize>,
        missed: impl IntoIterator<Item = usize>,
    ) -> Self {
        Self {
            executed: executed.into_iter().collect(),
            missed: missed.into_iter().collect(),
        }
    }

    /// True when the entry tracks no executable lines at all. Such a file
    /// was never imported during the run, so it scores like missing data.
    pub fn is_empty(&self) -> bool {
        self.executed.is_empty() && self.missed.is_empty()
    }

    fn executed_in_span(&self, start: usize, end: usize) -> usize {
        self.executed.range(start..=end).count()
    }

    fn executable_in_span(&self, start: usize, end: usize) -> usize {
        // The sets may overlap in malformed inputs; count the union.
        let missed_only = self
            .missed
            .range(start..=end)
            .filter(|line| !self.executed.contains(line))
            .count();
        self.executed_in_span(start, end) + missed_only
    }
}

/// The one capability the correlator needs from a coverage collector.
pub trait CoverageDataset: Sync {
    fn file_coverage(&self, path: &Path) -> Option<&FileCoverage>;
}

/// In-memory dataset keyed by path relative to the analysis root.
#[derive(Clone, Debug, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct CoverageMap {
    files: HashMap<PathBuf, FileCoverage>,
}

impl CoverageMap {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, path: impl Into<PathBuf>, coverage: FileCoverage) {
        self.files.insert(path.into(), coverage);
    }

    pub fn with_file(mut self, path: impl Into<PathBuf>, coverage: FileCoverage) -> Self {
        self.insert(path, coverage);
        self
    }

    pub fn len(&self) -> usize {
        self.files.len()
    }

    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }
}

impl CoverageDataset for CoverageMap {
    fn file_coverage(&self, path: &Path) -> Option<&FileCoverage> {
        self.files.get(path)
    }
}

/// Coverage ratio for an inclusive 1-indexed span, given the file's dataset
/// entry (or its absence). Three explicit policies:
///
/// - file absent from the dataset: 0.0 for every span — absence of data is
///   never treated as safety;
/// - file present but tracking zero lines (never imported during the run):
///   0.0, same conservative default;
/// - span with zero executable lines inside a tracked file (abstract stub,
///   `pass`-only body): 1.0 — nothing to exercise.
pub fn span_coverage(entry: Option<&FileCoverage>, line_start: usize, line_end: usize) -> f64 {
    match entry {
        None => 0.0,
        Some(cov) if cov.is_empty() => 0.0,
        Some(cov) => coverage_ratio(cov, line_start, line_end),
    }
}

/// Ratio within a tracked, non-empty file entry.
pub fn coverage_ratio(coverage: &FileCoverage, line_start: usize, line_end: usize) -> f64 {
    let executable = coverage.executable_in_span(line_start, line_end);
    if executable == 0 {
        return 1.0;
    }
    coverage.executed_in_span(line_start, line_end) as f64 / executable as f64
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ratio_counts_only_lines_inside_span() {
        let cov = FileCoverage::new([1, 2, 10, 11], [12, 50]);
        // Span 10..=12: executed {10, 11}, missed {12}.
        assert_eq!(coverage_ratio(&cov, 10, 12), 2.0 / 3.0);
    }

    #[test]
    fn untracked_lines_are_excluded_from_both_sides() {
        // Lines 3 and 4 are in neither set (comments, blanks).
        let cov = FileCoverage::new([2], [5]);
        assert_eq!(coverage_ratio(&cov, 2, 5), 0.5);
    }

    #[test]
    fn span_with_no_executable_lines_is_fully_covered() {
        let cov = FileCoverage::new([1], [2]);
        assert_eq!(coverage_ratio(&cov, 10, 20), 1.0);
    }

    #[test]
    fn missing_file_defaults_to_zero() {
        assert_eq!(span_coverage(None, 1, 10), 0.0);
    }

    #[test]
    fn file_tracking_zero_lines_defaults_to_zero() {
        // Present in the dataset, but nothing was ever recorded for it.
        let cov = FileCoverage::default();
        assert_eq!(span_coverage(Some(&cov), 1, 10), 0.0);
    }

    #[test]
    fn stub_span_in_tracked_file_counts_as_fully_covered() {
        let cov = FileCoverage::new([1], [2]);
        assert_eq!(span_coverage(Some(&cov), 10, 20), 1.0);
    }

    #[test]
    fn fully_missed_span_is_zero() {
        let cov = FileCoverage::new([], [3, 4, 5]);
        assert_eq!(coverage_ratio(&cov, 1, 10), 0.0);
    }

    #[test]
    fn line_in_both_sets_counts_once_as_executed() {
        let cov = FileCoverage::new([7], [7, 8]);
        assert_eq!(coverage_ratio(&cov, 7, 8), 0.5);
    }

    #[test]
    fn map_lookup_is_exact_by_path() {
        let map = CoverageMap::new().with_file("pkg/a.py", FileCoverage::new([1], []));
        assert!(map.file_coverage(Path::new("pkg/a.py")).is_some());
        assert!(map.file_coverage(Path::new("pkg/b.py")).is_none());
    }
}
