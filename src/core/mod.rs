pub mod errors;

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// What kind of unit a [`FunctionRecord`] describes.
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum FunctionKind {
    Function,
    Method,
    Closure,
    Comprehension,
}

/// One analyzable unit of code: a function, method, lambda, or a
/// comprehension carrying a filter clause.
///
/// Identity is the triple `(file_path, qualified_name, line_start)` —
/// same-named definitions at different nesting depths or line positions are
/// distinct records. Records are never mutated after construction.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct FunctionRecord {
    /// Dotted path through enclosing classes and functions, e.g.
    /// `Outer.handle.<lambda>`.
    pub qualified_name: String,
    /// Path relative to the analysis root.
    pub file_path: PathBuf,
    /// Inclusive 1-indexed span. `line_start <= line_end`.
    pub line_start: usize,
    pub line_end: usize,
    /// Cyclomatic complexity: 1 + decision points in this unit's own body.
    pub complexity: u32,
    /// Fraction of the span's executable lines exercised by tests, in [0, 1].
    pub coverage_ratio: f64,
    /// CRAP score: `complexity^2 * (1 - coverage_ratio)^3 + complexity`.
    pub score: f64,
    pub kind: FunctionKind,
    pub is_async: bool,
}

/// Per-file rollup derived from the [`FunctionRecord`]s it contains.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct FileRecord {
    pub file_path: PathBuf,
    pub max_score: f64,
    pub count_above_threshold: usize,
    pub function_count: usize,
}

/// Per-folder rollup covering every file transitively under the folder.
/// The analysis root is spelled `.`.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct FolderRecord {
    pub folder_path: PathBuf,
    pub max_score: f64,
    pub count_above_threshold: usize,
}

/// One source file handed to the analyzer. Discovery and filtering are the
/// caller's job; this core only accepts (path, text) pairs.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct SourceFile {
    pub path: PathBuf,
    pub content: String,
}

impl SourceFile {
    pub fn new(path: impl Into<PathBuf>, content: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            content: content.into(),
        }
    }
}

/// A file that could not be structurally analyzed. Recorded as a warning
/// alongside the successful results; never escalated to a run failure.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct ParseFailure {
    pub path: PathBuf,
    pub message: String,
}

/// Ranking configuration as surfaced by the external CLI layer.
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq)]
pub struct AnalysisConfig {
    /// Scores at or above this value count toward `count_above_threshold`.
    pub threshold: f64,
    /// Maximum rows per ranking. 0 means unlimited.
    pub top_n: usize,
}

impl AnalysisConfig {
    pub fn new(threshold: f64, top_n: usize) -> Self {
        Self { threshold, top_n }
    }

    /// Caller contract check. A bad threshold is fatal to the analyze call.
    pub fn validate(&self) -> errors::Result<()> {
        if !self.threshold.is_finite() || self.threshold < 0.0 {
            return Err(errors::Error::InvalidConfiguration(format!(
                "threshold must be finite and non-negative, got {}",
                self.threshold
            )));
        }
        Ok(())
    }
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        // Defaults mirror the conventional CRAP reporting knobs.
        Self {
            threshold: 30.0,
            top_n: 20,
        }
    }
}

/// Complete result of one analysis run: the three rankings plus per-file
/// diagnostics. Immutable; rendering is the caller's concern.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct AnalysisResult {
    pub functions: im::Vector<FunctionRecord>,
    pub files: im::Vector<FileRecord>,
    pub folders: im::Vector<FolderRecord>,
    pub parse_failures: Vec<ParseFailure>,
    /// Files with no entry in the coverage dataset. Their functions score
    /// with coverage 0.0; this list keeps "never executed" distinguishable
    /// from "executed with zero coverage".
    pub files_without_coverage: Vec<PathBuf>,
}

impl AnalysisResult {
    pub fn is_empty(&self) -> bool {
        self.functions.is_empty() && self.parse_failures.is_empty()
    }
}
