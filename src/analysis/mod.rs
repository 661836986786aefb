//! The run coordinator: one source tree and one coverage snapshot in, one
//! immutable result set out.
//!
//! Files are mutually independent, so extraction and correlation run on a
//! rayon pool with no shared state; the final rollup is a commutative fold,
//! so the merged output is identical for any processing order.

use crate::analyzers::python::extract_functions;
use crate::core::errors::{Error, Result};
use crate::core::{AnalysisConfig, AnalysisResult, FunctionRecord, ParseFailure, SourceFile};
use crate::risk::aggregation::aggregate;
use crate::risk::build_record;
use crate::risk::coverage::{span_coverage, CoverageDataset};
use rayon::prelude::*;
use std::path::PathBuf;

/// Outcome of one file: its scored records, or a diagnostic.
enum FileOutcome {
    Analyzed {
        records: Vec<FunctionRecord>,
        missing_coverage: Option<PathBuf>,
    },
    Failed(ParseFailure),
}

/// Analyze every supplied file against the coverage snapshot and produce
/// the three rankings plus per-file diagnostics.
///
/// A syntactically invalid file never aborts the run: it becomes a
/// [`ParseFailure`] entry and every other file still contributes full
/// results. Only a caller contract violation (bad threshold) is fatal.
pub fn analyze(
    files: &[SourceFile],
    coverage: &dyn CoverageDataset,
    config: &AnalysisConfig,
) -> Result<AnalysisResult> {
    config.validate()?;

    let outcomes: Vec<FileOutcome> = files
        .par_iter()
        .map(|file| analyze_file(file, coverage))
        .collect();

    let mut records = Vec::new();
    let mut parse_failures = Vec::new();
    let mut files_without_coverage = Vec::new();
    for outcome in outcomes {
        match outcome {
            FileOutcome::Analyzed {
                records: mut file_records,
                missing_coverage,
            } => {
                records.append(&mut file_records);
                files_without_coverage.extend(missing_coverage);
            }
            FileOutcome::Failed(failure) => parse_failures.push(failure),
        }
    }
    // Diagnostics sort by path so the result is order-independent too.
    parse_failures.sort_by(|a, b| a.path.cmp(&b.path));
    files_without_coverage.sort();

    let (functions, file_ranking, folder_ranking) =
        aggregate(&records, config.threshold, config.top_n);

    Ok(AnalysisResult {
        functions,
        files: file_ranking,
        folders: folder_ranking,
        parse_failures,
        files_without_coverage,
    })
}

fn analyze_file(file: &SourceFile, coverage: &dyn CoverageDataset) -> FileOutcome {
    let outlines = match extract_functions(&file.content, &file.path) {
        Ok(outlines) => outlines,
        Err(err) => {
            let (path, message) = match err {
                Error::Parse { file, message } => (file, message),
                other => (file.path.clone(), other.to_string()),
            };
            log::warn!("skipping {}: {}", path.display(), message);
            return FileOutcome::Failed(ParseFailure { path, message });
        }
    };

    let entry = coverage.file_coverage(&file.path);
    let missing_coverage = match entry {
        Some(_) => None,
        None => {
            log::debug!("no coverage entry for {}", file.path.display());
            Some(file.path.clone())
        }
    };

    let records = outlines
        .into_iter()
        .map(|outline| {
            let ratio = span_coverage(entry, outline.line_start, outline.line_end);
            build_record(outline, &file.path, ratio)
        })
        .collect();

    FileOutcome::Analyzed {
        records,
        missing_coverage,
    }
}
