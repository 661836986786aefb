pub mod aggregation;
pub mod coverage;

use crate::analyzers::FunctionOutline;
use crate::core::FunctionRecord;
use std::path::Path;

/// CRAP score: `cc^2 * (1 - cov)^3 + cc`.
///
/// Pure and total. Strictly increasing in `cc` for fixed `cov`; strictly
/// decreasing in `cov` for fixed `cc` until the exponential term vanishes at
/// full coverage, where the score collapses to `cc`.
pub fn crap_score(complexity: u32, coverage_ratio: f64) -> f64 {
    let cc = complexity as f64;
    cc * cc * (1.0 - coverage_ratio).powi(3) + cc
}

/// Assemble the final immutable record from an extracted outline and its
/// correlated coverage ratio. Score is computed exactly once, here.
pub fn build_record(
    outline: FunctionOutline,
    file_path: &Path,
    coverage_ratio: f64,
) -> FunctionRecord {
    let score = crap_score(outline.complexity, coverage_ratio);
    FunctionRecord {
        qualified_name: outline.qualified_name,
        file_path: file_path.to_path_buf(),
        line_start: outline.line_start,
        line_end: outline.line_end,
        complexity: outline.complexity,
        coverage_ratio,
        score,
        kind: outline.kind,
        is_async: outline.is_async,
    }
}
