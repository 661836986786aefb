// Export modules for library usage
pub mod analysis;
pub mod analyzers;
pub mod core;
pub mod risk;

// Re-export commonly used types
pub use crate::core::{
    AnalysisConfig, AnalysisResult, FileRecord, FolderRecord, FunctionKind, FunctionRecord,
    ParseFailure, SourceFile,
};

pub use crate::core::errors::{Error, Result};

pub use crate::analysis::analyze;

pub use crate::analyzers::{extract_functions, FunctionOutline};

pub use crate::risk::{
    aggregation::{aggregate, summarize_files, summarize_folders},
    coverage::{coverage_ratio, span_coverage, CoverageDataset, CoverageMap, FileCoverage},
    crap_score,
};
