//! Deterministic rollups of function records into the three rankings.
//!
//! Every fold here is commutative (max, sum, grouping through a `BTreeMap`),
//! so the output is bit-identical no matter what order records arrive in —
//! which is what lets extraction run in parallel without any coordination.

use crate::core::{FileRecord, FolderRecord, FunctionRecord};
use std::cmp::Ordering;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

/// All three rankings, already sorted and truncated.
pub fn aggregate(
    records: &[FunctionRecord],
    threshold: f64,
    top_n: usize,
) -> (
    im::Vector<FunctionRecord>,
    im::Vector<FileRecord>,
    im::Vector<FolderRecord>,
) {
    // Folder rollups fold over the complete file set, so files are
    // summarized in full before any truncation.
    let mut files = summarize_files(records, threshold);
    let mut folders = summarize_folders(&files);

    let mut functions: Vec<FunctionRecord> = records.to_vec();
    functions.sort_by(compare_functions);
    truncate(&mut functions, top_n);

    files.sort_by(compare_files);
    truncate(&mut files, top_n);

    folders.sort_by(compare_folders);
    truncate(&mut folders, top_n);

    (
        functions.into_iter().collect(),
        files.into_iter().collect(),
        folders.into_iter().collect(),
    )
}

/// Score descending, then complexity descending, then name/path/line
/// ascending. The trailing keys make the order total, so equal-scoring
/// functions in different files still land deterministically.
fn compare_functions(a: &FunctionRecord, b: &FunctionRecord) -> Ordering {
    b.score
        .total_cmp(&a.score)
        .then_with(|| b.complexity.cmp(&a.complexity))
        .then_with(|| a.qualified_name.cmp(&b.qualified_name))
        .then_with(|| a.file_path.cmp(&b.file_path))
        .then_with(|| a.line_start.cmp(&b.line_start))
}

fn compare_files(a: &FileRecord, b: &FileRecord) -> Ordering {
    b.max_score
        .total_cmp(&a.max_score)
        .then_with(|| b.count_above_threshold.cmp(&a.count_above_threshold))
        .then_with(|| a.file_path.cmp(&b.file_path))
}

fn compare_folders(a: &FolderRecord, b: &FolderRecord) -> Ordering {
    b.max_score
        .total_cmp(&a.max_score)
        .then_with(|| b.count_above_threshold.cmp(&a.count_above_threshold))
        .then_with(|| a.folder_path.cmp(&b.folder_path))
}

fn truncate<T>(rows: &mut Vec<T>, top_n: usize) {
    if top_n > 0 {
        rows.truncate(top_n);
    }
}

/// One record per distinct file path: max score, count at or above the
/// threshold, total functions.
pub fn summarize_files(records: &[FunctionRecord], threshold: f64) -> Vec<FileRecord> {
    let mut by_file: BTreeMap<PathBuf, FileRecord> = BTreeMap::new();
    for record in records {
        let entry = by_file
            .entry(record.file_path.clone())
            .or_insert_with(|| FileRecord {
                file_path: record.file_path.clone(),
                max_score: f64::NEG_INFINITY,
                count_above_threshold: 0,
                function_count: 0,
            });
        entry.max_score = entry.max_score.max(record.score);
        entry.function_count += 1;
        if record.score >= threshold {
            entry.count_above_threshold += 1;
        }
    }
    by_file.into_values().collect()
}

/// One record per ancestor directory of any analyzed file, the analysis
/// root included (spelled `.`). A folder's rollup covers every file
/// transitively under it, not only immediate children.
pub fn summarize_folders(files: &[FileRecord]) -> Vec<FolderRecord> {
    let mut by_folder: BTreeMap<PathBuf, FolderRecord> = BTreeMap::new();
    for file in files {
        for folder in containing_folders(&file.file_path) {
            let entry = by_folder
                .entry(folder.clone())
                .or_insert_with(|| FolderRecord {
                    folder_path: folder,
                    max_score: f64::NEG_INFINITY,
                    count_above_threshold: 0,
                });
            entry.max_score = entry.max_score.max(file.max_score);
            entry.count_above_threshold += file.count_above_threshold;
        }
    }
    by_folder.into_values().collect()
}

fn containing_folders(file_path: &Path) -> Vec<PathBuf> {
    let Some(parent) = file_path.parent() else {
        return vec![PathBuf::from(".")];
    };
    parent
        .ancestors()
        .map(|dir| {
            if dir.as_os_str().is_empty() {
                PathBuf::from(".")
            } else {
                dir.to_path_buf()
            }
        })
        .collect()
}
