use crapmap::{
    analyze, AnalysisConfig, CoverageMap, FileCoverage, FunctionKind, SourceFile,
};
use indoc::indoc;
use pretty_assertions::assert_eq;
use std::path::{Path, PathBuf};

fn sample_tree() -> Vec<SourceFile> {
    vec![
        SourceFile::new(
            "pkg/api.py",
            indoc! {"
                def fetch(url):
                    if url:
                        u = normalize(url)
                        return get(u)
                    return None


                def parse(raw):
                    return raw.strip()
            "},
        ),
        SourceFile::new(
            "pkg/util/helpers.py",
            indoc! {"
                def clamp(value, lo, hi):
                    if value < lo:
                        return lo
                    if value > hi:
                        return hi
                    return value
            "},
        ),
        SourceFile::new("broken.py", "def broken(:\n    pass\n"),
    ]
}

fn sample_coverage() -> CoverageMap {
    // api.py: fetch half covered, parse fully covered. helpers.py has no
    // entry at all, so clamp takes the conservative 0.0 default.
    CoverageMap::new().with_file("pkg/api.py", FileCoverage::new([2, 3, 9], [4, 5]))
}

#[test]
fn mixed_tree_produces_rankings_and_isolated_diagnostics() {
    let result = analyze(
        &sample_tree(),
        &sample_coverage(),
        &AnalysisConfig::new(10.0, 0),
    )
    .unwrap();

    // The broken file surfaces as a diagnostic, nothing more.
    assert_eq!(result.parse_failures.len(), 1);
    assert_eq!(result.parse_failures[0].path, PathBuf::from("broken.py"));

    // clamp: cc 3, cov 0.0 -> 12; fetch: cc 2, cov 0.5 -> 2.5; parse -> 1.
    let names: Vec<&str> = result
        .functions
        .iter()
        .map(|f| f.qualified_name.as_str())
        .collect();
    assert_eq!(names, vec!["clamp", "fetch", "parse"]);
    assert_eq!(result.functions[0].score, 12.0);
    assert_eq!(result.functions[1].score, 2.5);
    assert_eq!(result.functions[2].score, 1.0);
    assert_eq!(result.functions[0].kind, FunctionKind::Function);

    // File ranking: helpers.py (12) ahead of api.py (2.5).
    let file_paths: Vec<&Path> = result.files.iter().map(|f| f.file_path.as_path()).collect();
    assert_eq!(
        file_paths,
        vec![Path::new("pkg/util/helpers.py"), Path::new("pkg/api.py")]
    );
    assert_eq!(result.files[0].count_above_threshold, 1);
    assert_eq!(result.files[1].count_above_threshold, 0);
    assert_eq!(result.files[1].function_count, 2);

    // Folder ranking: every ancestor shares the max 12, ties broken by path.
    let folder_paths: Vec<&Path> = result
        .folders
        .iter()
        .map(|f| f.folder_path.as_path())
        .collect();
    assert_eq!(
        folder_paths,
        vec![Path::new("."), Path::new("pkg"), Path::new("pkg/util")]
    );
    assert!(result
        .folders
        .iter()
        .all(|f| f.max_score == 12.0 && f.count_above_threshold == 1));

    // Only the file that parsed but had no dataset entry is reported.
    assert_eq!(
        result.files_without_coverage,
        vec![PathBuf::from("pkg/util/helpers.py")]
    );
}

#[test]
fn processing_order_does_not_change_the_result() {
    let coverage = sample_coverage();
    let config = AnalysisConfig::new(10.0, 0);

    let mut files = sample_tree();
    let forward = analyze(&files, &coverage, &config).unwrap();
    files.reverse();
    let reversed = analyze(&files, &coverage, &config).unwrap();

    assert_eq!(forward, reversed);
}

#[test]
fn top_n_truncates_each_ranking_independently_after_sorting() {
    let result = analyze(
        &sample_tree(),
        &sample_coverage(),
        &AnalysisConfig::new(10.0, 2),
    )
    .unwrap();

    assert_eq!(result.functions.len(), 2);
    assert_eq!(result.functions[0].qualified_name, "clamp");
    assert_eq!(result.functions[1].qualified_name, "fetch");
    assert_eq!(result.files.len(), 2);
    assert_eq!(result.folders.len(), 2);
    assert_eq!(result.folders[0].folder_path, PathBuf::from("."));
    assert_eq!(result.folders[1].folder_path, PathBuf::from("pkg"));
}

#[test]
fn file_tracked_with_zero_lines_scores_as_never_executed() {
    let files = vec![SourceFile::new(
        "cold.py",
        indoc! {"
            def never_ran(x):
                if x:
                    return x
                return 0
        "},
    )];
    let coverage = CoverageMap::new().with_file("cold.py", FileCoverage::default());

    let result = analyze(&files, &coverage, &AnalysisConfig::new(0.0, 0)).unwrap();

    assert_eq!(result.functions.len(), 1);
    assert_eq!(result.functions[0].coverage_ratio, 0.0);
    // Present in the dataset, so not in the missing-data diagnostics.
    assert!(result.files_without_coverage.is_empty());
}

#[test]
fn stub_body_in_a_tracked_file_counts_as_fully_covered() {
    let files = vec![SourceFile::new(
        "svc.py",
        indoc! {"
            def active(x):
                return x + 1


            def stub():
                pass
        "},
    )];
    // Only active() is instrumented; stub's span has no executable lines.
    let coverage = CoverageMap::new().with_file("svc.py", FileCoverage::new([2], []));

    let result = analyze(&files, &coverage, &AnalysisConfig::new(0.0, 0)).unwrap();

    let stub = result
        .functions
        .iter()
        .find(|f| f.qualified_name == "stub")
        .unwrap();
    assert_eq!(stub.coverage_ratio, 1.0);
    assert_eq!(stub.score, stub.complexity as f64);
}

#[test]
fn result_serializes_and_round_trips_as_json() {
    let result = analyze(
        &sample_tree(),
        &sample_coverage(),
        &AnalysisConfig::new(10.0, 0),
    )
    .unwrap();

    let json = serde_json::to_string(&result).unwrap();
    let restored: crapmap::AnalysisResult = serde_json::from_str(&json).unwrap();
    assert_eq!(result, restored);
}
