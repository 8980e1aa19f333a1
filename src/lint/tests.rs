use super::*;
use crate::files::MemoryFileSystem;
use std::io::Read;
use std::path::Path;

#[derive(Default)]
struct RecordingReporter {
    outcomes: Vec<Outcome>,
    finished: Option<LintSummary>,
}

impl Reporter for RecordingReporter {
    fn report(&mut self, outcome: &Outcome) -> Result<()> {
        self.outcomes.push(outcome.clone());
        Ok(())
    }

    fn finish(&mut self, summary: &LintSummary) -> Result<()> {
        self.finished = Some(*summary);
        Ok(())
    }
}

impl RecordingReporter {
    fn labelled(&self) -> Vec<(String, &'static str)> {
        self.outcomes
            .iter()
            .map(|outcome| (outcome.path().to_string(), outcome.label()))
            .collect()
    }
}

fn path(p: &str) -> TreePath {
    TreePath::new(p).unwrap()
}

fn check(fs: &MemoryFileSystem, roots: &[&str]) -> (Result<LintSummary>, RecordingReporter) {
    lint(fs, roots, false)
}

fn fix(fs: &MemoryFileSystem, roots: &[&str]) -> (Result<LintSummary>, RecordingReporter) {
    lint(fs, roots, true)
}

fn lint(fs: &MemoryFileSystem, roots: &[&str], fix: bool) -> (Result<LintSummary>, RecordingReporter) {
    let roots: Vec<TreePath> = roots.iter().map(|root| path(root)).collect();
    let options = LintOptions {
        fix,
        parent_rules: false,
    };
    let mut reporter = RecordingReporter::default();
    let result = Linter::new(fs, IgnoreSet::new(), options).run(&roots, &mut reporter);
    (result, reporter)
}

#[test]
fn test_check_reports_every_path() {
    let fs = MemoryFileSystem::new();
    fs.write("/repo/src/main.rs", "");
    fs.write("/repo/Bad Name.txt", "");
    fs.write("/repo/README.md", "");

    let (result, reporter) = check(&fs, &["/repo"]);
    let summary = result.unwrap();

    assert_eq!(
        reporter.labelled(),
        vec![
            ("/repo".to_string(), "VALID"),
            ("/repo/Bad Name.txt".to_string(), "INVALID"),
            ("/repo/README.md".to_string(), "VALID"),
            ("/repo/src".to_string(), "VALID"),
            ("/repo/src/main.rs".to_string(), "VALID"),
        ]
    );
    assert_eq!(summary, LintSummary { valid: 4, invalid: 1, fixed: 0 });
    assert_eq!(summary.exit_code(), 1);
    assert_eq!(reporter.finished, Some(summary));
    // Nothing is renamed without fix mode.
    assert!(fs.exists("/repo/Bad Name.txt"));
}

#[test]
fn test_screaming_stem_needs_snake_extension() {
    let fs = MemoryFileSystem::new();
    fs.write("/r/CONSTANTS.YML", "");
    fs.write("/r/CONSTANTS.yml", "");

    let (result, reporter) = check(&fs, &["/r"]);
    assert_eq!(result.unwrap().invalid, 1);
    assert!(reporter.outcomes.contains(&Outcome::Invalid(path("/r/CONSTANTS.YML"))));
    assert!(reporter.outcomes.contains(&Outcome::Valid(path("/r/CONSTANTS.yml"))));
}

#[test]
fn test_fix_renames_invalid_files() {
    let fs = MemoryFileSystem::new();
    fs.write("/r/My File.TXT", "contents");

    let (result, reporter) = fix(&fs, &["/r"]);
    let summary = result.unwrap();

    assert_eq!(summary, LintSummary { valid: 1, invalid: 0, fixed: 1 });
    assert_eq!(summary.exit_code(), 0);
    assert!(reporter.outcomes.contains(&Outcome::Fixed {
        from: path("/r/My File.TXT"),
        to: path("/r/my_file.txt"),
    }));
    assert!(!fs.exists("/r/My File.TXT"));
    assert!(fs.exists("/r/my_file.txt"));
}

#[test]
fn test_fix_descends_into_renamed_directories() {
    let fs = MemoryFileSystem::new();
    fs.write("/r/Sub Dir/Inner File", "");

    let (result, reporter) = fix(&fs, &["/r"]);
    assert_eq!(result.unwrap().fixed, 2);
    assert_eq!(
        reporter.labelled(),
        vec![
            ("/r".to_string(), "VALID"),
            ("/r/sub_dir".to_string(), "FIXED"),
            ("/r/sub_dir/inner_file".to_string(), "FIXED"),
        ]
    );
    assert!(fs.exists("/r/sub_dir/inner_file"));
}

#[test]
fn test_rename_failure_aborts_the_run() {
    let fs = MemoryFileSystem::new();
    fs.write("/r/A Bad Name", "");
    fs.write("/r/Another Bad Name", "");
    fs.set_read_only(true);

    let (result, reporter) = fix(&fs, &["/r"]);
    let error = result.unwrap_err();

    assert!(format!("{error:#}").contains("Failed to rename /r/A Bad Name"));
    // Only the root was reported before the failure, and the report is
    // still finished.
    assert_eq!(reporter.outcomes, vec![Outcome::Valid(path("/r"))]);
    assert_eq!(
        reporter.finished,
        Some(LintSummary {
            valid: 1,
            invalid: 0,
            fixed: 0
        })
    );
}

#[test]
fn test_fix_refuses_to_clobber() {
    let fs = MemoryFileSystem::new();
    fs.write("/r/my file", "first");
    fs.write("/r/my_file", "second");

    let (result, _) = fix(&fs, &["/r"]);
    assert!(result.unwrap_err().to_string().contains("target already exists"));
    assert!(fs.exists("/r/my file"));
}

#[test]
fn test_fix_refuses_case_only_clobber() {
    let fs = MemoryFileSystem::new();
    fs.write("/r/Notes", "upper");
    fs.write("/r/notes", "lower");

    let (result, _) = fix(&fs, &["/r"]);
    assert!(result.unwrap_err().to_string().contains("target already exists"));

    let mut contents = String::new();
    fs.open(Path::new("/r/notes")).unwrap().read_to_string(&mut contents).unwrap();
    assert_eq!(contents, "lower");
    assert!(fs.exists("/r/Notes"));
}

#[test]
fn test_fix_renames_case_only() {
    let fs = MemoryFileSystem::new();
    fs.write("/r/Notes", "upper");

    let (result, reporter) = fix(&fs, &["/r"]);
    assert_eq!(result.unwrap().fixed, 1);
    assert_eq!(reporter.labelled()[1], ("/r/notes".to_string(), "FIXED"));
    assert!(!fs.exists("/r/Notes"));
}

#[test]
fn test_failed_run_keeps_earlier_fixes_in_report() {
    let fs = MemoryFileSystem::new();
    fs.write("/r/A File", "");
    fs.write("/r/my file", "first");
    fs.write("/r/my_file", "second");

    let (result, reporter) = fix(&fs, &["/r"]);
    assert!(result.is_err());
    assert_eq!(
        reporter.labelled(),
        vec![("/r".to_string(), "VALID"), ("/r/a_file".to_string(), "FIXED")]
    );
    assert_eq!(reporter.finished.map(|summary| summary.fixed), Some(1));
}

#[test]
fn test_fix_fails_without_usable_name() {
    let fs = MemoryFileSystem::new();
    fs.write("/r/日本", "");

    let (result, _) = fix(&fs, &["/r"]);
    assert!(result.unwrap_err().to_string().contains("no usable name"));
}

#[test]
fn test_ignored_subtrees_are_never_visited() {
    let fs = MemoryFileSystem::new();
    fs.write("/r/.gitignore", "Build Output/\n*.LOG\n");
    fs.write("/r/Build Output/Bad File", "");
    fs.write("/r/Debug.LOG", "");
    fs.write("/r/.git/HEAD", "");

    let (result, reporter) = fix(&fs, &["/r"]);
    result.unwrap();

    let visited: Vec<String> = reporter.outcomes.iter().map(|o| o.path().to_string()).collect();
    assert_eq!(visited, vec!["/r", "/r/.gitignore"]);
    assert!(fs.exists("/r/Build Output/Bad File"));
    assert!(fs.exists("/r/Debug.LOG"));
}

#[test]
fn test_nested_rules_only_apply_to_their_subtree() {
    let fs = MemoryFileSystem::new();
    fs.write("/r/sub/.gitignore", "Skipped\n");
    fs.write("/r/sub/Skipped", "");
    fs.write("/r/Skipped", "");

    let (result, reporter) = check(&fs, &["/r"]);
    assert_eq!(result.unwrap().invalid, 1);
    assert!(reporter.outcomes.contains(&Outcome::Invalid(path("/r/Skipped"))));
    assert!(!reporter.outcomes.iter().any(|o| o.path() == &path("/r/sub/Skipped")));
}

#[test]
fn test_ignore_rules_are_shared_across_roots() {
    let fs = MemoryFileSystem::new();
    fs.write("/r/.gitignore", "Vendor/\n");
    fs.write("/r/Vendor/Lib", "");

    let (result, reporter) = check(&fs, &["/r", "/r/Vendor"]);
    let summary = result.unwrap();

    assert_eq!(summary.invalid, 0);
    assert!(!reporter.outcomes.iter().any(|o| o.path().to_string().contains("Vendor")));
}

#[test]
fn test_exit_code_ignores_valid_and_fixed() {
    let summary = LintSummary { valid: 3, invalid: 0, fixed: 2 };
    assert_eq!(summary.exit_code(), 0);
    assert_eq!(summary.total(), 5);
}
