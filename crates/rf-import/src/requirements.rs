//! Project health checks run over freshly imported contents.
//!
//! A fixed, ordered list of named checks: each one sees the contents as
//! already fixed by the checks before it, and may return fixed contents of
//! its own. Progress notifications are emitted per check — both "checking"
//! and "resolved" — but never affect control flow. The pipeline's overall
//! result is `Critical` as soon as any single check is, regardless of
//! position; fixes from the other checks still accumulate.

use crate::contents::{PackageJson, ProjectContents, ProjectFile, TextFile, package_json};
use serde::{Deserialize, Serialize};

// ─── Types ───────────────────────────────────────────────────────────────

/// The named checks, in pipeline order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Requirement {
    Storyboard,
    PackageJsonEntries,
    Language,
    ReactVersion,
}

/// How a single check resolved.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Resolution {
    /// Requirement already satisfied.
    Found,
    /// Requirement was missing but has been fixed in the returned contents.
    Fixed,
    /// Unrecoverable for this pipeline run.
    Critical,
}

/// One check's outcome: a resolution tier, a human-readable summary, and
/// optionally the fixed contents for the next check to consume.
#[derive(Debug, Clone)]
pub struct CheckResult {
    pub resolution: Resolution,
    pub text: String,
    pub new_contents: Option<ProjectContents>,
}

impl CheckResult {
    fn found(text: &str) -> Self {
        Self {
            resolution: Resolution::Found,
            text: text.to_string(),
            new_contents: None,
        }
    }

    fn fixed(text: &str, contents: ProjectContents) -> Self {
        Self {
            resolution: Resolution::Fixed,
            text: text.to_string(),
            new_contents: Some(contents),
        }
    }

    fn critical(text: &str) -> Self {
        Self {
            resolution: Resolution::Critical,
            text: text.to_string(),
            new_contents: None,
        }
    }
}

pub trait RequirementCheck {
    /// Shown while the check runs.
    fn start_text(&self) -> &'static str;

    fn check(&self, contents: &ProjectContents) -> CheckResult;
}

/// Progress sink for the import flow. Side effects only — implementations
/// must not influence control flow.
pub trait ImportNotifier {
    fn checking_requirement(&mut self, requirement: Requirement, text: &str);
    fn requirement_resolved(&mut self, requirement: Requirement, resolution: Resolution, text: &str);
    fn operation_started(&mut self, operation: ImportOperation);
    fn operation_finished(&mut self, operation: ImportOperation, success: bool);
}

/// The long-running steps around the checks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ImportOperation {
    LoadBranch,
    ParseFiles,
    RefreshDependencies,
}

/// A notifier that drops everything, for callers without a progress surface.
pub struct NullNotifier;

impl ImportNotifier for NullNotifier {
    fn checking_requirement(&mut self, _requirement: Requirement, _text: &str) {}
    fn requirement_resolved(
        &mut self,
        _requirement: Requirement,
        _resolution: Resolution,
        _text: &str,
    ) {
    }
    fn operation_started(&mut self, _operation: ImportOperation) {}
    fn operation_finished(&mut self, _operation: ImportOperation, _success: bool) {}
}

// ─── Pipeline ────────────────────────────────────────────────────────────

/// Run every check in order, accumulating fixes.
pub fn check_and_fix_requirements(
    notifier: &mut dyn ImportNotifier,
    parsed_contents: ProjectContents,
) -> (Resolution, ProjectContents) {
    let checks: [(Requirement, &dyn RequirementCheck); 4] = [
        (Requirement::Storyboard, &CheckStoryboard),
        (Requirement::PackageJsonEntries, &CheckPackageJsonEntries),
        (Requirement::Language, &CheckLanguage),
        (Requirement::ReactVersion, &CheckReactVersion),
    ];

    let mut contents = parsed_contents;
    let mut result = Resolution::Found;
    for (requirement, check) in checks {
        notifier.checking_requirement(requirement, check.start_text());
        let check_result = check.check(&contents);
        if check_result.resolution == Resolution::Critical {
            log::warn!("requirement {requirement:?} critical: {}", check_result.text);
            result = Resolution::Critical;
        }
        notifier.requirement_resolved(requirement, check_result.resolution, &check_result.text);
        if let Some(new_contents) = check_result.new_contents {
            contents = new_contents;
        }
    }
    (result, contents)
}

// ─── Checks ──────────────────────────────────────────────────────────────

pub const STORYBOARD_FILE_PATH: &str = "/app/storyboard.jsx";

const DEFAULT_STORYBOARD: &str = r#"import * as React from 'react'
import { Storyboard } from 'reframe-api'

export var storyboard = (
  <Storyboard data-uid='storyboard-entity' />
)
"#;

/// The project must contain a storyboard file; a missing one is created.
struct CheckStoryboard;

impl RequirementCheck for CheckStoryboard {
    fn start_text(&self) -> &'static str {
        "Checking for storyboard file"
    }

    fn check(&self, contents: &ProjectContents) -> CheckResult {
        if contents.get_text(STORYBOARD_FILE_PATH).is_some() {
            return CheckResult::found("Storyboard file found");
        }
        let mut fixed = contents.clone();
        fixed.set(
            STORYBOARD_FILE_PATH,
            ProjectFile::Text(TextFile::from_code(DEFAULT_STORYBOARD)),
        );
        CheckResult::fixed("Created a default storyboard file", fixed)
    }
}

/// `package.json` must exist, parse, and declare a dev script the preview
/// server can run; a missing script is added.
struct CheckPackageJsonEntries;

impl RequirementCheck for CheckPackageJsonEntries {
    fn start_text(&self) -> &'static str {
        "Checking package.json entries"
    }

    fn check(&self, contents: &ProjectContents) -> CheckResult {
        let parsed = match package_json(contents) {
            Ok(Some(parsed)) => parsed,
            Ok(None) => return CheckResult::critical("package.json is missing"),
            Err(error) => return CheckResult::critical(&error),
        };
        if parsed.scripts.contains_key("dev") {
            return CheckResult::found("package.json entries found");
        }

        // Re-serialize with the missing script added.
        let mut with_script = parsed;
        with_script
            .scripts
            .insert("dev".to_string(), "vite".to_string());
        match serde_json::to_string_pretty(&with_script) {
            Ok(code) => {
                let mut fixed = contents.clone();
                fixed.set("/package.json", ProjectFile::Text(TextFile::from_code(&code)));
                CheckResult::fixed("Added missing dev script to package.json", fixed)
            }
            Err(error) => CheckResult::critical(&format!("Could not rewrite package.json: {error}")),
        }
    }
}

/// The project language must be something the parser understands.
struct CheckLanguage;

impl RequirementCheck for CheckLanguage {
    fn start_text(&self) -> &'static str {
        "Checking project language"
    }

    fn check(&self, contents: &ProjectContents) -> CheckResult {
        let unsupported = contents.walk().find(|(path, _)| {
            path.ends_with(".vue") || path.ends_with(".svelte") || path.ends_with(".elm")
        });
        if let Some((path, _)) = unsupported {
            return CheckResult::critical(&format!("Unsupported project language: {path}"));
        }
        if contents.get_text("/tsconfig.json").is_some() {
            CheckResult::found("TypeScript project")
        } else {
            CheckResult::found("JavaScript project")
        }
    }
}

const MINIMUM_REACT_MAJOR: u32 = 16;

/// React must be declared at a version the canvas runtime supports.
struct CheckReactVersion;

impl RequirementCheck for CheckReactVersion {
    fn start_text(&self) -> &'static str {
        "Checking React version"
    }

    fn check(&self, contents: &ProjectContents) -> CheckResult {
        let parsed: PackageJson = match package_json(contents) {
            Ok(Some(parsed)) => parsed,
            Ok(None) => return CheckResult::critical("package.json is missing"),
            Err(error) => return CheckResult::critical(&error),
        };
        let Some(react_version) = parsed
            .dependencies
            .get("react")
            .or_else(|| parsed.dev_dependencies.get("react"))
        else {
            return CheckResult::critical("react is not a dependency");
        };
        match parse_major_version(react_version) {
            Some(major) if major >= MINIMUM_REACT_MAJOR => {
                CheckResult::found(&format!("react {react_version}"))
            }
            Some(major) => {
                CheckResult::critical(&format!("react {major}.x is too old, need 16+"))
            }
            None => CheckResult::found(&format!("react {react_version} (unpinned)")),
        }
    }
}

/// The leading major of a semver-ish range: `^18.2.0` → 18. Ranges without a
/// leading number (tags, urls, workspaces) return `None`.
fn parse_major_version(range: &str) -> Option<u32> {
    let trimmed = range.trim_start_matches(['^', '~', '=', 'v', '>', '<', ' ']);
    let major: String = trimmed.chars().take_while(char::is_ascii_digit).collect();
    major.parse().ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::contents::{ProjectFile, TextFile};

    /// Records every notification for assertions.
    #[derive(Default)]
    struct RecordingNotifier {
        events: Vec<String>,
    }

    impl ImportNotifier for RecordingNotifier {
        fn checking_requirement(&mut self, requirement: Requirement, _text: &str) {
            self.events.push(format!("checking {requirement:?}"));
        }
        fn requirement_resolved(
            &mut self,
            requirement: Requirement,
            resolution: Resolution,
            _text: &str,
        ) {
            self.events
                .push(format!("resolved {requirement:?} {resolution:?}"));
        }
        fn operation_started(&mut self, operation: ImportOperation) {
            self.events.push(format!("started {operation:?}"));
        }
        fn operation_finished(&mut self, operation: ImportOperation, success: bool) {
            self.events
                .push(format!("finished {operation:?} {success}"));
        }
    }

    fn healthy_project() -> ProjectContents {
        let mut contents = ProjectContents::new();
        contents.set(
            STORYBOARD_FILE_PATH,
            ProjectFile::Text(TextFile::from_code("export var storyboard = null")),
        );
        contents.set(
            "/package.json",
            ProjectFile::Text(TextFile::from_code(
                r#"{ "dependencies": { "react": "^18.2.0" }, "scripts": { "dev": "vite" } }"#,
            )),
        );
        contents
    }

    #[test]
    fn healthy_project_is_all_found() {
        let mut notifier = RecordingNotifier::default();
        let (result, _) = check_and_fix_requirements(&mut notifier, healthy_project());
        assert_eq!(result, Resolution::Found);
        // Every check emitted a checking + resolved pair.
        assert_eq!(notifier.events.len(), 8);
    }

    #[test]
    fn missing_storyboard_is_fixed_not_fatal() {
        let mut contents = healthy_project();
        contents.remove(STORYBOARD_FILE_PATH);

        let (result, fixed) =
            check_and_fix_requirements(&mut RecordingNotifier::default(), contents);
        assert_eq!(result, Resolution::Found);
        assert!(
            fixed.get_text(STORYBOARD_FILE_PATH).is_some(),
            "storyboard should have been created"
        );
    }

    #[test]
    fn single_critical_makes_the_whole_pipeline_critical() {
        let mut contents = healthy_project();
        contents.set(
            "/package.json",
            ProjectFile::Text(TextFile::from_code(
                r#"{ "dependencies": { "react": "^0.14.0" }, "scripts": { "dev": "vite" } }"#,
            )),
        );
        let (result, _) = check_and_fix_requirements(&mut RecordingNotifier::default(), contents);
        assert_eq!(result, Resolution::Critical);
    }

    #[test]
    fn missing_package_json_is_critical() {
        let mut contents = healthy_project();
        contents.remove("/package.json");
        let (result, _) = check_and_fix_requirements(&mut RecordingNotifier::default(), contents);
        assert_eq!(result, Resolution::Critical);
    }

    #[test]
    fn fixes_accumulate_across_checks() {
        // Both the storyboard and the dev script are missing: the react
        // check must still see the package.json as rewritten by the
        // entries check.
        let mut contents = ProjectContents::new();
        contents.set(
            "/package.json",
            ProjectFile::Text(TextFile::from_code(
                r#"{ "dependencies": { "react": "^18.2.0" } }"#,
            )),
        );
        let mut notifier = RecordingNotifier::default();
        let (result, fixed) = check_and_fix_requirements(&mut notifier, contents);

        assert_eq!(result, Resolution::Found);
        assert!(fixed.get_text(STORYBOARD_FILE_PATH).is_some());
        let rewritten = package_json(&fixed).unwrap().unwrap();
        assert_eq!(rewritten.scripts["dev"], "vite");
        assert!(
            notifier
                .events
                .contains(&"resolved ReactVersion Found".to_string())
        );
    }

    #[test]
    fn unsupported_language_is_critical() {
        let mut contents = healthy_project();
        contents.set(
            "/src/App.vue",
            ProjectFile::Text(TextFile::from_code("<template/>")),
        );
        let (result, _) = check_and_fix_requirements(&mut RecordingNotifier::default(), contents);
        assert_eq!(result, Resolution::Critical);
    }

    #[test]
    fn major_version_parsing() {
        assert_eq!(parse_major_version("^18.2.0"), Some(18));
        assert_eq!(parse_major_version("~16.14.0"), Some(16));
        assert_eq!(parse_major_version("0.14.8"), Some(0));
        assert_eq!(parse_major_version("latest"), None);
    }
}
