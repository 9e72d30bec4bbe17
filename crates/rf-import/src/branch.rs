//! Branch import orchestration.
//!
//! The network fetch lives outside this crate: a branch load hands us a
//! `BranchContent` payload. The flow here is the control-flow contract
//! around it — parse, health-check, publish, refresh dependencies — with a
//! deliberate update-first ordering: the editor model is updated *before*
//! the dependency refresh runs, so a refresh failure costs a notification,
//! never data.

use crate::contents::{BranchContent, ProjectContents};
use crate::requirements::{
    ImportNotifier, ImportOperation, Resolution, check_and_fix_requirements,
};
use serde::{Deserialize, Serialize};

// ─── Collaborators ───────────────────────────────────────────────────────

/// Actions dispatched to the editor's single external executor. Serializable
/// pure data, applied elsewhere.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum EditorAction {
    UpdateProjectContents(ProjectContents),
    UpdateBranchContents(ProjectContents),
    TruncateHistory,
    ShowToast { error: bool, message: String },
}

/// The import flow's collaborators. Implementations may run asynchronously
/// on the outside; this flow only sees their results.
pub trait BranchOps {
    /// Push text files through the parser so every file carries its parsed
    /// representation.
    fn parse_project_contents(&mut self, contents: ProjectContents)
    -> Result<ProjectContents, String>;

    /// Refresh the dependency registry from a `package.json` source.
    fn refresh_dependencies(&mut self, package_json_code: &str) -> Result<(), String>;

    fn dispatch(&mut self, actions: Vec<EditorAction>);
}

/// How an import run ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ImportOutcome {
    Success,
    /// A requirement check was critical; nothing was published. The caller
    /// decides whether to abort or present the project anyway.
    CriticalRequirement,
}

// ─── Flow ────────────────────────────────────────────────────────────────

/// Import freshly loaded branch content into the project.
///
/// # Errors
/// Only a parse failure errors out; a failing dependency refresh is reported
/// through a toast and does not roll back the already-published contents.
pub fn update_project_with_branch_content(
    ops: &mut dyn BranchOps,
    notifier: &mut dyn ImportNotifier,
    branch: BranchContent,
    branch_name: &str,
) -> Result<ImportOutcome, String> {
    notifier.operation_started(ImportOperation::ParseFiles);
    let parsed = match ops.parse_project_contents(branch.content) {
        Ok(parsed) => parsed,
        Err(error) => {
            notifier.operation_finished(ImportOperation::ParseFiles, false);
            return Err(error);
        }
    };
    notifier.operation_finished(ImportOperation::ParseFiles, true);

    let (requirement_result, fixed_contents) = check_and_fix_requirements(notifier, parsed);
    if requirement_result == Resolution::Critical {
        return Ok(ImportOutcome::CriticalRequirement);
    }

    // Update the editor with everything now, so nothing failing past this
    // point loses data from the user's perspective.
    ops.dispatch(vec![
        EditorAction::UpdateProjectContents(fixed_contents.clone()),
        EditorAction::UpdateBranchContents(fixed_contents.clone()),
        EditorAction::TruncateHistory,
    ]);

    if let Some(package_json) = fixed_contents.get_text("/package.json") {
        notifier.operation_started(ImportOperation::RefreshDependencies);
        match ops.refresh_dependencies(&package_json.code) {
            Ok(()) => notifier.operation_finished(ImportOperation::RefreshDependencies, true),
            Err(error) => {
                log::warn!("dependency refresh failed after branch import: {error}");
                notifier.operation_finished(ImportOperation::RefreshDependencies, false);
                ops.dispatch(vec![EditorAction::ShowToast {
                    error: true,
                    message: "There was an error when attempting to update the dependencies."
                        .to_string(),
                }]);
            }
        }
    }

    ops.dispatch(vec![EditorAction::ShowToast {
        error: false,
        message: format!("Updated the project with the content from {branch_name}"),
    }]);

    Ok(ImportOutcome::Success)
}

// ─── Asset sync decisions ────────────────────────────────────────────────

/// An image or asset file whose bytes must be copied to project storage.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AssetToSave {
    pub path: String,
    pub git_blob_sha: String,
}

/// Decide which branch assets need saving against the current project:
/// a file needs saving when nothing exists at its path, the file kind
/// changed, or the kind matches but the content hash differs.
pub fn assets_requiring_save(
    branch_contents: &ProjectContents,
    current_contents: &ProjectContents,
) -> Vec<AssetToSave> {
    use crate::contents::ProjectFile;

    let mut to_save = Vec::new();
    for (path, file) in branch_contents.walk() {
        let (ProjectFile::Image { git_blob_sha } | ProjectFile::Asset { git_blob_sha }) = file
        else {
            continue;
        };
        let Some(sha) = git_blob_sha else {
            log::debug!("branch asset {path} has no blob sha, skipping");
            continue;
        };
        let needs_save = match current_contents.get(path) {
            None => true,
            Some(existing) => {
                std::mem::discriminant(existing) != std::mem::discriminant(file)
                    || existing.git_blob_sha() != Some(sha.as_str())
            }
        };
        if needs_save {
            to_save.push(AssetToSave {
                path: path.to_string(),
                git_blob_sha: sha.clone(),
            });
        }
    }
    to_save
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::contents::{ProjectFile, TextFile};
    use crate::requirements::{NullNotifier, Requirement};

    /// Scripted collaborators that record dispatches.
    struct FakeOps {
        refresh_result: Result<(), String>,
        dispatched: Vec<EditorAction>,
        refresh_calls: usize,
    }

    impl FakeOps {
        fn new(refresh_result: Result<(), String>) -> Self {
            Self {
                refresh_result,
                dispatched: Vec::new(),
                refresh_calls: 0,
            }
        }
    }

    impl BranchOps for FakeOps {
        fn parse_project_contents(
            &mut self,
            contents: ProjectContents,
        ) -> Result<ProjectContents, String> {
            Ok(contents)
        }

        fn refresh_dependencies(&mut self, _package_json_code: &str) -> Result<(), String> {
            self.refresh_calls += 1;
            self.refresh_result.clone()
        }

        fn dispatch(&mut self, actions: Vec<EditorAction>) {
            self.dispatched.extend(actions);
        }
    }

    fn healthy_branch() -> BranchContent {
        let mut contents = ProjectContents::new();
        contents.set(
            crate::requirements::STORYBOARD_FILE_PATH,
            ProjectFile::Text(TextFile::from_code("export var storyboard = null")),
        );
        contents.set(
            "/package.json",
            ProjectFile::Text(TextFile::from_code(
                r#"{ "dependencies": { "react": "^18.2.0" }, "scripts": { "dev": "vite" } }"#,
            )),
        );
        BranchContent {
            content: contents,
            origin_commit: "abc123".to_string(),
        }
    }

    #[test]
    fn successful_import_publishes_then_refreshes() {
        let mut ops = FakeOps::new(Ok(()));
        let outcome = update_project_with_branch_content(
            &mut ops,
            &mut NullNotifier,
            healthy_branch(),
            "main",
        )
        .unwrap();

        assert_eq!(outcome, ImportOutcome::Success);
        assert_eq!(ops.refresh_calls, 1);
        assert!(matches!(
            ops.dispatched[0],
            EditorAction::UpdateProjectContents(_)
        ));
        assert!(matches!(ops.dispatched[2], EditorAction::TruncateHistory));
        assert!(matches!(
            ops.dispatched.last(),
            Some(EditorAction::ShowToast { error: false, .. })
        ));
    }

    #[test]
    fn critical_requirement_stops_before_publishing() {
        let mut branch = healthy_branch();
        branch.content.remove("/package.json");

        let mut ops = FakeOps::new(Ok(()));
        let outcome = update_project_with_branch_content(
            &mut ops,
            &mut NullNotifier,
            branch,
            "main",
        )
        .unwrap();

        assert_eq!(outcome, ImportOutcome::CriticalRequirement);
        assert!(ops.dispatched.is_empty(), "nothing published on critical");
        assert_eq!(ops.refresh_calls, 0);
    }

    #[test]
    fn refresh_failure_keeps_published_contents() {
        let mut ops = FakeOps::new(Err("registry unreachable".to_string()));
        let outcome = update_project_with_branch_content(
            &mut ops,
            &mut NullNotifier,
            healthy_branch(),
            "main",
        )
        .unwrap();

        // Partial success over data loss: the contents stay published and
        // the failure surfaces as an error toast.
        assert_eq!(outcome, ImportOutcome::Success);
        assert!(matches!(
            ops.dispatched[0],
            EditorAction::UpdateProjectContents(_)
        ));
        assert!(ops.dispatched.iter().any(|action| matches!(
            action,
            EditorAction::ShowToast { error: true, .. }
        )));
    }

    #[test]
    fn requirement_fix_order_is_sequential() {
        // A branch missing both storyboard and dev script still imports,
        // with both fixes applied in order.
        let mut branch = healthy_branch();
        branch.content.remove(crate::requirements::STORYBOARD_FILE_PATH);

        #[derive(Default)]
        struct OrderNotifier {
            order: Vec<Requirement>,
        }
        impl ImportNotifier for OrderNotifier {
            fn checking_requirement(&mut self, requirement: Requirement, _text: &str) {
                self.order.push(requirement);
            }
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

        let mut ops = FakeOps::new(Ok(()));
        let mut notifier = OrderNotifier::default();
        update_project_with_branch_content(&mut ops, &mut notifier, branch, "main").unwrap();
        assert_eq!(
            notifier.order,
            vec![
                Requirement::Storyboard,
                Requirement::PackageJsonEntries,
                Requirement::Language,
                Requirement::ReactVersion,
            ]
        );
    }

    #[test]
    fn asset_save_decisions_compare_shas() {
        let mut branch = ProjectContents::new();
        branch.set(
            "/assets/logo.png",
            ProjectFile::Image {
                git_blob_sha: Some("sha-new".to_string()),
            },
        );
        branch.set(
            "/assets/font.woff2",
            ProjectFile::Asset {
                git_blob_sha: Some("sha-same".to_string()),
            },
        );
        branch.set(
            "/assets/was-image.png",
            ProjectFile::Asset {
                git_blob_sha: Some("sha-kind".to_string()),
            },
        );

        let mut current = ProjectContents::new();
        current.set(
            "/assets/logo.png",
            ProjectFile::Image {
                git_blob_sha: Some("sha-old".to_string()),
            },
        );
        current.set(
            "/assets/font.woff2",
            ProjectFile::Asset {
                git_blob_sha: Some("sha-same".to_string()),
            },
        );
        current.set(
            "/assets/was-image.png",
            ProjectFile::Image {
                git_blob_sha: Some("sha-kind".to_string()),
            },
        );

        let to_save = assets_requiring_save(&branch, &current);
        let paths: Vec<&str> = to_save.iter().map(|a| a.path.as_str()).collect();
        // Changed sha and changed kind need saving; identical sha does not.
        assert_eq!(paths, vec!["/assets/logo.png", "/assets/was-image.png"]);
    }
}
