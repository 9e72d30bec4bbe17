pub mod branch;
pub mod contents;
pub mod requirements;

pub use branch::{
    AssetToSave, BranchOps, EditorAction, ImportOutcome, assets_requiring_save,
    update_project_with_branch_content,
};
pub use contents::{
    BranchContent, PackageJson, ProjectContents, ProjectFile, TextFile, get_json_file,
    package_json, package_lock_json, project_uids,
};
pub use requirements::{
    CheckResult, ImportNotifier, ImportOperation, NullNotifier, Requirement, RequirementCheck,
    Resolution, check_and_fix_requirements,
};
