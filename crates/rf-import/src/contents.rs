//! The project contents model consumed by the import pipeline.
//!
//! A project is a flat, path-keyed map of files (`BTreeMap` keeps walks in
//! stable path order). Text files may carry the parsed representation of
//! their code; images and assets carry only their content hash — their bytes
//! live with the hosting service, not in the editor model.

use rf_core::element::ParsedSource;
use serde::{Deserialize, Serialize};
use serde::de::DeserializeOwned;
use std::collections::BTreeMap;
use std::collections::HashMap;

/// A source file, plus its parse when the parser has seen it.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct TextFile {
    pub code: String,
    pub parsed: Option<ParsedSource>,
}

impl TextFile {
    pub fn from_code(code: &str) -> Self {
        Self {
            code: code.to_string(),
            parsed: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum ProjectFile {
    Text(TextFile),
    Image { git_blob_sha: Option<String> },
    Asset { git_blob_sha: Option<String> },
}

impl ProjectFile {
    pub fn as_text(&self) -> Option<&TextFile> {
        match self {
            ProjectFile::Text(file) => Some(file),
            _ => None,
        }
    }

    /// The content hash, for file kinds that carry one.
    pub fn git_blob_sha(&self) -> Option<&str> {
        match self {
            ProjectFile::Text(_) => None,
            ProjectFile::Image { git_blob_sha } | ProjectFile::Asset { git_blob_sha } => {
                git_blob_sha.as_deref()
            }
        }
    }
}

/// The whole project, keyed by `/`-rooted path.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ProjectContents {
    files: BTreeMap<String, ProjectFile>,
}

impl ProjectContents {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, path: &str) -> Option<&ProjectFile> {
        self.files.get(path)
    }

    pub fn get_text(&self, path: &str) -> Option<&TextFile> {
        self.get(path).and_then(ProjectFile::as_text)
    }

    pub fn set(&mut self, path: &str, file: ProjectFile) {
        self.files.insert(path.to_string(), file);
    }

    pub fn remove(&mut self, path: &str) -> Option<ProjectFile> {
        self.files.remove(path)
    }

    /// All files in stable path order.
    pub fn walk(&self) -> impl Iterator<Item = (&str, &ProjectFile)> {
        self.files.iter().map(|(path, file)| (path.as_str(), file))
    }

    /// The parsed representations of every text file, in path order.
    pub fn parsed_sources(&self) -> impl Iterator<Item = &ParsedSource> {
        self.files.values().filter_map(|file| match file {
            ProjectFile::Text(text) => text.parsed.as_ref(),
            _ => None,
        })
    }
}

/// Every UID present across the project's parsed trees. This is the set the
/// canvas snapshots at gesture start for duplicate-UID generation.
pub fn project_uids(contents: &ProjectContents) -> rf_core::UidSet {
    rf_core::get_all_unique_uids(contents.parsed_sources(), None).unwrap_or_default()
}

// ─── Sidecar JSON files ──────────────────────────────────────────────────

/// The parts of `package.json` the import pipeline reads.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct PackageJson {
    #[serde(default)]
    pub dependencies: HashMap<String, String>,
    #[serde(default, rename = "devDependencies")]
    pub dev_dependencies: HashMap<String, String>,
    #[serde(default)]
    pub scripts: HashMap<String, String>,
}

/// Parse a JSON file out of the project.
///
/// # Errors
/// When the file exists but is not valid JSON for `T`.
pub fn get_json_file<T: DeserializeOwned>(
    contents: &ProjectContents,
    path: &str,
) -> Result<Option<T>, String> {
    match contents.get_text(path) {
        None => Ok(None),
        Some(file) => serde_json::from_str(&file.code)
            .map(Some)
            .map_err(|e| format!("Invalid JSON in {path}: {e}")),
    }
}

pub fn package_json(contents: &ProjectContents) -> Result<Option<PackageJson>, String> {
    get_json_file(contents, "/package.json")
}

pub fn package_lock_json(
    contents: &ProjectContents,
) -> Result<Option<serde_json::Value>, String> {
    get_json_file(contents, "/package-lock.json")
}

// ─── Branch payload ──────────────────────────────────────────────────────

/// What a branch load hands to the import pipeline: the file tree plus the
/// commit it was taken from.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BranchContent {
    pub content: ProjectContents,
    pub origin_commit: String,
}
