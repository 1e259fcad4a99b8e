//! # Parser Module
//!
//! @title Workflow File Loader
//! @author Ramprasad
//!
//! Locates GitHub Actions workflow files in a repository and loads them into
//! an [`WorkflowContext`] for the detectors. Workflows are not parsed as YAML;
//! `run:` blocks are extracted by indentation.
//!
//! ## Submodules
//!
//! - [`run_parser`] - `run:` block extraction
//!
//! ## Key Types
//!
//! - [`WorkflowContext`] - A loaded workflow and its run blocks
//! - [`RunBlock`] - One `run:` command with its body lines

mod run_parser;

pub use run_parser::{extract_run_blocks, RunBlock};

use anyhow::{Context, Result};
use glob::{MatchOptions, Pattern};
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// Glob patterns selecting workflow files, relative to the scan root.
const WORKFLOW_GLOBS: &[&str] = &["**/.github/workflows/*.yml", "**/.github/workflows/*.yaml"];

/// Directories never descended into during recursive scans.
const SKIPPED_DIRS: &[&str] = &[".git", "target", "node_modules", "vendor"];

/// Complete analysis context for one workflow file.
///
/// # Example
///
/// ```rust,ignore
/// let context = WorkflowContext::from_source(".github/workflows/ci.yml", source);
/// for block in &context.run_blocks {
///     println!("run: at line {}", block.line);
/// }
/// ```
#[derive(Debug, Clone)]
pub struct WorkflowContext {
    /// Repository-relative path to the workflow file.
    pub file_path: String,

    /// Raw workflow text.
    pub source_code: String,

    /// Every `run:` block in the workflow.
    pub run_blocks: Vec<RunBlock>,
}

impl WorkflowContext {
    /// Creates a new analysis context from workflow text.
    pub fn from_source(file_path: &str, source_code: String) -> Self {
        let run_blocks = extract_run_blocks(&source_code);

        Self {
            file_path: file_path.to_string(),
            source_code,
            run_blocks,
        }
    }
}

/// Reads a workflow file into a context.
///
/// The stored path is made relative to `root` so that generated patches
/// apply from the repository root.
///
/// # Errors
///
/// Returns an error if the file cannot be read as UTF-8.
pub fn parse_workflow_file(path: &Path, root: &Path) -> Result<WorkflowContext> {
    let source = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read workflow {}", path.display()))?;

    let relative = pathdiff::diff_paths(path, root).unwrap_or_else(|| path.to_path_buf());
    let file_path = relative.to_string_lossy().replace('\\', "/");

    Ok(WorkflowContext::from_source(&file_path, source))
}

/// Returns the repository root for a scan target.
///
/// For a path inside `.github/workflows`, this is the directory holding
/// `.github`. Otherwise the target itself (directory) or its parent (file).
pub fn repository_root(target: &Path) -> PathBuf {
    for ancestor in target.ancestors() {
        if ancestor.file_name().is_some_and(|name| name == ".github") {
            if let Some(parent) = ancestor.parent() {
                return parent.to_path_buf();
            }
        }
    }

    if target.is_file() {
        target.parent().map(Path::to_path_buf).unwrap_or_default()
    } else {
        target.to_path_buf()
    }
}

/// Collects workflow files under `root`.
///
/// A file passed directly is always returned. For directories, a
/// non-recursive scan only looks at `<root>/.github/workflows`; a recursive
/// scan also finds workflows of nested repositories.
pub fn collect_workflow_files(root: &Path, recursive: bool) -> Result<Vec<PathBuf>> {
    if root.is_file() {
        return Ok(vec![root.to_path_buf()]);
    }

    let patterns = WORKFLOW_GLOBS
        .iter()
        .map(|glob| Pattern::new(glob))
        .collect::<Result<Vec<_>, _>>()
        .context("invalid workflow glob")?;
    let options = MatchOptions {
        require_literal_separator: true,
        ..MatchOptions::new()
    };

    let walker = if recursive {
        WalkDir::new(root)
    } else {
        WalkDir::new(root.join(".github").join("workflows")).max_depth(1)
    };

    let mut files: Vec<PathBuf> = walker
        .into_iter()
        .filter_entry(|e| {
            e.depth() == 0
                || !e.file_type().is_dir()
                || !SKIPPED_DIRS.iter().any(|d| e.file_name() == *d)
        })
        .filter_map(|e| e.ok())
        .filter(|e| e.file_type().is_file())
        .map(|e| e.into_path())
        .filter(|path| {
            let relative = path.strip_prefix(root).unwrap_or(path);
            patterns
                .iter()
                .any(|p| p.matches_path_with(relative, options))
        })
        .collect();

    files.sort();
    log::debug!("found {} workflow file(s) under {}", files.len(), root.display());
    Ok(files)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn repo() -> TempDir {
        let dir = TempDir::new().unwrap();
        let workflows = dir.path().join(".github/workflows");
        fs::create_dir_all(&workflows).unwrap();
        fs::write(workflows.join("ci.yml"), "on: push\n").unwrap();
        fs::write(workflows.join("release.yaml"), "on: push\n").unwrap();
        fs::write(workflows.join("notes.md"), "# notes\n").unwrap();

        let nested = dir.path().join("sub/.github/workflows");
        fs::create_dir_all(&nested).unwrap();
        fs::write(nested.join("nested.yml"), "on: push\n").unwrap();

        let ignored = dir.path().join("node_modules/pkg/.github/workflows");
        fs::create_dir_all(&ignored).unwrap();
        fs::write(ignored.join("dep.yml"), "on: push\n").unwrap();
        dir
    }

    fn names(files: &[PathBuf]) -> Vec<String> {
        files
            .iter()
            .map(|p| p.file_name().unwrap().to_string_lossy().into_owned())
            .collect()
    }

    #[test]
    fn test_collect_non_recursive() {
        let dir = repo();
        let files = collect_workflow_files(dir.path(), false).unwrap();
        assert_eq!(names(&files), vec!["ci.yml", "release.yaml"]);
    }

    #[test]
    fn test_collect_recursive_skips_dependencies() {
        let dir = repo();
        let files = collect_workflow_files(dir.path(), true).unwrap();
        let mut found = names(&files);
        found.sort();
        assert_eq!(found, vec!["ci.yml", "nested.yml", "release.yaml"]);
    }

    #[test]
    fn test_parse_uses_relative_path() {
        let dir = repo();
        let file = dir.path().join(".github/workflows/ci.yml");
        let context = parse_workflow_file(&file, dir.path()).unwrap();
        assert_eq!(context.file_path, ".github/workflows/ci.yml");
        assert_eq!(context.source_code, "on: push\n");
        assert!(context.run_blocks.is_empty());
    }

    #[test]
    fn test_repository_root() {
        let dir = repo();
        let file = dir.path().join(".github/workflows/ci.yml");
        assert_eq!(repository_root(&file), dir.path());
        assert_eq!(repository_root(dir.path()), dir.path());
    }
}
