//! # Remediation Module
//!
//! @title Remediation Patch Generator
//! @author Ramprasad
//!
//! Attaches automated patches to findings and writes them to disk.
//!
//! ## Generated Files
//!
//! - One `.patch` file per patched finding (e.g. `001_ci_COMMENT_BODY.patch`)
//! - `remediation.md`, an index of the patches rendered with Handlebars

mod templates;

use crate::catalog;
use crate::patch::{self, DiffRenderer, UnifiedDiffRenderer};
use crate::report::Finding;
use anyhow::{Context, Result};
use handlebars::Handlebars;
use rayon::prelude::*;
use serde::Serialize;
use std::collections::HashMap;
use std::path::{Path, PathBuf};

/// Generator for remediation patches.
///
/// Patch generation is pure, so findings are processed in parallel on the
/// rayon thread pool.
pub struct RemediationGenerator {
    handlebars: Handlebars<'static>,
    renderer: Box<dyn DiffRenderer>,
}

#[derive(Serialize)]
struct IndexData<'a> {
    version: &'static str,
    patches: Vec<PatchEntry<'a>>,
    unpatched: Vec<UnpatchedEntry<'a>>,
}

#[derive(Serialize)]
struct PatchEntry<'a> {
    file_name: String,
    workflow: &'a str,
    line: usize,
    env_name: &'static str,
}

#[derive(Serialize)]
struct UnpatchedEntry<'a> {
    location: &'a str,
    expression: &'a str,
}

impl RemediationGenerator {
    /// Creates a generator with the default diff renderer.
    pub fn new() -> Result<Self> {
        Self::with_renderer(Box::new(UnifiedDiffRenderer))
    }

    /// Creates a generator with a custom diff renderer.
    pub fn with_renderer(renderer: Box<dyn DiffRenderer>) -> Result<Self> {
        let mut handlebars = Handlebars::new();
        handlebars.set_strict_mode(false);
        handlebars.register_escape_fn(handlebars::no_escape);
        handlebars
            .register_template_string(templates::INDEX, templates::INDEX_TEMPLATE)
            .context("failed to register remediation index template")?;

        Ok(Self {
            handlebars,
            renderer,
        })
    }

    /// Generates a patch for every finding and stores it in `Finding::patch`.
    ///
    /// `sources` maps a finding's `file_path` to the workflow text. Findings
    /// without a source, without an available fix, or whose patch would leave
    /// the command itself untouched keep `patch: None`.
    /// Returns the number of findings that received a patch.
    pub fn attach_patches(&self, findings: &mut [Finding], sources: &HashMap<String, String>) -> usize {
        let renderer = self.renderer.as_ref();

        findings
            .par_iter_mut()
            .map(|finding| {
                let Some(content) = sources.get(&finding.file_path) else {
                    log::warn!("No source loaded for {}", finding.file_path);
                    return 0;
                };

                if !patch::fixes_command(finding, content) {
                    log::debug!(
                        "{}: `{}` is outside the rewritable part of its run: block",
                        finding.location,
                        finding.snippet.trim()
                    );
                    return 0;
                }

                let diff = patch::generate_patch_with(renderer, finding, content);
                if diff.is_empty() {
                    return 0;
                }
                finding.patch = Some(diff);
                1
            })
            .sum()
    }

    /// Writes one `.patch` file per patched finding plus `remediation.md`.
    ///
    /// # Returns
    ///
    /// Paths of all written files, the index last.
    pub fn write_all(&self, findings: &[Finding], output_dir: &Path) -> Result<Vec<PathBuf>> {
        std::fs::create_dir_all(output_dir)
            .with_context(|| format!("failed to create {}", output_dir.display()))?;

        let mut written = Vec::new();
        let mut patches = Vec::new();
        let mut unpatched = Vec::new();

        for finding in findings {
            let Some(ref diff) = finding.patch else {
                unpatched.push(UnpatchedEntry {
                    location: &finding.location,
                    expression: finding.snippet.trim(),
                });
                continue;
            };

            let env_name = catalog::classify(&finding.snippet)
                .map(|p| p.env_name)
                .unwrap_or("UNKNOWN");
            let file_name = patch_file_name(patches.len() + 1, &finding.file_path, env_name);
            let path = output_dir.join(&file_name);

            std::fs::write(&path, diff)
                .with_context(|| format!("failed to write {}", path.display()))?;
            written.push(path);

            patches.push(PatchEntry {
                file_name,
                workflow: &finding.file_path,
                line: finding.line,
                env_name,
            });
        }

        let data = IndexData {
            version: env!("CARGO_PKG_VERSION"),
            patches,
            unpatched,
        };
        let index = self
            .handlebars
            .render(templates::INDEX, &data)
            .context("failed to render remediation index")?;

        let index_path = output_dir.join("remediation.md");
        std::fs::write(&index_path, index)
            .with_context(|| format!("failed to write {}", index_path.display()))?;
        written.push(index_path);

        Ok(written)
    }
}

/// Builds `NNN_<workflow stem>_<ENV_NAME>.patch`.
fn patch_file_name(index: usize, workflow: &str, env_name: &str) -> String {
    let stem = Path::new(workflow)
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "workflow".to_string());
    let stem: String = stem
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() || c == '-' { c } else { '_' })
        .collect();

    format!("{:03}_{}_{}.patch", index, stem, env_name)
}
