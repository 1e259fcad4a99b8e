//! # Actions-Sentinel Library
//!
//! @title Actions-Sentinel - GitHub Actions Script Injection Scanner
//! @author Ramprasad
//!
//! A static analysis library for GitHub Actions workflows.
//!
//! This library detects untrusted context values (issue titles, branch
//! names, commit messages, ...) expanded directly inside `run:` commands and
//! generates unified diffs that move them into environment variables.
//!
//! ## Modules
//!
//! - [`cli`] - Command-line interface definitions and argument parsing
//! - [`catalog`] - Untrusted expression catalog
//! - [`workflow`] - Line-oriented workflow model and anchor discovery
//! - [`patch`] - Remediation patch generation
//! - [`parser`] - Workflow file discovery and `run:` block extraction
//! - [`detectors`] - Vulnerability detection implementations
//! - [`report`] - Report generation in multiple formats
//! - [`remediation`] - Parallel patch generation and patch files
//!
//! ## Example
//!
//! ```rust,ignore
//! use actions_sentinel::{DetectorRegistry, patch::generate_patch};
//! use actions_sentinel::parser::parse_workflow_file;
//!
//! let context = parse_workflow_file(Path::new(".github/workflows/ci.yml"), Path::new("."))?;
//! let registry = DetectorRegistry::new();
//! for finding in registry.run_all(&context) {
//!     println!("{}", generate_patch(&finding, &context.source_code));
//! }
//! ```

pub mod catalog;
pub mod cli;
pub mod detectors;
pub mod parser;
pub mod patch;
pub mod remediation;
pub mod report;
pub mod workflow;

pub use cli::Cli;
pub use detectors::DetectorRegistry;
pub use parser::WorkflowContext;
pub use patch::{generate_patch, PatchError};
pub use report::{Finding, Report, Severity};
