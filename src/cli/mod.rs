//! # CLI Module
//!
//! @title Command Line Interface
//! @author Ramprasad
//!
//! This module defines the command-line interface for Actions-Sentinel using
//! the `clap` derive macros for declarative argument parsing.
//!
//! ## Commands
//!
//! - `scan` - Analyze workflows for script injection and suggest patches
//! - `patch` - Generate the remediation patch for a single finding
//! - `list` - Display detectors and the untrusted expression catalog
//! - `version` - Show version information

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Actions-Sentinel command-line interface.
///
/// A security scanner for GitHub Actions workflows. Detects script
/// injection through untrusted context values and generates patches that
/// move them into environment variables.
#[derive(Parser, Debug)]
#[command(name = "actions-sentinel")]
#[command(author = "RamprasadGoud")]
#[command(version)]
#[command(about = "Script injection scanner and fixer for GitHub Actions workflows")]
#[command(long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// The subcommand to execute.
    #[command(subcommand)]
    pub command: Commands,
}

/// Available subcommands for the Actions-Sentinel CLI.
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Scan workflows for security vulnerabilities.
    ///
    /// Looks for `.github/workflows/*.yml` files under the given path and
    /// reports untrusted expressions used inside `run:` commands.
    Scan {
        /// Repository root or a single workflow file.
        #[arg(value_name = "PATH")]
        path: PathBuf,

        /// Also scan workflows of nested repositories.
        ///
        /// Without this flag only `<PATH>/.github/workflows` is read.
        #[arg(short, long)]
        recursive: bool,

        /// Output format for the security report.
        ///
        /// Supported formats:
        /// - `terminal`: Colorized console output (default)
        /// - `json`: Machine-readable JSON format
        /// - `markdown`: Human-readable Markdown report
        /// - `github`: GitHub Actions annotations
        #[arg(short, long, default_value = "terminal")]
        format: String,

        /// Generate a remediation patch for each finding.
        #[arg(long)]
        fix: bool,

        /// Output directory for reports and patch files.
        ///
        /// If not specified, everything is printed to stdout.
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Minimum severity level to include in results.
        ///
        /// Valid values: critical, high, medium, low, info
        #[arg(short, long)]
        severity: Option<String>,

        /// Exclude specific detectors from the scan.
        ///
        /// Comma-separated list of detector IDs to skip.
        #[arg(short = 'x', long, value_delimiter = ',')]
        exclude: Vec<String>,

        /// Include only specific detectors in the scan.
        ///
        /// Comma-separated list of detector IDs to run.
        #[arg(long, value_delimiter = ',')]
        only: Vec<String>,
    },

    /// Generate the remediation patch for one script injection.
    ///
    /// Prints a unified diff that can be applied with `git apply`.
    Patch {
        /// Workflow file containing the injection.
        #[arg(value_name = "FILE")]
        file: PathBuf,

        /// 1-based line of the `run:` key using the expression.
        #[arg(short, long)]
        line: usize,

        /// The dangerous expression, e.g. `github.event.issue.title`.
        #[arg(long)]
        snippet: String,

        /// Path written in the diff headers.
        ///
        /// Defaults to the file path relative to its repository root.
        #[arg(long)]
        path: Option<String>,
    },

    /// List detectors and the untrusted expression catalog.
    List,

    /// Print version information.
    Version,
}
