//! # Actions-Sentinel CLI Entry Point
//!
//! @title Actions-Sentinel CLI
//! @author Ramprasad
//!
//! This module provides the main entry point for the Actions-Sentinel
//! command-line security scanner.

use actions_sentinel::cli::Commands;
use actions_sentinel::parser::{collect_workflow_files, parse_workflow_file, repository_root};
use actions_sentinel::patch::{fixes_command, generate_patch};
use actions_sentinel::remediation::RemediationGenerator;
use actions_sentinel::report::Finding;
use actions_sentinel::{catalog, Cli, DetectorRegistry, Report, Severity};
use anyhow::{Context, Result};
use clap::Parser;
use colored::*;
use std::collections::HashMap;
use std::path::{Path, PathBuf};

/// ASCII art banner displayed at startup.
const BANNER: &str = r#"
    _        _   _                   ____             _   _            _
   / \   ___| |_(_) ___  _ __  ___  / ___|  ___ _ __ | |_(_)_ __   ___| |
  / _ \ / __| __| |/ _ \| '_ \/ __| \___ \ / _ \ '_ \| __| | '_ \ / _ \ |
 / ___ \ (__| |_| | (_) | | | \__ \  ___) |  __/ | | | |_| | | | |  __/ |
/_/   \_\___|\__|_|\___/|_| |_|___/ |____/ \___|_| |_|\__|_|_| |_|\___|_|

            GitHub Actions Script Injection Scanner
"#;

/// Options of the `scan` subcommand.
struct ScanOptions {
    path: PathBuf,
    recursive: bool,
    format: String,
    fix: bool,
    output: Option<PathBuf>,
    min_severity: Option<String>,
    exclude: Vec<String>,
    only: Vec<String>,
}

/// Workflows loaded by a scan, keyed by their repository-relative path.
struct ScanResult {
    findings: Vec<Finding>,
    sources: HashMap<String, String>,
    files_analyzed: usize,
}

/// Application entry point.
///
/// Initializes the logging system, parses command-line arguments, and
/// dispatches to the appropriate command handler. The banner is only shown
/// for human-readable output so that JSON and diffs can be piped.
fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Scan {
            path,
            recursive,
            format,
            fix,
            output,
            severity,
            exclude,
            only,
        } => {
            if format == "terminal" {
                println!("{}", BANNER.cyan().bold());
            }
            run_scan(ScanOptions {
                path,
                recursive,
                format,
                fix,
                output,
                min_severity: severity,
                exclude,
                only,
            })?;
        }
        Commands::Patch {
            file,
            line,
            snippet,
            path,
        } => {
            if !run_patch(&file, line, &snippet, path)? {
                std::process::exit(1);
            }
        }
        Commands::List => {
            println!("{}", BANNER.cyan().bold());
            list_detectors();
        }
        Commands::Version => {
            println!(
                "{} {}",
                "Actions-Sentinel version:".green(),
                env!("CARGO_PKG_VERSION").yellow()
            );
        }
    }

    Ok(())
}

/// Executes the security scan operation.
///
/// 1. Collects workflow files from the specified path
/// 2. Runs all registered vulnerability detectors
/// 3. Filters findings by severity and detector
/// 4. Optionally generates remediation patches
/// 5. Emits the report in the specified format
fn run_scan(options: ScanOptions) -> Result<()> {
    if options.format == "terminal" {
        println!(
            "{} {}",
            "[*] Scanning:".green().bold(),
            options.path.display().to_string().yellow()
        );
    }

    let ScanResult {
        findings,
        sources,
        files_analyzed,
    } = perform_scan(&options.path, options.recursive, options.format == "terminal")?;

    let mut findings = filter_findings(findings, &options);

    if options.fix && !findings.is_empty() {
        let generator = RemediationGenerator::new()?;
        let patched = generator.attach_patches(&mut findings, &sources);
        log::info!("Generated {} patch(es) for {} finding(s)", patched, findings.len());

        if let Some(ref out_path) = options.output {
            let written = generator.write_all(&findings, out_path)?;
            if options.format == "terminal" {
                println!("\n{}", "[+] Remediation files:".magenta().bold());
                for file in written {
                    println!("    -> {}", file.display().to_string().yellow());
                }
            }
        }
    }

    let report = Report::new(findings, options.path.clone(), files_analyzed);

    match options.format.as_str() {
        "json" => {
            let json = serde_json::to_string_pretty(&report)?;
            write_or_print(&json, options.output.as_deref(), "security_report.json")?;
        }
        "markdown" => {
            let md = report.to_markdown();
            write_or_print(&md, options.output.as_deref(), "security_report.md")?;
        }
        "github" => {
            print!("{}", report.to_github_annotations());
        }
        _ => {
            report.print_terminal();
            println!("\n{}", "=".repeat(60).cyan());
            report.print_summary();
        }
    }

    Ok(())
}

/// Writes a report into `output` when given, otherwise prints it.
fn write_or_print(content: &str, output: Option<&Path>, file_name: &str) -> Result<()> {
    let Some(out_path) = output else {
        println!("{}", content);
        return Ok(());
    };

    std::fs::create_dir_all(out_path)
        .with_context(|| format!("failed to create {}", out_path.display()))?;
    let report_path = out_path.join(file_name);
    std::fs::write(&report_path, content)
        .with_context(|| format!("failed to write {}", report_path.display()))?;
    eprintln!(
        "{} {}",
        "[+] Report saved to:".green(),
        report_path.display().to_string().yellow()
    );
    Ok(())
}

/// Applies the `--severity`, `--exclude` and `--only` filters.
fn filter_findings(findings: Vec<Finding>, options: &ScanOptions) -> Vec<Finding> {
    let min = options.min_severity.as_deref().map(Severity::parse);
    let exclude: Vec<String> = options.exclude.iter().map(|s| s.to_uppercase()).collect();
    let only: Vec<String> = options.only.iter().map(|s| s.to_uppercase()).collect();

    findings
        .into_iter()
        .filter(|f| min.map_or(true, |min| f.severity >= min))
        .filter(|f| !exclude.contains(&f.detector_id.to_uppercase()))
        .filter(|f| only.is_empty() || only.contains(&f.detector_id.to_uppercase()))
        .collect()
}

/// Loads every workflow under `path` and runs the detectors on it.
fn perform_scan(path: &Path, recursive: bool, show_progress: bool) -> Result<ScanResult> {
    use indicatif::{ProgressBar, ProgressStyle};

    let root = repository_root(path);
    let files = collect_workflow_files(path, recursive)?;

    let mut result = ScanResult {
        findings: Vec::new(),
        sources: HashMap::new(),
        files_analyzed: 0,
    };

    if files.is_empty() {
        log::warn!("No workflow files found under {}", path.display());
        return Ok(result);
    }

    let pb = if show_progress {
        ProgressBar::new(files.len() as u64)
    } else {
        ProgressBar::hidden()
    };
    pb.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} {msg}")?
            .progress_chars("=>-"),
    );

    let registry = DetectorRegistry::new();

    for file_path in &files {
        pb.set_message(format!(
            "Analyzing {}",
            file_path.file_name().unwrap_or_default().to_string_lossy()
        ));

        match parse_workflow_file(file_path, &root) {
            Ok(context) => {
                result.findings.extend(registry.run_all(&context));
                result.sources.insert(context.file_path, context.source_code);
                result.files_analyzed += 1;
            }
            Err(e) => {
                log::warn!("Failed to read {}: {:#}", file_path.display(), e);
            }
        }

        pb.inc(1);
    }

    pb.finish_and_clear();
    Ok(result)
}

/// Prints the patch for a single finding.
///
/// Returns `false` when no remediation is available.
fn run_patch(file: &Path, line: usize, snippet: &str, path: Option<String>) -> Result<bool> {
    let content = std::fs::read_to_string(file)
        .with_context(|| format!("failed to read workflow {}", file.display()))?;

    let path = path.unwrap_or_else(|| {
        let root = repository_root(file);
        pathdiff::diff_paths(file, &root)
            .unwrap_or_else(|| file.to_path_buf())
            .to_string_lossy()
            .replace('\\', "/")
    });

    let finding = Finding::script_injection(&path, snippet, line);
    let diff = generate_patch(&finding, &content);

    if diff.is_empty() {
        eprintln!(
            "{}",
            format!(
                "[!] No automated remediation available for `{}` at {}:{}",
                snippet.trim(),
                path,
                line
            )
            .yellow()
        );
        return Ok(false);
    }

    if !fixes_command(&finding, &content) {
        eprintln!(
            "{}",
            format!(
                "[!] `{}` follows a blank or comment line in the run: block at {}:{} and is left in place; only the env: declaration is added",
                snippet.trim(),
                path,
                line
            )
            .yellow()
        );
    }

    print!("{}", diff);
    Ok(true)
}

/// Displays all available detectors and the expressions they flag.
fn list_detectors() {
    let registry = DetectorRegistry::new();

    println!("{}", "[*] Available Vulnerability Detectors:".green().bold());
    println!("{}", "-".repeat(60).cyan());

    for detector in registry.detectors() {
        println!(
            "  {} {} [{}]",
            detector.id().cyan().bold(),
            detector.name().white(),
            format!("{:?}", detector.severity()).yellow()
        );
        println!("     {}", detector.description().dimmed());
        println!();
    }

    println!("{}", "[*] Untrusted Expressions:".green().bold());
    println!("{}", "-".repeat(60).cyan());

    for pattern in catalog::catalog() {
        println!(
            "  {} {}",
            format!("{:<20}", pattern.env_name).cyan(),
            pattern.display_fragment().dimmed()
        );
    }
}
