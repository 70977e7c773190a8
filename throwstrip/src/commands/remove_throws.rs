//! Throws-clause removal across a source tree.

use crate::output;
use crate::recipe::{CompiledRecipe, RemoveMethodThrows, SourceOutcome};
use crate::tree::{self, CompilationUnit, ParseError};
use crate::types::TypeIndex;
use crate::utils::{
    collect_java_files_gitignore, normalize_display_path, validate_path_within_root, LineIndex,
};

use anyhow::Result;
use colored::Colorize;
use rayon::prelude::*;
use serde::Serialize;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Options for a throws removal run
#[derive(Debug, Default, Clone)]
#[allow(clippy::struct_excessive_bools)]
pub struct RemoveThrowsOptions {
    /// Dry-run mode (report what would change, write nothing)
    pub dry_run: bool,
    /// Verbose output
    pub verbose: bool,
    /// Only print the summary
    pub quiet: bool,
    /// Emit the report as JSON instead of text
    pub json: bool,
    /// Analysis root for path containment
    pub analysis_root: PathBuf,
    /// Extra folders to skip
    pub exclude: Vec<String>,
    /// Folders to walk even when excluded by default
    pub include: Vec<String>,
}

/// One method whose throws clause changed
#[derive(Debug, Clone, Serialize)]
pub struct MethodChange {
    /// Declaring type
    pub type_fqn: String,
    /// Method name
    pub method: String,
    /// 1-indexed line of the declaration
    pub line: usize,
}

/// Result for one rewritten file
#[derive(Debug, Clone, Serialize)]
pub struct FixResult {
    /// File that was (or would be) rewritten
    pub file: String,
    /// Methods that lost the exception
    pub methods: Vec<MethodChange>,
    /// Whether the exception's import was dropped
    pub import_removed: bool,
}

/// A file that could not be processed
#[derive(Debug, Clone, Serialize)]
pub struct FileFailure {
    /// Offending file
    pub file: String,
    /// Reason, as displayed
    pub error: String,
}

/// Everything a run did
#[derive(Debug, Clone, Serialize)]
pub struct RunReport {
    /// The recipe that ran
    pub recipe: RemoveMethodThrows,
    /// Whether files were left untouched
    pub dry_run: bool,
    /// Number of Java files considered
    pub files_scanned: usize,
    /// Files with at least one change
    pub fixed: Vec<FixResult>,
    /// Files that were skipped because of an error
    pub failures: Vec<FileFailure>,
}

impl RunReport {
    /// Total number of methods changed across all files.
    #[must_use]
    pub fn methods_changed(&self) -> usize {
        self.fixed.iter().map(|f| f.methods.len()).sum()
    }
}

struct ParsedFile {
    path: PathBuf,
    source: String,
    unit: Arc<CompilationUnit>,
}

/// Expand the given paths into the Java files to process.
#[must_use]
pub fn collect_files(paths: &[PathBuf], options: &RemoveThrowsOptions) -> Vec<PathBuf> {
    let mut files = Vec::new();
    for path in paths {
        if path.is_dir() {
            let (found, dirs) = collect_java_files_gitignore(path, &options.exclude, &options.include);
            tracing::debug!(root = %path.display(), files = found.len(), dirs, "walked directory");
            files.extend(found);
        } else {
            files.push(path.clone());
        }
    }
    files
}

/// Remove the recipe's exception from every matching method under `paths`.
///
/// All files are parsed before any is rewritten so override matching can see
/// supertypes declared in other files.
///
/// # Errors
///
/// Returns an error if the recipe is invalid or writing output fails. Files
/// that cannot be read, parsed, or written back inside the analysis root are
/// reported in the run's failures instead.
pub fn run_remove_throws<W: Write>(
    recipe: &RemoveMethodThrows,
    paths: &[PathBuf],
    options: &RemoveThrowsOptions,
    mut writer: W,
) -> Result<RunReport> {
    let compiled = recipe.compile()?;
    let files = collect_files(paths, options);
    let text_output = !options.json;

    if options.verbose && text_output {
        writeln!(writer, "[VERBOSE] Pattern: {}", compiled.matcher())?;
        writeln!(writer, "[VERBOSE] Exception: {}", compiled.exception_type())?;
        writeln!(writer, "[VERBOSE] Files to scan: {}", files.len())?;
    }

    let progress = if options.json || options.quiet {
        indicatif::ProgressBar::hidden()
    } else {
        output::create_progress_bar(files.len() as u64)
    };

    let loaded: Vec<(PathBuf, std::result::Result<ParsedFile, LoadError>)> = files
        .par_iter()
        .map(|path| {
            let result = load_file(path);
            progress.inc(1);
            (path.clone(), result)
        })
        .collect();
    progress.finish_and_clear();

    let mut failures = Vec::new();
    let mut parsed = Vec::new();
    for (path, result) in loaded {
        match result {
            Ok(file) => parsed.push(file),
            Err(LoadError::Read(error)) => {
                let display = normalize_display_path(&path);
                if text_output {
                    writeln!(writer, "  {} {}: {}", "Skip:".yellow(), display, error)?;
                }
                failures.push(FileFailure {
                    file: display,
                    error: error.to_string(),
                });
            }
            Err(LoadError::Parse(error)) => {
                let display = normalize_display_path(&path);
                if text_output {
                    writeln!(writer, "  {} {}: {}", "Parse error:".red(), display, error)?;
                }
                failures.push(FileFailure {
                    file: display,
                    error: error.to_string(),
                });
            }
        }
    }

    let index = TypeIndex::build(parsed.iter().map(|f| f.unit.as_ref()));
    if options.verbose && text_output {
        writeln!(writer, "[VERBOSE] Indexed types: {}", index.len())?;
    }

    let outcomes: Vec<(&ParsedFile, std::result::Result<SourceOutcome, String>)> = parsed
        .par_iter()
        .map(|file| {
            let outcome = compiled
                .rewrite_parsed(&file.source, &file.unit, &index)
                .map_err(|e| e.to_string());
            (file, outcome)
        })
        .collect();

    if options.dry_run && text_output {
        writeln!(
            writer,
            "\n{}",
            "[DRY-RUN] Methods that would change:".yellow()
        )?;
    }

    let mut fixed = Vec::new();
    for (file, outcome) in outcomes {
        let display = normalize_display_path(&file.path);
        let outcome = match outcome {
            Ok(outcome) => outcome,
            Err(error) => {
                if text_output {
                    writeln!(writer, "  {} {}: {}", "Skip:".yellow(), display, error)?;
                }
                failures.push(FileFailure {
                    file: display,
                    error,
                });
                continue;
            }
        };
        if !outcome.changed() {
            continue;
        }

        match apply_outcome(&mut writer, file, &outcome, &compiled, options) {
            Ok(result) => fixed.push(result),
            Err(error) => {
                if text_output {
                    writeln!(writer, "  {} {}: {}", "Skip:".yellow(), display, error)?;
                }
                failures.push(FileFailure {
                    file: display,
                    error: error.to_string(),
                });
            }
        }
    }

    let report = RunReport {
        recipe: recipe.clone(),
        dry_run: options.dry_run,
        files_scanned: files.len(),
        fixed,
        failures,
    };

    if options.json {
        serde_json::to_writer_pretty(&mut writer, &report)?;
        writeln!(writer)?;
    } else {
        output::print_summary(&mut writer, &report, options.quiet)?;
    }

    Ok(report)
}

enum LoadError {
    Read(std::io::Error),
    Parse(ParseError),
}

fn load_file(path: &Path) -> std::result::Result<ParsedFile, LoadError> {
    let source = fs::read_to_string(path).map_err(LoadError::Read)?;
    let unit = tree::parse(&source).map_err(LoadError::Parse)?;
    Ok(ParsedFile {
        path: path.to_path_buf(),
        source,
        unit: Arc::new(unit),
    })
}

fn apply_outcome<W: Write>(
    writer: &mut W,
    file: &ParsedFile,
    outcome: &SourceOutcome,
    compiled: &CompiledRecipe,
    options: &RemoveThrowsOptions,
) -> Result<FixResult> {
    let display = normalize_display_path(&file.path);
    let lines = LineIndex::new(&file.source);
    let methods: Vec<MethodChange> = outcome
        .log
        .removals
        .iter()
        .map(|removal| MethodChange {
            type_fqn: removal.type_fqn.clone(),
            method: removal.method.clone(),
            line: lines.line_index(removal.span.start),
        })
        .collect();

    if options.dry_run {
        if !options.json {
            for change in &methods {
                writeln!(
                    writer,
                    "  Would remove {} from {}.{} at {}:{}",
                    compiled.exception_type(),
                    change.type_fqn,
                    change.method,
                    display,
                    change.line
                )?;
            }
        }
    } else {
        let target = validate_path_within_root(&file.path, &options.analysis_root)?;
        fs::write(&target, &outcome.source)?;
        if !options.json && !options.quiet {
            writeln!(
                writer,
                "  {} {} ({} methods)",
                "Fixed:".green(),
                display,
                methods.len()
            )?;
        }
    }

    if options.verbose && !options.json {
        for change in &methods {
            writeln!(
                writer,
                "[VERBOSE]   {}.{} (line {})",
                change.type_fqn, change.method, change.line
            )?;
        }
        if outcome.log.import_removed {
            writeln!(writer, "[VERBOSE]   import {} removed", compiled.exception_type())?;
        }
    }

    Ok(FixResult {
        file: display,
        methods,
        import_removed: outcome.log.import_removed,
    })
}
