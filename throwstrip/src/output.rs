use crate::commands::RunReport;
use colored::Colorize;
use comfy_table::presets::UTF8_FULL;
use comfy_table::{Attribute, Cell, Color, ContentArrangement, Table};
use indicatif::{ProgressBar, ProgressDrawTarget, ProgressStyle};
use std::io::Write;
use std::time::Duration;

/// Print the exclusion list in styled format.
///
/// # Errors
///
/// Returns an error if writing to the output fails.
pub fn print_exclusion_list(writer: &mut impl Write, folders: &[String]) -> std::io::Result<()> {
    if folders.is_empty() {
        let defaults = crate::constants::DEFAULT_EXCLUDE_FOLDERS();
        let mut sorted_defaults: Vec<&str> = defaults.iter().copied().collect();
        sorted_defaults.sort_unstable();
        writeln!(
            writer,
            "{} {}",
            "[OK] Using default exclusions only:".green(),
            sorted_defaults.join(", ").dimmed()
        )?;
    } else {
        writeln!(writer, "{} {}", "Excluding:".yellow().bold(), folders.join(", "))?;
    }
    Ok(())
}

/// Create a progress bar over the files being parsed.
///
/// In test mode, returns a hidden progress bar to avoid polluting test output.
#[must_use]
pub fn create_progress_bar(total_files: u64) -> ProgressBar {
    if cfg!(test) {
        return ProgressBar::hidden();
    }

    let pb =
        ProgressBar::with_draw_target(Some(total_files), ProgressDrawTarget::stderr_with_hz(20));
    pb.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.cyan} [{bar:40.cyan/blue}] {pos}/{len} files ({percent}%) {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_bar())
            .progress_chars("█▓░"),
    );
    pb.set_message("parsing...");
    pb.enable_steady_tick(Duration::from_millis(100));
    pb.tick();
    pb
}

/// Print the main header with box-drawing characters.
///
/// # Errors
///
/// Returns an error if writing to the output fails.
pub fn print_header(writer: &mut impl Write) -> std::io::Result<()> {
    writeln!(writer)?;
    writeln!(
        writer,
        "{}",
        "╔════════════════════════════════════════╗".cyan()
    )?;
    writeln!(
        writer,
        "{}",
        "║  Throws Clause Removal Results         ║".cyan().bold()
    )?;
    writeln!(
        writer,
        "{}",
        "╚════════════════════════════════════════╝".cyan()
    )?;
    writeln!(writer)?;
    Ok(())
}

fn create_table(headers: Vec<&str>) -> Table {
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_header(headers);
    table
}

/// Print the changed files as a table.
///
/// # Errors
///
/// Returns an error if writing to the output fails.
pub fn print_changes(writer: &mut impl Write, report: &RunReport) -> std::io::Result<()> {
    if report.fixed.is_empty() {
        return Ok(());
    }

    let title = if report.dry_run {
        "Would Change"
    } else {
        "Changed Files"
    };
    writeln!(writer, "\n{}", title.bold().underline())?;

    let mut table = create_table(vec!["File", "Methods", "Import Removed"]);
    for fixed in &report.fixed {
        let methods = fixed
            .methods
            .iter()
            .map(|m| format!("{}.{}", m.type_fqn, m.method))
            .collect::<Vec<_>>()
            .join("\n");
        let import = if fixed.import_removed {
            Cell::new("yes").fg(Color::Green)
        } else {
            Cell::new("no").add_attribute(Attribute::Dim)
        };
        table.add_row(vec![
            Cell::new(&fixed.file).add_attribute(Attribute::Bold),
            Cell::new(methods),
            import,
        ]);
    }

    writeln!(writer, "{table}")?;
    Ok(())
}

/// Print the failures as a table.
///
/// # Errors
///
/// Returns an error if writing to the output fails.
pub fn print_failures(writer: &mut impl Write, report: &RunReport) -> std::io::Result<()> {
    if report.failures.is_empty() {
        return Ok(());
    }

    writeln!(writer, "\n{}", "Skipped Files".bold().underline().red())?;

    let mut table = create_table(vec!["File", "Error"]);
    for failure in &report.failures {
        table.add_row(vec![
            Cell::new(&failure.file).add_attribute(Attribute::Bold),
            Cell::new(&failure.error).fg(Color::Red),
        ]);
    }

    writeln!(writer, "{table}")?;
    Ok(())
}

/// Print summary with colored "pills".
///
/// # Errors
///
/// Returns an error if writing to the output fails.
pub fn print_summary_pills(writer: &mut impl Write, report: &RunReport) -> std::io::Result<()> {
    fn pill(label: &str, count: usize) -> String {
        if count == 0 {
            format!("{}: {}", label, count.to_string().dimmed())
        } else {
            format!("{}: {}", label, count.to_string().green().bold())
        }
    }

    let imports = report.fixed.iter().filter(|f| f.import_removed).count();
    let failures = if report.failures.is_empty() {
        format!("Failures: {}", "0".dimmed())
    } else {
        format!(
            "Failures: {}",
            report.failures.len().to_string().red().bold()
        )
    };

    writeln!(
        writer,
        "Files scanned: {}  {}  {}  {}  {}",
        report.files_scanned.to_string().bold(),
        pill("Changed", report.fixed.len()),
        pill("Methods", report.methods_changed()),
        pill("Imports removed", imports),
        failures,
    )?;
    writeln!(writer)?;
    Ok(())
}

/// Print the end-of-run report. Quiet mode prints a one-line recap instead of tables.
///
/// # Errors
///
/// Returns an error if writing to the output fails.
pub fn print_summary(
    writer: &mut impl Write,
    report: &RunReport,
    quiet: bool,
) -> std::io::Result<()> {
    if quiet {
        writeln!(
            writer,
            "\n[SUMMARY] {} methods in {} files, {} skipped",
            report.methods_changed(),
            report.fixed.len(),
            report.failures.len()
        )?;
        return Ok(());
    }

    print_header(writer)?;
    if report.fixed.is_empty() && report.failures.is_empty() {
        writeln!(
            writer,
            "{}",
            format!(
                "✓ No method throws {} matching {}",
                report.recipe.exception_type, report.recipe.method_pattern
            )
            .green()
        )?;
    }
    print_changes(writer, report)?;
    print_failures(writer, report)?;
    writeln!(writer)?;
    print_summary_pills(writer, report)?;
    Ok(())
}
