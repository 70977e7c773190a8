use crate::cli::{Cli, Commands};
use crate::commands::{run_init, run_remove_throws, RemoveThrowsOptions};
use crate::config::Config;
use crate::recipe::RemoveMethodThrows;
use anyhow::Result;
use clap::Parser;
use colored::Colorize;
use std::path::{Path, PathBuf};

/// Runs throwstrip with the given arguments, writing to stdout.
///
/// # Errors
///
/// Returns an error if the command execution fails.
pub fn run_with_args(args: Vec<String>) -> Result<i32> {
    run_with_args_to(args, &mut std::io::stdout())
}

/// Run throwstrip with the given arguments, writing output to the specified writer.
///
/// This is the testable version of `run_with_args` that allows output capture.
/// Returns the process exit code: 0 on success, 1 on invalid arguments or options.
///
/// # Errors
///
/// Returns an error if writing output fails or a rewritten file cannot be saved.
pub fn run_with_args_to<W: std::io::Write>(args: Vec<String>, writer: &mut W) -> Result<i32> {
    let mut program_args = vec!["throwstrip".to_owned()];
    program_args.extend(args);
    let cli_var = match Cli::try_parse_from(program_args) {
        Ok(c) => c,
        Err(e) => match e.kind() {
            clap::error::ErrorKind::DisplayHelp | clap::error::ErrorKind::DisplayVersion => {
                write!(writer, "{e}")?;
                writer.flush()?;
                return Ok(0);
            }
            _ => {
                eprint!("{e}");
                return Ok(1);
            }
        },
    };

    if cli_var.output.verbose {
        init_tracing();
    }

    if let Some(Commands::Init) = cli_var.command {
        run_init(writer)?;
        return Ok(0);
    }

    let (paths, analysis_root) = match cli_var.paths.root {
        Some(ref root) => (vec![root.clone()], root.clone()),
        None if cli_var.paths.paths.is_empty() => (vec![PathBuf::from(".")], PathBuf::from(".")),
        None => {
            let root = analysis_root_for(&cli_var.paths.paths);
            (cli_var.paths.paths.clone(), root)
        }
    };

    for path in &paths {
        if !path.exists() {
            eprintln!(
                "Error: The file or directory '{}' does not exist.",
                path.display()
            );
            return Ok(1);
        }
    }

    // Load config from the first path
    let config = Config::load_from_path(&paths[0]);
    let settings = config.throwstrip;

    let Some(method_pattern) = cli_var.recipe.method_pattern.or(settings.method_pattern) else {
        eprintln!(
            "{} no method pattern given (use --method-pattern or set method_pattern in .throwstrip.toml)",
            "Error:".red().bold()
        );
        return Ok(1);
    };
    let Some(exception_type) = cli_var.recipe.exception_type.or(settings.exception_type) else {
        eprintln!(
            "{} no exception type given (use --exception-type or set exception_type in .throwstrip.toml)",
            "Error:".red().bold()
        );
        return Ok(1);
    };
    let match_overrides = if cli_var.recipe.no_match_overrides {
        Some(false)
    } else {
        settings.match_overrides
    };

    let recipe = RemoveMethodThrows::new(method_pattern, exception_type, match_overrides);
    if let Err(e) = recipe.validate() {
        eprintln!("{} {e}", "Error:".red().bold());
        return Ok(1);
    }

    let mut exclude = settings.exclude_folders.unwrap_or_default();
    exclude.extend(cli_var.exclude_folders);
    let mut include = settings.include_folders.unwrap_or_default();
    include.extend(cli_var.include_folders);

    if cli_var.output.verbose && !cli_var.output.json {
        eprintln!("[VERBOSE] throwstrip v{}", env!("CARGO_PKG_VERSION"));
        eprintln!("[VERBOSE] Using {} threads", rayon::current_num_threads());
        if let Some(ref path) = config.config_file_path {
            eprintln!("[VERBOSE] Config: {}", path.display());
        }
        eprintln!("[VERBOSE] Global Excludes: {exclude:?}");
        eprintln!();
    }

    if !cli_var.output.json && !cli_var.output.quiet {
        crate::output::print_exclusion_list(writer, &exclude)?;
    }

    let options = RemoveThrowsOptions {
        dry_run: cli_var.dry_run,
        verbose: cli_var.output.verbose,
        quiet: cli_var.output.quiet,
        json: cli_var.output.json,
        analysis_root,
        exclude,
        include,
    };

    run_remove_throws(&recipe, &paths, &options, &mut *writer)?;
    Ok(0)
}

/// Containment root for positional paths: the deepest directory that holds
/// every given file and directory.
fn analysis_root_for(paths: &[PathBuf]) -> PathBuf {
    let mut dirs = paths.iter().map(|path| {
        let path = path.canonicalize().unwrap_or_else(|_| path.clone());
        if path.is_dir() {
            path
        } else {
            path.parent().map_or_else(|| path.clone(), Path::to_path_buf)
        }
    });
    let Some(first) = dirs.next() else {
        return PathBuf::from(".");
    };
    dirs.fold(first, |root, dir| {
        root.ancestors()
            .find(|ancestor| dir.starts_with(ancestor))
            .map(Path::to_path_buf)
            .unwrap_or_default()
    })
}

/// Route library diagnostics to stderr. Respects `RUST_LOG` when set.
fn init_tracing() {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("throwstrip=debug"));
    // A subscriber may already be installed when called more than once in-process.
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn run(args: &[&str]) -> (i32, String) {
        let mut out = Vec::new();
        let code = run_with_args_to(args.iter().map(|s| (*s).to_owned()).collect(), &mut out)
            .unwrap();
        (code, String::from_utf8(out).unwrap())
    }

    #[test]
    fn test_analysis_root_is_common_ancestor() {
        let dir = TempDir::new().unwrap();
        let a = dir.path().join("a");
        let b = dir.path().join("b");
        fs::create_dir_all(&a).unwrap();
        fs::create_dir_all(&b).unwrap();
        fs::write(a.join("A.java"), "class A {}").unwrap();

        let root = analysis_root_for(&[a.join("A.java"), b]);
        assert_eq!(root, dir.path().canonicalize().unwrap());

        let single = analysis_root_for(&[a.join("A.java")]);
        assert_eq!(single, a.canonicalize().unwrap());
    }

    #[test]
    fn test_help_exits_zero() {
        let (code, out) = run(&["--help"]);
        assert_eq!(code, 0);
        assert!(out.contains("--method-pattern"));
    }

    #[test]
    fn test_invalid_pattern_exits_one() {
        let dir = TempDir::new().unwrap();
        let root = dir.path().to_str().unwrap();
        let (code, _) = run(&[
            "--method-pattern",
            "A foo(",
            "--exception-type",
            "java.io.IOException",
            root,
        ]);
        assert_eq!(code, 1);
    }

    #[test]
    fn test_missing_exception_exits_one() {
        let dir = TempDir::new().unwrap();
        let root = dir.path().to_str().unwrap();
        let (code, _) = run(&["--method-pattern", "A foo(..)", root]);
        assert_eq!(code, 1);
    }

    #[test]
    fn test_config_supplies_recipe() {
        let dir = TempDir::new().unwrap();
        fs::write(
            dir.path().join(".throwstrip.toml"),
            "[throwstrip]\nmethod_pattern = \"A foo(..)\"\nexception_type = \"java.io.IOException\"\n",
        )
        .unwrap();
        let file = dir.path().join("A.java");
        fs::write(
            &file,
            "class A {\n    void foo() throws java.io.IOException {}\n}\n",
        )
        .unwrap();

        let (code, _) = run(&["--quiet", dir.path().to_str().unwrap()]);
        assert_eq!(code, 0);
        assert_eq!(
            fs::read_to_string(&file).unwrap(),
            "class A {\n    void foo() {}\n}\n"
        );
    }

    #[test]
    fn test_cli_overrides_config() {
        let dir = TempDir::new().unwrap();
        fs::write(
            dir.path().join(".throwstrip.toml"),
            "[throwstrip]\nmethod_pattern = \"A bar(..)\"\nexception_type = \"java.io.IOException\"\n",
        )
        .unwrap();
        let file = dir.path().join("A.java");
        fs::write(
            &file,
            "class A {\n    void foo() throws java.io.IOException {}\n}\n",
        )
        .unwrap();

        let (code, _) = run(&[
            "--quiet",
            "--method-pattern",
            "A foo(..)",
            dir.path().to_str().unwrap(),
        ]);
        assert_eq!(code, 0);
        assert_eq!(
            fs::read_to_string(&file).unwrap(),
            "class A {\n    void foo() {}\n}\n"
        );
    }
}
