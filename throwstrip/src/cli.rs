use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

/// Help text for configuration file options, shown at the bottom of --help.
const CONFIG_HELP: &str = "\
METHOD PATTERNS:
  <declaring type> <method name>(<argument types>)

  com.example.Service fetch(..)          any arguments
  com.example.Service fetch(String, int) exact arguments (java.lang may be omitted)
  com.example..* *(..)                   every method of every type below com.example
  com.example.Service <constructor>(..)  constructors
  com.example.Outer$Inner run()          nested types use `$`

CONFIGURATION FILE (.throwstrip.toml):
  Create this file in your project root to set defaults.
  Command line flags override the file.

  [throwstrip]
  method_pattern = \"com.example.Service fetch(..)\"
  exception_type = \"java.io.IOException\"
  match_overrides = true     # Also rewrite overriding methods

  # Path filters
  exclude_folders = [\"generated\"]
  include_folders = [\"build\"]  # Force-include these
";

/// Options for output formatting and verbosity.
#[derive(Args, Debug, Default, Clone)]
#[allow(clippy::struct_excessive_bools)] // CLI flags are legitimately booleans
pub struct OutputOptions {
    /// Output raw JSON.
    #[arg(long)]
    pub json: bool,

    /// Enable verbose output for debugging (shows the compiled pattern and debug logs).
    #[arg(short, long)]
    pub verbose: bool,

    /// Quiet mode: show only the summary line (no detailed tables).
    #[arg(long, short = 'q')]
    pub quiet: bool,
}

/// Shared path arguments (mutually exclusive paths/root).
#[derive(Args, Debug, Default, Clone)]
pub struct PathArgs {
    /// Paths to rewrite (Java files or directories).
    /// When no paths are provided, defaults to the current directory.
    /// Cannot be used with --root.
    #[arg(conflicts_with = "root")]
    pub paths: Vec<PathBuf>,

    /// Project root for path containment.
    /// When specified, this path is used as both the target AND the
    /// containment boundary for rewritten files.
    /// Cannot be used together with positional path arguments.
    #[arg(long, conflicts_with = "paths")]
    pub root: Option<PathBuf>,
}

/// Recipe options. Unset values fall back to the configuration file.
#[derive(Args, Debug, Default, Clone)]
pub struct RecipeArgs {
    /// Method signature pattern, e.g. `com.example.Service fetch(..)`.
    #[arg(long, short = 'm')]
    pub method_pattern: Option<String>,

    /// Fully-qualified exception type to remove, e.g. `java.io.IOException`.
    #[arg(long, short = 'e')]
    pub exception_type: Option<String>,

    /// Only rewrite methods declared directly on a matching type.
    #[arg(long)]
    pub no_match_overrides: bool,
}

/// Command line interface configuration using `clap`.
/// This struct defines the arguments and flags accepted by the program.
#[derive(Parser, Debug)]
#[command(
    author,
    version,
    about = "throwstrip - remove an exception from the throws clause of matching Java methods",
    long_about = None,
    after_help = CONFIG_HELP
)]
pub struct Cli {
    #[command(subcommand)]
    /// The subcommand to execute.
    pub command: Option<Commands>,

    /// Global path options (paths vs root).
    #[command(flatten)]
    pub paths: PathArgs,

    /// Recipe options.
    #[command(flatten)]
    pub recipe: RecipeArgs,

    /// Output formatting options.
    #[command(flatten)]
    pub output: OutputOptions,

    /// Folders to exclude from the walk.
    #[arg(long = "exclude", aliases = ["exclude-folder", "exclude-folders"])]
    pub exclude_folders: Vec<String>,

    /// Folders to force-include (overrides default exclusions).
    #[arg(long = "include", aliases = ["include-folder", "include-folders"])]
    pub include_folders: Vec<String>,

    /// Show what would change without writing any file.
    #[arg(long, short = 'n')]
    pub dry_run: bool,
}

#[derive(Subcommand, Debug)]
/// Available subcommands.
pub enum Commands {
    /// Write a starter .throwstrip.toml into the current directory
    Init,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_recipe_flags() {
        let cli = Cli::try_parse_from([
            "throwstrip",
            "--method-pattern",
            "p.A foo(..)",
            "-e",
            "java.io.IOException",
            "--no-match-overrides",
            "--dry-run",
            "src",
        ])
        .unwrap();
        assert_eq!(cli.recipe.method_pattern.as_deref(), Some("p.A foo(..)"));
        assert_eq!(
            cli.recipe.exception_type.as_deref(),
            Some("java.io.IOException")
        );
        assert!(cli.recipe.no_match_overrides);
        assert!(cli.dry_run);
        assert_eq!(cli.paths.paths, vec![PathBuf::from("src")]);
    }

    #[test]
    fn test_paths_conflict_with_root() {
        let result = Cli::try_parse_from(["throwstrip", "--root", "a", "b"]);
        assert!(result.is_err());
    }

    #[test]
    fn test_init_subcommand() {
        let cli = Cli::try_parse_from(["throwstrip", "init"]).unwrap();
        assert!(matches!(cli.command, Some(Commands::Init)));
    }
}
