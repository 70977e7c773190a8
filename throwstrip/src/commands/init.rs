use crate::constants::CONFIG_FILENAME;
use anyhow::{Context, Result};
use std::fs;
use std::io::Write;
use std::path::Path;

/// Template written by `throwstrip init`.
pub const DEFAULT_CONFIG: &str = r#"
[throwstrip]
# Methods to rewrite: `<declaring type> <name>(<args>)`
# Wildcards: `*` in a name, `..` for any package run or any argument list.
method_pattern = "com.example.Service fetch(..)"

# Exception to remove from the throws clause (fully qualified)
exception_type = "java.io.IOException"

# Also rewrite methods that override a matching method
match_overrides = true

# Path filters
exclude_folders = ["target", "build", "out", ".gradle", ".idea"]
include_folders = []       # Force-include these folders even if excluded by default
"#;

/// Executes the init command in the current directory.
///
/// # Errors
///
/// Returns an error if the current directory cannot be read or the file cannot be written.
pub fn run_init<W: Write>(writer: &mut W) -> Result<()> {
    let current_dir = std::env::current_dir().context("Failed to get current directory")?;
    run_init_in(&current_dir, writer)
}

/// Executes the init command in a specific directory.
///
/// An existing configuration file is never overwritten.
///
/// # Errors
///
/// Returns an error if the configuration file cannot be written.
pub fn run_init_in<W: Write>(root: &Path, writer: &mut W) -> Result<()> {
    writeln!(writer, "Initializing throwstrip configuration...")?;

    let config_path = root.join(CONFIG_FILENAME);
    if config_path.exists() {
        writeln!(writer, "  • {CONFIG_FILENAME} already exists - skipping.")?;
    } else {
        let mut file = fs::File::create(&config_path)
            .with_context(|| format!("Failed to create {}", config_path.display()))?;
        writeln!(file, "{}", DEFAULT_CONFIG.trim())?;
        writeln!(
            writer,
            "  • Created {CONFIG_FILENAME} with a starter configuration."
        )?;
    }

    writeln!(writer, "Initialization complete!")?;
    Ok(())
}
