//! Commands module - CLI subcommand implementations.

mod init;
mod remove_throws;

pub use init::{run_init, run_init_in, DEFAULT_CONFIG};
pub use remove_throws::{
    collect_files, run_remove_throws, FileFailure, FixResult, MethodChange, RemoveThrowsOptions,
    RunReport,
};
