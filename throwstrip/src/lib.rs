//! Core library for the throwstrip refactoring tool.
//!
//! Removes one checked exception from the `throws` clause of Java methods
//! that match a method pattern, optionally following overrides, and drops
//! the exception's import once nothing references it anymore.
//!
//! The pipeline is: [`tree::parse`] lowers a tree-sitter CST into an
//! immutable [`tree::CompilationUnit`], [`types::TypeIndex`] collects the type
//! hierarchy of every parsed file, [`visitor::ThrowsClauseRewriter`] produces a
//! new tree sharing every untouched node, and [`printer::print`] turns the
//! differences into minimal byte edits on the original text.

// Allow common complexity warnings - these are intentional design choices
#![allow(
    clippy::type_complexity,
    clippy::similar_names,
    clippy::map_unwrap_or,
    clippy::items_after_statements
)]
#![cfg_attr(test, allow(clippy::unwrap_used, clippy::expect_used))]

/// Module defining the command-line interface arguments and structs.
pub mod cli;

/// Module for handling CLI commands and their execution logic.
pub mod commands;

/// Module for loading configuration.
pub mod config;

/// Module containing shared constants and lookup tables.
pub mod constants;

/// Tree-sitter front-end for Java sources.
pub mod cst;

/// Module defining the entry point logic shared by the binaries.
pub mod entry_point;

/// Byte-range rewriting with re-parse verification.
pub mod fix;

/// Import cleanup after a throws entry is removed.
pub mod imports;

/// Method pattern compilation and matching.
pub mod matcher;

/// Module for rich CLI output formatting with colored text and progress bars.
pub mod output;

/// Prints a rewritten tree back to source text.
pub mod printer;

/// The `RemoveMethodThrows` recipe.
pub mod recipe;

/// Precondition gate that skips files without a candidate method.
pub mod search;

/// Immutable Java syntax tree with file-local name attribution.
pub mod tree;

/// Cross-file type hierarchy index.
pub mod types;

/// Module containing utility functions.
pub mod utils;

/// The tree rewriting pass.
pub mod visitor;
