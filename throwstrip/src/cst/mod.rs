//! CST (Concrete Syntax Tree) module for Java sources.
//!
//! This module provides Tree-sitter based CST parsing for:
//! - Precise byte-range extraction of declarations and clauses
//! - Grammar field names, so lowering can address `name`, `body`, `parameters`
//! - Syntax error detection before any rewrite is attempted
//!
//! # Design Principles
//!
//! - **CST is owned**: nodes are copied out of tree-sitter, no lifetimes leak
//! - **Byte-range anchored**: every later edit is expressed in CST byte offsets

mod parser;

pub use parser::{CstError, CstNode, CstParser, CstTree, Point};
