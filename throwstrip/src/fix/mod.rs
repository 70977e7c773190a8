//! Shared fix module for source rewriting.
//!
//! Rewrites never re-print a whole file. The printer turns tree changes into
//! byte-range edits and `ByteRangeRewriter` applies them, so every byte the
//! rewrite does not touch keeps its original formatting.

mod rewriter;

pub use rewriter::{ByteRangeRewriter, Edit, RewriteError};
