//! Byte-range safe code rewriter.
//!
//! Edits are expressed as byte ranges of the original source and applied
//! back to front, so every range stays valid while earlier text is replaced.
//!
//! # Usage
//!
//! ```
//! use throwstrip::fix::{ByteRangeRewriter, Edit};
//!
//! let source = "void foo() throws IOException {}";
//! let mut rewriter = ByteRangeRewriter::new(source);
//! rewriter.add_edit(Edit::delete(10, 29));
//! let fixed = rewriter.apply().expect("should apply");
//! assert_eq!(fixed, "void foo() {}");
//! ```

use crate::cst::{CstError, CstParser};
use thiserror::Error;

/// A single edit operation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Edit {
    /// Start byte offset (inclusive)
    pub start_byte: usize,
    /// End byte offset (exclusive)
    pub end_byte: usize,
    /// Replacement content
    pub replacement: String,
    /// Optional description for logging
    pub description: Option<String>,
}

impl Edit {
    /// Create a new edit
    #[must_use]
    pub fn new(start_byte: usize, end_byte: usize, replacement: impl Into<String>) -> Self {
        Self {
            start_byte,
            end_byte,
            replacement: replacement.into(),
            description: None,
        }
    }

    /// Create a deletion edit
    #[must_use]
    pub fn delete(start_byte: usize, end_byte: usize) -> Self {
        Self::new(start_byte, end_byte, "")
    }

    /// Attach a description, shown in trace logs
    #[must_use]
    pub fn describe(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Check if this edit overlaps with another
    #[must_use]
    pub const fn overlaps(&self, other: &Self) -> bool {
        self.start_byte < other.end_byte && other.start_byte < self.end_byte
    }
}

/// Error during rewriting
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RewriteError {
    /// Two or more edits have overlapping ranges
    #[error("Overlapping edits at indices {edit_a} and {edit_b}")]
    OverlappingEdits {
        /// Index of first overlapping edit
        edit_a: usize,
        /// Index of second overlapping edit
        edit_b: usize,
    },
    /// Edit range is out of bounds
    #[error("Edit {edit_index} out of bounds: end_byte {end_byte} > source length {source_len}")]
    OutOfBounds {
        /// Index of the bad edit
        edit_index: usize,
        /// End byte of the edit
        end_byte: usize,
        /// Length of the source
        source_len: usize,
    },
    /// Edit boundary falls inside a multi-byte character
    #[error("Edit {edit_index} does not start and end on a character boundary")]
    NotCharBoundary {
        /// Index of the bad edit
        edit_index: usize,
    },
    /// The rewritten source no longer parses
    #[error("Rewritten source has a syntax error at line {line}, column {column}")]
    InvalidSyntax {
        /// 1-indexed line
        line: usize,
        /// 1-indexed column
        column: usize,
    },
    /// The verification parser could not run
    #[error("Could not verify rewritten source: {0}")]
    Verification(String),
}

impl From<CstError> for RewriteError {
    fn from(err: CstError) -> Self {
        Self::Verification(err.to_string())
    }
}

/// Safe code rewriter using byte ranges
///
/// This rewriter applies edits in reverse order to preserve byte positions,
/// and validates that edits don't overlap.
#[derive(Debug, Clone)]
pub struct ByteRangeRewriter {
    /// Original source code
    source: String,
    /// Pending edits
    edits: Vec<Edit>,
}

impl ByteRangeRewriter {
    /// Create a new rewriter for the given source
    #[must_use]
    pub fn new(source: impl Into<String>) -> Self {
        Self {
            source: source.into(),
            edits: Vec::new(),
        }
    }

    /// Add an edit to the pending list
    pub fn add_edit(&mut self, edit: Edit) {
        self.edits.push(edit);
    }

    /// Add multiple edits
    pub fn add_edits(&mut self, edits: impl IntoIterator<Item = Edit>) {
        self.edits.extend(edits);
    }

    /// Get the number of pending edits
    #[must_use]
    pub fn edit_count(&self) -> usize {
        self.edits.len()
    }

    /// Check if there are any pending edits
    #[must_use]
    pub fn has_edits(&self) -> bool {
        !self.edits.is_empty()
    }

    /// Validate edits without applying them
    ///
    /// # Errors
    /// Returns error if edits overlap, are out of bounds or split a character
    pub fn validate(&self) -> Result<(), RewriteError> {
        for (i, edit) in self.edits.iter().enumerate() {
            if edit.end_byte > self.source.len() {
                return Err(RewriteError::OutOfBounds {
                    edit_index: i,
                    end_byte: edit.end_byte,
                    source_len: self.source.len(),
                });
            }
            if !self.source.is_char_boundary(edit.start_byte)
                || !self.source.is_char_boundary(edit.end_byte)
            {
                return Err(RewriteError::NotCharBoundary { edit_index: i });
            }
        }

        for i in 0..self.edits.len() {
            for j in (i + 1)..self.edits.len() {
                if self.edits[i].overlaps(&self.edits[j]) {
                    return Err(RewriteError::OverlappingEdits {
                        edit_a: i,
                        edit_b: j,
                    });
                }
            }
        }

        Ok(())
    }

    /// Apply all edits and return the modified source
    ///
    /// # Errors
    /// Returns error if the edits do not validate
    pub fn apply(self) -> Result<String, RewriteError> {
        self.validate()?;

        let mut result = self.source;
        let mut sorted_edits = self.edits;

        // Apply from end to start
        sorted_edits.sort_by(|a, b| b.start_byte.cmp(&a.start_byte));

        for edit in sorted_edits {
            if let Some(description) = &edit.description {
                tracing::trace!(
                    start = edit.start_byte,
                    end = edit.end_byte,
                    "{description}"
                );
            }
            result.replace_range(edit.start_byte..edit.end_byte, &edit.replacement);
        }

        Ok(result)
    }

    /// Apply edits and verify the result still parses as Java
    ///
    /// # Errors
    /// Returns error if edits are invalid or the result has a syntax error
    pub fn apply_verified(self) -> Result<String, RewriteError> {
        let result = self.apply()?;

        let mut parser = CstParser::new()?;
        let tree = parser.parse(&result)?;
        if let Some(point) = tree.first_error {
            return Err(RewriteError::InvalidSyntax {
                line: point.row + 1,
                column: point.column + 1,
            });
        }

        Ok(result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_simple_replacement() {
        let source = "hello world";
        let mut rewriter = ByteRangeRewriter::new(source);
        rewriter.add_edit(Edit::new(0, 5, "hi"));

        let result = rewriter.apply().expect("should apply");
        assert_eq!(result, "hi world");
    }

    #[test]
    fn test_overlapping_edits_error() {
        let source = "hello world";
        let mut rewriter = ByteRangeRewriter::new(source);
        rewriter.add_edit(Edit::new(0, 8, "hi"));
        rewriter.add_edit(Edit::new(5, 10, "there"));

        let result = rewriter.apply();
        assert!(matches!(result, Err(RewriteError::OverlappingEdits { .. })));
    }

    #[test]
    fn test_out_of_bounds_error() {
        let source = "short";
        let mut rewriter = ByteRangeRewriter::new(source);
        rewriter.add_edit(Edit::new(0, 100, "long"));

        let result = rewriter.apply();
        assert!(matches!(result, Err(RewriteError::OutOfBounds { .. })));
    }

    #[test]
    fn test_char_boundary_error() {
        let source = "class Ä {}";
        let mut rewriter = ByteRangeRewriter::new(source);
        rewriter.add_edit(Edit::delete(6, 7));

        let result = rewriter.apply();
        assert!(matches!(result, Err(RewriteError::NotCharBoundary { .. })));
    }

    #[test]
    fn test_throws_entry_deletion() {
        let source = "class A {\n    void foo() throws IOException, IllegalStateException {}\n}\n";
        let start = source.find("IOException").expect("Should find IOException");
        let end = source
            .find("IllegalStateException")
            .expect("Should find IllegalStateException");

        let mut rewriter = ByteRangeRewriter::new(source);
        rewriter.add_edit(Edit::delete(start, end).describe("drop IOException"));
        let result = rewriter.apply_verified().expect("should apply");

        assert_eq!(
            result,
            "class A {\n    void foo() throws IllegalStateException {}\n}\n"
        );
    }

    #[test]
    fn test_import_and_clause_deletion_same_file() {
        let source = "import java.io.IOException;\n\nclass A {\n    void foo() throws IOException {}\n}\n";
        let import_end = source.find("class").expect("Should find class");
        let clause_start = source.find(" throws").expect("Should find throws");
        let clause_end = source.find(" {}").expect("Should find body");

        let mut rewriter = ByteRangeRewriter::new(source);
        rewriter.add_edits([
            Edit::delete(0, import_end),
            Edit::delete(clause_start, clause_end),
        ]);
        assert_eq!(rewriter.edit_count(), 2);

        let result = rewriter.apply_verified().expect("should apply");
        assert_eq!(result, "class A {\n    void foo() {}\n}\n");
    }

    #[test]
    fn test_verified_rejects_broken_output() {
        let source = "class A { void foo() {} }";
        let mut rewriter = ByteRangeRewriter::new(source);
        rewriter.add_edit(Edit::delete(19, 20));

        let result = rewriter.apply_verified();
        assert!(matches!(result, Err(RewriteError::InvalidSyntax { .. })));
    }

    #[test]
    fn test_empty_edits() {
        let source = "hello world";
        let rewriter = ByteRangeRewriter::new(source);
        assert!(!rewriter.has_edits());
        let result = rewriter.apply().expect("should apply");
        assert_eq!(result, source);
    }

    #[test]
    fn test_adjacent_non_overlapping_edits() {
        let source = "abcdef";
        let mut rewriter = ByteRangeRewriter::new(source);
        rewriter.add_edit(Edit::new(0, 3, "XXX"));
        rewriter.add_edit(Edit::new(3, 6, "YYY"));

        let result = rewriter.apply().expect("should apply");
        assert_eq!(result, "XXXYYY");
    }
}
