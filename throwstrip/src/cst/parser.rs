//! Tree-sitter based CST parser for Java source code.
//!
//! Provides precise byte-range information for safe code rewriting.

use thiserror::Error;
use tree_sitter::{Parser, TreeCursor};

/// A point in source code (row, column)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Point {
    /// Zero-indexed row number
    pub row: usize,
    /// Zero-indexed column (byte offset within line)
    pub column: usize,
}

impl From<tree_sitter::Point> for Point {
    fn from(p: tree_sitter::Point) -> Self {
        Self {
            row: p.row,
            column: p.column,
        }
    }
}

/// A CST node with exact source location
#[derive(Debug, Clone)]
pub struct CstNode {
    /// Node kind (e.g., "method_declaration", "identifier")
    pub kind: String,
    /// Grammar field this node occupies in its parent (e.g., "name", "body")
    pub field: Option<&'static str>,
    /// Start byte offset (inclusive)
    pub start_byte: usize,
    /// End byte offset (exclusive)
    pub end_byte: usize,
    /// Start point (row, column)
    pub start_point: Point,
    /// Whether this is a named node (vs anonymous like punctuation)
    pub is_named: bool,
    /// Child nodes
    pub children: Vec<CstNode>,
}

impl CstNode {
    /// Build a `CstNode` from the node under a tree-sitter cursor.
    ///
    /// The cursor is used instead of `Node::child` so the field name of every
    /// child is preserved.
    fn from_cursor(cursor: &mut TreeCursor<'_>) -> Self {
        let node = cursor.node();
        let field = cursor.field_name();

        let mut children = Vec::new();
        if cursor.goto_first_child() {
            loop {
                children.push(Self::from_cursor(cursor));
                if !cursor.goto_next_sibling() {
                    break;
                }
            }
            cursor.goto_parent();
        }

        Self {
            kind: node.kind().to_owned(),
            field,
            start_byte: node.start_byte(),
            end_byte: node.end_byte(),
            start_point: node.start_position().into(),
            is_named: node.is_named(),
            children,
        }
    }

    /// First child stored under the given grammar field.
    #[must_use]
    pub fn child_by_field(&self, field: &str) -> Option<&CstNode> {
        self.children.iter().find(|c| c.field == Some(field))
    }

    /// All children stored under the given grammar field.
    pub fn children_by_field<'a>(&'a self, field: &'a str) -> impl Iterator<Item = &'a CstNode> {
        self.children.iter().filter(move |c| c.field == Some(field))
    }

    /// First child of the given kind.
    #[must_use]
    pub fn child_of_kind(&self, kind: &str) -> Option<&CstNode> {
        self.children.iter().find(|c| c.kind == kind)
    }

    /// Named children, skipping punctuation and keywords.
    pub fn named_children(&self) -> impl Iterator<Item = &CstNode> {
        self.children.iter().filter(|c| c.is_named)
    }

    /// Check if this node's range overlaps with the given range
    #[must_use]
    pub fn overlaps(&self, start: usize, end: usize) -> bool {
        self.start_byte < end && self.end_byte > start
    }

    /// Find all nodes of a specific kind
    #[must_use]
    pub fn find_by_kind(&self, kind: &str) -> Vec<&CstNode> {
        let mut result = Vec::new();
        self.find_by_kind_recursive(kind, &mut result);
        result
    }

    fn find_by_kind_recursive<'a>(&'a self, kind: &str, result: &mut Vec<&'a CstNode>) {
        if self.kind == kind {
            result.push(self);
        }
        for child in &self.children {
            child.find_by_kind_recursive(kind, result);
        }
    }
}

/// A parsed CST tree
#[derive(Debug)]
pub struct CstTree {
    /// Root node of the CST
    pub root: CstNode,
    /// Original source code
    pub source: String,
    /// Location of the first syntax error, if the grammar had to recover
    pub first_error: Option<Point>,
}

impl CstTree {
    /// Extract a slice of source code by byte range
    #[must_use]
    pub fn slice(&self, start: usize, end: usize) -> &str {
        &self.source[start..end]
    }

    /// Source text covered by a node
    #[must_use]
    pub fn text(&self, node: &CstNode) -> &str {
        self.slice(node.start_byte, node.end_byte)
    }

    /// Whether the parse recovered from at least one syntax error
    #[must_use]
    pub fn has_errors(&self) -> bool {
        self.first_error.is_some()
    }

    /// Find all method declarations
    #[must_use]
    pub fn find_methods(&self) -> Vec<&CstNode> {
        self.root.find_by_kind("method_declaration")
    }
}

/// Error during CST parsing
#[derive(Debug, Error)]
pub enum CstError {
    /// Failed to create parser
    #[error("Failed to create CST parser: {0}")]
    ParserCreation(String),
    /// Failed to parse source
    #[error("Failed to parse source as Java")]
    ParseFailed,
}

/// Tree-sitter based CST parser
pub struct CstParser {
    parser: Parser,
}

impl CstParser {
    /// Create a new CST parser for Java
    ///
    /// # Errors
    /// Returns error if parser creation fails
    pub fn new() -> Result<Self, CstError> {
        let mut parser = Parser::new();

        // Use the LANGUAGE constant exported by tree-sitter-java crate
        parser
            .set_language(&tree_sitter_java::LANGUAGE.into())
            .map_err(|e| CstError::ParserCreation(e.to_string()))?;

        Ok(Self { parser })
    }

    /// Parse source code into a CST
    ///
    /// # Errors
    /// Returns error if parsing fails
    pub fn parse(&mut self, source: &str) -> Result<CstTree, CstError> {
        let tree = self
            .parser
            .parse(source, None)
            .ok_or(CstError::ParseFailed)?;

        let root_node = tree.root_node();
        let first_error = if root_node.has_error() {
            Some(first_error_point(root_node))
        } else {
            None
        };

        let mut cursor = tree.walk();
        let root = CstNode::from_cursor(&mut cursor);

        Ok(CstTree {
            root,
            source: source.to_owned(),
            first_error,
        })
    }
}

/// Locate the first `ERROR` or `MISSING` node below `node`.
fn first_error_point(node: tree_sitter::Node<'_>) -> Point {
    if node.is_error() || node.is_missing() {
        return node.start_position().into();
    }
    let mut cursor = node.walk();
    for child in node.children(&mut cursor) {
        if child.has_error() {
            return first_error_point(child);
        }
    }
    node.start_position().into()
}
