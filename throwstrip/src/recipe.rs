//! The `RemoveMethodThrows` recipe: options, validation and single-file runs.

use crate::fix::RewriteError;
use crate::matcher::{MethodMatcher, PatternError};
use crate::printer;
use crate::search::DeclaresMethod;
use crate::tree::{self, CompilationUnit, ParseError};
use crate::types::TypeIndex;
use crate::visitor::{ThrowsClauseRewriter, VisitLog};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use thiserror::Error;

/// Recipe options are rejected before any file is visited.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    /// The method pattern does not compile
    #[error("invalid method pattern `{pattern}`: {source}")]
    InvalidMethodPattern {
        /// Pattern as given
        pattern: String,
        /// Why it failed
        source: PatternError,
    },
    /// No exception type was given
    #[error("exception type must be a non-blank fully-qualified name")]
    MissingExceptionType,
}

/// Failure while processing one file. Never aborts a multi-file run.
#[derive(Debug, Error)]
pub enum FileError {
    /// The source could not be parsed
    #[error(transparent)]
    Parse(#[from] ParseError),
    /// The edits could not be applied
    #[error(transparent)]
    Rewrite(#[from] RewriteError),
}

/// Remove a specific exception from the throws clause of matching methods.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RemoveMethodThrows {
    /// Method signature pattern, e.g. `com.example.A foo(..)`
    pub method_pattern: String,
    /// Fully-qualified exception type to remove, e.g. `java.io.IOException`
    pub exception_type: String,
    /// Also rewrite methods overriding a matching supertype method (default `true`)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub match_overrides: Option<bool>,
}

impl RemoveMethodThrows {
    /// Human-readable recipe name.
    pub const DISPLAY_NAME: &'static str = "Remove a specific exception from a method's throws clause";

    /// What the recipe does.
    pub const DESCRIPTION: &'static str =
        "Remove a specific exception from the throws clause of methods matching a pattern.";

    /// Build a recipe.
    #[must_use]
    pub fn new(
        method_pattern: impl Into<String>,
        exception_type: impl Into<String>,
        match_overrides: Option<bool>,
    ) -> Self {
        Self {
            method_pattern: method_pattern.into(),
            exception_type: exception_type.into(),
            match_overrides,
        }
    }

    /// Effective override matching.
    #[must_use]
    pub fn match_overrides(&self) -> bool {
        self.match_overrides.unwrap_or(true)
    }

    /// Check the options without keeping the compiled form.
    ///
    /// # Errors
    ///
    /// Returns the first invalid option.
    pub fn validate(&self) -> Result<(), ValidationError> {
        self.compile().map(|_| ())
    }

    /// Compile the options into a ready-to-run recipe.
    ///
    /// # Errors
    ///
    /// Returns `ValidationError` when the pattern is malformed or the exception type is blank.
    pub fn compile(&self) -> Result<CompiledRecipe, ValidationError> {
        let matcher = MethodMatcher::compile(&self.method_pattern, self.match_overrides())
            .map_err(|source| ValidationError::InvalidMethodPattern {
                pattern: self.method_pattern.clone(),
                source,
            })?;
        let exception_type = self.exception_type.trim();
        if exception_type.is_empty() {
            return Err(ValidationError::MissingExceptionType);
        }
        Ok(CompiledRecipe {
            matcher,
            exception_type: exception_type.to_owned(),
        })
    }
}

/// Result of rewriting one source text.
#[derive(Debug, Clone)]
pub struct SourceOutcome {
    /// New source, identical to the input when nothing matched
    pub source: String,
    /// What changed
    pub log: VisitLog,
}

impl SourceOutcome {
    /// Whether the source was modified.
    #[must_use]
    pub fn changed(&self) -> bool {
        !self.log.is_empty()
    }
}

/// A validated recipe, shareable across threads.
#[derive(Debug, Clone)]
pub struct CompiledRecipe {
    matcher: MethodMatcher,
    exception_type: String,
}

impl CompiledRecipe {
    /// The compiled method pattern.
    #[must_use]
    pub fn matcher(&self) -> &MethodMatcher {
        &self.matcher
    }

    /// The exception type being removed.
    #[must_use]
    pub fn exception_type(&self) -> &str {
        &self.exception_type
    }

    /// Precondition gate for this recipe.
    #[must_use]
    pub fn gate(&self) -> DeclaresMethod<'_> {
        DeclaresMethod::new(&self.matcher)
    }

    /// Rewrite a parsed unit. Files that fail the gate are returned unchanged.
    pub fn visit(
        &self,
        source: &str,
        unit: &Arc<CompilationUnit>,
        index: &TypeIndex,
        log: &mut VisitLog,
    ) -> Arc<CompilationUnit> {
        let gate = self.gate();
        if gate.quick_reject(source) || !gate.check(unit) {
            return Arc::clone(unit);
        }
        ThrowsClauseRewriter::new(&self.matcher, &self.exception_type, index)
            .visit_compilation_unit(unit, log)
    }

    /// Parse, rewrite and print a single source with an index of just that file.
    ///
    /// # Errors
    ///
    /// Returns `FileError` if the source does not parse or the edits fail.
    pub fn run_source(&self, source: &str) -> Result<SourceOutcome, FileError> {
        let unit = Arc::new(tree::parse(source)?);
        let index = TypeIndex::build([unit.as_ref()]);
        self.rewrite_parsed(source, &unit, &index)
    }

    /// Rewrite and print an already parsed source against a shared index.
    ///
    /// # Errors
    ///
    /// Returns `FileError::Rewrite` if the edits fail.
    pub fn rewrite_parsed(
        &self,
        source: &str,
        unit: &Arc<CompilationUnit>,
        index: &TypeIndex,
    ) -> Result<SourceOutcome, FileError> {
        let mut log = VisitLog::default();
        let rewritten = self.visit(source, unit, index, &mut log);
        let source = printer::print(source, unit, &rewritten)?;
        Ok(SourceOutcome { source, log })
    }
}
