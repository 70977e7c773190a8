//! Method signature patterns.
//!
//! A pattern has the shape `TYPE NAME(ARGS)`, for example
//! `com.example..*Service find*(String, ..)`. It is compiled once into
//! segment matchers and then evaluated against method declarations without
//! any further string parsing.

use crate::constants::{CONSTRUCTOR_MARKER, JAVA_LANG_TYPES, PATTERN_SEGMENT_RE};
use crate::tree::{CompilationUnit, MethodDecl, TypeDecl};
use crate::types::{SuperRef, TypeIndex};
use rustc_hash::FxHashSet;
use std::collections::VecDeque;
use thiserror::Error;

/// Reason a method pattern failed to compile.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PatternError {
    /// Blank pattern
    #[error("method pattern is empty")]
    Empty,
    /// No `(` after the method name
    #[error("method pattern has no parameter list")]
    MissingParameters,
    /// Parentheses are missing, nested or out of order
    #[error("method pattern has unbalanced parentheses")]
    UnbalancedParentheses,
    /// Only a method name was given
    #[error("method pattern has no declaring type")]
    MissingTargetType,
    /// Nothing between the declaring type and `(`
    #[error("method pattern has no method name")]
    MissingMethodName,
    /// Declaring type is not a valid type pattern
    #[error("invalid type pattern `{0}`")]
    InvalidTypePattern(String),
    /// Method name is not an identifier, glob or `<constructor>`
    #[error("invalid method name pattern `{0}`")]
    InvalidMethodName(String),
    /// An argument is not `..`, `*` or a type pattern
    #[error("invalid argument pattern `{arg}` at position {position}")]
    InvalidArgument {
        /// 1-indexed argument position
        position: usize,
        /// Argument text as written
        arg: String,
    },
    /// Text after the closing `)`
    #[error("unexpected input after parameter list: `{0}`")]
    TrailingInput(String),
}

/// `*`-glob over a single name segment.
#[derive(Debug, Clone, PartialEq, Eq)]
struct Glob(String);

impl Glob {
    fn has_wildcard(&self) -> bool {
        self.0.contains('*')
    }

    fn matches(&self, text: &str) -> bool {
        glob_match(self.0.as_bytes(), text.as_bytes())
    }
}

fn glob_match(pattern: &[u8], text: &[u8]) -> bool {
    let (mut p, mut t) = (0, 0);
    let mut backtrack: Option<(usize, usize)> = None;
    while t < text.len() {
        if p < pattern.len() && pattern[p] == b'*' {
            backtrack = Some((p, t));
            p += 1;
        } else if p < pattern.len() && pattern[p] == text[t] {
            p += 1;
            t += 1;
        } else if let Some((star, consumed)) = backtrack {
            p = star + 1;
            t = consumed + 1;
            backtrack = Some((star, consumed + 1));
        } else {
            return false;
        }
    }
    pattern[p..].iter().all(|&c| c == b'*')
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Segment {
    Name(Glob),
    /// `..`: zero or more segments
    AnyRun,
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum TypeBase {
    Any,
    Segments(Vec<Segment>),
}

/// Compiled type pattern: a base name pattern plus array dimensions.
#[derive(Debug, Clone, PartialEq, Eq)]
struct TypePattern {
    base: TypeBase,
    dims: usize,
}

impl TypePattern {
    fn compile(text: &str) -> Option<Self> {
        let mut text = text.trim();
        let mut dims = 0;
        if let Some(stripped) = text.strip_suffix("...") {
            text = stripped.trim_end();
            dims += 1;
        }
        while let Some(stripped) = text.strip_suffix("[]") {
            text = stripped.trim_end();
            dims += 1;
        }
        if text.is_empty() {
            return None;
        }
        if text == "*" {
            return Some(Self {
                base: TypeBase::Any,
                dims,
            });
        }

        let normalized = text.replace('$', ".");
        let mut segments = Vec::new();
        let parts: Vec<&str> = normalized.split('.').collect();
        for (i, part) in parts.iter().enumerate() {
            if part.is_empty() {
                // `a..b` splits into ["a", "", "b"]; a trailing dot is invalid.
                if i + 1 == parts.len() {
                    return None;
                }
                if segments.last() != Some(&Segment::AnyRun) {
                    segments.push(Segment::AnyRun);
                }
            } else if PATTERN_SEGMENT_RE().is_match(part) {
                segments.push(Segment::Name(Glob((*part).to_owned())));
            } else {
                return None;
            }
        }

        if let [Segment::Name(glob)] = segments.as_slice() {
            if !glob.has_wildcard() && JAVA_LANG_TYPES().contains(glob.0.as_str()) {
                segments = vec![
                    Segment::Name(Glob("java".to_owned())),
                    Segment::Name(Glob("lang".to_owned())),
                    Segment::Name(glob.clone()),
                ];
            }
        }

        Some(Self {
            base: TypeBase::Segments(segments),
            dims,
        })
    }

    /// Match a fully-qualified erasure such as `java.util.List[]`.
    fn matches(&self, fqn: &str) -> bool {
        let base = fqn.trim_end_matches("[]");
        let dims = (fqn.len() - base.len()) / 2;
        if dims != self.dims {
            return false;
        }
        match &self.base {
            TypeBase::Any => true,
            TypeBase::Segments(segments) => {
                let normalized = base.replace('$', ".");
                let names: Vec<&str> = normalized.split('.').collect();
                segments_match(segments, &names)
            }
        }
    }
}

fn segments_match(segments: &[Segment], names: &[&str]) -> bool {
    match segments.split_first() {
        None => names.is_empty(),
        Some((Segment::AnyRun, rest)) => {
            (0..=names.len()).any(|skip| segments_match(rest, &names[skip..]))
        }
        Some((Segment::Name(glob), rest)) => match names.split_first() {
            Some((name, tail)) => glob.matches(name) && segments_match(rest, tail),
            None => false,
        },
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum ArgPattern {
    /// `..`
    AnyRun,
    /// `*`
    AnyOne,
    Type(TypePattern),
}

fn args_match(patterns: &[ArgPattern], params: &[String]) -> bool {
    match patterns.split_first() {
        None => params.is_empty(),
        Some((ArgPattern::AnyRun, rest)) => {
            (0..=params.len()).any(|skip| args_match(rest, &params[skip..]))
        }
        Some((pattern, rest)) => match params.split_first() {
            Some((param, tail)) => {
                let ok = match pattern {
                    ArgPattern::Type(ty) => ty.matches(param),
                    _ => true,
                };
                ok && args_match(rest, tail)
            }
            None => false,
        },
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum NamePattern {
    Constructor,
    Method(Glob),
}

/// A compiled method signature pattern.
#[derive(Debug, Clone)]
pub struct MethodMatcher {
    target: TypePattern,
    name: NamePattern,
    args: Vec<ArgPattern>,
    match_overrides: bool,
}

impl MethodMatcher {
    /// Compile a pattern.
    ///
    /// # Errors
    ///
    /// Returns a `PatternError` describing the first malformed part.
    pub fn compile(pattern: &str, match_overrides: bool) -> Result<Self, PatternError> {
        let pattern = pattern.trim();
        if pattern.is_empty() {
            return Err(PatternError::Empty);
        }

        let open = pattern.find('(').ok_or_else(|| {
            if pattern.contains(')') {
                PatternError::UnbalancedParentheses
            } else {
                PatternError::MissingParameters
            }
        })?;
        let close = pattern
            .rfind(')')
            .ok_or(PatternError::UnbalancedParentheses)?;
        if close < open
            || pattern.matches('(').count() != 1
            || pattern.matches(')').count() != 1
        {
            return Err(PatternError::UnbalancedParentheses);
        }
        let trailing = pattern[close + 1..].trim();
        if !trailing.is_empty() {
            return Err(PatternError::TrailingInput(trailing.to_owned()));
        }

        let head = pattern[..open].trim_end();
        let (type_text, name_text) = match head.rfind('#') {
            Some(pos) => (head[..pos].trim(), head[pos + 1..].trim()),
            None => match head.rfind(char::is_whitespace) {
                Some(pos) => (head[..pos].trim(), head[pos..].trim()),
                None if head.is_empty() => return Err(PatternError::MissingMethodName),
                None => return Err(PatternError::MissingTargetType),
            },
        };
        if type_text.is_empty() {
            return Err(PatternError::MissingTargetType);
        }
        if name_text.is_empty() {
            return Err(PatternError::MissingMethodName);
        }

        let target = TypePattern::compile(type_text)
            .filter(|t| t.dims == 0)
            .ok_or_else(|| PatternError::InvalidTypePattern(type_text.to_owned()))?;

        let name = if name_text == CONSTRUCTOR_MARKER {
            NamePattern::Constructor
        } else if PATTERN_SEGMENT_RE().is_match(name_text) {
            NamePattern::Method(Glob(name_text.to_owned()))
        } else {
            return Err(PatternError::InvalidMethodName(name_text.to_owned()));
        };

        let args_text = pattern[open + 1..close].trim();
        let mut args = Vec::new();
        if !args_text.is_empty() {
            for (i, arg) in args_text.split(',').map(str::trim).enumerate() {
                let compiled = match arg {
                    ".." => Some(ArgPattern::AnyRun),
                    "*" => Some(ArgPattern::AnyOne),
                    _ => TypePattern::compile(arg).map(ArgPattern::Type),
                };
                args.push(compiled.ok_or_else(|| PatternError::InvalidArgument {
                    position: i + 1,
                    arg: arg.to_owned(),
                })?);
            }
        }

        Ok(Self {
            target,
            name,
            args,
            match_overrides,
        })
    }

    /// Whether overriding declarations are considered.
    #[must_use]
    pub fn match_overrides(&self) -> bool {
        self.match_overrides
    }

    /// The method name when it is a plain identifier, usable for a textual pre-check.
    #[must_use]
    pub fn literal_name(&self) -> Option<&str> {
        match &self.name {
            NamePattern::Method(glob) if !glob.has_wildcard() => Some(&glob.0),
            _ => None,
        }
    }

    /// Name component only: constructors match `<constructor>`, methods match the glob.
    #[must_use]
    pub fn name_matches(&self, method: &MethodDecl) -> bool {
        match &self.name {
            NamePattern::Constructor => method.is_constructor,
            NamePattern::Method(glob) => !method.is_constructor && glob.matches(&method.name),
        }
    }

    /// Whether `method`, declared directly in `enclosing`, matches the pattern.
    ///
    /// `unit` supplies the import context used to resolve the method's
    /// parameter types and the enclosing type's supertypes.
    #[must_use]
    pub fn matches(
        &self,
        method: &MethodDecl,
        enclosing: &TypeDecl,
        unit: &CompilationUnit,
        index: &TypeIndex,
    ) -> bool {
        if !self.name_matches(method) {
            return false;
        }
        let params: Vec<String> = method
            .params
            .iter()
            .map(|p| index.erasure(unit, &p.ty))
            .collect();
        if !args_match(&self.args, &params) {
            return false;
        }
        if self.target.matches(&enclosing.fqn) {
            return true;
        }
        if !self.match_overrides || method.is_constructor {
            return false;
        }
        self.matches_supertype(method, &params, enclosing, unit, index)
    }

    /// Breadth-first walk over the supertype graph looking for a matching
    /// type that declares the same signature.
    fn matches_supertype(
        &self,
        method: &MethodDecl,
        params: &[String],
        enclosing: &TypeDecl,
        unit: &CompilationUnit,
        index: &TypeIndex,
    ) -> bool {
        let mut queue: VecDeque<SuperRef> = enclosing
            .supertypes
            .iter()
            .map(|tref| match index.resolve(unit, tref) {
                Some(fqn) => SuperRef {
                    resolved: index.contains(&fqn),
                    name: fqn,
                },
                None => SuperRef {
                    name: tref.erased_text.clone(),
                    resolved: false,
                },
            })
            .collect();
        let mut visited = FxHashSet::default();

        while let Some(supertype) = queue.pop_front() {
            if !visited.insert(supertype.name.clone()) {
                continue;
            }
            let pattern_hit = self.target.matches(&supertype.name);
            match index.get(&supertype.name).filter(|_| supertype.resolved) {
                Some(summary) => {
                    if pattern_hit && summary.declares(&method.name, params) {
                        tracing::trace!(
                            method = %method.name,
                            supertype = %supertype.name,
                            "matched through supertype"
                        );
                        return true;
                    }
                    queue.extend(summary.supertypes.iter().cloned());
                }
                None => {
                    if pattern_hit && method.has_annotation("Override") {
                        return true;
                    }
                }
            }
        }
        false
    }
}

impl std::fmt::Display for TypePattern {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match &self.base {
            TypeBase::Any => write!(f, "*")?,
            TypeBase::Segments(segments) => {
                let mut previous_run = true;
                for segment in segments {
                    match segment {
                        Segment::AnyRun => {
                            write!(f, "..")?;
                            previous_run = true;
                        }
                        Segment::Name(glob) => {
                            if !previous_run {
                                write!(f, ".")?;
                            }
                            write!(f, "{}", glob.0)?;
                            previous_run = false;
                        }
                    }
                }
            }
        }
        for _ in 0..self.dims {
            write!(f, "[]")?;
        }
        Ok(())
    }
}

impl std::fmt::Display for MethodMatcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match &self.name {
            NamePattern::Constructor => CONSTRUCTOR_MARKER,
            NamePattern::Method(glob) => &glob.0,
        };
        write!(f, "{} {name}(", self.target)?;
        for (i, arg) in self.args.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            match arg {
                ArgPattern::AnyRun => write!(f, "..")?,
                ArgPattern::AnyOne => write!(f, "*")?,
                ArgPattern::Type(ty) => write!(f, "{ty}")?,
            }
        }
        write!(f, ")")
    }
}
