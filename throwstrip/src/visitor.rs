//! Post-order rewrite of throws clauses on matching methods.

use crate::imports;
use crate::matcher::MethodMatcher;
use crate::tree::{CompilationUnit, Member, MethodDecl, Span, TypeDecl, TypeRef};
use crate::types::TypeIndex;
use serde::Serialize;
use std::sync::Arc;

/// One throws entry removed from one method.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Removal {
    /// Fully-qualified name of the type declaring the method.
    pub type_fqn: String,
    /// The method name (class name for constructors).
    pub method: String,
    /// Location of the original throws clause.
    #[serde(skip)]
    pub span: Span,
}

/// Accumulates what a traversal changed.
#[derive(Debug, Default, Clone)]
pub struct VisitLog {
    /// Methods whose throws clause lost the exception, in visit order.
    pub removals: Vec<Removal>,
    /// Whether the exception's import was dropped as a consequence.
    pub import_removed: bool,
}

impl VisitLog {
    /// Whether the traversal changed anything.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.removals.is_empty()
    }
}

/// Stack of enclosing type declarations, innermost last.
#[derive(Debug, Default)]
struct Cursor<'t> {
    enclosing: Vec<&'t TypeDecl>,
}

impl<'t> Cursor<'t> {
    fn push(&mut self, decl: &'t TypeDecl) {
        self.enclosing.push(decl);
    }

    fn pop(&mut self) {
        self.enclosing.pop();
    }

    fn current(&self) -> Option<&'t TypeDecl> {
        self.enclosing.last().copied()
    }
}

/// Removes one exception type from the throws clause of every matching method.
///
/// The rewriter holds no mutable state. Nodes it does not change are handed
/// back as the same `Arc`, so callers can detect "no change" by pointer.
pub struct ThrowsClauseRewriter<'a> {
    matcher: &'a MethodMatcher,
    exception_type: &'a str,
    index: &'a TypeIndex,
}

impl<'a> ThrowsClauseRewriter<'a> {
    /// Create a rewriter for one exception type.
    #[must_use]
    pub fn new(matcher: &'a MethodMatcher, exception_type: &'a str, index: &'a TypeIndex) -> Self {
        Self {
            matcher,
            exception_type,
            index,
        }
    }

    /// Rewrite a compilation unit, then drop the exception's import if it became unused.
    pub fn visit_compilation_unit(
        &self,
        unit: &Arc<CompilationUnit>,
        log: &mut VisitLog,
    ) -> Arc<CompilationUnit> {
        let mut cursor = Cursor::default();
        let mut changed = false;
        let types: Vec<Arc<TypeDecl>> = unit
            .types
            .iter()
            .map(|decl| {
                let visited = self.visit_type(decl, unit, &mut cursor, log);
                changed |= !Arc::ptr_eq(&visited, decl);
                visited
            })
            .collect();

        if !changed {
            return Arc::clone(unit);
        }

        let rewritten = unit.with_types(types);
        let before = rewritten.imports.len();
        let cleaned = imports::maybe_remove_import(rewritten, self.exception_type);
        log.import_removed |= cleaned.imports.len() < before;
        Arc::new(cleaned)
    }

    fn visit_type<'t>(
        &self,
        decl: &'t Arc<TypeDecl>,
        unit: &CompilationUnit,
        cursor: &mut Cursor<'t>,
        log: &mut VisitLog,
    ) -> Arc<TypeDecl> {
        cursor.push(decl);
        let mut changed = false;
        let members: Vec<Member> = decl
            .members
            .iter()
            .map(|member| match member {
                Member::Method(method) => {
                    let visited = self.visit_method(method, unit, cursor, log);
                    changed |= !Arc::ptr_eq(&visited, method);
                    Member::Method(visited)
                }
                Member::Type(nested) => {
                    let visited = self.visit_type(nested, unit, cursor, log);
                    changed |= !Arc::ptr_eq(&visited, nested);
                    Member::Type(visited)
                }
            })
            .collect();
        cursor.pop();

        if changed {
            Arc::new(decl.with_members(members))
        } else {
            Arc::clone(decl)
        }
    }

    fn visit_method<'t>(
        &self,
        method: &'t Arc<MethodDecl>,
        unit: &CompilationUnit,
        cursor: &mut Cursor<'t>,
        log: &mut VisitLog,
    ) -> Arc<MethodDecl> {
        // Classes declared in the body are rewritten before the method itself.
        let mut current = Arc::clone(method);
        if !method.local_types.is_empty() {
            let mut changed = false;
            let locals: Vec<Arc<TypeDecl>> = method
                .local_types
                .iter()
                .map(|local| {
                    let visited = self.visit_type(local, unit, cursor, log);
                    changed |= !Arc::ptr_eq(&visited, local);
                    visited
                })
                .collect();
            if changed {
                current = Arc::new(method.with_local_types(locals));
            }
        }

        let Some(enclosing) = cursor.current() else {
            return current;
        };
        let Some(throws) = current.throws.as_ref().filter(|t| !t.is_empty()) else {
            return current;
        };
        if !self.matcher.matches(&current, enclosing, unit, self.index) {
            return current;
        }

        let kept: Vec<TypeRef> = throws
            .iter()
            .filter(|entry| !self.is_target(unit, entry))
            .cloned()
            .collect();
        if kept.len() == throws.len() {
            return current;
        }

        tracing::debug!(
            type_fqn = %enclosing.fqn,
            method = %current.name,
            removed = throws.len() - kept.len(),
            "removing exception from throws clause"
        );
        log.removals.push(Removal {
            type_fqn: enclosing.fqn.clone(),
            method: current.name.clone(),
            span: current.throws_span.unwrap_or(current.span),
        });

        let throws = if kept.is_empty() { None } else { Some(kept) };
        Arc::new(current.with_throws(throws))
    }

    /// Whether a throws entry names the configured exception.
    ///
    /// Type variables never name the exception, whatever their bound.
    /// Entries that cannot be attributed are kept, except for a simple name
    /// that matches the exception and is covered by an on-demand import of
    /// its package.
    fn is_target(&self, unit: &CompilationUnit, entry: &TypeRef) -> bool {
        if entry.type_var {
            return false;
        }
        if let Some(fqn) = self.index.resolve(unit, entry) {
            return fqn == self.exception_type;
        }
        let Some((package, simple)) = self.exception_type.rsplit_once('.') else {
            return false;
        };
        entry.is_simple()
            && entry.erased_text == simple
            && unit.on_demand_imports().any(|p| p == package)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tree::parse;

    fn rewrite(source: &str, pattern: &str, exception: &str) -> (Arc<CompilationUnit>, Arc<CompilationUnit>, VisitLog) {
        let unit = Arc::new(parse(source).unwrap());
        let index = TypeIndex::build([unit.as_ref()]);
        let matcher = MethodMatcher::compile(pattern, true).unwrap();
        let rewriter = ThrowsClauseRewriter::new(&matcher, exception, &index);
        let mut log = VisitLog::default();
        let out = rewriter.visit_compilation_unit(&unit, &mut log);
        (unit, out, log)
    }

    #[test]
    fn test_unchanged_is_same_arc() {
        let (unit, out, log) = rewrite("class A { void foo() {} }", "A foo()", "java.io.IOException");
        assert!(Arc::ptr_eq(&unit, &out));
        assert!(log.is_empty());
    }

    #[test]
    fn test_only_exception_elides_clause() {
        let source = "import java.io.IOException;\nclass A { void foo() throws IOException {} }";
        let (_, out, log) = rewrite(source, "A foo()", "java.io.IOException");
        let method = out.types[0].methods().next().unwrap();
        assert!(method.throws.is_none());
        assert_eq!(log.removals.len(), 1);
        assert!(log.import_removed);
        assert!(out.imports.is_empty());
    }

    #[test]
    fn test_local_class_rewritten_with_its_own_enclosing_type() {
        let source = r"
import java.io.IOException;
class A {
    void run() {
        class Local {
            void foo() throws IOException {}
        }
    }
}
";
        let (_, out, log) = rewrite(source, "A.Local foo()", "java.io.IOException");
        assert_eq!(log.removals[0].type_fqn, "A.Local");
        let run = out.types[0].methods().next().unwrap();
        let foo = run.local_types[0].methods().next().unwrap();
        assert!(foo.throws.is_none());
    }

    #[test]
    fn test_wildcard_import_covers_simple_name() {
        let source = "import java.io.*;\nclass A { void foo() throws IOException, Custom {} }";
        let (_, out, _) = rewrite(source, "A foo()", "java.io.IOException");
        let method = out.types[0].methods().next().unwrap();
        let names: Vec<_> = method.throws_entries().iter().map(|t| t.text.as_str()).collect();
        assert_eq!(names, ["Custom"]);
        assert_eq!(out.imports.len(), 1);
    }
}
