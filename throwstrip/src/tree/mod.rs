//! Immutable Java syntax tree.
//!
//! Nodes are shared through `Arc`. A rewrite produces new nodes only along the
//! path to the edit; every untouched subtree is the same allocation as in the
//! input, so `Arc::ptr_eq` is enough to detect "unchanged".

mod lower;

pub use lower::{parse, ParseError};

use smallvec::SmallVec;
use std::sync::Arc;

/// Half-open byte range into the original source.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Span {
    /// Start byte offset (inclusive)
    pub start: usize,
    /// End byte offset (exclusive)
    pub end: usize,
}

impl Span {
    /// Create a span from byte offsets
    #[must_use]
    pub const fn new(start: usize, end: usize) -> Self {
        Self { start, end }
    }
}

/// A reference to a type as written in the source.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TypeRef {
    /// Source text, exactly as written
    pub text: String,
    /// Text with annotations and type arguments dropped and varargs written as `[]`
    pub erased_text: String,
    /// Location of the reference
    pub span: Span,
    /// Fully-qualified erasure when the file alone is enough to attribute it
    pub fqn: Option<String>,
    /// `fqn` was derived from an explicit source (qualified text, single-type
    /// import, declaration in this file, primitive or type variable) rather
    /// than the implicit `java.lang` fallback
    pub certain: bool,
    /// The reference names a type variable in scope
    pub type_var: bool,
}

impl TypeRef {
    /// First identifier of the reference: the name an import would have to provide.
    #[must_use]
    pub fn leading_name(&self) -> &str {
        let base = self.erased_text.trim_end_matches("[]");
        base.split('.').next().unwrap_or(base)
    }

    /// Whether the erased text carries no package or outer-type qualifier.
    #[must_use]
    pub fn is_simple(&self) -> bool {
        !self.erased_text.contains('.')
    }
}

/// A named identifier occurring somewhere in a declaration.
///
/// Used only to decide whether an import is still referenced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NameRef {
    /// Identifier text
    pub name: String,
    /// Location of the identifier
    pub span: Span,
}

/// `import` declaration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Import {
    /// Imported name without `import`, `static` or `.*`
    pub path: String,
    /// `import static ...`
    pub is_static: bool,
    /// `import a.b.*`
    pub is_wildcard: bool,
    /// The declaration itself
    pub span: Span,
    /// The declaration plus surrounding whitespace up to and including its newline
    pub line_span: Span,
}

impl Import {
    /// Last segment of the imported path.
    #[must_use]
    pub fn simple_name(&self) -> &str {
        self.path.rsplit('.').next().unwrap_or(&self.path)
    }

    /// Single-type, non-static import of exactly `fqn`.
    #[must_use]
    pub fn imports_type(&self, fqn: &str) -> bool {
        !self.is_static && !self.is_wildcard && self.path == fqn
    }
}

/// Kind of type declaration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TypeKind {
    /// `class`
    Class,
    /// `interface`
    Interface,
    /// `enum`
    Enum,
    /// `record`
    Record,
    /// `@interface`
    Annotation,
    /// Anonymous class body or enum constant body
    Anonymous,
}

/// Generic type parameter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TypeParam {
    /// Declared name
    pub name: String,
    /// First bound, if any
    pub bound: Option<TypeRef>,
}

/// Formal parameter of a method or constructor.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Param {
    /// Declared type (array dimensions and varargs folded in)
    pub ty: TypeRef,
    /// Parameter name
    pub name: String,
}

/// Member of a type body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Member {
    /// Method or constructor
    Method(Arc<MethodDecl>),
    /// Nested type, or an anonymous class created in a field or initializer
    Type(Arc<TypeDecl>),
}

/// Class, interface, enum, record, annotation or anonymous type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TypeDecl {
    /// Declaration kind
    pub kind: TypeKind,
    /// Simple name (ordinal for anonymous types)
    pub name: String,
    /// Fully-qualified name, `.` between nesting levels, `$n` for anonymous types
    pub fqn: String,
    /// Whole declaration
    pub span: Span,
    /// Generic parameters
    pub type_params: Vec<TypeParam>,
    /// `extends` and `implements` entries in source order
    pub supertypes: SmallVec<[TypeRef; 2]>,
    /// Methods and nested types
    pub members: Vec<Member>,
    /// Identifiers in the header, fields and initializers
    pub references: Vec<NameRef>,
}

impl TypeDecl {
    /// Copy of this declaration with a new member list.
    #[must_use]
    pub fn with_members(&self, members: Vec<Member>) -> Self {
        Self {
            members,
            ..self.clone()
        }
    }

    /// Methods declared directly in this type.
    pub fn methods(&self) -> impl Iterator<Item = &Arc<MethodDecl>> {
        self.members.iter().filter_map(|m| match m {
            Member::Method(method) => Some(method),
            Member::Type(_) => None,
        })
    }

    /// Types declared directly in this type.
    pub fn nested_types(&self) -> impl Iterator<Item = &Arc<TypeDecl>> {
        self.members.iter().filter_map(|m| match m {
            Member::Type(decl) => Some(decl),
            Member::Method(_) => None,
        })
    }
}

/// Method or constructor declaration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MethodDecl {
    /// Method name; constructors carry the name of their class
    pub name: String,
    /// Constructor or compact record constructor
    pub is_constructor: bool,
    /// Whole declaration
    pub span: Span,
    /// Generic parameters
    pub type_params: Vec<TypeParam>,
    /// Formal parameters
    pub params: SmallVec<[Param; 4]>,
    /// Declared exceptions. `None` means there is no `throws` keyword at all.
    pub throws: Option<Vec<TypeRef>>,
    /// Location of the original `throws ...` clause
    pub throws_span: Option<Span>,
    /// End of the last header token before the `throws` clause
    pub header_end: usize,
    /// Simple names of the annotations on the declaration
    pub annotations: Vec<String>,
    /// Local and anonymous classes declared in the body
    pub local_types: Vec<Arc<TypeDecl>>,
    /// Identifiers in the signature and body, excluding the throws clause and local types
    pub references: Vec<NameRef>,
}

impl MethodDecl {
    /// Copy of this declaration with a different throws clause.
    ///
    /// `None` removes the clause; `Some(vec![])` is never produced by the rewriter.
    #[must_use]
    pub fn with_throws(&self, throws: Option<Vec<TypeRef>>) -> Self {
        Self {
            throws,
            ..self.clone()
        }
    }

    /// Copy of this declaration with new local types.
    #[must_use]
    pub fn with_local_types(&self, local_types: Vec<Arc<TypeDecl>>) -> Self {
        Self {
            local_types,
            ..self.clone()
        }
    }

    /// Whether the declaration carries the annotation, by simple name.
    #[must_use]
    pub fn has_annotation(&self, simple_name: &str) -> bool {
        self.annotations.iter().any(|a| a == simple_name)
    }

    /// Throws entries, empty when the clause is absent.
    #[must_use]
    pub fn throws_entries(&self) -> &[TypeRef] {
        self.throws.as_deref().unwrap_or(&[])
    }
}

/// A parsed `.java` file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompilationUnit {
    /// Declared package, if any
    pub package: Option<String>,
    /// Import declarations in source order
    pub imports: Vec<Arc<Import>>,
    /// Top-level type declarations
    pub types: Vec<Arc<TypeDecl>>,
}

impl CompilationUnit {
    /// Copy of this unit with new top-level types.
    #[must_use]
    pub fn with_types(&self, types: Vec<Arc<TypeDecl>>) -> Self {
        Self {
            types,
            ..self.clone()
        }
    }

    /// Copy of this unit with new imports.
    #[must_use]
    pub fn with_imports(&self, imports: Vec<Arc<Import>>) -> Self {
        Self {
            imports,
            ..self.clone()
        }
    }

    /// Package prefix used to build fully-qualified names, `""` for the default package.
    #[must_use]
    pub fn package_prefix(&self) -> String {
        self.package
            .as_ref()
            .map(|p| format!("{p}."))
            .unwrap_or_default()
    }

    /// Packages imported on demand (`import a.b.*;`).
    pub fn on_demand_imports(&self) -> impl Iterator<Item = &str> {
        self.imports
            .iter()
            .filter(|i| i.is_wildcard && !i.is_static)
            .map(|i| i.path.as_str())
    }

    /// Every type declared in the unit, outer types before their members.
    #[must_use]
    pub fn all_types(&self) -> Vec<&TypeDecl> {
        let mut out = Vec::new();
        for decl in &self.types {
            collect_types(decl, &mut out);
        }
        out
    }
}

fn collect_types<'a>(decl: &'a TypeDecl, out: &mut Vec<&'a TypeDecl>) {
    out.push(decl);
    for member in &decl.members {
        match member {
            Member::Type(nested) => collect_types(nested, out),
            Member::Method(method) => {
                for local in &method.local_types {
                    collect_types(local, out);
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn type_ref(text: &str) -> TypeRef {
        TypeRef {
            text: text.to_owned(),
            erased_text: text.to_owned(),
            span: Span::new(0, text.len()),
            fqn: None,
            certain: false,
            type_var: false,
        }
    }

    #[test]
    fn test_leading_name() {
        assert_eq!(type_ref("IOException").leading_name(), "IOException");
        assert_eq!(type_ref("java.io.IOException").leading_name(), "java");
        assert_eq!(type_ref("Outer.Inner[]").leading_name(), "Outer");
    }

    #[test]
    fn test_import_simple_name() {
        let import = Import {
            path: "java.io.IOException".to_owned(),
            is_static: false,
            is_wildcard: false,
            span: Span::new(0, 27),
            line_span: Span::new(0, 28),
        };
        assert_eq!(import.simple_name(), "IOException");
        assert!(import.imports_type("java.io.IOException"));
        assert!(!import.imports_type("java.io.File"));
    }
}
