//! Lowering from the tree-sitter CST into the immutable tree.
//!
//! Lowering also performs file-local attribution: every `TypeRef` gets the
//! fully-qualified erasure that the file alone can prove (qualified text,
//! single-type imports, types declared in the file, primitives, type
//! variables) or the implicit `java.lang` guess. Everything else stays `None`
//! and may be completed later by a `TypeIndex`.

use super::{
    CompilationUnit, Import, Member, MethodDecl, NameRef, Param, Span, TypeDecl, TypeKind,
    TypeParam, TypeRef,
};
use crate::constants::{JAVA_LANG_PACKAGE, JAVA_LANG_TYPES, OBJECT_FQN, PRIMITIVE_TYPES};
use crate::cst::{CstError, CstNode, CstParser, CstTree};
use rustc_hash::FxHashMap;
use smallvec::SmallVec;
use std::sync::Arc;
use thiserror::Error;

/// Error produced while turning source text into a `CompilationUnit`.
#[derive(Debug, Error)]
pub enum ParseError {
    /// Tree-sitter could not be set up or gave up
    #[error(transparent)]
    Cst(#[from] CstError),
    /// The grammar had to recover from invalid syntax
    #[error("syntax error at line {line}, column {column}")]
    Syntax {
        /// 1-indexed line
        line: usize,
        /// 1-indexed column
        column: usize,
    },
}

/// Parse Java source into an immutable `CompilationUnit`.
///
/// Sources with syntax errors are rejected rather than partially lowered, so
/// a rewrite never operates on a recovered tree.
///
/// # Errors
///
/// Returns `ParseError::Syntax` when the source does not parse cleanly.
pub fn parse(source: &str) -> Result<CompilationUnit, ParseError> {
    let mut parser = CstParser::new()?;
    let tree = parser.parse(source)?;
    if let Some(point) = tree.first_error {
        return Err(ParseError::Syntax {
            line: point.row + 1,
            column: point.column + 1,
        });
    }
    Ok(Lowerer::new(&tree).lower())
}

fn is_type_declaration(kind: &str) -> bool {
    matches!(
        kind,
        "class_declaration"
            | "interface_declaration"
            | "enum_declaration"
            | "record_declaration"
            | "annotation_type_declaration"
    )
}

fn is_method_declaration(kind: &str) -> bool {
    matches!(
        kind,
        "method_declaration" | "constructor_declaration" | "compact_constructor_declaration"
    )
}

/// Class body that belongs to an anonymous class or an enum constant.
fn is_anonymous_body(node: &CstNode, parent_kind: &str) -> bool {
    node.kind == "class_body"
        && matches!(parent_kind, "object_creation_expression" | "enum_constant")
}

/// Drop annotations and type arguments, remove whitespace, write varargs as `[]`.
fn erase(text: &str) -> String {
    let chars: Vec<char> = text.chars().collect();
    let mut out = String::with_capacity(text.len());
    let mut depth = 0usize;
    let mut i = 0;
    while i < chars.len() {
        let c = chars[i];
        match c {
            '<' => depth += 1,
            '>' => depth = depth.saturating_sub(1),
            '@' if depth == 0 => {
                // Skip the annotation name and its argument list.
                i += 1;
                while i < chars.len()
                    && (chars[i].is_alphanumeric() || matches!(chars[i], '_' | '$' | '.'))
                {
                    i += 1;
                }
                while i < chars.len() && chars[i].is_whitespace() {
                    i += 1;
                }
                if i < chars.len() && chars[i] == '(' {
                    let mut parens = 0usize;
                    while i < chars.len() {
                        match chars[i] {
                            '(' => parens += 1,
                            ')' => {
                                parens -= 1;
                                if parens == 0 {
                                    i += 1;
                                    break;
                                }
                            }
                            _ => {}
                        }
                        i += 1;
                    }
                }
                continue;
            }
            _ if depth > 0 || c.is_whitespace() => {}
            _ => out.push(c),
        }
        i += 1;
    }
    out.replace("...", "[]")
}

/// Split `a.b.C[][]` into `("a.b.C", "[][]")`.
fn split_dims(erased: &str) -> (&str, &str) {
    match erased.find('[') {
        Some(pos) => (&erased[..pos], &erased[pos..]),
        None => (erased, ""),
    }
}

/// Span to delete for an import: its whole line when it is alone there,
/// otherwise the import plus the blanks separating it from its neighbour.
fn line_span(source: &str, start: usize, end: usize) -> Span {
    let line_start = source[..start].rfind('\n').map_or(0, |p| p + 1);
    let rest = &source[end..];
    let newline = rest.find('\n');
    let after = &rest[..newline.unwrap_or(rest.len())];
    let before = &source[line_start..start];

    if before.trim().is_empty() && after.trim().is_empty() {
        let line_end = newline.map_or(source.len(), |p| end + p + 1);
        Span::new(line_start, line_end)
    } else if before.trim().is_empty() {
        let blanks = after.len() - after.trim_start_matches([' ', '\t']).len();
        Span::new(start, end + blanks)
    } else {
        let blanks = before.len() - before.trim_end_matches([' ', '\t']).len();
        Span::new(start - blanks, end)
    }
}

/// Resolution of an erased type name.
struct Attribution {
    fqn: Option<String>,
    certain: bool,
    type_var: bool,
}

struct Lowerer<'t> {
    tree: &'t CstTree,
    package_prefix: String,
    /// simple name -> fqn of single-type imports
    single_imports: FxHashMap<String, String>,
    /// enclosing type fqn ("" for the file) -> simple name -> fqn of its member types
    declared: FxHashMap<String, FxHashMap<String, String>>,
    /// type variables in scope, innermost last
    type_vars: Vec<TypeParam>,
    /// (fqn, anonymous classes seen so far) for each open type, innermost last
    anonymous: Vec<(String, usize)>,
}

impl<'t> Lowerer<'t> {
    fn new(tree: &'t CstTree) -> Self {
        Self {
            tree,
            package_prefix: String::new(),
            single_imports: FxHashMap::default(),
            declared: FxHashMap::default(),
            type_vars: Vec::new(),
            anonymous: Vec::new(),
        }
    }

    fn text(&self, node: &CstNode) -> &'t str {
        let tree = self.tree;
        tree.text(node)
    }

    fn span(node: &CstNode) -> Span {
        Span::new(node.start_byte, node.end_byte)
    }

    fn qualify(&self, parent: Option<&str>, name: &str) -> String {
        match parent {
            Some(p) => format!("{p}.{name}"),
            None => format!("{}{name}", self.package_prefix),
        }
    }

    fn lower(mut self) -> CompilationUnit {
        let tree = self.tree;
        let root = &tree.root;

        let package = root
            .child_of_kind("package_declaration")
            .and_then(|p| {
                p.named_children()
                    .find(|c| c.kind == "scoped_identifier" || c.kind == "identifier")
            })
            .map(|n| self.text(n).to_owned());
        if let Some(p) = &package {
            self.package_prefix = format!("{p}.");
        }

        let imports: Vec<Arc<Import>> = root
            .children
            .iter()
            .filter(|c| c.kind == "import_declaration")
            .map(|n| Arc::new(self.lower_import(n)))
            .collect();
        for import in &imports {
            if !import.is_static && !import.is_wildcard {
                self.single_imports
                    .insert(import.simple_name().to_owned(), import.path.clone());
            }
        }

        for child in root.named_children() {
            self.register_member_types(child, None);
        }

        let types = root
            .named_children()
            .filter(|c| is_type_declaration(&c.kind))
            .map(|c| Arc::new(self.lower_type(c, None)))
            .collect();

        CompilationUnit {
            package,
            imports,
            types,
        }
    }

    fn lower_import(&self, node: &CstNode) -> Import {
        let path = node
            .named_children()
            .find(|c| c.kind == "scoped_identifier" || c.kind == "identifier")
            .map(|n| self.text(n).to_owned())
            .unwrap_or_default();

        Import {
            path,
            is_static: node.children.iter().any(|c| c.kind == "static"),
            is_wildcard: node.children.iter().any(|c| c.kind == "asterisk"),
            span: Self::span(node),
            line_span: line_span(&self.tree.source, node.start_byte, node.end_byte),
        }
    }

    /// Register top-level and member types up front so forward references resolve.
    fn register_member_types(&mut self, node: &CstNode, parent: Option<&str>) {
        if !is_type_declaration(&node.kind) {
            return;
        }
        let Some(name) = node.child_by_field("name").map(|n| self.text(n)) else {
            return;
        };
        let fqn = self.qualify(parent, name);
        self.declare(parent, name, &fqn);

        if let Some(body) = node.child_by_field("body") {
            for member in body.named_children() {
                if member.kind == "enum_body_declarations" {
                    for inner in member.named_children() {
                        self.register_member_types(inner, Some(&fqn));
                    }
                } else {
                    self.register_member_types(member, Some(&fqn));
                }
            }
        }
    }

    /// Record `name` as a member type of `parent`, or as a top-level type.
    fn declare(&mut self, parent: Option<&str>, name: &str, fqn: &str) {
        self.declared
            .entry(parent.unwrap_or_default().to_owned())
            .or_default()
            .entry(name.to_owned())
            .or_insert_with(|| fqn.to_owned());
    }

    /// Type declared in this file that `name` denotes from the current scope.
    ///
    /// Member types are only visible inside their enclosing types, innermost
    /// first. Top-level types of the file are visible everywhere.
    fn declared_type(&self, name: &str) -> Option<&String> {
        self.anonymous
            .iter()
            .rev()
            .map(|(fqn, _)| fqn.as_str())
            .chain(std::iter::once(""))
            .find_map(|scope| self.declared.get(scope)?.get(name))
    }

    fn lower_type(&mut self, node: &CstNode, parent: Option<&str>) -> TypeDecl {
        let kind = match node.kind.as_str() {
            "interface_declaration" => TypeKind::Interface,
            "enum_declaration" => TypeKind::Enum,
            "record_declaration" => TypeKind::Record,
            "annotation_type_declaration" => TypeKind::Annotation,
            _ => TypeKind::Class,
        };
        let name = node
            .child_by_field("name")
            .map(|n| self.text(n).to_owned())
            .unwrap_or_default();
        let fqn = self.qualify(parent, &name);
        self.declare(parent, &name, &fqn);

        let scope = self.type_vars.len();
        let type_params = self.lower_type_params(node.child_by_field("type_parameters"));
        self.type_vars.extend(type_params.iter().cloned());
        let supertypes = self.lower_supertypes(node);
        self.anonymous.push((fqn.clone(), 0));

        let record_params = if kind == TypeKind::Record {
            node.child_by_field("parameters")
                .map(|p| self.lower_params(p))
                .unwrap_or_default()
        } else {
            SmallVec::new()
        };

        let members = match node.child_by_field("body") {
            Some(body) => self.lower_body(body, &fqn, &name, &record_params),
            None => Vec::new(),
        };
        let references = self.collect_type_references(node);

        self.anonymous.pop();
        self.type_vars.truncate(scope);

        TypeDecl {
            kind,
            name,
            fqn,
            span: Self::span(node),
            type_params,
            supertypes,
            members,
            references,
        }
    }

    fn lower_type_params(&mut self, node: Option<&CstNode>) -> Vec<TypeParam> {
        let Some(node) = node else {
            return Vec::new();
        };
        node.named_children()
            .filter(|c| c.kind == "type_parameter")
            .map(|param| {
                let name = param
                    .named_children()
                    .find(|c| c.kind == "type_identifier" || c.kind == "identifier")
                    .map(|n| self.text(n).to_owned())
                    .unwrap_or_default();
                let bound = param
                    .child_of_kind("type_bound")
                    .and_then(|b| b.named_children().next())
                    .map(|t| self.lower_type_ref(t));
                TypeParam { name, bound }
            })
            .collect()
    }

    fn lower_supertypes(&mut self, node: &CstNode) -> SmallVec<[TypeRef; 2]> {
        let mut supertypes = SmallVec::new();
        if let Some(superclass) = node.child_of_kind("superclass") {
            if let Some(ty) = superclass.named_children().next() {
                supertypes.push(self.lower_type_ref(ty));
            }
        }
        for clause in ["super_interfaces", "extends_interfaces"] {
            if let Some(list) = node
                .child_of_kind(clause)
                .and_then(|c| c.child_of_kind("type_list"))
            {
                for ty in list.named_children() {
                    supertypes.push(self.lower_type_ref(ty));
                }
            }
        }
        supertypes
    }

    fn lower_body(
        &mut self,
        body: &CstNode,
        owner_fqn: &str,
        owner_name: &str,
        record_params: &SmallVec<[Param; 4]>,
    ) -> Vec<Member> {
        let mut members = Vec::new();
        for child in body.named_children() {
            match child.kind.as_str() {
                kind if is_method_declaration(kind) => {
                    let method = self.lower_method(child, owner_fqn, owner_name, record_params);
                    members.push(Member::Method(Arc::new(method)));
                }
                kind if is_type_declaration(kind) => {
                    let nested = self.lower_type(child, Some(owner_fqn));
                    members.push(Member::Type(Arc::new(nested)));
                }
                "enum_body_declarations" => {
                    members.extend(self.lower_body(child, owner_fqn, owner_name, record_params));
                }
                "enum_constant" => {
                    if let Some(args) = child.child_by_field("arguments") {
                        members.extend(
                            self.lower_embedded_types(args, owner_fqn)
                                .into_iter()
                                .map(Member::Type),
                        );
                    }
                    if let Some(constant_body) = child.child_of_kind("class_body") {
                        let enum_ref = TypeRef {
                            text: owner_name.to_owned(),
                            erased_text: owner_name.to_owned(),
                            span: Self::span(child),
                            fqn: Some(owner_fqn.to_owned()),
                            certain: true,
                            type_var: false,
                        };
                        let decl = self.lower_anonymous(child, constant_body, enum_ref);
                        members.push(Member::Type(Arc::new(decl)));
                    }
                }
                _ => {
                    members.extend(
                        self.lower_embedded_types(child, owner_fqn)
                            .into_iter()
                            .map(Member::Type),
                    );
                }
            }
        }
        members
    }

    /// Local and anonymous classes reachable from `node` without crossing another type.
    fn lower_embedded_types(&mut self, node: &CstNode, owner_fqn: &str) -> Vec<Arc<TypeDecl>> {
        let mut found = Vec::new();
        self.find_embedded_types(node, owner_fqn, &mut found);
        found
    }

    fn find_embedded_types(
        &mut self,
        node: &CstNode,
        owner_fqn: &str,
        found: &mut Vec<Arc<TypeDecl>>,
    ) {
        for child in &node.children {
            if is_type_declaration(&child.kind) {
                found.push(Arc::new(self.lower_type(child, Some(owner_fqn))));
            } else if child.kind == "object_creation_expression" {
                if let Some(args) = child.child_by_field("arguments") {
                    self.find_embedded_types(args, owner_fqn, found);
                }
                match (child.child_of_kind("class_body"), child.child_by_field("type")) {
                    (Some(body), Some(ty)) => {
                        let supertype = self.lower_type_ref(ty);
                        found.push(Arc::new(self.lower_anonymous(child, body, supertype)));
                    }
                    _ => {
                        // Plain `new T(..)`: only the arguments can hold classes,
                        // and they were scanned above.
                    }
                }
            } else {
                self.find_embedded_types(child, owner_fqn, found);
            }
        }
    }

    fn lower_anonymous(&mut self, node: &CstNode, body: &CstNode, supertype: TypeRef) -> TypeDecl {
        let (fqn, ordinal) = match self.anonymous.last_mut() {
            Some((owner, count)) => {
                *count += 1;
                (format!("{owner}${count}"), *count)
            }
            None => (format!("{}$1", self.package_prefix), 1),
        };
        let name = ordinal.to_string();

        self.anonymous.push((fqn.clone(), 0));
        let members = self.lower_body(body, &fqn, &name, &SmallVec::new());
        let references = self.collect_type_references(body);
        self.anonymous.pop();

        let mut supertypes = SmallVec::new();
        supertypes.push(supertype);

        TypeDecl {
            kind: TypeKind::Anonymous,
            name,
            fqn,
            span: Self::span(node),
            type_params: Vec::new(),
            supertypes,
            members,
            references,
        }
    }

    fn lower_method(
        &mut self,
        node: &CstNode,
        owner_fqn: &str,
        owner_name: &str,
        record_params: &SmallVec<[Param; 4]>,
    ) -> MethodDecl {
        let is_constructor = node.kind != "method_declaration";
        let name = if is_constructor {
            owner_name.to_owned()
        } else {
            node.child_by_field("name")
                .map(|n| self.text(n).to_owned())
                .unwrap_or_default()
        };

        let scope = self.type_vars.len();
        let type_params = self.lower_type_params(node.child_by_field("type_parameters"));
        self.type_vars.extend(type_params.iter().cloned());

        let params = if node.kind == "compact_constructor_declaration" {
            record_params.clone()
        } else {
            node.child_by_field("parameters")
                .map(|p| self.lower_params(p))
                .unwrap_or_default()
        };

        let mut throws = None;
        let mut throws_span = None;
        let mut header_end = node
            .child_by_field("parameters")
            .map_or(node.start_byte, |p| p.end_byte);
        if let Some(index) = node.children.iter().position(|c| c.kind == "throws") {
            let clause = &node.children[index];
            if let Some(previous) = index.checked_sub(1).map(|i| &node.children[i]) {
                header_end = previous.end_byte;
            }
            throws = Some(
                clause
                    .named_children()
                    .filter(|c| !c.kind.ends_with("comment"))
                    .map(|t| self.lower_type_ref(t))
                    .collect(),
            );
            throws_span = Some(Self::span(clause));
        }

        let annotations = node
            .child_of_kind("modifiers")
            .map(|mods| {
                mods.named_children()
                    .filter(|c| c.kind == "marker_annotation" || c.kind == "annotation")
                    .filter_map(|a| a.child_by_field("name"))
                    .map(|n| {
                        let text = self.text(n);
                        text.rsplit('.').next().unwrap_or(text).to_owned()
                    })
                    .collect()
            })
            .unwrap_or_default();

        let local_types = node
            .child_by_field("body")
            .map(|body| self.lower_embedded_types(body, owner_fqn))
            .unwrap_or_default();

        let mut references = Vec::new();
        self.collect_names(node, &node.kind, &mut references, &|child, parent_kind| {
            child.kind == "throws"
                || is_type_declaration(&child.kind)
                || is_anonymous_body(child, parent_kind)
        });

        self.type_vars.truncate(scope);

        MethodDecl {
            name,
            is_constructor,
            span: Self::span(node),
            type_params,
            params,
            throws,
            throws_span,
            header_end,
            annotations,
            local_types,
            references,
        }
    }

    fn lower_params(&mut self, node: &CstNode) -> SmallVec<[Param; 4]> {
        let mut params = SmallVec::new();
        for child in node.named_children() {
            match child.kind.as_str() {
                "formal_parameter" => {
                    let Some(ty) = child.child_by_field("type") else {
                        continue;
                    };
                    let extra_dims = child
                        .child_by_field("dimensions")
                        .map_or(0, |d| self.text(d).matches('[').count());
                    let name = child
                        .child_by_field("name")
                        .map(|n| self.text(n).to_owned())
                        .unwrap_or_default();
                    params.push(Param {
                        ty: self.lower_param_type(ty, extra_dims),
                        name,
                    });
                }
                "spread_parameter" => {
                    let Some(ty) = child.named_children().find(|c| {
                        !matches!(
                            c.kind.as_str(),
                            "modifiers" | "variable_declarator" | "annotation" | "marker_annotation"
                        )
                    }) else {
                        continue;
                    };
                    let name = child
                        .child_of_kind("variable_declarator")
                        .and_then(|v| v.child_by_field("name"))
                        .map(|n| self.text(n).to_owned())
                        .unwrap_or_default();
                    params.push(Param {
                        ty: self.lower_param_type(ty, 1),
                        name,
                    });
                }
                _ => {}
            }
        }
        params
    }

    /// Parameter type with C-style dimensions or varargs folded into the erasure.
    fn lower_param_type(&mut self, node: &CstNode, extra_dims: usize) -> TypeRef {
        let mut ty = self.lower_type_ref(node);
        if extra_dims > 0 {
            let dims = "[]".repeat(extra_dims);
            ty.erased_text.push_str(&dims);
            if let Some(fqn) = ty.fqn.as_mut() {
                fqn.push_str(&dims);
            }
        }
        ty
    }

    fn lower_type_ref(&mut self, node: &CstNode) -> TypeRef {
        let text = self.text(node).to_owned();
        let erased_text = erase(&text);
        let attribution = self.attribute(&erased_text);
        TypeRef {
            text,
            erased_text,
            span: Self::span(node),
            fqn: attribution.fqn,
            certain: attribution.certain,
            type_var: attribution.type_var,
        }
    }

    fn attribute(&self, erased: &str) -> Attribution {
        let (base, dims) = split_dims(erased);
        let certain = |fqn: String| Attribution {
            fqn: Some(fqn),
            certain: true,
            type_var: false,
        };

        if PRIMITIVE_TYPES().contains(base) {
            return certain(erased.to_owned());
        }

        match base.split_once('.') {
            None => {
                if let Some(param) = self.type_vars.iter().rev().find(|p| p.name == base) {
                    let bound = param
                        .bound
                        .as_ref()
                        .map(|b| b.fqn.clone().unwrap_or_else(|| b.erased_text.clone()))
                        .unwrap_or_else(|| OBJECT_FQN.to_owned());
                    return Attribution {
                        fqn: Some(format!("{bound}{dims}")),
                        certain: true,
                        type_var: true,
                    };
                }
                if let Some(fqn) = self.declared_type(base) {
                    return certain(format!("{fqn}{dims}"));
                }
                if let Some(fqn) = self.single_imports.get(base) {
                    return certain(format!("{fqn}{dims}"));
                }
                if JAVA_LANG_TYPES().contains(base) {
                    return Attribution {
                        fqn: Some(format!("{JAVA_LANG_PACKAGE}.{base}{dims}")),
                        certain: false,
                        type_var: false,
                    };
                }
                Attribution {
                    fqn: None,
                    certain: false,
                    type_var: false,
                }
            }
            Some((head, rest)) => {
                if let Some(fqn) = self
                    .declared_type(head)
                    .or_else(|| self.single_imports.get(head))
                {
                    return certain(format!("{fqn}.{rest}{dims}"));
                }
                if JAVA_LANG_TYPES().contains(head) {
                    return Attribution {
                        fqn: Some(format!("{JAVA_LANG_PACKAGE}.{erased}")),
                        certain: false,
                        type_var: false,
                    };
                }
                certain(erased.to_owned())
            }
        }
    }

    fn collect_type_references(&self, node: &CstNode) -> Vec<NameRef> {
        let mut references = Vec::new();
        self.collect_names(node, &node.kind, &mut references, &|child, parent_kind| {
            is_method_declaration(&child.kind)
                || is_type_declaration(&child.kind)
                || is_anonymous_body(child, parent_kind)
        });
        references
    }

    fn collect_names(
        &self,
        node: &CstNode,
        node_kind: &str,
        out: &mut Vec<NameRef>,
        stop: &dyn Fn(&CstNode, &str) -> bool,
    ) {
        for child in &node.children {
            if stop(child, node_kind) {
                continue;
            }
            if child.kind == "identifier" || child.kind == "type_identifier" {
                out.push(NameRef {
                    name: self.text(child).to_owned(),
                    span: Self::span(child),
                });
            } else {
                self.collect_names(child, &child.kind, out, stop);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn only_type(unit: &CompilationUnit) -> &TypeDecl {
        assert_eq!(unit.types.len(), 1);
        &unit.types[0]
    }

    #[test]
    fn test_erase() {
        assert_eq!(erase("List<String>"), "List");
        assert_eq!(erase("java.util.Map<K, List<V>>[]"), "java.util.Map[]");
        assert_eq!(erase("@NonNull String"), "String");
        assert_eq!(erase("@Size(max = 3) int"), "int");
        assert_eq!(erase("String..."), "String[]");
    }

    #[test]
    fn test_line_span_alone_on_line() {
        let source = "import a.B;\nclass C {}\n";
        let span = line_span(source, 0, 11);
        assert_eq!(span, Span::new(0, 12));
    }

    #[test]
    fn test_line_span_shared_line() {
        let source = "import a.B;  import a.C;\n";
        assert_eq!(line_span(source, 0, 11), Span::new(0, 13));
        assert_eq!(line_span(source, 13, 24), Span::new(11, 24));
    }

    #[test]
    fn test_lower_package_imports_and_throws() {
        let source = r"package com.example;

import java.io.IOException;
import java.util.*;

class A {
    public void foo() throws IOException, IllegalArgumentException {
    }
}
";
        let unit = parse(source).unwrap();
        assert_eq!(unit.package.as_deref(), Some("com.example"));
        assert_eq!(unit.imports.len(), 2);
        assert!(unit.imports[1].is_wildcard);

        let class = only_type(&unit);
        assert_eq!(class.fqn, "com.example.A");
        let method = class.methods().next().unwrap();
        let throws = method.throws.as_ref().unwrap();
        assert_eq!(throws.len(), 2);
        assert_eq!(throws[0].fqn.as_deref(), Some("java.io.IOException"));
        assert!(throws[0].certain);
        assert_eq!(
            throws[1].fqn.as_deref(),
            Some("java.lang.IllegalArgumentException")
        );
        assert!(!throws[1].certain);
        assert_eq!(&source[method.header_end..method.header_end + 1], " ");
    }

    #[test]
    fn test_lower_absent_throws_is_none() {
        let unit = parse("class A { void foo() {} }").unwrap();
        let method = only_type(&unit).methods().next().unwrap();
        assert!(method.throws.is_none());
        assert!(method.throws_span.is_none());
    }

    #[test]
    fn test_lower_unresolvable_throws() {
        let unit = parse("import x.*;\nclass A { void foo() throws Custom {} }").unwrap();
        let method = only_type(&unit).methods().next().unwrap();
        assert!(method.throws_entries()[0].fqn.is_none());
    }

    #[test]
    fn test_lower_supertypes_and_annotations() {
        let source = r"
interface Itf { void foo(); }
class A extends Base implements Itf, java.io.Serializable {
    @Override
    public void foo() {}
}
";
        let unit = parse(source).unwrap();
        let class = &unit.types[1];
        let names: Vec<_> = class
            .supertypes
            .iter()
            .map(|s| s.erased_text.as_str())
            .collect();
        assert_eq!(names, ["Base", "Itf", "java.io.Serializable"]);
        assert_eq!(class.supertypes[1].fqn.as_deref(), Some("Itf"));
        let method = class.methods().next().unwrap();
        assert!(method.has_annotation("Override"));
    }

    #[test]
    fn test_lower_params_generics_and_varargs() {
        let source = r"
import java.util.List;
class A {
    <T extends Number> void foo(List<String> a, int[] b, String c[], T d, Object... e) {}
}
";
        let unit = parse(source).unwrap();
        let method = only_type(&unit).methods().next().unwrap();
        let fqns: Vec<_> = method
            .params
            .iter()
            .map(|p| p.ty.fqn.clone().unwrap_or_default())
            .collect();
        assert_eq!(
            fqns,
            [
                "java.util.List",
                "int[]",
                "java.lang.String[]",
                "java.lang.Number",
                "java.lang.Object[]",
            ]
        );
        assert!(method.params[3].ty.type_var);
    }

    #[test]
    fn test_lower_nested_local_and_anonymous_types() {
        let source = r"
package p;
class Outer {
    static class Inner {}
    void run() {
        class Local {}
        Runnable r = new Runnable() {
            public void run() {}
        };
    }
}
";
        let unit = parse(source).unwrap();
        let fqns: Vec<_> = unit.all_types().iter().map(|t| t.fqn.clone()).collect();
        assert_eq!(fqns, ["p.Outer", "p.Outer.Inner", "p.Outer.Local", "p.Outer$1"]);

        let anonymous = unit.all_types()[3];
        assert_eq!(anonymous.kind, TypeKind::Anonymous);
        assert_eq!(anonymous.supertypes[0].fqn.as_deref(), Some("java.lang.Runnable"));
    }

    #[test]
    fn test_lower_enum_constant_body() {
        let source = r"
enum Op {
    PLUS {
        int apply(int a) { return a; }
    };
    int apply(int a) { return 0; }
}
";
        let unit = parse(source).unwrap();
        let types = unit.all_types();
        assert_eq!(types.len(), 2);
        assert_eq!(types[1].supertypes[0].fqn.as_deref(), Some("Op"));
        assert_eq!(types[1].methods().count(), 1);
    }

    #[test]
    fn test_method_references_exclude_throws() {
        let source = "class A { void foo() throws IOException { new IOException(); } }";
        let unit = parse(source).unwrap();
        let method = only_type(&unit).methods().next().unwrap();
        let count = method
            .references
            .iter()
            .filter(|r| r.name == "IOException")
            .count();
        assert_eq!(count, 1);
    }

    #[test]
    fn test_member_types_scoped_to_enclosing_types() {
        let source = r"
package p;
import java.io.IOException;
class A {
    void foo() throws IOException {}
}
class B {
    static class IOException extends Exception {}
    class Inner {
        void bar() throws IOException {}
    }
}
";
        let unit = parse(source).unwrap();
        let throws_of = |fqn: &str| {
            let decl = unit.all_types().into_iter().find(|t| t.fqn == fqn).unwrap();
            let method = decl.methods().next().unwrap();
            method.throws_entries()[0].fqn.clone()
        };
        assert_eq!(throws_of("p.A").as_deref(), Some("java.io.IOException"));
        assert_eq!(throws_of("p.B.Inner").as_deref(), Some("p.B.IOException"));
    }

    #[test]
    fn test_type_variable_in_throws_is_marked() {
        let unit = parse("class A { <E extends Exception> void foo() throws E {} }").unwrap();
        let method = only_type(&unit).methods().next().unwrap();
        assert!(method.throws_entries()[0].type_var);
    }

    #[test]
    fn test_syntax_error_rejected() {
        let err = parse("class A { void foo( }").unwrap_err();
        assert!(matches!(err, ParseError::Syntax { .. }));
    }
}
