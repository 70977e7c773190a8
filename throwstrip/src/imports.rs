//! Import cleanup after a throws entry was removed.

use crate::tree::{CompilationUnit, TypeDecl};
use rustc_hash::FxHashSet;
use std::sync::Arc;

/// Remove the single-type import of `fqn` if nothing in the unit refers to it anymore.
///
/// Wildcard and static imports are never touched. Kept imports remain the
/// same `Arc`s, and the unit is returned as-is when nothing is removed.
#[must_use]
pub fn maybe_remove_import(unit: CompilationUnit, fqn: &str) -> CompilationUnit {
    let Some(import) = unit.imports.iter().find(|i| i.imports_type(fqn)) else {
        return unit;
    };
    let simple_name = import.simple_name().to_owned();

    if referenced_names(&unit).contains(simple_name.as_str()) {
        tracing::trace!(import = %fqn, "import still referenced");
        return unit;
    }

    tracing::debug!(import = %fqn, "removing unused import");
    let imports = unit
        .imports
        .iter()
        .filter(|i| !i.imports_type(fqn))
        .map(Arc::clone)
        .collect();
    unit.with_imports(imports)
}

/// Every identifier that could resolve through an import.
#[must_use]
pub fn referenced_names(unit: &CompilationUnit) -> FxHashSet<&str> {
    let mut names = FxHashSet::default();
    for decl in &unit.types {
        collect(decl, &mut names);
    }
    names
}

fn collect<'u>(decl: &'u TypeDecl, names: &mut FxHashSet<&'u str>) {
    names.extend(decl.references.iter().map(|r| r.name.as_str()));
    for nested in decl.nested_types() {
        collect(nested, names);
    }
    for method in decl.methods() {
        names.extend(method.references.iter().map(|r| r.name.as_str()));
        names.extend(method.throws_entries().iter().map(|t| t.leading_name()));
        for local in &method.local_types {
            collect(local, names);
        }
    }
}
