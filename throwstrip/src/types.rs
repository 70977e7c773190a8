//! Cross-file type index.
//!
//! Lowering attributes what a single file can prove. The index completes that
//! attribution for simple names that come from the same package or from an
//! on-demand import, and records the supertypes and method signatures that
//! override matching needs to walk.

use crate::tree::{CompilationUnit, TypeDecl, TypeKind, TypeRef};
use rustc_hash::FxHashMap;
use smallvec::SmallVec;

/// Erased parameter type of an indexed method.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParamType {
    /// Fully-qualified erasure, or the erased text when it could not be attributed
    Exact(String),
    /// A type variable of the method or its class; matches any reference type
    TypeVar,
}

/// Name and erased parameter list of an indexed method.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MethodSignature {
    /// Method name (class name for constructors)
    pub name: String,
    /// Erased parameters in order
    pub params: SmallVec<[ParamType; 4]>,
}

/// A supertype entry as declared, with its resolution if the index knows it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SuperRef {
    /// Best-known name: the fully-qualified name if attributed, otherwise the erased text
    pub name: String,
    /// Whether `name` is a type present in the index
    pub resolved: bool,
}

/// What the index knows about one declared type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TypeSummary {
    /// Fully-qualified name
    pub fqn: String,
    /// Declaration kind
    pub kind: TypeKind,
    /// Direct supertypes
    pub supertypes: SmallVec<[SuperRef; 2]>,
    /// Methods declared directly in the type
    pub methods: Vec<MethodSignature>,
}

impl TypeSummary {
    /// Whether the type declares a method with this name and exact erased parameters.
    #[must_use]
    pub fn declares(&self, name: &str, params: &[String]) -> bool {
        self.methods.iter().any(|m| {
            m.name == name
                && m.params.len() == params.len()
                && m.params.iter().zip(params).all(|(declared, actual)| match declared {
                    ParamType::Exact(erasure) => erasure == actual,
                    ParamType::TypeVar => !crate::constants::PRIMITIVE_TYPES().contains(actual.as_str()),
                })
        })
    }
}

/// Index of every type declared in a set of compilation units.
#[derive(Debug, Default)]
pub struct TypeIndex {
    types: FxHashMap<String, TypeSummary>,
}

impl TypeIndex {
    /// Build the index in two phases: register every declared name, then
    /// resolve supertypes and parameters against the complete name set.
    #[must_use]
    pub fn build<'a>(units: impl IntoIterator<Item = &'a CompilationUnit> + Clone) -> Self {
        let mut index = Self::default();

        for unit in units.clone() {
            for decl in unit.all_types() {
                index.types.insert(
                    decl.fqn.clone(),
                    TypeSummary {
                        fqn: decl.fqn.clone(),
                        kind: decl.kind,
                        supertypes: SmallVec::new(),
                        methods: Vec::new(),
                    },
                );
            }
        }

        let mut resolved = Vec::new();
        for unit in units {
            for decl in unit.all_types() {
                resolved.push(index.summarize(unit, decl));
            }
        }
        for summary in resolved {
            index.types.insert(summary.fqn.clone(), summary);
        }

        tracing::debug!(types = index.types.len(), "built type index");
        index
    }

    fn summarize(&self, unit: &CompilationUnit, decl: &TypeDecl) -> TypeSummary {
        let supertypes = decl
            .supertypes
            .iter()
            .map(|tref| match self.resolve(unit, tref) {
                Some(fqn) => SuperRef {
                    resolved: self.contains(&fqn),
                    name: fqn,
                },
                None => SuperRef {
                    name: tref.erased_text.clone(),
                    resolved: false,
                },
            })
            .collect();

        let methods = decl
            .methods()
            .map(|method| MethodSignature {
                name: method.name.clone(),
                params: method
                    .params
                    .iter()
                    .map(|p| {
                        if p.ty.type_var {
                            ParamType::TypeVar
                        } else {
                            ParamType::Exact(self.erasure(unit, &p.ty))
                        }
                    })
                    .collect(),
            })
            .collect();

        TypeSummary {
            fqn: decl.fqn.clone(),
            kind: decl.kind,
            supertypes,
            methods,
        }
    }

    /// Fully-qualified name of a type reference as seen from `unit`.
    ///
    /// Certain file-local attribution wins. A simple name that the file could
    /// not pin down is looked up in the unit's own package, then in each
    /// on-demand import, before falling back to the file-local guess.
    #[must_use]
    pub fn resolve(&self, unit: &CompilationUnit, tref: &TypeRef) -> Option<String> {
        if tref.certain {
            return tref.fqn.clone();
        }
        if tref.is_simple() {
            let (base, dims) = split_dims(&tref.erased_text);
            let same_package = format!("{}{base}", unit.package_prefix());
            if self.contains(&same_package) {
                return Some(format!("{same_package}{dims}"));
            }
            for package in unit.on_demand_imports() {
                let candidate = format!("{package}.{base}");
                if self.contains(&candidate) {
                    return Some(format!("{candidate}{dims}"));
                }
            }
        }
        tref.fqn.clone()
    }

    /// Erasure of a type reference for signature comparison.
    ///
    /// Unattributed references compare by their erased text.
    #[must_use]
    pub fn erasure(&self, unit: &CompilationUnit, tref: &TypeRef) -> String {
        self.resolve(unit, tref)
            .unwrap_or_else(|| tref.erased_text.clone())
    }

    /// Summary of an indexed type.
    #[must_use]
    pub fn get(&self, fqn: &str) -> Option<&TypeSummary> {
        self.types.get(fqn)
    }

    /// Whether the type is declared in one of the indexed units.
    #[must_use]
    pub fn contains(&self, fqn: &str) -> bool {
        self.types.contains_key(fqn)
    }

    /// Number of indexed types.
    #[must_use]
    pub fn len(&self) -> usize {
        self.types.len()
    }

    /// Whether the index holds no types.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.types.is_empty()
    }
}

fn split_dims(erased: &str) -> (&str, &str) {
    match erased.find('[') {
        Some(pos) => (&erased[..pos], &erased[pos..]),
        None => (erased, ""),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tree::parse;

    #[test]
    fn test_same_package_resolution() {
        let a = parse("package p;\nclass A implements Itf { public void foo(Thing t) {} }").unwrap();
        let itf = parse("package p;\ninterface Itf { void foo(Thing t); }").unwrap();
        let thing = parse("package p;\nclass Thing {}").unwrap();
        let index = TypeIndex::build([&a, &itf, &thing]);

        assert_eq!(index.len(), 3);
        let summary = index.get("p.A").unwrap();
        assert_eq!(
            summary.supertypes[0],
            SuperRef {
                name: "p.Itf".to_owned(),
                resolved: true
            }
        );
        assert!(index
            .get("p.Itf")
            .unwrap()
            .declares("foo", &["p.Thing".to_owned()]));
    }

    #[test]
    fn test_on_demand_import_resolution() {
        let a = parse("package p;\nimport q.*;\nclass A extends Base {}").unwrap();
        let base = parse("package q;\npublic class Base {}").unwrap();
        let index = TypeIndex::build([&a, &base]);

        let summary = index.get("p.A").unwrap();
        assert_eq!(summary.supertypes[0].name, "q.Base");
        assert!(summary.supertypes[0].resolved);
    }

    #[test]
    fn test_external_supertype_unresolved() {
        let a = parse("import java.util.concurrent.Callable;\nclass A implements Callable<String> {}")
            .unwrap();
        let index = TypeIndex::build([&a]);

        let summary = index.get("A").unwrap();
        assert_eq!(summary.supertypes[0].name, "java.util.concurrent.Callable");
        assert!(!summary.supertypes[0].resolved);
    }

    #[test]
    fn test_type_var_param_matches_reference_types() {
        let unit = parse("interface Box<T> { void put(T value); }").unwrap();
        let index = TypeIndex::build([&unit]);

        let summary = index.get("Box").unwrap();
        assert!(summary.declares("put", &["java.lang.String".to_owned()]));
        assert!(!summary.declares("put", &["int".to_owned()]));
    }
}
