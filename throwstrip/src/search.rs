//! Cheap checks that decide whether a file is worth rewriting at all.

use crate::matcher::MethodMatcher;
use crate::tree::CompilationUnit;

/// Passes files that declare at least one method whose name matches the pattern.
#[derive(Debug, Clone, Copy)]
pub struct DeclaresMethod<'m> {
    matcher: &'m MethodMatcher,
}

impl<'m> DeclaresMethod<'m> {
    /// Gate for the given matcher.
    #[must_use]
    pub fn new(matcher: &'m MethodMatcher) -> Self {
        Self { matcher }
    }

    /// Text-only rejection: a literal method name that never occurs cannot be declared.
    #[must_use]
    pub fn quick_reject(&self, source: &str) -> bool {
        self.matcher
            .literal_name()
            .is_some_and(|name| !source.contains(name))
    }

    /// Whether any method or constructor in the unit has a matching name.
    #[must_use]
    pub fn check(&self, unit: &CompilationUnit) -> bool {
        unit.all_types()
            .iter()
            .flat_map(|decl| decl.methods())
            .any(|method| self.matcher.name_matches(method))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tree::parse;

    #[test]
    fn test_quick_reject_literal_name() {
        let matcher = MethodMatcher::compile("A foo(..)", true).unwrap();
        let gate = DeclaresMethod::new(&matcher);
        assert!(gate.quick_reject("class A { void bar() {} }"));
        assert!(!gate.quick_reject("class A { void foo() {} }"));
    }

    #[test]
    fn test_glob_never_quick_rejects() {
        let matcher = MethodMatcher::compile("A f*(..)", true).unwrap();
        let gate = DeclaresMethod::new(&matcher);
        assert!(!gate.quick_reject("class A {}"));
    }

    #[test]
    fn test_check_sees_nested_and_anonymous_methods() {
        let matcher = MethodMatcher::compile("* run()", true).unwrap();
        let gate = DeclaresMethod::new(&matcher);
        let unit = parse(
            "class A { Object r = new Runnable() { public void run() {} }; }",
        )
        .unwrap();
        assert!(gate.check(&unit));

        let unit = parse("class A { void go() {} }").unwrap();
        assert!(!gate.check(&unit));
    }

    #[test]
    fn test_check_mentioned_but_not_declared() {
        let matcher = MethodMatcher::compile("A foo()", true).unwrap();
        let gate = DeclaresMethod::new(&matcher);
        let source = "class B { void bar() { new A().foo(); } }";
        assert!(!gate.quick_reject(source));
        assert!(!gate.check(&parse(source).unwrap()));
    }
}
