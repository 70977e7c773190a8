//! Tests for method pattern compilation and matching against parsed sources.
#![allow(clippy::unwrap_used)]

use throwstrip::matcher::{MethodMatcher, PatternError};
use throwstrip::tree::{self, CompilationUnit};
use throwstrip::types::TypeIndex;

// =============================================================================
// Compilation errors
// =============================================================================

#[test]
fn test_pattern_errors() {
    let cases = [
        ("", PatternError::Empty),
        ("   ", PatternError::Empty),
        ("A foo", PatternError::MissingParameters),
        ("A foo)", PatternError::UnbalancedParentheses),
        ("A foo((..)", PatternError::UnbalancedParentheses),
        ("A foo)(", PatternError::UnbalancedParentheses),
        ("foo(..)", PatternError::MissingTargetType),
        ("(..)", PatternError::MissingMethodName),
        (
            "A foo(..) extra",
            PatternError::TrailingInput("extra".to_owned()),
        ),
        (
            "a-b foo()",
            PatternError::InvalidTypePattern("a-b".to_owned()),
        ),
        ("A 1foo()", PatternError::InvalidMethodName("1foo".to_owned())),
        (
            "A foo(int, a-b)",
            PatternError::InvalidArgument {
                position: 2,
                arg: "a-b".to_owned(),
            },
        ),
    ];

    for (pattern, expected) in cases {
        assert_eq!(
            MethodMatcher::compile(pattern, true).unwrap_err(),
            expected,
            "pattern `{pattern}`"
        );
    }
}

#[test]
fn test_valid_patterns_compile() {
    for pattern in [
        "A foo(..)",
        "com.example.A foo()",
        "com.example..* *(..)",
        "*..*Service find*(String, ..)",
        "A <constructor>(int)",
        "p.Outer$Inner run(int[], String...)",
        "com.example.A#foo(*)",
    ] {
        assert!(
            MethodMatcher::compile(pattern, true).is_ok(),
            "pattern `{pattern}` should compile"
        );
    }
}

// =============================================================================
// Matching
// =============================================================================

/// Names of every method in `source` accepted by `pattern`, as `Type.method`.
fn matched(pattern: &str, match_overrides: bool, source: &str) -> Vec<String> {
    let unit: CompilationUnit = tree::parse(source).unwrap();
    let index = TypeIndex::build([&unit]);
    let matcher = MethodMatcher::compile(pattern, match_overrides).unwrap();

    let mut out = Vec::new();
    for decl in unit.all_types() {
        for method in decl.methods() {
            if matcher.matches(method, decl, &unit, &index) {
                out.push(format!("{}.{}", decl.fqn, method.name));
            }
        }
    }
    out
}

#[test]
fn test_package_wildcards() {
    let source = "\
package com.example.service;

class UserService {
    void findUser(String id) {}
    void deleteUser(String id) {}
}
";
    assert_eq!(
        matched("com.example..*Service find*(..)", true, source),
        ["com.example.service.UserService.findUser"]
    );
    assert_eq!(
        matched("com.example.*.UserService *(String)", true, source),
        [
            "com.example.service.UserService.findUser",
            "com.example.service.UserService.deleteUser"
        ]
    );
    assert!(matched("com.example.UserService *(..)", true, source).is_empty());
}

#[test]
fn test_argument_patterns() {
    let source = "\
import java.util.List;

class A {
    void a() {}
    void b(int x) {}
    void c(List<String> xs, int y) {}
    void d(String... parts) {}
    <T> void e(T value) {}
}
";
    assert_eq!(matched("A *()", true, source), ["A.a"]);
    assert_eq!(matched("A *(*)", true, source), ["A.b", "A.d", "A.e"]);
    assert_eq!(matched("A *(java.util.List, int)", true, source), ["A.c"]);
    assert_eq!(matched("A *(.., int)", true, source), ["A.b", "A.c"]);
    assert_eq!(matched("A *(String[])", true, source), ["A.d"]);
    assert_eq!(matched("A *(Object)", true, source), ["A.e"]);
}

#[test]
fn test_constructors_only_match_marker() {
    let source = "\
class A {
    A() {}
    void run() {}
}
";
    assert_eq!(matched("A <constructor>(..)", true, source), ["A.A"]);
    assert_eq!(matched("A *(..)", true, source), ["A.run"]);
}

#[test]
fn test_override_matching_requires_declared_signature() {
    let source = "\
interface Itf {
    void foo(int x);
}

class A implements Itf {
    public void foo(int x) {}
    public void foo(String s) {}
}
";
    assert_eq!(matched("Itf foo(..)", true, source), ["Itf.foo", "A.foo"]);
    assert_eq!(matched("Itf foo(..)", false, source), ["Itf.foo"]);
}

#[test]
fn test_hierarchy_cycle_terminates() {
    // Not valid Java, but the walk must still stop.
    let source = "\
interface X extends Y {
}

interface Y extends X {
}

class A implements X {
    public void foo() {}
}
";
    assert!(matched("Z foo()", true, source).is_empty());
}

#[test]
fn test_display_shows_pattern() {
    let matcher = MethodMatcher::compile("com.example..* find*(String, ..)", true).unwrap();
    let shown = matcher.to_string();
    assert!(shown.contains("find*"));
    assert!(shown.contains("java.lang.String"));
}
