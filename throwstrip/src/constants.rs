use regex::Regex;
use rustc_hash::FxHashSet;
use std::sync::OnceLock;

/// Name of the project-level configuration file.
pub const CONFIG_FILENAME: &str = ".throwstrip.toml";

/// File extension of the sources this tool rewrites.
pub const JAVA_EXTENSION: &str = "java";

/// Marker used in method patterns to select constructors.
pub const CONSTRUCTOR_MARKER: &str = "<constructor>";

/// Package whose types are visible in every compilation unit without an import.
pub const JAVA_LANG_PACKAGE: &str = "java.lang";

/// Erasure of an unbounded type variable.
pub const OBJECT_FQN: &str = "java.lang.Object";

/// Regex for one segment of a type or method name pattern (identifier chars plus `*`).
///
/// # Panics
///
/// Panics if the regex pattern is invalid.
pub fn get_pattern_segment_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    #[allow(clippy::expect_used)]
    RE.get_or_init(|| {
        Regex::new(r"^[\p{L}_$*][\p{L}\p{N}_$*]*$").expect("Invalid pattern segment regex")
    })
}

/// Primitive type keywords, including `void`.
pub fn get_primitive_types() -> &'static FxHashSet<&'static str> {
    static SET: OnceLock<FxHashSet<&'static str>> = OnceLock::new();
    SET.get_or_init(|| {
        [
            "boolean", "byte", "char", "short", "int", "long", "float", "double", "void",
        ]
        .into_iter()
        .collect()
    })
}

/// Simple names of the commonly used `java.lang` types.
///
/// Used to attribute unqualified names that are neither imported nor declared
/// in the file. Names outside this set stay unresolved.
pub fn get_java_lang_types() -> &'static FxHashSet<&'static str> {
    static SET: OnceLock<FxHashSet<&'static str>> = OnceLock::new();
    SET.get_or_init(|| {
        [
            // Core
            "Object",
            "String",
            "Class",
            "ClassLoader",
            "Enum",
            "Record",
            "Iterable",
            "Comparable",
            "CharSequence",
            "AutoCloseable",
            "Cloneable",
            "Runnable",
            "Thread",
            "ThreadLocal",
            "Math",
            "StrictMath",
            "System",
            "Runtime",
            "Process",
            "ProcessBuilder",
            "StringBuilder",
            "StringBuffer",
            "StackTraceElement",
            "Module",
            "Package",
            // Boxes
            "Number",
            "Integer",
            "Long",
            "Short",
            "Byte",
            "Character",
            "Boolean",
            "Double",
            "Float",
            "Void",
            // Annotations
            "Override",
            "Deprecated",
            "SuppressWarnings",
            "FunctionalInterface",
            "SafeVarargs",
            // Throwables
            "Throwable",
            "Exception",
            "RuntimeException",
            "Error",
            "ArithmeticException",
            "ArrayIndexOutOfBoundsException",
            "ArrayStoreException",
            "ClassCastException",
            "ClassNotFoundException",
            "CloneNotSupportedException",
            "EnumConstantNotPresentException",
            "IllegalAccessException",
            "IllegalArgumentException",
            "IllegalCallerException",
            "IllegalMonitorStateException",
            "IllegalStateException",
            "IndexOutOfBoundsException",
            "InstantiationException",
            "InterruptedException",
            "NegativeArraySizeException",
            "NoSuchFieldException",
            "NoSuchMethodException",
            "NullPointerException",
            "NumberFormatException",
            "ReflectiveOperationException",
            "SecurityException",
            "StringIndexOutOfBoundsException",
            "TypeNotPresentException",
            "UnsupportedOperationException",
            "AssertionError",
            "ExceptionInInitializerError",
            "InternalError",
            "LinkageError",
            "NoClassDefFoundError",
            "OutOfMemoryError",
            "StackOverflowError",
            "VirtualMachineError",
        ]
        .into_iter()
        .collect()
    })
}

/// Set of folders to exclude by default.
pub fn get_default_exclude_folders() -> &'static FxHashSet<&'static str> {
    static SET: OnceLock<FxHashSet<&'static str>> = OnceLock::new();
    SET.get_or_init(|| {
        let mut s = FxHashSet::default();
        s.insert(".git");
        s.insert(".gradle");
        s.insert(".idea");
        s.insert(".mvn");
        s.insert("build");
        s.insert("target");
        s.insert("out");
        s.insert("bin");
        s.insert("node_modules");
        s
    })
}

pub use get_default_exclude_folders as DEFAULT_EXCLUDE_FOLDERS;
pub use get_java_lang_types as JAVA_LANG_TYPES;
pub use get_pattern_segment_re as PATTERN_SEGMENT_RE;
pub use get_primitive_types as PRIMITIVE_TYPES;
