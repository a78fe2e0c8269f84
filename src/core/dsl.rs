//! Closed allow-lists of the Spek DSL
//!
//! Every name the classifiers compare against lives here so the vocabulary
//! can be audited in one place.

/// Marker base type every spec class inherits
pub const SPEK_MARKER: &str = "org.jetbrains.spek.api.Spek";

/// Annotation that hands a class to the JUnit 4 runner
pub const RUN_WITH: &str = "org.junit.runner.RunWith";

/// Functions that open a group block
pub const GROUP_FUNCTIONS: &[&str] = &["describe", "context", "given", "on"];

/// The single function that opens a test block
pub const TEST_FUNCTION: &str = "it";

/// Extension receivers the DSL functions are declared on
pub const DSL_RECEIVERS: &[&str] = &[
    "Dsl",
    "Spec",
    "SpecBody",
    "TestBody",
    "ActionBody",
    "TestContainer",
];

/// Upper bound on block nesting followed by the path builder
pub const MAX_NESTING_DEPTH: usize = 256;

pub fn is_group_function(name: &str) -> bool {
    GROUP_FUNCTIONS.contains(&name)
}

pub fn is_test_function(name: &str) -> bool {
    name == TEST_FUNCTION
}

pub fn is_dsl_receiver(simple_name: &str) -> bool {
    DSL_RECEIVERS.contains(&simple_name)
}
