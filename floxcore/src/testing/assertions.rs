//! Test assertions for project contexts and outputs.

use crate::context::ProjectContext;
use crate::output::Level;

use super::RecordingOutput;

/// Asserts that the context's stages run in the given description order.
pub fn assert_stage_order(ctx: &ProjectContext, expected: &[&str]) {
    let actual: Vec<&str> = ctx.stages().iter().map(|stage| stage.description()).collect();
    assert_eq!(
        actual, expected,
        "Expected stage order {:?}, got {:?}",
        expected, actual
    );
}

/// Asserts that a variable resolves to the expected value.
pub fn assert_variable(ctx: &ProjectContext, name: &str, expected: &serde_json::Value) {
    let actual = ctx.variables().get(name);
    assert_eq!(
        actual,
        Some(expected),
        "Expected variable '{}' to be {:?}, got {:?}. Keys: {:?}",
        name,
        expected,
        actual,
        ctx.variables().keys()
    );
}

/// Asserts that a variable does not resolve.
pub fn assert_no_variable(ctx: &ProjectContext, name: &str) {
    assert!(
        !ctx.variables().contains_key(name),
        "Expected no variable '{}', found {:?} from '{}'",
        name,
        ctx.variables().get(name),
        ctx.variables().source_of(name).unwrap_or_default()
    );
}

/// Asserts that a message with `level` and `title` was reported.
pub fn assert_reported(output: &RecordingOutput, level: Level, title: &str) {
    let messages = output.messages();
    assert!(
        messages.iter().any(|m| m.level == level && m.title == title),
        "Expected a {} message titled '{}', got {:?}",
        level,
        title,
        messages
    );
}
