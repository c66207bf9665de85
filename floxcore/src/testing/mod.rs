//! Testing utilities for floxcore plugins.
//!
//! This module provides:
//! - A recording [`crate::output::Output`] and an in-memory writer
//! - A builder-style plugin and settings file helpers
//! - Assertions over stage order, variables and reported messages

mod assertions;
mod fixtures;
mod mocks;

pub use assertions::{assert_no_variable, assert_reported, assert_stage_order, assert_variable};
pub use fixtures::{write_settings, StaticPlugin};
pub use mocks::{RecordedMessage, RecordingOutput, SharedBuffer};
