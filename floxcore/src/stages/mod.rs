//! Stages and per-plugin stage registries.
//!
//! Stages are the units of project setup and teardown behavior a plugin
//! contributes. Each plugin owns one [`StageRegistry`]; the project context
//! concatenates all registries and orders them with [`ordered`].

mod registry;

pub use registry::StageRegistry;

use crate::context::ProjectContext;
use crate::output::Output;
use std::fmt;

/// Priority assigned when a plugin has no opinion about ordering.
pub const DEFAULT_PRIORITY: i64 = 100;

/// The invokable behavior of a stage.
pub type StageAction = Box<dyn Fn(&ProjectContext, &dyn Output) -> anyhow::Result<()>>;

/// A prioritized unit of work contributed by a plugin.
///
/// Two stages compare only by `priority`; use [`ordered`] (a stable sort on
/// that key) rather than relying on any other ordering.
pub struct Stage {
    priority: i64,
    description: String,
    owner: String,
    action: StageAction,
}

impl Stage {
    pub(crate) fn new(
        owner: impl Into<String>,
        priority: i64,
        description: impl Into<String>,
        action: StageAction,
    ) -> Self {
        Self {
            priority,
            description: description.into(),
            owner: owner.into(),
            action,
        }
    }

    /// Returns the stage priority. Lower runs first.
    #[must_use]
    pub const fn priority(&self) -> i64 {
        self.priority
    }

    /// Returns the human readable description.
    #[must_use]
    pub fn description(&self) -> &str {
        &self.description
    }

    /// Returns the name of the plugin that registered this stage.
    ///
    /// Resolve it with [`ProjectContext::plugin`].
    #[must_use]
    pub fn owner(&self) -> &str {
        &self.owner
    }

    /// Invokes the stage action.
    ///
    /// # Errors
    ///
    /// Returns whatever the action returns.
    pub fn run(&self, ctx: &ProjectContext, output: &dyn Output) -> anyhow::Result<()> {
        (self.action)(ctx, output)
    }
}

impl fmt::Debug for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Stage")
            .field("priority", &self.priority)
            .field("description", &self.description)
            .field("owner", &self.owner)
            .finish_non_exhaustive()
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.description)
    }
}

/// Concatenates registries in the given order and stable-sorts by priority.
///
/// Stages with equal priority keep their concatenation order, that is
/// registry order first and insertion order within a registry second.
pub fn ordered<'a, I>(registries: I) -> Vec<&'a Stage>
where
    I: IntoIterator<Item = &'a StageRegistry>,
{
    let mut stages: Vec<&Stage> = registries.into_iter().flat_map(StageRegistry::iter).collect();
    stages.sort_by_key(|stage| stage.priority());
    stages
}

/// Derives a description from the action's own function name.
///
/// Only function items have a usable name. Closures, function pointers,
/// trait objects and generic wrappers such as `Box<..>` yield `None`.
pub(crate) fn action_name<F>() -> Option<String> {
    let full = std::any::type_name::<F>();
    let is_item_path = !full.is_empty()
        && full.split("::").all(|segment| {
            !segment.is_empty()
                && segment
                    .chars()
                    .all(|c| c.is_alphanumeric() || c == '_')
        });
    if !is_item_path {
        return None;
    }
    full.rsplit("::").next().map(ToString::to_string)
}
