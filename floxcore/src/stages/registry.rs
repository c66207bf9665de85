//! Append-only, per-plugin stage container.

use super::{action_name, Stage, DEFAULT_PRIORITY};
use crate::context::ProjectContext;
use crate::output::Output;

/// Ordered stages registered by one plugin.
///
/// Stages keep insertion order. There is no removal: a registry only grows
/// while its plugin is being constructed.
#[derive(Debug)]
pub struct StageRegistry {
    owner: String,
    stages: Vec<Stage>,
}

impl StageRegistry {
    /// Creates an empty registry for the named plugin.
    #[must_use]
    pub fn new(owner: impl Into<String>) -> Self {
        Self {
            owner: owner.into(),
            stages: Vec::new(),
        }
    }

    /// Registers a stage.
    ///
    /// The description is the action's function name; closures get
    /// `"<owner> stage"`.
    pub fn add<F>(&mut self, action: F, priority: i64)
    where
        F: Fn(&ProjectContext, &dyn Output) -> anyhow::Result<()> + 'static,
    {
        let description = action_name::<F>().unwrap_or_else(|| format!("{} stage", self.owner));
        self.push(Stage::new(&self.owner, priority, description, Box::new(action)));
    }

    /// Registers a stage at [`DEFAULT_PRIORITY`].
    pub fn add_default<F>(&mut self, action: F)
    where
        F: Fn(&ProjectContext, &dyn Output) -> anyhow::Result<()> + 'static,
    {
        self.add(action, DEFAULT_PRIORITY);
    }

    /// Registers a stage with an explicit description.
    pub fn add_described<F>(&mut self, action: F, priority: i64, description: impl Into<String>)
    where
        F: Fn(&ProjectContext, &dyn Output) -> anyhow::Result<()> + 'static,
    {
        self.push(Stage::new(&self.owner, priority, description, Box::new(action)));
    }

    fn push(&mut self, stage: Stage) {
        tracing::trace!(
            plugin = %self.owner,
            priority = stage.priority(),
            description = %stage.description(),
            "registered stage"
        );
        self.stages.push(stage);
    }

    /// Returns the owning plugin name.
    #[must_use]
    pub fn owner(&self) -> &str {
        &self.owner
    }

    /// Iterates stages in insertion order.
    pub fn iter(&self) -> std::slice::Iter<'_, Stage> {
        self.stages.iter()
    }

    /// Returns the number of registered stages.
    #[must_use]
    pub fn len(&self) -> usize {
        self.stages.len()
    }

    /// Returns true if nothing has been registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.stages.is_empty()
    }
}

impl<'a> IntoIterator for &'a StageRegistry {
    type Item = &'a Stage;
    type IntoIter = std::slice::Iter<'a, Stage>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}
