//! Command groups and dispatch.
//!
//! Each plugin may expose [`Command`]s through [`Plugin::commands`]. The
//! [`CommandDispatcher`] collects them into one [`CommandGroup`] per plugin,
//! named after the plugin, and routes `group command args...` requests.
//!
//! [`Plugin::commands`]: crate::plugin::Plugin::commands

use crate::context::ProjectContext;
use crate::errors::{FloxError, Result, UnknownCommandError};
use crate::output::Output;
use std::fmt;

/// The invokable behavior of a command.
pub type CommandHandler =
    Box<dyn Fn(&ProjectContext, &dyn Output, &[String]) -> anyhow::Result<()>>;

/// A named subcommand.
pub struct Command {
    name: String,
    about: String,
    handler: CommandHandler,
}

impl Command {
    /// Creates a command.
    pub fn new<F>(name: impl Into<String>, about: impl Into<String>, handler: F) -> Self
    where
        F: Fn(&ProjectContext, &dyn Output, &[String]) -> anyhow::Result<()> + 'static,
    {
        Self {
            name: name.into(),
            about: about.into(),
            handler: Box::new(handler),
        }
    }

    /// Returns the command name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the one-line help text.
    #[must_use]
    pub fn about(&self) -> &str {
        &self.about
    }

    /// Invokes the handler.
    ///
    /// # Errors
    ///
    /// Returns whatever the handler returns.
    pub fn invoke(
        &self,
        ctx: &ProjectContext,
        output: &dyn Output,
        args: &[String],
    ) -> anyhow::Result<()> {
        (self.handler)(ctx, output, args)
    }
}

impl fmt::Debug for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Command")
            .field("name", &self.name)
            .field("about", &self.about)
            .finish_non_exhaustive()
    }
}

/// The commands of one plugin.
#[derive(Debug)]
pub struct CommandGroup {
    name: String,
    about: String,
    commands: Vec<Command>,
}

impl CommandGroup {
    /// Creates a group.
    #[must_use]
    pub fn new(name: impl Into<String>, about: impl Into<String>, commands: Vec<Command>) -> Self {
        Self {
            name: name.into(),
            about: about.into(),
            commands,
        }
    }

    /// Returns the group name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the group help text.
    #[must_use]
    pub fn about(&self) -> &str {
        &self.about
    }

    /// Returns the commands in declaration order.
    #[must_use]
    pub fn commands(&self) -> &[Command] {
        &self.commands
    }

    /// Finds a command by name.
    #[must_use]
    pub fn command(&self, name: &str) -> Option<&Command> {
        self.commands.iter().find(|command| command.name() == name)
    }
}

/// Routes command requests to plugin command groups.
#[derive(Debug, Default)]
pub struct CommandDispatcher {
    groups: Vec<CommandGroup>,
}

impl CommandDispatcher {
    /// Creates an empty dispatcher.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds one group per plugin that exposes commands, in plugin order.
    #[must_use]
    pub fn from_context(ctx: &ProjectContext) -> Self {
        let mut dispatcher = Self::new();
        for plugin in ctx.plugins() {
            let commands = plugin.commands();
            if commands.is_empty() {
                continue;
            }
            let about = format!("{} plugin commands", plugin.name());
            dispatcher.add_group(CommandGroup::new(plugin.name(), about, commands));
        }
        dispatcher
    }

    /// Adds a group.
    pub fn add_group(&mut self, group: CommandGroup) {
        tracing::trace!(group = %group.name(), commands = group.commands().len(), "registered command group");
        self.groups.push(group);
    }

    /// Returns the groups in registration order.
    #[must_use]
    pub fn groups(&self) -> &[CommandGroup] {
        &self.groups
    }

    /// Finds a group by name.
    #[must_use]
    pub fn group(&self, name: &str) -> Option<&CommandGroup> {
        self.groups.iter().find(|group| group.name() == name)
    }

    /// Invokes `group command` with `args`.
    ///
    /// # Errors
    ///
    /// Returns [`FloxError::UnknownCommand`] if the group or command does
    /// not exist, and [`FloxError::CommandFailed`] if the handler fails.
    pub fn dispatch(
        &self,
        ctx: &ProjectContext,
        output: &dyn Output,
        group: &str,
        command: &str,
        args: &[String],
    ) -> Result<()> {
        let found = self
            .group(group)
            .ok_or_else(|| UnknownCommandError::group(group))?
            .command(command)
            .ok_or_else(|| UnknownCommandError::command(group, command))?;

        tracing::debug!(group, command, args = ?args, "dispatching command");
        found
            .invoke(ctx, output, args)
            .map_err(|source| FloxError::CommandFailed {
                group: group.to_string(),
                command: command.to_string(),
                source,
            })
    }
}
