//! Sequential stage runner.

use crate::context::ProjectContext;
use crate::errors::{Result, StageFailedError};
use crate::events::event_types;
use crate::output::{Output, Progress, Report};
use serde::Serialize;

/// Outcome of a successful [`run_stages`] call.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct RunSummary {
    /// Descriptions of the stages that ran, in execution order.
    pub completed: Vec<String>,
}

impl RunSummary {
    /// Returns the number of completed stages.
    #[must_use]
    pub fn len(&self) -> usize {
        self.completed.len()
    }

    /// Returns true if no stage ran.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.completed.is_empty()
    }
}

/// Runs every stage of `ctx` in priority order, stopping at the first
/// failure.
///
/// Each stage runs with the progress label set to its description and the
/// output context tagged with its owning plugin. The tag is cleared when the
/// run ends, whether it succeeded or not.
///
/// # Errors
///
/// Returns [`crate::FloxError::StageFailed`] for the first failing stage,
/// after reporting it through `output.error`.
pub fn run_stages(ctx: &ProjectContext, output: &dyn Output) -> Result<RunSummary> {
    let stages = ctx.stages();
    tracing::debug!(count = stages.len(), "running stages");

    let mut summary = RunSummary::default();
    let result = run_each(ctx, output, Progress::new(output, stages), &mut summary);
    output.clear_context();

    result.map(|()| summary)
}

fn run_each(
    ctx: &ProjectContext,
    output: &dyn Output,
    progress: Progress<'_>,
    summary: &mut RunSummary,
) -> Result<()> {
    for stage in progress {
        output.set_description(stage.description());
        output.set_context(stage.owner());

        let data = serde_json::json!({
            "plugin": stage.owner(),
            "description": stage.description(),
            "priority": stage.priority(),
        });
        ctx.emit(event_types::STAGE_STARTED, data.clone());

        if let Err(source) = stage.run(ctx, output) {
            tracing::error!(
                plugin = %stage.owner(),
                stage = %stage.description(),
                error = %format!("{source:#}"),
                "stage failed"
            );
            output.error(Report::new(stage.description()).text(format!("{source:#}")));
            ctx.emit(
                event_types::STAGE_FAILED,
                serde_json::json!({
                    "plugin": stage.owner(),
                    "description": stage.description(),
                    "error": format!("{source:#}"),
                }),
            );
            return Err(StageFailedError::new(stage.owner(), stage.description(), source).into());
        }

        ctx.emit(event_types::STAGE_COMPLETED, data);
        summary.completed.push(stage.description().to_string());
    }
    Ok(())
}
