//! Named captures: `capture` stores a block's text, `capture_output` emits it.

use std::rc::Rc;

use indexmap::IndexMap;

use super::{accepted_text, required_pair};
use crate::Result;
use crate::parser::{Block, Command};
use crate::processor::{BuildError, Context, Options, Output, Pass, PassExt};

/// Shared state key holding the [`Captures`] of a build.
pub const CAPTURES: &str = "captures";

/// Captured text by capture name.
pub type Captures = IndexMap<String, String>;

/// Processes a `capture` body and stores its text under the `name` pair.
/// The block itself is removed from the output.
#[derive(Debug, Default)]
pub struct Capture;

impl Pass for Capture {
    fn name(&self) -> &str {
        "capture"
    }

    fn setup(&self, ctx: &mut Context) -> Result<()> {
        ctx.entry_or_insert_with(CAPTURES, Captures::new)?;
        Ok(())
    }

    fn process_block(&self, ctx: &mut Context, block: Block) -> Result<Output> {
        let contents = accepted_text(ctx, block.body())?;
        if let Some(name) = block.pairs().get("name") {
            log::trace!("captured {name} at {}", block.location());
            ctx.entry_or_insert_with(CAPTURES, Captures::new)?
                .insert(name.clone(), contents);
        }
        Ok(Output::Drop)
    }
}

/// Replaces a `capture_output` command with previously captured text.
#[derive(Debug, Default)]
pub struct CaptureOutput;

impl Pass for CaptureOutput {
    fn name(&self) -> &str {
        "capture_output"
    }

    fn process_command(&self, ctx: &mut Context, command: Command) -> Result<Output> {
        let name = required_pair(command.name(), command.pairs(), "name", command.location())?;
        let captures = ctx.get::<Captures>(CAPTURES);
        match captures.and_then(|captures| captures.get(name)) {
            Some(contents) => Ok(contents.clone().into()),
            None => Err(BuildError::hook(
                format!("no capture named `{name}`"),
                command.location().clone(),
            )
            .into()),
        }
    }
}

pub(super) fn capture_factory(_options: &Options) -> Result<Option<Rc<dyn Pass>>> {
    Ok(Some(Rc::new(
        Capture.block_pairs(["class", "id", "name"]).named(["capture"]),
    )))
}

pub(super) fn output_factory(_options: &Options) -> Result<Option<Rc<dyn Pass>>> {
    Ok(Some(Rc::new(
        CaptureOutput
            .command_pairs(["name"])
            .named(["capture_output", "capture-output", "capout"]),
    )))
}
