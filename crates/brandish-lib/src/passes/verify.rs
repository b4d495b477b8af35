use std::rc::Rc;

use brandish_core::Location;

use crate::parser::{Block, Command};
use crate::processor::{BuildError, BuildErrorKind, Context, Options, Output, Pass};
use crate::{Error, Result};

/// Fails on any block or command still in the tree. Meant to run last.
#[derive(Debug, Default)]
pub struct Verify;

fn leftover(name: &str, location: &Location) -> Error {
    BuildError::new(
        BuildErrorKind::Verification,
        format!(
            "unexpected command or block element `{name}`; \
             try using the `{name}` or `all:{name}` pass"
        ),
        location.clone(),
    )
    .into()
}

impl Pass for Verify {
    fn name(&self) -> &str {
        "verify"
    }

    fn process_block(&self, _ctx: &mut Context, block: Block) -> Result<Output> {
        Err(leftover(block.name(), block.location()))
    }

    fn process_command(&self, _ctx: &mut Context, command: Command) -> Result<Output> {
        Err(leftover(command.name(), command.location()))
    }
}

pub(super) fn factory(_options: &Options) -> Result<Option<Rc<dyn Pass>>> {
    Ok(Some(Rc::new(Verify)))
}
