use std::rc::Rc;

use super::NO_PAIRS;
use crate::Result;
use crate::parser::Block;
use crate::processor::{Context, Options, Output, Pass, PassExt};

pub const NAMES: [&str; 2] = ["comment", "ignore"];

/// Drops `comment` and `ignore` blocks together with their bodies.
#[derive(Debug, Default)]
pub struct Comment;

impl Pass for Comment {
    fn name(&self) -> &str {
        "comment"
    }

    fn process_block(&self, _ctx: &mut Context, _block: Block) -> Result<Output> {
        Ok(Output::Drop)
    }
}

pub(super) fn factory(_options: &Options) -> Result<Option<Rc<dyn Pass>>> {
    Ok(Some(Rc::new(Comment.block_pairs(NO_PAIRS).named(NAMES))))
}
