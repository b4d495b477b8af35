use std::rc::Rc;

use super::NO_PAIRS;
use crate::Result;
use crate::parser::Block;
use crate::processor::{Context, Options, Output, Pass, PassExt};

pub const NAMES: [&str; 3] = ["literal", "raw", "l"];

/// Replaces `literal`, `raw` and `l` blocks with their body text, untouched
/// by any later pass. The body must not contain markup.
#[derive(Debug, Default)]
pub struct Literal;

impl Pass for Literal {
    fn name(&self) -> &str {
        "literal"
    }

    fn process_block(&self, _ctx: &mut Context, block: Block) -> Result<Output> {
        Ok(block.body().flatten()?.into())
    }
}

pub(super) fn factory(_options: &Options) -> Result<Option<Rc<dyn Pass>>> {
    Ok(Some(Rc::new(Literal.block_pairs(NO_PAIRS).named(NAMES))))
}
