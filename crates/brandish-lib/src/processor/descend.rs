use super::context::Context;
use super::pass::{Output, Pass};
use crate::Result;
use crate::parser::{Field, Root};

/// Built-in first pass of every pipeline: accepts each child of a root and
/// keeps the ones that are not dropped.
///
/// Blocks are leaves here. A pass that wants a block's body processed accepts
/// it explicitly.
#[derive(Debug, Default)]
pub struct Descend;

impl Pass for Descend {
    fn name(&self) -> &str {
        "descend"
    }

    fn process_root(&self, ctx: &mut Context, root: Root) -> Result<Output> {
        let mut children = Vec::with_capacity(root.children().len());
        for child in root.children() {
            if let Some(node) = ctx.accept(child.clone())? {
                children.push(node);
            }
        }
        Ok(root.update([Field::Children(children)])?.into())
    }
}
