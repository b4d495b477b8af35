//! The pass trait and hook results.

use brandish_core::Location;

use super::context::Context;
use crate::Result;
use crate::parser::{Block, Command, Node, NodeError, Root, Text};

/// What a hook hands back to the pipeline.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Output {
    /// Replacement node; later passes see it next.
    Node(Node),
    /// Final text. Becomes an update-prevented Text node at the input node's
    /// location, so no later pass rewrites it.
    Text(String),
    /// Remove the node.
    Drop,
}

impl Output {
    /// Resolves the output against the location of the node that produced it.
    pub fn into_node(self, location: &Location) -> Option<Node> {
        match self {
            Output::Node(node) => Some(node),
            Output::Text(value) => Some(Text::new(value, location.clone()).prevent_update().into()),
            Output::Drop => None,
        }
    }
}

impl From<Node> for Output {
    fn from(node: Node) -> Self {
        Output::Node(node)
    }
}

impl From<Option<Node>> for Output {
    fn from(node: Option<Node>) -> Self {
        node.map_or(Output::Drop, Output::Node)
    }
}

impl From<String> for Output {
    fn from(value: String) -> Self {
        Output::Text(value)
    }
}

impl From<&str> for Output {
    fn from(value: &str) -> Self {
        Output::Text(value.to_owned())
    }
}

macro_rules! output_from_node {
    ($($ty:ty),*) => {$(
        impl From<$ty> for Output {
            fn from(node: $ty) -> Self {
                Output::Node(node.into())
            }
        }
    )*};
}

output_from_node!(Root, Block, Command, Text);

/// A unit of tree rewriting.
///
/// The default [`Pass::call`] dispatches on the node variant into one of the
/// `process_*` hooks, each of which returns its input unchanged unless
/// overridden. Hooks take `&self`: a hook may re-enter [`Context::accept`],
/// which runs the same pass again, so mutable pass state lives in cells.
pub trait Pass {
    /// Name used in log messages.
    fn name(&self) -> &str {
        std::any::type_name::<Self>()
    }

    /// Runs once, when the pass is added to a context.
    fn setup(&self, _ctx: &mut Context) -> Result<()> {
        Ok(())
    }

    fn call(&self, ctx: &mut Context, node: Node) -> Result<Output> {
        dispatch(self, ctx, node)
    }

    fn process_root(&self, _ctx: &mut Context, root: Root) -> Result<Output> {
        Ok(root.into())
    }

    fn process_block(&self, _ctx: &mut Context, block: Block) -> Result<Output> {
        Ok(block.into())
    }

    fn process_command(&self, _ctx: &mut Context, command: Command) -> Result<Output> {
        Ok(command.into())
    }

    fn process_text(&self, _ctx: &mut Context, text: Text) -> Result<Output> {
        Ok(text.into())
    }

    /// Runs once per [`Context::process`], after the whole tree was accepted.
    fn postprocess(&self, _ctx: &mut Context, _result: Option<&Node>) -> Result<()> {
        Ok(())
    }
}

/// Routes `node` to the matching hook of `pass`.
///
/// Errors without a location come back as hook errors at the node's location.
pub fn dispatch<P: Pass + ?Sized>(pass: &P, ctx: &mut Context, node: Node) -> Result<Output> {
    let location = node.location().clone();
    log::trace!("{} visits {} at {}", pass.name(), node.variant(), location);

    let result = match node {
        Node::Root(root) => pass.process_root(ctx, root),
        Node::Block(block) => pass.process_block(ctx, block),
        Node::Command(command) => pass.process_command(ctx, command),
        Node::Text(text) => pass.process_text(ctx, text),
        other => Err(NodeError::UnexpectedNode {
            found: other.variant(),
            expected: "root, block, command or text",
            location: location.clone(),
        }
        .into()),
    };
    result.map_err(|err| err.located_at(&location))
}
