//! Format-independent passes, registered under the `all` format.
//!
//! | pass             | tags                                         | pairs                 |
//! |------------------|----------------------------------------------|-----------------------|
//! | `comment`        | `comment`, `ignore`                          | none                  |
//! | `literal`        | `literal`, `raw`, `l`                        | none                  |
//! | `capture`        | `capture`                                    | `class`, `id`, `name` |
//! | `capture_output` | `capture_output`, `capture-output`, `capout` | `name`                |
//! | `if`             | `if`, `unless`                               | any                   |
//! | `import`         | `import`                                     | `file`                |
//! | `verify`         | every block and command                      | any                   |

mod capture;
mod comment;
mod conditional;
mod import;
mod literal;
mod verify;

#[cfg(test)]
mod passes_tests;

use brandish_core::Location;

pub use capture::{CAPTURES, Capture, CaptureOutput, Captures};
pub use comment::Comment;
pub use conditional::Conditional;
pub use import::Import;
pub use literal::Literal;
pub use verify::Verify;

use crate::Result;
use crate::parser::{Node, NodeError, Pairs, Root};
use crate::processor::{ALL_FORMAT, BuildError, Context, ProcessorError, Registry};

const NO_PAIRS: [&str; 0] = [];

/// Registers every built-in pass under [`ALL_FORMAT`].
pub fn register_builtins(registry: &mut Registry) -> std::result::Result<(), ProcessorError> {
    registry.register(ALL_FORMAT, "comment", comment::factory)?;
    registry.register(ALL_FORMAT, "literal", literal::factory)?;
    registry.register(ALL_FORMAT, "capture", capture::capture_factory)?;
    registry.register(ALL_FORMAT, "capture_output", capture::output_factory)?;
    registry.register(ALL_FORMAT, "if", conditional::factory)?;
    registry.register(ALL_FORMAT, "import", import::factory)?;
    registry.register(ALL_FORMAT, "verify", verify::factory)?;
    Ok(())
}

/// Accepts `body` through the whole pipeline and flattens what survives.
fn accepted_text(ctx: &mut Context, body: &Root) -> Result<String> {
    match ctx.accept(body.clone().into())? {
        None => Ok(String::new()),
        Some(Node::Root(root)) => Ok(root.flatten()?),
        Some(Node::Text(text)) => Ok(text.value().to_owned()),
        Some(other) => Err(NodeError::UnexpectedNode {
            found: other.variant(),
            expected: "text or root",
            location: other.location().clone(),
        }
        .into()),
    }
}

/// Value of `key`, or a syntax error naming the tag that needs it.
fn required_pair<'a>(
    tag: &str,
    pairs: &'a Pairs,
    key: &str,
    location: &Location,
) -> Result<&'a str> {
    pairs.get(key).map(String::as_str).ok_or_else(|| {
        BuildError::syntax(
            format!("`{tag}` requires a `{key}` pair"),
            location.clone(),
        )
        .into()
    })
}
