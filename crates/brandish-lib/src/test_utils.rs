use std::cell::RefCell;
use std::rc::Rc;

use crate::Result;
use crate::parser::{self, Block, Command, Field, Root, Text};
use crate::processor::{Context, Form, Output, Pass};
use crate::scanner::ScannerOptions;

pub fn parse(source: &str) -> Root {
    parser::parse(source, "a", &ScannerOptions::default()).unwrap()
}

pub fn form() -> Form {
    Form::new("site", "html")
}

pub fn context() -> Context {
    Context::new(form())
}

/// Flattened output of processing `source` in `ctx`.
pub fn process(ctx: &mut Context, source: &str) -> Result<String> {
    let result = ctx.process(parse(source))?;
    let Some(node) = result else {
        return Ok(String::new());
    };
    Ok(node.as_root().unwrap().flatten()?)
}

/// Rewrites text nodes whose value is exactly `from`.
pub struct Replace {
    pub from: &'static str,
    pub to: &'static str,
}

impl Pass for Replace {
    fn process_text(&self, _ctx: &mut Context, text: Text) -> Result<Output> {
        if text.value() != self.from {
            return Ok(text.into());
        }
        Ok(text.update([Field::Value(self.to.to_owned())])?.into())
    }
}

pub fn replace(from: &'static str, to: &'static str) -> Rc<dyn Pass> {
    Rc::new(Replace { from, to })
}

/// Records the name of every block and command it sees. Clones share one log.
#[derive(Clone, Default)]
pub struct Recorder {
    pub seen: Rc<RefCell<Vec<String>>>,
}

impl Pass for Recorder {
    fn process_block(&self, _ctx: &mut Context, block: Block) -> Result<Output> {
        self.seen.borrow_mut().push(block.name().to_owned());
        Ok(block.into())
    }

    fn process_command(&self, _ctx: &mut Context, command: Command) -> Result<Output> {
        self.seen.borrow_mut().push(command.name().to_owned());
        Ok(command.into())
    }
}
