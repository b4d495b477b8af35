use std::cell::RefCell;
use std::rc::Rc;

use super::required_pair;
use crate::Result;
use crate::parser::Command;
use crate::processor::{BuildError, Context, Options, Output, Pass, PassExt};

/// Replaces an `import` command with the processed contents of the document
/// named by its `file` pair.
///
/// Documents come from the context's document cache, so each file is parsed
/// once per cache however often it is imported.
#[derive(Debug, Default)]
pub struct Import {
    /// Documents currently being imported, outermost first.
    stack: RefCell<Vec<String>>,
}

impl Pass for Import {
    fn name(&self) -> &str {
        "import"
    }

    fn process_command(&self, ctx: &mut Context, command: Command) -> Result<Output> {
        let location = command.location();
        let file = required_pair(command.name(), command.pairs(), "file", location)?;

        let Some(documents) = ctx.documents().cloned() else {
            return Err(BuildError::hook(
                format!("cannot import `{file}` without a document source"),
                location.clone(),
            )
            .into());
        };
        if self.stack.borrow().iter().any(|open| open == file) {
            return Err(BuildError::hook(
                format!("import cycle through `{file}`"),
                location.clone(),
            )
            .into());
        }

        let root = documents.load(file)?;
        log::debug!("importing {file} at {location}");

        self.stack.borrow_mut().push(file.to_owned());
        let result = ctx.accept(root.into());
        self.stack.borrow_mut().pop();
        Ok(result?.into())
    }
}

pub(super) fn factory(_options: &Options) -> Result<Option<Rc<dyn Pass>>> {
    Ok(Some(Rc::new(Import::default().command_pairs(["file"]).named(["import"]))))
}
