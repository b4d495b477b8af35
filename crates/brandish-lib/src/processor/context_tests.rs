use std::cell::Cell;
use std::rc::Rc;

use crate::parser::{Block, Command, Node, NodeError, Root, Str, Text};
use crate::processor::{BuildErrorKind, Context, Output, Pass, ReentryPolicy};
use crate::test_utils::{Recorder, context, parse, process, replace};
use crate::{Error, Result};

#[test]
fn passes_run_in_order() {
    let mut ctx = context();
    ctx.push(replace("x", "y")).unwrap();
    ctx.push(replace("y", "z")).unwrap();
    assert_eq!(process(&mut ctx, "x").unwrap(), "z");

    let mut ctx = context();
    ctx.push(replace("y", "z")).unwrap();
    ctx.push(replace("x", "y")).unwrap();
    assert_eq!(process(&mut ctx, "x").unwrap(), "y");
}

#[test]
fn unshift_runs_first() {
    let mut ctx = context();
    ctx.push(replace("y", "z")).unwrap();
    ctx.unshift(replace("x", "y")).unwrap();
    assert_eq!(process(&mut ctx, "x").unwrap(), "z");
    assert_eq!(ctx.passes().len(), 2);
}

struct Freeze;

impl Pass for Freeze {
    fn process_block(&self, _ctx: &mut Context, block: Block) -> Result<Output> {
        Ok(block.prevent_update().into())
    }
}

#[test]
fn frozen_nodes_skip_later_passes() {
    let recorder = Rc::new(Recorder::default());
    let mut ctx = context();
    ctx.push(Rc::new(Freeze)).unwrap();
    ctx.push(recorder.clone()).unwrap();

    let result = ctx.process(parse("<a>x</a><b/>")).unwrap().unwrap();
    assert_eq!(*recorder.seen.borrow(), ["b"]);

    let root = result.as_root().unwrap();
    insta::assert_snapshot!(root.dump(), @r#"
    Root
      Block "a" (frozen)
        Root
          Text "x"
      Command "b"
    "#);
}

#[test]
fn frozen_input_comes_back_untouched() {
    let mut ctx = context();
    ctx.push(replace("x", "y")).unwrap();

    let node = parse("x").children()[0].prevent_update();
    let result = ctx.accept(node.clone()).unwrap();
    assert_eq!(result, Some(node));
}

struct Shout;

impl Pass for Shout {
    fn process_text(&self, _ctx: &mut Context, text: Text) -> Result<Output> {
        Ok(text.value().to_uppercase().into())
    }
}

#[test]
fn text_output_is_final() {
    let mut ctx = context();
    ctx.push(Rc::new(Shout)).unwrap();
    ctx.push(replace("X", "y")).unwrap();

    let result = ctx.process(parse("x")).unwrap().unwrap();
    let text = result.as_root().unwrap().children()[0].as_text().unwrap().clone();
    assert_eq!(text.value(), "X");
    assert!(text.is_update_prevented());
    assert_eq!(text.location().to_string(), "a:1.0-1");
}

struct DropCommands;

impl Pass for DropCommands {
    fn process_command(&self, _ctx: &mut Context, _command: Command) -> Result<Output> {
        Ok(Output::Drop)
    }
}

#[test]
fn dropped_nodes_leave_the_tree() {
    let recorder = Rc::new(Recorder::default());
    let mut ctx = context();
    ctx.push(Rc::new(DropCommands)).unwrap();
    ctx.push(recorder.clone()).unwrap();

    let result = ctx.process(parse("a<b/>c<d>e</d>")).unwrap().unwrap();
    assert_eq!(*recorder.seen.borrow(), ["d"]);
    insta::assert_snapshot!(result.dump(), @r#"
    Root
      Text "a"
      Text "c"
      Block "d"
        Root
          Text "e"
    "#);
}

#[test]
fn blocks_are_leaves_to_descend() {
    let mut ctx = context();
    ctx.push(replace("x", "y")).unwrap();

    let result = ctx.process(parse("x<a>x</a>")).unwrap().unwrap();
    insta::assert_snapshot!(result.dump(), @r#"
    Root
      Text "y"
      Block "a"
        Root
          Text "x"
    "#);
}

#[test]
fn shared_state() {
    let mut ctx = context();
    assert!(!ctx.contains("count"));
    assert!(matches!(ctx.fetch::<u32>("count"), Err(Error::MissingState(key)) if key == "count"));

    ctx.insert("count", 1u32);
    assert_eq!(ctx.get::<u32>("count"), Some(&1));
    assert_eq!(ctx.get::<String>("count"), None);
    assert!(matches!(ctx.fetch::<String>("count"), Err(Error::StateType(_))));

    *ctx.fetch_mut::<u32>("count").unwrap() += 1;
    *ctx.entry_or_insert_with("count", || 10u32).unwrap() += 1;
    assert_eq!(ctx.fetch::<u32>("count").unwrap(), &3);

    assert_eq!(*ctx.entry_or_insert_with("other", || 10u32).unwrap(), 10);
    assert!(ctx.remove("other").is_some());
    assert!(!ctx.contains("other"));
}

struct Counter {
    setups: Cell<u32>,
    postprocessed: Cell<Option<String>>,
}

impl Pass for Counter {
    fn name(&self) -> &str {
        "counter"
    }

    fn setup(&self, ctx: &mut Context) -> Result<()> {
        self.setups.set(self.setups.get() + 1);
        ctx.insert("counted", 0u32);
        Ok(())
    }

    fn process_text(&self, ctx: &mut Context, text: Text) -> Result<Output> {
        *ctx.fetch_mut::<u32>("counted")? += 1;
        Ok(text.into())
    }

    fn postprocess(&self, ctx: &mut Context, result: Option<&Node>) -> Result<()> {
        let flat = result.and_then(Node::as_root).map(Root::flatten).transpose()?;
        let counted = ctx.fetch::<u32>("counted")?;
        self.postprocessed.set(Some(format!("{counted} {flat:?}")));
        Ok(())
    }
}

#[test]
fn setup_runs_on_registration() {
    let counter = Rc::new(Counter {
        setups: Cell::new(0),
        postprocessed: Cell::new(None),
    });
    let mut ctx = context();
    ctx.unshift(counter.clone()).unwrap();
    assert_eq!(counter.setups.get(), 1);
    assert_eq!(ctx.fetch::<u32>("counted").unwrap(), &0);
    assert_eq!(counter.postprocessed.take(), None);
}

#[test]
fn postprocess_sees_the_result() {
    let counter = Rc::new(Counter {
        setups: Cell::new(0),
        postprocessed: Cell::new(None),
    });
    let mut ctx = context();
    ctx.push(counter.clone()).unwrap();

    assert_eq!(process(&mut ctx, "a").unwrap(), "a");
    assert_eq!(counter.postprocessed.take().as_deref(), Some(r#"1 Some("a")"#));
}

/// Accepts the body of every block, then keeps the block.
struct Nest;

impl Pass for Nest {
    fn process_block(&self, ctx: &mut Context, block: Block) -> Result<Output> {
        ctx.accept(block.body().clone().into())?;
        ctx.accept(block.body().clone().into())?;
        Ok(block.into())
    }
}

#[test]
fn reentry_is_allowed_by_default() {
    let mut ctx = context();
    ctx.push(Rc::new(Nest)).unwrap();
    assert!(ctx.process(parse("<a>x</a>")).is_ok());
}

#[test]
fn forbidden_reentry() {
    let mut ctx = context().with_reentry_policy(ReentryPolicy::Forbid);
    ctx.push(Rc::new(Nest)).unwrap();

    let err = ctx.process(parse("<a>x</a>")).unwrap_err();
    let Error::Build(err) = err else {
        panic!("expected a build error, got {err:?}");
    };
    assert_eq!(err.kind, BuildErrorKind::Reentry);
    assert_eq!(err.to_string(), "a:1.3-4: root was already accepted in this build");
}

#[test]
fn forbidden_reentry_resets_per_process() {
    let mut ctx = context().with_reentry_policy(ReentryPolicy::Forbid);
    let root = parse("x");
    assert!(ctx.process(root.clone()).is_ok());
    assert!(ctx.process(root).is_ok());
}

struct NeedsState;

impl Pass for NeedsState {
    fn process_command(&self, ctx: &mut Context, command: Command) -> Result<Output> {
        ctx.fetch::<u32>("missing")?;
        Ok(command.into())
    }
}

#[test]
fn located_errors_become_hook_errors() {
    let mut ctx = context();
    ctx.push(Rc::new(NeedsState)).unwrap();

    let err = process(&mut ctx, "ab<c/>").unwrap_err();
    let Error::Build(err) = err else {
        panic!("expected a build error, got {err:?}");
    };
    assert_eq!(err.kind, BuildErrorKind::Hook);
    assert_eq!(err.to_string(), "a:1.2-6: no shared state under `missing`");
}

#[test]
fn string_nodes_cannot_be_accepted() {
    let mut ctx = context();
    let node: Node = Str::new("s", parse("x").location().clone()).into();
    let err = ctx.accept(node).unwrap_err();
    assert!(
        matches!(err, Error::Node(NodeError::UnexpectedNode { found: "string", .. })),
        "{err:?}"
    );
}
