//! Wrappers restricting a pass to certain tag names and attribute keys.
//!
//! Both filters only look at blocks and commands; roots and text go straight
//! to the wrapped pass. Stack them as `pass.pairs(..).named(..)` so the name
//! check runs first. A pass that only handles one of the two variants should
//! use `block_pairs` or `command_pairs`, so the other variant reaches it
//! unchecked and falls through its default hook.

use indexmap::IndexSet;

use super::context::Context;
use super::error::{BuildError, BuildErrorKind};
use super::pass::{Output, Pass};
use crate::Result;
use crate::parser::Node;

/// Passes `inner` only the blocks and commands named in `names`. Every other
/// block or command is returned unchanged.
#[derive(Debug)]
pub struct NameFilter<P> {
    inner: P,
    names: IndexSet<String>,
}

impl<P: Pass> NameFilter<P> {
    pub fn new<I, S>(inner: P, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            inner,
            names: names.into_iter().map(Into::into).collect(),
        }
    }

    pub fn names(&self) -> &IndexSet<String> {
        &self.names
    }

    fn matches(&self, node: &Node) -> bool {
        node.name().is_none_or(|name| self.names.contains(name))
    }
}

impl<P: Pass> Pass for NameFilter<P> {
    fn name(&self) -> &str {
        self.inner.name()
    }

    fn setup(&self, ctx: &mut Context) -> Result<()> {
        self.inner.setup(ctx)
    }

    fn call(&self, ctx: &mut Context, node: Node) -> Result<Output> {
        if !self.matches(&node) {
            return Ok(node.into());
        }
        self.inner.call(ctx, node)
    }

    fn postprocess(&self, ctx: &mut Context, result: Option<&Node>) -> Result<()> {
        self.inner.postprocess(ctx, result)
    }
}

/// Attribute keys a pass accepts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AllowedPairs {
    Only(IndexSet<String>),
    Unrestricted,
}

impl AllowedPairs {
    pub fn allows(&self, key: &str) -> bool {
        match self {
            AllowedPairs::Only(keys) => keys.contains(key),
            AllowedPairs::Unrestricted => true,
        }
    }
}

/// Node variants a [`PairFilter`] checks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PairTarget {
    #[default]
    All,
    Blocks,
    Commands,
}

impl PairTarget {
    fn covers(self, node: &Node) -> bool {
        match (self, node) {
            (PairTarget::All, _) => true,
            (PairTarget::Blocks, Node::Block(_)) => true,
            (PairTarget::Commands, Node::Command(_)) => true,
            _ => false,
        }
    }
}

/// Rejects blocks and commands carrying keys outside the allowed set.
#[derive(Debug)]
pub struct PairFilter<P> {
    inner: P,
    allowed: AllowedPairs,
    target: PairTarget,
}

impl<P: Pass> PairFilter<P> {
    pub fn new(inner: P, allowed: AllowedPairs) -> Self {
        Self {
            inner,
            allowed,
            target: PairTarget::All,
        }
    }

    pub fn with_target(mut self, target: PairTarget) -> Self {
        self.target = target;
        self
    }

    pub fn allowed(&self) -> &AllowedPairs {
        &self.allowed
    }

    pub fn target(&self) -> PairTarget {
        self.target
    }

    fn check(&self, node: &Node) -> Result<()> {
        if !self.target.covers(node) {
            return Ok(());
        }
        let Some(pairs) = node.pairs() else {
            return Ok(());
        };
        let excess: Vec<String> = pairs
            .keys()
            .filter(|key| !self.allowed.allows(key))
            .map(|key| format!("{key:?}"))
            .collect();
        if excess.is_empty() {
            return Ok(());
        }
        Err(BuildError::new(
            BuildErrorKind::Pair,
            format!("unexpected pairs found ({})", excess.join(", ")),
            node.location().clone(),
        )
        .into())
    }
}

impl<P: Pass> Pass for PairFilter<P> {
    fn name(&self) -> &str {
        self.inner.name()
    }

    fn setup(&self, ctx: &mut Context) -> Result<()> {
        self.inner.setup(ctx)
    }

    fn call(&self, ctx: &mut Context, node: Node) -> Result<Output> {
        self.check(&node)?;
        self.inner.call(ctx, node)
    }

    fn postprocess(&self, ctx: &mut Context, result: Option<&Node>) -> Result<()> {
        self.inner.postprocess(ctx, result)
    }
}

/// Builder methods for wrapping any pass in filters.
pub trait PassExt: Pass + Sized {
    fn named<I, S>(self, names: I) -> NameFilter<Self>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        NameFilter::new(self, names)
    }

    fn pairs<I, S>(self, keys: I) -> PairFilter<Self>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let keys = keys.into_iter().map(Into::into).collect();
        PairFilter::new(self, AllowedPairs::Only(keys))
    }

    /// Like [`PassExt::pairs`], checking blocks only.
    fn block_pairs<I, S>(self, keys: I) -> PairFilter<Self>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.pairs(keys).with_target(PairTarget::Blocks)
    }

    /// Like [`PassExt::pairs`], checking commands only.
    fn command_pairs<I, S>(self, keys: I) -> PairFilter<Self>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.pairs(keys).with_target(PairTarget::Commands)
    }

    fn unrestricted_pairs(self) -> PairFilter<Self> {
        PairFilter::new(self, AllowedPairs::Unrestricted)
    }
}

impl<P: Pass> PassExt for P {}
