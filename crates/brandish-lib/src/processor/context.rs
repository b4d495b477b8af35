//! The per-build coordinator: pass pipeline, shared state and traversal.

use std::any::Any;
use std::fmt;
use std::rc::Rc;
use std::sync::Arc;

use indexmap::IndexMap;

use super::descend::Descend;
use super::documents::Documents;
use super::error::{BuildError, BuildErrorKind};
use super::form::Form;
use super::pass::Pass;
use super::registry::Registry;
use crate::parser::{Node, Root};
use crate::{Error, Result};

/// Whether one root may be accepted more than once per [`Context::process`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ReentryPolicy {
    #[default]
    Allow,
    /// Accepting a root that shares its children with one already accepted
    /// fails. Distinct subtrees may always be accepted.
    Forbid,
}

/// Fold state of one node through the pipeline.
enum Folded {
    Live(Node),
    /// Update-prevented; skips every remaining pass.
    Frozen(Node),
    Dropped,
}

impl Folded {
    fn from_output(node: Option<Node>) -> Self {
        match node {
            Some(node) if node.is_update_prevented() => Folded::Frozen(node),
            Some(node) => Folded::Live(node),
            None => Folded::Dropped,
        }
    }

    fn into_node(self) -> Option<Node> {
        match self {
            Folded::Live(node) | Folded::Frozen(node) => Some(node),
            Folded::Dropped => None,
        }
    }
}

/// Build-scoped state shared by every pass of one form.
///
/// Holds the ordered pass list, keyed shared state and the form being built.
/// A context is owned by a single build and never crosses threads.
pub struct Context {
    form: Form,
    descend: Rc<dyn Pass>,
    passes: Vec<Rc<dyn Pass>>,
    state: IndexMap<String, Box<dyn Any>>,
    documents: Option<Arc<Documents>>,
    reentry: ReentryPolicy,
    /// Children of every root accepted under `ReentryPolicy::Forbid`.
    accepted_roots: Vec<Arc<[Node]>>,
}

impl fmt::Debug for Context {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Context")
            .field("form", &self.form.name)
            .field("passes", &self.passes.iter().map(|p| p.name()).collect::<Vec<_>>())
            .field("state", &self.state.keys().collect::<Vec<_>>())
            .field("reentry", &self.reentry)
            .finish_non_exhaustive()
    }
}

impl Context {
    pub fn new(form: Form) -> Self {
        Self {
            form,
            descend: Rc::new(Descend),
            passes: Vec::new(),
            state: IndexMap::new(),
            documents: None,
            reentry: ReentryPolicy::default(),
            accepted_roots: Vec::new(),
        }
    }

    /// Context with every pass of `form` resolved against `registry` and
    /// registered in order.
    pub fn for_form(form: Form, registry: &Registry) -> Result<Self> {
        let mut ctx = Self::new(form);
        ctx.use_form_passes(registry)?;
        Ok(ctx)
    }

    pub fn with_documents(mut self, documents: Arc<Documents>) -> Self {
        self.documents = Some(documents);
        self
    }

    pub fn with_reentry_policy(mut self, policy: ReentryPolicy) -> Self {
        self.reentry = policy;
        self
    }

    pub fn form(&self) -> &Form {
        &self.form
    }

    pub fn documents(&self) -> Option<&Arc<Documents>> {
        self.documents.as_ref()
    }

    pub fn passes(&self) -> &[Rc<dyn Pass>] {
        &self.passes
    }

    /// Resolves and registers the passes listed in the form.
    pub fn use_form_passes(&mut self, registry: &Registry) -> Result<()> {
        let specs = self.form.passes.clone();
        for spec in specs {
            let factory = registry.resolve(&spec.pass, &self.form.format)?;
            match factory(&spec.options)? {
                Some(pass) => self.push(pass)?,
                None => log::debug!("pass {:?} opted out of form {}", spec.pass, self.form.name),
            }
        }
        Ok(())
    }

    /// Appends a pass to the pipeline and runs its setup hook.
    pub fn push(&mut self, pass: Rc<dyn Pass>) -> Result<()> {
        log::debug!("registering pass {} for form {}", pass.name(), self.form.name);
        self.passes.push(Rc::clone(&pass));
        pass.setup(self)
    }

    /// Prepends a pass to the pipeline and runs its setup hook.
    pub fn unshift(&mut self, pass: Rc<dyn Pass>) -> Result<()> {
        log::debug!("registering pass {} first for form {}", pass.name(), self.form.name);
        self.passes.insert(0, Rc::clone(&pass));
        pass.setup(self)
    }

    fn pipeline(&self) -> Vec<Rc<dyn Pass>> {
        let mut pipeline = Vec::with_capacity(self.passes.len() + 1);
        pipeline.push(Rc::clone(&self.descend));
        pipeline.extend(self.passes.iter().cloned());
        pipeline
    }

    /// Accepts `root`, then runs every pass's postprocess hook on the result.
    pub fn process(&mut self, root: Root) -> Result<Option<Node>> {
        log::debug!(
            "processing {} for form {} with {} passes",
            root.location().file(),
            self.form.name,
            self.passes.len()
        );
        self.accepted_roots.clear();

        let result = self.accept(root.into())?;
        for pass in self.pipeline() {
            pass.postprocess(self, result.as_ref())?;
        }

        log::debug!("finished processing for form {}", self.form.name);
        Ok(result)
    }

    /// Folds `node` through descend and then every registered pass, in order.
    ///
    /// Folding stops early when a pass drops the node or returns an
    /// update-prevented one. A node that is already update-prevented comes
    /// back untouched.
    pub fn accept(&mut self, node: Node) -> Result<Option<Node>> {
        if let Node::Root(root) = &node {
            self.check_reentry(root)?;
        }

        let mut folded = if node.is_update_prevented() {
            Folded::Frozen(node)
        } else {
            Folded::Live(node)
        };

        for pass in self.pipeline() {
            let node = match folded {
                Folded::Live(node) => node,
                done => return Ok(done.into_node()),
            };
            let location = node.location().clone();
            let output = pass.call(self, node)?;
            folded = Folded::from_output(output.into_node(&location));
        }

        Ok(folded.into_node())
    }

    fn check_reentry(&mut self, root: &Root) -> Result<()> {
        if self.reentry == ReentryPolicy::Allow {
            return Ok(());
        }
        let children = root.shared_children();
        if self.accepted_roots.iter().any(|seen| Arc::ptr_eq(seen, children)) {
            return Err(BuildError::new(
                BuildErrorKind::Reentry,
                "root was already accepted in this build",
                root.location().clone(),
            )
            .into());
        }
        self.accepted_roots.push(Arc::clone(children));
        Ok(())
    }

    /// Stores `value` under `key`, replacing any previous value.
    pub fn insert<T: Any>(&mut self, key: impl Into<String>, value: T) {
        self.state.insert(key.into(), Box::new(value));
    }

    pub fn get<T: Any>(&self, key: &str) -> Option<&T> {
        self.state.get(key)?.downcast_ref()
    }

    pub fn get_mut<T: Any>(&mut self, key: &str) -> Option<&mut T> {
        self.state.get_mut(key)?.downcast_mut()
    }

    /// Like [`Context::get`], but a missing key or a value of another type is
    /// an error.
    pub fn fetch<T: Any>(&self, key: &str) -> Result<&T> {
        self.state
            .get(key)
            .ok_or_else(|| Error::MissingState(key.to_owned()))?
            .downcast_ref()
            .ok_or_else(|| Error::StateType(key.to_owned()))
    }

    pub fn fetch_mut<T: Any>(&mut self, key: &str) -> Result<&mut T> {
        self.state
            .get_mut(key)
            .ok_or_else(|| Error::MissingState(key.to_owned()))?
            .downcast_mut()
            .ok_or_else(|| Error::StateType(key.to_owned()))
    }

    /// Value under `key`, inserting `default()` first when absent.
    pub fn entry_or_insert_with<T: Any>(
        &mut self,
        key: &str,
        default: impl FnOnce() -> T,
    ) -> Result<&mut T> {
        self.state
            .entry(key.to_owned())
            .or_insert_with(|| Box::new(default()) as Box<dyn Any>)
            .downcast_mut()
            .ok_or_else(|| Error::StateType(key.to_owned()))
    }

    pub fn contains(&self, key: &str) -> bool {
        self.state.contains_key(key)
    }

    pub fn remove(&mut self, key: &str) -> Option<Box<dyn Any>> {
        self.state.shift_remove(key)
    }
}
