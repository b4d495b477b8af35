//! Immutable AST nodes.
//!
//! Nodes are values. Every change goes through [`Node::update`], which builds
//! a new node and leaves the original alone. Children and pairs sit behind
//! `Arc`, so clones share structure and a parsed tree can be handed to any
//! number of builds.
//!
//! A node may be marked update-prevented ("frozen") with
//! [`Node::prevent_update`]; updating it afterwards fails.

use std::sync::Arc;

use brandish_core::Location;
use indexmap::IndexMap;

use super::error::NodeError;
use crate::scanner::{Token, TokenKind, TokenSet, token_sets};

/// Attribute pairs of a block or command, in source order.
pub type Pairs = IndexMap<String, String>;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Node {
    Root(Root),
    Block(Block),
    Command(Command),
    Pair(Pair),
    Text(Text),
    String(Str),
}

/// One field replacement for [`Node::update`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Field {
    Name(String),
    Body(Root),
    Pairs(Pairs),
    Children(Vec<Node>),
    Value(String),
    Location(Location),
}

impl Field {
    pub fn name(&self) -> &'static str {
        match self {
            Field::Name(_) => "name",
            Field::Body(_) => "body",
            Field::Pairs(_) => "pairs",
            Field::Children(_) => "children",
            Field::Value(_) => "value",
            Field::Location(_) => "location",
        }
    }
}

macro_rules! node_common {
    ($($ty:ident => $variant:ident, $name:literal);* $(;)?) => {$(
        impl $ty {
            pub const VARIANT: &'static str = $name;

            pub fn location(&self) -> &Location {
                &self.location
            }

            /// Copy of this node that rejects every further update.
            pub fn prevent_update(&self) -> Self {
                Self {
                    frozen: true,
                    ..self.clone()
                }
            }

            pub fn is_update_prevented(&self) -> bool {
                self.frozen
            }

            fn ensure_updatable(&self) -> Result<(), NodeError> {
                if self.frozen {
                    return Err(NodeError::UpdatePrevented {
                        variant: Self::VARIANT,
                        location: self.location.clone(),
                    });
                }
                Ok(())
            }

            fn unknown_field(&self, field: &Field) -> NodeError {
                NodeError::UnknownField {
                    field: field.name(),
                    variant: Self::VARIANT,
                    location: self.location.clone(),
                }
            }
        }

        impl From<$ty> for Node {
            fn from(node: $ty) -> Self {
                Node::$variant(node)
            }
        }
    )*};
}

node_common! {
    Root => Root, "root";
    Block => Block, "block";
    Command => Command, "command";
    Pair => Pair, "pair";
    Text => Text, "text";
    Str => String, "string";
}

/// Concatenates token contents, rejecting kinds outside `allowed`.
///
/// Tokens from a different file than the first one do not widen the location.
fn join_tokens(
    tokens: &[Token],
    allowed: TokenSet,
    variant: &'static str,
) -> Result<(String, Location), NodeError> {
    let Some(first) = tokens.first() else {
        return Err(NodeError::Empty {
            variant,
            location: Location::default(),
        });
    };

    let mut value = String::new();
    let mut location = first.location.clone();
    for token in tokens {
        if !allowed.contains(token.kind) {
            return Err(NodeError::InvalidToken {
                kind: token.kind,
                variant,
                location: token.location.clone(),
            });
        }
        value.push_str(token.content());
        if let Ok(joined) = location.union(&token.location) {
            location = joined;
        }
    }
    Ok((value, location))
}

/// Union of the children's locations within `fallback`'s file, or `fallback`.
fn assume_location(children: &[Node], fallback: Location) -> Location {
    let same_file = children
        .iter()
        .map(Node::location)
        .filter(|location| location.same_file(&fallback));
    match Location::union_all(same_file) {
        Ok(Some(location)) => location,
        _ => fallback,
    }
}

/// Sequence of nodes: a whole document or a block body.
#[derive(Debug, Clone, Eq)]
pub struct Root {
    children: Arc<[Node]>,
    location: Location,
    /// Location derived from the children, not given explicitly.
    assumed: bool,
    frozen: bool,
}

impl PartialEq for Root {
    fn eq(&self, other: &Self) -> bool {
        self.children == other.children
            && self.location == other.location
            && self.frozen == other.frozen
    }
}

impl Root {
    pub fn new(children: impl Into<Arc<[Node]>>, location: Location) -> Self {
        Self {
            children: children.into(),
            location,
            assumed: false,
            frozen: false,
        }
    }

    /// Root located at the union of its children, or at `fallback` when it
    /// has none.
    pub fn assumed(children: impl Into<Arc<[Node]>>, fallback: Location) -> Self {
        let children = children.into();
        let location = assume_location(&children, fallback);
        Self {
            children,
            location,
            assumed: true,
            frozen: false,
        }
    }

    pub fn children(&self) -> &[Node] {
        &self.children
    }

    /// The shared children allocation. Two roots with pointer-equal children
    /// came from the same parse.
    pub fn shared_children(&self) -> &Arc<[Node]> {
        &self.children
    }

    pub fn is_assumed(&self) -> bool {
        self.assumed
    }

    pub fn is_empty(&self) -> bool {
        self.children.is_empty()
    }

    pub fn update(&self, fields: impl IntoIterator<Item = Field>) -> Result<Root, NodeError> {
        self.ensure_updatable()?;
        let mut next = self.clone();
        let mut explicit = None;
        for field in fields {
            match field {
                Field::Children(children) => next.children = children.into(),
                Field::Location(location) => explicit = Some(location),
                other => return Err(self.unknown_field(&other)),
            }
        }

        if let Some(location) = explicit {
            next.location = location;
            next.assumed = false;
        } else if next.assumed && !Arc::ptr_eq(&next.children, &self.children) {
            next.location = assume_location(&next.children, self.location.clone());
        }
        Ok(next)
    }

    /// Concatenates every Text value, recursing into nested roots.
    pub fn flatten(&self) -> Result<String, NodeError> {
        let mut out = String::new();
        self.flatten_into(&mut out)?;
        Ok(out)
    }

    fn flatten_into(&self, out: &mut String) -> Result<(), NodeError> {
        for child in self.children.iter() {
            match child {
                Node::Root(root) => root.flatten_into(out)?,
                Node::Text(text) => out.push_str(text.value()),
                other => {
                    return Err(NodeError::UnexpectedNode {
                        found: other.variant(),
                        expected: "text or root",
                        location: other.location().clone(),
                    });
                }
            }
        }
        Ok(())
    }
}

/// Paired tag: `<name k=v>body</name>`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Block {
    name: String,
    body: Root,
    pairs: Arc<Pairs>,
    location: Location,
    frozen: bool,
}

impl Block {
    pub fn new(name: impl Into<String>, body: Root, pairs: Pairs, location: Location) -> Self {
        Self {
            name: name.into(),
            body,
            pairs: Arc::new(pairs),
            location,
            frozen: false,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn body(&self) -> &Root {
        &self.body
    }

    pub fn pairs(&self) -> &Pairs {
        &self.pairs
    }

    pub fn update(&self, fields: impl IntoIterator<Item = Field>) -> Result<Block, NodeError> {
        self.ensure_updatable()?;
        let mut next = self.clone();
        for field in fields {
            match field {
                Field::Name(name) => next.name = name,
                Field::Body(body) => next.body = body,
                Field::Pairs(pairs) => next.pairs = Arc::new(pairs),
                Field::Location(location) => next.location = location,
                other => return Err(self.unknown_field(&other)),
            }
        }
        Ok(next)
    }
}

/// Self-closing directive: `<name k=v/>`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Command {
    name: String,
    pairs: Arc<Pairs>,
    location: Location,
    frozen: bool,
}

impl Command {
    pub fn new(name: impl Into<String>, pairs: Pairs, location: Location) -> Self {
        Self {
            name: name.into(),
            pairs: Arc::new(pairs),
            location,
            frozen: false,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn pairs(&self) -> &Pairs {
        &self.pairs
    }

    pub fn update(&self, fields: impl IntoIterator<Item = Field>) -> Result<Command, NodeError> {
        self.ensure_updatable()?;
        let mut next = self.clone();
        for field in fields {
            match field {
                Field::Name(name) => next.name = name,
                Field::Pairs(pairs) => next.pairs = Arc::new(pairs),
                Field::Location(location) => next.location = location,
                other => return Err(self.unknown_field(&other)),
            }
        }
        Ok(next)
    }
}

/// One `key=value` attribute of an opening tag.
///
/// Only lives long enough to be collapsed into a [`Pairs`] map.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Pair {
    key: Token,
    value: Box<Node>,
    location: Location,
    frozen: bool,
}

impl Pair {
    /// `key` must be a text token and `value` a Text or String node.
    pub fn new(key: Token, value: Node, location: Location) -> Result<Pair, NodeError> {
        if !key.is(TokenKind::Text) {
            return Err(NodeError::InvalidToken {
                kind: key.kind,
                variant: Self::VARIANT,
                location: key.location,
            });
        }
        if !matches!(value, Node::Text(_) | Node::String(_)) {
            return Err(NodeError::UnexpectedNode {
                found: value.variant(),
                expected: "text or string",
                location: value.location().clone(),
            });
        }
        Ok(Self {
            key,
            value: Box::new(value),
            location,
            frozen: false,
        })
    }

    pub fn key(&self) -> &str {
        &self.key.value
    }

    pub fn key_token(&self) -> &Token {
        &self.key
    }

    pub fn value(&self) -> &str {
        match self.value.as_ref() {
            Node::Text(text) => text.value(),
            Node::String(string) => string.value(),
            _ => "",
        }
    }

    pub fn value_node(&self) -> &Node {
        &self.value
    }

    /// Pairs have no updatable fields.
    pub fn update(&self, fields: impl IntoIterator<Item = Field>) -> Result<Pair, NodeError> {
        self.ensure_updatable()?;
        match fields.into_iter().next() {
            Some(field) => Err(self.unknown_field(&field)),
            None => Ok(self.clone()),
        }
    }
}

/// Literal document text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Text {
    value: String,
    location: Location,
    frozen: bool,
}

impl Text {
    pub fn new(value: impl Into<String>, location: Location) -> Self {
        Self {
            value: value.into(),
            location,
            frozen: false,
        }
    }

    /// Text from a non-empty run of [`token_sets::TEXT`] tokens.
    pub fn from_tokens(tokens: &[Token]) -> Result<Text, NodeError> {
        let (value, location) = join_tokens(tokens, token_sets::TEXT, Self::VARIANT)?;
        Ok(Self::new(value, location))
    }

    pub fn value(&self) -> &str {
        &self.value
    }

    pub fn update(&self, fields: impl IntoIterator<Item = Field>) -> Result<Text, NodeError> {
        self.ensure_updatable()?;
        let mut next = self.clone();
        for field in fields {
            match field {
                Field::Value(value) => next.value = value,
                Field::Location(location) => next.location = location,
                other => return Err(self.unknown_field(&other)),
            }
        }
        Ok(next)
    }
}

/// Contents of a quoted attribute value.
///
/// Unlike [`Text`] it may contain tag delimiters, but never a bare quote.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Str {
    value: String,
    location: Location,
    frozen: bool,
}

impl Str {
    pub fn new(value: impl Into<String>, location: Location) -> Self {
        Self {
            value: value.into(),
            location,
            frozen: false,
        }
    }

    /// String from a non-empty run of [`token_sets::STRING`] tokens.
    pub fn from_tokens(tokens: &[Token]) -> Result<Str, NodeError> {
        let (value, location) = join_tokens(tokens, token_sets::STRING, Self::VARIANT)?;
        Ok(Self::new(value, location))
    }

    /// String spanning its quotes; `tokens` may be empty.
    pub fn quoted(open: &Token, tokens: &[Token], close: &Token) -> Result<Str, NodeError> {
        let value = if tokens.is_empty() {
            String::new()
        } else {
            join_tokens(tokens, token_sets::STRING, Self::VARIANT)?.0
        };
        let location = open
            .location
            .union(&close.location)
            .unwrap_or_else(|_| open.location.clone());
        Ok(Self::new(value, location))
    }

    pub fn value(&self) -> &str {
        &self.value
    }

    pub fn update(&self, fields: impl IntoIterator<Item = Field>) -> Result<Str, NodeError> {
        self.ensure_updatable()?;
        let mut next = self.clone();
        for field in fields {
            match field {
                Field::Value(value) => next.value = value,
                Field::Location(location) => next.location = location,
                other => return Err(self.unknown_field(&other)),
            }
        }
        Ok(next)
    }
}

impl Node {
    /// Lowercase variant name, as used in error messages.
    pub fn variant(&self) -> &'static str {
        match self {
            Node::Root(_) => Root::VARIANT,
            Node::Block(_) => Block::VARIANT,
            Node::Command(_) => Command::VARIANT,
            Node::Pair(_) => Pair::VARIANT,
            Node::Text(_) => Text::VARIANT,
            Node::String(_) => Str::VARIANT,
        }
    }

    pub fn location(&self) -> &Location {
        match self {
            Node::Root(n) => n.location(),
            Node::Block(n) => n.location(),
            Node::Command(n) => n.location(),
            Node::Pair(n) => n.location(),
            Node::Text(n) => n.location(),
            Node::String(n) => n.location(),
        }
    }

    /// Tag name of a block or command.
    pub fn name(&self) -> Option<&str> {
        match self {
            Node::Block(n) => Some(n.name()),
            Node::Command(n) => Some(n.name()),
            _ => None,
        }
    }

    /// Attribute pairs of a block or command.
    pub fn pairs(&self) -> Option<&Pairs> {
        match self {
            Node::Block(n) => Some(n.pairs()),
            Node::Command(n) => Some(n.pairs()),
            _ => None,
        }
    }

    pub fn as_root(&self) -> Option<&Root> {
        match self {
            Node::Root(root) => Some(root),
            _ => None,
        }
    }

    pub fn as_text(&self) -> Option<&Text> {
        match self {
            Node::Text(text) => Some(text),
            _ => None,
        }
    }

    pub fn is_update_prevented(&self) -> bool {
        match self {
            Node::Root(n) => n.is_update_prevented(),
            Node::Block(n) => n.is_update_prevented(),
            Node::Command(n) => n.is_update_prevented(),
            Node::Pair(n) => n.is_update_prevented(),
            Node::Text(n) => n.is_update_prevented(),
            Node::String(n) => n.is_update_prevented(),
        }
    }

    pub fn prevent_update(&self) -> Node {
        match self {
            Node::Root(n) => n.prevent_update().into(),
            Node::Block(n) => n.prevent_update().into(),
            Node::Command(n) => n.prevent_update().into(),
            Node::Pair(n) => n.prevent_update().into(),
            Node::Text(n) => n.prevent_update().into(),
            Node::String(n) => n.prevent_update().into(),
        }
    }

    /// New node of the same variant with `fields` replaced.
    ///
    /// Fails on an update-prevented node or a field the variant lacks.
    pub fn update(&self, fields: impl IntoIterator<Item = Field>) -> Result<Node, NodeError> {
        Ok(match self {
            Node::Root(n) => n.update(fields)?.into(),
            Node::Block(n) => n.update(fields)?.into(),
            Node::Command(n) => n.update(fields)?.into(),
            Node::Pair(n) => n.update(fields)?.into(),
            Node::Text(n) => n.update(fields)?.into(),
            Node::String(n) => n.update(fields)?.into(),
        })
    }
}
