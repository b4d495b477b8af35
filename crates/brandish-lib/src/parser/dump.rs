//! Indented, location-free rendering of node trees for tests and debugging.

use std::fmt::Write;

use super::node::{Node, Pairs, Root};

impl Node {
    pub fn dump(&self) -> String {
        let mut out = String::new();
        dump_node(self, 0, &mut out);
        out
    }
}

impl Root {
    pub fn dump(&self) -> String {
        let mut out = String::new();
        dump_root(self, 0, &mut out);
        out
    }
}

fn frozen_suffix(node: &Node) -> &'static str {
    if node.is_update_prevented() {
        " (frozen)"
    } else {
        ""
    }
}

fn write_pairs(pairs: &Pairs, out: &mut String) {
    for (key, value) in pairs {
        let _ = write!(out, " {key}={value:?}");
    }
}

fn dump_root(root: &Root, depth: usize, out: &mut String) {
    let indent = "  ".repeat(depth);
    let suffix = if root.is_update_prevented() { " (frozen)" } else { "" };
    let _ = writeln!(out, "{indent}Root{suffix}");
    for child in root.children() {
        dump_node(child, depth + 1, out);
    }
}

fn dump_node(node: &Node, depth: usize, out: &mut String) {
    let indent = "  ".repeat(depth);
    let suffix = frozen_suffix(node);
    match node {
        Node::Root(root) => dump_root(root, depth, out),
        Node::Block(block) => {
            let _ = write!(out, "{indent}Block {:?}", block.name());
            write_pairs(block.pairs(), out);
            let _ = writeln!(out, "{suffix}");
            dump_root(block.body(), depth + 1, out);
        }
        Node::Command(command) => {
            let _ = write!(out, "{indent}Command {:?}", command.name());
            write_pairs(command.pairs(), out);
            let _ = writeln!(out, "{suffix}");
        }
        Node::Pair(pair) => {
            let _ = writeln!(out, "{indent}Pair {}={:?}{suffix}", pair.key(), pair.value());
        }
        Node::Text(text) => {
            let _ = writeln!(out, "{indent}Text {:?}{suffix}", text.value());
        }
        Node::String(string) => {
            let _ = writeln!(out, "{indent}String {:?}{suffix}", string.value());
        }
    }
}
