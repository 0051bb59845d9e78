//! Arena-based consolidated configuration tree.
//!
//! All nodes live in one generational arena; `children` hold owning child
//! indices while `parent`/`root` hold plain back-indices, so upward
//! navigation is O(1) and reference cycles cannot form. The tree is built
//! once by [`crate::builder::TreeBuilder`] and is read-only afterwards,
//! which makes every query safe for unlimited concurrent readers.

use std::fmt;
use std::path::PathBuf;

use generational_arena::{Arena, Index};
use termtree::Tree;
use tracing::instrument;

use crate::query::{Depth, IntoTerms, Keep, Pick};
use crate::result::{NodeRef, ResultSet};

/// A single configuration entity: a directive (no children) or a section
/// (one or more children), with provenance back to its source file.
#[derive(Debug)]
pub(crate) struct Node {
    pub(crate) name: String,
    /// Raw attribute lexemes, typed on demand via [`crate::value::Value::coerce`].
    pub(crate) attrs: Vec<String>,
    pub(crate) children: Vec<Index>,
    pub(crate) parent: Option<Index>,
    /// Top-most ancestor; `None` means the node is its own root.
    pub(crate) root: Option<Index>,
    pub(crate) file_path: PathBuf,
    /// Raw source line, continuation-joined where the format allows it.
    pub(crate) line: String,
    /// 1-based line number within `file_path`.
    pub(crate) pos: usize,
}

/// The consolidated tree: a synthetic, ownerless document root whose
/// `children` are the top-level nodes in file-inclusion order.
#[derive(Debug)]
pub struct ConfTree {
    pub(crate) arena: Arena<Node>,
    pub(crate) roots: Vec<Index>,
}

impl ConfTree {
    pub(crate) fn node(&self, idx: Index) -> Option<&Node> {
        self.arena.get(idx)
    }

    /// Total number of nodes in the tree.
    pub fn len(&self) -> usize {
        self.arena.len()
    }

    pub fn is_empty(&self) -> bool {
        self.arena.is_empty()
    }

    /// The document root's children: the top-level nodes in inclusion order.
    pub fn children(&self) -> ResultSet<'_> {
        ResultSet::new(self, self.roots.clone())
    }

    /// Preorder iterator over every node in the tree, in document order.
    pub fn iter(&self) -> TreeIter<'_> {
        TreeIter::new(self)
    }

    #[instrument(level = "debug", skip(self))]
    pub fn depth(&self) -> usize {
        self.roots
            .iter()
            .map(|&r| self.calculate_depth(r))
            .max()
            .unwrap_or(0)
    }

    fn calculate_depth(&self, idx: Index) -> usize {
        if let Some(node) = self.node(idx) {
            1 + node
                .children
                .iter()
                .map(|&child| self.calculate_depth(child))
                .max()
                .unwrap_or(0)
        } else {
            0
        }
    }

    /// The select primitive applied at the document root.
    pub fn select<T: IntoTerms>(&self, terms: T, depth: Depth, keep: Keep) -> ResultSet<'_> {
        let ids = crate::query::select_from(self, &self.roots, &terms.into_terms(), depth, keep);
        ResultSet::new(self, ids)
    }

    /// Like [`ConfTree::select`] but returning a single node, first or last
    /// in document order.
    pub fn pick<T: IntoTerms>(
        &self,
        terms: T,
        depth: Depth,
        keep: Keep,
        pick: Pick,
    ) -> Option<NodeRef<'_>> {
        crate::query::pick_from(self, &self.roots, &terms.into_terms(), depth, keep, pick)
            .map(|id| NodeRef::new(self, id))
    }

    /// Shallow query over the top-level nodes.
    pub fn get<T: IntoTerms>(&self, terms: T) -> ResultSet<'_> {
        self.select(terms, Depth::Shallow, Keep::Leaves)
    }

    /// Deep query over every node in the tree.
    pub fn find_all<T: IntoTerms>(&self, terms: T) -> ResultSet<'_> {
        self.select(terms, Depth::Deep, Keep::Leaves)
    }

    /// First match of a deep query, `None` when nothing matches.
    pub fn find<T: IntoTerms>(&self, terms: T) -> Option<NodeRef<'_>> {
        self.pick(terms, Depth::Deep, Keep::Leaves, Pick::First)
    }

    /// Deep single-node query with an explicit first/last policy.
    pub fn find_one<T: IntoTerms>(&self, terms: T, pick: Pick) -> Option<NodeRef<'_>> {
        self.pick(terms, Depth::Deep, Keep::Leaves, pick)
    }
}

impl fmt::Display for ConfTree {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for node in self.children().iter() {
            write!(f, "{}", node.to_tree())?;
        }
        Ok(())
    }
}

/// Renders a subtree as an indented [`termtree::Tree`].
pub trait TreeNodeConvert {
    fn to_tree(&self) -> Tree<String>;
}

impl TreeNodeConvert for NodeRef<'_> {
    fn to_tree(&self) -> Tree<String> {
        let label = if self.raw_attrs().is_empty() {
            self.name().to_string()
        } else {
            format!("{} {}", self.name(), self.raw_attrs().join(" "))
        };

        let leaves: Vec<_> = self.children().iter().map(|c| c.to_tree()).collect();
        Tree::new(label).with_leaves(leaves)
    }
}

pub struct TreeIter<'a> {
    tree: &'a ConfTree,
    stack: Vec<Index>,
}

impl<'a> TreeIter<'a> {
    fn new(tree: &'a ConfTree) -> Self {
        let stack = tree.roots.iter().rev().copied().collect();
        Self { tree, stack }
    }
}

impl<'a> Iterator for TreeIter<'a> {
    type Item = NodeRef<'a>;

    fn next(&mut self) -> Option<Self::Item> {
        let idx = self.stack.pop()?;
        if let Some(node) = self.tree.node(idx) {
            // Push children in reverse order for left-to-right traversal
            for &child in node.children.iter().rev() {
                self.stack.push(child);
            }
        }
        Some(NodeRef::new(self.tree, idx))
    }
}
