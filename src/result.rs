//! Node handles and the ordered, queryable result collection.
//!
//! A [`ResultSet`] aliases nodes owned by the tree; it never copies them.
//! Every query over a set applies to each element's children in order and
//! concatenates the per-element output, so chained queries restrict scope
//! step by step.

use std::fmt;
use std::path::Path;

use generational_arena::Index;

use crate::query::{self, Depth, IntoTerms, Keep, Pick};
use crate::tree::ConfTree;
use crate::value::Value;

/// Borrowing handle to one node of a [`ConfTree`].
#[derive(Clone, Copy)]
pub struct NodeRef<'a> {
    tree: &'a ConfTree,
    id: Index,
}

impl<'a> NodeRef<'a> {
    pub(crate) fn new(tree: &'a ConfTree, id: Index) -> Self {
        Self { tree, id }
    }

    fn node(&self) -> &'a crate::tree::Node {
        // Handles are only ever minted for live indices of this tree.
        self.tree
            .node(self.id)
            .expect("structural invariant: node handle valid for its tree")
    }

    pub fn name(&self) -> &'a str {
        &self.node().name
    }

    /// Raw attribute lexemes, exactly as written in the source.
    pub fn raw_attrs(&self) -> &'a [String] {
        &self.node().attrs
    }

    /// Attributes typed per the int -> float -> bool -> string precedence.
    pub fn attrs(&self) -> Vec<Value> {
        self.node().attrs.iter().map(|raw| Value::coerce(raw)).collect()
    }

    /// The single typed attribute when there is exactly one, otherwise the
    /// full typed sequence.
    pub fn value(&self) -> NodeValue {
        let mut attrs = self.attrs();
        if attrs.len() == 1 {
            NodeValue::One(attrs.remove(0))
        } else {
            NodeValue::Seq(attrs)
        }
    }

    pub fn children(&self) -> ResultSet<'a> {
        ResultSet::new(self.tree, self.node().children.clone())
    }

    pub fn parent(&self) -> Option<NodeRef<'a>> {
        self.node().parent.map(|p| NodeRef::new(self.tree, p))
    }

    /// Top-most ancestor; the node itself when it is top-level.
    pub fn root(&self) -> NodeRef<'a> {
        match self.node().root {
            Some(r) => NodeRef::new(self.tree, r),
            None => *self,
        }
    }

    pub fn file_path(&self) -> &'a Path {
        &self.node().file_path
    }

    /// Raw source line this node was parsed from.
    pub fn line(&self) -> &'a str {
        &self.node().line
    }

    /// 1-based line number within [`NodeRef::file_path`].
    pub fn pos(&self) -> usize {
        self.node().pos
    }

    /// A node is a section iff it has at least one child.
    pub fn is_section(&self) -> bool {
        !self.node().children.is_empty()
    }

    pub fn is_directive(&self) -> bool {
        self.node().children.is_empty()
    }

    pub fn select<T: IntoTerms>(&self, terms: T, depth: Depth, keep: Keep) -> ResultSet<'a> {
        let ids = query::select_from(
            self.tree,
            &self.node().children,
            &terms.into_terms(),
            depth,
            keep,
        );
        ResultSet::new(self.tree, ids)
    }

    pub fn pick<T: IntoTerms>(
        &self,
        terms: T,
        depth: Depth,
        keep: Keep,
        pick: Pick,
    ) -> Option<NodeRef<'a>> {
        query::pick_from(
            self.tree,
            &self.node().children,
            &terms.into_terms(),
            depth,
            keep,
            pick,
        )
        .map(|id| NodeRef::new(self.tree, id))
    }

    /// Shallow query over this node's children.
    pub fn get<T: IntoTerms>(&self, terms: T) -> ResultSet<'a> {
        self.select(terms, Depth::Shallow, Keep::Leaves)
    }

    /// Deep query over this node's subtree (the node itself excluded).
    pub fn find_all<T: IntoTerms>(&self, terms: T) -> ResultSet<'a> {
        self.select(terms, Depth::Deep, Keep::Leaves)
    }

    pub fn find<T: IntoTerms>(&self, terms: T) -> Option<NodeRef<'a>> {
        self.pick(terms, Depth::Deep, Keep::Leaves, Pick::First)
    }

    pub fn find_one<T: IntoTerms>(&self, terms: T, pick: Pick) -> Option<NodeRef<'a>> {
        self.pick(terms, Depth::Deep, Keep::Leaves, pick)
    }
}

impl fmt::Debug for NodeRef<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NodeRef")
            .field("name", &self.name())
            .field("attrs", &self.raw_attrs())
            .field("file_path", &self.file_path())
            .field("pos", &self.pos())
            .finish()
    }
}

impl PartialEq for NodeRef<'_> {
    fn eq(&self, other: &Self) -> bool {
        std::ptr::eq(self.tree, other.tree) && self.id == other.id
    }
}

impl Eq for NodeRef<'_> {}

/// The `value` of a node: one typed attribute, or the typed sequence when
/// there are zero or several.
#[derive(Debug, Clone, PartialEq)]
pub enum NodeValue {
    One(Value),
    Seq(Vec<Value>),
}

impl PartialEq<&str> for NodeValue {
    fn eq(&self, other: &&str) -> bool {
        matches!(self, NodeValue::One(Value::Str(s)) if s == other)
    }
}

impl PartialEq<i64> for NodeValue {
    fn eq(&self, other: &i64) -> bool {
        matches!(self, NodeValue::One(v) if v.loose_eq(&Value::Int(*other)))
    }
}

impl PartialEq<f64> for NodeValue {
    fn eq(&self, other: &f64) -> bool {
        matches!(self, NodeValue::One(v) if v.loose_eq(&Value::Float(*other)))
    }
}

impl PartialEq<bool> for NodeValue {
    fn eq(&self, other: &bool) -> bool {
        matches!(self, NodeValue::One(Value::Bool(b)) if b == other)
    }
}

/// Ordered, 0-indexed, negative-indexable collection of node references.
/// Empty sets are falsy: `is_empty` stands in for truthiness.
#[derive(Clone)]
pub struct ResultSet<'a> {
    tree: &'a ConfTree,
    ids: Vec<Index>,
}

impl<'a> ResultSet<'a> {
    pub(crate) fn new(tree: &'a ConfTree, ids: Vec<Index>) -> Self {
        Self { tree, ids }
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    pub fn iter(&self) -> Iter<'_, 'a> {
        Iter {
            tree: self.tree,
            inner: self.ids.iter(),
        }
    }

    /// Index with negative support: `at(-1)` is the last element.
    pub fn at(&self, index: isize) -> Option<NodeRef<'a>> {
        let len = self.ids.len() as isize;
        let effective = if index < 0 { len + index } else { index };
        if (0..len).contains(&effective) {
            Some(NodeRef::new(self.tree, self.ids[effective as usize]))
        } else {
            None
        }
    }

    pub fn first(&self) -> Option<NodeRef<'a>> {
        self.ids.first().map(|&id| NodeRef::new(self.tree, id))
    }

    pub fn last(&self) -> Option<NodeRef<'a>> {
        self.ids.last().map(|&id| NodeRef::new(self.tree, id))
    }

    /// The childless elements, relative order preserved.
    pub fn directives(&self) -> ResultSet<'a> {
        self.filter_ids(|n| n.is_directive())
    }

    /// The elements with children, relative order preserved.
    pub fn sections(&self) -> ResultSet<'a> {
        self.filter_ids(|n| n.is_section())
    }

    fn filter_ids(&self, keep: impl Fn(&NodeRef<'a>) -> bool) -> ResultSet<'a> {
        let ids = self
            .ids
            .iter()
            .copied()
            .filter(|&id| keep(&NodeRef::new(self.tree, id)))
            .collect();
        ResultSet::new(self.tree, ids)
    }

    /// Element names in element order; dedup and sort at the call site.
    pub fn names(&self) -> Vec<&'a str> {
        self.iter().map(|n| n.name()).collect()
    }

    /// Delegates to the single element's value; `None` unless the set holds
    /// exactly one node.
    pub fn value(&self) -> Option<NodeValue> {
        if self.ids.len() == 1 {
            self.first().map(|n| n.value())
        } else {
            None
        }
    }

    /// Apply the next select to each element's children, concatenating the
    /// per-element output in element order.
    pub fn select<T: IntoTerms>(&self, terms: T, depth: Depth, keep: Keep) -> ResultSet<'a> {
        let starts = self.child_ids();
        let ids = query::select_from(self.tree, &starts, &terms.into_terms(), depth, keep);
        ResultSet::new(self.tree, ids)
    }

    pub fn pick<T: IntoTerms>(
        &self,
        terms: T,
        depth: Depth,
        keep: Keep,
        pick: Pick,
    ) -> Option<NodeRef<'a>> {
        let starts = self.child_ids();
        query::pick_from(self.tree, &starts, &terms.into_terms(), depth, keep, pick)
            .map(|id| NodeRef::new(self.tree, id))
    }

    /// Shallow query over the elements' immediate children.
    pub fn get<T: IntoTerms>(&self, terms: T) -> ResultSet<'a> {
        self.select(terms, Depth::Shallow, Keep::Leaves)
    }

    /// Deep query over the elements' subtrees.
    pub fn find_all<T: IntoTerms>(&self, terms: T) -> ResultSet<'a> {
        self.select(terms, Depth::Deep, Keep::Leaves)
    }

    pub fn find<T: IntoTerms>(&self, terms: T) -> Option<NodeRef<'a>> {
        self.pick(terms, Depth::Deep, Keep::Leaves, Pick::First)
    }

    pub fn find_one<T: IntoTerms>(&self, terms: T, pick: Pick) -> Option<NodeRef<'a>> {
        self.pick(terms, Depth::Deep, Keep::Leaves, pick)
    }

    fn child_ids(&self) -> Vec<Index> {
        self.ids
            .iter()
            .filter_map(|&id| self.tree.node(id))
            .flat_map(|n| n.children.iter().copied())
            .collect()
    }
}

impl fmt::Debug for ResultSet<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.iter()).finish()
    }
}

pub struct Iter<'s, 'a> {
    tree: &'a ConfTree,
    inner: std::slice::Iter<'s, Index>,
}

impl<'s, 'a> Iterator for Iter<'s, 'a> {
    type Item = NodeRef<'a>;

    fn next(&mut self) -> Option<Self::Item> {
        self.inner.next().map(|&id| NodeRef::new(self.tree, id))
    }
}

impl<'s, 'a> IntoIterator for &'s ResultSet<'a> {
    type Item = NodeRef<'a>;
    type IntoIter = Iter<'s, 'a>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

pub struct IntoIter<'a> {
    tree: &'a ConfTree,
    inner: std::vec::IntoIter<Index>,
}

impl<'a> Iterator for IntoIter<'a> {
    type Item = NodeRef<'a>;

    fn next(&mut self) -> Option<Self::Item> {
        self.inner.next().map(|id| NodeRef::new(self.tree, id))
    }
}

impl<'a> IntoIterator for ResultSet<'a> {
    type Item = NodeRef<'a>;
    type IntoIter = IntoIter<'a>;

    fn into_iter(self) -> Self::IntoIter {
        IntoIter {
            tree: self.tree,
            inner: self.ids.into_iter(),
        }
    }
}
