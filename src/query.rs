//! Query terms and the select engine.
//!
//! A [`Term`] matches one node: its name part matches `Node.name` and each
//! attribute part must be satisfied by at least one of the node's
//! attributes (AND across attribute positions, ANY across a node's
//! attributes; a combined predicate distributes the same way, see
//! [`crate::predicate::Pred::matches_any`]). Multiple terms passed to one
//! query are alternatives (OR) —
//! that is the difference between `conf.get(("Directory", "/"))` (name plus
//! attribute) and `conf.get(terms!["Directory", "Options"])` (either name).
//!
//! Traversal is always preorder document order. Options are explicit enums
//! at every call site; there is no ambient default.

use std::collections::HashSet;

use generational_arena::Index;
use itertools::Itertools;
use tracing::instrument;

use crate::predicate::Pred;
use crate::tree::{ConfTree, Node};
use crate::value::Value;

/// Name-position part of a term.
#[derive(Debug, Clone)]
pub enum NameTerm {
    /// Exact, case-sensitive match against `Node.name`.
    Literal(String),
    /// Predicate applied to the name as a string value.
    Pred(Pred),
}

impl NameTerm {
    fn matches(&self, name: &str) -> bool {
        match self {
            NameTerm::Literal(s) => s == name,
            NameTerm::Pred(p) => p.matches(&Value::Str(name.to_string())),
        }
    }
}

/// Attribute-position part of a term.
#[derive(Debug, Clone)]
pub enum AttrTerm {
    /// Loose-equality match against a coerced attribute.
    Literal(Value),
    /// Predicate applied to each coerced attribute.
    Pred(Pred),
}

impl AttrTerm {
    fn matches_node(&self, attrs: &[Value]) -> bool {
        match self {
            AttrTerm::Literal(v) => attrs.iter().any(|a| v.loose_eq(a)),
            AttrTerm::Pred(p) => p.matches_any(attrs),
        }
    }
}

/// One query term: a name matcher plus zero or more attribute matchers.
#[derive(Debug, Clone)]
pub struct Term {
    name: NameTerm,
    attrs: Vec<AttrTerm>,
}

impl Term {
    pub fn new(name: impl Into<NameTerm>) -> Term {
        Term {
            name: name.into(),
            attrs: Vec::new(),
        }
    }

    /// Add an attribute position; every position must be satisfied by some
    /// attribute of the node.
    pub fn with_attr(mut self, attr: impl Into<AttrTerm>) -> Term {
        self.attrs.push(attr.into());
        self
    }

    pub(crate) fn matches(&self, node: &Node) -> bool {
        if !self.name.matches(&node.name) {
            return false;
        }
        if self.attrs.is_empty() {
            return true;
        }
        let attrs: Vec<Value> = node.attrs.iter().map(|raw| Value::coerce(raw)).collect();
        self.attrs.iter().all(|attr_term| attr_term.matches_node(&attrs))
    }
}

impl From<&str> for NameTerm {
    fn from(s: &str) -> Self {
        NameTerm::Literal(s.to_string())
    }
}

impl From<String> for NameTerm {
    fn from(s: String) -> Self {
        NameTerm::Literal(s)
    }
}

impl From<Pred> for NameTerm {
    fn from(p: Pred) -> Self {
        NameTerm::Pred(p)
    }
}

// String literals in attribute position are coerced exactly like node
// attributes, so ("Listen", "80") matches a Listen directive whose
// attribute types as the integer 80.
impl From<&str> for AttrTerm {
    fn from(s: &str) -> Self {
        AttrTerm::Literal(Value::coerce(s))
    }
}

impl From<String> for AttrTerm {
    fn from(s: String) -> Self {
        AttrTerm::Literal(Value::coerce(&s))
    }
}

impl From<i64> for AttrTerm {
    fn from(i: i64) -> Self {
        AttrTerm::Literal(Value::Int(i))
    }
}

impl From<f64> for AttrTerm {
    fn from(f: f64) -> Self {
        AttrTerm::Literal(Value::Float(f))
    }
}

impl From<bool> for AttrTerm {
    fn from(b: bool) -> Self {
        AttrTerm::Literal(Value::Bool(b))
    }
}

impl From<Value> for AttrTerm {
    fn from(v: Value) -> Self {
        AttrTerm::Literal(v)
    }
}

impl From<Pred> for AttrTerm {
    fn from(p: Pred) -> Self {
        AttrTerm::Pred(p)
    }
}

impl From<&str> for Term {
    fn from(s: &str) -> Self {
        Term::new(s)
    }
}

impl From<String> for Term {
    fn from(s: String) -> Self {
        Term::new(s)
    }
}

impl From<Pred> for Term {
    fn from(p: Pred) -> Self {
        Term::new(p)
    }
}

impl<N: Into<NameTerm>, A: Into<AttrTerm>> From<(N, A)> for Term {
    fn from((name, a): (N, A)) -> Self {
        Term::new(name).with_attr(a)
    }
}

impl<N: Into<NameTerm>, A: Into<AttrTerm>, B: Into<AttrTerm>> From<(N, A, B)> for Term {
    fn from((name, a, b): (N, A, B)) -> Self {
        Term::new(name).with_attr(a).with_attr(b)
    }
}

impl<N: Into<NameTerm>, A: Into<AttrTerm>, B: Into<AttrTerm>, C: Into<AttrTerm>>
    From<(N, A, B, C)> for Term
{
    fn from((name, a, b, c): (N, A, B, C)) -> Self {
        Term::new(name).with_attr(a).with_attr(b).with_attr(c)
    }
}

/// Anything a query accepts: a single term or a list of OR-alternatives.
pub trait IntoTerms {
    fn into_terms(self) -> Vec<Term>;
}

impl IntoTerms for Term {
    fn into_terms(self) -> Vec<Term> {
        vec![self]
    }
}

impl IntoTerms for &str {
    fn into_terms(self) -> Vec<Term> {
        vec![self.into()]
    }
}

impl IntoTerms for String {
    fn into_terms(self) -> Vec<Term> {
        vec![self.into()]
    }
}

impl IntoTerms for Pred {
    fn into_terms(self) -> Vec<Term> {
        vec![self.into()]
    }
}

impl<N: Into<NameTerm>, A: Into<AttrTerm>> IntoTerms for (N, A) {
    fn into_terms(self) -> Vec<Term> {
        vec![self.into()]
    }
}

impl<N: Into<NameTerm>, A: Into<AttrTerm>, B: Into<AttrTerm>> IntoTerms for (N, A, B) {
    fn into_terms(self) -> Vec<Term> {
        vec![self.into()]
    }
}

impl<N: Into<NameTerm>, A: Into<AttrTerm>, B: Into<AttrTerm>, C: Into<AttrTerm>> IntoTerms
    for (N, A, B, C)
{
    fn into_terms(self) -> Vec<Term> {
        vec![self.into()]
    }
}

impl IntoTerms for Vec<Term> {
    fn into_terms(self) -> Vec<Term> {
        self
    }
}

impl<const N: usize> IntoTerms for [Term; N] {
    fn into_terms(self) -> Vec<Term> {
        self.into()
    }
}

/// Build a `Vec<Term>` of OR-alternatives from mixed term expressions.
///
/// ```
/// use conftree::{parse_str, terms};
///
/// let conf = parse_str("Alias /a\nScriptAlias /b\n", "t.conf").unwrap();
/// assert_eq!(conf.get(terms!["Alias", "ScriptAlias"]).len(), 2);
/// ```
#[macro_export]
macro_rules! terms {
    ($($t:expr),+ $(,)?) => {
        vec![$($crate::query::Term::from($t)),+]
    };
}

/// Traversal scope: immediate children only, or every descendant.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Depth {
    Shallow,
    Deep,
}

/// Which matches to keep: every matching node, or only the shallowest
/// matching ancestors (a match inside another match's subtree is dropped).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Keep {
    Leaves,
    Roots,
}

/// First/last disambiguation for single-node queries.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Pick {
    First,
    Last,
}

/// The select primitive: examine `starts` (and, when deep, their
/// descendants) in preorder document order, keeping nodes that match any
/// term.
#[instrument(level = "trace", skip(tree, starts))]
pub(crate) fn select_from(
    tree: &ConfTree,
    starts: &[Index],
    terms: &[Term],
    depth: Depth,
    keep: Keep,
) -> Vec<Index> {
    let mut matches = Vec::new();
    let mut stack: Vec<Index> = starts.iter().rev().copied().collect();

    while let Some(idx) = stack.pop() {
        if let Some(node) = tree.node(idx) {
            if terms.iter().any(|t| t.matches(node)) {
                matches.push(idx);
            }
            if depth == Depth::Deep {
                // Push children in reverse order for left-to-right traversal
                for &child in node.children.iter().rev() {
                    stack.push(child);
                }
            }
        }
    }

    match keep {
        Keep::Leaves => matches,
        Keep::Roots => {
            let matched: HashSet<Index> = matches.iter().copied().collect();
            matches
                .into_iter()
                .filter(|&idx| !has_matching_ancestor(tree, &matched, idx))
                .unique()
                .collect()
        }
    }
}

pub(crate) fn pick_from(
    tree: &ConfTree,
    starts: &[Index],
    terms: &[Term],
    depth: Depth,
    keep: Keep,
    pick: Pick,
) -> Option<Index> {
    let matches = select_from(tree, starts, terms, depth, keep);
    match pick {
        Pick::First => matches.first().copied(),
        Pick::Last => matches.last().copied(),
    }
}

fn has_matching_ancestor(tree: &ConfTree, matched: &HashSet<Index>, idx: Index) -> bool {
    let mut current = tree.node(idx).and_then(|n| n.parent);
    while let Some(parent_idx) = current {
        if matched.contains(&parent_idx) {
            return true;
        }
        current = tree.node(parent_idx).and_then(|n| n.parent);
    }
    false
}
