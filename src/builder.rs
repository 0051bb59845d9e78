//! Append-only construction of [`ConfTree`].
//!
//! Parsing and combining collaborators feed primitive nodes through
//! [`TreeBuilder::add_node`]; a node's parent must already exist, so the
//! finished tree is always a forest with correctly wired `parent`/`root`
//! back-references and no way to form a cycle.

use generational_arena::{Arena, Index};
use std::path::PathBuf;
use tracing::instrument;

use crate::errors::{TreeError, TreeResult};
use crate::tree::{ConfTree, Node};

/// Primitive node payload handed over by a parser.
#[derive(Debug, Clone)]
pub struct NodeData {
    /// Directive or section keyword, case preserved from the source format.
    pub name: String,
    /// Raw attribute lexemes trailing the name.
    pub attrs: Vec<String>,
    /// Absolute path of the originating file.
    pub file_path: PathBuf,
    /// Raw (possibly continuation-joined) source line.
    pub line: String,
    /// 1-based line number within `file_path`.
    pub pos: usize,
}

/// Builds a [`ConfTree`] one node at a time, in document order.
#[derive(Debug, Default)]
pub struct TreeBuilder {
    arena: Arena<Node>,
    roots: Vec<Index>,
}

impl TreeBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a node under `parent`, or as a new top-level node when
    /// `parent` is `None`. Children end up in insertion order.
    #[instrument(level = "trace", skip(self))]
    pub fn add_node(&mut self, data: NodeData, parent: Option<Index>) -> TreeResult<Index> {
        let root = match parent {
            Some(parent_idx) => {
                let parent_node = self
                    .arena
                    .get(parent_idx)
                    .ok_or_else(|| TreeError::InvalidParent(data.name.clone()))?;
                Some(parent_node.root.unwrap_or(parent_idx))
            }
            None => None,
        };

        let idx = self.arena.insert(Node {
            name: data.name,
            attrs: data.attrs,
            children: Vec::new(),
            parent,
            root,
            file_path: data.file_path,
            line: data.line,
            pos: data.pos,
        });

        if let Some(parent_idx) = parent {
            if let Some(parent_node) = self.arena.get_mut(parent_idx) {
                parent_node.children.push(idx);
            }
        } else {
            self.roots.push(idx);
        }

        Ok(idx)
    }

    /// Freeze into an immutable, queryable tree.
    pub fn build(self) -> ConfTree {
        ConfTree {
            arena: self.arena,
            roots: self.roots,
        }
    }
}
