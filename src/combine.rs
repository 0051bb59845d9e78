//! Include expansion: stitching a primary file and its supplements into one
//! consolidated tree.
//!
//! Include directives are replaced in place by the top-level nodes of the
//! files they name, recursively, so the finished tree reads as if the
//! sources had been one file. Targets resolve relative to the including
//! file; a directory includes every file in it sorted by name, and a
//! basename glob (`*`, `?`) includes every matching file sorted by name.

use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};

use generational_arena::Index;
use regex::Regex;
use tracing::{debug, instrument};
use walkdir::WalkDir;

use crate::builder::{NodeData, TreeBuilder};
use crate::errors::{TreeError, TreeResult};
use crate::parse;
use crate::result::NodeRef;
use crate::tree::ConfTree;

#[derive(Debug, Clone)]
struct IncludeKeyword {
    name: String,
    /// Optional includes expand to nothing when no file matches.
    optional: bool,
}

/// Expands include directives across files into one [`ConfTree`].
#[derive(Debug, Clone)]
pub struct Combiner {
    keywords: Vec<IncludeKeyword>,
}

impl Default for Combiner {
    fn default() -> Self {
        Self::new()
    }
}

impl Combiner {
    /// Combiner for the httpd dialect: `Include` (required) and
    /// `IncludeOptional`.
    pub fn new() -> Self {
        Self { keywords: Vec::new() }
            .with_keyword("Include", false)
            .with_keyword("IncludeOptional", true)
    }

    /// Replace the keyword set entirely, e.g. nginx's single `include`.
    pub fn with_only_keyword(name: impl Into<String>, optional: bool) -> Self {
        Self { keywords: Vec::new() }.with_keyword(name, optional)
    }

    /// Add an include keyword, matched case-insensitively against
    /// directive names.
    pub fn with_keyword(mut self, name: impl Into<String>, optional: bool) -> Self {
        self.keywords.push(IncludeKeyword {
            name: name.into(),
            optional,
        });
        self
    }

    /// Parse `primary` and every file it transitively includes into one
    /// consolidated tree, in inclusion order.
    #[instrument(level = "debug", skip(self))]
    pub fn combine_file(&self, primary: impl AsRef<Path> + std::fmt::Debug) -> TreeResult<ConfTree> {
        let primary = primary.as_ref();
        let canonical = primary
            .canonicalize()
            .map_err(|_| TreeError::FileNotFound(primary.to_path_buf()))?;

        let mut builder = TreeBuilder::new();
        let mut in_progress = HashSet::new();
        self.expand_file(&canonical, None, &mut builder, &mut in_progress)?;

        let tree = builder.build();
        debug!(nodes = tree.len(), "combined configuration");
        Ok(tree)
    }

    fn include_keyword(&self, name: &str) -> Option<&IncludeKeyword> {
        self.keywords
            .iter()
            .find(|k| k.name.eq_ignore_ascii_case(name))
    }

    fn expand_file(
        &self,
        path: &Path,
        parent: Option<Index>,
        builder: &mut TreeBuilder,
        in_progress: &mut HashSet<PathBuf>,
    ) -> TreeResult<()> {
        // `in_progress` holds the current include chain only, so a file
        // included twice from disjoint places is legal while A -> B -> A
        // is reported as a cycle.
        if !in_progress.insert(path.to_path_buf()) {
            return Err(TreeError::CycleDetected(path.to_path_buf()));
        }

        let file_tree = parse::parse_file(path)?;
        let base_dir = path.parent().unwrap_or_else(|| Path::new("."));
        for top in file_tree.children().iter() {
            self.copy_node(top, parent, base_dir, builder, in_progress)?;
        }

        in_progress.remove(path);
        Ok(())
    }

    fn copy_node(
        &self,
        src: NodeRef<'_>,
        parent: Option<Index>,
        base_dir: &Path,
        builder: &mut TreeBuilder,
        in_progress: &mut HashSet<PathBuf>,
    ) -> TreeResult<()> {
        if src.is_directive() {
            if let Some(keyword) = self.include_keyword(src.name()) {
                let target = src.raw_attrs().first().ok_or_else(|| TreeError::InvalidFormat {
                    path: src.file_path().to_path_buf(),
                    pos: src.pos(),
                    reason: "include directive without a target".to_string(),
                })?;
                return self.expand_include(
                    base_dir,
                    target,
                    keyword.optional,
                    parent,
                    builder,
                    in_progress,
                );
            }
        }

        let idx = builder.add_node(
            NodeData {
                name: src.name().to_string(),
                attrs: src.raw_attrs().to_vec(),
                file_path: src.file_path().to_path_buf(),
                line: src.line().to_string(),
                pos: src.pos(),
            },
            parent,
        )?;
        for child in src.children().iter() {
            self.copy_node(child, Some(idx), base_dir, builder, in_progress)?;
        }
        Ok(())
    }

    fn expand_include(
        &self,
        base_dir: &Path,
        target: &str,
        optional: bool,
        parent: Option<Index>,
        builder: &mut TreeBuilder,
        in_progress: &mut HashSet<PathBuf>,
    ) -> TreeResult<()> {
        let files = resolve_target(base_dir, target)?;
        if files.is_empty() {
            if optional {
                debug!(target, "optional include matched nothing");
                return Ok(());
            }
            return Err(TreeError::FileNotFound(base_dir.join(target)));
        }

        for file in files {
            let canonical = file
                .canonicalize()
                .map_err(|_| TreeError::FileNotFound(file.clone()))?;
            self.expand_file(&canonical, parent, builder, in_progress)?;
        }
        Ok(())
    }
}

/// Resolve an include target to the ordered list of files it names.
fn resolve_target(base_dir: &Path, target: &str) -> TreeResult<Vec<PathBuf>> {
    let target_path = if Path::new(target).is_absolute() {
        PathBuf::from(target)
    } else {
        base_dir.join(target)
    };

    if target_path.is_dir() {
        let mut files = Vec::new();
        for entry in fs::read_dir(&target_path)? {
            let entry = entry?;
            if entry.file_type()?.is_file() {
                files.push(entry.path());
            }
        }
        files.sort();
        return Ok(files);
    }

    if target_path.is_file() {
        return Ok(vec![target_path]);
    }

    let basename = target_path
        .file_name()
        .and_then(|s| s.to_str())
        .unwrap_or_default();
    if basename.contains('*') || basename.contains('?') {
        let dir = target_path.parent().unwrap_or(base_dir);
        let pattern = glob_to_regex(basename)?;
        let mut files: Vec<PathBuf> = WalkDir::new(dir)
            .min_depth(1)
            .max_depth(1)
            .into_iter()
            .filter_map(Result::ok)
            .filter(|e| e.file_type().is_file())
            .filter(|e| {
                e.file_name()
                    .to_str()
                    .map(|n| pattern.is_match(n))
                    .unwrap_or(false)
            })
            .map(|e| e.into_path())
            .collect();
        files.sort();
        return Ok(files);
    }

    Ok(Vec::new())
}

/// Translate a basename glob (`*`, `?`) into an anchored regex.
fn glob_to_regex(glob: &str) -> TreeResult<Regex> {
    let mut pattern = String::from("^");
    for c in glob.chars() {
        match c {
            '*' => pattern.push_str(".*"),
            '?' => pattern.push('.'),
            _ => pattern.push_str(&regex::escape(&c.to_string())),
        }
    }
    pattern.push('$');
    Regex::new(&pattern).map_err(|e| TreeError::InternalError(e.to_string()))
}
