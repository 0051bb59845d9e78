//! Line-oriented parser for httpd/nginx-style configuration files.
//!
//! One collaborator per format feeds the primitive node model; this one
//! covers the angle-bracket section dialect:
//!
//! ```text
//! Listen 80
//! <Directory "/var/www">
//!     AllowOverride none \
//!                   authconfig
//! </Directory>
//! ```
//!
//! Directives become childless nodes, sections become nodes owning their
//! body, quoting groups attributes, a trailing backslash joins physical
//! lines, and `#` comments and blank lines are skipped. Provenance (`line`,
//! `pos`) points at the first physical line of each logical line.

use std::fs;
use std::mem;
use std::path::{Path, PathBuf};

use generational_arena::Index;
use tracing::{debug, instrument};

use crate::builder::{NodeData, TreeBuilder};
use crate::errors::{TreeError, TreeResult};
use crate::tree::ConfTree;

/// One continuation-joined source line.
#[derive(Debug)]
struct LogicalLine {
    text: String,
    pos: usize,
}

fn logical_lines(content: &str) -> Vec<LogicalLine> {
    let mut out = Vec::new();
    let mut pending: Option<LogicalLine> = None;

    for (i, raw) in content.lines().enumerate() {
        let trimmed = raw.trim_end();
        let continued = trimmed.ends_with('\\');
        let piece = if continued {
            trimmed[..trimmed.len() - 1].trim_end()
        } else {
            trimmed
        };

        match pending.take() {
            Some(mut line) => {
                line.text.push(' ');
                line.text.push_str(piece.trim_start());
                if continued {
                    pending = Some(line);
                } else {
                    out.push(line);
                }
            }
            None => {
                let line = LogicalLine {
                    text: piece.to_string(),
                    pos: i + 1,
                };
                if continued {
                    pending = Some(line);
                } else {
                    out.push(line);
                }
            }
        }
    }

    // A trailing backslash at EOF still yields its joined content.
    if let Some(line) = pending {
        out.push(line);
    }
    out
}

/// Split a line into whitespace-separated tokens, grouping quoted spans.
/// Quotes are stripped from the tokens; the raw `line` keeps them.
fn split_args(input: &str, path: &Path, pos: usize) -> TreeResult<Vec<String>> {
    let mut out = Vec::new();
    let mut current = String::new();
    let mut quoted = false;
    let mut quote: Option<char> = None;
    let mut chars = input.chars();

    while let Some(c) = chars.next() {
        match quote {
            Some(q) => {
                if c == q {
                    quote = None;
                } else if c == '\\' && q == '"' {
                    if let Some(escaped) = chars.next() {
                        current.push(escaped);
                    }
                } else {
                    current.push(c);
                }
            }
            None => {
                if c == '"' || c == '\'' {
                    quote = Some(c);
                    quoted = true;
                } else if c.is_whitespace() {
                    if quoted || !current.is_empty() {
                        out.push(mem::take(&mut current));
                    }
                    quoted = false;
                } else {
                    current.push(c);
                }
            }
        }
    }

    if quote.is_some() {
        return Err(TreeError::InvalidFormat {
            path: path.to_path_buf(),
            pos,
            reason: "unterminated quote".to_string(),
        });
    }
    if quoted || !current.is_empty() {
        out.push(current);
    }
    Ok(out)
}

/// Parse configuration text into a per-file tree.
#[instrument(level = "debug", skip_all)]
pub fn parse_str(content: &str, path: impl Into<PathBuf>) -> TreeResult<ConfTree> {
    let path = path.into();
    let mut builder = TreeBuilder::new();
    // Open sections: (node handle, tag name, opening position).
    let mut stack: Vec<(Index, String, usize)> = Vec::new();

    for line in logical_lines(content) {
        let text = line.text.trim();
        if text.is_empty() || text.starts_with('#') {
            continue;
        }

        if let Some(rest) = text.strip_prefix("</") {
            let name = rest
                .strip_suffix('>')
                .ok_or_else(|| TreeError::InvalidFormat {
                    path: path.clone(),
                    pos: line.pos,
                    reason: "missing '>' in closing tag".to_string(),
                })?
                .trim();
            match stack.pop() {
                // Closing tags match the open section case-insensitively,
                // the httpd convention; the stored name keeps its case.
                Some((_, open_name, _)) if open_name.eq_ignore_ascii_case(name) => {}
                _ => {
                    return Err(TreeError::UnexpectedClose {
                        path,
                        name: name.to_string(),
                        pos: line.pos,
                    });
                }
            }
        } else if let Some(rest) = text.strip_prefix('<') {
            let inner = rest
                .strip_suffix('>')
                .ok_or_else(|| TreeError::InvalidFormat {
                    path: path.clone(),
                    pos: line.pos,
                    reason: "missing '>' in section tag".to_string(),
                })?;
            let mut parts = split_args(inner, &path, line.pos)?;
            if parts.is_empty() {
                return Err(TreeError::InvalidFormat {
                    path,
                    pos: line.pos,
                    reason: "empty section tag".to_string(),
                });
            }
            let name = parts.remove(0);
            let parent = stack.last().map(|(idx, _, _)| *idx);
            let idx = builder.add_node(
                NodeData {
                    name: name.clone(),
                    attrs: parts,
                    file_path: path.clone(),
                    line: line.text.clone(),
                    pos: line.pos,
                },
                parent,
            )?;
            stack.push((idx, name, line.pos));
        } else {
            let mut parts = split_args(text, &path, line.pos)?;
            if parts.is_empty() {
                continue;
            }
            let name = parts.remove(0);
            let parent = stack.last().map(|(idx, _, _)| *idx);
            builder.add_node(
                NodeData {
                    name,
                    attrs: parts,
                    file_path: path.clone(),
                    line: line.text.clone(),
                    pos: line.pos,
                },
                parent,
            )?;
        }
    }

    if let Some((_, name, pos)) = stack.pop() {
        return Err(TreeError::UnbalancedSection { path, name, pos });
    }

    let tree = builder.build();
    debug!(nodes = tree.len(), "parsed configuration");
    Ok(tree)
}

/// Read and parse one file.
pub fn parse_file(path: impl AsRef<Path>) -> TreeResult<ConfTree> {
    let path = path.as_ref();
    let content = fs::read_to_string(path).map_err(|e| match e.kind() {
        std::io::ErrorKind::NotFound => TreeError::FileNotFound(path.to_path_buf()),
        _ => TreeError::FileReadError(e),
    })?;
    parse_str(&content, path)
}
