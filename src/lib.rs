//! Uniform tree model and composable query engine for heterogeneous
//! configuration files.
//!
//! Per-format parsers normalize configuration text into one primitive tree
//! of named nodes with attributes and provenance; the [`Combiner`] stitches
//! a primary file and its includes into a single consolidated [`ConfTree`];
//! and one query language navigates the result regardless of the source
//! format. The tree is built once and read-only afterwards, so any number
//! of threads can query it concurrently.
//!
//! ```
//! use conftree::parse_str;
//!
//! let conf = parse_str(
//!     r#"
//! Listen 80
//! <Directory />
//!     AllowOverride none
//! </Directory>
//! "#,
//!     "httpd.conf",
//! )
//! .unwrap();
//!
//! let dirs = conf.get(("Directory", "/"));
//! assert_eq!(dirs.len(), 1);
//! assert_eq!(dirs.get("AllowOverride").value().unwrap(), "none");
//!
//! assert_eq!(conf.find("AllowOverride").unwrap().pos(), 4);
//! ```
//!
//! Predicates compose with `!`, `&`, and `|` and work in both name and
//! attribute position:
//!
//! ```
//! use conftree::{parse_str, startswith, le, Depth, Keep};
//!
//! let conf = parse_str("Listen 80\nListen 8443\nTimeout 300\n", "t.conf").unwrap();
//! let cheap_ports = conf.select((startswith("Listen"), le(8080)), Depth::Shallow, Keep::Leaves);
//! assert_eq!(cheap_ports.len(), 1);
//! ```

pub mod builder;
pub mod combine;
pub mod errors;
pub mod parse;
pub mod predicate;
pub mod query;
pub mod result;
pub mod tree;
pub mod util;
pub mod value;

pub use builder::{NodeData, TreeBuilder};
pub use combine::Combiner;
pub use errors::{TreeError, TreeResult};
pub use parse::{parse_file, parse_str};
pub use predicate::{contains, endswith, eq, ge, gt, le, lt, startswith, Pred};
pub use query::{AttrTerm, Depth, IntoTerms, Keep, NameTerm, Pick, Term};
pub use result::{NodeRef, NodeValue, ResultSet};
pub use tree::{ConfTree, TreeNodeConvert};
pub use value::Value;
