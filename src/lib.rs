//! Generic arena-backed trees.
//!
//! * [`Tree`] owns nodes in a generational arena; parents list children by
//!   [`NodeId`] and children point back with a non-owning handle.
//! * [`HierarchyBuilder`] turns flat records carrying a primary key and a
//!   parent key into one or more trees.
//! * [`NodeRef`] and [`NodeQuery`] walk and search a tree lazily.
//! * [`PlainNode`] mirrors a tree without parent links for serde formats.
//!
//! ```
//! use hierarchy::{build_hierarchy, NodeQuery};
//!
//! type Row = (i32, Option<i32>, &'static str);
//!
//! let rows: Vec<Row> = vec![(1, None, "root"), (2, Some(1), "child"), (3, Some(2), "grandchild")];
//! let tree = build_hierarchy(rows, |r: &Row| Some(r.0), |r: &Row| r.1).unwrap();
//! let root = tree.root_node().unwrap();
//! assert_eq!(root.data().2, "root");
//! assert!(root.descendants_any(|n| n.data().2 == "grandchild"));
//! ```
//!
//! The library never installs a `tracing` subscriber; spans and events are
//! emitted for the embedding application to collect.

pub mod arena;
pub mod builder;
pub mod config;
pub mod errors;
pub mod node;
pub mod plain;
pub mod query;
pub mod render;
pub mod util;

pub use arena::{Ancestors, NodeId, PostOrderIterator, Tree, TreeIterator, TreeNode};
pub use builder::{build_hierarchies, build_hierarchy, Hierarchies, HierarchyBuilder, HierarchyKey};
pub use config::{BuilderSettings, RenderSettings, Settings};
pub use errors::{TreeError, TreeResult};
pub use node::NodeRef;
pub use plain::PlainNode;
pub use query::NodeQuery;
pub use render::TreeDisplay;
