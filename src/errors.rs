use thiserror::Error;

use crate::arena::NodeId;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TreeError {
    #[error("Node not found in tree: {0}")]
    NodeNotFound(NodeId),

    #[error("Node {child} is already attached to parent {parent}")]
    AlreadyAttached { child: NodeId, parent: NodeId },

    #[error("Attaching {child} under {parent} would create a cycle")]
    CycleDetected { parent: NodeId, child: NodeId },

    #[error("A root node was not found in the collection")]
    NoRootFound,

    #[error("More than one root node was found in the collection ({0} candidates), use build_hierarchies for multiple roots")]
    MultipleRootsFound(usize),

    #[error("Primary key {key} repeats along a single branch, hierarchy would be infinite")]
    KeyCycle { key: String },

    #[error("Hierarchy exceeds the configured maximum depth of {max_depth}")]
    DepthLimitExceeded { max_depth: usize },

    #[error("Invalid configuration: {0}")]
    Config(String),
}

pub type TreeResult<T> = Result<T, TreeError>;
