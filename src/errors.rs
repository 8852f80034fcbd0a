use thiserror::Error;

use crate::node::NodeId;

#[derive(Error, Debug)]
pub enum TreeError {
    #[error("node not found: {0}")]
    NodeNotFound(NodeId),

    #[error("node {child} rejected parent {parent}: {reason}")]
    ConstraintViolation {
        child: NodeId,
        parent: NodeId,
        reason: String,
    },

    #[error("node {node} cannot be inserted under {parent}: it would become its own ancestor")]
    HierarchyViolation { node: NodeId, parent: NodeId },

    #[error("config error: {message}")]
    Config { message: String },
}

pub type TreeResult<T> = Result<T, TreeError>;
