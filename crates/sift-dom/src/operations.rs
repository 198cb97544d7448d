//! DOM Node Operations - error types
//!
//! appendChild, removeChild, insertBefore and cloneNode live on `DomTree`;
//! this module holds what they can fail with.

use crate::NodeId;

/// Result type for DOM operations
pub type DomResult<T> = Result<T, DomError>;

/// DOM operation errors
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DomError {
    /// Node not found
    #[error("node {0} not found")]
    NotFound(NodeId),
    /// Hierarchy error (e.g., inserting an ancestor into its descendant)
    #[error("hierarchy request error: {0}")]
    HierarchyRequest(&'static str),
    /// Node is not an element
    #[error("node {0} is not an element")]
    NotAnElement(NodeId),
    /// Node is not a child of the given parent
    #[error("node {child} is not a child of {parent}")]
    NotAChild { parent: NodeId, child: NodeId },
}
