//! XPath value types and errors.

use sift_dom::NodeId;

/// Result alias for query parsing and evaluation
pub type XPathResult<T> = Result<T, XPathError>;

/// Query errors
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum XPathError {
    #[error("empty query")]
    Empty,

    #[error("invalid query: {0}")]
    Parse(String),

    #[error("query failed: {0}")]
    Execution(String),

    #[error("namespace prefix '{0}' is not bound")]
    UnboundPrefix(String),

    #[error("context node {0:?} is not part of the tree")]
    UnknownContext(NodeId),

    #[error("expression does not evaluate to a node-set")]
    NotANodeSet,

    #[error("evaluator built for generation {built} used on generation {current}")]
    Stale { built: u64, current: u64 },
}

/// Result of evaluating an expression
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    /// Nodes in document order, without duplicates
    NodeSet(Vec<NodeId>),
    /// String values of selected attributes, in document order
    Attributes(Vec<String>),
    Boolean(bool),
    Number(f64),
    String(String),
}

impl Value {
    /// Boolean conversion (`boolean()`)
    pub fn to_bool(&self) -> bool {
        match self {
            Value::NodeSet(nodes) => !nodes.is_empty(),
            Value::Attributes(values) => !values.is_empty(),
            Value::Boolean(b) => *b,
            Value::Number(n) => *n != 0.0 && !n.is_nan(),
            Value::String(s) => !s.is_empty(),
        }
    }

    /// Take the node-set, failing for any other kind of value
    pub fn into_nodes(self) -> XPathResult<Vec<NodeId>> {
        match self {
            Value::NodeSet(nodes) => Ok(nodes),
            _ => Err(XPathError::NotANodeSet),
        }
    }
}
