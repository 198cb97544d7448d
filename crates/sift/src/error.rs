//! Error types for the document, table and row layers

use sift_dom::{DomError, NodeId};
use sift_html::ParseError;
use sift_xpath::XPathError;

/// Result alias used throughout the crate
pub type SiftResult<T> = Result<T, SiftError>;

/// Errors raised by sift
#[derive(Debug, thiserror::Error)]
pub enum SiftError {
    #[error(transparent)]
    Dom(#[from] DomError),

    #[error("load failed: {0}")]
    Parse(#[from] ParseError),

    #[error("query '{query}' produced no evaluator: {source}")]
    NoEvaluator {
        query: String,
        #[source]
        source: XPathError,
    },

    #[error(transparent)]
    XPath(#[from] XPathError),

    #[error("'{0}' is not a valid node name")]
    TypeMismatch(String),

    #[error("insertion mode '{0}' is not one of before, after, inside")]
    InvalidInsertionMode(String),

    #[error("node {0} has no parent to insert next to")]
    Detached(NodeId),

    #[error("the provided node must be a \"table\" element, \"{0}\" given")]
    NotATable(String),

    #[error("row nodes must be \"tr\" elements, \"{0}\" given")]
    NotARow(String),

    #[error("the query '{0}' did not resolve to any node")]
    NoMatch(String),

    #[error("no headers have been loaded yet")]
    NoHeaders,

    #[error("header value \"{expected}\" does not match \"{actual}\"")]
    HeaderMismatch { expected: String, actual: String },

    #[error("header pattern \"{pattern}\" does not match \"{actual}\"")]
    HeaderPatternMismatch { pattern: String, actual: String },

    #[error("column \"offset\" is missing from the descriptor at index {index}")]
    MissingOffset { index: usize },

    #[error("column at index {index} must have either a \"value\" or a \"pattern\", both are missing")]
    MissingExpectation { index: usize },

    #[error("invalid header pattern: {0}")]
    InvalidPattern(#[from] regex::Error),
}
