//! sift XPath - query language over the arena DOM
//!
//! XPath 1.0 as implemented by sxd_xpath, run against a [`DomTree`].
//! Each evaluation mirrors the tree into an sxd document and maps the
//! result back to [`NodeId`]s. Attributes are not arena nodes; a node-set
//! of attributes comes back as their values.
//!
//! # Submodules
//!
//! - [`types`]: values and errors.
//! - [`eval`]: evaluator bound to a tree generation.

pub mod eval;
mod mirror;
pub mod types;

pub use eval::Evaluator;
pub use types::{Value, XPathError, XPathResult};

use sift_dom::{DomTree, NodeId};

/// Evaluate `expression` once against `tree`, resolving prefixes declared
/// in the markup.
pub fn evaluate(tree: &DomTree, context: Option<NodeId>, expression: &str) -> XPathResult<Value> {
    Evaluator::new(tree).evaluate(tree, expression, context, true)
}
