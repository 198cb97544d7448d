//! Expression evaluator.
//!
//! An [`Evaluator`] is bound to one generation of one tree and carries the
//! namespace bindings registered on it. Using it after the tree changed
//! fails with [`XPathError::Stale`]; call [`Evaluator::regenerate`] first.
//!
//! Parsing and evaluation are done by sxd_xpath over a mirror of the tree
//! (see [`crate::mirror`]).

use std::collections::HashMap;

use sift_dom::{DomTree, NodeId};
use sxd_document::Package;
use sxd_xpath::{Context, Factory};

use crate::mirror::Mirror;
use crate::types::{Value, XPathError, XPathResult};

const XML_NS: &str = "http://www.w3.org/XML/1998/namespace";

/// Query evaluator linked to a tree
#[derive(Debug, Clone)]
pub struct Evaluator {
    generation: u64,
    namespaces: HashMap<String, String>,
}

impl Evaluator {
    /// Build an evaluator for the current state of `tree`
    pub fn new(tree: &DomTree) -> Self {
        Self {
            generation: tree.generation(),
            namespaces: HashMap::new(),
        }
    }

    /// Rebind to the current state of `tree`, keeping namespace bindings
    pub fn regenerate(&mut self, tree: &DomTree) {
        tracing::debug!(
            "Regenerating evaluator: generation {} -> {}",
            self.generation,
            tree.generation()
        );
        self.generation = tree.generation();
    }

    /// Tree generation this evaluator was built for
    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Whether `tree` changed since this evaluator was built
    pub fn is_stale(&self, tree: &DomTree) -> bool {
        self.generation != tree.generation()
    }

    /// Bind a namespace prefix for prefixed name tests
    pub fn register_namespace(&mut self, prefix: &str, uri: &str) {
        self.namespaces.insert(prefix.to_string(), uri.to_string());
    }

    /// URI bound to `prefix` by [`Evaluator::register_namespace`]
    pub fn namespace(&self, prefix: &str) -> Option<&str> {
        self.namespaces.get(prefix).map(String::as_str)
    }

    /// Parse and evaluate `expression`. Without a context node the query
    /// runs against the document node. With `register_ns`, prefixes
    /// declared in scope at the context node resolve too.
    pub fn evaluate(
        &self,
        tree: &DomTree,
        expression: &str,
        context: Option<NodeId>,
        register_ns: bool,
    ) -> XPathResult<Value> {
        if self.is_stale(tree) {
            return Err(XPathError::Stale {
                built: self.generation,
                current: tree.generation(),
            });
        }
        if expression.trim().is_empty() {
            return Err(XPathError::Empty);
        }
        let xpath = Factory::new()
            .build(expression)
            .map_err(|err| XPathError::Parse(err.to_string()))?
            .ok_or(XPathError::Empty)?;

        let node = context.unwrap_or_else(|| tree.root());
        if tree.get(node).is_none() {
            return Err(XPathError::UnknownContext(node));
        }
        let scope = if node == tree.root() {
            tree.document_element().unwrap_or(node)
        } else {
            node
        };

        let package = Package::new();
        let mut bindings = Context::new();
        for prefix in prefixes(expression) {
            let uri = self.resolve_prefix(tree, scope, prefix, register_ns)?;
            bindings.set_namespace(prefix, uri);
        }

        let mirror = Mirror::build(tree, package.as_document(), node);
        let start = mirror.context().ok_or(XPathError::UnknownContext(node))?;
        let value = xpath
            .evaluate(&bindings, start)
            .map_err(|err| XPathError::Execution(err.to_string()))?;
        Ok(mirror.value(value))
    }

    /// Evaluate `expression`, requiring a node-set
    pub fn select(
        &self,
        tree: &DomTree,
        expression: &str,
        context: Option<NodeId>,
        register_ns: bool,
    ) -> XPathResult<Vec<NodeId>> {
        let nodes = self.evaluate(tree, expression, context, register_ns)?.into_nodes()?;
        tracing::trace!("Query '{}' matched {} node(s)", expression, nodes.len());
        Ok(nodes)
    }

    fn resolve_prefix<'a>(
        &'a self,
        tree: &'a DomTree,
        scope: NodeId,
        prefix: &str,
        register_ns: bool,
    ) -> XPathResult<&'a str> {
        if let Some(uri) = self.namespace(prefix) {
            return Ok(uri);
        }
        if register_ns && let Some(uri) = tree.lookup_namespace_uri(scope, prefix) {
            return Ok(uri);
        }
        if prefix == "xml" {
            return Ok(XML_NS);
        }
        Err(XPathError::UnboundPrefix(prefix.to_string()))
    }
}

/// Namespace prefixes used by qualified names in `expression`, in order of
/// first use. String literals and `axis::` separators are skipped.
fn prefixes(expression: &str) -> Vec<&str> {
    let bytes = expression.as_bytes();
    let mut found: Vec<&str> = Vec::new();
    let mut i = 0;
    while i < bytes.len() {
        let b = bytes[i];
        if b == b'"' || b == b'\'' {
            i = expression[i + 1..]
                .find(b as char)
                .map_or(bytes.len(), |end| i + end + 2);
            continue;
        }
        if !is_name_start(b) {
            i += 1;
            continue;
        }
        let start = i;
        while i < bytes.len() && is_name_char(bytes[i]) {
            i += 1;
        }
        let qualified = bytes.get(i) == Some(&b':')
            && bytes
                .get(i + 1)
                .is_some_and(|&next| next == b'*' || is_name_start(next));
        if qualified {
            let prefix = &expression[start..i];
            if !found.contains(&prefix) {
                found.push(prefix);
            }
            i += 1;
        }
    }
    found
}

fn is_name_start(b: u8) -> bool {
    b.is_ascii_alphabetic() || b == b'_' || !b.is_ascii()
}

fn is_name_char(b: u8) -> bool {
    is_name_start(b) || b.is_ascii_digit() || b == b'-' || b == b'.'
}
