//! Materialized query results
//!
//! A [`NodeList`] evaluates its query once, on construction, and keeps the
//! matched node ids. It is read-only except for [`NodeList::remove`], which
//! detaches the matches from the tree and then re-runs the query.

use sift_dom::NodeId;

use crate::document::Document;
use crate::error::{SiftError, SiftResult};

/// Ordered, indexable result of a query
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NodeList {
    query: String,
    context: Option<NodeId>,
    register_ns: bool,
    nodes: Vec<NodeId>,
}

impl NodeList {
    pub(crate) fn new(
        doc: &Document,
        query: &str,
        context: Option<NodeId>,
        register_ns: bool,
    ) -> SiftResult<Self> {
        let mut list = Self {
            query: query.to_string(),
            context,
            register_ns,
            nodes: Vec::new(),
        };
        list.generate(doc)?;
        Ok(list)
    }

    fn generate(&mut self, doc: &Document) -> SiftResult<()> {
        self.nodes = doc
            .select(&self.query, self.context, self.register_ns)
            .map_err(|source| SiftError::NoEvaluator {
                query: self.query.clone(),
                source,
            })?;
        Ok(())
    }

    /// The query this list was built from
    pub fn query(&self) -> &str {
        &self.query
    }

    pub fn context(&self) -> Option<NodeId> {
        self.context
    }

    /// Node at `index`, None past the end
    pub fn get(&self, index: usize) -> Option<NodeId> {
        self.nodes.get(index).copied()
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Number of matched nodes
    pub fn count(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn as_slice(&self) -> &[NodeId] {
        &self.nodes
    }

    pub fn iter(&self) -> impl Iterator<Item = NodeId> + '_ {
        self.nodes.iter().copied()
    }

    /// Remove every match from the tree. With `sub_query`, remove instead
    /// everything that query matches beneath each match. The list is
    /// re-evaluated afterwards.
    pub fn remove(&mut self, doc: &mut Document, sub_query: Option<&str>) -> SiftResult<&mut Self> {
        for node in self.nodes.clone() {
            match sub_query {
                None => doc.tree_mut().detach(node)?,
                Some(query) => {
                    let mut inner = doc.query_with(query, Some(node), self.register_ns)?;
                    inner.remove(doc, None)?;
                }
            }
        }
        self.generate(doc)?;
        tracing::debug!("Removal left {} match(es) for '{}'", self.nodes.len(), self.query);
        Ok(self)
    }
}

impl<'a> IntoIterator for &'a NodeList {
    type Item = NodeId;
    type IntoIter = std::iter::Copied<std::slice::Iter<'a, NodeId>>;

    fn into_iter(self) -> Self::IntoIter {
        self.nodes.iter().copied()
    }
}
