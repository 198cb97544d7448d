//! Arena tree mirrored into an sxd document.
//!
//! sxd_xpath only walks its own DOM, so every evaluation copies the
//! relevant part of the [`DomTree`] into an sxd [`Document`] and keeps a
//! map back from each mirrored node to its [`NodeId`].
//!
//! Naming follows what a query author expects from the markup:
//!
//! - prefixed elements keep their namespace, so `m:item` needs `m` bound;
//! - unprefixed elements keep their namespace too, except for the XHTML,
//!   SVG and MathML namespaces the HTML parser assigns on its own, so
//!   `//p` matches in parsed HTML;
//! - `xmlns` attributes become prefix declarations, not attributes.

use std::collections::HashMap;

use sift_dom::{DomTree, ElementData, NodeData, NodeId};
use sxd_document::QName;
use sxd_document::dom::{self, ChildOfElement, ChildOfRoot, Document};
use sxd_xpath::nodeset::Node;

use crate::types::Value;

/// Namespaces left off unprefixed elements
const IMPLIED_NS: [&str; 3] = [
    "http://www.w3.org/1999/xhtml",
    "http://www.w3.org/2000/svg",
    "http://www.w3.org/1998/Math/MathML",
];

/// Where a mirrored child gets appended
#[derive(Clone, Copy)]
enum Parent<'d> {
    Root(dom::Root<'d>),
    Element(dom::Element<'d>),
}

impl<'d> Parent<'d> {
    fn append<C>(self, child: C)
    where
        C: Into<ChildOfRoot<'d>> + Into<ChildOfElement<'d>>,
    {
        match self {
            Parent::Root(root) => root.append_child(child),
            Parent::Element(element) => element.append_child(child),
        }
    }
}

/// sxd copy of a tree, plus the way back to arena ids
pub(crate) struct Mirror<'d> {
    doc: Document<'d>,
    ids: HashMap<Node<'d>, NodeId>,
    target: NodeId,
    context: Option<Node<'d>>,
}

impl<'d> Mirror<'d> {
    /// Mirror the tree holding `context` into `doc`. Attached nodes bring
    /// the whole document along; a detached subtree is copied alone and
    /// hangs from a document node of its own.
    pub(crate) fn build(tree: &DomTree, doc: Document<'d>, context: NodeId) -> Self {
        let mut mirror = Self {
            doc,
            ids: HashMap::new(),
            target: context,
            context: None,
        };
        let root = Parent::Root(doc.root());
        let top = tree.ancestors(context).last().unwrap_or(context);

        if top == NodeId::ROOT {
            let node = Node::Root(doc.root());
            mirror.ids.insert(node, NodeId::ROOT);
            if context == NodeId::ROOT {
                mirror.context = Some(node);
            }
            for (child, _) in tree.children(NodeId::ROOT) {
                mirror.attach(tree, root, child);
            }
        } else {
            tracing::trace!("Mirroring detached subtree {:?}", top);
            mirror.attach(tree, root, top);
        }
        mirror
    }

    /// Mirrored counterpart of the requested context node
    pub(crate) fn context(&self) -> Option<Node<'d>> {
        self.context
    }

    fn attach(&mut self, tree: &DomTree, parent: Parent<'d>, id: NodeId) {
        let Some(node) = tree.get(id) else {
            return;
        };
        let mirrored: Node<'d> = match &node.data {
            NodeData::Element(data) => {
                let element = self.element(tree, data);
                parent.append(element);
                for (child, _) in tree.children(id) {
                    self.attach(tree, Parent::Element(element), child);
                }
                element.into()
            }
            NodeData::Text(text) => {
                // the document node cannot hold text
                let Parent::Element(element) = parent else {
                    return;
                };
                let text = self.doc.create_text(&text.content);
                element.append_child(text);
                text.into()
            }
            NodeData::Comment(content) => {
                let comment = self.doc.create_comment(content);
                parent.append(comment);
                comment.into()
            }
            NodeData::ProcessingInstruction { target, data } => {
                let value = (!data.is_empty()).then_some(data.as_str());
                let pi = self
                    .doc
                    .create_processing_instruction(tree.resolve(*target), value);
                parent.append(pi);
                pi.into()
            }
            NodeData::Document | NodeData::Doctype { .. } => return,
        };
        if id == self.target {
            self.context = Some(mirrored);
        }
        self.ids.insert(mirrored, id);
    }

    fn element(&self, tree: &DomTree, data: &ElementData) -> dom::Element<'d> {
        let local = tree.resolve(data.name.local);
        let ns = tree.resolve(data.name.ns);
        let prefix = data.name.prefix.map(|p| tree.resolve(p));

        let keep_ns = !ns.is_empty() && (prefix.is_some() || !IMPLIED_NS.contains(&ns));
        let element = if keep_ns {
            self.doc
                .create_element(QName::with_namespace_uri(Some(ns), local))
        } else {
            self.doc.create_element(local)
        };
        if keep_ns && let Some(prefix) = prefix {
            element.register_prefix(prefix, ns);
            element.set_preferred_prefix(Some(prefix));
        }

        for attr in &data.attrs {
            let name = tree.resolve(attr.name.local);
            match attr.name.prefix.map(|p| tree.resolve(p)) {
                Some("xmlns") => {
                    element.register_prefix(name, &attr.value);
                    continue;
                }
                None if name == "xmlns" || name.starts_with("xmlns:") => continue,
                _ => {}
            }
            let attr_ns = tree.resolve(attr.name.ns);
            if attr_ns.is_empty() {
                element.set_attribute_value(name, &attr.value);
            } else {
                element.set_attribute_value(
                    QName::with_namespace_uri(Some(attr_ns), name),
                    &attr.value,
                );
            }
        }
        element
    }

    /// Translate an sxd result back to arena terms. Node-sets holding
    /// attributes (or namespace nodes) come back as their string values.
    pub(crate) fn value(&self, value: sxd_xpath::Value<'d>) -> Value {
        match value {
            sxd_xpath::Value::Boolean(b) => Value::Boolean(b),
            sxd_xpath::Value::Number(n) => Value::Number(n),
            sxd_xpath::Value::String(s) => Value::String(s),
            sxd_xpath::Value::Nodeset(set) => {
                let nodes = set.document_order();
                let has_attributes = nodes
                    .iter()
                    .any(|node| matches!(node, Node::Attribute(_) | Node::Namespace(_)));
                if has_attributes {
                    Value::Attributes(nodes.iter().map(Node::string_value).collect())
                } else {
                    Value::NodeSet(
                        nodes
                            .iter()
                            .filter_map(|node| self.ids.get(node).copied())
                            .collect(),
                    )
                }
            }
        }
    }
}
