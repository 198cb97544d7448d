//! Markup serialization
//!
//! Writes nodes back out as markup in sibling order, either the node's
//! children only (inner) or the node itself (outer). Shallow output stops
//! one level down; XML output always quotes attribute values and escapes
//! script and style content.

use sift_dom::{DomTree, ElementData, NodeData, NodeId};

/// DOM to markup writer
#[derive(Debug, Clone)]
pub struct HtmlSerializer {
    /// Serialize descendants of the emitted nodes
    pub deep: bool,
    /// Emit well-formed XML (explicit attribute values, no raw text)
    pub xml: bool,
}

/// Void elements (self-closing, no end tag)
const VOID_ELEMENTS: &[&str] = &[
    "area", "base", "br", "col", "embed", "hr", "img", "input",
    "link", "meta", "param", "source", "track", "wbr",
];

/// Raw text elements (no escaping for content)
const RAW_TEXT_ELEMENTS: &[&str] = &["script", "style"];

impl Default for HtmlSerializer {
    fn default() -> Self {
        Self { deep: true, xml: false }
    }
}

impl HtmlSerializer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Serializer that stops one level below the serialized node
    pub fn shallow() -> Self {
        Self { deep: false, xml: false }
    }

    /// Serializer producing well-formed XML
    pub fn xml() -> Self {
        Self { deep: true, xml: true }
    }

    /// Markup of the node's children
    pub fn serialize_inner(&self, tree: &DomTree, node_id: NodeId) -> String {
        let mut output = String::new();
        self.serialize_children(tree, node_id, &mut output);
        output
    }

    /// Markup of the node itself
    pub fn serialize_outer(&self, tree: &DomTree, node_id: NodeId) -> String {
        let mut output = String::new();
        self.serialize_node(tree, node_id, &mut output);
        output
    }

    fn serialize_node(&self, tree: &DomTree, node_id: NodeId, output: &mut String) {
        let Some(node) = tree.get(node_id) else {
            return;
        };

        match &node.data {
            NodeData::Document => self.serialize_children(tree, node_id, output),
            NodeData::Element(elem) => {
                let tag = tree.qualify(&elem.name);
                let local = tree.resolve(elem.name.local);
                let closes_itself = VOID_ELEMENTS.contains(&local)
                    && (!self.deep || !node.has_children());

                self.write_start_tag(tree, &tag, elem, output);
                if closes_itself {
                    output.push_str(" />");
                    return;
                }
                output.push('>');

                if self.deep {
                    let raw = !self.xml && RAW_TEXT_ELEMENTS.contains(&local);
                    for (child_id, child) in tree.children(node_id) {
                        match &child.data {
                            NodeData::Text(text) if raw => output.push_str(&text.content),
                            _ if raw => {}
                            _ => self.serialize_node(tree, child_id, output),
                        }
                    }
                }

                output.push_str("</");
                output.push_str(&tag);
                output.push('>');
            }
            NodeData::Text(text) => escape(&text.content, Escape::Text, output),
            NodeData::Comment(text) => {
                output.push_str("<!--");
                output.push_str(text);
                output.push_str("-->");
            }
            NodeData::Doctype { name, .. } => {
                output.push_str("<!DOCTYPE ");
                output.push_str(tree.resolve(*name));
                output.push('>');
            }
            NodeData::ProcessingInstruction { target, data } => {
                output.push_str("<?");
                output.push_str(tree.resolve(*target));
                if !data.is_empty() {
                    output.push(' ');
                    output.push_str(data);
                }
                output.push_str("?>");
            }
        }
    }

    /// `<tag attr="value"`, left open
    fn write_start_tag(&self, tree: &DomTree, tag: &str, elem: &ElementData, output: &mut String) {
        output.push('<');
        output.push_str(tag);
        for attr in &elem.attrs {
            output.push(' ');
            output.push_str(&tree.qualify(&attr.name));
            // HTML allows bare boolean attributes, XML does not
            if self.xml || !attr.value.is_empty() {
                output.push_str("=\"");
                escape(&attr.value, Escape::Attribute, output);
                output.push('"');
            }
        }
    }

    fn serialize_children(&self, tree: &DomTree, parent_id: NodeId, output: &mut String) {
        for (child_id, _) in tree.children(parent_id) {
            self.serialize_node(tree, child_id, output);
        }
    }
}

#[derive(Clone, Copy, PartialEq, Eq)]
enum Escape {
    Text,
    Attribute,
}

fn escape(text: &str, mode: Escape, output: &mut String) {
    for c in text.chars() {
        match c {
            '&' => output.push_str("&amp;"),
            '<' => output.push_str("&lt;"),
            '>' => output.push_str("&gt;"),
            '"' if mode == Escape::Attribute => output.push_str("&quot;"),
            _ => output.push(c),
        }
    }
}

/// Deep HTML markup of a node's children
pub fn inner_html(tree: &DomTree, node_id: NodeId) -> String {
    HtmlSerializer::new().serialize_inner(tree, node_id)
}

/// Deep HTML markup of a node
pub fn outer_html(tree: &DomTree, node_id: NodeId) -> String {
    HtmlSerializer::new().serialize_outer(tree, node_id)
}
