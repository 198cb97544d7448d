//! HTML5 and XML parser implementation
//!
//! Both parsers build markup5ever's RcDom and then convert it into our
//! arena tree. This is simpler and more reliable than implementing TreeSink
//! directly.

use html5ever::tendril::TendrilSink;
use markup5ever_rcdom::{Handle, NodeData as RcNodeData, RcDom};
use sift_dom::{Attribute, DomTree, NodeId, QualName};

use crate::ParseError;

/// Result of parsing: the tree plus every diagnostic the parser raised
#[derive(Debug)]
pub struct Parsed {
    pub tree: DomTree,
    pub errors: Vec<String>,
}

impl Parsed {
    /// True when the parser raised no diagnostics
    pub fn is_clean(&self) -> bool {
        self.errors.is_empty()
    }

    /// Keep the tree only if the parser raised no diagnostics
    pub fn into_strict(self) -> Result<DomTree, ParseError> {
        if self.errors.is_empty() {
            Ok(self.tree)
        } else {
            Err(ParseError::Rejected(self.errors))
        }
    }
}

/// HTML5 parser (tolerant; never fails)
#[derive(Debug, Clone)]
pub struct HtmlParser {
    keep_whitespace: bool,
}

impl HtmlParser {
    /// Create a new HTML parser that keeps whitespace-only text nodes
    pub fn new() -> Self {
        Self { keep_whitespace: true }
    }

    /// Whether whitespace-only text nodes survive conversion
    pub fn keep_whitespace(mut self, keep: bool) -> Self {
        self.keep_whitespace = keep;
        self
    }

    /// Parse HTML string into a tree
    pub fn parse(&self, html: &str) -> Parsed {
        tracing::debug!("Parsing HTML document ({} bytes)", html.len());

        let dom = html5ever::parse_document(RcDom::default(), Default::default()).one(html);
        let parsed = convert(&dom, self.keep_whitespace);

        tracing::debug!(
            "Parsed {} nodes with {} diagnostics",
            parsed.tree.len(),
            parsed.errors.len()
        );
        parsed
    }
}

impl Default for HtmlParser {
    fn default() -> Self {
        Self::new()
    }
}

/// XML parser
#[derive(Debug, Clone)]
pub struct XmlParser {
    keep_whitespace: bool,
}

impl XmlParser {
    /// Create a new XML parser that keeps whitespace-only text nodes
    pub fn new() -> Self {
        Self { keep_whitespace: true }
    }

    /// Whether whitespace-only text nodes survive conversion
    pub fn keep_whitespace(mut self, keep: bool) -> Self {
        self.keep_whitespace = keep;
        self
    }

    /// Parse XML string into a tree
    pub fn parse(&self, xml: &str) -> Parsed {
        tracing::debug!("Parsing XML document ({} bytes)", xml.len());

        let dom = xml5ever::driver::parse_document(RcDom::default(), Default::default()).one(xml);
        let parsed = convert(&dom, self.keep_whitespace);

        tracing::debug!(
            "Parsed {} nodes with {} diagnostics",
            parsed.tree.len(),
            parsed.errors.len()
        );
        parsed
    }

    /// Parse and reject the document on any diagnostic
    pub fn parse_strict(&self, xml: &str) -> Result<DomTree, ParseError> {
        self.parse(xml).into_strict()
    }
}

impl Default for XmlParser {
    fn default() -> Self {
        Self::new()
    }
}

fn convert(dom: &RcDom, keep_whitespace: bool) -> Parsed {
    let mut tree = DomTree::new();
    let converter = Converter { keep_whitespace };
    converter.convert_node(&dom.document, &mut tree, NodeId::ROOT);
    let errors = dom.errors.borrow().iter().map(|e| e.to_string()).collect();
    Parsed { tree, errors }
}

struct Converter {
    keep_whitespace: bool,
}

impl Converter {
    /// Convert an RcDom node to our DOM format
    fn convert_node(&self, handle: &Handle, tree: &mut DomTree, parent: NodeId) {
        let id = match &handle.data {
            RcNodeData::Document => {
                // Document node - just process children
                for child in handle.children.borrow().iter() {
                    self.convert_node(child, tree, parent);
                }
                return;
            }
            RcNodeData::Doctype { name, public_id, system_id } => {
                tree.create_doctype(name, public_id, system_id)
            }
            RcNodeData::Text { contents } => {
                let text = contents.borrow();
                if !self.keep_whitespace && text.trim().is_empty() {
                    return;
                }
                tree.create_text(&text)
            }
            RcNodeData::Comment { contents } => tree.create_comment(contents),
            RcNodeData::ProcessingInstruction { target, contents } => {
                tree.create_processing_instruction(target, contents)
            }
            RcNodeData::Element { name, attrs, .. } => {
                let qname = intern_name(tree, name);
                let attrs = attrs
                    .borrow()
                    .iter()
                    .map(|attr| Attribute {
                        name: intern_name(tree, &attr.name),
                        value: attr.value.to_string(),
                    })
                    .collect();
                tree.create_element_with_attrs(qname, attrs)
            }
        };

        if let Err(err) = tree.append_child(parent, id) {
            tracing::trace!("Dropping node the tree cannot hold: {}", err);
            return;
        }

        for child in handle.children.borrow().iter() {
            self.convert_node(child, tree, id);
        }
    }
}

fn intern_name(tree: &mut DomTree, name: &html5ever::QualName) -> QualName {
    let ns = tree.intern(&name.ns);
    let local = tree.intern(&name.local);
    match &name.prefix {
        Some(prefix) => QualName::prefixed(tree.intern(prefix), ns, local),
        None => QualName::new(ns, local),
    }
}
