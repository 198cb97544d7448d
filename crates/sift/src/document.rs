//! Document wrapper
//!
//! A [`Document`] owns a [`DomTree`] and the query [`Evaluator`] linked to
//! it. The evaluator is bound to one generation of the tree; every query
//! first checks the tree's generation and regenerates the evaluator when
//! anything changed since it was built, so loads, insertions and
//! mutations through [`Document::tree_mut`] are never queried with a
//! stale evaluator.

use std::cell::{Ref, RefCell};
use std::str::FromStr;

use sift_dom::{DomTree, NodeId};
use sift_html::{HtmlParser, HtmlSerializer, XmlParser};
use sift_xpath::{Evaluator, Value, XPathResult};

use crate::config::DocumentConfig;
use crate::error::{SiftError, SiftResult};
use crate::node_list::NodeList;
use crate::validate::Validator;

/// Where an inserted node goes relative to its reference
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum InsertionMode {
    Before,
    After,
    #[default]
    Inside,
}

impl FromStr for InsertionMode {
    type Err = SiftError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "before" | "insertBefore" => Ok(InsertionMode::Before),
            "after" | "insertAfter" => Ok(InsertionMode::After),
            "inside" | "insertInside" => Ok(InsertionMode::Inside),
            other => Err(SiftError::InvalidInsertionMode(other.to_string())),
        }
    }
}

/// Node to insert with [`Document::add_node`]
#[derive(Debug, Clone, Copy)]
pub enum NewNode<'a> {
    /// A node of this document (moved if attached)
    Node(NodeId),
    /// A node of another tree, imported deeply
    Foreign(&'a DomTree, NodeId),
    /// A new element with this tag name
    Tag(&'a str),
}

/// Insertion reference for [`Document::add_node`]
#[derive(Debug, Clone, Copy)]
pub enum Reference<'a> {
    /// Append to the document node
    Root,
    Node(NodeId),
    /// Every node the query matches
    Query(&'a str),
    /// Every node of a list
    Nodes(&'a NodeList),
}

/// What an insertion produced: one node, or one copy per reference
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Inserted {
    One(NodeId),
    Many(Vec<NodeId>),
}

impl Inserted {
    /// All inserted nodes
    pub fn nodes(&self) -> &[NodeId] {
        match self {
            Inserted::One(id) => std::slice::from_ref(id),
            Inserted::Many(ids) => ids,
        }
    }

    /// The node, when exactly one was inserted
    pub fn single(&self) -> Option<NodeId> {
        match self {
            Inserted::One(id) => Some(*id),
            Inserted::Many(_) => None,
        }
    }
}

/// DOM tree plus linked query evaluator
#[derive(Debug)]
pub struct Document {
    tree: DomTree,
    evaluator: RefCell<Evaluator>,
    config: DocumentConfig,
    validation_errors: Vec<String>,
}

impl Default for Document {
    fn default() -> Self {
        Self::new()
    }
}

impl Document {
    /// Create an empty document
    pub fn new() -> Self {
        Self::with_config(DocumentConfig::default())
    }

    /// Create an empty document with configuration
    pub fn with_config(config: DocumentConfig) -> Self {
        Self::from_tree_with_config(DomTree::new(), config)
    }

    /// Wrap an existing tree
    pub fn from_tree(tree: DomTree) -> Self {
        Self::from_tree_with_config(tree, DocumentConfig::default())
    }

    pub fn from_tree_with_config(tree: DomTree, config: DocumentConfig) -> Self {
        let evaluator = RefCell::new(Evaluator::new(&tree));
        Self {
            tree,
            evaluator,
            config,
            validation_errors: Vec::new(),
        }
    }

    /// Parse an HTML string into a new document
    pub fn from_html(html: &str) -> Self {
        let mut doc = Self::new();
        doc.load_html(html);
        doc
    }

    pub fn config(&self) -> &DocumentConfig {
        &self.config
    }

    pub fn tree(&self) -> &DomTree {
        &self.tree
    }

    /// Mutable tree access; the evaluator regenerates on the next query
    pub fn tree_mut(&mut self) -> &mut DomTree {
        &mut self.tree
    }

    /// Give back the tree
    pub fn into_tree(self) -> DomTree {
        self.tree
    }

    // ----- loading --------------------------------------------------------

    /// Load an XML document, replacing the current tree.
    /// On any parse diagnostic the current tree is left untouched.
    pub fn load(&mut self, xml: &str) -> SiftResult<()> {
        let tree = XmlParser::new()
            .keep_whitespace(self.config.keep_whitespace_text)
            .parse_strict(xml)?;
        self.replace_tree(tree);
        Ok(())
    }

    /// Load an HTML document tolerantly, replacing the current tree
    pub fn load_html(&mut self, html: &str) {
        let parsed = HtmlParser::new()
            .keep_whitespace(self.config.keep_whitespace_text)
            .parse(html);
        for error in &parsed.errors {
            if self.config.suppress_html_warnings {
                tracing::trace!("Suppressed HTML parse warning: {}", error);
            } else {
                tracing::warn!("HTML parse warning: {}", error);
            }
        }
        self.replace_tree(parsed.tree);
    }

    fn replace_tree(&mut self, tree: DomTree) {
        self.tree = tree;
        self.evaluator.get_mut().regenerate(&self.tree);
    }

    // ----- queries --------------------------------------------------------

    /// Evaluator linked to the current tree generation
    fn evaluator(&self) -> Ref<'_, Evaluator> {
        if self.evaluator.borrow().is_stale(&self.tree) {
            self.evaluator.borrow_mut().regenerate(&self.tree);
        }
        self.evaluator.borrow()
    }

    /// Bind a namespace prefix for queries
    pub fn register_namespace(&mut self, prefix: &str, uri: &str) {
        self.evaluator.get_mut().register_namespace(prefix, uri);
    }

    pub(crate) fn select(
        &self,
        query: &str,
        context: Option<NodeId>,
        register_ns: bool,
    ) -> XPathResult<Vec<NodeId>> {
        self.evaluator().select(&self.tree, query, context, register_ns)
    }

    /// Run a query against the whole document, or scoped to `context`
    pub fn query(&self, query: &str, context: Option<NodeId>) -> SiftResult<NodeList> {
        NodeList::new(self, query, context, self.config.register_namespaces)
    }

    /// [`Document::query`] with explicit namespace registration
    pub fn query_with(
        &self,
        query: &str,
        context: Option<NodeId>,
        register_ns: bool,
    ) -> SiftResult<NodeList> {
        NodeList::new(self, query, context, register_ns)
    }

    /// Evaluate any expression, including ones without a node-set result
    pub fn evaluate(&self, expression: &str, context: Option<NodeId>) -> SiftResult<Value> {
        let value = self.evaluator().evaluate(
            &self.tree,
            expression,
            context,
            self.config.register_namespaces,
        )?;
        Ok(value)
    }

    /// String value of every match
    pub fn values(&self, query: &str, context: Option<NodeId>) -> SiftResult<Vec<String>> {
        let no_evaluator = |source| SiftError::NoEvaluator {
            query: query.to_string(),
            source,
        };
        match self.evaluate(query, context) {
            Ok(Value::NodeSet(nodes)) => Ok(nodes.into_iter().map(|id| self.text(id)).collect()),
            Ok(Value::Attributes(values)) => Ok(values),
            Ok(_) => Err(no_evaluator(sift_xpath::XPathError::NotANodeSet)),
            Err(SiftError::XPath(source)) => Err(no_evaluator(source)),
            Err(err) => Err(err),
        }
    }

    /// String value of the first match
    pub fn value(&self, query: &str, context: Option<NodeId>) -> SiftResult<Option<String>> {
        Ok(self.values(query, context)?.into_iter().next())
    }

    /// First matching node
    pub fn first(&self, query: &str, context: Option<NodeId>) -> SiftResult<Option<NodeId>> {
        Ok(self.query(query, context)?.get(0))
    }

    /// Text content of a node
    pub fn text(&self, node: NodeId) -> String {
        self.tree.text_content(node)
    }

    // ----- creation and insertion -----------------------------------------

    /// Create a detached element; the name must be a valid XML name
    pub fn create_element(&mut self, name: &str) -> SiftResult<NodeId> {
        if !is_valid_name(name) {
            return Err(SiftError::TypeMismatch(name.to_string()));
        }
        Ok(self.tree.create_element(name))
    }

    /// Create a detached text node
    pub fn create_text_node(&mut self, text: &str) -> NodeId {
        self.tree.create_text(text)
    }

    /// Create a detached element holding `value`: parsed as child nodes
    /// when it is well-formed markup, as text otherwise
    pub fn create_node(&mut self, name: &str, value: Option<&str>) -> SiftResult<NodeId> {
        let node = self.create_element(name)?;
        let Some(value) = value else {
            return Ok(node);
        };

        if value.trim_start().starts_with('<') {
            let parsed = XmlParser::new().parse(value);
            if parsed.is_clean() {
                for (child, _) in parsed.tree.children(parsed.tree.root()) {
                    let imported = self.tree.import_node(&parsed.tree, child, true)?;
                    self.tree.append_child(node, imported)?;
                }
                return Ok(node);
            }
        }

        let text = self.tree.create_text(value);
        self.tree.append_child(node, text)?;
        Ok(node)
    }

    /// Create an element (see [`Document::create_node`]) and append it
    /// inside `reference`
    pub fn add_child(
        &mut self,
        name: &str,
        value: Option<&str>,
        reference: Reference<'_>,
    ) -> SiftResult<Inserted> {
        let node = self.create_node(name, value)?;
        self.add_node(NewNode::Node(node), reference, InsertionMode::Inside)
    }

    /// Insert a node relative to a reference. With several references the
    /// node is deep-cloned once per reference.
    pub fn add_node(
        &mut self,
        node: NewNode<'_>,
        reference: Reference<'_>,
        mode: InsertionMode,
    ) -> SiftResult<Inserted> {
        let node = match node {
            NewNode::Node(id) => {
                if self.tree.get(id).is_none() {
                    return Err(sift_dom::DomError::NotFound(id).into());
                }
                id
            }
            NewNode::Foreign(tree, id) => self.tree.import_node(tree, id, true)?,
            NewNode::Tag(name) => self.create_element(name)?,
        };

        let references = match reference {
            Reference::Root => {
                let root = self.tree.root();
                return Ok(Inserted::One(self.tree.append_child(root, node)?));
            }
            Reference::Node(target) => {
                return Ok(Inserted::One(self.insert_node(node, target, mode)?));
            }
            Reference::Query(query) => self.query(query, None)?.as_slice().to_vec(),
            Reference::Nodes(list) => list.as_slice().to_vec(),
        };

        let mut inserted = Vec::with_capacity(references.len());
        for target in references {
            let copy = self.tree.clone_node(node, true)?;
            inserted.push(self.insert_node(copy, target, mode)?);
        }
        tracing::debug!("Inserted {} node(s)", inserted.len());

        Ok(match inserted.as_slice() {
            [single] => Inserted::One(*single),
            _ => Inserted::Many(inserted),
        })
    }

    fn insert_node(&mut self, node: NodeId, reference: NodeId, mode: InsertionMode) -> SiftResult<NodeId> {
        let inserted = match mode {
            InsertionMode::Inside => self.tree.append_child(reference, node)?,
            InsertionMode::Before => {
                let parent = self.tree.parent(reference).ok_or(SiftError::Detached(reference))?;
                self.tree.insert_before(parent, node, Some(reference))?
            }
            InsertionMode::After => {
                let parent = self.tree.parent(reference).ok_or(SiftError::Detached(reference))?;
                let next = self.tree.next_sibling(reference);
                self.tree.insert_before(parent, node, next)?
            }
        };
        Ok(inserted)
    }

    pub fn insert_before(&mut self, node: NodeId, reference: NodeId) -> SiftResult<NodeId> {
        self.insert_node(node, reference, InsertionMode::Before)
    }

    pub fn insert_after(&mut self, node: NodeId, reference: NodeId) -> SiftResult<NodeId> {
        self.insert_node(node, reference, InsertionMode::After)
    }

    pub fn insert_inside(&mut self, node: NodeId, reference: NodeId) -> SiftResult<NodeId> {
        self.insert_node(node, reference, InsertionMode::Inside)
    }

    // ----- serialization --------------------------------------------------

    /// Markup of a node's children, in sibling order. Without `deep`,
    /// each child is emitted without its descendants.
    pub fn inner_content(&self, node: NodeId, deep: bool) -> String {
        let serializer = if deep { HtmlSerializer::new() } else { HtmlSerializer::shallow() };
        serializer.serialize_inner(&self.tree, node)
    }

    /// Markup of a node including its own tag
    pub fn outer_content(&self, node: NodeId) -> String {
        HtmlSerializer::new().serialize_outer(&self.tree, node)
    }

    /// The whole document as XML
    pub fn save_xml(&self) -> String {
        let mut out = format!("<?xml version=\"1.0\" encoding=\"{}\"?>\n", self.config.encoding);
        out.push_str(&HtmlSerializer::xml().serialize_inner(&self.tree, self.tree.root()));
        out
    }

    // ----- validation -----------------------------------------------------

    /// Run a validator, collecting its diagnostics. Returns true when it
    /// raised none.
    pub fn validate(&mut self, validator: &dyn Validator) -> bool {
        let errors = validator.validate(self);
        for error in &errors {
            tracing::debug!("Validation ({}): {}", validator.name(), error);
        }
        let clean = errors.is_empty();
        self.validation_errors.extend(errors);
        clean
    }

    /// Diagnostics accumulated by [`Document::validate`]
    pub fn validation_errors(&self) -> &[String] {
        &self.validation_errors
    }

    pub fn clear_validation_errors(&mut self) {
        self.validation_errors.clear();
    }
}

/// XML `Name` production, restricted to what element names use
fn is_valid_name(name: &str) -> bool {
    let mut chars = name.chars();
    let Some(first) = chars.next() else {
        return false;
    };
    (first.is_alphabetic() || first == '_')
        && chars.all(|c| c.is_alphanumeric() || matches!(c, '_' | '-' | '.' | ':'))
        && !name.ends_with(':')
        && name.matches(':').count() <= 1
}
