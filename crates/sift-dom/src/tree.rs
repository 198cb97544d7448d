//! DOM Tree (arena-based allocation)
//!
//! All nodes of a document, attached or detached, live in one arena. Every
//! mutation bumps `generation`, which is what query evaluators key their
//! caches on.

use crate::{
    Attribute, DomError, DomResult, ElementData, InternedString, Node, NodeData, NodeId,
    NodeType, QualName, StringInterner, TextData,
};

const XMLNS_URI: &str = "http://www.w3.org/2000/xmlns/";

/// Arena-based DOM tree
#[derive(Debug, Clone)]
pub struct DomTree {
    nodes: Vec<Node>,
    interner: StringInterner,
    generation: u64,
}

impl DomTree {
    /// Create a tree holding only the document node
    pub fn new() -> Self {
        Self {
            nodes: vec![Node::document()],
            interner: StringInterner::new(),
            generation: 0,
        }
    }

    /// The document node
    #[inline]
    pub fn root(&self) -> NodeId {
        NodeId::ROOT
    }

    /// Get a node by ID
    pub fn get(&self, id: NodeId) -> Option<&Node> {
        self.nodes.get(id.index())
    }

    pub(crate) fn get_mut(&mut self, id: NodeId) -> Option<&mut Node> {
        self.nodes.get_mut(id.index())
    }

    fn node(&self, id: NodeId) -> DomResult<&Node> {
        self.get(id).ok_or(DomError::NotFound(id))
    }

    /// Number of nodes in the arena (detached ones included)
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// True when the document node has no children
    pub fn is_empty(&self) -> bool {
        !self.nodes[0].has_children()
    }

    /// Mutation counter; changes whenever the tree changes
    #[inline]
    pub fn generation(&self) -> u64 {
        self.generation
    }

    #[inline]
    fn touch(&mut self) {
        self.generation = self.generation.wrapping_add(1);
    }

    /// Access the name interner
    pub fn interner(&self) -> &StringInterner {
        &self.interner
    }

    /// Resolve an interned name
    #[inline]
    pub fn resolve(&self, s: InternedString) -> &str {
        self.interner.get(s)
    }

    /// Intern a name
    pub fn intern(&mut self, s: &str) -> InternedString {
        self.interner.intern(s)
    }

    fn push(&mut self, node: Node) -> NodeId {
        let id = NodeId(self.nodes.len() as u32);
        self.nodes.push(node);
        self.touch();
        id
    }

    // ----- creation -------------------------------------------------------

    /// Create a detached element in no namespace.
    /// A `prefix:local` name keeps its prefix.
    pub fn create_element(&mut self, name: &str) -> NodeId {
        let qname = match name.split_once(':') {
            Some((prefix, local)) => {
                let prefix = self.intern(prefix);
                let local = self.intern(local);
                QualName::prefixed(prefix, InternedString::EMPTY, local)
            }
            None => QualName::local(self.intern(name)),
        };
        self.push(Node::element(qname))
    }

    /// Create a detached element with a full qualified name
    pub fn create_element_ns(&mut self, name: QualName) -> NodeId {
        self.push(Node::element(name))
    }

    /// Create a detached element carrying its attributes (used by parsers)
    pub fn create_element_with_attrs(&mut self, name: QualName, attrs: Vec<Attribute>) -> NodeId {
        self.push(Node::new(NodeData::Element(ElementData { name, attrs })))
    }

    /// Create a detached text node
    pub fn create_text(&mut self, text: &str) -> NodeId {
        self.push(Node::text(text.to_string()))
    }

    /// Create a detached comment
    pub fn create_comment(&mut self, text: &str) -> NodeId {
        self.push(Node::new(NodeData::Comment(text.to_string())))
    }

    /// Create a detached doctype
    pub fn create_doctype(&mut self, name: &str, public_id: &str, system_id: &str) -> NodeId {
        let name = self.intern(name);
        self.push(Node::new(NodeData::Doctype {
            name,
            public_id: public_id.to_string(),
            system_id: system_id.to_string(),
        }))
    }

    /// Create a detached processing instruction
    pub fn create_processing_instruction(&mut self, target: &str, data: &str) -> NodeId {
        let target = self.intern(target);
        self.push(Node::new(NodeData::ProcessingInstruction {
            target,
            data: data.to_string(),
        }))
    }

    // ----- navigation -----------------------------------------------------

    pub fn node_type(&self, id: NodeId) -> Option<NodeType> {
        self.get(id).map(Node::node_type)
    }

    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.get(id)?.parent.some()
    }

    pub fn first_child(&self, id: NodeId) -> Option<NodeId> {
        self.get(id)?.first_child.some()
    }

    pub fn last_child(&self, id: NodeId) -> Option<NodeId> {
        self.get(id)?.last_child.some()
    }

    pub fn next_sibling(&self, id: NodeId) -> Option<NodeId> {
        self.get(id)?.next_sibling.some()
    }

    pub fn prev_sibling(&self, id: NodeId) -> Option<NodeId> {
        self.get(id)?.prev_sibling.some()
    }

    pub fn has_child_nodes(&self, id: NodeId) -> bool {
        self.get(id).is_some_and(Node::has_children)
    }

    /// Iterate the direct children of a node
    pub fn children(&self, id: NodeId) -> Children<'_> {
        Children {
            tree: self,
            next: self.get(id).map_or(NodeId::NONE, |n| n.first_child),
        }
    }

    /// Iterate all descendants of a node in document order (node excluded)
    pub fn descendants(&self, id: NodeId) -> Descendants<'_> {
        Descendants {
            tree: self,
            root: id,
            next: self.get(id).map_or(NodeId::NONE, |n| n.first_child),
        }
    }

    /// Iterate the ancestors of a node, nearest first
    pub fn ancestors(&self, id: NodeId) -> Ancestors<'_> {
        Ancestors {
            tree: self,
            next: self.get(id).map_or(NodeId::NONE, |n| n.parent),
        }
    }

    /// Whether `node` is `ancestor` or lies below it
    pub fn contains(&self, ancestor: NodeId, node: NodeId) -> bool {
        node == ancestor || self.ancestors(node).any(|a| a == ancestor)
    }

    /// The single element child of the document node, if any
    pub fn document_element(&self) -> Option<NodeId> {
        self.children(NodeId::ROOT)
            .find(|(_, node)| node.is_element())
            .map(|(id, _)| id)
    }

    /// Every node without a parent (the document node first, then
    /// detached subtrees in creation order)
    pub fn roots(&self) -> impl Iterator<Item = NodeId> + '_ {
        self.nodes
            .iter()
            .enumerate()
            .filter(|(_, node)| !node.parent.is_valid())
            .map(|(idx, _)| NodeId(idx as u32))
    }

    // ----- element accessors ----------------------------------------------

    /// Local tag name of an element
    pub fn tag_name(&self, id: NodeId) -> Option<&str> {
        let elem = self.get(id)?.as_element()?;
        Some(self.resolve(elem.name.local))
    }

    /// Tag name as written, including any prefix
    pub fn qualified_name(&self, id: NodeId) -> Option<String> {
        let elem = self.get(id)?.as_element()?;
        Some(self.qualify(&elem.name))
    }

    /// Namespace URI of an element (None when it has no namespace)
    pub fn namespace_uri(&self, id: NodeId) -> Option<&str> {
        let elem = self.get(id)?.as_element()?;
        let ns = self.resolve(elem.name.ns);
        (!ns.is_empty()).then_some(ns)
    }

    /// `prefix:local` or `local`
    pub fn qualify(&self, name: &QualName) -> String {
        match name.prefix {
            Some(prefix) => format!("{}:{}", self.resolve(prefix), self.resolve(name.local)),
            None => self.resolve(name.local).to_string(),
        }
    }

    /// Attributes of an element in source order (empty for other nodes)
    pub fn attributes(&self, id: NodeId) -> &[Attribute] {
        self.get(id)
            .and_then(Node::as_element)
            .map(|e| e.attrs.as_slice())
            .unwrap_or(&[])
    }

    /// Attribute value by name as written (`href`, `xml:lang`, `xmlns:x`)
    pub fn attribute(&self, id: NodeId, name: &str) -> Option<&str> {
        self.attributes(id)
            .iter()
            .find(|attr| self.qualify(&attr.name) == name)
            .map(|attr| attr.value.as_str())
    }

    /// Set an attribute on an element
    pub fn set_attribute(&mut self, id: NodeId, name: &str, value: &str) -> DomResult<()> {
        self.node(id)?;
        let qname = match name.split_once(':') {
            Some((prefix, local)) => {
                let ns = if prefix == "xmlns" {
                    self.intern(XMLNS_URI)
                } else {
                    InternedString::EMPTY
                };
                QualName::prefixed(self.intern(prefix), ns, self.intern(local))
            }
            None => QualName::local(self.intern(name)),
        };
        let elem = self
            .get_mut(id)
            .and_then(Node::as_element_mut)
            .ok_or(DomError::NotAnElement(id))?;
        elem.set_attr(qname, value.to_string());
        self.touch();
        Ok(())
    }

    /// Remove an attribute by local name, returning its old value
    pub fn remove_attribute(&mut self, id: NodeId, name: &str) -> DomResult<Option<String>> {
        let Some(local) = self.interner.lookup(name) else {
            return Ok(None);
        };
        let elem = self
            .get_mut(id)
            .and_then(Node::as_element_mut)
            .ok_or(DomError::NotAnElement(id))?;
        let removed = elem.remove_attr(local);
        self.touch();
        Ok(removed)
    }

    /// Resolve a namespace prefix in scope at `id` ("" = default namespace)
    pub fn lookup_namespace_uri(&self, id: NodeId, prefix: &str) -> Option<&str> {
        for node_id in std::iter::once(id).chain(self.ancestors(id)) {
            let Some(elem) = self.get(node_id).and_then(Node::as_element) else {
                continue;
            };
            for attr in &elem.attrs {
                let local = self.resolve(attr.name.local);
                let declares = match attr.name.prefix.map(|p| self.resolve(p)) {
                    Some("xmlns") => local == prefix,
                    None if prefix.is_empty() => local == "xmlns",
                    // HTML parsers keep `xmlns:x` as one unprefixed name
                    None => local.strip_prefix("xmlns:") == Some(prefix),
                    Some(_) => false,
                };
                if declares {
                    return Some(&attr.value);
                }
            }
            if let Some(p) = elem.name.prefix
                && self.resolve(p) == prefix
                && elem.name.ns != InternedString::EMPTY
            {
                return Some(self.resolve(elem.name.ns));
            }
        }
        None
    }

    /// Concatenated text of a node and its descendants
    pub fn text_content(&self, id: NodeId) -> String {
        let Some(node) = self.get(id) else {
            return String::new();
        };
        match &node.data {
            NodeData::Text(t) => t.content.clone(),
            NodeData::Comment(c) => c.clone(),
            NodeData::ProcessingInstruction { data, .. } => data.clone(),
            NodeData::Doctype { .. } => String::new(),
            NodeData::Element(_) | NodeData::Document => {
                let mut out = String::new();
                for child in self.descendants(id) {
                    if let Some(text) = self.nodes[child.index()].as_text() {
                        out.push_str(text);
                    }
                }
                out
            }
        }
    }

    // ----- mutation -------------------------------------------------------

    /// Append `child` as the last child of `parent`, moving it if attached
    pub fn append_child(&mut self, parent: NodeId, child: NodeId) -> DomResult<NodeId> {
        self.insert_before(parent, child, None)
    }

    /// Insert `child` into `parent` before `reference` (or last when None)
    pub fn insert_before(
        &mut self,
        parent: NodeId,
        child: NodeId,
        reference: Option<NodeId>,
    ) -> DomResult<NodeId> {
        self.check_insert(parent, child)?;
        let mut reference = reference;
        if let Some(r) = reference {
            if self.node(r)?.parent != parent {
                return Err(DomError::NotAChild { parent, child: r });
            }
            if r == child {
                reference = self.next_sibling(child);
            }
        }

        self.unlink(child);
        match reference {
            Some(r) => {
                let prev = self.nodes[r.index()].prev_sibling;
                {
                    let node = &mut self.nodes[child.index()];
                    node.prev_sibling = prev;
                    node.next_sibling = r;
                    node.parent = parent;
                }
                self.nodes[r.index()].prev_sibling = child;
                if prev.is_valid() {
                    self.nodes[prev.index()].next_sibling = child;
                } else {
                    self.nodes[parent.index()].first_child = child;
                }
            }
            None => self.link_last(parent, child),
        }
        self.touch();
        Ok(child)
    }

    /// Remove `child` from `parent`; the node stays in the arena, detached
    pub fn remove_child(&mut self, parent: NodeId, child: NodeId) -> DomResult<NodeId> {
        self.node(parent)?;
        if self.node(child)?.parent != parent {
            return Err(DomError::NotAChild { parent, child });
        }
        self.unlink(child);
        self.touch();
        Ok(child)
    }

    /// Detach a node from wherever it is (no-op when already detached)
    pub fn detach(&mut self, id: NodeId) -> DomResult<()> {
        self.node(id)?;
        self.unlink(id);
        self.touch();
        Ok(())
    }

    /// Copy a node (and with `deep`, its subtree) as a new detached node
    pub fn clone_node(&mut self, id: NodeId, deep: bool) -> DomResult<NodeId> {
        let data = self.node(id)?.data.clone();
        let copy = self.push(Node::new(data));
        if deep {
            let kids: Vec<NodeId> = self.children(id).map(|(c, _)| c).collect();
            for kid in kids {
                let kid_copy = self.clone_node(kid, true)?;
                self.link_last(copy, kid_copy);
            }
        }
        Ok(copy)
    }

    /// Copy a node from another tree into this one, detached
    pub fn import_node(&mut self, source: &DomTree, id: NodeId, deep: bool) -> DomResult<NodeId> {
        let node = source.node(id)?;
        let data = match &node.data {
            NodeData::Element(elem) => {
                let name = self.reintern(source, elem.name);
                let attrs = elem
                    .attrs
                    .iter()
                    .map(|attr| Attribute {
                        name: self.reintern(source, attr.name),
                        value: attr.value.clone(),
                    })
                    .collect();
                NodeData::Element(ElementData { name, attrs })
            }
            NodeData::Doctype { name, public_id, system_id } => NodeData::Doctype {
                name: self.intern(source.resolve(*name)),
                public_id: public_id.clone(),
                system_id: system_id.clone(),
            },
            NodeData::ProcessingInstruction { target, data } => NodeData::ProcessingInstruction {
                target: self.intern(source.resolve(*target)),
                data: data.clone(),
            },
            NodeData::Text(text) => NodeData::Text(TextData { content: text.content.clone() }),
            other => other.clone(),
        };
        let copy = self.push(Node::new(data));
        if deep {
            for (kid, _) in source.children(id) {
                let kid_copy = self.import_node(source, kid, true)?;
                self.link_last(copy, kid_copy);
            }
        }
        Ok(copy)
    }

    fn reintern(&mut self, source: &DomTree, name: QualName) -> QualName {
        QualName {
            prefix: name.prefix.map(|p| self.interner.intern(source.resolve(p))),
            ns: self.interner.intern(source.resolve(name.ns)),
            local: self.interner.intern(source.resolve(name.local)),
        }
    }

    fn check_insert(&self, parent: NodeId, child: NodeId) -> DomResult<()> {
        let parent_node = self.node(parent)?;
        let child_node = self.node(child)?;

        if !matches!(parent_node.data, NodeData::Document | NodeData::Element(_)) {
            return Err(DomError::HierarchyRequest("parent cannot have children"));
        }
        if matches!(child_node.data, NodeData::Document) {
            return Err(DomError::HierarchyRequest("a document node cannot be inserted"));
        }
        if self.contains(child, parent) {
            return Err(DomError::HierarchyRequest(
                "a node cannot be inserted into itself or its descendants",
            ));
        }
        if matches!(parent_node.data, NodeData::Document) {
            match child_node.data {
                NodeData::Text(_) => {
                    return Err(DomError::HierarchyRequest("text cannot be a child of the document"));
                }
                NodeData::Element(_) => {
                    if self.children(parent).any(|(id, n)| n.is_element() && id != child) {
                        return Err(DomError::HierarchyRequest(
                            "the document already has an element child",
                        ));
                    }
                }
                _ => {}
            }
        }
        Ok(())
    }

    fn link_last(&mut self, parent: NodeId, child: NodeId) {
        let last = self.nodes[parent.index()].last_child;
        {
            let node = &mut self.nodes[child.index()];
            node.parent = parent;
            node.prev_sibling = last;
            node.next_sibling = NodeId::NONE;
        }
        if last.is_valid() {
            self.nodes[last.index()].next_sibling = child;
        } else {
            self.nodes[parent.index()].first_child = child;
        }
        self.nodes[parent.index()].last_child = child;
    }

    fn unlink(&mut self, id: NodeId) {
        let (parent, prev, next) = {
            let node = &self.nodes[id.index()];
            (node.parent, node.prev_sibling, node.next_sibling)
        };
        if !parent.is_valid() {
            return;
        }
        if prev.is_valid() {
            self.nodes[prev.index()].next_sibling = next;
        } else {
            self.nodes[parent.index()].first_child = next;
        }
        if next.is_valid() {
            self.nodes[next.index()].prev_sibling = prev;
        } else {
            self.nodes[parent.index()].last_child = prev;
        }
        let node = &mut self.nodes[id.index()];
        node.parent = NodeId::NONE;
        node.prev_sibling = NodeId::NONE;
        node.next_sibling = NodeId::NONE;
    }
}

impl Default for DomTree {
    fn default() -> Self {
        Self::new()
    }
}

/// Iterator over direct children
pub struct Children<'a> {
    tree: &'a DomTree,
    next: NodeId,
}

impl<'a> Iterator for Children<'a> {
    type Item = (NodeId, &'a Node);

    fn next(&mut self) -> Option<Self::Item> {
        let id = self.next;
        let node = self.tree.get(id)?;
        self.next = node.next_sibling;
        Some((id, node))
    }
}

/// Pre-order iterator over a subtree, the subtree root excluded
pub struct Descendants<'a> {
    tree: &'a DomTree,
    root: NodeId,
    next: NodeId,
}

impl Descendants<'_> {
    fn successor(&self, id: NodeId) -> NodeId {
        let nodes = &self.tree.nodes;
        if nodes[id.index()].first_child.is_valid() {
            return nodes[id.index()].first_child;
        }
        let mut cur = id;
        loop {
            if cur == self.root {
                return NodeId::NONE;
            }
            let node = &nodes[cur.index()];
            if node.next_sibling.is_valid() {
                return node.next_sibling;
            }
            cur = node.parent;
            if !cur.is_valid() {
                return NodeId::NONE;
            }
        }
    }
}

impl Iterator for Descendants<'_> {
    type Item = NodeId;

    fn next(&mut self) -> Option<NodeId> {
        let current = self.next;
        if !current.is_valid() {
            return None;
        }
        self.next = self.successor(current);
        Some(current)
    }
}

/// Iterator from a node's parent up to its root
pub struct Ancestors<'a> {
    tree: &'a DomTree,
    next: NodeId,
}

impl Iterator for Ancestors<'_> {
    type Item = NodeId;

    fn next(&mut self) -> Option<NodeId> {
        let id = self.next;
        let node = self.tree.get(id)?;
        self.next = node.parent;
        Some(id)
    }
}
