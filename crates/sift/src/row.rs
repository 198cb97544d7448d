//! Table row accessor
//!
//! A [`Row`] wraps one `tr` node. Cells are addressed by zero-based offset
//! or by a column alias, and resolved with a query scoped to the row, so
//! `td` and `th` cells count alike and nested tables are never reached.

use std::fmt;

use serde::Deserialize;
use sift_dom::NodeId;

use crate::columns::Column;
use crate::document::Document;
use crate::error::{SiftError, SiftResult};

/// What cell lookups hand out
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReturnType {
    /// The cell node itself
    #[default]
    Node,
    /// The cell's text content
    Text,
}

/// A looked-up cell
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Cell {
    Node(NodeId),
    Text(String),
}

impl Cell {
    pub fn as_node(&self) -> Option<NodeId> {
        match self {
            Cell::Node(id) => Some(*id),
            Cell::Text(_) => None,
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            Cell::Text(text) => Some(text),
            Cell::Node(_) => None,
        }
    }
}

/// Cell address used for lookups
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CellKey<'k> {
    Offset(usize),
    Alias(&'k str),
}

impl From<usize> for CellKey<'_> {
    fn from(offset: usize) -> Self {
        CellKey::Offset(offset)
    }
}

impl<'k> From<&'k str> for CellKey<'k> {
    fn from(alias: &'k str) -> Self {
        CellKey::Alias(alias)
    }
}

impl<'k> From<&'k RowKey> for CellKey<'k> {
    fn from(key: &'k RowKey) -> Self {
        match key {
            RowKey::Offset(offset) => CellKey::Offset(*offset),
            RowKey::Alias(alias) => CellKey::Alias(alias),
        }
    }
}

/// Key reported by the row cursor: the alias registered for the position,
/// else its offset
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RowKey {
    Offset(usize),
    Alias(String),
}

impl fmt::Display for RowKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RowKey::Offset(offset) => write!(f, "{offset}"),
            RowKey::Alias(alias) => f.write_str(alias),
        }
    }
}

/// Accessor for the cells of one table row
#[derive(Debug, Clone)]
pub struct Row<'d> {
    doc: &'d Document,
    node: NodeId,
    columns: Vec<Column>,
    return_type: ReturnType,
    iterate_via_headers: bool,
    position: usize,
}

impl<'d> Row<'d> {
    /// Wrap a `tr` node
    pub fn new(doc: &'d Document, node: NodeId) -> SiftResult<Self> {
        match doc.tree().tag_name(node) {
            Some("tr") => Ok(Self::bound(doc, node, Vec::new(), ReturnType::Node)),
            other => Err(SiftError::NotARow(describe(doc, node, other))),
        }
    }

    /// Wrap a `tr` node with column descriptors
    pub fn with_columns(doc: &'d Document, node: NodeId, columns: Vec<Column>) -> SiftResult<Self> {
        let mut row = Self::new(doc, node)?;
        row.set_columns(columns);
        Ok(row)
    }

    pub(crate) fn bound(
        doc: &'d Document,
        node: NodeId,
        columns: Vec<Column>,
        return_type: ReturnType,
    ) -> Self {
        Self {
            doc,
            node,
            columns,
            return_type,
            iterate_via_headers: true,
            position: 0,
        }
    }

    /// The `tr` node
    pub fn node(&self) -> NodeId {
        self.node
    }

    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    /// Replace the column descriptors
    pub fn set_columns(&mut self, columns: Vec<Column>) {
        self.columns = columns;
    }

    /// Set the return type, returning the previous one
    pub fn set_return_type(&mut self, return_type: ReturnType) -> ReturnType {
        std::mem::replace(&mut self.return_type, return_type)
    }

    pub fn return_type(&self) -> ReturnType {
        self.return_type
    }

    /// Choose whether the cursor walks declared columns only; returns the
    /// previous setting
    pub fn set_iterate_via_headers(&mut self, value: bool) -> bool {
        std::mem::replace(&mut self.iterate_via_headers, value)
    }

    // ----- lookups --------------------------------------------------------

    /// 1-based position the cell query needs, None for an unknown alias
    fn query_position(&self, key: CellKey<'_>) -> Option<usize> {
        match key {
            CellKey::Offset(offset) => offset.checked_add(1),
            CellKey::Alias(alias) => self
                .columns
                .iter()
                .find(|column| column.alias.as_deref() == Some(alias))
                .and_then(|column| column.offset.checked_add(1)),
        }
    }

    fn cells_at(&self, position: usize) -> Vec<NodeId> {
        let query = format!("*[self::td or self::th][{position}]");
        match self.doc.select(&query, Some(self.node), false) {
            Ok(nodes) => nodes,
            Err(err) => {
                tracing::debug!("Cell query failed: {}", err);
                Vec::new()
            }
        }
    }

    /// Whether a cell exists at `key`
    pub fn exists<'k>(&self, key: impl Into<CellKey<'k>>) -> bool {
        let key = key.into();
        let Some(position) = self.query_position(key) else {
            return false;
        };
        let found = !self.cells_at(position).is_empty();
        if !found && matches!(key, CellKey::Alias(_)) {
            tracing::warn!(
                "Malformed table row detected! Table cells were not found. They may be missing \
                 or may not be immediate children of the row: {}",
                self.doc.inner_content(self.node, true)
            );
        }
        found
    }

    /// Cell at `key`, as node or text per the return type
    pub fn get<'k>(&self, key: impl Into<CellKey<'k>>) -> Option<Cell> {
        let key = key.into();
        if !self.exists(key) {
            return None;
        }
        let node = *self.cells_at(self.query_position(key)?).first()?;
        Some(match self.return_type {
            ReturnType::Node => Cell::Node(node),
            ReturnType::Text => Cell::Text(self.doc.text(node)),
        })
    }

    /// Text of the cell at `key`, whatever the return type
    pub fn text<'k>(&self, key: impl Into<CellKey<'k>>) -> Option<String> {
        let node = self.cell_node(key)?;
        Some(self.doc.text(node))
    }

    /// Cell node at `key`, whatever the return type
    pub fn cell_node<'k>(&self, key: impl Into<CellKey<'k>>) -> Option<NodeId> {
        let key = key.into();
        if !self.exists(key) {
            return None;
        }
        self.cells_at(self.query_position(key)?).first().copied()
    }

    /// True when every declared column offset exists as a cell
    pub fn is_valid_length(&self) -> bool {
        self.columns.iter().all(|column| self.exists(column.offset))
    }

    /// Number of `td`/`th` children
    pub fn count(&self) -> usize {
        self.doc
            .select("td | th", Some(self.node), false)
            .map(|cells| cells.len())
            .unwrap_or(0)
    }

    // ----- cursor ---------------------------------------------------------

    fn follows_headers(&self) -> bool {
        self.iterate_via_headers && !self.columns.is_empty()
    }

    /// Offset visited at cursor `position`
    fn offset_at(&self, position: usize) -> usize {
        if !self.follows_headers() {
            return position;
        }
        match self.columns.get(position) {
            Some(column) => column.offset,
            // past the end: just beyond the highest declared offset
            None => self
                .columns
                .iter()
                .map(|c| c.offset)
                .max()
                .unwrap_or(0)
                .saturating_add(1),
        }
    }

    fn key_at(&self, position: usize) -> RowKey {
        let offset = self.offset_at(position);
        let alias = self
            .columns
            .iter()
            .find(|column| column.offset == offset)
            .and_then(|column| column.alias.clone());
        match alias {
            Some(alias) => RowKey::Alias(alias),
            None => RowKey::Offset(offset),
        }
    }

    fn lookup_key(&self, position: usize) -> RowKey {
        if self.follows_headers() {
            self.key_at(position)
        } else {
            RowKey::Offset(position)
        }
    }

    pub fn rewind(&mut self) {
        self.position = 0;
    }

    pub fn next(&mut self) {
        self.position += 1;
    }

    /// Alias registered for the current position, else its offset
    pub fn key(&self) -> RowKey {
        self.key_at(self.position)
    }

    /// Cell at the current position
    pub fn current(&self) -> Option<Cell> {
        self.get(&self.lookup_key(self.position))
    }

    /// Whether the current position holds a cell
    pub fn valid(&self) -> bool {
        self.exists(&self.lookup_key(self.position))
    }

    /// Iterate `(key, cell)` pairs from the first position, leaving the
    /// cursor untouched
    pub fn iter(&self) -> Cells<'_, 'd> {
        Cells { row: self, position: 0 }
    }
}

/// Iterator over the cells of a [`Row`]
pub struct Cells<'r, 'd> {
    row: &'r Row<'d>,
    position: usize,
}

impl Iterator for Cells<'_, '_> {
    type Item = (RowKey, Cell);

    fn next(&mut self) -> Option<Self::Item> {
        let lookup = self.row.lookup_key(self.position);
        let cell = self.row.get(&lookup)?;
        let key = self.row.key_at(self.position);
        self.position += 1;
        Some((key, cell))
    }
}

fn describe(doc: &Document, node: NodeId, tag: Option<&str>) -> String {
    match tag {
        Some(tag) => tag.to_string(),
        None => doc
            .tree()
            .node_type(node)
            .map(|t| format!("{t:?}"))
            .unwrap_or_else(|| "missing node".to_string()),
    }
}

pub(crate) fn describe_node(doc: &Document, node: NodeId) -> String {
    describe(doc, node, doc.tree().tag_name(node))
}
