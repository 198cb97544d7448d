//! Table extractor
//!
//! Rows are flattened from `tr | thead/tr | tbody/tr` relative to the
//! table, in document order. A row counts as a header when:
//!
//! - it sits directly in the table with no row before it, or
//! - it is the last row of a `thead`, or
//! - it is the first row of a `tbody` that has no `thead` rows and no
//!   direct table rows before it.
//!
//! `header_offset` is the index of the last header row seen before the
//! body starts; `body_offset` the index of the first non-header row after
//! it. Rows are numbered from `body_offset` on.

use sift_dom::NodeId;

use crate::columns::{Column, Expect, HeaderColumn};
use crate::config::TableOptions;
use crate::document::Document;
use crate::error::{SiftError, SiftResult};
use crate::row::{ReturnType, Row, describe_node};

const ROWS_QUERY: &str = "tr | thead/tr | tbody/tr";

/// Structured view over a `table` element
#[derive(Debug, Clone)]
pub struct Table<'d> {
    doc: &'d Document,
    node: NodeId,
    rows: Vec<NodeId>,
    headers: Vec<HeaderColumn>,
    header_offset: usize,
    body_offset: usize,
    return_type: ReturnType,
    iterate_all_rows: bool,
    position: isize,
}

impl<'d> Table<'d> {
    /// Wrap a `table` node
    pub fn new(doc: &'d Document, node: NodeId) -> SiftResult<Self> {
        Self::with_options(doc, node, TableOptions::default())
    }

    pub fn with_options(doc: &'d Document, node: NodeId, options: TableOptions) -> SiftResult<Self> {
        if doc.tree().tag_name(node) != Some("table") {
            return Err(SiftError::NotATable(describe_node(doc, node)));
        }
        let rows = doc
            .select(ROWS_QUERY, Some(node), false)
            .map_err(|source| SiftError::NoEvaluator {
                query: ROWS_QUERY.to_string(),
                source,
            })?;

        let mut table = Self {
            doc,
            node,
            rows,
            headers: Vec::new(),
            header_offset: 0,
            body_offset: 0,
            return_type: options.return_type,
            iterate_all_rows: false,
            position: 0,
        };
        table.set_iterate_all_rows(options.iterate_all_rows)?;
        tracing::debug!(
            "Table {} has {} row(s), header at {}, body from {}",
            node,
            table.rows.len(),
            table.header_offset,
            table.body_offset
        );
        Ok(table)
    }

    /// Wrap a `table` node and verify its header row
    pub fn with_headers(doc: &'d Document, node: NodeId, headers: Vec<HeaderColumn>) -> SiftResult<Self> {
        let mut table = Self::new(doc, node)?;
        table.set_headers(headers, true)?;
        Ok(table)
    }

    /// Resolve `query` (optionally scoped to `reference`) to its first
    /// match and wrap it
    pub fn from_query(
        doc: &'d Document,
        query: &str,
        reference: Option<NodeId>,
        headers: Option<Vec<HeaderColumn>>,
    ) -> SiftResult<Self> {
        let node = doc
            .first(query, reference)?
            .ok_or_else(|| SiftError::NoMatch(query.to_string()))?;
        match headers {
            Some(headers) => Self::with_headers(doc, node, headers),
            None => Self::new(doc, node),
        }
    }

    /// The `table` node
    pub fn node(&self) -> NodeId {
        self.node
    }

    /// Every flattened row, header rows included
    pub fn rows(&self) -> &[NodeId] {
        &self.rows
    }

    pub fn headers(&self) -> &[HeaderColumn] {
        &self.headers
    }

    pub fn header_offset(&self) -> usize {
        self.header_offset
    }

    pub fn body_offset(&self) -> usize {
        self.body_offset
    }

    // ----- headers --------------------------------------------------------

    /// Load header descriptors, verifying them against the header row
    /// when `validate` is set
    pub fn set_headers(&mut self, headers: Vec<HeaderColumn>, validate: bool) -> SiftResult<()> {
        self.headers = headers;
        if validate {
            self.validate_headers()?;
        }
        Ok(())
    }

    /// Check the header row's cell text against every descriptor
    pub fn validate_headers(&self) -> SiftResult<()> {
        if self.headers.is_empty() {
            return Err(SiftError::NoHeaders);
        }
        let header_row = self.header_row();

        for column in &self.headers {
            let actual = header_row
                .as_ref()
                .and_then(|row| row.text(column.offset))
                .unwrap_or_default();
            if column.expect.matches(&actual) {
                continue;
            }
            return Err(match &column.expect {
                Expect::Value(expected) => SiftError::HeaderMismatch {
                    expected: expected.clone(),
                    actual,
                },
                Expect::Pattern(pattern) => SiftError::HeaderPatternMismatch {
                    pattern: pattern.as_str().to_string(),
                    actual,
                },
            });
        }
        Ok(())
    }

    /// The row at `header_offset`
    pub fn header_row(&self) -> Option<Row<'d>> {
        let node = *self.rows.get(self.header_offset)?;
        Some(Row::bound(self.doc, node, Vec::new(), ReturnType::Text))
    }

    // ----- header detection -----------------------------------------------

    /// Toggle "iterate all rows", returning the previous setting. When on,
    /// header detection is bypassed and both offsets are 0.
    pub fn set_iterate_all_rows(&mut self, value: bool) -> SiftResult<bool> {
        let previous = std::mem::replace(&mut self.iterate_all_rows, value);
        if value {
            self.header_offset = 0;
            self.body_offset = 0;
        } else {
            self.compute_offsets()?;
        }
        Ok(previous)
    }

    fn compute_offsets(&mut self) -> SiftResult<()> {
        let mut header = None;
        let mut body = None;
        for (i, &row) in self.rows.iter().enumerate() {
            let is_header = self.is_header(row)?;
            if is_header {
                header = Some(i);
            }
            if header.is_some() && !is_header {
                body = Some(i);
                break;
            }
        }
        self.header_offset = header.unwrap_or(0);
        self.body_offset = body.unwrap_or(0);
        Ok(())
    }

    /// Whether `row` is a header row (see the module docs)
    pub fn is_header(&self, row: NodeId) -> SiftResult<bool> {
        let tree = self.doc.tree();
        if tree.tag_name(row) != Some("tr") {
            return Err(SiftError::NotARow(describe_node(self.doc, row)));
        }
        let Some(parent) = tree.parent(row) else {
            return Ok(false);
        };

        let has_preceding = self.any_match("preceding-sibling::tr", row)?;
        let has_following = self.any_match("following-sibling::tr", row)?;

        Ok(match tree.tag_name(parent) {
            Some("table") => !has_preceding,
            Some("thead") => !has_following,
            Some("tbody") => {
                !self.any_match("preceding-sibling::thead/tr", parent)?
                    && !self.any_match("preceding-sibling::tr", parent)?
                    && !has_preceding
            }
            _ => false,
        })
    }

    /// Whether `query` matches anything from `context`
    fn any_match(&self, query: &str, context: NodeId) -> SiftResult<bool> {
        let nodes = self
            .doc
            .select(query, Some(context), false)
            .map_err(|source| SiftError::NoEvaluator {
                query: query.to_string(),
                source,
            })?;
        Ok(!nodes.is_empty())
    }

    // ----- access ---------------------------------------------------------

    /// Set the return type handed to rows, returning the previous one
    pub fn set_return_type(&mut self, return_type: ReturnType) -> ReturnType {
        std::mem::replace(&mut self.return_type, return_type)
    }

    fn columns(&self) -> Vec<Column> {
        self.headers.iter().map(HeaderColumn::column).collect()
    }

    /// Body row `index`, None past the end
    pub fn get(&self, index: usize) -> Option<Row<'d>> {
        let node = *self
            .body_offset
            .checked_add(index)
            .and_then(|at| self.rows.get(at))?;
        Some(Row::bound(self.doc, node, self.columns(), self.return_type))
    }

    /// Number of rows from the body offset on. Header rows embedded in
    /// the body are counted too.
    pub fn len(&self) -> usize {
        self.rows.len().saturating_sub(self.body_offset)
    }

    pub fn count(&self) -> usize {
        self.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Iterate the body rows
    pub fn iter(&self) -> impl Iterator<Item = Row<'d>> + '_ {
        (0..self.len()).filter_map(move |i| self.get(i))
    }

    // ----- cursor ---------------------------------------------------------

    pub fn rewind(&mut self) {
        self.position = 0;
    }

    pub fn next(&mut self) {
        self.position += 1;
    }

    pub fn previous(&mut self) {
        self.position -= 1;
    }

    /// Cursor position (negative after stepping back from the start)
    pub fn key(&self) -> isize {
        self.position
    }

    pub fn current(&self) -> Option<Row<'d>> {
        usize::try_from(self.position).ok().and_then(|i| self.get(i))
    }

    pub fn valid(&self) -> bool {
        usize::try_from(self.position).is_ok_and(|i| i < self.len())
    }
}
