//! Column descriptors
//!
//! Rows address cells through [`Column`]s (offset plus optional alias).
//! Tables additionally verify their header row against [`HeaderColumn`]s,
//! which carry the expected header text or a pattern. Loosely typed
//! descriptors (from JSON or other config) arrive as [`RawColumn`] and are
//! checked on conversion.

use regex::Regex;
use serde::Deserialize;

use crate::error::{SiftError, SiftResult};

/// Cell position within a row, optionally named
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Column {
    /// Zero-based cell position
    pub offset: usize,
    pub alias: Option<String>,
}

impl Column {
    pub fn new(offset: usize) -> Self {
        Self { offset, alias: None }
    }

    pub fn aliased(offset: usize, alias: impl Into<String>) -> Self {
        Self { offset, alias: Some(alias.into()) }
    }
}

/// What a header cell must contain
#[derive(Debug, Clone)]
pub enum Expect {
    /// Exact text
    Value(String),
    /// Regular expression searched for in the text
    Pattern(Regex),
}

impl Expect {
    pub fn matches(&self, text: &str) -> bool {
        match self {
            Expect::Value(value) => value == text,
            Expect::Pattern(pattern) => pattern.is_match(text),
        }
    }
}

/// Header column: a [`Column`] plus the header text expected at it
#[derive(Debug, Clone)]
pub struct HeaderColumn {
    pub offset: usize,
    pub alias: Option<String>,
    pub expect: Expect,
}

impl HeaderColumn {
    /// Header whose cell text must equal `value`
    pub fn value(offset: usize, alias: Option<&str>, value: impl Into<String>) -> Self {
        Self {
            offset,
            alias: alias.map(str::to_string),
            expect: Expect::Value(value.into()),
        }
    }

    /// Header whose cell text must match `pattern`
    pub fn pattern(offset: usize, alias: Option<&str>, pattern: &str) -> SiftResult<Self> {
        Ok(Self {
            offset,
            alias: alias.map(str::to_string),
            expect: Expect::Pattern(Regex::new(pattern)?),
        })
    }

    /// The addressing part of this header
    pub fn column(&self) -> Column {
        Column {
            offset: self.offset,
            alias: self.alias.clone(),
        }
    }
}

/// Unchecked descriptor as found in configuration
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawColumn {
    pub offset: Option<usize>,
    pub alias: Option<String>,
    pub value: Option<String>,
    #[serde(alias = "regex")]
    pub pattern: Option<String>,
}

impl RawColumn {
    /// Check the descriptor found at `index` as a row column
    pub fn into_column(self, index: usize) -> SiftResult<Column> {
        let offset = self.offset.ok_or(SiftError::MissingOffset { index })?;
        Ok(Column {
            offset,
            alias: non_empty(self.alias),
        })
    }

    /// Check the descriptor found at `index` as a header column.
    /// A pattern wins over a value when both are present.
    pub fn into_header(self, index: usize) -> SiftResult<HeaderColumn> {
        let offset = self.offset.ok_or(SiftError::MissingOffset { index })?;
        let expect = match (non_empty(self.pattern), non_empty(self.value)) {
            (Some(pattern), _) => Expect::Pattern(Regex::new(&pattern)?),
            (None, Some(value)) => Expect::Value(value),
            (None, None) => return Err(SiftError::MissingExpectation { index }),
        };
        Ok(HeaderColumn {
            offset,
            alias: non_empty(self.alias),
            expect,
        })
    }
}

fn non_empty(s: Option<String>) -> Option<String> {
    s.filter(|s| !s.is_empty())
}

/// Convert a list of raw descriptors into row columns
pub fn row_columns(raw: Vec<RawColumn>) -> SiftResult<Vec<Column>> {
    raw.into_iter()
        .enumerate()
        .map(|(index, column)| column.into_column(index))
        .collect()
}

/// Convert a list of raw descriptors into header columns
pub fn header_columns(raw: Vec<RawColumn>) -> SiftResult<Vec<HeaderColumn>> {
    raw.into_iter()
        .enumerate()
        .map(|(index, column)| column.into_header(index))
        .collect()
}
