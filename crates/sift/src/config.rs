//! Document and table configuration

use serde::Deserialize;

use crate::row::ReturnType;

/// Document configuration options
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct DocumentConfig {
    /// Encoding named in the XML declaration of saved documents
    pub encoding: String,

    /// Resolve prefixes declared in scope at the query context by default
    pub register_namespaces: bool,

    /// Keep whitespace-only text nodes when loading markup
    pub keep_whitespace_text: bool,

    /// Log HTML parse warnings at trace level instead of warn
    pub suppress_html_warnings: bool,
}

impl Default for DocumentConfig {
    fn default() -> Self {
        Self {
            encoding: "UTF-8".to_string(),
            register_namespaces: true,
            keep_whitespace_text: true,
            suppress_html_warnings: true,
        }
    }
}

/// Options a table is constructed with
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(default)]
pub struct TableOptions {
    /// What rows hand out for cells
    pub return_type: ReturnType,

    /// Treat every row as a body row, bypassing header detection
    pub iterate_all_rows: bool,
}
