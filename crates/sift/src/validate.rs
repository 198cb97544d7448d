//! Document validators
//!
//! Validators are passed to [`Document::validate`], which collects their
//! diagnostics instead of failing.

use sift_html::XmlParser;

use crate::document::Document;

/// Pluggable document check
pub trait Validator {
    /// Short name used in logs
    fn name(&self) -> &str;

    /// Every problem found; empty when the document passes
    fn validate(&self, doc: &Document) -> Vec<String>;
}

/// The document must serialize to well-formed XML
#[derive(Debug, Clone, Copy, Default)]
pub struct WellFormed;

impl Validator for WellFormed {
    fn name(&self) -> &str {
        "well-formed"
    }

    fn validate(&self, doc: &Document) -> Vec<String> {
        if doc.tree().document_element().is_none() {
            return vec!["document has no root element".to_string()];
        }
        XmlParser::new().parse(&doc.save_xml()).errors
    }
}

/// Each query must match at least one node
#[derive(Debug, Clone, Default)]
pub struct RequireElements {
    queries: Vec<String>,
}

impl RequireElements {
    pub fn new<I, S>(queries: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            queries: queries.into_iter().map(Into::into).collect(),
        }
    }
}

impl Validator for RequireElements {
    fn name(&self) -> &str {
        "require-elements"
    }

    fn validate(&self, doc: &Document) -> Vec<String> {
        let mut errors = Vec::new();
        for query in &self.queries {
            match doc.query(query, None) {
                Ok(list) if list.is_empty() => errors.push(format!("nothing matches '{query}'")),
                Ok(_) => {}
                Err(err) => errors.push(err.to_string()),
            }
        }
        errors
    }
}
