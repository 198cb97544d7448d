//! sift HTML/XML loader
//!
//! Markup parsing built on html5ever (tolerant HTML5) and xml5ever (XML),
//! converted into the arena `DomTree`, plus serialization back to markup.

mod parser;
mod serializer;

pub use parser::{HtmlParser, Parsed, XmlParser};
pub use serializer::{HtmlSerializer, inner_html, outer_html};
pub use sift_dom::{DomTree, NodeId};

/// Parse an HTML string tolerantly
pub fn parse_html(html: &str) -> Parsed {
    HtmlParser::new().parse(html)
}

/// Parse an XML string, keeping any diagnostics
pub fn parse_xml(xml: &str) -> Parsed {
    XmlParser::new().parse(xml)
}

/// Markup loading errors
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ParseError {
    /// The parser reported diagnostics and strict loading was requested
    #[error("markup rejected with {} diagnostic(s): {}", .0.len(), .0.join("; "))]
    Rejected(Vec<String>),
}
