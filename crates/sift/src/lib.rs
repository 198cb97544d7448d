//! sift
//!
//! Load HTML or XML into an arena DOM, query it with XPath and pull
//! structured data out of HTML tables.
//!
//! # Example
//! ```rust,ignore
//! use sift::{Document, HeaderColumn, Table};
//!
//! let doc = Document::from_html(html);
//! let headers = vec![HeaderColumn::value(0, Some("name"), "Name")];
//! let table = Table::from_query(&doc, "//table", None, Some(headers))?;
//! for row in table.iter() {
//!     println!("{:?}", row.text("name"));
//! }
//! ```

mod columns;
mod config;
mod document;
mod error;
mod node_list;
mod render;
mod row;
mod table;
mod validate;

pub use columns::{Column, Expect, HeaderColumn, RawColumn, header_columns, row_columns};
pub use config::{DocumentConfig, TableOptions};
pub use document::{Document, InsertionMode, Inserted, NewNode, Reference};
pub use error::{SiftError, SiftResult};
pub use node_list::NodeList;
pub use render::HtmlTable;
pub use row::{Cell, CellKey, Cells, ReturnType, Row, RowKey};
pub use table::Table;
pub use validate::{RequireElements, Validator, WellFormed};

// Re-export sub-crates for advanced usage
pub use sift_dom as dom;
pub use sift_html as html;
pub use sift_xpath as xpath;

pub use sift_dom::{DomTree, NodeId};
pub use sift_xpath::Value;

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
