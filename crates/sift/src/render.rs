//! HTML table rendering
//!
//! The write-side counterpart of [`Table`](crate::Table): turns records of
//! `(column, value)` pairs into `<table>` markup with a `thead` naming the
//! columns and one `tbody` row per record. The markup is built as a DOM
//! and serialized, so every value is escaped.

use std::sync::LazyLock;

use regex::Regex;

use crate::document::Document;
use crate::error::SiftResult;

/// Runs of spaces in a column name, replaced by `_` in its class
static SPACES: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(" +").expect("SPACES: hardcoded regex is valid"));

/// Records to `<table>` renderer
#[derive(Debug, Clone, Default)]
pub struct HtmlTable {
    records: Vec<Vec<(String, String)>>,
    columns: Vec<String>,
    class_name: Option<String>,
    label_name: Option<String>,
}

impl HtmlTable {
    /// Columns are taken from the first record, in its order
    pub fn from_records<R, K, V>(records: impl IntoIterator<Item = R>) -> Self
    where
        R: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        let records: Vec<Vec<(String, String)>> = records
            .into_iter()
            .map(|record| {
                record
                    .into_iter()
                    .map(|(k, v)| (k.into(), v.into()))
                    .collect()
            })
            .collect();
        let columns = records
            .first()
            .map(|first| first.iter().map(|(k, _)| k.clone()).collect())
            .unwrap_or_default();
        Self {
            records,
            columns,
            class_name: None,
            label_name: None,
        }
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    /// `class` attribute of the table element
    pub fn set_class_name(&mut self, name: impl Into<String>) {
        self.class_name = Some(name.into());
    }

    /// `id` attribute of the table element
    pub fn set_label_name(&mut self, name: impl Into<String>) {
        self.label_name = Some(name.into());
    }

    /// Drop a column from the output; false when there is no such column
    pub fn remove_column(&mut self, name: &str) -> bool {
        match self.columns.iter().position(|c| c == name) {
            Some(idx) => {
                self.columns.remove(idx);
                true
            }
            None => false,
        }
    }

    /// Render the table; empty when no columns are left
    pub fn render(&self) -> SiftResult<String> {
        if self.columns.is_empty() {
            return Ok(String::new());
        }
        let mut doc = Document::new();

        let table = doc.create_element("table")?;
        if let Some(class) = &self.class_name {
            doc.tree_mut().set_attribute(table, "class", class)?;
        }
        if let Some(id) = &self.label_name {
            doc.tree_mut().set_attribute(table, "id", id)?;
        }

        let thead = doc.create_element("thead")?;
        let head_row = doc.create_element("tr")?;
        for column in &self.columns {
            let th = doc.create_element("th")?;
            doc.tree_mut()
                .set_attribute(th, "class", &SPACES.replace_all(column, "_"))?;
            let text = doc.create_text_node(column);
            doc.insert_inside(text, th)?;
            doc.insert_inside(th, head_row)?;
        }
        doc.insert_inside(head_row, thead)?;
        doc.insert_inside(thead, table)?;

        let tbody = doc.create_element("tbody")?;
        for record in &self.records {
            let tr = doc.create_element("tr")?;
            for column in &self.columns {
                let td = doc.create_element("td")?;
                if let Some((_, value)) = record.iter().find(|(k, _)| k == column) {
                    let text = doc.create_text_node(value);
                    doc.insert_inside(text, td)?;
                }
                doc.insert_inside(td, tr)?;
            }
            doc.insert_inside(tr, tbody)?;
        }
        doc.insert_inside(tbody, table)?;

        Ok(doc.outer_content(table))
    }
}
