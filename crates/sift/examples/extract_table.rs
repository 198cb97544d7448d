//! Example: pull the rows out of an HTML table
//!
//! Run with `RUST_LOG=sift=debug` to see header detection.

use anyhow::Context;
use sift::{Document, HeaderColumn, ReturnType, Table};
use tracing_subscriber::EnvFilter;

const PAGE: &str = r#"
<table id="prices">
  <thead>
    <tr><th>Item</th><th>Unit price</th><th>Stock</th></tr>
  </thead>
  <tbody>
    <tr><td>Bolt</td><td>0.10</td><td>1200</td></tr>
    <tr><td>Nut</td><td>0.05</td><td>800</td></tr>
    <tr><td>Washer</td><td>0.02</td></tr>
  </tbody>
</table>
"#;

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let doc = Document::from_html(PAGE);
    let headers = vec![
        HeaderColumn::value(0, Some("item"), "Item"),
        HeaderColumn::pattern(1, Some("price"), r"(?i)price")?,
        HeaderColumn::value(2, Some("stock"), "Stock"),
    ];
    let mut table = Table::from_query(&doc, "//table[@id='prices']", None, Some(headers))
        .context("price table not found")?;
    table.set_return_type(ReturnType::Text);

    println!("sift v{}: {} row(s)", sift::VERSION, table.count());
    for row in table.iter() {
        let cells: Vec<String> = row
            .iter()
            .map(|(key, cell)| format!("{key}={}", cell.as_text().unwrap_or_default()))
            .collect();
        let marker = if row.is_valid_length() { "" } else { " (short row)" };
        println!("  {}{}", cells.join(", "), marker);
    }

    Ok(())
}
