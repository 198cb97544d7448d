//! Table extraction tests
//!
//! Header detection, header verification and row access.

use sift::{
    Cell, Column, Document, HeaderColumn, ReturnType, RowKey, SiftError, Table, TableOptions,
};

const FIXTURE: &str = r#"
<table>
  <tr>
    <td>d1</td>
    <td>d2</td>
    <td>d3</td>
  </tr>
  <tr>
    <td>d1-1</td>
    <td>d1-2</td>
    <td>d1-3</td>
  </tr>
  <tr>
    <td>d2-1</td>
    <td>d2-2</td>
  </tr>
</table>
"#;

fn fixture_headers() -> Vec<HeaderColumn> {
    vec![
        HeaderColumn::value(0, Some("head1"), "d1"),
        HeaderColumn::value(1, None, "d2"),
        HeaderColumn::value(2, Some("head3"), "d3"),
    ]
}

fn table_node(doc: &Document) -> sift::NodeId {
    doc.first("//table", None).unwrap().unwrap()
}

// ============================================================================
// HEADER DETECTION
// ============================================================================

#[test]
fn test_first_tbody_row_is_header() {
    let doc = Document::from_html(FIXTURE);
    let table = Table::new(&doc, table_node(&doc)).unwrap();

    assert_eq!(table.rows().len(), 3);
    assert_eq!(table.header_offset(), 0);
    assert_eq!(table.body_offset(), 1);
    assert_eq!(table.count(), 2);
    assert!(table.is_header(table.rows()[0]).unwrap());
    assert!(!table.is_header(table.rows()[1]).unwrap());
}

#[test]
fn test_direct_row_without_predecessor_is_header() {
    let mut doc = Document::new();
    doc.load("<table><tr><td>h</td></tr><tr><td>1</td></tr></table>")
        .unwrap();
    let table = Table::new(&doc, table_node(&doc)).unwrap();

    let parent = doc.tree().parent(table.rows()[0]).unwrap();
    assert_eq!(doc.tree().tag_name(parent), Some("table"));
    assert!(table.is_header(table.rows()[0]).unwrap());
    assert!(!table.is_header(table.rows()[1]).unwrap());
    assert_eq!(table.body_offset(), 1);
}

#[test]
fn test_head_group_without_body() {
    let doc = Document::from_html(
        "<table><thead><tr><th>a</th></tr><tr><th>b</th></tr><tr><th>c</th></tr></thead></table>",
    );
    let table = Table::new(&doc, table_node(&doc)).unwrap();

    let flags: Vec<bool> = table
        .rows()
        .iter()
        .map(|&row| table.is_header(row).unwrap())
        .collect();
    assert_eq!(flags, vec![false, false, true]);
    assert_eq!(table.header_offset(), 2);
    // no body row follows the header, so rows are numbered from the start
    assert_eq!(table.body_offset(), 0);
    assert_eq!(table.count(), 3);
}

#[test]
fn test_head_and_body_groups() {
    let doc = Document::from_html(
        "<table><thead><tr><th>h</th></tr></thead>\
         <tbody><tr><td>1</td></tr><tr><td>2</td></tr></tbody></table>",
    );
    let table = Table::new(&doc, table_node(&doc)).unwrap();

    assert_eq!(table.header_offset(), 0);
    assert_eq!(table.body_offset(), 1);
    assert_eq!(table.count(), 2);
    // a tbody after a thead never starts with a header
    assert!(!table.is_header(table.rows()[1]).unwrap());
    assert_eq!(table.get(0).unwrap().text(0).as_deref(), Some("1"));
}

#[test]
fn test_iterate_all_rows() {
    let doc = Document::from_html(FIXTURE);
    let mut table = Table::new(&doc, table_node(&doc)).unwrap();

    assert!(!table.set_iterate_all_rows(true).unwrap());
    assert_eq!(table.body_offset(), 0);
    assert_eq!(table.count(), 3);
    assert_eq!(table.get(0).unwrap().text(0).as_deref(), Some("d1"));

    assert!(table.set_iterate_all_rows(false).unwrap());
    assert_eq!(table.body_offset(), 1);

    let options = TableOptions { iterate_all_rows: true, ..Default::default() };
    let table = Table::with_options(&doc, table_node(&doc), options).unwrap();
    assert_eq!(table.count(), 3);
}

// ============================================================================
// HEADER VERIFICATION
// ============================================================================

#[test]
fn test_headers_verify() {
    let doc = Document::from_html(FIXTURE);
    let table = Table::with_headers(&doc, table_node(&doc), fixture_headers()).unwrap();
    assert_eq!(table.headers().len(), 3);

    let pattern = vec![HeaderColumn::pattern(2, None, r"^d\d$").unwrap()];
    assert!(Table::with_headers(&doc, table_node(&doc), pattern).is_ok());
}

#[test]
fn test_header_mismatch_names_both_texts() {
    let doc = Document::from_html(FIXTURE);
    let headers = vec![HeaderColumn::value(1, None, "Price")];
    let err = Table::with_headers(&doc, table_node(&doc), headers).unwrap_err();
    match err {
        SiftError::HeaderMismatch { expected, actual } => {
            assert_eq!(expected, "Price");
            assert_eq!(actual, "d2");
        }
        other => panic!("unexpected error: {other}"),
    }

    let headers = vec![HeaderColumn::pattern(0, None, "^x").unwrap()];
    assert!(matches!(
        Table::with_headers(&doc, table_node(&doc), headers),
        Err(SiftError::HeaderPatternMismatch { .. })
    ));
}

#[test]
fn test_validate_without_headers() {
    let doc = Document::from_html(FIXTURE);
    let table = Table::new(&doc, table_node(&doc)).unwrap();
    assert!(matches!(table.validate_headers(), Err(SiftError::NoHeaders)));
}

#[test]
fn test_headers_loaded_without_validation() {
    let doc = Document::from_html(FIXTURE);
    let mut table = Table::new(&doc, table_node(&doc)).unwrap();
    let headers = vec![HeaderColumn::value(0, Some("first"), "wrong")];
    table.set_headers(headers, false).unwrap();
    assert_eq!(table.get(0).unwrap().text("first").as_deref(), Some("d1-1"));
    assert!(table.validate_headers().is_err());
}

// ============================================================================
// ROW ACCESS
// ============================================================================

#[test]
fn test_body_rows_by_alias() {
    let doc = Document::from_html(FIXTURE);
    let table = Table::with_headers(&doc, table_node(&doc), fixture_headers()).unwrap();

    let first = table.get(0).unwrap();
    let texts: Vec<String> = (0..3).filter_map(|i| first.text(i)).collect();
    assert_eq!(texts, vec!["d1-1", "d1-2", "d1-3"]);
    assert_eq!(first.text("head1").as_deref(), Some("d1-1"));
    assert_eq!(first.text("head3").as_deref(), Some("d1-3"));
    assert!(first.is_valid_length());

    let second = table.get(1).unwrap();
    assert!(!second.is_valid_length());
    assert_eq!(second.count(), 2);

    assert!(table.get(2).is_none());
    assert!(table.get(100).is_none());
}

#[test]
fn test_get_past_any_row_index() {
    let doc = Document::from_html(FIXTURE);
    // the header row shifts body indexes by one
    let table = Table::with_headers(&doc, table_node(&doc), fixture_headers()).unwrap();
    assert!(table.get(usize::MAX).is_none());
    assert!(table.get(usize::MAX - 1).is_none());

    let all = Table::new(&doc, table_node(&doc)).unwrap();
    assert!(all.get(usize::MAX).is_none());
}

#[test]
fn test_return_type_is_handed_to_rows() {
    let doc = Document::from_html(FIXTURE);
    let mut table = Table::new(&doc, table_node(&doc)).unwrap();

    let cell = table.get(0).unwrap().get(0).unwrap();
    let node = cell.as_node().unwrap();
    assert_eq!(doc.tree().tag_name(node), Some("td"));

    assert_eq!(table.set_return_type(ReturnType::Text), ReturnType::Node);
    assert_eq!(table.get(0).unwrap().get(0), Some(Cell::Text("d1-1".into())));
}

#[test]
fn test_iteration_and_cursor() {
    let doc = Document::from_html(FIXTURE);
    let mut table = Table::new(&doc, table_node(&doc)).unwrap();

    let firsts: Vec<String> = table.iter().filter_map(|row| row.text(0)).collect();
    assert_eq!(firsts, vec!["d1-1", "d2-1"]);

    assert!(table.valid());
    table.next();
    assert_eq!(table.key(), 1);
    assert_eq!(table.current().unwrap().text(0).as_deref(), Some("d2-1"));
    table.next();
    assert!(!table.valid());
    assert!(table.current().is_none());

    table.previous();
    table.previous();
    assert!(table.valid());
    table.previous();
    assert_eq!(table.key(), -1);
    assert!(!table.valid());

    table.rewind();
    assert_eq!(table.current().unwrap().node(), table.rows()[1]);
}

#[test]
fn test_rows_share_table_columns() {
    let doc = Document::from_html(FIXTURE);
    let table = Table::with_headers(&doc, table_node(&doc), fixture_headers()).unwrap();
    let row = table.get(0).unwrap();
    assert_eq!(
        row.columns(),
        [Column::aliased(0, "head1"), Column::new(1), Column::aliased(2, "head3")]
    );
    assert_eq!(row.key(), RowKey::Alias("head1".into()));
}

// ============================================================================
// CONSTRUCTION ERRORS
// ============================================================================

#[test]
fn test_construction_errors() {
    let doc = Document::from_html(FIXTURE);
    let tr = doc.first("//tr", None).unwrap().unwrap();
    let td = doc.first("//td", None).unwrap().unwrap();

    assert!(matches!(Table::new(&doc, tr), Err(SiftError::NotATable(name)) if name == "tr"));

    let table = Table::new(&doc, table_node(&doc)).unwrap();
    assert!(matches!(table.is_header(td), Err(SiftError::NotARow(name)) if name == "td"));

    assert!(matches!(
        Table::from_query(&doc, "//table[@id='missing']", None, None),
        Err(SiftError::NoMatch(query)) if query == "//table[@id='missing']"
    ));
    assert!(Table::from_query(&doc, "//table", None, Some(fixture_headers())).is_ok());
}
