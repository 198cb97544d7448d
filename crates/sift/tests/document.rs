//! Document tests
//!
//! Loading, querying, node lists, insertion, serialization and validation.

use sift::{
    Document, DocumentConfig, Inserted, InsertionMode, NewNode, Reference, RequireElements,
    SiftError, Value, WellFormed,
};

const PAGE: &str = r#"<html><body><div id="main"><p class="a">one</p><p>two</p><span>x</span></div><div id="side"><p>three</p><span>y</span></div><a href="/x">link</a></body></html>"#;

fn by_id(doc: &Document, id: &str) -> sift::NodeId {
    doc.first(&format!("//*[@id='{id}']"), None).unwrap().unwrap()
}

// ============================================================================
// QUERIES
// ============================================================================

#[test]
fn test_repeated_query_is_stable() {
    let doc = Document::from_html(PAGE);
    let first = doc.query("//p", None).unwrap();
    let second = doc.query("//p", None).unwrap();
    assert_eq!(first.len(), 3);
    assert_eq!(first, second);
    assert_eq!(first.query(), "//p");
    assert!(first.get(3).is_none());
}

#[test]
fn test_values() {
    let doc = Document::from_html(PAGE);
    assert_eq!(doc.values("//p", None).unwrap(), vec!["one", "two", "three"]);
    assert_eq!(doc.value("//a/@href", None).unwrap().as_deref(), Some("/x"));
    assert_eq!(doc.value("//a/@title", None).unwrap(), None);

    let side = by_id(&doc, "side");
    assert_eq!(doc.values("p", Some(side)).unwrap(), vec!["three"]);
}

#[test]
fn test_evaluate_scalars() {
    let doc = Document::from_html(PAGE);
    assert_eq!(doc.evaluate("count(//p)", None).unwrap(), Value::Number(3.0));
    assert_eq!(
        doc.evaluate("string(//div[2]/p)", None).unwrap(),
        Value::String("three".into())
    );
    assert!(matches!(
        doc.values("count(//p)", None),
        Err(SiftError::NoEvaluator { .. })
    ));
}

#[test]
fn test_malformed_query() {
    let doc = Document::from_html(PAGE);
    let err = doc.query("//p[", None).unwrap_err();
    assert!(matches!(err, SiftError::NoEvaluator { ref query, .. } if query == "//p["));
    assert!(doc.query("", None).is_err());
}

#[test]
fn test_node_list_iteration() {
    let doc = Document::from_html(PAGE);
    let list = doc.query("//span", None).unwrap();
    let texts: Vec<String> = list.iter().map(|node| doc.text(node)).collect();
    assert_eq!(texts, vec!["x", "y"]);
    let mut count = 0;
    for _node in &list {
        count += 1;
    }
    assert_eq!(count, list.count());
}

// ============================================================================
// REMOVAL
// ============================================================================

#[test]
fn test_remove_matches() {
    let mut doc = Document::from_html(PAGE);
    let mut list = doc.query("//p", None).unwrap();
    list.remove(&mut doc, None).unwrap();

    assert!(list.is_empty());
    assert_eq!(doc.query("//p", None).unwrap().len(), 0);
    assert_eq!(doc.query("//span", None).unwrap().len(), 2);
}

#[test]
fn test_remove_sub_query() {
    let mut doc = Document::from_html(PAGE);
    let mut divs = doc.query("//div", None).unwrap();
    divs.remove(&mut doc, Some("span")).unwrap();

    assert_eq!(divs.len(), 2);
    assert_eq!(doc.query("//span", None).unwrap().len(), 0);
    assert_eq!(doc.query("//p", None).unwrap().len(), 3);
}

// ============================================================================
// CREATION AND INSERTION
// ============================================================================

#[test]
fn test_create_element_names() {
    let mut doc = Document::from_html(PAGE);
    assert!(doc.create_element("item-list").is_ok());
    assert!(doc.create_element("ns:item").is_ok());
    assert!(matches!(doc.create_element("1st"), Err(SiftError::TypeMismatch(_))));
    assert!(doc.create_element("").is_err());
}

#[test]
fn test_create_node_with_markup() {
    let mut doc = Document::from_html(PAGE);
    let note = doc.create_node("note", Some("<b>bold</b>")).unwrap();
    assert_eq!(doc.inner_content(note, true), "<b>bold</b>");

    let plain = doc.create_node("note", Some("a < b")).unwrap();
    assert_eq!(doc.inner_content(plain, true), "a &lt; b");

    let empty = doc.create_node("note", None).unwrap();
    assert_eq!(doc.outer_content(empty), "<note></note>");
}

#[test]
fn test_add_child() {
    let mut doc = Document::from_html(PAGE);
    let side = by_id(&doc, "side");
    let inserted = doc
        .add_child("em", Some("new"), Reference::Node(side))
        .unwrap();
    let em = inserted.single().unwrap();
    assert_eq!(doc.tree().parent(em), Some(side));
    assert_eq!(doc.values("//div[@id='side']/em", None).unwrap(), vec!["new"]);
}

#[test]
fn test_add_node_before_and_after() {
    let mut doc = Document::from_html(PAGE);
    let main = by_id(&doc, "main");

    let before = doc.create_element("header").unwrap();
    let inserted = doc
        .add_node(NewNode::Node(before), Reference::Node(main), InsertionMode::Before)
        .unwrap();
    assert_eq!(inserted, Inserted::One(before));
    assert_eq!(doc.tree().next_sibling(before), Some(main));

    let after = doc
        .add_node(NewNode::Tag("hr"), Reference::Node(main), InsertionMode::After)
        .unwrap()
        .single()
        .unwrap();
    assert_eq!(doc.tree().prev_sibling(after), Some(main));
}

#[test]
fn test_add_node_to_every_match() {
    let mut doc = Document::from_html(PAGE);
    let inserted = doc
        .add_node(NewNode::Tag("hr"), Reference::Query("//div"), InsertionMode::After)
        .unwrap();

    assert_eq!(inserted.nodes().len(), 2);
    assert!(inserted.single().is_none());
    for &hr in inserted.nodes() {
        let prev = doc.tree().prev_sibling(hr).unwrap();
        assert_eq!(doc.tree().tag_name(prev), Some("div"));
    }
    assert_eq!(doc.query("//hr", None).unwrap().len(), 2);

    let spans = doc.query("//span", None).unwrap();
    let marked = doc
        .add_child("i", Some("!"), Reference::Nodes(&spans))
        .unwrap();
    assert_eq!(marked.nodes().len(), 2);
    assert_eq!(doc.values("//span/i", None).unwrap(), vec!["!", "!"]);
}

#[test]
fn test_add_foreign_node() {
    let other = Document::from_html("<em>hi <b>there</b></em>");
    let em = other.first("//em", None).unwrap().unwrap();

    let mut doc = Document::from_html(PAGE);
    let main = by_id(&doc, "main");
    let imported = doc
        .add_node(NewNode::Foreign(other.tree(), em), Reference::Node(main), InsertionMode::Inside)
        .unwrap()
        .single()
        .unwrap();

    assert_ne!(imported, em);
    assert_eq!(doc.tree().parent(imported), Some(main));
    assert_eq!(doc.text(imported), "hi there");
}

#[test]
fn test_insert_next_to_detached_node() {
    let mut doc = Document::from_html(PAGE);
    let loose = doc.create_element("loose").unwrap();
    let node = doc.create_element("node").unwrap();
    assert!(matches!(doc.insert_before(node, loose), Err(SiftError::Detached(id)) if id == loose));
    assert!(doc.insert_after(node, loose).is_err());
    assert!(doc.insert_inside(node, loose).is_ok());
}

// ============================================================================
// SERIALIZATION
// ============================================================================

#[test]
fn test_inner_content() {
    let doc = Document::from_html(PAGE);
    let main = by_id(&doc, "main");
    assert_eq!(
        doc.inner_content(main, true),
        r#"<p class="a">one</p><p>two</p><span>x</span>"#
    );
    assert_eq!(
        doc.inner_content(main, false),
        r#"<p class="a"></p><p></p><span></span>"#
    );
    assert!(doc.outer_content(main).starts_with(r#"<div id="main"><p"#));
}

#[test]
fn test_save_xml() {
    let mut doc = Document::new();
    doc.load("<root><item n=\"1\">a &amp; b</item></root>").unwrap();
    assert_eq!(
        doc.save_xml(),
        "<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n<root><item n=\"1\">a &amp; b</item></root>"
    );

    let config = DocumentConfig {
        encoding: "ISO-8859-1".into(),
        ..Default::default()
    };
    let doc = Document::with_config(config);
    assert!(doc.save_xml().contains("encoding=\"ISO-8859-1\""));
}

// ============================================================================
// LOADING
// ============================================================================

#[test]
fn test_failed_load_keeps_tree() {
    let mut doc = Document::from_html(PAGE);
    assert!(doc.load("<a><b></a>").is_err());
    assert_eq!(doc.query("//p", None).unwrap().len(), 3);

    doc.load("<root><item/><item/></root>").unwrap();
    assert_eq!(doc.query("//item", None).unwrap().len(), 2);
    assert_eq!(doc.query("//p", None).unwrap().len(), 0);
}

#[test]
fn test_reload_html() {
    let mut doc = Document::from_html(PAGE);
    doc.load_html("<ul><li>1</li><li>2</li></ul>");
    assert_eq!(doc.values("//li", None).unwrap(), vec!["1", "2"]);
    assert!(doc.first("//div", None).unwrap().is_none());
}

#[test]
fn test_namespaced_query() {
    let mut doc = Document::new();
    doc.load(r#"<r xmlns:m="urn:m"><m:item>1</m:item><item>2</item></r>"#)
        .unwrap();

    assert_eq!(doc.query_with("//m:item", None, true).unwrap().len(), 1);
    assert!(matches!(
        doc.query_with("//m:item", None, false),
        Err(SiftError::NoEvaluator { .. })
    ));

    doc.register_namespace("m", "urn:m");
    assert_eq!(doc.query_with("//m:item", None, false).unwrap().len(), 1);
    assert_eq!(doc.values("//m:item", None).unwrap(), vec!["1"]);
}

// ============================================================================
// VALIDATION
// ============================================================================

#[test]
fn test_validators() {
    let mut doc = Document::from_html(PAGE);
    assert!(doc.validate(&WellFormed));
    assert!(doc.validation_errors().is_empty());

    let require = RequireElements::new(["//table", "//p"]);
    assert!(!doc.validate(&require));
    assert_eq!(doc.validation_errors(), ["nothing matches '//table'"]);

    doc.clear_validation_errors();
    assert!(doc.validation_errors().is_empty());
}

#[test]
fn test_empty_document_is_not_well_formed() {
    let mut doc = Document::new();
    assert!(!doc.validate(&WellFormed));
    assert_eq!(doc.validation_errors(), ["document has no root element"]);
}
