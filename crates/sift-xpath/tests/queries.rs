//! Query tests against parsed markup

use sift_html::{parse_html, parse_xml};
use sift_xpath::{Evaluator, Value, XPathError, evaluate};

const PAGE: &str = r#"<html><body>
<div id="main" class="box">
  <p>one</p>
  <p class="x">two</p>
  <!-- note -->
  <p>  three   words </p>
</div>
<a href="/a">A</a><a href="/b">B</a>
</body></html>"#;

fn texts(expr: &str) -> Vec<String> {
    let parsed = parse_html(PAGE);
    let eval = Evaluator::new(&parsed.tree);
    eval.select(&parsed.tree, expr, None, true)
        .unwrap()
        .into_iter()
        .map(|id| parsed.tree.text_content(id))
        .collect()
}

#[test]
fn test_descendant_and_position() {
    assert_eq!(texts("//p").len(), 3);
    assert_eq!(texts("//p[2]"), vec!["two"]);
    assert_eq!(texts("//p[last()]"), vec!["  three   words "]);
    assert_eq!(texts("//p[position() > 1]").len(), 2);
}

#[test]
fn test_attribute_predicates() {
    assert_eq!(texts("//p[@class='x']"), vec!["two"]);
    assert_eq!(texts("//p[not(@class)]").len(), 2);
    assert_eq!(texts("//a[@href!='/a']"), vec!["B"]);
}

#[test]
fn test_string_functions() {
    assert_eq!(texts("//p[contains(., 'hre')]").len(), 1);
    assert_eq!(texts("//p[starts-with(., 't')]"), vec!["two"]);
    assert_eq!(texts("//p[normalize-space() = 'three words']").len(), 1);
}

#[test]
fn test_union_is_document_ordered() {
    assert_eq!(texts("//a | //p[1]"), vec!["one", "A", "B"]);
}

#[test]
fn test_parent_and_siblings() {
    assert_eq!(texts("//p[@class]/following-sibling::p"), vec!["  three   words "]);
    assert_eq!(texts("//p[@class]/preceding-sibling::p"), vec!["one"]);
    assert_eq!(texts("//p[1]/../self::div/p").len(), 3);
}

#[test]
fn test_comment_and_text_tests() {
    let parsed = parse_html(PAGE);
    let value = evaluate(&parsed.tree, None, "count(//div/comment())").unwrap();
    assert_eq!(value, Value::Number(1.0));
    let value = evaluate(&parsed.tree, None, "string(//p[1]/text())").unwrap();
    assert_eq!(value, Value::String("one".into()));
}

#[test]
fn test_attribute_values() {
    let parsed = parse_html(PAGE);
    let value = evaluate(&parsed.tree, None, "//a/@href").unwrap();
    assert_eq!(value, Value::Attributes(vec!["/a".into(), "/b".into()]));
    let value = evaluate(&parsed.tree, None, "name(//div)").unwrap();
    assert_eq!(value, Value::String("div".into()));
}

#[test]
fn test_context_relative_query() {
    let parsed = parse_html(PAGE);
    let eval = Evaluator::new(&parsed.tree);
    let div = eval.select(&parsed.tree, "//div", None, true).unwrap()[0];
    let ps = eval.select(&parsed.tree, "p", Some(div), true).unwrap();
    assert_eq!(ps.len(), 3);
    let none = eval.select(&parsed.tree, "a", Some(div), true).unwrap();
    assert!(none.is_empty());
}

#[test]
fn test_namespaces() {
    let parsed = parse_xml(r#"<root xmlns:m="urn:m"><m:item>1</m:item><item>2</item></root>"#);
    let tree = &parsed.tree;
    let mut eval = Evaluator::new(tree);

    // unprefixed name tests only match elements in no namespace
    assert_eq!(eval.select(tree, "//item", None, true).unwrap().len(), 1);
    assert_eq!(eval.select(tree, "//*[local-name()='item']", None, true).unwrap().len(), 2);
    // in-scope declarations resolve when registration is on
    assert_eq!(eval.select(tree, "//m:item", None, true).unwrap().len(), 1);
    assert_eq!(
        eval.select(tree, "//m:item", None, false),
        Err(XPathError::UnboundPrefix("m".into()))
    );

    eval.register_namespace("q", "urn:m");
    assert_eq!(eval.select(tree, "//q:item", None, false).unwrap().len(), 1);
    assert_eq!(eval.select(tree, "//q:*", None, false).unwrap().len(), 1);
}

#[test]
fn test_default_namespace_needs_a_prefix() {
    let parsed = parse_xml(r#"<feed xmlns="urn:feed"><entry/><entry/></feed>"#);
    let tree = &parsed.tree;
    let mut eval = Evaluator::new(tree);

    assert!(eval.select(tree, "//entry", None, true).unwrap().is_empty());
    eval.register_namespace("f", "urn:feed");
    assert_eq!(eval.select(tree, "//f:entry", None, true).unwrap().len(), 2);
}

#[test]
fn test_xhtml_namespace_is_ignored() {
    let parsed = parse_html(
        r#"<html xmlns="http://www.w3.org/1999/xhtml"><body><p>x</p><svg><rect/></svg></body></html>"#,
    );
    let eval = Evaluator::new(&parsed.tree);
    assert_eq!(eval.select(&parsed.tree, "//p", None, true).unwrap().len(), 1);
    assert_eq!(eval.select(&parsed.tree, "//svg/rect", None, true).unwrap().len(), 1);
}

#[test]
fn test_errors() {
    let parsed = parse_html(PAGE);
    let eval = Evaluator::new(&parsed.tree);
    assert_eq!(eval.select(&parsed.tree, "", None, true), Err(XPathError::Empty));
    assert_eq!(eval.select(&parsed.tree, "   ", None, true), Err(XPathError::Empty));
    assert_eq!(
        eval.select(&parsed.tree, "count(//p)", None, true),
        Err(XPathError::NotANodeSet)
    );
    assert!(matches!(
        eval.select(&parsed.tree, "//p[", None, true),
        Err(XPathError::Parse(_))
    ));
    assert!(matches!(
        eval.select(&parsed.tree, "//p[frobnicate()]", None, true),
        Err(XPathError::Execution(_))
    ));
}
