use sri_inventory::html::{Document, Selector, parse_fragment_elements};

#[test]
fn fragment_elements_serialize_with_their_children() {
    let elements = parse_fragment_elements("<p>one</p>\n<span><b>x</b></span>");
    let html: Vec<String> = elements
        .iter()
        .map(|element| element.outer_html().expect("serialize"))
        .collect();
    assert_eq!(html, vec!["<p>one</p>", "<span><b>x</b></span>"]);
}

#[test]
fn fragment_elements_outlive_the_parse() {
    let scripts = {
        let elements = parse_fragment_elements(
            r#"<head><link rel="preload" href="/a.js"></head><div><script src="b.js"></script><script src="c.js"></script></div>"#,
        );
        elements
            .into_iter()
            .flat_map(|element| element.select(&Selector::parse("script").expect("selector")))
            .collect::<Vec<_>>()
    };
    let srcs: Vec<Option<String>> = scripts.iter().map(|script| script.attr("src")).collect();
    assert_eq!(srcs, vec![Some("b.js".to_string()), Some("c.js".to_string())]);
}

#[test]
fn fragment_and_document_agree_on_nested_markup() {
    let markup = "<span><b>x</b><i>y</i></span>";
    let fragment = parse_fragment_elements(markup);
    let document = Document::parse(markup).expect("parse");
    let from_document = document.select(&Selector::parse("span").expect("selector")).remove(0);
    assert_eq!(
        fragment[0].outer_html().expect("serialize"),
        from_document.outer_html().expect("serialize")
    );
}
