//! Integration tests for flow rendering.

use restitch::render::{to_document_html, to_page_html};
use restitch::{Document, Fragment, FragmentKind, PageContent, Region, RenderOptions};

#[test]
fn newline_count_round_trips_to_breaks() {
    // A text fragment with n embedded line breaks renders exactly n explicit
    // breaks; newlines are never collapsed into spaces.
    for n in 0..6 {
        let text = (0..=n)
            .map(|i| format!("line {}", i))
            .collect::<Vec<_>>()
            .join("\n");
        let page = PageContent::new(1, vec![Fragment::paragraph(text)]);
        let html = to_page_html(&page, &RenderOptions::new().with_styles(false)).unwrap();
        assert_eq!(html.matches("<br>").count(), n, "n = {}", n);
    }
}

#[test]
fn header_text_keeps_embedded_breaks() {
    let page = PageContent::new(
        1,
        vec![Fragment::header(
            "Pacer Energy Marketing, LLC\nDivision Order Title Opinion",
            1,
        )],
    );
    let html = to_page_html(&page, &RenderOptions::new().with_styles(false)).unwrap();
    assert_eq!(html.matches("<br>").count(), 1);
}

#[test]
fn reading_flow_follows_order_then_position() {
    let page = PageContent::new(
        1,
        vec![
            Fragment::paragraph("bottom of column")
                .with_order(3)
                .with_position(Region::new(5.0, 80.0, 45.0, 90.0)),
            Fragment::paragraph("top of page")
                .with_order(1)
                .with_position(Region::new(5.0, 5.0, 95.0, 10.0)),
            Fragment::paragraph("middle")
                .with_order(2)
                .with_position(Region::new(5.0, 40.0, 95.0, 50.0)),
        ],
    );

    let html = to_page_html(&page, &RenderOptions::default()).unwrap();
    let top = html.find("top of page").unwrap();
    let middle = html.find("middle").unwrap();
    let bottom = html.find("bottom of column").unwrap();
    assert!(top < middle && middle < bottom);
}

#[test]
fn missing_order_hints_fall_back_to_position() {
    let page = PageContent::new(
        1,
        vec![
            Fragment::paragraph("lower").with_position(Region::new(5.0, 60.0, 95.0, 70.0)),
            Fragment::paragraph("upper").with_position(Region::new(5.0, 10.0, 95.0, 20.0)),
        ],
    );

    let html = to_page_html(&page, &RenderOptions::default()).unwrap();
    assert!(html.find("upper").unwrap() < html.find("lower").unwrap());
}

#[test]
fn images_never_fabricated() {
    let mut unresolved = Fragment::new(FragmentKind::Image, "");
    unresolved.metadata.description = Some("Survey plat of section 24".to_string());

    let mut resolved = Fragment::new(FragmentKind::Image, "");
    resolved.image_path = Some("images/plat.png".into());
    resolved.metadata.description = Some("Survey plat".to_string());

    let page = PageContent::new(1, vec![unresolved, resolved]);
    let html = to_page_html(&page, &RenderOptions::new().with_styles(false)).unwrap();

    // One placeholder with the description, one embedded reference
    assert_eq!(html.matches("image-placeholder").count(), 1);
    assert_eq!(html.matches("<img src=").count(), 1);
    assert!(html.contains("Survey plat of section 24"));
}

#[test]
fn table_caption_rendered_in_container() {
    let mut table = Fragment::table("<table><tbody><tr><td>x</td></tr></tbody></table>");
    table.metadata.caption = Some("Tract ownership".to_string());

    let page = PageContent::new(1, vec![table]);
    let html = to_page_html(&page, &RenderOptions::default()).unwrap();
    let caption = html.find("Tract ownership").unwrap();
    let table_start = html.find("<table>").unwrap();
    assert!(caption < table_start);
}

#[test]
fn document_renders_every_page_in_order() {
    let doc = Document::new(vec![
        PageContent::new(1, vec![Fragment::paragraph("alpha")]),
        PageContent::new(2, vec![Fragment::paragraph("beta")]),
        PageContent::new(3, vec![Fragment::paragraph("gamma")]),
    ]);

    let html = to_document_html(&doc, &RenderOptions::default()).unwrap();
    let a = html.find("alpha").unwrap();
    let b = html.find("beta").unwrap();
    let g = html.find("gamma").unwrap();
    assert!(a < b && b < g);
    assert_eq!(html.matches("class=\"page\"").count(), 3);
}

#[test]
fn empty_error_page_still_renders() {
    let doc = Document::new(vec![
        PageContent::new(1, vec![Fragment::paragraph("content")]),
        PageContent::failed(2, "payload unparseable"),
    ]);

    let html = to_document_html(&doc, &RenderOptions::default()).unwrap();
    assert_eq!(html.matches("class=\"page\"").count(), 2);
}

#[test]
fn lists_split_into_items() {
    let mut list = Fragment::new(
        FragmentKind::List,
        "1/8th royalty interest\nworking interest\noverriding royalty",
    );
    list.metadata.list_ordered = true;

    let page = PageContent::new(1, vec![list]);
    let html = to_page_html(&page, &RenderOptions::default()).unwrap();
    assert!(html.contains("<ol>"));
    assert_eq!(html.matches("<li>").count(), 3);
}
