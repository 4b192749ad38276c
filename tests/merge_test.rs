//! Integration tests for cross-page continuation merging.

use restitch::{
    markup, merge_pages, CrossPageMerger, Fragment, FragmentId, FragmentKind, PageContent,
};

fn table_rows(n: usize, offset: usize) -> String {
    (0..n)
        .map(|i| format!("<tr><td>row {}</td></tr>", offset + i))
        .collect::<Vec<_>>()
        .join("")
}

#[test]
fn table_spanning_two_pages_merges_all_rows() {
    // Page 1 carries the header row and 3 data rows and is flagged as
    // continuing; page 2 contributes 5 more rows. The merged table holds the
    // header row plus all rows from both pages, and the continuation flag
    // clears because page 2 does not itself continue.
    let mut head = Fragment::table(format!(
        "<table><thead><tr><th>OWNERS</th></tr></thead><tbody>{}</tbody></table>",
        table_rows(3, 1)
    ))
    .with_id("ownership_table");
    head.metadata.row_count = Some(3);
    head.continues_next_page = true;

    let mut tail = Fragment::table(format!(
        "<table><tbody>{}</tbody></table>",
        table_rows(5, 4)
    ));
    tail.continuation = true;
    tail.continues_from = Some(FragmentId::new("ownership_table"));
    tail.metadata.row_count = Some(5);

    let view = merge_pages(&[
        PageContent::new(1, vec![head]),
        PageContent::new(2, vec![tail]),
    ]);

    assert_eq!(view.len(), 1);
    let merged = &view.items[0];

    // Header row + 3 + 5 data rows
    assert_eq!(markup::count_rows(&merged.content), 9);
    assert!(merged.content.contains("<th>OWNERS</th>"));
    assert!(merged.content.contains("row 1"));
    assert!(merged.content.contains("row 8"));
    assert_eq!(merged.metadata.row_count, Some(8));
    assert!(!merged.continues_next_page);
    assert_eq!(merged.pages, vec![1, 2]);
}

#[test]
fn continuation_rows_spliced_before_closing_group() {
    let mut head =
        Fragment::table("<table><tbody><tr><td>first</td></tr></tbody></table>").with_id("t");
    head.continues_next_page = true;
    let mut tail = Fragment::table("<table><tbody><tr><td>second</td></tr></tbody></table>");
    tail.continuation = true;
    tail.continues_from = Some(FragmentId::new("t"));

    let view = merge_pages(&[
        PageContent::new(1, vec![head]),
        PageContent::new(2, vec![tail]),
    ]);

    let content = &view.items[0].content;
    let second = content.find("second").unwrap();
    let tbody_close = content.find("</tbody>").unwrap();
    assert!(second < tbody_close);
    assert_eq!(content.matches("<table").count(), 1);
    assert_eq!(content.matches("</table>").count(), 1);
}

#[test]
fn paragraph_and_list_continuations_concatenate_with_space() {
    let mut para = Fragment::paragraph("The working interest is").with_id("p");
    para.continues_next_page = true;
    let mut para_tail = Fragment::paragraph("subject to the terms below.");
    para_tail.continuation = true;
    para_tail.continues_from = Some(FragmentId::new("p"));

    let mut list = Fragment::new(FragmentKind::List, "first tract\nsecond tract").with_id("l");
    list.continues_next_page = true;
    let mut list_tail = Fragment::new(FragmentKind::List, "third tract");
    list_tail.continuation = true;
    list_tail.continues_from = Some(FragmentId::new("l"));

    let view = merge_pages(&[
        PageContent::new(1, vec![para, list]),
        PageContent::new(2, vec![para_tail, list_tail]),
    ]);

    assert_eq!(view.len(), 2);
    assert_eq!(
        view.items[0].content,
        "The working interest is subject to the terms below."
    );
    assert_eq!(view.items[1].content, "first tract\nsecond tract third tract");
}

#[test]
fn unknown_parent_is_demoted_never_dropped() {
    let mut orphan = Fragment::paragraph("tail without a head");
    orphan.continuation = true;
    orphan.continues_from = Some(FragmentId::new("id_mismatch"));

    let view = merge_pages(&[
        PageContent::new(1, vec![Fragment::paragraph("unrelated")]),
        PageContent::new(2, vec![orphan]),
    ]);

    assert_eq!(view.len(), 2);
    assert_eq!(view.items[1].content, "tail without a head");
}

#[test]
fn demoted_orphan_can_parent_later_continuations() {
    let mut orphan = Fragment::paragraph("recovered head").with_id("o");
    orphan.continuation = true;
    orphan.continues_from = Some(FragmentId::new("missing"));

    let mut tail = Fragment::paragraph("and its tail");
    tail.continuation = true;
    tail.continues_from = Some(FragmentId::new("o"));

    let view = merge_pages(&[
        PageContent::new(1, vec![orphan]),
        PageContent::new(2, vec![tail]),
    ]);

    assert_eq!(view.len(), 1);
    assert_eq!(view.items[0].content, "recovered head and its tail");
}

#[test]
fn merged_view_does_not_replace_per_page_lists() {
    let mut head = Fragment::paragraph("head").with_id("p");
    head.continues_next_page = true;
    let mut tail = Fragment::paragraph("tail");
    tail.continuation = true;
    tail.continues_from = Some(FragmentId::new("p"));

    let pages = vec![
        PageContent::new(1, vec![head]),
        PageContent::new(2, vec![tail]),
    ];
    let view = CrossPageMerger::new().merge(&pages);

    // The per-page fragments are untouched by the merge
    assert_eq!(pages[0].fragments[0].content, "head");
    assert_eq!(pages[1].fragments[0].content, "tail");
    assert_eq!(view.items[0].content, "head tail");
}

#[test]
fn item_lookup_by_identifier() {
    let view = merge_pages(&[PageContent::new(
        1,
        vec![
            Fragment::paragraph("first").with_id("a"),
            Fragment::paragraph("second").with_id("b"),
        ],
    )]);

    assert_eq!(view.get(&FragmentId::new("b")).unwrap().content, "second");
    assert_eq!(view.index.len(), 2);
    assert_eq!(view.total_pages, 1);
}
