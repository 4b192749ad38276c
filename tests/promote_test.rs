//! Integration tests for key-value record promotion.

use restitch::{markup, Fragment, FragmentKind, KeyValuePromoter, PromoteOptions};

#[test]
fn two_records_promote_to_two_row_table() {
    // "Name: A / Age: 1" twice becomes a table with headers [Name, Age]
    // and one data row per record.
    let promoter = KeyValuePromoter::new();
    let fragment = Fragment::paragraph("Name: A\nAge: 1\n\nName: B\nAge: 2");

    let promoted = promoter.promote_fragment(&fragment);
    assert_eq!(promoted.kind, FragmentKind::Table);
    assert_eq!(
        promoted.metadata.headers.as_deref(),
        Some(&["Name".to_string(), "Age".to_string()][..])
    );
    assert_eq!(promoted.metadata.row_count, Some(2));

    // Header row + 2 data rows
    assert_eq!(markup::count_rows(&promoted.content), 3);
    assert!(promoted.content.contains("<th>Name</th><th>Age</th>"));
    assert!(promoted.content.contains("<td>A</td><td>1</td>"));
    assert!(promoted.content.contains("<td>B</td><td>2</td>"));
}

#[test]
fn single_record_never_promoted() {
    let promoter = KeyValuePromoter::new();
    let fragment = Fragment::paragraph("Name: A\nAge: 1\nPhone: 555");

    let unchanged = promoter.promote_fragment(&fragment);
    assert_eq!(unchanged, fragment);
}

#[test]
fn inconsistent_key_sets_never_promoted() {
    let promoter = KeyValuePromoter::new();
    let fragment = Fragment::paragraph(
        "Name: John Smith\nAge: 35\n\nProduct: Laptop\nPrice: $999",
    );

    let unchanged = promoter.promote_fragment(&fragment);
    assert_eq!(unchanged, fragment);
}

#[test]
fn key_order_must_match_across_records() {
    let promoter = KeyValuePromoter::new();
    let fragment = Fragment::paragraph("Name: A\nAge: 1\n\nAge: 2\nName: B");

    let unchanged = promoter.promote_fragment(&fragment);
    assert_eq!(unchanged.kind, FragmentKind::Paragraph);
}

#[test]
fn promotion_soundness_over_record_counts() {
    // k records with an identical ordered key set of size >= 2 always
    // promote to a table with k data rows and that exact header row.
    let promoter = KeyValuePromoter::new();

    for k in 2..=5 {
        let text = (0..k)
            .map(|i| format!("Owner: Person {i}\nAcres: {}\nLease: L{i}", 10 * i))
            .collect::<Vec<_>>()
            .join("\n\n");
        let promoted = promoter.promote_fragment(&Fragment::paragraph(text));

        assert_eq!(promoted.kind, FragmentKind::Table, "k = {k}");
        assert_eq!(promoted.metadata.row_count, Some(k));
        assert_eq!(
            promoted.metadata.headers.as_deref(),
            Some(&["Owner".to_string(), "Acres".to_string(), "Lease".to_string()][..])
        );
        assert_eq!(markup::count_rows(&promoted.content), k + 1);
    }
}

#[test]
fn repeated_first_key_splits_without_blank_lines() {
    let promoter = KeyValuePromoter::new();
    let fragment = Fragment::paragraph(
        "Product: Laptop\nPrice: $999\nStock: 15\n\
         Product: Mouse\nPrice: $25\nStock: 150\n\
         Product: Keyboard\nPrice: $79\nStock: 80",
    );

    let promoted = promoter.promote_fragment(&fragment);
    assert_eq!(promoted.kind, FragmentKind::Table);
    assert_eq!(promoted.metadata.row_count, Some(3));
}

#[test]
fn equals_separator_accepted() {
    let promoter = KeyValuePromoter::new();
    let fragment = Fragment::paragraph("Tract = NW/4\nAcres = 160\n\nTract = SE/4\nAcres = 40");

    let promoted = promoter.promote_fragment(&fragment);
    assert_eq!(promoted.kind, FragmentKind::Table);
    assert!(promoted.content.contains("<th>Tract</th>"));
}

#[test]
fn custom_min_records_raises_the_bar() {
    let promoter =
        KeyValuePromoter::with_options(PromoteOptions::new().with_min_records(3));
    let fragment = Fragment::paragraph("Name: A\nAge: 1\n\nName: B\nAge: 2");

    let unchanged = promoter.promote_fragment(&fragment);
    assert_eq!(unchanged.kind, FragmentKind::Paragraph);
}

#[test]
fn promotion_is_auditable_and_reversible() {
    let promoter = KeyValuePromoter::new();
    let text = "Name: A\nAge: 1\n\nName: B\nAge: 2";
    let promoted = promoter.promote_fragment(&Fragment::paragraph(text));

    assert!(promoted.metadata.converted_from_kv);
    assert_eq!(promoted.metadata.original_text.as_deref(), Some(text));
}

#[test]
fn promoted_table_is_not_repromoted() {
    let promoter = KeyValuePromoter::new();
    let once = promoter.promote_fragment(&Fragment::paragraph(
        "Name: A\nAge: 1\n\nName: B\nAge: 2",
    ));
    let twice = promoter.promote_fragment(&once);
    assert_eq!(once, twice);
}
