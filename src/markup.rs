//! Table-markup surgery shared by the fixer, promoter, and merger.
//!
//! All splicing operates on serialized table markup with explicit row/column
//! grouping (`<table>`, `<thead>`, `<tbody>`, `<tr>`, `<th>`, `<td>`). The
//! helpers here are the single source of truth for how partial tables are
//! combined, so the fixer's same-page merge and the merger's cross-page
//! splice cannot drift apart.

use regex::Regex;

/// Escape the five standard HTML special characters.
pub fn escape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for ch in text.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(ch),
        }
    }
    out
}

/// Remove the closing `</table>` tag so another table's body can follow.
pub fn strip_closing_table(markup: &str) -> String {
    markup.replace("</table>", "")
}

/// The body of a continuation table, starting at its `<tbody>` and keeping
/// everything after it (including the closing `</table>`).
///
/// Tables without a `<tbody>` lose their opening `<table ...>` tag instead,
/// so concatenation never nests table wrappers.
pub fn continuation_body(markup: &str) -> String {
    let tbody = Regex::new(r"(?s)^.*?<tbody>").unwrap();
    if tbody.is_match(markup) {
        return tbody.replace(markup, "<tbody>").into_owned();
    }
    let opener = Regex::new(r"(?s)^.*?<table[^>]*>").unwrap();
    opener.replace(markup, "").into_owned()
}

/// Extract the row content of a continuation fragment: the inner content of
/// its `<tbody>`, or every `<tr>...</tr>` when no row group is present.
pub fn extract_rows(markup: &str) -> String {
    let tbody = Regex::new(r"(?s)<tbody>(.*?)</tbody>").unwrap();
    if let Some(captures) = tbody.captures(markup) {
        return captures[1].trim().to_string();
    }

    let row = Regex::new(r"(?s)<tr>.*?</tr>").unwrap();
    row.find_iter(markup)
        .map(|m| m.as_str())
        .collect::<Vec<_>>()
        .join("\n")
}

/// Splice row content into a parent table, before its closing row-group tag
/// when one exists, else before the closing table tag.
pub fn splice_rows(parent: &str, rows: &str) -> String {
    if rows.is_empty() {
        return parent.to_string();
    }
    if parent.contains("</tbody>") {
        return parent.replacen("</tbody>", &format!("{}\n</tbody>", rows), 1);
    }
    if parent.contains("</table>") {
        return parent.replacen("</table>", &format!("{}\n</table>", rows), 1);
    }
    format!("{}\n{}", parent, rows)
}

/// Count the rows in table markup, header rows included.
pub fn count_rows(markup: &str) -> usize {
    Regex::new(r"<tr[\s>]").unwrap().find_iter(markup).count()
}
