//! Key-value record detection and table promotion.
//!
//! Extracted pages often carry blocks of free text that are really a
//! sequence of structurally identical key-value records ("Name: ... /
//! Age: ..." repeated per person). This module detects such blocks and
//! rewrites them as table fragments with the shared keys as column headers.
//! Any check failing returns the fragment unchanged; non-applicability is
//! not an error.

use crate::markup;
use crate::model::{Fragment, FragmentKind, PageContent};
use std::collections::HashMap;

/// Tunable detection thresholds.
///
/// The separator set and key-length cutoff are heuristic constants carried
/// from observed extractor output; they are policy, not law.
#[derive(Debug, Clone)]
pub struct PromoteOptions {
    /// Characters accepted between a key and its value.
    pub separators: Vec<char>,

    /// Minimum number of records for a block to qualify.
    pub min_records: usize,

    /// Keys at or above this length are not treated as keys.
    pub max_key_len: usize,

    /// Blocks shorter than this many characters are never candidates.
    pub min_text_len: usize,
}

impl PromoteOptions {
    /// Create options with defaults.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the separator set.
    pub fn with_separators(mut self, separators: Vec<char>) -> Self {
        self.separators = separators;
        self
    }

    /// Set the minimum record count.
    pub fn with_min_records(mut self, min_records: usize) -> Self {
        self.min_records = min_records;
        self
    }

    /// Set the key length cutoff.
    pub fn with_max_key_len(mut self, max_key_len: usize) -> Self {
        self.max_key_len = max_key_len;
        self
    }
}

impl Default for PromoteOptions {
    fn default() -> Self {
        Self {
            separators: vec![':', '=', '-', '–', '—'],
            min_records: 2,
            max_key_len: 50,
            min_text_len: 20,
        }
    }
}

/// Detects repeated key-value records in free text and promotes them to
/// table fragments.
pub struct KeyValuePromoter {
    options: PromoteOptions,
}

impl KeyValuePromoter {
    /// Create a promoter with default options.
    pub fn new() -> Self {
        Self::with_options(PromoteOptions::default())
    }

    /// Create a promoter with custom options.
    pub fn with_options(options: PromoteOptions) -> Self {
        Self { options }
    }

    /// Promote every eligible paragraph fragment on a page. Returns a new
    /// page; fragments that do not qualify pass through unchanged.
    pub fn promote_page(&self, page: &PageContent) -> PageContent {
        let fragments = page
            .fragments
            .iter()
            .map(|f| self.promote_fragment(f))
            .collect();
        page.with_fragments(fragments)
    }

    /// Promote a single fragment if it is a paragraph holding a multi-record
    /// key-value block; otherwise return a copy unchanged.
    pub fn promote_fragment(&self, fragment: &Fragment) -> Fragment {
        if fragment.kind != FragmentKind::Paragraph {
            return fragment.clone();
        }

        let Some(headers) = self.detect_record_headers(&fragment.content) else {
            return fragment.clone();
        };

        let records = self.parse_records(&fragment.content);
        if records.len() < self.options.min_records {
            return fragment.clone();
        }

        log::debug!(
            "promoting {} key-value records with keys {:?}",
            records.len(),
            headers
        );

        let mut promoted = fragment.clone();
        promoted.kind = FragmentKind::Table;
        promoted.content =
            build_table_markup(&headers, &records, fragment.metadata.caption.as_deref());
        promoted.metadata.row_count = Some(records.len());
        promoted.metadata.column_count = Some(headers.len());
        promoted.metadata.converted_from_kv = true;
        promoted.metadata.original_text = Some(fragment.content.clone());
        promoted.metadata.headers = Some(headers);
        promoted
    }

    /// Detect whether text is a multi-record key-value block, returning the
    /// shared ordered key list when it is.
    ///
    /// Requires at least `min_records` records, each with at least 2 keys,
    /// and identical key lists (content and order) across all records.
    pub fn detect_record_headers(&self, text: &str) -> Option<Vec<String>> {
        if text.trim().len() < self.options.min_text_len {
            return None;
        }

        let records = self.split_into_records(text);
        if records.len() < self.options.min_records {
            return None;
        }

        let mut shared: Option<Vec<String>> = None;
        for record in &records {
            let keys = self.record_keys(record);
            if keys.len() < 2 {
                return None;
            }
            match &shared {
                None => shared = Some(keys),
                Some(first) if *first != keys => return None,
                Some(_) => {}
            }
        }

        shared
    }

    /// Split text into candidate records on blank-line boundaries, falling
    /// back to the repeated-first-key scan when that yields fewer than two.
    fn split_into_records(&self, text: &str) -> Vec<String> {
        let mut records = Vec::new();
        let mut current: Vec<&str> = Vec::new();

        for line in text.trim().lines() {
            if line.trim().is_empty() {
                if !current.is_empty() {
                    records.push(current.join("\n"));
                    current.clear();
                }
            } else {
                current.push(line);
            }
        }
        if !current.is_empty() {
            records.push(current.join("\n"));
        }

        if records.len() < 2 {
            return self.split_by_repeated_key(text);
        }
        records
    }

    /// Detect records packed without blank lines by scanning for the first
    /// recognizable key and starting a new record each time it recurs.
    fn split_by_repeated_key(&self, text: &str) -> Vec<String> {
        let lines: Vec<&str> = text.trim().lines().collect();
        if lines.len() < 4 {
            return Vec::new();
        }

        let Some(first_key) = lines.iter().find_map(|line| self.key_of_line(line)) else {
            return Vec::new();
        };

        let mut records = Vec::new();
        let mut current: Vec<&str> = Vec::new();

        for &line in &lines {
            if self.key_of_line(line).as_deref() == Some(first_key.as_str()) && !current.is_empty()
            {
                records.push(current.join("\n"));
                current = vec![line];
            } else {
                current.push(line);
            }
        }
        if !current.is_empty() {
            records.push(current.join("\n"));
        }

        if records.len() >= 2 {
            records
        } else {
            Vec::new()
        }
    }

    /// Extract the key of a `key<sep>value` line, if the line is one.
    fn key_of_line(&self, line: &str) -> Option<String> {
        let line = line.trim();
        for &sep in &self.options.separators {
            if let Some((key, _value)) = line.split_once(sep) {
                let key = key.trim();
                if !key.is_empty() && key.chars().count() < self.options.max_key_len {
                    return Some(key.to_string());
                }
            }
        }
        None
    }

    /// Ordered keys of a single record.
    fn record_keys(&self, record: &str) -> Vec<String> {
        record
            .lines()
            .filter_map(|line| self.key_of_line(line))
            .collect()
    }

    /// Parse each record into its key-value pairs. Lines with an empty value
    /// are skipped here; the rendering side defaults omitted keys to the
    /// empty string rather than fabricating values.
    fn parse_records(&self, text: &str) -> Vec<HashMap<String, String>> {
        self.split_into_records(text)
            .iter()
            .filter_map(|record| {
                let mut values = HashMap::new();
                for line in record.lines() {
                    let line = line.trim();
                    for &sep in &self.options.separators {
                        if let Some((key, value)) = line.split_once(sep) {
                            let key = key.trim();
                            let value = value.trim();
                            if !key.is_empty() && !value.is_empty() {
                                values.insert(key.to_string(), value.to_string());
                            }
                            break;
                        }
                    }
                }
                if values.is_empty() {
                    None
                } else {
                    Some(values)
                }
            })
            .collect()
    }
}

impl Default for KeyValuePromoter {
    fn default() -> Self {
        Self::new()
    }
}

/// Build table markup with one header row and one row per record. Values are
/// looked up by key and default to the empty string when a record omits a
/// key. All text is escaped before insertion.
fn build_table_markup(
    headers: &[String],
    records: &[HashMap<String, String>],
    caption: Option<&str>,
) -> String {
    let mut parts = vec!["<table>".to_string()];

    if let Some(caption) = caption {
        parts.push(format!("<caption>{}</caption>", markup::escape(caption)));
    }

    parts.push("<thead>".to_string());
    let header_cells: String = headers
        .iter()
        .map(|h| format!("<th>{}</th>", markup::escape(h)))
        .collect();
    parts.push(format!("<tr>{}</tr>", header_cells));
    parts.push("</thead>".to_string());

    parts.push("<tbody>".to_string());
    for record in records {
        let cells: String = headers
            .iter()
            .map(|h| {
                let value = record.get(h).map(String::as_str).unwrap_or("");
                format!("<td>{}</td>", markup::escape(value))
            })
            .collect();
        parts.push(format!("<tr>{}</tr>", cells));
    }
    parts.push("</tbody>".to_string());

    parts.push("</table>".to_string());
    parts.join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;

    const TWO_RECORDS: &str = "Name: John Smith\nAge: 35\nEmail: john@example.com\n\n\
                               Name: Jane Doe\nAge: 28\nEmail: jane@example.com";

    #[test]
    fn test_detects_blank_line_records() {
        let promoter = KeyValuePromoter::new();
        let headers = promoter.detect_record_headers(TWO_RECORDS).unwrap();
        assert_eq!(headers, ["Name", "Age", "Email"]);
    }

    #[test]
    fn test_detects_repeated_key_records() {
        let promoter = KeyValuePromoter::new();
        let text = "Product: Laptop\nPrice: $999\nStock: 15\n\
                    Product: Mouse\nPrice: $25\nStock: 150";
        let headers = promoter.detect_record_headers(text).unwrap();
        assert_eq!(headers, ["Product", "Price", "Stock"]);
    }

    #[test]
    fn test_single_record_rejected() {
        let promoter = KeyValuePromoter::new();
        let text = "Name: John Smith\nAge: 35\nPhone: (555) 123-4567";
        assert!(promoter.detect_record_headers(text).is_none());
    }

    #[test]
    fn test_inconsistent_keys_rejected() {
        let promoter = KeyValuePromoter::new();
        let text = "Name: John\nAge: 35\n\nProduct: Laptop\nPrice: $999";
        assert!(promoter.detect_record_headers(text).is_none());
    }

    #[test]
    fn test_single_key_records_rejected() {
        let promoter = KeyValuePromoter::new();
        let text = "Name: John Smith\n\nName: Jane Doe\n\nName: Bob";
        assert!(promoter.detect_record_headers(text).is_none());
    }

    #[test]
    fn test_short_text_rejected() {
        let promoter = KeyValuePromoter::new();
        assert!(promoter.detect_record_headers("a: 1\n\nb: 2").is_none());
    }

    #[test]
    fn test_long_keys_not_keys() {
        let promoter = KeyValuePromoter::new();
        let long_key = "x".repeat(60);
        let text = format!("{k}: 1\nAge: 2\n\n{k}: 3\nAge: 4", k = long_key);
        // The oversized key line contributes no key, leaving one key per
        // record, which is below the two-key minimum.
        assert!(promoter.detect_record_headers(&text).is_none());
    }

    #[test]
    fn test_promotion_builds_table() {
        let promoter = KeyValuePromoter::new();
        let fragment = Fragment::paragraph(TWO_RECORDS).with_order(3);

        let promoted = promoter.promote_fragment(&fragment);
        assert_eq!(promoted.kind, FragmentKind::Table);
        assert_eq!(promoted.metadata.row_count, Some(2));
        assert_eq!(promoted.metadata.column_count, Some(3));
        assert!(promoted.metadata.converted_from_kv);
        assert_eq!(
            promoted.metadata.original_text.as_deref(),
            Some(TWO_RECORDS)
        );
        assert!(promoted.content.contains("<th>Name</th>"));
        assert!(promoted.content.contains("<td>jane@example.com</td>"));
        // Header row plus one row per record
        assert_eq!(markup::count_rows(&promoted.content), 3);
        // Order hint and identity survive the rewrite
        assert_eq!(promoted.order, Some(3));
    }

    #[test]
    fn test_promotion_escapes_values() {
        let promoter = KeyValuePromoter::new();
        let text = "Name: A <& B\nNote: \"quoted\"\n\nName: C\nNote: plain";
        let promoted = promoter.promote_fragment(&Fragment::paragraph(text));
        assert!(promoted.content.contains("A &lt;&amp; B"));
        assert!(promoted.content.contains("&quot;quoted&quot;"));
    }

    #[test]
    fn test_missing_value_defaults_to_empty_cell() {
        let promoter = KeyValuePromoter::new();
        let text = "Name: A\nAge: 1\n\nName: B\nAge:";
        let promoted = promoter.promote_fragment(&Fragment::paragraph(text));
        assert_eq!(promoted.kind, FragmentKind::Table);
        assert!(promoted.content.contains("<td></td>"));
    }

    #[test]
    fn test_non_paragraph_untouched() {
        let promoter = KeyValuePromoter::new();
        let table = Fragment::table("<table></table>");
        assert_eq!(promoter.promote_fragment(&table), table);
    }

    #[test]
    fn test_plain_prose_untouched() {
        let promoter = KeyValuePromoter::new();
        let prose = Fragment::paragraph(
            "This paragraph discusses ownership percentages at length, \
             without any repeating record structure.",
        );
        assert_eq!(promoter.promote_fragment(&prose), prose);
    }

    #[test]
    fn test_promote_page() {
        let promoter = KeyValuePromoter::new();
        let page = PageContent::new(
            1,
            vec![
                Fragment::header("Owners", 2),
                Fragment::paragraph(TWO_RECORDS),
            ],
        );

        let promoted = promoter.promote_page(&page);
        assert_eq!(promoted.fragments[0].kind, FragmentKind::Header);
        assert_eq!(promoted.fragments[1].kind, FragmentKind::Table);
    }
}
