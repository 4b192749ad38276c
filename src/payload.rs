//! Parsing of extraction-service payloads.
//!
//! The extraction collaborator returns one JSON document per page. Responses
//! are occasionally wrapped in Markdown code fences or contain stray control
//! characters and escape sequences; parsing attempts one bounded repair pass
//! before giving up. Callers at the page boundary degrade a failed page to an
//! empty fragment list so a single bad page never aborts the document.

use crate::error::{Error, Result};
use crate::model::{Formatting, Fragment, FragmentKind, LayoutHints, PageContent, Region};
use serde::Deserialize;
use std::path::PathBuf;

/// Parse a raw page payload into [`PageContent`].
///
/// On a first parse failure the payload is repaired once (control characters
/// removed, stray backslashes escaped) and re-parsed; a second failure is
/// returned as [`Error::Payload`].
pub fn parse_page_payload(raw: &str, page_num: u32) -> Result<PageContent> {
    let cleaned = strip_code_fences(raw);

    let payload: RawPayload = match serde_json::from_str(&cleaned) {
        Ok(payload) => payload,
        Err(first_err) => {
            log::warn!(
                "page {}: payload parse failed ({}), attempting repair",
                page_num,
                first_err
            );
            let repaired = repair_payload(&cleaned);
            serde_json::from_str(&repaired)
                .map_err(|e| Error::Payload(format!("page {}: {}", page_num, e)))?
        }
    };

    Ok(payload.into_page(page_num))
}

/// Parse a raw page payload, substituting an empty page on failure.
///
/// This is the page-boundary degradation described by the pipeline contract:
/// the failure is recorded on the page, not propagated.
pub fn parse_page_payload_lenient(raw: &str, page_num: u32) -> PageContent {
    match parse_page_payload(raw, page_num) {
        Ok(page) => page,
        Err(e) => {
            log::warn!("page {}: substituting empty fragment list: {}", page_num, e);
            PageContent::failed(page_num, e.to_string())
        }
    }
}

/// Remove Markdown code fences the extraction service sometimes wraps its
/// JSON in.
fn strip_code_fences(raw: &str) -> String {
    let trimmed = raw.trim();
    if !trimmed.starts_with("```") {
        return trimmed.to_string();
    }

    let mut lines: Vec<&str> = trimmed.lines().collect();
    if lines
        .first()
        .is_some_and(|line| line.trim_start().starts_with("```"))
    {
        lines.remove(0);
    }
    if lines.last().is_some_and(|line| line.trim() == "```") {
        lines.pop();
    }

    lines
        .join("\n")
        .replace("```json", "")
        .replace("```", "")
        .trim()
        .to_string()
}

/// One bounded repair pass: drop control characters and double any backslash
/// that does not begin a valid JSON escape sequence.
fn repair_payload(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    let mut chars = raw.chars().peekable();

    while let Some(ch) = chars.next() {
        match ch {
            '\u{00}'..='\u{1f}' | '\u{7f}'..='\u{9f}' => {}
            '\\' => match chars.peek() {
                Some('"' | '\\' | '/' | 'b' | 'f' | 'n' | 'r' | 't' | 'u') => out.push('\\'),
                _ => out.push_str("\\\\"),
            },
            _ => out.push(ch),
        }
    }

    out
}

/// The superset wire format: the fragment list, layout hints, and carry-over
/// summary, plus the legacy per-kind lists older extractor revisions emit.
#[derive(Debug, Deserialize)]
struct RawPayload {
    #[serde(default)]
    content_items: Vec<RawFragment>,

    #[serde(default)]
    layout: LayoutHints,

    #[serde(default)]
    page_summary: Option<String>,

    // Legacy partitioned lists, consumed only when content_items is absent.
    #[serde(default)]
    tables: Vec<LegacyTable>,
    #[serde(default)]
    images: Vec<LegacyImage>,
    #[serde(default)]
    text_blocks: Vec<LegacyTextBlock>,
}

impl RawPayload {
    fn into_page(self, page_num: u32) -> PageContent {
        let RawPayload {
            content_items,
            layout,
            page_summary,
            tables,
            images,
            text_blocks,
        } = self;

        let fragments: Vec<Fragment> = if !content_items.is_empty() {
            content_items
                .into_iter()
                .map(RawFragment::into_fragment)
                .collect()
        } else {
            legacy_fragments(&tables, &images, &text_blocks)
        };

        let mut page = PageContent::new(page_num, fragments);
        page.layout = layout;
        page.summary = page_summary;
        page
    }
}

/// Rebuild a fragment list from the legacy per-kind partitioning. Order
/// hints and positions pass through; interleaving is restored by the
/// renderer's flow ordering.
fn legacy_fragments(
    tables: &[LegacyTable],
    images: &[LegacyImage],
    text_blocks: &[LegacyTextBlock],
) -> Vec<Fragment> {
    let mut fragments = Vec::new();

    for block in text_blocks {
        let kind = block.kind.unwrap_or(FragmentKind::Paragraph);
        let mut fragment = Fragment::new(kind, block.content.clone());
        fragment.order = block.order;
        fragment.position = block.position.unwrap_or_default();
        fragment.formatting = block.formatting.unwrap_or_default();
        fragment.metadata.level = block.level;
        fragments.push(fragment);
    }

    for table in tables {
        let mut fragment = Fragment::table(table.html.clone().unwrap_or_default());
        fragment.order = table.order;
        fragment.position = table.position.unwrap_or_default();
        fragment.metadata.caption = table.caption.clone().filter(|c| !c.is_empty());
        fragment.metadata.row_count = table.row_count;
        fragment.metadata.column_count = table.column_count;
        fragments.push(fragment);
    }

    for image in images {
        let mut fragment = Fragment::new(FragmentKind::Image, String::new());
        fragment.order = image.order;
        fragment.position = image.position.unwrap_or_default();
        fragment.metadata.description = image.description.clone().filter(|d| !d.is_empty());
        fragment.metadata.caption = image.caption.clone().filter(|c| !c.is_empty());
        fragment.image_path = image
            .image_path
            .clone()
            .filter(|p| !p.as_os_str().is_empty());
        fragments.push(fragment);
    }

    fragments
}

/// A content item as it appears on the wire: a [`Fragment`] plus the
/// table-markup `html` field older revisions populate alongside `content`.
#[derive(Debug, Deserialize)]
struct RawFragment {
    #[serde(default)]
    html: Option<String>,

    #[serde(flatten)]
    fragment: Fragment,
}

impl RawFragment {
    fn into_fragment(self) -> Fragment {
        let mut fragment = self.fragment;
        if fragment.content.is_empty() {
            if let Some(html) = self.html {
                fragment.content = html;
            }
        }
        fragment
    }
}

#[derive(Debug, Deserialize)]
struct LegacyTable {
    #[serde(default)]
    html: Option<String>,
    #[serde(default)]
    position: Option<Region>,
    #[serde(default)]
    caption: Option<String>,
    #[serde(default)]
    row_count: Option<usize>,
    #[serde(default)]
    column_count: Option<usize>,
    #[serde(default)]
    order: Option<u32>,
}

#[derive(Debug, Deserialize)]
struct LegacyImage {
    #[serde(default)]
    description: Option<String>,
    #[serde(default)]
    position: Option<Region>,
    #[serde(default)]
    caption: Option<String>,
    #[serde(default)]
    order: Option<u32>,
    #[serde(default)]
    image_path: Option<PathBuf>,
}

#[derive(Debug, Deserialize)]
struct LegacyTextBlock {
    #[serde(rename = "type", default)]
    kind: Option<FragmentKind>,
    #[serde(default)]
    content: String,
    #[serde(default)]
    position: Option<Region>,
    #[serde(default)]
    formatting: Option<Formatting>,
    #[serde(default)]
    level: Option<u8>,
    #[serde(default)]
    order: Option<u32>,
}
