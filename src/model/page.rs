//! Page-level types.

use super::Fragment;
use serde::{Deserialize, Serialize};

/// Page-level layout hints reported by the extraction service.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LayoutHints {
    /// Number of text columns on the page
    #[serde(default = "default_columns")]
    pub columns: u8,

    /// Whether the page carries a running header
    #[serde(default)]
    pub has_page_header: bool,

    /// Whether the page carries a running footer
    #[serde(default)]
    pub has_page_footer: bool,

    /// Margins as percentages of page dimensions (left, top, right, bottom)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub margins: Option<[f32; 4]>,
}

fn default_columns() -> u8 {
    1
}

impl Default for LayoutHints {
    fn default() -> Self {
        Self {
            columns: 1,
            has_page_header: false,
            has_page_footer: false,
            margins: None,
        }
    }
}

/// One page's extracted content: an ordered fragment sequence plus layout
/// hints.
///
/// Owned exclusively by the pipeline invocation that produced it. Stages
/// consume a page by reference and return a new value; no fragment is shared
/// between stage outputs.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PageContent {
    /// Page number (1-indexed)
    pub page_num: u32,

    /// Fragments in extraction order
    #[serde(rename = "content_items", default)]
    pub fragments: Vec<Fragment>,

    /// Page-level layout hints
    #[serde(rename = "layout", default)]
    pub layout: LayoutHints,

    /// Short textual summary carried forward as context to bias the next
    /// page's extraction toward continuation detection
    #[serde(rename = "page_summary", default, skip_serializing_if = "Option::is_none")]
    pub summary: Option<String>,

    /// Recorded failure for this page, when its worker was isolated
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl PageContent {
    /// Create a page with fragments.
    pub fn new(page_num: u32, fragments: Vec<Fragment>) -> Self {
        Self {
            page_num,
            fragments,
            layout: LayoutHints::default(),
            summary: None,
            error: None,
        }
    }

    /// The minimal empty page substituted when a page's payload cannot be
    /// parsed or its worker failed. A single bad page must not abort the
    /// document.
    pub fn empty(page_num: u32) -> Self {
        Self::new(page_num, Vec::new())
    }

    /// An empty page carrying the failure that produced it.
    pub fn failed(page_num: u32, error: impl Into<String>) -> Self {
        let mut page = Self::empty(page_num);
        page.error = Some(error.into());
        page
    }

    /// Check if the page has no fragments.
    pub fn is_empty(&self) -> bool {
        self.fragments.is_empty()
    }

    /// Number of fragments on the page.
    pub fn fragment_count(&self) -> usize {
        self.fragments.len()
    }

    /// Number of table fragments on the page.
    pub fn table_count(&self) -> usize {
        self.fragments.iter().filter(|f| f.is_table()).count()
    }

    /// Number of image fragments on the page.
    pub fn image_count(&self) -> usize {
        self.fragments
            .iter()
            .filter(|f| f.kind == super::FragmentKind::Image)
            .count()
    }

    /// Return a copy with the given fragments, keeping page-level fields.
    pub fn with_fragments(&self, fragments: Vec<Fragment>) -> Self {
        Self {
            page_num: self.page_num,
            fragments,
            layout: self.layout.clone(),
            summary: self.summary.clone(),
            error: self.error.clone(),
        }
    }
}
