//! Document-level types.

use super::{Fragment, FragmentId, PageContent};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// A reconstructed document: an ordered page sequence, optionally accompanied
/// by the cross-page merger's continuation-resolved view.
///
/// The merged view is derived and never replaces the per-page fragment lists;
/// page-faithful rendering and diagnostics need the per-page form while
/// logical-document rendering needs the merged form.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Document {
    /// Pages in order
    pub pages: Vec<PageContent>,

    /// Continuation-resolved view across the page sequence
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub merged: Option<MergedView>,
}

impl Document {
    /// Create a document from pages.
    pub fn new(pages: Vec<PageContent>) -> Self {
        Self {
            pages,
            merged: None,
        }
    }

    /// Number of pages.
    pub fn page_count(&self) -> u32 {
        self.pages.len() as u32
    }

    /// Get a page by number (1-indexed).
    pub fn get_page(&self, page_num: u32) -> Option<&PageContent> {
        self.pages.iter().find(|p| p.page_num == page_num)
    }

    /// Check if the document has any pages.
    pub fn is_empty(&self) -> bool {
        self.pages.is_empty()
    }

    /// Summarize the document for the processing report.
    pub fn summary(&self, generated_at: DateTime<Utc>) -> DocumentSummary {
        DocumentSummary::from_document(self, generated_at)
    }
}

/// The cross-page merger's output: fragments with continuations resolved into
/// whole logical units, plus a lookup from identifier to merged fragment.
///
/// `index` maps identifiers to positions in `items` rather than aliasing
/// fragments, so the per-page and merged views never share mutable state.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MergedView {
    /// Continuation-resolved fragments in document order
    #[serde(rename = "merged_items")]
    pub items: Vec<Fragment>,

    /// Lookup from fragment identifier to its index in `items`
    #[serde(rename = "item_map")]
    pub index: HashMap<FragmentId, usize>,

    /// Number of pages the merger consumed
    pub total_pages: u32,
}

impl MergedView {
    /// Look up a merged fragment by identifier.
    pub fn get(&self, id: &FragmentId) -> Option<&Fragment> {
        self.index.get(id).and_then(|&i| self.items.get(i))
    }

    /// Number of merged items.
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Check if the view is empty.
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

/// Per-page statistics for the processing report.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PageSummary {
    /// Page number
    pub page_num: u32,
    /// Fragment count on the page
    pub fragments: usize,
    /// Table count on the page
    pub tables: usize,
    /// Image count on the page
    pub images: usize,
    /// Whether the page's worker recorded a failure
    pub failed: bool,
}

/// Document-level statistics written alongside the reconstructed output.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DocumentSummary {
    /// Total pages processed
    pub total_pages: u32,
    /// Total fragments across all pages
    pub total_fragments: usize,
    /// Total tables across all pages
    pub total_tables: usize,
    /// Total images across all pages
    pub total_images: usize,
    /// Fragments in the merged view, when merging ran
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub merged_items: Option<usize>,
    /// Per-page breakdown
    pub pages: Vec<PageSummary>,
    /// When the report was generated
    pub generated_at: DateTime<Utc>,
}

impl DocumentSummary {
    /// Build a summary from a document.
    pub fn from_document(doc: &Document, generated_at: DateTime<Utc>) -> Self {
        let pages: Vec<PageSummary> = doc
            .pages
            .iter()
            .map(|p| PageSummary {
                page_num: p.page_num,
                fragments: p.fragment_count(),
                tables: p.table_count(),
                images: p.image_count(),
                failed: p.error.is_some(),
            })
            .collect();

        Self {
            total_pages: doc.page_count(),
            total_fragments: pages.iter().map(|p| p.fragments).sum(),
            total_tables: pages.iter().map(|p| p.tables).sum(),
            total_images: pages.iter().map(|p| p.images).sum(),
            merged_items: doc.merged.as_ref().map(|m| m.len()),
            pages,
            generated_at,
        }
    }
}
