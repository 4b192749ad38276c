//! Cross-page continuation stitching.
//!
//! The extraction service may tag a fragment as continuing an identified
//! fragment from a previous page. The merger walks pages in order and folds
//! such continuations into their parents, producing a second, page-spanning
//! view of the document. The per-page fragment lists are untouched; both
//! representations stay available because page-faithful rendering and
//! logical-document rendering need different guarantees.

use crate::markup;
use crate::model::{Fragment, FragmentId, FragmentKind, MergedView, PageContent};
use std::collections::HashMap;

/// Stitches fragments that span page boundaries into whole logical units.
pub struct CrossPageMerger;

impl CrossPageMerger {
    /// Create a merger.
    pub fn new() -> Self {
        Self
    }

    /// Merge continuation fragments across a page sequence.
    ///
    /// Fragments are registered under their identifier (or the positional
    /// fallback when the extractor omitted one). A continuation whose parent
    /// is known merges into it; a continuation whose parent was never seen
    /// is demoted to a standalone fragment, never dropped.
    pub fn merge(&self, pages: &[PageContent]) -> MergedView {
        let mut items: Vec<Fragment> = Vec::new();
        let mut index: HashMap<FragmentId, usize> = HashMap::new();

        for page in pages {
            for fragment in &page.fragments {
                let id = fragment.effective_id(page.page_num);

                if fragment.continuation {
                    if let Some(&parent_idx) = fragment
                        .continues_from
                        .as_ref()
                        .and_then(|parent| index.get(parent))
                    {
                        merge_into_parent(&mut items[parent_idx], fragment, page.page_num);
                        continue;
                    }
                    log::warn!(
                        "page {}: continuation parent {:?} not found, keeping fragment standalone",
                        page.page_num,
                        fragment.continues_from
                    );
                }

                let mut standalone = fragment.clone();
                standalone.pages = vec![page.page_num];
                index.insert(id, items.len());
                items.push(standalone);
            }
        }

        log::debug!(
            "merged {} pages into {} logical items",
            pages.len(),
            items.len()
        );

        MergedView {
            items,
            index,
            total_pages: pages.len() as u32,
        }
    }
}

impl Default for CrossPageMerger {
    fn default() -> Self {
        Self::new()
    }
}

/// Fold a continuation fragment into its parent.
///
/// Tables splice the continuation's row content before the parent's closing
/// row group; paragraphs and lists concatenate with a single separating
/// space. The parent's continues-next-page flag and spanned-pages set follow
/// the continuation.
fn merge_into_parent(parent: &mut Fragment, continuation: &Fragment, page_num: u32) {
    match continuation.kind {
        FragmentKind::Table => {
            let rows = markup::extract_rows(&continuation.content);
            parent.content = markup::splice_rows(&parent.content, &rows);
            parent.metadata.row_count = match (
                parent.metadata.row_count,
                continuation.metadata.row_count,
            ) {
                (Some(a), Some(b)) => Some(a + b),
                (existing, None) => existing,
                (None, added) => added,
            };
        }
        _ => {
            if !continuation.content.is_empty() {
                if !parent.content.is_empty() {
                    parent.content.push(' ');
                }
                parent.content.push_str(&continuation.content);
            }
        }
    }

    parent.continues_next_page = continuation.continues_next_page;
    if !parent.pages.contains(&page_num) {
        parent.pages.push(page_num);
    }
}
