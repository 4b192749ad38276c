//! # restitch
//!
//! Reading-order reconstruction and layout normalization for per-page
//! content fragments produced by a page-content extraction service.
//!
//! Extraction services return fragments (headers, paragraphs, tables,
//! images) per page with approximate positions. This library repairs
//! ordering and structural defects within each page, promotes repeated
//! key-value text into tables, stitches content that continues across page
//! boundaries, and renders the normalized fragment stream into a single
//! flowing document in natural reading order.
//!
//! ## Quick Start
//!
//! ```no_run
//! use restitch::{Pipeline, PipelineOptions, StoredPages, render, RenderOptions};
//!
//! fn main() -> restitch::Result<()> {
//!     // Replay pages persisted by a previous extraction run
//!     let pages = StoredPages::new("output/extracted_content")?;
//!     let page_nums = pages.page_numbers()?;
//!
//!     let pipeline = Pipeline::with_options(
//!         PipelineOptions::new().with_page_merging(true),
//!     );
//!     let run = pipeline.run(&pages, &page_nums)?;
//!
//!     let html = render::to_document_html(&run.document, &RenderOptions::default())?;
//!     std::fs::write("reconstructed_document.html", html)?;
//!     Ok(())
//! }
//! ```
//!
//! ## Features
//!
//! - **Structural repair**: section headings reordered before their tables,
//!   header hierarchy from numbering style, split tables re-joined
//! - **Key-value promotion**: repeated record blocks rewritten as tables
//! - **Cross-page merging**: tables, paragraphs, and lists that span pages
//!   stitched into whole logical units
//! - **Flow rendering**: order-preserving HTML with no geometric overlap
//! - **Parallel processing**: bounded per-page worker pool via Rayon
//! - **Page-at-a-time persistence**: every page reprocessable on its own

pub mod error;
pub mod fixer;
pub mod markup;
pub mod merge;
pub mod model;
pub mod payload;
pub mod pipeline;
pub mod promote;
pub mod render;
pub mod store;

// Re-export commonly used types
pub use error::{Error, Result};
pub use fixer::{FixerOptions, StructureFixer};
pub use merge::CrossPageMerger;
pub use model::{
    Alignment, Document, DocumentSummary, FontSizeClass, Formatting, Fragment, FragmentId,
    FragmentKind, FragmentMetadata, LayoutHints, MergedView, PageContent, Region,
};
pub use payload::{parse_page_payload, parse_page_payload_lenient};
pub use pipeline::{
    collect_artifacts, link_artifacts, ImageArtifact, PageExtractor, Pipeline, PipelineOptions,
    PipelineRun, StoredPages,
};
pub use promote::{KeyValuePromoter, PromoteOptions};
pub use render::RenderOptions;
pub use store::PageStore;

/// Repair one page's structure with default options.
///
/// # Example
///
/// ```
/// use restitch::{fix_page, Fragment, PageContent};
///
/// let page = PageContent::new(1, vec![Fragment::header("I. INTRODUCTION", 1)]);
/// let fixed = fix_page(&page);
/// assert_eq!(fixed.fragments[0].metadata.level, Some(2));
/// ```
pub fn fix_page(page: &PageContent) -> PageContent {
    StructureFixer::new().fix_page(page)
}

/// Promote eligible key-value blocks on one page with default options.
pub fn promote_page(page: &PageContent) -> PageContent {
    KeyValuePromoter::new().promote_page(page)
}

/// Merge continuation fragments across a page sequence with default options.
pub fn merge_pages(pages: &[PageContent]) -> MergedView {
    CrossPageMerger::new().merge(pages)
}

/// Render one page to HTML with default options.
pub fn render_page_html(page: &PageContent) -> Result<String> {
    render::to_page_html(page, &RenderOptions::default())
}

/// Builder for configuring and running a full reconstruction.
///
/// # Example
///
/// ```no_run
/// use restitch::Restitch;
///
/// let html = Restitch::new()
///     .merge_pages(true)
///     .workers(8)
///     .title("Division Order")
///     .reconstruct_dir("output/extracted_content")?;
/// # Ok::<(), restitch::Error>(())
/// ```
pub struct Restitch {
    pipeline_options: PipelineOptions,
    render_options: RenderOptions,
}

impl Restitch {
    /// Create a new builder.
    pub fn new() -> Self {
        Self {
            pipeline_options: PipelineOptions::default(),
            render_options: RenderOptions::default(),
        }
    }

    /// Set the worker pool bound.
    pub fn workers(mut self, workers: usize) -> Self {
        self.pipeline_options = self.pipeline_options.with_max_workers(workers);
        self
    }

    /// Enable or disable key-value promotion.
    pub fn promote(mut self, promote: bool) -> Self {
        self.pipeline_options = self.pipeline_options.with_promotion(promote);
        self
    }

    /// Enable or disable the cross-page merged view.
    pub fn merge_pages(mut self, merge: bool) -> Self {
        self.pipeline_options = self.pipeline_options.with_page_merging(merge);
        self
    }

    /// Persist processed pages under a directory.
    pub fn content_dir(mut self, dir: impl Into<std::path::PathBuf>) -> Self {
        self.pipeline_options = self.pipeline_options.with_content_dir(dir);
        self
    }

    /// Set fixer tunables.
    pub fn fixer(mut self, options: FixerOptions) -> Self {
        self.pipeline_options = self.pipeline_options.with_fixer(options);
        self
    }

    /// Set promoter tunables.
    pub fn promoter(mut self, options: PromoteOptions) -> Self {
        self.pipeline_options = self.pipeline_options.with_promoter(options);
        self
    }

    /// Set the rendered document title.
    pub fn title(mut self, title: impl Into<String>) -> Self {
        self.render_options = self.render_options.with_title(title);
        self
    }

    /// Run the pipeline over an extractor and page list.
    pub fn reconstruct(
        self,
        extractor: &dyn PageExtractor,
        page_nums: &[u32],
    ) -> Result<RestitchResult> {
        let pipeline = Pipeline::with_options(self.pipeline_options);
        let run = pipeline.run(extractor, page_nums)?;
        Ok(RestitchResult {
            run,
            render_options: self.render_options,
        })
    }

    /// Run the pipeline over pages persisted in a directory.
    pub fn reconstruct_dir(self, dir: impl Into<std::path::PathBuf>) -> Result<String> {
        let stored = StoredPages::new(dir)?;
        let page_nums = stored.page_numbers()?;
        let result = self.reconstruct(&stored, &page_nums)?;
        result.to_html()
    }
}

impl Default for Restitch {
    fn default() -> Self {
        Self::new()
    }
}

/// Result of a reconstruction, ready to render.
pub struct RestitchResult {
    /// The pipeline output
    pub run: PipelineRun,
    render_options: RenderOptions,
}

impl RestitchResult {
    /// Render the full document to HTML.
    pub fn to_html(&self) -> Result<String> {
        render::to_document_html(&self.run.document, &self.render_options)
    }

    /// Render the merged logical view to HTML, when merging ran.
    pub fn merged_html(&self) -> Option<Result<String>> {
        self.run
            .document
            .merged
            .as_ref()
            .map(|view| render::to_merged_html(view, &self.render_options))
    }

    /// The reconstructed document.
    pub fn document(&self) -> &Document {
        &self.run.document
    }
}
