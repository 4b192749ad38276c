//! Page-processing pipeline.
//!
//! Per-page extraction is a collaborator call and may run in parallel across
//! pages on a bounded worker pool; concurrency is strictly at page
//! granularity. Each worker owns its page's fragments until it returns, and
//! results land in an index-addressed slot vector so final ordering is
//! deterministic regardless of completion order. The fixer, promoter,
//! merger, and renderer stages that need a total order over pages run
//! single-threaded after every worker completes.

use crate::error::Result;
use crate::fixer::{FixerOptions, StructureFixer};
use crate::merge::CrossPageMerger;
use crate::model::{Document, DocumentSummary, Fragment, FragmentKind, PageContent, Region};
use crate::promote::{KeyValuePromoter, PromoteOptions};
use crate::store::PageStore;
use chrono::Utc;
use std::path::PathBuf;
use std::sync::Mutex;

/// The extraction-collaborator seam.
///
/// Implementations call the page-content extraction service (or replay
/// persisted state) for one page. `context` carries the previous page's
/// summary in the sequential, continuation-aware mode; parallel runs pass
/// `None`.
pub trait PageExtractor: Sync {
    /// Extract one page's content.
    fn extract_page(&self, page_num: u32, context: Option<&str>) -> Result<PageContent>;
}

/// Replays pages persisted by a previous run, so any page can be reprocessed
/// without re-calling the extraction service.
pub struct StoredPages {
    store: PageStore,
}

impl StoredPages {
    /// Open a replay extractor over a store directory.
    pub fn new(dir: impl Into<PathBuf>) -> Result<Self> {
        Ok(Self {
            store: PageStore::new(dir)?,
        })
    }

    /// Page numbers available for replay.
    pub fn page_numbers(&self) -> Result<Vec<u32>> {
        self.store.page_numbers()
    }
}

impl PageExtractor for StoredPages {
    fn extract_page(&self, page_num: u32, _context: Option<&str>) -> Result<PageContent> {
        self.store.load(page_num)
    }
}

/// A visual region recorded during page processing, handed to the cropping
/// collaborator. Cropping itself is a simple bounding-box operation and is
/// not performed here.
#[derive(Debug, Clone)]
pub struct ImageArtifact {
    /// Page the region was found on
    pub page_num: u32,
    /// Which image on the page (1-indexed)
    pub index: usize,
    /// Bounding rectangle in page-relative percentages
    pub region: Region,
    /// Extracted description of the visual content
    pub description: Option<String>,
    /// Image classification (chart, diagram, photo, ...)
    pub image_type: Option<String>,
    /// Resolved asset path, filled by the cropping collaborator
    pub path: Option<PathBuf>,
}

/// Pipeline configuration.
#[derive(Debug, Clone)]
pub struct PipelineOptions {
    /// Maximum parallel page workers
    pub max_workers: usize,

    /// Run the key-value promoter after the fixer
    pub promote: bool,

    /// Produce the cross-page merged view
    pub merge_pages: bool,

    /// Persist each processed page under this directory
    pub content_dir: Option<PathBuf>,

    /// Structural fixer tunables
    pub fixer: FixerOptions,

    /// Key-value promoter tunables
    pub promoter: PromoteOptions,
}

impl PipelineOptions {
    /// Create options with defaults.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the worker pool bound.
    pub fn with_max_workers(mut self, workers: usize) -> Self {
        self.max_workers = workers.max(1);
        self
    }

    /// Enable or disable key-value promotion.
    pub fn with_promotion(mut self, promote: bool) -> Self {
        self.promote = promote;
        self
    }

    /// Enable or disable the cross-page merged view.
    pub fn with_page_merging(mut self, merge: bool) -> Self {
        self.merge_pages = merge;
        self
    }

    /// Persist processed pages under a directory.
    pub fn with_content_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.content_dir = Some(dir.into());
        self
    }

    /// Set fixer tunables.
    pub fn with_fixer(mut self, fixer: FixerOptions) -> Self {
        self.fixer = fixer;
        self
    }

    /// Set promoter tunables.
    pub fn with_promoter(mut self, promoter: PromoteOptions) -> Self {
        self.promoter = promoter;
        self
    }
}

impl Default for PipelineOptions {
    fn default() -> Self {
        Self {
            max_workers: 4,
            promote: true,
            merge_pages: false,
            content_dir: None,
            fixer: FixerOptions::default(),
            promoter: PromoteOptions::default(),
        }
    }
}

/// The result of a pipeline run: the reconstructed document plus the image
/// artifacts accumulated across workers.
#[derive(Debug)]
pub struct PipelineRun {
    /// The reconstructed document (with the merged view when requested)
    pub document: Document,
    /// Visual regions recorded for the cropping collaborator
    pub artifacts: Vec<ImageArtifact>,
}

impl PipelineRun {
    /// Build the processing report for this run.
    pub fn summary(&self) -> DocumentSummary {
        self.document.summary(Utc::now())
    }
}

/// Orchestrates extraction workers and the normalization stages.
pub struct Pipeline {
    options: PipelineOptions,
    fixer: StructureFixer,
    promoter: KeyValuePromoter,
}

impl Pipeline {
    /// Create a pipeline with default options.
    pub fn new() -> Self {
        Self::with_options(PipelineOptions::default())
    }

    /// Create a pipeline with custom options.
    pub fn with_options(options: PipelineOptions) -> Self {
        let fixer = StructureFixer::with_options(options.fixer.clone());
        let promoter = KeyValuePromoter::with_options(options.promoter.clone());
        Self {
            options,
            fixer,
            promoter,
        }
    }

    /// Process pages in parallel on a bounded worker pool.
    ///
    /// A worker's failure is isolated: the page's slot becomes an empty
    /// fragment list with the error recorded, and sibling workers are
    /// unaffected.
    pub fn run(&self, extractor: &dyn PageExtractor, page_nums: &[u32]) -> Result<PipelineRun> {
        use rayon::prelude::*;

        let workers = self.options.max_workers.min(page_nums.len()).max(1);
        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(workers)
            .build()
            .map_err(|e| crate::error::Error::Other(e.to_string()))?;

        log::info!(
            "processing {} pages with {} workers",
            page_nums.len(),
            workers
        );

        // The only cross-worker shared mutable state: appends are infrequent
        // relative to per-page work, so one lock suffices.
        let artifacts: Mutex<Vec<ImageArtifact>> = Mutex::new(Vec::new());

        // Index-addressed slots: collect() on the indexed iterator places
        // each page at its input position, independent of completion order.
        let pages: Vec<PageContent> = pool.install(|| {
            page_nums
                .par_iter()
                .map(|&page_num| self.process_page(extractor, page_num, None, &artifacts))
                .collect()
        });

        self.assemble(pages, artifacts.into_inner().unwrap())
    }

    /// Process pages sequentially, carrying each page's summary forward as
    /// context so the extraction service can bias the next page toward
    /// continuation detection.
    pub fn run_with_context(
        &self,
        extractor: &dyn PageExtractor,
        page_nums: &[u32],
    ) -> Result<PipelineRun> {
        let artifacts: Mutex<Vec<ImageArtifact>> = Mutex::new(Vec::new());
        let mut pages = Vec::with_capacity(page_nums.len());
        let mut context: Option<String> = None;

        for &page_num in page_nums {
            let page = self.process_page(extractor, page_num, context.as_deref(), &artifacts);
            context = page.summary.clone();
            pages.push(page);
        }

        self.assemble(pages, artifacts.into_inner().unwrap())
    }

    fn process_page(
        &self,
        extractor: &dyn PageExtractor,
        page_num: u32,
        context: Option<&str>,
        artifacts: &Mutex<Vec<ImageArtifact>>,
    ) -> PageContent {
        let page = match extractor.extract_page(page_num, context) {
            Ok(page) => page,
            Err(e) => {
                log::warn!("page {}: extraction failed: {}", page_num, e);
                return PageContent::failed(page_num, e.to_string());
            }
        };

        let page = self.fixer.fix_page(&page);
        let page = if self.options.promote {
            self.promoter.promote_page(&page)
        } else {
            page
        };

        let found = collect_artifacts(&page);
        if !found.is_empty() {
            artifacts.lock().unwrap().extend(found);
        }

        if let Some(dir) = &self.options.content_dir {
            match PageStore::new(dir).and_then(|store| store.save(&page)) {
                Ok(path) => log::debug!("page {}: persisted to {}", page_num, path.display()),
                Err(e) => log::warn!("page {}: persist failed: {}", page_num, e),
            }
        }

        page
    }

    fn assemble(
        &self,
        pages: Vec<PageContent>,
        artifacts: Vec<ImageArtifact>,
    ) -> Result<PipelineRun> {
        let mut document = Document::new(pages);

        if self.options.merge_pages {
            document.merged = Some(CrossPageMerger::new().merge(&document.pages));
        }

        Ok(PipelineRun {
            document,
            artifacts,
        })
    }
}

impl Default for Pipeline {
    fn default() -> Self {
        Self::new()
    }
}

/// Record the visual regions on a processed page. Degenerate bounding boxes
/// are skipped; the fragment itself is retained.
pub fn collect_artifacts(page: &PageContent) -> Vec<ImageArtifact> {
    page.fragments
        .iter()
        .filter(|f| f.kind == FragmentKind::Image)
        .filter(|f| !f.position.is_degenerate())
        .enumerate()
        .map(|(i, fragment)| ImageArtifact {
            page_num: page.page_num,
            index: fragment.metadata.image_index.unwrap_or(i + 1),
            region: fragment.position,
            description: fragment.metadata.description.clone(),
            image_type: fragment.metadata.image_type.clone(),
            path: None,
        })
        .collect()
}

/// Fill fragment asset paths from resolved artifacts.
///
/// Artifacts match image fragments by their 1-indexed image index, falling
/// back to encounter order when indices are absent or disagree. Returns a
/// new page; fragments without a matching resolved artifact keep rendering
/// as described placeholders.
pub fn link_artifacts(page: &PageContent, artifacts: &[ImageArtifact]) -> PageContent {
    let resolved: Vec<&ImageArtifact> = artifacts
        .iter()
        .filter(|a| a.page_num == page.page_num && a.path.is_some())
        .collect();

    if resolved.is_empty() {
        return page.clone();
    }

    let mut encountered = 0usize;
    let fragments: Vec<Fragment> = page
        .fragments
        .iter()
        .map(|fragment| {
            if fragment.kind != FragmentKind::Image {
                return fragment.clone();
            }
            encountered += 1;

            let by_index = fragment
                .metadata
                .image_index
                .and_then(|idx| resolved.iter().find(|a| a.index == idx));
            let fallback = resolved.get(encountered - 1).copied();

            let mut linked = fragment.clone();
            if let Some(artifact) = by_index.copied().or(fallback) {
                linked.image_path = artifact.path.clone();
            }
            linked
        })
        .collect();

    page.with_fragments(fragments)
}
