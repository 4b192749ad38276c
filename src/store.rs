//! Persisted intermediate state: one JSON document per page.
//!
//! Pages are written under a deterministic naming scheme
//! (`page_<n>_content.json`) so any single page can be reprocessed,
//! inspected, or repaired independently of the rest of the document.

use crate::error::{Error, Result};
use crate::model::PageContent;
use crate::payload::parse_page_payload;
use std::fs;
use std::path::{Path, PathBuf};

/// A directory of per-page content files.
#[derive(Debug, Clone)]
pub struct PageStore {
    dir: PathBuf,
}

impl PageStore {
    /// Open a store rooted at `dir`, creating the directory if needed.
    pub fn new(dir: impl Into<PathBuf>) -> Result<Self> {
        let dir = dir.into();
        fs::create_dir_all(&dir)?;
        Ok(Self { dir })
    }

    /// The store's directory.
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Path of a page's content file.
    pub fn page_path(&self, page_num: u32) -> PathBuf {
        self.dir.join(format!("page_{}_content.json", page_num))
    }

    /// Persist a page's post-fix, post-promotion fragment list.
    pub fn save(&self, page: &PageContent) -> Result<PathBuf> {
        let path = self.page_path(page.page_num);
        let json = serde_json::to_string_pretty(page)
            .map_err(|e| Error::Store(format!("serialize page {}: {}", page.page_num, e)))?;
        fs::write(&path, json)?;
        Ok(path)
    }

    /// Load one page. The payload parser's repair pass applies here too, so
    /// a hand-edited file gets the same tolerance as a service response.
    pub fn load(&self, page_num: u32) -> Result<PageContent> {
        let path = self.page_path(page_num);
        let raw = fs::read_to_string(&path)
            .map_err(|e| Error::Store(format!("read {}: {}", path.display(), e)))?;
        parse_page_payload(&raw, page_num)
    }

    /// Page numbers present in the store, in ascending order.
    pub fn page_numbers(&self) -> Result<Vec<u32>> {
        let mut numbers = Vec::new();
        for entry in fs::read_dir(&self.dir)? {
            let entry = entry?;
            if let Some(num) = parse_page_file_name(&entry.file_name().to_string_lossy()) {
                numbers.push(num);
            }
        }
        numbers.sort_unstable();
        Ok(numbers)
    }

    /// Load every stored page, ordered by page number. Unreadable pages
    /// degrade to empty pages with the failure recorded.
    pub fn load_all(&self) -> Result<Vec<PageContent>> {
        self.page_numbers()?
            .into_iter()
            .map(|n| {
                Ok(self.load(n).unwrap_or_else(|e| {
                    log::warn!("page {}: unreadable, substituting empty page: {}", n, e);
                    PageContent::failed(n, e.to_string())
                }))
            })
            .collect()
    }
}

fn parse_page_file_name(name: &str) -> Option<u32> {
    name.strip_prefix("page_")?
        .strip_suffix("_content.json")?
        .parse()
        .ok()
}
