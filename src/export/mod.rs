//! Bulk export of image search results as a labeled dataset.
//!
//! For each [`TermLabelPair`] the exporter runs the image search, downloads
//! every selected result and files it under `Images/<label-or-term>/`, either
//! on disk ([`DatasetExporter::export_to_disk`]) or inside an in-memory zip
//! archive ([`DatasetExporter::export_to_zip`]).
//!
//! Everything runs sequentially: one term, one page, one download at a time.
//! A failed download or write is logged and counted, and the run moves on to
//! the next item. A failed *search* aborts the whole export, as does
//! cancellation. Files or entries written before the abort are left as they
//! are.
//!
//! The two variants page differently, see [`PagePlan::disk`] and
//! [`PagePlan::zip`].

mod filename;
mod plan;

pub use filename::{
    derive_file_name, folder_name, IMAGES_FOLDER, SYNTHESIZED_EXTENSION, UNNAMED_FOLDER,
};
pub use plan::{PagePlan, DISK_ITEMS_PER_PAGE, ITEMS_PER_PAGE, TOTAL_ITEMS_TO_RETRIEVE};

use std::future::Future;
use std::io::{Cursor, Write};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipWriter};

use crate::client::{ContentFetcher, ImageSearch, SearchError};
use crate::models::{
    ExportSummary, ImageResult, ImageSearchPage, SafeSearchMode, SearchQuery, TermLabelPair,
};
use filename::EntryNames;

/// Errors that can occur during an export
#[derive(Debug, thiserror::Error)]
pub enum ExportError {
    /// The search call for a term failed; aborts the export
    #[error(transparent)]
    Search(#[from] SearchError),

    /// Downloading a single item failed
    #[error("Failed to download {url}: {source}")]
    Download {
        url: String,
        #[source]
        source: SearchError,
    },

    /// The search result carried no content URL
    #[error("Result has no content URL")]
    MissingContentUrl,

    /// The base folder handed to a disk export does not exist
    #[error("Export folder does not exist: {}", .0.display())]
    MissingTarget(PathBuf),

    /// Filesystem error
    #[error("IO error: {0}")]
    Storage(#[from] std::io::Error),

    /// Zip writer error
    #[error("Archive error: {0}")]
    Archive(#[from] zip::result::ZipError),

    #[error("Export cancelled")]
    Cancelled,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ItemOutcome {
    Stored,
    Skipped,
}

/// Turns labeled search terms into a downloaded image collection
#[derive(Debug, Clone)]
pub struct DatasetExporter {
    search: Arc<dyn ImageSearch>,
    fetcher: Arc<dyn ContentFetcher>,
    disk_plan: PagePlan,
    zip_plan: PagePlan,
}

impl DatasetExporter {
    pub fn new(search: Arc<dyn ImageSearch>, fetcher: Arc<dyn ContentFetcher>) -> Self {
        Self {
            search,
            fetcher,
            disk_plan: PagePlan::disk(),
            zip_plan: PagePlan::zip(),
        }
    }

    /// Override the paging used by [`export_to_disk`](Self::export_to_disk)
    pub fn with_disk_plan(mut self, plan: PagePlan) -> Self {
        self.disk_plan = plan;
        self
    }

    /// Override the paging used by [`export_to_zip`](Self::export_to_zip)
    pub fn with_zip_plan(mut self, plan: PagePlan) -> Self {
        self.zip_plan = plan;
        self
    }

    /// Download results into `<base_folder>/Images/<label-or-term>/`.
    ///
    /// The label becomes a single folder name via [`folder_name`], so nothing
    /// is written outside `<base_folder>/Images`.
    ///
    /// `base_folder` must already exist; label folders are created as needed.
    /// With `overwrite` off, items whose file already exists are skipped
    /// without a download.
    pub async fn export_to_disk(
        &self,
        pairs: &[TermLabelPair],
        base_folder: &Path,
        safe_search: SafeSearchMode,
        overwrite: bool,
        cancel: &CancellationToken,
    ) -> Result<ExportSummary, ExportError> {
        if !tokio::fs::metadata(base_folder)
            .await
            .map(|m| m.is_dir())
            .unwrap_or(false)
        {
            return Err(ExportError::MissingTarget(base_folder.to_path_buf()));
        }

        let plan = self.disk_plan;
        let mut summary = ExportSummary::default();

        for pair in pairs {
            let folder = base_folder
                .join(IMAGES_FOLDER)
                .join(folder_name(pair.label_or_term()));
            let total_pages = plan.page_count();

            for page_index in 0..total_pages {
                let offset = plan.offset(page_index);
                tracing::info!(
                    "Searching term: {}. Page: {} of {}",
                    pair.term,
                    page_index + 1,
                    total_pages
                );
                let page = self
                    .search_page(pair, safe_search, plan.page_size, offset, cancel)
                    .await?;

                for item in page.items.iter().take(plan.item_limit()) {
                    match self.store_on_disk(item, &folder, overwrite, cancel).await {
                        Ok(ItemOutcome::Stored) => summary.stored += 1,
                        Ok(ItemOutcome::Skipped) => summary.skipped += 1,
                        Err(ExportError::Cancelled) => return Err(ExportError::Cancelled),
                        Err(e) => {
                            tracing::warn!(term = %pair.term, "Skipping image: {}", e);
                            summary.failed += 1;
                        }
                    }
                }

                if plan.is_last_page(&page) {
                    break;
                }
            }
        }

        tracing::info!(
            stored = summary.stored,
            skipped = summary.skipped,
            failed = summary.failed,
            "Disk export finished"
        );
        Ok(summary)
    }

    async fn store_on_disk(
        &self,
        item: &ImageResult,
        folder: &Path,
        overwrite: bool,
        cancel: &CancellationToken,
    ) -> Result<ItemOutcome, ExportError> {
        let url = content_url(item)?;
        let destination = folder.join(derive_file_name(url));

        if !overwrite && tokio::fs::try_exists(&destination).await? {
            tracing::debug!("Already exists, skipping: {}", destination.display());
            return Ok(ItemOutcome::Skipped);
        }

        tracing::info!("Downloading image from: {}", url);
        let bytes = self.fetch(url, cancel).await?;

        tokio::fs::create_dir_all(folder).await?;
        tokio::fs::write(&destination, &bytes).await?;
        Ok(ItemOutcome::Stored)
    }

    /// Download results into a zip archive held in memory.
    ///
    /// Entries are named `Images/<label-or-term>/<file name>` in discovery
    /// order, with the label passed through [`folder_name`]. The returned
    /// cursor is positioned at the start of the archive.
    pub async fn export_to_zip(
        &self,
        pairs: &[TermLabelPair],
        safe_search: SafeSearchMode,
        cancel: &CancellationToken,
    ) -> Result<Cursor<Vec<u8>>, ExportError> {
        let plan = self.zip_plan;
        let options = SimpleFileOptions::default().compression_method(CompressionMethod::Stored);
        let mut writer = ZipWriter::new(Cursor::new(Vec::new()));
        let mut names = EntryNames::new();
        let mut summary = ExportSummary::default();

        for pair in pairs {
            let label = pair.label_or_term();
            let total_pages = plan.page_count();

            for page_index in 0..total_pages {
                let offset = plan.offset(page_index);
                tracing::info!(
                    "Searching term: {}. Page: {} of {}",
                    pair.term,
                    page_index + 1,
                    total_pages
                );
                let page = self
                    .search_page(pair, safe_search, plan.page_size, offset, cancel)
                    .await?;

                for item in page.items.iter().take(plan.item_limit()) {
                    let fetched = match content_url(item) {
                        Ok(url) => self.fetch(url, cancel).await.map(|bytes| (url, bytes)),
                        Err(e) => Err(e),
                    };

                    let result = fetched.and_then(|(url, bytes)| {
                        let name = names.reserve(label, &derive_file_name(url));
                        writer.start_file(name, options)?;
                        writer.write_all(&bytes)?;
                        Ok(())
                    });

                    match result {
                        Ok(()) => summary.stored += 1,
                        Err(ExportError::Cancelled) => return Err(ExportError::Cancelled),
                        Err(e) => {
                            tracing::warn!(term = %pair.term, "Skipping image: {}", e);
                            summary.failed += 1;
                        }
                    }
                }

                if plan.is_last_page(&page) {
                    break;
                }
            }
        }

        let mut archive = writer.finish()?;
        archive.set_position(0);

        tracing::info!(
            stored = summary.stored,
            failed = summary.failed,
            bytes = archive.get_ref().len(),
            "Zip export finished"
        );
        Ok(archive)
    }

    async fn search_page(
        &self,
        pair: &TermLabelPair,
        safe_search: SafeSearchMode,
        page_size: u32,
        offset: u32,
        cancel: &CancellationToken,
    ) -> Result<ImageSearchPage, ExportError> {
        let query = SearchQuery::new(pair.term.clone())
            .safe_search(safe_search)
            .count(page_size)
            .offset(offset);

        let page = cancellable(cancel, self.search.search_images(&query)).await?;
        Ok(page?)
    }

    async fn fetch(&self, url: &str, cancel: &CancellationToken) -> Result<Vec<u8>, ExportError> {
        cancellable(cancel, self.fetcher.fetch(url))
            .await?
            .map_err(|source| ExportError::Download {
                url: url.to_string(),
                source,
            })
    }
}

fn content_url(item: &ImageResult) -> Result<&str, ExportError> {
    item.content_url
        .as_deref()
        .filter(|url| !url.trim().is_empty())
        .ok_or(ExportError::MissingContentUrl)
}

/// Run `future` unless `cancel` fires first
async fn cancellable<F: Future>(
    cancel: &CancellationToken,
    future: F,
) -> Result<F::Output, ExportError> {
    tokio::select! {
        biased;
        _ = cancel.cancelled() => Err(ExportError::Cancelled),
        output = future => Ok(output),
    }
}
