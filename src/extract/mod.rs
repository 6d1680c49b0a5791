//! PDF text extraction.
//!
//! The extractor does not understand the PDF format itself. It drives a
//! [`PdfDecoder`] that turns bytes into a [`DecodedPdf`] handle, fans the
//! per-page fragment requests out onto the blocking pool and reassembles the
//! page texts in ascending page order.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use thiserror::Error;
use tokio::sync::Semaphore;
use tokio::task::JoinSet;
use tracing::debug;

#[cfg(test)]
pub(crate) mod fixtures;
mod lopdf_backend;

pub use lopdf_backend::LopdfDecoder;

pub const PAGE_SEPARATOR: &str = "\n\n";
pub const FRAGMENT_SEPARATOR: &str = " ";
pub const DEFAULT_PAGE_CONCURRENCY: usize = 4;

#[derive(Debug, Error)]
pub enum ExtractError {
    #[error("failed to read PDF from {}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error(transparent)]
    Decode(#[from] DecodeError),
}

#[derive(Debug, Error)]
pub enum DecodeError {
    #[error("malformed PDF: {0}")]
    Malformed(String),

    #[error("PDF is encrypted or password protected")]
    Encrypted,

    #[error("failed to decode page {page}: {reason}")]
    Page { page: usize, reason: String },

    #[error("decode task aborted: {0}")]
    Aborted(String),
}

/// Opens a PDF byte buffer.
pub trait PdfDecoder: Send + Sync + 'static {
    type Document: DecodedPdf + 'static;

    fn open(&self, bytes: &[u8]) -> Result<Self::Document, DecodeError>;
}

/// A decoded document. Page numbers are 1-based.
pub trait DecodedPdf: Send + Sync {
    fn page_count(&self) -> usize;

    fn page_fragments(&self, page_number: usize) -> Result<Vec<String>, DecodeError>;
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExtractedText {
    page_count: usize,
    text: String,
}

impl ExtractedText {
    pub fn page_count(&self) -> usize {
        self.page_count
    }

    pub fn as_str(&self) -> &str {
        &self.text
    }
}

#[derive(Debug)]
pub struct PdfTextExtractor<D> {
    decoder: Arc<D>,
    page_concurrency: usize,
}

impl<D: PdfDecoder> PdfTextExtractor<D> {
    pub fn new(decoder: D) -> Self {
        Self {
            decoder: Arc::new(decoder),
            page_concurrency: DEFAULT_PAGE_CONCURRENCY,
        }
    }

    /// Upper bound on page decodes in flight; zero is treated as one.
    pub fn with_page_concurrency(mut self, page_concurrency: usize) -> Self {
        self.page_concurrency = page_concurrency.max(1);
        self
    }

    pub async fn extract(&self, bytes: &[u8]) -> Result<ExtractedText, ExtractError> {
        let owned = bytes.to_vec();
        let decoder = Arc::clone(&self.decoder);
        let document = tokio::task::spawn_blocking(move || decoder.open(&owned))
            .await
            .map_err(|error| DecodeError::Aborted(error.to_string()))??;
        let document = Arc::new(document);

        let page_count = document.page_count();
        debug!(page_count, "decoded PDF document");

        let semaphore = Arc::new(Semaphore::new(self.page_concurrency));
        let mut tasks = JoinSet::new();
        for page_number in 1..=page_count {
            let permit = Arc::clone(&semaphore)
                .acquire_owned()
                .await
                .map_err(|error| DecodeError::Aborted(error.to_string()))?;
            let document = Arc::clone(&document);
            tasks.spawn_blocking(move || {
                let _permit = permit;
                document
                    .page_fragments(page_number)
                    .map(|fragments| (page_number, join_fragments(&fragments)))
            });
        }

        let mut pages = BTreeMap::<usize, String>::new();
        while let Some(joined) = tasks.join_next().await {
            let (page_number, text) =
                joined.map_err(|error| DecodeError::Aborted(error.to_string()))??;
            pages.insert(page_number, text);
        }

        if pages.len() != page_count {
            return Err(DecodeError::Malformed(format!(
                "expected {page_count} pages, decoded {}",
                pages.len()
            ))
            .into());
        }

        Ok(ExtractedText {
            page_count,
            text: pages
                .into_values()
                .collect::<Vec<String>>()
                .join(PAGE_SEPARATOR),
        })
    }

    pub async fn extract_file(&self, path: &Path) -> Result<ExtractedText, ExtractError> {
        let bytes = read_document(path).await?;
        self.extract(&bytes).await
    }
}

pub async fn read_document(path: &Path) -> Result<Vec<u8>, ExtractError> {
    tokio::fs::read(path)
        .await
        .map_err(|source| ExtractError::Io {
            path: path.to_path_buf(),
            source,
        })
}

fn join_fragments(fragments: &[String]) -> String {
    fragments.join(FRAGMENT_SEPARATOR)
}
