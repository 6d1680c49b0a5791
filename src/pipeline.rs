//! Per-document preparation: read, extract, normalize.

use std::path::{Path, PathBuf};

use thiserror::Error;
use tracing::info;

use crate::extract::{ExtractError, PdfDecoder, PdfTextExtractor, read_document};
use crate::model::{AnalysisPayload, DocumentRole, DocumentSummary};
use crate::normalize::TextNormalizer;
use crate::util::sha256_bytes;

#[derive(Debug, Error)]
#[error("failed to prepare {role} report {}", path.display())]
pub struct PrepareError {
    pub role: DocumentRole,
    pub path: PathBuf,
    #[source]
    pub source: ExtractError,
}

#[derive(Debug, Clone)]
pub struct PreparedDocument {
    pub role: DocumentRole,
    pub path: PathBuf,
    pub sha256: String,
    pub page_count: usize,
    pub raw_char_count: usize,
    pub clean_text: String,
}

impl PreparedDocument {
    pub fn summary(&self) -> DocumentSummary {
        DocumentSummary {
            role: self.role,
            path: self.path.display().to_string(),
            sha256: self.sha256.clone(),
            page_count: self.page_count,
            raw_char_count: self.raw_char_count,
            clean_char_count: self.clean_text.chars().count(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct PreparedPair {
    pub entrada: PreparedDocument,
    pub saida: PreparedDocument,
}

impl PreparedPair {
    pub fn payload(&self) -> AnalysisPayload {
        AnalysisPayload {
            entrada: self.entrada.clean_text.clone(),
            saida: self.saida.clean_text.clone(),
        }
    }

    pub fn summaries(&self) -> Vec<DocumentSummary> {
        vec![self.entrada.summary(), self.saida.summary()]
    }
}

pub async fn prepare_document<D: PdfDecoder>(
    extractor: &PdfTextExtractor<D>,
    normalizer: &TextNormalizer,
    role: DocumentRole,
    path: &Path,
) -> Result<PreparedDocument, PrepareError> {
    let wrap = |source: ExtractError| PrepareError {
        role,
        path: path.to_path_buf(),
        source,
    };

    let bytes = read_document(path).await.map_err(wrap)?;
    let sha256 = sha256_bytes(&bytes);
    let extracted = extractor.extract(&bytes).await.map_err(wrap)?;

    let raw_char_count = extracted.as_str().chars().count();
    let clean_text = normalizer.normalize(extracted.as_str());

    info!(
        role = %role,
        path = %path.display(),
        pages = extracted.page_count(),
        raw_chars = raw_char_count,
        clean_chars = clean_text.chars().count(),
        "prepared report text"
    );

    Ok(PreparedDocument {
        role,
        path: path.to_path_buf(),
        sha256,
        page_count: extracted.page_count(),
        raw_char_count,
        clean_text,
    })
}

/// Prepares both reports concurrently; the first failure aborts the pair.
pub async fn prepare_pair<D: PdfDecoder>(
    extractor: &PdfTextExtractor<D>,
    normalizer: &TextNormalizer,
    entrada: &Path,
    saida: &Path,
) -> Result<PreparedPair, PrepareError> {
    let (entrada, saida) = tokio::try_join!(
        prepare_document(extractor, normalizer, DocumentRole::Entrada, entrada),
        prepare_document(extractor, normalizer, DocumentRole::Saida, saida),
    )?;

    Ok(PreparedPair { entrada, saida })
}
