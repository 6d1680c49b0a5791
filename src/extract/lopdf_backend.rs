use lopdf::Document;
use tracing::debug;

use super::{DecodeError, DecodedPdf, PdfDecoder};

/// [`PdfDecoder`] backed by `lopdf`.
#[derive(Debug, Clone, Copy, Default)]
pub struct LopdfDecoder;

#[derive(Debug)]
pub struct LopdfDocument {
    document: Document,
    page_numbers: Vec<u32>,
}

impl PdfDecoder for LopdfDecoder {
    type Document = LopdfDocument;

    fn open(&self, bytes: &[u8]) -> Result<Self::Document, DecodeError> {
        let mut document =
            Document::load_mem(bytes).map_err(|error| DecodeError::Malformed(error.to_string()))?;

        // Owner-password-only files open with the empty user password.
        if document.is_encrypted() {
            document.decrypt("").map_err(|error| {
                debug!(error = %error, "PDF requires a user password");
                DecodeError::Encrypted
            })?;
            debug!("decrypted PDF with the empty user password");
        }

        let page_numbers = document.get_pages().into_keys().collect::<Vec<u32>>();

        Ok(LopdfDocument {
            document,
            page_numbers,
        })
    }
}

impl DecodedPdf for LopdfDocument {
    fn page_count(&self) -> usize {
        self.page_numbers.len()
    }

    fn page_fragments(&self, page_number: usize) -> Result<Vec<String>, DecodeError> {
        let lopdf_page = page_number
            .checked_sub(1)
            .and_then(|index| self.page_numbers.get(index))
            .copied()
            .ok_or_else(|| DecodeError::Page {
                page: page_number,
                reason: format!("document has {} pages", self.page_numbers.len()),
            })?;

        let text = self
            .document
            .extract_text(&[lopdf_page])
            .map_err(|error| DecodeError::Page {
                page: page_number,
                reason: error.to_string(),
            })?;

        Ok(split_text_objects(&text))
    }
}

// lopdf terminates every text object (BT..ET) with a newline.
fn split_text_objects(text: &str) -> Vec<String> {
    text.split('\n')
        .map(|fragment| fragment.trim_end_matches('\r'))
        .filter(|fragment| !fragment.trim().is_empty())
        .map(ToOwned::to_owned)
        .collect()
}
