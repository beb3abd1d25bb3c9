//! PDF page extraction behind a narrow trait so the ingestion pipeline can be
//! exercised without real documents.

use lopdf::Document;
use std::path::Path;
use thiserror::Error;

/// Errors raised while reading a PDF file.
#[derive(Debug, Error)]
pub enum PdfError {
    /// The file could not be parsed as a PDF, or a page refused to yield text.
    #[error("failed to read PDF: {0}")]
    Parse(String),
}

/// Raw text of a single page, before normalization.
#[derive(Debug, Clone)]
pub struct PageText {
    /// 1-based page number.
    pub number: u32,
    /// Extracted page text; may be empty or whitespace-only.
    pub text: String,
}

/// Interface implemented by PDF text extractors.
pub trait PdfExtractor: Send + Sync {
    /// Extract the text of every page of the document at `path`.
    fn extract_pages(&self, path: &Path) -> Result<Vec<PageText>, PdfError>;
}

/// `lopdf`-backed extractor used in production.
#[derive(Default)]
pub struct LopdfExtractor;

impl PdfExtractor for LopdfExtractor {
    fn extract_pages(&self, path: &Path) -> Result<Vec<PageText>, PdfError> {
        let document = Document::load(path).map_err(|error| PdfError::Parse(error.to_string()))?;

        let mut pages = Vec::new();
        for (page_no, _page_id) in document.get_pages() {
            let text = document
                .extract_text(&[page_no])
                .map_err(|error| PdfError::Parse(error.to_string()))?;
            pages.push(PageText {
                number: page_no,
                text,
            });
        }

        Ok(pages)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn malformed_file_reports_parse_error() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("broken.pdf");
        std::fs::write(&path, b"this is not a pdf").expect("write");

        let error = LopdfExtractor
            .extract_pages(&path)
            .expect_err("parse should fail");
        assert!(matches!(error, PdfError::Parse(_)));
    }
}
