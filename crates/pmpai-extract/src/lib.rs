//! # PMP.AI Text Extraction
//!
//! Converts uploaded binary documents into UTF-8 text, routed by declared
//! MIME type with a filename-extension fallback. Three decoders:
//! - plain text / markdown: straight UTF-8 decode
//! - DOCX: `word/document.xml` out of the zip container, `<w:t>` runs
//! - PDF: page-by-page extraction, pages joined with a blank line
//!
//! Output shorter than a configured floor is rejected as `EmptyContent`;
//! chunking and embedding near-empty text is meaningless downstream.

mod docx;
mod pdf;

use pmpai_core::error::{PmpError, Result};

/// Decodable container formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocumentFormat {
    PlainText,
    Markdown,
    Docx,
    Pdf,
}

impl DocumentFormat {
    /// Route by MIME type first, filename extension second.
    ///
    /// Pure function: maps the container format (how to decode), not the
    /// semantic document type.
    pub fn from_mime_and_name(mime: &str, filename: &str) -> Result<Self> {
        let mime = mime
            .split(';')
            .next()
            .unwrap_or_default()
            .trim()
            .to_lowercase();

        match mime.as_str() {
            "application/pdf" => return Ok(Self::Pdf),
            "application/vnd.openxmlformats-officedocument.wordprocessingml.document" => {
                return Ok(Self::Docx);
            }
            "text/markdown" => return Ok(Self::Markdown),
            "text/plain" => return Ok(Self::PlainText),
            _ => {}
        }
        if mime.starts_with("text/") {
            return Ok(Self::PlainText);
        }

        // Extension fallback for clients that send application/octet-stream
        let ext = filename
            .rsplit('.')
            .next()
            .unwrap_or_default()
            .to_lowercase();
        match ext.as_str() {
            "pdf" => Ok(Self::Pdf),
            "docx" => Ok(Self::Docx),
            "md" | "markdown" => Ok(Self::Markdown),
            "txt" | "text" | "log" | "csv" => Ok(Self::PlainText),
            _ => Err(PmpError::UnsupportedFormat(format!(
                "no decoder for mime '{mime}', file '{filename}'"
            ))),
        }
    }
}

/// Format-routing text extractor with a minimum-viable-length floor.
#[derive(Debug, Clone)]
pub struct TextExtractor {
    min_text_len: usize,
}

impl TextExtractor {
    /// `min_text_len`: shortest extracted text considered usable. The
    /// generic intake uses 10; the AI-analysis intake uses 100.
    pub fn new(min_text_len: usize) -> Self {
        Self { min_text_len }
    }

    /// Decode `bytes` into text according to the declared MIME type.
    pub fn extract(&self, bytes: &[u8], mime: &str, filename: &str) -> Result<String> {
        let format = DocumentFormat::from_mime_and_name(mime, filename)?;
        let text = match format {
            DocumentFormat::PlainText | DocumentFormat::Markdown => {
                String::from_utf8_lossy(bytes).into_owned()
            }
            DocumentFormat::Docx => docx::extract_docx(bytes)?,
            DocumentFormat::Pdf => pdf::extract_pdf(bytes)?,
        };

        let text = text.trim().to_string();
        let length = text.chars().count();
        if length < self.min_text_len {
            return Err(PmpError::EmptyContent {
                stage: stage_name(format).to_string(),
                length,
                min: self.min_text_len,
            });
        }
        Ok(text)
    }
}

fn stage_name(format: DocumentFormat) -> &'static str {
    match format {
        DocumentFormat::PlainText => "text-decode",
        DocumentFormat::Markdown => "markdown-decode",
        DocumentFormat::Docx => "docx-extract",
        DocumentFormat::Pdf => "pdf-extract",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_route_by_mime() {
        assert_eq!(
            DocumentFormat::from_mime_and_name("application/pdf", "x").unwrap(),
            DocumentFormat::Pdf
        );
        assert_eq!(
            DocumentFormat::from_mime_and_name(
                "application/vnd.openxmlformats-officedocument.wordprocessingml.document",
                "report"
            )
            .unwrap(),
            DocumentFormat::Docx
        );
        assert_eq!(
            DocumentFormat::from_mime_and_name("text/plain; charset=utf-8", "a").unwrap(),
            DocumentFormat::PlainText
        );
        assert_eq!(
            DocumentFormat::from_mime_and_name("text/x-rust", "main.rs").unwrap(),
            DocumentFormat::PlainText
        );
    }

    #[test]
    fn test_route_by_extension_fallback() {
        assert_eq!(
            DocumentFormat::from_mime_and_name("application/octet-stream", "plan.PDF").unwrap(),
            DocumentFormat::Pdf
        );
        assert_eq!(
            DocumentFormat::from_mime_and_name("", "notes.md").unwrap(),
            DocumentFormat::Markdown
        );
    }

    #[test]
    fn test_unknown_format_rejected() {
        let err = DocumentFormat::from_mime_and_name("image/png", "photo.png").unwrap_err();
        assert!(matches!(err, PmpError::UnsupportedFormat(_)));
    }

    #[test]
    fn test_plain_text_extraction() {
        let ex = TextExtractor::new(10);
        let text = ex
            .extract("项目管理是一门系统工程学科。".as_bytes(), "text/plain", "a.txt")
            .unwrap();
        assert_eq!(text, "项目管理是一门系统工程学科。");
    }

    #[test]
    fn test_sub_threshold_is_empty_content_not_success() {
        let ex = TextExtractor::new(10);
        let err = ex.extract(b"short", "text/plain", "a.txt").unwrap_err();
        assert!(matches!(err, PmpError::EmptyContent { length: 5, min: 10, .. }));
    }

    #[test]
    fn test_empty_input_is_empty_content() {
        let ex = TextExtractor::new(10);
        let err = ex.extract(b"   \n  ", "text/plain", "a.txt").unwrap_err();
        assert!(matches!(err, PmpError::EmptyContent { length: 0, .. }));
    }

    #[test]
    fn test_analysis_intake_threshold() {
        // The AI-analysis path uses a stricter 100-char floor.
        let ex = TextExtractor::new(100);
        let text = "a".repeat(99);
        assert!(ex.extract(text.as_bytes(), "text/plain", "a.txt").is_err());
        let text = "a".repeat(100);
        assert!(ex.extract(text.as_bytes(), "text/plain", "a.txt").is_ok());
    }

    #[test]
    fn test_garbage_pdf_is_extraction_failed() {
        let ex = TextExtractor::new(10);
        let err = ex
            .extract(b"definitely not a pdf", "application/pdf", "x.pdf")
            .unwrap_err();
        assert!(matches!(err, PmpError::ExtractionFailed { .. }));
    }
}
