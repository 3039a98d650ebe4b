//! PDF text extraction, page by page.

use lopdf::Document;
use pmpai_core::error::{PmpError, Result};

/// Extract text from every page in page order, separating pages with a
/// blank line. A page that yields no text is logged and treated as empty;
/// one bad page must not fail the whole document.
pub fn extract_pdf(bytes: &[u8]) -> Result<String> {
    let doc = Document::load_mem(bytes).map_err(|e| PmpError::ExtractionFailed {
        stage: "pdf-extract".into(),
        reason: format!("failed to parse PDF: {e}"),
    })?;

    let pages = doc.get_pages();
    let mut page_texts = Vec::with_capacity(pages.len());
    for (page_num, _) in pages.iter() {
        match doc.extract_text(&[*page_num]) {
            Ok(text) => page_texts.push(text.trim().to_string()),
            Err(e) => {
                tracing::warn!("PDF page {page_num} yielded no text: {e}");
                page_texts.push(String::new());
            }
        }
    }

    Ok(page_texts.join("\n\n"))
}
