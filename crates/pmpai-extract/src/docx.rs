//! DOCX (word-processing XML) text extraction.

use std::io::{Cursor, Read};

use quick_xml::events::Event;
use quick_xml::Reader;

use pmpai_core::error::{PmpError, Result};

/// Pull `word/document.xml` out of the zip container and collect the text
/// runs: `<w:t>` contents concatenated, one line per `<w:p>` paragraph,
/// tabs and explicit breaks preserved as whitespace.
pub fn extract_docx(bytes: &[u8]) -> Result<String> {
    let mut archive =
        zip::ZipArchive::new(Cursor::new(bytes)).map_err(|e| PmpError::ExtractionFailed {
            stage: "docx-extract".into(),
            reason: format!("not a zip container: {e}"),
        })?;

    let mut xml = String::new();
    archive
        .by_name("word/document.xml")
        .map_err(|e| PmpError::ExtractionFailed {
            stage: "docx-extract".into(),
            reason: format!("word/document.xml missing: {e}"),
        })?
        .read_to_string(&mut xml)
        .map_err(|e| PmpError::ExtractionFailed {
            stage: "docx-extract".into(),
            reason: format!("failed to read document.xml: {e}"),
        })?;

    parse_document_xml(&xml)
}

fn parse_document_xml(xml: &str) -> Result<String> {
    let mut reader = Reader::from_str(xml);
    let mut out = String::new();
    let mut in_text_run = false;

    loop {
        match reader.read_event() {
            Ok(Event::Start(e)) => match e.name().as_ref() {
                b"w:t" => in_text_run = true,
                b"w:tab" => out.push('\t'),
                b"w:br" => out.push('\n'),
                _ => {}
            },
            Ok(Event::Empty(e)) => match e.name().as_ref() {
                b"w:tab" => out.push('\t'),
                b"w:br" => out.push('\n'),
                _ => {}
            },
            Ok(Event::Text(t)) if in_text_run => {
                let text = t.unescape().map_err(|e| PmpError::ExtractionFailed {
                    stage: "docx-extract".into(),
                    reason: format!("bad XML escape: {e}"),
                })?;
                out.push_str(&text);
            }
            Ok(Event::End(e)) => match e.name().as_ref() {
                b"w:t" => in_text_run = false,
                b"w:p" => out.push('\n'),
                _ => {}
            },
            Ok(Event::Eof) => break,
            Err(e) => {
                return Err(PmpError::ExtractionFailed {
                    stage: "docx-extract".into(),
                    reason: format!("malformed XML: {e}"),
                });
            }
            _ => {}
        }
    }

    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use zip::write::SimpleFileOptions;

    fn docx_with(xml: &str) -> Vec<u8> {
        let mut writer = zip::ZipWriter::new(Cursor::new(Vec::new()));
        let options =
            SimpleFileOptions::default().compression_method(zip::CompressionMethod::Stored);
        writer.start_file("word/document.xml", options).unwrap();
        writer.write_all(xml.as_bytes()).unwrap();
        writer.finish().unwrap().into_inner()
    }

    #[test]
    fn test_paragraphs_and_runs() {
        let bytes = docx_with(
            r#"<?xml version="1.0"?>
            <w:document xmlns:w="http://schemas.openxmlformats.org/wordprocessingml/2006/main">
              <w:body>
                <w:p><w:r><w:t>Project charter</w:t></w:r></w:p>
                <w:p><w:r><w:t>Risk </w:t></w:r><w:r><w:t>register</w:t></w:r></w:p>
              </w:body>
            </w:document>"#,
        );
        let text = extract_docx(&bytes).unwrap();
        assert_eq!(text.trim(), "Project charter\nRisk register");
    }

    #[test]
    fn test_ignores_non_text_nodes() {
        let bytes = docx_with(
            r#"<w:document xmlns:w="ns"><w:body>
              <w:p><w:pPr><w:pStyle w:val="Heading1"/></w:pPr><w:r><w:t>里程碑</w:t></w:r></w:p>
            </w:body></w:document>"#,
        );
        assert_eq!(extract_docx(&bytes).unwrap().trim(), "里程碑");
    }

    #[test]
    fn test_not_a_zip() {
        let err = extract_docx(b"plain bytes").unwrap_err();
        assert!(matches!(err, PmpError::ExtractionFailed { .. }));
    }

    #[test]
    fn test_missing_document_xml() {
        let mut writer = zip::ZipWriter::new(Cursor::new(Vec::new()));
        let options =
            SimpleFileOptions::default().compression_method(zip::CompressionMethod::Stored);
        writer.start_file("other.txt", options).unwrap();
        writer.write_all(b"hi").unwrap();
        let bytes = writer.finish().unwrap().into_inner();
        let err = extract_docx(&bytes).unwrap_err();
        assert!(matches!(err, PmpError::ExtractionFailed { .. }));
    }
}
