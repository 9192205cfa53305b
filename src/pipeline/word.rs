//! Raw text from Word (`.docx`) documents.
//!
//! A `.docx` is a zip archive; the body lives in `word/document.xml` as
//! paragraphs (`w:p`) of runs (`w:r`) holding text (`w:t`). Formatting,
//! headers, footers and comments are ignored.

use crate::error::SmartFlipError;
use quick_xml::events::Event;
use quick_xml::Reader;
use std::io::{Cursor, Read};
use tracing::debug;
use zip::ZipArchive;

const DOCUMENT_PART: &str = "word/document.xml";

/// Extract the raw text of a `.docx` held in memory.
///
/// Paragraphs are separated by a blank line, `w:tab` becomes a tab and
/// `w:br`/`w:cr` a newline. The result is trimmed.
pub fn extract_docx_text(data: &[u8], name: &str) -> Result<String, SmartFlipError> {
    let corrupt = |detail: String| SmartFlipError::CorruptFile {
        name: name.to_string(),
        detail,
    };

    let mut archive =
        ZipArchive::new(Cursor::new(data)).map_err(|e| corrupt(format!("not a zip archive: {e}")))?;
    let mut xml = String::new();
    archive
        .by_name(DOCUMENT_PART)
        .map_err(|e| corrupt(format!("{DOCUMENT_PART}: {e}")))?
        .read_to_string(&mut xml)
        .map_err(|e| corrupt(format!("{DOCUMENT_PART}: {e}")))?;

    let text = document_text(&xml).map_err(corrupt)?;
    let text = text.trim();
    if text.is_empty() {
        return Err(SmartFlipError::EmptyExtraction {
            name: name.to_string(),
        });
    }

    debug!("Word document '{}': {} chars", name, text.chars().count());
    Ok(text.to_string())
}

/// Walk `document.xml` and collect the visible text.
fn document_text(xml: &str) -> Result<String, String> {
    let mut reader = Reader::from_str(xml);
    let mut out = String::new();
    let mut in_run = false;
    let mut in_text = false;

    loop {
        match reader.read_event() {
            Ok(Event::Start(ref e)) => match e.name().as_ref() {
                b"w:r" => in_run = true,
                b"w:t" => in_text = true,
                _ => {}
            },
            Ok(Event::End(ref e)) => match e.name().as_ref() {
                b"w:r" => in_run = false,
                b"w:t" => in_text = false,
                b"w:p" => out.push_str("\n\n"),
                _ => {}
            },
            Ok(Event::Empty(ref e)) => match e.name().as_ref() {
                // w:tab also appears as a tab-stop definition in paragraph
                // properties; only a tab inside a run is content.
                b"w:tab" if in_run => out.push('\t'),
                b"w:br" | b"w:cr" if in_run => out.push('\n'),
                b"w:p" => out.push_str("\n\n"),
                _ => {}
            },
            Ok(Event::Text(e)) if in_text => {
                let text = e.unescape().map_err(|e| e.to_string())?;
                out.push_str(&text);
            }
            Ok(Event::Eof) => break,
            Err(e) => {
                return Err(format!(
                    "XML error at byte {}: {e}",
                    reader.buffer_position()
                ))
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
    use zip::ZipWriter;

    fn docx(body: &str) -> Vec<u8> {
        let xml = format!(
            r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<w:document xmlns:w="http://schemas.openxmlformats.org/wordprocessingml/2006/main"><w:body>{body}</w:body></w:document>"#
        );
        let mut zip = ZipWriter::new(Cursor::new(Vec::new()));
        let options = SimpleFileOptions::default();
        zip.start_file("[Content_Types].xml", options).unwrap();
        zip.write_all(b"<Types/>").unwrap();
        zip.start_file(DOCUMENT_PART, options).unwrap();
        zip.write_all(xml.as_bytes()).unwrap();
        zip.finish().unwrap().into_inner()
    }

    #[test]
    fn paragraphs_are_separated_by_blank_lines() {
        let data = docx(
            r#"<w:p><w:r><w:t>La fotosíntesis</w:t></w:r></w:p>
               <w:p><w:r><w:t xml:space="preserve">ocurre en </w:t></w:r><w:r><w:t>los cloroplastos.</w:t></w:r></w:p>"#,
        );
        let text = extract_docx_text(&data, "bio.docx").unwrap();
        assert_eq!(text, "La fotosíntesis\n\nocurre en los cloroplastos.");
    }

    #[test]
    fn tabs_breaks_and_entities() {
        let data = docx(
            r#"<w:p><w:pPr><w:tabs><w:tab w:val="left" w:pos="720"/></w:tabs></w:pPr>
               <w:r><w:t>A</w:t><w:tab/><w:t>B &amp; C</w:t><w:br/><w:t>D</w:t></w:r></w:p>"#,
        );
        let text = extract_docx_text(&data, "t.docx").unwrap();
        assert_eq!(text, "A\tB & C\nD");
    }

    #[test]
    fn document_without_text_is_empty_extraction() {
        let data = docx("<w:p/><w:p><w:r></w:r></w:p>");
        let err = extract_docx_text(&data, "vacio.docx").unwrap_err();
        assert!(matches!(err, SmartFlipError::EmptyExtraction { ref name } if name == "vacio.docx"));
    }

    #[test]
    fn non_zip_is_corrupt() {
        let err = extract_docx_text(b"PK not really", "x.docx").unwrap_err();
        assert!(matches!(err, SmartFlipError::CorruptFile { .. }));
    }

    #[test]
    fn zip_without_document_part_is_corrupt() {
        let mut zip = ZipWriter::new(Cursor::new(Vec::new()));
        zip.start_file("hello.txt", SimpleFileOptions::default()).unwrap();
        zip.write_all(b"hi").unwrap();
        let data = zip.finish().unwrap().into_inner();

        let err = extract_docx_text(&data, "x.docx").unwrap_err();
        match err {
            SmartFlipError::CorruptFile { detail, .. } => assert!(detail.contains(DOCUMENT_PART)),
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn malformed_xml_is_corrupt() {
        let data = docx("<w:p><w:r><w:t>abierto</w:r></w:p>");
        let err = extract_docx_text(&data, "x.docx").unwrap_err();
        assert!(matches!(err, SmartFlipError::CorruptFile { .. }));
    }
}
