//! Upload handling: the in-memory document, its format, and the upload rules.
//!
//! Every extractor works from bytes in memory; nothing here touches pdfium or
//! the zip reader. [`DocumentFormat::detect`] is the single dispatch point
//! the extractor switches on.

use crate::config::{ExtractionConfig, ACCEPTED_MIME_TYPES};
use crate::error::SmartFlipError;
use std::path::Path;
use tracing::debug;

pub const MIME_PDF: &str = "application/pdf";
pub const MIME_TEXT: &str = "text/plain";
pub const MIME_DOCX: &str =
    "application/vnd.openxmlformats-officedocument.wordprocessingml.document";
pub const MIME_DOC: &str = "application/msword";

/// Additional MIME types accepted by [`is_supported`].
const LEGACY_WORD_MIME_TYPES: [&str; 2] = ["application/vnd.ms-word", MIME_DOC];

/// Extensions accepted by [`is_supported`] regardless of MIME type.
const SUPPORTED_EXTENSIONS: [&str; 4] = ["pdf", "txt", "doc", "docx"];

/// An uploaded document held in memory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DocumentFile {
    pub data: Vec<u8>,
    /// Declared MIME type, as given by the uploader.
    pub mime_type: String,
    /// File name, used for error messages and the `.docx` fallback.
    pub name: String,
}

impl DocumentFile {
    pub fn new(data: Vec<u8>, mime_type: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            data,
            mime_type: mime_type.into(),
            name: name.into(),
        }
    }

    /// Read a file from disk, inferring the MIME type from its extension.
    ///
    /// Unknown extensions get `application/octet-stream`, which extraction
    /// later rejects as unsupported.
    pub async fn from_path(path: impl AsRef<Path>) -> Result<Self, SmartFlipError> {
        let path = path.as_ref();
        let data = tokio::fs::read(path).await.map_err(|e| match e.kind() {
            std::io::ErrorKind::NotFound | std::io::ErrorKind::PermissionDenied => {
                SmartFlipError::FileNotFound {
                    path: path.to_path_buf(),
                }
            }
            _ => SmartFlipError::Internal(format!("reading '{}': {e}", path.display())),
        })?;

        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.display().to_string());
        let mime_type = mime_for_path(path).unwrap_or("application/octet-stream");
        debug!("Loaded '{}' ({} bytes, {})", name, data.len(), mime_type);

        Ok(Self::new(data, mime_type, name))
    }

    pub fn size(&self) -> u64 {
        self.data.len() as u64
    }

    fn extension(&self) -> Option<String> {
        Path::new(&self.name)
            .extension()
            .map(|e| e.to_string_lossy().to_ascii_lowercase())
    }
}

/// MIME type for a file extension (case-insensitive, without the dot).
pub fn mime_for_extension(ext: &str) -> Option<&'static str> {
    match ext.to_ascii_lowercase().as_str() {
        "pdf" => Some(MIME_PDF),
        "txt" | "text" | "md" => Some(MIME_TEXT),
        "docx" => Some(MIME_DOCX),
        "doc" => Some(MIME_DOC),
        _ => None,
    }
}

fn mime_for_path(path: &Path) -> Option<&'static str> {
    path.extension()
        .and_then(|e| e.to_str())
        .and_then(mime_for_extension)
}

/// Which extractor handles a document.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocumentFormat {
    PlainText,
    Pdf,
    Word,
}

impl DocumentFormat {
    /// Pick the extractor from the declared MIME type, falling back to a
    /// `.docx` name for Word files uploaded with a generic type.
    pub fn detect(file: &DocumentFile) -> Result<Self, SmartFlipError> {
        let mime = file.mime_type.as_str();
        if mime == MIME_TEXT {
            Ok(DocumentFormat::PlainText)
        } else if mime == MIME_PDF {
            Ok(DocumentFormat::Pdf)
        } else if mime.contains("word")
            || mime.contains("officedocument.wordprocessingml")
            || file.name.to_ascii_lowercase().ends_with(".docx")
        {
            Ok(DocumentFormat::Word)
        } else {
            Err(SmartFlipError::UnsupportedFormat {
                mime_type: file.mime_type.clone(),
            })
        }
    }
}

/// Lenient pre-check: a known MIME type or a known extension.
pub fn is_supported(file: &DocumentFile) -> bool {
    let mime = file.mime_type.as_str();
    ACCEPTED_MIME_TYPES.contains(&mime)
        || LEGACY_WORD_MIME_TYPES.contains(&mime)
        || file
            .extension()
            .is_some_and(|ext| SUPPORTED_EXTENSIONS.contains(&ext.as_str()))
}

/// Enforce the upload rules: size ceiling first, then the accepted types.
pub fn validate_upload(file: &DocumentFile, config: &ExtractionConfig) -> Result<(), SmartFlipError> {
    if file.size() > config.max_upload_bytes {
        return Err(SmartFlipError::FileTooLarge {
            name: file.name.clone(),
            size: file.size(),
            max: config.max_upload_bytes,
        });
    }
    if !ACCEPTED_MIME_TYPES.contains(&file.mime_type.as_str()) {
        return Err(SmartFlipError::UnsupportedFormat {
            mime_type: file.mime_type.clone(),
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn doc(mime: &str, name: &str) -> DocumentFile {
        DocumentFile::new(b"x".to_vec(), mime, name)
    }

    #[test]
    fn detect_by_mime() {
        assert_eq!(
            DocumentFormat::detect(&doc(MIME_TEXT, "a.txt")).unwrap(),
            DocumentFormat::PlainText
        );
        assert_eq!(
            DocumentFormat::detect(&doc(MIME_PDF, "a.pdf")).unwrap(),
            DocumentFormat::Pdf
        );
        assert_eq!(
            DocumentFormat::detect(&doc(MIME_DOCX, "a.docx")).unwrap(),
            DocumentFormat::Word
        );
        assert_eq!(
            DocumentFormat::detect(&doc("application/vnd.ms-word", "a")).unwrap(),
            DocumentFormat::Word
        );
    }

    #[test]
    fn detect_docx_by_name_with_generic_mime() {
        let file = doc("application/octet-stream", "Apuntes.DOCX");
        assert_eq!(DocumentFormat::detect(&file).unwrap(), DocumentFormat::Word);
    }

    #[test]
    fn detect_rejects_unknown_types() {
        let err = DocumentFormat::detect(&doc("image/png", "foto.png")).unwrap_err();
        match err {
            SmartFlipError::UnsupportedFormat { mime_type } => assert_eq!(mime_type, "image/png"),
            other => panic!("unexpected error: {other:?}"),
        }
        // text/markdown is not text/plain
        assert!(DocumentFormat::detect(&doc("text/markdown", "a.md")).is_err());
    }

    #[test]
    fn is_supported_accepts_known_extension_or_mime() {
        assert!(is_supported(&doc(MIME_PDF, "whatever")));
        assert!(is_supported(&doc(MIME_DOC, "old")));
        assert!(is_supported(&doc("application/octet-stream", "notes.TXT")));
        assert!(!is_supported(&doc("image/jpeg", "photo.jpg")));
    }

    #[test]
    fn validate_upload_enforces_size_then_type() {
        let config = ExtractionConfig::builder().max_upload_bytes(4).build().unwrap();

        let big = DocumentFile::new(vec![0; 5], "image/png", "big.png");
        assert!(matches!(
            validate_upload(&big, &config),
            Err(SmartFlipError::FileTooLarge { size: 5, max: 4, .. })
        ));

        let small_png = DocumentFile::new(vec![0; 3], "image/png", "p.png");
        assert!(matches!(
            validate_upload(&small_png, &config),
            Err(SmartFlipError::UnsupportedFormat { .. })
        ));

        let txt = DocumentFile::new(vec![b'a'; 4], MIME_TEXT, "a.txt");
        assert!(validate_upload(&txt, &config).is_ok());
    }

    #[test]
    fn default_upload_limit_is_ten_mib() {
        let config = ExtractionConfig::default();
        let at_limit = DocumentFile::new(vec![0; 10 * 1024 * 1024], MIME_PDF, "a.pdf");
        assert!(validate_upload(&at_limit, &config).is_ok());
        let over = DocumentFile::new(vec![0; 10 * 1024 * 1024 + 1], MIME_PDF, "a.pdf");
        assert!(validate_upload(&over, &config).is_err());
    }

    #[test]
    fn mime_for_extension_is_case_insensitive() {
        assert_eq!(mime_for_extension("PDF"), Some(MIME_PDF));
        assert_eq!(mime_for_extension("docx"), Some(MIME_DOCX));
        assert_eq!(mime_for_extension("exe"), None);
    }

    #[tokio::test]
    async fn from_path_reads_file_and_infers_mime() {
        let mut tmp = tempfile::Builder::new().suffix(".txt").tempfile().unwrap();
        tmp.write_all(b"Hello world").unwrap();

        let file = DocumentFile::from_path(tmp.path()).await.unwrap();
        assert_eq!(file.data, b"Hello world");
        assert_eq!(file.mime_type, MIME_TEXT);
        assert!(file.name.ends_with(".txt"));
    }

    #[tokio::test]
    async fn from_path_missing_file() {
        let err = DocumentFile::from_path("/nonexistent/apuntes.pdf")
            .await
            .unwrap_err();
        assert!(matches!(err, SmartFlipError::FileNotFound { .. }));
    }
}
