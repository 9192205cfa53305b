//! Document text extraction entry points.
//!
//! [`extract_text`] turns an upload into plain text; [`extract_for_generation`]
//! adds the upload rules and the minimum-length check the generator needs.

use crate::config::ExtractionConfig;
use crate::error::SmartFlipError;
use crate::pipeline::input::{validate_upload, DocumentFile, DocumentFormat};
use crate::pipeline::{pdf, plain, word};
use tracing::{debug, info};

/// Extract the text of `file`, choosing the decoder from its MIME type.
///
/// Plain text is returned exactly as decoded. PDF and Word output is trimmed
/// and never empty.
///
/// # Errors
///
/// * [`SmartFlipError::UnsupportedFormat`] for anything but text, PDF or Word.
/// * [`SmartFlipError::Timeout`], [`SmartFlipError::CorruptFile`],
///   [`SmartFlipError::PasswordProtected`] and
///   [`SmartFlipError::EngineUnavailable`] from the PDF path.
/// * [`SmartFlipError::EmptyExtraction`] when a PDF or Word file holds no text.
pub async fn extract_text(
    file: &DocumentFile,
    config: &ExtractionConfig,
) -> Result<String, SmartFlipError> {
    let format = DocumentFormat::detect(file)?;
    info!(
        "Extracting '{}' ({:?}, {} bytes)",
        file.name,
        format,
        file.data.len()
    );

    let text = match format {
        DocumentFormat::PlainText => single_step(config, || {
            Ok(plain::decode_plain_text(&file.data, &file.name))
        })?,
        DocumentFormat::Word => single_step(config, || word::extract_docx_text(&file.data, &file.name))?,
        DocumentFormat::Pdf => pdf::extract_pdf_text(file.data.clone(), &file.name, config).await?,
    };

    debug!("'{}': {} chars extracted", file.name, text.chars().count());
    Ok(text)
}

/// Report a one-step extraction to the progress callback as a single page.
fn single_step(
    config: &ExtractionConfig,
    run: impl FnOnce() -> Result<String, SmartFlipError>,
) -> Result<String, SmartFlipError> {
    let cb = config.progress_callback.as_ref();
    if let Some(cb) = cb {
        cb.on_extraction_start(1);
    }
    let result = run();
    if let Some(cb) = cb {
        match &result {
            Ok(text) => cb.on_page_complete(1, 1, text.chars().count()),
            Err(e) => cb.on_page_error(1, 1, &e.to_string()),
        }
        cb.on_extraction_complete(1, usize::from(result.is_ok()));
    }
    result
}

/// Validate an upload, extract its text and require enough of it to work with.
///
/// This is the path an uploaded file takes before generation: size and type
/// rules first, then [`extract_text`], then at least
/// [`ExtractionConfig::min_text_chars`] characters after trimming.
pub async fn extract_for_generation(
    file: &DocumentFile,
    config: &ExtractionConfig,
) -> Result<String, SmartFlipError> {
    validate_upload(file, config)?;
    let text = extract_text(file, config).await?;

    let chars = text.trim().chars().count();
    if chars < config.min_text_chars {
        return Err(SmartFlipError::InsufficientText {
            chars,
            min: config.min_text_chars,
        });
    }
    Ok(text)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::input::{MIME_DOCX, MIME_TEXT};
    use crate::progress::{ExtractionProgressCallback, ProgressCallback};
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;
    use tokio_test::assert_ok;

    fn text_file(body: &str) -> DocumentFile {
        DocumentFile::new(body.as_bytes().to_vec(), MIME_TEXT, "notas.txt")
    }

    #[tokio::test]
    async fn plain_text_is_returned_verbatim() {
        let file = text_file("Hello world");
        let text = extract_text(&file, &ExtractionConfig::default()).await;
        assert_eq!(assert_ok!(text), "Hello world");
    }

    #[tokio::test]
    async fn unsupported_type_is_rejected() {
        let file = DocumentFile::new(vec![0x89, b'P', b'N', b'G'], "image/png", "foto.png");
        let err = extract_text(&file, &ExtractionConfig::default())
            .await
            .unwrap_err();
        assert!(matches!(err, SmartFlipError::UnsupportedFormat { ref mime_type } if mime_type == "image/png"));
    }

    #[tokio::test]
    async fn docx_by_name_reaches_word_extractor() {
        let file = DocumentFile::new(b"garbage".to_vec(), "application/octet-stream", "a.docx");
        let err = extract_text(&file, &ExtractionConfig::default())
            .await
            .unwrap_err();
        assert!(matches!(err, SmartFlipError::CorruptFile { .. }));
    }

    #[tokio::test]
    async fn generation_path_requires_minimum_text() {
        let config = ExtractionConfig::default();
        let err = extract_for_generation(&text_file("  demasiado corto  "), &config)
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            SmartFlipError::InsufficientText { chars: 15, min: 50 }
        ));

        let long = "La mitocondria es el orgánulo que produce energía en la célula.";
        assert_ok!(extract_for_generation(&text_file(long), &config).await);
    }

    #[tokio::test]
    async fn generation_path_enforces_upload_rules() {
        let config = ExtractionConfig::builder().max_upload_bytes(8).build().unwrap();
        let err = extract_for_generation(&text_file("más de ocho bytes"), &config)
            .await
            .unwrap_err();
        assert!(matches!(err, SmartFlipError::FileTooLarge { .. }));

        // Accepted by dispatch, but not an accepted upload type.
        let legacy = DocumentFile::new(b"x".to_vec(), "application/msword", "a.doc");
        let err = extract_for_generation(&legacy, &ExtractionConfig::default())
            .await
            .unwrap_err();
        assert!(matches!(err, SmartFlipError::UnsupportedFormat { .. }));
    }

    #[tokio::test]
    async fn single_step_formats_report_progress() {
        #[derive(Default)]
        struct Count {
            complete: AtomicUsize,
            errors: AtomicUsize,
        }
        impl ExtractionProgressCallback for Count {
            fn on_page_complete(&self, _: usize, _: usize, _: usize) {
                self.complete.fetch_add(1, Ordering::SeqCst);
            }
            fn on_page_error(&self, _: usize, _: usize, _: &str) {
                self.errors.fetch_add(1, Ordering::SeqCst);
            }
        }

        let count = Arc::new(Count::default());
        let cb: ProgressCallback = count.clone();
        let config = ExtractionConfig::builder().progress_callback(cb).build().unwrap();

        extract_text(&text_file("hola"), &config).await.unwrap();
        let bad_docx = DocumentFile::new(b"nope".to_vec(), MIME_DOCX, "a.docx");
        assert!(extract_text(&bad_docx, &config).await.is_err());

        assert_eq!(count.complete.load(Ordering::SeqCst), 1);
        assert_eq!(count.errors.load(Ordering::SeqCst), 1);
    }
}
