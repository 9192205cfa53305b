//! PDF text extraction through pdfium.
//!
//! ## Blocking pool
//!
//! pdfium is a synchronous C++ library. Loading and walking a document runs
//! inside `spawn_blocking`.
//!
//! ## Timeout
//!
//! Only opening the document is bounded by `load_timeout_secs`. The blocking
//! task signals over a oneshot channel once the document is open; if that
//! signal does not arrive in time the caller gets [`SmartFlipError::Timeout`]
//! and the task's eventual result is discarded. pdfium calls cannot be
//! interrupted, so the open itself finishes in the background; the task then
//! sees the closed channel and drops the document without reading any page.
//!
//! ## Page walk
//!
//! Page reading goes through [`PageTextSource`], so the assembly rules in
//! [`collect_pages`] are tested without a pdfium library. Each page handle is
//! dropped as soon as its text has been copied out, and the document when the
//! blocking task returns.

use crate::config::ExtractionConfig;
use crate::engine::PdfEngine;
use crate::error::{PageError, SmartFlipError};
use crate::progress::ProgressCallback;
use pdfium_render::prelude::*;
use std::time::{Duration, Instant};
use tokio::sync::oneshot;
use tracing::{debug, info, warn};

/// Page-by-page access to a document's text runs.
pub trait PageTextSource {
    fn page_count(&self) -> usize;

    /// Text runs of the page at 0-based `index`, in reading order.
    fn page_runs(&self, index: usize) -> Result<Vec<String>, PageError>;
}

impl PageTextSource for PdfPages<'_> {
    fn page_count(&self) -> usize {
        self.len() as usize
    }

    fn page_runs(&self, index: usize) -> Result<Vec<String>, PageError> {
        let page = self.get(index as u16).map_err(|e| PageError::LoadFailed {
            page: index + 1,
            detail: format!("{:?}", e),
        })?;
        let text = page.text().map_err(|e| PageError::TextFailed {
            page: index + 1,
            detail: format!("{:?}", e),
        })?;
        let runs = text.segments().iter().map(|segment| segment.text()).collect();
        Ok(runs)
    }
}

/// Assemble the text of the first `max_pages` pages.
///
/// Whitespace-only runs are dropped and the rest joined with single spaces;
/// a page that produced text is followed by a blank line. Unreadable pages
/// are skipped. When the document is longer than `max_pages`, a note giving
/// the processed and total page counts is appended.
pub fn collect_pages<S: PageTextSource + ?Sized>(
    source: &S,
    max_pages: usize,
    name: &str,
    progress: Option<&ProgressCallback>,
) -> Result<String, SmartFlipError> {
    let total = source.page_count();
    let to_read = total.min(max_pages);
    if total > max_pages {
        info!(
            "'{}' has {} pages; reading the first {}",
            name, total, to_read
        );
    }

    if let Some(cb) = progress {
        cb.on_extraction_start(to_read);
    }

    let mut text = String::new();
    let mut success = 0usize;

    for index in 0..to_read {
        let page_num = index + 1;
        if let Some(cb) = progress {
            cb.on_page_start(page_num, to_read);
        }

        match source.page_runs(index) {
            Ok(runs) => {
                let page_text = runs
                    .iter()
                    .map(String::as_str)
                    .filter(|run| !run.trim().is_empty())
                    .collect::<Vec<_>>()
                    .join(" ");
                let chars = page_text.chars().count();
                if !page_text.trim().is_empty() {
                    text.push_str(&page_text);
                    text.push_str("\n\n");
                }
                success += 1;
                debug!("Page {}/{}: {} chars", page_num, to_read, chars);
                if let Some(cb) = progress {
                    cb.on_page_complete(page_num, to_read, chars);
                }
            }
            Err(e) => {
                warn!("Skipping unreadable page: {}", e);
                if let Some(cb) = progress {
                    cb.on_page_error(page_num, to_read, &e.to_string());
                }
            }
        }
    }

    if let Some(cb) = progress {
        cb.on_extraction_complete(to_read, success);
    }

    if text.trim().is_empty() {
        return Err(SmartFlipError::EmptyExtraction {
            name: name.to_string(),
        });
    }

    if total > max_pages {
        text.push_str(&format!(
            "\n[Note: processed {} of {} pages]\n",
            to_read, total
        ));
    }

    Ok(text.trim().to_string())
}

/// Map a pdfium load failure onto the document errors.
fn load_error(debug_repr: String, name: &str) -> SmartFlipError {
    if debug_repr.contains("Password") || debug_repr.contains("password") {
        SmartFlipError::PasswordProtected {
            name: name.to_string(),
        }
    } else {
        SmartFlipError::CorruptFile {
            name: name.to_string(),
            detail: debug_repr,
        }
    }
}

/// Open a document, tell the waiting caller it is open, then read its pages.
///
/// If the caller has already stopped waiting, the document is dropped unread
/// and no progress events fire.
fn open_and_collect<D, S>(
    open: impl FnOnce() -> Result<D, SmartFlipError>,
    pages: impl FnOnce(&D) -> &S,
    loaded_tx: oneshot::Sender<()>,
    secs: u64,
    max_pages: usize,
    name: &str,
    progress: Option<&ProgressCallback>,
) -> Result<String, SmartFlipError>
where
    S: PageTextSource + ?Sized,
{
    let document = open()?;
    if loaded_tx.send(()).is_err() {
        debug!("'{}' opened after the caller gave up; dropping it", name);
        return Err(SmartFlipError::Timeout { secs });
    }
    collect_pages(pages(&document), max_pages, name, progress)
}

/// Extract the text of a PDF held in memory.
pub async fn extract_pdf_text(
    data: Vec<u8>,
    name: &str,
    config: &ExtractionConfig,
) -> Result<String, SmartFlipError> {
    // Engine binding, including a first-run download, is outside the load timeout.
    if !PdfEngine::is_loaded() {
        info!("Preparing the PDF engine (the first run may download pdfium)");
    }
    let engine = tokio::task::spawn_blocking(PdfEngine::ensure_loaded)
        .await
        .map_err(|e| SmartFlipError::Internal(format!("PDF engine task panicked: {}", e)))??;
    debug!("pdfium: {}", engine.library_path().display());

    let start = Instant::now();
    let (loaded_tx, loaded_rx) = oneshot::channel::<()>();
    let doc_name = name.to_string();
    let password = config.password.clone();
    let max_pages = config.max_pages;
    let progress = config.progress_callback.clone();
    let secs = config.load_timeout_secs;

    let task = tokio::task::spawn_blocking(move || {
        open_and_collect(
            || {
                engine
                    .pdfium()
                    .load_pdf_from_byte_vec(data, password.as_deref())
                    .map_err(|e| load_error(format!("{:?}", e), &doc_name))
            },
            |document| document.pages(),
            loaded_tx,
            secs,
            max_pages,
            &doc_name,
            progress.as_ref(),
        )
    });

    if tokio::time::timeout(Duration::from_secs(secs), loaded_rx)
        .await
        .is_err()
    {
        warn!("Opening '{}' exceeded {}s; abandoning", name, secs);
        return Err(SmartFlipError::Timeout { secs });
    }
    // Either the document opened, or the sender was dropped because loading
    // failed and the error is in the task result.

    let text = task
        .await
        .map_err(|e| SmartFlipError::Internal(format!("PDF task panicked: {}", e)))??;
    info!(
        "Extracted {} chars from '{}' in {}ms",
        text.len(),
        name,
        start.elapsed().as_millis()
    );
    Ok(text)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::progress::ExtractionProgressCallback;
    use std::sync::{Arc, Mutex};

    /// In-memory document: each page is either its runs or a failure message.
    struct FakeDoc(Vec<Result<Vec<&'static str>, &'static str>>);

    impl PageTextSource for FakeDoc {
        fn page_count(&self) -> usize {
            self.0.len()
        }

        fn page_runs(&self, index: usize) -> Result<Vec<String>, PageError> {
            match &self.0[index] {
                Ok(runs) => Ok(runs.iter().map(|r| r.to_string()).collect()),
                Err(detail) => Err(PageError::TextFailed {
                    page: index + 1,
                    detail: detail.to_string(),
                }),
            }
        }
    }

    #[derive(Default)]
    struct Events(Mutex<Vec<String>>);

    impl ExtractionProgressCallback for Events {
        fn on_extraction_start(&self, total_pages: usize) {
            self.0.lock().unwrap().push(format!("start:{total_pages}"));
        }
        fn on_page_complete(&self, page_num: usize, _total: usize, chars: usize) {
            self.0.lock().unwrap().push(format!("ok:{page_num}:{chars}"));
        }
        fn on_page_error(&self, page_num: usize, _total: usize, _error: &str) {
            self.0.lock().unwrap().push(format!("err:{page_num}"));
        }
        fn on_extraction_complete(&self, _total: usize, success: usize) {
            self.0.lock().unwrap().push(format!("done:{success}"));
        }
    }

    #[test]
    fn runs_are_joined_and_pages_separated() {
        let doc = FakeDoc(vec![
            Ok(vec!["La", " ", "célula", ""]),
            Ok(vec!["es la unidad", "básica"]),
        ]);
        let text = collect_pages(&doc, 100, "bio.pdf", None).unwrap();
        assert_eq!(text, "La célula\n\nes la unidad básica");
    }

    #[test]
    fn blank_pages_add_nothing() {
        let doc = FakeDoc(vec![Ok(vec!["uno"]), Ok(vec!["   "]), Ok(vec![]), Ok(vec!["dos"])]);
        let text = collect_pages(&doc, 100, "a.pdf", None).unwrap();
        assert_eq!(text, "uno\n\ndos");
    }

    #[test]
    fn failing_page_is_skipped_and_reported() {
        let doc = FakeDoc(vec![Ok(vec!["antes"]), Err("broken stream"), Ok(vec!["después"])]);
        let events = Arc::new(Events::default());
        let cb: ProgressCallback = events.clone();

        let text = collect_pages(&doc, 100, "a.pdf", Some(&cb)).unwrap();
        assert_eq!(text, "antes\n\ndespués");
        assert_eq!(
            *events.0.lock().unwrap(),
            vec!["start:3", "ok:1:5", "err:2", "ok:3:7", "done:2"]
        );
    }

    #[test]
    fn no_text_is_empty_extraction() {
        let doc = FakeDoc(vec![Ok(vec![" "]), Err("x"), Ok(vec![])]);
        let err = collect_pages(&doc, 100, "scan.pdf", None).unwrap_err();
        assert!(matches!(err, SmartFlipError::EmptyExtraction { ref name } if name == "scan.pdf"));
    }

    #[test]
    fn page_cap_appends_note() {
        let doc = FakeDoc(vec![Ok(vec!["p1"]), Ok(vec!["p2"]), Ok(vec!["p3"])]);
        let text = collect_pages(&doc, 2, "long.pdf", None).unwrap();
        assert_eq!(text, "p1\n\np2\n\n\n[Note: processed 2 of 3 pages]");
        assert!(!text.contains("p3"));
    }

    #[test]
    fn page_cap_note_does_not_mask_empty_text() {
        let doc = FakeDoc(vec![Ok(vec![]), Ok(vec![]), Ok(vec!["late text"])]);
        let err = collect_pages(&doc, 2, "long.pdf", None).unwrap_err();
        assert!(matches!(err, SmartFlipError::EmptyExtraction { .. }));
    }

    #[test]
    fn exactly_at_cap_has_no_note() {
        let doc = FakeDoc(vec![Ok(vec!["a"]), Ok(vec!["b"])]);
        let text = collect_pages(&doc, 2, "a.pdf", None).unwrap();
        assert!(!text.contains("[Note"));
    }

    fn one_page_doc() -> Result<FakeDoc, SmartFlipError> {
        Ok(FakeDoc(vec![Ok(vec!["hola"])]))
    }

    #[test]
    fn open_document_signals_then_reads_pages() {
        let (tx, mut rx) = oneshot::channel();
        let text = open_and_collect(one_page_doc, |doc| doc, tx, 30, 100, "a.pdf", None).unwrap();
        assert_eq!(text, "hola");
        assert!(rx.try_recv().is_ok());
    }

    #[test]
    fn abandoned_load_skips_page_walk() {
        let (tx, rx) = oneshot::channel();
        drop(rx);
        let events = Arc::new(Events::default());
        let cb: ProgressCallback = events.clone();

        let err = open_and_collect(one_page_doc, |doc| doc, tx, 30, 100, "slow.pdf", Some(&cb))
            .unwrap_err();
        assert!(matches!(err, SmartFlipError::Timeout { secs: 30 }));
        assert!(events.0.lock().unwrap().is_empty());
    }

    #[test]
    fn failed_open_sends_no_signal() {
        let (tx, mut rx) = oneshot::channel();
        let err = open_and_collect(
            || -> Result<FakeDoc, SmartFlipError> { Err(load_error("FormatError".into(), "c.pdf")) },
            |doc| doc,
            tx,
            30,
            100,
            "c.pdf",
            None,
        )
        .unwrap_err();
        assert!(matches!(err, SmartFlipError::CorruptFile { .. }));
        assert!(rx.try_recv().is_err());
    }

    #[test]
    fn load_errors_are_classified() {
        assert!(matches!(
            load_error("PdfiumLibraryInternalError(PasswordError)".into(), "s.pdf"),
            SmartFlipError::PasswordProtected { .. }
        ));
        assert!(matches!(
            load_error("PdfiumLibraryInternalError(FormatError)".into(), "c.pdf"),
            SmartFlipError::CorruptFile { .. }
        ));
    }
}
