//! Pipeline stages for extraction and generation.
//!
//! Each submodule implements one step and is tested on its own.
//!
//! ## Data Flow
//!
//! ```text
//! extraction:  input ──▶ plain | pdf | word ──▶ text
//!              (dispatch)  (encoding_rs / pdfium / zip+xml)
//!
//! generation:  prompt ──▶ request ──▶ salvage ──▶ typed artifacts
//!                         (HTTP/LLM)  (JSON array)
//! ```
//!
//! 1. [`input`]   - the in-memory upload, upload rules, format dispatch
//! 2. [`plain`]   - UTF-8 decoding for `text/plain`
//! 3. [`pdf`]     - page-capped text extraction on the blocking pool
//! 4. [`word`]    - raw text from `word/document.xml`
//! 5. [`request`] - the chat-completion call; the only stage with network I/O
//! 6. [`salvage`] - recover a JSON array from the reply text

pub mod input;
pub mod pdf;
pub mod plain;
pub mod request;
pub mod salvage;
pub mod word;
