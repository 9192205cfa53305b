//! Best-effort recovery of a JSON array from a free-text model reply.
//!
//! ## Why salvage at all?
//!
//! The prompts ask for "a JSON array and nothing else", and most replies
//! comply. The ones that don't typically wrap a perfectly valid array in a
//! sentence of prose or a ` ```json ` fence. Rejecting those would fail
//! generations that actually succeeded.
//!
//! ## The two tiers
//!
//! 1. Parse the whole reply. Accept it when it is an array.
//! 2. Take the greedy span from the first `[` to the last `]` and parse that.
//!
//! Order matters: strict first, so a clean reply is never second-guessed by
//! the heuristic. The span is greedy on purpose; a non-greedy match would stop
//! at the first nested `]` and cut an array of arrays in half.

use crate::error::SmartFlipError;
use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::Value;
use tracing::debug;

static RE_BRACKET_SPAN: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?s)\[.*\]").unwrap());

/// Characters of the reply echoed back in [`SmartFlipError::UnparsableResponse`].
const SNIPPET_CHARS: usize = 120;

/// Extract a JSON array from `text`.
///
/// Returns the array elements, possibly empty; emptiness is a policy decision
/// left to the caller.
pub fn extract_json_array(text: &str) -> Result<Vec<Value>, SmartFlipError> {
    // ── Tier 1: the whole reply ──────────────────────────────────────────
    if let Ok(Value::Array(items)) = serde_json::from_str::<Value>(text) {
        debug!("Reply parsed directly: {} items", items.len());
        return Ok(items);
    }

    // ── Tier 2: first `[` through last `]` ───────────────────────────────
    if let Some(span) = RE_BRACKET_SPAN.find(text) {
        if let Ok(Value::Array(items)) = serde_json::from_str::<Value>(span.as_str()) {
            debug!(
                "Reply salvaged from bracket span {}..{}: {} items",
                span.start(),
                span.end(),
                items.len()
            );
            return Ok(items);
        }
    }

    Err(SmartFlipError::UnparsableResponse {
        snippet: snippet(text),
    })
}

fn snippet(text: &str) -> String {
    let trimmed = text.trim();
    match trimmed.char_indices().nth(SNIPPET_CHARS) {
        Some((cut, _)) => format!("{}\u{2026}", &trimmed[..cut]),
        None => trimmed.to_string(),
    }
}
