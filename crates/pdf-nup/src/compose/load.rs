//! Source document loading with a parse-leniency ladder
//!
//! Each rung derives a candidate byte slice from the raw input and hands it
//! to lopdf. Rungs are tried in order until one parses.

use crate::constants::{PDF_EOF_MARKER, PDF_HEADER};
use crate::types::*;
use lopdf::Document;

/// How much of the raw input a parse attempt trusts
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Leniency {
    /// The bytes exactly as given. lopdf already skips junk before `%PDF-`.
    Strict,
    /// Keep only the header through the last `%%EOF` marker.
    ///
    /// lopdf looks for `%%EOF` in the final 512 bytes only, so a long tail
    /// of appended data hides the trailer from a strict parse.
    TrimToEnvelope,
}

/// Parse configurations in the order they are attempted
pub const PARSE_LADDER: [Leniency; 2] = [Leniency::Strict, Leniency::TrimToEnvelope];

impl Leniency {
    /// The candidate bytes for this rung, or `None` when the rung would not
    /// change anything compared to a stricter one.
    pub fn prepare(self, bytes: &[u8]) -> Option<&[u8]> {
        match self {
            Leniency::Strict => Some(bytes),
            Leniency::TrimToEnvelope => {
                let start = find(bytes, PDF_HEADER)?;
                let end = rfind(bytes, PDF_EOF_MARKER)? + PDF_EOF_MARKER.len();
                let trailing = bytes[end..].iter().any(|b| !b.is_ascii_whitespace());
                (end > start && trailing).then(|| &bytes[start..end])
            }
        }
    }
}

/// Load a PDF from memory, falling back through [`PARSE_LADDER`].
///
/// Encrypted documents fail with [`NupError::Encrypted`] straight away and
/// are never retried.
pub fn load_document(bytes: &[u8]) -> Result<Document> {
    let mut attempts = 0;
    let mut last_error = None;

    for rung in PARSE_LADDER {
        let Some(candidate) = rung.prepare(bytes) else {
            continue;
        };
        attempts += 1;

        match Document::load_mem(candidate) {
            Ok(doc) => {
                if doc.trailer.get(b"Encrypt").is_ok() {
                    return Err(NupError::Encrypted);
                }
                if rung != Leniency::Strict {
                    log::warn!("Recovered malformed PDF using {:?} parsing", rung);
                }
                return Ok(doc);
            }
            Err(e) => {
                if declares_encryption(candidate) {
                    return Err(NupError::Encrypted);
                }
                log::debug!("{:?} parse attempt failed: {}", rung, e);
                last_error = Some(e);
            }
        }
    }

    match last_error {
        Some(source) => Err(NupError::Parse { attempts, source }),
        None => Err(NupError::Config("Parse ladder is empty".to_string())),
    }
}

/// Whether the file's trailer dictionary names an `/Encrypt` entry
fn declares_encryption(bytes: &[u8]) -> bool {
    match rfind(bytes, b"trailer") {
        Some(pos) => find(&bytes[pos..], b"/Encrypt").is_some(),
        // Cross-reference streams carry the trailer keys in the stream dictionary
        None => find(bytes, b"/Encrypt").is_some(),
    }
}

fn find(haystack: &[u8], needle: &[u8]) -> Option<usize> {
    haystack.windows(needle.len()).position(|w| w == needle)
}

fn rfind(haystack: &[u8], needle: &[u8]) -> Option<usize> {
    haystack.windows(needle.len()).rposition(|w| w == needle)
}
