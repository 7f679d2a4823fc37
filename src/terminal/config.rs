//! Delivery timing constants and text chunking

use std::time::Duration;

/// Default capture window in lines
pub const DEFAULT_CAPTURE_LINES: usize = 1000;

/// Pause between typed text and Enter for the line strategy
pub const LINE_SUBMIT_DELAY: Duration = Duration::from_millis(50);

/// Chunk size for chunked typing, below common paste-detection thresholds
pub const CHUNK_SIZE: usize = 50;

/// Pause between typed chunks
pub const CHUNK_DELAY: Duration = Duration::from_millis(10);

/// Pause after the last chunk before Enter
pub const CHUNK_SUBMIT_DELAY: Duration = Duration::from_millis(100);

/// Minimum settle delay after a bracketed paste
pub const PASTE_SETTLE_FLOOR: Duration = Duration::from_millis(100);

/// Additional settle delay per 1000 pasted characters
pub const PASTE_SETTLE_PER_KCHAR: Duration = Duration::from_millis(50);

/// Upper bound on the paste settle delay
pub const PASTE_SETTLE_CAP: Duration = Duration::from_secs(3);

/// Settle delay before submitting a bracketed paste of `chars` characters
#[must_use]
pub fn paste_settle_delay(chars: usize) -> Duration {
    let kchars = u32::try_from(chars / 1000).unwrap_or(u32::MAX);
    let scaled = PASTE_SETTLE_PER_KCHAR.saturating_mul(kchars);
    (PASTE_SETTLE_FLOOR + scaled).min(PASTE_SETTLE_CAP)
}

/// Split text into chunks of at most `size` characters on char boundaries
#[must_use]
pub fn chunk_text(text: &str, size: usize) -> Vec<&str> {
    let size = size.max(1);
    let mut chunks = Vec::new();
    let mut start = 0;
    let mut count = 0;

    for (idx, _) in text.char_indices() {
        if count == size {
            chunks.push(&text[start..idx]);
            start = idx;
            count = 0;
        }
        count += 1;
    }
    if start < text.len() {
        chunks.push(&text[start..]);
    }
    chunks
}
