//! JPEG marker scanning over an in-memory window.

use std::ops::Range;

/// Start-of-image marker
const SOI: [u8; 2] = [0xFF, 0xD8];
/// End-of-image marker
const EOI: [u8; 2] = [0xFF, 0xD9];

/// Smallest span accepted as a real preview; anything shorter is a
/// camera micro-thumbnail.
pub const MIN_PREVIEW_BYTES: usize = 10_000;

/// Every `[start, end)` span delimited by a start marker and the next end
/// marker, in the order their end markers appear.
///
/// A later start marker replaces a pending one, and a match clears the
/// pending start, so concatenated streams each produce their own span.
/// `end` includes the two end-marker bytes.
pub fn jpeg_spans(buffer: &[u8]) -> Vec<Range<usize>> {
    let mut spans = Vec::new();
    let mut pending: Option<usize> = None;

    for (i, window) in buffer.windows(2).enumerate() {
        if window == SOI {
            pending = Some(i);
        } else if window == EOI {
            if let Some(start) = pending.take() {
                spans.push(start..i + 2);
            }
        }
    }

    spans
}

/// The span of the best embedded preview: the longest span of at least
/// [`MIN_PREVIEW_BYTES`], first one winning ties.
pub fn largest_preview_span(buffer: &[u8]) -> Option<Range<usize>> {
    jpeg_spans(buffer)
        .into_iter()
        .filter(|span| span.len() >= MIN_PREVIEW_BYTES)
        .fold(None, |best: Option<Range<usize>>, span| match best {
            Some(current) if current.len() >= span.len() => Some(current),
            _ => Some(span),
        })
}
