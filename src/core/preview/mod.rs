//! # Preview Module
//!
//! Pulls the embedded JPEG preview out of a RAW camera file.
//!
//! Cameras store a fully rendered JPEG near the start of their RAW
//! containers. Instead of parsing each vendor's container, the first
//! [`MAX_SCAN_BYTES`] of the file are scanned for JPEG start/end markers
//! and the largest marker-delimited span is taken as the preview.
//!
//! ## Example
//! ```rust,ignore
//! use photo_ingest::core::preview::{EmbeddedJpegExtractor, PreviewExtractor};
//!
//! if let Some(jpeg) = EmbeddedJpegExtractor.extract("DSC_0001.NEF".as_ref()) {
//!     std::fs::write("preview.jpg", jpeg)?;
//! }
//! ```

mod markers;

pub use markers::{jpeg_spans, largest_preview_span, MIN_PREVIEW_BYTES};

use crate::error::PreviewError;
use std::fs::File;
use std::io::Read;
use std::path::Path;

/// How much of a RAW file is read when looking for a preview (10 MiB)
pub const MAX_SCAN_BYTES: u64 = 10 * 1024 * 1024;

/// Source of embedded previews.
///
/// Implement this trait to plug a different extractor into the
/// thumbnail cache (e.g., for testing).
pub trait PreviewExtractor: Send + Sync {
    /// Bytes of the best embedded preview, or `None` if there isn't one
    /// or the file can't be read.
    fn extract(&self, path: &Path) -> Option<Vec<u8>>;
}

/// Marker-scanning extractor for camera RAW files
#[derive(Debug, Clone, Copy, Default)]
pub struct EmbeddedJpegExtractor;

impl EmbeddedJpegExtractor {
    /// Extract the preview, keeping the reason when there is none.
    pub fn try_extract(&self, path: &Path) -> Result<Vec<u8>, PreviewError> {
        let mut buffer = read_window(path)?;

        let span = largest_preview_span(&buffer).ok_or_else(|| PreviewError::NotFound {
            path: path.to_path_buf(),
        })?;

        buffer.truncate(span.end);
        buffer.drain(..span.start);
        Ok(buffer)
    }
}

impl PreviewExtractor for EmbeddedJpegExtractor {
    fn extract(&self, path: &Path) -> Option<Vec<u8>> {
        match self.try_extract(path) {
            Ok(bytes) => {
                tracing::debug!(path = %path.display(), bytes = bytes.len(), "extracted embedded preview");
                Some(bytes)
            }
            Err(e) => {
                tracing::debug!(path = %path.display(), error = %e, "no embedded preview");
                None
            }
        }
    }
}

/// Read at most [`MAX_SCAN_BYTES`] from the start of the file.
fn read_window(path: &Path) -> Result<Vec<u8>, PreviewError> {
    let file = File::open(path).map_err(|e| PreviewError::Open {
        path: path.to_path_buf(),
        source: e,
    })?;

    let capacity = file
        .metadata()
        .map(|m| m.len().min(MAX_SCAN_BYTES))
        .unwrap_or(0);

    let mut buffer = Vec::with_capacity(capacity as usize);
    file.take(MAX_SCAN_BYTES)
        .read_to_end(&mut buffer)
        .map_err(|e| PreviewError::Read {
            path: path.to_path_buf(),
            source: e,
        })?;

    Ok(buffer)
}
