//! # Thumbnail Module
//!
//! Persistent on-disk cache of RAW previews.
//!
//! ## Layout
//! A flat directory of `<sha256-hex>.jpg` files. The name is derived from
//! the source path and its modification time, so there is no index: a
//! lookup is one hash plus one `stat`.
//!
//! ## Behavior
//! - Cache hits never touch the RAW file's contents
//! - Misses run the [`PreviewExtractor`] and persist the bytes with a
//!   write-then-rename so concurrent readers never see partial files
//! - A file without a preview is not recorded, so a later lookup retries
//! - Failures are logged and reported as `None`; nothing is raised

mod key;

pub use key::{cache_key, ENTRY_SUFFIX};

use crate::core::media::MediaKind;
use crate::core::preview::{EmbeddedJpegExtractor, PreviewExtractor};
use crate::error::CacheError;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::OnceLock;
use tempfile::NamedTempFile;

/// Cache statistics
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CacheStats {
    /// Cache directory
    pub root: PathBuf,
    /// Number of cached previews
    pub total_entries: usize,
    /// Total size of cached previews in bytes
    pub total_size_bytes: u64,
}

/// On-disk preview cache for RAW files
pub struct ThumbnailCache {
    configured_root: Option<PathBuf>,
    root: OnceLock<PathBuf>,
    extractor: Box<dyn PreviewExtractor>,
}

impl ThumbnailCache {
    /// Cache under the per-user cache directory
    pub fn new() -> Self {
        Self {
            configured_root: None,
            root: OnceLock::new(),
            extractor: Box::new(EmbeddedJpegExtractor),
        }
    }

    /// Cache under a specific directory
    pub fn with_root(root: impl Into<PathBuf>) -> Self {
        Self {
            configured_root: Some(root.into()),
            ..Self::new()
        }
    }

    /// Replace the preview extractor
    pub fn with_extractor(mut self, extractor: impl PreviewExtractor + 'static) -> Self {
        self.extractor = Box::new(extractor);
        self
    }

    /// Default cache directory, e.g. `~/.cache/photo-ingest/thumbnails`
    pub fn default_root() -> Option<PathBuf> {
        dirs::cache_dir().map(|dir| dir.join("photo-ingest").join("thumbnails"))
    }

    /// Path to a displayable preview of a RAW file.
    ///
    /// Returns the cached preview, extracting and storing it first if
    /// needed. `None` means no preview is available right now.
    pub fn get_thumbnail(&self, path: &Path) -> Option<PathBuf> {
        match self.lookup(path) {
            Ok(cached) => cached,
            Err(e) => {
                tracing::warn!(path = %path.display(), error = %e, "thumbnail lookup failed");
                None
            }
        }
    }

    /// Path a UI can render for any media file.
    ///
    /// JPEG and PNG files are shown as they are; RAW files go through the
    /// cache; everything else has no display path.
    pub fn display_path(&self, path: &Path) -> Option<PathBuf> {
        let kind = MediaKind::from_path(path);
        if kind.is_renderable() {
            Some(path.to_path_buf())
        } else if kind == MediaKind::Raw {
            self.get_thumbnail(path)
        } else {
            None
        }
    }

    /// Resolve display paths for many files in parallel, in input order.
    pub fn display_paths(&self, paths: &[PathBuf]) -> Vec<Option<PathBuf>> {
        paths.par_iter().map(|path| self.display_path(path)).collect()
    }

    /// Count and size the cached previews
    pub fn stats(&self) -> Result<CacheStats, CacheError> {
        let root = self.root()?;
        let entries = fs::read_dir(root).map_err(|e| CacheError::List {
            path: root.to_path_buf(),
            source: e,
        })?;

        let mut stats = CacheStats {
            root: root.to_path_buf(),
            ..Default::default()
        };

        for entry in entries.flatten() {
            let is_entry = entry
                .file_name()
                .to_str()
                .is_some_and(|name| name.ends_with(ENTRY_SUFFIX));
            if !is_entry {
                continue;
            }
            if let Ok(metadata) = entry.metadata() {
                stats.total_entries += 1;
                stats.total_size_bytes += metadata.len();
            }
        }

        Ok(stats)
    }

    fn lookup(&self, path: &Path) -> Result<Option<PathBuf>, CacheError> {
        let source = std::path::absolute(path).map_err(|e| CacheError::SourceMetadata {
            path: path.to_path_buf(),
            source: e,
        })?;
        let modified = fs::metadata(&source)
            .and_then(|m| m.modified())
            .map_err(|e| CacheError::SourceMetadata {
                path: source.clone(),
                source: e,
            })?;

        let root = self.root()?;
        let cached = root.join(cache_key(&source, modified));

        if cached.is_file() {
            return Ok(Some(cached));
        }

        let Some(bytes) = self.extractor.extract(&source) else {
            return Ok(None);
        };

        write_entry(root, &cached, &bytes)?;
        tracing::debug!(source = %source.display(), entry = %cached.display(), "cached preview");
        Ok(Some(cached))
    }

    /// The cache directory, created on first successful use.
    fn root(&self) -> Result<&Path, CacheError> {
        if let Some(root) = self.root.get() {
            return Ok(root.as_path());
        }

        let root = match &self.configured_root {
            Some(root) => root.clone(),
            None => Self::default_root().ok_or(CacheError::NoCacheDir)?,
        };

        fs::create_dir_all(&root).map_err(|e| CacheError::CreateRoot {
            path: root.clone(),
            source: e,
        })?;

        Ok(self.root.get_or_init(|| root).as_path())
    }
}

impl Default for ThumbnailCache {
    fn default() -> Self {
        Self::new()
    }
}

/// Write `bytes` to a temporary file next to `target`, then rename it into place.
fn write_entry(root: &Path, target: &Path, bytes: &[u8]) -> Result<(), CacheError> {
    let write_error = |source: std::io::Error| CacheError::Write {
        path: target.to_path_buf(),
        source,
    };

    let mut temp = NamedTempFile::new_in(root).map_err(write_error)?;
    temp.write_all(bytes).map_err(write_error)?;
    temp.persist(target).map_err(|e| write_error(e.error))?;
    Ok(())
}
