//! # Media Module
//!
//! Recognized camera media formats and how they are filed into a project.
//!
//! ## Supported Formats
//! - RAW family (.nef, .raw, .cr2, .arw, .dng) - filed under `RAW/`
//! - JPEG (.jpg, .jpeg) - filed under `JPG/`
//!
//! PNG is not imported from cards but is renderable as-is for display.

use serde::{Deserialize, Serialize};
use std::path::Path;

/// Name of the camera-standard media directory on removable storage
pub const MEDIA_DIR_NAME: &str = "DCIM";

/// Project subfolder for RAW files
pub const RAW_FOLDER: &str = "RAW";

/// Project subfolder for JPEG files
pub const JPEG_FOLDER: &str = "JPG";

const RAW_EXTENSIONS: &[&str] = &["nef", "raw", "cr2", "arw", "dng"];
const JPEG_EXTENSIONS: &[&str] = &["jpg", "jpeg"];

/// Media family of a file, decided by extension
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MediaKind {
    /// Proprietary camera RAW container
    Raw,
    /// JPEG image
    Jpeg,
    /// PNG image (displayable, never imported)
    Png,
    Unknown,
}

impl MediaKind {
    /// Detect the kind from a file extension (case-insensitive)
    pub fn from_extension(ext: &str) -> Self {
        let ext = ext.to_lowercase();
        if RAW_EXTENSIONS.contains(&ext.as_str()) {
            MediaKind::Raw
        } else if JPEG_EXTENSIONS.contains(&ext.as_str()) {
            MediaKind::Jpeg
        } else if ext == "png" {
            MediaKind::Png
        } else {
            MediaKind::Unknown
        }
    }

    /// Detect the kind of a path
    pub fn from_path(path: &Path) -> Self {
        path.extension()
            .and_then(|e| e.to_str())
            .map(MediaKind::from_extension)
            .unwrap_or(MediaKind::Unknown)
    }

    /// Whether files of this kind are picked up from cards and imported
    pub fn is_importable(&self) -> bool {
        matches!(self, MediaKind::Raw | MediaKind::Jpeg)
    }

    /// Whether a UI can show this file directly, without a cached preview
    pub fn is_renderable(&self) -> bool {
        matches!(self, MediaKind::Jpeg | MediaKind::Png)
    }

    /// Project subfolder this kind is filed under
    pub fn project_folder(&self) -> Option<&'static str> {
        match self {
            MediaKind::Raw => Some(RAW_FOLDER),
            MediaKind::Jpeg => Some(JPEG_FOLDER),
            MediaKind::Png | MediaKind::Unknown => None,
        }
    }
}

/// Check whether a path is on the media allow-list
pub fn is_media_file(path: &Path) -> bool {
    MediaKind::from_path(path).is_importable()
}
