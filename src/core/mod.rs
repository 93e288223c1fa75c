//! # Core Module
//!
//! The GUI-agnostic ingest engine.
//!
//! ## Modules
//! - `media` - Recognized formats and project folder names
//! - `preview` - Extracts embedded JPEG previews from RAW files
//! - `thumbnail` - Persistent on-disk preview cache
//! - `transfer` - Streams files into a project with progress reporting
//! - `volume` - Detects memory cards and finds the media on them

pub mod media;
pub mod preview;
pub mod thumbnail;
pub mod transfer;
pub mod volume;

// Re-export commonly used types
pub use media::MediaKind;
pub use preview::{EmbeddedJpegExtractor, PreviewExtractor};
pub use thumbnail::ThumbnailCache;
pub use transfer::{TransferEngine, TransferReport};
pub use volume::{MonitorConfig, VolumeMonitor};
