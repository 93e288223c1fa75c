//! # Photo Ingest
//!
//! The ingest core of a photo project manager: it gets photos off memory
//! cards into project folders and makes RAW files previewable.
//!
//! ## Core Philosophy
//! - **Never overwrite** - an existing file in a project is never replaced
//! - **Partial results** - a batch always reports what worked and what didn't
//! - **Cheap previews** - RAW files are shown via their embedded JPEG, cached on disk
//!
//! ## Architecture
//! The library is split into a core engine (GUI-agnostic) and presentation layers:
//! - `core` - Preview extraction, thumbnail cache, transfers, volume monitoring
//! - `events` - Event-driven progress reporting (GUI-ready)
//! - `error` - Error types
//! - `cli` - Command-line interface

pub mod core;
pub mod error;
pub mod events;

// Re-export commonly used types at the crate root
pub use error::{IngestError, Result};

/// Initialize tracing for the library
///
/// This should be called by the application entry point (CLI or GUI).
/// `RUST_LOG` takes precedence over `default_level`.
pub fn init_tracing(default_level: &str) {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default_level));

    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .finish();

    // A subscriber may already be installed by an embedding application
    let _ = tracing::subscriber::set_global_default(subscriber);
}
