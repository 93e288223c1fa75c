//! # Transfer Module
//!
//! Copies media files from a card or a drop folder into a project.
//!
//! RAW files go to `<project>/RAW/`, JPEGs to `<project>/JPG/`. Copies are
//! streamed, existing files are never overwritten, and each file's outcome
//! is reported separately so a batch always finishes with a
//! succeeded/failed breakdown.

mod executor;
mod types;

pub use executor::{prepare_destination, TransferEngine};
pub use types::*;
