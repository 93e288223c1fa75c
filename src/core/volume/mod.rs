//! # Volume Module
//!
//! Notices memory cards being mounted and finds the photos on them.
//!
//! ## How it works
//! 1. Every poll, the mounted volume roots are listed
//! 2. Roots not seen before are checked for a `DCIM` directory
//! 3. If it holds media, a [`CardDetected`](crate::events::CardDetected)
//!    event is sent with the file count and the first few paths
//! 4. Roots that disappeared are forgotten without an event
//!
//! ## Example
//! ```rust,ignore
//! use photo_ingest::core::volume::{MonitorConfig, VolumeMonitor};
//! use photo_ingest::events::EventChannel;
//!
//! let (sender, receiver) = EventChannel::new();
//! let handle = VolumeMonitor::new(MonitorConfig::default()).spawn(sender)?;
//!
//! for event in receiver.iter() {
//!     println!("{:?}", event);
//! }
//! handle.stop()?;
//! ```

mod enumerate;
mod monitor;
mod scan;

pub use enumerate::{MountParent, MountPointEnumerator, VolumeEnumerator};
pub use monitor::{MonitorConfig, MonitorHandle, VolumeMonitor};
pub use scan::{scan_media_dir, MediaScan};
