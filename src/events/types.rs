//! Event type definitions for progress reporting and card detection.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use uuid::Uuid;

/// All events emitted by the ingest core
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum Event {
    /// Batch transfer events
    Transfer(TransferEvent),
    /// Removable volume events
    Volume(VolumeEvent),
}

/// Events during a batch transfer
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum TransferEvent {
    /// A transfer job has started
    Started { job_id: Uuid, total: usize },
    /// A file was copied successfully
    Progress(TransferProgress),
    /// A file could not be copied; the job continues
    FileFailed {
        job_id: Uuid,
        path: PathBuf,
        message: String,
    },
    /// Every file of the job has been attempted
    Completed {
        job_id: Uuid,
        succeeded: usize,
        failed: usize,
    },
}

/// Progress after each successfully copied file
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransferProgress {
    /// Job this progress belongs to
    pub job_id: Uuid,
    /// Files copied so far (failures don't count)
    pub completed: usize,
    /// Files in the job
    pub total: usize,
    /// File name of the file just copied
    pub current_file: String,
}

/// Events from the removable volume monitor
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum VolumeEvent {
    /// The monitor started polling
    MonitorStarted { known_volumes: usize },
    /// A newly mounted volume carries camera media
    CardDetected(CardDetected),
    /// The monitor stopped polling
    MonitorStopped,
}

/// A newly observed volume with importable media
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CardDetected {
    /// Volume root
    pub drive: PathBuf,
    /// The media directory found on the volume
    pub dcim_path: PathBuf,
    /// Total number of media files under `dcim_path`
    pub image_count: usize,
    /// The first few media files, for a quick preview
    pub images: Vec<PathBuf>,
    /// When the monitor noticed the volume
    pub detected_at: DateTime<Utc>,
}
