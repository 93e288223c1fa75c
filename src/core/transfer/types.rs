//! Types for the transfer module.

use crate::error::TransferFailure;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use uuid::Uuid;

/// Outcome of one file in a transfer job
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum FileOutcome {
    /// Copied to `destination`
    Copied { destination: PathBuf },
    /// Not copied
    Failed { reason: TransferFailure },
}

/// Result record for one source file
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FileTransferResult {
    pub source: PathBuf,
    pub outcome: FileOutcome,
}

impl FileTransferResult {
    pub fn is_success(&self) -> bool {
        matches!(self.outcome, FileOutcome::Copied { .. })
    }

    /// Where the file landed, if it was copied
    pub fn destination(&self) -> Option<&PathBuf> {
        match &self.outcome {
            FileOutcome::Copied { destination } => Some(destination),
            FileOutcome::Failed { .. } => None,
        }
    }

    /// Why the file was not copied
    pub fn failure(&self) -> Option<&TransferFailure> {
        match &self.outcome {
            FileOutcome::Copied { .. } => None,
            FileOutcome::Failed { reason } => Some(reason),
        }
    }
}

/// Result of one transfer job, one entry per input path in input order
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TransferReport {
    pub job_id: Uuid,
    pub results: Vec<FileTransferResult>,
    pub total_bytes: u64,
    pub duration_ms: u64,
}

impl TransferReport {
    /// Number of files copied
    pub fn succeeded(&self) -> usize {
        self.results.iter().filter(|r| r.is_success()).count()
    }

    /// Number of files not copied
    pub fn failed(&self) -> usize {
        self.results.len() - self.succeeded()
    }
}

/// Cooperative cancellation for long transfers.
///
/// Cloned tokens share state; cancelling one cancels all.
#[derive(Debug, Clone, Default)]
pub struct CancellationToken {
    cancelled: Arc<AtomicBool>,
}

impl CancellationToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::SeqCst)
    }
}
