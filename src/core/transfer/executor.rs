//! Batch copy of media files into a project.

use super::types::*;
use crate::core::media::{MediaKind, JPEG_FOLDER, RAW_FOLDER};
use crate::core::volume::scan_media_dir;
use crate::error::{IngestError, TransferFailure};
use crate::events::{Event, EventSink, TransferEvent, TransferProgress};
use std::fs::{self, File};
use std::io::{self, BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};
use std::time::Instant;
use uuid::Uuid;

/// Copy buffer size; memory use per transfer stays at this regardless
/// of file size
const COPY_BUFFER_BYTES: usize = 1024 * 1024;

/// Copies media files into `RAW/` and `JPG/` under a project root
#[derive(Debug, Clone, Default)]
pub struct TransferEngine {
    cancellation: Option<CancellationToken>,
}

impl TransferEngine {
    pub fn new() -> Self {
        Self::default()
    }

    /// Stop between files once `token` is cancelled
    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.cancellation = Some(token);
        self
    }

    /// Copy every source into `destination_root`, in order.
    ///
    /// Each file gets one result. Existing destinations are never
    /// overwritten, and one file failing never stops the others. After
    /// every successful copy a progress event is sent to `sink`.
    pub fn transfer(
        &self,
        sources: &[PathBuf],
        destination_root: &Path,
        sink: &dyn EventSink,
    ) -> TransferReport {
        let start = Instant::now();
        let job_id = Uuid::new_v4();
        let total = sources.len();

        tracing::info!(%job_id, total, destination = %destination_root.display(), "transfer started");
        sink.notify(Event::Transfer(TransferEvent::Started { job_id, total }));

        let mut completed = 0usize;
        let mut total_bytes = 0u64;
        let mut results = Vec::with_capacity(total);

        for source in sources {
            let outcome = if self.is_cancelled() {
                Err(TransferFailure::Cancelled)
            } else {
                Self::transfer_one(source, destination_root)
            };

            let outcome = match outcome {
                Ok((destination, bytes)) => {
                    completed += 1;
                    total_bytes += bytes;
                    sink.notify(Event::Transfer(TransferEvent::Progress(TransferProgress {
                        job_id,
                        completed,
                        total,
                        current_file: file_name(source),
                    })));
                    FileOutcome::Copied { destination }
                }
                Err(reason) => {
                    tracing::warn!(%job_id, source = %source.display(), %reason, "file not transferred");
                    sink.notify(Event::Transfer(TransferEvent::FileFailed {
                        job_id,
                        path: source.clone(),
                        message: reason.to_string(),
                    }));
                    FileOutcome::Failed { reason }
                }
            };

            results.push(FileTransferResult {
                source: source.clone(),
                outcome,
            });
        }

        let failed = total - completed;
        tracing::info!(%job_id, succeeded = completed, failed, "transfer finished");
        sink.notify(Event::Transfer(TransferEvent::Completed {
            job_id,
            succeeded: completed,
            failed,
        }));

        TransferReport {
            job_id,
            results,
            total_bytes,
            duration_ms: start.elapsed().as_millis() as u64,
        }
    }

    /// Import everything under a card's media directory.
    ///
    /// Directories on the card that can't be read are skipped; their files
    /// simply don't appear in the report.
    pub fn import_from_card(
        &self,
        dcim_path: &Path,
        destination_root: &Path,
        sink: &dyn EventSink,
    ) -> TransferReport {
        let scan = scan_media_dir(dcim_path);
        for error in &scan.errors {
            tracing::warn!(error = %error, "part of the card could not be read");
        }
        self.transfer(&scan.files, destination_root, sink)
    }

    fn is_cancelled(&self) -> bool {
        self.cancellation
            .as_ref()
            .is_some_and(CancellationToken::is_cancelled)
    }

    /// Copy one file; returns the destination and the bytes written.
    fn transfer_one(source: &Path, destination_root: &Path) -> Result<(PathBuf, u64), TransferFailure> {
        let folder = MediaKind::from_path(source).project_folder().ok_or_else(|| {
            TransferFailure::UnsupportedFormat {
                extension: source
                    .extension()
                    .map(|e| e.to_string_lossy().to_lowercase())
                    .unwrap_or_default(),
            }
        })?;

        let name = source
            .file_name()
            .ok_or_else(|| TransferFailure::SourceUnreadable {
                path: source.to_path_buf(),
                reason: "path has no file name".to_string(),
            })?;
        let destination = destination_root.join(folder).join(name);

        if destination.exists() {
            return Err(TransferFailure::AlreadyExists { destination });
        }

        let bytes = stream_copy(source, &destination)?;
        Ok((destination, bytes))
    }
}

/// Streamed copy that refuses to replace an existing file and removes
/// its partial output on failure.
fn stream_copy(source: &Path, destination: &Path) -> Result<u64, TransferFailure> {
    let input = File::open(source).map_err(|e| TransferFailure::SourceUnreadable {
        path: source.to_path_buf(),
        reason: e.to_string(),
    })?;

    let output = match File::options().write(true).create_new(true).open(destination) {
        Ok(file) => file,
        Err(e) if e.kind() == io::ErrorKind::AlreadyExists => {
            return Err(TransferFailure::AlreadyExists {
                destination: destination.to_path_buf(),
            })
        }
        Err(e) => {
            return Err(TransferFailure::Copy {
                destination: destination.to_path_buf(),
                reason: e.to_string(),
            })
        }
    };

    let mut reader = BufReader::with_capacity(COPY_BUFFER_BYTES, input);
    let mut writer = BufWriter::with_capacity(COPY_BUFFER_BYTES, output);

    let copied = io::copy(&mut reader, &mut writer).and_then(|bytes| {
        writer.flush()?;
        Ok(bytes)
    });

    copied.map_err(|e| {
        drop(writer);
        let _ = fs::remove_file(destination);
        TransferFailure::Copy {
            destination: destination.to_path_buf(),
            reason: e.to_string(),
        }
    })
}

fn file_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default()
}

/// Create the `RAW/` and `JPG/` folders a transfer files into.
pub fn prepare_destination(root: &Path) -> Result<(), IngestError> {
    for folder in [RAW_FOLDER, JPEG_FOLDER] {
        let path = root.join(folder);
        fs::create_dir_all(&path).map_err(|e| IngestError::Destination { path, source: e })?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::events::{null_sender, EventChannel};
    use tempfile::TempDir;

    fn project(temp: &TempDir) -> PathBuf {
        let root = temp.path().join("2024_05_01_Wedding");
        prepare_destination(&root).unwrap();
        root
    }

    fn source(temp: &TempDir, name: &str, contents: &[u8]) -> PathBuf {
        let path = temp.path().join(name);
        fs::write(&path, contents).unwrap();
        path
    }

    #[test]
    fn files_are_sorted_into_folders() {
        let src = TempDir::new().unwrap();
        let dest = TempDir::new().unwrap();
        let root = project(&dest);

        let sources = vec![
            source(&src, "DSC_0001.NEF", b"raw"),
            source(&src, "DSC_0001.JPG", b"jpeg"),
        ];

        let report = TransferEngine::new().transfer(&sources, &root, &null_sender());

        assert_eq!(report.succeeded(), 2);
        assert_eq!(report.total_bytes, 7);
        assert_eq!(fs::read(root.join("RAW/DSC_0001.NEF")).unwrap(), b"raw");
        assert_eq!(fs::read(root.join("JPG/DSC_0001.JPG")).unwrap(), b"jpeg");
        assert!(sources[0].exists(), "sources are copied, not moved");
    }

    #[test]
    fn existing_destination_is_not_overwritten() {
        let src = TempDir::new().unwrap();
        let dest = TempDir::new().unwrap();
        let root = project(&dest);
        fs::write(root.join("RAW/DSC_0001.NEF"), b"original").unwrap();

        let sources = vec![source(&src, "DSC_0001.NEF", b"new")];
        let report = TransferEngine::new().transfer(&sources, &root, &null_sender());

        assert_eq!(
            report.results[0].failure(),
            Some(&TransferFailure::AlreadyExists {
                destination: root.join("RAW/DSC_0001.NEF")
            })
        );
        assert_eq!(fs::read(root.join("RAW/DSC_0001.NEF")).unwrap(), b"original");
    }

    #[test]
    fn unsupported_and_missing_files_do_not_stop_the_batch() {
        let src = TempDir::new().unwrap();
        let dest = TempDir::new().unwrap();
        let root = project(&dest);

        let sources = vec![
            source(&src, "clip.MOV", b"video"),
            src.path().join("vanished.CR2"),
            source(&src, "IMG_0002.JPEG", b"ok"),
        ];

        let report = TransferEngine::new().transfer(&sources, &root, &null_sender());

        assert_eq!(report.results.len(), 3);
        assert!(matches!(
            report.results[0].failure(),
            Some(TransferFailure::UnsupportedFormat { extension }) if extension == "mov"
        ));
        assert!(matches!(
            report.results[1].failure(),
            Some(TransferFailure::SourceUnreadable { .. })
        ));
        assert!(report.results[2].is_success());
        assert!(!root.join("RAW/vanished.CR2").exists());
    }

    #[test]
    fn missing_project_folder_is_a_per_file_failure() {
        let src = TempDir::new().unwrap();
        let dest = TempDir::new().unwrap();

        let sources = vec![source(&src, "A.DNG", b"a")];
        let report = TransferEngine::new().transfer(&sources, dest.path(), &null_sender());

        assert!(matches!(
            report.results[0].failure(),
            Some(TransferFailure::Copy { .. })
        ));
    }

    #[test]
    fn progress_counts_only_successes() {
        let src = TempDir::new().unwrap();
        let dest = TempDir::new().unwrap();
        let root = project(&dest);

        let sources = vec![
            source(&src, "A.NEF", b"a"),
            source(&src, "B.txt", b"b"),
            source(&src, "C.JPG", b"c"),
        ];

        let (sender, receiver) = EventChannel::new();
        TransferEngine::new().transfer(&sources, &root, &sender);
        drop(sender);

        let progress: Vec<_> = receiver
            .iter()
            .filter_map(|event| match event {
                Event::Transfer(TransferEvent::Progress(p)) => Some((p.completed, p.total, p.current_file)),
                _ => None,
            })
            .collect();

        assert_eq!(
            progress,
            vec![(1, 3, "A.NEF".to_string()), (2, 3, "C.JPG".to_string())]
        );
    }

    #[test]
    fn cancelled_job_still_reports_every_file() {
        let src = TempDir::new().unwrap();
        let dest = TempDir::new().unwrap();
        let root = project(&dest);
        let sources = vec![source(&src, "A.NEF", b"a"), source(&src, "B.NEF", b"b")];

        let token = CancellationToken::new();
        token.cancel();
        let report = TransferEngine::new()
            .with_cancellation(token)
            .transfer(&sources, &root, &null_sender());

        assert_eq!(report.results.len(), 2);
        assert_eq!(report.failed(), 2);
        assert_eq!(report.results[0].failure(), Some(&TransferFailure::Cancelled));
        assert!(!root.join("RAW/A.NEF").exists());
    }

    #[test]
    fn import_from_card_copies_everything_found() {
        let card = TempDir::new().unwrap();
        let dest = TempDir::new().unwrap();
        let root = project(&dest);
        let dcim = card.path().join("DCIM/100MSDCF");
        fs::create_dir_all(&dcim).unwrap();
        fs::write(dcim.join("DSC00001.ARW"), b"raw").unwrap();
        fs::write(dcim.join("DSC00001.JPG"), b"jpg").unwrap();
        fs::write(dcim.join("INDEX.DAT"), b"junk").unwrap();

        let report =
            TransferEngine::new().import_from_card(&card.path().join("DCIM"), &root, &null_sender());

        assert_eq!(report.results.len(), 2);
        assert_eq!(report.succeeded(), 2);
        assert!(root.join("RAW/DSC00001.ARW").exists());
        assert!(root.join("JPG/DSC00001.JPG").exists());
    }
}
