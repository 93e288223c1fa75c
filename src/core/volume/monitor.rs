//! Polling monitor for removable volumes.

use super::enumerate::{MountPointEnumerator, VolumeEnumerator};
use super::scan::scan_media_dir;
use crate::core::media::MEDIA_DIR_NAME;
use crate::error::MonitorError;
use crate::events::{CardDetected, Event, EventSink, VolumeEvent};
use chrono::Utc;
use crossbeam_channel::{bounded, RecvTimeoutError, Sender};
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::thread::{self, JoinHandle};
use std::time::Duration;

/// Configuration for the volume monitor
#[derive(Debug, Clone)]
pub struct MonitorConfig {
    /// Time between polls
    pub poll_interval: Duration,
    /// Media directory looked for on each new volume
    pub media_dir_name: String,
    /// How many file paths a detection event carries
    pub preview_limit: usize,
}

impl Default for MonitorConfig {
    fn default() -> Self {
        Self {
            poll_interval: Duration::from_secs(2),
            media_dir_name: MEDIA_DIR_NAME.to_string(),
            preview_limit: 10,
        }
    }
}

impl MonitorConfig {
    /// Set the poll interval
    pub fn with_poll_interval(mut self, interval: Duration) -> Self {
        self.poll_interval = interval;
        self
    }

    /// Set the media directory looked for on new volumes
    pub fn with_media_dir_name(mut self, name: impl Into<String>) -> Self {
        self.media_dir_name = name.into();
        self
    }

    /// Set how many file paths a detection event carries
    pub fn with_preview_limit(mut self, limit: usize) -> Self {
        self.preview_limit = limit;
        self
    }
}

/// Tracks which volumes are mounted and reports new ones carrying media.
///
/// The set of known volumes belongs to the monitor alone; once spawned,
/// only the polling thread touches it.
pub struct VolumeMonitor {
    config: MonitorConfig,
    enumerator: Box<dyn VolumeEnumerator>,
    known: HashSet<PathBuf>,
}

impl VolumeMonitor {
    /// Monitor the platform's usual mount points
    pub fn new(config: MonitorConfig) -> Self {
        Self::with_enumerator(config, MountPointEnumerator::new())
    }

    /// Monitor volumes reported by a custom enumerator
    pub fn with_enumerator(config: MonitorConfig, enumerator: impl VolumeEnumerator + 'static) -> Self {
        Self {
            config,
            enumerator: Box::new(enumerator),
            known: HashSet::new(),
        }
    }

    /// Record the volumes already present without reporting them.
    ///
    /// Returns how many volumes are known afterwards.
    pub fn prime(&mut self) -> usize {
        self.known.extend(self.enumerator.volumes());
        self.known.len()
    }

    /// One poll: adopt new volumes, forget vanished ones.
    ///
    /// Returns a detection for every newly seen volume whose media
    /// directory holds at least one media file. Vanished volumes are
    /// dropped silently, so a re-inserted card is reported again.
    pub fn tick(&mut self) -> Vec<CardDetected> {
        let current = self.enumerator.volumes();
        let mut detections = Vec::new();

        for drive in &current {
            if !self.known.insert(drive.clone()) {
                continue;
            }
            tracing::debug!(drive = %drive.display(), "volume appeared");
            if let Some(card) = self.inspect(drive) {
                tracing::info!(
                    drive = %card.drive.display(),
                    files = card.image_count,
                    "memory card detected"
                );
                detections.push(card);
            }
        }

        let present: HashSet<&PathBuf> = current.iter().collect();
        self.known.retain(|drive| present.contains(drive));

        detections
    }

    /// Volumes currently known, sorted
    pub fn known_volumes(&self) -> Vec<PathBuf> {
        let mut volumes: Vec<_> = self.known.iter().cloned().collect();
        volumes.sort();
        volumes
    }

    /// Look for media on a volume
    fn inspect(&self, drive: &Path) -> Option<CardDetected> {
        let dcim_path = drive.join(&self.config.media_dir_name);
        if !dcim_path.is_dir() {
            return None;
        }

        let scan = scan_media_dir(&dcim_path);
        if scan.files.is_empty() {
            return None;
        }

        let image_count = scan.files.len();
        let mut images = scan.files;
        images.truncate(self.config.preview_limit);

        Some(CardDetected {
            drive: drive.to_path_buf(),
            dcim_path,
            image_count,
            images,
            detected_at: Utc::now(),
        })
    }

    /// Run the monitor on a background thread.
    ///
    /// The thread primes the known set, then polls once per interval and
    /// sends each detection to `sink`. Polls run back to back on that one
    /// thread, so they never overlap.
    pub fn spawn(mut self, sink: impl EventSink + 'static) -> Result<MonitorHandle, MonitorError> {
        let (shutdown_tx, shutdown_rx) = bounded::<()>(1);
        let interval = self.config.poll_interval;

        let thread = thread::Builder::new()
            .name("volume-monitor".to_string())
            .spawn(move || {
                let known_volumes = self.prime();
                sink.notify(Event::Volume(VolumeEvent::MonitorStarted { known_volumes }));

                loop {
                    match shutdown_rx.recv_timeout(interval) {
                        Err(RecvTimeoutError::Timeout) => {
                            for card in self.tick() {
                                sink.notify(Event::Volume(VolumeEvent::CardDetected(card)));
                            }
                        }
                        Ok(()) | Err(RecvTimeoutError::Disconnected) => break,
                    }
                }

                sink.notify(Event::Volume(VolumeEvent::MonitorStopped));
            })
            .map_err(MonitorError::Spawn)?;

        Ok(MonitorHandle {
            shutdown: Some(shutdown_tx),
            thread: Some(thread),
        })
    }
}

/// Handle to a running monitor; dropping it stops the monitor.
pub struct MonitorHandle {
    shutdown: Option<Sender<()>>,
    thread: Option<JoinHandle<()>>,
}

impl MonitorHandle {
    /// Stop polling and wait for the current poll to finish
    pub fn stop(mut self) -> Result<(), MonitorError> {
        self.shutdown_and_join()
    }

    fn shutdown_and_join(&mut self) -> Result<(), MonitorError> {
        // Dropping the sender disconnects the channel and wakes the thread
        self.shutdown.take();
        match self.thread.take() {
            Some(thread) => thread.join().map_err(|_| MonitorError::Panicked),
            None => Ok(()),
        }
    }
}

impl Drop for MonitorHandle {
    fn drop(&mut self) {
        let _ = self.shutdown_and_join();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::events::EventChannel;
    use std::fs;
    use std::sync::{Arc, Mutex};
    use tempfile::TempDir;

    /// Enumerator whose answer the test can change between ticks
    fn scripted(volumes: Arc<Mutex<Vec<PathBuf>>>) -> impl VolumeEnumerator {
        move || volumes.lock().unwrap().clone()
    }

    fn card(root: &Path, name: &str, files: usize) -> PathBuf {
        let drive = root.join(name);
        let dir = drive.join("DCIM/100MEDIA");
        fs::create_dir_all(&dir).unwrap();
        for i in 0..files {
            fs::write(dir.join(format!("IMG_{i:04}.JPG")), b"x").unwrap();
        }
        drive
    }

    #[test]
    fn volumes_present_at_start_are_not_reported() {
        let temp_dir = TempDir::new().unwrap();
        let a = card(temp_dir.path(), "A", 3);
        let volumes = Arc::new(Mutex::new(vec![a.clone()]));

        let mut monitor =
            VolumeMonitor::with_enumerator(MonitorConfig::default(), scripted(volumes));
        assert_eq!(monitor.prime(), 1);

        assert!(monitor.tick().is_empty());
        assert_eq!(monitor.known_volumes(), vec![a]);
    }

    #[test]
    fn detection_carries_count_and_bounded_preview() {
        let temp_dir = TempDir::new().unwrap();
        let volumes = Arc::new(Mutex::new(Vec::new()));
        let mut monitor =
            VolumeMonitor::with_enumerator(MonitorConfig::default(), scripted(volumes.clone()));
        monitor.prime();

        let big = card(temp_dir.path(), "BIG", 25);
        volumes.lock().unwrap().push(big.clone());

        let detections = monitor.tick();
        assert_eq!(detections.len(), 1);
        let detected = &detections[0];
        assert_eq!(detected.drive, big);
        assert_eq!(detected.dcim_path, big.join("DCIM"));
        assert_eq!(detected.image_count, 25);
        assert_eq!(detected.images.len(), 10);
        assert!(detected.images[0].ends_with("IMG_0000.JPG"));
    }

    #[test]
    fn config_setters_shape_detections() {
        let temp_dir = TempDir::new().unwrap();
        let drive = temp_dir.path().join("PHONE");
        let dir = drive.join("Camera/2024");
        fs::create_dir_all(&dir).unwrap();
        for i in 0..5 {
            fs::write(dir.join(format!("PXL_{i:04}.JPG")), b"x").unwrap();
        }

        let config = MonitorConfig::default()
            .with_media_dir_name("Camera")
            .with_preview_limit(3);
        assert_eq!(config.media_dir_name, "Camera");
        assert_eq!(config.preview_limit, 3);

        let volumes = Arc::new(Mutex::new(Vec::new()));
        let mut monitor = VolumeMonitor::with_enumerator(config, scripted(volumes.clone()));
        monitor.prime();
        volumes.lock().unwrap().push(drive.clone());

        let detections = monitor.tick();
        assert_eq!(detections.len(), 1);
        assert_eq!(detections[0].dcim_path, drive.join("Camera"));
        assert_eq!(detections[0].image_count, 5);
        assert_eq!(detections[0].images.len(), 3);
    }

    #[test]
    fn volumes_without_media_are_tracked_but_not_reported() {
        let temp_dir = TempDir::new().unwrap();
        let plain = temp_dir.path().join("USB_STICK");
        fs::create_dir_all(&plain).unwrap();
        let empty_card = card(temp_dir.path(), "EMPTY", 0);

        let volumes = Arc::new(Mutex::new(Vec::new()));
        let mut monitor =
            VolumeMonitor::with_enumerator(MonitorConfig::default(), scripted(volumes.clone()));
        monitor.prime();

        *volumes.lock().unwrap() = vec![plain.clone(), empty_card.clone()];

        assert!(monitor.tick().is_empty());
        assert_eq!(monitor.known_volumes().len(), 2);
    }

    #[test]
    fn reinserted_card_is_reported_again() {
        let temp_dir = TempDir::new().unwrap();
        let sd = card(temp_dir.path(), "SD", 2);
        let volumes = Arc::new(Mutex::new(Vec::new()));
        let mut monitor =
            VolumeMonitor::with_enumerator(MonitorConfig::default(), scripted(volumes.clone()));
        monitor.prime();

        *volumes.lock().unwrap() = vec![sd.clone()];
        assert_eq!(monitor.tick().len(), 1);
        assert!(monitor.tick().is_empty());

        volumes.lock().unwrap().clear();
        assert!(monitor.tick().is_empty());
        assert!(monitor.known_volumes().is_empty());

        *volumes.lock().unwrap() = vec![sd];
        assert_eq!(monitor.tick().len(), 1);
    }

    #[test]
    fn spawned_monitor_sends_detections() {
        let temp_dir = TempDir::new().unwrap();
        let volumes = Arc::new(Mutex::new(Vec::new()));
        let config = MonitorConfig::default().with_poll_interval(Duration::from_millis(10));
        let monitor = VolumeMonitor::with_enumerator(config, scripted(volumes.clone()));

        let (sender, receiver) = EventChannel::new();
        let handle = monitor.spawn(sender).unwrap();

        match receiver.recv_timeout(Duration::from_secs(5)) {
            Some(Event::Volume(VolumeEvent::MonitorStarted { known_volumes })) => {
                assert_eq!(known_volumes, 0)
            }
            other => panic!("expected MonitorStarted, got {other:?}"),
        }

        let sd = card(temp_dir.path(), "SD", 4);
        volumes.lock().unwrap().push(sd.clone());

        match receiver.recv_timeout(Duration::from_secs(5)) {
            Some(Event::Volume(VolumeEvent::CardDetected(card))) => {
                assert_eq!(card.drive, sd);
                assert_eq!(card.image_count, 4);
            }
            other => panic!("expected CardDetected, got {other:?}"),
        }

        handle.stop().unwrap();
        assert!(matches!(
            receiver.recv_timeout(Duration::from_secs(5)),
            Some(Event::Volume(VolumeEvent::MonitorStopped))
        ));
    }
}
