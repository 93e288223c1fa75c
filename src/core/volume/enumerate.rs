//! Discovery of mounted volume roots.

use std::path::PathBuf;
use walkdir::WalkDir;

/// Lists the volume roots currently present.
///
/// Implement this trait to feed the monitor from somewhere other than
/// the real filesystem (e.g., for testing).
pub trait VolumeEnumerator: Send {
    /// Volume roots present right now
    fn volumes(&self) -> Vec<PathBuf>;
}

impl<F> VolumeEnumerator for F
where
    F: Fn() -> Vec<PathBuf> + Send,
{
    fn volumes(&self) -> Vec<PathBuf> {
        self()
    }
}

/// A directory whose descendants at a fixed depth range are mount points
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MountParent {
    pub path: PathBuf,
    pub min_depth: usize,
    pub max_depth: usize,
}

impl MountParent {
    pub fn new(path: impl Into<PathBuf>, min_depth: usize, max_depth: usize) -> Self {
        Self {
            path: path.into(),
            min_depth,
            max_depth,
        }
    }
}

/// Enumerates volumes by listing the usual mount parents
#[derive(Debug, Clone)]
pub struct MountPointEnumerator {
    parents: Vec<MountParent>,
}

impl MountPointEnumerator {
    /// Enumerator for the current platform.
    ///
    /// On Unix-like systems: `/media/<user>/<volume>`,
    /// `/run/media/<user>/<volume>`, and both `/mnt/<volume>` and
    /// `/mnt/<user>/<volume>`.
    #[cfg(not(windows))]
    pub fn new() -> Self {
        Self::with_parents(vec![
            MountParent::new("/media", 2, 2),
            MountParent::new("/mnt", 1, 2),
            MountParent::new("/run/media", 2, 2),
        ])
    }

    /// Enumerator for the current platform.
    ///
    /// On Windows the drive letters `D:` to `Z:` are probed.
    #[cfg(windows)]
    pub fn new() -> Self {
        let parents = (b'D'..=b'Z')
            .map(|letter| MountParent::new(format!("{}:\\", letter as char), 0, 0))
            .collect();
        Self::with_parents(parents)
    }

    /// Enumerator over custom mount parents
    pub fn with_parents(parents: Vec<MountParent>) -> Self {
        Self { parents }
    }
}

impl Default for MountPointEnumerator {
    fn default() -> Self {
        Self::new()
    }
}

impl VolumeEnumerator for MountPointEnumerator {
    fn volumes(&self) -> Vec<PathBuf> {
        let mut volumes = Vec::new();

        for parent in &self.parents {
            if !parent.path.exists() {
                continue;
            }

            let walker = WalkDir::new(&parent.path)
                .min_depth(parent.min_depth)
                .max_depth(parent.max_depth)
                .follow_links(true)
                .sort_by_file_name();

            for entry in walker {
                match entry {
                    Ok(entry) if entry.file_type().is_dir() => {
                        volumes.push(entry.into_path());
                    }
                    Ok(_) => {}
                    Err(e) => {
                        tracing::trace!(parent = %parent.path.display(), error = %e, "skipping mount entry");
                    }
                }
            }
        }

        volumes
    }
}
