//! Media directory traversal.

use crate::core::media::is_media_file;
use crate::error::ScanError;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

/// Result of scanning a media directory
#[derive(Debug, Default)]
pub struct MediaScan {
    /// Media files found, in traversal order
    pub files: Vec<PathBuf>,
    /// Directories that could not be read (non-fatal)
    pub errors: Vec<ScanError>,
}

/// Collect every media file under `root`, at any depth.
///
/// Uses an explicit stack instead of recursion. Entries are visited in
/// name order and a directory's own files come before those of its
/// subdirectories. Symlinks are not followed. A directory or entry that
/// can't be read is recorded and skipped.
pub fn scan_media_dir(root: &Path) -> MediaScan {
    let mut scan = MediaScan::default();
    let mut pending = vec![root.to_path_buf()];

    while let Some(dir) = pending.pop() {
        let mut entries = match read_sorted(&dir, &mut scan.errors) {
            Ok(entries) => entries,
            Err(e) => {
                tracing::warn!(path = %dir.display(), error = %e, "skipping unreadable directory");
                scan.errors.push(e);
                continue;
            }
        };

        let mut subdirs = Vec::new();
        for (path, is_dir) in entries.drain(..) {
            if is_dir {
                subdirs.push(path);
            } else if is_media_file(&path) {
                scan.files.push(path);
            }
        }

        // Reverse so the first subdirectory is popped first
        pending.extend(subdirs.into_iter().rev());
    }

    scan
}

/// Directory entries sorted by name, flagged as directory or not
fn read_sorted(dir: &Path, errors: &mut Vec<ScanError>) -> Result<Vec<(PathBuf, bool)>, ScanError> {
    let read = fs::read_dir(dir).map_err(|e| ScanError::from_io(dir.to_path_buf(), e))?;

    let entries = read.map(|entry| {
        entry.map(|entry| {
            let is_dir = entry.file_type().map(|t| t.is_dir()).unwrap_or(false);
            (entry.path(), is_dir)
        })
    });

    Ok(collect_sorted(dir, entries, errors))
}

/// Keep the readable entries, sorted; a failed entry is recorded and
/// skipped without losing its siblings.
fn collect_sorted(
    dir: &Path,
    entries: impl IntoIterator<Item = io::Result<(PathBuf, bool)>>,
    errors: &mut Vec<ScanError>,
) -> Vec<(PathBuf, bool)> {
    let mut kept = Vec::new();
    for entry in entries {
        match entry {
            Ok(entry) => kept.push(entry),
            Err(e) => {
                tracing::warn!(path = %dir.display(), error = %e, "skipping unreadable entry");
                errors.push(ScanError::from_io(dir.to_path_buf(), e));
            }
        }
    }

    kept.sort_by(|a, b| a.0.cmp(&b.0));
    kept
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn touch(path: &Path) {
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, b"x").unwrap();
    }

    #[test]
    fn finds_media_at_any_depth_in_order() {
        let temp_dir = TempDir::new().unwrap();
        let dcim = temp_dir.path().join("DCIM");
        touch(&dcim.join("100NIKON/DSC_0002.NEF"));
        touch(&dcim.join("100NIKON/DSC_0001.JPG"));
        touch(&dcim.join("101NIKON/deep/er/DSC_0100.nef"));
        touch(&dcim.join("ROOT.ARW"));

        let scan = scan_media_dir(&dcim);

        assert!(scan.errors.is_empty());
        assert_eq!(
            scan.files,
            vec![
                dcim.join("ROOT.ARW"),
                dcim.join("100NIKON/DSC_0001.JPG"),
                dcim.join("100NIKON/DSC_0002.NEF"),
                dcim.join("101NIKON/deep/er/DSC_0100.nef"),
            ]
        );
    }

    #[test]
    fn ignores_non_media_files() {
        let temp_dir = TempDir::new().unwrap();
        touch(&temp_dir.path().join("100CANON/IMG_0001.CR2"));
        touch(&temp_dir.path().join("100CANON/IMG_0001.THM"));
        touch(&temp_dir.path().join("MISC/AUTPRINT.MRK"));

        let scan = scan_media_dir(temp_dir.path());

        assert_eq!(scan.files.len(), 1);
        assert!(scan.files[0].ends_with("IMG_0001.CR2"));
    }

    #[test]
    fn missing_root_is_recorded_not_fatal() {
        let temp_dir = TempDir::new().unwrap();
        let scan = scan_media_dir(&temp_dir.path().join("DCIM"));

        assert!(scan.files.is_empty());
        assert!(matches!(
            scan.errors.as_slice(),
            [ScanError::DirectoryNotFound { .. }]
        ));
    }

    #[test]
    fn failed_entry_keeps_its_siblings() {
        let dir = Path::new("/card/DCIM/100CANON");
        let entries = vec![
            Ok((dir.join("IMG_0002.CR2"), false)),
            Err(io::Error::other("bad sector")),
            Ok((dir.join("IMG_0001.CR2"), false)),
        ];
        let mut errors = Vec::new();

        let kept = collect_sorted(dir, entries, &mut errors);

        assert_eq!(
            kept,
            vec![
                (dir.join("IMG_0001.CR2"), false),
                (dir.join("IMG_0002.CR2"), false),
            ]
        );
        assert!(matches!(
            errors.as_slice(),
            [ScanError::ReadDirectory { path, .. }] if path == dir
        ));
    }

    #[cfg(unix)]
    #[test]
    fn unreadable_subdirectory_is_skipped() {
        use std::os::unix::fs::PermissionsExt;

        let temp_dir = TempDir::new().unwrap();
        touch(&temp_dir.path().join("100/A.JPG"));
        touch(&temp_dir.path().join("200/B.JPG"));
        let locked = temp_dir.path().join("200");
        fs::set_permissions(&locked, fs::Permissions::from_mode(0o000)).unwrap();

        let scan = scan_media_dir(temp_dir.path());

        // Restore so TempDir can clean up
        fs::set_permissions(&locked, fs::Permissions::from_mode(0o755)).unwrap();

        assert!(scan.files.contains(&temp_dir.path().join("100/A.JPG")));
        // Root ignores permission bits, so only assert when the lock held
        if !scan.files.contains(&temp_dir.path().join("200/B.JPG")) {
            assert_eq!(scan.errors.len(), 1);
        }
    }
}
