//! Cache key derivation.

use sha2::{Digest, Sha256};
use std::path::Path;
use std::time::{SystemTime, UNIX_EPOCH};

/// Suffix of every cache entry
pub const ENTRY_SUFFIX: &str = ".jpg";

/// File name of the cache entry for a source at `path` last modified at
/// `modified`.
///
/// The digest covers the path and the modification time in milliseconds,
/// so editing the source yields a new name and the old entry is simply
/// never looked up again.
pub fn cache_key(path: &Path, modified: SystemTime) -> String {
    let millis = modified
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis())
        .unwrap_or(0);

    let mut hasher = Sha256::new();
    hasher.update(path.to_string_lossy().as_bytes());
    hasher.update(millis.to_string().as_bytes());
    format!("{:x}{}", hasher.finalize(), ENTRY_SUFFIX)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn key_is_hex_digest_with_suffix() {
        let key = cache_key(Path::new("/photos/DSC_0001.NEF"), UNIX_EPOCH);
        assert_eq!(key.len(), 64 + ENTRY_SUFFIX.len());
        assert!(key.ends_with(".jpg"));
        assert!(key[..64].chars().all(|c| c.is_ascii_hexdigit()));
    }

    #[test]
    fn key_is_deterministic() {
        let when = UNIX_EPOCH + Duration::from_millis(1_714_000_000_123);
        assert_eq!(
            cache_key(Path::new("/a/IMG_1.CR2"), when),
            cache_key(Path::new("/a/IMG_1.CR2"), when)
        );
    }

    #[test]
    fn key_changes_with_mtime_millis() {
        let when = UNIX_EPOCH + Duration::from_millis(1_714_000_000_123);
        let later = when + Duration::from_millis(1);
        assert_ne!(
            cache_key(Path::new("/a/IMG_1.CR2"), when),
            cache_key(Path::new("/a/IMG_1.CR2"), later)
        );
    }

    #[test]
    fn key_changes_with_path() {
        assert_ne!(
            cache_key(Path::new("/a/IMG_1.CR2"), UNIX_EPOCH),
            cache_key(Path::new("/b/IMG_1.CR2"), UNIX_EPOCH)
        );
    }
}
