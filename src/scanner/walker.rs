//! Directory traversal and candidate discovery.
//!
//! Walks the configured roots and yields regular, non-empty files with the
//! identity fields (device, inode) the audit log reports. Traversal problems
//! are warnings, never fatal: an unreadable directory entry is skipped and
//! the walk continues.

use std::path::{Path, PathBuf};

use walkdir::WalkDir;

/// Metadata for a discovered file, before any content is read.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileMeta {
    /// Path to the file
    pub path: PathBuf,
    /// File size in bytes
    pub size: u64,
    /// Device the file lives on
    pub device_id: u64,
    /// Inode number
    pub inode: u64,
}

/// Collect all regular files under the given roots.
///
/// Symlinks are not followed, empty files are skipped (every empty file is
/// trivially "equal" to every other and disposing of them is never useful),
/// and entries that cannot be read are reported as warnings and dropped.
#[must_use]
pub fn collect_files(roots: &[PathBuf]) -> Vec<FileMeta> {
    let mut files = Vec::new();

    for root in roots {
        for entry in WalkDir::new(root).follow_links(false) {
            let entry = match entry {
                Ok(e) => e,
                Err(e) => {
                    log::warn!("Skipping unreadable entry: {}", e);
                    continue;
                }
            };

            if !entry.file_type().is_file() {
                continue;
            }

            let metadata = match entry.metadata() {
                Ok(m) => m,
                Err(e) => {
                    log::warn!("Cannot stat {}: {}", entry.path().display(), e);
                    continue;
                }
            };

            if metadata.len() == 0 {
                log::debug!("Skipping empty file: {}", entry.path().display());
                continue;
            }

            let (device_id, inode) = identity(entry.path(), &metadata);
            files.push(FileMeta {
                path: entry.into_path(),
                size: metadata.len(),
                device_id,
                inode,
            });
        }
    }

    log::info!("Collected {} file(s) from {} root(s)", files.len(), roots.len());
    files
}

/// (device, inode) identity for a file.
///
/// On platforms without the Unix notion of inodes both fields are 0; the
/// hardlink pre-filter then never fires, which only costs redundant hashing.
#[cfg(unix)]
fn identity(_path: &Path, metadata: &std::fs::Metadata) -> (u64, u64) {
    use std::os::unix::fs::MetadataExt;
    (metadata.dev(), metadata.ino())
}

#[cfg(not(unix))]
fn identity(_path: &Path, _metadata: &std::fs::Metadata) -> (u64, u64) {
    (0, 0)
}
