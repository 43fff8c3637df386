//! I/O boundary traits for testability
//!
//! These traits abstract external I/O operations, allowing services
//! to be tested with mock implementations.

use std::io;
use std::path::{Path, PathBuf};

/// What occupies a filesystem path.
///
/// Pre-existence checks branch on this instead of treating a failed stat
/// as control flow.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PathState {
    /// Nothing occupies the path
    Absent,
    /// A directory, or a symlink resolving to one
    Dir,
    /// Something else: a regular file, or a dangling symlink
    Other,
}

/// Filesystem abstraction for testability.
pub trait FileSystem: Send + Sync {
    /// Read file contents to string.
    fn read_to_string(&self, path: &Path) -> io::Result<String>;

    /// Check if path exists.
    fn exists(&self, path: &Path) -> bool;

    /// Check if path is a file.
    fn is_file(&self, path: &Path) -> bool;

    /// Check if path is a directory.
    fn is_dir(&self, path: &Path) -> bool;

    /// Create directory and all parent directories.
    fn create_dir_all(&self, path: &Path) -> io::Result<()>;

    /// Remove a file.
    fn remove_file(&self, path: &Path) -> io::Result<()>;

    /// Remove a directory and all its contents.
    fn remove_dir_all(&self, path: &Path) -> io::Result<()>;

    /// Create a symbolic link.
    fn symlink(&self, original: &Path, link: &Path) -> io::Result<()>;

    /// Canonicalize path (resolve symlinks, make absolute).
    fn canonicalize(&self, path: &Path) -> io::Result<PathBuf>;

    /// Copy file from source to destination.
    fn copy(&self, from: &Path, to: &Path) -> io::Result<u64>;

    /// Copy directory recursively from source to destination.
    fn copy_dir(&self, from: &Path, to: &Path) -> io::Result<()>;

    /// Copy file or directory (auto-detect).
    fn copy_any(&self, from: &Path, to: &Path) -> io::Result<()>;

    /// Remove file or directory (auto-detect).
    fn remove_any(&self, path: &Path) -> io::Result<()>;

    /// Classify what currently occupies `path`. A trailing symlink is
    /// classified by what it resolves to; a dangling one is `Other`,
    /// not `Absent`.
    fn probe(&self, path: &Path) -> PathState;

    /// Link `original` at `link`, falling back to a full copy where
    /// symlinks are unavailable. A failed copy removes the partial
    /// destination, so `link` ends up either fully usable or absent.
    fn link_or_copy(&self, original: &Path, link: &Path) -> io::Result<()> {
        match self.symlink(original, link) {
            Ok(()) => Ok(()),
            Err(e)
                if matches!(
                    e.kind(),
                    io::ErrorKind::Unsupported | io::ErrorKind::PermissionDenied
                ) =>
            {
                if let Err(copy_err) = self.copy_any(original, link) {
                    let _ = self.remove_any(link);
                    return Err(copy_err);
                }
                Ok(())
            }
            Err(e) => Err(e),
        }
    }

    /// Folder that owns a path: the path itself for directories,
    /// otherwise its parent.
    fn owning_folder(&self, path: &Path) -> PathBuf {
        if self.is_dir(path) {
            path.to_path_buf()
        } else {
            path.parent().unwrap_or(path).to_path_buf()
        }
    }
}

// ============================================================
// REAL IMPLEMENTATIONS
// ============================================================

/// Real filesystem implementation.
#[derive(Debug, Default)]
pub struct RealFileSystem;

impl FileSystem for RealFileSystem {
    fn read_to_string(&self, path: &Path) -> io::Result<String> {
        std::fs::read_to_string(path)
    }

    fn exists(&self, path: &Path) -> bool {
        path.exists()
    }

    fn is_file(&self, path: &Path) -> bool {
        path.is_file()
    }

    fn is_dir(&self, path: &Path) -> bool {
        path.is_dir()
    }

    fn create_dir_all(&self, path: &Path) -> io::Result<()> {
        std::fs::create_dir_all(path)
    }

    fn remove_file(&self, path: &Path) -> io::Result<()> {
        std::fs::remove_file(path)
    }

    fn remove_dir_all(&self, path: &Path) -> io::Result<()> {
        std::fs::remove_dir_all(path)
    }

    fn symlink(&self, original: &Path, link: &Path) -> io::Result<()> {
        #[cfg(unix)]
        {
            std::os::unix::fs::symlink(original, link)
        }
        #[cfg(windows)]
        {
            if original.is_dir() {
                std::os::windows::fs::symlink_dir(original, link)
            } else {
                std::os::windows::fs::symlink_file(original, link)
            }
        }
    }

    fn canonicalize(&self, path: &Path) -> io::Result<PathBuf> {
        std::fs::canonicalize(path)
    }

    fn copy(&self, from: &Path, to: &Path) -> io::Result<u64> {
        std::fs::copy(from, to)
    }

    fn copy_dir(&self, from: &Path, to: &Path) -> io::Result<()> {
        use walkdir::WalkDir;

        std::fs::create_dir_all(to)?;
        for entry in WalkDir::new(from).into_iter().filter_map(|e| e.ok()) {
            let rel_path = entry
                .path()
                .strip_prefix(from)
                .map_err(|e| io::Error::new(io::ErrorKind::InvalidInput, e.to_string()))?;
            let target = to.join(rel_path);

            if entry.file_type().is_dir() {
                std::fs::create_dir_all(&target)?;
            } else {
                std::fs::copy(entry.path(), &target)?;
            }
        }
        Ok(())
    }

    fn copy_any(&self, from: &Path, to: &Path) -> io::Result<()> {
        if from.is_dir() {
            self.copy_dir(from, to)
        } else {
            self.copy(from, to).map(|_| ())
        }
    }

    fn remove_any(&self, path: &Path) -> io::Result<()> {
        if path.is_dir() {
            self.remove_dir_all(path)
        } else {
            self.remove_file(path)
        }
    }

    fn probe(&self, path: &Path) -> PathState {
        let meta = match std::fs::symlink_metadata(path) {
            Ok(meta) => meta,
            Err(_) => return PathState::Absent,
        };
        if meta.file_type().is_symlink() {
            // classify by what the link resolves to; dangling links
            // occupy the path without being usable
            return match std::fs::metadata(path) {
                Ok(target) if target.is_dir() => PathState::Dir,
                _ => PathState::Other,
            };
        }
        if meta.is_dir() {
            PathState::Dir
        } else {
            PathState::Other
        }
    }
}
