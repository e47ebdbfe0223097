//! Scratch directories for intermediate decoded files.
//!
//! A [`ScratchDirectory`] is a fresh directory under the OS temp area, named
//! with a crate-specific prefix. It is deleted recursively when closed or
//! dropped.

use std::{
    io,
    path::{Path, PathBuf},
};

use tempfile::TempDir;

/// Prefix of the per-session directory holding decoded frames.
pub const SESSION_PREFIX: &str = "framepick_session_";
/// Prefix of the per-export directory holding GIF input stills.
pub const GIF_EXPORT_PREFIX: &str = "framepick_gif_";

/// An owned temporary directory, removed on [`close`](ScratchDirectory::close)
/// or drop.
#[derive(Debug)]
pub struct ScratchDirectory {
    directory: TempDir,
}

impl ScratchDirectory {
    /// Create a new, empty directory under the OS temp area.
    pub fn new(prefix: &str) -> io::Result<Self> {
        let directory = tempfile::Builder::new().prefix(prefix).tempdir()?;
        log::debug!("Created scratch directory {}", directory.path().display());
        Ok(Self { directory })
    }

    /// Location of the directory.
    pub fn path(&self) -> &Path {
        self.directory.path()
    }

    /// Path of `file_name` inside the directory.
    pub fn file(&self, file_name: &str) -> PathBuf {
        self.directory.path().join(file_name)
    }

    /// Delete the directory and everything in it.
    ///
    /// Failures are logged and otherwise ignored; the directory is gone from
    /// this handle's point of view either way.
    pub fn close(self) {
        let path = self.directory.path().to_path_buf();
        match self.directory.close() {
            Ok(()) => log::debug!("Removed scratch directory {}", path.display()),
            Err(error) => log::warn!(
                "Failed to remove scratch directory {}: {error}",
                path.display()
            ),
        }
    }
}
