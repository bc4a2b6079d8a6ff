//! Filesystem capability used by the batch driver and processing engine.
//!
//! Everything that touches disk goes through the [`FileSystem`] trait so the
//! whole pipeline can run against an in-memory fake in tests. The production
//! implementation is [`OsFileSystem`]; it is stateless and reentrant, which
//! is what lets workers share one instance without coordination.

use anyhow::{Context, Result};
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// Minimal filesystem surface the tool needs. `Sync` so a single instance
/// can be shared across rayon workers.
pub trait FileSystem: Sync {
    /// The process working directory.
    fn current_dir(&self) -> Result<PathBuf>;

    /// List the files directly inside `dir` (no recursion, no directories).
    fn list_dir(&self, dir: &Path) -> Result<Vec<PathBuf>>;

    /// Create `dir` and any missing parents. Idempotent.
    fn create_dir_all(&self, dir: &Path) -> Result<()>;

    /// Read a whole file.
    fn read(&self, path: &Path) -> Result<Vec<u8>>;

    /// Write a whole file so that `path` is either fully written or absent.
    fn write_atomic(&self, path: &Path, bytes: &[u8]) -> Result<()>;
}

/// Real filesystem implementation backed by `std::fs`.
#[derive(Debug, Default, Clone, Copy)]
pub struct OsFileSystem;

impl FileSystem for OsFileSystem {
    fn current_dir(&self) -> Result<PathBuf> {
        std::env::current_dir().context("Failed to determine current directory")
    }

    fn list_dir(&self, dir: &Path) -> Result<Vec<PathBuf>> {
        let mut entries = Vec::new();
        for entry in WalkDir::new(dir).min_depth(1).max_depth(1).follow_links(false) {
            let entry = entry
                .with_context(|| format!("Failed to read directory: {}", dir.display()))?;
            if entry.file_type().is_file() {
                entries.push(entry.into_path());
            }
        }
        Ok(entries)
    }

    fn create_dir_all(&self, dir: &Path) -> Result<()> {
        std::fs::create_dir_all(dir)
            .with_context(|| format!("Failed to create directory: {}", dir.display()))
    }

    fn read(&self, path: &Path) -> Result<Vec<u8>> {
        std::fs::read(path).with_context(|| format!("Failed to read file: {}", path.display()))
    }

    fn write_atomic(&self, path: &Path, bytes: &[u8]) -> Result<()> {
        // Stage next to the destination so the rename stays on one filesystem.
        let mut tmp_name = path
            .file_name()
            .map(|n| n.to_os_string())
            .unwrap_or_else(|| "output".into());
        tmp_name.push(".tmp");
        let tmp_path = path.with_file_name(tmp_name);

        std::fs::write(&tmp_path, bytes)
            .with_context(|| format!("Failed to write file: {}", tmp_path.display()))?;
        if let Err(err) = std::fs::rename(&tmp_path, path) {
            let _ = std::fs::remove_file(&tmp_path);
            return Err(err).with_context(|| format!("Failed to finalize: {}", path.display()));
        }
        Ok(())
    }
}
