//! Log files and their backups
//!
//! Every rewritten log keeps a sibling backup holding the content it had
//! before the first rewrite. Later runs always read from that backup, so
//! repeated shrinking re-derives from the original instead of compounding
//! truncation.

use std::fs::{self, OpenOptions};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use fs2::FileExt;
use thiserror::Error;

use crate::domain::Document;

#[derive(Debug, Error)]
pub enum LogFileError {
    #[error("File not found: {0}")]
    MissingInput(PathBuf),

    #[error("Backup not found: {0}")]
    MissingBackup(PathBuf),
}

/// Where the content to transform was read from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceKind {
    Backup,
    Original,
}

impl SourceKind {
    pub fn as_str(&self) -> &str {
        match self {
            SourceKind::Backup => "backup",
            SourceKind::Original => "original",
        }
    }
}

/// A log file on disk together with its backup path
#[derive(Debug, Clone)]
pub struct LogFile {
    path: PathBuf,
    backup_path: PathBuf,
}

impl LogFile {
    /// Creates a handle; `backup_suffix` replaces the file's extension
    pub fn new(path: impl Into<PathBuf>, backup_suffix: &str) -> Self {
        let path = path.into();
        let backup_path = path.with_extension(backup_suffix.trim_start_matches('.'));
        Self { path, backup_path }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn backup_path(&self) -> &Path {
        &self.backup_path
    }

    pub fn has_backup(&self) -> bool {
        self.backup_path.is_file()
    }

    /// Reads the content to transform, preferring the backup
    ///
    /// With `require_backup`, a missing backup is an error rather than a
    /// fallback to the log itself.
    pub fn read_source(&self, require_backup: bool) -> Result<(Document, SourceKind)> {
        if self.has_backup() {
            let content = fs::read_to_string(&self.backup_path)
                .with_context(|| format!("Failed to read backup: {}", self.backup_path.display()))?;
            return Ok((Document::new(content), SourceKind::Backup));
        }

        if require_backup {
            return Err(LogFileError::MissingBackup(self.backup_path.clone()).into());
        }

        if !self.path.is_file() {
            return Err(LogFileError::MissingInput(self.path.clone()).into());
        }

        let content = fs::read_to_string(&self.path)
            .with_context(|| format!("Failed to read log: {}", self.path.display()))?;
        Ok((Document::new(content), SourceKind::Original))
    }

    /// Copies the log to its backup unless a backup already exists
    ///
    /// Returns true if a backup was created.
    pub fn ensure_backup(&self) -> Result<bool> {
        if self.has_backup() {
            return Ok(false);
        }
        if !self.path.is_file() {
            return Err(LogFileError::MissingInput(self.path.clone()).into());
        }

        fs::copy(&self.path, &self.backup_path).with_context(|| {
            format!(
                "Failed to copy {} to {}",
                self.path.display(),
                self.backup_path.display()
            )
        })?;

        Ok(true)
    }

    /// Sibling file that carries the write lock
    ///
    /// The log itself is replaced by rename, so a lock on its inode would not
    /// be seen by anyone opening the path afterwards.
    pub fn lock_path(&self) -> PathBuf {
        self.path.with_extension("md.lock")
    }

    /// Replaces the log's content atomically (temp file + rename)
    ///
    /// An exclusive advisory lock on [`LogFile::lock_path`] is held while the
    /// new content is put in place.
    pub fn write(&self, document: &Document) -> Result<()> {
        let lock_path = self.lock_path();
        let lock_file = OpenOptions::new()
            .write(true)
            .create(true)
            .truncate(false)
            .open(&lock_path)
            .with_context(|| format!("Failed to open lock file: {}", lock_path.display()))?;

        lock_file
            .lock_exclusive()
            .with_context(|| format!("Failed to acquire write lock on {}", self.path.display()))?;

        let temp_path = self.path.with_extension("md.tmp");
        fs::write(&temp_path, document.content())
            .with_context(|| format!("Failed to write temp file: {}", temp_path.display()))?;

        fs::rename(&temp_path, &self.path).with_context(|| {
            format!(
                "Failed to rename {} to {}",
                temp_path.display(),
                self.path.display()
            )
        })?;

        FileExt::unlock(&lock_file).context("Failed to release write lock")?;
        Ok(())
    }
}

/// Size of a file in bytes, or `None` if it cannot be read
fn file_size(path: &Path) -> Option<u64> {
    fs::metadata(path).map(|m| m.len()).ok()
}

/// Lists `*.md` logs in `dir` larger than `threshold` bytes, sorted by name
///
/// Backups, temp files and lock files are never returned.
pub fn discover_large_logs(dir: &Path, threshold: u64, backup_suffix: &str) -> Result<Vec<PathBuf>> {
    let backup_ending = format!(".{}", backup_suffix.trim_start_matches('.'));
    let mut found = Vec::new();

    for entry in fs::read_dir(dir)
        .with_context(|| format!("Failed to read directory: {}", dir.display()))?
    {
        let entry = entry.context("Failed to read directory entry")?;
        let path = entry.path();

        let is_log = path.is_file()
            && path.extension().is_some_and(|e| e == "md")
            && !path.to_string_lossy().ends_with(&backup_ending);

        if is_log && file_size(&path).is_some_and(|size| size > threshold) {
            found.push(path);
        }
    }

    found.sort();
    Ok(found)
}
