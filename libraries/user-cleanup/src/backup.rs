/// Backup writer - stores one JSON file per user before deletion
use crate::error::{CleanupError, Result};
use port_client::Entity;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tokio::fs::{self, OpenOptions};
use tokio::io::AsyncWriteExt;
use tracing::{debug, warn};

/// Default backup directory, relative to the working directory.
pub const DEFAULT_BACKUP_DIR: &str = "user_backups";

#[derive(Debug, Clone)]
pub struct BackupWriter {
    dir: PathBuf,
}

impl BackupWriter {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Path of the backup file for an identifier.
    pub fn path_for(&self, identifier: &str) -> PathBuf {
        self.dir.join(backup_file_name(identifier))
    }

    /// Write the full record to `<dir>/<identifier>.json`.
    ///
    /// Never overwrites an existing file. On any failure the partial file is
    /// removed, so a returned error means no backup exists for the record.
    pub async fn write(&self, entity: &Entity) -> Result<PathBuf> {
        let contents = serde_json::to_vec_pretty(entity)?;

        fs::create_dir_all(&self.dir)
            .await
            .map_err(|e| CleanupError::io(&self.dir, e))?;

        let path = self.path_for(&entity.identifier);

        let file = match OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(&path)
            .await
        {
            Ok(file) => file,
            Err(e) if e.kind() == ErrorKind::AlreadyExists => {
                return Err(CleanupError::BackupExists(path));
            }
            Err(e) => return Err(CleanupError::io(&path, e)),
        };

        // The handle is consumed here and dropped before any cleanup below
        if let Err(e) = write_and_flush(file, &contents).await {
            if let Err(rm) = fs::remove_file(&path).await {
                warn!(path = %path.display(), error = %rm, "Failed to remove partial backup");
            }
            return Err(CleanupError::io(&path, e));
        }

        debug!(path = %path.display(), bytes = contents.len(), "Backup written");
        Ok(path)
    }

    /// Remove one backup file. A file that is already gone is not an error.
    pub async fn discard(&self, path: &Path) -> Result<()> {
        match fs::remove_file(path).await {
            Ok(()) => {
                debug!(path = %path.display(), "Backup removed");
                Ok(())
            }
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(CleanupError::io(path, e)),
        }
    }

    /// Remove the given backup files, then the backup directory if it is
    /// left empty. Files this writer did not create are left alone.
    pub async fn cleanup(&self, paths: &[PathBuf]) -> Result<()> {
        for path in paths {
            self.discard(path).await?;
        }

        match fs::remove_dir(&self.dir).await {
            Ok(()) => {
                debug!(dir = %self.dir.display(), "Backup directory removed");
                Ok(())
            }
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => {
                // Directory still holds files from elsewhere
                warn!(
                    dir = %self.dir.display(),
                    error = %e,
                    "Backup directory not removed"
                );
                Ok(())
            }
        }
    }
}

impl Default for BackupWriter {
    fn default() -> Self {
        Self::new(DEFAULT_BACKUP_DIR)
    }
}

async fn write_and_flush(mut file: fs::File, contents: &[u8]) -> std::io::Result<()> {
    file.write_all(contents).await?;
    file.flush().await?;
    file.sync_all().await
}

/// File name for an identifier's backup.
///
/// Characters that would escape the backup directory or are invalid in
/// file names are replaced with `_`.
pub fn backup_file_name(identifier: &str) -> String {
    let sanitized: String = identifier
        .chars()
        .map(|c| match c {
            '/' | '\\' | ':' | '*' | '?' | '"' | '<' | '>' | '|' => '_',
            c if c.is_control() => '_',
            c => c,
        })
        .collect();

    let stem = match sanitized.trim() {
        "" | "." | ".." => "unknown",
        s => s,
    };

    format!("{}.json", stem)
}
