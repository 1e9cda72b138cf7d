//! ZIP archive of the backups for users deleted in one run.

use crate::error::{CleanupError, Result};
use chrono::NaiveDate;
use std::fs::{File, OpenOptions};
use std::io::{self, BufWriter, ErrorKind, Write};
use std::path::{Path, PathBuf};
use tracing::{info, warn};
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipWriter};

/// A written archive.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArchiveSummary {
    pub path: PathBuf,
    /// Entry names, in the order they were added
    pub entries: Vec<String>,
}

/// Archive name for a run on `date`: `MM-DD-YYYY_deleted_users.zip`.
pub fn archive_file_name(date: NaiveDate) -> String {
    format!("{}_deleted_users.zip", date.format("%m-%d-%Y"))
}

/// Attempts at finding a free archive name before giving up.
const MAX_ARCHIVE_NAME_ATTEMPTS: u32 = 100;

/// Bundle `files` into a deflate-compressed ZIP at `dest`.
///
/// Each file is stored at the archive root under its file name. An existing
/// archive is never replaced: if `dest` is taken, `-2`, `-3`, ... is added to
/// the file stem and the returned summary carries the path actually written.
/// If writing fails, the partial archive is removed.
pub fn create_archive(files: &[PathBuf], dest: &Path) -> Result<ArchiveSummary> {
    let (out, path) = create_unique(dest)?;

    match write_archive(out, files, &path) {
        Ok(entries) => {
            info!(
                path = %path.display(),
                entries = entries.len(),
                "Backup archive created"
            );
            Ok(ArchiveSummary { path, entries })
        }
        Err(e) => {
            if let Err(rm) = std::fs::remove_file(&path) {
                if rm.kind() != ErrorKind::NotFound {
                    warn!(path = %path.display(), error = %rm, "Failed to remove partial archive");
                }
            }
            Err(e)
        }
    }
}

/// Create a new file at `dest`, or at the first free suffixed name.
fn create_unique(dest: &Path) -> Result<(File, PathBuf)> {
    for attempt in 1..=MAX_ARCHIVE_NAME_ATTEMPTS {
        let candidate = if attempt == 1 {
            dest.to_path_buf()
        } else {
            suffixed(dest, attempt)
        };

        match OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(&candidate)
        {
            Ok(file) => return Ok((file, candidate)),
            Err(e) if e.kind() == ErrorKind::AlreadyExists => {
                warn!(path = %candidate.display(), "Archive already exists, trying another name");
            }
            Err(e) => return Err(CleanupError::io(&candidate, e)),
        }
    }

    Err(CleanupError::io(
        dest,
        io::Error::new(ErrorKind::AlreadyExists, "no free archive name"),
    ))
}

/// `dir/name.zip` -> `dir/name-<n>.zip`
fn suffixed(dest: &Path, n: u32) -> PathBuf {
    let stem = dest
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();
    let name = match dest.extension() {
        Some(ext) => format!("{}-{}.{}", stem, n, ext.to_string_lossy()),
        None => format!("{}-{}", stem, n),
    };
    dest.with_file_name(name)
}

fn write_archive(out: File, files: &[PathBuf], dest: &Path) -> Result<Vec<String>> {
    let mut zip = ZipWriter::new(BufWriter::new(out));
    let options = SimpleFileOptions::default().compression_method(CompressionMethod::Deflated);

    let mut entries = Vec::with_capacity(files.len());

    for path in files {
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .ok_or_else(|| {
                CleanupError::io(
                    path,
                    io::Error::new(ErrorKind::InvalidInput, "path has no file name"),
                )
            })?;

        let contents = std::fs::read(path).map_err(|e| CleanupError::io(path, e))?;

        zip.start_file(name.clone(), options)?;
        zip.write_all(&contents)
            .map_err(|e| CleanupError::io(dest, e))?;
        entries.push(name);
    }

    let mut writer = zip.finish()?;
    writer.flush().map_err(|e| CleanupError::io(dest, e))?;

    Ok(entries)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Read;
    use tempfile::TempDir;

    #[test]
    fn test_archive_file_name() {
        let date = NaiveDate::from_ymd_opt(2026, 3, 7).unwrap();
        assert_eq!(archive_file_name(date), "03-07-2026_deleted_users.zip");
    }

    #[test]
    fn test_archive_contains_given_files() {
        let temp_dir = TempDir::new().unwrap();
        let a = temp_dir.path().join("a@example.com.json");
        let b = temp_dir.path().join("b@example.com.json");
        std::fs::write(&a, b"{\"identifier\":\"a@example.com\"}").unwrap();
        std::fs::write(&b, b"{\"identifier\":\"b@example.com\"}").unwrap();
        std::fs::write(temp_dir.path().join("stray.json"), b"{}").unwrap();

        let dest = temp_dir.path().join("out.zip");
        let summary = create_archive(&[a, b], &dest).unwrap();

        assert_eq!(summary.path, dest);
        assert_eq!(summary.entries, vec!["a@example.com.json", "b@example.com.json"]);

        let mut archive = zip::ZipArchive::new(File::open(&dest).unwrap()).unwrap();
        assert_eq!(archive.len(), 2);

        let mut contents = String::new();
        archive
            .by_name("a@example.com.json")
            .unwrap()
            .read_to_string(&mut contents)
            .unwrap();
        assert_eq!(contents, "{\"identifier\":\"a@example.com\"}");
        assert!(archive.by_name("stray.json").is_err());
    }

    #[test]
    fn test_missing_input_removes_partial_archive() {
        let temp_dir = TempDir::new().unwrap();
        let dest = temp_dir.path().join("out.zip");

        let result = create_archive(&[temp_dir.path().join("missing.json")], &dest);

        assert!(matches!(result, Err(CleanupError::Io { .. })));
        assert!(!dest.exists());
    }

    #[test]
    fn test_existing_archive_is_kept() {
        let temp_dir = TempDir::new().unwrap();
        let alice = temp_dir.path().join("alice.json");
        let bob = temp_dir.path().join("bob.json");
        std::fs::write(&alice, b"{\"identifier\":\"alice\"}").unwrap();
        std::fs::write(&bob, b"{\"identifier\":\"bob\"}").unwrap();
        let dest = temp_dir.path().join("10-19-2026_deleted_users.zip");

        let first = create_archive(&[alice], &dest).unwrap();
        let second = create_archive(&[bob.clone()], &dest).unwrap();
        let third = create_archive(&[bob], &dest).unwrap();

        assert_eq!(first.path, dest);
        assert_eq!(
            second.path,
            temp_dir.path().join("10-19-2026_deleted_users-2.zip")
        );
        assert_eq!(
            third.path,
            temp_dir.path().join("10-19-2026_deleted_users-3.zip")
        );

        let first_archive = zip::ZipArchive::new(File::open(&dest).unwrap()).unwrap();
        let names: Vec<&str> = first_archive.file_names().collect();
        assert_eq!(names, vec!["alice.json"]);
    }

    #[test]
    fn test_failed_write_leaves_existing_archive() {
        let temp_dir = TempDir::new().unwrap();
        let dest = temp_dir.path().join("out.zip");
        std::fs::write(&dest, b"earlier run").unwrap();

        let result = create_archive(&[temp_dir.path().join("missing.json")], &dest);

        assert!(result.is_err());
        assert_eq!(std::fs::read(&dest).unwrap(), b"earlier run");
        assert!(!temp_dir.path().join("out-2.zip").exists());
    }
}
