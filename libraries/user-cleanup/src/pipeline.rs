//! The cleanup run: fetch, filter, back up and delete each eligible user,
//! then archive the backups of the users that were actually deleted.

use crate::archive::{archive_file_name, create_archive};
use crate::backup::BackupWriter;
use crate::directory::UserDirectory;
use crate::error::Result;
use crate::filter::InactivityFilter;
use crate::report::{ArchiveStatus, ProcessedRecord, RecordOutcome, RunReport};
use chrono::{DateTime, Local, NaiveDate, Utc};
use port_client::Entity;
use std::path::{Path, PathBuf};
use tracing::{error, info, warn};

pub struct CleanupPipeline {
    filter: InactivityFilter,
    backups: BackupWriter,
    archive_dir: PathBuf,
}

impl CleanupPipeline {
    /// `archive_dir` is where the dated ZIP is written.
    pub fn new(filter: InactivityFilter, backups: BackupWriter, archive_dir: impl Into<PathBuf>) -> Self {
        Self {
            filter,
            backups,
            archive_dir: archive_dir.into(),
        }
    }

    /// Run the whole pipeline once.
    ///
    /// Only a failure to fetch users aborts the run. Per-record and archive
    /// failures are recorded in the returned report.
    pub async fn run(&self, directory: &dyn UserDirectory, now: DateTime<Local>) -> Result<RunReport> {
        info!("Fetching all users");
        let users = directory.fetch_users().await?;
        let fetched = users.len();
        info!(users = fetched, "Fetched users");

        let selection = self.filter.select(users, now.with_timezone(&Utc));
        info!(
            eligible = selection.eligible.len(),
            threshold_days = self.filter.threshold_days(),
            "Found inactive users with no recent activity"
        );

        let mut processed = Vec::with_capacity(selection.eligible.len());
        for entity in selection.eligible {
            let outcome = self.process_record(directory, &entity).await;
            processed.push(ProcessedRecord { entity, outcome });
        }

        let archive = self.archive(&processed, now.date_naive()).await;

        Ok(RunReport {
            threshold_days: self.filter.threshold_days(),
            fetched,
            skipped: selection.skipped,
            processed,
            archive,
        })
    }

    /// Back up one user, then delete it remotely.
    ///
    /// The delete is only attempted once the backup is on disk, and a failed
    /// delete discards the backup again. If that discard fails too, the
    /// failure reason names the file left behind.
    pub async fn process_record(&self, directory: &dyn UserDirectory, entity: &Entity) -> RecordOutcome {
        let identifier = entity.identifier.as_str();
        let name = entity.display_name();

        let backup = match self.backups.write(entity).await {
            Ok(path) => path,
            Err(e) => {
                error!(identifier = %identifier, name = %name, error = %e, "Backup failed, user not deleted");
                return RecordOutcome::BackupFailed {
                    reason: e.to_string(),
                };
            }
        };
        info!(identifier = %identifier, name = %name, "Backed up user");

        match directory.delete_user(identifier).await {
            Ok(()) => {
                info!(identifier = %identifier, name = %name, "Deleted user");
                RecordOutcome::Deleted { backup }
            }
            Err(e) => {
                error!(identifier = %identifier, name = %name, error = %e, "Failed to delete user");
                let reason = match self.backups.discard(&backup).await {
                    Ok(()) => e.to_string(),
                    Err(rm) => {
                        warn!(
                            path = %backup.display(),
                            error = %rm,
                            "Could not remove backup of undeleted user"
                        );
                        format!("{}; backup left at {}", e, backup.display())
                    }
                };
                RecordOutcome::DeleteFailed { reason }
            }
        }
    }

    /// Zip the surviving backups and clear them from the backup directory.
    /// Nothing is written when no user was deleted.
    async fn archive(&self, processed: &[ProcessedRecord], date: NaiveDate) -> ArchiveStatus {
        let backups: Vec<PathBuf> = processed
            .iter()
            .filter_map(|p| p.outcome.backup_path())
            .filter(|path| path.exists())
            .map(Path::to_path_buf)
            .collect();

        if backups.is_empty() {
            info!("No users deleted, skipping archive");
            if let Err(e) = self.backups.cleanup(&[]).await {
                warn!(error = %e, "Failed to clean up backup directory");
            }
            return ArchiveStatus::Skipped;
        }

        let dest = self.archive_dir.join(archive_file_name(date));
        match create_archive(&backups, &dest) {
            Ok(summary) => {
                if let Err(e) = self.backups.cleanup(&backups).await {
                    warn!(error = %e, "Failed to clean up backup directory");
                }
                ArchiveStatus::Created(summary)
            }
            Err(e) => {
                error!(path = %dest.display(), error = %e, "Error creating backup archive");
                ArchiveStatus::Failed {
                    reason: e.to_string(),
                    backup_dir: self.backups.dir().to_path_buf(),
                }
            }
        }
    }
}
