//! Per-record outcomes and the end-of-run summary.

use crate::archive::ArchiveSummary;
use crate::filter::{FilterDecision, SkippedRecord};
use port_client::Entity;
use std::fmt;
use std::path::{Path, PathBuf};

const RULE: &str = "============================================================";

/// What happened to one eligible record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RecordOutcome {
    /// Backed up and deleted remotely
    Deleted { backup: PathBuf },
    /// Backup could not be written; the user was not deleted
    BackupFailed { reason: String },
    /// Remote delete failed; the backup was discarded
    DeleteFailed { reason: String },
}

impl RecordOutcome {
    pub fn is_deleted(&self) -> bool {
        matches!(self, Self::Deleted { .. })
    }

    /// Backup path of a deleted record.
    pub fn backup_path(&self) -> Option<&Path> {
        match self {
            Self::Deleted { backup } => Some(backup),
            _ => None,
        }
    }

    fn failure_reason(&self) -> Option<String> {
        match self {
            Self::Deleted { .. } => None,
            Self::BackupFailed { reason } => Some(format!("backup failed: {}", reason)),
            Self::DeleteFailed { reason } => Some(format!("delete failed: {}", reason)),
        }
    }
}

/// An eligible record paired with its outcome.
#[derive(Debug, Clone)]
pub struct ProcessedRecord {
    pub entity: Entity,
    pub outcome: RecordOutcome,
}

/// Result of the archive step.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ArchiveStatus {
    /// Nothing was deleted, so no archive was written
    Skipped,
    Created(ArchiveSummary),
    /// Archive could not be written; backups were left in `backup_dir`
    Failed { reason: String, backup_dir: PathBuf },
}

/// Everything a run did, for the terminal summary.
#[derive(Debug, Clone)]
pub struct RunReport {
    pub threshold_days: u32,
    pub fetched: usize,
    pub skipped: Vec<SkippedRecord>,
    pub processed: Vec<ProcessedRecord>,
    pub archive: ArchiveStatus,
}

impl RunReport {
    /// Records that were deleted.
    pub fn deleted(&self) -> impl Iterator<Item = &ProcessedRecord> {
        self.processed.iter().filter(|p| p.outcome.is_deleted())
    }

    /// Records that were eligible but not deleted.
    pub fn failed(&self) -> impl Iterator<Item = &ProcessedRecord> {
        self.processed.iter().filter(|p| !p.outcome.is_deleted())
    }

    /// Display names of deleted users, in processing order.
    pub fn deleted_names(&self) -> Vec<&str> {
        self.deleted().map(|p| p.entity.display_name()).collect()
    }

    pub fn deleted_count(&self) -> usize {
        self.deleted().count()
    }

    pub fn failed_count(&self) -> usize {
        self.failed().count()
    }

    pub fn eligible_count(&self) -> usize {
        self.processed.len()
    }

    /// Skipped records whose timestamps could not be read.
    pub fn unreadable(&self) -> impl Iterator<Item = &SkippedRecord> {
        self.skipped.iter().filter(|s| {
            matches!(
                s.decision,
                FilterDecision::UnparsableTimestamp(_) | FilterDecision::MissingTimestamp
            )
        })
    }

    pub fn archive_path(&self) -> Option<&Path> {
        match &self.archive {
            ArchiveStatus::Created(summary) => Some(&summary.path),
            _ => None,
        }
    }
}

impl fmt::Display for RunReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{}", RULE)?;
        writeln!(f, "SUMMARY")?;
        writeln!(f, "{}", RULE)?;
        writeln!(
            f,
            "Processed {} user(s): {} eligible (inactive, no activity in the last {} days), {} skipped",
            self.fetched,
            self.eligible_count(),
            self.threshold_days,
            self.skipped.len()
        )?;

        let deleted = self.deleted_names();
        if deleted.is_empty() {
            writeln!(f, "\nNo users were removed.")?;
        } else {
            writeln!(f, "\nSuccessfully removed {} user(s):", deleted.len())?;
            for name in deleted {
                writeln!(f, "  - {}", name)?;
            }
        }

        let failed: Vec<_> = self.failed().collect();
        if !failed.is_empty() {
            writeln!(f, "\nFailed to delete {} user(s):", failed.len())?;
            for record in failed {
                let reason = record.outcome.failure_reason().unwrap_or_default();
                writeln!(f, "  - {} ({})", record.entity.display_name(), reason)?;
            }
        }

        let unreadable: Vec<_> = self.unreadable().collect();
        if !unreadable.is_empty() {
            writeln!(
                f,
                "\nSkipped {} user(s) with missing or unreadable timestamps:",
                unreadable.len()
            )?;
            for record in unreadable {
                writeln!(f, "  - {}", record.entity.display_name())?;
            }
        }

        match &self.archive {
            ArchiveStatus::Skipped => {}
            ArchiveStatus::Created(summary) => {
                writeln!(f, "\nBackup archive created: {}", summary.path.display())?;
            }
            ArchiveStatus::Failed { reason, backup_dir } => {
                writeln!(f, "\nError creating backup archive: {}", reason)?;
                writeln!(f, "Backups were kept in {}", backup_dir.display())?;
            }
        }

        if self.deleted_count() > 0 {
            writeln!(
                f,
                "\nNote: entities created by deleted users remain in Port and must be cleaned up separately."
            )?;
        }

        write!(f, "{}", RULE)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn entity(identifier: &str, title: &str) -> Entity {
        serde_json::from_value(json!({"identifier": identifier, "title": title})).unwrap()
    }

    fn report(processed: Vec<ProcessedRecord>, archive: ArchiveStatus) -> RunReport {
        RunReport {
            threshold_days: 30,
            fetched: 5,
            skipped: vec![SkippedRecord {
                entity: entity("broken", "Broken Dates"),
                decision: FilterDecision::UnparsableTimestamp("soon".into()),
            }],
            processed,
            archive,
        }
    }

    #[test]
    fn test_counts_and_names() {
        let report = report(
            vec![
                ProcessedRecord {
                    entity: entity("jane", "Jane Doe"),
                    outcome: RecordOutcome::Deleted {
                        backup: PathBuf::from("user_backups/jane.json"),
                    },
                },
                ProcessedRecord {
                    entity: entity("bob", "Bob"),
                    outcome: RecordOutcome::DeleteFailed {
                        reason: "Server error (500): boom".into(),
                    },
                },
            ],
            ArchiveStatus::Skipped,
        );

        assert_eq!(report.deleted_names(), vec!["Jane Doe"]);
        assert_eq!(report.deleted_count(), 1);
        assert_eq!(report.failed_count(), 1);
        assert_eq!(report.eligible_count(), 2);
        assert_eq!(report.unreadable().count(), 1);
        assert!(report.archive_path().is_none());
    }

    #[test]
    fn test_summary_text() {
        let archive = ArchiveSummary {
            path: PathBuf::from("10-19-2026_deleted_users.zip"),
            entries: vec!["jane.json".into()],
        };
        let text = report(
            vec![
                ProcessedRecord {
                    entity: entity("jane", "Jane Doe"),
                    outcome: RecordOutcome::Deleted {
                        backup: PathBuf::from("user_backups/jane.json"),
                    },
                },
                ProcessedRecord {
                    entity: entity("bob", "Bob"),
                    outcome: RecordOutcome::BackupFailed {
                        reason: "disk full".into(),
                    },
                },
            ],
            ArchiveStatus::Created(archive),
        )
        .to_string();

        assert!(text.contains("Successfully removed 1 user(s):\n  - Jane Doe"));
        assert!(text.contains("Failed to delete 1 user(s):\n  - Bob (backup failed: disk full)"));
        assert!(text.contains("  - Broken Dates"));
        assert!(text.contains("Backup archive created: 10-19-2026_deleted_users.zip"));
        assert!(text.contains("remain in Port"));
    }

    #[test]
    fn test_summary_with_no_deletions() {
        let text = report(Vec::new(), ArchiveStatus::Skipped).to_string();

        assert!(text.contains("No users were removed."));
        assert!(!text.contains("Backup archive"));
        assert!(!text.contains("remain in Port"));
    }
}
