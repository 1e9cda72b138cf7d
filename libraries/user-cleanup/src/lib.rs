//! User Cleanup
//!
//! Finds inactive Port users, backs each one up to a JSON file, deletes it
//! remotely and bundles the backups of deleted users into a dated ZIP.
//!
//! # Pipeline
//!
//! 1. **Fetch**: all records from a [`UserDirectory`]
//! 2. **Filter**: inactive status and no activity within the threshold
//! 3. **Backup, then delete**: per record; a failed delete discards the backup
//! 4. **Archive**: `MM-DD-YYYY_deleted_users.zip`, skipped when nothing was deleted
//! 5. **Report**: a [`RunReport`] that renders the terminal summary
//!
//! # Example
//!
//! ```ignore
//! use user_cleanup::{BackupWriter, CleanupPipeline, InactivityFilter};
//!
//! let pipeline = CleanupPipeline::new(InactivityFilter::new(30), BackupWriter::default(), ".");
//! let users = port.entities(port_client::USER_BLUEPRINT).await?;
//! let report = pipeline.run(&users, chrono::Local::now()).await?;
//! println!("{}", report);
//! ```

pub mod archive;
pub mod backup;
pub mod directory;
pub mod error;
pub mod filter;
pub mod pipeline;
pub mod report;

// Re-export commonly used types
pub use archive::{archive_file_name, create_archive, ArchiveSummary};
pub use backup::{backup_file_name, BackupWriter, DEFAULT_BACKUP_DIR};
pub use directory::UserDirectory;
pub use error::{CleanupError, Result};
pub use filter::{
    FilterDecision, InactivityFilter, Selection, SkippedRecord, DEFAULT_THRESHOLD_DAYS,
    INACTIVE_STATUSES,
};
pub use pipeline::CleanupPipeline;
pub use report::{ArchiveStatus, ProcessedRecord, RecordOutcome, RunReport};
