//! Error taxonomy for repository operations.
//!
//! Invariant violations come back as values so callers can render
//! field-level messages; only storage faults bubble through untyped.

use thiserror::Error;

use crate::calendar::CalendarError;

#[derive(Debug, Error)]
pub enum RepositoryError {
    /// Feed bill numbers are farm-wide unique receipts; the collision is
    /// checked against the global feed collection, not per flock.
    #[error("bill number '{0}' is already used by another feed purchase")]
    DuplicateBillNumber(String),

    /// Recorded deaths for a flock can never exceed its initial stock.
    #[error("recording {requested} deaths exceeds the {remaining} birds remaining in the flock")]
    MortalityExceedsStock { requested: u32, remaining: u32 },

    #[error("no flock with id '{0}'")]
    UnknownFlock(String),

    #[error("invalid record: {0}")]
    InvalidRecord(String),

    /// Backup/restore payload did not parse; nothing was mutated.
    #[error("snapshot payload could not be parsed: {0}")]
    SnapshotParse(#[from] serde_json::Error),

    #[error(transparent)]
    Calendar(#[from] CalendarError),

    #[error(transparent)]
    Storage(#[from] anyhow::Error),
}
