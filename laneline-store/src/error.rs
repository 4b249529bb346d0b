use thiserror::Error;

/// Domain conflicts surfaced by conditional writes. These are the outcomes
/// the storage layer re-validates atomically, regardless of what the
/// handler's advisory pre-checks saw.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConflictKind {
    SlotFull,
    SlotMissing,
    PackageSpent,
    DuplicateBooking,
}

impl std::fmt::Display for ConflictKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let msg = match self {
            ConflictKind::SlotFull => "This time slot is full",
            ConflictKind::SlotMissing => "Invalid time slot",
            ConflictKind::PackageSpent => "No remaining lessons in this package",
            ConflictKind::DuplicateBooking => {
                "This student is already booked for this time slot"
            }
        };
        f.write_str(msg)
    }
}

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("{0}")]
    Conflict(ConflictKind),

    #[error("corrupt row: {0}")]
    Corrupt(String),
}

impl StoreError {
    pub fn conflict(&self) -> Option<ConflictKind> {
        match self {
            StoreError::Conflict(kind) => Some(*kind),
            _ => None,
        }
    }
}
