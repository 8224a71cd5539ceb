use std::fmt::{Display, Formatter, Result};

/// Terminal result of one sync invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SyncOutcome {
    /// One product was created and the successor offset was published.
    Advanced { offset: u64, product_id: String },
    /// The offset is past the end of the catalog; no successor published.
    Complete { offset: u64 },
}

impl Display for SyncOutcome {
    fn fmt(&self, f: &mut Formatter<'_>) -> Result {
        match self {
            SyncOutcome::Advanced { offset, .. } => write!(f, "advanced past offset {}", offset),
            SyncOutcome::Complete { offset } => write!(f, "catalog complete at offset {}", offset),
        }
    }
}
