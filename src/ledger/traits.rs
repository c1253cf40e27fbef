//! Trait abstraction for token balance lookups.
//!
//! Enables mock implementations for unit testing.

use crate::governance::types::Principal;
use async_trait::async_trait;

/// Result type for ledger operations.
pub type LedgerResult<T> = Result<T, LedgerError>;

/// Ledger lookup errors.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum LedgerError {
    #[error("Ledger unavailable: {0}")]
    Unavailable(String),

    #[error("Ledger rejected query: {0}")]
    Rejected(String),
}

/// Read-only view of the token ledger.
#[async_trait]
pub trait TokenLedger: Send + Sync {
    /// Raw, uncommitted token balance of `owner`.
    async fn balance_of(&self, owner: &Principal) -> LedgerResult<u64>;
}
