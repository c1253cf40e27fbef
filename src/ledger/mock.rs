//! In-memory token ledger.
//!
//! Used by tests and by the operator CLI, which seeds balances from the
//! `[ledger.balances]` table of its config file.

use super::traits::*;
use crate::governance::types::Principal;
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};

/// In-memory ledger; unknown principals hold zero tokens.
#[derive(Clone, Default)]
pub struct InMemoryTokenLedger {
    state: Arc<Mutex<MockState>>,
}

#[derive(Default)]
struct MockState {
    balances: HashMap<Principal, u64>,
    unavailable: bool,
}

impl InMemoryTokenLedger {
    /// Create an empty ledger.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a ledger pre-seeded with balances.
    pub fn with_balances<I>(balances: I) -> Self
    where
        I: IntoIterator<Item = (Principal, u64)>,
    {
        let ledger = Self::new();
        for (owner, amount) in balances {
            ledger.set_balance(owner, amount);
        }
        ledger
    }

    /// Set a balance (for test setup).
    pub fn set_balance(&self, owner: Principal, amount: u64) {
        let mut s = self.state.lock().unwrap_or_else(|e| e.into_inner());
        s.balances.insert(owner, amount);
    }

    /// Make every lookup fail, to exercise error paths.
    pub fn set_unavailable(&self, unavailable: bool) {
        let mut s = self.state.lock().unwrap_or_else(|e| e.into_inner());
        s.unavailable = unavailable;
    }
}

#[async_trait]
impl TokenLedger for InMemoryTokenLedger {
    async fn balance_of(&self, owner: &Principal) -> LedgerResult<u64> {
        let state = self.state.lock().unwrap_or_else(|e| e.into_inner());
        if state.unavailable {
            return Err(LedgerError::Unavailable("ledger offline".to_string()));
        }
        Ok(state.balances.get(owner).copied().unwrap_or(0))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_unknown_principal_has_zero() {
        let ledger = InMemoryTokenLedger::new();
        assert_eq!(ledger.balance_of(&Principal::new("nobody")).await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_seeded_balances() {
        let ledger = InMemoryTokenLedger::with_balances([
            (Principal::new("alice"), 100),
            (Principal::new("bob"), 7),
        ]);
        assert_eq!(ledger.balance_of(&Principal::new("alice")).await.unwrap(), 100);

        ledger.set_balance(Principal::new("bob"), 9);
        assert_eq!(ledger.balance_of(&Principal::new("bob")).await.unwrap(), 9);
    }

    #[tokio::test]
    async fn test_unavailable_ledger() {
        let ledger = InMemoryTokenLedger::new();
        ledger.set_unavailable(true);
        assert!(matches!(
            ledger.balance_of(&Principal::new("alice")).await,
            Err(LedgerError::Unavailable(_))
        ));
    }
}
