//! Token ledger integration.
//!
//! The governance core never talks to the token ledger itself. The service
//! boundary looks balances up through [`TokenLedger`] and hands the numbers
//! to the engine.

pub mod mock;
pub mod traits;

pub use mock::InMemoryTokenLedger;
pub use traits::{LedgerError, LedgerResult, TokenLedger};
