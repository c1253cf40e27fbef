//! Governance core.
//!
//! Proposal lifecycle, vote tallying and the neuron voting-power model:
//! - Config store written only by executed `update_config` proposals
//! - One immutable ballot per principal per proposal
//! - Linear or quadratic vote weighting, token- or neuron-derived power
//! - Lazy, clock-driven expiry (no timer thread)

pub mod config_store;
pub mod engine;
pub mod error;
pub mod executor;
pub mod lifecycle;
pub mod neurons;
pub mod proposals;
pub mod tally;
pub mod types;

#[cfg(test)]
mod proptests;

pub use config_store::ConfigStore;
pub use engine::{EngineOptions, ProposalEngine};
pub use error::{GovernanceError, GovernanceResult};
pub use neurons::{NeuronLedger, NeuronParams};
pub use proposals::ProposalStore;
pub use tally::{isqrt, VoteTally};
pub use types::*;
