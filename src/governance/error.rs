//! Governance error taxonomy.
//!
//! Every variant is recoverable: the service boundary turns them into
//! `Err(String)` for the caller and the engine keeps running.

use super::types::{NeuronId, Principal, ProposalId, ProposalStatus};
use crate::ledger::LedgerError;

/// Result type for governance operations.
pub type GovernanceResult<T> = Result<T, GovernanceError>;

/// Governance errors.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum GovernanceError {
    #[error("Proposal not found: {0}")]
    ProposalNotFound(ProposalId),

    #[error("Neuron not found: {id} (owner {owner})")]
    NeuronNotFound { owner: Principal, id: NeuronId },

    #[error("{voter} already voted on proposal {id}")]
    AlreadyVoted { id: ProposalId, voter: Principal },

    #[error("Proposal {id} is closed ({status})")]
    AlreadyClosed { id: ProposalId, status: ProposalStatus },

    #[error("Insufficient stake: {available} available, {required} required")]
    InsufficientStake { available: u64, required: u64 },

    #[error("Invalid payload: {0}")]
    InvalidPayload(String),

    #[error("Config validation failed: {0}")]
    ConfigValidationFailed(String),

    #[error("Proposal {id} cannot be executed while {status}")]
    NotExecutable { id: ProposalId, status: ProposalStatus },

    #[error("Neuron {0} is already dissolved")]
    NeuronDissolved(NeuronId),

    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    #[error("Ledger error: {0}")]
    Ledger(#[from] LedgerError),
}

impl GovernanceError {
    /// True for the `NotFound` family (unknown proposal or neuron).
    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            GovernanceError::ProposalNotFound(_) | GovernanceError::NeuronNotFound { .. }
        )
    }
}
