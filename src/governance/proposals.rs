//! Proposal store.
//!
//! Owns every proposal keyed by a monotonic id. Only the engine mutates
//! records, and only through `get_mut`.

use super::types::{Proposal, ProposalId};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ProposalStore {
    next_id: ProposalId,
    proposals: BTreeMap<ProposalId, Proposal>,
}

impl ProposalStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a proposal under the next id.
    pub fn insert(&mut self, proposal: Proposal) -> ProposalId {
        let id = self.next_id;
        self.next_id += 1;
        self.proposals.insert(id, proposal);
        id
    }

    pub fn get(&self, id: ProposalId) -> Option<&Proposal> {
        self.proposals.get(&id)
    }

    pub(crate) fn get_mut(&mut self, id: ProposalId) -> Option<&mut Proposal> {
        self.proposals.get_mut(&id)
    }

    /// All proposals in creation order.
    pub fn all(&self) -> Vec<(ProposalId, Proposal)> {
        self.proposals
            .iter()
            .map(|(id, proposal)| (*id, proposal.clone()))
            .collect()
    }

    /// Ids of proposals still open.
    pub fn open_ids(&self) -> Vec<ProposalId> {
        self.proposals
            .iter()
            .filter(|(_, proposal)| proposal.status.is_open())
            .map(|(id, _)| *id)
            .collect()
    }

    pub fn len(&self) -> usize {
        self.proposals.len()
    }

    pub fn is_empty(&self) -> bool {
        self.proposals.is_empty()
    }
}
