//! Vote tally.
//!
//! Records at most one ballot per (proposal, voter) and keeps two insertion
//! ordered projections: by proposal and by voter. Ballots are immutable once
//! recorded.

use super::error::{GovernanceError, GovernanceResult};
use super::types::{Config, Principal, ProposalId, Vote};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashSet};

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct VoteTally {
    /// Ballots in the order they were cast.
    ballots: Vec<(ProposalId, Vote)>,

    /// Proposal id -> indices into `ballots`.
    by_proposal: BTreeMap<ProposalId, Vec<usize>>,

    /// Voter -> indices into `ballots`.
    by_voter: BTreeMap<Principal, Vec<usize>>,

    /// Deduplication set.
    cast: HashSet<(ProposalId, Principal)>,
}

impl VoteTally {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn has_voted(&self, id: ProposalId, voter: &Principal) -> bool {
        self.cast.contains(&(id, voter.clone()))
    }

    /// Record a ballot. A second ballot from the same voter is rejected and
    /// leaves the tally untouched.
    pub fn record(&mut self, id: ProposalId, vote: Vote) -> GovernanceResult<()> {
        let key = (id, vote.voter.clone());
        if self.cast.contains(&key) {
            return Err(GovernanceError::AlreadyVoted {
                id,
                voter: vote.voter,
            });
        }

        let index = self.ballots.len();
        self.by_proposal.entry(id).or_default().push(index);
        self.by_voter
            .entry(vote.voter.clone())
            .or_default()
            .push(index);
        self.cast.insert(key);
        self.ballots.push((id, vote));
        Ok(())
    }

    /// Ballots on proposal `id`, in cast order.
    pub fn votes_for(&self, id: ProposalId) -> Vec<(ProposalId, Vote)> {
        self.project(self.by_proposal.get(&id))
    }

    /// Ballots cast by `voter`, in cast order, keyed by proposal id.
    pub fn votes_by(&self, voter: &Principal) -> Vec<(ProposalId, Vote)> {
        self.project(self.by_voter.get(voter))
    }

    pub fn len(&self) -> usize {
        self.ballots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ballots.is_empty()
    }

    fn project(&self, indices: Option<&Vec<usize>>) -> Vec<(ProposalId, Vote)> {
        indices
            .map(|indices| {
                indices
                    .iter()
                    .filter_map(|&i| self.ballots.get(i).cloned())
                    .collect()
            })
            .unwrap_or_default()
    }
}

/// Weight a ballot carries, given the voter's raw power.
///
/// Fails with `InsufficientStake` below `min_to_vote`.
pub fn vote_weight(raw_power: u64, config: &Config) -> GovernanceResult<u64> {
    if raw_power < config.min_to_vote {
        return Err(GovernanceError::InsufficientStake {
            available: raw_power,
            required: config.min_to_vote,
        });
    }

    if config.quadratic_voting {
        Ok(isqrt(raw_power))
    } else {
        Ok(raw_power)
    }
}

/// `floor(sqrt(n))` by Newton iteration on integers.
pub fn isqrt(n: u64) -> u64 {
    if n < 2 {
        return n;
    }

    let n = n as u128;
    let mut x = n;
    let mut y = (x + 1) / 2;
    while y < x {
        x = y;
        y = (x + n / x) / 2;
    }
    x as u64
}
