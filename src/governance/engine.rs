//! Proposal engine.
//!
//! Orchestrates the config store, proposal store, vote tally and neuron
//! ledger. Every operation takes the current time explicitly and first
//! resolves any proposal whose window has elapsed, so a stale proposal is
//! always settled correctly on its next access.
//!
//! Token balances are looked up by the caller before entering the engine;
//! nothing in here performs I/O.

use super::config_store::ConfigStore;
use super::error::{GovernanceError, GovernanceResult};
use super::executor::{execute_payload, ExecutionContext};
use super::lifecycle::{evaluate, Outcome};
use super::neurons::{NeuronLedger, NeuronParams};
use super::proposals::ProposalStore;
use super::tally::{vote_weight, VoteTally};
use super::types::{
    AccountPayload, Config, Neuron, NeuronId, Principal, Proposal, ProposalId, ProposalPayload,
    ProposalStatus, StatusSchema, Timestamp, Vote,
};
use crate::serialization::{from_cbor, to_cbor, SerializationError};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

/// Construction-time engine settings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct EngineOptions {
    /// State machine revision.
    pub schema: StatusSchema,

    /// Execute a proposal as soon as it passes. Always in effect under
    /// `StatusSchema::Collapsed`.
    pub auto_execute: bool,

    /// Neuron ledger parameters.
    pub neurons: NeuronParams,
}

impl Default for EngineOptions {
    fn default() -> Self {
        Self {
            schema: StatusSchema::Staged,
            auto_execute: true,
            neurons: NeuronParams::default(),
        }
    }
}

/// Governance state and the operations over it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProposalEngine {
    options: EngineOptions,
    config: ConfigStore,
    proposals: ProposalStore,
    tally: VoteTally,
    neurons: NeuronLedger,
    webpage: String,
}

impl ProposalEngine {
    /// Create an engine with the genesis config.
    pub fn new(genesis: Config, options: EngineOptions) -> GovernanceResult<Self> {
        Ok(Self {
            options,
            config: ConfigStore::new(genesis)?,
            proposals: ProposalStore::new(),
            tally: VoteTally::new(),
            neurons: NeuronLedger::new(options.neurons),
            webpage: String::new(),
        })
    }

    /// Serialize the whole engine state to CBOR.
    pub fn to_bytes(&self) -> Result<Vec<u8>, SerializationError> {
        to_cbor(self)
    }

    /// Restore an engine from CBOR bytes.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, SerializationError> {
        from_cbor(bytes)
    }

    pub fn options(&self) -> &EngineOptions {
        &self.options
    }

    pub fn config(&self) -> &Config {
        self.config.get_config()
    }

    /// Message published by the last executed `update_webpage` proposal.
    pub fn webpage(&self) -> &str {
        &self.webpage
    }

    // ------------------------------------------------------------------
    // Queries
    // ------------------------------------------------------------------

    /// Fetch a proposal, settling it first if its window has elapsed.
    pub fn proposal(&mut self, id: ProposalId, now: Timestamp) -> Option<(ProposalId, Proposal)> {
        self.resolve(id, now);
        self.proposals.get(id).map(|p| (id, p.clone()))
    }

    /// All proposals in creation order, settled against `now`.
    pub fn proposals(&mut self, now: Timestamp) -> Vec<(ProposalId, Proposal)> {
        self.sweep(now);
        self.proposals.all()
    }

    pub fn votes_for(&self, id: ProposalId) -> Vec<(ProposalId, Vote)> {
        self.tally.votes_for(id)
    }

    pub fn votes_by(&self, voter: &Principal) -> Vec<(ProposalId, Vote)> {
        self.tally.votes_by(voter)
    }

    /// Raw power the engine uses for `principal`: neuron power when
    /// `neuron_voting` is on, otherwise the token balance.
    pub fn voting_power(
        &mut self,
        principal: &Principal,
        token_balance: u64,
        now: Timestamp,
    ) -> u64 {
        if self.config().neuron_voting {
            self.neurons.voting_power(principal, now)
        } else {
            token_balance
        }
    }

    // ------------------------------------------------------------------
    // Proposal lifecycle
    // ------------------------------------------------------------------

    /// Submit a new proposal.
    pub fn submit(
        &mut self,
        proposer: &Principal,
        payload: ProposalPayload,
        title: Option<String>,
        description: Option<String>,
        token_balance: u64,
        now: Timestamp,
    ) -> GovernanceResult<(ProposalId, Proposal)> {
        ensure_authenticated(proposer)?;

        let power = self.voting_power(proposer, token_balance, now);
        let required = self.config().min_to_propose;
        if power < required {
            return Err(GovernanceError::InsufficientStake {
                available: power,
                required,
            });
        }

        if let ProposalPayload::UpdateConfig(update) = &payload {
            if update.is_empty() {
                return Err(GovernanceError::InvalidPayload(
                    "update_config payload sets no fields".to_string(),
                ));
            }
        }

        let proposal = Proposal {
            status: ProposalStatus::Open,
            title: title.unwrap_or_default(),
            description: description.unwrap_or_default(),
            created: now,
            updated: now,
            proposer: proposer.clone(),
            votes_yes: 0,
            votes_no: 0,
            payload,
        };
        let id = self.proposals.insert(proposal.clone());

        info!(
            id,
            proposer = %proposer,
            kind = proposal.payload.kind(),
            "proposal submitted"
        );
        Ok((id, proposal))
    }

    /// Cast a ballot. Returns the (possibly settled) proposal and the weight
    /// applied.
    pub fn cast_vote(
        &mut self,
        id: ProposalId,
        voter: &Principal,
        approve: bool,
        token_balance: u64,
        now: Timestamp,
    ) -> GovernanceResult<(Proposal, u64)> {
        ensure_authenticated(voter)?;

        if self.proposals.get(id).is_none() {
            return Err(GovernanceError::ProposalNotFound(id));
        }

        self.resolve(id, now);
        let status = self.status_of(id)?;
        if !status.is_open() {
            return Err(GovernanceError::AlreadyClosed { id, status });
        }

        if self.tally.has_voted(id, voter) {
            return Err(GovernanceError::AlreadyVoted {
                id,
                voter: voter.clone(),
            });
        }

        let raw = self.voting_power(voter, token_balance, now);
        let weight = vote_weight(raw, self.config())?;

        self.tally.record(
            id,
            Vote {
                voter: voter.clone(),
                vote: approve,
                timestamp: now,
                power: weight,
            },
        )?;

        let proposal = self
            .proposals
            .get_mut(id)
            .ok_or(GovernanceError::ProposalNotFound(id))?;
        if approve {
            proposal.votes_yes = proposal.votes_yes.saturating_add(weight);
        } else {
            proposal.votes_no = proposal.votes_no.saturating_add(weight);
        }
        proposal.updated = now;

        info!(
            id,
            voter = %voter,
            approve,
            weight,
            votes_yes = proposal.votes_yes,
            votes_no = proposal.votes_no,
            "vote recorded"
        );

        self.resolve(id, now);
        let proposal = self
            .proposals
            .get(id)
            .cloned()
            .ok_or(GovernanceError::ProposalNotFound(id))?;
        Ok((proposal, weight))
    }

    /// Apply the payload of a passed proposal.
    ///
    /// Idempotent on an already executed proposal. A payload that cannot be
    /// applied moves the proposal to `failed` and leaves the config as it
    /// was; the updated proposal is still returned.
    pub fn execute(&mut self, id: ProposalId, now: Timestamp) -> GovernanceResult<Proposal> {
        self.resolve(id, now);
        let status = self.status_of(id)?;

        match status {
            ProposalStatus::Executed => {
                debug!(id, "proposal already executed");
            }
            ProposalStatus::Passed => self.execute_passed(id, now),
            status => return Err(GovernanceError::NotExecutable { id, status }),
        }

        self.proposals
            .get(id)
            .cloned()
            .ok_or(GovernanceError::ProposalNotFound(id))
    }

    /// Settle every open proposal against `now` and advance elapsed neurons.
    ///
    /// Returns the ids of proposals whose status changed.
    pub fn sweep(&mut self, now: Timestamp) -> Vec<ProposalId> {
        self.neurons.refresh(now);
        self.proposals
            .open_ids()
            .into_iter()
            .filter(|id| self.resolve(*id, now))
            .collect()
    }

    /// Move proposal `id` out of `open` if its outcome is decided.
    ///
    /// Returns true when the status changed.
    fn resolve(&mut self, id: ProposalId, now: Timestamp) -> bool {
        let schema = self.options.schema;
        let outcome = match self.proposals.get(id) {
            Some(proposal) => evaluate(proposal, self.config.get_config(), schema, now),
            None => None,
        };
        let Some(outcome) = outcome else {
            return false;
        };

        let Some(proposal) = self.proposals.get_mut(id) else {
            return false;
        };
        proposal.updated = now;

        match outcome {
            Outcome::Passed => {
                proposal.status = ProposalStatus::Passed;
                info!(id, "proposal passed");
                if self.executes_on_pass() {
                    self.execute_passed(id, now);
                }
            }
            Outcome::Failed(reason) => {
                info!(id, reason = %reason, "proposal failed");
                proposal.status = ProposalStatus::Failed(reason);
            }
            Outcome::Expired => {
                info!(id, "proposal expired");
                proposal.status = ProposalStatus::Expired;
            }
        }
        true
    }

    fn executes_on_pass(&self) -> bool {
        self.options.auto_execute || self.options.schema == StatusSchema::Collapsed
    }

    /// Run the payload of a proposal known to be `passed`.
    fn execute_passed(&mut self, id: ProposalId, now: Timestamp) {
        let Some(payload) = self.proposals.get(id).map(|p| p.payload.clone()) else {
            return;
        };

        let mut ctx = ExecutionContext {
            config: &mut self.config,
            webpage: &mut self.webpage,
        };
        let result = execute_payload(&mut ctx, &payload);

        if let Some(proposal) = self.proposals.get_mut(id) {
            proposal.updated = now;
            match result {
                Ok(()) => {
                    proposal.status = ProposalStatus::Executed;
                    info!(id, kind = payload.kind(), "proposal executed");
                }
                Err(e) => {
                    warn!(id, error = %e, "proposal execution failed");
                    proposal.status = ProposalStatus::Failed(e.to_string());
                }
            }
        }
    }

    fn status_of(&self, id: ProposalId) -> GovernanceResult<ProposalStatus> {
        self.proposals
            .get(id)
            .map(|p| p.status.clone())
            .ok_or(GovernanceError::ProposalNotFound(id))
    }

    // ------------------------------------------------------------------
    // Neurons
    // ------------------------------------------------------------------

    pub fn neuron_create(
        &mut self,
        owner: &Principal,
        balance: u64,
        delay: i64,
        token_balance: u64,
        now: Timestamp,
    ) -> GovernanceResult<(NeuronId, Neuron)> {
        ensure_authenticated(owner)?;
        self.neurons.create(owner, balance, delay, token_balance, now)
    }

    pub fn neuron_dissolve(
        &mut self,
        owner: &Principal,
        id: NeuronId,
        now: Timestamp,
    ) -> GovernanceResult<(NeuronId, Neuron)> {
        ensure_authenticated(owner)?;
        self.neurons.dissolve(owner, id, now)
    }

    pub fn neuron_relock(
        &mut self,
        owner: &Principal,
        id: NeuronId,
        delay: i64,
        now: Timestamp,
    ) -> GovernanceResult<(NeuronId, Neuron)> {
        ensure_authenticated(owner)?;
        self.neurons.relock(owner, id, delay, now)
    }

    pub fn account(
        &mut self,
        owner: &Principal,
        now: Timestamp,
    ) -> GovernanceResult<AccountPayload> {
        ensure_authenticated(owner)?;
        Ok(self.neurons.account(owner, now))
    }
}

fn ensure_authenticated(principal: &Principal) -> GovernanceResult<()> {
    if principal.is_anonymous() {
        return Err(GovernanceError::Unauthorized(
            "anonymous principal cannot perform this call".to_string(),
        ));
    }
    Ok(())
}
