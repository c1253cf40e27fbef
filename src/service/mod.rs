//! Service boundary.
//!
//! `DaoService` is the RPC surface of the governance engine. Each call:
//! 1. resolves external inputs (token balance) through the [`TokenLedger`],
//! 2. reads the wall clock once,
//! 3. runs the engine operation under the single writer lock,
//! 4. converts typed errors into `Err(String)` for the caller.
//!
//! No lock is held across an `.await`. Queries that may settle an elapsed
//! proposal take the writer lock too, so every reader sees a fully applied
//! tally.

pub mod clock;

pub use clock::{Clock, ManualClock, SystemClock};

use crate::governance::{
    AccountPayload, Config, GovernanceError, Neuron, NeuronId, Principal, Proposal,
    ProposalEngine, ProposalId, ProposalPayload, Vote,
};
use crate::ledger::TokenLedger;
use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};
use tracing::debug;

/// Result shape returned across the service boundary.
pub type ServiceResult<T> = Result<T, String>;

pub struct DaoService<L: TokenLedger, C: Clock> {
    engine: Arc<RwLock<ProposalEngine>>,
    ledger: L,
    clock: C,
}

impl<L: TokenLedger + Clone, C: Clock + Clone> Clone for DaoService<L, C> {
    fn clone(&self) -> Self {
        Self {
            engine: Arc::clone(&self.engine),
            ledger: self.ledger.clone(),
            clock: self.clock.clone(),
        }
    }
}

impl<L: TokenLedger, C: Clock> DaoService<L, C> {
    pub fn new(engine: ProposalEngine, ledger: L, clock: C) -> Self {
        Self {
            engine: Arc::new(RwLock::new(engine)),
            ledger,
            clock,
        }
    }

    fn read(&self) -> RwLockReadGuard<'_, ProposalEngine> {
        self.engine.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, ProposalEngine> {
        self.engine.write().unwrap_or_else(PoisonError::into_inner)
    }

    async fn token_balance(&self, owner: &Principal) -> Result<u64, GovernanceError> {
        Ok(self.ledger.balance_of(owner).await?)
    }

    /// CBOR snapshot of the current engine state.
    pub fn snapshot(&self) -> ServiceResult<Vec<u8>> {
        self.read().to_bytes().map_err(|e| e.to_string())
    }

    // ------------------------------------------------------------------
    // Queries
    // ------------------------------------------------------------------

    pub fn get_config(&self) -> Config {
        self.read().config().clone()
    }

    pub fn get_all_proposals(&self) -> Vec<(ProposalId, Proposal)> {
        let now = self.clock.now();
        self.write().proposals(now)
    }

    pub fn get_proposal(&self, id: ProposalId) -> Option<(ProposalId, Proposal)> {
        let now = self.clock.now();
        self.write().proposal(id, now)
    }

    pub fn get_votes_from_proposal_id(&self, id: ProposalId) -> Vec<(ProposalId, Vote)> {
        self.read().votes_for(id)
    }

    pub fn get_votes_from_principal(&self, voter: &Principal) -> Vec<(ProposalId, Vote)> {
        self.read().votes_by(voter)
    }

    /// Message published by the last executed webpage proposal.
    pub fn get_webpage(&self) -> String {
        self.read().webpage().to_string()
    }

    pub async fn get_token_balance(&self, owner: &Principal) -> ServiceResult<u64> {
        self.token_balance(owner).await.map_err(|e| e.to_string())
    }

    /// Raw power the engine would use for `owner` right now.
    pub async fn get_voting_power(&self, owner: &Principal) -> ServiceResult<u64> {
        let balance = self.token_balance(owner).await.map_err(|e| e.to_string())?;
        let now = self.clock.now();
        Ok(self.write().voting_power(owner, balance, now))
    }

    // ------------------------------------------------------------------
    // Updates
    // ------------------------------------------------------------------

    pub async fn submit_proposal(
        &self,
        caller: &Principal,
        payload: ProposalPayload,
        title: Option<String>,
        description: Option<String>,
    ) -> ServiceResult<(ProposalId, Proposal)> {
        let result = async {
            let balance = self.token_balance(caller).await?;
            let now = self.clock.now();
            self.write()
                .submit(caller, payload, title, description, balance, now)
        }
        .await;

        result.map_err(|e| rejected("submit_proposal", caller, e))
    }

    /// Cast a ballot. The third element of the result is the applied weight.
    pub async fn vote(
        &self,
        caller: &Principal,
        id: ProposalId,
        approve: bool,
    ) -> ServiceResult<(ProposalId, Proposal, String)> {
        let result = async {
            let balance = self.token_balance(caller).await?;
            let now = self.clock.now();
            self.write().cast_vote(id, caller, approve, balance, now)
        }
        .await;

        result
            .map(|(proposal, weight)| (id, proposal, weight.to_string()))
            .map_err(|e| rejected("vote", caller, e))
    }

    /// Explicitly execute a proposal held in `passed`.
    pub fn execute_proposal(&self, id: ProposalId) -> ServiceResult<(ProposalId, Proposal)> {
        let now = self.clock.now();
        self.write()
            .execute(id, now)
            .map(|proposal| (id, proposal))
            .map_err(|e| e.to_string())
    }

    /// Periodic trigger: settle every elapsed proposal.
    pub fn sweep(&self) -> Vec<ProposalId> {
        let now = self.clock.now();
        self.write().sweep(now)
    }

    pub async fn neuron_create(
        &self,
        caller: &Principal,
        balance: u64,
        delay: i64,
    ) -> ServiceResult<(NeuronId, Neuron)> {
        let result = async {
            let token_balance = self.token_balance(caller).await?;
            let now = self.clock.now();
            self.write()
                .neuron_create(caller, balance, delay, token_balance, now)
        }
        .await;

        result.map_err(|e| rejected("neuron_create", caller, e))
    }

    pub fn neuron_dissolve(
        &self,
        caller: &Principal,
        id: NeuronId,
    ) -> ServiceResult<(NeuronId, Neuron)> {
        let now = self.clock.now();
        self.write()
            .neuron_dissolve(caller, id, now)
            .map_err(|e| rejected("neuron_dissolve", caller, e))
    }

    pub fn neuron_relock(
        &self,
        caller: &Principal,
        id: NeuronId,
        delay: i64,
    ) -> ServiceResult<(NeuronId, Neuron)> {
        let now = self.clock.now();
        self.write()
            .neuron_relock(caller, id, delay, now)
            .map_err(|e| rejected("neuron_relock", caller, e))
    }

    pub fn my_account(&self, caller: &Principal) -> ServiceResult<(Principal, AccountPayload)> {
        let now = self.clock.now();
        self.write()
            .account(caller, now)
            .map(|account| (caller.clone(), account))
            .map_err(|e| rejected("my_account", caller, e))
    }
}

fn rejected(call: &str, caller: &Principal, error: GovernanceError) -> String {
    debug!(call, caller = %caller, error = %error, "call rejected");
    error.to_string()
}
