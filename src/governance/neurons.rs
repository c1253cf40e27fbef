//! Neuron ledger.
//!
//! Neurons lock stake behind a dissolve delay and yield voting power in
//! return. Power is `balance * (1 + remaining / max_delay)`, so a neuron
//! committed for the full `max_dissolve_delay` or longer votes with twice its
//! balance. Dissolving neurons decay linearly to 1x and then to zero once the
//! delay has fully elapsed.

use super::error::{GovernanceError, GovernanceResult};
use super::types::{
    AccountPayload, DissolveDelay, Neuron, NeuronId, NeuronStatus, Principal, Timestamp,
};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use tracing::{debug, info};

/// Eight years, in seconds.
pub const DEFAULT_MAX_DISSOLVE_DELAY_SECS: u64 = 8 * 365 * 24 * 60 * 60;

/// Neuron ledger parameters, fixed at construction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct NeuronParams {
    /// Smallest balance a new neuron may lock (no floor when `None`).
    pub min_neuron_stake: Option<u64>,

    /// Delay at which the power multiplier saturates at 2x.
    pub max_dissolve_delay: u64,
}

impl Default for NeuronParams {
    fn default() -> Self {
        Self {
            min_neuron_stake: None,
            max_dissolve_delay: DEFAULT_MAX_DISSOLVE_DELAY_SECS,
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
struct Account {
    next_id: NeuronId,
    neurons: BTreeMap<NeuronId, Neuron>,
}

impl Account {
    /// Stake still committed in neurons that have not dissolved.
    fn committed_stake(&self) -> u64 {
        self.neurons
            .values()
            .filter(|n| n.status != NeuronStatus::Dissolved)
            .fold(0u64, |acc, n| acc.saturating_add(n.balance))
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct NeuronLedger {
    params: NeuronParams,
    accounts: BTreeMap<Principal, Account>,
}

impl NeuronLedger {
    pub fn new(params: NeuronParams) -> Self {
        Self {
            params,
            accounts: BTreeMap::new(),
        }
    }

    pub fn params(&self) -> &NeuronParams {
        &self.params
    }

    /// Lock `balance` behind a dissolve delay of `delay` seconds.
    ///
    /// `token_balance` is the caller's raw balance as reported by the token
    /// ledger; stake already committed in live neurons counts against it.
    pub fn create(
        &mut self,
        owner: &Principal,
        balance: u64,
        delay: i64,
        token_balance: u64,
        now: Timestamp,
    ) -> GovernanceResult<(NeuronId, Neuron)> {
        if delay < 0 {
            return Err(GovernanceError::InvalidPayload(format!(
                "dissolve delay must not be negative (got {})",
                delay
            )));
        }

        if let Some(floor) = self.params.min_neuron_stake {
            if balance < floor {
                return Err(GovernanceError::InsufficientStake {
                    available: balance,
                    required: floor,
                });
            }
        }

        self.refresh_account(owner, now);
        let committed = self
            .accounts
            .get(owner)
            .map(Account::committed_stake)
            .unwrap_or(0);
        let required = committed.saturating_add(balance);
        if required > token_balance {
            return Err(GovernanceError::InsufficientStake {
                available: token_balance.saturating_sub(committed),
                required: balance,
            });
        }

        let account = self.accounts.entry(owner.clone()).or_default();
        let id = account.next_id;
        account.next_id += 1;

        let neuron = Neuron {
            balance,
            status: NeuronStatus::Locked,
            dissolve_delay: DissolveDelay {
                initiated: now,
                delay: delay as u64,
            },
            created: now,
            updated: now,
        };
        account.neurons.insert(id, neuron.clone());

        info!(owner = %owner, neuron = id, balance, delay, "neuron created");
        Ok((id, neuron))
    }

    /// Start dissolving a locked neuron. Already-dissolving neurons are
    /// returned unchanged.
    pub fn dissolve(
        &mut self,
        owner: &Principal,
        id: NeuronId,
        now: Timestamp,
    ) -> GovernanceResult<(NeuronId, Neuron)> {
        let neuron = self.neuron_mut(owner, id, now)?;

        match neuron.status {
            NeuronStatus::Locked => {
                neuron.status = NeuronStatus::Dissolving;
                neuron.dissolve_delay.initiated = now;
                neuron.updated = now;
                info!(owner = %owner, neuron = id, "neuron dissolving");
            }
            NeuronStatus::Dissolving => {
                debug!(owner = %owner, neuron = id, "neuron already dissolving");
            }
            NeuronStatus::Dissolved => return Err(GovernanceError::NeuronDissolved(id)),
        }

        Ok((id, neuron.clone()))
    }

    /// Re-lock a dissolving neuron under a fresh commitment window at least
    /// as long as the delay it still has to run.
    pub fn relock(
        &mut self,
        owner: &Principal,
        id: NeuronId,
        delay: i64,
        now: Timestamp,
    ) -> GovernanceResult<(NeuronId, Neuron)> {
        if delay < 0 {
            return Err(GovernanceError::InvalidPayload(format!(
                "dissolve delay must not be negative (got {})",
                delay
            )));
        }

        let neuron = self.neuron_mut(owner, id, now)?;
        match neuron.status {
            NeuronStatus::Dissolved => return Err(GovernanceError::NeuronDissolved(id)),
            NeuronStatus::Locked => {
                return Err(GovernanceError::InvalidPayload(format!(
                    "neuron {} is locked; only a dissolving neuron can be re-locked",
                    id
                )))
            }
            NeuronStatus::Dissolving => {}
        }

        // The new window may not end before the running one.
        let remaining = neuron.remaining_delay(now);
        if (delay as u64) < remaining {
            return Err(GovernanceError::InvalidPayload(format!(
                "dissolve delay {} is shorter than the remaining {}",
                delay, remaining
            )));
        }

        neuron.status = NeuronStatus::Locked;
        neuron.dissolve_delay = DissolveDelay {
            initiated: now,
            delay: delay as u64,
        };
        neuron.updated = now;

        info!(owner = %owner, neuron = id, delay, "neuron re-locked");
        Ok((id, neuron.clone()))
    }

    /// Total neuron-derived voting power of `owner` at `now`.
    pub fn voting_power(&mut self, owner: &Principal, now: Timestamp) -> u64 {
        self.refresh_account(owner, now);
        self.accounts
            .get(owner)
            .map(|account| {
                account.neurons.values().fold(0u64, |acc, neuron| {
                    acc.saturating_add(neuron_power(neuron, now, self.params.max_dissolve_delay))
                })
            })
            .unwrap_or(0)
    }

    /// Account view for `owner`; an account with no neurons is still valid.
    pub fn account(&mut self, owner: &Principal, now: Timestamp) -> AccountPayload {
        self.refresh_account(owner, now);
        let neurons = self
            .accounts
            .get(owner)
            .map(|account| {
                account
                    .neurons
                    .iter()
                    .map(|(id, neuron)| (*id, neuron.clone()))
                    .collect()
            })
            .unwrap_or_default();

        AccountPayload {
            subaccount: owner.subaccount(),
            neurons,
        }
    }

    /// Advance every fully elapsed dissolving neuron to `Dissolved`.
    ///
    /// Returns how many neurons changed state.
    pub fn refresh(&mut self, now: Timestamp) -> usize {
        let owners: Vec<Principal> = self.accounts.keys().cloned().collect();
        owners
            .iter()
            .map(|owner| self.refresh_account(owner, now))
            .sum()
    }

    fn refresh_account(&mut self, owner: &Principal, now: Timestamp) -> usize {
        let Some(account) = self.accounts.get_mut(owner) else {
            return 0;
        };

        let mut changed = 0;
        for (id, neuron) in account.neurons.iter_mut() {
            if neuron.status == NeuronStatus::Dissolving && neuron.remaining_delay(now) == 0 {
                neuron.status = NeuronStatus::Dissolved;
                neuron.updated = now;
                changed += 1;
                info!(owner = %owner, neuron = *id, "neuron dissolved");
            }
        }
        changed
    }

    fn neuron_mut(
        &mut self,
        owner: &Principal,
        id: NeuronId,
        now: Timestamp,
    ) -> GovernanceResult<&mut Neuron> {
        self.refresh_account(owner, now);
        self.accounts
            .get_mut(owner)
            .and_then(|account| account.neurons.get_mut(&id))
            .ok_or_else(|| GovernanceError::NeuronNotFound {
                owner: owner.clone(),
                id,
            })
    }
}

/// Voting power of a single neuron at `now`.
///
/// Integer arithmetic only: `balance * (max + min(remaining, max)) / max`.
pub fn neuron_power(neuron: &Neuron, now: Timestamp, max_dissolve_delay: u64) -> u64 {
    if neuron.status == NeuronStatus::Dissolved {
        return 0;
    }

    let remaining = neuron.remaining_delay(now);
    if neuron.status == NeuronStatus::Dissolving && remaining == 0 {
        return 0;
    }

    if max_dissolve_delay == 0 {
        return neuron.balance;
    }

    let max = max_dissolve_delay as u128;
    let capped = (remaining as u128).min(max);
    let power = (neuron.balance as u128) * (max + capped) / max;
    u64::try_from(power).unwrap_or(u64::MAX)
}
