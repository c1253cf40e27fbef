//! Governance domain types.
//!
//! Records here mirror the service interface: proposals, votes, neurons and
//! the singleton governance config. Thresholds are basis points so tallies
//! never touch floating point.

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::fmt;

/// Seconds since the Unix epoch.
pub type Timestamp = u64;

/// Global, monotonically increasing proposal identifier.
pub type ProposalId = u64;

/// Neuron identifier, scoped to the owning principal.
pub type NeuronId = u64;

/// Basis-point denominator: 10_000 bps == 1.0.
pub const BPS_DENOMINATOR: u64 = 10_000;

/// Textual form of the anonymous principal handed out by the identity layer.
pub const ANONYMOUS_PRINCIPAL: &str = "2vxsx-fae";

/// Opaque caller identity supplied by the external identity layer.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Principal(pub String);

impl Principal {
    pub fn new(text: impl Into<String>) -> Self {
        Self(text.into())
    }

    pub fn anonymous() -> Self {
        Self(ANONYMOUS_PRINCIPAL.to_string())
    }

    pub fn is_anonymous(&self) -> bool {
        self.0 == ANONYMOUS_PRINCIPAL
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Deterministic 32-byte subaccount handle for this principal.
    pub fn subaccount(&self) -> Subaccount {
        let digest = Sha256::digest(self.0.as_bytes());
        let mut bytes = [0u8; 32];
        bytes.copy_from_slice(&digest);
        Subaccount(bytes)
    }
}

impl fmt::Display for Principal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Opaque byte handle identifying a principal's neuron account.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Subaccount(pub [u8; 32]);

impl fmt::Display for Subaccount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", hex::encode(self.0))
    }
}

/// Governance parameters.
///
/// Written only by an executed `update_config` proposal.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Config {
    /// Share of yes weight (bps) that passes a proposal.
    pub threshold_pass: u64,

    /// Share of no weight (bps) that fails a proposal.
    pub threshold_fail: u64,

    /// Total weight required before thresholds may close a proposal early.
    #[serde(default = "default_quorum")]
    pub quorum: u64,

    /// Voting window in seconds.
    pub proposal_length: u64,

    /// Minimum raw power required to submit.
    pub min_to_propose: u64,

    /// Minimum raw power required to vote.
    pub min_to_vote: u64,

    /// Weight votes by the integer square root of raw power.
    pub quadratic_voting: bool,

    /// Derive raw power from neurons instead of the token balance.
    #[serde(default)]
    pub neuron_voting: bool,
}

fn default_quorum() -> u64 {
    100
}

/// One week.
pub const DEFAULT_PROPOSAL_LENGTH_SECS: u64 = 7 * 24 * 60 * 60;

impl Default for Config {
    fn default() -> Self {
        Self {
            threshold_pass: 5_000,
            threshold_fail: 5_000,
            quorum: default_quorum(),
            proposal_length: DEFAULT_PROPOSAL_LENGTH_SECS,
            min_to_propose: 1,
            min_to_vote: 1,
            quadratic_voting: false,
            neuron_voting: false,
        }
    }
}

/// Partial config update; `None` leaves the current value untouched.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConfigPayload {
    #[serde(default)]
    pub threshold_pass: Option<u64>,
    #[serde(default)]
    pub threshold_fail: Option<u64>,
    #[serde(default)]
    pub quorum: Option<u64>,
    #[serde(default)]
    pub proposal_length: Option<u64>,
    #[serde(default)]
    pub min_to_propose: Option<u64>,
    #[serde(default)]
    pub min_to_vote: Option<u64>,
    #[serde(default)]
    pub quadratic_voting: Option<bool>,
    #[serde(default)]
    pub neuron_voting: Option<bool>,
}

impl ConfigPayload {
    /// True when no recognized field is set.
    pub fn is_empty(&self) -> bool {
        self.threshold_pass.is_none()
            && self.threshold_fail.is_none()
            && self.quorum.is_none()
            && self.proposal_length.is_none()
            && self.min_to_propose.is_none()
            && self.min_to_vote.is_none()
            && self.quadratic_voting.is_none()
            && self.neuron_voting.is_none()
    }

    /// Names of the fields this payload changes, for logs and listings.
    pub fn changed_fields(&self) -> Vec<&'static str> {
        let mut fields = Vec::new();
        if self.threshold_pass.is_some() {
            fields.push("threshold_pass");
        }
        if self.threshold_fail.is_some() {
            fields.push("threshold_fail");
        }
        if self.quorum.is_some() {
            fields.push("quorum");
        }
        if self.proposal_length.is_some() {
            fields.push("proposal_length");
        }
        if self.min_to_propose.is_some() {
            fields.push("min_to_propose");
        }
        if self.min_to_vote.is_some() {
            fields.push("min_to_vote");
        }
        if self.quadratic_voting.is_some() {
            fields.push("quadratic_voting");
        }
        if self.neuron_voting.is_some() {
            fields.push("neuron_voting");
        }
        fields
    }
}

/// Mutation a passed proposal applies.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum ProposalPayload {
    UpdateWebpage { message: String },
    UpdateConfig(ConfigPayload),
}

impl ProposalPayload {
    pub fn kind(&self) -> &'static str {
        match self {
            ProposalPayload::UpdateWebpage { .. } => "update_webpage",
            ProposalPayload::UpdateConfig(_) => "update_config",
        }
    }
}

/// Proposal lifecycle state.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum ProposalStatus {
    Open,
    Passed,
    Failed(String),
    Executed,
    Expired,
}

impl ProposalStatus {
    pub fn is_open(&self) -> bool {
        matches!(self, ProposalStatus::Open)
    }

    /// No further votes or execution are accepted.
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            ProposalStatus::Executed | ProposalStatus::Failed(_) | ProposalStatus::Expired
        )
    }
}

impl fmt::Display for ProposalStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ProposalStatus::Open => write!(f, "open"),
            ProposalStatus::Passed => write!(f, "passed"),
            ProposalStatus::Failed(reason) => write!(f, "failed ({})", reason),
            ProposalStatus::Executed => write!(f, "executed"),
            ProposalStatus::Expired => write!(f, "expired"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Proposal {
    pub status: ProposalStatus,
    pub title: String,
    pub description: String,
    pub created: Timestamp,
    pub updated: Timestamp,
    pub proposer: Principal,
    pub votes_yes: u64,
    pub votes_no: u64,
    pub payload: ProposalPayload,
}

impl Proposal {
    pub fn total_votes(&self) -> u64 {
        self.votes_yes.saturating_add(self.votes_no)
    }
}

/// A recorded ballot. `power` is the weight applied at cast time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Vote {
    pub voter: Principal,
    pub vote: bool,
    pub timestamp: Timestamp,
    pub power: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum NeuronStatus {
    Locked,
    Dissolving,
    Dissolved,
}

impl fmt::Display for NeuronStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NeuronStatus::Locked => write!(f, "locked"),
            NeuronStatus::Dissolving => write!(f, "dissolving"),
            NeuronStatus::Dissolved => write!(f, "dissolved"),
        }
    }
}

/// Commitment window. While locked, `initiated` marks when the commitment
/// was made; once dissolving it marks when dissolution started.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DissolveDelay {
    pub initiated: Timestamp,
    pub delay: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Neuron {
    pub balance: u64,
    pub status: NeuronStatus,
    pub dissolve_delay: DissolveDelay,
    pub created: Timestamp,
    pub updated: Timestamp,
}

impl Neuron {
    /// Delay still ahead of the neuron at `now`.
    pub fn remaining_delay(&self, now: Timestamp) -> u64 {
        match self.status {
            NeuronStatus::Locked => self.dissolve_delay.delay,
            NeuronStatus::Dissolving => self
                .dissolve_delay
                .initiated
                .saturating_add(self.dissolve_delay.delay)
                .saturating_sub(now),
            NeuronStatus::Dissolved => 0,
        }
    }
}

/// Per-principal aggregate returned by `my_account`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccountPayload {
    pub subaccount: Subaccount,
    pub neurons: Vec<(NeuronId, Neuron)>,
}

/// Which revision of the status state machine the engine runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StatusSchema {
    /// `passed` and `expired` are distinct, observable states.
    #[default]
    Staged,
    /// `passed` goes straight to `executed`; no-vote expiry is a failure.
    Collapsed,
}
