//! Proposal status evaluation.
//!
//! Pure decision logic: given a proposal, the current config and the wall
//! clock, decide whether an open proposal should leave `open`. The engine
//! applies the outcome.
//!
//! Rules, with `total = yes + no`:
//! - no votes: stays open until `proposal_length` elapses, then expires
//!   (`Staged`) or fails with "no votes" (`Collapsed`);
//! - before expiry and once `total >= quorum`: yes share at or above
//!   `threshold_pass` passes, no share at or above `threshold_fail` fails;
//!   when both hold the leading side wins and an exact tie fails;
//! - at expiry: the leading side wins and an exact tie fails.

use super::types::{Config, Proposal, StatusSchema, Timestamp, BPS_DENOMINATOR};

pub const REASON_NO_VOTES: &str = "no votes";
pub const REASON_THRESHOLD_FAIL: &str = "threshold_fail reached";
pub const REASON_REJECTED_AT_EXPIRY: &str = "rejected at expiry";
pub const REASON_TIED: &str = "tied";

/// Where an open proposal goes next.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    Passed,
    Failed(String),
    Expired,
}

/// Whether the voting window of `proposal` has closed at `now`.
pub fn is_elapsed(proposal: &Proposal, config: &Config, now: Timestamp) -> bool {
    now.saturating_sub(proposal.created) >= config.proposal_length
}

/// Decide the next status of an open proposal, or `None` to stay open.
pub fn evaluate(
    proposal: &Proposal,
    config: &Config,
    schema: StatusSchema,
    now: Timestamp,
) -> Option<Outcome> {
    if !proposal.status.is_open() {
        return None;
    }

    let yes = proposal.votes_yes;
    let no = proposal.votes_no;
    let total = proposal.total_votes();
    let elapsed = is_elapsed(proposal, config, now);

    if total == 0 {
        if !elapsed {
            return None;
        }
        return Some(match schema {
            StatusSchema::Staged => Outcome::Expired,
            StatusSchema::Collapsed => Outcome::Failed(REASON_NO_VOTES.to_string()),
        });
    }

    if elapsed {
        return Some(resolve_by_leader(yes, no, REASON_REJECTED_AT_EXPIRY));
    }

    if total < config.quorum {
        return None;
    }

    let yes_reached = share_reached(yes, total, config.threshold_pass);
    let no_reached = share_reached(no, total, config.threshold_fail);

    match (yes_reached, no_reached) {
        (true, false) => Some(Outcome::Passed),
        (false, true) => Some(Outcome::Failed(REASON_THRESHOLD_FAIL.to_string())),
        // Both reached: the leading side wins instead of pass taking precedence.
        (true, true) => Some(resolve_by_leader(yes, no, REASON_THRESHOLD_FAIL)),
        (false, false) => None,
    }
}

/// `part / total >= threshold_bps / 10_000`, without division.
fn share_reached(part: u64, total: u64, threshold_bps: u64) -> bool {
    (part as u128) * (BPS_DENOMINATOR as u128) >= (threshold_bps as u128) * (total as u128)
}

fn resolve_by_leader(yes: u64, no: u64, rejected_reason: &str) -> Outcome {
    match yes.cmp(&no) {
        std::cmp::Ordering::Greater => Outcome::Passed,
        std::cmp::Ordering::Less => Outcome::Failed(rejected_reason.to_string()),
        std::cmp::Ordering::Equal => Outcome::Failed(REASON_TIED.to_string()),
    }
}
