//! Property-based tests for the governance core
//!
//! Tests for:
//! - Tally: monotonic tallies, one ballot per voter, terminal stability
//! - Weights: integer square root bounds
//! - Neurons: power bounded by 2x balance, monotonic in committed delay

use super::engine::{EngineOptions, ProposalEngine};
use super::neurons::neuron_power;
use super::tally::isqrt;
use super::types::*;
use proptest::prelude::*;
use std::collections::HashSet;

fn engine(quorum: u64, quadratic: bool, schema: StatusSchema) -> ProposalEngine {
    let config = Config {
        threshold_pass: 6_000,
        threshold_fail: 4_000,
        quorum,
        proposal_length: 1_000,
        min_to_propose: 1,
        min_to_vote: 1,
        quadratic_voting: quadratic,
        neuron_voting: false,
    };
    let options = EngineOptions {
        schema,
        ..Default::default()
    };
    ProposalEngine::new(config, options).unwrap()
}

fn schema_strategy() -> impl Strategy<Value = StatusSchema> {
    prop_oneof![Just(StatusSchema::Staged), Just(StatusSchema::Collapsed)]
}

// ============================================================================
// TALLY PROPERTY TESTS
// ============================================================================

proptest! {
    /// Property: tallies never decrease and a closed proposal stays closed
    #[test]
    fn tallies_monotonic_and_terminal_is_stable(
        ballots in prop::collection::vec((0u8..8, any::<bool>(), 1u64..500, 0u64..50), 1..40),
        quorum in 0u64..2_000,
        quadratic in any::<bool>(),
        schema in schema_strategy(),
    ) {
        let mut engine = engine(quorum, quadratic, schema);
        let proposer = Principal::new("proposer");
        let payload = ProposalPayload::UpdateWebpage { message: "m".to_string() };
        let (id, _) = engine.submit(&proposer, payload, None, None, 10, 0).unwrap();

        let mut now = 0u64;
        let mut last_yes = 0u64;
        let mut last_no = 0u64;
        let mut terminal: Option<ProposalStatus> = None;

        for (voter, approve, balance, step) in ballots {
            now += step;
            let voter = Principal::new(format!("voter-{}", voter));
            let _ = engine.cast_vote(id, &voter, approve, balance, now);

            let (_, proposal) = engine.proposal(id, now).unwrap();
            prop_assert!(proposal.votes_yes >= last_yes);
            prop_assert!(proposal.votes_no >= last_no);
            last_yes = proposal.votes_yes;
            last_no = proposal.votes_no;

            if let Some(status) = &terminal {
                prop_assert_eq!(&proposal.status, status);
            } else if proposal.status.is_terminal() {
                terminal = Some(proposal.status.clone());
            }
        }
    }

    /// Property: at most one ballot per voter per proposal
    #[test]
    fn one_ballot_per_voter(
        ballots in prop::collection::vec((0u8..4, any::<bool>()), 1..30),
    ) {
        let mut engine = engine(u64::MAX, false, StatusSchema::Staged);
        let proposer = Principal::new("proposer");
        let payload = ProposalPayload::UpdateWebpage { message: "m".to_string() };
        let (id, _) = engine.submit(&proposer, payload, None, None, 10, 0).unwrap();

        for (voter, approve) in ballots {
            let voter = Principal::new(format!("voter-{}", voter));
            let _ = engine.cast_vote(id, &voter, approve, 5, 1);
        }

        let votes = engine.votes_for(id);
        let voters: HashSet<_> = votes.iter().map(|(_, v)| v.voter.clone()).collect();
        prop_assert_eq!(voters.len(), votes.len());

        let (_, proposal) = engine.proposal(id, 1).unwrap();
        let weight_sum: u64 = votes.iter().map(|(_, v)| v.power).sum();
        prop_assert_eq!(proposal.total_votes(), weight_sum);
    }

    /// Property: rejected submissions never grow the store
    #[test]
    fn underpowered_submission_creates_nothing(balance in 0u64..100) {
        let config = Config { min_to_propose: 100, ..Default::default() };
        let mut engine = ProposalEngine::new(config, EngineOptions::default()).unwrap();
        let payload = ProposalPayload::UpdateWebpage { message: "m".to_string() };

        let result = engine.submit(&Principal::new("p"), payload, None, None, balance, 0);
        prop_assert!(result.is_err());
        prop_assert!(engine.proposals(0).is_empty());
    }
}

// ============================================================================
// WEIGHT PROPERTY TESTS
// ============================================================================

proptest! {
    /// Property: isqrt returns the floor of the real square root
    #[test]
    fn isqrt_is_floor_sqrt(n in any::<u64>()) {
        let r = isqrt(n) as u128;
        let n = n as u128;
        prop_assert!(r * r <= n);
        prop_assert!((r + 1) * (r + 1) > n);
    }
}

// ============================================================================
// NEURON PROPERTY TESTS
// ============================================================================

fn locked(balance: u64, delay: u64) -> Neuron {
    Neuron {
        balance,
        status: NeuronStatus::Locked,
        dissolve_delay: DissolveDelay { initiated: 0, delay },
        created: 0,
        updated: 0,
    }
}

proptest! {
    /// Property: neuron power is between 1x and 2x balance while locked
    #[test]
    fn locked_power_is_bounded(
        balance in 0u64..1_000_000_000_000,
        delay in any::<u64>(),
        max in 1u64..1_000_000_000,
    ) {
        let power = neuron_power(&locked(balance, delay), 0, max);
        prop_assert!(power >= balance);
        prop_assert!(power <= balance.saturating_mul(2));
    }

    /// Property: longer committed delay never yields less power
    #[test]
    fn power_monotonic_in_delay(
        balance in 0u64..1_000_000_000,
        short in 0u64..10_000,
        extra in 0u64..10_000,
        max in 1u64..20_000,
    ) {
        let low = neuron_power(&locked(balance, short), 0, max);
        let high = neuron_power(&locked(balance, short + extra), 0, max);
        prop_assert!(high >= low);
    }

    /// Property: dissolving power decays and hits zero at the end of the delay
    #[test]
    fn dissolving_power_decays_to_zero(
        balance in 1u64..1_000_000,
        delay in 1u64..10_000,
        t in 0u64..10_000,
    ) {
        let mut neuron = locked(balance, delay);
        neuron.status = NeuronStatus::Dissolving;

        let now = t.min(delay);
        let earlier = neuron_power(&neuron, now.saturating_sub(1), 10_000);
        let later = neuron_power(&neuron, now, 10_000);
        prop_assert!(later <= earlier);
        prop_assert_eq!(neuron_power(&neuron, delay, 10_000), 0);
    }
}
