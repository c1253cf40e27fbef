//! Integration test for neuron-derived voting power.
//!
//! Covers the neuron lifecycle (locked -> dissolving -> dissolved), the
//! dissolve-delay bonus and the switch from token to neuron voting.

use agora::governance::{
    Config, EngineOptions, NeuronParams, NeuronStatus, Principal, ProposalEngine,
    ProposalPayload, ProposalStatus,
};
use agora::ledger::InMemoryTokenLedger;
use agora::service::{DaoService, ManualClock};

type TestService = DaoService<InMemoryTokenLedger, ManualClock>;

fn principal(name: &str) -> Principal {
    Principal::new(name)
}

/// Neuron bonus saturates at a 100 second delay to keep numbers small.
fn setup(neuron_voting: bool) -> (TestService, ManualClock) {
    let config = Config {
        quorum: 100,
        proposal_length: 1_000,
        neuron_voting,
        ..Default::default()
    };
    let options = EngineOptions {
        neurons: NeuronParams {
            min_neuron_stake: Some(10),
            max_dissolve_delay: 100,
        },
        ..Default::default()
    };
    let engine = ProposalEngine::new(config, options).unwrap();
    let ledger = InMemoryTokenLedger::with_balances([
        (principal("alice"), 1_000),
        (principal("bob"), 500),
    ]);
    let clock = ManualClock::new(0);
    (DaoService::new(engine, ledger, clock.clone()), clock)
}

#[tokio::test]
async fn test_dissolving_neuron_loses_power() {
    let (service, clock) = setup(true);
    let alice = principal("alice");

    let (id, neuron) = service.neuron_create(&alice, 100, 30).await.unwrap();
    assert_eq!(id, 0);
    assert_eq!(neuron.status, NeuronStatus::Locked);
    assert_eq!(service.get_voting_power(&alice).await.unwrap(), 130);

    clock.set(10);
    let (_, neuron) = service.neuron_dissolve(&alice, id).unwrap();
    assert_eq!(neuron.status, NeuronStatus::Dissolving);

    clock.set(25);
    assert_eq!(service.get_voting_power(&alice).await.unwrap(), 115);

    clock.set(40);
    assert_eq!(service.get_voting_power(&alice).await.unwrap(), 0);

    let (owner, account) = service.my_account(&alice).unwrap();
    assert_eq!(owner, alice);
    assert_eq!(account.subaccount, alice.subaccount());
    assert_eq!(account.neurons[0].1.status, NeuronStatus::Dissolved);

    assert!(service.neuron_dissolve(&alice, id).is_err());
    assert!(service.neuron_relock(&alice, id, 30).is_err());
}

#[tokio::test]
async fn test_relock_restores_full_bonus() {
    let (service, clock) = setup(true);
    let alice = principal("alice");

    let (id, _) = service.neuron_create(&alice, 100, 50).await.unwrap();
    service.neuron_dissolve(&alice, id).unwrap();

    clock.set(20);
    assert_eq!(service.get_voting_power(&alice).await.unwrap(), 130);

    let (_, neuron) = service.neuron_relock(&alice, id, 100).unwrap();
    assert_eq!(neuron.status, NeuronStatus::Locked);
    assert_eq!(neuron.dissolve_delay.initiated, 20);
    assert_eq!(service.get_voting_power(&alice).await.unwrap(), 200);
}

#[tokio::test]
async fn test_relock_cannot_shorten_commitment() {
    let (service, clock) = setup(true);
    let alice = principal("alice");

    let (id, _) = service.neuron_create(&alice, 1_000, 100).await.unwrap();

    // Locked: re-lock is refused outright
    clock.set(1);
    assert!(service.neuron_relock(&alice, id, 0).is_err());
    assert_eq!(service.get_voting_power(&alice).await.unwrap(), 2_000);

    // Dissolving: the new window must cover what is left
    service.neuron_dissolve(&alice, id).unwrap();
    clock.set(11);
    assert!(service.neuron_relock(&alice, id, 89).is_err());
    let (_, neuron) = service.neuron_relock(&alice, id, 90).unwrap();
    assert_eq!(neuron.status, NeuronStatus::Locked);

    // Stake is still bound, so nothing new can be locked
    assert!(service.neuron_create(&alice, 1_000, 0).await.is_err());
}

#[tokio::test]
async fn test_stake_is_bounded_by_token_balance() {
    let (service, _) = setup(true);
    let alice = principal("alice");

    service.neuron_create(&alice, 600, 0).await.unwrap();
    let err = service.neuron_create(&alice, 500, 0).await.unwrap_err();
    assert!(err.contains("Insufficient stake"));

    // Below the configured floor
    assert!(service.neuron_create(&alice, 5, 0).await.is_err());
    // Negative delay
    assert!(service.neuron_create(&alice, 50, -1).await.is_err());

    let (_, account) = service.my_account(&alice).unwrap();
    assert_eq!(account.neurons.len(), 1);
}

#[tokio::test]
async fn test_neuron_power_drives_votes() {
    let (service, clock) = setup(true);
    let alice = principal("alice");
    let bob = principal("bob");

    // bob holds tokens but no neurons
    assert!(service
        .submit_proposal(
            &bob,
            ProposalPayload::UpdateWebpage {
                message: "bob".to_string()
            },
            None,
            None
        )
        .await
        .is_err());

    service.neuron_create(&alice, 100, 100).await.unwrap();
    let (id, _) = service
        .submit_proposal(
            &alice,
            ProposalPayload::UpdateWebpage {
                message: "neurons".to_string(),
            },
            None,
            None,
        )
        .await
        .unwrap();

    clock.set(1);
    let (_, proposal, weight) = service.vote(&alice, id, true).await.unwrap();
    assert_eq!(weight, "200");
    assert_eq!(proposal.status, ProposalStatus::Executed);
    assert_eq!(service.get_webpage(), "neurons");
}

#[tokio::test]
async fn test_token_voting_ignores_neurons() {
    let (service, _) = setup(false);
    let alice = principal("alice");

    service.neuron_create(&alice, 100, 100).await.unwrap();
    assert_eq!(service.get_voting_power(&alice).await.unwrap(), 1_000);
}

#[tokio::test]
async fn test_anonymous_cannot_hold_neurons() {
    let (service, _) = setup(true);
    let anonymous = Principal::anonymous();

    assert!(service.neuron_create(&anonymous, 100, 10).await.is_err());
    assert!(service.my_account(&anonymous).is_err());
}
