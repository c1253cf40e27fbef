use super::config::AgoraConfig;
use super::proposals::print_proposal;
use super::{print_json, state};
use agora::governance::{Principal, ProposalId};
use clap::ValueEnum;
use serde::Serialize;

/// Ballot choice
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum VoteChoice {
    Yes,
    No,
}

impl VoteChoice {
    pub fn approve(self) -> bool {
        matches!(self, VoteChoice::Yes)
    }
}

/// Cast a ballot on behalf of `--caller`
pub async fn execute(
    config: &AgoraConfig,
    caller: String,
    id: ProposalId,
    choice: VoteChoice,
    json: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    let service = state::open(config)?;

    let result = service
        .vote(&Principal::new(caller), id, choice.approve())
        .await;
    // A rejected vote may still have settled an elapsed proposal.
    state::persist(&service, &config.state.path)?;
    let (id, proposal, weight) = result?;

    if json {
        #[derive(Serialize)]
        struct VoteReceipt<'a> {
            id: ProposalId,
            weight: &'a str,
            proposal: &'a agora::governance::Proposal,
        }
        return print_json(&VoteReceipt {
            id,
            weight: &weight,
            proposal: &proposal,
        });
    }

    println!("Vote recorded with weight {}", weight);
    print_proposal(id, &proposal);
    Ok(())
}

/// Explicitly execute a passed proposal
pub async fn execute_proposal(
    config: &AgoraConfig,
    id: ProposalId,
    json: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    let service = state::open(config)?;
    let result = service.execute_proposal(id);
    // Execution may have settled the proposal even when it is rejected.
    state::persist(&service, &config.state.path)?;
    let (id, proposal) = result?;

    if json {
        return print_json(&(id, proposal));
    }

    print_proposal(id, &proposal);
    Ok(())
}

/// Settle every proposal whose voting window has elapsed
pub async fn execute_sweep(
    config: &AgoraConfig,
    json: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    let service = state::open(config)?;
    let settled = service.sweep();
    state::persist(&service, &config.state.path)?;

    if json {
        return print_json(&settled);
    }

    if settled.is_empty() {
        println!("Nothing to settle.");
    } else {
        for id in settled {
            if let Some((id, proposal)) = service.get_proposal(id) {
                println!("#{} -> {}", id, proposal.status);
            }
        }
    }
    Ok(())
}
