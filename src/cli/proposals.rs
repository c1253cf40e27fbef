use super::config::AgoraConfig;
use super::{print_json, state};
use agora::governance::{Principal, Proposal, ProposalId, ProposalPayload, Vote};

/// List proposals, or show a single one
pub async fn execute(
    config: &AgoraConfig,
    id: Option<ProposalId>,
    json: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    let service = state::open(config)?;

    let proposals = match id {
        Some(id) => {
            let found = service
                .get_proposal(id)
                .ok_or_else(|| format!("Proposal not found: {}", id))?;
            vec![found]
        }
        None => service.get_all_proposals(),
    };
    // Reads may settle elapsed proposals.
    state::persist(&service, &config.state.path)?;

    if json {
        return print_json(&proposals);
    }

    if proposals.is_empty() {
        println!("No proposals.");
        return Ok(());
    }

    for (id, proposal) in &proposals {
        print_proposal(*id, proposal);
    }
    Ok(())
}

/// List ballots cast on a proposal or by a principal
pub async fn execute_votes(
    config: &AgoraConfig,
    proposal: Option<ProposalId>,
    principal: Option<String>,
    json: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    let service = state::open(config)?;

    let votes: Vec<(ProposalId, Vote)> = match (proposal, principal) {
        (Some(id), None) => service.get_votes_from_proposal_id(id),
        (None, Some(principal)) => service.get_votes_from_principal(&Principal::new(principal)),
        _ => return Err("Specify exactly one of --proposal or --principal".into()),
    };

    if json {
        return print_json(&votes);
    }

    if votes.is_empty() {
        println!("No votes.");
        return Ok(());
    }

    for (id, vote) in &votes {
        println!(
            "#{:<4} {:<12} {:<3} weight {:<8} at {}",
            id,
            vote.voter,
            if vote.vote { "yes" } else { "no" },
            vote.power,
            vote.timestamp
        );
    }
    Ok(())
}

pub(super) fn print_proposal(id: ProposalId, proposal: &Proposal) {
    let title = if proposal.title.is_empty() {
        "(untitled)"
    } else {
        proposal.title.as_str()
    };
    println!("#{} {} [{}]", id, title, proposal.status);
    println!("   proposer: {}", proposal.proposer);
    println!(
        "   votes:    {} yes / {} no",
        proposal.votes_yes, proposal.votes_no
    );
    println!("   payload:  {}", describe_payload(&proposal.payload));
    if !proposal.description.is_empty() {
        println!("   {}", proposal.description);
    }
}

fn describe_payload(payload: &ProposalPayload) -> String {
    match payload {
        ProposalPayload::UpdateWebpage { message } => format!("update_webpage {:?}", message),
        ProposalPayload::UpdateConfig(update) => {
            format!("update_config [{}]", update.changed_fields().join(", "))
        }
    }
}
