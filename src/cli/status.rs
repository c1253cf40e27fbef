use super::config::AgoraConfig;
use super::{print_json, state};
use agora::governance::{Config, ProposalStatus, BPS_DENOMINATOR};
use serde::Serialize;

#[derive(Serialize)]
struct StatusReport {
    config: Config,
    webpage: String,
    proposals: usize,
    open: usize,
}

/// Show live governance parameters and a proposal summary
///
/// Settles elapsed proposals first, so the counts match what the next
/// vote would observe.
pub async fn execute(config: &AgoraConfig, json: bool) -> Result<(), Box<dyn std::error::Error>> {
    let service = state::open(config)?;
    let proposals = service.get_all_proposals();
    state::persist(&service, &config.state.path)?;

    let report = StatusReport {
        config: service.get_config(),
        webpage: service.get_webpage(),
        proposals: proposals.len(),
        open: proposals
            .iter()
            .filter(|(_, p)| p.status == ProposalStatus::Open)
            .count(),
    };

    if json {
        return print_json(&report);
    }

    let c = &report.config;
    println!("Agora Governance Status");
    println!();
    println!("  Pass threshold:   {}", percent(c.threshold_pass));
    println!("  Fail threshold:   {}", percent(c.threshold_fail));
    println!("  Quorum:           {}", c.quorum);
    println!(
        "  Proposal length:  {}",
        humantime::format_duration(std::time::Duration::from_secs(c.proposal_length))
    );
    println!("  Min to propose:   {}", c.min_to_propose);
    println!("  Min to vote:      {}", c.min_to_vote);
    println!("  Quadratic voting: {}", c.quadratic_voting);
    println!("  Neuron voting:    {}", c.neuron_voting);
    println!();
    println!("  Proposals: {} ({} open)", report.proposals, report.open);
    println!("  Webpage:   {:?}", report.webpage);

    Ok(())
}

fn percent(bps: u64) -> String {
    let per_point = BPS_DENOMINATOR / 100;
    format!("{}.{:02}%", bps / per_point, bps % per_point)
}
