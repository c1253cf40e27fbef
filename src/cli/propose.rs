use super::config::AgoraConfig;
use super::proposals::print_proposal;
use super::{print_json, state};
use agora::governance::{ConfigPayload, Principal, ProposalPayload};
use clap::Args;

/// Arguments for `agora propose`
///
/// Either `--webpage` or at least one config field; never both.
#[derive(Args, Debug, Clone, Default)]
pub struct ProposeArgs {
    /// Principal submitting the proposal
    #[arg(long)]
    pub caller: String,

    #[arg(long)]
    pub title: Option<String>,

    #[arg(long)]
    pub description: Option<String>,

    /// Publish this message on the webpage
    #[arg(long)]
    pub webpage: Option<String>,

    /// New pass threshold in basis points
    #[arg(long)]
    pub threshold_pass: Option<u64>,

    /// New fail threshold in basis points
    #[arg(long)]
    pub threshold_fail: Option<u64>,

    #[arg(long)]
    pub quorum: Option<u64>,

    /// New voting window (humantime format, e.g. "3days")
    #[arg(long)]
    pub proposal_length: Option<String>,

    #[arg(long)]
    pub min_to_propose: Option<u64>,

    #[arg(long)]
    pub min_to_vote: Option<u64>,

    #[arg(long)]
    pub quadratic_voting: Option<bool>,

    #[arg(long)]
    pub neuron_voting: Option<bool>,
}

impl ProposeArgs {
    /// Build the payload described by the flags.
    pub fn payload(&self) -> Result<ProposalPayload, Box<dyn std::error::Error>> {
        let proposal_length = match &self.proposal_length {
            Some(text) => Some(
                humantime::parse_duration(text)
                    .map_err(|e| format!("Invalid --proposal-length '{}': {}", text, e))?
                    .as_secs(),
            ),
            None => None,
        };

        let update = ConfigPayload {
            threshold_pass: self.threshold_pass,
            threshold_fail: self.threshold_fail,
            quorum: self.quorum,
            proposal_length,
            min_to_propose: self.min_to_propose,
            min_to_vote: self.min_to_vote,
            quadratic_voting: self.quadratic_voting,
            neuron_voting: self.neuron_voting,
        };

        match &self.webpage {
            Some(_) if !update.is_empty() => {
                Err("--webpage cannot be combined with config fields".into())
            }
            Some(message) => Ok(ProposalPayload::UpdateWebpage {
                message: message.clone(),
            }),
            None if update.is_empty() => {
                Err("Nothing to propose: pass --webpage or at least one config field".into())
            }
            None => Ok(ProposalPayload::UpdateConfig(update)),
        }
    }
}

/// Submit a proposal on behalf of `--caller`
pub async fn execute(
    config: &AgoraConfig,
    args: ProposeArgs,
    json: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    let payload = args.payload()?;
    let service = state::open(config)?;

    let result = service
        .submit_proposal(
            &Principal::new(args.caller.as_str()),
            payload,
            args.title,
            args.description,
        )
        .await;
    // Computing power may have advanced elapsed neurons even on rejection.
    state::persist(&service, &config.state.path)?;
    let (id, proposal) = result?;

    if json {
        return print_json(&(id, proposal));
    }

    println!("Submitted proposal #{}", id);
    print_proposal(id, &proposal);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args() -> ProposeArgs {
        ProposeArgs {
            caller: "alice".to_string(),
            ..Default::default()
        }
    }

    #[test]
    fn test_webpage_payload() {
        let payload = ProposeArgs {
            webpage: Some("gm".to_string()),
            ..args()
        }
        .payload()
        .unwrap();
        assert_eq!(
            payload,
            ProposalPayload::UpdateWebpage {
                message: "gm".to_string()
            }
        );
    }

    #[test]
    fn test_config_payload_parses_duration() {
        let payload = ProposeArgs {
            proposal_length: Some("2h".to_string()),
            quadratic_voting: Some(true),
            ..args()
        }
        .payload()
        .unwrap();

        match payload {
            ProposalPayload::UpdateConfig(update) => {
                assert_eq!(update.proposal_length, Some(7_200));
                assert_eq!(update.quadratic_voting, Some(true));
                assert_eq!(update.threshold_pass, None);
            }
            other => panic!("Expected UpdateConfig, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_rejected_submission_still_persists_neuron_refresh() {
        use agora::governance::{Config, EngineOptions, NeuronStatus, ProposalEngine};
        use tempfile::TempDir;

        let temp_dir = TempDir::new().unwrap();
        let config = AgoraConfig::new(temp_dir.path().join("state.cbor"));

        let genesis = Config {
            neuron_voting: true,
            min_to_propose: 1_000,
            ..Default::default()
        };
        let mut engine = ProposalEngine::new(genesis, EngineOptions::default()).unwrap();
        let alice = Principal::new("alice");
        let (nid, _) = engine.neuron_create(&alice, 10, 1, 10, 0).unwrap();
        engine.neuron_dissolve(&alice, nid, 0).unwrap();
        std::fs::write(&config.state.path, engine.to_bytes().unwrap()).unwrap();

        let result = execute(
            &config,
            ProposeArgs {
                webpage: Some("gm".to_string()),
                ..args()
            },
            false,
        )
        .await;
        assert!(result.is_err());

        let bytes = std::fs::read(&config.state.path).unwrap();
        let mut stored = ProposalEngine::from_bytes(&bytes).unwrap();
        let account = stored.account(&alice, 0).unwrap();
        assert_eq!(account.neurons[0].1.status, NeuronStatus::Dissolved);
    }

    #[test]
    fn test_mixed_or_empty_payload_rejected() {
        assert!(args().payload().is_err());
        assert!(ProposeArgs {
            webpage: Some("gm".to_string()),
            quorum: Some(5),
            ..args()
        }
        .payload()
        .is_err());
    }
}
